//! Driver configuration.

use smart_default::SmartDefault;

use crate::error::ConfigError;
use crate::hw::{dma, io_bank0, PioBlock};
use crate::program::ProgramKind;
use crate::timing::{ClockDivider, VideoMode};

/// What to do when every PIO block is already in use.
#[derive(Copy, Clone, Debug, Eq, PartialEq, SmartDefault)]
pub enum AllocationPolicy {
    /// Refuse to start.
    #[default]
    FailFast,
    /// Take over PIO0 anyway, clobbering whatever is running there.
    FallbackToFirstBlock,
}

/// Pins, DMA channels and clocks used by the driver.
///
/// The defaults suit the common wiring: HSYNC on GPIO4, VSYNC on GPIO5, the
/// video signal on GPIO0, with DMA channels 10 and 11, which most other code
/// leaves alone.
#[derive(Clone, Debug, Eq, PartialEq, SmartDefault)]
pub struct VgaConfig {
    #[default = 4]
    pub hsync_pin: u8,
    #[default = 5]
    pub vsync_pin: u8,
    #[default = 0]
    pub color_pin: u8,

    /// Channel that copies the frame buffer into the COLOR FIFO.
    #[default = 11]
    pub streaming_channel: u8,
    /// Channel that restarts the streaming channel after each frame.
    #[default = 10]
    pub activator_channel: u8,

    /// Block to use. `None` picks the first block with no state machine
    /// running.
    pub pio: Option<PioBlock>,
    pub allocation: AllocationPolicy,

    /// System clock, which the state machine dividers are computed from.
    #[default = 125_000_000]
    pub sys_clock_hz: u32,
}

impl VgaConfig {
    /// Pin carrying `kind`'s signal.
    pub fn pin(&self, kind: ProgramKind) -> u8 {
        match kind {
            ProgramKind::Hsync => self.hsync_pin,
            ProgramKind::Vsync => self.vsync_pin,
            ProgramKind::Color => self.color_pin,
        }
    }

    /// Clock divider for `kind`'s state machine.
    pub fn divider(&self, kind: ProgramKind, mode: &VideoMode) -> Result<ClockDivider, ConfigError> {
        let target_hz = kind.clock_hz(mode);
        ClockDivider::from_frequencies(self.sys_clock_hz, target_hz).ok_or(
            ConfigError::ClockOutOfRange {
                target_hz,
                sys_clock_hz: self.sys_clock_hz,
            },
        )
    }

    /// Checks everything that can be checked without touching hardware.
    pub fn validate(&self, mode: &VideoMode) -> Result<(), ConfigError> {
        let pins = [self.hsync_pin, self.vsync_pin, self.color_pin];
        for (i, &pin) in pins.iter().enumerate() {
            if usize::from(pin) >= io_bank0::PINS {
                return Err(ConfigError::PinOutOfRange(pin));
            }
            if pins[..i].contains(&pin) {
                return Err(ConfigError::DuplicatePin(pin));
            }
        }

        for &ch in &[self.streaming_channel, self.activator_channel] {
            if usize::from(ch) >= dma::CHANNELS {
                return Err(ConfigError::ChannelOutOfRange(ch));
            }
        }
        if self.streaming_channel == self.activator_channel {
            return Err(ConfigError::SharedChannel(self.streaming_channel));
        }

        for &kind in &ProgramKind::ALL {
            self.divider(kind, mode)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::VGA_640_480;

    #[test]
    fn defaults() {
        let c = VgaConfig::default();
        assert_eq!((c.hsync_pin, c.vsync_pin, c.color_pin), (4, 5, 0));
        assert_eq!((c.streaming_channel, c.activator_channel), (11, 10));
        assert_eq!(c.pio, None);
        assert_eq!(c.allocation, AllocationPolicy::FailFast);
        assert_eq!(c.sys_clock_hz, 125_000_000);
        assert_eq!(c.validate(&VGA_640_480), Ok(()));
    }

    #[test]
    fn rejects_bad_pins() {
        let c = VgaConfig {
            color_pin: 30,
            ..VgaConfig::default()
        };
        assert_eq!(c.validate(&VGA_640_480), Err(ConfigError::PinOutOfRange(30)));

        let c = VgaConfig {
            color_pin: 5,
            ..VgaConfig::default()
        };
        assert_eq!(c.validate(&VGA_640_480), Err(ConfigError::DuplicatePin(5)));
    }

    #[test]
    fn rejects_bad_channels() {
        let c = VgaConfig {
            activator_channel: 12,
            ..VgaConfig::default()
        };
        assert_eq!(c.validate(&VGA_640_480), Err(ConfigError::ChannelOutOfRange(12)));

        let c = VgaConfig {
            activator_channel: 11,
            ..VgaConfig::default()
        };
        assert_eq!(c.validate(&VGA_640_480), Err(ConfigError::SharedChannel(11)));
    }

    #[test]
    fn rejects_slow_system_clock() {
        // VSYNC runs at 125 MHz.
        let c = VgaConfig {
            sys_clock_hz: 48_000_000,
            ..VgaConfig::default()
        };
        assert_eq!(
            c.validate(&VGA_640_480),
            Err(ConfigError::ClockOutOfRange {
                target_hz: 125_000_000,
                sys_clock_hz: 48_000_000,
            })
        );
    }
}
