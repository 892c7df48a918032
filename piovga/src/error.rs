//! Driver errors.

use core::fmt;

use crate::driver::DriverState;

/// Hardware the driver needs but couldn't get.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Resource {
    /// Every PIO block already has a state machine running.
    PioBlock,
    /// The DMA channel was already busy.
    DmaChannel(u8),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Resource::PioBlock => f.write_str("PIO block"),
            Resource::DmaChannel(n) => write!(f, "DMA channel {}", n),
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("no free {0}")]
    ResourceExhausted(Resource),
    #[error("not allowed while the driver is {0}")]
    InvalidState(DriverState),
    #[error("DMA channel {channel} reported a bus error")]
    HardwareFault { channel: u8 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ConfigError),
}

/// Reasons a `VgaConfig` can't be used.
#[derive(Copy, Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("GPIO{0} does not exist")]
    PinOutOfRange(u8),
    #[error("GPIO{0} is assigned to more than one signal")]
    DuplicatePin(u8),
    #[error("DMA channel {0} does not exist")]
    ChannelOutOfRange(u8),
    #[error("streaming and activator both use DMA channel {0}")]
    SharedChannel(u8),
    #[error("can't derive {target_hz} Hz from a {sys_clock_hz} Hz system clock")]
    ClockOutOfRange { target_hz: u32, sys_clock_hz: u32 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            Error::ResourceExhausted(Resource::PioBlock).to_string(),
            "no free PIO block"
        );
        assert_eq!(
            Error::ResourceExhausted(Resource::DmaChannel(3)).to_string(),
            "no free DMA channel 3"
        );
        assert_eq!(
            Error::InvalidState(DriverState::Idle).to_string(),
            "not allowed while the driver is idle"
        );
        assert_eq!(
            Error::from(ConfigError::SharedChannel(4)).to_string(),
            "invalid configuration: streaming and activator both use DMA channel 4"
        );
    }
}
