//! GPIO function multiplexing.

use volatile_register::RW;

pub const IO_BANK0_BASE: usize = 0x4001_4000;

/// User GPIOs on bank 0.
pub const PINS: usize = 30;

/// GPIOn_CTRL FUNCSEL values used here.
pub mod funcsel {
    pub const PIO0: u8 = 6;
    pub const PIO1: u8 = 7;
    pub const NULL: u8 = 0x1F;
}

#[repr(C)]
pub struct GpioRegisters {
    pub status: RW<u32>,
    pub ctrl: RW<u32>,
}

impl GpioRegisters {
    pub fn function(&self) -> u8 {
        (self.ctrl.read() & 0x1F) as u8
    }

    /// Routes the pin to peripheral function `f`, leaving the override
    /// fields alone.
    ///
    /// # Safety
    ///
    /// Changes which peripheral drives the pin; the caller must own it.
    pub unsafe fn set_function(&self, f: u8) {
        self.ctrl.modify(|v| (v & !0x1F) | u32::from(f & 0x1F))
    }
}

#[repr(C)]
pub struct IoBank0Registers {
    pub gpio: [GpioRegisters; PINS],
}
