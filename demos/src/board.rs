//! RP2040 bring-up.

use panic_halt as _;

use rp2040_hal::{self as hal, clocks::init_clocks_and_plls, pac, watchdog::Watchdog, Clock};

use piovga::{FrameStorage, Hardware, VgaConfig, VgaDriver};

use crate::Demo;

#[link_section = ".boot2"]
#[no_mangle]
#[used]
pub static BOOT2_FIRMWARE: [u8; 256] = rp2040_boot2::BOOT_LOADER_W25Q080;

/// Crystal fitted to the Pico and most boards copied from it.
const XTAL_FREQ_HZ: u32 = 12_000_000;

static mut FRAME: FrameStorage = FrameStorage::new();

/// Starts video, draws `demo` once, and sleeps forever while the hardware
/// keeps the picture on screen.
pub fn run(demo: Demo) -> ! {
    unsafe {
        // Spinlocks survive a soft reset.
        hal::sio::spinlock_reset();
    }
    let mut pac = pac::Peripherals::take().unwrap();
    let mut watchdog = Watchdog::new(pac.WATCHDOG);
    let clocks = init_clocks_and_plls(
        XTAL_FREQ_HZ,
        pac.XOSC,
        pac.CLOCKS,
        pac.PLL_SYS,
        pac.PLL_USB,
        &mut pac.RESETS,
        &mut watchdog,
    )
    .ok()
    .unwrap();

    // The driver programs these blocks directly, so take them out of reset
    // here rather than handing them to the HAL.
    pac.RESETS.reset.modify(|_, w| {
        w.pio0()
            .clear_bit()
            .pio1()
            .clear_bit()
            .dma()
            .clear_bit()
            .io_bank0()
            .clear_bit()
            .pads_bank0()
            .clear_bit()
    });
    loop {
        let done = pac.RESETS.reset_done.read();
        if done.pio0().bit()
            && done.pio1().bit()
            && done.dma().bit()
            && done.io_bank0().bit()
            && done.pads_bank0().bit()
        {
            break;
        }
    }

    let config = VgaConfig {
        sys_clock_hz: clocks.system_clock.freq().to_Hz(),
        ..VgaConfig::default()
    };
    let hw = Hardware::take().unwrap();
    // Safety: this is the only reference we ever create to FRAME, and `run`
    // never returns.
    let storage = unsafe { &mut *core::ptr::addr_of_mut!(FRAME) };

    let mut vga = VgaDriver::new(hw, storage, config);
    let mut fb = vga.start().unwrap();
    demo(&mut *fb);

    loop {
        cortex_m::asm::wfi();
    }
}
