//! PIO block selection and state machine setup.

use log::{debug, warn};

use crate::config::{AllocationPolicy, VgaConfig};
use crate::error::{Error, Resource};
use crate::hw::io_bank0::funcsel;
use crate::hw::pio::{clkdiv, ctrl, instr, shiftctrl, StateMachineRegisters};
use crate::hw::{Hardware, IoBank0Registers, PioBlock, PioRegisters};
use crate::program::{self, ProgramKind, TimingProgram};
use crate::timing::{ClockDivider, VideoMode};

/// One timing program, loaded and bound to a state machine.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct StateMachineBinding {
    pub kind: ProgramKind,
    pub block: PioBlock,
    pub slot: usize,
    pub pin: u8,
    /// Instruction memory address the program was loaded at.
    pub offset: u8,
    /// Instruction words occupied.
    pub len: u8,
    pub divider: ClockDivider,
    /// Word pushed to the TX FIFO before the state machine starts.
    pub init_word: u32,
}

/// CTRL mask covering every state machine in `bindings`.
pub fn slot_mask(bindings: &[StateMachineBinding]) -> u8 {
    bindings.iter().fold(0, |m, b| m | 1 << b.slot)
}

/// A block is free if none of its state machines are running.
pub fn block_is_free(pio: &PioRegisters) -> bool {
    pio.ctrl.read() & ctrl::SM_ENABLE_MASK == 0
}

/// Picks the block to run on.
///
/// An explicitly requested block is used as-is. Otherwise the blocks are
/// scanned in order for a free one, and `policy` decides what happens if there
/// isn't one.
pub fn select_block(
    hw: &Hardware<'_>,
    preferred: Option<PioBlock>,
    policy: AllocationPolicy,
) -> Result<PioBlock, Error> {
    if let Some(block) = preferred {
        debug!("using requested {}", block);
        return Ok(block);
    }

    for &block in &PioBlock::ALL {
        let free = block_is_free(hw.pio(block));
        debug!("{} free: {}", block, free);
        if free {
            debug!("selected {}", block);
            return Ok(block);
        }
    }

    match policy {
        AllocationPolicy::FailFast => Err(Error::ResourceExhausted(Resource::PioBlock)),
        AllocationPolicy::FallbackToFirstBlock => {
            warn!("all PIO blocks busy; taking over {}", PioBlock::Pio0);
            Ok(PioBlock::Pio0)
        }
    }
}

/// Loads the three programs into `block`, binds them to their pins, and
/// pushes each its init word. The state machines are left disabled.
///
/// Fails without touching the hardware if a clock divider can't be derived.
pub fn bind(
    hw: &Hardware<'_>,
    block: PioBlock,
    config: &VgaConfig,
    mode: &VideoMode,
) -> Result<[StateMachineBinding; 3], Error> {
    let programs = program::all();
    let offsets = program::load_offsets(&programs);

    let mut dividers = [ClockDivider { int: 1, frac: 0 }; 3];
    for (d, p) in dividers.iter_mut().zip(&programs) {
        *d = config.divider(p.kind, mode)?;
    }

    let bindings: [StateMachineBinding; 3] = core::array::from_fn(|i| {
        let p = &programs[i];
        StateMachineBinding {
            kind: p.kind,
            block,
            slot: p.kind.slot(),
            pin: config.pin(p.kind),
            offset: offsets[i],
            len: p.len() as u8,
            divider: dividers[i],
            init_word: p.kind.init_word(mode),
        }
    });

    let pio = hw.pio(block);
    let mask = slot_mask(&bindings);
    // Safety: the caller owns the block and the pins.
    unsafe {
        pio.ctrl
            .modify(|v| (v & !ctrl::sm_enable(mask)) | ctrl::sm_restart(mask));
        // Restarting leaves IRQ flags alone, and a stale visible-line flag
        // would let COLOR start outside VSYNC's active window. Writing ones
        // clears them.
        pio.irq.write(program::IRQ_FLAGS);
        for (b, p) in bindings.iter().zip(&programs) {
            load(pio, p, b.offset);
            configure(pio, hw.io_bank0, p, b, mode);
        }
        for b in &bindings {
            pio.txf[b.slot].write(b.init_word);
        }
    }
    Ok(bindings)
}

unsafe fn load(pio: &PioRegisters, program: &TimingProgram, offset: u8) {
    for (i, word) in program.relocated(offset).enumerate() {
        pio.instr_mem[usize::from(offset) + i].write(u32::from(word));
    }
}

unsafe fn configure(
    pio: &PioRegisters,
    io: &IoBank0Registers,
    program: &TimingProgram,
    b: &StateMachineBinding,
    mode: &VideoMode,
) {
    let sm = &pio.sm[b.slot];
    sm.clkdiv.write(clkdiv(b.divider.int, b.divider.frac));
    sm.execctrl.write(program.execctrl(b.offset));
    sm.shiftctrl.write(program.shiftctrl());
    sm.pinctrl.write(program.pinctrl(b.pin).bits());
    clear_fifos(sm);

    io.gpio[usize::from(b.pin)].set_function(b.block.gpio_function());
    // Level before direction, so the pin never glitches.
    let level = program.kind.initial_level(mode) as u8;
    sm.instr.write(u32::from(instr::set_pins(level)));
    sm.instr.write(u32::from(instr::set_pindirs(1)));
    sm.instr.write(u32::from(instr::jmp(b.offset)));
}

/// Empties both FIFOs. Changing the join mode flushes them; changing it twice
/// leaves it as it was.
unsafe fn clear_fifos(sm: &StateMachineRegisters) {
    sm.shiftctrl.modify(|v| v ^ shiftctrl::FJOIN_RX);
    sm.shiftctrl.modify(|v| v ^ shiftctrl::FJOIN_RX);
}

/// Starts the bound state machines together, restarting their clock dividers
/// in the same write so they begin in phase.
pub fn enable(pio: &PioRegisters, bindings: &[StateMachineBinding]) {
    let mask = slot_mask(bindings);
    // Safety: only our state machines are touched.
    unsafe {
        pio.ctrl
            .modify(|v| v | ctrl::sm_enable(mask) | ctrl::clkdiv_restart(mask));
    }
}

/// Undoes `bind`: stops the state machines, flushes their FIFOs, wipes their
/// programs and disconnects their pins.
pub fn release(pio: &PioRegisters, io: &IoBank0Registers, bindings: &[StateMachineBinding]) {
    let mask = slot_mask(bindings);
    // Safety: only resources recorded in `bindings` are touched.
    unsafe {
        pio.ctrl.modify(|v| v & !ctrl::sm_enable(mask));
        for b in bindings {
            clear_fifos(&pio.sm[b.slot]);
            let start = usize::from(b.offset);
            for word in &pio.instr_mem[start..start + usize::from(b.len)] {
                word.write(0);
            }
            io.gpio[usize::from(b.pin)].set_function(funcsel::NULL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::pio::execctrl;
    use crate::sim::SimulatedHardware;
    use crate::timing::VGA_640_480;

    #[test]
    fn prefers_first_free_block() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        assert_eq!(
            select_block(&hw, None, AllocationPolicy::FailFast),
            Ok(PioBlock::Pio0)
        );

        sim.occupy(PioBlock::Pio0, 3);
        assert_eq!(
            select_block(&hw, None, AllocationPolicy::FailFast),
            Ok(PioBlock::Pio1)
        );
    }

    #[test]
    fn both_busy() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        sim.occupy(PioBlock::Pio0, 0);
        sim.occupy(PioBlock::Pio1, 2);
        assert_eq!(
            select_block(&hw, None, AllocationPolicy::FailFast),
            Err(Error::ResourceExhausted(Resource::PioBlock))
        );
        assert_eq!(
            select_block(&hw, None, AllocationPolicy::FallbackToFirstBlock),
            Ok(PioBlock::Pio0)
        );
    }

    #[test]
    fn requested_block_skips_scan() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        sim.occupy(PioBlock::Pio1, 0);
        assert_eq!(
            select_block(&hw, Some(PioBlock::Pio1), AllocationPolicy::FailFast),
            Ok(PioBlock::Pio1)
        );
    }

    #[test]
    fn bind_programs_block_without_enabling() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let config = VgaConfig::default();
        let bindings = bind(&hw, PioBlock::Pio1, &config, &VGA_640_480).unwrap();
        let pio = sim.pio(PioBlock::Pio1);

        assert_eq!(pio.ctrl.read() & ctrl::SM_ENABLE_MASK, 0);
        assert_eq!(slot_mask(&bindings), 0b111);

        // Programs are packed and relocated.
        let programs = program::all();
        for (b, p) in bindings.iter().zip(&programs) {
            for (i, word) in p.relocated(b.offset).enumerate() {
                assert_eq!(pio.instr_mem[usize::from(b.offset) + i].read(), u32::from(word));
            }
        }
        assert_eq!(pio.instr_mem[31].read(), 0);

        // Init words wait in each FIFO.
        assert_eq!(pio.txf[0].read(), 655);
        assert_eq!(pio.txf[1].read(), 479);
        assert_eq!(pio.txf[2].read(), 639);

        // Clock dividers.
        assert_eq!(pio.sm[0].clkdiv.read(), clkdiv(4, 247));
        assert_eq!(pio.sm[1].clkdiv.read(), clkdiv(1, 0));
        assert_eq!(pio.sm[2].clkdiv.read(), clkdiv(1, 61));

        // COLOR wraps within its own program.
        let e = pio.sm[2].execctrl.read();
        assert_eq!(execctrl::wrap_bottom(e), 26);
        assert_eq!(execctrl::wrap_top(e), 30);

        // Pins handed to PIO1, and each state machine parked at its entry
        // point with its pin driven.
        for (b, pin) in bindings.iter().zip(&[4, 5, 0]) {
            assert_eq!(b.pin, *pin);
            assert_eq!(sim.io_bank0().gpio[usize::from(b.pin)].function(), 7);
            assert_eq!(pio.sm[b.slot].instr.read(), u32::from(b.offset));
        }

        // The other block is untouched.
        assert_eq!(sim.pio(PioBlock::Pio0).instr_mem[0].read(), 0);
    }

    #[test]
    fn bind_clears_inter_program_irq_flags() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let pio = sim.pio(PioBlock::Pio0);
        // Left over from an earlier session.
        unsafe { pio.irq.write(0b10) };

        bind(&hw, PioBlock::Pio0, &VgaConfig::default(), &VGA_640_480).unwrap();
        // IRQ is write-one-to-clear, so the last write names the flags
        // cleared: both of ours and no one else's.
        assert_eq!(pio.irq.read(), program::IRQ_FLAGS);
        assert_eq!(sim.pio(PioBlock::Pio1).irq.read(), 0);
    }

    #[test]
    fn bad_clock_leaves_hardware_alone() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let config = VgaConfig {
            sys_clock_hz: 10_000_000,
            ..VgaConfig::default()
        };
        assert!(bind(&hw, PioBlock::Pio0, &config, &VGA_640_480).is_err());
        assert!(sim.pio(PioBlock::Pio0).instr_mem.iter().all(|w| w.read() == 0));
        assert_eq!(sim.pio(PioBlock::Pio0).ctrl.read(), 0);
    }

    #[test]
    fn enable_is_one_write_with_divider_restart() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        sim.occupy(PioBlock::Pio0, 3);
        let bindings = bind(&hw, PioBlock::Pio0, &VgaConfig::default(), &VGA_640_480).unwrap();
        enable(sim.pio(PioBlock::Pio0), &bindings);
        let c = sim.pio(PioBlock::Pio0).ctrl.read();
        assert_eq!(c & ctrl::SM_ENABLE_MASK, 0b1111);
        assert_eq!(c & ctrl::clkdiv_restart(0xF), ctrl::clkdiv_restart(0b111));
    }

    #[test]
    fn release_undoes_bind() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        sim.occupy(PioBlock::Pio0, 3);
        let bindings = bind(&hw, PioBlock::Pio0, &VgaConfig::default(), &VGA_640_480).unwrap();
        let pio = sim.pio(PioBlock::Pio0);
        enable(pio, &bindings);
        release(pio, sim.io_bank0(), &bindings);

        // Someone else's state machine keeps running.
        assert_eq!(pio.ctrl.read() & ctrl::SM_ENABLE_MASK, 0b1000);
        assert!(pio.instr_mem.iter().all(|w| w.read() == 0));
        for b in &bindings {
            assert_eq!(sim.io_bank0().gpio[usize::from(b.pin)].function(), funcsel::NULL);
        }
    }
}
