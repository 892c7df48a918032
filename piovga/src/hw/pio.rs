//! Programmable I/O block registers and field encodings.

use volatile_register::RW;

/// Physical addresses of the two PIO blocks.
pub const PIO0_BASE: usize = 0x5020_0000;
pub const PIO1_BASE: usize = 0x5030_0000;

/// Words of instruction memory per block.
pub const INSTR_MEM_WORDS: usize = 32;

/// State machines per block.
pub const STATE_MACHINES: usize = 4;

#[repr(C)]
pub struct StateMachineRegisters {
    pub clkdiv: RW<u32>,
    pub execctrl: RW<u32>,
    pub shiftctrl: RW<u32>,
    pub addr: RW<u32>,
    /// Writing an instruction here executes it immediately.
    pub instr: RW<u32>,
    pub pinctrl: RW<u32>,
}

/// One PIO block.
///
/// The FIFO registers are modeled as plain read/write cells. On hardware,
/// reading an RX FIFO pops it, so don't.
#[repr(C)]
pub struct PioRegisters {
    pub ctrl: RW<u32>,
    pub fstat: RW<u32>,
    pub fdebug: RW<u32>,
    pub flevel: RW<u32>,
    pub txf: [RW<u32>; STATE_MACHINES],
    pub rxf: [RW<u32>; STATE_MACHINES],
    pub irq: RW<u32>,
    pub irq_force: RW<u32>,
    pub input_sync_bypass: RW<u32>,
    pub dbg_padout: RW<u32>,
    pub dbg_padoe: RW<u32>,
    pub dbg_cfginfo: RW<u32>,
    pub instr_mem: [RW<u32>; INSTR_MEM_WORDS],
    pub sm: [StateMachineRegisters; STATE_MACHINES],
    pub intr: RW<u32>,
    pub irq0_inte: RW<u32>,
    pub irq0_intf: RW<u32>,
    pub irq0_ints: RW<u32>,
    pub irq1_inte: RW<u32>,
    pub irq1_intf: RW<u32>,
    pub irq1_ints: RW<u32>,
}

/// CTRL register fields. Each takes a mask of state machines, bit n for SM n.
pub mod ctrl {
    pub const SM_ENABLE_MASK: u32 = 0xF;

    pub const fn sm_enable(mask: u8) -> u32 {
        (mask as u32) & 0xF
    }

    pub const fn sm_restart(mask: u8) -> u32 {
        ((mask as u32) & 0xF) << 4
    }

    pub const fn clkdiv_restart(mask: u8) -> u32 {
        ((mask as u32) & 0xF) << 8
    }
}

/// Packs a 16.8 fixed-point clock divider into SMn_CLKDIV.
pub const fn clkdiv(int: u16, frac: u8) -> u32 {
    (int as u32) << 16 | (frac as u32) << 8
}

pub mod execctrl {
    pub const SIDE_EN: u32 = 1 << 30;
    pub const SIDE_PINDIR: u32 = 1 << 29;

    /// Wrap bounds are absolute instruction memory addresses.
    pub const fn wrap(bottom: u8, top: u8) -> u32 {
        ((top as u32) & 0x1F) << 12 | ((bottom as u32) & 0x1F) << 7
    }

    pub const fn wrap_top(bits: u32) -> u8 {
        ((bits >> 12) & 0x1F) as u8
    }

    pub const fn wrap_bottom(bits: u32) -> u8 {
        ((bits >> 7) & 0x1F) as u8
    }
}

pub mod shiftctrl {
    pub const FJOIN_RX: u32 = 1 << 31;
    pub const FJOIN_TX: u32 = 1 << 30;
    pub const OUT_SHIFTDIR_RIGHT: u32 = 1 << 19;
    pub const IN_SHIFTDIR_RIGHT: u32 = 1 << 18;
    pub const AUTOPULL: u32 = 1 << 17;
    pub const AUTOPUSH: u32 = 1 << 16;

    /// Pull threshold in bits, 1 through 32. The register encodes 32 as 0.
    pub const fn pull_threshold(bits: u8) -> u32 {
        ((bits as u32) & 0x1F) << 25
    }

    pub const fn push_threshold(bits: u8) -> u32 {
        ((bits as u32) & 0x1F) << 20
    }
}

/// Pin mapping for one state machine, encoded into SMn_PINCTRL.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PinCtrl {
    /// Includes the enable bit when side-set is optional.
    pub sideset_count: u8,
    pub set_count: u8,
    pub out_count: u8,
    pub in_base: u8,
    pub sideset_base: u8,
    pub set_base: u8,
    pub out_base: u8,
}

impl PinCtrl {
    pub const fn bits(&self) -> u32 {
        ((self.sideset_count as u32) & 0x7) << 29
            | ((self.set_count as u32) & 0x7) << 26
            | ((self.out_count as u32) & 0x3F) << 20
            | ((self.in_base as u32) & 0x1F) << 15
            | ((self.sideset_base as u32) & 0x1F) << 10
            | ((self.set_base as u32) & 0x1F) << 5
            | ((self.out_base as u32) & 0x1F)
    }
}

/// Instructions executed through SMn_INSTR during setup.
///
/// They carry no side-set or delay, so the encoding is the same whatever
/// side-set configuration the state machine has.
pub mod instr {
    use pio::{Instruction, InstructionOperands, JmpCondition, SetDestination, SideSet};

    fn encode(operands: InstructionOperands) -> u16 {
        Instruction {
            operands,
            delay: 0,
            side_set: None,
        }
        .encode(SideSet::new(false, 0, false))
    }

    /// `set pindirs, <value>`
    pub fn set_pindirs(value: u8) -> u16 {
        encode(InstructionOperands::SET {
            destination: SetDestination::PINDIRS,
            data: value,
        })
    }

    /// `set pins, <value>`
    pub fn set_pins(value: u8) -> u16 {
        encode(InstructionOperands::SET {
            destination: SetDestination::PINS,
            data: value,
        })
    }

    /// `jmp <addr>`
    pub fn jmp(addr: u8) -> u16 {
        encode(InstructionOperands::JMP {
            condition: JmpCondition::Always,
            address: addr,
        })
    }
}
