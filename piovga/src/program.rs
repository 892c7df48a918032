//! The three cycle-counted PIO programs that generate the video signal.
//!
//! Each program runs on its own state machine in the same PIO block and owns
//! one pin. They synchronize only through the block's IRQ flags:
//!
//! - HSYNC raises flag 0 once per line, as its back porch ends.
//! - VSYNC counts flag 0 pulses to track the line within the frame, and
//!   re-raises each one as flag 1 during the 480 visible lines.
//! - COLOR waits on flag 1 and then shifts out one line of pixels.
//!
//! The programs are assembled at compile time. Everything about them is
//! timing-critical; the per-line and per-frame cycle budgets are checked by
//! the tests at the bottom of this file, which step the assembled code.

use pio::Program;

use crate::hw::pio::{execctrl, shiftctrl, PinCtrl, INSTR_MEM_WORDS};
use crate::timing::VideoMode;

/// Maximum length of a single program.
pub const PROGRAM_SIZE: usize = 32;

/// The PIO IRQ flags the programs signal each other with: flag 0 marks the
/// start of every line (HSYNC to VSYNC), flag 1 the start of every visible
/// line (VSYNC to COLOR).
pub const IRQ_FLAGS: u32 = 0b11;

/// Which signal a program generates. Also determines the state machine it's
/// bound to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ProgramKind {
    Hsync,
    Vsync,
    Color,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 3] =
        [ProgramKind::Hsync, ProgramKind::Vsync, ProgramKind::Color];

    /// State machine index within the block.
    pub fn slot(self) -> usize {
        match self {
            ProgramKind::Hsync => 0,
            ProgramKind::Vsync => 1,
            ProgramKind::Color => 2,
        }
    }

    /// The one word pushed to the program's TX FIFO before it starts.
    pub fn init_word(self, mode: &VideoMode) -> u32 {
        match self {
            ProgramKind::Hsync => mode.hsync_init_word(),
            ProgramKind::Vsync => mode.vsync_init_word(),
            ProgramKind::Color => mode.color_init_word(),
        }
    }

    /// State machine clock the program's cycle counts assume.
    pub fn clock_hz(self, mode: &VideoMode) -> u32 {
        match self {
            ProgramKind::Hsync => mode.hsync_clock_hz,
            ProgramKind::Vsync => mode.vsync_clock_hz,
            ProgramKind::Color => mode.color_clock_hz,
        }
    }

    /// Level the pin is driven to before the program starts.
    pub fn initial_level(self, mode: &VideoMode) -> bool {
        match self {
            ProgramKind::Hsync => mode.hsync_polarity.idle_level(),
            ProgramKind::Vsync => mode.vsync_polarity.idle_level(),
            ProgramKind::Color => false,
        }
    }
}

/// An assembled program plus the state machine configuration it needs.
pub struct TimingProgram {
    pub kind: ProgramKind,
    pub program: Program<PROGRAM_SIZE>,
    /// Side-set data bits, not counting the enable bit.
    pub sideset_bits: u8,
    pub sideset_optional: bool,
    pub autopull: bool,
    /// In bits, 1 through 32.
    pub pull_threshold: u8,
    pub out_shift_right: bool,
}

impl TimingProgram {
    pub fn code(&self) -> &[u16] {
        &self.program.code
    }

    pub fn len(&self) -> usize {
        self.program.code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.program.code.is_empty()
    }

    /// Wrap target, relative to the start of the program.
    pub fn wrap_target(&self) -> u8 {
        self.program.wrap.target
    }

    /// Wrap source, relative to the start of the program.
    pub fn wrap_source(&self) -> u8 {
        self.program.wrap.source
    }

    /// Width of the PINCTRL SIDESET_COUNT field, which includes the enable
    /// bit of optional side-set.
    pub fn sideset_count(&self) -> u8 {
        self.sideset_bits + self.sideset_optional as u8
    }

    /// The program's instructions with jump targets moved to `offset`.
    pub fn relocated(&self, offset: u8) -> impl Iterator<Item = u16> + '_ {
        self.code().iter().map(move |&i| relocate(i, offset))
    }

    /// SMn_EXECCTRL for the program loaded at `offset`.
    pub fn execctrl(&self, offset: u8) -> u32 {
        let mut bits = execctrl::wrap(
            offset + self.wrap_target(),
            offset + self.wrap_source(),
        );
        if self.sideset_optional {
            bits |= execctrl::SIDE_EN;
        }
        bits
    }

    /// SMn_SHIFTCTRL. TX and RX FIFOs are left unjoined.
    pub fn shiftctrl(&self) -> u32 {
        let mut bits = shiftctrl::pull_threshold(self.pull_threshold)
            | shiftctrl::push_threshold(32);
        if self.autopull {
            bits |= shiftctrl::AUTOPULL;
        }
        if self.out_shift_right {
            bits |= shiftctrl::OUT_SHIFTDIR_RIGHT;
        }
        bits
    }

    /// SMn_PINCTRL with every pin group mapped onto `pin`.
    ///
    /// SET always covers the pin so the driver can force its direction and
    /// idle level before the program runs.
    pub fn pinctrl(&self, pin: u8) -> PinCtrl {
        PinCtrl {
            sideset_count: self.sideset_count(),
            set_count: 1,
            out_count: if self.kind == ProgramKind::Color { 1 } else { 0 },
            in_base: pin,
            sideset_base: pin,
            set_base: pin,
            out_base: pin,
        }
    }
}

/// Adjusts a JMP instruction's target for a program loaded at `offset`.
/// Other instructions pass through.
pub fn relocate(instr: u16, offset: u8) -> u16 {
    const OPCODE_MASK: u16 = 0xE000;
    const ADDR_MASK: u16 = 0x001F;
    if instr & OPCODE_MASK == 0 {
        let target = ((instr & ADDR_MASK) + u16::from(offset)) & ADDR_MASK;
        (instr & !ADDR_MASK) | target
    } else {
        instr
    }
}

/// Horizontal sync.
///
/// Takes the active-plus-front-porch cycle count from its FIFO, counts it
/// down with the pin high, then drives a 96-cycle pulse and a 46-cycle back
/// porch and signals the start of the next line on flag 0. With an init word
/// of 655 a loop is exactly 800 cycles.
pub fn hsync() -> TimingProgram {
    let assembled = pio_proc::pio_asm!(
        "pull block"
        ".wrap_target"
        "    mov x, osr"
        "active:"
        "    jmp x-- active"
        // Sync pulse, 3 x 32 cycles.
        "    set pins, 0 [31]"
        "    set pins, 0 [31]"
        "    set pins, 0 [31]"
        // Back porch, 32 + 14 cycles.
        "    set pins, 1 [31]"
        "    set pins, 1 [13]"
        "    irq 0"
        ".wrap"
    );
    TimingProgram {
        kind: ProgramKind::Hsync,
        program: assembled.program,
        sideset_bits: 0,
        sideset_optional: false,
        autopull: true,
        pull_threshold: 32,
        out_shift_right: false,
    }
}

/// Vertical sync.
///
/// Counts lines by waiting on flag 0. For each of the `init + 1` visible
/// lines it raises flag 1; then 10 front porch lines, 2 lines with the pin
/// low, and 33 back porch lines.
pub fn vsync() -> TimingProgram {
    let assembled = pio_proc::pio_asm!(
        ".side_set 1 opt"
        "pull block"
        ".wrap_target"
        "    mov x, osr"
        "active:"
        "    wait 1 irq 0"
        "    irq 1"
        "    jmp x-- active"
        "    set y, 9"
        "front_porch:"
        "    wait 1 irq 0"
        "    jmp y-- front_porch"
        "    wait 1 irq 0 side 0"
        "    wait 1 irq 0"
        "    set y, 31"
        "back_porch:"
        "    wait 1 irq 0 side 1"
        "    jmp y-- back_porch"
        "    wait 1 irq 0"
        ".wrap"
    );
    TimingProgram {
        kind: ProgramKind::Vsync,
        program: assembled.program,
        sideset_bits: 1,
        sideset_optional: true,
        autopull: true,
        pull_threshold: 32,
        out_shift_right: false,
    }
}

/// Pixel shift-out.
///
/// Takes the pixel count less one from its FIFO, discards the rest of that
/// word, then on every flag 1 shifts out one line MSB first at four cycles
/// per pixel, fed by autopull a byte at a time. The pin is forced low between
/// lines.
pub fn color() -> TimingProgram {
    let assembled = pio_proc::pio_asm!(
        ".side_set 1 opt"
        "pull block"
        "mov y, osr"
        // Empty the OSR so the first pixel comes from the first DMA byte.
        "out null, 32"
        ".wrap_target"
        "    mov x, y side 0"
        "    wait 1 irq 1"
        "pixel:"
        "    out pins, 1"
        "    nop [1]"
        "    jmp x-- pixel"
        ".wrap"
    );
    TimingProgram {
        kind: ProgramKind::Color,
        program: assembled.program,
        sideset_bits: 1,
        sideset_optional: true,
        autopull: true,
        pull_threshold: 8,
        out_shift_right: false,
    }
}

/// The three programs, ordered by state machine.
pub fn all() -> [TimingProgram; 3] {
    [hsync(), vsync(), color()]
}

/// Instruction memory offsets for loading `programs` back to back from
/// address zero.
pub fn load_offsets(programs: &[TimingProgram; 3]) -> [u8; 3] {
    let mut offsets = [0; 3];
    let mut next = 0;
    for (o, p) in offsets.iter_mut().zip(programs) {
        *o = next as u8;
        next += p.len();
    }
    offsets
}
