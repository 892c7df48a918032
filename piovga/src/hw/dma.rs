//! DMA controller registers.

use volatile_register::RW;

/// Physical address of the DMA register block.
pub const DMA_BASE: usize = 0x5000_0000;

/// Number of DMA channels.
pub const CHANNELS: usize = 12;

/// TREQ_SEL value meaning "unpaced": the channel transfers as fast as the bus
/// allows.
pub const TREQ_PERMANENT: u8 = 0x3F;

/// One channel's register window.
///
/// The four alias groups expose the same four registers in different orders.
/// The last register of each group is a trigger: writing it also starts the
/// channel. `al2_ctrl` is *not* a trigger, which makes it the place to write a
/// control word without starting anything.
#[repr(C)]
pub struct ChannelRegisters {
    pub read_addr: RW<u32>,
    pub write_addr: RW<u32>,
    pub trans_count: RW<u32>,
    pub ctrl_trig: RW<u32>,

    pub al1_ctrl: RW<u32>,
    pub al1_read_addr: RW<u32>,
    pub al1_write_addr: RW<u32>,
    pub al1_trans_count_trig: RW<u32>,

    pub al2_ctrl: RW<u32>,
    pub al2_trans_count: RW<u32>,
    pub al2_read_addr: RW<u32>,
    pub al2_write_addr_trig: RW<u32>,

    pub al3_ctrl: RW<u32>,
    pub al3_write_addr: RW<u32>,
    pub al3_trans_count: RW<u32>,
    pub al3_read_addr_trig: RW<u32>,
}

#[repr(C)]
pub struct DmaRegisters {
    pub ch: [ChannelRegisters; CHANNELS],
    _reserved0: [u32; 64],
    pub intr: RW<u32>,
    pub inte0: RW<u32>,
    pub intf0: RW<u32>,
    pub ints0: RW<u32>,
    _reserved1: u32,
    pub inte1: RW<u32>,
    pub intf1: RW<u32>,
    pub ints1: RW<u32>,
    pub timer: [RW<u32>; 4],
    pub multi_chan_trigger: RW<u32>,
    pub sniff_ctrl: RW<u32>,
    pub sniff_data: RW<u32>,
    _reserved2: u32,
    pub fifo_levels: RW<u32>,
    pub chan_abort: RW<u32>,
    pub n_channels: RW<u32>,
}

/// Transfer unit size, as encoded in the DATA_SIZE field.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[repr(u8)]
pub enum DataSize {
    Byte = 0,
    HalfWord = 1,
    Word = 2,
}

/// A DMA channel control word.
///
/// Builder methods consume and return the word, so a full configuration reads
/// as a single expression:
///
/// ```
/// use piovga::hw::dma::{CtrlWord, DataSize};
/// let ctrl = CtrlWord::new()
///     .with_enable(true)
///     .with_data_size(DataSize::Word)
///     .with_chain_to(3);
/// assert_eq!(ctrl.chain_to(), 3);
/// ```
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[repr(transparent)]
pub struct CtrlWord(u32);

impl CtrlWord {
    pub const AHB_ERROR: u32 = 1 << 31;
    pub const READ_ERROR: u32 = 1 << 30;
    pub const WRITE_ERROR: u32 = 1 << 29;
    pub const BUSY: u32 = 1 << 24;
    pub const SNIFF_EN: u32 = 1 << 23;
    pub const BSWAP: u32 = 1 << 22;
    pub const IRQ_QUIET: u32 = 1 << 21;
    const TREQ_SEL_SHIFT: u32 = 15;
    const TREQ_SEL_MASK: u32 = 0x3F;
    const CHAIN_TO_SHIFT: u32 = 11;
    const CHAIN_TO_MASK: u32 = 0xF;
    pub const RING_SEL: u32 = 1 << 10;
    const RING_SIZE_SHIFT: u32 = 6;
    const RING_SIZE_MASK: u32 = 0xF;
    pub const INCR_WRITE: u32 = 1 << 5;
    pub const INCR_READ: u32 = 1 << 4;
    const DATA_SIZE_SHIFT: u32 = 2;
    const DATA_SIZE_MASK: u32 = 0x3;
    pub const HIGH_PRIORITY: u32 = 1 << 1;
    pub const EN: u32 = 1 << 0;

    /// An all-zeroes control word: disabled, byte-sized, unpaced by nothing
    /// (TREQ 0), chaining to channel 0.
    pub const fn new() -> Self {
        CtrlWord(0)
    }

    pub const fn from_bits(bits: u32) -> Self {
        CtrlWord(bits)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    const fn with_flag(self, flag: u32, on: bool) -> Self {
        if on {
            CtrlWord(self.0 | flag)
        } else {
            CtrlWord(self.0 & !flag)
        }
    }

    const fn with_field(self, shift: u32, mask: u32, value: u32) -> Self {
        CtrlWord((self.0 & !(mask << shift)) | ((value & mask) << shift))
    }

    const fn field(self, shift: u32, mask: u32) -> u32 {
        (self.0 >> shift) & mask
    }

    pub const fn with_enable(self, on: bool) -> Self {
        self.with_flag(Self::EN, on)
    }

    pub const fn with_high_priority(self, on: bool) -> Self {
        self.with_flag(Self::HIGH_PRIORITY, on)
    }

    pub const fn with_data_size(self, size: DataSize) -> Self {
        self.with_field(Self::DATA_SIZE_SHIFT, Self::DATA_SIZE_MASK, size as u32)
    }

    pub const fn with_incr_read(self, on: bool) -> Self {
        self.with_flag(Self::INCR_READ, on)
    }

    pub const fn with_incr_write(self, on: bool) -> Self {
        self.with_flag(Self::INCR_WRITE, on)
    }

    pub const fn with_ring(self, size: u8, on_write: bool) -> Self {
        self.with_field(Self::RING_SIZE_SHIFT, Self::RING_SIZE_MASK, size as u32)
            .with_flag(Self::RING_SEL, on_write)
    }

    /// Channel to trigger when this one completes. Chaining a channel to
    /// itself disables chaining.
    pub const fn with_chain_to(self, channel: u8) -> Self {
        self.with_field(Self::CHAIN_TO_SHIFT, Self::CHAIN_TO_MASK, channel as u32)
    }

    /// Transfer request signal that paces this channel; see
    /// [`TREQ_PERMANENT`].
    pub const fn with_treq_sel(self, treq: u8) -> Self {
        self.with_field(Self::TREQ_SEL_SHIFT, Self::TREQ_SEL_MASK, treq as u32)
    }

    pub const fn with_irq_quiet(self, on: bool) -> Self {
        self.with_flag(Self::IRQ_QUIET, on)
    }

    pub const fn with_bswap(self, on: bool) -> Self {
        self.with_flag(Self::BSWAP, on)
    }

    pub const fn with_sniff(self, on: bool) -> Self {
        self.with_flag(Self::SNIFF_EN, on)
    }

    pub const fn is_enabled(self) -> bool {
        self.0 & Self::EN != 0
    }

    pub const fn is_high_priority(self) -> bool {
        self.0 & Self::HIGH_PRIORITY != 0
    }

    /// Raw DATA_SIZE field.
    pub const fn data_size_bits(self) -> u8 {
        self.field(Self::DATA_SIZE_SHIFT, Self::DATA_SIZE_MASK) as u8
    }

    pub const fn incr_read(self) -> bool {
        self.0 & Self::INCR_READ != 0
    }

    pub const fn incr_write(self) -> bool {
        self.0 & Self::INCR_WRITE != 0
    }

    pub const fn ring_size(self) -> u8 {
        self.field(Self::RING_SIZE_SHIFT, Self::RING_SIZE_MASK) as u8
    }

    pub const fn chain_to(self) -> u8 {
        self.field(Self::CHAIN_TO_SHIFT, Self::CHAIN_TO_MASK) as u8
    }

    pub const fn treq_sel(self) -> u8 {
        self.field(Self::TREQ_SEL_SHIFT, Self::TREQ_SEL_MASK) as u8
    }

    pub const fn is_busy(self) -> bool {
        self.0 & Self::BUSY != 0
    }

    /// Checks the read-only bus error flags.
    pub const fn has_error(self) -> bool {
        self.0 & (Self::AHB_ERROR | Self::READ_ERROR | Self::WRITE_ERROR) != 0
    }
}

impl From<CtrlWord> for u32 {
    fn from(c: CtrlWord) -> u32 {
        c.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::{offset_of, size_of};

    #[test]
    fn channel_layout() {
        assert_eq!(size_of::<ChannelRegisters>(), 0x40);
        assert_eq!(offset_of!(ChannelRegisters, read_addr), 0x00);
        assert_eq!(offset_of!(ChannelRegisters, write_addr), 0x04);
        assert_eq!(offset_of!(ChannelRegisters, trans_count), 0x08);
        assert_eq!(offset_of!(ChannelRegisters, ctrl_trig), 0x0C);
        assert_eq!(offset_of!(ChannelRegisters, al1_ctrl), 0x10);
        assert_eq!(offset_of!(ChannelRegisters, al2_ctrl), 0x20);
        assert_eq!(offset_of!(ChannelRegisters, al3_ctrl), 0x30);
        assert_eq!(offset_of!(ChannelRegisters, al3_read_addr_trig), 0x3C);
    }

    #[test]
    fn global_layout() {
        assert_eq!(offset_of!(DmaRegisters, intr), 0x400);
        assert_eq!(offset_of!(DmaRegisters, inte1), 0x414);
        assert_eq!(offset_of!(DmaRegisters, timer), 0x420);
        assert_eq!(offset_of!(DmaRegisters, multi_chan_trigger), 0x430);
        assert_eq!(offset_of!(DmaRegisters, sniff_data), 0x438);
        assert_eq!(offset_of!(DmaRegisters, fifo_levels), 0x440);
        assert_eq!(offset_of!(DmaRegisters, chan_abort), 0x444);
        assert_eq!(offset_of!(DmaRegisters, n_channels), 0x448);
    }

    #[test]
    fn fields_land_on_documented_bits() {
        assert_eq!(CtrlWord::new().with_enable(true).bits(), 1);
        assert_eq!(CtrlWord::new().with_high_priority(true).bits(), 1 << 1);
        assert_eq!(CtrlWord::new().with_data_size(DataSize::Word).bits(), 2 << 2);
        assert_eq!(CtrlWord::new().with_incr_read(true).bits(), 1 << 4);
        assert_eq!(CtrlWord::new().with_incr_write(true).bits(), 1 << 5);
        assert_eq!(CtrlWord::new().with_ring(0xF, true).bits(), 0x7C0);
        assert_eq!(CtrlWord::new().with_chain_to(0xF).bits(), 0xF << 11);
        assert_eq!(CtrlWord::new().with_treq_sel(0x3F).bits(), 0x3F << 15);
        assert_eq!(CtrlWord::new().with_irq_quiet(true).bits(), 1 << 21);
        assert_eq!(CtrlWord::new().with_bswap(true).bits(), 1 << 22);
        assert_eq!(CtrlWord::new().with_sniff(true).bits(), 1 << 23);
    }

    #[test]
    fn fields_are_masked_and_replaced() {
        let c = CtrlWord::new().with_chain_to(0x1F).with_treq_sel(0xFF);
        assert_eq!(c.chain_to(), 0xF);
        assert_eq!(c.treq_sel(), 0x3F);
        // Nothing spilled into neighboring fields.
        assert_eq!(c.bits(), (0xF << 11) | (0x3F << 15));

        let c = c.with_chain_to(4).with_treq_sel(2);
        assert_eq!(c.chain_to(), 4);
        assert_eq!(c.treq_sel(), 2);
        assert_eq!(c.with_enable(true).with_enable(false), c);
    }

    #[test]
    fn status_flags() {
        assert!(CtrlWord::from_bits(1 << 24).is_busy());
        assert!(!CtrlWord::from_bits(1 << 24).has_error());
        for bit in 29..32 {
            assert!(CtrlWord::from_bits(1 << bit).has_error());
        }
    }
}
