//! The two-channel DMA loop that feeds the COLOR state machine.
//!
//! The streaming channel copies the frame, a byte at a time, into the COLOR
//! TX FIFO, paced by that FIFO's DREQ. When it finishes it chains to the
//! activator, which copies one word, the frame's address, into the streaming
//! channel's READ_ADDR trigger alias. That rewinds and restarts the streaming
//! channel, and the cycle repeats forever with no CPU involvement.
//!
//! The activator chains to itself, which on this DMA controller means "don't
//! chain"; it's restarted only by the streaming channel.

use crate::config::VgaConfig;
use crate::error::{Error, Resource};
use crate::hw::dma::{ChannelRegisters, TREQ_PERMANENT};
use crate::hw::{bus_address, CtrlWord, DataSize, DmaRegisters, Hardware, PioBlock};
use crate::program::ProgramKind;

/// Register contents for one channel.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DmaChannelConfig {
    pub channel: u8,
    pub read_addr: u32,
    pub write_addr: u32,
    pub trans_count: u32,
    pub ctrl: CtrlWord,
}

impl DmaChannelConfig {
    fn registers<'a>(&self, dma: &'a DmaRegisters) -> &'a ChannelRegisters {
        &dma.ch[usize::from(self.channel)]
    }

    /// Writes the configuration through non-triggering registers, so the
    /// channel is armed but not started.
    ///
    /// # Safety
    ///
    /// The caller must own the channel.
    unsafe fn apply(&self, dma: &DmaRegisters) {
        let ch = self.registers(dma);
        ch.read_addr.write(self.read_addr);
        ch.write_addr.write(self.write_addr);
        ch.trans_count.write(self.trans_count);
        ch.al2_ctrl.write(self.ctrl.bits());
    }
}

/// Both channels of the loop.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct DmaChain {
    pub streaming: DmaChannelConfig,
    pub activator: DmaChannelConfig,
}

impl DmaChain {
    /// One bit per channel, as used by MULTI_CHAN_TRIGGER and CHAN_ABORT.
    pub fn channel_mask(&self) -> u32 {
        1 << self.streaming.channel | 1 << self.activator.channel
    }

    fn channels(&self) -> [&DmaChannelConfig; 2] {
        [&self.streaming, &self.activator]
    }
}

/// Where the chain reads the frame from.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct FrameSource {
    /// Bus address of the first pixel byte.
    pub base: u32,
    /// Bytes per frame.
    pub len: u32,
    /// Bus address of a word containing `base`.
    pub base_word: u32,
}

/// Control word for the streaming channel: bytes from incrementing memory to
/// a fixed FIFO, paced by the COLOR state machine, chaining to the activator.
pub fn streaming_ctrl(block: PioBlock, activator: u8) -> CtrlWord {
    CtrlWord::new()
        .with_enable(true)
        .with_high_priority(true)
        .with_data_size(DataSize::Byte)
        .with_incr_read(true)
        .with_incr_write(false)
        .with_chain_to(activator)
        .with_treq_sel(block.tx_dreq(ProgramKind::Color.slot()))
}

/// Control word for the activator: one unpaced word between fixed addresses,
/// chained to itself.
pub fn activator_ctrl(activator: u8) -> CtrlWord {
    CtrlWord::new()
        .with_enable(true)
        .with_high_priority(true)
        .with_data_size(DataSize::Word)
        .with_incr_read(false)
        .with_incr_write(false)
        .with_chain_to(activator)
        .with_treq_sel(TREQ_PERMANENT)
}

/// Works out both channels' registers for streaming `frame` to `block`.
pub fn plan(hw: &Hardware<'_>, block: PioBlock, config: &VgaConfig, frame: FrameSource) -> DmaChain {
    let color_fifo = &hw.pio(block).txf[ProgramKind::Color.slot()];
    let restart = &hw.dma.ch[usize::from(config.streaming_channel)].al3_read_addr_trig;
    DmaChain {
        streaming: DmaChannelConfig {
            channel: config.streaming_channel,
            read_addr: frame.base,
            write_addr: bus_address(color_fifo),
            trans_count: frame.len,
            ctrl: streaming_ctrl(block, config.activator_channel),
        },
        activator: DmaChannelConfig {
            channel: config.activator_channel,
            read_addr: frame.base_word,
            write_addr: bus_address(restart),
            trans_count: 1,
            ctrl: activator_ctrl(config.activator_channel),
        },
    }
}

/// Fails if either channel is mid-transfer on someone else's behalf.
pub fn ensure_idle(dma: &DmaRegisters, chain: &DmaChain) -> Result<(), Error> {
    for cfg in &chain.channels() {
        let ctrl = CtrlWord::from_bits(cfg.registers(dma).ctrl_trig.read());
        if ctrl.is_busy() {
            return Err(Error::ResourceExhausted(Resource::DmaChannel(cfg.channel)));
        }
    }
    Ok(())
}

/// Programs both channels without starting either.
pub fn configure(dma: &DmaRegisters, chain: &DmaChain) {
    // Safety: the driver owns both channels for the session.
    unsafe {
        chain.streaming.apply(dma);
        chain.activator.apply(dma);
    }
}

/// Starts the loop by kicking the activator, which loads and starts the
/// streaming channel.
pub fn trigger(dma: &DmaRegisters, chain: &DmaChain) {
    // Safety: as above.
    unsafe { dma.multi_chan_trigger.write(1 << chain.activator.channel) }
}

/// Stops both channels immediately. A frame in progress is abandoned.
pub fn abort(dma: &DmaRegisters, chain: &DmaChain) {
    // Safety: as above.
    unsafe {
        // Disable first, so an abort can't complete the streaming channel
        // and set off its chain.
        for cfg in &chain.channels() {
            cfg.registers(dma)
                .al1_ctrl
                .write(cfg.ctrl.with_enable(false).bits());
        }
        dma.chan_abort.write(chain.channel_mask());
    }
}

/// Reads back both channels' bus error flags.
pub fn check_faults(dma: &DmaRegisters, chain: &DmaChain) -> Result<(), Error> {
    for cfg in &chain.channels() {
        let ctrl = CtrlWord::from_bits(cfg.registers(dma).ctrl_trig.read());
        if ctrl.has_error() {
            return Err(Error::HardwareFault {
                channel: cfg.channel,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::SimulatedHardware;

    const FRAME: FrameSource = FrameSource {
        base: 0x2000_1000,
        len: 38400,
        base_word: 0x2000_A600,
    };

    #[test]
    fn streaming_control_words() {
        assert_eq!(streaming_ctrl(PioBlock::Pio0, 10).bits(), 0x0001_5013);
        assert_eq!(streaming_ctrl(PioBlock::Pio1, 10).bits(), 0x0005_5013);
        assert_eq!(streaming_ctrl(PioBlock::Pio0, 10).treq_sel(), 2);
        assert_eq!(streaming_ctrl(PioBlock::Pio1, 10).treq_sel(), 10);
    }

    #[test]
    fn activator_control_word() {
        let c = activator_ctrl(10);
        assert_eq!(c.bits(), 0x001F_D00B);
        assert_eq!(c.treq_sel(), TREQ_PERMANENT);
        assert_eq!(c.chain_to(), 10);
        assert!(!c.incr_read() && !c.incr_write());
    }

    #[test]
    fn plan_closes_the_loop() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let config = VgaConfig {
            streaming_channel: 3,
            activator_channel: 7,
            ..VgaConfig::default()
        };
        let chain = plan(&hw, PioBlock::Pio1, &config, FRAME);

        let s = &chain.streaming;
        assert_eq!(s.channel, 3);
        assert_eq!(s.read_addr, FRAME.base);
        assert_eq!(s.write_addr, bus_address(&sim.pio(PioBlock::Pio1).txf[2]));
        assert_eq!(s.trans_count, 38400);
        assert_eq!(s.ctrl.chain_to(), 7);
        assert_eq!(s.ctrl.data_size_bits(), DataSize::Byte as u8);

        let a = &chain.activator;
        assert_eq!(a.channel, 7);
        assert_eq!(a.read_addr, FRAME.base_word);
        assert_eq!(a.write_addr, bus_address(&sim.dma().ch[3].al3_read_addr_trig));
        assert_eq!(a.trans_count, 1);
        assert_eq!(a.ctrl.data_size_bits(), DataSize::Word as u8);

        assert_eq!(chain.channel_mask(), 1 << 3 | 1 << 7);
    }

    #[test]
    fn configure_does_not_trigger() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let chain = plan(&hw, PioBlock::Pio0, &VgaConfig::default(), FRAME);
        configure(hw.dma, &chain);

        let ch = &sim.dma().ch[11];
        assert_eq!(ch.read_addr.read(), FRAME.base);
        assert_eq!(ch.trans_count.read(), 38400);
        assert_eq!(ch.al2_ctrl.read(), 0x0001_5013);
        assert_eq!(ch.ctrl_trig.read(), 0);
        assert_eq!(sim.dma().ch[10].al2_ctrl.read(), 0x001F_D00B);
        assert_eq!(sim.dma().multi_chan_trigger.read(), 0);

        trigger(hw.dma, &chain);
        assert_eq!(sim.dma().multi_chan_trigger.read(), 1 << 10);
    }

    #[test]
    fn busy_channel_is_reported() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let chain = plan(&hw, PioBlock::Pio0, &VgaConfig::default(), FRAME);
        assert_eq!(ensure_idle(hw.dma, &chain), Ok(()));
        sim.mark_busy(10);
        assert_eq!(
            ensure_idle(hw.dma, &chain),
            Err(Error::ResourceExhausted(Resource::DmaChannel(10)))
        );
    }

    #[test]
    fn abort_disables_then_aborts_both() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let chain = plan(&hw, PioBlock::Pio0, &VgaConfig::default(), FRAME);
        configure(hw.dma, &chain);
        abort(hw.dma, &chain);
        assert_eq!(sim.dma().chan_abort.read(), 1 << 10 | 1 << 11);
        for &n in &[10, 11] {
            let c = CtrlWord::from_bits(sim.dma().ch[n].al1_ctrl.read());
            assert!(!c.is_enabled());
        }
    }

    #[test]
    fn faults_are_read_back() {
        let sim = SimulatedHardware::new();
        let hw = sim.hardware();
        let chain = plan(&hw, PioBlock::Pio0, &VgaConfig::default(), FRAME);
        assert_eq!(check_faults(hw.dma, &chain), Ok(()));
        sim.inject_bus_error(11);
        assert_eq!(
            check_faults(hw.dma, &chain),
            Err(Error::HardwareFault { channel: 11 })
        );
    }
}
