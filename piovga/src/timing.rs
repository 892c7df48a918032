//! Definition of the display timing.

/// Polarity of a sync pulse, and, by implication, the idle state of the sync
/// signal.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Polarity {
    Positive,
    Negative,
}

impl Polarity {
    /// Level the sync pin rests at outside the pulse.
    pub fn idle_level(self) -> bool {
        self == Polarity::Negative
    }
}

/// Timing parameters for a video mode.
///
/// Horizontal values are in pixel clocks, vertical values in lines. The
/// `*_clock_hz` fields are the rates each state machine's program is written
/// to run at; they're independent of the pixel clock because the programs
/// spend different numbers of cycles per unit of work.
#[derive(Clone, Debug)]
pub struct VideoMode {
    /// Visible pixels per line.
    pub width: usize,
    /// Visible lines per frame.
    pub height: usize,
    pub pixel_clock_hz: u32,

    pub h_front_porch: usize,
    pub h_sync: usize,
    pub h_back_porch: usize,
    pub hsync_polarity: Polarity,

    pub v_front_porch: usize,
    pub v_sync: usize,
    pub v_back_porch: usize,
    pub vsync_polarity: Polarity,

    /// HSYNC counts one cycle per pixel.
    pub hsync_clock_hz: u32,
    /// VSYNC runs at the system clock so it never misses a line-end flag.
    pub vsync_clock_hz: u32,
    /// COLOR spends four cycles on each pixel.
    pub color_clock_hz: u32,
}

impl VideoMode {
    /// Bytes in a packed 1bpp frame.
    pub const fn frame_bytes(&self) -> usize {
        (self.width * self.height + 7) / 8
    }

    /// Total pixel clocks per line, including blanking.
    pub const fn line_pixels(&self) -> usize {
        self.width + self.h_front_porch + self.h_sync + self.h_back_porch
    }

    /// Total lines per frame, including the vertical blanking interval.
    pub const fn frame_lines(&self) -> usize {
        self.height + self.v_front_porch + self.v_sync + self.v_back_porch
    }

    /// Word pushed to HSYNC: cycles of high time before the sync pulse, less
    /// one for the `jmp x--` that consumes zero.
    pub const fn hsync_init_word(&self) -> u32 {
        (self.width + self.h_front_porch - 1) as u32
    }

    /// Word pushed to VSYNC: the active line count, less one.
    pub const fn vsync_init_word(&self) -> u32 {
        (self.height - 1) as u32
    }

    /// Word pushed to COLOR: pixels per line, less one.
    pub const fn color_init_word(&self) -> u32 {
        (self.width - 1) as u32
    }

    /// Refresh rate in millihertz.
    pub const fn refresh_mhz(&self) -> u32 {
        let frame_clocks = (self.line_pixels() * self.frame_lines()) as u64;
        (self.pixel_clock_hz as u64 * 1000 / frame_clocks) as u32
    }
}

/// Industry standard 640x480 60Hz timing.
pub const VGA_640_480: VideoMode = VideoMode {
    width: 640,
    height: 480,
    pixel_clock_hz: 25_175_000,

    h_front_porch: 16,
    h_sync: 96,
    h_back_porch: 48,
    hsync_polarity: Polarity::Negative,

    v_front_porch: 10,
    v_sync: 2,
    v_back_porch: 33,
    vsync_polarity: Polarity::Negative,

    hsync_clock_hz: 25_175_000,
    vsync_clock_hz: 125_000_000,
    color_clock_hz: 100_700_000,
};

/// A state machine clock divider in 16.8 fixed point.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct ClockDivider {
    pub int: u16,
    pub frac: u8,
}

impl ClockDivider {
    /// Computes the divider that brings `sys_hz` closest to `target_hz`
    /// without going over.
    ///
    /// Returns `None` if the target is faster than the system clock or slower
    /// than the largest divider can reach.
    pub fn from_frequencies(sys_hz: u32, target_hz: u32) -> Option<Self> {
        if target_hz == 0 {
            return None;
        }
        let fixed = (u64::from(sys_hz) << 8) / u64::from(target_hz);
        let int = fixed >> 8;
        if int == 0 || int > u64::from(u16::MAX) {
            return None;
        }
        Some(ClockDivider {
            int: int as u16,
            frac: fixed as u8,
        })
    }

    /// Resulting state machine clock, rounded down.
    pub fn output_hz(self, sys_hz: u32) -> u32 {
        let fixed = u64::from(self.int) << 8 | u64::from(self.frac);
        ((u64::from(sys_hz) << 8) / fixed) as u32
    }
}
