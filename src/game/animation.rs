//! Time-quantized animation playback

/// How a sequence behaves once its last frame has been held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    /// Wrap back to the first frame
    Looping,
    /// Report completion and let the owner decide what comes next
    OneShot,
}

/// Result of a single clock tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockStep {
    /// Still holding the current frame
    Held,
    /// Moved on to the next frame
    Advanced,
    /// A one-shot sequence ran past its last frame
    Completed,
}

/// Per-entity frame hold counter and frame index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationClock {
    index: usize,
    hold: u32,
    max_hold: u32,
}

impl AnimationClock {
    pub fn new(max_hold: u32) -> Self {
        Self {
            index: 0,
            hold: 0,
            max_hold: max_hold.max(1),
        }
    }

    /// Advance by one tick over a sequence of `len` frames
    pub fn tick(&mut self, len: usize, playback: Playback) -> ClockStep {
        self.hold += 1;
        if self.hold < self.max_hold {
            return ClockStep::Held;
        }

        self.hold = 0;
        self.index += 1;
        match playback {
            Playback::Looping => {
                self.index %= len.max(1);
                ClockStep::Advanced
            }
            Playback::OneShot if self.index >= len => ClockStep::Completed,
            Playback::OneShot => ClockStep::Advanced,
        }
    }

    /// Back to frame zero with a fresh hold counter
    pub fn reset(&mut self) {
        self.index = 0;
        self.hold = 0;
    }

    /// Park on the final frame of a `len`-frame sequence
    pub fn hold_last(&mut self, len: usize) {
        self.index = len.saturating_sub(1);
    }

    /// Jump to a frame with a fresh hold counter
    pub fn seek(&mut self, index: usize) {
        self.index = index;
        self.hold = 0;
    }

    /// Frame index clamped into a `len`-frame sequence
    pub fn frame(&self, len: usize) -> usize {
        self.index % len.max(1)
    }

    /// Raw index, may equal the sequence length right after completion
    pub fn raw_index(&self) -> usize {
        self.index
    }

    pub fn hold(&self) -> u32 {
        self.hold
    }

    /// True when the current frame was just entered
    pub fn at_frame_start(&self) -> bool {
        self.hold == 0
    }
}
