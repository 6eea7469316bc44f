//! Tick timing utilities

use std::time::{Duration, Instant};

/// Default simulation rate used during development
pub const DEFAULT_TICK_RATE: u32 = 144;

/// Fixed simulation tick rate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickRate {
    ticks_per_second: u32,
}

impl TickRate {
    pub fn new(ticks_per_second: u32) -> Self {
        Self {
            ticks_per_second: ticks_per_second.max(1),
        }
    }

    pub fn ticks_per_second(&self) -> u32 {
        self.ticks_per_second
    }

    /// Wall-clock length of one tick
    pub fn duration(&self) -> Duration {
        Duration::from_micros(1_000_000 / self.ticks_per_second as u64)
    }

    /// Delta time handed to the simulation (in seconds)
    pub fn delta_secs(&self) -> f32 {
        1.0 / self.ticks_per_second as f32
    }
}

impl Default for TickRate {
    fn default() -> Self {
        Self::new(DEFAULT_TICK_RATE)
    }
}

/// A simple timer for measuring durations
#[derive(Debug, Clone)]
pub struct Timer {
    start: Instant,
}

impl Timer {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn reset(&mut self) {
        self.start = Instant::now();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

/// Counts ticks and reports the achieved rate about once per window
#[derive(Debug)]
pub struct FrameRateMeter {
    timer: Timer,
    window: Duration,
    ticks: u32,
}

impl FrameRateMeter {
    pub fn new(window: Duration) -> Self {
        Self {
            timer: Timer::new(),
            window,
            ticks: 0,
        }
    }

    /// Record one tick; returns the measured rate when a window closes
    pub fn record(&mut self) -> Option<f32> {
        self.ticks += 1;
        let elapsed = self.timer.elapsed();
        if elapsed < self.window {
            return None;
        }
        let rate = self.ticks as f32 / elapsed.as_secs_f32();
        self.ticks = 0;
        self.timer.reset();
        Some(rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tick_rate_converts_to_delta_and_duration() {
        let rate = TickRate::new(144);
        assert!((rate.delta_secs() - 1.0 / 144.0).abs() < f32::EPSILON);
        assert_eq!(rate.duration(), Duration::from_micros(6944));
        assert_eq!(TickRate::new(0).ticks_per_second(), 1);
    }

    #[test]
    fn meter_reports_after_window() {
        let mut meter = FrameRateMeter::new(Duration::ZERO);
        let rate = meter.record();
        assert!(rate.is_some());
    }
}
