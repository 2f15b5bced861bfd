//! Mock sensor sources
//!
//! For development and tests without device hardware.

use std::collections::VecDeque;
use std::path::PathBuf;

use contracts::{CoreError, FrameSource, MotionReading, MotionSource, PositionFix, PositionSource, SpeedLimitLookup};

/// Deterministic motion source
///
/// Emits a gentle waveform around 1g vertical; can simulate read failures.
pub struct MockMotionSource {
    tick: u64,
    fail_every: Option<u64>,
}

impl MockMotionSource {
    /// Always-succeeding source
    pub fn steady() -> Self {
        Self {
            tick: 0,
            fail_every: None,
        }
    }

    /// Fail (return `None`) every `n`-th read
    pub fn failing_every(n: u64) -> Self {
        Self {
            tick: 0,
            fail_every: Some(n.max(1)),
        }
    }
}

impl MotionSource for MockMotionSource {
    fn read(&mut self) -> Option<MotionReading> {
        self.tick += 1;
        if let Some(n) = self.fail_every {
            if self.tick % n == 0 {
                return None;
            }
        }

        let phase = self.tick as f64 * 0.1;
        Some(MotionReading {
            acc_x: 0.05 * phase.sin(),
            acc_y: 0.05 * phase.cos(),
            acc_z: 1.0 + 0.02 * (phase * 2.0).sin(),
            gyro_x: 0.01 * phase.cos(),
            gyro_y: 0.01 * phase.sin(),
            gyro_z: 0.0,
        })
    }
}

/// Position source with a fixed location and optional warm-up window
pub struct MockPositionSource {
    fix: Option<PositionFix>,
    warm_up_reads: u64,
    tick: u64,
}

impl MockPositionSource {
    /// Immediate fix at the given coordinates
    pub fn fixed(latitude: f64, longitude: f64, speed: f64) -> Self {
        Self {
            fix: Some(PositionFix {
                latitude,
                longitude,
                speed,
            }),
            warm_up_reads: 0,
            tick: 0,
        }
    }

    /// Never produces a fix (receiver cold, no satellite lock)
    pub fn no_fix() -> Self {
        Self {
            fix: None,
            warm_up_reads: 0,
            tick: 0,
        }
    }

    /// Produce `None` for the first `reads` reads, then the fix
    pub fn with_warm_up(mut self, reads: u64) -> Self {
        self.warm_up_reads = reads;
        self
    }
}

impl PositionSource for MockPositionSource {
    fn read(&mut self) -> Option<PositionFix> {
        self.tick += 1;
        if self.tick <= self.warm_up_reads {
            return None;
        }
        self.fix
    }
}

/// Frame source cycling through a fixed list of image paths
pub struct MockFrameSource {
    frames: VecDeque<PathBuf>,
    cycle: bool,
}

impl MockFrameSource {
    /// Never produces a frame (capture disabled/failed)
    pub fn none() -> Self {
        Self {
            frames: VecDeque::new(),
            cycle: false,
        }
    }

    /// Produce the given paths once, in order, then `None`
    pub fn once(frames: Vec<PathBuf>) -> Self {
        Self {
            frames: frames.into(),
            cycle: false,
        }
    }

    /// Cycle through the given paths forever
    pub fn cycling(frames: Vec<PathBuf>) -> Self {
        Self {
            frames: frames.into(),
            cycle: true,
        }
    }
}

impl FrameSource for MockFrameSource {
    fn latest_frame(&mut self) -> Option<PathBuf> {
        let frame = self.frames.pop_front()?;
        if self.cycle {
            self.frames.push_back(frame.clone());
        }
        Some(frame)
    }
}

/// Constant speed-limit answer
pub struct FixedSpeedLimit(pub Option<f64>);

impl SpeedLimitLookup for FixedSpeedLimit {
    async fn lookup(&self, _latitude: f64, _longitude: f64) -> Result<Option<f64>, CoreError> {
        Ok(self.0)
    }
}
