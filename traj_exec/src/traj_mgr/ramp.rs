//! # Speed ramp
//!
//! Bounds the change of the issued speed to a fixed step per tick.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A fixed step speed ramp.
#[derive(Debug, Copy, Clone, Default, Serialize)]
pub struct SpeedRamp {
    /// Maximum change of the issued speed per tick.
    step: i32,

    /// The speed issued on the previous tick.
    last_issued: i32
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl SpeedRamp {
    /// Create a ramp at rest. A negative step is taken by magnitude.
    pub fn new(step: i32) -> Self {
        Self {
            step: step.saturating_abs(),
            last_issued: 0
        }
    }

    /// Move the issued speed one step towards `consign` and return it.
    ///
    /// The final step is shortened so the consign is never overshot.
    pub fn do_ramp(&mut self, consign: i32) -> i32 {
        self.last_issued = if consign > self.last_issued {
            self.last_issued.saturating_add(self.step).min(consign)
        }
        else {
            self.last_issued.saturating_sub(self.step).max(consign)
        };

        self.last_issued
    }

    /// The speed issued on the previous tick.
    pub fn last_issued(&self) -> i32 {
        self.last_issued
    }

    /// Bring the ramp back to rest.
    pub fn reset(&mut self) {
        self.last_issued = 0;
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_ramp_up_and_down() {
        let mut ramp = SpeedRamp::new(20);

        let up: Vec<i32> = (0..4).map(|_| ramp.do_ramp(50)).collect();
        assert_eq!(up, vec![20, 40, 50, 50]);

        let down: Vec<i32> = (0..4).map(|_| ramp.do_ramp(-10)).collect();
        assert_eq!(down, vec![30, 10, -10, -10]);

        assert_eq!(ramp.last_issued(), -10);
        ramp.reset();
        assert_eq!(ramp.last_issued(), 0);
    }

    #[test]
    fn test_ramp_zero_step() {
        let mut ramp = SpeedRamp::new(0);
        assert_eq!(ramp.do_ramp(100), 0);
    }
}
