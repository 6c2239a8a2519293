//! Variable frame time to fixed simulation steps

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// Accumulates elapsed frame time and hands out whole `SIM_DT` steps
#[derive(Debug, Clone, Default)]
pub struct FixedStep {
    accumulator: f32,
}

impl FixedStep {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a frame's elapsed time; returns how many steps to run now
    pub fn advance(&mut self, frame_dt: f32) -> u32 {
        let dt = frame_dt.clamp(0.0, MAX_FRAME_DT);
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }

        // Drop the backlog rather than fall further behind
        if steps == MAX_SUBSTEPS {
            self.accumulator = self.accumulator.min(SIM_DT);
        }

        steps
    }

    /// Unconsumed time carried to the next frame
    pub fn remainder(&self) -> f32 {
        self.accumulator
    }

    /// Forget carried time, e.g. after the window lost focus
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_steps_and_remainder() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.advance(SIM_DT * 2.5), 2);
        assert!((clock.remainder() - SIM_DT * 0.5).abs() < 1e-5);
        assert_eq!(clock.advance(SIM_DT * 0.6), 1);
    }

    #[test]
    fn test_substep_cap() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.advance(10.0), MAX_SUBSTEPS);
        assert!(clock.remainder() <= SIM_DT);
    }

    #[test]
    fn test_negative_time_ignored() {
        let mut clock = FixedStep::new();
        assert_eq!(clock.advance(-1.0), 0);
        assert_eq!(clock.remainder(), 0.0);
    }

    #[test]
    fn test_reset_drops_carried_time() {
        let mut clock = FixedStep::new();
        clock.advance(SIM_DT * 0.9);
        clock.reset();
        assert_eq!(clock.remainder(), 0.0);
        assert_eq!(clock.advance(SIM_DT * 0.5), 0);
    }
}
