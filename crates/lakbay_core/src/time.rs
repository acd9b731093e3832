/// Fixed-timestep accumulator. Frame deltas feed the accumulator and
/// `should_step` hands out whole `fixed_dt` slices.
pub struct TimeState {
    pub fixed_dt: f64,
    pub max_accumulator: f64,
    accumulator: f64,
    pub total_time: f64,
    pub fixed_step_count: u64,
    pub frame_count: u64,
    pub steps_this_frame: u32,
    pub real_dt: f64,
    pub interpolation_alpha: f64,
}

impl TimeState {
    pub fn new(fixed_dt: f64) -> Self {
        Self {
            fixed_dt,
            max_accumulator: 0.25,
            accumulator: 0.0,
            total_time: 0.0,
            fixed_step_count: 0,
            frame_count: 0,
            steps_this_frame: 0,
            real_dt: 0.0,
            interpolation_alpha: 0.0,
        }
    }

    /// Start a frame with an explicit delta, so headless runs and replays do
    /// not depend on how fast the machine is.
    pub fn begin_frame_with(&mut self, real_dt: f64) {
        self.real_dt = real_dt;

        // Spiral-of-death cap
        if self.real_dt > self.max_accumulator {
            log::warn!(
                "Frame took {:.1}ms, capping accumulator to {}ms",
                self.real_dt * 1000.0,
                self.max_accumulator * 1000.0
            );
            self.real_dt = self.max_accumulator;
        }

        self.accumulator += self.real_dt;
        self.steps_this_frame = 0;
        self.frame_count += 1;
    }

    pub fn should_step(&mut self) -> bool {
        // Tolerance absorbs float error when the frame delta equals fixed_dt.
        if self.accumulator + 1e-9 >= self.fixed_dt {
            self.accumulator = (self.accumulator - self.fixed_dt).max(0.0);
            self.total_time += self.fixed_dt;
            self.fixed_step_count += 1;
            self.steps_this_frame += 1;
            true
        } else {
            false
        }
    }

    pub fn end_frame(&mut self) {
        self.interpolation_alpha = self.accumulator / self.fixed_dt;
    }
}

impl Default for TimeState {
    fn default() -> Self {
        Self::new(1.0 / 60.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_fixed_frame_yields_one_step() {
        let mut time = TimeState::new(1.0 / 60.0);
        time.begin_frame_with(1.0 / 60.0);
        assert!(time.should_step());
        assert!(!time.should_step());
        time.end_frame();
        assert_eq!(time.steps_this_frame, 1);
        assert_eq!(time.fixed_step_count, 1);
    }

    #[test]
    fn short_frames_accumulate_until_a_step_is_due() {
        let mut time = TimeState::new(0.1);
        time.begin_frame_with(0.06);
        assert!(!time.should_step());
        time.end_frame();
        assert!((time.interpolation_alpha - 0.6).abs() < 1e-6);

        time.begin_frame_with(0.06);
        assert!(time.should_step());
        assert!(!time.should_step());
        assert_eq!(time.frame_count, 2);
    }

    #[test]
    fn long_frames_are_capped() {
        let mut time = TimeState::new(0.05);
        time.begin_frame_with(10.0);
        assert!((time.real_dt - time.max_accumulator).abs() < 1e-9);
        let mut steps = 0;
        while time.should_step() {
            steps += 1;
        }
        assert_eq!(steps, 5);
    }
}
