//! Scene time for the host loop.
//!
//! The engine needs the delta since the previous frame (for easing) and the
//! scene time since start (for the ambient pulse). [`FrameClock`] accumulates
//! scene time from frame deltas, so pausing simply stops the accumulation and
//! a fixed step makes a run fully reproducible.
//!
//! Input timestamps are a different matter: a double tap is two taps close
//! together in real time, whatever the scene clock is doing. Use
//! [`FrameClock::wall_now`] for those.
//!
//! ```ignore
//! let mut clock = FrameClock::new().with_max_step(Duration::from_millis(100));
//!
//! // In your render loop:
//! let frame = clock.tick();
//! scene.update(frame.dt);
//! ```

use std::time::{Duration, Instant};

/// Timing of one frame, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Scene time at the end of this frame.
    pub elapsed: f32,
    /// Scene time that passed during this frame.
    pub dt: f32,
}

/// Accumulated scene time.
#[derive(Debug)]
pub struct FrameClock {
    started: Instant,
    last_tick: Instant,
    scene_time: Duration,
    delta: Duration,
    frames: u64,
    paused: bool,
    /// Advance by exactly this much per tick, ignoring the wall clock.
    fixed_step: Option<Duration>,
    /// Upper bound on one step, so a stalled frame does not teleport particles.
    max_step: Option<Duration>,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            started: now,
            last_tick: now,
            scene_time: Duration::ZERO,
            delta: Duration::ZERO,
            frames: 0,
            paused: false,
            fixed_step: None,
            max_step: None,
        }
    }

    /// Step by a constant amount every tick.
    pub fn with_fixed_step(mut self, step: Duration) -> Self {
        self.fixed_step = Some(step);
        self
    }

    /// Never step by more than `max` in one tick.
    pub fn with_max_step(mut self, max: Duration) -> Self {
        self.max_step = Some(max);
        self
    }

    pub fn set_fixed_step(&mut self, step: Option<Duration>) {
        self.fixed_step = step;
    }

    pub fn set_max_step(&mut self, max: Option<Duration>) {
        self.max_step = max;
    }

    /// Advance one frame. Call once per rendered frame.
    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let wall = now.duration_since(self.last_tick);
        self.last_tick = now;

        self.delta = if self.paused {
            Duration::ZERO
        } else {
            let step = self.fixed_step.unwrap_or(wall);
            match self.max_step {
                Some(max) => step.min(max),
                None => step,
            }
        };
        self.scene_time += self.delta;
        self.frames += 1;

        self.frame_time()
    }

    /// Timing of the most recent tick.
    pub fn frame_time(&self) -> FrameTime {
        FrameTime {
            elapsed: self.scene_time.as_secs_f32(),
            dt: self.delta.as_secs_f32(),
        }
    }

    /// Scene time as of the last tick.
    #[inline]
    pub fn now(&self) -> Duration {
        self.scene_time
    }

    /// Real time since the clock was created. Keeps running while paused and
    /// ignores the fixed and max step, so it is the one to timestamp taps with.
    #[inline]
    pub fn wall_now(&self) -> Duration {
        self.started.elapsed()
    }

    /// Ticks since creation, paused ones included.
    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    #[inline]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Stop scene time. Ticks still count frames but report `dt == 0`.
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Restart scene time from where it stopped.
    pub fn resume(&mut self) {
        if self.paused {
            self.paused = false;
            self.last_tick = Instant::now();
        }
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
