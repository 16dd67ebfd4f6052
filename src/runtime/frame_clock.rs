use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct TickResult {
    pub should_poll: bool,
    pub ticks_advanced: u32,
}

/// Fixed-rate pacing for the camera poll loop. Real elapsed time goes
/// into an accumulator; a tick fires once at least one full interval has
/// passed, and missed intervals are drained in a single call.
#[derive(Debug)]
pub struct FrameClock {
    fps: f32,
    tick_count: u64,
    last_tick: Instant,
    accumulator: Duration,
}

impl FrameClock {
    pub fn new(fps: f32) -> Self {
        let now = Instant::now();
        Self::with_start(fps, now)
    }

    pub fn with_start(fps: f32, now: Instant) -> Self {
        Self {
            fps: fps.max(1.0),
            tick_count: 0,
            last_tick: now,
            accumulator: Duration::ZERO,
        }
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs_f32(1.0 / self.fps)
    }

    pub fn next_deadline(&self) -> Instant {
        let remaining = self
            .interval()
            .checked_sub(self.accumulator)
            .unwrap_or_default();
        self.last_tick + remaining
    }

    pub fn tick(&mut self, now: Instant) -> TickResult {
        let elapsed = now.saturating_duration_since(self.last_tick);
        self.last_tick = now;
        self.accumulator += elapsed;

        let interval = self.interval();
        let mut advanced = 0u32;

        while self.accumulator >= interval {
            self.accumulator -= interval;
            self.tick_count += 1;
            advanced += 1;
        }

        if advanced > 0 {
            TickResult {
                should_poll: true,
                ticks_advanced: advanced,
            }
        } else {
            TickResult::default()
        }
    }
}
