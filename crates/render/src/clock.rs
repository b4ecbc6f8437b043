use std::time::Instant;

/// Elapsed time after which the scene clock resets.
pub const CLOCK_PERIOD: f32 = std::f32::consts::TAU;

/// Seconds since an epoch that restarts once a full period has passed.
///
/// The frame that crosses the period still sees the full elapsed value; the
/// next frame counts from that frame's instant.
#[derive(Debug, Clone, Default)]
pub struct SceneClock {
    epoch: Option<Instant>,
}

impl SceneClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(epoch: Instant) -> Self {
        Self { epoch: Some(epoch) }
    }

    pub fn advance(&mut self, now: Instant) -> f32 {
        let epoch = *self.epoch.get_or_insert(now);
        let t = now.saturating_duration_since(epoch).as_secs_f32();
        if t > CLOCK_PERIOD {
            self.epoch = Some(now);
        }
        t
    }
}
