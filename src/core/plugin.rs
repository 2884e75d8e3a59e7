//! CorePlugin wires the fixed tick clock and system ordering for the rewarder.
use bevy::prelude::*;
use std::time::Duration;

const DEFAULT_TIME_SCALE: f32 = 1.0;
const MIN_TIME_SCALE: f32 = 0.001;
/// Length of one accrual tick.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

#[cfg(feature = "core_debug")]
#[derive(Resource)]
struct DebugTickTimer {
    timer: Timer,
}

#[cfg(feature = "core_debug")]
impl Default for DebugTickTimer {
    fn default() -> Self {
        Self {
            timer: Timer::from_seconds(1.0, TimerMode::Repeating),
        }
    }
}

/// Frame ordering shared by every rewarder plugin.
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum RewarderSet {
    /// Reloads, session ends then starts, host reports.
    Intake,
    /// Playtime accrual.
    Accrual,
    /// Milestones, claims and reminders.
    Rewards,
}

/// Converts real frame deltas into whole, scaled one-second ticks.
#[derive(Resource, Debug)]
pub struct TickClock {
    time_scale: f32,
    carry: Duration,
    pending_ticks: u32,
    elapsed_ticks: u64,
}

impl TickClock {
    /// Creates a new clock with the provided time-scale multiplier.
    pub fn new(time_scale: f32) -> Self {
        Self {
            time_scale: time_scale.max(MIN_TIME_SCALE),
            carry: Duration::ZERO,
            pending_ticks: 0,
            elapsed_ticks: 0,
        }
    }

    /// Sets the time-scale multiplier (clamped to a small positive minimum).
    pub fn set_time_scale(&mut self, scale: f32) {
        self.time_scale = scale.max(MIN_TIME_SCALE);
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    /// Total ticks produced since the clock started.
    pub fn elapsed_ticks(&self) -> u64 {
        self.elapsed_ticks
    }

    pub fn pending_ticks(&self) -> u32 {
        self.pending_ticks
    }

    /// Applies a real delta; whole intervals become pending ticks.
    pub fn advance(&mut self, real_delta: Duration) {
        self.carry += real_delta.mul_f32(self.time_scale);
        while self.carry >= TICK_INTERVAL {
            self.carry -= TICK_INTERVAL;
            self.pending_ticks = self.pending_ticks.saturating_add(1);
            self.elapsed_ticks = self.elapsed_ticks.saturating_add(1);
        }
    }

    /// Queues ticks directly, bypassing real time.
    pub fn push_ticks(&mut self, ticks: u32) {
        self.pending_ticks = self.pending_ticks.saturating_add(ticks);
        self.elapsed_ticks = self.elapsed_ticks.saturating_add(u64::from(ticks));
    }

    /// Hands out every pending tick exactly once.
    pub fn take_ticks(&mut self) -> u32 {
        std::mem::take(&mut self.pending_ticks)
    }
}

impl Default for TickClock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_SCALE)
    }
}

/// Registers the tick clock and orders the rewarder system sets.
#[derive(Debug, Clone, Copy)]
pub struct CorePlugin {
    time_scale: f32,
}

impl CorePlugin {
    /// Creates a CorePlugin with the provided time-scale multiplier.
    pub const fn with_time_scale(time_scale: f32) -> Self {
        Self { time_scale }
    }
}

impl Default for CorePlugin {
    fn default() -> Self {
        Self::with_time_scale(DEFAULT_TIME_SCALE)
    }
}

impl Plugin for CorePlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(TickClock::new(self.time_scale))
            .configure_sets(
                Update,
                (
                    RewarderSet::Intake,
                    RewarderSet::Accrual,
                    RewarderSet::Rewards,
                )
                    .chain(),
            )
            .add_systems(Startup, log_startup_time_scale)
            .add_systems(Update, advance_tick_clock.before(RewarderSet::Accrual));

        #[cfg(feature = "core_debug")]
        {
            app.insert_resource(DebugTickTimer::default())
                .add_systems(Update, log_tick_summary);
        }
    }
}

fn advance_tick_clock(mut clock: ResMut<TickClock>, time: Res<Time>) {
    clock.advance(time.delta());
}

fn log_startup_time_scale(clock: Res<TickClock>) {
    info!(
        "CorePlugin initialised with time scale: {:.3}",
        clock.time_scale()
    );
}

#[cfg(feature = "core_debug")]
fn log_tick_summary(mut timer: ResMut<DebugTickTimer>, time: Res<Time>, clock: Res<TickClock>) {
    if timer.timer.tick(time.delta()).just_finished() {
        info!(
            target: "core_debug",
            "Ticks elapsed: {} | pending: {} | scale: {:.3}",
            clock.elapsed_ticks(),
            clock.pending_ticks(),
            clock.time_scale(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_emits_whole_scaled_ticks() {
        let mut clock = TickClock::new(2.5);
        clock.advance(Duration::from_millis(1200));

        assert_eq!(clock.time_scale(), 2.5);
        assert_eq!(clock.take_ticks(), 3);
        assert_eq!(clock.take_ticks(), 0);

        clock.advance(Duration::from_millis(1200));
        assert_eq!(clock.take_ticks(), 3);
        assert_eq!(clock.elapsed_ticks(), 6);
    }

    #[test]
    fn clock_carries_partial_ticks() {
        let mut clock = TickClock::default();
        for _ in 0..3 {
            clock.advance(Duration::from_millis(400));
        }
        assert_eq!(clock.take_ticks(), 1);
        clock.advance(Duration::from_millis(800));
        assert_eq!(clock.take_ticks(), 1);
    }

    #[test]
    fn clock_clamps_min_time_scale() {
        let mut clock = TickClock::new(0.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);

        clock.set_time_scale(-5.0);
        assert!((clock.time_scale() - MIN_TIME_SCALE).abs() < f32::EPSILON);
    }

    #[test]
    fn pushed_ticks_are_taken_once() {
        let mut clock = TickClock::default();
        clock.push_ticks(5);
        assert_eq!(clock.pending_ticks(), 5);
        assert_eq!(clock.take_ticks(), 5);
        assert_eq!(clock.pending_ticks(), 0);
    }
}
