//! Time-triggered mob waves.
//!
//! The schedule is a list of triggers sorted by time. Once the last trigger
//! has fired, scene time is shifted back by the wave duration (the last
//! trigger's timestamp) and the schedule starts over.

use crate::context::SimContext;
use crate::data::SpawnerData;
use crate::entity::{Entity, TargetView};

/// Spawn `count` copies of mob `mob` at `trigger_ms` into a wave.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaveTrigger {
    /// Time into the wave, in milliseconds.
    pub trigger_ms: i64,
    /// Mob template name.
    pub mob: String,
    /// Number of mobs.
    pub count: u32,
}

impl WaveTrigger {
    /// Create a trigger.
    pub fn new(trigger_ms: i64, mob: impl Into<String>, count: u32) -> Self {
        Self {
            trigger_ms,
            mob: mob.into(),
            count,
        }
    }
}

/// Repeating wave scheduler.
#[derive(Debug, Clone)]
pub struct MobSpawner {
    schedule: Vec<WaveTrigger>,
    spawn_radius: f64,
    next_index: usize,
    spawned_in_trigger: u32,
    loop_offset_ms: i64,
}

impl MobSpawner {
    /// Create a spawner. Triggers are sorted by time, keeping the given
    /// order among equal times.
    #[must_use]
    pub fn new(mut schedule: Vec<WaveTrigger>, spawn_radius: f64) -> Self {
        schedule.sort_by_key(|t| t.trigger_ms);
        Self {
            schedule,
            spawn_radius,
            next_index: 0,
            spawned_in_trigger: 0,
            loop_offset_ms: 0,
        }
    }

    /// Build a spawner from data.
    #[must_use]
    pub fn from_data(data: &SpawnerData) -> Self {
        let schedule = data
            .waves
            .iter()
            .map(|w| WaveTrigger::new(w.trigger_ms, w.mob.clone(), w.count))
            .collect();
        Self::new(schedule, data.spawn_radius)
    }

    /// Length of one wave: the last trigger's timestamp.
    #[must_use]
    pub fn wave_duration(&self) -> i64 {
        self.schedule.last().map_or(0, |t| t.trigger_ms)
    }

    /// Sorted schedule.
    #[must_use]
    pub fn schedule(&self) -> &[WaveTrigger] {
        &self.schedule
    }

    /// Spawn distance from the target.
    #[must_use]
    pub const fn spawn_radius(&self) -> f64 {
        self.spawn_radius
    }

    /// Index of the next trigger to fire.
    #[must_use]
    pub const fn next_index(&self) -> usize {
        self.next_index
    }

    /// Mobs already produced for the current trigger.
    #[must_use]
    pub const fn spawned_in_trigger(&self) -> u32 {
        self.spawned_in_trigger
    }

    /// Scene time consumed by completed waves.
    #[must_use]
    pub const fn loop_offset_ms(&self) -> i64 {
        self.loop_offset_ms
    }

    /// Produce at most one mob due by `scene_time_ms`.
    ///
    /// The mob is a copy of its template, placed `spawn_radius` away from
    /// the target in a random direction and chasing it. Call repeatedly
    /// until `None` to drain every due mob. Without a target nothing is
    /// produced and the schedule does not advance.
    pub fn get_spawned(
        &mut self,
        scene_time_ms: i64,
        target: Option<&TargetView>,
        ctx: &mut SimContext,
    ) -> Option<Entity> {
        let target = target?;
        if self.schedule.is_empty() {
            return None;
        }

        loop {
            if self.next_index >= self.schedule.len() {
                let duration = self.wave_duration();
                if duration <= 0 {
                    return None;
                }
                self.loop_offset_ms += duration;
                self.next_index = 0;
                self.spawned_in_trigger = 0;
                tracing::debug!(offset = self.loop_offset_ms, "wave restarted");
            }

            let trigger = &self.schedule[self.next_index];
            if trigger.trigger_ms > scene_time_ms - self.loop_offset_ms {
                return None;
            }
            if self.spawned_in_trigger >= trigger.count {
                self.advance();
                continue;
            }

            match ctx.registry.mob(&trigger.mob) {
                Ok(mut mob) => {
                    self.spawned_in_trigger += 1;
                    let offset = ctx.random_direction() * self.spawn_radius;
                    mob.body.position = target.position + offset;
                    if let Some(m) = mob.as_mob_mut() {
                        m.set_target(Some(target.id));
                    }
                    tracing::debug!(
                        mob = %trigger.mob,
                        trigger_ms = trigger.trigger_ms,
                        scene_time_ms,
                        "mob spawned"
                    );
                    return Some(mob);
                }
                Err(err) => {
                    tracing::warn!(%err, "skipping wave trigger");
                    self.advance();
                }
            }
        }
    }

    fn advance(&mut self) {
        self.next_index += 1;
        self.spawned_in_trigger = 0;
    }
}
