//! Determinism testing utilities.
//!
//! Provides a harness for verifying that a scene produces identical
//! results given identical inputs.
//!
//! # Sources of non-determinism
//!
//! - **Randomness**: loot rolls and spawn directions must come from the
//!   scene's seeded RNG, never from `thread_rng`.
//! - **Iteration order**: entities are processed in id order; templates and
//!   loot tables live in `BTreeMap`s.
//! - **Floating-point**: all runs happen on the same machine, so plain
//!   `f64` arithmetic is reproducible as long as the order of operations is.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use horde_core::simulation::Scene;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Unique hashes (1 for a deterministic scene).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that every run matched.
    ///
    /// # Panics
    ///
    /// Panics if the runs produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            panic!(
                "Scene is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                self.unique_hashes().len(),
                self.hashes
            );
        }
    }
}

/// Run a state machine several times and compare final hashes.
///
/// # Example
///
/// ```
/// use horde_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<S, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> S,
    Step: Fn(&mut S),
    HashFn: Fn(&S) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();
        for _ in 0..ticks {
            step(&mut state);
        }
        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a scene twice with fixed `tick_ms` steps and compare final hashes.
pub fn verify_scene_determinism<F>(setup_fn: F, num_ticks: u64, tick_ms: i64) -> bool
where
    F: Fn() -> Scene,
{
    verify_determinism(
        2,
        num_ticks,
        &setup_fn,
        |scene| {
            scene.on_tick(tick_ms);
        },
        Scene::state_hash,
    )
    .is_deterministic
}

/// Compare two runs tick by tick.
///
/// `None` if they never diverge, otherwise the first tick whose hashes
/// differ (0 for the initial state).
pub fn find_first_divergence<F>(setup_fn: F, num_ticks: u64, tick_ms: i64) -> Option<u64>
where
    F: Fn() -> Scene,
{
    let mut a = setup_fn();
    let mut b = setup_fn();

    if a.state_hash() != b.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        a.on_tick(tick_ms);
        b.on_tick(tick_ms);
        if a.state_hash() != b.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Run `num_scenes` scenes on scoped threads and collect their final hashes.
///
/// # Panics
///
/// Panics if a scene thread panics.
pub fn run_parallel_scenes<F>(
    setup_fn: F,
    num_scenes: usize,
    num_ticks: u64,
    tick_ms: i64,
) -> DeterminismResult
where
    F: Fn() -> Scene + Sync,
{
    let hashes: Vec<u64> = thread::scope(|s| {
        let handles: Vec<_> = (0..num_scenes)
            .map(|_| {
                s.spawn(|| {
                    let mut scene = setup_fn();
                    for _ in 0..num_ticks {
                        scene.on_tick(tick_ms);
                    }
                    scene.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().expect("scene thread panicked"))
            .collect()
    });

    DeterminismResult {
        is_deterministic: hashes.windows(2).all(|w| w[0] == w[1]),
        hashes,
        ticks: num_ticks,
    }
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for scene testing.
pub mod strategies {
    use horde_core::effect::{Effect, EffectKind};
    use horde_core::math::Vec2;
    use proptest::prelude::*;

    /// Coordinate in a typical arena (-2000 to 2000).
    pub fn arb_coord() -> impl Strategy<Value = f64> {
        -2000.0..2000.0f64
    }

    /// Position in a typical arena.
    pub fn arb_position() -> impl Strategy<Value = Vec2> {
        (arb_coord(), arb_coord()).prop_map(|(x, y)| Vec2::new(x, y))
    }

    /// Non-zero direction.
    pub fn arb_direction() -> impl Strategy<Value = Vec2> {
        (0.0..360.0f64).prop_map(|angle| Vec2::RIGHT.rotate(angle))
    }

    /// Health values (1-1000).
    pub fn arb_health() -> impl Strategy<Value = f64> {
        1.0..1000.0f64
    }

    /// Damage values (0-200).
    pub fn arb_damage() -> impl Strategy<Value = f64> {
        0.0..200.0f64
    }

    /// Effect kinds with a status slot.
    pub fn arb_status_kind() -> impl Strategy<Value = EffectKind> {
        prop_oneof![
            Just(EffectKind::Burning),
            Just(EffectKind::Poisoned),
            Just(EffectKind::Frozen),
        ]
    }

    /// Status effect with a valid strength for its kind.
    pub fn arb_status_effect() -> impl Strategy<Value = Effect> {
        (arb_status_kind(), 0.0..1.0f64, 1i64..20_000).prop_map(|(kind, strength, duration)| {
            Effect::new(kind, strength, duration)
        })
    }

    /// Parameters for a mob placed around the player.
    #[derive(Debug, Clone)]
    pub struct MobParams {
        /// Position.
        pub position: Vec2,
        /// Health.
        pub health: f64,
        /// Speed in pixels per millisecond.
        pub speed: f64,
    }

    /// Generate mob parameters.
    pub fn arb_mob_params() -> impl Strategy<Value = MobParams> {
        (arb_position(), arb_health(), 0.0..0.2f64).prop_map(|(position, health, speed)| {
            MobParams {
                position,
                health,
                speed,
            }
        })
    }

    /// Generate a list of mob parameters.
    pub fn arb_mob_list(max_mobs: usize) -> impl Strategy<Value = Vec<MobParams>> {
        proptest::collection::vec(arb_mob_params(), 1..max_mobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{crowd_scene, mob_entity, player_entity, sample_arena};
    use horde_core::math::Vec2;
    use proptest::prelude::*;

    #[test]
    fn test_verify_determinism_simple() {
        let result = verify_determinism(3, 100, || 0u64, |n| *n += 1, |n| *n);
        assert!(result.is_deterministic);
        assert_eq!(result.hashes, vec![100, 100, 100]);
    }

    #[test]
    fn test_empty_scene_determinism() {
        assert!(verify_scene_determinism(Scene::default, 100, 16));
    }

    #[test]
    fn test_sample_arena_determinism() {
        assert!(verify_scene_determinism(|| sample_arena(7), 400, 16));
        assert!(find_first_divergence(|| sample_arena(7), 200, 16).is_none());
    }

    #[test]
    fn test_parallel_crowds_match() {
        run_parallel_scenes(|| crowd_scene(24, 150.0, 3), 4, 200, 16).assert_deterministic();
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = sample_arena(1);
        let mut b = sample_arena(2);
        for _ in 0..100 {
            a.on_tick(16);
            b.on_tick(16);
        }
        assert_ne!(a.state_hash(), b.state_hash());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn prop_random_crowds_are_deterministic(mobs in strategies::arb_mob_list(12)) {
            let setup = || {
                let mut scene = Scene::default();
                scene.add_entity(player_entity(Vec2::ZERO, 200.0, None));
                for m in &mobs {
                    scene.add_entity(mob_entity(m.position, m.health, m.speed, 0.3));
                }
                scene
            };
            prop_assert!(verify_scene_determinism(setup, 60, 16));
        }
    }
}
