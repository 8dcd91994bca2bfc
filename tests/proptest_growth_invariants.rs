//! Property-based invariant tests for the growth and animation engine.
//!
//! 1. Smoothing returns the rounded mean of the retained window.
//! 2. The moisture gate closes exactly outside the growth band.
//! 3. The segment cap holds under any amount of growth.
//! 4. Bloom progress never decreases and is complete from tick 30.
//! 5. Leaves are only removed after they detached and fell.
//! 6. Sensor parsing never panics and never produces non-finite readings.
//! 7. Resizing there and back restores every position.

use std::collections::VecDeque;

use cgmath::Point2;
use fuchsia_sim::growth::{create_flower, create_leaf, grow_plant, growth_chance, LEAF_BONUS};
use fuchsia_sim::lifecycle::{animate, PHASE_STEP};
use fuchsia_sim::ornament::BLOOM_TICKS;
use fuchsia_sim::plant::Plant;
use fuchsia_sim::sensor::{parse_leading_float, SensorReading, SensorState};
use fuchsia_sim::smoothing::smooth;
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use time::macros::datetime;

// ── Helpers ─────────────────────────────────────────────────────────────

fn planted(seed: u64) -> (Plant, StdRng) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut plant = Plant::new();
    plant.reset(Point2::new(400.0, 600.0), 100.0, 12.0, &mut rng);
    (plant, rng)
}

fn reading(soil: f64) -> SensorReading {
    SensorReading {
        soil_moisture: soil,
        oxygen: 350.0,
        heart_rate: 0.0,
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Smoothing mean
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn smoothing_is_rounded_window_mean(
        values in prop::collection::vec(-10_000.0f64..10_000.0, 1..40),
        window in 1usize..16,
    ) {
        let mut history = VecDeque::new();
        let mut last = 0.0;
        for &v in &values {
            last = smooth(&mut history, v, window);
            prop_assert!(history.len() <= window);
        }
        let kept = &values[values.len().saturating_sub(window)..];
        let mean = kept.iter().sum::<f64>() / kept.len() as f64;
        prop_assert_eq!(last, mean.round());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Moisture gate band
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn gate_closes_outside_band(
        soil in -500.0f64..1500.0,
        age in 0.0f64..5000.0,
        leaves in 0usize..200,
    ) {
        let chance = growth_chance(&reading(soil), age, leaves);
        if (250.0..=750.0).contains(&soil) {
            let chance = chance.expect("gate open inside band");
            prop_assert!(chance >= leaves as f64 * LEAF_BONUS);
            prop_assert!(chance <= 0.35 + leaves as f64 * LEAF_BONUS + 1e-12);
        } else {
            prop_assert!(chance.is_none());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Segment cap
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn segment_cap_holds(seed in any::<u64>(), cap in 1usize..40, steps in 0usize..400) {
        let (mut plant, mut rng) = planted(seed);
        for _ in 0..steps {
            grow_plant(&mut plant, cap, &mut rng);
            prop_assert!(plant.segment_count() <= cap.max(1));
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Bloom monotonicity
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bloom_never_regresses(seed in any::<u64>(), frames in 1u32..120) {
        let (plant, mut rng) = planted(seed);
        let mut flower = create_flower(&plant.segments()[0], &mut rng);
        let mut previous = flower.bloom_progress;
        for i in 0..frames {
            let alive = flower.update(i as f64 * PHASE_STEP);
            prop_assert!(flower.bloom_progress >= previous);
            prop_assert!((0.0..=1.0).contains(&flower.bloom_progress));
            if flower.age >= BLOOM_TICKS {
                prop_assert_eq!(flower.bloom_progress, 1.0);
                prop_assert!(flower.blooming);
            }
            prop_assert_eq!(alive, flower.age <= flower.max_age);
            previous = flower.bloom_progress;
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Leaf removal ordering
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn leaves_detach_before_removal(seed in any::<u64>(), height in 200.0f32..900.0) {
        let (plant, mut rng) = planted(seed);
        let mut leaf = create_leaf(&plant.segments()[0], &mut rng);
        let fall_limit = height + 50.0;
        let mut frame = 0u32;
        loop {
            frame += 1;
            let keep = leaf.update(frame as f64 * PHASE_STEP, fall_limit);
            prop_assert_eq!(leaf.attached, leaf.age <= leaf.max_age);
            if !keep {
                prop_assert!(!leaf.attached);
                prop_assert!(leaf.position.y > fall_limit);
                break;
            }
            prop_assert!(frame < 20_000, "leaf never left the canvas");
        }
        prop_assert!(frame > leaf.max_age);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Parser robustness
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ingest_never_panics(lines in prop::collection::vec(".{0,40}", 0..20)) {
        let mut state = SensorState::new(reading(600.0), 10);
        let now = datetime!(2026-01-01 0:00 UTC);
        for line in &lines {
            state.ingest(line, now);
            let r = state.reading();
            prop_assert!(r.soil_moisture.is_finite());
            prop_assert!(r.oxygen.is_finite());
            prop_assert!(r.heart_rate.is_finite());
        }
        if !state.connected() {
            prop_assert_eq!(state.reading(), reading(600.0));
            prop_assert!(state.last_data_at().is_none());
        }
    }

    #[test]
    fn leading_float_accepts_numeric_prefix(value in -1.0e6f64..1.0e6, suffix in "[a-z%]{0,5}") {
        let token = format!("{value}{suffix}");
        let parsed = parse_leading_float(&token);
        // A trailing 'e' may be swallowed as a dangling exponent, but the
        // number itself always survives.
        prop_assert_eq!(parsed, Some(value));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Resize round trip
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn resize_there_and_back(seed in any::<u64>(), delta in -400.0f32..400.0, steps in 0usize..60) {
        let (mut plant, mut rng) = planted(seed);
        for _ in 0..steps {
            grow_plant(&mut plant, 150, &mut rng);
        }
        let before = plant.clone();
        plant.apply_viewport_resize(delta);
        plant.apply_viewport_resize(-delta);

        let close = |a: Point2<f32>, b: Point2<f32>| (a.x - b.x).abs() < 1e-3 && (a.y - b.y).abs() < 1e-3;
        for (a, b) in plant.segments().iter().zip(before.segments()) {
            prop_assert!(close(a.base_start, b.base_start) && close(a.base_end, b.base_end));
            prop_assert!(close(a.start, b.start) && close(a.end, b.end));
        }
        for (a, b) in plant.leaves().iter().zip(before.leaves()) {
            prop_assert!(close(a.position, b.position));
        }
        for (a, b) in plant.flowers().iter().zip(before.flowers()) {
            prop_assert!(close(a.position, b.position));
        }
    }
}

#[test]
fn animate_keeps_ornament_counts_bounded() {
    let (mut plant, mut rng) = planted(99);
    for _ in 0..80 {
        grow_plant(&mut plant, 150, &mut rng);
    }
    let leaves = plant.leaf_count();
    let flowers = plant.flower_count();
    for i in 1..=10 {
        animate(&mut plant, i as f64 * PHASE_STEP, 600.0);
        assert!(plant.leaf_count() <= leaves);
        assert!(plant.flower_count() <= flowers);
    }
}
