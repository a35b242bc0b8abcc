//! Property-based tests for the playback controller
//!
//! Uses proptest to check queue clamping, rate cycling, skip bounds and the
//! controller's bookkeeping under random operation sequences.

mod common;

use common::Harness;
use encore_playback::{ItemReadiness, PlaybackError, PlaybackStatus, PlayerConfig};
use proptest::prelude::*;
use std::time::Duration;

// ===== Helpers =====

#[derive(Debug, Clone)]
enum Op {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    GoTo(usize),
    Seek(u64),
    SkipForward,
    SkipBackward,
    CompleteSeek(bool),
    Ready,
    Fail,
    FinishTrack,
    NextRate,
    Tick,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        Just(Op::Play),
        Just(Op::Pause),
        Just(Op::Toggle),
        Just(Op::Next),
        Just(Op::Previous),
        (0usize..12).prop_map(Op::GoTo),
        (0u64..150).prop_map(Op::Seek),
        Just(Op::SkipForward),
        Just(Op::SkipBackward),
        any::<bool>().prop_map(Op::CompleteSeek),
        Just(Op::Ready),
        Just(Op::Fail),
        Just(Op::FinishTrack),
        Just(Op::NextRate),
        Just(Op::Tick),
    ]
}

fn apply(harness: &mut Harness, op: &Op) {
    let controller = &mut harness.controller;
    let current = controller.current_index();
    // Outcomes are checked through the invariants, not per call
    let _ = match op {
        Op::Play => controller.play(),
        Op::Pause => controller.pause(),
        Op::Toggle => {
            controller.play_or_pause();
            Ok(())
        }
        Op::Next => controller.next(),
        Op::Previous => controller.previous(),
        Op::GoTo(index) => controller.go_to(*index),
        Op::Seek(secs) => controller.seek_to(Duration::from_secs(*secs)),
        Op::SkipForward => controller.skip_forward(),
        Op::SkipBackward => controller.skip_backward(),
        Op::CompleteSeek(finished) => {
            if harness.engine.pending_seeks() > 0 {
                harness.engine.complete_seek(0, *finished);
            }
            Ok(())
        }
        Op::Ready => {
            if let Some(index) = current {
                harness.engine.set_readiness(index, ItemReadiness::ReadyToPlay);
            }
            Ok(())
        }
        Op::Fail => {
            if let Some(index) = current {
                harness.engine.set_readiness(index, ItemReadiness::Failed);
            }
            Ok(())
        }
        Op::FinishTrack => {
            harness.engine.finish_current();
            Ok(())
        }
        Op::NextRate => {
            controller.change_to_next_rate();
            Ok(())
        }
        Op::Tick => {
            controller.on_progress_tick();
            Ok(())
        }
    };
    harness.pump();
}

// ===== Property Tests =====

proptest! {
    /// Property: The engine always starts at the clamped index
    #[test]
    fn setup_start_is_clamped(count in 1usize..20, start in -50i64..50) {
        let mut harness = Harness::new();
        harness.setup(count, start, false);

        let expected = start.clamp(0, count as i64 - 1) as usize;
        prop_assert_eq!(harness.engine.live().first().copied(), Some(expected));
        prop_assert_eq!(harness.controller.current_index(), Some(expected));
    }

    /// Property: Out-of-range jumps never change the active item
    #[test]
    fn go_to_out_of_range_is_noop(count in 1usize..10, start in 0usize..10, extra in 0usize..100) {
        let start = start.min(count - 1);
        let mut harness = Harness::new();
        harness.setup(count, start as i64, false);
        harness.take_events();

        let target = count + extra;
        prop_assert_eq!(
            harness.controller.go_to(target),
            Err(PlaybackError::IndexOutOfBounds(target))
        );
        prop_assert!(harness.take_events().is_empty());
        prop_assert_eq!(harness.controller.current_index(), Some(start));
    }

    /// Property: Cycling through all rates returns to the starting rate
    #[test]
    fn rate_cycle_wraps(
        rates in prop::collection::vec(1u32..40, 1..8)
            .prop_map(|mut raw| {
                raw.sort_unstable();
                raw.dedup();
                raw.into_iter().map(|r| r as f32 * 0.125).collect::<Vec<f32>>()
            })
    ) {
        let mut harness = Harness::new();
        harness.controller.set_playback_rates(rates.clone()).unwrap();
        harness.controller.set_rate(rates[0]).unwrap();

        let mut seen = Vec::new();
        for _ in 0..rates.len() {
            seen.push(harness.controller.change_to_next_rate());
        }

        prop_assert_eq!(seen.last().copied(), Some(rates[0]));
        prop_assert!(seen.iter().all(|rate| rates.contains(rate)));
    }

    /// Property: Skips stay inside [0, duration]
    #[test]
    fn skips_stay_in_bounds(
        duration in 1u64..600,
        position in 0u64..600,
        interval in 1u64..120,
        forward in any::<bool>()
    ) {
        let position = position.min(duration);
        let mut harness = Harness::with_config(PlayerConfig {
            skip_interval: Duration::from_secs(interval),
            ..Default::default()
        });
        harness.engine.set_duration(Some(Duration::from_secs(duration)));
        harness.setup(1, 0, false);
        harness.engine.set_current_time(Duration::from_secs(position));

        if forward {
            harness.controller.skip_forward().unwrap();
        } else {
            harness.controller.skip_backward().unwrap();
        }

        let targets = harness.engine.seek_targets();
        prop_assert_eq!(targets.len(), 1);
        prop_assert!(targets[0] <= Duration::from_secs(duration));
        let expected = if forward {
            (position + interval).min(duration)
        } else {
            position.saturating_sub(interval)
        };
        prop_assert_eq!(targets[0], Duration::from_secs(expected));
    }

    /// Property: Bookkeeping stays consistent under any operation sequence
    #[test]
    fn random_operations_keep_invariants(
        count in 1usize..6,
        ops in prop::collection::vec(arbitrary_op(), 1..60)
    ) {
        let mut harness = Harness::new();
        harness.setup(count, 0, false);

        for op in &ops {
            apply(&mut harness, op);

            let controller = &harness.controller;
            if let Some(index) = controller.current_index() {
                prop_assert!(index < count);
                prop_assert_eq!(harness.engine.live().first().copied(), Some(index));
            }
            if controller.is_progress_ticking() {
                prop_assert!(controller.current_index().is_some());
            }
            if controller.current_index().is_none() {
                prop_assert_eq!(controller.status(), PlaybackStatus::None);
            }
            if controller.status() == PlaybackStatus::Paused {
                prop_assert_eq!(harness.engine.rate(), 0.0);
            }
            // Active item, rate and at most one readiness observer
            prop_assert!(harness.engine.subscriber_count() <= 3);
        }

        harness.controller.clean();
        harness.pump();
        prop_assert_eq!(harness.controller.status(), PlaybackStatus::None);
        prop_assert_eq!(harness.engine.subscriber_count(), 0);
    }
}
