//! Property tests for the pure calculators.

use chrono::{DateTime, Duration, TimeZone, Utc};
use lingo_core::{
    apply_progress, record_answer, AdaptiveConfig, AdaptiveSessionState, Difficulty,
    HeartsInput, HeartsRegenerator, LevelTable, Quest, QuestProgress, SrsScheduler,
};
use proptest::prelude::*;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn rank(d: Difficulty) -> i32 {
    match d {
        Difficulty::Easy => 0,
        Difficulty::Medium => 1,
        Difficulty::Hard => 2,
    }
}

proptest! {
    #[test]
    fn level_band_contains_total(xp in 0i64..100_000) {
        let table = LevelTable::default();
        let info = table.level_for_xp(xp);
        let level = &table.levels()[(info.level - 1) as usize];
        prop_assert!(level.contains(xp as u64));
        prop_assert!(info.progress <= 100);
        prop_assert_eq!(info.current_xp, xp as u64 - level.min_xp);
    }

    #[test]
    fn level_is_monotonic(a in 0i64..50_000, b in 0i64..50_000) {
        let table = LevelTable::default();
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(table.level_for_xp(lo).level <= table.level_for_xp(hi).level);
    }

    #[test]
    fn hearts_monotonic_and_capped(
        current in 0u32..5,
        earlier in 0i64..600,
        extra in 0i64..600,
    ) {
        let regen = HeartsRegenerator::new();
        let last = base_time();
        let at = |minutes: i64| HeartsInput {
            current_hearts: current,
            max_hearts: 5,
            last_practice_date: Some(last),
            current_date: last + Duration::minutes(minutes),
        };
        let first = regen.calculate(&at(earlier));
        let later = regen.calculate(&at(earlier + extra));

        prop_assert!(first.current_hearts <= later.current_hearts);
        prop_assert!(later.current_hearts <= 5);
        prop_assert_eq!(first.minutes_until_next_heart == 0, first.is_fully_regenerated);
        prop_assert_eq!(later.minutes_until_next_heart == 0, later.is_fully_regenerated);
        prop_assert!(first.minutes_until_next_heart <= 30);
    }

    #[test]
    fn srs_mastery_rules(mastery in -10i32..20, correct in any::<bool>()) {
        let now = base_time();
        let update = SrsScheduler::new().schedule(mastery, correct, now);
        let clamped = mastery.clamp(0, 5) as u8;
        if correct {
            prop_assert_eq!(update.mastery, (clamped + 1).min(5));
        } else {
            prop_assert_eq!(update.mastery, 0);
        }
        prop_assert!(update.next_review_at > now);
    }

    #[test]
    fn difficulty_moves_at_most_one_step(
        answers in proptest::collection::vec(any::<bool>(), 0..60),
        window in 1usize..10,
    ) {
        let config = AdaptiveConfig { window_size: window, ..Default::default() };
        let mut state = AdaptiveSessionState::new(Difficulty::Medium);
        for answer in answers {
            let before = state.clone();
            state = record_answer(&before, answer, &config);

            let moved = rank(state.current_difficulty) - rank(before.current_difficulty);
            prop_assert!(moved.abs() <= 1);
            prop_assert!(state.recent_answers.len() <= window);

            if state.current_difficulty != before.current_difficulty {
                // Only a full window can move the difficulty.
                let mut judged: Vec<bool> = before.recent_answers.iter().copied().collect();
                judged.push(answer);
                let judged = &judged[judged.len().saturating_sub(window)..];
                prop_assert_eq!(judged.len(), window);
                let accuracy = judged.iter().filter(|&&a| a).count() as f64 / window as f64;
                if rank(state.current_difficulty) > rank(before.current_difficulty) {
                    prop_assert!(accuracy >= config.upper_threshold);
                } else {
                    prop_assert!(accuracy <= config.lower_threshold);
                }
                prop_assert_eq!(state.adjustments_made, before.adjustments_made + 1);
            }
        }
    }

    #[test]
    fn quest_rewards_paid_exactly_once(
        target in 1u32..20,
        deltas in proptest::collection::vec(-5i64..10, 1..30),
    ) {
        let quest = Quest::new("q", "Quest", target).with_rewards(10, 3);
        let mut progress = QuestProgress::new(&quest);
        let mut xp_total = 0;
        let mut currency_total = 0;
        for delta in deltas {
            let update = apply_progress(&quest, &progress, delta, base_time());
            prop_assert!(update.progress.progress <= target);
            prop_assert!(update.progress.progress >= progress.progress);
            xp_total += update.xp_awarded;
            currency_total += update.currency_awarded;
            progress = update.progress;
        }
        if progress.is_completed() {
            prop_assert_eq!(xp_total, 10);
            prop_assert_eq!(currency_total, 3);
        } else {
            prop_assert_eq!(xp_total, 0);
            prop_assert_eq!(currency_total, 0);
        }
    }
}

#[test]
fn srs_interval_strictly_increases_with_mastery() {
    let now = base_time();
    let scheduler = SrsScheduler::new();
    let expected = [1, 3, 7, 14, 30, 90];
    for (mastery, days) in expected.iter().enumerate() {
        assert_eq!(scheduler.interval_for(mastery as u8), Duration::days(*days));
    }
    // Reaching box m via a correct review from box m-1 schedules interval[m].
    let gaps: Vec<Duration> = (0..5)
        .map(|m| scheduler.schedule(m, true, now).next_review_at - now)
        .collect();
    assert!(gaps.windows(2).all(|w| w[0] < w[1]));
}
