//! Scoring properties over the whole input space, plus the umbrella
//! friend scenarios as the queue sees them.

use konsil_core::{
    config::{DeskConfig, ScoringConfig},
    queue::AllocationQueue,
    roster::{MoodStatus, Roster, StaffRecord},
    scorer::{score, ScoreContext},
};
use proptest::prelude::*;

fn any_mood() -> impl Strategy<Value = MoodStatus> {
    prop::sample::select(MoodStatus::ALL.to_vec())
}

fn any_ctx() -> impl Strategy<Value = ScoreContext> {
    (0usize..5, any::<bool>()).prop_map(|(umbrella_friend_count, day_before_vacation)| {
        ScoreContext { umbrella_friend_count, day_before_vacation }
    })
}

fn record(employ: f64, ward: f64, mood: MoodStatus, umbrella: bool, available: bool) -> StaffRecord {
    StaffRecord::new("XX", "X", employ, ward)
        .with_mood(mood)
        .with_umbrella_friend(umbrella)
        .with_available(available)
}

proptest! {
    #[test]
    fn score_stays_in_unit_interval(
        employ in 0.0f64..=1.0,
        ward in 0.0f64..=1.0,
        mood in any_mood(),
        umbrella in any::<bool>(),
        ctx in any_ctx(),
    ) {
        let s = score(&record(employ, ward, mood, umbrella, true), ctx, &ScoringConfig::default());
        prop_assert!((0.0..=1.0).contains(&s), "score {s} out of range");
    }

    #[test]
    fn unavailable_always_scores_zero(
        employ in 0.0f64..=1.0,
        ward in 0.0f64..=1.0,
        mood in any_mood(),
        umbrella in any::<bool>(),
        ctx in any_ctx(),
    ) {
        let s = score(&record(employ, ward, mood, umbrella, false), ctx, &ScoringConfig::default());
        prop_assert_eq!(s, 0.0);
    }

    #[test]
    fn storm_always_scores_zero(
        employ in 0.0f64..=1.0,
        ward in 0.0f64..=1.0,
        umbrella in any::<bool>(),
        ctx in any_ctx(),
    ) {
        let s = score(&record(employ, ward, MoodStatus::Storm, umbrella, true), ctx, &ScoringConfig::default());
        prop_assert_eq!(s, 0.0);
    }

    #[test]
    fn monotonic_in_ward_fraction(
        employ in 0.0f64..=1.0,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
        mood in any_mood(),
        umbrella in any::<bool>(),
        ctx in any_ctx(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let w = ScoringConfig::default();
        let s_lo = score(&record(employ, lo, mood, umbrella, true), ctx, &w);
        let s_hi = score(&record(employ, hi, mood, umbrella, true), ctx, &w);
        prop_assert!(s_lo <= s_hi, "{s_lo} > {s_hi} for ward {lo} <= {hi}");
    }

    #[test]
    fn monotonic_in_employment_fraction(
        ward in 0.0f64..=1.0,
        a in 0.0f64..=1.0,
        b in 0.0f64..=1.0,
        mood in any_mood(),
        umbrella in any::<bool>(),
        ctx in any_ctx(),
    ) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let w = ScoringConfig::default();
        let s_lo = score(&record(lo, ward, mood, umbrella, true), ctx, &w);
        let s_hi = score(&record(hi, ward, mood, umbrella, true), ctx, &w);
        prop_assert!(s_lo <= s_hi, "{s_lo} > {s_hi} for employment {lo} <= {hi}");
    }
}

#[test]
fn single_ice_cream_umbrella_friend_scores_full() {
    let q = AllocationQueue::new(&DeskConfig::default());
    let roster = Roster::from_records(vec![
        StaffRecord::new("IC", "Ida", 1.0, 1.0)
            .with_mood(MoodStatus::IceCream)
            .with_umbrella_friend(true),
        StaffRecord::new("NN", "Nils", 1.0, 0.4),
    ])
    .unwrap();

    let ranked = q.available_candidates(&roster, None);
    assert_eq!(ranked[0].id(), "IC");
    assert_eq!(ranked[0].score, 1.0);
    assert_eq!(ranked[1].score, 0.4);
}

#[test]
fn two_umbrella_friends_discount_everyone() {
    let q = AllocationQueue::new(&DeskConfig::default());
    let roster = Roster::from_records(vec![
        StaffRecord::new("IC", "Ida", 1.0, 1.0)
            .with_mood(MoodStatus::IceCream)
            .with_umbrella_friend(true),
        StaffRecord::new("UF", "Urs", 1.0, 1.0).with_umbrella_friend(true),
        StaffRecord::new("NN", "Nils", 1.0, 0.5),
    ])
    .unwrap();

    let scores: Vec<_> = q
        .available_candidates(&roster, None)
        .into_iter()
        .map(|c| (c.record.id, c.score))
        .collect();
    assert_eq!(
        scores,
        [
            ("IC".to_string(), 0.9),
            ("UF".to_string(), 0.9),
            ("NN".to_string(), 0.45),
        ]
    );
}

#[test]
fn legacy_threshold_is_a_config_choice() {
    let roster = Roster::from_records(vec![
        StaffRecord::new("HI", "H", 1.0, 0.8),
        StaffRecord::new("LO", "L", 1.0, 0.4),
    ])
    .unwrap();

    let doctor_view = AllocationQueue::new(&DeskConfig::default());
    assert_eq!(doctor_view.available_candidates(&roster, None).len(), 2);

    let legacy = AllocationQueue::new(&DeskConfig {
        eligibility_threshold: 0.5,
        ..DeskConfig::default()
    });
    let ids: Vec<_> = legacy
        .available_candidates(&roster, None)
        .into_iter()
        .map(|c| c.record.id)
        .collect();
    assert_eq!(ids, ["HI"]);
}

#[test]
fn vacation_hook_discounts_when_enabled() {
    let roster = Roster::from_records(vec![StaffRecord::new("AA", "A", 1.0, 1.0)]).unwrap();
    let q = AllocationQueue::new(&DeskConfig {
        day_before_vacation: true,
        ..DeskConfig::default()
    });
    assert_eq!(q.available_candidates(&roster, None)[0].score, 0.8);
}
