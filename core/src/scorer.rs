//! Suitability scoring for a single staff record.
//!
//! RULE: score() is pure. It never reads the clock, never mutates the
//! record and never fails — a record it cannot score gets 0.0.

use crate::{config::ScoringConfig, roster::{MoodStatus, StaffRecord}};

/// Shift-wide aggregates the scorer needs beyond the record itself.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreContext {
    /// Umbrella friends among the effectively available staff.
    pub umbrella_friend_count: usize,
    pub day_before_vacation: bool,
}

/// Score a record in [0, 1], rounded to two decimals.
///
/// `record.available` must already reflect any attendance override.
pub fn score(record: &StaffRecord, ctx: ScoreContext, weights: &ScoringConfig) -> f64 {
    if !record.available {
        return 0.0;
    }
    match try_score(record, ctx, weights) {
        Ok(s) => s,
        Err(reason) => {
            log::warn!("scorer: {} scored 0.0: {reason}", record.id);
            0.0
        }
    }
}

fn try_score(record: &StaffRecord, ctx: ScoreContext, weights: &ScoringConfig) -> Result<f64, String> {
    if let Some(issue) = record.issues.first() {
        return Err(format!("field {} is malformed ({})", issue.field, issue.reason));
    }
    check_fraction("ward_fraction", record.ward_fraction)?;
    check_fraction("employment_fraction", record.employment_fraction)?;

    let mut mood_factor = mood_factor(record, weights);
    if ctx.umbrella_friend_count > 1 {
        mood_factor *= weights.umbrella_redundancy_discount;
    }
    if ctx.day_before_vacation {
        mood_factor *= weights.vacation_discount;
    }

    let raw = record.ward_fraction * record.employment_fraction * mood_factor;
    if !raw.is_finite() {
        return Err(format!("non-finite score {raw}"));
    }
    Ok(round2(raw.clamp(0.0, 1.0)))
}

/// Table lookup, except that an umbrella friend in IceCream covers
/// their own penalty.
fn mood_factor(record: &StaffRecord, weights: &ScoringConfig) -> f64 {
    if record.mood_status == MoodStatus::IceCream && record.umbrella_friend {
        return 1.0;
    }
    weights.mood_factors.factor(record.mood_status)
}

fn check_fraction(field: &str, value: f64) -> Result<(), String> {
    if value.is_finite() && (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{field} = {value} outside [0, 1]"))
    }
}

pub fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Count umbrella friends in a set of records.
pub fn umbrella_friend_count<'a>(records: impl IntoIterator<Item = &'a StaffRecord>) -> usize {
    records.into_iter().filter(|r| r.umbrella_friend).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::roster::FieldIssue;

    fn w() -> ScoringConfig {
        ScoringConfig::default()
    }

    fn solo() -> ScoreContext {
        ScoreContext::default()
    }

    #[test]
    fn product_of_fractions_and_mood() {
        let r = StaffRecord::new("AA", "A", 0.8, 0.5).with_mood(MoodStatus::Sunshine);
        assert_eq!(score(&r, solo(), &w()), 0.32);
    }

    #[test]
    fn ice_cream_penalty_unless_umbrella_friend() {
        let r = StaffRecord::new("IC", "I", 1.0, 1.0).with_mood(MoodStatus::IceCream);
        assert_eq!(score(&r, solo(), &w()), 0.3);

        let r = r.with_umbrella_friend(true);
        let ctx = ScoreContext { umbrella_friend_count: 1, ..solo() };
        assert_eq!(score(&r, ctx, &w()), 1.0);
    }

    #[test]
    fn redundancy_and_vacation_discounts_stack() {
        let r = StaffRecord::new("AA", "A", 1.0, 1.0);
        let two = ScoreContext { umbrella_friend_count: 2, day_before_vacation: false };
        assert_eq!(score(&r, two, &w()), 0.9);

        let both = ScoreContext { umbrella_friend_count: 2, day_before_vacation: true };
        assert_eq!(score(&r, both, &w()), 0.72);

        let vac = ScoreContext { umbrella_friend_count: 0, day_before_vacation: true };
        assert_eq!(score(&r, vac, &w()), 0.8);
    }

    #[test]
    fn unavailable_and_storm_are_zero() {
        let r = StaffRecord::new("AA", "A", 1.0, 1.0).with_available(false);
        assert_eq!(score(&r, solo(), &w()), 0.0);

        let r = StaffRecord::new("AA", "A", 1.0, 1.0)
            .with_mood(MoodStatus::Storm)
            .with_umbrella_friend(true);
        assert_eq!(score(&r, solo(), &w()), 0.0);
    }

    #[test]
    fn malformed_records_score_zero() {
        let mut r = StaffRecord::new("AA", "A", 1.0, 1.0);
        r.issues.push(FieldIssue {
            field: "ward_percent".into(),
            raw: serde_json::json!("abc"),
            reason: "not a number".into(),
        });
        assert_eq!(score(&r, solo(), &w()), 0.0);

        let mut r = StaffRecord::new("BB", "B", 1.0, 1.0);
        r.ward_fraction = f64::NAN;
        assert_eq!(score(&r, solo(), &w()), 0.0);
    }

    #[test]
    fn result_is_rounded_to_two_decimals() {
        let r = StaffRecord::new("AA", "A", 0.333, 0.777);
        assert_eq!(score(&r, solo(), &w()), 0.26);
    }
}
