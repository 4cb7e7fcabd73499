//! Rule-based workout record extraction
//!
//! Static patterns are compiled once using `once_cell::sync::Lazy`, so an
//! `Extractor` is free to construct and safe to share across sessions.

use once_cell::sync::Lazy;
use regex::Regex;

use voice_coach_core::{Activity, ExtractedRecord, Intensity};

// =============================================================================
// STATIC KEYWORD TABLES - Order matters, first matching entry wins
// =============================================================================

/// Activity keyword sets, matched as substrings of the lowercased text
static ACTIVITY_KEYWORDS: &[(Activity, &[&str])] = &[
    (Activity::Running, &["run", "jog", "ran"]),
    (Activity::Cycling, &["bike", "cycle", "cycling", "rode"]),
    (Activity::Yoga, &["yoga", "stretch"]),
    (Activity::WeightTraining, &["weight", "lift", "gym", "strength"]),
    (Activity::Swimming, &["swim", "pool"]),
    (Activity::Walking, &["walk", "walked"]),
];

static INTENSITY_KEYWORDS: &[(Intensity, &[&str])] = &[
    (Intensity::Easy, &["easy", "light", "gentle"]),
    (Intensity::Medium, &["medium", "moderate", "normal"]),
    (Intensity::Hard, &["hard", "intense", "difficult", "heavy"]),
];

// "min" also covers "mins", "minute" and "minutes"
static DURATION_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*(?:min|minute|minutes)").unwrap());

/// Workout record extractor
///
/// Pure and deterministic: the same text always yields the same record.
#[derive(Debug, Clone, Copy, Default)]
pub struct Extractor;

impl Extractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract a record, or `None` unless both an activity and a positive
    /// duration are present
    pub fn extract(&self, text: &str) -> Option<ExtractedRecord> {
        let lowered = text.to_lowercase();

        let activity = self.extract_activity(&lowered)?;
        let duration = self.extract_duration(&lowered)?;
        let intensity = self.extract_intensity(&lowered);

        match ExtractedRecord::new(activity, duration, intensity) {
            Ok(record) => {
                tracing::debug!(
                    activity = %record.activity,
                    duration = record.duration,
                    intensity = %record.intensity,
                    "Extracted workout record"
                );
                Some(record)
            },
            Err(e) => {
                tracing::debug!(error = %e, "Discarded invalid extraction");
                None
            },
        }
    }

    /// First activity whose keyword set hits, in table order
    pub fn extract_activity(&self, lowered: &str) -> Option<Activity> {
        ACTIVITY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(activity, _)| activity.clone())
    }

    /// First integer immediately followed by a minute unit
    ///
    /// Zero and values that do not fit in `u32` count as absent.
    pub fn extract_duration(&self, lowered: &str) -> Option<u32> {
        let caps = DURATION_PATTERN.captures(lowered)?;
        caps.get(1)?
            .as_str()
            .parse::<u32>()
            .ok()
            .filter(|minutes| *minutes > 0)
    }

    /// First intensity set that hits, in easy / medium / hard order
    pub fn extract_intensity(&self, lowered: &str) -> Option<Intensity> {
        INTENSITY_KEYWORDS
            .iter()
            .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
            .map(|(intensity, _)| *intensity)
    }
}

/// Convenience wrapper around [`Extractor::extract`]
pub fn extract(text: &str) -> Option<ExtractedRecord> {
    Extractor::new().extract(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_running_record() {
        let record = extract("I ran for 30 minutes").unwrap();
        assert_eq!(record.activity, Activity::Running);
        assert_eq!(record.duration, 30);
        assert_eq!(record.intensity, Intensity::Medium);
    }

    #[test]
    fn test_missing_duration_yields_nothing() {
        assert!(extract("I went for a walk").is_none());
        assert!(extract("I did yoga for an hour").is_none());
    }

    #[test]
    fn test_missing_activity_yields_nothing() {
        assert!(extract("I spent 45 minutes on the couch").is_none());
    }

    #[test]
    fn test_zero_duration_yields_nothing() {
        assert!(extract("I ran 0 minutes").is_none());
    }

    #[test]
    fn test_oversized_duration_yields_nothing() {
        assert!(extract("I ran 99999999999 minutes").is_none());
    }

    #[test]
    fn test_intensity_detection() {
        let record = extract("I did a hard 20 minute run").unwrap();
        assert_eq!(record.intensity, Intensity::Hard);

        let record = extract("Gentle yoga, 15 min").unwrap();
        assert_eq!(record.activity, Activity::Yoga);
        assert_eq!(record.intensity, Intensity::Easy);

        let record = extract("moderate swim in the pool for 40 minutes").unwrap();
        assert_eq!(record.activity, Activity::Swimming);
        assert_eq!(record.intensity, Intensity::Medium);
    }

    #[test]
    fn test_intensity_set_order() {
        // Easy is checked before hard
        let record = extract("an easy run that felt hard, 25 minutes").unwrap();
        assert_eq!(record.intensity, Intensity::Easy);
    }

    #[test]
    fn test_activity_table_order() {
        // Running precedes walking in the table
        let record = extract("I walked then ran for 10 minutes").unwrap();
        assert_eq!(record.activity, Activity::Running);

        let record = extract("Rode my bike for 60 mins").unwrap();
        assert_eq!(record.activity, Activity::Cycling);
        assert_eq!(record.duration, 60);

        let record = extract("Heavy lifting at the gym, 50 minutes").unwrap();
        assert_eq!(record.activity, Activity::WeightTraining);
        assert_eq!(record.intensity, Intensity::Hard);
    }

    #[test]
    fn test_case_insensitive() {
        let lower = extract("i ran 30 minutes").unwrap();
        let upper = extract("I RAN 30 MINUTES").unwrap();
        assert_eq!(lower, upper);
    }

    #[test]
    fn test_first_duration_wins() {
        let record = extract("jogged 12 minutes, then walked 30 minutes").unwrap();
        assert_eq!(record.duration, 12);
    }

    #[test]
    fn test_duration_without_space() {
        assert_eq!(Extractor::new().extract_duration("walk 45min"), Some(45));
    }

    #[test]
    fn test_record_wire_shape() {
        let record = extract("I went walking for 20 minutes").unwrap();
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["activity"], "walking");
        assert_eq!(json["duration"], 20);
        assert_eq!(json["difficulty"], "medium");
    }
}
