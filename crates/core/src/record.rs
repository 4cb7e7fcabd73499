//! Extracted workout records
//!
//! A record is the structured `{activity, duration, intensity}` tuple derived
//! from free-form speech. Records are immutable once produced.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::{Error, Result};

/// Canonical activity kinds
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Activity {
    Running,
    Cycling,
    Yoga,
    WeightTraining,
    Swimming,
    Walking,
    /// Activity named by a client that is not in the canonical table
    Other(String),
}

impl Activity {
    /// Display name, also used on the wire
    pub fn as_str(&self) -> &str {
        match self {
            Activity::Running => "running",
            Activity::Cycling => "cycling",
            Activity::Yoga => "yoga",
            Activity::WeightTraining => "weight training",
            Activity::Swimming => "swimming",
            Activity::Walking => "walking",
            Activity::Other(name) => name,
        }
    }

    /// Parse a display name; unknown names become `Other`
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "running" => Activity::Running,
            "cycling" => Activity::Cycling,
            "yoga" => Activity::Yoga,
            "weight training" => Activity::WeightTraining,
            "swimming" => Activity::Swimming,
            "walking" => Activity::Walking,
            _ => Activity::Other(name.trim().to_string()),
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Activity {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Activity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Activity::from_name(&name))
    }
}

/// Workout intensity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intensity {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Intensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intensity::Easy => "easy",
            Intensity::Medium => "medium",
            Intensity::Hard => "hard",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "easy" => Some(Intensity::Easy),
            "medium" => Some(Intensity::Medium),
            "hard" => Some(Intensity::Hard),
            _ => None,
        }
    }
}

impl fmt::Display for Intensity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured workout record extracted from conversation text
///
/// Intensity travels as `difficulty` on the wire; that is the field name
/// the mobile client reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedRecord {
    pub activity: Activity,
    /// Duration in whole minutes, always > 0
    pub duration: u32,
    #[serde(rename = "difficulty", default)]
    pub intensity: Intensity,
}

impl ExtractedRecord {
    /// Build a record, defaulting a missing intensity to `Medium`.
    ///
    /// Returns an error instead of a zero-valued record when the activity is
    /// empty or the duration is zero.
    pub fn new(activity: Activity, duration: u32, intensity: Option<Intensity>) -> Result<Self> {
        let record = Self {
            activity,
            duration,
            intensity: intensity.unwrap_or_default(),
        };
        record.validate()?;
        Ok(record)
    }

    /// Check the record invariants
    pub fn validate(&self) -> Result<()> {
        if self.activity.as_str().trim().is_empty() {
            return Err(Error::InvalidRecord("activity must not be empty".to_string()));
        }
        if self.duration == 0 {
            return Err(Error::InvalidRecord("duration must be positive".to_string()));
        }
        Ok(())
    }
}
