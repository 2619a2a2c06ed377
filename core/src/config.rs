use crate::roster::MoodStatus;
use serde::{Deserialize, Serialize};

/// Weights applied by the scorer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScoringConfig {
    pub mood_factors: MoodFactors,
    /// Multiplier applied to every mood factor when more than one
    /// umbrella friend is present in the shift.
    pub umbrella_redundancy_discount: f64,
    /// Multiplier applied on the day before a vacation.
    pub vacation_discount: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            mood_factors: MoodFactors::default(),
            umbrella_redundancy_discount: 0.9,
            vacation_discount: 0.8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MoodFactors {
    pub normal:    f64,
    pub storm:     f64,
    pub sunshine:  f64,
    pub ice_cream: f64,
}

impl Default for MoodFactors {
    fn default() -> Self {
        Self {
            normal:    1.0,
            storm:     0.0,
            sunshine:  0.8,
            ice_cream: 0.3,
        }
    }
}

impl MoodFactors {
    pub fn factor(&self, mood: MoodStatus) -> f64 {
        match mood {
            MoodStatus::Normal   => self.normal,
            MoodStatus::Storm    => self.storm,
            MoodStatus::Sunshine => self.sunshine,
            MoodStatus::IceCream => self.ice_cream,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RosterConfig {
    /// Records at or below this employment fraction are dropped at load.
    pub min_employment_fraction: f64,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self { min_employment_fraction: 0.20 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeskConfig {
    pub scoring: ScoringConfig,
    /// Candidates must score strictly above this value.
    /// 0.0 is the doctor-view policy; the legacy wheel used 0.5.
    pub eligibility_threshold: f64,
    pub roster: RosterConfig,
    /// Number of rows shown in the priority list.
    pub priority_list_len: usize,
    /// Reserved for a calendar integration. Always false today.
    pub day_before_vacation: bool,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            scoring: ScoringConfig::default(),
            eligibility_threshold: 0.0,
            roster: RosterConfig::default(),
            priority_list_len: 8,
            day_before_vacation: false,
        }
    }
}

impl DeskConfig {
    /// Load from `{data_dir}/desk_config.json`.
    /// Missing keys fall back to their defaults.
    pub fn load(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/desk_config.json");
        let content = std::fs::read_to_string(&path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: DeskConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Load from the data directory, or fall back to defaults when the
    /// file is absent. Parse errors are still reported.
    pub fn load_or_default(data_dir: &str) -> anyhow::Result<Self> {
        let path = format!("{data_dir}/desk_config.json");
        if !std::path::Path::new(&path).exists() {
            log::info!("config: {path} not found, using defaults");
            return Ok(Self::default());
        }
        Self::load(data_dir)
    }
}
