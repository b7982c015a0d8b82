use serde::{Deserialize, Serialize};

/// Allocation constants and triage thresholds for the CIAF heuristic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CiafConfig {
    pub triple_failure_factor: f64,
    pub stunting_underweight_factor: f64,
    pub wasting_underweight_factor: f64,
    pub referral_rate_pct: f64,
    pub referral_count: u64,
    pub feeding_rate_pct: f64,
    pub feeding_count: u64,
    pub outreach_rate_pct: f64,
}

impl Default for CiafConfig {
    fn default() -> Self {
        Self {
            triple_failure_factor: 0.15,
            stunting_underweight_factor: 0.6,
            wasting_underweight_factor: 0.8,
            referral_rate_pct: 5.0,
            referral_count: 20,
            feeding_rate_pct: 10.0,
            feeding_count: 30,
            outreach_rate_pct: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CiafConfigError {
    #[error("{name} must be a fraction between 0 and 1, got {value}")]
    FactorOutOfRange { name: &'static str, value: f64 },
    #[error("{name} must be a finite, non-negative percentage, got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },
}

impl CiafConfig {
    pub fn validate(&self) -> Result<(), CiafConfigError> {
        for (name, value) in [
            ("triple_failure_factor", self.triple_failure_factor),
            ("stunting_underweight_factor", self.stunting_underweight_factor),
            ("wasting_underweight_factor", self.wasting_underweight_factor),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(CiafConfigError::FactorOutOfRange { name, value });
            }
        }

        for (name, value) in [
            ("referral_rate_pct", self.referral_rate_pct),
            ("feeding_rate_pct", self.feeding_rate_pct),
            ("outreach_rate_pct", self.outreach_rate_pct),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(CiafConfigError::InvalidThreshold { name, value });
            }
        }

        Ok(())
    }
}
