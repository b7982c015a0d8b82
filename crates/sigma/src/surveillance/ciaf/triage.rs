use super::config::CiafConfig;
use super::estimate::CiafGroups;
use crate::surveillance::percentage;
use serde::{Deserialize, Serialize};

/// Village-level follow-up, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Triage {
    Referral,
    IntensiveFeeding,
    Outreach,
    BaselineEducation,
}

impl Triage {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Referral => "Priority referral",
            Self::IntensiveFeeding => "Intensive feeding",
            Self::Outreach => "Outreach",
            Self::BaselineEducation => "Baseline education",
        }
    }

    pub const fn recommendation(self) -> &'static str {
        match self {
            Self::Referral => {
                "Refer children with multiple failures to the health facility for clinical assessment and therapeutic care"
            }
            Self::IntensiveFeeding => {
                "Run supplementary feeding (PMT) with intensive nutrition counseling for caregivers"
            }
            Self::Outreach => {
                "Schedule posyandu outreach on sanitation, clean water, and complementary feeding"
            }
            Self::BaselineEducation => {
                "Maintain monthly growth monitoring and routine nutrition education"
            }
        }
    }
}

/// First matching rule wins: triple failure, then C, then E.
pub fn recommend(groups: &CiafGroups, population: u64, config: &CiafConfig) -> Triage {
    let population = population as f64;
    let triple_rate = percentage(groups.triple_failure as f64, population);
    let wasting_underweight_rate = percentage(groups.wasting_underweight as f64, population);
    let stunting_underweight_rate = percentage(groups.stunting_underweight as f64, population);

    if triple_rate > config.referral_rate_pct || groups.triple_failure > config.referral_count {
        Triage::Referral
    } else if wasting_underweight_rate > config.feeding_rate_pct
        || groups.wasting_underweight > config.feeding_count
    {
        Triage::IntensiveFeeding
    } else if stunting_underweight_rate > config.outreach_rate_pct {
        Triage::Outreach
    } else {
        Triage::BaselineEducation
    }
}
