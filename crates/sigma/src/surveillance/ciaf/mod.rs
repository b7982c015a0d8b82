//! Composite Index of Anthropometric Failure estimates.
//!
//! Only aggregate counts are reported per village and month, so the joint
//! distribution of stunting, wasting, and underweight is estimated with a
//! fixed allocation heuristic (see [`estimate_groups`]).

mod config;
mod estimate;
mod triage;

pub use config::{CiafConfig, CiafConfigError};
pub use estimate::{estimate_groups, CiafGroups};
pub use triage::{recommend, Triage};

use super::domain::{RecordField, TransactionRecord};
use super::grouping::UnitKey;
use super::percentage;
use super::reference::normalize_feature_name;
use estimate::count;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize)]
pub struct CiafCategory {
    pub code: &'static str,
    pub label: &'static str,
    pub count: u64,
    pub percentage: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CiafVillage {
    pub village: String,
    pub facility: String,
    pub feature_key: String,
    pub population: u64,
    pub groups: CiafGroups,
    pub total_failures: u64,
    pub ciaf_rate: f64,
    pub risk_score: f64,
    pub triage: Triage,
    pub triage_label: &'static str,
    pub recommendation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct CiafAnalysis {
    pub population: u64,
    pub stunted: u64,
    pub wasted: u64,
    pub underweight: u64,
    pub groups: CiafGroups,
    pub total_failures: u64,
    pub ciaf_rate: f64,
    pub distribution: Vec<CiafCategory>,
    pub villages: Vec<CiafVillage>,
}

impl CiafAnalysis {
    pub fn referrals(&self) -> impl Iterator<Item = &CiafVillage> {
        self.villages
            .iter()
            .filter(|village| village.triage == Triage::Referral)
    }
}

#[derive(Debug, Default)]
struct VillageTally {
    village: String,
    facility: String,
    population: u64,
    groups: CiafGroups,
}

/// Population and per-village CIAF estimates.
///
/// Groups are estimated per record row and then summed. The population
/// denominator is the number of children weighed.
pub fn analyze(records: &[TransactionRecord], config: &CiafConfig) -> CiafAnalysis {
    let mut villages: BTreeMap<UnitKey, VillageTally> = BTreeMap::new();
    let mut groups = CiafGroups::default();
    let (mut population, mut stunted, mut wasted, mut underweight) = (0u64, 0u64, 0u64, 0u64);

    for record in records {
        let s = count(record.amount(RecordField::Stunted));
        let w = count(record.amount(RecordField::Wasted));
        let u = count(record.amount(RecordField::Underweight));
        let n = count(record.amount(RecordField::Weighed));
        let row = estimate_groups(s, w, u, config);

        groups += row;
        population = population.saturating_add(n);
        stunted = stunted.saturating_add(s);
        wasted = wasted.saturating_add(w);
        underweight = underweight.saturating_add(u);

        let tally = villages
            .entry(UnitKey::new(&record.facility, &record.village))
            .or_insert_with(|| VillageTally {
                village: record.village.trim().to_string(),
                facility: record.facility.trim().to_string(),
                ..VillageTally::default()
            });
        tally.population = tally.population.saturating_add(n);
        tally.groups += row;
    }

    let mut villages: Vec<CiafVillage> = villages
        .into_values()
        .map(|tally| village_view(tally, config))
        .collect();
    villages.sort_by(|a, b| {
        b.risk_score
            .total_cmp(&a.risk_score)
            .then_with(|| a.village.cmp(&b.village))
    });

    let total_failures = groups.total();

    CiafAnalysis {
        population,
        stunted,
        wasted,
        underweight,
        groups,
        total_failures,
        ciaf_rate: percentage(total_failures as f64, population as f64),
        distribution: distribution(&groups, population),
        villages,
    }
}

fn village_view(tally: VillageTally, config: &CiafConfig) -> CiafVillage {
    let population = tally.population as f64;
    let total_failures = tally.groups.total();
    let triage = recommend(&tally.groups, tally.population, config);

    CiafVillage {
        feature_key: normalize_feature_name(&tally.village),
        village: tally.village,
        facility: tally.facility,
        population: tally.population,
        groups: tally.groups,
        total_failures,
        ciaf_rate: percentage(total_failures as f64, population),
        risk_score: percentage(tally.groups.weighted_burden() as f64, population),
        triage,
        triage_label: triage.label(),
        recommendation: triage.recommendation(),
    }
}

/// Seven exclusive categories, A (no failure) first, ready for a pie chart.
pub fn distribution(groups: &CiafGroups, population: u64) -> Vec<CiafCategory> {
    let no_failure = population.saturating_sub(groups.total());
    let population = population as f64;

    [
        ("A", "No failure", no_failure),
        ("B", "Wasting only", groups.wasting_only),
        ("C", "Wasting and underweight", groups.wasting_underweight),
        ("D", "Wasting, stunting, and underweight", groups.triple_failure),
        ("E", "Stunting and underweight", groups.stunting_underweight),
        ("F", "Stunting only", groups.stunting_only),
        ("Y", "Underweight only", groups.underweight_only),
    ]
    .into_iter()
    .map(|(code, label, count)| CiafCategory {
        code,
        label,
        count,
        percentage: percentage(count as f64, population),
    })
    .collect()
}
