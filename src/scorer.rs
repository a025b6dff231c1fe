//! Quiz-driven recommendation scoring.
//!
//! Each entry gets an additive score built from six independent factors, then
//! the list is filtered and stably sorted by score.

use serde::{Deserialize, Serialize};
use crate::catalog::CatalogEntry;
use crate::processor::{SoftwareGroup, group_entries};
use crate::quiz::QuizResult;

pub const BUDGET_WEIGHT: f64 = 30.0;
/// How much of the budget reward is lost as price approaches the budget.
pub const BUDGET_RATIO_SPAN: f64 = 10.0;
pub const OVER_BUDGET_PENALTY: f64 = 20.0;
pub const PRIMARY_USE_WEIGHT: f64 = 25.0;
pub const ANY_USE_WEIGHT: f64 = 15.0;
pub const EXPERIENCE_EXACT_WEIGHT: f64 = 20.0;
pub const EXPERIENCE_NEAR_WEIGHT: f64 = 15.0;
pub const EXPERIENCE_FAR_WEIGHT: f64 = 5.0;
pub const PLATFORM_WEIGHT: f64 = 10.0;
pub const FEATURES_WEIGHT: f64 = 10.0;
pub const MIN_SCORE: f64 = 10.0;
/// Entries priced above `budget * BUDGET_CEILING_FACTOR` are dropped outright.
pub const BUDGET_CEILING_FACTOR: f64 = 2.0;

/// The wildcard answer for use case and platform.
pub const ANY: &str = "any";

/// Tunable scoring constants. Any field missing from a config file keeps its default.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub budget: f64,
    pub budget_ratio_span: f64,
    pub over_budget_penalty: f64,
    pub primary_use: f64,
    pub any_use: f64,
    pub experience_exact: f64,
    pub experience_near: f64,
    pub experience_far: f64,
    pub platform: f64,
    pub features: f64,
    pub min_score: f64,
    pub budget_ceiling_factor: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            budget: BUDGET_WEIGHT,
            budget_ratio_span: BUDGET_RATIO_SPAN,
            over_budget_penalty: OVER_BUDGET_PENALTY,
            primary_use: PRIMARY_USE_WEIGHT,
            any_use: ANY_USE_WEIGHT,
            experience_exact: EXPERIENCE_EXACT_WEIGHT,
            experience_near: EXPERIENCE_NEAR_WEIGHT,
            experience_far: EXPERIENCE_FAR_WEIGHT,
            platform: PLATFORM_WEIGHT,
            features: FEATURES_WEIGHT,
            min_score: MIN_SCORE,
            budget_ceiling_factor: BUDGET_CEILING_FACTOR,
        }
    }
}

/// Per-factor contributions for one entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub budget: f64,
    pub primary_use: f64,
    pub experience: f64,
    pub platform: f64,
    pub features: f64,
    pub rating: f64,
}

impl ScoreBreakdown {
    pub fn total(&self) -> f64 {
        self.budget + self.primary_use + self.experience + self.platform + self.features + self.rating
    }
}

/// A catalog entry with its match score against a quiz result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredEntry {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    pub score: f64,
    pub breakdown: ScoreBreakdown,
}

fn budget_score(price: f64, budget: f64, w: &ScoringWeights) -> f64 {
    if price == 0.0 && budget == 0.0 {
        w.budget
    } else if budget > 0.0 && price <= budget {
        w.budget - (price / budget) * w.budget_ratio_span
    } else {
        // any paid entry with a zero budget lands here too
        -w.over_budget_penalty
    }
}

fn primary_use_score(entry: &CatalogEntry, wanted: &str, w: &ScoringWeights) -> f64 {
    if entry.primary_use.iter().any(|u| u == wanted) {
        w.primary_use
    } else if wanted == ANY || entry.primary_use.iter().any(|u| u == ANY) {
        w.any_use
    } else {
        0.0
    }
}

fn experience_score(difficulty: u8, level: u8, w: &ScoringWeights) -> f64 {
    match difficulty.abs_diff(level) {
        0 => w.experience_exact,
        1 => w.experience_near,
        2 => w.experience_far,
        _ => 0.0,
    }
}

fn platform_score(entry: &CatalogEntry, wanted: &str, w: &ScoringWeights) -> f64 {
    let wanted = wanted.to_lowercase();
    if wanted == ANY || entry.platforms.iter().any(|p| p.to_lowercase().contains(&wanted)) {
        w.platform
    } else {
        0.0
    }
}

fn features_score(entry: &CatalogEntry, wanted: &[String], w: &ScoringWeights) -> f64 {
    if wanted.is_empty() {
        return 0.0;
    }
    let entry_features: Vec<String> = entry.features.iter().map(|f| f.to_lowercase()).collect();
    let matched = wanted
        .iter()
        .filter(|want| {
            let want = want.to_lowercase();
            entry_features.iter().any(|f| f.contains(&want))
        })
        .count();
    (matched as f64 / wanted.len() as f64) * w.features
}

/// Scores a single entry; never filters.
pub fn score_entry(entry: &CatalogEntry, answers: &QuizResult, weights: &ScoringWeights) -> ScoreBreakdown {
    ScoreBreakdown {
        budget: budget_score(entry.price, answers.budget, weights),
        primary_use: primary_use_score(entry, &answers.primary_use, weights),
        experience: experience_score(entry.difficulty.level(), answers.experience_level, weights),
        platform: platform_score(entry, &answers.platform, weights),
        features: features_score(entry, &answers.features, weights),
        rating: entry.rating,
    }
}

/// Whether a scored entry survives the hard budget ceiling and the score threshold.
fn passes_filters(entry: &CatalogEntry, score: f64, budget: f64, w: &ScoringWeights) -> bool {
    if budget > 0.0 && entry.price > budget * w.budget_ceiling_factor {
        return false;
    }
    score >= w.min_score
}

/// Scores, filters, and ranks the catalog against a quiz result.
///
/// Ties keep input order, so identical inputs always give identical output.
pub fn recommend(entries: &[CatalogEntry], answers: &QuizResult, weights: &ScoringWeights) -> Vec<ScoredEntry> {
    let mut scored: Vec<ScoredEntry> = entries
        .iter()
        .filter_map(|entry| {
            let breakdown = score_entry(entry, answers, weights);
            let score = breakdown.total();
            passes_filters(entry, score, answers.budget, weights).then(|| ScoredEntry {
                entry: entry.clone(),
                score,
                breakdown,
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));

    tracing::debug!(
        candidates = entries.len(),
        matched = scored.len(),
        "Scored catalog against quiz answers"
    );

    scored
}

/// Like [`recommend`], keeping only the best `limit` entries.
pub fn recommend_top(
    entries: &[CatalogEntry],
    answers: &QuizResult,
    weights: &ScoringWeights,
    limit: usize,
) -> Vec<ScoredEntry> {
    let mut ranked = recommend(entries, answers, weights);
    ranked.truncate(limit);
    ranked
}

/// Re-derives families from a ranked list.
///
/// Only surviving entries appear in each family, and families are ordered by
/// the rank of their best entry.
pub fn group_scored(scored: &[ScoredEntry]) -> Vec<SoftwareGroup> {
    let entries: Vec<CatalogEntry> = scored.iter().map(|s| s.entry.clone()).collect();
    group_entries(&entries)
}
