//! End-to-end checks of the grouping and scoring core, driven through the
//! same ingestion path the binary uses.

use cadguide::catalog::{self, BuiltinSource, CatalogEntry, RawEntry};
use cadguide::processor::group_entries;
use cadguide::quiz::{QuizAnswers, QuizResult, NO_BUDGET_LIMIT};
use cadguide::scorer::{recommend, ScoringWeights};
use serde_json::json;

fn load(records: serde_json::Value) -> Vec<CatalogEntry> {
    let raws: Vec<RawEntry> = serde_json::from_value(records).expect("records should deserialize");
    raws.into_iter()
        .enumerate()
        .map(|(i, raw)| catalog::ingest(raw, i as u32 + 1).expect("record should be valid"))
        .collect()
}

fn quiz(primary_use: &str, experience: &str, budget: f64, platform: &str, features: &[&str]) -> QuizResult {
    QuizAnswers {
        primary_use: Some(primary_use.to_string()),
        experience: Some(experience.to_string()),
        budget: Some(budget),
        platform: Some(platform.to_string()),
        features: Some(features.iter().map(|f| f.to_string()).collect()),
    }
    .finalize()
}

#[test]
fn reference_catalog_returns_only_the_free_mechanical_tool() {
    let entries = load(json!([
        {"name": "A", "price": 0, "difficulty": 1, "primaryUse": ["mechanical"],
         "platforms": ["Web"], "features": ["X"], "rating": 4.0},
        {"name": "B", "price": 500, "difficulty": 4, "primaryUse": ["architectural"],
         "platforms": ["Windows"], "features": ["Y"], "rating": 4.5}
    ]));
    let answers = quiz("mechanical", "beginner", 0.0, "any", &["X"]);

    let ranked = recommend(&entries, &answers, &ScoringWeights::default());

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].entry.name, "A");
    assert!((ranked[0].score - 99.0).abs() < 1e-9);
}

#[test]
fn reference_grouping_example() {
    let entries = load(json!([
        {"name": "X", "version": "Pro", "price": 50},
        {"name": "X", "version": "Lite", "price": 10},
        {"name": "Y", "price": 0}
    ]));

    let groups = group_entries(&entries);

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].price_range, "$10 - $50");
    assert_eq!(groups[0].main_version.version.as_deref(), Some("Lite"));
    assert_eq!(groups[0].versions[1].version.as_deref(), Some("Pro"));
    assert_eq!(groups[1].price_range, "Free");
}

#[test]
fn null_price_counts_as_free() {
    let entries = load(json!([{"name": "Z", "price": null, "difficulty": 2}]));
    let answers = quiz("any", "intermediate", 0.0, "any", &[]);

    let ranked = recommend(&entries, &answers, &ScoringWeights::default());

    assert_eq!(ranked[0].breakdown.budget, 30.0);
    assert_eq!(group_entries(&entries)[0].price_range, "Free");
}

#[test]
fn scoring_is_deterministic() {
    let entries = catalog::load_catalog(&[&BuiltinSource]).unwrap().entries;
    let answers = quiz("mechanical", "intermediate", 200.0, "windows", &["parametric", "simulation"]);
    let weights = ScoringWeights::default();

    let first: Vec<u32> = recommend(&entries, &answers, &weights).iter().map(|s| s.entry.uid).collect();
    let second: Vec<u32> = recommend(&entries, &answers, &weights).iter().map(|s| s.entry.uid).collect();

    assert!(!first.is_empty());
    assert_eq!(first, second);
}

#[test]
fn builtin_results_respect_budget_ceiling_and_threshold() {
    let entries = catalog::load_catalog(&[&BuiltinSource]).unwrap().entries;
    let answers = quiz("architectural", "advanced", 50.0, "any", &[]);

    let ranked = recommend(&entries, &answers, &ScoringWeights::default());

    assert!(ranked.iter().all(|s| s.entry.price <= 100.0));
    assert!(ranked.iter().all(|s| s.score >= 10.0));
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
}

#[test]
fn unlimited_budget_keeps_premium_tiers() {
    let entries = catalog::load_catalog(&[&BuiltinSource]).unwrap().entries;
    let answers = quiz("mechanical", "professional", NO_BUDGET_LIMIT, "windows", &[]);

    let ranked = recommend(&entries, &answers, &ScoringWeights::default());

    assert!(ranked.iter().any(|s| s.entry.name == "SolidWorks"));
}

#[test]
fn builtin_families_cover_every_entry() {
    let entries = catalog::load_catalog(&[&BuiltinSource]).unwrap().entries;
    let groups = group_entries(&entries);

    let total: usize = groups.iter().map(|g| g.versions.len()).sum();
    assert_eq!(total, entries.len());

    let alibre = groups.iter().find(|g| g.name == "Alibre Design").expect("Alibre family");
    assert_eq!(alibre.versions.len(), 3);
    assert_eq!(alibre.main_version.version.as_deref(), Some("Atom3D"));
    assert_eq!(alibre.difficulty_range, "1 - 3");
}

#[test]
fn negative_zero_price_renders_as_zero_in_family_range() {
    let entries = load(json!([
        {"name": "X", "price": -0.0},
        {"name": "X", "price": 50}
    ]));

    let groups = group_entries(&entries);

    assert_eq!(groups[0].price_range, "$0 - $50");
}
