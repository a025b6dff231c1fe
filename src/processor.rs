use fuzzy_matcher::{FuzzyMatcher, skim::SkimMatcherV2};
use indexmap::IndexMap;
use serde::Serialize;
use crate::catalog::{CatalogEntry, format_amount};

/// All catalog entries sharing a product name, cheapest first.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SoftwareGroup {
    /// URL-style slug of the name ("Fusion 360" -> "fusion-360").
    pub id: String,
    pub name: String,
    pub description: String,
    /// "$10 - $50" for several versions, "Free" or "$25" for one.
    pub price_range: String,
    /// "1 - 3" for several versions, "2" for one.
    pub difficulty_range: String,
    /// Sorted ascending by price; never empty.
    pub versions: Vec<CatalogEntry>,
    /// Always equal to `versions[0]`.
    pub main_version: CatalogEntry,
}

impl SoftwareGroup {
    /// Builds a family from a non-empty bucket of same-named entries.
    ///
    /// Returns `None` for an empty bucket so callers never see a family
    /// without a main version.
    fn from_bucket(name: String, mut versions: Vec<CatalogEntry>) -> Option<Self> {
        // sort_by is stable: equal prices keep input order
        versions.sort_by(|a, b| a.price.total_cmp(&b.price));
        let main_version = versions.first()?.clone();
        let last = versions.last()?;

        let price_range = if versions.len() > 1 {
            format!("{} - {}", format_amount(main_version.price), format_amount(last.price))
        } else if main_version.is_free() {
            "Free".to_string()
        } else {
            format_amount(main_version.price)
        };

        let min_difficulty = versions.iter().map(|v| v.difficulty.level()).min()?;
        let max_difficulty = versions.iter().map(|v| v.difficulty.level()).max()?;
        let difficulty_range = if versions.len() > 1 {
            format!("{} - {}", min_difficulty, max_difficulty)
        } else {
            min_difficulty.to_string()
        };

        Some(Self {
            id: slugify(&name),
            description: main_version.description.clone(),
            name,
            price_range,
            difficulty_range,
            versions,
            main_version,
        })
    }

    pub fn version_count(&self) -> usize {
        self.versions.len()
    }
}

fn slugify(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("-")
}

/// Groups entries into software families keyed by exact name.
///
/// The key is case-sensitive and untrimmed: "FreeCAD" and "Freecad" form two
/// families. Families come out in the order their name is first seen.
pub fn group_entries(entries: &[CatalogEntry]) -> Vec<SoftwareGroup> {
    let mut buckets: IndexMap<&str, Vec<CatalogEntry>> = IndexMap::new();
    for entry in entries {
        buckets.entry(entry.name.as_str()).or_default().push(entry.clone());
    }

    buckets
        .into_iter()
        .filter_map(|(name, versions)| SoftwareGroup::from_bucket(name.to_string(), versions))
        .collect()
}

/// Fuzzy-filters entries for the browse view.
///
/// An empty query returns every entry in input order. Otherwise entries are
/// ranked by their best match on name (boosted), version, or description.
pub fn search<'a>(entries: &'a [CatalogEntry], query: &str) -> Vec<&'a CatalogEntry> {
    if query.is_empty() {
        return entries.iter().collect();
    }

    let matcher = SkimMatcherV2::default();

    let mut scored: Vec<(i64, &CatalogEntry)> = entries
        .iter()
        .filter_map(|entry| {
            let s_name = matcher.fuzzy_match(&entry.name, query).map(|s| s + 10);
            let s_version = entry
                .version
                .as_deref()
                .and_then(|v| matcher.fuzzy_match(v, query))
                .map(|s| s + 5);
            let s_desc = matcher.fuzzy_match(&entry.description, query);

            [s_name, s_version, s_desc]
                .iter()
                .filter_map(|&s| s)
                .max()
                .map(|score| (score, entry))
        })
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, entry)| entry).collect()
}

/// Keeps entries tagged with `category` (case-insensitive).
pub fn filter_by_category<'a>(entries: &[&'a CatalogEntry], category: &str) -> Vec<&'a CatalogEntry> {
    entries
        .iter()
        .filter(|e| e.categories.iter().any(|c| c.eq_ignore_ascii_case(category)))
        .copied()
        .collect()
}
