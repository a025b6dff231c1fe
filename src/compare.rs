use serde::Serialize;
use crate::catalog::CatalogEntry;
use crate::error_handling::CatalogError;

/// Maximum number of entries shown side by side.
pub const MAX_COMPARED: usize = 3;

/// A side-by-side comparison of up to [`MAX_COMPARED`] catalog entries.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Comparison {
    selected: Vec<CatalogEntry>,
}

/// One feature and whether each compared entry lists it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureRow {
    pub feature: String,
    pub present: Vec<bool>,
}

impl Comparison {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> &[CatalogEntry] {
        &self.selected
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn contains(&self, entry: &CatalogEntry) -> bool {
        self.selected.iter().any(|e| e.card_key() == entry.card_key())
    }

    /// Adds an entry. Adding one that is already present is a no-op.
    pub fn add(&mut self, entry: CatalogEntry) -> Result<(), CatalogError> {
        if self.contains(&entry) {
            return Ok(());
        }
        if self.selected.len() >= MAX_COMPARED {
            return Err(CatalogError::ComparisonFull { max: MAX_COMPARED });
        }
        self.selected.push(entry);
        Ok(())
    }

    /// Removes the entry with the given load-time id; returns whether it was present.
    pub fn remove(&mut self, uid: u32) -> bool {
        let before = self.selected.len();
        self.selected.retain(|e| e.uid != uid);
        self.selected.len() != before
    }

    /// Adds the entry if absent, removes it otherwise.
    pub fn toggle(&mut self, entry: &CatalogEntry) -> Result<(), CatalogError> {
        if self.contains(entry) {
            self.remove(entry.uid);
            Ok(())
        } else {
            self.add(entry.clone())
        }
    }

    /// Union of every compared entry's features, in first-seen order.
    pub fn all_features(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for feature in self.selected.iter().flat_map(|e| e.features.iter()) {
            if !seen.contains(&feature.as_str()) {
                seen.push(feature);
            }
        }
        seen
    }

    pub fn feature_matrix(&self) -> Vec<FeatureRow> {
        self.all_features()
            .into_iter()
            .map(|feature| FeatureRow {
                feature: feature.to_string(),
                present: self
                    .selected
                    .iter()
                    .map(|e| e.features.iter().any(|f| f == feature))
                    .collect(),
            })
            .collect()
    }
}

/// Resolves a `NAME` or `NAME@VERSION` selector against the catalog.
///
/// A bare name picks the family's cheapest version. Names compare
/// case-insensitively here since selectors are typed by hand.
pub fn find_entry<'a>(entries: &'a [CatalogEntry], selector: &str) -> Result<&'a CatalogEntry, CatalogError> {
    let (name, version) = match selector.split_once('@') {
        Some((n, v)) => (n.trim(), Some(v.trim())),
        None => (selector.trim(), None),
    };

    let mut candidates = entries.iter().filter(|e| {
        e.name.eq_ignore_ascii_case(name)
            && version.is_none_or(|v| e.version.as_deref().is_some_and(|ev| ev.eq_ignore_ascii_case(v)))
    });

    match version {
        Some(_) => candidates.next(),
        None => candidates.min_by(|a, b| a.price.total_cmp(&b.price)),
    }
    .ok_or_else(|| CatalogError::NotFound(selector.to_string()))
}
