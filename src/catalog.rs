use crate::error_handling::{CatalogError, Context, Result};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// The sample catalog compiled into the binary.
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

/// How a product is billed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum PriceType {
    Subscription,
    OneTime,
    Free,
}

impl PriceType {
    /// Parses the loosely formatted labels found in catalog records.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "subscription" | "monthly" => Some(PriceType::Subscription),
            "one-time" | "one_time" | "onetime" | "perpetual" => Some(PriceType::OneTime),
            "free" => Some(PriceType::Free),
            _ => None,
        }
    }
}

/// Ordinal difficulty, 1 (beginner) through 4 (expert).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 4;

    /// Builds a difficulty, clamping out-of-range levels into 1..=4.
    pub fn new(level: u8) -> Self {
        Difficulty(level.clamp(Self::MIN, Self::MAX))
    }

    pub fn level(self) -> u8 {
        self.0
    }

    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "Beginner",
            2 => "Intermediate",
            3 => "Advanced",
            _ => "Expert",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty(Self::MIN)
    }
}

/// One software product (or one tier of a product) in the catalog.
///
/// Entries are validated once at load time and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogEntry {
    /// Globally unique id assigned at load time, in load order.
    pub uid: u32,
    /// The id the record carried in its source, if any. Not unique across sources.
    pub source_id: Option<String>,
    pub name: String,
    /// Tier or edition label (e.g. "Professional"); entries sharing a name form a family.
    pub version: Option<String>,
    pub description: String,
    /// 0.0 to 5.0
    pub rating: f64,
    /// Non-negative; 0 means free.
    pub price: f64,
    pub price_type: PriceType,
    pub difficulty: Difficulty,
    pub categories: Vec<String>,
    pub platforms: Vec<String>,
    pub features: Vec<String>,
    /// Use-case tags matched against the quiz's primary use answer.
    pub primary_use: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

impl CatalogEntry {
    /// The identity of a displayable card. `uid` alone is unique, but the name
    /// and version keep keys readable and stable across reloads of one source.
    pub fn card_key(&self) -> (&str, Option<&str>, u32) {
        (&self.name, self.version.as_deref(), self.uid)
    }

    pub fn display_name(&self) -> String {
        match &self.version {
            Some(v) => format!("{} {}", self.name, v),
            None => self.name.clone(),
        }
    }

    pub fn is_free(&self) -> bool {
        self.price == 0.0
    }

    pub fn price_display(&self) -> String {
        price_display(self.price, self.price_type)
    }
}

/// A catalog record as it arrives from a file or remote query.
///
/// Every field is optional; [`ingest`] turns it into a [`CatalogEntry`],
/// applying defaults once so the scoring code never sees a missing value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEntry {
    pub id: Option<serde_json::Value>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub rating: Option<f64>,
    pub price: Option<f64>,
    #[serde(alias = "priceType")]
    pub price_type: Option<String>,
    pub difficulty: Option<f64>,
    pub categories: Option<Vec<String>>,
    pub platforms: Option<Vec<String>>,
    pub features: Option<Vec<String>>,
    #[serde(alias = "primaryUse")]
    pub primary_use: Option<Vec<String>>,
    pub pros: Option<Vec<String>>,
    pub cons: Option<Vec<String>>,
    #[serde(alias = "isActive")]
    pub is_active: Option<bool>,
}

/// Validates a raw record and assigns it the given `uid`.
pub fn ingest(raw: RawEntry, uid: u32) -> std::result::Result<CatalogEntry, CatalogError> {
    let name = match raw.name {
        Some(name) if !name.trim().is_empty() => name,
        _ => return Err(CatalogError::invalid("<unnamed>", "missing name")),
    };

    let price = raw.price.unwrap_or(0.0);
    if !price.is_finite() || price < 0.0 {
        return Err(CatalogError::invalid(name, format!("price {} is not a non-negative number", price)));
    }
    // -0.0 passes the check above but would render as "$-0"
    let price = if price == 0.0 { 0.0 } else { price };

    let price_type = match raw.price_type.as_deref() {
        Some(label) => match PriceType::parse(label) {
            Some(pt) => pt,
            None => return Err(CatalogError::invalid(name, format!("unknown price type '{}'", label))),
        },
        None if price == 0.0 => PriceType::Free,
        None => PriceType::Subscription,
    };

    let rating = raw
        .rating
        .filter(|r| r.is_finite())
        .map(|r| r.clamp(0.0, 5.0))
        .unwrap_or(0.0);

    let difficulty = raw
        .difficulty
        .filter(|d| d.is_finite())
        .map(|d| Difficulty::new(d.round().clamp(0.0, f64::from(u8::MAX)) as u8))
        .unwrap_or_default();

    let source_id = raw.id.and_then(|id| match id {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    });

    Ok(CatalogEntry {
        uid,
        source_id,
        name,
        version: raw.version.filter(|v| !v.trim().is_empty()),
        description: raw.description.unwrap_or_default(),
        rating,
        price,
        price_type,
        difficulty,
        categories: raw.categories.unwrap_or_default(),
        platforms: raw.platforms.unwrap_or_default(),
        features: raw.features.unwrap_or_default(),
        primary_use: raw.primary_use.unwrap_or_default(),
        pros: raw.pros.unwrap_or_default(),
        cons: raw.cons.unwrap_or_default(),
    })
}

/// Trait to abstract where catalog records come from, so loading can be tested
/// without touching the filesystem.
pub trait CatalogSource {
    /// Human readable label used in logs and errors.
    fn label(&self) -> String;
    /// Returns every record the source holds, active or not, still undecoded.
    ///
    /// Records are decoded one at a time during loading so a single
    /// mistyped record does not take the rest of the source down with it.
    fn fetch(&self) -> Result<Vec<serde_json::Value>>;
}

/// The sample catalog embedded in the binary.
pub struct BuiltinSource;

impl CatalogSource for BuiltinSource {
    fn label(&self) -> String {
        "builtin".to_string()
    }

    fn fetch(&self) -> Result<Vec<serde_json::Value>> {
        parse_records(BUILTIN_CATALOG, Path::new("<builtin>")).map_err(Into::into)
    }
}

/// A JSON file holding either an array of records or `{ "entries": [...] }`.
pub struct JsonFileSource {
    pub path: PathBuf,
}

impl JsonFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl CatalogSource for JsonFileSource {
    fn label(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&self) -> Result<Vec<serde_json::Value>> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| CatalogError::Unavailable {
            source_name: self.label(),
            message: e.to_string(),
        })?;
        parse_records(&content, &self.path).map_err(Into::into)
    }
}

/// Splits a catalog file into its records without decoding them.
fn parse_records(content: &str, path: &Path) -> std::result::Result<Vec<serde_json::Value>, CatalogError> {
    let malformed = |message: String| CatalogError::Malformed {
        path: path.to_path_buf(),
        message,
    };

    let file: serde_json::Value = serde_json::from_str(content).map_err(|e| malformed(e.to_string()))?;
    match file {
        serde_json::Value::Array(records) => Ok(records),
        serde_json::Value::Object(mut map) => match map.remove("entries") {
            Some(serde_json::Value::Array(records)) => Ok(records),
            _ => Err(malformed("expected an \"entries\" array".to_string())),
        },
        _ => Err(malformed("expected an array of records or an object with \"entries\"".to_string())),
    }
}

/// Decodes one record, naming it by position (and name, when readable) on failure.
fn decode_record(record: serde_json::Value, index: usize) -> std::result::Result<RawEntry, CatalogError> {
    let label = match record.get("name").and_then(serde_json::Value::as_str) {
        Some(name) => format!("record #{} ({})", index + 1, name),
        None => format!("record #{}", index + 1),
    };
    serde_json::from_value(record).map_err(|e| CatalogError::invalid(label, e.to_string()))
}

/// The outcome of loading one or more sources.
#[derive(Debug, Default)]
pub struct LoadedCatalog {
    pub entries: Vec<CatalogEntry>,
    /// Records dropped because they failed validation.
    pub rejected: usize,
    /// Records skipped because they were flagged inactive.
    pub inactive: usize,
}

/// Loads every source in order and re-issues globally unique ids.
///
/// A source that cannot be read aborts the load; individual bad records are
/// logged and skipped.
pub fn load_catalog(sources: &[&dyn CatalogSource]) -> Result<LoadedCatalog> {
    let mut loaded = LoadedCatalog::default();

    for source in sources {
        let records = source
            .fetch()
            .with_context(|| format!("Failed to load catalog source '{}'", source.label()))?;
        let before = loaded.entries.len();
        ingest_records(records, &mut loaded);
        tracing::debug!(
            source = %source.label(),
            accepted = loaded.entries.len() - before,
            "Loaded catalog source"
        );
    }

    Ok(loaded)
}

fn ingest_records(records: Vec<serde_json::Value>, loaded: &mut LoadedCatalog) {
    for (index, record) in records.into_iter().enumerate() {
        let raw = match decode_record(record, index) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Skipping catalog record: {}", e);
                loaded.rejected += 1;
                continue;
            }
        };
        if raw.is_active == Some(false) {
            loaded.inactive += 1;
            continue;
        }
        let uid = loaded.entries.len() as u32 + 1;
        match ingest(raw, uid) {
            Ok(entry) => loaded.entries.push(entry),
            Err(e) => {
                tracing::warn!("Skipping catalog record: {}", e);
                loaded.rejected += 1;
            }
        }
    }
}

fn cmp_case_insensitive(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase()).then_with(|| a.cmp(b))
}

/// Flat listing: by name, then unversioned entries first, then by version.
pub fn flat_sorted(entries: &[CatalogEntry]) -> Vec<&CatalogEntry> {
    let mut sorted: Vec<&CatalogEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| {
        cmp_case_insensitive(&a.name, &b.name).then_with(|| match (&a.version, &b.version) {
            (Some(va), Some(vb)) => cmp_case_insensitive(va, vb),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            (None, None) => Ordering::Equal,
        })
    });
    sorted
}

/// The `limit` best-rated entries; ties keep catalog order.
pub fn top_rated(entries: &[CatalogEntry], limit: usize) -> Vec<&CatalogEntry> {
    let mut sorted: Vec<&CatalogEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| b.rating.total_cmp(&a.rating));
    sorted.truncate(limit);
    sorted
}

/// Renders a dollar amount without a trailing `.0` ("$10", "$12.5").
pub fn format_amount(amount: f64) -> String {
    format!("${}", amount)
}

pub fn price_display(price: f64, price_type: PriceType) -> String {
    if price == 0.0 {
        return "Free".to_string();
    }
    match price_type {
        PriceType::OneTime => format!("{} one-time", format_amount(price)),
        _ => format!("{}/month", format_amount(price)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Test helper shared with the other modules' tests.
    pub(crate) fn entry(name: &str, version: Option<&str>, price: f64, difficulty: u8) -> CatalogEntry {
        CatalogEntry {
            uid: 0,
            source_id: None,
            name: name.to_string(),
            version: version.map(str::to_string),
            description: format!("{} description", name),
            rating: 0.0,
            price,
            price_type: if price == 0.0 { PriceType::Free } else { PriceType::Subscription },
            difficulty: Difficulty::new(difficulty),
            categories: Vec::new(),
            platforms: Vec::new(),
            features: Vec::new(),
            primary_use: Vec::new(),
            pros: Vec::new(),
            cons: Vec::new(),
        }
    }

    struct MockSource {
        records: Vec<serde_json::Value>,
    }

    impl CatalogSource for MockSource {
        fn label(&self) -> String {
            "mock".to_string()
        }

        fn fetch(&self) -> Result<Vec<serde_json::Value>> {
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    impl CatalogSource for FailingSource {
        fn label(&self) -> String {
            "remote".to_string()
        }

        fn fetch(&self) -> Result<Vec<serde_json::Value>> {
            Err(CatalogError::Unavailable {
                source_name: self.label(),
                message: "connection refused".to_string(),
            }
            .into())
        }
    }

    fn raw(id: i64, name: &str) -> RawEntry {
        RawEntry {
            id: Some(serde_json::json!(id)),
            name: Some(name.to_string()),
            ..RawEntry::default()
        }
    }

    fn record(id: i64, name: &str) -> serde_json::Value {
        serde_json::json!({ "id": id, "name": name })
    }

    #[test]
    fn test_ingest_applies_defaults() {
        let entry = ingest(raw(7, "Tinkercad"), 1).expect("valid record");

        assert_eq!(entry.uid, 1);
        assert_eq!(entry.source_id.as_deref(), Some("7"));
        assert_eq!(entry.price, 0.0);
        assert_eq!(entry.price_type, PriceType::Free);
        assert_eq!(entry.difficulty.level(), 1);
        assert_eq!(entry.rating, 0.0);
        assert!(entry.features.is_empty());
        assert!(entry.platforms.is_empty());
        assert_eq!(entry.version, None);
    }

    #[test]
    fn test_ingest_clamps_out_of_range_values() {
        let mut record = raw(1, "Odd");
        record.rating = Some(9.0);
        record.difficulty = Some(7.0);
        record.price = Some(30.0);
        let entry = ingest(record, 1).unwrap();

        assert_eq!(entry.rating, 5.0);
        assert_eq!(entry.difficulty.level(), 4);
        assert_eq!(entry.price_type, PriceType::Subscription);
    }

    #[test]
    fn test_ingest_rejects_bad_records() {
        assert!(matches!(ingest(RawEntry::default(), 1), Err(CatalogError::InvalidEntry { .. })));

        let mut negative = raw(1, "Negative");
        negative.price = Some(-5.0);
        assert!(ingest(negative, 1).is_err());

        let mut unknown = raw(1, "Weird");
        unknown.price_type = Some("lease".to_string());
        assert!(ingest(unknown, 1).is_err());
    }

    #[test]
    fn test_raw_entry_accepts_camel_case_keys() {
        let json = r#"{"id": 3, "name": "Onshape", "priceType": "one-time", "price": 125,
                       "primaryUse": ["mechanical"], "isActive": true, "difficulty": 2}"#;
        let record: RawEntry = serde_json::from_str(json).unwrap();
        let entry = ingest(record, 1).unwrap();

        assert_eq!(entry.price_type, PriceType::OneTime);
        assert_eq!(entry.primary_use, vec!["mechanical".to_string()]);
        assert_eq!(entry.difficulty.level(), 2);
    }

    #[test]
    fn test_load_reissues_unique_ids_across_sources() {
        let first = MockSource { records: vec![record(1, "A"), record(2, "B")] };
        let second = MockSource { records: vec![record(1, "C"), record(2, "D")] };

        let loaded = load_catalog(&[&first, &second]).expect("load failed");

        let uids: Vec<u32> = loaded.entries.iter().map(|e| e.uid).collect();
        assert_eq!(uids, vec![1, 2, 3, 4]);
        assert_eq!(loaded.entries[2].source_id.as_deref(), Some("1"));
    }

    #[test]
    fn test_load_skips_inactive_and_invalid_records() {
        let source = MockSource {
            records: vec![
                record(1, "Kept"),
                serde_json::json!({ "id": 2, "name": "Retired", "isActive": false }),
                serde_json::json!({}),
                record(4, "Also kept"),
            ],
        };

        let loaded = load_catalog(&[&source]).unwrap();

        assert_eq!(loaded.entries.len(), 2);
        assert_eq!(loaded.inactive, 1);
        assert_eq!(loaded.rejected, 1);
        assert_eq!(loaded.entries[1].uid, 2);
    }

    #[test]
    fn test_mistyped_record_does_not_sink_its_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mixed.json");
        std::fs::write(
            &path,
            r#"[{"name": "Good", "price": 10}, {"name": "Bad", "price": "12"}, {"name": 5}]"#,
        )
        .unwrap();

        let loaded = load_catalog(&[&JsonFileSource::new(&path)]).expect("source should still load");

        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].name, "Good");
        assert_eq!(loaded.rejected, 2);
    }

    #[test]
    fn test_decode_error_names_the_record() {
        let err = decode_record(serde_json::json!({ "name": "Bad", "price": "12" }), 1).unwrap_err();
        assert!(err.to_string().contains("record #2 (Bad)"));
    }

    #[test]
    fn test_negative_zero_price_is_normalised() {
        let mut record = raw(1, "X");
        record.price = Some(-0.0);
        let entry = ingest(record, 1).unwrap();

        assert!(entry.price.is_sign_positive());
        assert_eq!(format_amount(entry.price), "$0");
        assert_eq!(entry.price_type, PriceType::Free);
    }

    #[test]
    fn test_unavailable_source_surfaces_as_error() {
        let err = load_catalog(&[&FailingSource]).unwrap_err();
        let root = err.downcast_ref::<CatalogError>();
        assert!(matches!(root, Some(CatalogError::Unavailable { .. })));
    }

    #[test]
    fn test_builtin_catalog_loads() {
        let loaded = load_catalog(&[&BuiltinSource]).unwrap();
        assert!(!loaded.entries.is_empty());
        assert_eq!(loaded.rejected, 0);
        assert!(loaded.entries.iter().any(|e| e.name == "Alibre Design"));
    }

    #[test]
    fn test_json_file_source_reads_wrapped_form() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.json");
        std::fs::write(&path, r#"{"entries": [{"name": "LibreCAD", "price": null}]}"#).unwrap();

        let records = JsonFileSource::new(&path).fetch().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "LibreCAD");

        std::fs::write(&path, r#"{"items": []}"#).unwrap();
        let err = JsonFileSource::new(&path).fetch().unwrap_err();
        assert!(matches!(err.downcast_ref::<CatalogError>(), Some(CatalogError::Malformed { .. })));
    }

    #[test]
    fn test_json_file_source_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileSource::new(&path).fetch().unwrap_err();
        assert!(matches!(err.downcast_ref::<CatalogError>(), Some(CatalogError::Malformed { .. })));

        let missing = JsonFileSource::new(dir.path().join("nope.json")).fetch().unwrap_err();
        assert!(matches!(missing.downcast_ref::<CatalogError>(), Some(CatalogError::Unavailable { .. })));
    }

    #[test]
    fn test_flat_sorted_puts_unversioned_first() {
        let entries = vec![
            entry("b", None, 0.0, 1),
            entry("A", Some("Pro"), 10.0, 1),
            entry("A", None, 0.0, 1),
            entry("A", Some("Lite"), 5.0, 1),
        ];
        let names: Vec<String> = flat_sorted(&entries).iter().map(|e| e.display_name()).collect();
        assert_eq!(names, vec!["A", "A Lite", "A Pro", "b"]);
    }

    #[test]
    fn test_top_rated_keeps_order_on_ties() {
        let mut entries = vec![entry("x", None, 0.0, 1), entry("y", None, 0.0, 1), entry("z", None, 0.0, 1)];
        entries[0].rating = 4.0;
        entries[1].rating = 4.5;
        entries[2].rating = 4.0;

        let names: Vec<&str> = top_rated(&entries, 2).iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["y", "x"]);
    }

    #[test]
    fn test_price_display() {
        assert_eq!(price_display(0.0, PriceType::Subscription), "Free");
        assert_eq!(price_display(60.0, PriceType::Subscription), "$60/month");
        assert_eq!(price_display(899.5, PriceType::OneTime), "$899.5 one-time");
        assert_eq!(Difficulty::new(3).label(), "Advanced");
    }
}
