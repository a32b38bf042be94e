use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use time::{Duration, OffsetDateTime};
use wardrobe_core::{Formality, NewOutfit, Outfit, OutfitStore, WardrobeError, MAX_CAPACITY};

pub const DEFAULT_DATA_FILE: &str = "outfits.json";

#[derive(Debug, thiserror::Error)]
pub enum PersistenceError {
    #[error("data file {} does not exist", .path.display())]
    Missing { path: PathBuf },
    #[error("failed to read data file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to decode data file {}: {source}", .path.display())]
    Decode { path: PathBuf, source: serde_json::Error },
    #[error("data file {} holds invalid outfits: {source}", .path.display())]
    Invalid { path: PathBuf, source: WardrobeError },
    #[error("failed to encode outfits: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("failed to write data file {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl PersistenceError {
    #[must_use]
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum LoadOutcome {
    /// Records were read from an existing data file.
    Loaded,
    /// The data file held more than [`MAX_CAPACITY`] records; the first
    /// [`MAX_CAPACITY`] were kept and `dropped` were left out.
    Truncated { dropped: usize },
    /// No data file existed; the store holds the starter outfit and has not
    /// been written yet.
    Seeded,
}

/// Whole-file JSON persistence for an [`OutfitStore`].
///
/// The file holds the live records as one pretty-printed JSON array in store
/// order. Every save rewrites the file.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the outfits from the data file. Records past [`MAX_CAPACITY`] are
    /// dropped with a warning.
    ///
    /// # Errors
    /// Returns [`PersistenceError::Missing`] when the file does not exist,
    /// [`PersistenceError::Read`] or [`PersistenceError::Decode`] when it cannot
    /// be read or parsed, and [`PersistenceError::Invalid`] when the kept
    /// records share an id.
    pub fn load(&self) -> Result<OutfitStore, PersistenceError> {
        self.read_records().map(|(store, _)| store)
    }

    fn read_records(&self) -> Result<(OutfitStore, usize), PersistenceError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(PersistenceError::Missing { path: self.path.clone() });
            }
            Err(source) => {
                return Err(PersistenceError::Read { path: self.path.clone(), source });
            }
        };

        let mut records: Vec<Outfit> = serde_json::from_slice(&bytes)
            .map_err(|source| PersistenceError::Decode { path: self.path.clone(), source })?;
        let dropped = records.len().saturating_sub(MAX_CAPACITY);
        if dropped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                found = records.len(),
                kept = MAX_CAPACITY,
                "data file exceeds capacity, extra outfits ignored"
            );
            records.truncate(MAX_CAPACITY);
        }

        let count = records.len();
        let store = OutfitStore::from_records(records)
            .map_err(|source| PersistenceError::Invalid { path: self.path.clone(), source })?;

        tracing::debug!(path = %self.path.display(), count, "loaded outfits");
        Ok((store, dropped))
    }

    /// Like [`JsonFileStore::load`], but a missing file yields a store holding
    /// the starter outfit. The caller decides when to persist it.
    ///
    /// # Errors
    /// Returns every [`JsonFileStore::load`] error except
    /// [`PersistenceError::Missing`].
    pub fn load_or_seed(&self) -> Result<(OutfitStore, LoadOutcome), PersistenceError> {
        match self.read_records() {
            Ok((store, 0)) => Ok((store, LoadOutcome::Loaded)),
            Ok((store, dropped)) => Ok((store, LoadOutcome::Truncated { dropped })),
            Err(PersistenceError::Missing { .. }) => {
                tracing::info!(path = %self.path.display(), "data file missing, seeding starter outfit");
                Ok((seeded_store(OffsetDateTime::now_utc()), LoadOutcome::Seeded))
            }
            Err(err) => Err(err),
        }
    }

    /// Overwrite the data file with the live records of `store`.
    ///
    /// # Errors
    /// Returns [`PersistenceError::Encode`] or [`PersistenceError::Write`] when
    /// the records cannot be serialized or written.
    pub fn save(&self, store: &OutfitStore) -> Result<(), PersistenceError> {
        let body = serde_json::to_vec_pretty(store.records()).map_err(PersistenceError::Encode)?;
        fs::write(&self.path, body)
            .map_err(|source| PersistenceError::Write { path: self.path.clone(), source })?;

        tracing::debug!(path = %self.path.display(), count = store.len(), "saved outfits");
        Ok(())
    }
}

/// A store holding the single starter outfit written on first run.
#[must_use]
pub fn seeded_store(now: OffsetDateTime) -> OutfitStore {
    let mut store = OutfitStore::new();
    let starter = NewOutfit {
        name: "White Shirt".to_string(),
        category: "Top".to_string(),
        color: "White".to_string(),
        season: "Summer".to_string(),
        description: "Long-sleeved white shirt, fits formal and semi-formal occasions.".to_string(),
        formality: Formality::Formal,
    };
    if let Err(err) = store.insert_at(starter, now - Duration::days(1)) {
        tracing::warn!(error = %err, "could not seed starter outfit");
    }
    store
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;
    use wardrobe_core::{OutfitId, SortOrder};

    fn unique_temp_dir(prefix: &str) -> PathBuf {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_else(|err| panic!("clock should be >= UNIX_EPOCH: {err}"))
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("{prefix}-{now}-{}", std::process::id()));
        fs::create_dir_all(&dir)
            .unwrap_or_else(|err| panic!("failed to create temp dir {}: {err}", dir.display()));
        dir
    }

    fn fixture_time() -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::seconds(1_700_000_000)
    }

    fn sample_store() -> OutfitStore {
        let mut store = OutfitStore::new();
        for (name, category, formality) in [
            ("Chinos", "Bottom", Formality::SemiFormal),
            ("Blazer", "Outerwear", Formality::Formal),
            ("Hoodie", "Top", Formality::Casual),
        ] {
            let draft = NewOutfit {
                name: name.to_string(),
                category: category.to_string(),
                color: "Navy".to_string(),
                season: "Autumn".to_string(),
                description: String::new(),
                formality,
            };
            if let Err(err) = store.insert_at(draft, fixture_time()) {
                panic!("fixture insert failed: {err}");
            }
        }
        store
    }

    #[test]
    fn load_reports_missing_file() {
        let dir = unique_temp_dir("wardrobe-missing");
        let persistence = JsonFileStore::new(dir.join(DEFAULT_DATA_FILE));

        let err = match persistence.load() {
            Ok(_) => panic!("load should fail for a missing file"),
            Err(err) => err,
        };
        assert!(err.is_missing());
    }

    #[test]
    fn load_or_seed_creates_starter_outfit_without_writing() -> Result<(), PersistenceError> {
        let dir = unique_temp_dir("wardrobe-seed");
        let path = dir.join(DEFAULT_DATA_FILE);
        let persistence = JsonFileStore::new(&path);

        let (store, outcome) = persistence.load_or_seed()?;
        assert_eq!(outcome, LoadOutcome::Seeded);
        assert_eq!(store.len(), 1);
        let starter = &store.records()[0];
        assert_eq!(starter.id, OutfitId(1));
        assert_eq!(starter.formality, Formality::Formal);
        assert!(starter.last_used < OffsetDateTime::now_utc());
        assert!(!path.exists());

        persistence.save(&store)?;
        let (reloaded, outcome) = persistence.load_or_seed()?;
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(reloaded.records(), store.records());
        Ok(())
    }

    #[test]
    fn save_then_load_keeps_order_and_fields() -> Result<(), PersistenceError> {
        let dir = unique_temp_dir("wardrobe-roundtrip");
        let persistence = JsonFileStore::new(dir.join(DEFAULT_DATA_FILE));
        let mut store = sample_store();
        store.sort_by_name(SortOrder::Ascending);

        persistence.save(&store)?;
        let loaded = persistence.load()?;

        assert_eq!(loaded.records(), store.records());
        let names: Vec<&str> = loaded.iter().map(|record| record.name.as_str()).collect();
        assert_eq!(names, ["Blazer", "Chinos", "Hoodie"]);
        Ok(())
    }

    #[test]
    fn saved_file_is_an_indented_array() -> Result<(), PersistenceError> {
        let dir = unique_temp_dir("wardrobe-format");
        let path = dir.join(DEFAULT_DATA_FILE);
        JsonFileStore::new(&path).save(&sample_store())?;

        let body = fs::read_to_string(&path)
            .unwrap_or_else(|err| panic!("failed to read {}: {err}", path.display()));
        assert!(body.starts_with("[\n  {\n    \"id\": 1,"));
        assert!(body.contains("\"formality\": 2"));
        assert!(body.contains("\"last_used\": \"2023-11-14T22:13:20Z\""));
        Ok(())
    }

    #[test]
    fn load_accepts_offset_timestamps_with_fractional_seconds() -> Result<(), PersistenceError> {
        let dir = unique_temp_dir("wardrobe-offset");
        let path = dir.join(DEFAULT_DATA_FILE);
        let body = r#"[
  {
    "id": 4,
    "name": "Batik Shirt",
    "category": "Top",
    "color": "Brown",
    "season": "Rainy",
    "description": "",
    "formality": 2,
    "last_used": "2025-06-01T08:30:00.123456789+07:00"
  }
]"#;
        fs::write(&path, body)
            .unwrap_or_else(|err| panic!("failed to write {}: {err}", path.display()));

        let store = JsonFileStore::new(&path).load()?;
        assert_eq!(store.len(), 1);
        assert_eq!(store.records()[0].id, OutfitId(4));
        assert_eq!(store.records()[0].last_used.offset().whole_hours(), 7);
        Ok(())
    }

    #[test]
    fn load_reports_undecodable_file() {
        let dir = unique_temp_dir("wardrobe-garbage");
        let path = dir.join(DEFAULT_DATA_FILE);
        fs::write(&path, "{ not json")
            .unwrap_or_else(|err| panic!("failed to write {}: {err}", path.display()));

        let result = JsonFileStore::new(&path).load_or_seed();
        assert!(matches!(result, Err(PersistenceError::Decode { .. })));
    }

    #[test]
    fn load_rejects_duplicate_ids() {
        let dir = unique_temp_dir("wardrobe-duplicate");
        let path = dir.join(DEFAULT_DATA_FILE);
        let store = sample_store();
        let mut records = store.records().to_vec();
        records[1].id = records[0].id;
        let body = serde_json::to_string(&records)
            .unwrap_or_else(|err| panic!("failed to encode fixture: {err}"));
        fs::write(&path, body)
            .unwrap_or_else(|err| panic!("failed to write {}: {err}", path.display()));

        let result = JsonFileStore::new(&path).load();
        assert!(matches!(
            result,
            Err(PersistenceError::Invalid { source: WardrobeError::InvalidInput(_), .. })
        ));
    }

    fn write_records(path: &Path, count: u32) {
        let template = sample_store().records()[0].clone();
        let records: Vec<Outfit> = (1..=count)
            .map(|id| Outfit { id: OutfitId(id), name: format!("Outfit {id}"), ..template.clone() })
            .collect();
        let body = serde_json::to_string(&records)
            .unwrap_or_else(|err| panic!("failed to encode fixture: {err}"));
        fs::write(path, body)
            .unwrap_or_else(|err| panic!("failed to write {}: {err}", path.display()));
    }

    #[test]
    fn oversized_file_keeps_first_records_and_reports_the_rest() -> Result<(), PersistenceError> {
        let dir = unique_temp_dir("wardrobe-oversized");
        let path = dir.join(DEFAULT_DATA_FILE);
        write_records(&path, 103);
        let persistence = JsonFileStore::new(&path);

        let (store, outcome) = persistence.load_or_seed()?;
        assert_eq!(outcome, LoadOutcome::Truncated { dropped: 3 });
        assert_eq!(store.len(), MAX_CAPACITY);
        assert_eq!(store.records()[0].id, OutfitId(1));
        assert_eq!(store.records()[MAX_CAPACITY - 1].id, OutfitId(100));

        assert_eq!(persistence.load()?.len(), MAX_CAPACITY);
        Ok(())
    }

    #[test]
    fn file_at_capacity_loads_untouched() -> Result<(), PersistenceError> {
        let dir = unique_temp_dir("wardrobe-at-capacity");
        let path = dir.join(DEFAULT_DATA_FILE);
        write_records(&path, 100);

        let (store, outcome) = JsonFileStore::new(&path).load_or_seed()?;
        assert_eq!(outcome, LoadOutcome::Loaded);
        assert_eq!(store.len(), MAX_CAPACITY);
        Ok(())
    }

    #[test]
    fn save_reports_unwritable_path() {
        let dir = unique_temp_dir("wardrobe-unwritable");
        let persistence = JsonFileStore::new(dir.join("no-such-dir").join(DEFAULT_DATA_FILE));

        let result = persistence.save(&sample_store());
        assert!(matches!(result, Err(PersistenceError::Write { .. })));
    }
}
