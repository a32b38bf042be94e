use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

mod recommend;
mod search;
mod sort;

pub use sort::{SortKey, SortOrder};

/// Maximum number of live outfits a store accepts.
pub const MAX_CAPACITY: usize = 100;

#[derive(Debug, Clone, thiserror::Error, Eq, PartialEq)]
pub enum WardrobeError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("capacity exceeded: store holds at most {capacity} outfits")]
    CapacityExceeded { capacity: usize },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("precondition violated: {0}")]
    PreconditionViolated(String),
    #[error("no outfit available with formality {0}")]
    NoneAvailable(Formality),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[serde(transparent)]
pub struct OutfitId(pub u32);

impl Display for OutfitId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Ord, PartialOrd, Hash,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Formality {
    #[default]
    Casual,
    SemiFormal,
    Formal,
}

impl Formality {
    #[must_use]
    pub fn level(self) -> u8 {
        match self {
            Self::Casual => 1,
            Self::SemiFormal => 2,
            Self::Formal => 3,
        }
    }

    #[must_use]
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Casual),
            2 => Some(Self::SemiFormal),
            3 => Some(Self::Formal),
            _ => None,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Casual => "Casual",
            Self::SemiFormal => "Semi-formal",
            Self::Formal => "Formal",
        }
    }

    /// Parse user-entered text such as `" 2 "`. Anything that is not an
    /// integer in `1..=3` yields `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        value.trim().parse::<u8>().ok().and_then(Self::from_level)
    }

    /// Parse user-entered text, falling back to [`Formality::Casual`].
    #[must_use]
    pub fn parse_or_default(value: &str) -> Self {
        Self::parse(value).unwrap_or_default()
    }
}

impl Display for Formality {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

impl From<Formality> for u8 {
    fn from(value: Formality) -> Self {
        value.level()
    }
}

impl TryFrom<u8> for Formality {
    type Error = WardrobeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_level(value).ok_or_else(|| {
            WardrobeError::InvalidInput(format!("formality MUST be 1, 2 or 3 (got {value})"))
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct Outfit {
    pub id: OutfitId,
    pub name: String,
    pub category: String,
    pub color: String,
    pub season: String,
    pub description: String,
    pub formality: Formality,
    #[serde(with = "time::serde::rfc3339")]
    pub last_used: OffsetDateTime,
}

/// Field values for an outfit that has not been assigned an id yet.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct NewOutfit {
    pub name: String,
    pub category: String,
    pub color: String,
    pub season: String,
    pub description: String,
    pub formality: Formality,
}

/// Partial update applied by [`OutfitStore::update_fields`]. `None` keeps the
/// stored value.
#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct OutfitPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub color: Option<String>,
    pub season: Option<String>,
    pub description: Option<String>,
    pub formality: Option<Formality>,
}

/// Ordered, capacity-bounded collection of outfits.
///
/// Positions are meaningful: sorts reorder the records in place and searches
/// report positions, not ids.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct OutfitStore {
    records: Vec<Outfit>,
    capacity: usize,
    highest_issued_id: u32,
}

impl Default for OutfitStore {
    fn default() -> Self {
        Self::new()
    }
}

impl OutfitStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_CAPACITY)
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self { records: Vec::with_capacity(capacity), capacity, highest_issued_id: 0 }
    }

    /// Rebuild a store from persisted records, keeping their order.
    ///
    /// # Errors
    /// Returns [`WardrobeError::CapacityExceeded`] when there are more records
    /// than [`MAX_CAPACITY`], or [`WardrobeError::InvalidInput`] when two
    /// records share an id.
    pub fn from_records(records: Vec<Outfit>) -> Result<Self, WardrobeError> {
        if records.len() > MAX_CAPACITY {
            return Err(WardrobeError::CapacityExceeded { capacity: MAX_CAPACITY });
        }

        let mut seen = std::collections::BTreeSet::new();
        for record in &records {
            if !seen.insert(record.id) {
                return Err(WardrobeError::InvalidInput(format!(
                    "duplicate outfit id {}",
                    record.id
                )));
            }
        }

        let highest_issued_id = records.iter().map(|record| record.id.0).max().unwrap_or(0);
        let mut store = Self::new();
        store.records = records;
        store.highest_issued_id = highest_issued_id;
        Ok(store)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[must_use]
    pub fn records(&self) -> &[Outfit] {
        &self.records
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Outfit> {
        self.records.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Outfit> {
        self.records.iter()
    }

    /// Append a new outfit stamped with the current time.
    ///
    /// # Errors
    /// Returns [`WardrobeError::CapacityExceeded`] when the store is full.
    pub fn insert(&mut self, draft: NewOutfit) -> Result<OutfitId, WardrobeError> {
        self.insert_at(draft, OffsetDateTime::now_utc())
    }

    /// Append a new outfit whose `last_used` is `created_at`.
    ///
    /// The id is one past the largest id currently live or previously issued
    /// by this store, so ids freed by a delete are not handed out again.
    ///
    /// # Errors
    /// Returns [`WardrobeError::CapacityExceeded`] when the store is full.
    pub fn insert_at(
        &mut self,
        draft: NewOutfit,
        created_at: OffsetDateTime,
    ) -> Result<OutfitId, WardrobeError> {
        if self.records.len() >= self.capacity {
            return Err(WardrobeError::CapacityExceeded { capacity: self.capacity });
        }

        let max_live = self.records.iter().map(|record| record.id.0).max().unwrap_or(0);
        let next = max_live.max(self.highest_issued_id).checked_add(1).ok_or_else(|| {
            WardrobeError::InvalidInput("outfit id space exhausted".to_string())
        })?;
        let id = OutfitId(next);

        self.records.push(Outfit {
            id,
            name: draft.name,
            category: draft.category,
            color: draft.color,
            season: draft.season,
            description: draft.description,
            formality: draft.formality,
            last_used: created_at,
        });
        self.highest_issued_id = next;
        Ok(id)
    }

    #[must_use]
    pub fn find_index_by_id(&self, id: OutfitId) -> Option<usize> {
        self.records.iter().position(|record| record.id == id)
    }

    /// Remove the outfit with `id`, shifting every later record down one slot.
    ///
    /// # Errors
    /// Returns [`WardrobeError::NotFound`] when no live outfit has `id`.
    pub fn remove_by_id(&mut self, id: OutfitId) -> Result<Outfit, WardrobeError> {
        let index = self
            .find_index_by_id(id)
            .ok_or_else(|| WardrobeError::NotFound(format!("outfit id {id}")))?;
        Ok(self.records.remove(index))
    }

    /// # Errors
    /// Returns [`WardrobeError::NotFound`] when either position is past the
    /// live records.
    pub fn swap(&mut self, a: usize, b: usize) -> Result<(), WardrobeError> {
        self.check_index(a)?;
        self.check_index(b)?;
        self.records.swap(a, b);
        Ok(())
    }

    /// Merge `patch` into the outfit at `index`.
    ///
    /// # Errors
    /// Returns [`WardrobeError::NotFound`] when `index` is past the live records.
    pub fn update_fields(&mut self, index: usize, patch: OutfitPatch) -> Result<(), WardrobeError> {
        self.check_index(index)?;
        let record = &mut self.records[index];

        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(category) = patch.category {
            record.category = category;
        }
        if let Some(color) = patch.color {
            record.color = color;
        }
        if let Some(season) = patch.season {
            record.season = season;
        }
        if let Some(description) = patch.description {
            record.description = description;
        }
        if let Some(formality) = patch.formality {
            record.formality = formality;
        }

        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), WardrobeError> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(WardrobeError::NotFound(format!(
                "position {index} (store holds {} outfits)",
                self.records.len()
            )))
        }
    }
}

/// Case-insensitive equality used by every text lookup.
pub(crate) fn eq_ignore_case(lhs: &str, rhs: &str) -> bool {
    lhs == rhs || lhs.to_lowercase() == rhs.to_lowercase()
}

/// Case-insensitive lexicographic ordering used by name and category sorts.
pub(crate) fn cmp_ignore_case(lhs: &str, rhs: &str) -> std::cmp::Ordering {
    lhs.to_lowercase().cmp(&rhs.to_lowercase())
}
