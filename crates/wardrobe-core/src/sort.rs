use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::{cmp_ignore_case, Outfit, OutfitStore};

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ascending",
            Self::Descending => "descending",
        }
    }

    fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Ascending => ordering,
            Self::Descending => ordering.reverse(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    Name,
    Category,
    Formality,
    LastUsed,
}

impl SortKey {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Formality => "formality",
            Self::LastUsed => "last_used",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "category" => Some(Self::Category),
            "formality" => Some(Self::Formality),
            "last_used" | "last-used" => Some(Self::LastUsed),
            _ => None,
        }
    }
}

impl OutfitStore {
    pub fn sort_by(&mut self, key: SortKey, order: SortOrder) {
        match key {
            SortKey::Name => self.sort_by_name(order),
            SortKey::Category => self.sort_by_category(order),
            SortKey::Formality => self.sort_by_formality(order),
            SortKey::LastUsed => self.sort_by_last_used(order),
        }
    }

    /// Selection sort on the case-insensitive name. Not stable.
    pub fn sort_by_name(&mut self, order: SortOrder) {
        selection_sort(&mut self.records, |lhs, rhs| {
            order.apply(cmp_ignore_case(&lhs.name, &rhs.name))
        });
    }

    /// Insertion sort on the case-insensitive category. Stable.
    ///
    /// Sorting ascending establishes the precondition of
    /// [`OutfitStore::search_by_category_binary`].
    pub fn sort_by_category(&mut self, order: SortOrder) {
        insertion_sort(&mut self.records, |lhs, rhs| {
            order.apply(cmp_ignore_case(&lhs.category, &rhs.category))
        });
    }

    /// Selection sort on the formality level. Not stable.
    pub fn sort_by_formality(&mut self, order: SortOrder) {
        selection_sort(&mut self.records, |lhs, rhs| order.apply(lhs.formality.cmp(&rhs.formality)));
    }

    /// Insertion sort on `last_used`; ascending puts the oldest first. Stable.
    pub fn sort_by_last_used(&mut self, order: SortOrder) {
        insertion_sort(&mut self.records, |lhs, rhs| order.apply(lhs.last_used.cmp(&rhs.last_used)));
    }
}

/// Each pass moves the first strictly smallest remaining record into place.
fn selection_sort<F>(records: &mut [Outfit], cmp: F)
where
    F: Fn(&Outfit, &Outfit) -> Ordering,
{
    let len = records.len();
    for i in 0..len.saturating_sub(1) {
        let mut selected = i;
        for (j, candidate) in records.iter().enumerate().skip(i + 1) {
            if cmp(candidate, &records[selected]) == Ordering::Less {
                selected = j;
            }
        }
        if selected != i {
            records.swap(i, selected);
        }
    }
}

/// Shifts only over strictly greater records, so equal keys keep their order.
fn insertion_sort<F>(records: &mut [Outfit], cmp: F)
where
    F: Fn(&Outfit, &Outfit) -> Ordering,
{
    for i in 1..records.len() {
        let mut j = i;
        while j > 0 && cmp(&records[j - 1], &records[j]) == Ordering::Greater {
            records.swap(j - 1, j);
            j -= 1;
        }
    }
}
