use std::cmp::Ordering;

use crate::{cmp_ignore_case, eq_ignore_case, OutfitStore, WardrobeError};

impl OutfitStore {
    /// Position of the first outfit whose name equals `name`, ignoring case.
    #[must_use]
    pub fn search_by_name(&self, name: &str) -> Option<usize> {
        self.records.iter().position(|record| eq_ignore_case(&record.name, name))
    }

    /// Positions of every outfit whose color equals `color`, ignoring case, in
    /// store order.
    #[must_use]
    pub fn search_by_color(&self, color: &str) -> Vec<usize> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, record)| eq_ignore_case(&record.color, color))
            .map(|(index, _)| index)
            .collect()
    }

    /// Position of the first outfit in `category`, found by a forward scan.
    #[must_use]
    pub fn search_by_category_linear(&self, category: &str) -> Option<usize> {
        self.records.iter().position(|record| eq_ignore_case(&record.category, category))
    }

    /// Binary search for `category`, ignoring case.
    ///
    /// The store MUST already be sorted ascending by category (see
    /// [`OutfitStore::sort_by_category`]); on an unsorted store the result is
    /// unspecified. When several outfits share the category, the position of
    /// the first one is returned.
    #[must_use]
    pub fn search_by_category_binary(&self, category: &str) -> Option<usize> {
        let wanted = category.to_lowercase();
        let mut low = 0_usize;
        let mut high = self.records.len();

        while low < high {
            let mid = low + (high - low) / 2;
            match self.records[mid].category.to_lowercase().cmp(&wanted) {
                Ordering::Equal => {
                    let mut first = mid;
                    while first > 0 && eq_ignore_case(&self.records[first - 1].category, category)
                    {
                        first -= 1;
                    }
                    return Some(first);
                }
                Ordering::Less => low = mid + 1,
                Ordering::Greater => high = mid,
            }
        }

        None
    }

    /// [`OutfitStore::search_by_category_binary`] with the sort order verified
    /// first.
    ///
    /// # Errors
    /// Returns [`WardrobeError::PreconditionViolated`] when the categories are
    /// not in ascending case-insensitive order.
    pub fn search_by_category_checked(&self, category: &str) -> Result<Option<usize>, WardrobeError> {
        if let Some(index) = self.first_category_inversion() {
            return Err(WardrobeError::PreconditionViolated(format!(
                "categories MUST be sorted ascending before a binary search \
                 (position {index} sorts before position {})",
                index - 1
            )));
        }

        Ok(self.search_by_category_binary(category))
    }

    fn first_category_inversion(&self) -> Option<usize> {
        self.records
            .windows(2)
            .position(|pair| cmp_ignore_case(&pair[0].category, &pair[1].category) == Ordering::Greater)
            .map(|index| index + 1)
    }
}

#[cfg(test)]
mod tests {
    use crate::tests::{draft, fixture_time};
    use crate::{Formality, OutfitStore, SortOrder, WardrobeError};
    use proptest::prelude::*;

    fn store_of(items: &[(&str, &str, &str)]) -> OutfitStore {
        let mut store = OutfitStore::new();
        for (name, category, color) in items {
            if let Err(err) =
                store.insert_at(draft(name, category, color, Formality::Casual), fixture_time())
            {
                panic!("fixture insert failed: {err}");
            }
        }
        store
    }

    #[test]
    fn name_search_ignores_case_and_returns_first_match() {
        let store = store_of(&[
            ("Linen Shirt", "Top", "White"),
            ("linen shirt", "Top", "Beige"),
            ("Chinos", "Bottom", "Khaki"),
        ]);

        assert_eq!(store.search_by_name("LINEN SHIRT"), Some(0));
        assert_eq!(store.search_by_name("chinos"), Some(2));
        assert_eq!(store.search_by_name("Linen"), None);
    }

    #[test]
    fn color_search_returns_every_match_in_order() {
        let store = store_of(&[
            ("Tee", "Top", "Black"),
            ("Jeans", "Bottom", "Blue"),
            ("Boots", "Shoes", "black"),
        ]);

        assert_eq!(store.search_by_color("BLACK"), vec![0, 2]);
        assert!(store.search_by_color("green").is_empty());
    }

    #[test]
    fn binary_search_returns_first_of_equal_categories() {
        let mut store = store_of(&[
            ("A", "Top", "Red"),
            ("B", "Bottom", "Red"),
            ("C", "top", "Red"),
            ("D", "Accessory", "Red"),
            ("E", "TOP", "Red"),
            ("F", "Shoes", "Red"),
        ]);
        store.sort_by_category(SortOrder::Ascending);

        let found = store.search_by_category_binary("Top");
        assert_eq!(found, Some(3));
        assert_eq!(store.records()[3].name, "A");
        assert_eq!(store.search_by_category_binary("Hat"), None);
        assert_eq!(store.search_by_category_binary("accessory"), Some(0));
    }

    #[test]
    fn binary_search_on_empty_store_finds_nothing() {
        let store = OutfitStore::new();
        assert_eq!(store.search_by_category_binary("Top"), None);
    }

    #[test]
    fn checked_search_rejects_unsorted_store() {
        let mut store = store_of(&[("A", "Top", "Red"), ("B", "Bottom", "Red")]);

        let result = store.search_by_category_checked("Top");
        assert!(matches!(result, Err(WardrobeError::PreconditionViolated(_))));

        store.sort_by_category(SortOrder::Ascending);
        assert_eq!(store.search_by_category_checked("Top"), Ok(Some(1)));
    }

    proptest! {
        #[test]
        fn property_sorted_binary_search_matches_linear_scan(
            categories in proptest::collection::vec("[a-cA-C]{1,2}", 0..30),
            probe in "[a-cA-C]{1,2}",
        ) {
            let mut store = OutfitStore::new();
            for (index, category) in categories.iter().enumerate() {
                let name = format!("outfit-{index}");
                prop_assert!(store
                    .insert_at(draft(&name, category, "Red", Formality::Casual), fixture_time())
                    .is_ok());
            }
            store.sort_by_category(SortOrder::Ascending);

            prop_assert_eq!(
                store.search_by_category_binary(&probe),
                store.search_by_category_linear(&probe)
            );
        }
    }
}
