use time::OffsetDateTime;

use crate::{Formality, OutfitStore, WardrobeError};

impl OutfitStore {
    /// Pick the least recently used outfit of `formality` and mark it as worn
    /// now.
    ///
    /// # Errors
    /// Returns [`WardrobeError::NoneAvailable`] when no outfit has that
    /// formality.
    pub fn recommend(&mut self, formality: Formality) -> Result<usize, WardrobeError> {
        self.recommend_at(formality, OffsetDateTime::now_utc())
    }

    /// Pick the outfit of `formality` with the oldest `last_used` and set its
    /// `last_used` to `now`.
    ///
    /// Only a strictly older timestamp displaces the current candidate, so
    /// ties go to the lowest position. The restamp is part of the operation:
    /// calling this twice rotates through the tier.
    ///
    /// # Errors
    /// Returns [`WardrobeError::NoneAvailable`] when no outfit has that
    /// formality.
    pub fn recommend_at(
        &mut self,
        formality: Formality,
        now: OffsetDateTime,
    ) -> Result<usize, WardrobeError> {
        let mut candidate: Option<(usize, OffsetDateTime)> = None;
        for (index, record) in self.records.iter().enumerate() {
            if record.formality != formality {
                continue;
            }
            let strictly_older = match candidate {
                Some((_, oldest)) => record.last_used < oldest,
                None => true,
            };
            if strictly_older {
                candidate = Some((index, record.last_used));
            }
        }

        let Some((index, _)) = candidate else {
            return Err(WardrobeError::NoneAvailable(formality));
        };
        self.records[index].last_used = now;
        Ok(index)
    }
}
