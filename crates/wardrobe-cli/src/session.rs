use std::io::{BufRead, Write};

use anyhow::{Context, Result};
use wardrobe_core::{
    Formality, NewOutfit, Outfit, OutfitId, OutfitPatch, OutfitStore, SortKey, SortOrder,
    WardrobeError,
};
use wardrobe_store_json::{JsonFileStore, LoadOutcome, PersistenceError};

/// One interactive menu session over stdin/stdout or any reader/writer pair.
///
/// Every mutating command (add, edit, delete, plan) rewrites the data file.
/// Persistence failures are reported in the transcript and the session goes
/// on with its in-memory state.
///
/// A data file that decodes but holds records the store rejects is never
/// overwritten; such a session runs in memory only.
pub struct Session<R, W> {
    store: OutfitStore,
    persistence: JsonFileStore,
    saves_enabled: bool,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Session<R, W> {
    /// Load the data file and report how it went.
    ///
    /// A missing file seeds the starter outfit and writes it at once. An
    /// oversized file keeps its first outfits. An unreadable or undecodable
    /// file leaves the session with an empty store.
    ///
    /// # Errors
    /// Returns an error only when the output cannot be written.
    pub fn open(persistence: JsonFileStore, input: R, mut output: W) -> Result<Self> {
        let mut saves_enabled = true;
        let store = match persistence.load_or_seed() {
            Ok((store, LoadOutcome::Loaded)) => {
                writeln!(
                    output,
                    "Loaded {} outfit(s) from {}.",
                    store.len(),
                    persistence.path().display()
                )?;
                store
            }
            Ok((store, LoadOutcome::Truncated { dropped })) => {
                writeln!(
                    output,
                    "Data file holds more than {} outfits; loaded the first {} and ignored {dropped}.",
                    store.capacity(),
                    store.len()
                )?;
                store
            }
            Ok((store, LoadOutcome::Seeded)) => {
                writeln!(output, "Data file not found, starting with a sample outfit.")?;
                if let Err(err) = persistence.save(&store) {
                    tracing::warn!(error = %err, "failed to persist seeded outfits");
                    writeln!(output, "Error saving outfits: {err}")?;
                }
                store
            }
            Err(err) => {
                tracing::warn!(error = %err, "starting with an empty wardrobe");
                writeln!(output, "Error loading outfits: {err}")?;
                if matches!(err, PersistenceError::Invalid { .. }) {
                    saves_enabled = false;
                    writeln!(
                        output,
                        "Changes made in this session will not be saved to {}.",
                        persistence.path().display()
                    )?;
                }
                OutfitStore::new()
            }
        };

        Ok(Self { store, persistence, saves_enabled, input, output })
    }

    #[cfg(test)]
    pub fn store(&self) -> &OutfitStore {
        &self.store
    }

    #[cfg(test)]
    pub fn into_output(self) -> W {
        self.output
    }

    /// Run the main menu until the user exits or input ends.
    ///
    /// # Errors
    /// Returns an error when the terminal cannot be read or written.
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "--- Wardrobe ---")?;
            writeln!(self.output, "1. Add outfit")?;
            writeln!(self.output, "2. Edit outfit")?;
            writeln!(self.output, "3. Delete outfit")?;
            writeln!(self.output, "4. Search outfits")?;
            writeln!(self.output, "5. View outfits (sorted)")?;
            writeln!(self.output, "6. Plan outfit of the day")?;
            writeln!(self.output, "0. Exit")?;

            let Some(line) = self.prompt("Choose an option: ")? else {
                writeln!(self.output)?;
                writeln!(self.output, "Goodbye!")?;
                return Ok(());
            };
            let Ok(choice) = line.parse::<i64>() else {
                writeln!(self.output, "Invalid input, please enter a number.")?;
                continue;
            };

            tracing::debug!(choice, "menu selection");
            match choice {
                1 => self.add()?,
                2 => self.edit()?,
                3 => self.delete()?,
                4 => self.search()?,
                5 => self.view()?,
                6 => self.plan()?,
                0 => {
                    writeln!(self.output, "Goodbye!")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid choice.")?,
            }
        }
    }

    fn add(&mut self) -> Result<()> {
        if self.store.len() >= self.store.capacity() {
            writeln!(self.output, "Capacity full!")?;
            return Ok(());
        }

        writeln!(self.output)?;
        writeln!(self.output, "Add a new outfit")?;
        let Some(name) = self.prompt("Name: ")? else { return Ok(()) };
        let Some(category) =
            self.prompt("Category (Top/Bottom/Outerwear/Accessory/Shoes): ")?
        else {
            return Ok(());
        };
        let Some(color) = self.prompt("Color: ")? else { return Ok(()) };
        let Some(season) = self.prompt("Season (Summer/Rainy/Winter): ")? else {
            return Ok(());
        };
        let Some(description) = self.prompt("Description: ")? else { return Ok(()) };
        let Some(formality_raw) =
            self.prompt("Formality (1=Casual, 2=Semi-formal, 3=Formal): ")?
        else {
            return Ok(());
        };

        let formality = match Formality::parse(&formality_raw) {
            Some(formality) => formality,
            None => {
                tracing::debug!(input = %formality_raw, "formality defaulted to casual");
                writeln!(self.output, "Invalid formality, set to 1 (Casual).")?;
                Formality::Casual
            }
        };

        let draft = NewOutfit { name, category, color, season, description, formality };
        match self.store.insert(draft) {
            Ok(id) => {
                self.persist()?;
                writeln!(self.output, "Outfit added with ID {id}.")?;
            }
            Err(err) => writeln!(self.output, "Could not add outfit: {err}")?,
        }
        Ok(())
    }

    fn edit(&mut self) -> Result<()> {
        let Some(index) = self.prompt_existing("Enter the ID of the outfit to edit: ")? else {
            return Ok(());
        };
        let current = self.store.records()[index].clone();

        writeln!(self.output, "Edit fields (leave blank to keep the current value):")?;
        let Some(name) = self.prompt(&format!("Name [{}]: ", current.name))? else {
            return Ok(());
        };
        let Some(category) = self.prompt(&format!("Category [{}]: ", current.category))? else {
            return Ok(());
        };
        let Some(color) = self.prompt(&format!("Color [{}]: ", current.color))? else {
            return Ok(());
        };
        let Some(season) = self.prompt(&format!("Season [{}]: ", current.season))? else {
            return Ok(());
        };
        let Some(description) =
            self.prompt(&format!("Description [{}]: ", current.description))?
        else {
            return Ok(());
        };
        let Some(formality_raw) =
            self.prompt(&format!("Formality [{}]: ", current.formality))?
        else {
            return Ok(());
        };

        let formality = if formality_raw.is_empty() {
            None
        } else {
            let parsed = Formality::parse(&formality_raw);
            if parsed.is_none() {
                writeln!(self.output, "Invalid formality, left unchanged.")?;
            }
            parsed
        };

        let patch = OutfitPatch {
            name: non_blank(name),
            category: non_blank(category),
            color: non_blank(color),
            season: non_blank(season),
            description: non_blank(description),
            formality,
        };
        if let Err(err) = self.store.update_fields(index, patch) {
            writeln!(self.output, "Could not update outfit: {err}")?;
            return Ok(());
        }

        self.persist()?;
        writeln!(self.output, "Outfit updated.")?;
        Ok(())
    }

    fn delete(&mut self) -> Result<()> {
        let Some(raw) = self.prompt("Enter the ID of the outfit to delete: ")? else {
            return Ok(());
        };
        let Some(id) = parse_id(&raw) else {
            writeln!(self.output, "Invalid ID.")?;
            return Ok(());
        };

        match self.store.remove_by_id(id) {
            Ok(removed) => {
                tracing::debug!(id = %removed.id, name = %removed.name, "outfit deleted");
                self.persist()?;
                writeln!(self.output, "Outfit deleted.")?;
            }
            Err(WardrobeError::NotFound(_)) => writeln!(self.output, "Outfit not found.")?,
            Err(err) => writeln!(self.output, "Could not delete outfit: {err}")?,
        }
        Ok(())
    }

    fn search(&mut self) -> Result<()> {
        if self.store.is_empty() {
            writeln!(self.output, "No outfits yet.")?;
            return Ok(());
        }

        writeln!(self.output)?;
        writeln!(self.output, "Search by:")?;
        writeln!(self.output, "1. Name (sequential search)")?;
        writeln!(self.output, "2. Category (binary search, sorts first)")?;
        writeln!(self.output, "3. Color (sequential search)")?;
        let Some(choice) = self.prompt("Choose: ")? else { return Ok(()) };

        match choice.as_str() {
            "1" => {
                let Some(name) = self.prompt("Enter name: ")? else { return Ok(()) };
                match self.store.search_by_name(&name) {
                    Some(index) => self.show_detail(index)?,
                    None => writeln!(self.output, "Outfit not found.")?,
                }
            }
            "2" => {
                self.store.sort_by_category(SortOrder::Ascending);
                let Some(category) = self.prompt("Enter category: ")? else { return Ok(()) };
                match self.store.search_by_category_binary(&category) {
                    Some(index) => self.show_detail(index)?,
                    None => writeln!(self.output, "Outfit not found.")?,
                }
            }
            "3" => {
                let Some(color) = self.prompt("Enter color: ")? else { return Ok(()) };
                let matches = self.store.search_by_color(&color);
                if matches.is_empty() {
                    writeln!(self.output, "No outfit with that color.")?;
                } else {
                    writeln!(self.output)?;
                    writeln!(self.output, "Found {} outfit(s) with color {color}:", matches.len())?;
                    for index in matches {
                        self.show_detail(index)?;
                    }
                }
            }
            _ => writeln!(self.output, "Invalid choice.")?,
        }
        Ok(())
    }

    fn view(&mut self) -> Result<()> {
        if self.store.is_empty() {
            writeln!(self.output, "No outfits yet.")?;
            return Ok(());
        }

        writeln!(self.output)?;
        writeln!(self.output, "Sort by:")?;
        writeln!(self.output, "1. Name (selection sort)")?;
        writeln!(self.output, "2. Category (insertion sort)")?;
        writeln!(self.output, "3. Formality (selection sort)")?;
        writeln!(self.output, "4. Last used (insertion sort)")?;
        let Some(key_choice) = self.prompt("Choose: ")? else { return Ok(()) };

        writeln!(self.output)?;
        writeln!(self.output, "Order:")?;
        writeln!(self.output, "1. Ascending")?;
        writeln!(self.output, "2. Descending")?;
        let Some(order_choice) = self.prompt("Choose: ")? else { return Ok(()) };
        let order =
            if order_choice == "1" { SortOrder::Ascending } else { SortOrder::Descending };

        let key = match key_choice.as_str() {
            "1" => SortKey::Name,
            "2" => SortKey::Category,
            "3" => SortKey::Formality,
            "4" => SortKey::LastUsed,
            _ => {
                writeln!(self.output, "Invalid choice.")?;
                return Ok(());
            }
        };

        self.store.sort_by(key, order);
        tracing::debug!(key = key.as_str(), order = order.as_str(), "sorted outfits");
        self.show_list()
    }

    fn plan(&mut self) -> Result<()> {
        if self.store.is_empty() {
            writeln!(self.output, "No outfits to plan with yet.")?;
            return Ok(());
        }

        writeln!(self.output)?;
        writeln!(self.output, "Pick a formality:")?;
        for formality in [Formality::Casual, Formality::SemiFormal, Formality::Formal] {
            writeln!(self.output, "{}. {}", formality.level(), formality.label())?;
        }
        let Some(raw) = self.prompt("Choose: ")? else { return Ok(()) };
        let Some(formality) = Formality::parse(&raw) else {
            writeln!(self.output, "Invalid formality choice.")?;
            return Ok(());
        };

        match self.store.recommend(formality) {
            Ok(index) => {
                self.persist()?;
                writeln!(self.output)?;
                writeln!(self.output, "Outfit of the day:")?;
                self.show_detail(index)?;
            }
            Err(WardrobeError::NoneAvailable(_)) => {
                writeln!(self.output, "No outfit with that formality.")?;
            }
            Err(err) => writeln!(self.output, "Could not plan an outfit: {err}")?,
        }
        Ok(())
    }

    fn show_list(&mut self) -> Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "Outfits:")?;
        for record in self.store.records() {
            writeln!(self.output, "{}", summary_line(record))?;
            writeln!(self.output, "   {}", record.description)?;
        }
        Ok(())
    }

    fn show_detail(&mut self, index: usize) -> Result<()> {
        let Some(record) = self.store.get(index) else {
            writeln!(self.output, "Invalid outfit position.")?;
            return Ok(());
        };

        writeln!(self.output)?;
        writeln!(self.output, "Outfit details:")?;
        writeln!(self.output, "ID: {}", record.id)?;
        writeln!(self.output, "Name: {}", record.name)?;
        writeln!(self.output, "Category: {}", record.category)?;
        writeln!(self.output, "Color: {}", record.color)?;
        writeln!(self.output, "Season: {}", record.season)?;
        writeln!(self.output, "Description: {}", record.description)?;
        writeln!(
            self.output,
            "Formality: {} ({})",
            record.formality,
            record.formality.label()
        )?;
        writeln!(self.output, "Last used: {}", record.last_used.date())?;
        Ok(())
    }

    /// Prompt for an id and resolve it to a position, reporting bad input.
    fn prompt_existing(&mut self, label: &str) -> Result<Option<usize>> {
        let Some(raw) = self.prompt(label)? else { return Ok(None) };
        let Some(id) = parse_id(&raw) else {
            writeln!(self.output, "Invalid ID.")?;
            return Ok(None);
        };
        let Some(index) = self.store.find_index_by_id(id) else {
            writeln!(self.output, "Outfit not found.")?;
            return Ok(None);
        };
        Ok(Some(index))
    }

    /// Write `label`, then read one trimmed line. `None` means input ended.
    fn prompt(&mut self, label: &str) -> Result<Option<String>> {
        write!(self.output, "{label}")?;
        self.output.flush().context("failed to flush prompt")?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).context("failed to read input")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn persist(&mut self) -> Result<()> {
        if !self.saves_enabled {
            tracing::debug!(path = %self.persistence.path().display(), "save skipped");
            return Ok(());
        }
        if let Err(err) = self.persistence.save(&self.store) {
            tracing::warn!(error = %err, "failed to persist outfits");
            writeln!(self.output, "Error saving outfits: {err}")?;
        }
        Ok(())
    }
}

pub fn summary_line(record: &Outfit) -> String {
    format!(
        "{}. {} | {} | {} | {} | Formality: {} | Last used: {}",
        record.id,
        record.name,
        record.category,
        record.color,
        record.season,
        record.formality,
        record.last_used.date()
    )
}

fn parse_id(raw: &str) -> Option<OutfitId> {
    raw.parse::<u32>().ok().map(OutfitId)
}

fn non_blank(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
