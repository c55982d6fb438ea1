//! The catalog: the in-memory list of movies and the store it is flushed to.
//!
//! Every mutation is validated, applied, then saved. When the save fails the
//! mutation is undone, so what is on screen always matches what is on disk.

pub mod csv_store;
pub mod record;

use tracing::{info, warn};

pub use csv_store::CsvStore;
pub use record::MovieRecord;

use crate::error::{Error, Result};

/// Persistence seam. The presentation layer never touches files directly.
pub trait RecordStore: Send {
    fn load(&self) -> Result<Vec<MovieRecord>>;
    fn save(&self, records: &[MovieRecord]) -> Result<()>;
    /// Human-readable location, for logs and the status bar.
    fn describe(&self) -> String;
}

pub struct Catalog {
    store: Box<dyn RecordStore>,
    records: Vec<MovieRecord>,
}

impl Catalog {
    /// Load the full record set from `store`. Fails without partial results.
    pub fn open(store: Box<dyn RecordStore>) -> Result<Self> {
        let records = store.load()?;
        Ok(Self { store, records })
    }

    pub fn records(&self) -> &[MovieRecord] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&MovieRecord> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn location(&self) -> String {
        self.store.describe()
    }

    /// Re-read the store, replacing the in-memory set only on success.
    pub fn reload(&mut self) -> Result<()> {
        self.records = self.store.load()?;
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.store.save(&self.records)
    }

    /// Append a record; returns its index.
    pub fn add(&mut self, record: MovieRecord) -> Result<usize> {
        let record = record.normalized();
        record.validate()?;
        let title = record.display_title();
        self.records.push(record);
        if let Err(e) = self.save() {
            self.records.pop();
            warn!("add `{title}` rolled back: {e}");
            return Err(e);
        }
        info!("Added `{title}`");
        Ok(self.records.len() - 1)
    }

    /// Replace the record at `index` (the edit action).
    pub fn update(&mut self, index: usize, record: MovieRecord) -> Result<()> {
        self.check_index(index)?;
        let record = record.normalized();
        record.validate()?;
        let previous = std::mem::replace(&mut self.records[index], record);
        if let Err(e) = self.save() {
            self.records[index] = previous;
            warn!("update of row {index} rolled back: {e}");
            return Err(e);
        }
        info!("Updated row {index}");
        Ok(())
    }

    pub fn remove(&mut self, index: usize) -> Result<MovieRecord> {
        self.check_index(index)?;
        let removed = self.records.remove(index);
        if let Err(e) = self.save() {
            self.records.insert(index, removed);
            warn!("remove of row {index} rolled back: {e}");
            return Err(e);
        }
        info!("Removed `{}`", removed.display_title());
        Ok(removed)
    }

    /// Drop every record whose title matches case-insensitively.
    pub fn remove_by_title(&mut self, title: &str) -> Result<usize> {
        let needle = title.trim().to_lowercase();
        let before = self.records.clone();
        self.records.retain(|r| r.title.to_lowercase() != needle);
        let removed = before.len() - self.records.len();
        if removed == 0 {
            return Ok(0);
        }
        if let Err(e) = self.save() {
            self.records = before;
            warn!("remove of `{title}` rolled back: {e}");
            return Err(e);
        }
        info!("Deleted {removed} movie(s) titled `{title}`");
        Ok(removed)
    }

    pub fn set_watched(&mut self, index: usize, watched: bool) -> Result<()> {
        self.check_index(index)?;
        let previous = self.records[index].watched;
        if previous == watched {
            return Ok(());
        }
        self.records[index].watched = watched;
        if let Err(e) = self.save() {
            self.records[index].watched = previous;
            warn!("watched flag on row {index} rolled back: {e}");
            return Err(e);
        }
        Ok(())
    }

    /// Flip the watched flag; returns the new value.
    pub fn toggle_watched(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        let next = !self.records[index].watched;
        self.set_watched(index, next)?;
        Ok(next)
    }

    pub fn unwatched(&self) -> impl Iterator<Item = (usize, &MovieRecord)> {
        self.records.iter().enumerate().filter(|(_, r)| !r.watched)
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(Error::Index {
                index,
                len: self.records.len(),
            })
        }
    }
}
