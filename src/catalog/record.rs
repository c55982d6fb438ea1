// src/catalog/record.rs
use chrono::Datelike;

use crate::error::{Error, Result};

/// First year a motion picture could plausibly carry.
pub const EARLIEST_YEAR: i32 = 1888;
pub const RATING_MIN: f64 = 0.0;
pub const RATING_MAX: f64 = 10.0;

/// One row of the watchlist. Rows have no identity beyond their position.
#[derive(Clone, Debug, PartialEq)]
pub struct MovieRecord {
    pub title: String,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub rating: Option<f64>,
    pub watched: bool,
}

impl MovieRecord {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            year: None,
            genre: None,
            rating: None,
            watched: false,
        }
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = Some(rating);
        self
    }

    pub fn with_watched(mut self, watched: bool) -> Self {
        self.watched = watched;
        self
    }

    /// Trim text fields and turn blank genres into `None`.
    pub fn normalized(mut self) -> Self {
        self.title = self.title.trim().to_string();
        self.genre = self
            .genre
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Title cannot be empty."));
        }
        if let Some(year) = self.year {
            let latest = latest_plausible_year();
            if !(EARLIEST_YEAR..=latest).contains(&year) {
                return Err(Error::validation(format!(
                    "Year must be between {EARLIEST_YEAR} and {latest}."
                )));
            }
        }
        if let Some(rating) = self.rating {
            if !rating_in_range(rating) {
                return Err(Error::validation("Rating must be between 0 and 10."));
            }
        }
        Ok(())
    }

    /// "Title (Year)" for status lines and listings.
    pub fn display_title(&self) -> String {
        match self.year {
            Some(y) => format!("{} ({})", self.title, y),
            None => self.title.clone(),
        }
    }
}

pub fn rating_in_range(rating: f64) -> bool {
    rating.is_finite() && (RATING_MIN..=RATING_MAX).contains(&rating)
}

pub fn latest_plausible_year() -> i32 {
    chrono::Local::now().year() + 1
}
