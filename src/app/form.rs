// src/app/form.rs
use crate::catalog::MovieRecord;
use crate::error::{Error, Result};
use crate::metadata::FetchedMetadata;

/// Raw text behind the add/edit form. Parsed only on submit.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MovieForm {
    pub title: String,
    pub year: String,
    pub genre: String,
    pub rating: String,
    pub watched: bool,
}

impl MovieForm {
    pub fn from_record(rec: &MovieRecord) -> Self {
        Self {
            title: rec.title.clone(),
            year: rec.year.map(|y| y.to_string()).unwrap_or_default(),
            genre: rec.genre.clone().unwrap_or_default(),
            rating: rec.rating.map(|r| r.to_string()).unwrap_or_default(),
            watched: rec.watched,
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Overwrite fields with whatever the provider knew; unknowns blank the field.
    pub fn fill_from(&mut self, meta: &FetchedMetadata) {
        if let Some(t) = &meta.title {
            self.title = t.clone();
        }
        self.year = meta.year.map(|y| y.to_string()).unwrap_or_default();
        self.genre = meta.genre.clone().unwrap_or_default();
        self.rating = meta.rating.map(|r| r.to_string()).unwrap_or_default();
    }

    pub fn to_record(&self) -> Result<MovieRecord> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(Error::validation("Title cannot be empty."));
        }

        let year_str = self.year.trim();
        let year = if year_str.is_empty() {
            None
        } else {
            Some(
                year_str
                    .parse::<i32>()
                    .map_err(|_| Error::validation("Year must be a number."))?,
            )
        };

        let rating_str = self.rating.trim();
        let rating = if rating_str.is_empty() {
            None
        } else {
            let r = rating_str
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite())
                .ok_or_else(|| Error::validation("Rating must be a number (0-10)."))?;
            if r < 0.0 {
                return Err(Error::validation("Rating cannot be negative."));
            } else if r > 10.0 {
                return Err(Error::validation("Rating must be <= 10."));
            }
            Some(r)
        };

        let rec = MovieRecord {
            title: title.to_string(),
            year,
            genre: Some(self.genre.clone()),
            rating,
            watched: self.watched,
        }
        .normalized();
        rec.validate()?;
        Ok(rec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(title: &str, year: &str, rating: &str) -> MovieForm {
        MovieForm {
            title: title.into(),
            year: year.into(),
            genre: "Drama".into(),
            rating: rating.into(),
            watched: false,
        }
    }

    fn message(f: MovieForm) -> String {
        f.to_record().unwrap_err().to_string()
    }

    #[test]
    fn parses_complete_form() {
        let rec = form(" Heat ", "1995", "8.3").to_record().unwrap();
        assert_eq!(rec.title, "Heat");
        assert_eq!(rec.year, Some(1995));
        assert_eq!(rec.genre.as_deref(), Some("Drama"));
        assert_eq!(rec.rating, Some(8.3));
    }

    #[test]
    fn optional_fields_may_be_blank() {
        let mut f = form("Heat", "", "");
        f.genre.clear();
        let rec = f.to_record().unwrap();
        assert_eq!(rec, MovieRecord::new("Heat"));
    }

    #[test]
    fn input_messages() {
        assert_eq!(message(form("", "1995", "")), "Title cannot be empty.");
        assert_eq!(message(form("Heat", "nineteen", "")), "Year must be a number.");
        assert_eq!(message(form("Heat", "", "great")), "Rating must be a number (0-10).");
        assert_eq!(message(form("Heat", "", "-1")), "Rating cannot be negative.");
        assert_eq!(message(form("Heat", "", "11")), "Rating must be <= 10.");
        assert!(message(form("Heat", "1500", "")).starts_with("Year must be between"));
    }

    #[test]
    fn record_round_trips_through_form() {
        let rec = MovieRecord::new("Dune")
            .with_year(2021)
            .with_genre("Sci-Fi")
            .with_rating(8.0)
            .with_watched(true);
        assert_eq!(MovieForm::from_record(&rec).to_record().unwrap(), rec);
    }

    #[test]
    fn fill_from_blanks_unknowns() {
        let mut f = form("dune", "1984", "6.3");
        f.fill_from(&FetchedMetadata {
            title: Some("Dune".into()),
            year: Some(2021),
            genre: None,
            rating: None,
        });
        assert_eq!(f.title, "Dune");
        assert_eq!(f.year, "2021");
        assert_eq!(f.genre, "");
        assert_eq!(f.rating, "");
    }
}
