// src/catalog/csv_store.rs
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, StringRecord, Trim, WriterBuilder};
use tracing::{debug, info, warn};

use super::record::{rating_in_range, MovieRecord};
use super::RecordStore;
use crate::error::{Error, Result};

pub const HEADER: [&str; 5] = ["title", "year", "genre", "rating", "watched"];

/// Flat CSV file with a header row. Header names are matched without regard
/// to case or order, so older files (`Title,Year,Genre,Watched,Rating`) load.
#[derive(Clone, Debug)]
pub struct CsvStore {
    path: PathBuf,
}

impl CsvStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os: OsString = self.path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

impl RecordStore for CsvStore {
    fn load(&self) -> Result<Vec<MovieRecord>> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("No catalog at {}; starting empty", self.path.display());
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(Error::storage(format!(
                    "cannot open {}: {e}",
                    self.path.display()
                )))
            }
        };

        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .trim(Trim::All)
            .from_reader(file);

        let headers = rdr.headers()?.clone();
        if headers.iter().all(|h| h.is_empty()) {
            // Whitespace only counts as empty; anything else needs a header row.
            for row in rdr.records() {
                if row?.iter().any(|f| !f.is_empty()) {
                    return Err(Error::storage(format!(
                        "{}: missing header row",
                        self.path.display()
                    )));
                }
            }
            info!("Catalog {} is empty", self.path.display());
            return Ok(Vec::new());
        }
        let cols = Columns::from_headers(&headers)?;

        // Parse everything before handing anything back: a bad row fails the whole load.
        let mut out = Vec::new();
        for (i, row) in rdr.records().enumerate() {
            let row = row?;
            let line = i + 2;
            out.push(cols.parse_row(&row, line)?);
        }

        info!("Loaded {} movie(s) from {}", out.len(), self.path.display());
        Ok(out)
    }

    fn save(&self, records: &[MovieRecord]) -> Result<()> {
        let tmp_path = self.tmp_path();
        let file = File::create(&tmp_path).map_err(|e| {
            Error::storage(format!("cannot write {}: {e}", tmp_path.display()))
        })?;

        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(file);
        wtr.write_record(HEADER)?;
        for rec in records {
            wtr.write_record(to_csv_row(rec))?;
        }
        wtr.flush()?;
        let mut file = wtr
            .into_inner()
            .map_err(|e| Error::storage(format!("flush {}: {e}", tmp_path.display())))?;
        file.flush()?;
        file.sync_all()?;
        drop(file);

        if let Err(e) = fs::rename(&tmp_path, &self.path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(Error::storage(format!(
                "cannot replace {}: {e}",
                self.path.display()
            )));
        }

        debug!("Saved {} movie(s) to {}", records.len(), self.path.display());
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Positions of the five known columns within the file's header.
struct Columns {
    title: usize,
    year: usize,
    genre: usize,
    rating: usize,
    watched: usize,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
                .ok_or_else(|| Error::storage(format!("missing `{name}` column in header")))
        };
        Ok(Self {
            title: find("title")?,
            year: find("year")?,
            genre: find("genre")?,
            rating: find("rating")?,
            watched: find("watched")?,
        })
    }

    fn parse_row(&self, row: &StringRecord, line: usize) -> Result<MovieRecord> {
        let field = |idx: usize| row.get(idx).unwrap_or("").trim();
        let bad = |what: &str, raw: &str| Error::storage(format!("line {line}: invalid {what} `{raw}`"));

        let title = field(self.title);
        if title.is_empty() {
            return Err(Error::storage(format!("line {line}: empty title")));
        }

        let year_raw = field(self.year);
        let year = parse_year(year_raw).ok_or_else(|| bad("year", year_raw))?;

        let genre_raw = field(self.genre);
        let genre = (!genre_raw.is_empty()).then(|| genre_raw.to_string());

        let rating_raw = field(self.rating);
        let mut rating = if rating_raw.is_empty() {
            None
        } else {
            Some(
                rating_raw
                    .parse::<f64>()
                    .map_err(|_| bad("rating", rating_raw))?,
            )
        };
        if let Some(r) = rating {
            if !rating_in_range(r) {
                warn!("line {line}: rating {r} for `{title}` is outside 0-10; clearing it");
                rating = None;
            }
        }

        let watched_raw = field(self.watched);
        let watched = parse_bool(watched_raw).ok_or_else(|| bad("watched flag", watched_raw))?;

        Ok(MovieRecord {
            title: title.to_string(),
            year,
            genre,
            rating,
            watched,
        })
    }
}

/// `Some(None)` for an empty cell; `None` when the cell is not a whole year.
fn parse_year(raw: &str) -> Option<Option<i32>> {
    if raw.is_empty() {
        return Some(None);
    }
    if let Ok(y) = raw.parse::<i32>() {
        return Some(Some(y));
    }
    // Spreadsheet tools like to write "2010.0".
    let f = raw.parse::<f64>().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i32::MAX as f64 {
        Some(Some(f as i32))
    } else {
        None
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "" | "false" | "0" | "no" => Some(false),
        "true" | "1" | "yes" => Some(true),
        _ => None,
    }
}

fn to_csv_row(rec: &MovieRecord) -> [String; 5] {
    [
        rec.title.clone(),
        rec.year.map(|y| y.to_string()).unwrap_or_default(),
        rec.genre.clone().unwrap_or_default(),
        rec.rating.map(|r| r.to_string()).unwrap_or_default(),
        rec.watched.to_string(),
    ]
}
