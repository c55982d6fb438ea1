// src/metadata/omdb.rs
//! OMDb (`www.omdbapi.com`) title lookup.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::{FetchedMetadata, MetadataSource};
use crate::config::{AppConfig, API_KEY_ENV};
use crate::error::{Error, Result};

// Leading four digits; OMDb writes series years as "2016–2025".
static YEAR_PREFIX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^\s*(\d{4})").ok());

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct OmdbResponse {
    response: String,
    error: Option<String>,
    title: Option<String>,
    year: Option<String>,
    genre: Option<String>,
    #[serde(rename = "imdbRating")]
    imdb_rating: Option<String>,
}

pub struct OmdbClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl OmdbClient {
    pub fn new(cfg: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("movielog/", env!("CARGO_PKG_VERSION")))
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| Error::Config(format!("http client build: {e}")))?;
        Ok(Self {
            client,
            base_url: cfg.omdb_base_url.clone(),
            api_key: cfg.omdb_api_key.clone(),
        })
    }

    fn lookup_url(&self, key: &str, title: &str) -> String {
        let sep = if self.base_url.contains('?') { '&' } else { '?' };
        format!(
            "{}{}apikey={}&t={}",
            self.base_url,
            sep,
            urlencoding::encode(key),
            urlencoding::encode(title)
        )
    }
}

impl MetadataSource for OmdbClient {
    fn fetch_by_title(&self, title: &str) -> Result<FetchedMetadata> {
        let title = title.trim();
        if title.is_empty() {
            return Err(Error::validation("Please enter a movie title first."));
        }
        let Some(key) = self.api_key.as_deref() else {
            return Err(Error::Config(format!(
                "no OMDb API key; set {API_KEY_ENV} or `omdb_api_key` in config.json"
            )));
        };

        debug!("OMDb lookup for `{title}`");
        let resp = self.client.get(self.lookup_url(key, title)).send()?;
        let status = resp.status().as_u16();
        let body = resp.text()?;

        let out = parse_response(title, status, &body);
        match &out {
            Ok(meta) => info!(
                "OMDb match for `{title}`: year={:?} genre={:?} rating={:?}",
                meta.year, meta.genre, meta.rating
            ),
            Err(e) => warn!("OMDb lookup for `{title}` failed: {e}"),
        }
        out
    }
}

/// Translate an OMDb reply (status + body) into our fields or an error.
pub fn parse_response(title: &str, status: u16, body: &str) -> Result<FetchedMetadata> {
    let success = (200..300).contains(&status);
    if status == 401 {
        let detail = serde_json::from_str::<OmdbResponse>(body)
            .ok()
            .and_then(|p| p.error)
            .unwrap_or_else(|| "HTTP 401".to_string());
        return Err(Error::Config(format!("OMDb rejected the API key: {detail}")));
    }
    let parsed: OmdbResponse = match serde_json::from_str(body) {
        Ok(p) => p,
        Err(e) if success => {
            return Err(Error::network(format!("unexpected OMDb response: {e}")))
        }
        Err(_) => return Err(Error::network(format!("HTTP error {status}"))),
    };

    if parsed.response.eq_ignore_ascii_case("true") {
        return Ok(FetchedMetadata {
            title: present(parsed.title),
            year: parsed.year.as_deref().and_then(leading_year),
            genre: present(parsed.genre),
            rating: present(parsed.imdb_rating).and_then(|r| r.parse::<f64>().ok()),
        });
    }

    let msg = parsed.error.unwrap_or_else(|| "unknown error".to_string());
    let lower = msg.to_ascii_lowercase();
    if lower.contains("not found") {
        Err(Error::NotFound(title.to_string()))
    } else if lower.contains("api key") {
        Err(Error::Config(format!("OMDb rejected the API key: {msg}")))
    } else {
        Err(Error::network(format!("OMDb error: {msg}")))
    }
}

fn present(v: Option<String>) -> Option<String> {
    v.map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty() && s != NOT_AVAILABLE)
}

fn leading_year(s: &str) -> Option<i32> {
    let re = YEAR_PREFIX.as_ref()?;
    re.captures(s)?.get(1)?.as_str().parse().ok()
}
