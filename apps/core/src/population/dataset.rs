//! World Bank indicator download and coercion.
//!
//! The API answers with a two-element array: paging metadata, then the
//! records (or `null` when there are none). Errors come back as a
//! single-element array whose object carries a `message` list.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::AppError;

// Calendar years accepted from the `date` field
const MIN_YEAR: f64 = 1.0;
const MAX_YEAR: f64 = 9999.0;
/// Upper bound on the page count the server may ask us to follow
pub const MAX_PAGES: u32 = 100;

/// One usable `(year, population)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub year: i32,
    pub population: f64,
}

/// A decoded page of the indicator series.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetPage {
    pub page: u32,
    pub pages: u32,
    pub observations: Vec<Observation>,
    /// Records dropped because `date` or `value` was not numeric
    pub skipped: usize,
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    #[serde(default)]
    date: Value,
    #[serde(default)]
    value: Value,
}

/// Number or numeric string, like a lenient float parse.
fn as_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    number.is_finite().then_some(number)
}

fn as_year(value: &Value) -> Option<i32> {
    let year = as_number(value)?;
    if year.fract() != 0.0 || !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return None;
    }
    Some(year as i32)
}

fn api_error_message(meta: &Value) -> Option<String> {
    let messages = meta.get("message")?.as_array()?;
    let text = messages
        .iter()
        .map(|m| {
            m.get("value")
                .and_then(Value::as_str)
                .or_else(|| m.get("key").and_then(Value::as_str))
                .unwrap_or("unknown error")
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("; ");
    Some(text)
}

/// Decode one response body.
pub fn parse_page(body: &str) -> Result<DatasetPage, AppError> {
    let document: Vec<Value> = serde_json::from_str(body)?;
    let meta = document
        .first()
        .ok_or_else(|| AppError::Validation("empty dataset response".to_string()))?;

    if let Some(message) = api_error_message(meta) {
        return Err(AppError::Validation(format!("dataset API error: {}", message)));
    }

    let page = meta.get("page").and_then(as_number).unwrap_or(1.0) as u32;
    let pages = meta.get("pages").and_then(as_number).unwrap_or(1.0) as u32;

    let records: Vec<RawRecord> = match document.get(1) {
        None | Some(Value::Null) => Vec::new(),
        Some(records) => serde_json::from_value(records.clone())?,
    };

    let total = records.len();
    let observations: Vec<Observation> = records
        .iter()
        .filter_map(|r| {
            Some(Observation {
                year: as_year(&r.date)?,
                population: as_number(&r.value)?,
            })
        })
        .collect();

    Ok(DatasetPage {
        page,
        pages: pages.max(1),
        skipped: total - observations.len(),
        observations,
    })
}

/// `base` with its `page` query parameter set to `page`.
fn page_url(base: &Url, page: u32) -> Url {
    let pairs: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(key, _)| key != "page")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    let mut url = base.clone();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(pairs)
        .append_pair("page", &page.to_string());
    url
}

async fn fetch_page(client: &Client, url: Url) -> Result<DatasetPage, AppError> {
    debug!("Fetching {}", url);
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    parse_page(&body)
}

/// Download every page of the series and return the usable observations,
/// sorted by year.
#[instrument(skip(client))]
pub async fn fetch_observations(client: &Client, url: &str) -> Result<Vec<Observation>, AppError> {
    let base = Url::parse(url)?;
    let first = fetch_page(client, base.clone()).await?;

    let pages = first.pages;
    if pages > MAX_PAGES {
        return Err(AppError::Validation(format!(
            "dataset reports {} pages, more than the limit of {}",
            pages, MAX_PAGES
        )));
    }
    let mut skipped = first.skipped;
    let mut observations = first.observations;

    for page in (first.page + 1)..=pages {
        let next = fetch_page(client, page_url(&base, page)).await?;
        skipped += next.skipped;
        observations.extend(next.observations);
    }

    if skipped > 0 {
        warn!("Skipped {} records with missing or non-numeric fields", skipped);
    }
    if observations.is_empty() {
        return Err(AppError::Validation(
            "dataset contains no numeric observations".to_string(),
        ));
    }

    observations.sort_by_key(|o| o.year);
    info!(
        "Fetched {} observations over {} page(s)",
        observations.len(),
        pages
    );
    Ok(observations)
}
