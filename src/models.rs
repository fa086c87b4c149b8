use crate::error::BingError;
use chrono::{NaiveDate, NaiveDateTime};
use log::{debug, warn};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use url::Url;

#[derive(Debug, Clone, Deserialize)]
pub struct MetadataResponse {
    pub images: Vec<ImageRecord>,
    pub tooltips: Option<ToolTips>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImageRecord {
    pub url: String,
    #[serde(default, rename = "startdate", deserialize_with = "deserialize_date_opt")]
    pub start_date: Option<NaiveDate>,
    #[serde(
        default,
        rename = "fullstartdate",
        deserialize_with = "deserialize_datetime_opt"
    )]
    pub full_start_date: Option<NaiveDateTime>,
    #[serde(default, rename = "enddate", deserialize_with = "deserialize_date_opt")]
    pub end_date: Option<NaiveDate>,
    #[serde(default, rename = "urlbase")]
    pub url_base: Option<String>,
    #[serde(default)]
    pub copyright: Option<String>,
    #[serde(default, rename = "copyrightlink")]
    pub copyright_link: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub quiz: Option<String>,
    #[serde(default)]
    pub wp: Option<bool>,
    #[serde(default)]
    pub hsh: Option<String>,
    #[serde(default)]
    pub drk: Option<i64>,
    #[serde(default)]
    pub top: Option<i64>,
    #[serde(default)]
    pub bot: Option<i64>,
    #[serde(default)]
    pub hs: Option<Vec<Value>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolTips {
    #[serde(default)]
    pub loading: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub walle: Option<String>,
    #[serde(default)]
    pub walls: Option<String>,
}

impl ImageRecord {
    /// Resolve the record's relative `url` against `base_url` by plain concatenation.
    pub fn full_url(&self, base_url: &str) -> Result<Url, BingError> {
        let raw = format!("{}{}", base_url, self.url);
        Url::parse(&raw).map_err(|source| BingError::InvalidUrl { url: raw, source })
    }
}

/// Value of the `id` query parameter, if present.
pub fn image_id(url: &Url) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.into_owned())
}

/// An identifier is usable when it can name a single file inside the save directory.
pub fn is_usable_id(id: &str) -> bool {
    !id.is_empty() && id != "." && id != ".." && !id.contains(['/', '\\'])
}

// Dates are informational only; a value in an unexpected format is dropped, not fatal.
fn date_text(raw: Option<Value>) -> Option<String> {
    match raw? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        other => {
            warn!("Ignoring non-text date value {}", other);
            None
        }
    }
}

fn deserialize_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(date_text(Option::deserialize(deserializer)?)
        .and_then(|s| match NaiveDate::parse_from_str(&s, "%Y%m%d") {
            Ok(date) => Some(date),
            Err(_) => {
                warn!("Ignoring invalid date value {:?}", s);
                None
            }
        }))
}

fn deserialize_datetime_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(date_text(Option::deserialize(deserializer)?)
        .and_then(|s| match NaiveDateTime::parse_from_str(&s, "%Y%m%d%H%M") {
            Ok(datetime) => Some(datetime),
            Err(_) => {
                warn!("Ignoring invalid date-time value {:?}", s);
                None
            }
        }))
}

// Object keys are folded to lower case so the typed structs match regardless of casing.
fn lowercase_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (key.to_lowercase(), lowercase_keys(v)))
                .collect::<Map<String, Value>>(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(lowercase_keys).collect()),
        other => other,
    }
}

pub fn parse_metadata(data: &str) -> Result<MetadataResponse, BingError> {
    let raw: Value = serde_json::from_str(data)?;
    let parsed: MetadataResponse = serde_json::from_value(lowercase_keys(raw))?;
    debug!("Parsed metadata with {} images", parsed.images.len());
    Ok(parsed)
}
