//! Settings read from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use search_indexer_pipeline::html::DEFAULT_LONG_WORD_LIMIT;
use search_indexer_pipeline::LoaderConfig;
use search_indexer_repository::config::DEFAULT_MAX_BATCH_SIZE;

use crate::IndexingError;

/// Default path of the JSON search mapping.
const DEFAULT_MAPPING_PATH: &str = "config/search_mapping.json";

/// Default path of the JSON field fixtures.
const DEFAULT_DATA_PATH: &str = "config/search_data.json";

/// Default websites to index.
const DEFAULT_WEBSITE_IDS: &str = "1";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = IndexingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(IndexingError::config(format!("Unknown LOG_FORMAT \"{}\"", other))),
        }
    }
}

/// Runtime settings of the indexer binary.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub mapping_path: PathBuf,
    pub data_path: PathBuf,
    pub website_ids: Vec<u64>,
    /// Upper bound of entities the index client accepts per call.
    pub max_batch_size: usize,
    /// Entities the loader writes per call.
    pub loader_batch_size: usize,
    pub long_word_limit: usize,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mapping_path: PathBuf::from(DEFAULT_MAPPING_PATH),
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            website_ids: vec![1],
            max_batch_size: DEFAULT_MAX_BATCH_SIZE,
            loader_batch_size: LoaderConfig::default().batch_size,
            long_word_limit: DEFAULT_LONG_WORD_LIMIT,
            log_format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Read settings from the process environment.
    ///
    /// # Environment Variables
    ///
    /// - `SEARCH_MAPPING_PATH`: search mapping JSON (default: config/search_mapping.json)
    /// - `SEARCH_DATA_PATH`: field fixtures JSON (default: config/search_data.json)
    /// - `SEARCH_WEBSITE_IDS`: comma separated website ids (default: 1)
    /// - `SEARCH_MAX_BATCH_SIZE`: client batch limit (default: 1000)
    /// - `SEARCH_LOADER_BATCH_SIZE`: loader chunk size (default: 100)
    /// - `SEARCH_LONG_WORD_LIMIT`: longest word kept in all-text fields (default: 256)
    /// - `LOG_FORMAT`: `pretty` or `json` (default: pretty)
    pub fn from_env() -> Result<Self, IndexingError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Read settings through `lookup`, which returns the value of a
    /// variable if it is set.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, IndexingError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let mapping_path = lookup("SEARCH_MAPPING_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.mapping_path);
        let data_path = lookup("SEARCH_DATA_PATH")
            .map(PathBuf::from)
            .unwrap_or(defaults.data_path);
        let website_ids = parse_website_ids(
            &lookup("SEARCH_WEBSITE_IDS").unwrap_or_else(|| DEFAULT_WEBSITE_IDS.to_string()),
        )?;

        Ok(Self {
            mapping_path,
            data_path,
            website_ids,
            max_batch_size: parse_size(&lookup, "SEARCH_MAX_BATCH_SIZE", defaults.max_batch_size)?,
            loader_batch_size: parse_size(
                &lookup,
                "SEARCH_LOADER_BATCH_SIZE",
                defaults.loader_batch_size,
            )?,
            long_word_limit: parse_size(
                &lookup,
                "SEARCH_LONG_WORD_LIMIT",
                defaults.long_word_limit,
            )?,
            log_format: lookup("LOG_FORMAT")
                .map(|value| value.parse::<LogFormat>())
                .transpose()?
                .unwrap_or(defaults.log_format),
        })
    }

    pub fn loader_config(&self) -> LoaderConfig {
        LoaderConfig {
            batch_size: self.loader_batch_size,
            ..LoaderConfig::default()
        }
    }
}

fn parse_size<F>(lookup: &F, key: &str, default: usize) -> Result<usize, IndexingError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(key) else {
        return Ok(default);
    };
    match value.trim().parse::<usize>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(IndexingError::config(format!(
            "{} must be a positive integer, got \"{}\"",
            key, value
        ))),
    }
}

fn parse_website_ids(value: &str) -> Result<Vec<u64>, IndexingError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(|id| {
            id.parse::<u64>().map_err(|_| {
                IndexingError::config(format!(
                    "Invalid website id \"{}\" in SEARCH_WEBSITE_IDS",
                    id
                ))
            })
        })
        .collect()
}
