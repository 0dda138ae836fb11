use std::{
    collections::BTreeMap,
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use log::{debug, LevelFilter};
use serde::Deserialize;

use crate::{
    error::{LoadError, LoadResult},
    importers::Source,
};

pub(crate) const CONFIG_FILE: &str = "loader.toml";
const DEFAULT_DATABASE_PATH: &str = "db/solarlandscape.db";
const DEFAULT_SOURCE_DIRECTORY: &str = "csv_data";

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Where to read sources from and where to build the store. Every field has
/// a default, so an absent `loader.toml` is a valid configuration.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct LoaderConfig {
    pub database_path: PathBuf,
    pub source_directory: PathBuf,
    pub log_level: LogLevel,
    /// Expected sha256sum per table name, e.g. `chart_of_accounts = "ab12..."`.
    pub checksums: BTreeMap<String, String>,
}

impl Default for LoaderConfig {
    fn default() -> LoaderConfig {
        LoaderConfig {
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            source_directory: PathBuf::from(DEFAULT_SOURCE_DIRECTORY),
            log_level: LogLevel::default(),
            checksums: BTreeMap::new(),
        }
    }
}

impl LoaderConfig {
    pub(crate) fn load(path: &Path) -> Result<LoaderConfig> {
        if !path.exists() {
            return Ok(LoaderConfig::default());
        }
        let contents = read_to_string(path).with_context(|| format!("reading {path:?}"))?;
        let config: LoaderConfig =
            toml::from_str(&contents).with_context(|| format!("parsing {path:?}"))?;

        for table in config.checksums.keys() {
            if !Source::ALL.iter().any(|source| source.table_name() == table.as_str()) {
                bail!("{path:?} pins a checksum for unknown table {table:?}");
            }
        }
        Ok(config)
    }

    /// Checks `path` against the pinned checksum for `source`, if there is one.
    pub(crate) fn validate(&self, source: Source, path: &Path) -> LoadResult<()> {
        let checksum: String =
            sha256::try_digest(path).map_err(|source| LoadError::Checksum {
                path: path.to_path_buf(),
                source,
            })?;
        debug!("sha256sum of {:?} is {}", path, checksum);

        match self.checksums.get(source.table_name()) {
            Some(expected) if !expected.eq_ignore_ascii_case(&checksum) => {
                Err(LoadError::ChecksumMismatch {
                    path: path.to_path_buf(),
                    expected: expected.clone(),
                    actual: checksum,
                })
            }
            _ => Ok(()),
        }
    }
}
