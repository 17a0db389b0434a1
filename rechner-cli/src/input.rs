//! Loading calculation inputs and year tables from TOML files.

use std::fs;
use std::path::{Path, PathBuf};

use rechner_core::{InputError, RechnerInput, YearConfig, YearConfigError, YearConfigRegistry};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid input in {path}: {source}")]
    InvalidInput {
        path: PathBuf,
        #[source]
        source: InputError,
    },

    #[error("invalid year table in {path}: {source}")]
    InvalidYearTable {
        path: PathBuf,
        #[source]
        source: YearConfigError,
    },

    #[error("no tax year is supported")]
    NoSupportedYear,
}

/// `current_year` if the registry has it, otherwise the latest supported year.
pub fn default_tax_year(
    registry: &YearConfigRegistry,
    current_year: i32,
) -> Result<i32, LoadError> {
    if registry.get(current_year).is_ok() {
        return Ok(current_year);
    }
    registry.latest_year().ok_or(LoadError::NoSupportedYear)
}

/// Parses an input document, filling in `default_year` when `tax_year` is
/// absent.
pub fn parse_input(
    text: &str,
    default_year: i32,
) -> Result<RechnerInput, toml::de::Error> {
    let mut table: toml::Table = toml::from_str(text)?;
    if !table.contains_key("tax_year") {
        debug!(default_year, "input has no tax_year, using default");
        table.insert("tax_year".to_string(), toml::Value::Integer(default_year.into()));
    }
    toml::Value::Table(table).try_into()
}

/// Reads, parses and validates an input file.
pub fn load_input(
    path: &Path,
    default_year: i32,
) -> Result<RechnerInput, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let input = parse_input(&text, default_year).map_err(|source| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    input.validate().map_err(|source| LoadError::InvalidInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(input)
}

/// A year table file: one `[[year]]` entry per overridden tax year.
#[derive(Debug, Deserialize)]
struct YearTableFile {
    #[serde(rename = "year", default)]
    years: Vec<YearConfig>,
}

/// Parses override tables and layers them over `base`.
pub fn parse_year_table(
    text: &str,
    base: &YearConfigRegistry,
) -> Result<YearConfigRegistry, YearTableError> {
    let file: YearTableFile = toml::from_str(text)?;
    let mut registry = base.clone();
    for config in file.years {
        let year = config.tax_year;
        registry = registry.with_override(config)?;
        info!(year, "year configuration overridden");
    }
    Ok(registry)
}

#[derive(Debug, Error)]
pub enum YearTableError {
    #[error(transparent)]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] YearConfigError),
}

pub fn load_year_table(
    path: &Path,
    base: &YearConfigRegistry,
) -> Result<YearConfigRegistry, LoadError> {
    let text = fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_year_table(&text, base).map_err(|err| match err {
        YearTableError::Parse(source) => LoadError::Parse {
            path: path.to_path_buf(),
            source,
        },
        YearTableError::Invalid(source) => LoadError::InvalidYearTable {
            path: path.to_path_buf(),
            source,
        },
    })
}
