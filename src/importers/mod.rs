use std::{
    fmt,
    fs::File,
    path::{Path, PathBuf},
};

use log::debug;
use serde::de::DeserializeOwned;

use crate::error::{LoadError, LoadResult};

pub mod accounts;
pub mod coerce;
pub mod departments;
pub mod financials;

/// Rows per INSERT statement. The widest table binds nine parameters per row,
/// which keeps a chunk well under SQLite's bound-parameter limit.
pub(crate) const INSERT_CHUNK_SIZE: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Source {
    ChartOfAccounts,
    Departments,
    FinancialsMonthly,
}

impl Source {
    /// Load order. Referenced tables come before the table referencing them.
    pub(crate) const ALL: [Source; 3] = [
        Source::ChartOfAccounts,
        Source::Departments,
        Source::FinancialsMonthly,
    ];

    pub(crate) fn table_name(&self) -> &'static str {
        match &self {
            Source::ChartOfAccounts => "chart_of_accounts",
            Source::Departments => "departments",
            Source::FinancialsMonthly => "financials_monthly",
        }
    }

    pub(crate) fn file_name(&self) -> String {
        format!("{}.csv", self.table_name())
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table_name())
    }
}

pub(crate) fn discover_source(source_directory: &Path, source: Source) -> Option<PathBuf> {
    let path = source_directory.join(source.file_name());
    if path.is_file() {
        Some(path)
    } else {
        debug!("no source for {} at {:?}", source, path);
        None
    }
}

/// Reads every data row of a CSV file into `R`, after checking that the
/// header names all `required_columns`. Returns the rows paired with their
/// 1-based data row number.
pub(crate) fn read_rows<R: DeserializeOwned>(
    path: &Path,
    required_columns: &[&'static str],
) -> LoadResult<Vec<(usize, R)>> {
    let parse_error = |source| LoadError::SourceParse {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(|err| parse_error(csv::Error::from(err)))?;
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(file);

    let headers = reader.headers().map_err(parse_error)?.clone();
    for &column in required_columns {
        if !headers.iter().any(|header| header == column) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    let mut rows = vec![];
    for (ix, row) in reader.deserialize::<R>().enumerate() {
        rows.push((ix + 1, row.map_err(parse_error)?));
    }
    debug!("read {} rows from {:?}", rows.len(), path);
    Ok(rows)
}
