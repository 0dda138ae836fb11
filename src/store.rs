use std::{
    fs::{create_dir_all, remove_file},
    path::{Path, PathBuf},
};

use diesel::{connection::SimpleConnection, Connection, SqliteConnection};
use log::{debug, info};

use crate::error::{LoadError, LoadResult};

const CREATE_CHART_OF_ACCOUNTS: &str = r#"
CREATE TABLE IF NOT EXISTS chart_of_accounts (
    account_id INTEGER PRIMARY KEY,
    account_name TEXT NOT NULL,
    account_type TEXT,
    sgna_flag BOOLEAN,
    sgna_category TEXT
);
"#;

const CREATE_DEPARTMENTS: &str = r#"
CREATE TABLE IF NOT EXISTS departments (
    department_id TEXT PRIMARY KEY,
    department_name TEXT NOT NULL,
    department_group TEXT,
    headcount_planned INTEGER
);
"#;

// Bundled SQLite turns foreign key enforcement on for every new connection.
// The keys below are declarative only, so it is switched off before the DDL.
const DISABLE_FOREIGN_KEYS: &str = "PRAGMA foreign_keys = OFF;\n";

const CREATE_FINANCIALS_MONTHLY: &str = r#"
CREATE TABLE IF NOT EXISTS financials_monthly (
    company_id INTEGER,
    company_name TEXT,
    department_id TEXT,
    account_id INTEGER,
    year_month DATE,
    actual_amount REAL,
    budget_amount REAL,
    currency TEXT,
    load_timestamp DATETIME,
    FOREIGN KEY (department_id) REFERENCES departments(department_id),
    FOREIGN KEY (account_id) REFERENCES chart_of_accounts(account_id)
);
"#;

/// The single writer for a load run. Owns the connection from schema
/// creation until [`Store::finalize`]; dropping it early closes the
/// connection too.
pub(crate) struct Store {
    path: PathBuf,
    conn: SqliteConnection,
}

impl Store {
    /// Deletes whatever store exists at `path` and builds an empty one.
    pub(crate) fn initialize(path: &Path) -> LoadResult<Store> {
        let init_error = |source| LoadError::StoreInit {
            path: path.to_path_buf(),
            source,
        };

        let url = path.to_str().ok_or_else(|| {
            init_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "store path is not valid UTF-8",
            ))
        })?;

        if path.exists() {
            debug!("removing previous store {:?}", path);
            remove_file(path).map_err(init_error)?;
        }
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                create_dir_all(parent).map_err(init_error)?;
            }
        }

        debug!("opening db {:?}", path);
        let mut conn = SqliteConnection::establish(url).map_err(|source| {
            LoadError::StoreConnection {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let schema = [
            DISABLE_FOREIGN_KEYS,
            CREATE_CHART_OF_ACCOUNTS,
            CREATE_DEPARTMENTS,
            CREATE_FINANCIALS_MONTHLY,
        ]
        .concat();
        conn.batch_execute(&schema)
            .map_err(|source| LoadError::Schema {
                path: path.to_path_buf(),
                source,
            })?;
        info!("created schema in {:?}", path);

        Ok(Store {
            path: path.to_path_buf(),
            conn,
        })
    }

    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Closes the connection and returns where the store was written.
    pub(crate) fn finalize(self) -> PathBuf {
        let Store { path, conn } = self;
        drop(conn);
        info!("Database created successfully at: {}", path.display());
        path
    }
}
