use std::path::Path;

use diesel::{Connection, RunQueryDsl, SqliteConnection};
use log::debug;
use serde::Deserialize;

use crate::{
    error::{CoercionError, LoadError, LoadResult},
    importers::{coerce, read_rows, INSERT_CHUNK_SIZE},
    models::Account,
};

const COLUMNS: &[&str] = &[
    "account_id",
    "account_name",
    "account_type",
    "sgna_flag",
    "sgna_category",
];

#[derive(Debug, Deserialize)]
pub(crate) struct AccountRow {
    account_id: String,
    account_name: String,
    account_type: String,
    sgna_flag: String,
    sgna_category: String,
}

pub(crate) fn transform(row: &AccountRow) -> Result<Account, CoercionError> {
    Ok(Account {
        account_id: coerce::required_integer("account_id", &row.account_id)?,
        account_name: coerce::required_text("account_name", &row.account_name)?,
        account_type: coerce::optional_text(&row.account_type),
        sgna_flag: coerce::sgna_flag(&row.sgna_flag)?,
        sgna_category: coerce::optional_text(&row.sgna_category),
    })
}

pub(crate) fn read(path: &Path) -> LoadResult<Vec<Account>> {
    read_rows::<AccountRow>(path, COLUMNS)?
        .iter()
        .map(|(row_number, row)| transform(row).map_err(|err| err.at(path, *row_number)))
        .collect()
}

pub(crate) fn insert(conn: &mut SqliteConnection, accounts: &[Account]) -> LoadResult<usize> {
    use crate::schema::chart_of_accounts;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let mut inserted = 0;
        for chunk in accounts.chunks(INSERT_CHUNK_SIZE) {
            inserted += diesel::insert_into(chart_of_accounts::table)
                .values(chunk)
                .execute(conn)?;
            debug!("inserted {} chart_of_accounts rows", inserted);
        }
        Ok(inserted)
    })
    .map_err(|source| LoadError::Insert {
        table: "chart_of_accounts",
        source,
    })
}

pub(crate) fn load(conn: &mut SqliteConnection, path: &Path) -> LoadResult<usize> {
    let accounts = read(path)?;
    insert(conn, &accounts)
}
