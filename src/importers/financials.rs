use std::path::Path;

use diesel::{Connection, RunQueryDsl, SqliteConnection};
use log::debug;
use serde::Deserialize;

use crate::{
    error::{CoercionError, LoadError, LoadResult},
    importers::{coerce, read_rows, INSERT_CHUNK_SIZE},
    models::NewFinancialRecord,
};

const COLUMNS: &[&str] = &[
    "company_id",
    "company_name",
    "department_id",
    "account_id",
    "year_month",
    "actual_amount",
    "budget_amount",
    "currency",
    "load_timestamp",
];

#[derive(Debug, Deserialize)]
pub(crate) struct FinancialRow {
    company_id: String,
    company_name: String,
    department_id: String,
    account_id: String,
    year_month: String,
    actual_amount: String,
    budget_amount: String,
    currency: String,
    load_timestamp: String,
}

pub(crate) fn transform(row: &FinancialRow) -> Result<NewFinancialRecord, CoercionError> {
    Ok(NewFinancialRecord {
        company_id: coerce::optional_integer("company_id", &row.company_id)?,
        company_name: coerce::optional_text(&row.company_name),
        department_id: coerce::optional_text(&row.department_id),
        account_id: coerce::optional_integer("account_id", &row.account_id)?,
        year_month: Some(coerce::year_month(&row.year_month)?),
        actual_amount: coerce::optional_amount("actual_amount", &row.actual_amount)?,
        budget_amount: coerce::optional_amount("budget_amount", &row.budget_amount)?,
        currency: coerce::optional_text(&row.currency),
        load_timestamp: coerce::load_timestamp(&row.load_timestamp)?,
    })
}

pub(crate) fn read(path: &Path) -> LoadResult<Vec<NewFinancialRecord>> {
    read_rows::<FinancialRow>(path, COLUMNS)?
        .iter()
        .map(|(row_number, row)| transform(row).map_err(|err| err.at(path, *row_number)))
        .collect()
}

pub(crate) fn insert(
    conn: &mut SqliteConnection,
    records: &[NewFinancialRecord],
) -> LoadResult<usize> {
    use crate::schema::financials_monthly;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let mut inserted = 0;
        for chunk in records.chunks(INSERT_CHUNK_SIZE) {
            inserted += diesel::insert_into(financials_monthly::table)
                .values(chunk)
                .execute(conn)?;
            debug!("inserted {} financials_monthly rows", inserted);
        }
        Ok(inserted)
    })
    .map_err(|source| LoadError::Insert {
        table: "financials_monthly",
        source,
    })
}

pub(crate) fn load(conn: &mut SqliteConnection, path: &Path) -> LoadResult<usize> {
    let records = read(path)?;
    insert(conn, &records)
}
