use std::path::Path;

use diesel::{Connection, RunQueryDsl, SqliteConnection};
use log::debug;
use serde::Deserialize;

use crate::{
    error::{CoercionError, LoadError, LoadResult},
    importers::{coerce, read_rows, INSERT_CHUNK_SIZE},
    models::Department,
};

const COLUMNS: &[&str] = &[
    "department_id",
    "department_name",
    "department_group",
    "headcount_planned",
];

#[derive(Debug, Deserialize)]
pub(crate) struct DepartmentRow {
    department_id: String,
    department_name: String,
    department_group: String,
    headcount_planned: String,
}

pub(crate) fn transform(row: &DepartmentRow) -> Result<Department, CoercionError> {
    Ok(Department {
        department_id: coerce::required_text("department_id", &row.department_id)?,
        department_name: coerce::required_text("department_name", &row.department_name)?,
        department_group: coerce::optional_text(&row.department_group),
        headcount_planned: coerce::optional_integer("headcount_planned", &row.headcount_planned)?,
    })
}

pub(crate) fn read(path: &Path) -> LoadResult<Vec<Department>> {
    read_rows::<DepartmentRow>(path, COLUMNS)?
        .iter()
        .map(|(row_number, row)| transform(row).map_err(|err| err.at(path, *row_number)))
        .collect()
}

pub(crate) fn insert(conn: &mut SqliteConnection, rows: &[Department]) -> LoadResult<usize> {
    use crate::schema::departments;

    conn.transaction::<_, diesel::result::Error, _>(|conn| {
        let mut inserted = 0;
        for chunk in rows.chunks(INSERT_CHUNK_SIZE) {
            inserted += diesel::insert_into(departments::table)
                .values(chunk)
                .execute(conn)?;
            debug!("inserted {} departments rows", inserted);
        }
        Ok(inserted)
    })
    .map_err(|source| LoadError::Insert {
        table: "departments",
        source,
    })
}

pub(crate) fn load(conn: &mut SqliteConnection, path: &Path) -> LoadResult<usize> {
    let rows = read(path)?;
    insert(conn, &rows)
}
