use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

#[derive(Queryable, Selectable, Debug, Insertable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::chart_of_accounts)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Account {
    pub account_id: i32,
    pub account_name: String,
    pub account_type: Option<String>,
    pub sgna_flag: Option<bool>,
    pub sgna_category: Option<String>,
}

#[derive(Queryable, Selectable, Debug, Insertable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::departments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct Department {
    pub department_id: String,
    pub department_name: String,
    pub department_group: Option<String>,
    pub headcount_planned: Option<i32>,
}

/// A row of `financials_monthly`. The table has no key of its own, so the
/// stored form carries SQLite's implicit rowid. Only read back in tests.
#[cfg(test)]
#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::financials_monthly)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct FinancialRecord {
    pub rowid: i64,
    pub company_id: Option<i32>,
    pub company_name: Option<String>,
    pub department_id: Option<String>,
    pub account_id: Option<i32>,
    pub year_month: Option<NaiveDate>,
    pub actual_amount: Option<f64>,
    pub budget_amount: Option<f64>,
    pub currency: Option<String>,
    pub load_timestamp: Option<NaiveDateTime>,
}

#[derive(Debug, Insertable, Clone, PartialEq)]
#[diesel(table_name = crate::schema::financials_monthly)]
pub struct NewFinancialRecord {
    pub company_id: Option<i32>,
    pub company_name: Option<String>,
    pub department_id: Option<String>,
    pub account_id: Option<i32>,
    pub year_month: Option<NaiveDate>,
    pub actual_amount: Option<f64>,
    pub budget_amount: Option<f64>,
    pub currency: Option<String>,
    pub load_timestamp: Option<NaiveDateTime>,
}
