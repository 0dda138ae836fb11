use std::fmt;

use log::{info, warn};

use crate::{
    config::LoaderConfig,
    error::LoadResult,
    importers::{accounts, departments, discover_source, financials, Source},
    store::Store,
};

/// What happened to one source during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Loaded(usize),
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LoadSummary {
    pub outcomes: Vec<(Source, Outcome)>,
}

impl LoadSummary {
    #[cfg(test)]
    pub(crate) fn outcome(&self, source: Source) -> Option<Outcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == source)
            .map(|(_, outcome)| *outcome)
    }
}

impl fmt::Display for LoadSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .outcomes
            .iter()
            .map(|(source, outcome)| match outcome {
                Outcome::Loaded(rows) => format!("{source}: {rows} rows"),
                Outcome::Skipped => format!("{source}: skipped"),
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

/// Rebuilds the store from scratch and loads every present source into it.
/// Any failure ends the run; tables loaded before the failure stay in place.
pub(crate) fn run(config: &LoaderConfig) -> LoadResult<LoadSummary> {
    let mut store = Store::initialize(&config.database_path)?;

    let mut outcomes = vec![];
    for source in Source::ALL {
        let Some(path) = discover_source(&config.source_directory, source) else {
            warn!(
                "{:?} not found, leaving {} empty",
                config.source_directory.join(source.file_name()),
                source
            );
            outcomes.push((source, Outcome::Skipped));
            continue;
        };

        config.validate(source, &path)?;
        info!("loading {} from {:?} into {:?}", source, path, store.path());
        let conn = store.connection();
        let rows = match source {
            Source::ChartOfAccounts => accounts::load(conn, &path)?,
            Source::Departments => departments::load(conn, &path)?,
            Source::FinancialsMonthly => financials::load(conn, &path)?,
        };
        info!("Loaded {} records into {}", rows, source);
        outcomes.push((source, Outcome::Loaded(rows)));
    }

    store.finalize();
    Ok(LoadSummary { outcomes })
}

#[cfg(test)]
mod tests {
    use std::{fs, path::Path};

    use chrono::NaiveDate;
    use diesel::{dsl::count_star, prelude::*, SqliteConnection};
    use tempfile::TempDir;

    use super::*;
    use crate::{
        error::LoadError,
        models::{Account, Department, FinancialRecord},
        schema::{chart_of_accounts, departments, financials_monthly},
    };

    const ACCOUNTS_CSV: &str = "\
account_id,account_name,account_type,sgna_flag,sgna_category
4000,Revenue,Income,N,
6100,Rent,Expense,Y,Facilities
6200,Salaries,Expense,Y,Payroll
";

    const DEPARTMENTS_CSV: &str = "\
department_id,department_name,department_group,headcount_planned
D-OPS,Operations,Delivery,42
D-FIN,Finance,G&A,7
";

    const FINANCIALS_CSV: &str = "\
company_id,company_name,department_id,account_id,year_month,actual_amount,budget_amount,currency,load_timestamp
1,Solar Landscape,D-OPS,6100,2024-03,1500.50,1400,USD,2024-04-02 08:30:00
1,Solar Landscape,D-FIN,6200,2024-03,9800,10000,USD,2024-04-02T08:30:00Z
1,Solar Landscape,D-MISSING,4000,2024-04,-250.25,,USD,
";

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Fixture {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join("csv_data")).unwrap();
            Fixture { dir }
        }

        fn with_all_sources() -> Fixture {
            let fixture = Fixture::new();
            fixture.write("chart_of_accounts.csv", ACCOUNTS_CSV);
            fixture.write("departments.csv", DEPARTMENTS_CSV);
            fixture.write("financials_monthly.csv", FINANCIALS_CSV);
            fixture
        }

        fn write(&self, file_name: &str, contents: &str) {
            fs::write(self.dir.path().join("csv_data").join(file_name), contents).unwrap();
        }

        fn config(&self) -> LoaderConfig {
            LoaderConfig {
                database_path: self.dir.path().join("db").join("solarlandscape.db"),
                source_directory: self.dir.path().join("csv_data"),
                ..LoaderConfig::default()
            }
        }

        fn connect(&self) -> SqliteConnection {
            let path = self.config().database_path;
            SqliteConnection::establish(path.to_str().unwrap()).unwrap()
        }
    }

    fn contents(
        conn: &mut SqliteConnection,
    ) -> (Vec<Account>, Vec<Department>, Vec<FinancialRecord>) {
        (
            chart_of_accounts::table
                .order(chart_of_accounts::account_id)
                .select(Account::as_select())
                .load(conn)
                .unwrap(),
            departments::table
                .order(departments::department_id)
                .select(Department::as_select())
                .load(conn)
                .unwrap(),
            financials_monthly::table
                .order(financials_monthly::rowid)
                .select(FinancialRecord::as_select())
                .load(conn)
                .unwrap(),
        )
    }

    fn count_rows(path: &Path) -> usize {
        fs::read_to_string(path).unwrap().lines().skip(1).count()
    }

    #[test]
    fn loads_every_present_source() {
        let fixture = Fixture::with_all_sources();
        let config = fixture.config();

        let summary = run(&config).unwrap();
        assert!(config.database_path.is_file());
        for source in Source::ALL {
            let expected = count_rows(&config.source_directory.join(source.file_name()));
            assert_eq!(summary.outcome(source), Some(Outcome::Loaded(expected)));
        }
        assert_eq!(
            summary.to_string(),
            "chart_of_accounts: 3 rows, departments: 2 rows, financials_monthly: 3 rows"
        );
    }

    #[test]
    fn header_only_source_loads_zero_rows() {
        let fixture = Fixture::with_all_sources();
        fixture.write(
            "departments.csv",
            "department_id,department_name,department_group,headcount_planned\n",
        );

        let summary = run(&fixture.config()).unwrap();
        assert_eq!(summary.outcome(Source::Departments), Some(Outcome::Loaded(0)));
        assert_eq!(summary.outcome(Source::FinancialsMonthly), Some(Outcome::Loaded(3)));

        let (_, departments, financials) = contents(&mut fixture.connect());
        assert!(departments.is_empty());
        assert_eq!(financials.len(), 3);
    }

    #[test]
    fn rerun_produces_identical_store() {
        let fixture = Fixture::with_all_sources();
        let config = fixture.config();

        run(&config).unwrap();
        let first = contents(&mut fixture.connect());
        run(&config).unwrap();
        let second = contents(&mut fixture.connect());

        assert_eq!(first, second);
        assert_eq!(second.0.len(), 3);
    }

    #[test]
    fn flags_dates_and_timestamps_are_coerced() {
        let fixture = Fixture::with_all_sources();
        run(&fixture.config()).unwrap();
        let (accounts, departments, financials) = contents(&mut fixture.connect());

        let flags: Vec<(i32, Option<bool>)> = accounts
            .iter()
            .map(|a| (a.account_id, a.sgna_flag))
            .collect();
        assert_eq!(
            flags,
            vec![(4000, Some(false)), (6100, Some(true)), (6200, Some(true))]
        );
        assert_eq!(accounts[0].sgna_category, None);
        assert_eq!(departments[1].headcount_planned, Some(42));

        let march = NaiveDate::from_ymd_opt(2024, 3, 1);
        assert_eq!(financials[0].year_month, march);
        assert_eq!(financials[1].year_month, march);
        assert_eq!(financials[2].year_month, NaiveDate::from_ymd_opt(2024, 4, 1));

        let stamp = NaiveDate::from_ymd_opt(2024, 4, 2).and_then(|d| d.and_hms_opt(8, 30, 0));
        assert_eq!(financials[0].load_timestamp, stamp);
        assert_eq!(financials[1].load_timestamp, stamp);
        assert_eq!(financials[2].load_timestamp, None);
        assert_eq!(financials[2].budget_amount, None);
        assert_eq!(financials[2].actual_amount, Some(-250.25));
    }

    #[test]
    fn unknown_department_is_accepted() {
        let fixture = Fixture::with_all_sources();
        run(&fixture.config()).unwrap();

        let mut conn = fixture.connect();
        let orphans: i64 = financials_monthly::table
            .filter(financials_monthly::department_id.eq("D-MISSING"))
            .select(count_star())
            .first(&mut conn)
            .unwrap();
        assert_eq!(orphans, 1);
    }

    #[test]
    fn absent_departments_source_is_skipped() {
        let fixture = Fixture::new();
        fixture.write("chart_of_accounts.csv", ACCOUNTS_CSV);
        fixture.write("financials_monthly.csv", FINANCIALS_CSV);

        let summary = run(&fixture.config()).unwrap();
        assert_eq!(summary.outcome(Source::Departments), Some(Outcome::Skipped));
        assert_eq!(summary.outcome(Source::ChartOfAccounts), Some(Outcome::Loaded(3)));
        assert_eq!(summary.outcome(Source::FinancialsMonthly), Some(Outcome::Loaded(3)));

        let (accounts, departments, financials) = contents(&mut fixture.connect());
        assert_eq!(accounts.len(), 3);
        assert!(departments.is_empty());
        assert_eq!(financials.len(), 3);
    }

    #[test]
    fn no_sources_still_builds_schema() {
        let fixture = Fixture::new();
        let summary = run(&fixture.config()).unwrap();
        assert!(summary.outcomes.iter().all(|(_, o)| *o == Outcome::Skipped));

        let (accounts, departments, financials) = contents(&mut fixture.connect());
        assert!(accounts.is_empty() && departments.is_empty() && financials.is_empty());
    }

    #[test]
    fn malformed_year_month_aborts_after_earlier_tables() {
        let fixture = Fixture::with_all_sources();
        fixture.write(
            "financials_monthly.csv",
            "\
company_id,company_name,department_id,account_id,year_month,actual_amount,budget_amount,currency,load_timestamp
1,Solar Landscape,D-OPS,6100,2024-03,1,1,USD,2024-04-02 08:30:00
1,Solar Landscape,D-OPS,6100,March,1,1,USD,2024-04-02 08:30:00
",
        );

        let err = run(&fixture.config()).unwrap_err();
        match err {
            LoadError::FieldCoercion { row, column, value, .. } => {
                assert_eq!(row, 2);
                assert_eq!(column, "year_month");
                assert_eq!(value, "March");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let (accounts, departments, financials) = contents(&mut fixture.connect());
        assert_eq!(accounts.len(), 3);
        assert_eq!(departments.len(), 2);
        assert!(financials.is_empty());
    }

    #[test]
    fn unmapped_sgna_flag_aborts_run() {
        let fixture = Fixture::with_all_sources();
        fixture.write(
            "chart_of_accounts.csv",
            "account_id,account_name,account_type,sgna_flag,sgna_category\n6100,Rent,Expense,X,\n",
        );

        let err = run(&fixture.config()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::FieldCoercion { column: "sgna_flag", row: 1, .. }
        ));
    }

    #[test]
    fn duplicate_account_fails_insert() {
        let fixture = Fixture::with_all_sources();
        fixture.write(
            "chart_of_accounts.csv",
            "account_id,account_name,account_type,sgna_flag,sgna_category\n6100,Rent,,Y,\n6100,Rent again,,Y,\n",
        );

        let err = run(&fixture.config()).unwrap_err();
        assert!(matches!(err, LoadError::Insert { table: "chart_of_accounts", .. }));
    }

    #[test]
    fn missing_column_aborts_run() {
        let fixture = Fixture::with_all_sources();
        fixture.write(
            "departments.csv",
            "department_id,department_name,department_group\nD-OPS,Operations,Delivery\n",
        );

        let err = run(&fixture.config()).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn { column: "headcount_planned", .. }
        ));
    }

    #[test]
    fn pinned_checksum_mismatch_aborts_before_loading() {
        let fixture = Fixture::with_all_sources();
        let mut config = fixture.config();
        config
            .checksums
            .insert("departments".to_owned(), "0".repeat(64));

        let err = run(&config).unwrap_err();
        assert!(matches!(err, LoadError::ChecksumMismatch { .. }));

        let (accounts, departments, _) = contents(&mut fixture.connect());
        assert_eq!(accounts.len(), 3);
        assert!(departments.is_empty());
    }

    #[test]
    fn many_rows_are_inserted_in_chunks() {
        let fixture = Fixture::new();
        let mut csv = String::from(
            "company_id,company_name,department_id,account_id,year_month,actual_amount,budget_amount,currency,load_timestamp\n",
        );
        for ix in 0..1234 {
            csv.push_str(&format!("{ix},Co,D,1,2023-{:02},{ix}.5,,EUR,\n", ix % 12 + 1));
        }
        fixture.write("financials_monthly.csv", &csv);

        let summary = run(&fixture.config()).unwrap();
        assert_eq!(
            summary.outcome(Source::FinancialsMonthly),
            Some(Outcome::Loaded(1234))
        );
    }
}
