diesel::table! {
    chart_of_accounts (account_id) {
        account_id -> Integer,
        account_name -> Text,
        account_type -> Nullable<Text>,
        sgna_flag -> Nullable<Bool>,
        sgna_category -> Nullable<Text>,
    }
}

diesel::table! {
    departments (department_id) {
        department_id -> Text,
        department_name -> Text,
        department_group -> Nullable<Text>,
        headcount_planned -> Nullable<Integer>,
    }
}

diesel::table! {
    financials_monthly (rowid) {
        rowid -> BigInt,
        company_id -> Nullable<Integer>,
        company_name -> Nullable<Text>,
        department_id -> Nullable<Text>,
        account_id -> Nullable<Integer>,
        year_month -> Nullable<Date>,
        actual_amount -> Nullable<Double>,
        budget_amount -> Nullable<Double>,
        currency -> Nullable<Text>,
        load_timestamp -> Nullable<Timestamp>,
    }
}

diesel::joinable!(financials_monthly -> chart_of_accounts (account_id));
diesel::joinable!(financials_monthly -> departments (department_id));

diesel::allow_tables_to_appear_in_same_query!(chart_of_accounts, departments, financials_monthly,);
