mod error;

pub use error::InputError;

use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    Account, AccountType, BudgetAllocation, CompoundingType, DebtCategory, DebtFrequencyBreakdown,
    DebtPayoffImpact, Expense, FilingComparisonRow, FilingStatus, FrequencyMode, FrequencyResult,
    HouseAffordabilityResult, HouseInputs, Household, IncomeState, LumpSumAnalysis, PayFrequency,
    PayoffBudget, PayoffSettings, RoadmapOptions, RoadmapResult, Strategy, StrategyComparison,
    TaxBreakdownResult, TaxInput, WithdrawalAnalysisResult, WithdrawalInputs, analyze_lump_sum,
    analyze_per_debt_frequency, analyze_withdrawal, calculate_affordability,
    calculate_debt_payoff_impact, calculate_payoff_budget, calculate_roadmap,
    calculate_tax_breakdown, compare_filing_statuses, compare_payment_frequencies,
    compare_strategies, recommended_allocation,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFilingStatus {
    Single,
    MarriedJointly,
    MarriedSeparately,
    HeadOfHousehold,
}

impl From<CliFilingStatus> for FilingStatus {
    fn from(value: CliFilingStatus) -> Self {
        match value {
            CliFilingStatus::Single => FilingStatus::Single,
            CliFilingStatus::MarriedJointly => FilingStatus::MarriedJointly,
            CliFilingStatus::MarriedSeparately => FilingStatus::MarriedSeparately,
            CliFilingStatus::HeadOfHousehold => FilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPayFrequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
}

impl From<CliPayFrequency> for PayFrequency {
    fn from(value: CliPayFrequency) -> Self {
        match value {
            CliPayFrequency::Weekly => PayFrequency::Weekly,
            CliPayFrequency::Biweekly => PayFrequency::Biweekly,
            CliPayFrequency::Semimonthly => PayFrequency::Semimonthly,
            CliPayFrequency::Monthly => PayFrequency::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliStrategy {
    Avalanche,
    Snowball,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Avalanche => Strategy::Avalanche,
            CliStrategy::Snowball => Strategy::Snowball,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliFrequencyMode {
    SameAnnual,
    BiweeklyExtra,
}

impl From<CliFrequencyMode> for FrequencyMode {
    fn from(value: CliFrequencyMode) -> Self {
        match value {
            CliFrequencyMode::SameAnnual => FrequencyMode::SameAnnual,
            CliFrequencyMode::BiweeklyExtra => FrequencyMode::BiweeklyExtra,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFilingStatus {
    Single,
    #[serde(alias = "marriedJointly", alias = "married_jointly")]
    MarriedJointly,
    #[serde(alias = "marriedSeparately", alias = "married_separately")]
    MarriedSeparately,
    #[serde(alias = "headOfHousehold", alias = "head_of_household")]
    HeadOfHousehold,
}

impl From<ApiFilingStatus> for CliFilingStatus {
    fn from(value: ApiFilingStatus) -> Self {
        match value {
            ApiFilingStatus::Single => CliFilingStatus::Single,
            ApiFilingStatus::MarriedJointly => CliFilingStatus::MarriedJointly,
            ApiFilingStatus::MarriedSeparately => CliFilingStatus::MarriedSeparately,
            ApiFilingStatus::HeadOfHousehold => CliFilingStatus::HeadOfHousehold,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiPayFrequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
}

impl From<ApiPayFrequency> for CliPayFrequency {
    fn from(value: ApiPayFrequency) -> Self {
        match value {
            ApiPayFrequency::Weekly => CliPayFrequency::Weekly,
            ApiPayFrequency::Biweekly => CliPayFrequency::Biweekly,
            ApiPayFrequency::Semimonthly => CliPayFrequency::Semimonthly,
            ApiPayFrequency::Monthly => CliPayFrequency::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiStrategy {
    Avalanche,
    Snowball,
}

impl From<ApiStrategy> for CliStrategy {
    fn from(value: ApiStrategy) -> Self {
        match value {
            ApiStrategy::Avalanche => CliStrategy::Avalanche,
            ApiStrategy::Snowball => CliStrategy::Snowball,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiFrequencyMode {
    #[serde(alias = "sameAnnual", alias = "same_annual")]
    SameAnnual,
    #[serde(alias = "biweeklyExtra", alias = "biweekly_extra")]
    BiweeklyExtra,
}

impl From<ApiFrequencyMode> for CliFrequencyMode {
    fn from(value: ApiFrequencyMode) -> Self {
        match value {
            ApiFrequencyMode::SameAnnual => CliFrequencyMode::SameAnnual,
            ApiFrequencyMode::BiweeklyExtra => CliFrequencyMode::BiweeklyExtra,
        }
    }
}

fn default_account_type() -> AccountType {
    AccountType::Debt
}

fn default_debt_category() -> DebtCategory {
    DebtCategory::Other
}

fn default_expense_category() -> String {
    "other".to_string()
}

/// Account record as stored by the web client. Missing compounding falls back
/// to the category default.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountPayload {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default = "default_account_type")]
    account_type: AccountType,
    balance: f64,
    #[serde(default)]
    interest_rate: f64,
    #[serde(default)]
    minimum_payment: f64,
    #[serde(default)]
    compounding_type: Option<CompoundingType>,
    #[serde(default = "default_debt_category")]
    debt_category: DebtCategory,
    #[serde(default)]
    due_day: u8,
    #[serde(default)]
    credit_limit: f64,
}

impl From<AccountPayload> for Account {
    fn from(value: AccountPayload) -> Self {
        let name = if value.name.is_empty() {
            value.id.clone()
        } else {
            value.name
        };
        Account {
            id: value.id,
            name,
            account_type: value.account_type,
            balance: value.balance,
            interest_rate: value.interest_rate,
            minimum_payment: value.minimum_payment,
            compounding_type: value
                .compounding_type
                .unwrap_or_else(|| value.debt_category.default_compounding()),
            debt_category: value.debt_category,
            due_day: value.due_day,
            credit_limit: value.credit_limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExpensePayload {
    #[serde(default)]
    id: String,
    #[serde(default)]
    name: String,
    amount: f64,
    #[serde(default = "default_expense_category")]
    category: String,
    #[serde(default)]
    due_day: u8,
}

impl From<ExpensePayload> for Expense {
    fn from(value: ExpensePayload) -> Self {
        Expense {
            id: value.id,
            name: value.name,
            amount: value.amount,
            category: value.category,
            due_day: value.due_day,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    base_salary: Option<f64>,
    monthly_commission: Option<f64>,
    monthly_tax_free: Option<f64>,
    monthly_business_income: Option<f64>,
    pay_start_date: Option<NaiveDate>,
    pay_frequency: Option<ApiPayFrequency>,
    next_pay_date: Option<NaiveDate>,
    dependents: Option<u32>,
    state_tax_rate: Option<f64>,
    filing_status: Option<ApiFilingStatus>,

    accounts: Option<Vec<AccountPayload>>,
    expenses: Option<Vec<ExpensePayload>>,

    monthly_budget: Option<f64>,
    strategy: Option<ApiStrategy>,
    frequency_mode: Option<ApiFrequencyMode>,
    emergency_target: Option<f64>,
    cash_to_apply: Option<f64>,

    gift_down_payment: Option<f64>,
    loan_term_years: Option<u32>,
    mortgage_rate: Option<f64>,
    property_tax_rate: Option<f64>,
    annual_insurance: Option<f64>,

    balance_401k: Option<f64>,
    expected_return: Option<f64>,
    withdrawal_amount: Option<f64>,

    as_of: Option<NaiveDate>,
}

#[derive(Parser, Debug)]
#[command(
    name = "debtpath",
    about = "Household debt payoff planner (taxes, payoff strategies, payment frequency, house affordability)"
)]
struct Cli {
    #[arg(long, default_value_t = 0.0, help = "Annual base salary")]
    base_salary: f64,
    #[arg(long, default_value_t = 0.0)]
    monthly_commission: f64,
    #[arg(long, default_value_t = 0.0, help = "Monthly income that is never taxed")]
    monthly_tax_free: f64,
    #[arg(
        long,
        default_value_t = 0.0,
        help = "Monthly business income; keeps arriving before regular pay starts"
    )]
    monthly_business_income: f64,
    #[arg(long, help = "First regular paycheck (YYYY-MM-DD); omit once pay has started")]
    pay_start_date: Option<NaiveDate>,
    #[arg(long, value_enum, default_value_t = CliPayFrequency::Biweekly)]
    pay_frequency: CliPayFrequency,
    #[arg(long)]
    next_pay_date: Option<NaiveDate>,
    #[arg(long, default_value_t = 0)]
    dependents: u32,
    #[arg(long, default_value_t = 0.0, help = "Flat state income tax rate in percent")]
    state_tax_rate: f64,
    #[arg(long, value_enum, default_value_t = CliFilingStatus::Single)]
    filing_status: CliFilingStatus,

    #[arg(long, help = "JSON array of accounts")]
    accounts_file: Option<PathBuf>,
    #[arg(long, help = "JSON array of monthly expenses")]
    expenses_file: Option<PathBuf>,
    #[arg(skip)]
    accounts: Vec<AccountPayload>,
    #[arg(skip)]
    expenses: Vec<ExpensePayload>,

    #[arg(long, help = "Manual monthly payoff budget; replaces the calculated budget")]
    monthly_budget: Option<f64>,
    #[arg(long, value_enum, default_value_t = CliStrategy::Avalanche)]
    strategy: CliStrategy,
    #[arg(long, value_enum, default_value_t = CliFrequencyMode::SameAnnual)]
    frequency_mode: CliFrequencyMode,
    #[arg(long, help = "Emergency fund target; defaults to six months of expenses")]
    emergency_target: Option<f64>,
    #[arg(long, help = "Cash to put toward credit cards; defaults to all cash on hand")]
    cash_to_apply: Option<f64>,

    #[arg(long, default_value_t = 100_000.0)]
    gift_down_payment: f64,
    #[arg(long, default_value_t = 30, help = "Mortgage term, 15 or 30 years")]
    loan_term_years: u32,
    #[arg(long, default_value_t = 6.5, help = "Mortgage APR in percent")]
    mortgage_rate: f64,
    #[arg(long, default_value_t = 1.2, help = "Annual property tax in percent of price")]
    property_tax_rate: f64,
    #[arg(long, default_value_t = 2_400.0)]
    annual_insurance: f64,

    #[arg(long, default_value_t = 0.0)]
    balance_401k: f64,
    #[arg(long, default_value_t = 7.0, help = "Expected annual 401k return in percent")]
    expected_return: f64,
    #[arg(long, default_value_t = 0.0, help = "Early 401k withdrawal to compare against")]
    withdrawal_amount: f64,

    #[arg(long, help = "Date the plan is computed for (YYYY-MM-DD); defaults to today")]
    as_of: Option<NaiveDate>,
}

#[derive(Copy, Clone, Debug)]
struct PlanOptions {
    strategy: Strategy,
    frequency_mode: FrequencyMode,
    emergency_target: Option<f64>,
    cash_to_apply: Option<f64>,
    house: HouseInputs,
    withdrawal: WithdrawalInputs,
}

#[derive(Debug)]
struct PlanRequest {
    household: Household,
    today: NaiveDate,
    options: PlanOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TaxResponse {
    breakdown: TaxBreakdownResult,
    filing_comparison: Vec<FilingComparisonRow>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HouseResponse {
    gross_monthly_income: f64,
    monthly_debt_payments: f64,
    affordability: HouseAffordabilityResult,
    debt_payoff_impact: Vec<DebtPayoffImpact>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    as_of: NaiveDate,
    budget: PayoffBudget,
    tax: TaxResponse,
    strategy: Strategy,
    strategies: StrategyComparison,
    frequencies: Vec<FrequencyResult>,
    per_debt_frequency: Vec<DebtFrequencyBreakdown>,
    lump_sum: Option<LumpSumAnalysis>,
    house: HouseResponse,
    roadmap: RoadmapResult,
    allocation: BudgetAllocation,
    withdrawal: Option<WithdrawalAnalysisResult>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn require_non_negative(field: &str, value: f64) -> Result<(), InputError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(InputError::negative(field))
    }
}

fn require_range(field: &str, value: f64, min: f64, max: f64) -> Result<(), InputError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(InputError::out_of_range(field, min, max))
    }
}

fn validate_accounts(accounts: &[AccountPayload]) -> Result<(), InputError> {
    let mut seen = HashSet::new();
    for (idx, account) in accounts.iter().enumerate() {
        let field = |name: &str| format!("accounts[{idx}].{name}");
        if account.id.trim().is_empty() {
            return Err(InputError::Empty { field: field("id") });
        }
        if !seen.insert(account.id.as_str()) {
            return Err(InputError::DuplicateAccount(account.id.clone()));
        }
        require_non_negative(&field("balance"), account.balance)?;
        require_non_negative(&field("minimumPayment"), account.minimum_payment)?;
        require_non_negative(&field("creditLimit"), account.credit_limit)?;
        require_range(&field("interestRate"), account.interest_rate, 0.0, 100.0)?;
        if account.due_day > 31 {
            return Err(InputError::out_of_range(field("dueDay"), 0.0, 31.0));
        }
    }
    Ok(())
}

fn validate_expenses(expenses: &[ExpensePayload]) -> Result<(), InputError> {
    for (idx, expense) in expenses.iter().enumerate() {
        require_non_negative(&format!("expenses[{idx}].amount"), expense.amount)?;
        if expense.due_day > 31 {
            return Err(InputError::out_of_range(
                format!("expenses[{idx}].dueDay"),
                0.0,
                31.0,
            ));
        }
    }
    Ok(())
}

fn build_request(cli: Cli) -> Result<PlanRequest, InputError> {
    for (field, value) in [
        ("--base-salary", cli.base_salary),
        ("--monthly-commission", cli.monthly_commission),
        ("--monthly-tax-free", cli.monthly_tax_free),
        ("--monthly-business-income", cli.monthly_business_income),
        ("--gift-down-payment", cli.gift_down_payment),
        ("--annual-insurance", cli.annual_insurance),
        ("--balance-401k", cli.balance_401k),
        ("--withdrawal-amount", cli.withdrawal_amount),
    ] {
        require_non_negative(field, value)?;
    }

    for (field, value) in [
        ("--monthly-budget", cli.monthly_budget),
        ("--emergency-target", cli.emergency_target),
        ("--cash-to-apply", cli.cash_to_apply),
    ] {
        if let Some(value) = value {
            require_non_negative(field, value)?;
        }
    }

    require_range("--state-tax-rate", cli.state_tax_rate, 0.0, 100.0)?;
    require_range("--mortgage-rate", cli.mortgage_rate, 0.0, 100.0)?;
    require_range("--property-tax-rate", cli.property_tax_rate, 0.0, 100.0)?;
    require_range("--expected-return", cli.expected_return, -100.0, 100.0)?;

    if !matches!(cli.loan_term_years, 15 | 30) {
        return Err(InputError::InvalidLoanTerm(cli.loan_term_years));
    }

    if let (Some(start), Some(next)) = (cli.pay_start_date, cli.next_pay_date) {
        if next < start {
            return Err(InputError::InvalidDate {
                field: "--next-pay-date".to_string(),
                after: format!("--pay-start-date ({start})"),
            });
        }
    }

    validate_accounts(&cli.accounts)?;
    validate_expenses(&cli.expenses)?;

    let household = Household {
        income: IncomeState {
            base_salary: cli.base_salary,
            monthly_commission: cli.monthly_commission,
            monthly_tax_free: cli.monthly_tax_free,
            monthly_business_income: cli.monthly_business_income,
            pay_start_date: cli.pay_start_date,
            pay_frequency: cli.pay_frequency.into(),
            next_pay_date: cli.next_pay_date,
            dependents: cli.dependents,
            state_tax_rate: cli.state_tax_rate,
            filing_status: cli.filing_status.into(),
        },
        expenses: cli.expenses.into_iter().map(Expense::from).collect(),
        accounts: cli.accounts.into_iter().map(Account::from).collect(),
        payoff_settings: PayoffSettings {
            monthly_budget: cli.monthly_budget.unwrap_or(0.0),
            is_manual_override: cli.monthly_budget.is_some(),
        },
    };

    Ok(PlanRequest {
        household,
        today: cli.as_of.unwrap_or_else(|| Local::now().date_naive()),
        options: PlanOptions {
            strategy: cli.strategy.into(),
            frequency_mode: cli.frequency_mode.into(),
            emergency_target: cli.emergency_target,
            cash_to_apply: cli.cash_to_apply,
            house: HouseInputs {
                gift_down_payment: cli.gift_down_payment,
                loan_term_years: cli.loan_term_years,
                mortgage_rate: cli.mortgage_rate,
                property_tax_rate: cli.property_tax_rate,
                annual_insurance: cli.annual_insurance,
            },
            withdrawal: WithdrawalInputs {
                balance_401k: cli.balance_401k,
                expected_return: cli.expected_return,
                withdrawal_amount: cli.withdrawal_amount,
            },
        },
    })
}

fn read_json_file<T: DeserializeOwned>(path: &Path) -> Result<T, InputError> {
    let text = fs::read_to_string(path).map_err(|source| InputError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

/// Parses command-line arguments, loads the account and expense files and
/// renders the full plan as pretty-printed JSON.
pub fn run_cli<I, T>(args: I) -> Result<String, InputError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let mut cli = Cli::parse_from(args);
    if let Some(path) = cli.accounts_file.as_deref() {
        cli.accounts = read_json_file(path)?;
    }
    if let Some(path) = cli.expenses_file.as_deref() {
        cli.expenses = read_json_file(path)?;
    }

    let request = build_request(cli)?;
    let response = run_plan(&request);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route("/api/plan", post(plan_handler))
        .route("/api/tax", get(tax_get_handler).post(tax_post_handler))
        .route("/api/house", get(house_get_handler).post(house_post_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "debtpath HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/plan");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_handler(Json(payload): Json<PlanPayload>) -> Response {
    with_request(payload, |request| {
        json_response(StatusCode::OK, run_plan(request))
    })
}

async fn tax_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    tax_handler_impl(payload)
}

async fn tax_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    tax_handler_impl(payload)
}

fn tax_handler_impl(payload: PlanPayload) -> Response {
    with_request(payload, |request| {
        json_response(StatusCode::OK, build_tax_response(&request.household.income))
    })
}

async fn house_get_handler(Query(payload): Query<PlanPayload>) -> Response {
    house_handler_impl(payload)
}

async fn house_post_handler(Json(payload): Json<PlanPayload>) -> Response {
    house_handler_impl(payload)
}

fn house_handler_impl(payload: PlanPayload) -> Response {
    with_request(payload, |request| {
        json_response(StatusCode::OK, build_house_response(request))
    })
}

fn with_request(payload: PlanPayload, handle: impl FnOnce(&PlanRequest) -> Response) -> Response {
    match plan_request_from_payload(payload) {
        Ok(request) => handle(&request),
        Err(err) => {
            warn!(error = %err, "rejected request");
            error_response(StatusCode::BAD_REQUEST, &err.to_string())
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn plan_request_from_json(json: &str) -> Result<PlanRequest, InputError> {
    let payload = serde_json::from_str::<PlanPayload>(json)?;
    plan_request_from_payload(payload)
}

fn plan_request_from_payload(payload: PlanPayload) -> Result<PlanRequest, InputError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.base_salary {
        cli.base_salary = v;
    }
    if let Some(v) = payload.monthly_commission {
        cli.monthly_commission = v;
    }
    if let Some(v) = payload.monthly_tax_free {
        cli.monthly_tax_free = v;
    }
    if let Some(v) = payload.monthly_business_income {
        cli.monthly_business_income = v;
    }
    if payload.pay_start_date.is_some() {
        cli.pay_start_date = payload.pay_start_date;
    }
    if let Some(v) = payload.pay_frequency {
        cli.pay_frequency = v.into();
    }
    if payload.next_pay_date.is_some() {
        cli.next_pay_date = payload.next_pay_date;
    }
    if let Some(v) = payload.dependents {
        cli.dependents = v;
    }
    if let Some(v) = payload.state_tax_rate {
        cli.state_tax_rate = v;
    }
    if let Some(v) = payload.filing_status {
        cli.filing_status = v.into();
    }

    if let Some(v) = payload.accounts {
        cli.accounts = v;
    }
    if let Some(v) = payload.expenses {
        cli.expenses = v;
    }

    if payload.monthly_budget.is_some() {
        cli.monthly_budget = payload.monthly_budget;
    }
    if let Some(v) = payload.strategy {
        cli.strategy = v.into();
    }
    if let Some(v) = payload.frequency_mode {
        cli.frequency_mode = v.into();
    }
    if payload.emergency_target.is_some() {
        cli.emergency_target = payload.emergency_target;
    }
    if payload.cash_to_apply.is_some() {
        cli.cash_to_apply = payload.cash_to_apply;
    }

    if let Some(v) = payload.gift_down_payment {
        cli.gift_down_payment = v;
    }
    if let Some(v) = payload.loan_term_years {
        cli.loan_term_years = v;
    }
    if let Some(v) = payload.mortgage_rate {
        cli.mortgage_rate = v;
    }
    if let Some(v) = payload.property_tax_rate {
        cli.property_tax_rate = v;
    }
    if let Some(v) = payload.annual_insurance {
        cli.annual_insurance = v;
    }

    if let Some(v) = payload.balance_401k {
        cli.balance_401k = v;
    }
    if let Some(v) = payload.expected_return {
        cli.expected_return = v;
    }
    if let Some(v) = payload.withdrawal_amount {
        cli.withdrawal_amount = v;
    }

    if payload.as_of.is_some() {
        cli.as_of = payload.as_of;
    }

    build_request(cli)
}

fn default_cli_for_api() -> Cli {
    Cli {
        base_salary: 0.0,
        monthly_commission: 0.0,
        monthly_tax_free: 0.0,
        monthly_business_income: 0.0,
        pay_start_date: None,
        pay_frequency: CliPayFrequency::Biweekly,
        next_pay_date: None,
        dependents: 0,
        state_tax_rate: 0.0,
        filing_status: CliFilingStatus::Single,
        accounts_file: None,
        expenses_file: None,
        accounts: Vec::new(),
        expenses: Vec::new(),
        monthly_budget: None,
        strategy: CliStrategy::Avalanche,
        frequency_mode: CliFrequencyMode::SameAnnual,
        emergency_target: None,
        cash_to_apply: None,
        gift_down_payment: 100_000.0,
        loan_term_years: 30,
        mortgage_rate: 6.5,
        property_tax_rate: 1.2,
        annual_insurance: 2_400.0,
        balance_401k: 0.0,
        expected_return: 7.0,
        withdrawal_amount: 0.0,
        as_of: None,
    }
}

fn build_tax_response(income: &IncomeState) -> TaxResponse {
    let input = TaxInput::from_income(income);
    TaxResponse {
        breakdown: calculate_tax_breakdown(&input),
        filing_comparison: compare_filing_statuses(&input),
    }
}

fn build_house_response(request: &PlanRequest) -> HouseResponse {
    let income = &request.household.income;
    let debts = request.household.debts();
    let gross_monthly_income =
        (income.base_salary + income.monthly_commission * 12.0) / 12.0 + income.monthly_tax_free;
    let monthly_debt_payments: f64 = debts.iter().map(|d| d.minimum_payment).sum();
    let house = &request.options.house;

    HouseResponse {
        gross_monthly_income,
        monthly_debt_payments,
        affordability: calculate_affordability(gross_monthly_income, monthly_debt_payments, house),
        debt_payoff_impact: calculate_debt_payoff_impact(gross_monthly_income, &debts, house),
    }
}

fn run_plan(request: &PlanRequest) -> PlanResponse {
    let household = &request.household;
    let options = request.options;
    let income = &household.income;
    let debts = household.debts();

    let budget = calculate_payoff_budget(household, request.today);
    let pay_delay = budget.pay_delay();
    let monthly_budget = budget.effective_budget;

    let cash_to_apply = options
        .cash_to_apply
        .unwrap_or_else(|| household.total_cash());
    let roadmap = calculate_roadmap(
        income,
        &debts,
        budget.total_expenses,
        monthly_budget,
        &RoadmapOptions {
            emergency_target: options.emergency_target,
            pay_delay,
            house: options.house,
        },
    );
    let allocation = recommended_allocation(roadmap.current_phase, monthly_budget);

    let withdrawal_inputs = options.withdrawal;
    let withdrawal = (withdrawal_inputs.balance_401k > 0.0
        && withdrawal_inputs.withdrawal_amount > 0.0)
        .then(|| analyze_withdrawal(&debts, monthly_budget, income, &withdrawal_inputs));

    PlanResponse {
        as_of: request.today,
        tax: build_tax_response(income),
        strategy: options.strategy,
        strategies: compare_strategies(&debts, monthly_budget, pay_delay),
        frequencies: compare_payment_frequencies(
            &debts,
            monthly_budget,
            options.strategy,
            options.frequency_mode,
        ),
        per_debt_frequency: analyze_per_debt_frequency(&debts),
        lump_sum: analyze_lump_sum(&household.accounts, cash_to_apply, monthly_budget, pay_delay),
        house: build_house_response(request),
        roadmap,
        allocation,
        withdrawal,
        budget,
    }
}
