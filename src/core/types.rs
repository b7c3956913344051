use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    Debt,
    Cash,
    Investment,
}

impl AccountType {
    pub fn label(self) -> &'static str {
        match self {
            AccountType::Debt => "Debt",
            AccountType::Cash => "Cash Account",
            AccountType::Investment => "Investment",
        }
    }
}

/// Interest-accrual formula attached to a debt.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingType {
    DailyCompound,
    DailySimple,
    Monthly,
}

impl CompoundingType {
    pub fn label(self) -> &'static str {
        match self {
            CompoundingType::DailyCompound => "Daily Compound",
            CompoundingType::DailySimple => "Daily Simple",
            CompoundingType::Monthly => "Monthly",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            CompoundingType::DailyCompound => "Credit cards: interest compounds daily",
            CompoundingType::DailySimple => "Student loans: simple daily interest",
            CompoundingType::Monthly => "Auto/personal loans: monthly interest",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebtCategory {
    CreditCard,
    StudentLoan,
    AutoLoan,
    PersonalLoan,
    Medical,
    Mortgage,
    Other,
}

impl DebtCategory {
    pub fn label(self) -> &'static str {
        match self {
            DebtCategory::CreditCard => "Credit Card",
            DebtCategory::StudentLoan => "Student Loan",
            DebtCategory::AutoLoan => "Auto Loan",
            DebtCategory::PersonalLoan => "Personal Loan",
            DebtCategory::Medical => "Medical",
            DebtCategory::Mortgage => "Mortgage",
            DebtCategory::Other => "Other",
        }
    }

    pub fn default_compounding(self) -> CompoundingType {
        match self {
            DebtCategory::CreditCard => CompoundingType::DailyCompound,
            DebtCategory::StudentLoan => CompoundingType::DailySimple,
            DebtCategory::AutoLoan
            | DebtCategory::PersonalLoan
            | DebtCategory::Medical
            | DebtCategory::Mortgage
            | DebtCategory::Other => CompoundingType::Monthly,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilingStatus {
    Single,
    MarriedJointly,
    MarriedSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub const ALL: [FilingStatus; 4] = [
        FilingStatus::Single,
        FilingStatus::MarriedJointly,
        FilingStatus::MarriedSeparately,
        FilingStatus::HeadOfHousehold,
    ];

    pub fn label(self) -> &'static str {
        match self {
            FilingStatus::Single => "Single",
            FilingStatus::MarriedJointly => "Married Filing Jointly",
            FilingStatus::MarriedSeparately => "Married Filing Separately",
            FilingStatus::HeadOfHousehold => "Head of Household",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayFrequency {
    Weekly,
    Biweekly,
    Semimonthly,
    Monthly,
}

impl PayFrequency {
    pub fn label(self) -> &'static str {
        match self {
            PayFrequency::Weekly => "Weekly",
            PayFrequency::Biweekly => "Every 2 Weeks",
            PayFrequency::Semimonthly => "1st & 15th",
            PayFrequency::Monthly => "Monthly",
        }
    }
}

/// Order in which leftover budget is thrown at debts.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Highest interest rate first.
    Avalanche,
    /// Lowest balance first.
    Snowball,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    pub balance: f64,
    /// APR as whole-number percent, e.g. 5.5.
    pub interest_rate: f64,
    pub minimum_payment: f64,
    pub compounding_type: CompoundingType,
    pub debt_category: DebtCategory,
    /// 1-31, 0 when unset.
    pub due_day: u8,
    pub credit_limit: f64,
}

impl Account {
    pub fn is_debt(&self) -> bool {
        self.account_type == AccountType::Debt
    }

    pub fn is_credit_card(&self) -> bool {
        self.is_debt() && self.debt_category == DebtCategory::CreditCard
    }

    /// Copy of this account carrying a different balance.
    pub fn with_balance(&self, balance: f64) -> Account {
        Account {
            balance,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub category: String,
    pub due_day: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomeState {
    pub base_salary: f64,
    pub monthly_commission: f64,
    pub monthly_tax_free: f64,
    pub monthly_business_income: f64,
    /// First regular paycheck; `None` when pay has already started.
    pub pay_start_date: Option<NaiveDate>,
    pub pay_frequency: PayFrequency,
    pub next_pay_date: Option<NaiveDate>,
    pub dependents: u32,
    /// Flat state rate as whole-number percent.
    pub state_tax_rate: f64,
    pub filing_status: FilingStatus,
}

impl Default for IncomeState {
    fn default() -> Self {
        Self {
            base_salary: 0.0,
            monthly_commission: 0.0,
            monthly_tax_free: 0.0,
            monthly_business_income: 0.0,
            pay_start_date: None,
            pay_frequency: PayFrequency::Biweekly,
            next_pay_date: None,
            dependents: 0,
            state_tax_rate: 0.0,
            filing_status: FilingStatus::Single,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSettings {
    pub monthly_budget: f64,
    pub is_manual_override: bool,
}

/// Every record the engine reads, passed explicitly into each calculation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Household {
    pub income: IncomeState,
    pub expenses: Vec<Expense>,
    pub accounts: Vec<Account>,
    pub payoff_settings: PayoffSettings,
}

impl Household {
    pub fn debts(&self) -> Vec<Account> {
        self.accounts.iter().filter(|a| a.is_debt()).cloned().collect()
    }

    pub fn total_expenses(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    pub fn total_cash(&self) -> f64 {
        self.accounts
            .iter()
            .filter(|a| a.account_type == AccountType::Cash && a.balance > 0.0)
            .map(|a| a.balance)
            .sum()
    }
}
