use serde::Serialize;

use super::types::{FilingStatus, IncomeState};

pub const CHILD_TAX_CREDIT_PER_DEPENDENT: f64 = 2_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBracket {
    pub min: f64,
    /// `f64::INFINITY` for the top bracket (serialized as `null`).
    pub max: f64,
    pub rate: f64,
}

const fn bracket(min: f64, max: f64, rate: f64) -> TaxBracket {
    TaxBracket { min, max, rate }
}

static SINGLE: [TaxBracket; 7] = [
    bracket(0.0, 11_600.0, 0.10),
    bracket(11_600.0, 47_150.0, 0.12),
    bracket(47_150.0, 100_525.0, 0.22),
    bracket(100_525.0, 191_950.0, 0.24),
    bracket(191_950.0, 243_725.0, 0.32),
    bracket(243_725.0, 609_350.0, 0.35),
    bracket(609_350.0, f64::INFINITY, 0.37),
];

static MARRIED_JOINTLY: [TaxBracket; 7] = [
    bracket(0.0, 23_200.0, 0.10),
    bracket(23_200.0, 94_300.0, 0.12),
    bracket(94_300.0, 201_050.0, 0.22),
    bracket(201_050.0, 383_900.0, 0.24),
    bracket(383_900.0, 487_450.0, 0.32),
    bracket(487_450.0, 731_200.0, 0.35),
    bracket(731_200.0, f64::INFINITY, 0.37),
];

static MARRIED_SEPARATELY: [TaxBracket; 7] = [
    bracket(0.0, 11_600.0, 0.10),
    bracket(11_600.0, 47_150.0, 0.12),
    bracket(47_150.0, 100_525.0, 0.22),
    bracket(100_525.0, 191_950.0, 0.24),
    bracket(191_950.0, 243_725.0, 0.32),
    bracket(243_725.0, 365_600.0, 0.35),
    bracket(365_600.0, f64::INFINITY, 0.37),
];

static HEAD_OF_HOUSEHOLD: [TaxBracket; 7] = [
    bracket(0.0, 16_550.0, 0.10),
    bracket(16_550.0, 63_100.0, 0.12),
    bracket(63_100.0, 100_500.0, 0.22),
    bracket(100_500.0, 191_950.0, 0.24),
    bracket(191_950.0, 243_700.0, 0.32),
    bracket(243_700.0, 609_350.0, 0.35),
    bracket(609_350.0, f64::INFINITY, 0.37),
];

/// Federal brackets for the single tax year the engine models.
pub fn federal_brackets(status: FilingStatus) -> &'static [TaxBracket] {
    match status {
        FilingStatus::Single => &SINGLE,
        FilingStatus::MarriedJointly => &MARRIED_JOINTLY,
        FilingStatus::MarriedSeparately => &MARRIED_SEPARATELY,
        FilingStatus::HeadOfHousehold => &HEAD_OF_HOUSEHOLD,
    }
}

pub fn standard_deduction(status: FilingStatus) -> f64 {
    match status {
        FilingStatus::Single => 14_600.0,
        FilingStatus::MarriedJointly => 29_200.0,
        FilingStatus::MarriedSeparately => 14_600.0,
        FilingStatus::HeadOfHousehold => 21_900.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaxInput {
    pub base_salary: f64,
    pub monthly_commission: f64,
    pub annual_business_income: f64,
    pub dependents: u32,
    /// Whole-number percent applied flat to gross income.
    pub state_tax_rate: f64,
    pub filing_status: FilingStatus,
}

impl TaxInput {
    pub fn from_income(income: &IncomeState) -> Self {
        Self {
            base_salary: income.base_salary,
            monthly_commission: income.monthly_commission,
            annual_business_income: income.monthly_business_income * 12.0,
            dependents: income.dependents,
            state_tax_rate: income.state_tax_rate,
            filing_status: income.filing_status,
        }
    }

    fn gross_income(&self) -> f64 {
        self.base_salary + self.monthly_commission * 12.0 + self.annual_business_income
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketTax {
    pub bracket: TaxBracket,
    pub taxable: f64,
    pub tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdownResult {
    pub brackets: Vec<BracketTax>,
    pub standard_deduction: f64,
    pub taxable_income: f64,
    pub total_federal_tax: f64,
    pub state_tax: f64,
    pub child_tax_credit: f64,
    pub total_tax: f64,
    pub effective_rate: f64,
    pub gross_income: f64,
    pub net_income: f64,
    pub base_tax: f64,
    pub commission_tax: f64,
    pub base_state_tax: f64,
    pub commission_state_tax: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingComparisonRow {
    pub filing_status: FilingStatus,
    pub label: &'static str,
    pub federal_tax: f64,
    pub state_tax: f64,
    pub child_tax_credit: f64,
    pub total_tax: f64,
    pub net_income: f64,
    pub effective_rate: f64,
    pub is_best: bool,
}

/// Per-bracket detail; brackets above the income still appear with zero tax.
pub fn calculate_federal_tax(taxable_income: f64, brackets: &[TaxBracket]) -> Vec<BracketTax> {
    let mut remaining = taxable_income.max(0.0);
    let mut result = Vec::with_capacity(brackets.len());
    for &bracket in brackets {
        if remaining <= 0.0 {
            result.push(BracketTax {
                bracket,
                taxable: 0.0,
                tax: 0.0,
            });
            continue;
        }
        let taxable = remaining.min(bracket.max - bracket.min);
        result.push(BracketTax {
            bracket,
            taxable,
            tax: taxable * bracket.rate,
        });
        remaining -= taxable;
    }
    result
}

fn federal_tax_total(taxable_income: f64, brackets: &[TaxBracket]) -> f64 {
    let mut remaining = taxable_income.max(0.0);
    let mut tax = 0.0;
    for bracket in brackets {
        if remaining <= 0.0 {
            break;
        }
        let taxable = remaining.min(bracket.max - bracket.min);
        tax += taxable * bracket.rate;
        remaining -= taxable;
    }
    tax
}

pub fn calculate_tax_breakdown(input: &TaxInput) -> TaxBreakdownResult {
    let gross_income = input.gross_income();
    let deduction = standard_deduction(input.filing_status);
    let taxable_income = (gross_income - deduction).max(0.0);
    let brackets = federal_brackets(input.filing_status);

    let bracket_breakdown = calculate_federal_tax(taxable_income, brackets);
    let total_federal_tax: f64 = bracket_breakdown.iter().map(|b| b.tax).sum();

    let state_rate = input.state_tax_rate / 100.0;
    let state_tax = gross_income * state_rate;

    let child_tax_credit =
        (input.dependents as f64 * CHILD_TAX_CREDIT_PER_DEPENDENT).min(total_federal_tax);

    let total_tax = total_federal_tax - child_tax_credit + state_tax;
    let effective_rate = if gross_income > 0.0 {
        total_tax / gross_income * 100.0
    } else {
        0.0
    };

    // Base salary is taxed first; whatever federal tax remains belongs to
    // commission (and business income, when present).
    let base_taxable_income = (input.base_salary - deduction).max(0.0);
    let base_tax = federal_tax_total(base_taxable_income, brackets);

    TaxBreakdownResult {
        brackets: bracket_breakdown,
        standard_deduction: deduction,
        taxable_income,
        total_federal_tax,
        state_tax,
        child_tax_credit,
        total_tax,
        effective_rate,
        gross_income,
        net_income: gross_income - total_tax,
        base_tax,
        commission_tax: total_federal_tax - base_tax,
        base_state_tax: input.base_salary * state_rate,
        commission_state_tax: input.monthly_commission * 12.0 * state_rate,
    }
}

/// One row per filing status; every row tied at the minimum total tax is best.
pub fn compare_filing_statuses(input: &TaxInput) -> Vec<FilingComparisonRow> {
    let mut rows = FilingStatus::ALL
        .iter()
        .map(|&filing_status| {
            let result = calculate_tax_breakdown(&TaxInput {
                filing_status,
                ..*input
            });
            FilingComparisonRow {
                filing_status,
                label: filing_status.label(),
                federal_tax: result.total_federal_tax,
                state_tax: result.state_tax,
                child_tax_credit: result.child_tax_credit,
                total_tax: result.total_tax,
                net_income: result.net_income,
                effective_rate: result.effective_rate,
                is_best: false,
            }
        })
        .collect::<Vec<_>>();

    let min_tax = rows
        .iter()
        .map(|r| r.total_tax)
        .fold(f64::INFINITY, f64::min);
    for row in &mut rows {
        row.is_best = (row.total_tax - min_tax).abs() <= 1e-9;
    }
    rows
}
