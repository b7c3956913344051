use serde::{Deserialize, Serialize};
use tracing::debug;

use super::types::Account;

pub const FRONT_END_RATIO: f64 = 0.28;
pub const BACK_END_RATIO: f64 = 0.36;
const PMI_ANNUAL_RATE: f64 = 0.0075;
const PMI_LTV_THRESHOLD: f64 = 0.80;
const SEARCH_MAX_PRICE: f64 = 5_000_000.0;
const MAX_ITERATIONS: u32 = 100;
const SEARCH_PRECISION: f64 = 100.0;
const PRICE_ROUNDING: f64 = 1_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseInputs {
    pub gift_down_payment: f64,
    pub loan_term_years: u32,
    /// Annual percent, e.g. 6.5.
    pub mortgage_rate: f64,
    /// Annual percent of home value.
    pub property_tax_rate: f64,
    pub annual_insurance: f64,
}

impl Default for HouseInputs {
    fn default() -> Self {
        Self {
            gift_down_payment: 100_000.0,
            loan_term_years: 30,
            mortgage_rate: 6.5,
            property_tax_rate: 1.2,
            annual_insurance: 2_400.0,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitingFactor {
    FrontEnd,
    BackEnd,
}

/// Fixed-rate amortizing payment.
pub fn monthly_principal_and_interest(principal: f64, annual_rate_percent: f64, term_years: u32) -> f64 {
    let payments = f64::from(term_years.max(1) * 12);
    if principal <= 0.0 {
        return 0.0;
    }
    if annual_rate_percent <= 0.0 {
        return principal / payments;
    }
    let rate = annual_rate_percent / 100.0 / 12.0;
    let growth = (1.0 + rate).powf(payments);
    principal * (rate * growth) / (growth - 1.0)
}

fn monthly_pmi(loan_amount: f64, home_price: f64) -> f64 {
    if home_price <= 0.0 || loan_amount <= 0.0 {
        return 0.0;
    }
    if loan_amount / home_price <= PMI_LTV_THRESHOLD {
        return 0.0;
    }
    loan_amount * PMI_ANNUAL_RATE / 12.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HousingCost {
    pub down_payment: f64,
    pub loan_amount: f64,
    pub monthly_pi: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_pmi: f64,
}

impl HousingCost {
    pub fn at_price(home_price: f64, inputs: &HouseInputs) -> Self {
        let down_payment = inputs.gift_down_payment.max(0.0).min(home_price);
        let loan_amount = home_price - down_payment;
        Self {
            down_payment,
            loan_amount,
            monthly_pi: monthly_principal_and_interest(
                loan_amount,
                inputs.mortgage_rate,
                inputs.loan_term_years,
            ),
            monthly_tax: home_price * (inputs.property_tax_rate / 100.0) / 12.0,
            monthly_insurance: inputs.annual_insurance / 12.0,
            monthly_pmi: monthly_pmi(loan_amount, home_price),
        }
    }

    pub fn total(&self) -> f64 {
        self.monthly_pi + self.monthly_tax + self.monthly_insurance + self.monthly_pmi
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HouseAffordabilityResult {
    pub max_home_price: f64,
    pub down_payment: f64,
    pub loan_amount: f64,
    pub monthly_pi: f64,
    pub monthly_tax: f64,
    pub monthly_insurance: f64,
    pub monthly_pmi: f64,
    pub total_monthly_housing: f64,
    /// Housing payment ceiling implied by the binding DTI limit.
    pub max_monthly_housing: f64,
    pub front_end_dti: f64,
    pub back_end_dti: f64,
    pub limiting_factor: LimitingFactor,
    pub iterations: u32,
    pub converged: bool,
}

/// Largest home price whose monthly housing cost fits both DTI limits.
pub fn calculate_affordability(
    gross_monthly_income: f64,
    monthly_debt_payments: f64,
    inputs: &HouseInputs,
) -> HouseAffordabilityResult {
    let front_end_limit = gross_monthly_income * FRONT_END_RATIO;
    let back_end_limit = gross_monthly_income * BACK_END_RATIO - monthly_debt_payments;
    let limit = front_end_limit.min(back_end_limit).max(0.0);
    let limiting_factor = if front_end_limit <= back_end_limit {
        LimitingFactor::FrontEnd
    } else {
        LimitingFactor::BackEnd
    };

    let mut lo = 0.0;
    let mut hi = SEARCH_MAX_PRICE;
    let mut best = 0.0;
    let mut iterations = 0;
    let mut converged = false;
    while iterations < MAX_ITERATIONS {
        iterations += 1;
        let mid = (lo + hi) * 0.5;
        if HousingCost::at_price(mid, inputs).total() <= limit {
            best = mid;
            lo = mid;
        } else {
            hi = mid;
        }
        if hi - lo < SEARCH_PRECISION {
            converged = true;
            break;
        }
    }
    debug!(iterations, converged, best, limit, "affordability search finished");

    let max_home_price = (best / PRICE_ROUNDING).floor() * PRICE_ROUNDING;
    let cost = HousingCost::at_price(max_home_price, inputs);
    let total_monthly_housing = cost.total();
    let (front_end_dti, back_end_dti) = if gross_monthly_income > 0.0 {
        (
            total_monthly_housing / gross_monthly_income * 100.0,
            (total_monthly_housing + monthly_debt_payments) / gross_monthly_income * 100.0,
        )
    } else {
        (0.0, 0.0)
    };

    HouseAffordabilityResult {
        max_home_price,
        down_payment: cost.down_payment,
        loan_amount: cost.loan_amount,
        monthly_pi: cost.monthly_pi,
        monthly_tax: cost.monthly_tax,
        monthly_insurance: cost.monthly_insurance,
        monthly_pmi: cost.monthly_pmi,
        total_monthly_housing,
        max_monthly_housing: limit,
        front_end_dti,
        back_end_dti,
        limiting_factor,
        iterations,
        converged,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtPayoffImpact {
    pub debt_id: String,
    pub debt_name: String,
    pub monthly_payment: f64,
    pub current_back_end_dti: f64,
    pub new_back_end_dti: f64,
    pub dti_drop: f64,
    pub max_home_price_increase: f64,
    pub new_max_home_price: f64,
}

/// Affordability gained by clearing each debt on its own, largest gain first.
pub fn calculate_debt_payoff_impact(
    gross_monthly_income: f64,
    debts: &[Account],
    inputs: &HouseInputs,
) -> Vec<DebtPayoffImpact> {
    let debts: Vec<&Account> = debts.iter().filter(|d| d.is_debt()).collect();
    let total_payments: f64 = debts.iter().map(|d| d.minimum_payment).sum();
    let baseline = calculate_affordability(gross_monthly_income, total_payments, inputs);

    let mut impacts: Vec<DebtPayoffImpact> = debts
        .into_iter()
        .filter(|d| d.minimum_payment > 0.0)
        .map(|debt| {
            let improved = calculate_affordability(
                gross_monthly_income,
                total_payments - debt.minimum_payment,
                inputs,
            );
            DebtPayoffImpact {
                debt_id: debt.id.clone(),
                debt_name: debt.name.clone(),
                monthly_payment: debt.minimum_payment,
                current_back_end_dti: baseline.back_end_dti,
                new_back_end_dti: improved.back_end_dti,
                dti_drop: baseline.back_end_dti - improved.back_end_dti,
                max_home_price_increase: improved.max_home_price - baseline.max_home_price,
                new_max_home_price: improved.max_home_price,
            }
        })
        .collect();
    impacts.sort_by(|a, b| b.max_home_price_increase.total_cmp(&a.max_home_price_increase));
    impacts
}
