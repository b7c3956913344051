use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::amortization::{
    DAYS_PER_MONTH, DebtLedger, max_periods, monthly_interest, simulate_single_debt,
};
use super::types::{Account, CompoundingType, Strategy};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentFrequency {
    Monthly,
    Biweekly,
    Weekly,
}

impl PaymentFrequency {
    pub const ALL: [PaymentFrequency; 3] = [
        PaymentFrequency::Monthly,
        PaymentFrequency::Biweekly,
        PaymentFrequency::Weekly,
    ];

    pub fn days(self) -> f64 {
        match self {
            PaymentFrequency::Monthly => DAYS_PER_MONTH,
            PaymentFrequency::Biweekly => 14.0,
            PaymentFrequency::Weekly => 7.0,
        }
    }

    pub fn periods_per_year(self) -> f64 {
        match self {
            PaymentFrequency::Monthly => 12.0,
            PaymentFrequency::Biweekly => 26.0,
            PaymentFrequency::Weekly => 52.0,
        }
    }

    /// Share of the monthly amount paid each period in `biweekly_extra` mode.
    fn extra_mode_fraction(self) -> f64 {
        match self {
            PaymentFrequency::Monthly => 1.0,
            PaymentFrequency::Biweekly => 0.5,
            PaymentFrequency::Weekly => 0.25,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyMode {
    /// Same annual total split across more periods.
    SameAnnual,
    /// Half/quarter of the monthly amount per period, 13 monthly payments a year.
    BiweeklyExtra,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrequencyResult {
    pub frequency: PaymentFrequency,
    pub payment_amount: f64,
    pub annual_total: f64,
    pub months_to_payoff: u32,
    pub total_interest: f64,
    pub saved_vs_monthly: f64,
    pub converged: bool,
}

#[derive(Debug, Clone, Copy)]
struct FrequencyRun {
    periods: u32,
    total_interest: f64,
    converged: bool,
}

fn simulate_with_frequency(
    debts: &[&Account],
    period_budget: f64,
    frequency: PaymentFrequency,
    strategy: Strategy,
) -> FrequencyRun {
    let mut ledger = DebtLedger::from_accounts(debts.iter().copied());
    if debts.is_empty() || period_budget <= 0.0 {
        return FrequencyRun {
            periods: 0,
            total_interest: 0.0,
            converged: ledger.is_settled(),
        };
    }

    let days = frequency.days();
    let minimum_scale = days / DAYS_PER_MONTH;
    let cap = max_periods(days);
    let mut payments = vec![0.0; ledger.len()];
    let mut total_interest = 0.0;

    for period in 1..=cap {
        if ledger.is_settled() {
            return FrequencyRun {
                periods: period - 1,
                total_interest,
                converged: true,
            };
        }
        total_interest += ledger.accrue(days);
        let leftover = ledger.pay_minimums(period_budget, minimum_scale, &mut payments);
        ledger.pay_extra(strategy, leftover, &mut payments);
    }

    FrequencyRun {
        periods: cap,
        total_interest,
        converged: ledger.is_settled(),
    }
}

/// Runs the multi-debt payoff at monthly, biweekly and weekly cadence.
///
/// Results come back in `PaymentFrequency::ALL` order.
pub fn compare_payment_frequencies(
    debts: &[Account],
    monthly_budget: f64,
    strategy: Strategy,
    mode: FrequencyMode,
) -> Vec<FrequencyResult> {
    let active: Vec<&Account> = debts.iter().filter(|a| a.is_debt()).collect();
    let annual_budget = monthly_budget * 12.0;

    let mut results: Vec<FrequencyResult> = PaymentFrequency::ALL
        .into_iter()
        .map(|frequency| {
            let (payment_amount, annual_total) = match mode {
                FrequencyMode::SameAnnual => {
                    (annual_budget / frequency.periods_per_year(), annual_budget)
                }
                FrequencyMode::BiweeklyExtra => {
                    let amount = monthly_budget * frequency.extra_mode_fraction();
                    (amount, amount * frequency.periods_per_year())
                }
            };
            let run = simulate_with_frequency(&active, payment_amount, frequency, strategy);
            let months = f64::from(run.periods) * frequency.days() / DAYS_PER_MONTH;
            FrequencyResult {
                frequency,
                payment_amount,
                annual_total,
                months_to_payoff: (months - 1e-9).ceil().max(0.0) as u32,
                total_interest: run.total_interest,
                saved_vs_monthly: 0.0,
                converged: run.converged,
            }
        })
        .collect();

    let monthly_interest_total = results[0].total_interest;
    for result in &mut results {
        result.saved_vs_monthly = monthly_interest_total - result.total_interest;
    }
    results
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FrequencyRecommendation {
    PayWeeklySignificant,
    PayWeeklyMeaningful,
    PayBiweeklyCompound,
    PayBiweeklySimple,
    MinimalImpact,
    MonthlyIsFine,
}

impl FrequencyRecommendation {
    pub fn message(self) -> &'static str {
        match self {
            FrequencyRecommendation::PayWeeklySignificant => {
                "Pay weekly or biweekly: saves significant interest by reducing the daily compounding balance"
            }
            FrequencyRecommendation::PayWeeklyMeaningful => {
                "Pay weekly or biweekly: saves meaningful interest by reducing the daily compounding balance"
            }
            FrequencyRecommendation::PayBiweeklyCompound => {
                "Pay biweekly if possible: small but real savings on daily compound interest"
            }
            FrequencyRecommendation::PayBiweeklySimple => {
                "Pay biweekly if possible: reduces the average daily balance for simple interest"
            }
            FrequencyRecommendation::MinimalImpact => {
                "Low balance or rate: frequency has minimal impact"
            }
            FrequencyRecommendation::MonthlyIsFine => {
                "Monthly payment is fine: interest is charged monthly, so payment frequency does not change it"
            }
        }
    }

    fn classify(compounding: CompoundingType, weekly_savings: f64, threshold: f64) -> Self {
        match compounding {
            CompoundingType::DailyCompound if weekly_savings > 100.0 => {
                FrequencyRecommendation::PayWeeklySignificant
            }
            CompoundingType::DailyCompound if weekly_savings > 50.0 => {
                FrequencyRecommendation::PayWeeklyMeaningful
            }
            CompoundingType::DailyCompound if weekly_savings > threshold => {
                FrequencyRecommendation::PayBiweeklyCompound
            }
            CompoundingType::DailySimple if weekly_savings > threshold => {
                FrequencyRecommendation::PayBiweeklySimple
            }
            CompoundingType::DailyCompound | CompoundingType::DailySimple => {
                FrequencyRecommendation::MinimalImpact
            }
            CompoundingType::Monthly => FrequencyRecommendation::MonthlyIsFine,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DebtFrequencyBreakdown {
    pub account_id: String,
    pub account_name: String,
    pub compounding_type: CompoundingType,
    pub balance: f64,
    pub interest_rate: f64,
    pub minimum_payment: f64,
    pub benefits_from_frequency: bool,
    pub weekly_savings: f64,
    pub biweekly_savings: f64,
    /// Interest charged over one month at the current balance.
    pub monthly_interest_cost: f64,
    pub recommendation: FrequencyRecommendation,
    pub message: &'static str,
}

const PER_DEBT_MIN_BUDGET: f64 = 50.0;
const MIN_MEANINGFUL_SAVINGS: f64 = 5.0;

fn per_debt_breakdown(debt: &Account) -> DebtFrequencyBreakdown {
    let annual_budget = debt.minimum_payment.max(PER_DEBT_MIN_BUDGET) * 12.0;
    let run = |frequency: PaymentFrequency| {
        simulate_single_debt(
            debt,
            annual_budget / frequency.periods_per_year(),
            frequency.days(),
        )
    };

    let monthly = run(PaymentFrequency::Monthly).total_interest;
    let biweekly = run(PaymentFrequency::Biweekly).total_interest;
    let weekly = run(PaymentFrequency::Weekly).total_interest;
    let weekly_savings = monthly - weekly;
    let biweekly_savings = monthly - biweekly;
    let threshold = MIN_MEANINGFUL_SAVINGS.max(monthly * 0.01);

    // Monthly-charged debts are billed on the statement balance.
    let benefits_from_frequency =
        debt.compounding_type != CompoundingType::Monthly && weekly_savings > threshold;
    let recommendation =
        FrequencyRecommendation::classify(debt.compounding_type, weekly_savings, threshold);

    DebtFrequencyBreakdown {
        account_id: debt.id.clone(),
        account_name: debt.name.clone(),
        compounding_type: debt.compounding_type,
        balance: debt.balance,
        interest_rate: debt.interest_rate,
        minimum_payment: debt.minimum_payment,
        benefits_from_frequency,
        weekly_savings,
        biweekly_savings,
        monthly_interest_cost: monthly_interest(
            debt.balance,
            debt.interest_rate,
            debt.compounding_type,
        ),
        recommendation,
        message: recommendation.message(),
    }
}

/// Simulates each debt alone to see whether paying more often saves interest.
///
/// Rows that benefit come first, then larger weekly savings.
pub fn analyze_per_debt_frequency(debts: &[Account]) -> Vec<DebtFrequencyBreakdown> {
    let mut rows: Vec<DebtFrequencyBreakdown> = debts
        .iter()
        .filter(|d| d.is_debt() && d.balance > 0.0)
        .map(per_debt_breakdown)
        .collect();
    rows.sort_by(|a, b| match (a.benefits_from_frequency, b.benefits_from_frequency) {
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        _ => b.weekly_savings.total_cmp(&a.weekly_savings),
    });
    rows
}
