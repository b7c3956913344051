use serde::{Deserialize, Serialize};

use super::amortization::MAX_PAYOFF_MONTHS;
use super::house::{HouseAffordabilityResult, HouseInputs, calculate_affordability};
use super::payoff::{PayDelay, simulate_pay_delay_window, simulate_payoff};
use super::types::{Account, CompoundingType, DebtCategory, IncomeState, Strategy};

const ANNUAL_RETURN: f64 = 0.07;
const EMERGENCY_FUND_SHARE: f64 = 0.70;
const INVEST_SHARE: f64 = 0.50;
const FREEDOM_SHARE: f64 = 0.60;
const INVEST_MONTHS: u32 = 24;
const BUILD_MONTHS: u32 = 12;
const PROJECTION_YEARS: u32 = 30;
const EQUITY_SHARE: f64 = 0.10;
const MILESTONE_YEARS: [u32; 4] = [5, 10, 20, 30];

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseStatus {
    Completed,
    Active,
    Upcoming,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfo {
    pub id: u8,
    pub name: &'static str,
    pub description: String,
    pub status: PhaseStatus,
    pub progress: f64,
    pub estimated_months: u32,
    pub monthly_allocation: f64,
    pub details: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionPoint {
    pub month: u32,
    pub debt: f64,
    pub emergency_fund: f64,
    pub investments: f64,
    pub net_worth: f64,
    /// 0 during a pay-delay window.
    pub phase: u8,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentMilestone {
    pub years: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapResult {
    pub phases: Vec<PhaseInfo>,
    pub projections: Vec<ProjectionPoint>,
    pub current_phase: u8,
    pub milestones: Vec<InvestmentMilestone>,
    pub house: HouseAffordabilityResult,
    pub credit_card_payoff_converged: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RoadmapOptions {
    /// Defaults to six months of expenses.
    pub emergency_target: Option<f64>,
    pub pay_delay: Option<PayDelay>,
    pub house: HouseInputs,
}

fn grow_month(balance: f64, contribution: f64) -> f64 {
    balance * (1.0 + ANNUAL_RETURN / 12.0) + contribution
}

fn is_card_like(debt: &Account) -> bool {
    debt.debt_category == DebtCategory::CreditCard
        || debt.compounding_type == CompoundingType::DailyCompound
}

fn milestones(start: f64, monthly_contribution: f64) -> Vec<InvestmentMilestone> {
    let mut balance = start;
    let mut month = 0;
    MILESTONE_YEARS
        .iter()
        .map(|&years| {
            while month < years * 12 {
                balance = grow_month(balance, monthly_contribution);
                month += 1;
            }
            InvestmentMilestone { years, balance }
        })
        .collect()
}

#[derive(Debug, Default)]
struct Timeline {
    month: u32,
    points: Vec<ProjectionPoint>,
}

impl Timeline {
    fn push(&mut self, phase: u8, debt: f64, emergency_fund: f64, investments: f64, extra: f64) {
        self.month += 1;
        self.points.push(ProjectionPoint {
            month: self.month,
            debt,
            emergency_fund,
            investments,
            net_worth: emergency_fund + investments + extra - debt,
            phase,
        });
    }
}

/// Five sequential phases: clear credit cards, build the emergency fund,
/// invest toward a house, build it, then grow investments for thirty years.
///
/// Caller accounts are never modified; balances after a pay-delay window are
/// threaded into phase 1 as copies.
pub fn calculate_roadmap(
    income: &IncomeState,
    debts: &[Account],
    total_expenses: f64,
    monthly_budget: f64,
    options: &RoadmapOptions,
) -> RoadmapResult {
    let gross_monthly_income =
        (income.base_salary + income.monthly_commission * 12.0) / 12.0 + income.monthly_tax_free;
    let three_month_expenses = total_expenses * 3.0;
    let ef_target = options.emergency_target.unwrap_or(total_expenses * 6.0);
    let ef_label = if ef_target > three_month_expenses { "6" } else { "3" };

    let mut all_debts: Vec<Account> = debts.iter().filter(|d| d.is_debt()).cloned().collect();
    let starting_card_balance: f64 = all_debts
        .iter()
        .filter(|d| is_card_like(d))
        .map(|d| d.balance)
        .sum();

    let mut timeline = Timeline::default();

    if let Some(delay) = options.pay_delay.filter(|d| d.months > 0) {
        let window = simulate_pay_delay_window(&all_debts, delay);
        for &remaining in &window.remaining_by_month {
            timeline.push(0, remaining, 0.0, 0.0, 0.0);
        }
        all_debts = window.accounts(&all_debts);
    }

    let (card_debts, other_debts): (Vec<Account>, Vec<Account>) =
        all_debts.iter().cloned().partition(is_card_like);
    let other_balance: f64 = other_debts.iter().map(|d| d.balance).sum();
    let mut current_debt: f64 = all_debts.iter().map(|d| d.balance).sum();

    // Exit conditions, in phase order. Phases 3-5 run open-ended.
    let cards_cleared = starting_card_balance <= 0.0;
    let fund_met = ef_target <= 0.0;
    let exits = [cards_cleared, fund_met, false, false, false];
    let current_phase = exits.iter().position(|met| !met).unwrap_or(exits.len() - 1) as u8 + 1;
    let status_of = |id: u8| match id.cmp(&current_phase) {
        std::cmp::Ordering::Less => PhaseStatus::Completed,
        std::cmp::Ordering::Equal => PhaseStatus::Active,
        std::cmp::Ordering::Greater => PhaseStatus::Upcoming,
    };

    let mut phases = Vec::with_capacity(5);

    // Phase 1
    let card_payoff = (!card_debts.is_empty())
        .then(|| simulate_payoff(&card_debts, monthly_budget, Strategy::Avalanche, None));
    let card_months = card_payoff.as_ref().map_or(0, |p| p.total_months);
    let card_interest = card_payoff.as_ref().map_or(0.0, |p| p.total_interest_paid);
    phases.push(PhaseInfo {
        id: 1,
        name: "Kill Credit Card Debt",
        description: "All available budget toward credit card payoff (avalanche by APR)".to_string(),
        status: status_of(1),
        progress: if cards_cleared { 100.0 } else { 0.0 },
        estimated_months: card_months,
        monthly_allocation: if cards_cleared { 0.0 } else { monthly_budget },
        details: if cards_cleared {
            "No credit card debt".to_string()
        } else {
            format!(
                "{} credit cards, {card_months} months, interest: ${card_interest:.0}",
                card_debts.len()
            )
        },
    });
    if let Some(payoff) = card_payoff.as_ref().filter(|p| p.total_months > 0) {
        for remaining in payoff.remaining_series() {
            timeline.push(1, remaining + other_balance, 0.0, 0.0, 0.0);
        }
        current_debt = other_balance;
    }

    // Phase 2
    let ef_monthly = monthly_budget * EMERGENCY_FUND_SHARE;
    let ef_months = if ef_target <= 0.0 {
        0
    } else if ef_monthly <= 0.0 {
        MAX_PAYOFF_MONTHS
    } else {
        ((ef_target / ef_monthly).ceil() as u32).min(MAX_PAYOFF_MONTHS)
    };
    phases.push(PhaseInfo {
        id: 2,
        name: "Emergency Fund",
        description: format!(
            "Build {ef_label} months expenses. 70% to savings, 30% to minimum debt payments."
        ),
        status: status_of(2),
        progress: if ef_target > 0.0 { 0.0 } else { 100.0 },
        estimated_months: ef_months,
        monthly_allocation: ef_monthly,
        details: format!("Target: ${ef_target:.0} ({ef_label} months expenses)"),
    });
    for m in 1..=ef_months {
        let fund = ef_target.min(ef_monthly * f64::from(m));
        timeline.push(2, current_debt, fund, 0.0, 0.0);
    }
    let ef_balance = ef_target.max(0.0);

    // Phase 3
    let invest_monthly = monthly_budget * INVEST_SHARE;
    phases.push(PhaseInfo {
        id: 3,
        name: "Invest & Prepare for House",
        description: "Start retirement contributions, save for closing costs. Track DTI improvement."
            .to_string(),
        status: status_of(3),
        progress: 0.0,
        estimated_months: INVEST_MONTHS,
        monthly_allocation: invest_monthly,
        details: format!("Employer match + additional savings. Monthly: ${invest_monthly:.0}"),
    });
    let mut investments = 0.0;
    for _ in 0..INVEST_MONTHS {
        investments = grow_month(investments, invest_monthly);
        timeline.push(3, current_debt, ef_balance, investments, 0.0);
    }

    // Phase 4
    let debt_payments: f64 = all_debts.iter().map(|d| d.minimum_payment).sum();
    let house = calculate_affordability(gross_monthly_income, debt_payments, &options.house);
    phases.push(PhaseInfo {
        id: 4,
        name: "Build House",
        description: format!(
            "${:.0}k gift down payment. Build within max affordable price.",
            options.house.gift_down_payment / 1_000.0
        ),
        status: status_of(4),
        progress: 0.0,
        estimated_months: BUILD_MONTHS,
        monthly_allocation: house.total_monthly_housing,
        details: format!(
            "Max price: ${:.0} | Monthly: ${:.0}",
            house.max_home_price, house.total_monthly_housing
        ),
    });
    for m in 1..=BUILD_MONTHS {
        investments = grow_month(investments, 0.0);
        let equity = house.max_home_price * (f64::from(m) / f64::from(BUILD_MONTHS)) * EQUITY_SHARE;
        timeline.push(4, current_debt, ef_balance, investments, equity);
    }

    // Phase 5
    let freedom_monthly = monthly_budget * FREEDOM_SHARE;
    let milestones = milestones(investments, freedom_monthly);
    phases.push(PhaseInfo {
        id: 5,
        name: "Financial Freedom",
        description: "Increase investment rate. Project long-term wealth.".to_string(),
        status: status_of(5),
        progress: 0.0,
        estimated_months: PROJECTION_YEARS * 12,
        monthly_allocation: freedom_monthly,
        details: milestones
            .iter()
            .map(|m| format!("{}yr: ${:.0}k", m.years, m.balance / 1_000.0))
            .collect::<Vec<_>>()
            .join(" | "),
    });
    for _ in 0..PROJECTION_YEARS {
        for _ in 0..12 {
            investments = grow_month(investments, freedom_monthly);
        }
        timeline.month += 11;
        timeline.push(5, 0.0, ef_balance, investments, 0.0);
    }

    RoadmapResult {
        phases,
        projections: timeline.points,
        current_phase,
        milestones,
        house,
        credit_card_payoff_converged: card_payoff.as_ref().is_none_or(|p| p.converged),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllocationSlice {
    pub label: &'static str,
    pub percentage: f64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAllocation {
    pub phase: u8,
    pub allocations: Vec<AllocationSlice>,
}

/// How the monthly budget should be split while `phase` is active.
pub fn recommended_allocation(phase: u8, monthly_budget: f64) -> BudgetAllocation {
    let split: &[(&'static str, f64)] = match phase {
        1 => &[("Credit Card Debt", 100.0)],
        2 => &[("Emergency Fund", 70.0), ("Min Debt Payments", 30.0)],
        _ => &[("Needs", 50.0), ("Savings & Debt", 20.0), ("Wants", 30.0)],
    };
    BudgetAllocation {
        phase,
        allocations: split
            .iter()
            .map(|&(label, percentage)| AllocationSlice {
                label,
                percentage,
                amount: monthly_budget * percentage / 100.0,
            })
            .collect(),
    }
}
