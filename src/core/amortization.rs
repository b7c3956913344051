use serde::Serialize;

use super::types::{Account, CompoundingType, Strategy};

pub const DAYS_PER_MONTH: f64 = 30.44;
pub const DAYS_PER_YEAR: f64 = 365.0;
/// Roughly fifty years of monthly periods.
pub const MAX_PAYOFF_MONTHS: u32 = 600;
/// Aggregate balance at or below this counts as paid off.
pub const PAID_OFF_THRESHOLD: f64 = 0.01;

/// Interest accrued on `balance` over `days` under `compounding`.
///
/// The monthly model pro-rates the monthly rate by period length, so a
/// `DAYS_PER_MONTH` period yields exactly `balance * apr / 12`.
pub fn period_interest(
    balance: f64,
    apr_percent: f64,
    compounding: CompoundingType,
    days: f64,
) -> f64 {
    if balance <= 0.0 || apr_percent <= 0.0 || days <= 0.0 {
        return 0.0;
    }
    let apr = apr_percent / 100.0;
    match compounding {
        CompoundingType::DailyCompound => balance * ((1.0 + apr / DAYS_PER_YEAR).powf(days) - 1.0),
        CompoundingType::DailySimple => balance * (apr / DAYS_PER_YEAR) * days,
        CompoundingType::Monthly => balance * (apr / 12.0) * (days / DAYS_PER_MONTH),
    }
}

pub fn monthly_interest(balance: f64, apr_percent: f64, compounding: CompoundingType) -> f64 {
    period_interest(balance, apr_percent, compounding, DAYS_PER_MONTH)
}

/// Period cap equivalent to `MAX_PAYOFF_MONTHS` at the given period length.
pub fn max_periods(period_days: f64) -> u32 {
    let periods = MAX_PAYOFF_MONTHS as f64 * (DAYS_PER_MONTH / period_days);
    (periods - 1e-9).ceil() as u32
}

#[derive(Debug, Clone, Copy)]
struct WorkingDebt {
    rate: f64,
    minimum: f64,
    compounding: CompoundingType,
    balance: f64,
}

/// Working copy of debt balances for one simulation run.
///
/// Indices follow the slice the ledger was built from. The caller's
/// accounts are never touched.
#[derive(Debug, Clone)]
pub(crate) struct DebtLedger {
    debts: Vec<WorkingDebt>,
    order: Vec<usize>,
}

impl DebtLedger {
    pub(crate) fn from_accounts<'a>(accounts: impl IntoIterator<Item = &'a Account>) -> Self {
        let debts = accounts
            .into_iter()
            .map(|a| WorkingDebt {
                rate: a.interest_rate,
                minimum: a.minimum_payment.max(0.0),
                compounding: a.compounding_type,
                balance: a.balance.max(0.0),
            })
            .collect::<Vec<_>>();
        let order = Vec::with_capacity(debts.len());
        Self { debts, order }
    }

    pub(crate) fn len(&self) -> usize {
        self.debts.len()
    }

    pub(crate) fn balance(&self, index: usize) -> f64 {
        self.debts[index].balance.max(0.0)
    }

    pub(crate) fn total_remaining(&self) -> f64 {
        self.debts.iter().map(|d| d.balance.max(0.0)).sum()
    }

    pub(crate) fn is_settled(&self) -> bool {
        self.total_remaining() <= PAID_OFF_THRESHOLD
    }

    /// Accrues one period of interest on every positive balance.
    pub(crate) fn accrue(&mut self, days: f64) -> f64 {
        let mut accrued = 0.0;
        for debt in &mut self.debts {
            if debt.balance <= 0.0 {
                continue;
            }
            let interest = period_interest(debt.balance, debt.rate, debt.compounding, days);
            debt.balance += interest;
            accrued += interest;
        }
        accrued
    }

    /// Pays each debt's (scaled) minimum in input order, never exceeding the
    /// budget. Returns the budget left over.
    pub(crate) fn pay_minimums(
        &mut self,
        budget: f64,
        minimum_scale: f64,
        payments: &mut [f64],
    ) -> f64 {
        let mut remaining = budget.max(0.0);
        for (idx, debt) in self.debts.iter_mut().enumerate() {
            if debt.balance <= 0.0 {
                continue;
            }
            let payment = (debt.minimum * minimum_scale)
                .min(debt.balance)
                .min(remaining);
            debt.balance -= payment;
            remaining -= payment;
            payments[idx] += payment;
        }
        remaining
    }

    /// Throws leftover budget at debts in strategy order. Ties keep input order.
    pub(crate) fn pay_extra(&mut self, strategy: Strategy, budget: f64, payments: &mut [f64]) -> f64 {
        let mut remaining = budget.max(0.0);
        if remaining <= 0.0 {
            return 0.0;
        }

        self.order.clear();
        self.order.extend(
            (0..self.debts.len()).filter(|&idx| self.debts[idx].balance > PAID_OFF_THRESHOLD),
        );
        let debts = &self.debts;
        match strategy {
            Strategy::Avalanche => self
                .order
                .sort_by(|&a, &b| debts[b].rate.total_cmp(&debts[a].rate)),
            Strategy::Snowball => self
                .order
                .sort_by(|&a, &b| debts[a].balance.total_cmp(&debts[b].balance)),
        }

        for &idx in &self.order {
            if remaining <= 0.0 {
                break;
            }
            let debt = &mut self.debts[idx];
            let extra = remaining.min(debt.balance);
            debt.balance -= extra;
            remaining -= extra;
            payments[idx] += extra;
        }
        remaining
    }

    pub(crate) fn into_balances(self) -> Vec<f64> {
        self.debts.into_iter().map(|d| d.balance.max(0.0)).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleDebtOutcome {
    pub total_interest: f64,
    pub periods: u32,
    pub converged: bool,
}

/// Pays one debt alone at a fixed cadence.
///
/// Each period pays the larger of `period_budget` and the minimum scaled to
/// the period length, capped at the balance.
pub fn simulate_single_debt(debt: &Account, period_budget: f64, period_days: f64) -> SingleDebtOutcome {
    if debt.balance <= 0.0 || period_budget <= 0.0 {
        return SingleDebtOutcome {
            total_interest: 0.0,
            periods: 0,
            converged: true,
        };
    }

    let cap = max_periods(period_days);
    let minimum_scale = period_days / DAYS_PER_MONTH;
    let mut balance = debt.balance;
    let mut total_interest = 0.0;

    for period in 1..=cap {
        if balance <= PAID_OFF_THRESHOLD {
            return SingleDebtOutcome {
                total_interest,
                periods: period - 1,
                converged: true,
            };
        }
        let interest = period_interest(balance, debt.interest_rate, debt.compounding_type, period_days);
        balance += interest;
        total_interest += interest;

        let payment = period_budget
            .max(debt.minimum_payment * minimum_scale)
            .min(balance);
        balance -= payment;
    }

    SingleDebtOutcome {
        total_interest,
        periods: cap,
        converged: balance <= PAID_OFF_THRESHOLD,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AccountType, DebtCategory};

    const EPS: f64 = 1e-9;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn debt(id: &str, balance: f64, rate: f64, minimum: f64, compounding: CompoundingType) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_string(),
            account_type: AccountType::Debt,
            balance,
            interest_rate: rate,
            minimum_payment: minimum,
            compounding_type: compounding,
            debt_category: DebtCategory::Other,
            due_day: 0,
            credit_limit: 0.0,
        }
    }

    #[test]
    fn interest_models_match_hand_calculation() {
        let daily: f64 = 18.0 / 100.0 / 365.0;
        assert_approx(
            monthly_interest(1_000.0, 18.0, CompoundingType::DailyCompound),
            1_000.0 * ((1.0 + daily).powf(30.44) - 1.0),
        );
        assert_approx(
            monthly_interest(1_000.0, 18.0, CompoundingType::DailySimple),
            1_000.0 * daily * 30.44,
        );
        assert_approx(monthly_interest(1_000.0, 18.0, CompoundingType::Monthly), 15.0);
    }

    #[test]
    fn monthly_model_pro_rates_short_periods() {
        let month = period_interest(1_200.0, 12.0, CompoundingType::Monthly, DAYS_PER_MONTH);
        let fortnight = period_interest(1_200.0, 12.0, CompoundingType::Monthly, 14.0);
        assert_approx(month, 12.0);
        assert_approx(fortnight, 12.0 * 14.0 / DAYS_PER_MONTH);
    }

    #[test]
    fn degenerate_inputs_accrue_nothing() {
        for compounding in [
            CompoundingType::DailyCompound,
            CompoundingType::DailySimple,
            CompoundingType::Monthly,
        ] {
            assert_eq!(period_interest(0.0, 20.0, compounding, 30.0), 0.0);
            assert_eq!(period_interest(-50.0, 20.0, compounding, 30.0), 0.0);
            assert_eq!(period_interest(500.0, 0.0, compounding, 30.0), 0.0);
            assert_eq!(period_interest(500.0, 20.0, compounding, 0.0), 0.0);
        }
    }

    #[test]
    fn max_periods_scales_the_fifty_year_cap() {
        assert_eq!(max_periods(DAYS_PER_MONTH), 600);
        assert_eq!(max_periods(14.0), 1_305);
        assert_eq!(max_periods(7.0), 2_610);
    }

    #[test]
    fn ledger_pays_minimums_in_input_order_within_budget() {
        let accounts = vec![
            debt("a", 100.0, 5.0, 80.0, CompoundingType::Monthly),
            debt("b", 100.0, 9.0, 80.0, CompoundingType::Monthly),
        ];
        let mut ledger = DebtLedger::from_accounts(&accounts);
        let mut payments = vec![0.0; ledger.len()];
        let left = ledger.pay_minimums(120.0, 1.0, &mut payments);
        assert_approx(left, 0.0);
        assert_approx(payments[0], 80.0);
        assert_approx(payments[1], 40.0);
        assert_approx(ledger.balance(1), 60.0);
    }

    #[test]
    fn ledger_extra_follows_strategy_with_stable_ties() {
        let accounts = vec![
            debt("low", 300.0, 5.0, 0.0, CompoundingType::Monthly),
            debt("tie-first", 500.0, 20.0, 0.0, CompoundingType::Monthly),
            debt("tie-second", 200.0, 20.0, 0.0, CompoundingType::Monthly),
        ];

        let mut ledger = DebtLedger::from_accounts(&accounts);
        let mut payments = vec![0.0; 3];
        ledger.pay_extra(Strategy::Avalanche, 600.0, &mut payments);
        assert_approx(payments[1], 500.0);
        assert_approx(payments[2], 100.0);
        assert_approx(payments[0], 0.0);

        let mut ledger = DebtLedger::from_accounts(&accounts);
        let mut payments = vec![0.0; 3];
        ledger.pay_extra(Strategy::Snowball, 600.0, &mut payments);
        assert_approx(payments[2], 200.0);
        assert_approx(payments[0], 300.0);
        assert_approx(payments[1], 100.0);
    }

    #[test]
    fn ledger_extra_skips_sub_cent_balances() {
        let accounts = vec![
            debt("dust", 0.005, 29.0, 0.0, CompoundingType::DailyCompound),
            debt("loan", 400.0, 8.0, 0.0, CompoundingType::Monthly),
        ];
        let mut ledger = DebtLedger::from_accounts(&accounts);
        let mut payments = vec![0.0; 2];
        let left = ledger.pay_extra(Strategy::Avalanche, 50.0, &mut payments);
        assert_eq!(payments[0], 0.0);
        assert_approx(payments[1], 50.0);
        assert_approx(left, 0.0);
        assert_approx(ledger.balance(0), 0.005);
    }

    #[test]
    fn negative_budget_pays_nothing() {
        let accounts = vec![debt("a", 100.0, 5.0, 25.0, CompoundingType::Monthly)];
        let mut ledger = DebtLedger::from_accounts(&accounts);
        let mut payments = vec![0.0; 1];
        let left = ledger.pay_minimums(-10.0, 1.0, &mut payments);
        assert_approx(left, 0.0);
        assert_approx(payments[0], 0.0);
        assert_approx(ledger.balance(0), 100.0);
    }

    #[test]
    fn single_debt_simulation_converges_with_positive_interest() {
        let card = debt("card", 2_000.0, 22.0, 40.0, CompoundingType::DailyCompound);
        let outcome = simulate_single_debt(&card, 100.0, DAYS_PER_MONTH);
        assert!(outcome.converged);
        assert!(outcome.total_interest > 0.0);
        assert!(outcome.periods > 20 && outcome.periods < 40);
    }

    #[test]
    fn single_debt_simulation_flags_budget_below_interest() {
        let card = debt("card", 50_000.0, 30.0, 0.0, CompoundingType::DailyCompound);
        let outcome = simulate_single_debt(&card, 100.0, DAYS_PER_MONTH);
        assert!(!outcome.converged);
        assert_eq!(outcome.periods, MAX_PAYOFF_MONTHS);
    }
}
