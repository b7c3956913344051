use serde::{Deserialize, Serialize};
use tracing::warn;

use super::amortization::{DAYS_PER_MONTH, DebtLedger, MAX_PAYOFF_MONTHS, PAID_OFF_THRESHOLD};
use super::types::{Account, Strategy};

/// Reduced-budget window before regular pay starts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayDelay {
    pub months: u32,
    pub delay_budget: f64,
}

impl PayDelay {
    fn budget_for(self, month: u32) -> Option<f64> {
        (month <= self.months).then_some(self.delay_budget)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountPayment {
    pub account_id: String,
    pub account_name: String,
    pub payment: f64,
    pub remaining: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffScheduleEntry {
    pub month: u32,
    pub payments: Vec<AccountPayment>,
    pub total_remaining: f64,
    /// Cumulative interest through this month.
    pub total_interest: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffResult {
    pub strategy: Strategy,
    pub schedule: Vec<PayoffScheduleEntry>,
    pub total_months: u32,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    /// False when the run stopped at the period cap with balance left.
    pub converged: bool,
}

impl PayoffResult {
    fn empty(strategy: Strategy, converged: bool) -> Self {
        Self {
            strategy,
            schedule: Vec::new(),
            total_months: 0,
            total_interest_paid: 0.0,
            total_paid: 0.0,
            converged,
        }
    }

    pub fn summary(&self) -> PayoffSummary {
        PayoffSummary {
            total_months: self.total_months,
            total_interest_paid: self.total_interest_paid,
            total_paid: self.total_paid,
            converged: self.converged,
        }
    }

    /// Aggregate remaining balance after each simulated month.
    pub fn remaining_series(&self) -> impl Iterator<Item = f64> + '_ {
        self.schedule.iter().map(|entry| entry.total_remaining)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffSummary {
    pub total_months: u32,
    pub total_interest_paid: f64,
    pub total_paid: f64,
    pub converged: bool,
}

impl PayoffSummary {
    fn zero() -> Self {
        Self {
            total_months: 0,
            total_interest_paid: 0.0,
            total_paid: 0.0,
            converged: true,
        }
    }
}

/// Month-by-month payoff of every debt account in `debts`.
///
/// Non-debt accounts are ignored. Each month accrues interest, pays minimums
/// in input order, then throws the remainder at debts in strategy order.
pub fn simulate_payoff(
    debts: &[Account],
    monthly_budget: f64,
    strategy: Strategy,
    pay_delay: Option<PayDelay>,
) -> PayoffResult {
    let active: Vec<&Account> = debts.iter().filter(|a| a.is_debt()).collect();
    let no_budget =
        monthly_budget <= 0.0 && pay_delay.is_none_or(|delay| delay.delay_budget <= 0.0);
    if active.is_empty() {
        return PayoffResult::empty(strategy, true);
    }
    let mut ledger = DebtLedger::from_accounts(active.iter().copied());
    if no_budget {
        return PayoffResult::empty(strategy, ledger.is_settled());
    }

    let mut payments = vec![0.0; ledger.len()];
    let mut schedule = Vec::new();
    let mut total_interest = 0.0;
    let mut total_paid = 0.0;

    for month in 1..=MAX_PAYOFF_MONTHS {
        if ledger.is_settled() {
            break;
        }
        let budget = pay_delay
            .and_then(|delay| delay.budget_for(month))
            .unwrap_or(monthly_budget);

        total_interest += ledger.accrue(DAYS_PER_MONTH);
        payments.fill(0.0);
        let leftover = ledger.pay_minimums(budget, 1.0, &mut payments);
        ledger.pay_extra(strategy, leftover, &mut payments);
        total_paid += payments.iter().sum::<f64>();

        let month_payments = active
            .iter()
            .zip(&payments)
            .enumerate()
            .map(|(idx, (account, &payment))| AccountPayment {
                account_id: account.id.clone(),
                account_name: account.name.clone(),
                payment,
                remaining: ledger.balance(idx),
            })
            .collect();
        schedule.push(PayoffScheduleEntry {
            month,
            payments: month_payments,
            total_remaining: ledger.total_remaining(),
            total_interest,
        });
    }

    let converged = ledger.is_settled();
    if !converged {
        warn!(
            ?strategy,
            monthly_budget,
            remaining = ledger.total_remaining(),
            "payoff did not converge within {MAX_PAYOFF_MONTHS} months"
        );
    }

    PayoffResult {
        strategy,
        total_months: schedule.len() as u32,
        schedule,
        total_interest_paid: total_interest,
        total_paid,
        converged,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub avalanche: PayoffResult,
    pub snowball: PayoffResult,
    /// Snowball interest minus avalanche interest.
    pub interest_saved: f64,
    /// Snowball months minus avalanche months.
    pub months_saved: i64,
}

pub fn compare_strategies(
    debts: &[Account],
    monthly_budget: f64,
    pay_delay: Option<PayDelay>,
) -> StrategyComparison {
    let avalanche = simulate_payoff(debts, monthly_budget, Strategy::Avalanche, pay_delay);
    let snowball = simulate_payoff(debts, monthly_budget, Strategy::Snowball, pay_delay);
    StrategyComparison {
        interest_saved: snowball.total_interest_paid - avalanche.total_interest_paid,
        months_saved: i64::from(snowball.total_months) - i64::from(avalanche.total_months),
        avalanche,
        snowball,
    }
}

/// Balances after a pay-delay window, aligned with the input slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DelayWindow {
    pub balances: Vec<f64>,
    /// Aggregate remaining balance at the end of each delay month.
    pub remaining_by_month: Vec<f64>,
}

impl DelayWindow {
    /// Copies of `debts` carrying the post-window balances.
    pub fn accounts(&self, debts: &[Account]) -> Vec<Account> {
        debts
            .iter()
            .zip(&self.balances)
            .map(|(debt, &balance)| debt.with_balance(balance))
            .collect()
    }
}

/// Accrues interest on every debt for `pay_delay.months` months while only the
/// delay budget pays minimums. No extra principal is paid.
pub fn simulate_pay_delay_window(debts: &[Account], pay_delay: PayDelay) -> DelayWindow {
    let mut ledger = DebtLedger::from_accounts(debts);
    let mut payments = vec![0.0; ledger.len()];
    let mut remaining_by_month = Vec::with_capacity(pay_delay.months as usize);

    for _ in 0..pay_delay.months {
        ledger.accrue(DAYS_PER_MONTH);
        ledger.pay_minimums(pay_delay.delay_budget, 1.0, &mut payments);
        remaining_by_month.push(ledger.total_remaining());
    }

    DelayWindow {
        balances: ledger.into_balances(),
        remaining_by_month,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LumpSumAllocation {
    pub account_id: String,
    pub account_name: String,
    pub applied: f64,
}

/// Applies `amount` to the highest-APR debts first.
///
/// Returns the debts still carrying more than a cent, in input order, and the
/// per-debt allocations in the order they were applied.
pub fn apply_lump_sum(debts: &[Account], amount: f64) -> (Vec<Account>, Vec<LumpSumAllocation>) {
    let mut order: Vec<usize> = (0..debts.len()).collect();
    order.sort_by(|&a, &b| debts[b].interest_rate.total_cmp(&debts[a].interest_rate));

    let mut balances: Vec<f64> = debts.iter().map(|d| d.balance.max(0.0)).collect();
    let mut remaining = amount.max(0.0);
    let mut allocations = Vec::new();
    for idx in order {
        if remaining <= 0.0 {
            break;
        }
        let applied = remaining.min(balances[idx]);
        if applied <= 0.0 {
            continue;
        }
        balances[idx] -= applied;
        remaining -= applied;
        allocations.push(LumpSumAllocation {
            account_id: debts[idx].id.clone(),
            account_name: debts[idx].name.clone(),
            applied,
        });
    }

    let adjusted = debts
        .iter()
        .zip(balances)
        .filter(|&(_, balance)| balance > PAID_OFF_THRESHOLD)
        .map(|(debt, balance)| debt.with_balance(balance))
        .collect();
    (adjusted, allocations)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LumpSumAnalysis {
    pub lump_sum: f64,
    pub allocations: Vec<LumpSumAllocation>,
    pub without_lump_sum: PayoffSummary,
    pub with_lump_sum: PayoffSummary,
    pub months_saved: i64,
    pub interest_saved: f64,
}

/// What applying cash to credit-card balances does to the avalanche payoff of
/// those cards. `None` when there is nothing to analyze.
pub fn analyze_lump_sum(
    accounts: &[Account],
    cash_to_apply: f64,
    monthly_budget: f64,
    pay_delay: Option<PayDelay>,
) -> Option<LumpSumAnalysis> {
    let cards: Vec<Account> = accounts
        .iter()
        .filter(|a| a.is_credit_card() && a.balance > 0.0)
        .cloned()
        .collect();
    if cash_to_apply <= 0.0 || cards.is_empty() || monthly_budget <= 0.0 {
        return None;
    }

    let total_card_debt: f64 = cards.iter().map(|c| c.balance).sum();
    let lump_sum = cash_to_apply.min(total_card_debt);

    let without = simulate_payoff(&cards, monthly_budget, Strategy::Avalanche, pay_delay).summary();
    let (adjusted, allocations) = apply_lump_sum(&cards, lump_sum);
    let with = if adjusted.is_empty() {
        PayoffSummary::zero()
    } else {
        simulate_payoff(&adjusted, monthly_budget, Strategy::Avalanche, pay_delay).summary()
    };

    Some(LumpSumAnalysis {
        lump_sum,
        allocations,
        months_saved: i64::from(without.total_months) - i64::from(with.total_months),
        interest_saved: without.total_interest_paid - with.total_interest_paid,
        without_lump_sum: without,
        with_lump_sum: with,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AccountType, CompoundingType, DebtCategory};
    use proptest::prelude::{prop_assert, proptest};

    fn debt(id: &str, balance: f64, rate: f64, minimum: f64, compounding: CompoundingType) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_uppercase(),
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

    fn card(id: &str, balance: f64, rate: f64, minimum: f64) -> Account {
        Account {
            debt_category: DebtCategory::CreditCard,
            ..debt(id, balance, rate, minimum, CompoundingType::DailyCompound)
        }
    }

    #[test]
    fn single_card_pays_off_with_interest() {
        let debts = vec![debt("card", 5_000.0, 20.0, 100.0, CompoundingType::DailyCompound)];
        let result = simulate_payoff(&debts, 500.0, Strategy::Avalanche, None);

        assert!(result.converged);
        assert!(result.total_interest_paid > 0.0);
        assert!(result.total_months < MAX_PAYOFF_MONTHS);
        assert_eq!(result.total_months as usize, result.schedule.len());
        let last = result.schedule.last().expect("schedule should not be empty");
        assert!(last.total_remaining <= PAID_OFF_THRESHOLD);
        assert!((result.total_paid - (5_000.0 + result.total_interest_paid)).abs() < 0.02);
    }

    #[test]
    fn empty_inputs_return_zero_result() {
        let result = simulate_payoff(&[], 500.0, Strategy::Avalanche, None);
        assert_eq!(result.total_months, 0);
        assert!(result.schedule.is_empty());

        let debts = vec![debt("a", 1_000.0, 10.0, 50.0, CompoundingType::Monthly)];
        let result = simulate_payoff(&debts, 0.0, Strategy::Snowball, None);
        assert_eq!(result.total_months, 0);
        assert_eq!(result.total_interest_paid, 0.0);
        assert_eq!(result.total_paid, 0.0);
        assert!(!result.converged);
    }

    #[test]
    fn non_debt_accounts_are_ignored() {
        let mut cash = debt("cash", 9_000.0, 0.0, 0.0, CompoundingType::Monthly);
        cash.account_type = AccountType::Cash;
        let debts = vec![cash, debt("loan", 600.0, 6.0, 50.0, CompoundingType::Monthly)];
        let result = simulate_payoff(&debts, 200.0, Strategy::Avalanche, None);
        assert!(result.converged);
        assert_eq!(result.schedule[0].payments.len(), 1);
        assert_eq!(result.schedule[0].payments[0].account_id, "loan");
    }

    #[test]
    fn pay_delay_uses_reduced_budget_first() {
        let debts = vec![debt("loan", 10_000.0, 6.0, 150.0, CompoundingType::Monthly)];
        let delay = PayDelay {
            months: 3,
            delay_budget: 80.0,
        };
        let result = simulate_payoff(&debts, 1_000.0, Strategy::Avalanche, Some(delay));

        for entry in &result.schedule[..3] {
            assert!((entry.payments[0].payment - 80.0).abs() < 1e-9);
        }
        assert!((result.schedule[3].payments[0].payment - 1_000.0).abs() < 1e-9);
    }

    #[test]
    fn delay_budget_alone_still_runs() {
        let debts = vec![debt("loan", 100.0, 0.0, 10.0, CompoundingType::Monthly)];
        let delay = PayDelay {
            months: 2,
            delay_budget: 30.0,
        };
        let result = simulate_payoff(&debts, 0.0, Strategy::Avalanche, Some(delay));
        assert_eq!(result.total_months, MAX_PAYOFF_MONTHS);
        assert!(!result.converged);
        assert!((result.total_paid - 60.0).abs() < 1e-9);
    }

    #[test]
    fn budget_below_interest_is_flagged_not_converged() {
        let debts = vec![debt("card", 40_000.0, 29.0, 0.0, CompoundingType::DailyCompound)];
        let result = simulate_payoff(&debts, 100.0, Strategy::Avalanche, None);
        assert!(!result.converged);
        assert_eq!(result.total_months, MAX_PAYOFF_MONTHS);
    }

    #[test]
    fn strategy_comparison_reports_avalanche_savings() {
        let debts = vec![
            debt("small-low", 800.0, 4.0, 25.0, CompoundingType::Monthly),
            debt("big-high", 6_000.0, 24.0, 120.0, CompoundingType::Monthly),
        ];
        let comparison = compare_strategies(&debts, 600.0, None);
        assert!(comparison.interest_saved > 0.0);
        assert!(comparison.avalanche.converged && comparison.snowball.converged);
        assert!(
            (comparison.interest_saved
                - (comparison.snowball.total_interest_paid
                    - comparison.avalanche.total_interest_paid))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn delay_window_threads_balances_by_value() {
        let debts = vec![
            debt("a", 1_000.0, 12.0, 50.0, CompoundingType::Monthly),
            debt("b", 500.0, 24.0, 40.0, CompoundingType::Monthly),
        ];
        let window = simulate_pay_delay_window(
            &debts,
            PayDelay {
                months: 2,
                delay_budget: 60.0,
            },
        );

        assert_eq!(window.remaining_by_month.len(), 2);
        // month 1: a 1010 -> 960, b 510 -> 500; month 2: a 969.6 -> 919.6, b 510 -> 500
        assert!((window.balances[0] - 919.6).abs() < 1e-9);
        assert!((window.balances[1] - 500.0).abs() < 1e-9);
        assert_eq!(debts[0].balance, 1_000.0);

        let threaded = window.accounts(&debts);
        assert_eq!(threaded[1].id, "b");
        assert!((threaded[0].balance - 919.6).abs() < 1e-9);
    }

    #[test]
    fn lump_sum_goes_to_highest_rate_first() {
        let debts = vec![
            card("low", 1_000.0, 15.0, 30.0),
            card("high", 700.0, 27.0, 30.0),
        ];
        let (adjusted, allocations) = apply_lump_sum(&debts, 1_000.0);

        assert_eq!(allocations.len(), 2);
        assert_eq!(allocations[0].account_id, "high");
        assert!((allocations[0].applied - 700.0).abs() < 1e-9);
        assert!((allocations[1].applied - 300.0).abs() < 1e-9);
        assert_eq!(adjusted.len(), 1);
        assert_eq!(adjusted[0].id, "low");
        assert!((adjusted[0].balance - 700.0).abs() < 1e-9);
    }

    #[test]
    fn lump_sum_analysis_saves_interest() {
        let accounts = vec![
            card("visa", 4_000.0, 24.0, 80.0),
            debt("auto", 9_000.0, 6.0, 250.0, CompoundingType::Monthly),
        ];
        let analysis = analyze_lump_sum(&accounts, 1_500.0, 400.0, None)
            .expect("analysis should exist for a positive amount");
        assert!((analysis.lump_sum - 1_500.0).abs() < 1e-9);
        assert!(analysis.interest_saved > 0.0);
        assert!(analysis.months_saved > 0);

        let cleared = analyze_lump_sum(&accounts, 10_000.0, 400.0, None)
            .expect("analysis should exist");
        assert!((cleared.lump_sum - 4_000.0).abs() < 1e-9);
        assert_eq!(cleared.with_lump_sum.total_months, 0);

        assert!(analyze_lump_sum(&accounts, 0.0, 400.0, None).is_none());
        assert!(analyze_lump_sum(&accounts, 500.0, 0.0, None).is_none());
        assert!(analyze_lump_sum(&accounts[1..], 500.0, 400.0, None).is_none());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_single_debt_amortizes_monotonically(
            balance in 100u32..50_000,
            rate_bp in 1u32..3_000,
            minimum in 0u32..500,
            budget_pct in 4u32..20,
            compounding_idx in 0usize..3
        ) {
            let compounding = [
                CompoundingType::DailyCompound,
                CompoundingType::DailySimple,
                CompoundingType::Monthly,
            ][compounding_idx];
            let balance = balance as f64;
            let budget = (balance * budget_pct as f64 / 100.0).max(minimum as f64);
            let debts = vec![debt("d", balance, rate_bp as f64 / 100.0, minimum as f64, compounding)];
            let result = simulate_payoff(&debts, budget, Strategy::Avalanche, None);

            prop_assert!(result.converged);
            prop_assert!(result.total_months < MAX_PAYOFF_MONTHS);
            let mut previous = balance;
            for remaining in result.remaining_series() {
                prop_assert!(remaining <= previous + 1e-9);
                previous = remaining;
            }
            prop_assert!(previous <= PAID_OFF_THRESHOLD);
        }

        #[test]
        fn prop_avalanche_interest_never_exceeds_snowball(
            balances in proptest::collection::vec(200u32..8_000, 2..5),
            rate_steps in proptest::sample::subsequence((1u32..=12).collect::<Vec<_>>(), 4),
            compounding_idx in proptest::collection::vec(0usize..3, 4),
            minimum in 10u32..60,
            extra_pct in 3u32..10
        ) {
            // APRs sit 2.5 points apart so each debt's per-month cost follows its
            // APR whichever interest model it uses.
            let models = [
                CompoundingType::DailyCompound,
                CompoundingType::DailySimple,
                CompoundingType::Monthly,
            ];
            let count = balances.len();
            let debts: Vec<Account> = (0..count)
                .map(|idx| debt(
                    &format!("d{idx}"),
                    balances[idx] as f64,
                    rate_steps[idx] as f64 * 2.5,
                    minimum as f64,
                    models[compounding_idx[idx]],
                ))
                .collect();
            let principal: f64 = debts.iter().map(|d| d.balance).sum();
            let budget = minimum as f64 * count as f64 + principal * extra_pct as f64 / 100.0;
            let comparison = compare_strategies(&debts, budget, None);
            let (avalanche, snowball) = (&comparison.avalanche, &comparison.snowball);

            prop_assert!(avalanche.converged && snowball.converged);
            prop_assert!(avalanche.total_interest_paid <= snowball.total_interest_paid + 1e-6);

            let tolerance = PAID_OFF_THRESHOLD * 2.0;
            prop_assert!((avalanche.total_paid - principal - avalanche.total_interest_paid).abs() <= tolerance);
            prop_assert!((snowball.total_paid - principal - snowball.total_interest_paid).abs() <= tolerance);
        }
    }
}
