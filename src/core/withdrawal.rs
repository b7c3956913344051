use serde::{Deserialize, Serialize};

use super::payoff::{LumpSumAllocation, apply_lump_sum, simulate_payoff};
use super::tax::{TaxInput, calculate_tax_breakdown};
use super::types::{Account, IncomeState, Strategy};

pub const EARLY_WITHDRAWAL_PENALTY: f64 = 0.10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalInputs {
    pub balance_401k: f64,
    /// Annual percent, e.g. 7.
    pub expected_return: f64,
    pub withdrawal_amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalScenario {
    pub label: &'static str,
    pub total_debt_interest: f64,
    pub penalty: f64,
    pub extra_taxes: f64,
    pub lost_growth: f64,
    pub total_cost: f64,
    pub months_to_payoff: u32,
    pub ending_401k: f64,
    pub payoff_converged: bool,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WithdrawalWinner {
    Keep,
    Withdraw,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawalAnalysisResult {
    pub keep_scenario: WithdrawalScenario,
    pub withdraw_scenario: WithdrawalScenario,
    pub winner: WithdrawalWinner,
    pub savings: f64,
    pub time_horizon_months: u32,
    /// Withdrawal left after penalty and tax, applied to debt.
    pub net_proceeds: f64,
    pub allocations: Vec<LumpSumAllocation>,
}

fn grown(balance: f64, annual_return: f64, months: u32) -> f64 {
    balance * (1.0 + annual_return).powf(f64::from(months) / 12.0)
}

/// Keep the retirement balance and pay debts normally, or cash some of it out
/// and throw the proceeds at the highest-rate debts.
///
/// The withdraw scenario is charged the penalty, the extra income tax and the
/// lost growth: how far its retirement balance trails the kept balance at the
/// end of the longer of the two payoff horizons. That gap includes the
/// withdrawn principal itself.
pub fn analyze_withdrawal(
    debts: &[Account],
    monthly_budget: f64,
    income: &IncomeState,
    inputs: &WithdrawalInputs,
) -> WithdrawalAnalysisResult {
    let debts: Vec<Account> = debts.iter().filter(|d| d.is_debt()).cloned().collect();
    let annual_return = inputs.expected_return / 100.0;

    let keep = simulate_payoff(&debts, monthly_budget, Strategy::Avalanche, None);

    let withdrawal = inputs.withdrawal_amount.min(inputs.balance_401k).max(0.0);
    let penalty = withdrawal * EARLY_WITHDRAWAL_PENALTY;
    let without = TaxInput::from_income(income);
    let with = TaxInput {
        base_salary: without.base_salary + withdrawal,
        ..without
    };
    let extra_taxes =
        calculate_tax_breakdown(&with).total_tax - calculate_tax_breakdown(&without).total_tax;
    let net_proceeds = withdrawal - penalty - extra_taxes;

    let (adjusted, allocations) = apply_lump_sum(&debts, net_proceeds.max(0.0));
    let withdraw = simulate_payoff(&adjusted, monthly_budget, Strategy::Avalanche, None);

    let time_horizon_months = keep.total_months.max(withdraw.total_months);
    let kept_at_horizon = grown(inputs.balance_401k, annual_return, time_horizon_months);
    let withdraw_ending = grown(
        inputs.balance_401k - withdrawal,
        annual_return,
        time_horizon_months,
    );
    let lost_growth = kept_at_horizon - withdraw_ending;

    let keep_cost = keep.total_interest_paid;
    let withdraw_cost = withdraw.total_interest_paid + penalty + extra_taxes + lost_growth;
    let winner = if keep_cost <= withdraw_cost {
        WithdrawalWinner::Keep
    } else {
        WithdrawalWinner::Withdraw
    };

    WithdrawalAnalysisResult {
        keep_scenario: WithdrawalScenario {
            label: "Keep 401k",
            total_debt_interest: keep.total_interest_paid,
            penalty: 0.0,
            extra_taxes: 0.0,
            lost_growth: 0.0,
            total_cost: keep_cost,
            months_to_payoff: keep.total_months,
            ending_401k: grown(inputs.balance_401k, annual_return, keep.total_months),
            payoff_converged: keep.converged,
        },
        withdraw_scenario: WithdrawalScenario {
            label: "Withdraw from 401k",
            total_debt_interest: withdraw.total_interest_paid,
            penalty,
            extra_taxes,
            lost_growth,
            total_cost: withdraw_cost,
            months_to_payoff: withdraw.total_months,
            ending_401k: withdraw_ending,
            payoff_converged: withdraw.converged,
        },
        winner,
        savings: (keep_cost - withdraw_cost).abs(),
        time_horizon_months,
        net_proceeds,
        allocations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{AccountType, CompoundingType, DebtCategory};

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

    fn salary(base: f64) -> IncomeState {
        IncomeState {
            base_salary: base,
            ..IncomeState::default()
        }
    }

    #[test]
    fn zero_withdrawal_ties_and_keep_wins() {
        let debts = vec![debt("card", 5_000.0, 20.0, 100.0, CompoundingType::DailyCompound)];
        let inputs = WithdrawalInputs {
            balance_401k: 50_000.0,
            expected_return: 7.0,
            withdrawal_amount: 0.0,
        };
        let result = analyze_withdrawal(&debts, 500.0, &salary(60_000.0), &inputs);

        assert_eq!(result.winner, WithdrawalWinner::Keep);
        assert!(result.savings.abs() < 1e-9);
        assert_eq!(result.withdraw_scenario.penalty, 0.0);
        assert_eq!(result.withdraw_scenario.lost_growth, 0.0);
        assert!(result.allocations.is_empty());
    }

    #[test]
    fn withdrawal_costs_penalty_tax_and_the_withdrawn_balance() {
        let debts = vec![debt("card", 20_000.0, 29.99, 400.0, CompoundingType::DailyCompound)];
        let inputs = WithdrawalInputs {
            balance_401k: 30_000.0,
            expected_return: 0.0,
            withdrawal_amount: 20_000.0,
        };
        let result = analyze_withdrawal(&debts, 600.0, &salary(60_000.0), &inputs);
        let withdraw = &result.withdraw_scenario;

        assert!((withdraw.penalty - 2_000.0).abs() < 1e-9);
        // 45,400 -> 65,400 taxable: 1,750 at 12% plus 18,250 at 22%.
        assert!((withdraw.extra_taxes - 4_225.0).abs() < 1e-6);
        assert!((result.net_proceeds - 13_775.0).abs() < 1e-6);
        // With no growth the whole withdrawn amount is missing at the horizon.
        assert!((withdraw.lost_growth - 20_000.0).abs() < 1e-9);
        assert!((withdraw.ending_401k - 10_000.0).abs() < 1e-9);
        assert!((result.keep_scenario.ending_401k - 30_000.0).abs() < 1e-9);
        assert_eq!(result.allocations.len(), 1);
        assert!((result.allocations[0].applied - 13_775.0).abs() < 1e-6);
        assert!(
            (withdraw.total_cost
                - (withdraw.total_debt_interest + 2_000.0 + 4_225.0 + 20_000.0))
                .abs()
                < 1e-6
        );

        assert_eq!(result.time_horizon_months, result.keep_scenario.months_to_payoff);
        assert!(withdraw.months_to_payoff < result.keep_scenario.months_to_payoff);
        // Roughly 24.6k of card interest against 27.3k of withdrawal cost.
        assert_eq!(result.winner, WithdrawalWinner::Keep);
        assert!(
            (result.savings - (withdraw.total_cost - result.keep_scenario.total_cost)).abs()
                < 1e-9
        );
    }

    #[test]
    fn small_withdrawal_against_expensive_debt_wins() {
        let debts = vec![debt("card", 25_000.0, 29.99, 300.0, CompoundingType::DailyCompound)];
        let inputs = WithdrawalInputs {
            balance_401k: 30_000.0,
            expected_return: 0.0,
            withdrawal_amount: 5_000.0,
        };
        let result = analyze_withdrawal(&debts, 700.0, &salary(20_000.0), &inputs);
        let withdraw = &result.withdraw_scenario;

        // 5,400 -> 10,400 taxable stays in the 10% bracket.
        assert!((withdraw.extra_taxes - 500.0).abs() < 1e-6);
        assert!((result.net_proceeds - 4_000.0).abs() < 1e-6);
        assert!((withdraw.lost_growth - 5_000.0).abs() < 1e-9);

        assert_eq!(result.winner, WithdrawalWinner::Withdraw);
        assert!(withdraw.total_cost < result.keep_scenario.total_cost);
        assert!(
            (result.savings - (result.keep_scenario.total_cost - withdraw.total_cost)).abs()
                < 1e-9
        );
    }

    #[test]
    fn cheap_debt_and_growing_balance_favor_keeping() {
        let debts = vec![debt("loan", 10_000.0, 3.0, 200.0, CompoundingType::Monthly)];
        let inputs = WithdrawalInputs {
            balance_401k: 100_000.0,
            expected_return: 7.0,
            withdrawal_amount: 10_000.0,
        };
        let result = analyze_withdrawal(&debts, 500.0, &salary(80_000.0), &inputs);

        assert_eq!(result.winner, WithdrawalWinner::Keep);
        assert!(result.withdraw_scenario.lost_growth > 0.0);
        assert!(
            (result.savings
                - (result.withdraw_scenario.total_cost - result.keep_scenario.total_cost))
                .abs()
                < 1e-9
        );
    }

    #[test]
    fn withdrawal_is_capped_at_the_balance() {
        let debts = vec![debt("loan", 10_000.0, 12.0, 200.0, CompoundingType::Monthly)];
        let inputs = WithdrawalInputs {
            balance_401k: 4_000.0,
            expected_return: 5.0,
            withdrawal_amount: 25_000.0,
        };
        let result = analyze_withdrawal(&debts, 500.0, &salary(50_000.0), &inputs);
        assert!((result.withdraw_scenario.penalty - 400.0).abs() < 1e-9);
        assert_eq!(result.withdraw_scenario.ending_401k, 0.0);
    }
}
