use chrono::NaiveDate;
use serde::Serialize;

use super::amortization::DAYS_PER_MONTH;
use super::payoff::PayDelay;
use super::tax::{TaxInput, calculate_tax_breakdown};
use super::types::Household;

/// Monthly money available for debt payoff, derived from the household.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffBudget {
    pub monthly_net: f64,
    /// Net income while only business and tax-free income arrive.
    pub delay_monthly_net: f64,
    pub total_expenses: f64,
    pub total_debt_minimums: f64,
    pub non_cc_debt_minimums: f64,
    pub total_monthly_obligations: f64,
    pub calculated_budget: f64,
    pub effective_budget: f64,
    pub delay_budget: f64,
    pub pay_delay_months: u32,
}

impl PayoffBudget {
    pub fn pay_delay(&self) -> Option<PayDelay> {
        (self.pay_delay_months > 0).then_some(PayDelay {
            months: self.pay_delay_months,
            delay_budget: self.delay_budget,
        })
    }
}

/// Whole months from `today` until `pay_start`, rounded up. Zero once pay has started.
pub fn pay_delay_months(pay_start: Option<NaiveDate>, today: NaiveDate) -> u32 {
    let Some(start) = pay_start else {
        return 0;
    };
    let days = (start - today).num_days();
    if days <= 0 {
        return 0;
    }
    (days as f64 / DAYS_PER_MONTH).ceil() as u32
}

pub fn calculate_payoff_budget(household: &Household, today: NaiveDate) -> PayoffBudget {
    let income = &household.income;
    let full = TaxInput::from_income(income);
    let delay = TaxInput {
        base_salary: 0.0,
        monthly_commission: 0.0,
        ..full
    };
    let monthly_net = calculate_tax_breakdown(&full).net_income / 12.0 + income.monthly_tax_free;
    let delay_monthly_net =
        calculate_tax_breakdown(&delay).net_income / 12.0 + income.monthly_tax_free;

    let total_expenses = household.total_expenses();
    let (total_debt_minimums, non_cc_debt_minimums) = household
        .accounts
        .iter()
        .filter(|a| a.is_debt())
        .fold((0.0, 0.0), |(all, non_cc), debt| {
            let non_cc_share = if debt.is_credit_card() { 0.0 } else { debt.minimum_payment };
            (all + debt.minimum_payment, non_cc + non_cc_share)
        });

    let calculated_budget = (monthly_net - total_expenses - non_cc_debt_minimums).max(0.0);
    let settings = household.payoff_settings;
    let effective_budget = if settings.is_manual_override {
        settings.monthly_budget
    } else {
        calculated_budget
    };

    PayoffBudget {
        monthly_net,
        delay_monthly_net,
        total_expenses,
        total_debt_minimums,
        non_cc_debt_minimums,
        total_monthly_obligations: total_expenses + total_debt_minimums,
        calculated_budget,
        effective_budget,
        delay_budget: (delay_monthly_net - total_expenses - non_cc_debt_minimums).max(0.0),
        pay_delay_months: pay_delay_months(income.pay_start_date, today),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{
        Account, AccountType, CompoundingType, DebtCategory, Expense, IncomeState, PayoffSettings,
    };

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    fn account(id: &str, category: DebtCategory, minimum: f64) -> Account {
        Account {
            id: id.to_string(),
            name: id.to_string(),
            account_type: AccountType::Debt,
            balance: 3_000.0,
            interest_rate: 12.0,
            minimum_payment: minimum,
            compounding_type: category.default_compounding(),
            debt_category: category,
            due_day: 1,
            credit_limit: 0.0,
        }
    }

    fn household() -> Household {
        Household {
            income: IncomeState {
                base_salary: 60_000.0,
                monthly_tax_free: 100.0,
                monthly_business_income: 1_000.0,
                ..IncomeState::default()
            },
            expenses: vec![Expense {
                id: "rent".to_string(),
                name: "Rent".to_string(),
                amount: 2_000.0,
                category: "housing".to_string(),
                due_day: 1,
            }],
            accounts: vec![
                account("visa", DebtCategory::CreditCard, 50.0),
                account("auto", DebtCategory::AutoLoan, 300.0),
                Account {
                    account_type: AccountType::Cash,
                    compounding_type: CompoundingType::Monthly,
                    ..account("savings", DebtCategory::Other, 0.0)
                },
            ],
            payoff_settings: PayoffSettings::default(),
        }
    }

    #[test]
    fn budget_excludes_card_minimums_but_reports_them() {
        let budget = calculate_payoff_budget(&household(), date(2025, 1, 1));

        // 72k gross, 57.4k taxable: 1160 + 4266 + 2255 = 7681 federal.
        let expected_net = (72_000.0 - 7_681.0) / 12.0 + 100.0;
        assert!((budget.monthly_net - expected_net).abs() < 1e-6);
        assert!((budget.total_debt_minimums - 350.0).abs() < 1e-9);
        assert!((budget.non_cc_debt_minimums - 300.0).abs() < 1e-9);
        assert!((budget.total_monthly_obligations - 2_350.0).abs() < 1e-9);
        assert!((budget.calculated_budget - (expected_net - 2_300.0)).abs() < 1e-6);
        assert_eq!(budget.effective_budget, budget.calculated_budget);
    }

    #[test]
    fn delay_budget_uses_business_income_only() {
        let budget = calculate_payoff_budget(&household(), date(2025, 1, 1));
        // 12k business income sits under the standard deduction.
        assert!((budget.delay_monthly_net - 1_100.0).abs() < 1e-9);
        assert_eq!(budget.delay_budget, 0.0);
    }

    #[test]
    fn manual_override_wins() {
        let mut household = household();
        household.payoff_settings = PayoffSettings {
            monthly_budget: 750.0,
            is_manual_override: true,
        };
        let budget = calculate_payoff_budget(&household, date(2025, 1, 1));
        assert_eq!(budget.effective_budget, 750.0);
        assert!(budget.calculated_budget > 750.0);
    }

    #[test]
    fn pay_delay_rounds_up_to_whole_months() {
        let today = date(2025, 3, 1);
        assert_eq!(pay_delay_months(None, today), 0);
        assert_eq!(pay_delay_months(Some(date(2025, 2, 1)), today), 0);
        assert_eq!(pay_delay_months(Some(today), today), 0);
        assert_eq!(pay_delay_months(Some(date(2025, 3, 2)), today), 1);
        assert_eq!(pay_delay_months(Some(date(2025, 4, 15)), today), 2);

        let mut household = household();
        household.income.pay_start_date = Some(date(2025, 4, 15));
        let budget = calculate_payoff_budget(&household, today);
        let delay = budget.pay_delay().expect("delay should be active");
        assert_eq!(delay.months, 2);
        assert_eq!(delay.delay_budget, budget.delay_budget);
    }
}
