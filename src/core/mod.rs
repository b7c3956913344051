mod amortization;
mod budget;
mod frequency;
mod house;
mod payoff;
mod roadmap;
mod tax;
mod types;
mod withdrawal;

pub use amortization::{
    DAYS_PER_MONTH, DAYS_PER_YEAR, MAX_PAYOFF_MONTHS, PAID_OFF_THRESHOLD, SingleDebtOutcome,
    max_periods, monthly_interest, period_interest, simulate_single_debt,
};
pub use budget::{PayoffBudget, calculate_payoff_budget, pay_delay_months};
pub use frequency::{
    DebtFrequencyBreakdown, FrequencyMode, FrequencyRecommendation, FrequencyResult,
    PaymentFrequency, analyze_per_debt_frequency, compare_payment_frequencies,
};
pub use house::{
    BACK_END_RATIO, DebtPayoffImpact, FRONT_END_RATIO, HouseAffordabilityResult, HouseInputs,
    HousingCost, LimitingFactor, calculate_affordability, calculate_debt_payoff_impact,
    monthly_principal_and_interest,
};
pub use payoff::{
    AccountPayment, DelayWindow, LumpSumAllocation, LumpSumAnalysis, PayDelay,
    PayoffResult, PayoffScheduleEntry, PayoffSummary, StrategyComparison, analyze_lump_sum,
    apply_lump_sum, compare_strategies, simulate_pay_delay_window, simulate_payoff,
};
pub use roadmap::{
    AllocationSlice, BudgetAllocation, InvestmentMilestone, PhaseInfo, PhaseStatus,
    ProjectionPoint, RoadmapOptions, RoadmapResult, calculate_roadmap, recommended_allocation,
};
pub use tax::{
    BracketTax, CHILD_TAX_CREDIT_PER_DEPENDENT, FilingComparisonRow, TaxBracket, TaxBreakdownResult, TaxInput,
    calculate_federal_tax, calculate_tax_breakdown, compare_filing_statuses, federal_brackets,
    standard_deduction,
};
pub use types::{
    Account, AccountType, CompoundingType, DebtCategory, Expense, FilingStatus, Household,
    IncomeState, PayFrequency, PayoffSettings, Strategy,
};
pub use withdrawal::{
    EARLY_WITHDRAWAL_PENALTY, WithdrawalAnalysisResult, WithdrawalInputs, WithdrawalScenario,
    WithdrawalWinner, analyze_withdrawal,
};
