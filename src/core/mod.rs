mod amortization;
mod breakeven;
mod engine;
mod rent;
mod solver;
mod types;
mod validate;

pub use amortization::{Amortization, monthly_payment};
pub use breakeven::{Breakeven, find_breakeven};
pub use engine::{closing_costs, deduction_cap, run_scenario, simulate};
pub use rent::{annual_rent_for_year, project_rent};
pub use solver::{
    BISECTION_ITERATIONS, DOWN_PAYMENT_STEP_PCT, UNRENT_BAR_YEARS, analysis_target_year,
    analyze_profile, compare_profiles, find_optimized_value, optimize,
};
pub use types::{
    AnalysisReport, BuyProfile, ClosingCosts, DEFAULT_GLOBAL_SETTINGS, DEFAULT_RENT_SETTINGS,
    GlobalSettings, MORTGAGE_INTEREST_DEDUCTION_CEILING, OptimizationProbe, OptimizationResult,
    OptimizeVariable, ProfileComparison, RentSettings, RentYear, SimulationResult, YearlyRow,
};
pub use validate::{
    MAX_FORECAST_YEARS, MAX_MORTGAGE_TERM_YEARS, ValidationError, ValidationResult,
    validate_global, validate_inputs, validate_profile, validate_rent,
};
