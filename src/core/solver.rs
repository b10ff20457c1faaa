use tracing::debug;

use super::engine::{run_scenario, simulate};
use super::rent::project_rent;
use super::types::{
    AnalysisReport, BuyProfile, GlobalSettings, OptimizationProbe, OptimizationResult,
    OptimizeVariable, ProfileComparison, RentSettings, RentYear,
};
use super::validate::{ValidationError, ValidationResult, validate_inputs};

pub const BISECTION_ITERATIONS: u32 = 20;
pub const DOWN_PAYMENT_STEP_PCT: u32 = 5;
/// Breakeven horizon the analysis aims for until a profile already beats it.
pub const UNRENT_BAR_YEARS: u32 = 6;

/// Runs the simulator with one variable swapped out. The rent stream is
/// shared across every probe of a solve.
struct Evaluator<'a> {
    global: &'a GlobalSettings,
    rent_stream: &'a [RentYear],
    base: &'a BuyProfile,
    variable: OptimizeVariable,
    target_year: u32,
    probes: Vec<OptimizationProbe>,
}

impl Evaluator<'_> {
    fn meets_target(&mut self, value: f64) -> bool {
        let mut profile = self.base.clone();
        self.variable.apply(&mut profile, value);
        let breakeven_year = run_scenario(self.global, self.rent_stream, &profile).breakeven_year;
        let meets_target = breakeven_year.is_some_and(|year| year <= self.target_year);
        self.probes.push(OptimizationProbe {
            value,
            breakeven_year,
            meets_target,
        });
        meets_target
    }
}

/// Finds the value of `variable` that brings breakeven to `target_year` or
/// sooner, holding the rest of `profile` fixed.
///
/// Price and rate are bisected on `[0, current]` assuming lower is never
/// worse, keeping the passing value closest to the current one. Down
/// payment is scanned upward in 5 point steps because it is not monotonic.
pub fn optimize(
    target_year: u32,
    variable: OptimizeVariable,
    profile: &BuyProfile,
    global: &GlobalSettings,
    rent: &RentSettings,
) -> ValidationResult<OptimizationResult> {
    if target_year == 0 {
        return Err(ValidationError::NoTargetYear);
    }
    validate_inputs(global, rent, profile)?;
    let rent_stream = project_rent(rent, global.forecast_years);

    let mut evaluator = Evaluator {
        global,
        rent_stream: &rent_stream,
        base: profile,
        variable,
        target_year,
        probes: Vec::new(),
    };
    let current_value = variable.current_value(profile);

    let solved_value = match variable {
        OptimizeVariable::DownPayment => scan_down_payment(&mut evaluator),
        OptimizeVariable::Price | OptimizeVariable::Rate => {
            bisect_toward_zero(&mut evaluator, current_value)
        }
    };

    debug!(
        ?variable,
        target_year,
        current_value,
        ?solved_value,
        probes = evaluator.probes.len(),
        "breakeven optimization finished"
    );

    Ok(OptimizationResult {
        variable,
        target_year,
        current_value,
        solved_value,
        probes: evaluator.probes,
    })
}

/// The solved value alone; `None` when no probe reached the target.
pub fn find_optimized_value(
    target_year: u32,
    variable: OptimizeVariable,
    profile: &BuyProfile,
    global: &GlobalSettings,
    rent: &RentSettings,
) -> ValidationResult<Option<f64>> {
    optimize(target_year, variable, profile, global, rent).map(|result| result.solved_value)
}

fn bisect_toward_zero(evaluator: &mut Evaluator<'_>, current_value: f64) -> Option<f64> {
    if evaluator.meets_target(current_value) {
        return Some(current_value);
    }

    let mut low = 0.0;
    let mut high = current_value;
    let mut best = None;
    for _ in 0..BISECTION_ITERATIONS {
        let mid = (low + high) * 0.5;
        if evaluator.meets_target(mid) {
            best = Some(mid);
            low = mid;
        } else {
            high = mid;
        }
    }
    best
}

fn scan_down_payment(evaluator: &mut Evaluator<'_>) -> Option<f64> {
    (0..=100u32)
        .step_by(DOWN_PAYMENT_STEP_PCT as usize)
        .map(f64::from)
        .find(|&pct| evaluator.meets_target(pct))
}

/// Target the analysis optimizes toward given the current breakeven.
pub fn analysis_target_year(current_breakeven: Option<u32>) -> u32 {
    match current_breakeven {
        Some(year) if year <= UNRENT_BAR_YEARS => year.saturating_sub(1).max(1),
        _ => UNRENT_BAR_YEARS,
    }
}

/// Simulates one profile and, unless it already breaks even in year 1,
/// solves all three variables against the analysis target.
pub fn analyze_profile(
    global: &GlobalSettings,
    rent: &RentSettings,
    profile: &BuyProfile,
) -> ValidationResult<AnalysisReport> {
    let result = simulate(global, rent, profile)?;
    let current = result.breakeven_year;
    let target_year = analysis_target_year(current);
    let beats_unrent_bar = current.is_some_and(|year| year <= UNRENT_BAR_YEARS);
    let show_optimizations = current != Some(1);

    let optimizations = if show_optimizations {
        OptimizeVariable::ALL
            .into_iter()
            .map(|variable| optimize(target_year, variable, profile, global, rent))
            .collect::<ValidationResult<Vec<_>>>()?
    } else {
        Vec::new()
    };

    Ok(AnalysisReport {
        profile_id: profile.id.clone(),
        result,
        target_year,
        beats_unrent_bar,
        show_optimizations,
        optimizations,
    })
}

/// Runs every profile against the same rent stream, preserving input order.
pub fn compare_profiles(
    global: &GlobalSettings,
    rent: &RentSettings,
    profiles: &[BuyProfile],
) -> ValidationResult<Vec<ProfileComparison>> {
    for (idx, profile) in profiles.iter().enumerate() {
        if profiles[..idx].iter().any(|p| p.id == profile.id) {
            return Err(ValidationError::DuplicateProfileId(profile.id.clone()));
        }
        validate_inputs(global, rent, profile)?;
    }

    let rent_stream = project_rent(rent, global.forecast_years);
    Ok(profiles
        .iter()
        .map(|profile| ProfileComparison {
            profile_id: profile.id.clone(),
            name: profile.name.clone(),
            result: run_scenario(global, &rent_stream, profile),
        })
        .collect())
}
