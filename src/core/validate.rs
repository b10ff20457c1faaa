use thiserror::Error;

use super::types::{BuyProfile, GlobalSettings, RentSettings};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },
    #[error("{field} must be > 0, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must be >= 0, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("{field} must be > -100, got {value}")]
    RateTooLow { field: &'static str, value: f64 },
    #[error("downPaymentPct must be between 0 and 100, got {0}")]
    DownPaymentOutOfRange(f64),
    #[error("forecastYears must be >= 1")]
    NoForecastYears,
    #[error("forecastYears must be <= 100, got {0}")]
    ForecastTooLong(u32),
    #[error("mortgageTerm must be >= 1 year")]
    NoMortgageTerm,
    #[error("mortgageTerm must be <= 100 years, got {0}")]
    MortgageTermTooLong(u32),
    #[error("target year must be >= 1")]
    NoTargetYear,
    #[error("duplicate profile id {0:?}")]
    DuplicateProfileId(String),
}

pub const MAX_MORTGAGE_TERM_YEARS: u32 = 100;
pub const MAX_FORECAST_YEARS: u32 = 100;

pub type ValidationResult<T> = Result<T, ValidationError>;

fn finite(field: &'static str, value: f64) -> ValidationResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValidationError::NotFinite { field, value })
    }
}

fn positive(field: &'static str, value: f64) -> ValidationResult<()> {
    if finite(field, value)? <= 0.0 {
        return Err(ValidationError::NotPositive { field, value });
    }
    Ok(())
}

fn non_negative(field: &'static str, value: f64) -> ValidationResult<()> {
    if finite(field, value)? < 0.0 {
        return Err(ValidationError::Negative { field, value });
    }
    Ok(())
}

/// Growth rates in percent; -100 or below would zero or flip the base.
fn growth_rate(field: &'static str, value: f64) -> ValidationResult<()> {
    if finite(field, value)? <= -100.0 {
        return Err(ValidationError::RateTooLow { field, value });
    }
    Ok(())
}

pub fn validate_global(global: &GlobalSettings) -> ValidationResult<()> {
    if global.forecast_years == 0 {
        return Err(ValidationError::NoForecastYears);
    }
    if global.forecast_years > MAX_FORECAST_YEARS {
        return Err(ValidationError::ForecastTooLong(global.forecast_years));
    }
    non_negative("federalTaxRate", global.federal_tax_rate)?;
    growth_rate("investReturn", global.invest_return)?;
    non_negative("capGainsRate", global.cap_gains_rate)?;
    non_negative(
        "mortgageInterestDeductionCeiling",
        global.mortgage_interest_deduction_ceiling,
    )?;
    Ok(())
}

pub fn validate_rent(rent: &RentSettings) -> ValidationResult<()> {
    non_negative("monthlyRent", rent.monthly_rent)?;
    growth_rate("annualRentIncrease", rent.annual_rent_increase)?;
    Ok(())
}

pub fn validate_profile(profile: &BuyProfile) -> ValidationResult<()> {
    positive("purchasePrice", profile.purchase_price)?;
    let down = finite("downPaymentPct", profile.down_payment_pct)?;
    if !(0.0..=100.0).contains(&down) {
        return Err(ValidationError::DownPaymentOutOfRange(down));
    }
    non_negative("interestRate", profile.interest_rate)?;
    if profile.mortgage_term == 0 {
        return Err(ValidationError::NoMortgageTerm);
    }
    if profile.mortgage_term > MAX_MORTGAGE_TERM_YEARS {
        return Err(ValidationError::MortgageTermTooLong(profile.mortgage_term));
    }
    growth_rate("homeAppreciation", profile.home_appreciation)?;
    growth_rate("propTaxGrowth", profile.prop_tax_growth)?;

    for (field, value) in [
        ("hoaInsuranceMonthly", profile.hoa_insurance_monthly),
        ("annualPropertyTax", profile.annual_property_tax),
        ("mansionTaxPct", profile.mansion_tax_pct),
        ("mortgageRecordingTaxPct", profile.mortgage_recording_tax_pct),
        ("titleInsurancePct", profile.title_insurance_pct),
        ("realEstateAttorneyFee", profile.real_estate_attorney_fee),
        ("bankAttorneyFee", profile.bank_attorney_fee),
        ("lenderFee", profile.lender_fee),
        ("recordingFee", profile.recording_fee),
        ("sellerCommissionPct", profile.seller_commission_pct),
        ("transferTaxPct", profile.transfer_tax_pct),
        ("capitalGainsExclusion", profile.capital_gains_exclusion),
        ("maintenancePct", profile.maintenance_pct),
    ] {
        non_negative(field, value)?;
    }
    Ok(())
}

pub fn validate_inputs(
    global: &GlobalSettings,
    rent: &RentSettings,
    profile: &BuyProfile,
) -> ValidationResult<()> {
    validate_global(global)?;
    validate_rent(rent)?;
    validate_profile(profile)
}
