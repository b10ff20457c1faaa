use serde::{Deserialize, Serialize};

/// Ceiling on the loan balance whose interest is deductible.
pub const MORTGAGE_INTEREST_DEDUCTION_CEILING: f64 = 750_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GlobalSettings {
    pub forecast_years: u32,
    pub federal_tax_rate: f64,
    pub invest_return: f64,
    pub cap_gains_rate: f64,
    pub mortgage_interest_deduction_ceiling: f64,
}

pub const DEFAULT_GLOBAL_SETTINGS: GlobalSettings = GlobalSettings {
    forecast_years: 30,
    federal_tax_rate: 37.0,
    invest_return: 4.0,
    cap_gains_rate: 38.6,
    mortgage_interest_deduction_ceiling: MORTGAGE_INTEREST_DEDUCTION_CEILING,
};

impl Default for GlobalSettings {
    fn default() -> Self {
        DEFAULT_GLOBAL_SETTINGS
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RentSettings {
    pub monthly_rent: f64,
    pub annual_rent_increase: f64,
}

pub const DEFAULT_RENT_SETTINGS: RentSettings = RentSettings {
    monthly_rent: 7_050.0,
    annual_rent_increase: 5.0,
};

impl Default for RentSettings {
    fn default() -> Self {
        DEFAULT_RENT_SETTINGS
    }
}

/// One candidate home purchase. All rates are in percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuyProfile {
    pub id: String,
    pub name: String,
    pub purchase_price: f64,
    pub down_payment_pct: f64,
    pub interest_rate: f64,
    pub mortgage_term: u32,
    pub home_appreciation: f64,
    pub hoa_insurance_monthly: f64,
    pub annual_property_tax: f64,
    pub prop_tax_growth: f64,

    pub mansion_tax_pct: f64,
    pub mortgage_recording_tax_pct: f64,
    pub title_insurance_pct: f64,
    pub real_estate_attorney_fee: f64,
    pub bank_attorney_fee: f64,
    pub lender_fee: f64,
    pub recording_fee: f64,

    pub seller_commission_pct: f64,
    pub transfer_tax_pct: f64,
    pub capital_gains_exclusion: f64,
    pub maintenance_pct: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl Default for BuyProfile {
    fn default() -> Self {
        Self {
            id: "buy_1".to_string(),
            name: "Home 1".to_string(),
            purchase_price: 1_850_000.0,
            down_payment_pct: 20.0,
            interest_rate: 6.3,
            mortgage_term: 30,
            home_appreciation: 2.0,
            hoa_insurance_monthly: 919.0,
            annual_property_tax: 2_093.0,
            prop_tax_growth: 2.0,
            mansion_tax_pct: 1.0,
            mortgage_recording_tax_pct: 1.925,
            title_insurance_pct: 0.6,
            real_estate_attorney_fee: 5_000.0,
            bank_attorney_fee: 1_000.0,
            lender_fee: 1_500.0,
            recording_fee: 750.0,
            seller_commission_pct: 5.0,
            transfer_tax_pct: 1.825,
            capital_gains_exclusion: 500_000.0,
            maintenance_pct: 0.0,
            color: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RentYear {
    pub year: u32,
    pub monthly_rent: f64,
    pub annual_rent: f64,
    pub cumulative_rent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClosingCosts {
    pub mansion_tax: f64,
    pub mortgage_recording_tax: f64,
    pub title_insurance: f64,
    pub real_estate_attorney_fee: f64,
    pub bank_attorney_fee: f64,
    pub lender_fee: f64,
    pub recording_fee: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRow {
    pub year: u32,
    pub home_value: f64,
    pub mortgage_balance: f64,
    pub interest_paid: f64,
    pub tax_shield: f64,
    pub buy_outlay: f64,
    pub annual_rent: f64,
    pub net_house_wealth: f64,
    pub renter_portfolio: f64,
    pub cum_invested: f64,
    pub renter_exit_tax: f64,
    pub net_renter_wealth: f64,
    pub wealth_delta: f64,
    pub cash_flow_delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationResult {
    pub rows: Vec<YearlyRow>,
    pub down_payment: f64,
    pub closing_costs: ClosingCosts,
    pub total_closing_costs: f64,
    pub loan_amount: f64,
    pub monthly_payment: f64,
    pub breakeven_year: Option<u32>,
    pub precise_breakeven: Option<f64>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptimizeVariable {
    #[serde(alias = "purchasePrice")]
    Price,
    #[serde(alias = "interestRate")]
    Rate,
    #[serde(alias = "downPaymentPct", alias = "down-payment")]
    DownPayment,
}

impl OptimizeVariable {
    pub const ALL: [OptimizeVariable; 3] = [
        OptimizeVariable::Price,
        OptimizeVariable::Rate,
        OptimizeVariable::DownPayment,
    ];

    pub fn current_value(self, profile: &BuyProfile) -> f64 {
        match self {
            OptimizeVariable::Price => profile.purchase_price,
            OptimizeVariable::Rate => profile.interest_rate,
            OptimizeVariable::DownPayment => profile.down_payment_pct,
        }
    }

    pub fn apply(self, profile: &mut BuyProfile, value: f64) {
        match self {
            OptimizeVariable::Price => profile.purchase_price = value,
            OptimizeVariable::Rate => profile.interest_rate = value,
            OptimizeVariable::DownPayment => profile.down_payment_pct = value,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationProbe {
    pub value: f64,
    pub breakeven_year: Option<u32>,
    pub meets_target: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizationResult {
    pub variable: OptimizeVariable,
    pub target_year: u32,
    pub current_value: f64,
    pub solved_value: Option<f64>,
    pub probes: Vec<OptimizationProbe>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisReport {
    pub profile_id: String,
    pub result: SimulationResult,
    pub target_year: u32,
    pub beats_unrent_bar: bool,
    pub show_optimizations: bool,
    pub optimizations: Vec<OptimizationResult>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileComparison {
    pub profile_id: String,
    pub name: String,
    pub result: SimulationResult,
}
