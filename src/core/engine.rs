use super::amortization::Amortization;
use super::breakeven::find_breakeven;
use super::rent::{annual_rent_for_year, project_rent};
use super::types::{
    BuyProfile, ClosingCosts, GlobalSettings, RentSettings, RentYear, SimulationResult, YearlyRow,
};
use super::validate::{ValidationResult, validate_inputs};

/// Rates converted from percent once per run.
#[derive(Debug, Clone, Copy)]
struct Rates {
    federal_tax: f64,
    invest_growth: f64,
    cap_gains: f64,
    appreciation: f64,
    prop_tax_growth: f64,
    maintenance: f64,
    selling_cost: f64,
}

impl Rates {
    fn new(global: &GlobalSettings, profile: &BuyProfile) -> Self {
        Self {
            federal_tax: global.federal_tax_rate / 100.0,
            invest_growth: global.invest_return / 100.0,
            cap_gains: global.cap_gains_rate / 100.0,
            appreciation: profile.home_appreciation / 100.0,
            prop_tax_growth: profile.prop_tax_growth / 100.0,
            maintenance: profile.maintenance_pct / 100.0,
            selling_cost: (profile.seller_commission_pct + profile.transfer_tax_pct) / 100.0,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RenterAccount {
    portfolio: f64,
    invested: f64,
}

impl RenterAccount {
    /// Seeded with the cash the buyer would have spent up front.
    fn seeded(upfront: f64) -> Self {
        Self {
            portfolio: upfront,
            invested: upfront,
        }
    }

    fn advance(&mut self, growth: f64, contribution: f64) {
        self.portfolio = self.portfolio * (1.0 + growth) + contribution;
        self.invested += contribution;
    }

    fn exit_tax(&self, cap_gains_rate: f64) -> f64 {
        ((self.portfolio - self.invested) * cap_gains_rate).max(0.0)
    }
}

pub fn closing_costs(profile: &BuyProfile) -> ClosingCosts {
    let price = profile.purchase_price;
    let mansion_tax = price * profile.mansion_tax_pct / 100.0;
    let mortgage_recording_tax = price * profile.mortgage_recording_tax_pct / 100.0;
    let title_insurance = price * profile.title_insurance_pct / 100.0;
    let total = mansion_tax
        + mortgage_recording_tax
        + title_insurance
        + profile.real_estate_attorney_fee
        + profile.bank_attorney_fee
        + profile.lender_fee
        + profile.recording_fee;
    ClosingCosts {
        mansion_tax,
        mortgage_recording_tax,
        title_insurance,
        real_estate_attorney_fee: profile.real_estate_attorney_fee,
        bank_attorney_fee: profile.bank_attorney_fee,
        lender_fee: profile.lender_fee,
        recording_fee: profile.recording_fee,
        total,
    }
}

/// Share of mortgage interest eligible for the deduction. Zero with no loan.
pub fn deduction_cap(loan_amount: f64, ceiling: f64) -> f64 {
    if loan_amount > 0.0 {
        (ceiling / loan_amount).min(1.0)
    } else {
        0.0
    }
}

/// Validates the inputs, projects rent and runs the year-by-year comparison.
pub fn simulate(
    global: &GlobalSettings,
    rent: &RentSettings,
    profile: &BuyProfile,
) -> ValidationResult<SimulationResult> {
    validate_inputs(global, rent, profile)?;
    let stream = project_rent(rent, global.forecast_years);
    Ok(run_scenario(global, &stream, profile))
}

/// Year-by-year buy vs rent comparison. Inputs must already be validated.
pub fn run_scenario(
    global: &GlobalSettings,
    rent_stream: &[RentYear],
    profile: &BuyProfile,
) -> SimulationResult {
    let rates = Rates::new(global, profile);
    let price = profile.purchase_price;
    let down_payment = price * profile.down_payment_pct / 100.0;
    let costs = closing_costs(profile);
    let upfront = down_payment + costs.total;
    let loan_amount = price - down_payment;
    let loan = Amortization::new(loan_amount, profile.interest_rate, profile.mortgage_term);
    let cap = deduction_cap(loan_amount, global.mortgage_interest_deduction_ceiling);
    let cost_basis = price + costs.total;
    let hoa = profile.hoa_insurance_monthly * 12.0;

    let mut renter = RenterAccount::seeded(upfront);
    let mut rows = Vec::with_capacity(global.forecast_years as usize);

    for year in 1..=global.forecast_years {
        let start_value = price * (1.0 + rates.appreciation).powi(year as i32 - 1);
        let home_value = price * (1.0 + rates.appreciation).powi(year as i32);

        let mortgage_balance = loan.balance_at_year_end(year);
        let interest_paid = loan.interest_in_year(year);
        let tax_shield = interest_paid * cap * rates.federal_tax;

        let property_tax =
            profile.annual_property_tax * (1.0 + rates.prop_tax_growth).powi(year as i32 - 1);
        let maintenance = start_value * rates.maintenance;
        let buy_outlay =
            loan.payments_in_year(year) + property_tax + hoa + maintenance - tax_shield;

        let annual_rent = annual_rent_for_year(rent_stream, year);

        let net_sale_proceeds = home_value * (1.0 - rates.selling_cost);
        let taxable_gain = net_sale_proceeds - cost_basis - profile.capital_gains_exclusion;
        let home_cap_gains_tax = (taxable_gain * rates.cap_gains).max(0.0);
        let net_house_wealth = net_sale_proceeds - mortgage_balance - home_cap_gains_tax;

        let cash_flow_delta = buy_outlay - annual_rent;
        renter.advance(rates.invest_growth, cash_flow_delta);
        let renter_exit_tax = renter.exit_tax(rates.cap_gains);
        let net_renter_wealth = renter.portfolio - renter_exit_tax;

        rows.push(YearlyRow {
            year,
            home_value,
            mortgage_balance,
            interest_paid,
            tax_shield,
            buy_outlay,
            annual_rent,
            net_house_wealth,
            renter_portfolio: renter.portfolio,
            cum_invested: renter.invested,
            renter_exit_tax,
            net_renter_wealth,
            wealth_delta: net_house_wealth - net_renter_wealth,
            cash_flow_delta,
        });
    }

    let breakeven = find_breakeven(&rows, -upfront);

    SimulationResult {
        rows,
        down_payment,
        closing_costs: costs,
        total_closing_costs: costs.total,
        loan_amount,
        monthly_payment: loan.payment,
        breakeven_year: breakeven.map(|b| b.year),
        precise_breakeven: breakeven.map(|b| b.precise),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::validate::ValidationError;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn assert_approx_tol(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {expected}, got {actual}, tolerance {tol}"
        );
    }

    /// Every cost, tax and growth input zeroed out.
    fn bare_profile() -> BuyProfile {
        BuyProfile {
            id: "bare".to_string(),
            name: "Bare".to_string(),
            purchase_price: 300_000.0,
            down_payment_pct: 20.0,
            interest_rate: 0.0,
            mortgage_term: 30,
            home_appreciation: 0.0,
            hoa_insurance_monthly: 0.0,
            annual_property_tax: 0.0,
            prop_tax_growth: 0.0,
            mansion_tax_pct: 0.0,
            mortgage_recording_tax_pct: 0.0,
            title_insurance_pct: 0.0,
            real_estate_attorney_fee: 0.0,
            bank_attorney_fee: 0.0,
            lender_fee: 0.0,
            recording_fee: 0.0,
            seller_commission_pct: 0.0,
            transfer_tax_pct: 0.0,
            capital_gains_exclusion: 0.0,
            maintenance_pct: 0.0,
            color: None,
        }
    }

    fn bare_global(years: u32) -> GlobalSettings {
        GlobalSettings {
            forecast_years: years,
            federal_tax_rate: 0.0,
            invest_return: 0.0,
            cap_gains_rate: 0.0,
            ..GlobalSettings::default()
        }
    }

    fn no_rent() -> RentSettings {
        RentSettings {
            monthly_rent: 0.0,
            annual_rent_increase: 0.0,
        }
    }

    #[test]
    fn zero_rate_sanity_scenario() {
        let result = simulate(&bare_global(5), &no_rent(), &bare_profile()).expect("valid inputs");
        assert_approx(result.loan_amount, 240_000.0);
        assert_approx(result.monthly_payment, 240_000.0 / 360.0);
        assert_eq!(result.rows.len(), 5);
        for row in &result.rows {
            assert_approx(
                row.mortgage_balance,
                240_000.0 - (240_000.0 / 360.0) * 12.0 * row.year as f64,
            );
            assert_eq!(row.interest_paid, 0.0);
            assert_eq!(row.tax_shield, 0.0);
            assert_approx(row.home_value, 300_000.0);
        }
    }

    #[test]
    fn zero_rate_scenario_wealth_matches_hand_calculation() {
        // With no growth, taxes or rent, the renter simply banks every payment
        // and the buyer's equity rises by the same principal.
        let result = simulate(&bare_global(5), &no_rent(), &bare_profile()).expect("valid inputs");
        let row = result.rows[0];
        assert_approx(row.buy_outlay, 8_000.0);
        assert_approx(row.cash_flow_delta, 8_000.0);
        assert_approx(row.renter_portfolio, 60_000.0 + 8_000.0);
        assert_approx(row.cum_invested, 68_000.0);
        assert_approx(row.net_house_wealth, 300_000.0 - 232_000.0);
        assert_approx(row.wealth_delta, 0.0);
    }

    #[test]
    fn closing_costs_combine_percentages_and_flat_fees() {
        let costs = closing_costs(&BuyProfile::default());
        let price = 1_850_000.0;
        assert_approx(costs.mansion_tax, price * 0.01);
        assert_approx(costs.mortgage_recording_tax, price * 0.01925);
        assert_approx(costs.title_insurance, price * 0.006);
        assert_approx(
            costs.total,
            price * (0.01 + 0.01925 + 0.006) + 5_000.0 + 1_000.0 + 1_500.0 + 750.0,
        );
    }

    #[test]
    fn deduction_cap_limits_large_loans_and_handles_no_loan() {
        assert_approx(deduction_cap(1_500_000.0, 750_000.0), 0.5);
        assert_approx(deduction_cap(500_000.0, 750_000.0), 1.0);
        assert_eq!(deduction_cap(0.0, 750_000.0), 0.0);
    }

    #[test]
    fn all_cash_purchase_has_no_loan_or_tax_shield() {
        let profile = BuyProfile {
            down_payment_pct: 100.0,
            ..BuyProfile::default()
        };
        let result = simulate(&GlobalSettings::default(), &RentSettings::default(), &profile)
            .expect("valid inputs");
        assert_eq!(result.loan_amount, 0.0);
        assert_eq!(result.monthly_payment, 0.0);
        for row in &result.rows {
            assert_eq!(row.mortgage_balance, 0.0);
            assert_eq!(row.tax_shield, 0.0);
            assert!(row.buy_outlay.is_finite());
        }
    }

    #[test]
    fn tax_shield_uses_capped_interest() {
        let profile = BuyProfile {
            purchase_price: 2_000_000.0,
            down_payment_pct: 25.0,
            interest_rate: 6.0,
            ..bare_profile()
        };
        let global = GlobalSettings {
            federal_tax_rate: 30.0,
            ..bare_global(3)
        };
        let result = simulate(&global, &no_rent(), &profile).expect("valid inputs");
        let loan = Amortization::new(1_500_000.0, 6.0, 30);
        for row in &result.rows {
            assert_approx(row.interest_paid, loan.interest_in_year(row.year));
            assert_approx(row.tax_shield, row.interest_paid * 0.5 * 0.30);
        }
    }

    #[test]
    fn deduction_ceiling_can_be_overridden_per_call() {
        let profile = BuyProfile {
            purchase_price: 2_000_000.0,
            down_payment_pct: 25.0,
            interest_rate: 6.0,
            ..bare_profile()
        };
        let global = GlobalSettings {
            federal_tax_rate: 30.0,
            mortgage_interest_deduction_ceiling: 375_000.0,
            ..bare_global(3)
        };
        let result = simulate(&global, &no_rent(), &profile).expect("valid inputs");
        for row in &result.rows {
            assert!(row.interest_paid > 0.0);
            assert_approx(row.tax_shield, row.interest_paid * 0.25 * 0.30);
        }

        let no_deduction = GlobalSettings {
            mortgage_interest_deduction_ceiling: 0.0,
            ..global
        };
        let result = simulate(&no_deduction, &no_rent(), &profile).expect("valid inputs");
        assert!(result.rows.iter().all(|row| row.tax_shield == 0.0));
    }

    #[test]
    fn outlay_drops_to_carrying_costs_after_payoff() {
        let profile = BuyProfile {
            interest_rate: 5.0,
            mortgage_term: 2,
            annual_property_tax: 1_200.0,
            hoa_insurance_monthly: 100.0,
            ..bare_profile()
        };
        let result = simulate(&bare_global(4), &no_rent(), &profile).expect("valid inputs");
        assert_approx(
            result.rows[1].buy_outlay,
            result.monthly_payment * 12.0 + 1_200.0 + 1_200.0,
        );
        assert_approx(result.rows[2].buy_outlay, 2_400.0);
        assert_eq!(result.rows[2].mortgage_balance, 0.0);
        assert_eq!(result.rows[3].interest_paid, 0.0);
    }

    #[test]
    fn maintenance_uses_start_of_year_value() {
        let profile = BuyProfile {
            home_appreciation: 10.0,
            maintenance_pct: 1.0,
            down_payment_pct: 100.0,
            ..bare_profile()
        };
        let result = simulate(&bare_global(2), &no_rent(), &profile).expect("valid inputs");
        assert_approx(result.rows[0].buy_outlay, 3_000.0);
        assert_approx(result.rows[1].buy_outlay, 3_300.0);
        assert_approx_tol(result.rows[1].home_value, 363_000.0, 1e-6);
    }

    #[test]
    fn property_tax_escalates_from_first_year() {
        let profile = BuyProfile {
            annual_property_tax: 10_000.0,
            prop_tax_growth: 10.0,
            down_payment_pct: 100.0,
            ..bare_profile()
        };
        let result = simulate(&bare_global(3), &no_rent(), &profile).expect("valid inputs");
        assert_approx(result.rows[0].buy_outlay, 10_000.0);
        assert_approx(result.rows[1].buy_outlay, 11_000.0);
        assert_approx(result.rows[2].buy_outlay, 12_100.0);
    }

    #[test]
    fn home_sale_applies_selling_costs_exclusion_and_cap_gains() {
        let profile = BuyProfile {
            home_appreciation: 50.0,
            seller_commission_pct: 5.0,
            transfer_tax_pct: 1.0,
            capital_gains_exclusion: 50_000.0,
            down_payment_pct: 100.0,
            ..bare_profile()
        };
        let global = GlobalSettings {
            cap_gains_rate: 20.0,
            ..bare_global(1)
        };
        let result = simulate(&global, &no_rent(), &profile).expect("valid inputs");
        let proceeds = 450_000.0 * 0.94;
        let tax = (proceeds - 300_000.0 - 50_000.0) * 0.20;
        assert_approx(result.rows[0].net_house_wealth, proceeds - tax);
    }

    #[test]
    fn home_cap_gains_tax_never_negative() {
        let profile = BuyProfile {
            home_appreciation: -20.0,
            down_payment_pct: 100.0,
            ..bare_profile()
        };
        let global = GlobalSettings {
            cap_gains_rate: 20.0,
            ..bare_global(1)
        };
        let result = simulate(&global, &no_rent(), &profile).expect("valid inputs");
        assert_approx(result.rows[0].net_house_wealth, 240_000.0);
    }

    #[test]
    fn renter_side_compounds_and_taxes_only_gains() {
        let profile = BuyProfile {
            down_payment_pct: 100.0,
            annual_property_tax: 12_000.0,
            ..bare_profile()
        };
        let global = GlobalSettings {
            invest_return: 10.0,
            cap_gains_rate: 20.0,
            ..bare_global(2)
        };
        let rent = RentSettings {
            monthly_rent: 500.0,
            annual_rent_increase: 0.0,
        };
        let result = simulate(&global, &rent, &profile).expect("valid inputs");

        let y1 = result.rows[0];
        assert_approx(y1.cash_flow_delta, 6_000.0);
        assert_approx(y1.renter_portfolio, 300_000.0 * 1.1 + 6_000.0);
        assert_approx(y1.cum_invested, 306_000.0);
        assert_approx(y1.renter_exit_tax, 30_000.0 * 0.2);
        assert_approx(y1.net_renter_wealth, y1.renter_portfolio - 6_000.0);

        let y2 = result.rows[1];
        assert_approx(y2.renter_portfolio, y1.renter_portfolio * 1.1 + 6_000.0);
        assert_approx(y2.cum_invested, 312_000.0);
    }

    #[test]
    fn cum_invested_can_go_negative_when_renting_costs_more() {
        let profile = BuyProfile {
            down_payment_pct: 0.0,
            mortgage_term: 1,
            ..bare_profile()
        };
        let rent = RentSettings {
            monthly_rent: 10_000.0,
            annual_rent_increase: 0.0,
        };
        let result = simulate(&bare_global(3), &rent, &profile).expect("valid inputs");
        assert!(result.rows[2].cum_invested < 0.0);
        assert_eq!(result.rows[2].renter_exit_tax, 0.0);
    }

    #[test]
    fn invalid_inputs_are_rejected_before_simulating() {
        let err = simulate(&bare_global(0), &no_rent(), &bare_profile())
            .expect_err("zero forecast years must fail");
        assert_eq!(err, ValidationError::NoForecastYears);

        let profile = BuyProfile {
            down_payment_pct: 120.0,
            ..bare_profile()
        };
        assert!(simulate(&bare_global(5), &no_rent(), &profile).is_err());
    }

    #[test]
    fn default_scenario_reaches_breakeven_within_horizon() {
        let result = simulate(
            &GlobalSettings::default(),
            &RentSettings::default(),
            &BuyProfile::default(),
        )
        .expect("defaults are valid");
        assert_eq!(result.rows.len(), 30);
        let year = result.breakeven_year.expect("defaults should break even");
        let precise = result.precise_breakeven.expect("precise breakeven");
        assert!(precise >= (year - 1) as f64 && precise <= year as f64);
    }

    #[test]
    fn reruns_are_bit_identical() {
        let global = GlobalSettings::default();
        let rent = RentSettings::default();
        let profile = BuyProfile::default();
        let first = simulate(&global, &rent, &profile).expect("valid inputs");
        let second = simulate(&global, &rent, &profile).expect("valid inputs");
        assert_eq!(first, second);
        for (a, b) in first.rows.iter().zip(&second.rows) {
            assert_eq!(a.wealth_delta.to_bits(), b.wealth_delta.to_bits());
            assert_eq!(a.renter_portfolio.to_bits(), b.renter_portfolio.to_bits());
        }
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_rows_satisfy_identities(
            price in 50_000u32..4_000_000,
            down_pct in 0u32..101,
            rate_bp in 0u32..1_200,
            term in 5u32..41,
            appreciation_bp in -500i32..800,
            invest_bp in -300i32..1_200,
            years in 1u32..45,
            rent in 0u32..15_000,
            maintenance_bp in 0u32..300
        ) {
            let profile = BuyProfile {
                purchase_price: price as f64,
                down_payment_pct: down_pct as f64,
                interest_rate: rate_bp as f64 / 100.0,
                mortgage_term: term,
                home_appreciation: appreciation_bp as f64 / 100.0,
                maintenance_pct: maintenance_bp as f64 / 100.0,
                ..BuyProfile::default()
            };
            let global = GlobalSettings {
                forecast_years: years,
                invest_return: invest_bp as f64 / 100.0,
                ..GlobalSettings::default()
            };
            let rent = RentSettings {
                monthly_rent: rent as f64,
                ..RentSettings::default()
            };
            let result = simulate(&global, &rent, &profile).expect("generated inputs are valid");
            prop_assert_eq!(result.rows.len(), years as usize);

            let mut prev_balance = result.loan_amount;
            for row in &result.rows {
                let expected_value = profile.purchase_price
                    * (1.0 + profile.home_appreciation / 100.0).powi(row.year as i32);
                prop_assert!((row.home_value - expected_value).abs() <= 1e-9 * expected_value.max(1.0));
                prop_assert_eq!(row.wealth_delta, row.net_house_wealth - row.net_renter_wealth);
                prop_assert!(row.mortgage_balance <= prev_balance + 1e-6 * result.loan_amount.max(1.0));
                prop_assert!(row.renter_exit_tax >= 0.0);
                prev_balance = row.mortgage_balance;
                if rate_bp > 0 && row.year == term {
                    prop_assert!(row.mortgage_balance.abs() <= 1e-6 * result.loan_amount.max(1.0));
                }
            }

            if let Some(year) = result.breakeven_year {
                let first = result.rows.iter().find(|r| r.wealth_delta >= 0.0).map(|r| r.year);
                prop_assert_eq!(first, Some(year));
                let precise = result.precise_breakeven.expect("precise accompanies year");
                prop_assert!(precise >= (year - 1) as f64 - 1e-9);
                prop_assert!(precise <= year as f64 + 1e-9);
            } else {
                prop_assert!(result.rows.iter().all(|r| r.wealth_delta < 0.0));
                prop_assert!(result.precise_breakeven.is_none());
            }
        }

        #[test]
        fn prop_zero_rate_has_straight_line_payment_and_no_interest(
            price in 50_000u32..3_000_000,
            down_pct in 0u32..100,
            term in 1u32..41,
            years in 1u32..45
        ) {
            let profile = BuyProfile {
                purchase_price: price as f64,
                down_payment_pct: down_pct as f64,
                interest_rate: 0.0,
                mortgage_term: term,
                ..BuyProfile::default()
            };
            let global = GlobalSettings {
                forecast_years: years,
                ..GlobalSettings::default()
            };
            let result = simulate(&global, &RentSettings::default(), &profile)
                .expect("generated inputs are valid");
            prop_assert_eq!(result.monthly_payment, result.loan_amount / (term * 12) as f64);
            prop_assert!(result.rows.iter().all(|r| r.interest_paid == 0.0));
        }
    }
}
