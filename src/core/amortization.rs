/// Fixed-rate, monthly-compounding loan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Amortization {
    pub principal: f64,
    pub monthly_rate: f64,
    pub total_periods: u32,
    pub payment: f64,
}

impl Amortization {
    /// `annual_rate_pct` is in percent, e.g. 6.3.
    pub fn new(principal: f64, annual_rate_pct: f64, term_years: u32) -> Self {
        let monthly_rate = annual_rate_pct / 100.0 / 12.0;
        let total_periods = term_years * 12;
        Self {
            principal,
            monthly_rate,
            total_periods,
            payment: monthly_payment(principal, monthly_rate, total_periods),
        }
    }

    /// Outstanding balance after `elapsed` monthly payments.
    pub fn balance_after(&self, elapsed: u32) -> f64 {
        let remaining = self.total_periods.saturating_sub(elapsed);
        if remaining == 0 {
            return 0.0;
        }
        if self.monthly_rate > 0.0 {
            self.payment * (1.0 - (1.0 + self.monthly_rate).powi(-(remaining as i32)))
                / self.monthly_rate
        } else {
            self.principal - self.payment * elapsed as f64
        }
    }

    /// Balance at the end of forecast year `year` (1-indexed).
    pub fn balance_at_year_end(&self, year: u32) -> f64 {
        self.balance_after(year * 12)
    }

    /// Interest paid during forecast year `year`.
    ///
    /// Rebuilds the start-of-year balance, then steps the year month by month
    /// so only interest (not principal) is counted.
    pub fn interest_in_year(&self, year: u32) -> f64 {
        let start = (year.saturating_sub(1)) * 12;
        if start >= self.total_periods {
            return 0.0;
        }
        let mut balance = self.balance_after(start);
        let mut interest = 0.0;
        for _ in 0..12 {
            if balance <= 0.0 {
                break;
            }
            let month_interest = balance * self.monthly_rate;
            interest += month_interest;
            balance -= self.payment - month_interest;
        }
        interest
    }

    /// Scheduled principal + interest paid during `year`; zero after payoff.
    pub fn payments_in_year(&self, year: u32) -> f64 {
        let start = (year.saturating_sub(1)) * 12;
        let months = self.total_periods.saturating_sub(start).min(12);
        self.payment * months as f64
    }
}

/// Standard annuity payment; straight-line when the rate is zero.
pub fn monthly_payment(principal: f64, monthly_rate: f64, periods: u32) -> f64 {
    if periods == 0 {
        return 0.0;
    }
    if monthly_rate > 0.0 {
        let growth = (1.0 + monthly_rate).powi(periods as i32);
        principal * monthly_rate * growth / (growth - 1.0)
    } else {
        principal / periods as f64
    }
}
