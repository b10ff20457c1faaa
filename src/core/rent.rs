use super::types::{RentSettings, RentYear};

/// Escalating rent, one entry per forecast year starting at year 1.
pub fn project_rent(settings: &RentSettings, years: u32) -> Vec<RentYear> {
    let growth = settings.annual_rent_increase / 100.0;
    let mut cumulative_rent = 0.0;
    (1..=years)
        .map(|year| {
            let monthly_rent = settings.monthly_rent * (1.0 + growth).powi(year as i32 - 1);
            let annual_rent = monthly_rent * 12.0;
            cumulative_rent += annual_rent;
            RentYear {
                year,
                monthly_rent,
                annual_rent,
                cumulative_rent,
            }
        })
        .collect()
}

/// Annual rent for a 1-indexed year; zero past the end of the stream.
pub fn annual_rent_for_year(stream: &[RentYear], year: u32) -> f64 {
    year.checked_sub(1)
        .and_then(|idx| stream.get(idx as usize))
        .map_or(0.0, |entry| entry.annual_rent)
}
