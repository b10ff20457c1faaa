use super::types::YearlyRow;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Breakeven {
    /// First forecast year with a non-negative wealth delta.
    pub year: u32,
    /// Linear interpolation of the zero crossing, in years since purchase.
    pub precise: f64,
}

/// Scans rows in year order for the first `wealth_delta >= 0`.
///
/// `initial_delta` stands in for the year before the first row, normally
/// minus the cash paid at closing.
pub fn find_breakeven(rows: &[YearlyRow], initial_delta: f64) -> Option<Breakeven> {
    let index = rows.iter().position(|row| row.wealth_delta >= 0.0)?;
    let crossing = &rows[index];
    let prev_delta = match index {
        0 => initial_delta,
        _ => rows[index - 1].wealth_delta,
    };
    let curr_delta = crossing.wealth_delta;
    let span = curr_delta - prev_delta;
    // Both ends at zero means the crossing sits at the start of the interval.
    let fraction = if span > 0.0 {
        prev_delta.abs() / span
    } else {
        0.0
    };
    Some(Breakeven {
        year: crossing.year,
        precise: index as f64 + fraction,
    })
}
