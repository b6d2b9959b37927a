use super::engine::Simulation;
use super::types::{Projection, ViewMode, YearlyRecord};

/// Differences below half a dollar round to "$0" and are reported as a tie.
const TIE_THRESHOLD: f64 = 0.5;

pub fn derive_projection(
    simulation: Simulation,
    horizon_years: u32,
    view_mode: ViewMode,
) -> Projection {
    let (final_wealth_diff, final_cost_diff) = final_diffs(simulation.records.last());

    let (verdict, breakeven_text) = match view_mode {
        ViewMode::Wealth => (
            wealth_verdict(final_wealth_diff, horizon_years),
            wealth_breakeven_text(simulation.wealth_breakeven_year, horizon_years),
        ),
        ViewMode::Cost => (
            cost_verdict(final_cost_diff, horizon_years),
            cost_breakeven_text(simulation.cost_breakeven_year, horizon_years),
        ),
    };

    Projection {
        records: simulation.records,
        monthly_mortgage_payment: simulation.monthly_mortgage_payment,
        down_payment: simulation.down_payment,
        wealth_breakeven_year: simulation.wealth_breakeven_year,
        cost_breakeven_year: simulation.cost_breakeven_year,
        verdict,
        breakeven_text,
        final_wealth_diff,
        final_cost_diff,
    }
}

/// `(equity - portfolio, rent net cost - buy net cost)` for the final year.
fn final_diffs(last: Option<&YearlyRecord>) -> (f64, f64) {
    match last {
        Some(last) => (
            last.equity_if_sold_now - last.renter_portfolio_value,
            last.rent_net_cost - last.net_buy_cost,
        ),
        None => (0.0, 0.0),
    }
}

fn wealth_verdict(diff: f64, horizon_years: u32) -> String {
    let span = years_phrase(horizon_years);
    if diff.abs() < TIE_THRESHOLD {
        format!("Renting and buying finish level ($0 apart) after {span}.")
    } else if diff > 0.0 {
        format!(
            "Buying leaves you {} wealthier than renting after {span}.",
            format_currency(diff)
        )
    } else {
        format!(
            "Renting leaves you {} wealthier than buying after {span}.",
            format_currency(diff)
        )
    }
}

fn cost_verdict(diff: f64, horizon_years: u32) -> String {
    let span = years_phrase(horizon_years);
    if diff.abs() < TIE_THRESHOLD {
        format!("Renting and buying cost the same ($0 apart) over {span}.")
    } else if diff > 0.0 {
        format!(
            "Buying costs {} less than renting over {span}.",
            format_currency(diff)
        )
    } else {
        format!(
            "Renting costs {} less than buying over {span}.",
            format_currency(diff)
        )
    }
}

fn wealth_breakeven_text(year: Option<u32>, horizon_years: u32) -> String {
    match year {
        Some(year) => {
            format!("Home equity first overtakes the renter's portfolio in year {year}.")
        }
        None => format!(
            "Home equity never overtakes the renter's portfolio within {}.",
            years_phrase(horizon_years)
        ),
    }
}

fn cost_breakeven_text(year: Option<u32>, horizon_years: u32) -> String {
    match year {
        Some(year) => format!("Buying first becomes cheaper than renting in year {year}."),
        None => format!(
            "Buying never becomes cheaper than renting within {}.",
            years_phrase(horizon_years)
        ),
    }
}

fn years_phrase(years: u32) -> String {
    if years == 1 {
        "1 year".to_string()
    } else {
        format!("{years} years")
    }
}

/// Whole-dollar magnitude with thousands separators, e.g. `$1,234,567`. The sign is dropped;
/// callers phrase direction in words.
pub fn format_currency(amount: f64) -> String {
    let dollars = if amount.is_finite() {
        amount.abs().round()
    } else {
        0.0
    };
    let digits = format!("{dollars:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (idx, ch) in digits.chars().enumerate() {
        if idx > 0 && (digits.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("${grouped}")
}
