//! Plain-text rendering of projections and solver results for the command line.

use std::fmt::Write;

use crate::core::{GoalSolveResult, GoalType, Projection, format_currency};

pub fn render_projection(projection: &Projection) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4} | {:>14} | {:>14} | {:>14} | {:>14} | {:>14} | {:>14}",
        "Year", "Rent paid", "Portfolio", "Rent net cost", "Buy cash", "Equity", "Buy net cost"
    );
    let _ = writeln!(out, "{}", "-".repeat(4 + 6 * 17));
    for r in &projection.records {
        let _ = writeln!(
            out,
            "{:>4} | {:>14} | {:>14} | {:>14} | {:>14} | {:>14} | {:>14}",
            r.year,
            signed_currency(r.rent_paid_cumulative),
            signed_currency(r.renter_portfolio_value),
            signed_currency(r.rent_net_cost),
            signed_currency(r.buy_cash_cumulative),
            signed_currency(r.equity_if_sold_now),
            signed_currency(r.net_buy_cost),
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Monthly mortgage payment: {}",
        format_currency(projection.monthly_mortgage_payment)
    );
    let _ = writeln!(out, "Down payment: {}", format_currency(projection.down_payment));
    let _ = writeln!(out, "{}", projection.verdict);
    let _ = writeln!(out, "{}", projection.breakeven_text);
    out
}

pub fn render_solve(result: &GoalSolveResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", result.message);
    if let Some(value) = result.solved_value {
        let shown = match result.goal_type {
            GoalType::Rent => format!("starting rent {}/month", format_currency(value)),
            GoalType::HomeGrowth => format!("home appreciation {:.2}%/year", value * 100.0),
        };
        let _ = writeln!(out, "Breakeven at {shown}");
    }
    if let Some(advantage) = result.achieved_advantage {
        let _ = writeln!(out, "Buying advantage there: {}", signed_currency(advantage));
    }
    if let Some(year) = result.breakeven_year {
        let _ = writeln!(out, "Buying first pulls ahead in year {year}");
    }
    let _ = writeln!(
        out,
        "Iterations: {} (converged: {})",
        result.iterations.len(),
        result.converged
    );
    out
}

fn signed_currency(amount: f64) -> String {
    if amount < -0.5 {
        format!("-{}", format_currency(amount))
    } else {
        format_currency(amount)
    }
}
