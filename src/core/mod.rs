mod amortization;
mod engine;
mod solver;
mod summary;
mod types;

pub use amortization::monthly_payment;
pub use engine::{
    LedgerState, MonthStep, Simulation, rent_for_year, run_projection, simulate, simulate_month,
};
pub use solver::{
    GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, MAX_SOLVE_ITERATIONS, solve_goal,
};
pub use summary::{derive_projection, format_currency};
pub use types::{
    Assumptions, MAX_HORIZON_YEARS, MIN_HORIZON_YEARS, MONTHS_PER_YEAR, Projection, ViewMode,
    YearlyRecord, whole_years,
};
