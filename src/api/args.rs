use clap::{Args, ValueEnum};

use crate::core::{
    Assumptions, GoalSolveConfig, GoalType, MAX_HORIZON_YEARS, MIN_HORIZON_YEARS, ViewMode,
    whole_years,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliViewMode {
    Wealth,
    Cost,
}

impl From<CliViewMode> for ViewMode {
    fn from(value: CliViewMode) -> Self {
        match value {
            CliViewMode::Wealth => ViewMode::Wealth,
            CliViewMode::Cost => ViewMode::Cost,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliGoalType {
    Rent,
    HomeGrowth,
}

impl From<CliGoalType> for GoalType {
    fn from(value: CliGoalType) -> Self {
        match value {
            CliGoalType::Rent => GoalType::Rent,
            CliGoalType::HomeGrowth => GoalType::HomeGrowth,
        }
    }
}

/// Projection assumptions as entered by a person. Rates are percentages.
#[derive(Args, Debug, Clone)]
pub struct ProjectArgs {
    #[arg(long, default_value_t = 20.0, help = "Years to project, clamped to 1-50")]
    pub years: f64,
    #[arg(long, default_value_t = 2500.0, help = "Current monthly rent")]
    pub rent_monthly: f64,
    #[arg(
        long,
        default_value_t = 3.0,
        help = "Annual rent increase in percent, applied once per year"
    )]
    pub rent_growth: f64,
    #[arg(long, default_value_t = 600_000.0)]
    pub home_price: f64,
    #[arg(long, default_value_t = 20.0, help = "Down payment in percent of price")]
    pub down_payment: f64,
    #[arg(long, default_value_t = 5.0, help = "Mortgage annual rate in percent")]
    pub mortgage_rate: f64,
    #[arg(long, default_value_t = 25.0, help = "Amortization term in years")]
    pub amort_years: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Property tax per year in percent of home value"
    )]
    pub property_tax: f64,
    #[arg(
        long,
        default_value_t = 1.0,
        help = "Maintenance per year in percent of home value"
    )]
    pub maintenance: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual home appreciation in percent")]
    pub home_growth: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Selling costs in percent of sale price"
    )]
    pub selling_cost: f64,
    #[arg(
        long,
        default_value_t = 6.0,
        help = "Annual investment return in percent, compounded monthly"
    )]
    pub invest_return: f64,
    #[arg(long, value_enum, default_value_t = CliViewMode::Wealth)]
    pub view_mode: CliViewMode,
}

#[derive(Args, Debug, Clone)]
pub struct SolveArgs {
    #[command(flatten)]
    pub project: ProjectArgs,
    #[arg(long, value_enum, help = "Assumption to solve for")]
    pub goal: CliGoalType,
    #[arg(
        long,
        help = "Lower search bound (dollars for rent, percent for home growth)"
    )]
    pub search_min: Option<f64>,
    #[arg(
        long,
        help = "Upper search bound (dollars for rent, percent for home growth)"
    )]
    pub search_max: Option<f64>,
    #[arg(long, help = "Stop once the bracket is narrower than this")]
    pub tolerance: Option<f64>,
    #[arg(long, default_value_t = 60)]
    pub max_iterations: u32,
}

pub fn default_project_args() -> ProjectArgs {
    ProjectArgs {
        years: 20.0,
        rent_monthly: 2_500.0,
        rent_growth: 3.0,
        home_price: 600_000.0,
        down_payment: 20.0,
        mortgage_rate: 5.0,
        amort_years: 25.0,
        property_tax: 1.0,
        maintenance: 1.0,
        home_growth: 3.0,
        selling_cost: 5.0,
        invest_return: 6.0,
        view_mode: CliViewMode::Wealth,
    }
}

pub fn build_assumptions(args: &ProjectArgs) -> Assumptions {
    Assumptions {
        horizon_years: whole_years(args.years, MIN_HORIZON_YEARS, MAX_HORIZON_YEARS),
        rent_monthly: args.rent_monthly,
        rent_growth_rate: args.rent_growth / 100.0,
        home_price: args.home_price,
        down_payment_rate: args.down_payment / 100.0,
        mortgage_rate: args.mortgage_rate / 100.0,
        amortization_years: whole_years(args.amort_years, 1, u32::MAX),
        property_tax_rate: args.property_tax / 100.0,
        maintenance_rate: args.maintenance / 100.0,
        home_growth_rate: args.home_growth / 100.0,
        selling_cost_rate: args.selling_cost / 100.0,
        invest_return_rate: args.invest_return / 100.0,
        view_mode: args.view_mode.into(),
    }
}

/// Factor between the units a person enters for a goal and the engine's units.
pub fn goal_unit_scale(goal: GoalType) -> f64 {
    match goal {
        GoalType::Rent => 1.0,
        GoalType::HomeGrowth => 100.0,
    }
}

/// `(search_min, search_max, tolerance)` in entered units.
pub fn default_search(goal: GoalType) -> (f64, f64, f64) {
    match goal {
        GoalType::Rent => (0.0, 20_000.0, 1.0),
        GoalType::HomeGrowth => (-10.0, 20.0, 0.01),
    }
}

pub fn build_solve_config(args: &SolveArgs) -> (Assumptions, GoalSolveConfig) {
    let assumptions = build_assumptions(&args.project);
    let goal_type: GoalType = args.goal.into();
    let (default_min, default_max, default_tolerance) = default_search(goal_type);
    let scale = goal_unit_scale(goal_type);

    let config = GoalSolveConfig {
        goal_type,
        view_mode: assumptions.view_mode,
        search_min: args.search_min.unwrap_or(default_min) / scale,
        search_max: args.search_max.unwrap_or(default_max) / scale,
        tolerance: args.tolerance.unwrap_or(default_tolerance) / scale,
        max_iterations: args.max_iterations,
    };
    (assumptions, config)
}
