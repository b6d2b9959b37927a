use super::amortization::monthly_payment;
use super::summary::derive_projection;
use super::types::{Assumptions, MONTHS_PER_YEAR, Projection, YearlyRecord};

/// Mortgage and renter-portfolio balances carried between months. Each step returns a new value;
/// nothing is mutated in place.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedgerState {
    pub balance: f64,
    /// Home value at the start of the current year. Only [`close_year`] moves it.
    pub home_value: f64,
    pub portfolio: f64,
}

impl LedgerState {
    pub fn at_origination(assumptions: &Assumptions) -> Self {
        Self {
            balance: assumptions.loan_principal(),
            home_value: assumptions.home_price,
            portfolio: assumptions.down_payment(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonthStep {
    pub rent: f64,
    pub owner_cash: f64,
    pub interest: f64,
    pub principal: f64,
    pub state: LedgerState,
}

/// Everything a full run produces before any summary text is derived.
#[derive(Debug, Clone, PartialEq)]
pub struct Simulation {
    pub records: Vec<YearlyRecord>,
    pub monthly_mortgage_payment: f64,
    pub down_payment: f64,
    pub wealth_breakeven_year: Option<u32>,
    pub cost_breakeven_year: Option<u32>,
}

#[derive(Debug, Clone, Copy)]
struct RunState {
    ledger: LedgerState,
    rent_paid_cumulative: f64,
    buy_cash_cumulative: f64,
    wealth_breakeven_year: Option<u32>,
    cost_breakeven_year: Option<u32>,
}

pub fn run_projection(assumptions: &Assumptions) -> Projection {
    let assumptions = assumptions.normalized();
    let simulation = simulate(&assumptions);
    log::debug!(
        "projection: horizon={} payment={:.2} wealth_breakeven={:?} cost_breakeven={:?}",
        assumptions.horizon_years,
        simulation.monthly_mortgage_payment,
        simulation.wealth_breakeven_year,
        simulation.cost_breakeven_year
    );
    derive_projection(simulation, assumptions.horizon_years, assumptions.view_mode)
}

/// Runs the month-by-month model over the full horizon. Expects normalized assumptions.
pub fn simulate(assumptions: &Assumptions) -> Simulation {
    let payment = monthly_payment(
        assumptions.loan_principal(),
        assumptions.mortgage_rate,
        assumptions.amortization_years as f64,
    );
    let down_payment = assumptions.down_payment();

    let initial = RunState {
        ledger: LedgerState::at_origination(assumptions),
        rent_paid_cumulative: 0.0,
        buy_cash_cumulative: down_payment,
        wealth_breakeven_year: None,
        cost_breakeven_year: None,
    };

    let mut records = Vec::with_capacity(assumptions.horizon_years as usize);
    let last = (1..=assumptions.horizon_years).fold(initial, |run, year| {
        let (next, record) = simulate_year(year, run, payment, assumptions);
        records.push(record);
        next
    });

    Simulation {
        records,
        monthly_mortgage_payment: payment,
        down_payment,
        wealth_breakeven_year: last.wealth_breakeven_year,
        cost_breakeven_year: last.cost_breakeven_year,
    }
}

/// Advances both paths by one month of `year` (1-based).
pub fn simulate_month(
    year: u32,
    state: LedgerState,
    payment: f64,
    assumptions: &Assumptions,
) -> MonthStep {
    let rent = rent_for_year(assumptions, year);

    let interest = state.balance * assumptions.mortgage_rate / MONTHS_PER_YEAR as f64;
    let principal = (payment - interest).max(0.0);
    let balance = (state.balance - principal).max(0.0);

    let carrying = state.home_value
        * (assumptions.property_tax_rate + assumptions.maintenance_rate)
        / MONTHS_PER_YEAR as f64;
    // The fixed payment keeps being charged after the loan is retired.
    let owner_cash = payment + carrying;

    let monthly_return = assumptions.invest_return_rate / MONTHS_PER_YEAR as f64;
    // Withdrawals stop at an empty portfolio; the renter covers any remaining rent from income.
    let portfolio = (state.portfolio * (1.0 + monthly_return) + (owner_cash - rent)).max(0.0);

    MonthStep {
        rent,
        owner_cash,
        interest,
        principal,
        state: LedgerState {
            balance,
            home_value: state.home_value,
            portfolio,
        },
    }
}

pub fn rent_for_year(assumptions: &Assumptions, year: u32) -> f64 {
    let steps = year.saturating_sub(1) as i32;
    (assumptions.rent_monthly * (1.0 + assumptions.rent_growth_rate).powi(steps)).max(0.0)
}

fn simulate_year(
    year: u32,
    run: RunState,
    payment: f64,
    assumptions: &Assumptions,
) -> (RunState, YearlyRecord) {
    let (ledger, rent_paid, owner_cash) = (0..MONTHS_PER_YEAR).fold(
        (run.ledger, 0.0, 0.0),
        |(ledger, rent_paid, owner_cash), _| {
            let step = simulate_month(year, ledger, payment, assumptions);
            (
                step.state,
                rent_paid + step.rent,
                owner_cash + step.owner_cash,
            )
        },
    );

    let ledger = close_year(ledger, assumptions);
    let rent_paid_cumulative = run.rent_paid_cumulative + rent_paid;
    let buy_cash_cumulative = run.buy_cash_cumulative + owner_cash;
    let equity = equity_if_sold(ledger, assumptions.selling_cost_rate);

    let record = YearlyRecord {
        year,
        rent_paid_cumulative,
        renter_portfolio_value: ledger.portfolio,
        rent_net_cost: rent_paid_cumulative - ledger.portfolio,
        buy_cash_cumulative,
        equity_if_sold_now: equity,
        net_buy_cost: buy_cash_cumulative - equity,
    };

    let next = RunState {
        ledger,
        rent_paid_cumulative,
        buy_cash_cumulative,
        wealth_breakeven_year: first_occurrence(
            run.wealth_breakeven_year,
            year,
            record.equity_if_sold_now > record.renter_portfolio_value,
        ),
        cost_breakeven_year: first_occurrence(
            run.cost_breakeven_year,
            year,
            record.net_buy_cost < record.rent_net_cost,
        ),
    };
    (next, record)
}

/// Year-end appreciation. The home value compounds once, after all twelve months.
fn close_year(ledger: LedgerState, assumptions: &Assumptions) -> LedgerState {
    LedgerState {
        home_value: (ledger.home_value * (1.0 + assumptions.home_growth_rate)).max(0.0),
        ..ledger
    }
}

fn equity_if_sold(ledger: LedgerState, selling_cost_rate: f64) -> f64 {
    (ledger.home_value * (1.0 - selling_cost_rate) - ledger.balance).max(0.0)
}

fn first_occurrence(found: Option<u32>, year: u32, holds: bool) -> Option<u32> {
    found.or(holds.then_some(year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ViewMode;
    use proptest::prelude::{prop_assert, prop_assert_eq, proptest};

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_assumptions() -> Assumptions {
        Assumptions {
            horizon_years: 20,
            rent_monthly: 2_500.0,
            rent_growth_rate: 0.03,
            home_price: 600_000.0,
            down_payment_rate: 0.20,
            mortgage_rate: 0.05,
            amortization_years: 25,
            property_tax_rate: 0.01,
            maintenance_rate: 0.01,
            home_growth_rate: 0.03,
            selling_cost_rate: 0.05,
            invest_return_rate: 0.06,
            view_mode: ViewMode::Wealth,
        }
    }

    fn zero_growth_assumptions() -> Assumptions {
        Assumptions {
            horizon_years: 2,
            rent_monthly: 1_000.0,
            rent_growth_rate: 0.0,
            home_price: 120_000.0,
            down_payment_rate: 0.0,
            mortgage_rate: 0.0,
            amortization_years: 10,
            property_tax_rate: 0.0,
            maintenance_rate: 0.0,
            home_growth_rate: 0.0,
            selling_cost_rate: 0.0,
            invest_return_rate: 0.0,
            view_mode: ViewMode::Wealth,
        }
    }

    #[test]
    fn reference_scenario_produces_positive_equity_and_grown_portfolio() {
        let projection = run_projection(&sample_assumptions());
        assert_eq!(projection.records.len(), 20);

        let last = projection.records.last().expect("final record");
        assert_eq!(last.year, 20);
        assert!(last.equity_if_sold_now > 0.0);
        assert!(last.renter_portfolio_value > projection.down_payment);
        assert_approx(projection.down_payment, 120_000.0);
        assert!((projection.monthly_mortgage_payment - 2_806.0).abs() < 1.0);
        assert!(projection.verdict.contains('$'));
    }

    #[test]
    fn zero_rate_month_splits_payment_into_principal_only() {
        let assumptions = zero_growth_assumptions();
        let state = LedgerState::at_origination(&assumptions);
        let payment = monthly_payment(assumptions.loan_principal(), 0.0, 10.0);

        let step = simulate_month(1, state, payment, &assumptions);
        assert_approx(step.interest, 0.0);
        assert_approx(step.principal, 1_000.0);
        assert_approx(step.state.balance, 119_000.0);
        assert_approx(step.owner_cash, 1_000.0);
        assert_approx(step.rent, 1_000.0);
        assert_approx(step.state.portfolio, 0.0);
    }

    #[test]
    fn growth_applies_before_the_monthly_contribution() {
        let mut assumptions = zero_growth_assumptions();
        assumptions.invest_return_rate = 0.12;
        assumptions.rent_monthly = 0.0;
        let state = LedgerState {
            balance: 0.0,
            home_value: 0.0,
            portfolio: 1_000.0,
        };

        let step = simulate_month(1, state, 500.0, &assumptions);
        // A retired loan still charges the fixed payment.
        assert_approx(step.owner_cash, 500.0);
        assert_approx(step.state.balance, 0.0);
        assert_approx(step.interest, 0.0);
        assert_approx(step.state.portfolio, 1_510.0);

        let funded = LedgerState {
            balance: 10_000.0,
            ..state
        };
        let step = simulate_month(1, funded, 500.0, &assumptions);
        assert_approx(step.owner_cash, 500.0);
        assert_approx(step.state.portfolio, 1_510.0);
    }

    #[test]
    fn rent_steps_annually_not_monthly() {
        let assumptions = sample_assumptions();
        assert_approx(rent_for_year(&assumptions, 1), 2_500.0);
        assert_approx(rent_for_year(&assumptions, 2), 2_575.0);
        assert_approx(rent_for_year(&assumptions, 3), 2_500.0 * 1.03 * 1.03);

        let simulation = simulate(&assumptions.normalized());
        assert_approx(simulation.records[0].rent_paid_cumulative, 30_000.0);
        assert_approx(
            simulation.records[1].rent_paid_cumulative,
            30_000.0 + 12.0 * 2_575.0,
        );
    }

    #[test]
    fn carrying_costs_use_start_of_year_home_value() {
        let mut assumptions = zero_growth_assumptions();
        assumptions.down_payment_rate = 1.0;
        assumptions.property_tax_rate = 0.012;
        assumptions.maintenance_rate = 0.0;
        assumptions.home_growth_rate = 0.10;

        let simulation = simulate(&assumptions.normalized());
        let year_one_cash = simulation.records[0].buy_cash_cumulative - 120_000.0;
        let year_two_cash = simulation.records[1].buy_cash_cumulative
            - simulation.records[0].buy_cash_cumulative;
        assert_approx(year_one_cash, 1_440.0);
        assert_approx(year_two_cash, 1_584.0);
    }

    #[test]
    fn home_value_compounds_once_at_year_end() {
        let mut assumptions = zero_growth_assumptions();
        assumptions.down_payment_rate = 1.0;
        assumptions.home_growth_rate = 0.10;
        assumptions.horizon_years = 1;

        let simulation = simulate(&assumptions.normalized());
        assert_approx(simulation.records[0].equity_if_sold_now, 132_000.0);
    }

    #[test]
    fn equity_is_floored_when_sale_would_be_underwater() {
        let mut assumptions = sample_assumptions();
        assumptions.down_payment_rate = 0.0;
        assumptions.home_growth_rate = -0.30;
        assumptions.selling_cost_rate = 0.08;

        let projection = run_projection(&assumptions);
        for record in &projection.records {
            assert!(record.equity_if_sold_now >= 0.0);
        }
        assert_approx(projection.records[0].equity_if_sold_now, 0.0);
    }

    #[test]
    fn loan_retired_before_horizon_keeps_charging_the_payment() {
        let mut assumptions = zero_growth_assumptions();
        assumptions.amortization_years = 1;
        assumptions.horizon_years = 3;

        let simulation = simulate(&assumptions.normalized());
        assert_approx(simulation.monthly_mortgage_payment, 10_000.0);
        assert_approx(simulation.records[0].buy_cash_cumulative, 120_000.0);
        assert_approx(simulation.records[1].buy_cash_cumulative, 240_000.0);
        assert_approx(simulation.records[2].buy_cash_cumulative, 360_000.0);
        assert_approx(simulation.records[2].equity_if_sold_now, 120_000.0);
        // 9,000 a month is invested on the renter side in every year, retired loan or not.
        assert_approx(simulation.records[2].renter_portfolio_value, 36.0 * 9_000.0);
    }

    #[test]
    fn reference_payment_is_charged_past_the_amortization_term() {
        let mut assumptions = sample_assumptions();
        assumptions.horizon_years = 30;

        let projection = run_projection(&assumptions);
        let payment_per_year = projection.monthly_mortgage_payment * 12.0;
        for year in 26..=30usize {
            let delta = projection.records[year - 1].buy_cash_cumulative
                - projection.records[year - 2].buy_cash_cumulative;
            assert!(
                delta > payment_per_year,
                "year {year}: buy cash grew {delta}, payment alone is {payment_per_year}"
            );
        }
    }

    #[test]
    fn renter_portfolio_is_floored_when_rent_exceeds_owner_cash() {
        let mut assumptions = zero_growth_assumptions();
        assumptions.rent_monthly = 1_500.0;
        let state = LedgerState::at_origination(&assumptions);
        assert_approx(state.portfolio, 0.0);
        let payment = monthly_payment(assumptions.loan_principal(), 0.0, 10.0);

        // Owner cash is 1,000 against 1,500 of rent: the unfloored update would be -500.
        let step = simulate_month(1, state, payment, &assumptions);
        assert_approx(step.owner_cash, 1_000.0);
        assert_approx(step.state.portfolio, 0.0);

        let simulation = simulate(&assumptions.normalized());
        for record in &simulation.records {
            assert_approx(record.renter_portfolio_value, 0.0);
            assert_approx(record.rent_net_cost, record.rent_paid_cumulative);
        }
    }

    #[test]
    fn first_occurrence_never_overwrites() {
        assert_eq!(first_occurrence(None, 4, false), None);
        assert_eq!(first_occurrence(None, 4, true), Some(4));
        assert_eq!(first_occurrence(Some(3), 5, true), Some(3));
        assert_eq!(first_occurrence(Some(3), 5, false), Some(3));
    }

    #[test]
    fn view_mode_does_not_change_records() {
        let wealth = run_projection(&sample_assumptions());
        let mut cost_assumptions = sample_assumptions();
        cost_assumptions.view_mode = ViewMode::Cost;
        let cost = run_projection(&cost_assumptions);

        assert_eq!(wealth.records, cost.records);
        assert_eq!(wealth.wealth_breakeven_year, cost.wealth_breakeven_year);
        assert_eq!(wealth.cost_breakeven_year, cost.cost_breakeven_year);
        assert_ne!(wealth.verdict, cost.verdict);
    }

    #[test]
    fn identical_inputs_produce_identical_output() {
        let first = run_projection(&sample_assumptions());
        let second = run_projection(&sample_assumptions());
        assert_eq!(first, second);
    }

    #[test]
    fn horizon_is_clamped_into_range() {
        let mut assumptions = sample_assumptions();
        assumptions.horizon_years = 0;
        assert_eq!(run_projection(&assumptions).records.len(), 1);
        assumptions.horizon_years = 500;
        assert_eq!(run_projection(&assumptions).records.len(), 50);
    }

    #[test]
    fn non_finite_inputs_are_coerced_to_zero() {
        let mut assumptions = sample_assumptions();
        assumptions.mortgage_rate = f64::NAN;
        assumptions.invest_return_rate = f64::INFINITY;
        assumptions.rent_growth_rate = f64::NEG_INFINITY;

        let projection = run_projection(&assumptions);
        assert_approx(projection.monthly_mortgage_payment, 480_000.0 / 300.0);
        for record in &projection.records {
            assert!(record.renter_portfolio_value.is_finite());
            assert!(record.rent_paid_cumulative.is_finite());
        }
        assert_approx(projection.records[1].rent_paid_cumulative, 60_000.0);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_projection_invariants_hold(
            horizon in 0u32..60,
            rent in 0u32..10_000,
            rent_growth_bp in -500i32..1_500,
            price in 0u32..2_000_000,
            down_bp in 0u32..10_001,
            mortgage_bp in 0u32..1_500,
            amort in 0u32..40,
            tax_bp in 0u32..400,
            maintenance_bp in 0u32..400,
            home_growth_bp in -3_000i32..1_500,
            selling_bp in 0u32..1_500,
            invest_bp in -1_000i32..1_500
        ) {
            let assumptions = Assumptions {
                horizon_years: horizon,
                rent_monthly: rent as f64,
                rent_growth_rate: rent_growth_bp as f64 / 10_000.0,
                home_price: price as f64,
                down_payment_rate: down_bp as f64 / 10_000.0,
                mortgage_rate: mortgage_bp as f64 / 10_000.0,
                amortization_years: amort,
                property_tax_rate: tax_bp as f64 / 10_000.0,
                maintenance_rate: maintenance_bp as f64 / 10_000.0,
                home_growth_rate: home_growth_bp as f64 / 10_000.0,
                selling_cost_rate: selling_bp as f64 / 10_000.0,
                invest_return_rate: invest_bp as f64 / 10_000.0,
                view_mode: ViewMode::Wealth,
            };
            let projection = run_projection(&assumptions);
            let expected_len = horizon.clamp(1, 50) as usize;

            prop_assert_eq!(projection.records.len(), expected_len);
            prop_assert!(projection.monthly_mortgage_payment >= 0.0);
            prop_assert!(projection.monthly_mortgage_payment.is_finite());

            for (idx, record) in projection.records.iter().enumerate() {
                prop_assert_eq!(record.year as usize, idx + 1);
                prop_assert!(record.equity_if_sold_now >= 0.0);
                prop_assert!(record.renter_portfolio_value >= 0.0);
                prop_assert!(record.rent_paid_cumulative >= 0.0);
                prop_assert!(record.buy_cash_cumulative >= 0.0);
                if idx > 0 {
                    let prev = &projection.records[idx - 1];
                    prop_assert!(record.rent_paid_cumulative >= prev.rent_paid_cumulative);
                    prop_assert!(record.buy_cash_cumulative >= prev.buy_cash_cumulative);
                }
            }

            // Breakeven years are the first year the relation holds, never a later one.
            if let Some(year) = projection.wealth_breakeven_year {
                let idx = year as usize - 1;
                let hit = &projection.records[idx];
                prop_assert!(hit.equity_if_sold_now > hit.renter_portfolio_value);
                for earlier in &projection.records[..idx] {
                    prop_assert!(earlier.equity_if_sold_now <= earlier.renter_portfolio_value);
                }
            } else {
                for record in &projection.records {
                    prop_assert!(record.equity_if_sold_now <= record.renter_portfolio_value);
                }
            }
            if let Some(year) = projection.cost_breakeven_year {
                let idx = year as usize - 1;
                let hit = &projection.records[idx];
                prop_assert!(hit.net_buy_cost < hit.rent_net_cost);
                for earlier in &projection.records[..idx] {
                    prop_assert!(earlier.net_buy_cost >= earlier.rent_net_cost);
                }
            }
        }
    }
}
