use serde::Serialize;

pub const MIN_HORIZON_YEARS: u32 = 1;
pub const MAX_HORIZON_YEARS: u32 = 50;
pub const MONTHS_PER_YEAR: u32 = 12;

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Wealth,
    Cost,
}

/// Flat set of scalar assumptions for one projection run. Rates are fractions (0.05 = 5%).
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub horizon_years: u32,
    pub rent_monthly: f64,
    pub rent_growth_rate: f64,
    pub home_price: f64,
    pub down_payment_rate: f64,
    pub mortgage_rate: f64,
    pub amortization_years: u32,
    pub property_tax_rate: f64,
    pub maintenance_rate: f64,
    pub home_growth_rate: f64,
    pub selling_cost_rate: f64,
    pub invest_return_rate: f64,
    pub view_mode: ViewMode,
}

impl Assumptions {
    /// Coerces every field into the engine's domain: non-finite numbers become 0, the horizon is
    /// clamped to 1..=50 and the amortization term is at least one year.
    ///
    /// Amounts and cost rates cannot go below zero, fractions of the price stay within 0..=1 and
    /// growth rates cannot fall below -100%.
    pub fn normalized(&self) -> Self {
        Self {
            horizon_years: self
                .horizon_years
                .clamp(MIN_HORIZON_YEARS, MAX_HORIZON_YEARS),
            rent_monthly: finite_or_zero(self.rent_monthly).max(0.0),
            rent_growth_rate: finite_or_zero(self.rent_growth_rate).max(-1.0),
            home_price: finite_or_zero(self.home_price).max(0.0),
            down_payment_rate: finite_or_zero(self.down_payment_rate).clamp(0.0, 1.0),
            mortgage_rate: finite_or_zero(self.mortgage_rate).max(0.0),
            amortization_years: self.amortization_years.max(1),
            property_tax_rate: finite_or_zero(self.property_tax_rate).max(0.0),
            maintenance_rate: finite_or_zero(self.maintenance_rate).max(0.0),
            home_growth_rate: finite_or_zero(self.home_growth_rate).max(-1.0),
            selling_cost_rate: finite_or_zero(self.selling_cost_rate).clamp(0.0, 1.0),
            invest_return_rate: finite_or_zero(self.invest_return_rate).max(-1.0),
            view_mode: self.view_mode,
        }
    }

    pub fn down_payment(&self) -> f64 {
        self.home_price * self.down_payment_rate
    }

    pub fn loan_principal(&self) -> f64 {
        (self.home_price - self.down_payment()).max(0.0)
    }
}

/// Converts a raw (possibly fractional or non-finite) year count into a whole number of years
/// within `min..=max`.
pub fn whole_years(raw: f64, min: u32, max: u32) -> u32 {
    if !raw.is_finite() {
        return min;
    }
    let floored = raw.floor();
    if floored <= min as f64 {
        min
    } else if floored >= max as f64 {
        max
    } else {
        floored as u32
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct YearlyRecord {
    pub year: u32,
    pub rent_paid_cumulative: f64,
    pub renter_portfolio_value: f64,
    pub rent_net_cost: f64,
    pub buy_cash_cumulative: f64,
    pub equity_if_sold_now: f64,
    pub net_buy_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Projection {
    pub records: Vec<YearlyRecord>,
    pub monthly_mortgage_payment: f64,
    pub down_payment: f64,
    pub wealth_breakeven_year: Option<u32>,
    pub cost_breakeven_year: Option<u32>,
    pub verdict: String,
    pub breakeven_text: String,
    pub final_wealth_diff: f64,
    pub final_cost_diff: f64,
}

impl Projection {
    /// Record for `year`, clamped into the simulated range.
    pub fn record_for_year(&self, year: u32) -> Option<&YearlyRecord> {
        let last = self.records.len() as u32;
        if last == 0 {
            return None;
        }
        let idx = year.clamp(1, last) - 1;
        self.records.get(idx as usize)
    }

    pub fn headline_diff(&self, view_mode: ViewMode) -> f64 {
        match view_mode {
            ViewMode::Wealth => self.final_wealth_diff,
            ViewMode::Cost => self.final_cost_diff,
        }
    }

    pub fn headline_breakeven_year(&self, view_mode: ViewMode) -> Option<u32> {
        match view_mode {
            ViewMode::Wealth => self.wealth_breakeven_year,
            ViewMode::Cost => self.cost_breakeven_year,
        }
    }
}
