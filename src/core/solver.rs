use serde::Serialize;

use super::{Assumptions, ViewMode, run_projection};
use crate::error::SolveError;

/// Upper bound on bisection steps. Sixty already narrows any finite range past f64 precision.
pub const MAX_SOLVE_ITERATIONS: u32 = 200;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GoalType {
    /// Starting monthly rent, in dollars.
    Rent,
    /// Annual home appreciation, as a fraction.
    HomeGrowth,
}

#[derive(Debug, Clone, Copy)]
pub struct GoalSolveConfig {
    pub goal_type: GoalType,
    pub view_mode: ViewMode,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalSolveIteration {
    pub iteration: u32,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub candidate_value: f64,
    pub advantage: f64,
}

#[derive(Debug, Clone)]
pub struct GoalSolveResult {
    pub goal_type: GoalType,
    pub view_mode: ViewMode,
    pub search_min: f64,
    pub search_max: f64,
    pub tolerance: f64,
    pub max_iterations: u32,
    pub solved_value: Option<f64>,
    pub achieved_advantage: Option<f64>,
    pub breakeven_year: Option<u32>,
    pub iterations: Vec<GoalSolveIteration>,
    pub converged: bool,
    pub feasible: bool,
    pub message: String,
}

/// Finds the smallest value of the goal's assumption at which buying's final advantage in the
/// configured view is non-negative. Assumes the advantage does not decrease as the value grows,
/// which holds for rent and for any realistic appreciation range.
pub fn solve_goal(
    assumptions: &Assumptions,
    config: GoalSolveConfig,
) -> Result<GoalSolveResult, SolveError> {
    validate_config(config)?;

    let mut iterations = Vec::new();
    let low_eval = evaluate_candidate(assumptions, config, config.search_min);
    let high_eval = evaluate_candidate(assumptions, config, config.search_max);

    let mut solved_value = None;
    let mut converged = false;
    let feasible;
    let message;

    if low_eval.advantage >= 0.0 {
        solved_value = Some(config.search_min);
        converged = true;
        feasible = true;
        message = "Buying already wins at the lower search bound.".to_string();
    } else if high_eval.advantage < 0.0 {
        feasible = false;
        message = "Buying still loses at the upper search bound; widen the search.".to_string();
    } else {
        let mut lo = config.search_min;
        let mut hi = config.search_max;
        let mut it = 0;
        while it < config.max_iterations {
            it += 1;
            let mid = (lo + hi) * 0.5;
            let eval = evaluate_candidate(assumptions, config, mid);
            log::debug!(
                "solve {:?}: iteration={it} lo={lo:.6} hi={hi:.6} mid={mid:.6} advantage={:.2}",
                config.goal_type,
                eval.advantage
            );
            iterations.push(GoalSolveIteration {
                iteration: it,
                lower_bound: lo,
                upper_bound: hi,
                candidate_value: mid,
                advantage: eval.advantage,
            });

            if eval.advantage >= 0.0 {
                hi = mid;
            } else {
                lo = mid;
            }

            if (hi - lo).abs() <= config.tolerance {
                converged = true;
                break;
            }
        }
        solved_value = Some(hi);
        feasible = true;
        message = if converged {
            "Solved breakeven value.".to_string()
        } else {
            "Reached max iterations before tolerance was met; returning best estimate.".to_string()
        };
    }

    let mut achieved_advantage = None;
    let mut breakeven_year = None;
    if let Some(value) = solved_value {
        let eval = evaluate_candidate(assumptions, config, value);
        achieved_advantage = Some(eval.advantage);
        breakeven_year = eval.breakeven_year;
    }

    log::info!(
        "solve {:?}: feasible={feasible} converged={converged} value={:?} iterations={}",
        config.goal_type,
        solved_value,
        iterations.len()
    );

    Ok(GoalSolveResult {
        goal_type: config.goal_type,
        view_mode: config.view_mode,
        search_min: config.search_min,
        search_max: config.search_max,
        tolerance: config.tolerance,
        max_iterations: config.max_iterations,
        solved_value,
        achieved_advantage,
        breakeven_year,
        iterations,
        converged,
        feasible,
        message,
    })
}

#[derive(Debug, Clone, Copy)]
struct CandidateEval {
    advantage: f64,
    breakeven_year: Option<u32>,
}

fn evaluate_candidate(
    base: &Assumptions,
    config: GoalSolveConfig,
    candidate_value: f64,
) -> CandidateEval {
    let mut assumptions = base.clone();
    assumptions.view_mode = config.view_mode;
    match config.goal_type {
        GoalType::Rent => assumptions.rent_monthly = candidate_value,
        GoalType::HomeGrowth => assumptions.home_growth_rate = candidate_value,
    }

    let projection = run_projection(&assumptions);
    CandidateEval {
        advantage: projection.headline_diff(config.view_mode),
        breakeven_year: projection.headline_breakeven_year(config.view_mode),
    }
}

fn validate_config(config: GoalSolveConfig) -> Result<(), SolveError> {
    if !config.search_min.is_finite() || !config.search_max.is_finite() {
        return Err(SolveError::NonFiniteBounds);
    }
    if config.search_max <= config.search_min {
        return Err(SolveError::EmptySearchRange {
            min: config.search_min,
            max: config.search_max,
        });
    }
    if !config.tolerance.is_finite() || config.tolerance <= 0.0 {
        return Err(SolveError::InvalidTolerance(config.tolerance));
    }
    if config.max_iterations == 0 {
        return Err(SolveError::NoIterations);
    }
    if config.max_iterations > MAX_SOLVE_ITERATIONS {
        return Err(SolveError::TooManyIterations {
            requested: config.max_iterations,
            max: MAX_SOLVE_ITERATIONS,
        });
    }
    Ok(())
}
