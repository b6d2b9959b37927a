use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

mod args;

pub use args::{
    CliGoalType, CliViewMode, ProjectArgs, SolveArgs, build_assumptions, build_solve_config,
    default_project_args, default_search, goal_unit_scale,
};

use crate::core::{
    Assumptions, GoalSolveConfig, GoalSolveIteration, GoalSolveResult, GoalType, Projection,
    ViewMode, YearlyRecord, run_projection, solve_goal,
};
use crate::error::AppResult;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiViewMode {
    #[serde(alias = "Wealth", alias = "net-wealth", alias = "netWealth")]
    Wealth,
    #[serde(alias = "Cost", alias = "net-cost", alias = "netCost")]
    Cost,
}

impl From<ApiViewMode> for CliViewMode {
    fn from(value: ApiViewMode) -> Self {
        match value {
            ApiViewMode::Wealth => CliViewMode::Wealth,
            ApiViewMode::Cost => CliViewMode::Cost,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum ApiGoalType {
    #[serde(alias = "rentMonthly", alias = "rent_monthly")]
    Rent,
    #[serde(alias = "homeGrowth", alias = "home_growth", alias = "appreciation")]
    HomeGrowth,
}

impl From<ApiGoalType> for CliGoalType {
    fn from(value: ApiGoalType) -> Self {
        match value {
            ApiGoalType::Rent => CliGoalType::Rent,
            ApiGoalType::HomeGrowth => CliGoalType::HomeGrowth,
        }
    }
}

/// Query/body keys shared by `/api/project` and `/api/solve`. Rates are percentages.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ApiPayload {
    years: Option<f64>,
    rent_monthly: Option<f64>,
    rent_growth: Option<f64>,
    home_price: Option<f64>,
    down_payment: Option<f64>,
    mortgage_rate: Option<f64>,
    amort_years: Option<f64>,
    property_tax: Option<f64>,
    maintenance: Option<f64>,
    home_growth: Option<f64>,
    selling_cost: Option<f64>,
    invest_return: Option<f64>,
    view_mode: Option<ApiViewMode>,
    selected_year: Option<u32>,

    goal: Option<ApiGoalType>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug)]
struct ProjectRequest {
    assumptions: Assumptions,
    selected_year: Option<u32>,
}

#[derive(Debug)]
struct SolveRequest {
    assumptions: Assumptions,
    config: GoalSolveConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    view_mode: ViewMode,
    #[serde(flatten)]
    projection: Projection,
    headline_diff: f64,
    headline_breakeven_year: Option<u32>,
    selected_record: Option<YearlyRecord>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    goal: GoalType,
    view_mode: ViewMode,
    search_min: f64,
    search_max: f64,
    tolerance: f64,
    max_iterations: u32,
    solved_value: Option<f64>,
    achieved_advantage: Option<f64>,
    breakeven_year: Option<u32>,
    converged: bool,
    feasible: bool,
    message: String,
    iterations: Vec<GoalSolveIteration>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
}

pub async fn run_http_server(port: u16) -> AppResult<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    log::info!("rent-vs-buy HTTP API listening on http://{addr}");
    log::info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, router()).await?;
    Ok(())
}

fn router() -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route(
            "/api/solve",
            get(solve_get_handler).post(solve_post_handler),
        )
        .fallback(not_found_handler)
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, HealthResponse { status: "ok" })
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(payload: Result<Query<ApiPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => project_handler_impl(payload).await,
        Err(rejection) => rejected(rejection.body_text()),
    }
}

async fn project_post_handler(payload: Result<Json<ApiPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => project_handler_impl(payload).await,
        Err(rejection) => rejected(rejection.body_text()),
    }
}

async fn solve_get_handler(payload: Result<Query<ApiPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => solve_handler_impl(payload).await,
        Err(rejection) => rejected(rejection.body_text()),
    }
}

async fn solve_post_handler(payload: Result<Json<ApiPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => solve_handler_impl(payload).await,
        Err(rejection) => rejected(rejection.body_text()),
    }
}

async fn project_handler_impl(payload: ApiPayload) -> Response {
    let request = project_request_from_payload(payload);
    let projection = run_projection(&request.assumptions);
    let response = build_project_response(&request, projection);
    json_response(StatusCode::OK, response)
}

async fn solve_handler_impl(payload: ApiPayload) -> Response {
    let request = solve_request_from_payload(payload);
    match solve_goal(&request.assumptions, request.config) {
        Ok(result) => json_response(StatusCode::OK, build_solve_response(&result)),
        Err(err) => rejected(err.to_string()),
    }
}

fn rejected(msg: String) -> Response {
    log::warn!("rejected request: {msg}");
    error_response(StatusCode::BAD_REQUEST, &msg)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

fn project_args_from_payload(payload: &ApiPayload) -> ProjectArgs {
    let mut args = default_project_args();

    if let Some(v) = payload.years {
        args.years = v;
    }
    if let Some(v) = payload.rent_monthly {
        args.rent_monthly = v;
    }
    if let Some(v) = payload.rent_growth {
        args.rent_growth = v;
    }
    if let Some(v) = payload.home_price {
        args.home_price = v;
    }
    if let Some(v) = payload.down_payment {
        args.down_payment = v;
    }
    if let Some(v) = payload.mortgage_rate {
        args.mortgage_rate = v;
    }
    if let Some(v) = payload.amort_years {
        args.amort_years = v;
    }
    if let Some(v) = payload.property_tax {
        args.property_tax = v;
    }
    if let Some(v) = payload.maintenance {
        args.maintenance = v;
    }
    if let Some(v) = payload.home_growth {
        args.home_growth = v;
    }
    if let Some(v) = payload.selling_cost {
        args.selling_cost = v;
    }
    if let Some(v) = payload.invest_return {
        args.invest_return = v;
    }
    if let Some(v) = payload.view_mode {
        args.view_mode = v.into();
    }

    args
}

fn project_request_from_payload(payload: ApiPayload) -> ProjectRequest {
    ProjectRequest {
        assumptions: build_assumptions(&project_args_from_payload(&payload)),
        selected_year: payload.selected_year,
    }
}

fn solve_request_from_payload(payload: ApiPayload) -> SolveRequest {
    let args = SolveArgs {
        project: project_args_from_payload(&payload),
        goal: payload.goal.map(Into::into).unwrap_or(CliGoalType::Rent),
        search_min: payload.search_min,
        search_max: payload.search_max,
        tolerance: payload.tolerance,
        max_iterations: payload.max_iterations.unwrap_or(60),
    };
    let (assumptions, config) = build_solve_config(&args);
    SolveRequest {
        assumptions,
        config,
    }
}

fn build_project_response(request: &ProjectRequest, projection: Projection) -> ProjectResponse {
    let view_mode = request.assumptions.view_mode;
    let selected_year = request
        .selected_year
        .unwrap_or(projection.records.len() as u32);
    ProjectResponse {
        view_mode,
        headline_diff: projection.headline_diff(view_mode),
        headline_breakeven_year: projection.headline_breakeven_year(view_mode),
        selected_record: projection.record_for_year(selected_year).copied(),
        projection,
    }
}

/// Reports bounds and solved values back in the units they were entered in.
fn build_solve_response(result: &GoalSolveResult) -> SolveResponse {
    let scale = goal_unit_scale(result.goal_type);
    SolveResponse {
        goal: result.goal_type,
        view_mode: result.view_mode,
        search_min: result.search_min * scale,
        search_max: result.search_max * scale,
        tolerance: result.tolerance * scale,
        max_iterations: result.max_iterations,
        solved_value: result.solved_value.map(|v| v * scale),
        achieved_advantage: result.achieved_advantage,
        breakeven_year: result.breakeven_year,
        converged: result.converged,
        feasible: result.feasible,
        message: result.message.clone(),
        iterations: result
            .iterations
            .iter()
            .map(|it| GoalSolveIteration {
                lower_bound: it.lower_bound * scale,
                upper_bound: it.upper_bound * scale,
                candidate_value: it.candidate_value * scale,
                ..*it
            })
            .collect(),
    }
}

#[cfg(test)]
fn payload_from_json(json: &str) -> crate::error::AppResult<ApiPayload> {
    Ok(serde_json::from_str::<ApiPayload>(json)?)
}
