use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    AnalysisReport, BuyProfile, GlobalSettings, OptimizationResult, OptimizeVariable,
    ProfileComparison, RentSettings, RentYear, SimulationResult, analyze_profile,
    compare_profiles, optimize, project_rent, simulate,
};

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    global_settings: GlobalSettings,
    rent_settings: RentSettings,
    profile: BuyProfile,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct OptimizePayload {
    global_settings: GlobalSettings,
    rent_settings: RentSettings,
    profile: BuyProfile,
    target_year: Option<u32>,
    variable: Option<OptimizeVariable>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    global_settings: GlobalSettings,
    rent_settings: RentSettings,
    profiles: Option<Vec<BuyProfile>>,
}

#[derive(Debug)]
struct OptimizeRequest {
    global: GlobalSettings,
    rent: RentSettings,
    profile: BuyProfile,
    target_year: u32,
    variable: OptimizeVariable,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DefaultsResponse {
    global_settings: GlobalSettings,
    rent_settings: RentSettings,
    profile: BuyProfile,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    profile_id: String,
    rent: Vec<RentYear>,
    result: SimulationResult,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    rent: Vec<RentYear>,
    comparisons: Vec<ProfileComparison>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn router() -> Router {
    Router::new()
        .route("/api/defaults", get(defaults_handler))
        .route("/api/simulate", post(simulate_handler))
        .route("/api/optimize", post(optimize_handler))
        .route("/api/analyze", post(analyze_handler))
        .route("/api/compare", post(compare_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!("rent vs buy API listening on http://{addr}");
    info!("local access: http://127.0.0.1:{port}/api/defaults");

    axum::serve(listener, router()).await
}

async fn defaults_handler() -> Response {
    json_response(
        StatusCode::OK,
        DefaultsResponse {
            global_settings: GlobalSettings::default(),
            rent_settings: RentSettings::default(),
            profile: BuyProfile::default(),
        },
    )
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_handler(Json(payload): Json<SimulatePayload>) -> Response {
    match build_simulate_response(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => bad_request(&msg),
    }
}

async fn optimize_handler(Json(payload): Json<OptimizePayload>) -> Response {
    let request = match optimize_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return bad_request(&msg),
    };
    match run_optimize(&request) {
        Ok(result) => json_response(StatusCode::OK, result),
        Err(msg) => bad_request(&msg),
    }
}

async fn analyze_handler(Json(payload): Json<SimulatePayload>) -> Response {
    match run_analyze(&payload) {
        Ok(report) => json_response(StatusCode::OK, report),
        Err(msg) => bad_request(&msg),
    }
}

async fn compare_handler(Json(payload): Json<ComparePayload>) -> Response {
    match build_compare_response(payload) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(msg) => bad_request(&msg),
    }
}

fn build_simulate_response(payload: SimulatePayload) -> Result<SimulateResponse, String> {
    let result = simulate(
        &payload.global_settings,
        &payload.rent_settings,
        &payload.profile,
    )
    .map_err(|e| e.to_string())?;
    Ok(SimulateResponse {
        profile_id: payload.profile.id,
        rent: project_rent(
            &payload.rent_settings,
            payload.global_settings.forecast_years,
        ),
        result,
    })
}

fn optimize_request_from_payload(payload: OptimizePayload) -> Result<OptimizeRequest, String> {
    let Some(target_year) = payload.target_year else {
        return Err("targetYear is required".to_string());
    };
    let Some(variable) = payload.variable else {
        return Err("variable is required (price, rate or downpayment)".to_string());
    };
    Ok(OptimizeRequest {
        global: payload.global_settings,
        rent: payload.rent_settings,
        profile: payload.profile,
        target_year,
        variable,
    })
}

fn run_optimize(request: &OptimizeRequest) -> Result<OptimizationResult, String> {
    optimize(
        request.target_year,
        request.variable,
        &request.profile,
        &request.global,
        &request.rent,
    )
    .map_err(|e| e.to_string())
}

fn run_analyze(payload: &SimulatePayload) -> Result<AnalysisReport, String> {
    analyze_profile(
        &payload.global_settings,
        &payload.rent_settings,
        &payload.profile,
    )
    .map_err(|e| e.to_string())
}

fn build_compare_response(payload: ComparePayload) -> Result<CompareResponse, String> {
    let profiles = payload
        .profiles
        .unwrap_or_else(|| vec![BuyProfile::default()]);
    if profiles.is_empty() {
        return Err("profiles must not be empty".to_string());
    }
    let comparisons = compare_profiles(&payload.global_settings, &payload.rent_settings, &profiles)
        .map_err(|e| e.to_string())?;
    Ok(CompareResponse {
        rent: project_rent(
            &payload.rent_settings,
            payload.global_settings.forecast_years,
        ),
        comparisons,
    })
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn bad_request(msg: &str) -> Response {
    warn!(error = msg, "rejected request");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
