use napi::Result as NapiResult;
use napi_derive::napi;

use loan_portfolio_core::annual;
use loan_portfolio_core::portfolio;
use loan_portfolio_core::schedule;

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn build_amortization_schedule(input_json: String) -> NapiResult<String> {
    let terms: schedule::LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&terms).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn annual_payment_schedule(input_json: String) -> NapiResult<String> {
    let terms: schedule::LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&terms).map_err(to_napi_error)?;
    let rows = annual::aggregate_annual(&output.result.schedule);
    serde_json::to_string(&rows).map_err(to_napi_error)
}

#[napi]
pub fn annual_net_interest_schedule(input_json: String, purpose: String) -> NapiResult<String> {
    let terms: schedule::LoanTerms = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = schedule::build_schedule(&terms).map_err(to_napi_error)?;
    let rows =
        annual::aggregate_annual_interest(&output.result.schedule, &purpose).map_err(to_napi_error)?;
    serde_json::to_string(&rows).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Portfolio
// ---------------------------------------------------------------------------

#[napi]
pub fn portfolio_net_interest(input_json: String) -> NapiResult<String> {
    let loans: Vec<portfolio::LoanRecord> =
        serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = portfolio::compute_portfolio_net_interest(&loans).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
