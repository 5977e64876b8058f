use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::anyhow;
use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router
};
use log::warn;
use serde::Deserialize;
use serde_json::json;
use tower_http::services::ServeDir;

use bankledger::{Account, Amount, Ledger, LedgerError};
use bankledger::account::{format_amount, parse_amount};
use bankledger::ledger::InterestApplied;

use crate::error::ServerError;

/// One ledger shared by every request; each handler runs a single
/// ledger operation while holding the lock.
#[derive(Clone)]
pub(crate) struct AppState {
    ledger: Arc<Mutex<Ledger>>,
    autosave: bool
}

impl AppState {
    pub(crate) fn new(ledger: Ledger, autosave: bool) -> AppState {
        AppState { ledger: Arc::new(Mutex::new(ledger)), autosave }
    }

    pub(crate) fn ledger(&self) -> Result<MutexGuard<'_, Ledger>, ServerError> {
        self.ledger.lock()
            .map_err(|_| ServerError::InternalError(anyhow!("ledger lock poisoned")))
    }

    /// Failures are logged by the ledger and otherwise ignored:
    /// the change is kept in memory until the next successful save.
    fn autosave(&self, ledger: &Ledger) {
        if self.autosave {
            let _ = ledger.save_to_file();
        }
    }
}

fn parse_param(name: &str, value: &str) -> Result<Amount, ServerError> {
    parse_amount(value.trim())
        .ok_or_else(|| ServerError::BadRequest(format!("invalid {}: {:?}", name, value)))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateParams {
    name: String,
    initial_balance: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TransferParams {
    account_number: String,
    amount: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AccountParams {
    account_number: String
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameParams {
    account_number: String,
    name: String
}

#[derive(Deserialize)]
struct InterestParams {
    rate: String
}

async fn create_account(State(state): State<AppState>, Query(params): Query<CreateParams>)
    -> Result<Json<Account>, ServerError>
{
    let initial_balance = parse_param("initialBalance", &params.initial_balance)?;
    let mut ledger = state.ledger()?;
    let account = ledger.create_account(&params.name, initial_balance)?;
    state.autosave(&ledger);
    Ok(Json(account))
}

async fn deposit(State(state): State<AppState>, Query(params): Query<TransferParams>)
    -> Result<&'static str, ServerError>
{
    let amount = parse_param("amount", &params.amount)
        .map_err(|err| err.prefixed("Deposit failed!"))?;
    let mut ledger = state.ledger()?;
    ledger.deposit(&params.account_number, amount)
        .map_err(|err| ServerError::from(err).prefixed("Deposit failed!"))?;
    state.autosave(&ledger);
    Ok("Deposit successful!")
}

async fn withdraw(State(state): State<AppState>, Query(params): Query<TransferParams>)
    -> Result<&'static str, ServerError>
{
    let amount = parse_param("amount", &params.amount)
        .map_err(|err| err.prefixed("Withdrawal failed!"))?;
    let mut ledger = state.ledger()?;
    ledger.withdraw(&params.account_number, amount)
        .map_err(|err| ServerError::from(err).prefixed("Withdrawal failed!"))?;
    state.autosave(&ledger);
    Ok("Withdrawal successful!")
}

async fn rename_account(State(state): State<AppState>, Query(params): Query<RenameParams>)
    -> Result<Json<Account>, ServerError>
{
    let mut ledger = state.ledger()?;
    let account = ledger.rename_account(&params.account_number, &params.name)?;
    state.autosave(&ledger);
    Ok(Json(account))
}

async fn check_balance(State(state): State<AppState>, Query(params): Query<AccountParams>)
    -> Result<String, ServerError>
{
    let balance = state.ledger()?
        .check_balance(&params.account_number)
        .map_err(|err| match err {
            LedgerError::AccountNotFound(..) => ServerError::NotFound("Account not found!".to_owned()),
            other => other.into()
        })?;
    Ok(format!("Balance: ${}", format_amount(balance)))
}

async fn list_accounts(State(state): State<AppState>) -> Result<Json<Vec<Account>>, ServerError> {
    Ok(Json(state.ledger()?.list_accounts()))
}

async fn account_count(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ServerError> {
    let count = state.ledger()?.account_count();
    Ok(Json(json!({ "count": count })))
}

async fn apply_interest(State(state): State<AppState>, Query(params): Query<InterestParams>)
    -> Result<Json<Vec<InterestApplied>>, ServerError>
{
    let rate = parse_param("rate", &params.rate)?;
    let mut ledger = state.ledger()?;
    let applied = ledger.apply_interest_to_all(rate)?;
    state.autosave(&ledger);
    Ok(Json(applied))
}

async fn save(State(state): State<AppState>) -> Result<String, ServerError> {
    let ledger = state.ledger()?;
    ledger.save_to_file()
        .map_err(|err| {
            warn!("save requested over HTTP failed");
            ServerError::from(err)
        })?;
    Ok(format!("Accounts saved to {}", ledger.name()))
}

pub(crate) fn build_router(state: AppState, static_dir: Option<&Path>) -> Router {
    let api = Router::new()
        .route("/create", post(create_account))
        .route("/deposit", post(deposit))
        .route("/withdraw", post(withdraw))
        .route("/rename", post(rename_account))
        .route("/balance", get(check_balance))
        .route("/all", get(list_accounts))
        .route("/count", get(account_count))
        .route("/interest", post(apply_interest))
        .route("/save", post(save));

    let router = Router::new()
        .nest("/api/bank", api)
        .with_state(state);

    match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router
    }
}
