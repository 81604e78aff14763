//! API Server Module
//!
//! This module implements a JSON-RPC server in front of the entry point.
//! It accepts account management calls and user operations, runs operations
//! through validation and execution, and persists account records after each
//! state change.

use crate::{
    AccountRecord, EntryPointError, ExecutionStatus, OperationReceipt, UserOperation,
    config::ApiConfig,
    entry::EntryPoint,
    registry::Registry,
};
use axum::{Json, Router, extract::State, routing::post};
use ethers::types::{Address, U256};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// Shared application state that is accessible across all request handlers
///
/// The entry point sits behind a single mutex: operations are processed one
/// at a time, each to completion.
#[derive(Clone)]
pub struct AppState {
    entry_point: Arc<Mutex<EntryPoint>>,
    registry: Registry,
}

/// The main API server struct
pub struct Server {
    config: ApiConfig,
    state: AppState,
}

impl Server {
    /// Creates a new API server instance
    ///
    /// # Arguments
    /// * `config` - Listening address settings
    /// * `entry_point` - Entry point with its accounts already restored
    /// * `registry` - Registry the server persists account records to
    pub fn new(config: ApiConfig, entry_point: EntryPoint, registry: Registry) -> Self {
        let state = AppState {
            entry_point: Arc::new(Mutex::new(entry_point)),
            registry,
        };
        Self { config, state }
    }

    /// Router with the JSON-RPC endpoint mounted at "/"
    pub fn router(&self) -> Router {
        Router::new()
            .route("/", post(handle_rpc))
            .with_state(self.state.clone())
    }

    /// Starts the API server and begins listening for incoming requests
    pub async fn start(self) -> anyhow::Result<()> {
        let app = self.router();

        let addr = format!("{}:{}", self.config.host, self.config.port);
        info!("API server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(&addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// JSON-RPC 2.0 request structure
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    pub method: String,
    #[serde(default)]
    pub params: Value,
    pub id: Value,
}

/// JSON-RPC 2.0 response structure
///
/// Either `result` or `error` is populated, never both.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
    pub id: Value,
}

/// JSON-RPC error object
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
}

const METHOD_NOT_FOUND: i32 = -32601;
const INVALID_PARAMS: i32 = -32602;
const INTERNAL_ERROR: i32 = -32603;
/// Application error: account management call refused
const ACCOUNT_ERROR: i32 = -32000;

#[derive(Debug, Deserialize)]
struct CreateAccountParams {
    owner: Address,
    #[serde(default)]
    salt: U256,
}

#[derive(Debug, Deserialize)]
struct DepositParams {
    account: Address,
    amount: U256,
}

#[derive(Debug, Deserialize)]
struct AccountParams {
    account: Address,
}

type RpcResult = Result<Value, JsonRpcError>;

/// Main RPC request handler
///
/// Routes the request to the appropriate handler based on the method name.
async fn handle_rpc(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> Json<JsonRpcResponse> {
    info!("Received RPC request: {}", request.method);

    let outcome = match request.method.as_str() {
        "createAccount" => handle_create_account(&state, request.params).await,
        "deposit" => handle_deposit(&state, request.params).await,
        "getNonce" => handle_get_nonce(&state, request.params).await,
        "getBalance" => handle_get_balance(&state, request.params).await,
        "sendOperation" => handle_send_operation(&state, request.params).await,
        _ => Err(rpc_error(METHOD_NOT_FOUND, "Method not found")),
    };

    let (result, error) = match outcome {
        Ok(value) => (Some(value), None),
        Err(e) => (None, Some(e)),
    };

    Json(JsonRpcResponse {
        jsonrpc: "2.0".to_string(),
        result,
        error,
        id: request.id,
    })
}

fn rpc_error(code: i32, message: impl Into<String>) -> JsonRpcError {
    JsonRpcError {
        code,
        message: message.into(),
    }
}

fn parse_params<T: for<'de> Deserialize<'de>>(params: Value) -> Result<T, JsonRpcError> {
    serde_json::from_value(params).map_err(|e| {
        error!("Failed to deserialize params: {}", e);
        rpc_error(INVALID_PARAMS, format!("Invalid params: {}", e))
    })
}

fn to_value<T: Serialize>(value: T) -> RpcResult {
    serde_json::to_value(value).map_err(|e| rpc_error(INTERNAL_ERROR, e.to_string()))
}

async fn handle_create_account(state: &AppState, params: Value) -> RpcResult {
    let params: CreateAccountParams = parse_params(params)?;

    let mut entry_point = state.entry_point.lock().await;
    let address = entry_point
        .create_account(params.owner, params.salt)
        .map_err(|e| rpc_error(ACCOUNT_ERROR, e.to_string()))?;

    if let Some(record) = entry_point.record_of(&address) {
        persist(state, &record).await?;
    }
    to_value(address)
}

async fn handle_deposit(state: &AppState, params: Value) -> RpcResult {
    let params: DepositParams = parse_params(params)?;

    let mut entry_point = state.entry_point.lock().await;
    entry_point
        .deposit(params.account, params.amount)
        .map_err(|e| rpc_error(ACCOUNT_ERROR, e.to_string()))?;
    to_value(entry_point.balance_of(&params.account))
}

async fn handle_get_nonce(state: &AppState, params: Value) -> RpcResult {
    let params: AccountParams = parse_params(params)?;

    let entry_point = state.entry_point.lock().await;
    let nonce = entry_point.nonce_of(&params.account).ok_or_else(|| {
        rpc_error(ACCOUNT_ERROR, EntryPointError::UnknownAccount(params.account).to_string())
    })?;
    to_value(nonce)
}

async fn handle_get_balance(state: &AppState, params: Value) -> RpcResult {
    let params: AccountParams = parse_params(params)?;

    let entry_point = state.entry_point.lock().await;
    to_value(entry_point.balance_of(&params.account))
}

/// Handles the "sendOperation" RPC method
///
/// 1. Deserializes the operation from the request parameters
/// 2. Validates and executes it through the entry point
/// 3. Persists the account record, whatever the outcome, since some
///    policies advance the nonce even for rejected operations
/// 4. Returns a receipt; rejections are receipts too, not RPC errors
async fn handle_send_operation(state: &AppState, params: Value) -> RpcResult {
    let op: UserOperation = parse_params(params)?;

    // The lock is held through persistence so records land in nonce order
    let mut entry_point = state.entry_point.lock().await;
    let op_hash = entry_point.hasher().digest(&op);
    let outcome = entry_point.handle_op(&op);

    if let Some(record) = entry_point.record_of(&op.sender) {
        persist(state, &record).await?;
    }
    drop(entry_point);

    let receipt = match outcome {
        Ok(receipt) => {
            info!("Operation {:?} handled: {:?}", receipt.op_hash, receipt.status);
            receipt
        }
        Err(e @ EntryPointError::UnknownAccount(_)) => {
            return Err(rpc_error(ACCOUNT_ERROR, e.to_string()));
        }
        Err(e) => {
            warn!("Operation {:?} rejected: {}", op_hash, e);
            OperationReceipt {
                op_hash,
                sender: op.sender,
                nonce: op.nonce,
                status: ExecutionStatus::Rejected { reason: e.to_string() },
                timestamp: chrono::Utc::now().timestamp() as u64,
            }
        }
    };

    to_value(receipt)
}

async fn persist(state: &AppState, record: &AccountRecord) -> Result<(), JsonRpcError> {
    state.registry.store(record).await.map_err(|e| {
        error!("Failed to persist account {:?}: {:?}", record.address, e);
        rpc_error(INTERNAL_ERROR, "Failed to persist account state")
    })
}
