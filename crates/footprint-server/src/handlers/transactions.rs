//! Transaction CRUD handlers

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::{AppError, AppState};
use footprint_core::{NewTransaction, Transaction, UpdateTransaction};

#[derive(Serialize)]
pub struct TransactionListResponse {
    pub transactions: Vec<Transaction>,
}

/// POST /api/transactions - Create a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<NewTransaction>,
) -> Result<(StatusCode, Json<Transaction>), AppError> {
    let tx = state.db.create_transaction(&payload)?;
    Ok((StatusCode::CREATED, Json(tx)))
}

/// GET /api/transactions - List the most recent transactions
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
) -> Result<Json<TransactionListResponse>, AppError> {
    let transactions = state.db.list_transactions()?;
    Ok(Json(TransactionListResponse { transactions }))
}

/// GET /api/transactions/:id - Get one transaction
pub async fn get_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<Transaction>, AppError> {
    let tx = state.db.get_transaction(id)?;
    Ok(Json(tx))
}

/// PUT /api/transactions/:id - Merge-style partial update
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTransaction>,
) -> Result<Json<Transaction>, AppError> {
    let tx = state.db.update_transaction(id, &payload)?;
    Ok(Json(tx))
}

/// DELETE /api/transactions/:id - Delete a transaction
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.db.delete_transaction(id)?;
    Ok(Json(serde_json::json!({ "ok": true })))
}
