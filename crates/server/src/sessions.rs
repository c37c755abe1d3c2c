//! Session lifecycle endpoints.

use api_types::{
    receipt::ReceiptNew,
    session::{SessionCreated, SessionView},
};
use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{AssignmentManager, Group, IdAllocator, MoneyCents, Receipt, ReceiptRow};
use uuid::Uuid;

use std::sync::Arc;

use crate::{ServerError, server::ServerState, views};

fn receipt_from(ids: &IdAllocator, payload: ReceiptNew) -> Result<Receipt, ServerError> {
    let rows: Vec<ReceiptRow> = payload
        .rows
        .into_iter()
        .map(|row| ReceiptRow::new(row.name, row.count, MoneyCents::new(row.total_price_minor)))
        .collect();
    Ok(Receipt::from_rows(
        ids,
        rows,
        MoneyCents::new(payload.grand_total_minor),
    )?)
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ReceiptNew>,
) -> Result<(StatusCode, Json<SessionCreated>), ServerError> {
    let receipt = receipt_from(&state.ids, payload)?;
    let id = Uuid::new_v4();
    state
        .insert(id, AssignmentManager::new(Group::new(), Arc::new(receipt)))
        .await;
    Ok((StatusCode::CREATED, Json(SessionCreated { id })))
}

/// Creates a session from a receipt photo sent as the raw request body.
pub async fn recognize(
    State(state): State<ServerState>,
    body: Bytes,
) -> Result<(StatusCode, Json<SessionView>), ServerError> {
    let recognizer = state.recognizer.clone().ok_or(ServerError::NotConfigured)?;
    if body.is_empty() {
        return Err(ServerError::Generic("empty image body".to_string()));
    }

    let recognized = recognizer.recognize(&body).await?;
    tracing::info!(rows = recognized.rows.len(), "receipt recognized");
    let receipt = recognized.into_receipt(&state.ids)?;

    let id = Uuid::new_v4();
    let manager = AssignmentManager::new(Group::new(), Arc::new(receipt));
    let view = views::session(id, &manager)?;
    state.insert(id, manager).await;
    Ok((StatusCode::CREATED, Json(view)))
}

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.session(id).await?;
    let manager = session.lock().await;
    Ok(Json(views::session(id, &manager)?))
}

pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ServerError> {
    match state.remove(id).await {
        Some(_) => Ok(StatusCode::NO_CONTENT),
        None => Err(engine::EngineError::KeyNotFound(format!("session {id}")).into()),
    }
}

/// Swaps the receipt of a session. The group is kept, every assignment is
/// dropped since it referred to the old items.
pub async fn replace_receipt(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReceiptNew>,
) -> Result<Json<SessionView>, ServerError> {
    let session = state.session(id).await?;
    let receipt = Arc::new(receipt_from(&state.ids, payload)?);

    let mut manager = session.lock().await;
    manager.rebind(receipt);
    tracing::debug!(%id, "receipt replaced");
    Ok(Json(views::session(id, &manager)?))
}
