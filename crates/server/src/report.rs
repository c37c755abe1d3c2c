use api_types::report::ReportView;
use axum::{
    Json,
    extract::{Path, State},
};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

pub async fn get(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ReportView>, ServerError> {
    let session = state.session(id).await?;
    let report = engine::generate_report(&*session.lock().await)?;
    Ok(Json(views::report(report)))
}
