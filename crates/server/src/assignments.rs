//! Assignment endpoints.

use api_types::assignment::{
    AssignmentCount, AssignmentCreated, AssignmentNew, AssignmentsRemove, AssignmentsResponse,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{AssignmentId, ItemId, ParticipantId};
use uuid::Uuid;

use crate::{ServerError, server::ServerState, views};

/// Lists the participant's assignments, registering an empty list on first
/// access.
pub async fn list(
    State(state): State<ServerState>,
    Path((id, participant_id)): Path<(Uuid, ParticipantId)>,
) -> Result<Json<AssignmentsResponse>, ServerError> {
    let session = state.session(id).await?;
    let mut manager = session.lock().await;
    manager.group().get(participant_id)?;
    let assignments = views::assignments(manager.get_or_create_assignments(participant_id));
    Ok(Json(AssignmentsResponse { assignments }))
}

pub async fn add(
    State(state): State<ServerState>,
    Path((id, participant_id)): Path<(Uuid, ParticipantId)>,
    Json(payload): Json<AssignmentNew>,
) -> Result<(StatusCode, Json<AssignmentCreated>), ServerError> {
    let session = state.session(id).await?;
    let assignment_id = session.lock().await.add_assignment(
        &state.ids,
        participant_id,
        ItemId::from(payload.item_id),
    )?;
    Ok((
        StatusCode::CREATED,
        Json(AssignmentCreated {
            id: assignment_id.get(),
        }),
    ))
}

pub async fn set_count(
    State(state): State<ServerState>,
    Path((id, participant_id, assignment_id)): Path<(Uuid, ParticipantId, AssignmentId)>,
    Json(payload): Json<AssignmentCount>,
) -> Result<StatusCode, ServerError> {
    let session = state.session(id).await?;
    session
        .lock()
        .await
        .set_assigned_count(participant_id, assignment_id, payload.count)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Removes assignments either by id or by position, never both.
pub async fn remove(
    State(state): State<ServerState>,
    Path((id, participant_id)): Path<(Uuid, ParticipantId)>,
    Json(payload): Json<AssignmentsRemove>,
) -> Result<Json<AssignmentsResponse>, ServerError> {
    if payload.ids.is_empty() == payload.positions.is_empty() {
        return Err(ServerError::Generic(
            "provide exactly one of ids or positions".to_string(),
        ));
    }

    let session = state.session(id).await?;
    let mut manager = session.lock().await;
    manager.group().get(participant_id)?;
    let removed = if payload.positions.is_empty() {
        let ids: Vec<AssignmentId> = payload.ids.into_iter().map(AssignmentId::from).collect();
        manager.remove_assignments(participant_id, &ids)?
    } else {
        manager.remove_assignments_at(participant_id, &payload.positions)?
    };
    Ok(Json(AssignmentsResponse {
        assignments: views::assignments(&removed),
    }))
}
