//! Participant endpoints.

use api_types::participant::{ParticipantCreated, ParticipantNew};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::ParticipantId;
use uuid::Uuid;

use crate::{ServerError, server::ServerState};

pub async fn add(
    State(state): State<ServerState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ParticipantNew>,
) -> Result<(StatusCode, Json<ParticipantCreated>), ServerError> {
    let session = state.session(id).await?;
    let mut manager = session.lock().await;
    let participant = manager.add_participant(&state.ids, &payload.name)?;
    Ok((
        StatusCode::CREATED,
        Json(ParticipantCreated {
            id: participant.id.get(),
        }),
    ))
}

/// Removing a participant that is not there is not an error.
pub async fn remove(
    State(state): State<ServerState>,
    Path((id, participant_id)): Path<(Uuid, ParticipantId)>,
) -> Result<StatusCode, ServerError> {
    let session = state.session(id).await?;
    session.lock().await.remove_participant(participant_id);
    Ok(StatusCode::NO_CONTENT)
}
