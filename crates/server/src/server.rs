use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, patch, post, put},
};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use std::{collections::HashMap, net::SocketAddr, sync::Arc};

use crate::{ServerError, assignments, participants, report, sessions};
use engine::{AssignmentManager, EngineError, IdAllocator};
use recognizer::Recognizer;

/// Upload limit used when none is configured (receipt photos).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// A session is one receipt split among one group.
///
/// The lock is held for a whole logical operation, so a report never sees a
/// half-applied mutation.
pub(crate) type Session = Arc<Mutex<AssignmentManager>>;

#[derive(Clone)]
pub struct ServerState {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    pub(crate) ids: Arc<IdAllocator>,
    pub(crate) recognizer: Option<Arc<dyn Recognizer>>,
    max_upload_bytes: usize,
}

impl ServerState {
    pub fn new(recognizer: Option<Arc<dyn Recognizer>>) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ids: Arc::new(IdAllocator::new()),
            recognizer,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn max_upload_bytes(mut self, max_upload_bytes: usize) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self
    }

    /// Stores a new session. The caller picks the id so it can build its
    /// response before the session becomes visible to other requests.
    pub(crate) async fn insert(&self, id: Uuid, manager: AssignmentManager) {
        self.sessions
            .write()
            .await
            .insert(id, Arc::new(Mutex::new(manager)));
        tracing::debug!(%id, "session created");
    }

    pub(crate) async fn session(&self, id: Uuid) -> Result<Session, ServerError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| EngineError::KeyNotFound(format!("session {id}")).into())
    }

    pub(crate) async fn remove(&self, id: Uuid) -> Option<Session> {
        let removed = self.sessions.write().await.remove(&id);
        if removed.is_some() {
            tracing::debug!(%id, "session removed");
        }
        removed
    }
}

pub fn router(state: ServerState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_bytes);
    Router::new()
        .route("/sessions", post(sessions::create))
        .route("/sessions/recognize", post(sessions::recognize))
        .route("/sessions/{id}", get(sessions::get).delete(sessions::delete))
        .route("/sessions/{id}/receipt", put(sessions::replace_receipt))
        .route("/sessions/{id}/participants", post(participants::add))
        .route(
            "/sessions/{id}/participants/{pid}",
            axum::routing::delete(participants::remove),
        )
        .route(
            "/sessions/{id}/participants/{pid}/assignments",
            get(assignments::list)
                .post(assignments::add)
                .delete(assignments::remove),
        )
        .route(
            "/sessions/{id}/participants/{pid}/assignments/{aid}",
            patch(assignments::set_count),
        )
        .route("/sessions/{id}/report", get(report::get))
        .layer(upload_limit)
        .with_state(state)
}

pub async fn run(state: ServerState, addr: SocketAddr) -> Result<(), std::io::Error> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    run_with_listener(state, listener).await
}

pub async fn run_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<(), std::io::Error> {
    let addr = listener.local_addr()?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, router(state)).await
}

pub fn spawn_with_listener(
    state: ServerState,
    listener: tokio::net::TcpListener,
) -> Result<SocketAddr, std::io::Error> {
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        if let Err(err) = run_with_listener(state, listener).await {
            tracing::error!("server failed: {err}");
        }
    });

    Ok(addr)
}
