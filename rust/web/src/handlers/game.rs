use crate::session::{GameAction, SessionError, SessionId, SessionManager};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use twentyone_engine::view::GameView;
use warp::http::{self, StatusCode};
use warp::reply::{self, Response};
use warp::Reply;

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Bankroll to seat the player with; the configured default when omitted
    pub bankroll: Option<i64>,
    /// Optional RNG seed for reproducible shuffles
    pub seed: Option<u64>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: SessionId,
    pub view: GameView,
}

#[derive(Debug, Deserialize)]
pub struct ActionRequest {
    /// One of `start`, `hit`, `stand`
    pub action: String,
    /// Stake for `start`; ignored for the other actions
    pub bet: Option<u32>,
}

/// Creates a new game session.
///
/// `POST /api/sessions` with an optional JSON body:
/// ```json
/// { "bankroll": 1000, "seed": 42 }
/// ```
/// Responds 201 with the session id and the opening (betting) view.
pub async fn create_session(
    sessions: Arc<SessionManager>,
    request: CreateSessionRequest,
) -> Response {
    match sessions.create_session(request.bankroll, request.seed) {
        Ok((session_id, view)) => {
            success_response(StatusCode::CREATED, SessionResponse { session_id, view })
        }
        Err(err) => session_error(err),
    }
}

/// Returns the caller-facing projection of the session's round.
///
/// `GET /api/sessions/{session_id}/state`. While the round is live the
/// dealer's hand shows only the up-card; after settlement the full hand and
/// score are revealed.
pub async fn get_session_state(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.view(&session_id) {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Applies one game action to the session's round.
///
/// `POST /api/sessions/{session_id}/actions` with a JSON body:
/// ```json
/// { "action": "start", "bet": 10 }
/// ```
/// Unknown action strings are rejected with 400 `invalid_action` before any
/// state is touched; actions illegal in the current phase get 409
/// `illegal_transition`. Responds 200 with the updated view.
pub async fn submit_action(
    sessions: Arc<SessionManager>,
    session_id: SessionId,
    request: ActionRequest,
) -> Response {
    let Some(action) = GameAction::parse(&request.action) else {
        return session_error(SessionError::InvalidAction(request.action));
    };

    match sessions.process_action(&session_id, action, request.bet).await {
        Ok(view) => success_response(StatusCode::OK, view),
        Err(err) => session_error(err),
    }
}

/// Deletes a session.
///
/// `DELETE /api/sessions/{session_id}`. Responds 204 on success, 404 if the
/// session does not exist.
pub async fn delete_session(sessions: Arc<SessionManager>, session_id: SessionId) -> Response {
    match sessions.delete_session(&session_id) {
        Ok(()) => empty_response(StatusCode::NO_CONTENT),
        Err(err) => session_error(err),
    }
}

fn success_response<T>(status: StatusCode, body: T) -> Response
where
    T: Serialize,
{
    reply::with_status(reply::json(&body), status).into_response()
}

fn empty_response(status: StatusCode) -> Response {
    http::Response::builder()
        .status(status)
        .body(warp::hyper::Body::empty())
        .expect("build empty response")
}

fn session_error(err: SessionError) -> Response {
    use crate::errors::IntoErrorResponse;
    err.into_http_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::DealerAdvisor;
    use crate::settings::AppSettings;

    fn manager() -> Arc<SessionManager> {
        Arc::new(SessionManager::new(
            DealerAdvisor::without_client(),
            AppSettings::default(),
        ))
    }

    #[tokio::test]
    async fn unknown_action_is_rejected_without_touching_the_session() {
        let sessions = manager();
        let (id, _) = sessions.create_session(None, None).expect("create");

        let response = submit_action(
            Arc::clone(&sessions),
            id.clone(),
            ActionRequest {
                action: "double-down".to_string(),
                bet: None,
            },
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let view = sessions.view(&id).expect("view");
        assert!(view.player_hand.is_empty());
    }

    #[tokio::test]
    async fn action_on_missing_session_is_404() {
        let response = submit_action(
            manager(),
            "no-such-session".to_string(),
            ActionRequest {
                action: "start".to_string(),
                bet: None,
            },
        )
        .await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn delete_returns_no_content() {
        let sessions = manager();
        let (id, _) = sessions.create_session(None, None).expect("create");

        let response = delete_session(Arc::clone(&sessions), id.clone()).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = delete_session(sessions, id).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
