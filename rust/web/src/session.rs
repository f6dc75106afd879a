use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::{Duration, Instant};

use thiserror::Error;
use twentyone_engine::errors::RoundError;
use twentyone_engine::round::{Phase, RoundState};
use twentyone_engine::view::GameView;
use uuid::Uuid;
use warp::http::StatusCode;

use crate::advisor::DealerAdvisor;
use crate::errors::IntoErrorResponse;
use crate::settings::AppSettings;

pub type SessionId = String;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session {0} not found")]
    NotFound(SessionId),
    #[error("session {0} has expired")]
    Expired(SessionId),
    #[error("unknown action `{0}`")]
    InvalidAction(String),
    #[error(transparent)]
    Round(#[from] RoundError),
    #[error("session storage lock poisoned")]
    StoragePoisoned,
}

impl IntoErrorResponse for SessionError {
    fn status_code(&self) -> StatusCode {
        match self {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::Expired(_) => StatusCode::GONE,
            SessionError::InvalidAction(_) => StatusCode::BAD_REQUEST,
            SessionError::Round(_) => StatusCode::CONFLICT,
            SessionError::StoragePoisoned => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            SessionError::NotFound(_) => "session_not_found",
            SessionError::Expired(_) => "session_expired",
            SessionError::InvalidAction(_) => "invalid_action",
            SessionError::Round(RoundError::EmptyDeck) => "empty_deck",
            SessionError::Round(RoundError::IllegalTransition { .. }) => "illegal_transition",
            SessionError::StoragePoisoned => "storage_poisoned",
        }
    }

    fn error_message(&self) -> String {
        self.to_string()
    }
}

/// The three actions a caller may submit against a session. Anything else in
/// the request is rejected before any state is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    Start,
    Hit,
    Stand,
}

impl GameAction {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "start" => Some(GameAction::Start),
            "hit" => Some(GameAction::Hit),
            "stand" => Some(GameAction::Stand),
            _ => None,
        }
    }
}

/// One caller's table: the persisted round plus activity bookkeeping.
/// The round never leaves this session; concurrency safety comes from each
/// session owning its state outright, not from cross-session locking.
pub struct GameSession {
    id: SessionId,
    round: Mutex<RoundState>,
    seed: Option<u64>,
    created_at: Instant,
    last_active: Mutex<Instant>,
}

impl GameSession {
    fn new(id: SessionId, bankroll: i64, seed: Option<u64>) -> Self {
        let now = Instant::now();
        Self {
            id,
            round: Mutex::new(RoundState::new(bankroll)),
            seed,
            created_at: now,
            last_active: Mutex::new(now),
        }
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    fn touch(&self) {
        if let Ok(mut guard) = self.last_active.lock() {
            *guard = Instant::now();
        }
    }

    fn is_expired(&self, ttl: Duration) -> bool {
        match self.last_active.lock() {
            Ok(guard) => guard.elapsed() >= ttl,
            Err(_) => true,
        }
    }

    fn view(&self) -> Result<GameView, SessionError> {
        let round = self.round.lock().map_err(|_| SessionError::StoragePoisoned)?;
        Ok(GameView::render(&round))
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("id", &self.id)
            .field("seed", &self.seed)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Owns every live table, keyed by session id. Plays the part of the session
/// store: each request rebuilds its view from the stored round, applies one
/// action, and leaves the mutated round behind for the next request.
#[derive(Debug)]
pub struct SessionManager {
    sessions: RwLock<HashMap<SessionId, Arc<GameSession>>>,
    advisor: Arc<DealerAdvisor>,
    settings: AppSettings,
    session_ttl: Duration,
}

impl SessionManager {
    pub fn new(advisor: DealerAdvisor, settings: AppSettings) -> Self {
        let ttl = Duration::from_secs(settings.session_ttl_minutes * 60);
        Self::with_ttl(advisor, settings, ttl)
    }

    pub fn with_ttl(advisor: DealerAdvisor, settings: AppSettings, ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            advisor: Arc::new(advisor),
            settings,
            session_ttl: ttl,
        }
    }

    /// Opens a new table with the given (or default) bankroll. An optional
    /// seed makes every round of the session reproducible.
    pub fn create_session(
        &self,
        bankroll: Option<i64>,
        seed: Option<u64>,
    ) -> Result<(SessionId, GameView), SessionError> {
        let id = Uuid::new_v4().to_string();
        let bankroll = bankroll.unwrap_or(self.settings.starting_bankroll);

        tracing::info!(session_id = %id, bankroll, seed = ?seed, "creating new game session");

        let session = Arc::new(GameSession::new(id.clone(), bankroll, seed));
        let view = session.view()?;
        {
            let mut guard = self
                .sessions
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.insert(id.clone(), session);
        }
        Ok((id, view))
    }

    /// Current projection of the session's round.
    pub fn view(&self, session_id: &SessionId) -> Result<GameView, SessionError> {
        let session = self.checked_session(session_id)?;
        session.view()
    }

    /// Applies one game action and returns the updated projection. The
    /// dealer's turn on `stand` runs against the advisor without holding the
    /// session lock across any await.
    pub async fn process_action(
        &self,
        session_id: &SessionId,
        action: GameAction,
        bet: Option<u32>,
    ) -> Result<GameView, SessionError> {
        let session = self.checked_session(session_id)?;

        match action {
            GameAction::Start => {
                let bet = bet.unwrap_or(self.settings.default_bet);
                let mut round = session
                    .round
                    .lock()
                    .map_err(|_| SessionError::StoragePoisoned)?;
                round.start(bet, session.seed)?;
                tracing::info!(
                    session_id = %session_id,
                    bet,
                    phase = ?round.phase(),
                    "round started"
                );
                Ok(GameView::render(&round))
            }
            GameAction::Hit => {
                let mut round = session
                    .round
                    .lock()
                    .map_err(|_| SessionError::StoragePoisoned)?;
                round.hit()?;
                tracing::debug!(
                    session_id = %session_id,
                    player_score = round.player_hand().score(),
                    phase = ?round.phase(),
                    "player hit"
                );
                Ok(GameView::render(&round))
            }
            GameAction::Stand => self.run_dealer_turn(session_id, &session).await,
        }
    }

    /// Drives the dealer to completion on a copy of the round, then writes
    /// the settled round back. Bounded by the advisor timeout per draw and
    /// the 21-or-empty-deck stop conditions. The session lock is not held
    /// across advisor awaits, so another request may touch the round in the
    /// meantime; the write-back verifies the stored round is untouched since
    /// the copy was taken and rejects the stand otherwise, so a concurrent
    /// action is never overwritten.
    async fn run_dealer_turn(
        &self,
        session_id: &SessionId,
        session: &GameSession,
    ) -> Result<GameView, SessionError> {
        let snapshot = {
            let guard = session
                .round
                .lock()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.clone()
        };
        let mut working = snapshot.clone();
        working.stand()?;

        while working.phase() == Phase::DealerTurn && !working.dealer_turn_over() {
            let decision = self
                .advisor
                .decide(
                    working.player_hand().cards(),
                    working.dealer_hand().cards(),
                )
                .await;
            match decision {
                twentyone_engine::round::DealerMove::Hit => working.dealer_draw()?,
                twentyone_engine::round::DealerMove::Stand => break,
            }
        }
        let outcome = working.settle()?;

        tracing::info!(
            session_id = %session_id,
            ?outcome,
            player_score = working.player_hand().score(),
            dealer_score = working.dealer_hand().score(),
            bankroll = working.bankroll(),
            "round settled"
        );

        let view = GameView::render(&working);
        let mut guard = session
            .round
            .lock()
            .map_err(|_| SessionError::StoragePoisoned)?;
        if *guard != snapshot {
            tracing::debug!(
                session_id = %session_id,
                phase = ?guard.phase(),
                "round changed during the dealer turn, discarding it"
            );
            return Err(RoundError::IllegalTransition {
                action: "stand",
                phase: guard.phase(),
            }
            .into());
        }
        *guard = working;
        Ok(view)
    }

    pub fn delete_session(&self, session_id: &SessionId) -> Result<(), SessionError> {
        let removed = self
            .sessions
            .write()
            .map_err(|_| SessionError::StoragePoisoned)?
            .remove(session_id);
        match removed {
            Some(_) => {
                tracing::info!(session_id = %session_id, "session deleted");
                Ok(())
            }
            None => Err(SessionError::NotFound(session_id.clone())),
        }
    }

    pub fn cleanup_expired_sessions(&self) {
        let mut guard = match self.sessions.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.retain(|id, session| {
            let keep = !session.is_expired(self.session_ttl);
            if !keep {
                tracing::info!(session_id = %id, "session expired");
            }
            keep
        });
    }

    pub fn active_sessions(&self) -> Vec<SessionId> {
        match self.sessions.read() {
            Ok(guard) => guard.keys().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    fn checked_session(&self, session_id: &SessionId) -> Result<Arc<GameSession>, SessionError> {
        let session = {
            let guard = self
                .sessions
                .read()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard
                .get(session_id)
                .cloned()
                .ok_or_else(|| SessionError::NotFound(session_id.clone()))?
        };
        if session.is_expired(self.session_ttl) {
            let mut guard = self
                .sessions
                .write()
                .map_err(|_| SessionError::StoragePoisoned)?;
            guard.remove(session_id);
            return Err(SessionError::Expired(session_id.clone()));
        }
        session.touch();
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SessionManager {
        SessionManager::new(DealerAdvisor::without_client(), AppSettings::default())
    }

    #[test]
    fn action_parsing_accepts_only_the_three_verbs() {
        assert_eq!(GameAction::parse("start"), Some(GameAction::Start));
        assert_eq!(GameAction::parse("hit"), Some(GameAction::Hit));
        assert_eq!(GameAction::parse("stand"), Some(GameAction::Stand));
        assert_eq!(GameAction::parse("split"), None);
        assert_eq!(GameAction::parse("START"), None);
        assert_eq!(GameAction::parse(""), None);
    }

    #[test]
    fn new_session_waits_for_a_bet() {
        let manager = manager();
        let (id, view) = manager.create_session(None, None).expect("create");

        assert!(!view.ended);
        assert!(view.player_hand.is_empty());
        assert_eq!(view.bankroll, 1_000);
        assert_eq!(manager.active_sessions(), vec![id]);
    }

    #[test]
    fn unknown_session_is_not_found() {
        let manager = manager();
        let err = manager.view(&"nope".to_string()).expect_err("missing");
        assert!(matches!(err, SessionError::NotFound(_)));
    }

    #[tokio::test]
    async fn start_deals_and_deducts_the_bet() {
        let manager = manager();
        let (id, _) = manager.create_session(Some(500), None).expect("create");

        let view = manager
            .process_action(&id, GameAction::Start, Some(50))
            .await
            .expect("start");

        assert_eq!(view.player_hand.len(), 2);
        if view.ended {
            // only a natural blackjack ends an opening deal
            assert_eq!(view.bankroll, 550);
            assert_eq!(view.message, "Blackjack! Player wins.");
        } else {
            assert_eq!(view.bankroll, 450);
            assert_eq!(view.dealer_hand.len(), 1, "hole card stays hidden");
        }
    }

    #[tokio::test]
    async fn hit_before_start_is_an_illegal_transition() {
        let manager = manager();
        let (id, _) = manager.create_session(None, None).expect("create");

        let err = manager
            .process_action(&id, GameAction::Hit, None)
            .await
            .expect_err("must fail");
        assert!(matches!(
            err,
            SessionError::Round(RoundError::IllegalTransition { .. })
        ));

        // the failed action must not have dealt anything
        let view = manager.view(&id).expect("view");
        assert!(view.player_hand.is_empty());
    }

    #[tokio::test]
    async fn standing_settles_the_round_and_reveals_the_dealer() {
        let manager = manager();
        let (id, _) = manager.create_session(Some(1_000), None).expect("create");

        let after_start = manager
            .process_action(&id, GameAction::Start, Some(10))
            .await
            .expect("start");
        if after_start.ended {
            return; // natural blackjack; nothing left to stand on
        }

        let view = manager
            .process_action(&id, GameAction::Stand, None)
            .await
            .expect("stand");

        assert!(view.ended);
        assert!(view.dealer_hand.len() >= 2, "full dealer hand revealed");
        assert!(!view.message.is_empty());
        // win, push, or loss on a 10 bet from 1000
        assert!(
            [990, 1_000, 1_010].contains(&view.bankroll),
            "unexpected bankroll {}",
            view.bankroll
        );

        // a settled round rejects further play
        let err = manager
            .process_action(&id, GameAction::Stand, None)
            .await
            .expect_err("settled round");
        assert!(matches!(
            err,
            SessionError::Round(RoundError::IllegalTransition { .. })
        ));
    }

    #[tokio::test]
    async fn concurrent_hit_during_the_dealer_turn_wins_over_the_stand() {
        use crate::advisor::{AdvisorClient, AdvisorError};
        use async_trait::async_trait;
        use twentyone_engine::cards::{Card, Rank, Suit};
        use twentyone_engine::deck::Deck;
        use twentyone_engine::hand::Hand;

        struct SlowStand;

        #[async_trait]
        impl AdvisorClient for SlowStand {
            async fn suggest(&self, _prompt: &str) -> Result<String, AdvisorError> {
                tokio::time::sleep(Duration::from_millis(200)).await;
                Ok("STAND".to_string())
            }
        }

        let advisor = DealerAdvisor::new(
            Some(Box::new(SlowStand)),
            Duration::from_secs(1),
            Some(17),
        );
        let manager = Arc::new(SessionManager::new(advisor, AppSettings::default()));
        let (id, _) = manager.create_session(Some(1_000), None).expect("create");

        // put a live round on the table: player 19, dealer 17 so the stand
        // consults the advisor, and one safe card left for the hit to draw
        {
            let guard = manager.sessions.read().expect("sessions");
            let session = guard.get(&id).expect("session");
            let mut round = session.round.lock().expect("round");
            *round = RoundState::from_parts(
                Deck::from_cards(vec![Card::new(Suit::Spades, Rank::Two)]),
                Hand::from_cards(vec![
                    Card::new(Suit::Spades, Rank::Ten),
                    Card::new(Suit::Hearts, Rank::Nine),
                ]),
                Hand::from_cards(vec![
                    Card::new(Suit::Clubs, Rank::Ten),
                    Card::new(Suit::Diamonds, Rank::Seven),
                ]),
                10,
                990,
                Phase::InPlay,
                None,
            );
        }

        let stand = tokio::spawn({
            let manager = Arc::clone(&manager);
            let id = id.clone();
            async move { manager.process_action(&id, GameAction::Stand, None).await }
        });

        // let the stand reach the advisor await, then hit the stored round
        tokio::time::sleep(Duration::from_millis(50)).await;
        manager
            .process_action(&id, GameAction::Hit, None)
            .await
            .expect("hit");

        let result = stand.await.expect("join");
        assert!(matches!(
            result,
            Err(SessionError::Round(RoundError::IllegalTransition { .. }))
        ));

        // the hit is what persisted; the settled copy was discarded
        let view = manager.view(&id).expect("view");
        assert!(!view.ended);
        assert_eq!(view.player_hand.len(), 3);
        assert_eq!(view.player_score, 21);
    }

    #[tokio::test]
    async fn settled_session_can_start_the_next_round() {
        let manager = manager();
        let (id, _) = manager.create_session(Some(1_000), None).expect("create");

        let first = manager
            .process_action(&id, GameAction::Start, Some(10))
            .await
            .expect("start");
        if !first.ended {
            manager
                .process_action(&id, GameAction::Stand, None)
                .await
                .expect("stand");
        }

        let next = manager
            .process_action(&id, GameAction::Start, Some(10))
            .await
            .expect("next round");
        assert_eq!(next.player_hand.len(), 2);
    }

    #[test]
    fn zero_ttl_expires_sessions_immediately() {
        let manager = SessionManager::with_ttl(
            DealerAdvisor::without_client(),
            AppSettings::default(),
            Duration::ZERO,
        );
        let (id, _) = manager.create_session(None, None).expect("create");

        let err = manager.view(&id).expect_err("expired");
        assert!(matches!(err, SessionError::Expired(_)));
        // the expired session is gone on the next touch
        assert!(matches!(
            manager.view(&id).expect_err("removed"),
            SessionError::NotFound(_)
        ));
    }

    #[test]
    fn cleanup_drops_expired_sessions() {
        let manager = SessionManager::with_ttl(
            DealerAdvisor::without_client(),
            AppSettings::default(),
            Duration::ZERO,
        );
        manager.create_session(None, None).expect("create");
        assert_eq!(manager.active_sessions().len(), 1);

        manager.cleanup_expired_sessions();
        assert!(manager.active_sessions().is_empty());
    }

    #[test]
    fn delete_session_removes_the_table() {
        let manager = manager();
        let (id, _) = manager.create_session(None, None).expect("create");

        manager.delete_session(&id).expect("delete");
        assert!(matches!(
            manager.view(&id).expect_err("gone"),
            SessionError::NotFound(_)
        ));
        assert!(matches!(
            manager.delete_session(&id).expect_err("already gone"),
            SessionError::NotFound(_)
        ));
    }

    #[test]
    fn session_errors_map_to_distinct_http_codes() {
        use crate::errors::IntoErrorResponse;

        assert_eq!(
            SessionError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            SessionError::Expired("x".into()).status_code(),
            StatusCode::GONE
        );
        assert_eq!(
            SessionError::InvalidAction("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            SessionError::Round(RoundError::EmptyDeck).error_code(),
            "empty_deck"
        );
        assert_eq!(
            SessionError::Round(RoundError::IllegalTransition {
                action: "hit",
                phase: Phase::Settled,
            })
            .status_code(),
            StatusCode::CONFLICT
        );
    }
}
