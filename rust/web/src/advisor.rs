//! Remote dealer advisor with a deterministic fallback.
//!
//! The round's correctness never depends on the advisory service: absence of
//! configuration, an error, an unparseable reply, and a timeout all degrade
//! to the house rule from `twentyone_advisor`. Failures are logged and
//! absorbed here; nothing advisor-related reaches the HTTP caller.

use async_trait::async_trait;
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;
use twentyone_advisor::threshold::ThresholdPolicy;
use twentyone_advisor::DealerPolicy;
use twentyone_engine::cards::Card;
use twentyone_engine::hand::score_hand;
use twentyone_engine::round::DealerMove;

use crate::settings::AdvisorSettings;

#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("advisor request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("advisor response carried no text")]
    EmptyResponse,
}

/// One advisory call: both hands in, free-form text out. Implemented by the
/// real remote client and by test stubs.
#[async_trait]
pub trait AdvisorClient: Send + Sync {
    async fn suggest(&self, prompt: &str) -> Result<String, AdvisorError>;
}

/// Client for the Gemini generateContent endpoint.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        )
    }
}

#[async_trait]
impl AdvisorClient for GeminiClient {
    async fn suggest(&self, prompt: &str) -> Result<String, AdvisorError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });
        let response = self
            .http
            .post(self.endpoint())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        let payload: serde_json::Value = response.json().await?;
        payload["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .map(str::to_owned)
            .ok_or(AdvisorError::EmptyResponse)
    }
}

/// Dealer decision driver: mandatory-hit floor first, then the remote advisor
/// (bounded by a timeout, no retry), then the house rule.
pub struct DealerAdvisor {
    client: Option<Box<dyn AdvisorClient>>,
    fallback: ThresholdPolicy,
    timeout: Duration,
    hit_floor: Option<u32>,
}

impl std::fmt::Debug for DealerAdvisor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DealerAdvisor")
            .field("remote", &self.client.is_some())
            .field("timeout", &self.timeout)
            .field("hit_floor", &self.hit_floor)
            .finish()
    }
}

impl DealerAdvisor {
    pub fn new(
        client: Option<Box<dyn AdvisorClient>>,
        timeout: Duration,
        hit_floor: Option<u32>,
    ) -> Self {
        Self {
            client,
            fallback: ThresholdPolicy::default(),
            timeout,
            hit_floor,
        }
    }

    /// House rule only; what every deployment without an API key runs.
    pub fn without_client() -> Self {
        Self::new(None, Duration::from_secs(3), Some(17))
    }

    pub fn from_settings(settings: &AdvisorSettings) -> Self {
        let client: Option<Box<dyn AdvisorClient>> = settings
            .api_key
            .as_ref()
            .map(|key| {
                Box::new(GeminiClient::new(key.clone(), settings.model.clone()))
                    as Box<dyn AdvisorClient>
            });
        Self::new(
            client,
            Duration::from_millis(settings.timeout_ms),
            settings.hit_floor,
        )
    }

    pub fn is_remote(&self) -> bool {
        self.client.is_some()
    }

    /// Decide the dealer's next move. Never fails; advisor trouble degrades
    /// to the deterministic rule within the configured timeout.
    pub async fn decide(&self, player: &[Card], dealer: &[Card]) -> DealerMove {
        if let Some(floor) = self.hit_floor {
            if score_hand(dealer) < floor {
                return DealerMove::Hit;
            }
        }

        let Some(client) = &self.client else {
            return self.fallback.decide(player, dealer);
        };

        let prompt = build_prompt(player, dealer);
        match tokio::time::timeout(self.timeout, client.suggest(&prompt)).await {
            Ok(Ok(text)) => {
                let decision = if text.to_uppercase().contains("HIT") {
                    DealerMove::Hit
                } else {
                    DealerMove::Stand
                };
                tracing::debug!(reply = %text.trim(), ?decision, "advisor answered");
                decision
            }
            Ok(Err(err)) => {
                tracing::debug!(error = %err, "advisor call failed, using house rule");
                self.fallback.decide(player, dealer)
            }
            Err(_) => {
                tracing::debug!(timeout = ?self.timeout, "advisor call timed out, using house rule");
                self.fallback.decide(player, dealer)
            }
        }
    }
}

fn build_prompt(player: &[Card], dealer: &[Card]) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "You are the dealer in a blackjack game and want to beat the player."
    );
    let _ = writeln!(
        prompt,
        "Your hand: {} (score {})",
        format_hand(dealer),
        score_hand(dealer)
    );
    let _ = writeln!(
        prompt,
        "Player's hand: {} (score {})",
        format_hand(player),
        score_hand(player)
    );
    let _ = writeln!(prompt, "Answer with exactly one word: HIT or STAND.");
    prompt
}

fn format_hand(cards: &[Card]) -> String {
    cards
        .iter()
        .map(|card| card.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
