//! Policy Agent - air-quality speed reduction
//!
//! Asks a completion provider for a reduction off the 80 km/h baseline.
//! Never fails: any provider error, timeout or bad reply becomes the
//! zero-reduction fallback.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::completion::{CompletionError, CompletionProvider, CompletionRequest};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Speed limit before any air-quality reduction (km/h)
pub const BASELINE_SPEED: u32 = 80;

/// Lowest speed the policy branch may produce (km/h)
pub const POLICY_FLOOR_SPEED: u32 = 30;

pub const FALLBACK_REASON: &str = "service error — safe baseline";

pub const SCHEMA_NAME: &str = "speed_reduction";

const SYSTEM_PROMPT: &str = "You are an automated traffic control system for a highway. \
Decide whether the speed limit (normally 80 km/h) must be reduced because of poor air quality (AQI).\n\n\
RULES:\n\
1. AQI 0-50 (Good): the reduction is ALWAYS 0 km/h.\n\
2. AQI 51-100 (Moderate): the reduction is usually 0 km/h.\n\
3. AQI 101-150 (Unhealthy for sensitive groups): suggest a mild reduction of 10-20 km/h.\n\
4. AQI above 150 (Unhealthy/Hazardous): suggest a significant reduction of 30-40 km/h to minimize emissions.\n\n\
Answer with the reduction in km/h and one concise sentence of reasoning.";

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReductionDecision {
    pub reduction_kmh: u32,
    pub reason: String,
}

impl ReductionDecision {
    pub fn fallback() -> Self {
        Self {
            reduction_kmh: 0,
            reason: FALLBACK_REASON.to_string(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.reduction_kmh == 0 && self.reason == FALLBACK_REASON
    }

    pub fn speed_limit(&self) -> u32 {
        derive_policy_speed(self.reduction_kmh)
    }
}

/// Raw provider reply, exactly the schema fields
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ProviderReply {
    reduction_kmh: i64,
    reason: String,
}

/// `max(30, 80 - reduction)`
pub fn derive_policy_speed(reduction_kmh: u32) -> u32 {
    BASELINE_SPEED
        .saturating_sub(reduction_kmh)
        .max(POLICY_FLOOR_SPEED)
}

pub fn reduction_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "reduction_kmh": {
                "type": "integer",
                "description": "Amount to reduce the speed limit by in km/h (e.g. 0, 10, 20)"
            },
            "reason": {
                "type": "string",
                "description": "Concise reason for the decision based on the AQI rules"
            }
        },
        "required": ["reduction_kmh", "reason"],
        "additionalProperties": false
    })
}

pub fn build_request(aqi: u32) -> CompletionRequest {
    CompletionRequest {
        system_prompt: SYSTEM_PROMPT.to_string(),
        user_prompt: format!(
            "The current Air Quality Index (AQI) is {}. Calculate the reduction.",
            aqi
        ),
        temperature: 0.0,
        schema_name: SCHEMA_NAME.to_string(),
        schema: reduction_schema(),
    }
}

/// Parse and validate the provider's JSON content
pub fn parse_reply(content: &str) -> Result<ReductionDecision, CompletionError> {
    let reply: ProviderReply =
        serde_json::from_str(content).map_err(|e| CompletionError::Schema(e.to_string()))?;

    if reply.reduction_kmh < 0 {
        return Err(CompletionError::Schema(format!(
            "negative reduction: {}",
            reply.reduction_kmh
        )));
    }
    let reduction_kmh = u32::try_from(reply.reduction_kmh)
        .map_err(|_| CompletionError::Schema(format!("reduction out of range: {}", reply.reduction_kmh)))?;

    let reason = reply.reason.trim();
    if reason.is_empty() {
        return Err(CompletionError::Schema("empty reason".to_string()));
    }

    Ok(ReductionDecision {
        reduction_kmh,
        reason: reason.to_string(),
    })
}

// ============================================================================
// AGENT
// ============================================================================

#[derive(Clone)]
pub struct PolicyAgent {
    provider: Arc<dyn CompletionProvider>,
    timeout: Duration,
}

impl PolicyAgent {
    pub fn new(provider: Arc<dyn CompletionProvider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Reduction for an AQI value. Falls back to `{0, FALLBACK_REASON}` on
    /// any provider failure.
    pub async fn recommend_reduction(&self, aqi: u32) -> ReductionDecision {
        match self.try_recommend(aqi).await {
            Ok(decision) => {
                tracing::debug!(
                    "Policy reduction for AQI {}: {} km/h ({})",
                    aqi,
                    decision.reduction_kmh,
                    decision.reason
                );
                decision
            }
            Err(e) => {
                tracing::warn!("Policy agent fallback for AQI {}: {}", aqi, e);
                ReductionDecision::fallback()
            }
        }
    }

    async fn try_recommend(&self, aqi: u32) -> Result<ReductionDecision, CompletionError> {
        let request = build_request(aqi);

        let content = tokio::time::timeout(self.timeout, self.provider.complete(&request))
            .await
            .map_err(|_| CompletionError::Timeout)??;

        parse_reply(&content)
    }
}

impl std::fmt::Debug for PolicyAgent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PolicyAgent")
            .field("provider", &self.provider.name())
            .field("timeout", &self.timeout)
            .finish()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Provider that replays a fixed reply and records requests
    struct ScriptedProvider {
        reply: Result<String, CompletionError>,
        delay: Option<Duration>,
        requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedProvider {
        fn replying(content: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(content.to_string()),
                delay: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn failing(error: CompletionError) -> Arc<Self> {
            Arc::new(Self {
                reply: Err(error),
                delay: None,
                requests: Mutex::new(Vec::new()),
            })
        }

        fn slow(delay: Duration) -> Arc<Self> {
            Arc::new(Self {
                reply: Ok(r#"{"reduction_kmh": 20, "reason": "late"}"#.to_string()),
                delay: Some(delay),
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for ScriptedProvider {
        async fn complete(&self, request: &CompletionRequest) -> Result<String, CompletionError> {
            self.requests.lock().unwrap().push(request.clone());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            self.reply.clone()
        }

        fn name(&self) -> &str {
            "scripted"
        }
    }

    fn agent(provider: Arc<ScriptedProvider>) -> PolicyAgent {
        PolicyAgent::new(provider, Duration::from_millis(200))
    }

    #[test]
    fn test_derive_policy_speed() {
        assert_eq!(derive_policy_speed(0), 80);
        assert_eq!(derive_policy_speed(10), 70);
        assert_eq!(derive_policy_speed(20), 60);
        assert_eq!(derive_policy_speed(30), 50);
        assert_eq!(derive_policy_speed(40), 40);
        assert_eq!(derive_policy_speed(50), 30);
        assert_eq!(derive_policy_speed(500), 30);
        assert_eq!(derive_policy_speed(u32::MAX), 30);
    }

    #[test]
    fn test_derive_policy_speed_is_unrounded() {
        assert_eq!(derive_policy_speed(5), 75);
        assert_eq!(derive_policy_speed(15), 65);
        assert_eq!(derive_policy_speed(35), 45);

        for reduction in 0..=100 {
            let expected = (80 - reduction as i64).max(30) as u32;
            assert_eq!(derive_policy_speed(reduction), expected, "reduction {}", reduction);
        }
    }

    #[test]
    fn test_parse_reply() {
        let decision = parse_reply(r#"{"reduction_kmh": 10, "reason": " moderate haze "}"#).unwrap();
        assert_eq!(decision.reduction_kmh, 10);
        assert_eq!(decision.reason, "moderate haze");
    }

    #[test]
    fn test_parse_reply_rejects_bad_shapes() {
        for content in [
            "not json",
            r#"{"reduction_kmh": 10}"#,
            r#"{"reason": "x"}"#,
            r#"{"reduction_kmh": "10", "reason": "x"}"#,
            r#"{"reduction_kmh": 10.5, "reason": "x"}"#,
            r#"{"reduction_kmh": 10, "reason": "x", "extra": true}"#,
            r#"{"reduction_kmh": -10, "reason": "x"}"#,
            r#"{"reduction_kmh": 10, "reason": "   "}"#,
        ] {
            assert!(
                matches!(parse_reply(content), Err(CompletionError::Schema(_))),
                "accepted: {}",
                content
            );
        }
    }

    #[test]
    fn test_request_is_deterministic_and_strict() {
        let request = build_request(120);
        assert_eq!(request.temperature, 0.0);
        assert!(request.user_prompt.contains("120"));
        assert!(request.system_prompt.contains("0-50"));
        assert_eq!(request.schema["additionalProperties"], false);
        assert_eq!(request.schema["properties"]["reduction_kmh"]["type"], "integer");
        assert_eq!(build_request(120), request);
    }

    #[tokio::test]
    async fn test_good_air_no_reduction() {
        let provider = ScriptedProvider::replying(r#"{"reduction_kmh": 0, "reason": "Good air"}"#);
        let decision = agent(provider.clone()).recommend_reduction(20).await;

        assert_eq!(decision.reduction_kmh, 0);
        assert_eq!(decision.speed_limit(), 80);
        assert!(!decision.is_fallback());

        let requests = provider.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].user_prompt.contains("20"));
    }

    #[tokio::test]
    async fn test_hazardous_air_reduction() {
        let provider =
            ScriptedProvider::replying(r#"{"reduction_kmh": 40, "reason": "Hazardous air"}"#);
        let decision = agent(provider).recommend_reduction(200).await;

        assert_eq!(decision.reduction_kmh, 40);
        assert_eq!(decision.speed_limit(), 40);
    }

    #[tokio::test]
    async fn test_provider_errors_fall_back() {
        for error in [
            CompletionError::NotConfigured("missing API key".to_string()),
            CompletionError::Network("connection refused".to_string()),
            CompletionError::Status(503),
            CompletionError::Refusal("no".to_string()),
        ] {
            let decision = agent(ScriptedProvider::failing(error)).recommend_reduction(150).await;
            assert_eq!(decision, ReductionDecision::fallback());
            assert_eq!(decision.speed_limit(), 80);
        }
    }

    #[tokio::test]
    async fn test_schema_failure_falls_back() {
        let provider = ScriptedProvider::replying(r#"{"reduction_kmh": -20, "reason": "odd"}"#);
        let decision = agent(provider).recommend_reduction(150).await;
        assert!(decision.is_fallback());
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let provider = ScriptedProvider::slow(Duration::from_secs(5));
        let agent = PolicyAgent::new(provider, Duration::from_millis(20));

        let decision = agent.recommend_reduction(150).await;
        assert!(decision.is_fallback());
    }
}
