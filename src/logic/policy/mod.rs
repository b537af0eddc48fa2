//! Policy Module - air-quality reduction through a completion provider

pub mod agent;
pub mod completion;

pub use agent::{
    derive_policy_speed, PolicyAgent, ReductionDecision, BASELINE_SPEED, FALLBACK_REASON,
    POLICY_FLOOR_SPEED,
};
pub use completion::{
    CompletionError, CompletionProvider, CompletionRequest, OpenAiConfig, OpenAiProvider,
};
