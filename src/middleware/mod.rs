//! Request extractors

pub mod validation;

pub use validation::ValidatedJson;
