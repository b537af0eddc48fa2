//! Feature Module
//!
//! - `layout`: ordered feature names loaded from the risk artifacts
//! - `vector`: one model input row, built from reduced sensor readings

pub mod layout;
pub mod vector;

pub use layout::{FeatureLayout, FeatureSource, LayoutError, LayoutInfo, SPEED_LIMIT_FEATURE};
pub use vector::FeatureVector;
