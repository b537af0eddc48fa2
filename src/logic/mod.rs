//! Logic Module - decision pipeline
//!
//! - `router` - hard safety thresholds (darkness, black ice)
//! - `features/`, `model/` - feature layout, fitted artifacts, risk scoring
//! - `optimizer` - highest ladder speed under the risk budget
//! - `policy/` - air-quality reduction through a completion provider
//! - `transport` - in-process or HTTP access to optimizer and agent
//! - `controller` - routes one snapshot to a final speed limit

pub mod controller;
pub mod features;
pub mod model;
pub mod optimizer;
pub mod policy;
pub mod router;
pub mod sensors;
pub mod transport;
