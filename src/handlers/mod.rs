//! HTTP handlers

pub mod decision;
pub mod health;
pub mod policy;
pub mod risk;
pub mod router;
