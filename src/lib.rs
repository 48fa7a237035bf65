//! Procurement marketplace service: buyers publish opportunity briefs,
//! approved sellers respond, and every state change leaves an audit trail.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
