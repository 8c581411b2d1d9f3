//! Inspection report evaluation and approval workflow.
//!
//! Inspectors submit checklist answers, an evaluator scores them, and admins approve or reject
//! the resulting reports. See [`workflows::inspection`] for the services and HTTP router.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
