//! Inspection report submission, evaluation, and review.
//!
//! Inspectors submit checklist answers through [`SubmissionService`]; the
//! [`InspectionEvaluator`] scores them before anything is persisted, and admins decide the
//! resulting `PENDING` reports through [`ReviewService`]. Decisions are one-way: a report that
//! is approved or rejected stays that way.

pub mod access;
pub mod domain;
pub mod evaluation;
pub mod repository;
pub mod review;
pub mod router;
pub mod service;
pub mod store;
pub mod submission;

#[cfg(test)]
mod tests;

pub use access::AccessDenied;
pub use domain::{
    Answers, Caller, DashboardStats, EvaluationResult, FieldDefinition, FieldKind, FormId,
    FormSummary, InspectionForm, InspectionReport, InspectorSummary, PagedReports, ReportId,
    ReportListItem, ReportStats, ReportStatus, Role, UserId,
};
pub use evaluation::{
    GenerationError, HeuristicEvaluator, InspectionEvaluator, ModelEvaluator, TextGenerator,
};
pub use repository::{
    DirectoryCounts, InspectionRepository, NewReport, ReportContext, RepositoryError,
};
pub use review::ReviewService;
pub use router::report_router;
pub use service::{InspectionWorkflow, ReportServiceError};
pub use store::{ReportPage, ReportStore};
pub use submission::SubmissionService;
