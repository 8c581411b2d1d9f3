use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{
    Answers, FormId, FormSummary, InspectionReport, InspectorSummary, ReportId, ReportStatus,
    UserId,
};

/// Report fields fixed at submission time; the store assigns id, status, and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReport {
    pub form_id: FormId,
    pub inspector_id: UserId,
    pub data: Answers,
    pub score: u8,
    pub summary: String,
}

/// Row counts for the entities managed outside the report workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryCounts {
    pub users: usize,
    pub forms: usize,
    pub guidelines: usize,
}

/// Directory details for the inspectors and forms referenced by a page of reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportContext {
    pub inspectors: HashMap<UserId, InspectorSummary>,
    pub forms: HashMap<FormId, FormSummary>,
}

/// Entity store abstraction so the workflow can be exercised in isolation.
pub trait InspectionRepository: Send + Sync {
    /// Persists a `PENDING` report; fails with `NotFound` for unknown forms or inspectors.
    fn insert(&self, report: NewReport) -> Result<InspectionReport, RepositoryError>;
    /// Atomically moves a report from `from` to `to`, failing with `Conflict` when the
    /// stored status is not `from`.
    fn transition(
        &self,
        id: ReportId,
        from: ReportStatus,
        to: ReportStatus,
    ) -> Result<InspectionReport, RepositoryError>;
    /// All reports, or only those submitted by `inspector` when given. Order is unspecified.
    fn reports(&self, inspector: Option<UserId>) -> Result<Vec<InspectionReport>, RepositoryError>;
    fn directory_counts(&self) -> Result<DirectoryCounts, RepositoryError>;
    /// Looks up display details for the given ids. Unknown ids are left out of the result.
    fn report_context(
        &self,
        inspectors: &[UserId],
        forms: &[FormId],
    ) -> Result<ReportContext, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{0} not found")]
    NotFound(String),
    #[error("{id} is {current}, not pending")]
    Conflict { id: ReportId, current: ReportStatus },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
