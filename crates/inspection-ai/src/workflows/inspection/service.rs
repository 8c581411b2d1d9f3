use std::sync::Arc;

use super::access::AccessDenied;
use super::domain::{ReportId, ReportStatus};
use super::evaluation::InspectionEvaluator;
use super::repository::{InspectionRepository, RepositoryError};
use super::review::ReviewService;
use super::store::ReportStore;
use super::submission::SubmissionService;

/// Error raised by the submission and review services.
#[derive(Debug, thiserror::Error)]
pub enum ReportServiceError {
    #[error(transparent)]
    Forbidden(#[from] AccessDenied),
    #[error("invalid request: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("{id} is already {current}")]
    InvalidTransition { id: ReportId, current: ReportStatus },
    #[error(transparent)]
    Store(RepositoryError),
}

impl From<RepositoryError> for ReportServiceError {
    fn from(value: RepositoryError) -> Self {
        match value {
            RepositoryError::NotFound(entity) => Self::NotFound(entity),
            RepositoryError::Conflict { id, current } => Self::InvalidTransition { id, current },
            other => Self::Store(other),
        }
    }
}

/// Submission and review services sharing one report store.
pub struct InspectionWorkflow<R> {
    submission: SubmissionService<R>,
    review: ReviewService<R>,
}

impl<R> InspectionWorkflow<R>
where
    R: InspectionRepository + 'static,
{
    pub fn new(repository: Arc<R>, evaluator: InspectionEvaluator) -> Self {
        let store = ReportStore::new(repository);
        Self {
            submission: SubmissionService::new(store.clone(), Arc::new(evaluator)),
            review: ReviewService::new(store),
        }
    }

    pub fn submission(&self) -> &SubmissionService<R> {
        &self.submission
    }

    pub fn review(&self) -> &ReviewService<R> {
        &self.review
    }
}
