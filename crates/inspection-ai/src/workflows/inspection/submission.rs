use std::sync::Arc;

use tracing::info;

use super::access::{self, SUBMIT_REPORT};
use super::domain::{Answers, Caller, FormId, InspectionReport};
use super::evaluation::InspectionEvaluator;
use super::repository::InspectionRepository;
use super::service::ReportServiceError;
use super::store::ReportStore;

/// Scores inspector submissions and persists them as pending reports.
pub struct SubmissionService<R> {
    store: ReportStore<R>,
    evaluator: Arc<InspectionEvaluator>,
}

impl<R> SubmissionService<R>
where
    R: InspectionRepository + 'static,
{
    pub fn new(store: ReportStore<R>, evaluator: Arc<InspectionEvaluator>) -> Self {
        Self { store, evaluator }
    }

    /// Evaluates `answers` and stores exactly one `PENDING` report for the caller.
    ///
    /// Evaluation completes before anything is written, so a report is never visible without
    /// its score and summary.
    pub async fn submit_report(
        &self,
        caller: Caller,
        form_id: FormId,
        answers: Answers,
    ) -> Result<InspectionReport, ReportServiceError> {
        access::require(caller.role, SUBMIT_REPORT)?;

        let evaluation = self.evaluator.evaluate(&answers).await;
        info!(
            inspector = caller.id.0,
            form = form_id.0,
            score = evaluation.score,
            strategy = self.evaluator.strategy_label(),
            "inspection evaluated"
        );

        Ok(self.store.create(form_id, caller.id, answers, evaluation)?)
    }
}
