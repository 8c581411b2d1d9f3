use std::sync::Arc;

use tracing::info;

use super::domain::{
    Answers, DashboardStats, EvaluationResult, FormId, InspectionReport, ReportId,
    ReportListItem, ReportStats, ReportStatus, Role, UserId,
};
use super::repository::{InspectionRepository, NewReport, RepositoryError};

/// One page of reports plus the size of the whole visible set.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportPage {
    pub items: Vec<InspectionReport>,
    pub total: usize,
}

/// Owns report records and their status transitions on top of the entity store.
pub struct ReportStore<R> {
    repository: Arc<R>,
}

impl<R> Clone for ReportStore<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R> ReportStore<R>
where
    R: InspectionRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    pub fn create(
        &self,
        form_id: FormId,
        inspector_id: UserId,
        data: Answers,
        evaluation: EvaluationResult,
    ) -> Result<InspectionReport, RepositoryError> {
        let report = self.repository.insert(NewReport {
            form_id,
            inspector_id,
            data,
            score: evaluation.score,
            summary: evaluation.summary,
        })?;
        info!(report = report.id.0, score = report.score, "inspection report stored");
        Ok(report)
    }

    /// Newest-first page of the reports `role` may see; inspectors only see their own.
    ///
    /// `page` is 1-based. Pages past the end are empty but still report the full total.
    pub fn list_visible_to(
        &self,
        role: Role,
        user_id: UserId,
        page: u32,
        page_size: u32,
    ) -> Result<ReportPage, RepositoryError> {
        let owner = match role {
            Role::Inspector => Some(user_id),
            Role::Admin | Role::Manager | Role::HotelManager => None,
        };

        let mut reports = self.repository.reports(owner)?;
        reports.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });

        let total = reports.len();
        let offset = (page.max(1) as usize - 1).saturating_mul(page_size as usize);
        let items = reports
            .into_iter()
            .skip(offset)
            .take(page_size as usize)
            .collect();

        Ok(ReportPage { items, total })
    }

    /// Joins each report with its inspector's name and email and its form's title.
    pub fn with_context(
        &self,
        reports: Vec<InspectionReport>,
    ) -> Result<Vec<ReportListItem>, RepositoryError> {
        let mut inspectors: Vec<UserId> =
            reports.iter().map(|report| report.inspector_id).collect();
        inspectors.sort_unstable();
        inspectors.dedup();
        let mut forms: Vec<FormId> = reports.iter().map(|report| report.form_id).collect();
        forms.sort_unstable();
        forms.dedup();

        let context = self.repository.report_context(&inspectors, &forms)?;
        Ok(reports
            .into_iter()
            .map(|report| ReportListItem {
                inspector: context.inspectors.get(&report.inspector_id).cloned(),
                form: context.forms.get(&report.form_id).cloned(),
                report,
            })
            .collect())
    }

    /// Decides a pending report; score, summary, and answers are left untouched.
    pub fn update_status(
        &self,
        id: ReportId,
        status: ReportStatus,
    ) -> Result<InspectionReport, RepositoryError> {
        let report = self
            .repository
            .transition(id, ReportStatus::Pending, status)?;
        info!(report = id.0, status = %status, "inspection report decided");
        Ok(report)
    }

    pub fn aggregate_stats(&self) -> Result<ReportStats, RepositoryError> {
        let reports = self.repository.reports(None)?;
        let total_reports = reports.len();
        let pending = count_status(&reports, ReportStatus::Pending);
        let approved = count_status(&reports, ReportStatus::Approved);
        let average_score = if total_reports == 0 {
            0.0
        } else {
            let sum: f64 = reports.iter().map(|report| f64::from(report.score)).sum();
            sum / total_reports as f64
        };

        Ok(ReportStats {
            total_reports,
            pending,
            approved,
            average_score,
        })
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats, RepositoryError> {
        let counts = self.repository.directory_counts()?;
        let pending_reports = count_status(&self.repository.reports(None)?, ReportStatus::Pending);

        Ok(DashboardStats {
            users: counts.users,
            forms: counts.forms,
            guidelines: counts.guidelines,
            pending_reports,
        })
    }
}

fn count_status(reports: &[InspectionReport], status: ReportStatus) -> usize {
    reports
        .iter()
        .filter(|report| report.status == status)
        .count()
}
