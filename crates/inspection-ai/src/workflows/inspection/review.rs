use tracing::debug;

use super::access::{self, DECIDE_REPORT, LIST_REPORTS, VIEW_STATS};
use super::domain::{
    Caller, DashboardStats, InspectionReport, PagedReports, ReportId, ReportStats, ReportStatus,
    Role,
};
use super::repository::InspectionRepository;
use super::service::ReportServiceError;
use super::store::ReportStore;

pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Admin decisions, report listings, and aggregate statistics.
pub struct ReviewService<R> {
    store: ReportStore<R>,
}

impl<R> ReviewService<R>
where
    R: InspectionRepository + 'static,
{
    pub fn new(store: ReportStore<R>) -> Self {
        Self { store }
    }

    /// Approves or rejects a pending report. Decided reports cannot be decided again.
    pub fn set_status(
        &self,
        caller_role: Role,
        id: ReportId,
        status: ReportStatus,
    ) -> Result<InspectionReport, ReportServiceError> {
        access::require(caller_role, DECIDE_REPORT)?;

        if !status.is_terminal() {
            return Err(ReportServiceError::Validation(format!(
                "status must be APPROVED or REJECTED, got {status}"
            )));
        }

        Ok(self.store.update_status(id, status)?)
    }

    pub fn get_stats(&self, caller_role: Role) -> Result<ReportStats, ReportServiceError> {
        access::require(caller_role, VIEW_STATS)?;
        Ok(self.store.aggregate_stats()?)
    }

    pub fn dashboard_stats(&self, caller_role: Role) -> Result<DashboardStats, ReportServiceError> {
        access::require(caller_role, VIEW_STATS)?;
        Ok(self.store.dashboard_stats()?)
    }

    pub fn list_reports(
        &self,
        caller: Caller,
        page: u32,
        page_size: u32,
    ) -> Result<PagedReports, ReportServiceError> {
        access::require(caller.role, LIST_REPORTS)?;

        if page == 0 {
            return Err(ReportServiceError::Validation(
                "page must be a positive integer".to_string(),
            ));
        }
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ReportServiceError::Validation(format!(
                "limit must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }

        let listing = self
            .store
            .list_visible_to(caller.role, caller.id, page, page_size)?;
        let total_pages = u32::try_from(listing.total.div_ceil(page_size as usize))
            .unwrap_or(u32::MAX);
        debug!(
            caller = caller.id.0,
            page,
            total = listing.total,
            "listed inspection reports"
        );

        Ok(PagedReports {
            reports: self.store.with_context(listing.items)?,
            page,
            total_pages,
        })
    }
}
