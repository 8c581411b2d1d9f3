use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::inspection::domain::{
    Answers, Caller, FormId, FormSummary, InspectionReport, InspectorSummary, ReportId,
    ReportStatus, Role, UserId,
};
use crate::workflows::inspection::evaluation::{GenerationError, TextGenerator};
use crate::workflows::inspection::repository::{
    DirectoryCounts, InspectionRepository, NewReport, ReportContext, RepositoryError,
};
use crate::workflows::inspection::{InspectionEvaluator, InspectionWorkflow};

pub(super) const ADMIN: Caller = Caller::new(UserId(1), Role::Admin);
pub(super) const MANAGER: Caller = Caller::new(UserId(2), Role::Manager);
pub(super) const HOTEL_MANAGER: Caller = Caller::new(UserId(3), Role::HotelManager);
pub(super) const INSPECTOR: Caller = Caller::new(UserId(4), Role::Inspector);
pub(super) const SECOND_INSPECTOR: Caller = Caller::new(UserId(5), Role::Inspector);

pub(super) const MORNING_CHECK: FormId = FormId(1);

pub(super) fn answers(pairs: &[(&str, &str)]) -> Answers {
    pairs
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// The kitchen walkthrough used across the workflow scenarios.
pub(super) fn failing_kitchen() -> Answers {
    answers(&[
        ("temp_fridge", "12"),
        ("clean_surfaces", "Dirty, not cleaned"),
        ("pest_check", "Rat droppings found"),
    ])
}

pub(super) fn tidy_kitchen() -> Answers {
    answers(&[("temp_fridge", "4"), ("trash_bins", "Emptied")])
}

#[derive(Default)]
struct MemoryState {
    reports: HashMap<ReportId, InspectionReport>,
    next_id: u64,
}

pub(super) struct MemoryRepository {
    users: HashSet<UserId>,
    forms: HashSet<FormId>,
    state: Mutex<MemoryState>,
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self {
            users: [ADMIN, MANAGER, HOTEL_MANAGER, INSPECTOR, SECOND_INSPECTOR]
                .iter()
                .map(|caller| caller.id)
                .collect(),
            forms: [MORNING_CHECK, FormId(2)].into_iter().collect(),
            state: Mutex::new(MemoryState::default()),
        }
    }
}

impl MemoryRepository {
    pub(super) fn report_count(&self) -> usize {
        self.state
            .lock()
            .expect("repository mutex poisoned")
            .reports
            .len()
    }
}

impl InspectionRepository for MemoryRepository {
    fn insert(&self, report: NewReport) -> Result<InspectionReport, RepositoryError> {
        if !self.forms.contains(&report.form_id) {
            return Err(RepositoryError::NotFound(report.form_id.to_string()));
        }
        if !self.users.contains(&report.inspector_id) {
            return Err(RepositoryError::NotFound(report.inspector_id.to_string()));
        }

        let mut state = self.state.lock().expect("repository mutex poisoned");
        state.next_id += 1;
        let id = ReportId(state.next_id);
        // One minute apart so newest-first ordering is deterministic.
        let created_at = Utc
            .with_ymd_and_hms(2025, 3, 1, 8, 0, 0)
            .single()
            .expect("valid timestamp")
            + chrono::Duration::minutes(state.next_id as i64);
        let stored = InspectionReport {
            id,
            form_id: report.form_id,
            inspector_id: report.inspector_id,
            data: report.data,
            score: report.score,
            status: ReportStatus::Pending,
            ai_summary: report.summary,
            created_at,
        };
        state.reports.insert(id, stored.clone());
        Ok(stored)
    }

    fn transition(
        &self,
        id: ReportId,
        from: ReportStatus,
        to: ReportStatus,
    ) -> Result<InspectionReport, RepositoryError> {
        let mut state = self.state.lock().expect("repository mutex poisoned");
        let report = state
            .reports
            .get_mut(&id)
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;
        if report.status != from {
            return Err(RepositoryError::Conflict {
                id,
                current: report.status,
            });
        }
        report.status = to;
        Ok(report.clone())
    }

    fn reports(&self, inspector: Option<UserId>) -> Result<Vec<InspectionReport>, RepositoryError> {
        let state = self.state.lock().expect("repository mutex poisoned");
        Ok(state
            .reports
            .values()
            .filter(|report| inspector.map_or(true, |id| report.inspector_id == id))
            .cloned()
            .collect())
    }

    fn directory_counts(&self) -> Result<DirectoryCounts, RepositoryError> {
        Ok(DirectoryCounts {
            users: self.users.len(),
            forms: self.forms.len(),
            guidelines: 3,
        })
    }

    fn report_context(
        &self,
        inspectors: &[UserId],
        forms: &[FormId],
    ) -> Result<ReportContext, RepositoryError> {
        Ok(ReportContext {
            inspectors: inspectors
                .iter()
                .filter(|id| self.users.contains(*id))
                .map(|id| (*id, inspector_summary(*id)))
                .collect(),
            forms: forms
                .iter()
                .filter(|id| self.forms.contains(*id))
                .map(|id| {
                    let title = if *id == MORNING_CHECK {
                        "Morning Safety Check"
                    } else {
                        "Daily Hygiene Audit"
                    };
                    (*id, FormSummary { title: title.to_string() })
                })
                .collect(),
        })
    }
}

/// Directory entry the memory repository reports for a known user.
pub(super) fn inspector_summary(id: UserId) -> InspectorSummary {
    InspectorSummary {
        name: format!("Inspector {}", id.0),
        email: format!("user{}@hotel.com", id.0),
    }
}

pub(super) struct UnavailableRepository;

impl InspectionRepository for UnavailableRepository {
    fn insert(&self, _report: NewReport) -> Result<InspectionReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn transition(
        &self,
        _id: ReportId,
        _from: ReportStatus,
        _to: ReportStatus,
    ) -> Result<InspectionReport, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn reports(&self, _inspector: Option<UserId>) -> Result<Vec<InspectionReport>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn directory_counts(&self) -> Result<DirectoryCounts, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn report_context(
        &self,
        _inspectors: &[UserId],
        _forms: &[FormId],
    ) -> Result<ReportContext, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Generation seam double returning a canned reply after an optional delay.
pub(super) struct ScriptedGenerator {
    reply: Result<String, u16>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedGenerator {
    pub(super) fn replying(reply: &str) -> Self {
        Self {
            reply: Ok(reply.to_string()),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn failing(status: u16) -> Self {
        Self {
            reply: Err(status),
            delay: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn stalled(delay: Duration) -> Self {
        Self {
            reply: Ok(r#"{"score": 99, "summary": "too late"}"#.to_string()),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.reply.clone().map_err(GenerationError::Status)
    }
}

pub(super) fn build_workflow() -> (Arc<InspectionWorkflow<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let workflow = InspectionWorkflow::new(repository.clone(), InspectionEvaluator::heuristic());
    (Arc::new(workflow), repository)
}

pub(super) fn model_workflow(
    generator: Arc<ScriptedGenerator>,
) -> (Arc<InspectionWorkflow<MemoryRepository>>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let evaluator = InspectionEvaluator::model_backed(generator, Duration::from_secs(2));
    let workflow = InspectionWorkflow::new(repository.clone(), evaluator);
    (Arc::new(workflow), repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
