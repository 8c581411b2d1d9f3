use chrono::Utc;
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use inspection_ai::workflows::inspection::{
    DirectoryCounts, FieldDefinition, FieldKind, FormId, FormSummary, InspectionForm,
    InspectionReport, InspectionRepository, InspectorSummary, NewReport, ReportContext, ReportId,
    ReportStatus, RepositoryError, Role, UserId,
};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Account known to the in-memory directory.
#[derive(Debug, Clone)]
pub(crate) struct DirectoryUser {
    pub(crate) email: String,
    pub(crate) name: String,
    pub(crate) role: Role,
}

#[derive(Default)]
struct StoreState {
    users: HashMap<UserId, DirectoryUser>,
    forms: HashMap<FormId, InspectionForm>,
    guidelines: HashSet<String>,
    reports: HashMap<ReportId, InspectionReport>,
    next_report_id: u64,
}

/// Process-local entity store backing the API until a database adapter is wired in.
#[derive(Default, Clone)]
pub(crate) struct InMemoryInspectionRepository {
    state: Arc<Mutex<StoreState>>,
}

impl InMemoryInspectionRepository {
    fn state(&self) -> Result<MutexGuard<'_, StoreState>, RepositoryError> {
        self.state
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store mutex poisoned".to_string()))
    }

    /// Demo accounts, checklists, and guideline titles for a fresh process.
    pub(crate) fn seeded() -> Self {
        let repository = Self::default();
        let mut state = repository
            .state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let users = [
            ("admin@hotel.com", "System Admin", Role::Admin),
            ("manager@hotel.com", "Kitchen Manager", Role::Manager),
            ("management@hotel.com", "Hotel Director", Role::HotelManager),
            ("inspector@hotel.com", "John Doe", Role::Inspector),
        ];
        for (index, (email, name, role)) in users.into_iter().enumerate() {
            state.users.insert(
                UserId(index as u64 + 1),
                DirectoryUser {
                    email: email.to_string(),
                    name: name.to_string(),
                    role,
                },
            );
        }

        let forms = [
            InspectionForm {
                id: FormId(1),
                title: "Morning Safety Check".to_string(),
                structure: vec![
                    field("temp_fridge", "Fridge Temperature (°C)", FieldKind::Number, Some("e.g. 4")),
                    field("clean_surfaces", "Surfaces Cleaned?", FieldKind::Text, Some("Yes/No")),
                    field("pest_check", "Pest Activity Observed?", FieldKind::Text, Some("None/Yes")),
                ],
            },
            InspectionForm {
                id: FormId(2),
                title: "Daily Hygiene Audit".to_string(),
                structure: vec![
                    field("staff_handwashing", "Staff Handwashing Logged?", FieldKind::Text, None),
                    field("trash_bins", "Trash Bins Empty?", FieldKind::Text, None),
                ],
            },
        ];
        for form in forms {
            state.forms.insert(form.id, form);
        }

        for title in [
            "Refrigeration Standards",
            "Safe Prep Methods",
            "Personal Hygiene",
        ] {
            state.guidelines.insert(title.to_string());
        }

        drop(state);
        repository
    }

    /// Seeded accounts ordered by id.
    pub(crate) fn accounts(&self) -> Result<Vec<(UserId, DirectoryUser)>, RepositoryError> {
        let state = self.state()?;
        let mut accounts: Vec<_> = state
            .users
            .iter()
            .map(|(id, user)| (*id, user.clone()))
            .collect();
        accounts.sort_by_key(|(id, _)| *id);
        Ok(accounts)
    }
}

fn field(name: &str, label: &str, kind: FieldKind, placeholder: Option<&str>) -> FieldDefinition {
    FieldDefinition {
        name: name.to_string(),
        label: label.to_string(),
        kind,
        placeholder: placeholder.map(str::to_string),
    }
}

impl InspectionRepository for InMemoryInspectionRepository {
    fn insert(&self, report: NewReport) -> Result<InspectionReport, RepositoryError> {
        let mut state = self.state()?;
        if !state.forms.contains_key(&report.form_id) {
            return Err(RepositoryError::NotFound(report.form_id.to_string()));
        }
        if !state.users.contains_key(&report.inspector_id) {
            return Err(RepositoryError::NotFound(report.inspector_id.to_string()));
        }

        state.next_report_id += 1;
        let id = ReportId(state.next_report_id);
        let stored = InspectionReport {
            id,
            form_id: report.form_id,
            inspector_id: report.inspector_id,
            data: report.data,
            score: report.score,
            status: ReportStatus::Pending,
            ai_summary: report.summary,
            created_at: Utc::now(),
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
        let mut state = self.state()?;
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
        let state = self.state()?;
        Ok(state
            .reports
            .values()
            .filter(|report| inspector.map_or(true, |id| report.inspector_id == id))
            .cloned()
            .collect())
    }

    fn directory_counts(&self) -> Result<DirectoryCounts, RepositoryError> {
        let state = self.state()?;
        Ok(DirectoryCounts {
            users: state.users.len(),
            forms: state.forms.len(),
            guidelines: state.guidelines.len(),
        })
    }

    fn report_context(
        &self,
        inspectors: &[UserId],
        forms: &[FormId],
    ) -> Result<ReportContext, RepositoryError> {
        let state = self.state()?;
        Ok(ReportContext {
            inspectors: inspectors
                .iter()
                .filter_map(|id| {
                    let user = state.users.get(id)?;
                    Some((
                        *id,
                        InspectorSummary {
                            name: user.name.clone(),
                            email: user.email.clone(),
                        },
                    ))
                })
                .collect(),
            forms: forms
                .iter()
                .filter_map(|id| {
                    let form = state.forms.get(id)?;
                    Some((
                        *id,
                        FormSummary {
                            title: form.title.clone(),
                        },
                    ))
                })
                .collect(),
        })
    }
}
