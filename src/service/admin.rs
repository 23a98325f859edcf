use std::collections::HashMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::PayrollError,
    model::{
        payroll::{NewPayrollRecord, PayrollPatch, PayrollRecord, PayrollStatus, Period, parse_amount},
        profile::EmployeeProfile,
    },
    service::latest::LatestOnly,
    store::{PayrollFilter, PayrollOrder, ProfileOrder, RecordStore},
};

/// Display fields of the employee owning a payroll record.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct EmployeeSummary {
    pub first_name: String,
    pub last_name: String,
    #[schema(example = "EMP-001")]
    pub employee_id: String,
    pub department: Option<String>,
}

impl From<&EmployeeProfile> for EmployeeSummary {
    fn from(p: &EmployeeProfile) -> Self {
        Self {
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            employee_id: p.employee_id.clone(),
            department: p.department.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollEntry {
    pub record: PayrollRecord,
    /// Missing when the owning profile no longer exists.
    pub employee: Option<EmployeeSummary>,
}

impl PayrollEntry {
    /// Case-insensitive substring match on first name, last name or employee
    /// code. `needle` must already be lowercase.
    fn matches(&self, needle: &str) -> bool {
        let Some(employee) = &self.employee else {
            return false;
        };
        [&employee.first_name, &employee.last_name, &employee.employee_id]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct PeriodSummary {
    pub total_payroll: f64,
    pub record_count: usize,
    pub paid_count: usize,
    pub pending_count: usize,
}

impl PeriodSummary {
    pub fn from_entries(entries: &[PayrollEntry]) -> Self {
        let total_payroll = entries.iter().map(|e| e.record.net_salary).sum();
        let paid_count = entries.iter().filter(|e| e.record.is_paid()).count();
        Self {
            total_payroll,
            record_count: entries.len(),
            paid_count,
            pending_count: entries.len() - paid_count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PeriodPayroll {
    pub period: Period,
    /// Newest record first.
    pub entries: Vec<PayrollEntry>,
    pub summary: PeriodSummary,
}

impl PeriodPayroll {
    fn new(period: Period, entries: Vec<PayrollEntry>) -> Self {
        let summary = PeriodSummary::from_entries(&entries);
        Self {
            period,
            entries,
            summary,
        }
    }
}

/// Creation form as entered by the admin. Amounts stay as typed until submit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PayrollForm {
    #[schema(example = 1001, nullable = true)]
    pub employee_id: Option<u64>,
    #[schema(example = "1000")]
    pub basic_salary: String,
    #[schema(example = "200")]
    pub allowances: String,
    #[schema(example = "50")]
    pub deductions: String,
    #[schema(nullable = true)]
    pub remarks: Option<String>,
}

impl Default for PayrollForm {
    fn default() -> Self {
        Self {
            employee_id: None,
            basic_salary: String::new(),
            allowances: "0".to_string(),
            deductions: "0".to_string(),
            remarks: None,
        }
    }
}

impl PayrollForm {
    /// Selects `employee` and pre-fills the basic salary from the profile.
    pub fn select_employee(&mut self, employee: &EmployeeProfile) {
        self.employee_id = Some(employee.id);
        self.basic_salary = employee.basic_salary.unwrap_or(0.0).to_string();
    }

    /// Validates the form into a draft row for `period`. Never touches the store.
    pub fn into_draft(self, period: Period) -> Result<NewPayrollRecord, PayrollError> {
        let employee_id = self.employee_id.ok_or_else(PayrollError::no_employee_selected)?;

        let remarks = self
            .remarks
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());

        Ok(NewPayrollRecord::draft(
            employee_id,
            period,
            parse_amount(&self.basic_salary)?,
            parse_amount(&self.allowances)?,
            parse_amount(&self.deductions)?,
            remarks,
        ))
    }
}

/// Case-insensitive search over entries. An empty term keeps everything.
/// The term is used as typed, surrounding spaces included.
pub fn filter_entries(entries: &[PayrollEntry], term: &str) -> Vec<PayrollEntry> {
    let needle = term.to_lowercase();
    if needle.is_empty() {
        return entries.to_vec();
    }
    entries.iter().filter(|e| e.matches(&needle)).cloned().collect()
}

/// Read/write payroll management across all employees. Admin only.
pub struct AdminPayrollManager<'a, S> {
    store: &'a S,
    admin: &'a AuthUser,
    latest: LatestOnly<PeriodPayroll>,
}

impl<'a, S: RecordStore> AdminPayrollManager<'a, S> {
    pub fn new(store: &'a S, user: &'a AuthUser) -> Result<Self, PayrollError> {
        user.require_admin()?;
        Ok(Self {
            store,
            admin: user,
            latest: LatestOnly::new(),
        })
    }

    /// Every record of `period` joined with its employee. A failed fetch
    /// yields an empty period.
    #[instrument(skip(self), fields(admin = self.admin.user_id))]
    pub async fn load_period(&self, period: Period) -> PeriodPayroll {
        let filter = PayrollFilter {
            month: Some(period.month),
            year: Some(period.year),
            ..Default::default()
        };

        let records = match self.store.query_payroll(filter, PayrollOrder::CreatedDesc).await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "Payroll period unavailable, showing empty state");
                return PeriodPayroll::new(period, Vec::new());
            }
        };

        let profiles: HashMap<u64, EmployeeProfile> = self
            .employees()
            .await
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let entries = records
            .into_iter()
            .map(|record| PayrollEntry {
                employee: profiles.get(&record.employee_id).map(EmployeeSummary::from),
                record,
            })
            .collect();

        PeriodPayroll::new(period, entries)
    }

    /// Loads `period` as the current view unless a newer refresh started
    /// meanwhile. Returns the current view.
    pub async fn refresh(&self, period: Period) -> Option<PeriodPayroll> {
        let ticket = self.latest.begin();
        let loaded = self.load_period(period).await;
        self.latest.publish(ticket, loaded);
        self.latest.snapshot()
    }

    /// Employees available for a new record, by first name.
    pub async fn employees(&self) -> Vec<EmployeeProfile> {
        match self.store.query_profiles(ProfileOrder::FirstName).await {
            Ok(profiles) => profiles,
            Err(e) => {
                warn!(error = %e, "Employee list unavailable");
                Vec::new()
            }
        }
    }

    /// Blank form with `employee_id` selected and its default salary filled in.
    pub async fn draft_for(&self, employee_id: u64) -> Result<PayrollForm, PayrollError> {
        let profile = self
            .store
            .get_profile(employee_id)
            .await?
            .ok_or_else(|| PayrollError::Validation(format!("unknown employee {employee_id}")))?;

        let mut form = PayrollForm::default();
        form.select_employee(&profile);
        Ok(form)
    }

    /// Creates a draft record for `period` and returns the refetched period.
    #[instrument(skip(self, form), fields(admin = self.admin.user_id, employee_id = form.employee_id))]
    pub async fn create(&self, period: Period, form: PayrollForm) -> Result<PeriodPayroll, PayrollError> {
        let draft = form.into_draft(period)?;

        let created = self.store.insert_payroll(draft).await.map_err(|e| {
            let err = PayrollError::from(e);
            warn!(error = %err, "Payroll creation rejected");
            err
        })?;
        info!(payroll_id = created.id, "Payroll record created");

        Ok(self.refresh(period).await.unwrap_or_else(|| PeriodPayroll::new(period, Vec::new())))
    }

    /// Sets `status` on record `id`, stamping today's date when paid, and
    /// returns the refetched `period` the admin is viewing.
    pub async fn set_status(
        &self,
        period: Period,
        id: u64,
        status: PayrollStatus,
    ) -> Result<PeriodPayroll, PayrollError> {
        self.set_status_on(period, id, status, Local::now().date_naive()).await
    }

    /// Same as [`set_status`](Self::set_status) with an explicit calendar date.
    /// No ordering between statuses is enforced. Once the update is stored a
    /// failed refetch only empties the view.
    #[instrument(skip(self), fields(admin = self.admin.user_id))]
    pub async fn set_status_on(
        &self,
        period: Period,
        id: u64,
        status: PayrollStatus,
        today: NaiveDate,
    ) -> Result<PeriodPayroll, PayrollError> {
        self.store
            .update_payroll(id, PayrollPatch::transition(status, today))
            .await
            .map_err(|e| {
                let err = PayrollError::from(e);
                warn!(error = %err, "Status update rejected");
                err
            })?;
        info!("Payroll status updated");

        Ok(self.refresh(period).await.unwrap_or_else(|| PeriodPayroll::new(period, Vec::new())))
    }
}
