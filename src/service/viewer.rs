use serde::Serialize;
use tracing::{instrument, warn};
use utoipa::ToSchema;

use crate::{
    auth::auth::AuthUser,
    error::PayrollError,
    model::payroll::PayrollRecord,
    service::latest::LatestOnly,
    store::{PayrollFilter, PayrollOrder, RecordStore},
};

/// Year-to-date figures for one employee.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct EarningsSummary {
    pub total_earnings: f64,
    pub total_allowances: f64,
    pub total_deductions: f64,
    pub paid_count: usize,
    pub record_count: usize,
}

impl EarningsSummary {
    pub fn from_records(records: &[PayrollRecord]) -> Self {
        records.iter().fold(Self::default(), |mut acc, r| {
            acc.total_earnings += r.net_salary;
            acc.total_allowances += r.allowances;
            acc.total_deductions += r.deductions;
            if r.is_paid() {
                acc.paid_count += 1;
            }
            acc.record_count += 1;
            acc
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct PayrollHistory {
    pub year: i32,
    /// Latest month first.
    pub records: Vec<PayrollRecord>,
    pub summary: EarningsSummary,
}

impl PayrollHistory {
    pub fn empty(year: i32) -> Self {
        Self {
            year,
            records: Vec::new(),
            summary: EarningsSummary::default(),
        }
    }
}

/// Read-only payroll history of the signed-in employee.
pub struct EmployeePayrollViewer<'a, S> {
    store: &'a S,
    employee_id: u64,
    latest: LatestOnly<PayrollHistory>,
}

impl<'a, S: RecordStore> EmployeePayrollViewer<'a, S> {
    pub fn new(store: &'a S, user: &AuthUser) -> Result<Self, PayrollError> {
        Ok(Self {
            store,
            employee_id: user.require_employee_profile()?,
            latest: LatestOnly::new(),
        })
    }

    /// Records for `year`, latest month first. A failed fetch yields an empty
    /// history instead of an error.
    #[instrument(skip(self), fields(employee_id = self.employee_id))]
    pub async fn load(&self, year: i32) -> PayrollHistory {
        let filter = PayrollFilter {
            employee_id: Some(self.employee_id),
            year: Some(year),
            ..Default::default()
        };

        match self.store.query_payroll(filter, PayrollOrder::MonthDesc).await {
            Ok(records) => {
                let summary = EarningsSummary::from_records(&records);
                PayrollHistory {
                    year,
                    records,
                    summary,
                }
            }
            Err(e) => {
                warn!(error = %e, "Payroll history unavailable, showing empty state");
                PayrollHistory::empty(year)
            }
        }
    }

    /// Loads `year` and keeps it as the current view unless a newer refresh
    /// was started meanwhile. Returns the current view.
    pub async fn refresh(&self, year: i32) -> Option<PayrollHistory> {
        let ticket = self.latest.begin();
        let history = self.load(year).await;
        self.latest.publish(ticket, history);
        self.latest.snapshot()
    }
}
