use std::sync::{Mutex, MutexGuard};

use crate::{
    error::StoreError,
    model::{
        payroll::{NewPayrollRecord, PayrollPatch, PayrollRecord},
        profile::EmployeeProfile,
    },
};

use super::{PayrollFilter, PayrollOrder, ProfileOrder, RecordStore};

#[derive(Default)]
struct Tables {
    next_payroll_id: u64,
    payroll: Vec<PayrollRecord>,
    profiles: Vec<EmployeeProfile>,
}

/// In-process record store. Payroll ids grow with insertion order, so id
/// order doubles as creation order.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<EmployeeProfile>) -> Self {
        let store = Self::new();
        store.lock().profiles = profiles;
        store
    }

    #[cfg(test)]
    pub fn payroll_count(&self) -> usize {
        self.lock().payroll.len()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // a panic while holding the lock cannot leave the tables half-written
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl RecordStore for MemoryStore {
    async fn query_payroll(
        &self,
        filter: PayrollFilter,
        order: PayrollOrder,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        let mut rows: Vec<PayrollRecord> = self
            .lock()
            .payroll
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect();

        match order {
            PayrollOrder::MonthDesc => {
                rows.sort_by(|a, b| (b.year, b.month, b.id).cmp(&(a.year, a.month, a.id)))
            }
            PayrollOrder::CreatedDesc => rows.sort_by(|a, b| b.id.cmp(&a.id)),
        }
        Ok(rows)
    }

    async fn insert_payroll(&self, record: NewPayrollRecord) -> Result<PayrollRecord, StoreError> {
        let mut tables = self.lock();

        let exists = tables.payroll.iter().any(|r| {
            r.employee_id == record.employee_id
                && r.month == record.period.month
                && r.year == record.period.year
        });
        if exists {
            return Err(StoreError::Duplicate);
        }

        tables.next_payroll_id += 1;
        let row = PayrollRecord {
            id: tables.next_payroll_id,
            employee_id: record.employee_id,
            month: record.period.month,
            year: record.period.year,
            basic_salary: record.basic_salary,
            allowances: record.allowances,
            deductions: record.deductions,
            net_salary: record.net_salary,
            status: record.status,
            paid_date: None,
            remarks: record.remarks,
        };
        tables.payroll.push(row.clone());
        Ok(row)
    }

    async fn update_payroll(&self, id: u64, patch: PayrollPatch) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let row = tables
            .payroll
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(StoreError::NotFound)?;

        row.status = patch.status;
        row.paid_date = patch.paid_date;
        Ok(())
    }

    async fn query_profiles(&self, order: ProfileOrder) -> Result<Vec<EmployeeProfile>, StoreError> {
        let mut profiles = self.lock().profiles.clone();
        match order {
            ProfileOrder::FirstName => profiles.sort_by(|a, b| a.first_name.cmp(&b.first_name)),
        }
        Ok(profiles)
    }

    async fn get_profile(&self, id: u64) -> Result<Option<EmployeeProfile>, StoreError> {
        Ok(self.lock().profiles.iter().find(|p| p.id == id).cloned())
    }
}
