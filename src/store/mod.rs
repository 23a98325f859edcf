use std::future::Future;

use crate::{
    error::StoreError,
    model::{
        payroll::{NewPayrollRecord, PayrollPatch, PayrollRecord},
        profile::EmployeeProfile,
    },
};

pub mod memory;
pub mod mysql;

#[cfg(test)]
pub mod testing;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Exact-match filter over the payroll table. `None` fields are unconstrained.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayrollFilter {
    pub employee_id: Option<u64>,
    pub month: Option<u8>,
    pub year: Option<i32>,
}

impl PayrollFilter {
    pub fn matches(&self, record: &PayrollRecord) -> bool {
        self.employee_id.is_none_or(|id| record.employee_id == id)
            && self.month.is_none_or(|m| record.month == m)
            && self.year.is_none_or(|y| record.year == y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayrollOrder {
    /// Latest month first.
    MonthDesc,
    /// Most recently created first.
    CreatedDesc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileOrder {
    FirstName,
}

/// Queryable, mutable tabular persistence for payroll and profiles.
///
/// The store owns uniqueness of (employee, month, year): a conflicting insert
/// must fail with [`StoreError::Duplicate`] and leave no row behind.
pub trait RecordStore: Send + Sync + 'static {
    fn query_payroll(
        &self,
        filter: PayrollFilter,
        order: PayrollOrder,
    ) -> impl Future<Output = Result<Vec<PayrollRecord>, StoreError>> + Send;

    fn insert_payroll(
        &self,
        record: NewPayrollRecord,
    ) -> impl Future<Output = Result<PayrollRecord, StoreError>> + Send;

    /// Fails with [`StoreError::NotFound`] when no row has this id.
    fn update_payroll(
        &self,
        id: u64,
        patch: PayrollPatch,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn query_profiles(
        &self,
        order: ProfileOrder,
    ) -> impl Future<Output = Result<Vec<EmployeeProfile>, StoreError>> + Send;

    fn get_profile(
        &self,
        id: u64,
    ) -> impl Future<Output = Result<Option<EmployeeProfile>, StoreError>> + Send;
}
