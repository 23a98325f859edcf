//! Store doubles shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    error::StoreError,
    model::{
        payroll::{NewPayrollRecord, PayrollPatch, PayrollRecord},
        profile::EmployeeProfile,
    },
};

use super::{MemoryStore, PayrollFilter, PayrollOrder, ProfileOrder, RecordStore};

pub fn profile(id: u64, first: &str, last: &str, code: &str) -> EmployeeProfile {
    EmployeeProfile {
        id,
        first_name: first.to_string(),
        last_name: last.to_string(),
        employee_id: code.to_string(),
        department: Some("Engineering".to_string()),
        basic_salary: Some(1000.0),
    }
}

/// Every call fails with a backend error.
pub struct FailingStore;

impl RecordStore for FailingStore {
    async fn query_payroll(
        &self,
        _filter: PayrollFilter,
        _order: PayrollOrder,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        Err(StoreError::Backend("store unavailable".into()))
    }

    async fn insert_payroll(&self, _record: NewPayrollRecord) -> Result<PayrollRecord, StoreError> {
        Err(StoreError::Backend("store unavailable".into()))
    }

    async fn update_payroll(&self, _id: u64, _patch: PayrollPatch) -> Result<(), StoreError> {
        Err(StoreError::Backend("store unavailable".into()))
    }

    async fn query_profiles(&self, _order: ProfileOrder) -> Result<Vec<EmployeeProfile>, StoreError> {
        Err(StoreError::Backend("store unavailable".into()))
    }

    async fn get_profile(&self, _id: u64) -> Result<Option<EmployeeProfile>, StoreError> {
        Err(StoreError::Backend("store unavailable".into()))
    }
}

/// Wraps a [`MemoryStore`] and counts every call that reaches it.
#[derive(Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    calls: AtomicUsize,
}

impl CountingStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl RecordStore for CountingStore {
    async fn query_payroll(
        &self,
        filter: PayrollFilter,
        order: PayrollOrder,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        self.hit();
        self.inner.query_payroll(filter, order).await
    }

    async fn insert_payroll(&self, record: NewPayrollRecord) -> Result<PayrollRecord, StoreError> {
        self.hit();
        self.inner.insert_payroll(record).await
    }

    async fn update_payroll(&self, id: u64, patch: PayrollPatch) -> Result<(), StoreError> {
        self.hit();
        self.inner.update_payroll(id, patch).await
    }

    async fn query_profiles(&self, order: ProfileOrder) -> Result<Vec<EmployeeProfile>, StoreError> {
        self.hit();
        self.inner.query_profiles(order).await
    }

    async fn get_profile(&self, id: u64) -> Result<Option<EmployeeProfile>, StoreError> {
        self.hit();
        self.inner.get_profile(id).await
    }
}

/// Writes reach the wrapped [`MemoryStore`]; every read fails.
#[derive(Default)]
pub struct WriteOnlyStore {
    pub inner: MemoryStore,
}

impl RecordStore for WriteOnlyStore {
    async fn query_payroll(
        &self,
        _filter: PayrollFilter,
        _order: PayrollOrder,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        Err(StoreError::Backend("read replica down".into()))
    }

    async fn insert_payroll(&self, record: NewPayrollRecord) -> Result<PayrollRecord, StoreError> {
        self.inner.insert_payroll(record).await
    }

    async fn update_payroll(&self, id: u64, patch: PayrollPatch) -> Result<(), StoreError> {
        self.inner.update_payroll(id, patch).await
    }

    async fn query_profiles(&self, _order: ProfileOrder) -> Result<Vec<EmployeeProfile>, StoreError> {
        Err(StoreError::Backend("read replica down".into()))
    }

    async fn get_profile(&self, _id: u64) -> Result<Option<EmployeeProfile>, StoreError> {
        Err(StoreError::Backend("read replica down".into()))
    }
}
