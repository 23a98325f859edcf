use sqlx::{FromRow, MySqlPool};

use crate::{
    error::StoreError,
    model::{
        payroll::{NewPayrollRecord, PayrollPatch, PayrollRecord, PayrollStatus},
        profile::EmployeeProfile,
    },
};

use super::{PayrollFilter, PayrollOrder, ProfileOrder, RecordStore};

#[derive(FromRow)]
struct PayrollRow {
    id: u64,
    employee_id: u64,
    month: u8,
    year: i32,
    basic_salary: f64,
    allowances: f64,
    deductions: f64,
    net_salary: f64,
    status: String,
    paid_date: Option<chrono::NaiveDate>,
    remarks: Option<String>,
}

impl TryFrom<PayrollRow> for PayrollRecord {
    type Error = StoreError;

    fn try_from(row: PayrollRow) -> Result<Self, Self::Error> {
        let status: PayrollStatus = row.status.parse().map_err(|_| {
            StoreError::Backend(format!(
                "payroll {} has unknown status {:?}",
                row.id, row.status
            ))
        })?;

        Ok(PayrollRecord {
            id: row.id,
            employee_id: row.employee_id,
            month: row.month,
            year: row.year,
            basic_salary: row.basic_salary,
            allowances: row.allowances,
            deductions: row.deductions,
            net_salary: row.net_salary,
            status,
            paid_date: row.paid_date,
            remarks: row.remarks,
        })
    }
}

#[derive(FromRow)]
struct ProfileRow {
    id: u64,
    first_name: String,
    last_name: String,
    employee_id: String,
    department: Option<String>,
    basic_salary: Option<f64>,
}

impl From<ProfileRow> for EmployeeProfile {
    fn from(row: ProfileRow) -> Self {
        EmployeeProfile {
            id: row.id,
            first_name: row.first_name,
            last_name: row.last_name,
            employee_id: row.employee_id,
            department: row.department,
            basic_salary: row.basic_salary,
        }
    }
}

const PAYROLL_COLUMNS: &str = "id, employee_id, month, year, basic_salary, allowances, \
     deductions, net_salary, status, paid_date, remarks";

const PROFILE_COLUMNS: &str = "id, first_name, last_name, employee_id, department, basic_salary";

/// Record store over the MySQL `payroll` and `profiles` tables.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// WHERE clause for the filter. Unset fields become `? IS NULL` so the bind
/// list is the same for every filter shape.
fn payroll_select(order: PayrollOrder) -> String {
    let order_by = match order {
        PayrollOrder::MonthDesc => "year DESC, month DESC, id DESC",
        PayrollOrder::CreatedDesc => "created_at DESC, id DESC",
    };

    format!(
        "SELECT {PAYROLL_COLUMNS} FROM payroll \
         WHERE (? IS NULL OR employee_id = ?) \
         AND (? IS NULL OR month = ?) \
         AND (? IS NULL OR year = ?) \
         ORDER BY {order_by}"
    )
}

impl RecordStore for MySqlStore {
    async fn query_payroll(
        &self,
        filter: PayrollFilter,
        order: PayrollOrder,
    ) -> Result<Vec<PayrollRecord>, StoreError> {
        let sql = payroll_select(order);

        let rows = sqlx::query_as::<_, PayrollRow>(&sql)
            .bind(filter.employee_id)
            .bind(filter.employee_id)
            .bind(filter.month)
            .bind(filter.month)
            .bind(filter.year)
            .bind(filter.year)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, ?filter, "Failed to fetch payroll");
                StoreError::from(e)
            })?;

        rows.into_iter().map(PayrollRecord::try_from).collect()
    }

    async fn insert_payroll(&self, record: NewPayrollRecord) -> Result<PayrollRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payroll
            (employee_id, month, year, basic_salary, allowances, deductions, net_salary, status, remarks)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(record.employee_id)
        .bind(record.period.month)
        .bind(record.period.year)
        .bind(record.basic_salary)
        .bind(record.allowances)
        .bind(record.deductions)
        .bind(record.net_salary)
        .bind(record.status.as_ref())
        .bind(record.remarks.as_deref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let err = StoreError::from(e);
            if err != StoreError::Duplicate {
                tracing::error!(error = %err, employee_id = record.employee_id, "Payroll insert failed");
            }
            err
        })?;

        Ok(PayrollRecord {
            id: result.last_insert_id(),
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
        })
    }

    async fn update_payroll(&self, id: u64, patch: PayrollPatch) -> Result<(), StoreError> {
        // Existence is checked separately: MySQL reports 0 affected rows when
        // the new values equal the old ones.
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM payroll WHERE id = ? LIMIT 1)",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        if !exists {
            return Err(StoreError::NotFound);
        }

        sqlx::query("UPDATE payroll SET status = ?, paid_date = ? WHERE id = ?")
            .bind(patch.status.as_ref())
            .bind(patch.paid_date)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, payroll_id = id, "Payroll update failed");
                StoreError::from(e)
            })?;

        Ok(())
    }

    async fn query_profiles(&self, order: ProfileOrder) -> Result<Vec<EmployeeProfile>, StoreError> {
        let order_by = match order {
            ProfileOrder::FirstName => "first_name ASC, id ASC",
        };
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles ORDER BY {order_by}");

        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch profiles");
                StoreError::from(e)
            })?;

        Ok(rows.into_iter().map(EmployeeProfile::from).collect())
    }

    async fn get_profile(&self, id: u64) -> Result<Option<EmployeeProfile>, StoreError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profiles WHERE id = ?");

        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(EmployeeProfile::from))
    }
}
