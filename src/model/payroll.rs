use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use utoipa::ToSchema;

use crate::error::PayrollError;

/// Lifecycle label of a payroll record. Any status may be set from any other.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PayrollStatus {
    Draft,
    Processed,
    Paid,
}

impl PayrollStatus {
    pub fn parse(value: &str) -> Result<Self, PayrollError> {
        value
            .trim()
            .to_lowercase()
            .parse()
            .map_err(|_| PayrollError::Validation(format!("unknown payroll status: {value}")))
    }

    /// paid_date that goes with this status, given today's calendar date.
    pub fn paid_date_for(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            PayrollStatus::Paid => Some(today),
            PayrollStatus::Draft | PayrollStatus::Processed => None,
        }
    }
}

/// One payroll cycle: a calendar month within a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Period {
    #[schema(example = 5)]
    pub month: u8,
    #[schema(example = 2024)]
    pub year: i32,
}

impl Period {
    pub fn new(month: u8, year: i32) -> Result<Self, PayrollError> {
        if !(1..=12).contains(&month) {
            return Err(PayrollError::Validation(format!(
                "month must be between 1 and 12, got {month}"
            )));
        }
        Ok(Self { month, year })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 7,
        "employee_id": 1001,
        "month": 5,
        "year": 2024,
        "basic_salary": 1000.0,
        "allowances": 200.0,
        "deductions": 50.0,
        "net_salary": 1150.0,
        "status": "paid",
        "paid_date": "2024-05-31",
        "remarks": null
    })
)]
pub struct PayrollRecord {
    pub id: u64,
    pub employee_id: u64,
    pub month: u8,
    pub year: i32,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
    #[schema(value_type = Option<String>, format = "date")]
    pub paid_date: Option<NaiveDate>,
    pub remarks: Option<String>,
}

impl PayrollRecord {
    pub fn period(&self) -> Period {
        Period {
            month: self.month,
            year: self.year,
        }
    }

    pub fn is_paid(&self) -> bool {
        self.status == PayrollStatus::Paid
    }
}

/// Row written by the admin create operation.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPayrollRecord {
    pub employee_id: u64,
    pub period: Period,
    pub basic_salary: f64,
    pub allowances: f64,
    pub deductions: f64,
    pub net_salary: f64,
    pub status: PayrollStatus,
    pub remarks: Option<String>,
}

impl NewPayrollRecord {
    /// New drafts always start unpaid; net salary is computed by the writer.
    pub fn draft(
        employee_id: u64,
        period: Period,
        basic_salary: f64,
        allowances: f64,
        deductions: f64,
        remarks: Option<String>,
    ) -> Self {
        Self {
            employee_id,
            period,
            basic_salary,
            allowances,
            deductions,
            net_salary: net_salary(basic_salary, allowances, deductions),
            status: PayrollStatus::Draft,
            remarks,
        }
    }
}

/// Fields touched by a status transition. Both are always written.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PayrollPatch {
    pub status: PayrollStatus,
    pub paid_date: Option<NaiveDate>,
}

impl PayrollPatch {
    pub fn transition(status: PayrollStatus, today: NaiveDate) -> Self {
        Self {
            status,
            paid_date: status.paid_date_for(today),
        }
    }
}

pub fn net_salary(basic_salary: f64, allowances: f64, deductions: f64) -> f64 {
    basic_salary + allowances - deductions
}

/// Parses a user-entered decimal amount. Anything unparsable counts as zero.
pub fn parse_amount(raw: &str) -> Result<f64, PayrollError> {
    let value = match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    };

    if value < 0.0 {
        return Err(PayrollError::Validation(
            "amounts must not be negative".to_string(),
        ));
    }
    Ok(value)
}
