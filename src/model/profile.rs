use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Employee profile as owned by the record store. Read-only here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[schema(
    example = json!({
        "id": 1001,
        "first_name": "John",
        "last_name": "Doe",
        "employee_id": "EMP-001",
        "department": "Engineering",
        "basic_salary": 1000.0
    })
)]
pub struct EmployeeProfile {
    #[schema(example = 1001)]
    pub id: u64,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    /// Human facing employee code, not the profile id.
    #[schema(example = "EMP-001")]
    pub employee_id: String,

    #[schema(example = "Engineering", nullable = true)]
    pub department: Option<String>,

    /// Default used to pre-fill new payroll records.
    #[schema(example = 1000.0, nullable = true)]
    pub basic_salary: Option<f64>,
}

