use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failures reported by a record store backend.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum StoreError {
    /// Uniqueness violation on (employee, month, year).
    #[display(fmt = "duplicate payroll record")]
    Duplicate,

    #[display(fmt = "record not found")]
    NotFound,

    #[display(fmt = "{}", _0)]
    Backend(String),
}

impl std::error::Error for StoreError {}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            // SQLSTATE 23000 also covers foreign key and NOT NULL failures,
            // only a unique key violation (1062/1586) is a duplicate
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        if matches!(e, sqlx::Error::RowNotFound) {
            return StoreError::NotFound;
        }
        StoreError::Backend(e.to_string())
    }
}

/// Errors surfaced at the payroll operation boundary. The display text is the
/// message shown to the user.
#[derive(Debug, Display, Clone, PartialEq)]
pub enum PayrollError {
    #[display(fmt = "{}", _0)]
    Validation(String),

    #[display(fmt = "Payroll already exists for this employee and month")]
    Duplicate,

    #[display(fmt = "{}", _0)]
    Store(String),

    #[display(fmt = "Payroll record not found")]
    NotFound,

    #[display(fmt = "{}", _0)]
    Forbidden(String),
}

impl std::error::Error for PayrollError {}

impl PayrollError {
    pub fn no_employee_selected() -> Self {
        PayrollError::Validation("Please select an employee".to_string())
    }
}

impl From<StoreError> for PayrollError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Duplicate => PayrollError::Duplicate,
            StoreError::NotFound => PayrollError::NotFound,
            StoreError::Backend(message) => PayrollError::Store(message),
        }
    }
}

impl ResponseError for PayrollError {
    fn status_code(&self) -> StatusCode {
        match self {
            PayrollError::Validation(_) => StatusCode::BAD_REQUEST,
            PayrollError::Duplicate => StatusCode::CONFLICT,
            PayrollError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            PayrollError::NotFound => StatusCode::NOT_FOUND,
            PayrollError::Forbidden(_) => StatusCode::FORBIDDEN,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(json!({ "error": self.to_string() }))
    }
}
