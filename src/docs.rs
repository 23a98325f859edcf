use crate::api::payroll::{
    CreatePayroll, PayrollHistoryResponse, PeriodPayrollResponse, PeriodQuery, RecordDisplay,
    UpdatePayrollStatus, YearQuery,
};
use crate::model::payroll::{PayrollRecord, PayrollStatus, Period};
use crate::model::profile::EmployeeProfile;
use crate::service::admin::{EmployeeSummary, PayrollEntry, PayrollForm, PeriodSummary};
use crate::service::viewer::{EarningsSummary, PayrollHistory};
use utoipa::Modify;
use utoipa::OpenApi;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRM Payroll API",
        version = "1.0.0",
        description = r#"
## Payroll for the HRM dashboard

### 🔹 Key Features
- **My Payroll**
  - Yearly payroll history of the signed-in employee with earnings totals
- **Payroll Management**
  - List every record of a month with totals, search by name or employee code
  - Create draft records, move records between draft / processed / paid

### 🔐 Security
All endpoints require a **JWT Bearer** access token.
Management endpoints are restricted to the **Admin** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::payroll::my_payroll,
        crate::api::payroll::list_period,
        crate::api::payroll::create_payroll,
        crate::api::payroll::update_status,
        crate::api::payroll::list_employees,
        crate::api::payroll::payroll_draft
    ),
    components(
        schemas(
            YearQuery,
            PeriodQuery,
            CreatePayroll,
            UpdatePayrollStatus,
            RecordDisplay,
            PayrollHistoryResponse,
            PeriodPayrollResponse,
            PayrollRecord,
            PayrollStatus,
            Period,
            EmployeeProfile,
            EmployeeSummary,
            PayrollEntry,
            PayrollForm,
            PeriodSummary,
            EarningsSummary,
            PayrollHistory
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Payroll", description = "Employee self-service payroll APIs"),
        (name = "Admin Payroll", description = "Payroll management APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_lists_payroll_paths_and_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/api/payroll/me"));
        assert!(paths.iter().any(|p| p.as_str() == "/api/admin/payroll/{payroll_id}/status"));
        assert!(
            doc.components
                .unwrap()
                .security_schemes
                .contains_key("bearer_auth")
        );
    }
}
