use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, Local};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    auth::auth::AuthUser,
    model::payroll::{PayrollRecord, PayrollStatus, Period},
    service::{
        admin::{
            AdminPayrollManager, PayrollEntry, PayrollForm, PeriodPayroll, PeriodSummary,
            filter_entries,
        },
        viewer::{EmployeePayrollViewer, PayrollHistory},
    },
    store::RecordStore,
    utils::format::{currency, display_date, period_label},
};

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct YearQuery {
    /// Defaults to the current year.
    #[schema(example = 2024)]
    pub year: Option<i32>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PeriodQuery {
    /// Defaults to the current month.
    #[schema(example = 5)]
    pub month: Option<u8>,

    /// Defaults to the current year.
    #[schema(example = 2024)]
    pub year: Option<i32>,

    /// Case-insensitive match on first name, last name or employee code.
    #[schema(example = "smith")]
    pub search: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreatePayroll {
    #[schema(example = 5)]
    pub month: u8,

    #[schema(example = 2024)]
    pub year: i32,

    #[schema(example = 1001, nullable = true)]
    pub employee_id: Option<u64>,

    #[schema(example = "1000")]
    #[serde(default)]
    pub basic_salary: String,

    #[schema(example = "200")]
    #[serde(default)]
    pub allowances: String,

    #[schema(example = "50")]
    #[serde(default)]
    pub deductions: String,

    #[schema(nullable = true)]
    pub remarks: Option<String>,
}

/// New status for a record, plus the period the admin is viewing.
#[derive(Deserialize, ToSchema)]
pub struct UpdatePayrollStatus {
    #[schema(example = "paid")]
    pub status: String,

    #[schema(example = 5)]
    pub month: u8,

    #[schema(example = 2024)]
    pub year: i32,
}

/// Presentation strings for one record.
#[derive(Serialize, ToSchema)]
pub struct RecordDisplay {
    pub period: String,
    pub net_salary: String,
    pub paid_date: Option<String>,
}

impl From<&PayrollRecord> for RecordDisplay {
    fn from(r: &PayrollRecord) -> Self {
        Self {
            period: period_label(r.period()),
            net_salary: currency(r.net_salary),
            paid_date: r.paid_date.map(display_date),
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PayrollHistoryResponse {
    #[serde(flatten)]
    pub history: PayrollHistory,
    pub total_earnings_display: String,
    pub total_allowances_display: String,
    pub total_deductions_display: String,
    pub records_display: Vec<RecordDisplay>,
}

impl From<PayrollHistory> for PayrollHistoryResponse {
    fn from(history: PayrollHistory) -> Self {
        Self {
            total_earnings_display: currency(history.summary.total_earnings),
            total_allowances_display: currency(history.summary.total_allowances),
            total_deductions_display: currency(history.summary.total_deductions),
            records_display: history.records.iter().map(RecordDisplay::from).collect(),
            history,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct PeriodPayrollResponse {
    pub period: Period,
    #[schema(example = "May 2024")]
    pub period_display: String,
    /// Entries left after applying `search`.
    pub entries: Vec<PayrollEntry>,
    pub records_display: Vec<RecordDisplay>,
    /// Totals over the whole period, regardless of `search`.
    pub summary: PeriodSummary,
    pub total_payroll_display: String,
}

impl PeriodPayrollResponse {
    fn new(view: PeriodPayroll, search: Option<&str>) -> Self {
        let entries = match search {
            Some(term) => filter_entries(&view.entries, term),
            None => view.entries,
        };

        Self {
            period: view.period,
            period_display: period_label(view.period),
            records_display: entries.iter().map(|e| RecordDisplay::from(&e.record)).collect(),
            entries,
            total_payroll_display: currency(view.summary.total_payroll),
            summary: view.summary,
        }
    }
}

fn current_period() -> (u8, i32) {
    let today = Local::now().date_naive();
    (today.month() as u8, today.year())
}

#[utoipa::path(
    get,
    path = "/api/payroll/me",
    params(YearQuery),
    responses(
        (status = 200, body = PayrollHistoryResponse),
        (status = 401),
        (status = 403, description = "User has no employee profile")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn my_payroll<S: RecordStore>(
    auth: AuthUser,
    store: web::Data<S>,
    query: web::Query<YearQuery>,
) -> actix_web::Result<impl Responder> {
    let viewer = EmployeePayrollViewer::new(store.get_ref(), &auth)?;
    let year = query.year.unwrap_or_else(|| current_period().1);

    let history = viewer
        .refresh(year)
        .await
        .unwrap_or_else(|| PayrollHistory::empty(year));

    Ok(HttpResponse::Ok().json(PayrollHistoryResponse::from(history)))
}

#[utoipa::path(
    get,
    path = "/api/admin/payroll",
    params(PeriodQuery),
    responses(
        (status = 200, body = PeriodPayrollResponse),
        (status = 400, description = "Invalid month"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payroll"
)]
pub async fn list_period<S: RecordStore>(
    auth: AuthUser,
    store: web::Data<S>,
    query: web::Query<PeriodQuery>,
) -> actix_web::Result<impl Responder> {
    let manager = AdminPayrollManager::new(store.get_ref(), &auth)?;

    let (month, year) = current_period();
    let period = Period::new(query.month.unwrap_or(month), query.year.unwrap_or(year))?;

    let view = manager.load_period(period).await;

    Ok(HttpResponse::Ok().json(PeriodPayrollResponse::new(view, query.search.as_deref())))
}

#[utoipa::path(
    post,
    path = "/api/admin/payroll",
    request_body = CreatePayroll,
    responses(
        (status = 201, description = "Payroll created", body = PeriodPayrollResponse),
        (status = 400, description = "No employee selected or invalid amounts", body = Object, example = json!({
            "error": "Please select an employee"
        })),
        (status = 409, description = "Record already exists for the period", body = Object, example = json!({
            "error": "Payroll already exists for this employee and month"
        })),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payroll"
)]
pub async fn create_payroll<S: RecordStore>(
    auth: AuthUser,
    store: web::Data<S>,
    payload: web::Json<CreatePayroll>,
) -> actix_web::Result<impl Responder> {
    let manager = AdminPayrollManager::new(store.get_ref(), &auth)?;

    let payload = payload.into_inner();
    let period = Period::new(payload.month, payload.year)?;
    let form = PayrollForm {
        employee_id: payload.employee_id,
        basic_salary: payload.basic_salary,
        allowances: payload.allowances,
        deductions: payload.deductions,
        remarks: payload.remarks,
    };

    let view = manager.create(period, form).await?;

    Ok(HttpResponse::Created().json(PeriodPayrollResponse::new(view, None)))
}

#[utoipa::path(
    put,
    path = "/api/admin/payroll/{payroll_id}/status",
    request_body = UpdatePayrollStatus,
    params(
        ("payroll_id" = u64, Path, description = "Payroll ID")
    ),
    responses(
        (status = 200, description = "Status updated", body = PeriodPayrollResponse),
        (status = 400, description = "Unknown status or invalid month"),
        (status = 404, description = "Payroll not found"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payroll"
)]
pub async fn update_status<S: RecordStore>(
    auth: AuthUser,
    store: web::Data<S>,
    path: web::Path<u64>,
    body: web::Json<UpdatePayrollStatus>,
) -> actix_web::Result<impl Responder> {
    let manager = AdminPayrollManager::new(store.get_ref(), &auth)?;

    let payroll_id = path.into_inner();
    let status = PayrollStatus::parse(&body.status)?;
    let period = Period::new(body.month, body.year)?;

    let view = manager.set_status(period, payroll_id, status).await?;

    Ok(HttpResponse::Ok().json(PeriodPayrollResponse::new(view, None)))
}

#[utoipa::path(
    get,
    path = "/api/admin/employees",
    responses(
        (status = 200, body = Vec<crate::model::profile::EmployeeProfile>),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payroll"
)]
pub async fn list_employees<S: RecordStore>(
    auth: AuthUser,
    store: web::Data<S>,
) -> actix_web::Result<impl Responder> {
    let manager = AdminPayrollManager::new(store.get_ref(), &auth)?;

    Ok(HttpResponse::Ok().json(manager.employees().await))
}

#[utoipa::path(
    get,
    path = "/api/admin/employees/{employee_id}/payroll-draft",
    params(
        ("employee_id" = u64, Path, description = "Employee profile ID")
    ),
    responses(
        (status = 200, description = "Creation form pre-filled from the profile", body = PayrollForm),
        (status = 400, description = "Unknown employee"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Admin Payroll"
)]
pub async fn payroll_draft<S: RecordStore>(
    auth: AuthUser,
    store: web::Data<S>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let manager = AdminPayrollManager::new(store.get_ref(), &auth)?;

    let form = manager.draft_for(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(form))
}

#[cfg(test)]
mod tests {
    use crate::{
        auth::jwt::issue_token,
        config::Config,
        model::profile::EmployeeProfile,
        models::TokenType,
        routes,
        store::{MemoryStore, testing::profile},
    };
    use actix_web::{
        App,
        http::StatusCode,
        test::{self, TestRequest},
        web::Data,
    };
    use serde_json::{Value, json};

    const ADMIN: u8 = 1;
    const EMPLOYEE: u8 = 3;

    fn token(role: u8, employee_id: Option<u64>) -> String {
        let config = Config::for_tests();
        format!(
            "Bearer {}",
            issue_token(1, role, employee_id, TokenType::Access, &config.jwt_secret)
        )
    }

    fn staff() -> Vec<EmployeeProfile> {
        vec![
            profile(1, "Alice", "Smith", "EMP-001"),
            profile(2, "Bob", "Jones", "EMP-002"),
        ]
    }

    macro_rules! app {
        ($store:expr) => {{
            let config = Config::for_tests();
            let store: Data<MemoryStore> = $store;
            test::init_service(
                App::new()
                    .app_data(Data::new(config.clone()))
                    .app_data(store)
                    .configure(|cfg| routes::configure::<MemoryStore>(cfg, &config)),
            )
            .await
        }};
    }

    fn request(req: TestRequest, auth: &str) -> TestRequest {
        req.insert_header(("Authorization", auth.to_string()))
            .peer_addr("127.0.0.1:40000".parse().unwrap())
    }

    fn create_body(employee_id: Option<u64>) -> Value {
        json!({
            "month": 5,
            "year": 2024,
            "employee_id": employee_id,
            "basic_salary": "1000",
            "allowances": "200",
            "deductions": "50"
        })
    }

    #[actix_web::test]
    async fn admin_creates_then_duplicate_is_conflict() {
        let store = Data::new(MemoryStore::with_profiles(staff()));
        let app = app!(store.clone());
        let admin = token(ADMIN, None);

        let req = request(TestRequest::post().uri("/api/admin/payroll"), &admin)
            .set_json(create_body(Some(1)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["entries"][0]["record"]["net_salary"], 1150.0);
        assert_eq!(body["entries"][0]["record"]["status"], "draft");
        assert_eq!(body["total_payroll_display"], "$1,150.00");

        let req = request(TestRequest::post().uri("/api/admin/payroll"), &admin)
            .set_json(create_body(Some(1)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"],
            "Payroll already exists for this employee and month"
        );
        assert_eq!(store.payroll_count(), 1);
    }

    #[actix_web::test]
    async fn create_without_employee_is_bad_request() {
        let store = Data::new(MemoryStore::with_profiles(staff()));
        let app = app!(store.clone());

        let req = request(TestRequest::post().uri("/api/admin/payroll"), &token(ADMIN, None))
            .set_json(create_body(None))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Please select an employee");
        assert_eq!(store.payroll_count(), 0);
    }

    #[actix_web::test]
    async fn employees_cannot_reach_admin_routes() {
        let app = app!(Data::new(MemoryStore::with_profiles(staff())));

        let req = request(
            TestRequest::get().uri("/api/admin/payroll?month=5&year=2024"),
            &token(EMPLOYEE, Some(1)),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn missing_token_is_unauthorized() {
        let app = app!(Data::new(MemoryStore::new()));

        let req = TestRequest::get()
            .uri("/api/payroll/me")
            .peer_addr("127.0.0.1:40000".parse().unwrap())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn status_update_then_employee_sees_paid_history() {
        let store = Data::new(MemoryStore::with_profiles(staff()));
        let app = app!(store.clone());
        let admin = token(ADMIN, None);

        let req = request(TestRequest::post().uri("/api/admin/payroll"), &admin)
            .set_json(create_body(Some(1)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["entries"][0]["record"]["id"].as_u64().unwrap();

        let req = request(
            TestRequest::put().uri(&format!("/api/admin/payroll/{id}/status")),
            &admin,
        )
        .set_json(json!({ "status": "paid", "month": 5, "year": 2024 }))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["entries"][0]["record"]["paid_date"].is_string());
        assert_eq!(body["summary"]["paid_count"], 1);

        let req = request(
            TestRequest::get().uri("/api/payroll/me?year=2024"),
            &token(EMPLOYEE, Some(1)),
        )
        .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["year"], 2024);
        assert_eq!(body["summary"]["total_earnings"], 1150.0);
        assert_eq!(body["summary"]["paid_count"], 1);
        assert_eq!(body["records_display"][0]["period"], "May 2024");
    }

    #[actix_web::test]
    async fn unknown_status_is_bad_request() {
        let app = app!(Data::new(MemoryStore::with_profiles(staff())));

        let req = request(
            TestRequest::put().uri("/api/admin/payroll/1/status"),
            &token(ADMIN, None),
        )
        .set_json(json!({ "status": "archived", "month": 5, "year": 2024 }))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn status_update_needs_a_valid_period() {
        let store = Data::new(MemoryStore::with_profiles(staff()));
        let app = app!(store.clone());
        let admin = token(ADMIN, None);

        let req = request(TestRequest::post().uri("/api/admin/payroll"), &admin)
            .set_json(create_body(Some(1)))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        let id = body["entries"][0]["record"]["id"].as_u64().unwrap();

        let req = request(
            TestRequest::put().uri(&format!("/api/admin/payroll/{id}/status")),
            &admin,
        )
        .set_json(json!({ "status": "paid", "month": 13, "year": 2024 }))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = request(
            TestRequest::put().uri("/api/admin/payroll/999/status"),
            &admin,
        )
        .set_json(json!({ "status": "paid", "month": 5, "year": 2024 }))
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn listing_applies_search_but_totals_cover_period() {
        let store = Data::new(MemoryStore::with_profiles(staff()));
        let app = app!(store.clone());
        let admin = token(ADMIN, None);

        for id in [1, 2] {
            let req = request(TestRequest::post().uri("/api/admin/payroll"), &admin)
                .set_json(create_body(Some(id)))
                .to_request();
            test::call_service(&app, req).await;
        }

        let req = request(
            TestRequest::get().uri("/api/admin/payroll?month=5&year=2024&search=JONES"),
            &admin,
        )
        .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;

        let entries = body["entries"].as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0]["employee"]["employee_id"], "EMP-002");
        assert_eq!(body["summary"]["record_count"], 2);
        assert_eq!(body["summary"]["pending_count"], 2);
        assert_eq!(body["period_display"], "May 2024");
    }

    #[actix_web::test]
    async fn invalid_month_is_bad_request() {
        let app = app!(Data::new(MemoryStore::new()));

        let req = request(
            TestRequest::get().uri("/api/admin/payroll?month=13&year=2024"),
            &token(ADMIN, None),
        )
        .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn draft_endpoint_prefills_salary() {
        let app = app!(Data::new(MemoryStore::with_profiles(staff())));

        let req = request(
            TestRequest::get().uri("/api/admin/employees/2/payroll-draft"),
            &token(ADMIN, None),
        )
        .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["employee_id"], 2);
        assert_eq!(body["basic_salary"], "1000");

        let req = request(TestRequest::get().uri("/api/admin/employees"), &token(ADMIN, None))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body.as_array().unwrap().len(), 2);
        assert_eq!(body[0]["first_name"], "Alice");
    }
}
