use crate::{api::payroll, auth::middleware::auth_middleware, config::Config, store::RecordStore};
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{middleware::from_fn, web};

// Helper to build a per-scope limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Mounts the payroll API under `config.api_prefix`, backed by store `S`.
/// The store itself must be registered as `web::Data<S>` app data.
pub fn configure<S: RecordStore>(cfg: &mut web::ServiceConfig, config: &Config) {
    let protected_limiter = build_limiter(config.rate_protected_per_min);

    cfg.service(
        web::scope(&config.api_prefix)
            .wrap(from_fn(auth_middleware)) // authentication
            .wrap(protected_limiter) // rate limiting
            .service(
                web::scope("/payroll")
                    // /payroll/me
                    .service(web::resource("/me").route(web::get().to(payroll::my_payroll::<S>))),
            )
            .service(
                web::scope("/admin")
                    // /admin/payroll
                    .service(
                        web::resource("/payroll")
                            .route(web::get().to(payroll::list_period::<S>))
                            .route(web::post().to(payroll::create_payroll::<S>)),
                    )
                    // /admin/payroll/{id}/status
                    .service(
                        web::resource("/payroll/{id}/status")
                            .route(web::put().to(payroll::update_status::<S>)),
                    )
                    // /admin/employees
                    .service(
                        web::resource("/employees")
                            .route(web::get().to(payroll::list_employees::<S>)),
                    )
                    // /admin/employees/{id}/payroll-draft
                    .service(
                        web::resource("/employees/{id}/payroll-draft")
                            .route(web::get().to(payroll::payroll_draft::<S>)),
                    ),
            ),
    );
}
