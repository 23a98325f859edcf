use crate::auth::jwt::verify_token;
use crate::config::Config;
use crate::error::PayrollError;
use crate::model::role::Role;
use actix_web::{
    FromRequest, HttpMessage, HttpRequest, dev::Payload, error::ErrorUnauthorized, web::Data,
};
use futures::future::{Ready, ready};

/// Authenticated caller. Passed explicitly to the payroll services as their
/// session context.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthUser {
    pub user_id: u64,
    pub username: String,
    pub role: Role,

    /// Present only if this user is linked to an employee profile
    pub employee_id: Option<u64>,
}

impl FromRequest for AuthUser {
    type Error = actix_web::Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        // Already resolved by auth_middleware on protected scopes
        if let Some(user) = req.extensions().get::<AuthUser>() {
            return ready(Ok(user.clone()));
        }

        let token = match req
            .headers()
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .and_then(|h| h.strip_prefix("Bearer "))
        {
            Some(t) => t,
            None => return ready(Err(ErrorUnauthorized("Missing token"))),
        };

        let config = match req.app_data::<Data<Config>>() {
            Some(c) => c,
            None => {
                return ready(Err(
                    actix_web::error::ErrorInternalServerError("Config missing"),
                ));
            }
        };

        let claims = match verify_token(token, &config.jwt_secret) {
            Ok(c) => c,
            Err(_) => return ready(Err(ErrorUnauthorized("Invalid token"))),
        };

        let role = match Role::from_id(claims.role) {
            Some(r) => r,
            None => return ready(Err(ErrorUnauthorized("Invalid role"))),
        };

        ready(Ok(AuthUser {
            user_id: claims.user_id,
            username: claims.sub,
            role,
            employee_id: claims.employee_id,
        }))
    }
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), PayrollError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(PayrollError::Forbidden("Admin only".to_string()))
        }
    }

    /// Profile id of the employee this user is linked to.
    pub fn require_employee_profile(&self) -> Result<u64, PayrollError> {
        self.employee_id
            .ok_or_else(|| PayrollError::Forbidden("No employee profile".to_string()))
    }
}
