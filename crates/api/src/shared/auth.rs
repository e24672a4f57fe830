use crate::error::ApiError;
use actix_web::HttpRequest;
use charity_reminders_infra::ReminderContext;
use charity_reminders_utils::secrets_match;

pub const ADMIN_KEY_HEADER: &str = "x-admin-key";

/// Only operators holding the admin secret may call the route
pub fn protect_admin_route(req: &HttpRequest, ctx: &ReminderContext) -> Result<(), ApiError> {
    let key = req
        .headers()
        .get(ADMIN_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            ApiError::Unauthorized(format!("Missing `{}` header", ADMIN_KEY_HEADER))
        })?;

    if secrets_match(key, &ctx.config.admin_secret_code) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized("Invalid admin key provided".into()))
    }
}
