//! # OpenAPI Document Assembly
//!
//! Collects the utoipa-documented routes into one OpenAPI document served
//! at `/openapi.json`.

use axum::routing::get;
use axum::{Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::state::AppState;

/// Adds the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .description(Some(
                            "`seller:<secret>` or `reviewer:<secret>`. Set the secret via AUTH_TOKEN.",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Seller Onboarding API",
        version = "0.1.0",
        description = "Server-side seller onboarding wizard with OTP verification, IFSC lookup, admin review and catalog entry."
    ),
    paths(
        crate::routes::sessions::create_session,
        crate::routes::sessions::get_session,
        crate::routes::sessions::delete_session,
        crate::routes::sessions::set_fields,
        crate::routes::sessions::set_business_type,
        crate::routes::sessions::set_terms,
        crate::routes::sessions::toggle_product_type,
        crate::routes::sessions::set_license,
        crate::routes::sessions::set_file,
        crate::routes::sessions::clear_file,
        crate::routes::sessions::set_ifsc,
        crate::routes::sessions::continue_step,
        crate::routes::sessions::back,
        crate::routes::sessions::jump,
        crate::routes::sessions::toggle_menu,
        crate::routes::otp::open,
        crate::routes::otp::close,
        crate::routes::otp::send,
        crate::routes::otp::input,
        crate::routes::otp::paste,
        crate::routes::otp::backspace,
        crate::routes::otp::resend,
        crate::routes::admin::get_review,
        crate::routes::admin::mark_item,
        crate::routes::admin::decide,
        crate::routes::catalog::create_product,
    ),
    components(
        schemas(
            crate::error::ErrorBody,
            crate::error::ErrorDetail,
            crate::routes::sessions::SessionResponse,
            crate::routes::sessions::BusinessTypeRequest,
            crate::routes::sessions::TermsRequest,
            crate::routes::sessions::ProductTypeRequest,
            crate::routes::sessions::FileRequest,
            crate::routes::sessions::LicenseRequest,
            crate::routes::sessions::IfscRequest,
            crate::routes::sessions::JumpRequest,
            crate::routes::sessions::MenuRequest,
            crate::routes::otp::DigitRequest,
            crate::routes::otp::PasteRequest,
            crate::routes::admin::ReviewResponse,
            crate::routes::admin::DecisionResponse,
            crate::routes::admin::MarkItemRequest,
            crate::routes::admin::DecisionRequest,
            crate::routes::catalog::CreateProductRequest,
            crate::routes::catalog::CreateProductResponse,
        ),
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "sessions", description = "Onboarding wizard sessions: record edits, navigation, IFSC lookup and submission"),
        (name = "otp", description = "Email and mobile verification by one-time code"),
        (name = "admin", description = "Reviewer checklist and decision on submitted applications"),
        (name = "catalog", description = "Product listings for onboarded sellers"),
    )
)]
pub struct ApiDoc;

pub fn router() -> Router<AppState> {
    Router::new().route("/openapi.json", get(openapi_json))
}

/// GET /openapi.json
async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/v1/sessions",
            "/v1/sessions/{id}/fields",
            "/v1/sessions/{id}/otp/{channel}/send",
            "/v1/admin/sellers/{id}/decision",
            "/v1/sellers/{seller_id}/products",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn session_path_carries_get_and_delete() {
        let doc = ApiDoc::openapi();
        let item = &doc.paths.paths["/v1/sessions/{id}"];
        assert!(item.get.is_some());
        assert!(item.delete.is_some());
    }

    #[test]
    fn document_declares_bearer_auth() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
