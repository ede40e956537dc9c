//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] generates the OpenAPI specification for the REST API. It
//! registers every HTTP endpoint from the inbound layer, the request and
//! response body schemas, and the bearer token security scheme. The
//! generated specification backs Swagger UI in debug builds.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::login::SessionUser;
use crate::domain::{Error, ErrorCode};
use crate::inbound::http::accounts::{
    DashboardResponseBody, LoginRequestBody, LoginResponseBody, RegisterRequestBody,
    VerifyEmailRequestBody,
};
use crate::inbound::http::admin::{AdminAuthRequestBody, AdminDeleteRequestBody};
use crate::inbound::http::contributions::{
    AllReviewsResponseBody, ContributionRequestBody, ContributionView, FacultyView,
    GroupedReviewView,
};
use crate::inbound::http::schemas::MessageResponse;

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "BearerToken",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /login."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Student portal backend API",
        description = "HTTP interface for registration, email verification, \
                       faculty reviews, and administration."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::accounts::register,
        crate::inbound::http::accounts::verify_email,
        crate::inbound::http::accounts::login,
        crate::inbound::http::accounts::dashboard,
        crate::inbound::http::contributions::submit_contribution,
        crate::inbound::http::contributions::list_my_contributions,
        crate::inbound::http::contributions::search_contributions,
        crate::inbound::http::contributions::delete_account,
        crate::inbound::http::admin::admin_auth,
        crate::inbound::http::admin::admin_delete,
        crate::inbound::http::health::root,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        MessageResponse,
        SessionUser,
        RegisterRequestBody,
        VerifyEmailRequestBody,
        LoginRequestBody,
        LoginResponseBody,
        DashboardResponseBody,
        ContributionRequestBody,
        ContributionView,
        GroupedReviewView,
        FacultyView,
        AllReviewsResponseBody,
        AdminAuthRequestBody,
        AdminDeleteRequestBody,
    )),
    tags(
        (name = "accounts", description = "Registration, verification, and login"),
        (name = "contributions", description = "Faculty review submission and search"),
        (name = "admin", description = "Password-gated moderation operations"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use utoipa::openapi::schema::Schema;
    use utoipa::openapi::RefOr;
    use utoipa::OpenApi;

    /// Assert that an Object schema contains a field with the given name.
    fn assert_object_schema_has_field(schema: &RefOr<Schema>, field: &str) {
        match schema {
            RefOr::T(Schema::Object(obj)) => {
                assert!(
                    obj.properties.contains_key(field),
                    "schema should have field '{field}'"
                );
            }
            _ => panic!("expected Object schema"),
        }
    }

    #[test]
    fn openapi_error_schema_has_required_fields() {
        let doc = ApiDoc::openapi();
        let schemas = &doc.components.as_ref().expect("components").schemas;
        let error_schema = schemas.get("Error").expect("Error schema");

        assert_object_schema_has_field(error_schema, "code");
        assert_object_schema_has_field(error_schema, "message");
    }

    #[test]
    fn openapi_registers_every_portal_path() {
        let doc = ApiDoc::openapi();
        for path in [
            "/register",
            "/verify-email",
            "/login",
            "/dashboard",
            "/api/contributions",
            "/api/contributions/me",
            "/api/contributions/search",
            "/api/account",
            "/api/admin/auth",
            "/api/admin/delete",
        ] {
            assert!(
                doc.paths.paths.contains_key(path),
                "OpenAPI document should register {path}"
            );
        }
    }
}
