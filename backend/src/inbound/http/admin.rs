//! Admin HTTP handlers.
//!
//! ```text
//! POST /api/admin/auth    Check the shared admin password
//! POST /api/admin/delete  Delete a user or a review (rate limited)
//! ```

use actix_web::{post, web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::admin::{DeleteOutcome, DeleteTarget};
use crate::domain::Error;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::ApiResult;

/// Admin authentication request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminAuthRequestBody {
    pub admin_password: Option<String>,
}

/// Admin deletion request body. Exactly one target must be set.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminDeleteRequestBody {
    pub admin_password: Option<String>,
    pub user_email_to_delete: Option<String>,
    pub contribution_id_to_delete: Option<String>,
}

fn client_key(req: &HttpRequest) -> String {
    req.peer_addr()
        .map_or_else(|| "unknown".to_owned(), |addr| addr.ip().to_string())
}

fn resolve_target(body: &AdminDeleteRequestBody) -> Result<DeleteTarget, Error> {
    if let Some(email) = body
        .user_email_to_delete
        .as_deref()
        .filter(|email| !email.trim().is_empty())
    {
        return Ok(DeleteTarget::User(email.to_owned()));
    }
    if let Some(raw) = body
        .contribution_id_to_delete
        .as_deref()
        .filter(|id| !id.trim().is_empty())
    {
        let id = Uuid::parse_str(raw).map_err(|_| {
            Error::invalid_request("contributionIdToDelete must be a valid UUID").with_details(
                json!({
                    "field": "contributionIdToDelete",
                    "value": raw,
                    "code": "invalid_uuid",
                }),
            )
        })?;
        return Ok(DeleteTarget::Contribution(id));
    }
    Err(Error::invalid_request(
        "Please provide either a user email or a contribution ID to delete.",
    ))
}

/// Check the shared admin password.
#[utoipa::path(
    post,
    path = "/api/admin/auth",
    request_body = AdminAuthRequestBody,
    security([]),
    responses(
        (status = 200, description = "Password accepted", body = MessageResponse),
        (status = 403, description = "Password rejected", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "adminAuth"
)]
#[post("/admin/auth")]
pub async fn admin_auth(
    state: web::Data<HttpState>,
    body: web::Json<AdminAuthRequestBody>,
) -> ApiResult<HttpResponse> {
    state
        .admin
        .authenticate(body.admin_password.as_deref().unwrap_or_default())?;
    Ok(HttpResponse::Ok().json(MessageResponse::new("Admin authentication successful.")))
}

/// Delete a user (with every review they own) or a single review.
///
/// Every call spends the caller's rate-limit budget, including rejected
/// passwords and malformed targets.
#[utoipa::path(
    post,
    path = "/api/admin/delete",
    request_body = AdminDeleteRequestBody,
    security([]),
    responses(
        (status = 200, description = "Target removed", body = MessageResponse),
        (status = 400, description = "No target, or a malformed one", body = crate::domain::Error),
        (status = 403, description = "Password rejected", body = crate::domain::Error),
        (status = 404, description = "Target does not exist", body = crate::domain::Error),
        (status = 429, description = "Rate limit exceeded", body = crate::domain::Error)
    ),
    tags = ["admin"],
    operation_id = "adminDelete"
)]
#[post("/admin/delete")]
pub async fn admin_delete(
    state: web::Data<HttpState>,
    req: HttpRequest,
    body: web::Json<AdminDeleteRequestBody>,
) -> ApiResult<HttpResponse> {
    state.admin_limiter.check(&client_key(&req))?;

    // Password first, target second: a rejected password answers 403 even
    // when the target is missing or malformed.
    let password = body.admin_password.as_deref().unwrap_or_default();
    state.admin.authenticate(password)?;
    let target = resolve_target(&body)?;
    let outcome = state.admin.delete(password, target).await?;
    let message = match outcome {
        DeleteOutcome::UserRemoved => format!(
            "User {} and all their contributions have been deleted.",
            body.user_email_to_delete.as_deref().unwrap_or_default()
        ),
        DeleteOutcome::ContributionRemoved => format!(
            "Contribution with ID {} has been deleted.",
            body.contribution_id_to_delete.as_deref().unwrap_or_default()
        ),
    };
    Ok(HttpResponse::Ok().json(MessageResponse::new(message)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::{memory_state, TEST_ADMIN_PASSWORD};
    use actix_web::http::StatusCode;
    use actix_web::{test, App};
    use serde_json::Value;

    macro_rules! admin_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .service(web::scope("/api").service(admin_auth).service(admin_delete)),
            )
            .await
        };
    }

    #[actix_web::test]
    async fn auth_accepts_the_right_password() {
        let (state, _fixtures) = memory_state();
        let app = admin_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/auth")
                .set_json(json!({ "adminPassword": TEST_ADMIN_PASSWORD }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Admin authentication successful.");
    }

    #[actix_web::test]
    async fn auth_rejects_a_wrong_or_missing_password() {
        let (state, _fixtures) = memory_state();
        let app = admin_app!(state);
        for body in [json!({ "adminPassword": "nope" }), json!({})] {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/admin/auth")
                    .set_json(body)
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::FORBIDDEN);
            let body: Value = test::read_body_json(res).await;
            assert_eq!(body["message"], "Incorrect admin password.");
        }
    }

    #[actix_web::test]
    async fn delete_without_a_target_is_a_400() {
        let (state, _fixtures) = memory_state();
        let app = admin_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/delete")
                .set_json(json!({ "adminPassword": TEST_ADMIN_PASSWORD }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "Please provide either a user email or a contribution ID to delete."
        );
    }

    #[actix_web::test]
    async fn a_malformed_contribution_id_is_a_400() {
        let (state, _fixtures) = memory_state();
        let app = admin_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/delete")
                .set_json(json!({
                    "adminPassword": TEST_ADMIN_PASSWORD,
                    "contributionIdToDelete": "not-a-uuid"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn deleting_an_unknown_user_is_a_404() {
        let (state, _fixtures) = memory_state();
        let app = admin_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/delete")
                .set_json(json!({
                    "adminPassword": TEST_ADMIN_PASSWORD,
                    "userEmailToDelete": "ghost@student.gitam.edu"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "User not found.");
    }

    #[actix_web::test]
    async fn the_sixth_delete_call_from_one_client_is_rate_limited() {
        let (state, _fixtures) = memory_state();
        let app = admin_app!(state);
        // All attempts count, valid or not.
        for _ in 0..5 {
            let res = test::call_service(
                &app,
                test::TestRequest::post()
                    .uri("/api/admin/delete")
                    .peer_addr("10.1.2.3:44000".parse().expect("socket addr"))
                    .set_json(json!({ "adminPassword": "nope" }))
                    .to_request(),
            )
            .await;
            assert_eq!(res.status(), StatusCode::FORBIDDEN);
        }
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/delete")
                .peer_addr("10.1.2.3:44001".parse().expect("socket addr"))
                .set_json(json!({
                    "adminPassword": TEST_ADMIN_PASSWORD,
                    "userEmailToDelete": "ghost@student.gitam.edu"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::TOO_MANY_REQUESTS);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "Too many login attempts from this IP, please try again after 15 minutes."
        );

        // A different client still has budget.
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/admin/delete")
                .peer_addr("10.9.9.9:5000".parse().expect("socket addr"))
                .set_json(json!({ "adminPassword": TEST_ADMIN_PASSWORD }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
