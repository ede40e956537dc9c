//! Account HTTP handlers.
//!
//! ```text
//! POST /register      Create an account and email a verification code
//! POST /verify-email  Redeem a verification code
//! POST /login         Exchange credentials for a bearer token
//! GET  /dashboard     Greet the authenticated user
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::login::SessionUser;
use crate::domain::registration::{RegistrationOutcome, VerifyOutcome};
use crate::inbound::http::auth::Bearer;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_fields;
use crate::inbound::http::ApiResult;

/// Registration request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequestBody {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Email verification request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerifyEmailRequestBody {
    pub email: Option<String>,
    pub code: Option<String>,
}

/// Login request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequestBody {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login success response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponseBody {
    pub message: String,
    pub token: String,
    pub user: SessionUser,
}

/// Dashboard greeting response.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponseBody {
    pub message: String,
    pub user: SessionUser,
}

/// Register a new account or re-issue a code to an unverified one.
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequestBody,
    security([]),
    responses(
        (status = 201, description = "Account created, code emailed", body = MessageResponse),
        (status = 200, description = "Unverified account, fresh code emailed", body = MessageResponse),
        (status = 400, description = "Missing fields or email outside the domain", body = crate::domain::Error),
        (status = 409, description = "Email already registered and verified", body = crate::domain::Error)
    ),
    tags = ["accounts"],
    operation_id = "register"
)]
#[post("/register")]
pub async fn register(
    state: web::Data<HttpState>,
    body: web::Json<RegisterRequestBody>,
) -> ApiResult<HttpResponse> {
    require_fields(
        &[
            ("name", body.name.as_deref()),
            ("email", body.email.as_deref()),
            ("password", body.password.as_deref()),
        ],
        "Name, email, and password are required.",
    )?;
    let outcome = state
        .registration
        .register(
            body.name.as_deref().unwrap_or_default(),
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(match outcome {
        RegistrationOutcome::Registered => HttpResponse::Created().json(MessageResponse::new(
            "Registration successful! A verification code has been sent to your email. \
             Please check your inbox.",
        )),
        RegistrationOutcome::CodeResent => HttpResponse::Ok().json(MessageResponse::new(
            "User already exists but not verified. \
             A new verification code has been sent to your email.",
        )),
    })
}

/// Redeem an emailed verification code.
#[utoipa::path(
    post,
    path = "/verify-email",
    request_body = VerifyEmailRequestBody,
    security([]),
    responses(
        (status = 200, description = "Verified, or already verified", body = MessageResponse),
        (status = 400, description = "Missing fields, wrong code, or expired code", body = crate::domain::Error),
        (status = 404, description = "No account for this email", body = crate::domain::Error)
    ),
    tags = ["accounts"],
    operation_id = "verifyEmail"
)]
#[post("/verify-email")]
pub async fn verify_email(
    state: web::Data<HttpState>,
    body: web::Json<VerifyEmailRequestBody>,
) -> ApiResult<HttpResponse> {
    require_fields(
        &[
            ("email", body.email.as_deref()),
            ("code", body.code.as_deref()),
        ],
        "Email and verification code are required.",
    )?;
    let outcome = state
        .registration
        .verify_email(
            body.email.as_deref().unwrap_or_default(),
            body.code.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(match outcome {
        VerifyOutcome::Verified => {
            HttpResponse::Ok().json(MessageResponse::new("Email successfully verified!"))
        }
        VerifyOutcome::AlreadyVerified => {
            HttpResponse::Ok().json(MessageResponse::new("Email is already verified."))
        }
    })
}

/// Exchange an email and password for a bearer token.
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequestBody,
    security([]),
    responses(
        (status = 200, description = "Token issued", body = LoginResponseBody),
        (status = 400, description = "Missing fields", body = crate::domain::Error),
        (status = 401, description = "Unknown email or wrong password", body = crate::domain::Error),
        (status = 403, description = "Email not verified yet", body = crate::domain::Error)
    ),
    tags = ["accounts"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    body: web::Json<LoginRequestBody>,
) -> ApiResult<HttpResponse> {
    require_fields(
        &[
            ("email", body.email.as_deref()),
            ("password", body.password.as_deref()),
        ],
        "Email and password are required.",
    )?;
    let session = state
        .login
        .login(
            body.email.as_deref().unwrap_or_default(),
            body.password.as_deref().unwrap_or_default(),
        )
        .await?;
    Ok(HttpResponse::Ok().json(LoginResponseBody {
        message: "Login successful!".to_owned(),
        token: session.token,
        user: session.user,
    }))
}

/// Greet the authenticated user with the claims from their token.
#[utoipa::path(
    get,
    path = "/dashboard",
    responses(
        (status = 200, description = "Greeting", body = DashboardResponseBody),
        (status = 401, description = "No token supplied", body = crate::domain::Error),
        (status = 403, description = "Invalid or expired token", body = crate::domain::Error)
    ),
    tags = ["accounts"],
    operation_id = "dashboard"
)]
#[get("/dashboard")]
pub async fn dashboard(user: Bearer) -> ApiResult<HttpResponse> {
    let Bearer(user) = user;
    Ok(HttpResponse::Ok().json(DashboardResponseBody {
        message: format!("Welcome to your dashboard, {}!", user.name),
        user: SessionUser {
            name: user.name,
            email: user.email,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inbound::http::test_utils::memory_state;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test, App};
    use serde_json::{json, Value};

    const EMAIL: &str = "jane@student.gitam.edu";

    macro_rules! account_app {
        ($state:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state))
                    .service(register)
                    .service(verify_email)
                    .service(login)
                    .service(dashboard),
            )
            .await
        };
    }

    fn register_body() -> Value {
        json!({ "name": "Jane Doe", "email": EMAIL, "password": "hunter2" })
    }

    #[actix_web::test]
    async fn registration_returns_201_and_emails_a_code() {
        let (state, fixtures) = memory_state();
        let app = account_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);
        assert_eq!(fixtures.mailer.sent_count(), 1);
    }

    #[actix_web::test]
    async fn a_foreign_domain_is_rejected_with_the_exact_message() {
        let (state, _fixtures) = memory_state();
        let app = account_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(json!({
                    "name": "Jane Doe",
                    "email": "jane@gmail.com",
                    "password": "hunter2"
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "Invalid email format. Only @student.gitam.edu emails are allowed."
        );
    }

    #[actix_web::test]
    async fn missing_registration_fields_are_a_400() {
        let (state, _fixtures) = memory_state();
        let app = account_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(json!({ "email": EMAIL }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Name, email, and password are required.");
    }

    #[actix_web::test]
    async fn the_full_verify_then_login_flow_issues_a_working_token() {
        let (state, fixtures) = memory_state();
        let app = account_app!(state);

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let code = fixtures.mailer.sent()[0].code.clone();
        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/verify-email")
                .set_json(json!({ "email": EMAIL, "code": code }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Email successfully verified!");

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": EMAIL, "password": "hunter2" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Login successful!");
        assert_eq!(body["user"]["name"], "Jane Doe");
        let token = body["token"].as_str().expect("token string").to_owned();

        let res = test::call_service(
            &app,
            test::TestRequest::get()
                .uri("/dashboard")
                .insert_header((header::AUTHORIZATION, format!("Bearer {token}")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Welcome to your dashboard, Jane Doe!");
        assert_eq!(body["user"]["email"], EMAIL);
    }

    #[actix_web::test]
    async fn login_before_verification_is_forbidden() {
        let (state, _fixtures) = memory_state();
        let app = account_app!(state);
        test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/register")
                .set_json(register_body())
                .to_request(),
        )
        .await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/login")
                .set_json(json!({ "email": EMAIL, "password": "hunter2" }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(
            body["message"],
            "Please verify your email address before logging in."
        );
    }

    #[actix_web::test]
    async fn the_dashboard_requires_a_token() {
        let (state, _fixtures) = memory_state();
        let app = account_app!(state);
        let res = test::call_service(
            &app,
            test::TestRequest::get().uri("/dashboard").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["message"], "Authentication token required.");
    }
}
