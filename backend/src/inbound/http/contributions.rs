//! Contribution HTTP handlers.
//!
//! ```text
//! POST   /api/contributions         Submit a review (authenticated)
//! GET    /api/contributions/me      List the caller's reviews (authenticated)
//! GET    /api/contributions/search  Public search with aggregation
//! DELETE /api/account               Delete the caller's account (authenticated)
//! ```

use actix_web::{delete, get, post, web, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::contribution::ContributionWithAuthor;
use crate::domain::contribution_service::NewContribution;
use crate::domain::search::{FacultyAggregate, SearchOutcome};
use crate::domain::Error;
use crate::inbound::http::auth::Bearer;
use crate::inbound::http::schemas::MessageResponse;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::require_fields;
use crate::inbound::http::ApiResult;

/// Review submission request body.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRequestBody {
    pub faculty_name: Option<String>,
    pub faculty_email: Option<String>,
    pub rating: Option<i32>,
    pub review: Option<String>,
}

/// One review with its author, as returned by list and search endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContributionView {
    pub id: String,
    pub faculty_name: String,
    pub faculty_email: String,
    pub reviewer_name: String,
    pub rating: i32,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

impl From<&ContributionWithAuthor> for ContributionView {
    fn from(item: &ContributionWithAuthor) -> Self {
        Self {
            id: item.contribution.id.to_string(),
            faculty_name: item.contribution.faculty_name.clone(),
            faculty_email: item.contribution.faculty_email.clone(),
            reviewer_name: item.reviewer_name.clone(),
            rating: item.contribution.rating.value(),
            review: item.contribution.review.as_ref().to_owned(),
            created_at: item.contribution.created_at,
        }
    }
}

/// One review inside a faculty group, author attached.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupedReviewView {
    pub reviewer_name: String,
    pub rating: i32,
    pub review: String,
    pub created_at: DateTime<Utc>,
}

/// All matching reviews for one faculty member with the mean rating.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FacultyView {
    pub faculty_name: String,
    pub faculty_email: String,
    pub average_rating: String,
    pub reviews: Vec<GroupedReviewView>,
}

impl From<&FacultyAggregate> for FacultyView {
    fn from(group: &FacultyAggregate) -> Self {
        Self {
            faculty_name: group.faculty_name.clone(),
            faculty_email: group.faculty_email.clone(),
            average_rating: group.average_rating.clone(),
            reviews: group
                .reviews
                .iter()
                .map(|item| GroupedReviewView {
                    reviewer_name: item.reviewer_name.clone(),
                    rating: item.contribution.rating.value(),
                    review: item.contribution.review.as_ref().to_owned(),
                    created_at: item.contribution.created_at,
                })
                .collect(),
        }
    }
}

/// Flattened listing returned for a blank search query.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AllReviewsResponseBody {
    pub all_reviews: Vec<ContributionView>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: Option<String>,
}

/// Submit a review for a faculty member.
#[utoipa::path(
    post,
    path = "/api/contributions",
    request_body = ContributionRequestBody,
    responses(
        (status = 201, description = "Review stored", body = MessageResponse),
        (status = 400, description = "Missing fields, bad rating, or rejected text", body = crate::domain::Error),
        (status = 401, description = "No token supplied", body = crate::domain::Error),
        (status = 409, description = "Caller already reviewed this faculty member", body = crate::domain::Error)
    ),
    tags = ["contributions"],
    operation_id = "submitContribution"
)]
#[post("/contributions")]
pub async fn submit_contribution(
    state: web::Data<HttpState>,
    user: Bearer,
    body: web::Json<ContributionRequestBody>,
) -> ApiResult<HttpResponse> {
    require_fields(
        &[
            ("facultyName", body.faculty_name.as_deref()),
            ("facultyEmail", body.faculty_email.as_deref()),
            ("review", body.review.as_deref()),
        ],
        "All fields are required.",
    )?;
    let rating = body.rating.ok_or_else(|| {
        Error::invalid_request("All fields are required.").with_details(json!({
            "missing": ["rating"],
            "code": "missing_field",
        }))
    })?;

    state
        .contributions
        .submit(
            user.0.id,
            NewContribution {
                faculty_name: body.faculty_name.clone().unwrap_or_default(),
                faculty_email: body.faculty_email.clone().unwrap_or_default(),
                rating,
                review: body.review.clone().unwrap_or_default(),
            },
        )
        .await?;
    Ok(HttpResponse::Created().json(MessageResponse::new("Contribution submitted successfully!")))
}

/// List the caller's own reviews.
#[utoipa::path(
    get,
    path = "/api/contributions/me",
    responses(
        (status = 200, description = "The caller's reviews", body = [ContributionView]),
        (status = 401, description = "No token supplied", body = crate::domain::Error),
        (status = 403, description = "Invalid or expired token", body = crate::domain::Error)
    ),
    tags = ["contributions"],
    operation_id = "listMyContributions"
)]
#[get("/contributions/me")]
pub async fn list_my_contributions(
    state: web::Data<HttpState>,
    user: Bearer,
) -> ApiResult<HttpResponse> {
    let mine = state.contributions.list_mine(user.0.id).await?;
    let views: Vec<ContributionView> = mine.iter().map(ContributionView::from).collect();
    Ok(HttpResponse::Ok().json(views))
}

/// Search reviews by faculty name or email.
///
/// An empty or absent query returns everything flattened under `allReviews`;
/// a non-empty query returns matches grouped per faculty member with the
/// mean rating.
#[utoipa::path(
    get,
    path = "/api/contributions/search",
    security([]),
    params(("query" = Option<String>, Query, description = "Substring matched against faculty name and email")),
    responses(
        (status = 200, description = "Flattened or grouped matches"),
        (status = 404, description = "Nothing matched", body = crate::domain::Error)
    ),
    tags = ["contributions"],
    operation_id = "searchContributions"
)]
#[get("/contributions/search")]
pub async fn search_contributions(
    state: web::Data<HttpState>,
    query: web::Query<SearchQuery>,
) -> ApiResult<HttpResponse> {
    let outcome = state
        .search
        .search(query.query.as_deref().unwrap_or_default())
        .await?;
    Ok(match outcome {
        SearchOutcome::All(all) => HttpResponse::Ok().json(AllReviewsResponseBody {
            all_reviews: all.iter().map(ContributionView::from).collect(),
        }),
        SearchOutcome::Grouped(groups) => {
            let views: Vec<FacultyView> = groups.iter().map(FacultyView::from).collect();
            HttpResponse::Ok().json(views)
        }
    })
}

/// Delete the caller's account and every review they own.
#[utoipa::path(
    delete,
    path = "/api/account",
    responses(
        (status = 200, description = "Account and reviews removed", body = MessageResponse),
        (status = 401, description = "No token supplied", body = crate::domain::Error),
        (status = 403, description = "Invalid or expired token", body = crate::domain::Error)
    ),
    tags = ["contributions"],
    operation_id = "deleteAccount"
)]
#[delete("/account")]
pub async fn delete_account(state: web::Data<HttpState>, user: Bearer) -> ApiResult<HttpResponse> {
    state.contributions.delete_account(user.0.id).await?;
    Ok(HttpResponse::Ok().json(MessageResponse::new(
        "Your account and all contributions have been permanently deleted.",
    )))
}
