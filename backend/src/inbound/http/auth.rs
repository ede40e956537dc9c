//! Bearer-token authentication extractor.

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::token::AuthenticatedUser;
use crate::domain::Error;
use crate::inbound::http::state::HttpState;

/// The authenticated caller, extracted from the `Authorization` header.
///
/// A missing header is 401; a present but unverifiable token is 403,
/// mirroring the client contract for every protected route.
#[derive(Debug, Clone)]
pub struct Bearer(pub AuthenticatedUser);

fn extract(req: &HttpRequest) -> Result<Bearer, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state not configured"))?;
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::unauthorized("Authentication token required."))?;
    state.signer.verify(token).map(Bearer)
}

impl FromRequest for Bearer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}
