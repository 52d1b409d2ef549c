/// HTTP middleware utilities for post-service
///
/// Identity is an external collaborator: the upstream gateway authenticates
/// the caller and forwards the resolved user id in the `x-user-id` header.
/// This service trusts that header and never sees credentials.
use actix_web::{error::ErrorUnauthorized, Error, FromRequest, HttpRequest};
use std::future::{ready, Ready};
use uuid::Uuid;

/// Authenticated caller identity, extracted from the gateway header.
#[derive(Debug, Clone, Copy)]
pub struct UserId(pub Uuid);

impl FromRequest for UserId {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let parsed = req
            .headers()
            .get("x-user-id")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| ErrorUnauthorized("Missing x-user-id header"))
            .and_then(|raw| {
                Uuid::parse_str(raw).map_err(|_| ErrorUnauthorized("Invalid user ID"))
            })
            .map(UserId);

        ready(parsed)
    }
}
