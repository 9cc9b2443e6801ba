//! Acting identity taken from headers set by the authenticating gateway.
//!
//! `x-user-id` carries the signed-in user, `x-user-role` is `staff` or
//! `citizen`. A request without a user id acts as a guest.

use axum::http::HeaderMap;
use drainwatch_core::models::{Actor, UserId};

use crate::error::ApiError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Resolve the actor for a request
pub fn actor_from_headers(headers: &HeaderMap) -> Result<Actor, ApiError> {
    let user_id = header_text(headers, USER_ID_HEADER)?
        .map(|raw| {
            raw.parse::<i64>().map(UserId).map_err(|_| {
                ApiError::bad_request(format!("Header {} must be an integer", USER_ID_HEADER))
            })
        })
        .transpose()?;

    let role = header_text(headers, USER_ROLE_HEADER)?.map(str::to_ascii_lowercase);

    match (user_id, role.as_deref()) {
        (None, Some("staff")) => {
            Err(ApiError::unauthenticated("Staff requests must carry a user id"))
        }
        (None, _) => Ok(Actor::guest()),
        (Some(id), Some("staff")) => Ok(Actor::staff(id)),
        (Some(id), None | Some("citizen")) => Ok(Actor::citizen(id)),
        (Some(_), Some(other)) => Err(ApiError::bad_request(format!("Unknown role '{}'", other))),
    }
}

fn header_text<'a>(headers: &'a HeaderMap, name: &str) -> Result<Option<&'a str>, ApiError> {
    headers
        .get(name)
        .map(|v| {
            v.to_str()
                .map(str::trim)
                .map_err(|_| ApiError::bad_request(format!("Header {} is not valid text", name)))
        })
        .transpose()
}
