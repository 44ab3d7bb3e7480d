//! Bearer-token identity extraction for protected routes.
//!
//! Handlers that take an [`Identity`] parameter require a valid
//! `Authorization: Bearer <token>` header; mutating handlers additionally
//! call [`Identity::require_admin`].

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};

use crate::domain::user::Role;
use crate::domain::Error;
use crate::security::Claims;

use super::state::HttpState;

/// Verified claims of the requesting user.
#[derive(Debug, Clone)]
pub struct Identity {
    pub claims: Claims,
}

impl Identity {
    /// Reject callers whose token does not carry the admin role.
    pub fn require_admin(&self) -> Result<(), Error> {
        if self.claims.role == Role::Admin {
            Ok(())
        } else {
            Err(Error::forbidden("Admin access required"))
        }
    }
}

fn extract_identity(req: &HttpRequest) -> Result<Identity, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("auth state is not configured"))?;

    let header_value = req
        .headers()
        .get(header::AUTHORIZATION)
        .ok_or_else(|| Error::unauthorized("Missing token"))?;
    let raw = header_value
        .to_str()
        .map_err(|_| Error::unauthorized("Invalid token"))?;
    let token = raw
        .strip_prefix("Bearer ")
        .ok_or_else(|| Error::unauthorized("Invalid token"))?
        .trim();

    let claims = state.auth.verify_token(token)?;
    Ok(Identity { claims })
}

impl FromRequest for Identity {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract_identity(req))
    }
}
