use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;

use crate::error::{AppError, ErrorBody};

use super::{AuthenticatedUser, TokenKeys};

/// Why the bearer guard refused a request, handed to the 401 catcher.
#[derive(Debug, Default, Clone)]
struct AuthFailure(Option<String>);

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AppError> {
    let header = header.ok_or_else(|| AppError::Authentication("Missing token".to_string()))?;

    let mut parts = header.trim().splitn(2, ' ');
    match (parts.next(), parts.next()) {
        (Some(scheme), Some(token))
            if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() =>
        {
            Ok(token.trim())
        }
        _ => Err(AppError::Authentication(
            "Malformed authorization header".to_string(),
        )),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for AuthenticatedUser {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_span = tracing::info_span!("bearer_auth_guard");
        let _guard = auth_span.enter();

        let keys = match request.rocket().state::<TokenKeys>() {
            Some(keys) => keys,
            None => {
                tracing::error!("Token keys not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        let verified = bearer_token(request.headers().get_one("Authorization"))
            .and_then(|token| keys.verify_token(token));

        match verified {
            Ok(email) => {
                tracing::info!(email = %email, "User authenticated via bearer token");
                Outcome::Success(AuthenticatedUser { email })
            }
            Err(err) => {
                tracing::warn!(error = %err, "Bearer authentication failed");
                request.local_cache(|| AuthFailure(Some(err.to_string())));
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[catch(401)]
pub fn unauthorized_api(req: &Request) -> Custom<Json<ErrorBody>> {
    let AuthFailure(message) = req.local_cache(AuthFailure::default);

    Custom(
        Status::Unauthorized,
        Json(ErrorBody {
            error: message
                .clone()
                .unwrap_or_else(|| "Authentication required".to_string()),
        }),
    )
}

#[catch(default)]
pub fn default_catcher(status: Status, req: &Request) -> Custom<Json<ErrorBody>> {
    tracing::warn!(status = status.code, uri = %req.uri(), "Request failed before reaching a handler");

    let error = match status.code {
        400 | 422 => "Invalid request body".to_string(),
        404 => "Resource not found".to_string(),
        _ => status.reason().unwrap_or("Request failed").to_string(),
    };

    Custom(status, Json(ErrorBody { error }))
}
