//! Middleware that reads the authenticated user from the request.
//!
//! Authentication itself happens upstream, e.g. in a reverse proxy, which
//! forwards the ID of the signed in user in the [USER_ID_HEADER] header.

use axum::{
    Json,
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::database_id::UserId;

/// The header carrying the ID of the authenticated user.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Middleware function that checks for a valid user ID header.
/// The user ID is placed into the request and the request executed normally if the header is
/// valid, otherwise the status code 401 is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserId>` to receive the user ID.
pub async fn auth_guard(mut request: Request, next: Next) -> Response {
    let user_id = request
        .headers()
        .get(USER_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(UserId::new);

    let Some(user_id) = user_id else {
        tracing::warn!(
            "Rejected request to {} without a valid {USER_ID_HEADER} header.",
            request.uri().path()
        );

        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "missing or invalid user ID" })),
        )
            .into_response();
    };

    request.extensions_mut().insert(user_id);
    next.run(request).await
}
