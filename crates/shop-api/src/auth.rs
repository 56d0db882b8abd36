//! Session authentication: the `CurrentUser` extractor and the
//! register/login/logout/user endpoints.
//!
//! The session stores only the user id; the user is re-read from storage on
//! every request so premium status changes are visible immediately.

use axum::{
    extract::{FromRequestParts, State},
    http::{request::Parts, StatusCode},
    response::IntoResponse,
    Json,
};
use shop_core::{EntityId, InsertUser, User};
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{ApiError, ApiResult};
use crate::extract::JsonBody;
use crate::session::session_keys;
use crate::state::AppState;

/// Extractor that requires a logged-in user.
///
/// Rejects with 401 (empty body) when there is no session, the session holds
/// no user id, or the id no longer resolves to a user.
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> impl IntoResponse {
///     format!("Hello, {}!", user.username)
/// }
/// ```
pub struct CurrentUser(pub User);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(ApiError::Unauthorized)?;

        let user_id: EntityId = session
            .get(session_keys::USER_ID)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let user = state
            .storage
            .get_user(user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        Ok(Self(user))
    }
}

/// Register/login payload. Fields that are missing or not strings are `None`.
#[derive(Debug)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Credentials {
    fn from_body(body: &JsonBody) -> Self {
        Self {
            username: body.str_field("username").map(str::to_string),
            password: body.str_field("password").map(str::to_string),
        }
    }

    fn require(self) -> ApiResult<InsertUser> {
        match (self.username, self.password) {
            (Some(username), Some(password))
                if !username.trim().is_empty() && !password.is_empty() =>
            {
                Ok(InsertUser { username, password })
            }
            _ => Err(ApiError::BadRequest(
                "Username and password are required".to_string(),
            )),
        }
    }
}

/// Bind the session to `user`, rotating the session id.
async fn log_in(session: &Session, user: &User) -> ApiResult<()> {
    session.cycle_id().await?;
    session.insert(session_keys::USER_ID, user.id).await?;
    Ok(())
}

/// `POST /api/register`
#[instrument(skip(state, session, body))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody,
) -> ApiResult<impl IntoResponse> {
    let insert = Credentials::from_body(&body).require()?;

    if state
        .storage
        .get_user_by_username(&insert.username)
        .await?
        .is_some()
    {
        return Err(ApiError::BadRequest("Username already exists".to_string()));
    }

    let user = state.storage.create_user(insert).await?;
    log_in(&session, &user).await?;

    info!(user_id = user.id, "Registered user {}", user.username);
    Ok((StatusCode::CREATED, Json(user)))
}

/// `POST /api/login`
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    body: JsonBody,
) -> ApiResult<Json<User>> {
    let attempt = Credentials::from_body(&body)
        .require()
        .map_err(|_| ApiError::Unauthorized)?;

    let user = state
        .storage
        .get_user_by_username(&attempt.username)
        .await?
        .filter(|user| user.password == attempt.password)
        .ok_or(ApiError::Unauthorized)?;

    log_in(&session, &user).await?;

    info!(user_id = user.id, "User logged in");
    Ok(Json(user))
}

/// `POST /api/logout`
pub async fn logout(session: Session) -> ApiResult<StatusCode> {
    session.flush().await?;
    Ok(StatusCode::OK)
}

/// `GET /api/user`
pub async fn current_user(CurrentUser(user): CurrentUser) -> Json<User> {
    Json(user)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_fields() {
        let ok = Credentials {
            username: Some("alice".into()),
            password: Some("secret".into()),
        };
        assert_eq!(ok.require().unwrap().username, "alice");

        let blank = Credentials {
            username: Some("  ".into()),
            password: Some("secret".into()),
        };
        assert!(matches!(blank.require(), Err(ApiError::BadRequest(_))));

        let missing = Credentials {
            username: Some("alice".into()),
            password: None,
        };
        assert!(missing.require().is_err());
    }

    #[test]
    fn test_non_string_fields_are_missing() {
        let body = JsonBody(serde_json::json!({ "username": 5, "password": "secret" }));
        let credentials = Credentials::from_body(&body);
        assert_eq!(credentials.username, None);
        assert!(matches!(credentials.require(), Err(ApiError::BadRequest(_))));
    }
}
