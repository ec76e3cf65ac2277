use axum::{http::StatusCode, Json};

use crate::models::UserProfile;

use super::PortalSession;

/// Profile of the logged-in user.
pub async fn get_current_identity(session: PortalSession) -> Result<Json<UserProfile>, (StatusCode, String)> {
    session
        .read(|state| state.current_user().cloned())
        .map(Json)
        .ok_or((StatusCode::UNAUTHORIZED, "no login".to_string()))
}
