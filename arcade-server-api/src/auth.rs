use arcade_server_domain::player::Player;
use axum::{RequestPartsExt, extract::FromRequestParts, http::request::Parts};
use axum_extra::{TypedHeader, headers::Cookie};

use crate::{ApiError, AppState};

/// The player owning the session cookie of the request.
pub struct Auth(pub Player);

impl FromRequestParts<AppState> for Auth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let cookies = parts.extract::<TypedHeader<Cookie>>().await.ok();
        let token = cookies
            .as_ref()
            .and_then(|TypedHeader(cookies)| cookies.get(&state.session_cookie.name));

        let player = state.app.player_service.authenticate(token).await?;
        Ok(Auth(player))
    }
}
