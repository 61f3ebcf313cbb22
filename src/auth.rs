use axum::{
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};

/// Header carrying the player id
pub const PLAYER_ID_HEADER: &str = "x-player-id";
/// Query parameter carrying the player id, for WebSocket clients that cannot set headers
pub const PLAYER_ID_PARAM: &str = "player";
const MAX_PLAYER_ID_LENGTH: usize = 64;

/// Opaque player identifier chosen by the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerId(pub String);

impl PlayerId {
    /// Accepts 1 to 64 ASCII letters, digits, '-' or '_'
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let valid = !raw.is_empty()
            && raw.len() <= MAX_PLAYER_ID_LENGTH
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| PlayerId(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Extractor for the calling player, from the header or the query string
impl<S> FromRequestParts<S> for PlayerId
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(PLAYER_ID_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(String::from)
            .or_else(|| {
                parts
                    .uri
                    .query()
                    .and_then(|q| serde_urlencoded::from_str::<Vec<(String, String)>>(q).ok())
                    .and_then(|params| {
                        params
                            .into_iter()
                            .find(|(k, _)| k == PLAYER_ID_PARAM)
                            .map(|(_, v)| v)
                    })
            })
            .ok_or_else(|| {
                tracing::warn!("Request without a player id");
                StatusCode::UNAUTHORIZED
            })?;

        PlayerId::parse(&raw).ok_or_else(|| {
            tracing::warn!("Rejected malformed player id");
            StatusCode::BAD_REQUEST
        })
    }
}
