use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker value carried in refresh-token claims.
pub const REFRESH_TOKEN_TYPE: &str = "refresh";

/// Claims embedded in an access token.
///
/// Every field is required at decode time; a token missing any of them is
/// rejected outright rather than patched with defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Account id.
    pub sub: Uuid,
    pub company_id: Uuid,
    pub email: String,
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

/// Claims embedded in a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    pub sub: Uuid,
    pub token_type: String,
    pub iat: i64,
    pub exp: i64,
}

/// The pair handed to a fully authenticated client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}
