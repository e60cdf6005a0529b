use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use secrecy::{ExposeSecret, Secret};

use guarita_core::{AccessClaims, RefreshClaims, TokenCodec, TokenError, REFRESH_TOKEN_TYPE};

/// HMAC-signed JWTs carrying the access and refresh claims. Both token
/// kinds are signed with the same secret; the refresh token is told apart
/// by its `token_type` claim.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtTokenCodec {
    pub fn new(secret: &Secret<String>) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
        }
    }
}

fn map_decode_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::ExpiredSignature => TokenError::ExpiredToken,
        _ => TokenError::InvalidToken,
    }
}

impl TokenCodec for JwtTokenCodec {
    fn encode_access(&self, claims: &AccessClaims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    fn encode_refresh(&self, claims: &RefreshClaims) -> Result<String, TokenError> {
        encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|e| TokenError::EncodingError(e.to_string()))
    }

    fn decode_access(&self, token: &str) -> Result<AccessClaims, TokenError> {
        decode::<AccessClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }

    fn decode_refresh(&self, token: &str) -> Result<RefreshClaims, TokenError> {
        let claims = decode::<RefreshClaims>(token, &self.decoding_key, &Validation::default())
            .map(|data| data.claims)
            .map_err(map_decode_error)?;

        if claims.token_type != REFRESH_TOKEN_TYPE {
            return Err(TokenError::InvalidToken);
        }
        Ok(claims)
    }

    fn decode_access_ignoring_expiry(&self, token: &str) -> Result<AccessClaims, TokenError> {
        let mut validation = Validation::default();
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        decode::<AccessClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(map_decode_error)
    }
}
