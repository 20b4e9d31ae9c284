//! HS256 access tokens. The subject is the user id.

use std::time::Duration;

use api_types::user::LoginToken;
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::Error,
    get_current_timestamp,
};
use serde::{Deserialize, Serialize};

const TOKEN_TTL: Duration = Duration::from_secs(60 * 60 * 24 * 7);

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    /// Expiry as a unix timestamp in seconds.
    pub exp: u64,
}

/// Signing and verification keys derived from one shared secret.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenKeys {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::default();
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    pub fn issue(&self, user_id: &str) -> Result<LoginToken, Error> {
        let claims = Claims {
            sub: user_id.to_string(),
            exp: get_current_timestamp() + TOKEN_TTL.as_secs(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(LoginToken {
            token,
            expires_in: claims.exp,
            token_type: "Bearer".to_string(),
        })
    }

    /// Checks signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding, &self.validation).map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_verifies() {
        let keys = TokenKeys::new(b"secret");
        let token = keys.issue("u1").unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert!(token.expires_in > get_current_timestamp());

        let claims = keys.verify(&token.token).unwrap();
        assert_eq!(claims.sub, "u1");
        assert_eq!(claims.exp, token.expires_in);
    }

    #[test]
    fn other_secret_is_rejected() {
        let token = TokenKeys::new(b"secret").issue("u1").unwrap();
        assert!(TokenKeys::new(b"other").verify(&token.token).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let keys = TokenKeys::new(b"secret");
        let claims = Claims {
            sub: "u1".to_string(),
            exp: get_current_timestamp() - 3600,
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
