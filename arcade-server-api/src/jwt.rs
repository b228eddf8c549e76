use arcade_server_domain::{
    ServiceError, ServiceResult,
    jwt::{AuthError, JwtService},
    player::PlayerUsername,
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    pub exp: i64,
}

struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

pub struct JwtServiceImpl {
    keys: Keys,
    validation: Validation,
    session_ttl: Duration,
}

impl JwtServiceImpl {
    pub fn new(secret: &[u8], session_ttl: Duration) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // expiry is checked against the caller's clock in `validate`
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation.leeway = 0;
        Self {
            keys: Keys::new(secret),
            validation,
            session_ttl,
        }
    }
}

impl JwtService for JwtServiceImpl {
    fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    fn issue(&self, username: &PlayerUsername, now: DateTime<Utc>) -> ServiceResult<String> {
        let claims = Claims {
            sub: Some(username.clone()),
            exp: (now + self.session_ttl).timestamp(),
        };
        encode(&Header::new(ALGORITHM), &claims, &self.keys.encoding)
            .map_err(|e| ServiceError::Internal(format!("Failed to sign session token: {}", e)))
    }

    fn validate(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<PlayerUsername, AuthError> {
        let token = token.filter(|t| !t.is_empty()).ok_or(AuthError::Missing)?;
        let data = decode::<Claims>(token, &self.keys.decoding, &self.validation).map_err(|e| {
            log::debug!("Rejected session token: {}", e);
            AuthError::Malformed
        })?;
        if now.timestamp() >= data.claims.exp {
            return Err(AuthError::Expired);
        }
        match data.claims.sub {
            Some(sub) if !sub.is_empty() => Ok(sub),
            _ => Err(AuthError::NoSubject),
        }
    }
}
