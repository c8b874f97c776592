use base64ct::{Base64UrlUnpadded, Encoding};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::RngCore;
use secrecy::{ExposeSecret, Secret};
use sha2::{Digest, Sha256};

use gatehouse_core::domain::token::{AccessTokenClaims, OneTimeToken};
use gatehouse_core::domain::user::UserId;
use gatehouse_core::ports::codec::{TokenCodec, TokenCodecError};

/// HS256 requires at least 256 bits of key material.
const MIN_SECRET_BYTES: usize = 32;

/// One-time tokens carry 128 bits of entropy.
const ONE_TIME_RANDOM_BYTES: usize = 16;

/// Compact-token codec over HMAC-SHA256 signed JWTs and base64url one-time
/// composites. Expiry is deliberately not validated during decode; the token
/// service owns that comparison against its injected clock.
#[derive(Clone)]
pub struct JwtTokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtTokenCodec {
    pub fn new(secret: &Secret<String>) -> Result<Self, TokenCodecError> {
        let bytes = secret.expose_secret().as_bytes();
        if bytes.len() < MIN_SECRET_BYTES {
            return Err(TokenCodecError::Backend(format!(
                "signing secret must be at least {MIN_SECRET_BYTES} bytes"
            )));
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Ok(Self {
            encoding_key: EncodingKey::from_secret(bytes),
            decoding_key: DecodingKey::from_secret(bytes),
            validation,
        })
    }
}

impl TokenCodec for JwtTokenCodec {
    fn sign_access(&self, claims: &AccessTokenClaims) -> Result<String, TokenCodecError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| TokenCodecError::Backend(e.to_string()))
    }

    fn decode_access(&self, token: &str) -> Result<AccessTokenClaims, TokenCodecError> {
        decode::<AccessTokenClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| TokenCodecError::Malformed)
    }

    fn mint_one_time(&self, user_id: &UserId) -> OneTimeToken {
        let mut bytes = [0u8; ONE_TIME_RANDOM_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        OneTimeToken {
            user_id: *user_id,
            random_part: Base64UrlUnpadded::encode_string(&bytes),
        }
    }

    fn encode_one_time(&self, token: &OneTimeToken) -> String {
        let composite = format!("{}.{}", token.user_id, token.random_part);
        Base64UrlUnpadded::encode_string(composite.as_bytes())
    }

    fn parse_one_time(&self, raw: &str) -> Result<OneTimeToken, TokenCodecError> {
        let composite = Base64UrlUnpadded::decode_vec(raw)
            .ok()
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .ok_or(TokenCodecError::Malformed)?;

        let (user_id, random_part) = composite
            .split_once('.')
            .ok_or(TokenCodecError::Malformed)?;
        if random_part.is_empty() {
            return Err(TokenCodecError::Malformed);
        }

        let user_id = UserId::parse(user_id).map_err(|_| TokenCodecError::Malformed)?;
        Ok(OneTimeToken {
            user_id,
            random_part: random_part.to_owned(),
        })
    }

    fn digest(&self, raw: &str) -> String {
        Base64UrlUnpadded::encode_string(&Sha256::digest(raw.as_bytes()))
    }
}
