//! Telegram Web App `initData` verification.
//!
//! `initData` is a URL-encoded query string signed by Telegram:
//!
//! ```text
//! secret_key       = HMAC_SHA256(key = "WebAppData", msg = bot_token)
//! data_check       = "k1=v1\nk2=v2..."   (all pairs but `hash`, sorted by key)
//! hash             = hex(HMAC_SHA256(key = secret_key, msg = data_check))
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::{AuthError, AuthResult};

type HmacSha256 = Hmac<Sha256>;

const WEB_APP_KEY: &[u8] = b"WebAppData";

/// Verifies a third-party identity assertion presented at login.
pub trait AssertionVerifier: Send + Sync + 'static {
    /// Verifies `payload` and returns the user it vouches for.
    fn verify(&self, payload: &str) -> AuthResult<TelegramUser>;
}

/// The `user` object embedded in `initData`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    /// Telegram user id.
    pub id: i64,
    /// First name.
    pub first_name: String,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Username, without `@`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// IETF language tag of the user's client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
}

/// Checks `initData` signatures for one bot.
#[derive(Clone)]
pub struct TelegramInitDataVerifier {
    mac: HmacSha256,
    max_age: Duration,
}

impl TelegramInitDataVerifier {
    /// Creates a verifier for `bot_token`, rejecting data signed more than
    /// `max_age` ago.
    ///
    /// # Errors
    ///
    /// Fails if the HMAC keys cannot be built.
    pub fn new(bot_token: &str, max_age: Duration) -> AuthResult<Self> {
        let mut derive = keyed_mac(WEB_APP_KEY)?;
        derive.update(bot_token.as_bytes());
        let secret_key = derive.finalize().into_bytes();
        Ok(Self {
            mac: keyed_mac(&secret_key)?,
            max_age,
        })
    }

    /// Verifies `init_data` as of `now` (seconds since the epoch).
    pub fn verify_at(&self, init_data: &str, now: i64) -> AuthResult<TelegramUser> {
        let mut fields = parse_query(init_data)?;
        let hash = fields
            .remove("hash")
            .ok_or_else(|| AuthError::invalid_assertion("missing hash"))?;
        let signature =
            hex::decode(&hash).map_err(|_| AuthError::invalid_assertion("hash is not hex"))?;

        let mut mac = self.mac.clone();
        mac.update(data_check_string(&fields).as_bytes());
        mac.verify_slice(&signature)
            .map_err(|_| AuthError::invalid_assertion("signature mismatch"))?;

        let auth_date: i64 = fields
            .get("auth_date")
            .and_then(|raw| raw.parse().ok())
            .ok_or_else(|| AuthError::invalid_assertion("missing auth_date"))?;
        let max_age_secs = i64::try_from(self.max_age.as_secs()).unwrap_or(i64::MAX);
        let age_secs = now.saturating_sub(auth_date);
        if age_secs > max_age_secs {
            return Err(AuthError::StaleAssertion {
                age_secs,
                max_age_secs,
            });
        }

        let user = fields
            .get("user")
            .ok_or_else(|| AuthError::invalid_assertion("missing user"))?;
        serde_json::from_str(user)
            .map_err(|err| AuthError::invalid_assertion(format!("malformed user: {err}")))
    }

    /// Builds a signed `initData` string for `fields`.
    ///
    /// Used by integration tests and local tooling that stand in for the
    /// Telegram client.
    pub fn sign(&self, fields: &[(&str, &str)]) -> AuthResult<String> {
        let map: BTreeMap<String, String> = fields
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut mac = self.mac.clone();
        mac.update(data_check_string(&map).as_bytes());
        let hash = hex::encode(mac.finalize().into_bytes());

        let mut query: Vec<String> = map
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        query.push(format!("hash={hash}"));
        Ok(query.join("&"))
    }
}

impl AssertionVerifier for TelegramInitDataVerifier {
    fn verify(&self, payload: &str) -> AuthResult<TelegramUser> {
        self.verify_at(payload, Utc::now().timestamp())
    }
}

impl fmt::Debug for TelegramInitDataVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramInitDataVerifier")
            .field("max_age", &self.max_age)
            .finish_non_exhaustive()
    }
}

fn keyed_mac(key: &[u8]) -> AuthResult<HmacSha256> {
    HmacSha256::new_from_slice(key).map_err(|err| AuthError::SigningKey {
        message: err.to_string(),
    })
}

fn parse_query(raw: &str) -> AuthResult<BTreeMap<String, String>> {
    let mut fields = BTreeMap::new();
    for pair in raw.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        fields.insert(decode_component(key)?, decode_component(value)?);
    }
    if fields.is_empty() {
        return Err(AuthError::invalid_assertion("empty init data"));
    }
    Ok(fields)
}

fn decode_component(raw: &str) -> AuthResult<String> {
    urlencoding::decode(&raw.replace('+', " "))
        .map(std::borrow::Cow::into_owned)
        .map_err(|_| AuthError::invalid_assertion("invalid percent-encoding"))
}

fn data_check_string(fields: &BTreeMap<String, String>) -> String {
    fields
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}
