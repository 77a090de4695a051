// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Bearer-token verification against the identity provider's JWKS.

use crate::config::Config;
use anyhow::Context;
use axum::http::HeaderValue;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(5);
const CLOCK_SKEW_SECS: u64 = 60;

/// Token verification error categories.
#[derive(Debug, Clone)]
pub enum VerifyError {
    /// The token is missing, malformed, expired, or signed by an unknown key.
    Unauthorized(String),
    /// The key set could not be fetched (infrastructure failure, not the
    /// caller's fault).
    KeySet(String),
}

#[derive(Clone)]
enum VerifierMode {
    Remote,
    StaticKey {
        kid: String,
        decoding_key: Arc<DecodingKey>,
    },
}

/// Verifier for RS256 bearer tokens issued by the identity provider.
///
/// The key set is fetched lazily on first use and cached for the process
/// lifetime; an unknown `kid` forces one refresh (covering provider key
/// rotation) and [`TokenVerifier::invalidate`] drops the cache manually.
pub struct TokenVerifier {
    http_client: reqwest::Client,
    jwks_url: String,
    mode: VerifierMode,
    key_cache: RwLock<Option<HashMap<String, Arc<DecodingKey>>>>,
    refresh_lock: Mutex<()>,
}

impl TokenVerifier {
    /// Create a production verifier that fetches and caches the JWKS.
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .context("failed building JWKS HTTP client")?;

        tracing::info!(jwks_url = %config.jwks_url, "Initialized token verifier");

        Ok(Self {
            http_client,
            jwks_url: config.jwks_url.clone(),
            mode: VerifierMode::Remote,
            key_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        })
    }

    /// Create a verifier with a static RSA public key.
    ///
    /// This is intended for deterministic local/integration tests.
    pub fn new_with_static_key(kid: impl Into<String>, decoding_key: DecodingKey) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            jwks_url: String::new(),
            mode: VerifierMode::StaticKey {
                kid: kid.into(),
                decoding_key: Arc::new(decoding_key),
            },
            key_cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Verify a bearer token from an Authorization header and return the
    /// caller's identity (the `sub` claim).
    pub async fn verify_bearer(
        &self,
        auth_header: Option<&HeaderValue>,
    ) -> Result<String, VerifyError> {
        let token = extract_bearer_token(auth_header)?;
        self.verify_token(token).await
    }

    /// Verify a raw token string and return the `sub` claim.
    pub async fn verify_token(&self, token: &str) -> Result<String, VerifyError> {
        let header = decode_header(token)
            .map_err(|e| VerifyError::Unauthorized(format!("invalid JWT header: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::Unauthorized(format!(
                "unexpected JWT alg: {:?}",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| VerifyError::Unauthorized("missing JWT kid".to_string()))?;

        let decoding_key = self.decoding_key_for_kid(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_required_spec_claims(&["exp", "sub"]);
        validation.validate_aud = false;
        validation.leeway = CLOCK_SKEW_SECS;

        let token_data = decode::<Claims>(token, decoding_key.as_ref(), &validation)
            .map_err(|e| VerifyError::Unauthorized(format!("JWT validation failed: {e}")))?;

        if token_data.claims.sub.is_empty() {
            return Err(VerifyError::Unauthorized("empty subject claim".to_string()));
        }

        Ok(token_data.claims.sub)
    }

    /// Drop the cached key set; the next verification re-fetches it.
    pub async fn invalidate(&self) {
        *self.key_cache.write().await = None;
    }

    async fn decoding_key_for_kid(&self, kid: &str) -> Result<Arc<DecodingKey>, VerifyError> {
        if let VerifierMode::StaticKey {
            kid: static_kid,
            decoding_key,
        } = &self.mode
        {
            if kid == static_kid {
                return Ok(decoding_key.clone());
            }

            return Err(VerifyError::Unauthorized(format!(
                "unknown JWT kid for static verifier: {kid}"
            )));
        }

        for force_refresh in [false, true] {
            self.refresh_keys(force_refresh).await?;
            if let Some(key) = self.lookup_cached_key(kid).await {
                return Ok(key);
            }
        }

        Err(VerifyError::Unauthorized(format!(
            "JWT kid not found in key set after refresh: {kid}"
        )))
    }

    async fn lookup_cached_key(&self, kid: &str) -> Option<Arc<DecodingKey>> {
        let cache = self.key_cache.read().await;
        cache.as_ref().and_then(|keys| keys.get(kid)).cloned()
    }

    async fn refresh_keys(&self, force_refresh: bool) -> Result<(), VerifyError> {
        let _guard = self.refresh_lock.lock().await;

        if !force_refresh && self.key_cache.read().await.is_some() {
            return Ok(());
        }

        tracing::debug!(jwks_url = %self.jwks_url, "Refreshing JWKS cache");

        let response = self
            .http_client
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| VerifyError::KeySet(format!("JWKS request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(VerifyError::KeySet(format!(
                "JWKS request returned status {}",
                response.status()
            )));
        }

        let jwks: Jwks = response
            .json()
            .await
            .map_err(|e| VerifyError::KeySet(format!("invalid JWKS JSON: {e}")))?;

        let mut keys_by_kid: HashMap<String, Arc<DecodingKey>> = HashMap::new();

        for jwk in jwks.keys {
            if jwk.kty != "RSA" {
                continue;
            }

            if jwk.kid.trim().is_empty() {
                continue;
            }

            if let Some(alg) = &jwk.alg {
                if alg != "RS256" {
                    continue;
                }
            }

            if let Some(use_) = &jwk.use_ {
                if use_ != "sig" {
                    continue;
                }
            }

            match DecodingKey::from_rsa_components(&jwk.n, &jwk.e) {
                Ok(key) => {
                    keys_by_kid.insert(jwk.kid, Arc::new(key));
                }
                Err(e) => {
                    tracing::warn!(error = %e, kid = %jwk.kid, "Skipping invalid RSA JWKS key");
                }
            }
        }

        if keys_by_kid.is_empty() {
            return Err(VerifyError::KeySet(
                "JWKS response did not include any usable RSA keys".to_string(),
            ));
        }

        let count = keys_by_kid.len();
        *self.key_cache.write().await = Some(keys_by_kid);

        tracing::debug!(keys = count, "JWKS cache refreshed");
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
    #[allow(dead_code)]
    exp: usize,
}

#[derive(Debug, Deserialize)]
struct Jwks {
    keys: Vec<Jwk>,
}

#[derive(Debug, Deserialize)]
struct Jwk {
    kid: String,
    kty: String,
    alg: Option<String>,
    n: String,
    e: String,
    #[serde(rename = "use")]
    use_: Option<String>,
}

fn extract_bearer_token(auth_header: Option<&HeaderValue>) -> Result<&str, VerifyError> {
    let value = auth_header
        .ok_or_else(|| VerifyError::Unauthorized("missing Authorization header".to_string()))?
        .to_str()
        .map_err(|_| VerifyError::Unauthorized("invalid Authorization header".to_string()))?;

    let token = value.strip_prefix("Bearer ").ok_or_else(|| {
        VerifyError::Unauthorized("Authorization header must be Bearer token".to_string())
    })?;

    if token.is_empty() {
        return Err(VerifyError::Unauthorized("Bearer token is empty".to_string()));
    }

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_bearer_token_errors() {
        assert!(matches!(
            extract_bearer_token(None),
            Err(VerifyError::Unauthorized(_))
        ));

        let bad = HeaderValue::from_static("Basic abc");
        assert!(matches!(
            extract_bearer_token(Some(&bad)),
            Err(VerifyError::Unauthorized(_))
        ));

        let empty = HeaderValue::from_static("Bearer ");
        assert!(matches!(
            extract_bearer_token(Some(&empty)),
            Err(VerifyError::Unauthorized(_))
        ));
    }

    #[test]
    fn extract_bearer_token_ok() {
        let value = HeaderValue::from_static("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(Some(&value)).unwrap(), "abc.def.ghi");
    }

    #[tokio::test]
    async fn static_verifier_rejects_unknown_kid() {
        let verifier =
            TokenVerifier::new_with_static_key("known-kid", DecodingKey::from_secret(b"unused"));

        let result = verifier.decoding_key_for_kid("other-kid").await;
        assert!(matches!(result, Err(VerifyError::Unauthorized(_))));
    }
}
