use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, DecodingKey, Validation};
use tracing::{debug, warn};
use uuid::Uuid;

use super::dto::Claims;
use super::services::has_allowed_domain;
use crate::state::AppState;

/// Verification side of the provider's session tokens.
#[derive(Clone)]
pub struct JwtKeys {
    pub decoding: DecodingKey,
    pub issuer: String,
    pub audience: String,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let cfg = &state.config.jwt;
        Self {
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }
}

impl JwtKeys {
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Explicit authentication context handed to page handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Viewer {
    Authenticated { user_id: Uuid, email: String },
    Anonymous,
}

impl Viewer {
    /// Address a post is attributed to: the viewer's own, or the test poster
    /// when anonymous posting is enabled.
    pub fn poster_email(&self, test_poster: Option<&str>) -> Option<String> {
        match self {
            Viewer::Authenticated { email, .. } => Some(email.clone()),
            Viewer::Anonymous => test_poster.map(str::to_owned),
        }
    }
}

fn resolve_viewer(parts: &Parts, state: &AppState) -> Result<Viewer, &'static str> {
    let Some(header) = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(Viewer::Anonymous);
    };

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .ok_or("invalid auth scheme")?;

    let claims = JwtKeys::from_ref(state)
        .verify(token)
        .map_err(|_| "invalid or expired token")?;

    if !has_allowed_domain(&claims.email, &state.config.identity.allowed_domain) {
        return Err("email outside allowed domain");
    }

    Ok(Viewer::Authenticated {
        user_id: claims.sub,
        email: claims.email.to_lowercase(),
    })
}

/// Never rejects: a missing or bad token means an anonymous viewer.
#[async_trait]
impl FromRequestParts<AppState> for Viewer {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(resolve_viewer(parts, state).unwrap_or_else(|reason| {
            warn!(reason, "treating request as anonymous");
            Viewer::Anonymous
        }))
    }
}

#[cfg(test)]
pub(crate) fn sign_for_test(cfg: &crate::config::JwtConfig, email: &str, ttl_secs: i64) -> String {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use time::OffsetDateTime;

    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = Claims {
        sub: Uuid::new_v4(),
        email: email.into(),
        iat: now as usize,
        exp: (now + ttl_secs) as usize,
        iss: cfg.issuer.clone(),
        aud: cfg.audience.clone(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(cfg.secret.as_bytes()),
    )
    .expect("sign test token")
}
