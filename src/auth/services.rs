use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

/// `domain` is given without the leading `@`.
pub fn has_allowed_domain(email: &str, domain: &str) -> bool {
    email
        .to_lowercase()
        .ends_with(&format!("@{}", domain.to_lowercase()))
}

/// Identity gate: checks the domain, then asks the provider for a magic link
/// that redirects back to the site. One attempt, no retry.
#[instrument(skip(st))]
pub async fn request_login(st: &AppState, email: &str) -> AppResult<()> {
    let email = email.trim().to_lowercase();
    let domain = &st.config.identity.allowed_domain;

    if !is_valid_email(&email) || !has_allowed_domain(&email, domain) {
        warn!(%email, "login rejected: outside allowed domain");
        return Err(AppError::Validation(format!(
            "Only @{} emails allowed!",
            domain
        )));
    }

    st.identity
        .send_magic_link(&email, &st.config.identity.site_url)
        .await?;
    info!(%email, "magic link sent");
    Ok(())
}
