//! Interactive prompts: token entry and the delete gate

use anyhow::{bail, Context};
use dialoguer::{Input, Password};

/// Environment variable holding the admin token
pub(crate) const TOKEN_ENV: &str = "TFE_ADMIN_TOKEN";

/// Token from the environment, else a hidden prompt
///
/// # Errors
/// The prompt failed or the token is empty
pub(crate) fn admin_token() -> anyhow::Result<String> {
    let token = match std::env::var(TOKEN_ENV) {
        Ok(token) if !token.trim().is_empty() => token,
        _ => Password::new()
            .with_prompt("Control plane admin token")
            .allow_empty_password(true)
            .interact()
            .context("failed to read token")?,
    };
    validate_token(&token)
}

fn validate_token(token: &str) -> anyhow::Result<String> {
    let token = token.trim();
    if token.is_empty() {
        bail!("an admin token is required (set {TOKEN_ENV} or enter it when prompted)");
    }
    Ok(token.to_string())
}

/// Ask the operator to type `yes` before a live delete
///
/// # Errors
/// The prompt could not be shown
pub(crate) fn confirm_delete(set_name: &str) -> anyhow::Result<bool> {
    let answer: String = Input::new()
        .with_prompt(format!(
            "This deletes the '{set_name}' set from every selected organization. Type 'yes' to continue"
        ))
        .allow_empty(true)
        .interact_text()
        .context("failed to read confirmation")?;
    Ok(is_confirmation(&answer))
}

fn is_confirmation(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("yes")
}
