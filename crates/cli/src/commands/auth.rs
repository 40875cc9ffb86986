//! Sign-in, sign-up, logout and status.

use producthub_core::{CredentialsForm, FilterState};
use producthub_dashboard::services::keys;

use super::{CliError, Client, emit};

/// Which credential endpoint to call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthKind {
    Login,
    Signup,
}

/// Validate credentials, authenticate and store the token.
pub async fn authenticate(
    client: &mut Client,
    kind: AuthKind,
    email: String,
    password: String,
) -> Result<(), CliError> {
    let credentials = CredentialsForm { email, password }
        .validate()
        .map_err(CliError::Invalid)?;

    let token = match kind {
        AuthKind::Login => client.api.login(&credentials).await?,
        AuthKind::Signup => client.api.signup(&credentials).await?,
    };
    client.context.login(token).await?;
    tracing::info!(email = %credentials.email, "Authenticated");

    emit(match kind {
        AuthKind::Login => "Login successful!",
        AuthKind::Signup => "Signup successful!",
    })
}

/// Forget the stored credential.
pub async fn logout(client: &mut Client) -> Result<(), CliError> {
    client.context.logout().await?;
    emit("Logged out.")
}

/// Report whether a credential is stored and which filters are saved.
pub async fn status(client: &Client) -> Result<(), CliError> {
    if client.context.is_logged_in() {
        emit("Logged in.")?;
    } else {
        emit("Not logged in.")?;
    }

    let saved = client.context.storage().get(keys::FILTERS).await?;
    let filters = saved
        .as_deref()
        .and_then(|raw| FilterState::from_json(raw).ok())
        .unwrap_or_default();
    if filters.is_unconstrained() {
        emit("No saved filters.")
    } else {
        emit(format_args!("Saved filters: {}", filters.to_query()))
    }
}
