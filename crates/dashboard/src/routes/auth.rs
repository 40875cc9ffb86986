//! Sign-in, sign-up and logout.
//!
//! Both forms validate locally first and render field errors inline; only
//! valid credentials reach the catalog API. A successful submit stores the
//! credential in the session and lands on the home page with a toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use producthub_core::{CredentialsForm, FormErrors};
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::AppError;
use crate::filters;
use crate::middleware::ClientSession;
use crate::services::{SIGN_IN_PATH, keys};
use crate::state::AppState;

/// Toast shown after a successful sign-in.
pub const LOGIN_SUCCESS: &str = "Login successful!";

/// Toast shown after a successful sign-up.
pub const SIGNUP_SUCCESS: &str = "Signup successful!";

/// Which credentials form is being shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode {
    SignIn,
    SignUp,
}

impl AuthMode {
    /// Page heading and submit label.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::SignIn => "Sign In",
            Self::SignUp => "Sign Up",
        }
    }

    /// Form action.
    #[must_use]
    pub const fn action(&self) -> &'static str {
        match self {
            Self::SignIn => SIGN_IN_PATH,
            Self::SignUp => "/sign-up",
        }
    }

    /// Prompt next to the link to the other form.
    #[must_use]
    pub const fn switch_prompt(&self) -> &'static str {
        match self {
            Self::SignIn => "Don't have an account?",
            Self::SignUp => "Already have an account?",
        }
    }

    /// The other form.
    #[must_use]
    pub const fn other(&self) -> Self {
        match self {
            Self::SignIn => Self::SignUp,
            Self::SignUp => Self::SignIn,
        }
    }

    const fn success(self) -> &'static str {
        match self {
            Self::SignIn => LOGIN_SUCCESS,
            Self::SignUp => SIGNUP_SUCCESS,
        }
    }
}

/// Sign-in / sign-up page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/credentials.html")]
pub struct CredentialsTemplate {
    pub mode: AuthMode,
    pub logged_in: bool,
    /// Submitted email, kept on error.
    pub email: String,
    pub errors: FormErrors,
    /// Error toast from the catalog API.
    pub error: Option<String>,
}

impl CredentialsTemplate {
    fn blank(mode: AuthMode, logged_in: bool) -> Self {
        Self {
            mode,
            logged_in,
            email: String::new(),
            errors: FormErrors::default(),
            error: None,
        }
    }

    /// Inline message for `field`, or empty.
    #[must_use]
    pub fn field_error(&self, field: &str) -> &str {
        self.errors.get(field).unwrap_or_default()
    }
}

/// GET /sign-in
pub async fn sign_in_page(ClientSession(context): ClientSession) -> impl IntoResponse {
    CredentialsTemplate::blank(AuthMode::SignIn, context.is_logged_in())
}

/// GET /sign-up
pub async fn sign_up_page(ClientSession(context): ClientSession) -> impl IntoResponse {
    CredentialsTemplate::blank(AuthMode::SignUp, context.is_logged_in())
}

/// POST /sign-in
pub async fn sign_in(
    State(state): State<AppState>,
    session: ClientSession,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    submit(&state, session, AuthMode::SignIn, form).await
}

/// POST /sign-up
pub async fn sign_up(
    State(state): State<AppState>,
    session: ClientSession,
    Form(form): Form<CredentialsForm>,
) -> Result<Response, AppError> {
    submit(&state, session, AuthMode::SignUp, form).await
}

#[instrument(skip_all, fields(mode = ?mode))]
async fn submit(
    state: &AppState,
    ClientSession(mut context): ClientSession,
    mode: AuthMode,
    form: CredentialsForm,
) -> Result<Response, AppError> {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            return Ok(CredentialsTemplate {
                email: form.email,
                errors,
                ..CredentialsTemplate::blank(mode, context.is_logged_in())
            }
            .into_response());
        }
    };

    let api = state.api();
    let result = match mode {
        AuthMode::SignIn => api.login(&credentials).await,
        AuthMode::SignUp => api.signup(&credentials).await,
    };

    let token = match result {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "Authentication failed");
            return Ok(CredentialsTemplate {
                email: form.email,
                error: Some(e.user_message()),
                ..CredentialsTemplate::blank(mode, context.is_logged_in())
            }
            .into_response());
        }
    };

    context.login(token).await?;
    context.storage().set(keys::FLASH, mode.success()).await?;
    info!(email = %credentials.email, "Signed in");

    Ok(Redirect::to("/").into_response())
}

/// POST /logout
///
/// Also stops the live pages this session mounted.
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    ClientSession(mut context): ClientSession,
) -> Result<Redirect, AppError> {
    context.logout().await?;
    if let Some(id) = session.id() {
        let stopped = state.live().revoke_session(id);
        info!(stopped, "Signed out");
    }
    Ok(Redirect::to(SIGN_IN_PATH))
}
