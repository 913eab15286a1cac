//! Firebase Authentication over its REST endpoints.
//!
//! Email/password and Google sign-in go through the Identity Toolkit API,
//! ID tokens are refreshed through the Secure Token API, and the session is
//! kept in `localStorage` so a reload signs the user straight back in.

use std::cell::RefCell;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AuthError, AuthResult, IdentityCallback, IdentityHub, IdentityProvider};
use crate::config::AppConfig;
use crate::models::Identity;
use crate::storage::{load_json_from_storage, remove_from_storage, save_json_to_storage, SESSION_KEY};
use crate::util::now_ms;

/// Refresh this long before the ID token actually expires.
const REFRESH_MARGIN_MS: i64 = 60_000;
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;
const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
struct StoredSession {
    identity: Identity,
    id_token: String,
    refresh_token: String,
    expires_at: i64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    photo_url: Option<String>,
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct RefreshResponse {
    id_token: String,
    refresh_token: String,
    #[serde(default)]
    expires_in: Option<String>,
    user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LookupUser {
    #[serde(default)]
    photo_url: Option<String>,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<LookupUser>,
}

fn expires_at(expires_in: Option<&str>) -> i64 {
    let secs = expires_in
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECS);
    now_ms() + secs * 1000
}

impl From<SignInResponse> for StoredSession {
    fn from(r: SignInResponse) -> Self {
        Self {
            expires_at: expires_at(r.expires_in.as_deref()),
            identity: Identity {
                uid: r.local_id,
                email: r.email,
                photo_url: r.photo_url,
            },
            id_token: r.id_token,
            refresh_token: r.refresh_token,
        }
    }
}

/// Translate an Identity Toolkit error message into the SDK-style code.
/// Messages look like `EMAIL_NOT_FOUND` or `WEAK_PASSWORD : Password should be ...`.
fn auth_code(message: &str) -> String {
    let head = message.split(':').next().unwrap_or_default().trim();
    let code = match head {
        "EMAIL_NOT_FOUND" => "user-not-found",
        "INVALID_PASSWORD" => "wrong-password",
        "INVALID_LOGIN_CREDENTIALS" => "invalid-credential",
        "EMAIL_EXISTS" => "email-already-in-use",
        "WEAK_PASSWORD" => "weak-password",
        "INVALID_EMAIL" => "invalid-email",
        "MISSING_PASSWORD" => "missing-password",
        "USER_DISABLED" => "user-disabled",
        "TOO_MANY_ATTEMPTS_TRY_LATER" => "too-many-requests",
        "OPERATION_NOT_ALLOWED" => "operation-not-allowed",
        "TOKEN_EXPIRED" => "user-token-expired",
        "INVALID_REFRESH_TOKEN" | "INVALID_ID_TOKEN" => "invalid-user-token",
        "USER_NOT_FOUND" => "user-not-found",
        "" => "internal-error",
        other => return format!("auth/{}", other.to_ascii_lowercase().replace('_', "-")),
    };
    format!("auth/{code}")
}

fn error_from_body(body: &str) -> AuthError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_default();
    AuthError::new(auth_code(&message))
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn authorize_url(client_id: &str, redirect_uri: &str, state: &str, nonce: &str) -> String {
    format!(
        "{GOOGLE_AUTHORIZE_URL}?client_id={}&redirect_uri={}&response_type=id_token&scope={}&state={}&nonce={}&prompt=select_account",
        urlencoding::encode(client_id),
        urlencoding::encode(redirect_uri),
        urlencoding::encode("openid email profile"),
        urlencoding::encode(state),
        urlencoding::encode(nonce),
    )
}

#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
/// Inspect the popup's URL once it is readable. `None` while the provider
/// has not redirected back to `redirect_uri` yet.
fn parse_redirect(href: &str, redirect_uri: &str, state: &str) -> Option<AuthResult<String>> {
    if !href.starts_with(redirect_uri) {
        return None;
    }
    let (_, fragment) = href.split_once('#')?;
    let mut id_token = None;
    let mut returned_state = None;
    let mut error = None;
    for pair in fragment.split('&') {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        let value = urlencoding::decode(value)
            .map(|v| v.into_owned())
            .unwrap_or_default();
        match key {
            "id_token" => id_token = Some(value),
            "state" => returned_state = Some(value),
            "error" => error = Some(value),
            _ => {}
        }
    }
    if let Some(error) = error {
        let code = match error.as_str() {
            "access_denied" => "auth/popup-closed-by-user".to_string(),
            other => format!("auth/{}", other.replace('_', "-")),
        };
        return Some(Err(AuthError::new(code)));
    }
    let id_token = id_token?;
    if returned_state.as_deref() != Some(state) {
        return Some(Err(AuthError::new("auth/invalid-oauth-state")));
    }
    Some(Ok(id_token))
}

/// Whether a URL fragment is the provider's answer (`id_token=` or `error=`).
fn is_redirect_fragment(fragment: &str) -> bool {
    fragment.trim_start_matches('#').split('&').any(|pair| {
        let key = pair.split('=').next().unwrap_or_default();
        key == "id_token" || key == "error"
    })
}

struct Inner {
    api_key: String,
    identity_url: String,
    token_url: String,
    google_client_id: Option<String>,
    session: RefCell<Option<StoredSession>>,
    hub: IdentityHub,
}

#[derive(Clone)]
pub(crate) struct FirebaseAuth {
    inner: Rc<Inner>,
}

impl FirebaseAuth {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            inner: Rc::new(Inner {
                api_key: config.api_key.clone(),
                identity_url: config.identity_url.clone(),
                token_url: config.token_url.clone(),
                google_client_id: config.google_client_id.clone(),
                session: RefCell::new(None),
                hub: IdentityHub::default(),
            }),
        }
    }

    /// True inside a sign-in popup the provider has redirected back. The
    /// opener reads the answer from this window's URL, so nothing here may
    /// rewrite it.
    pub fn is_popup_callback() -> bool {
        let Some(win) = web_sys::window() else {
            return false;
        };
        let has_opener = win
            .opener()
            .is_ok_and(|opener| !opener.is_null() && !opener.is_undefined());
        has_opener && win.location().hash().is_ok_and(|hash| is_redirect_fragment(&hash))
    }

    fn accounts_url(&self, method: &str) -> String {
        format!(
            "{}/accounts:{method}?key={}",
            self.inner.identity_url,
            urlencoding::encode(&self.inner.api_key)
        )
    }

    async fn post<T: DeserializeOwned>(&self, url: String, body: &serde_json::Value) -> AuthResult<T> {
        let client = reqwest::Client::new();
        let res = client.post(url).json(body).send().await.map_err(|e| {
            tracing::debug!(error = %e, "identity request failed");
            AuthError::new("auth/network-request-failed")
        })?;
        if res.status().is_success() {
            res.json()
                .await
                .map_err(|_| AuthError::new("auth/internal-error"))
        } else {
            let body = res.text().await.unwrap_or_default();
            Err(error_from_body(&body))
        }
    }

    /// Load the persisted session and validate it with a token refresh.
    /// Always publishes exactly one identity notification.
    pub async fn restore(&self) {
        let Some(stored) = load_json_from_storage::<StoredSession>(SESSION_KEY) else {
            self.inner.hub.publish(None);
            return;
        };
        *self.inner.session.borrow_mut() = Some(stored);
        match self.refresh().await {
            Ok(session) => {
                tracing::info!(uid = %session.identity.uid, "session restored");
                self.inner.hub.publish(Some(session.identity));
            }
            Err(e) => {
                tracing::info!(code = %e.code, "stored session rejected");
                self.end_session();
            }
        }
    }

    /// Current ID token, refreshed when close to expiry.
    pub async fn id_token(&self) -> AuthResult<String> {
        let session = self
            .inner
            .session
            .borrow()
            .clone()
            .ok_or_else(|| AuthError::new("auth/no-current-user"))?;
        if session.expires_at - REFRESH_MARGIN_MS > now_ms() {
            return Ok(session.id_token);
        }
        match self.refresh().await {
            Ok(session) => Ok(session.id_token),
            Err(e) if e.code == "auth/network-request-failed" => Err(e),
            Err(e) => {
                // The refresh token is dead; the user has to sign in again.
                self.end_session();
                Err(e)
            }
        }
    }

    async fn refresh(&self) -> AuthResult<StoredSession> {
        let current = self
            .inner
            .session
            .borrow()
            .clone()
            .ok_or_else(|| AuthError::new("auth/no-current-user"))?;
        let url = format!(
            "{}/token?key={}",
            self.inner.token_url,
            urlencoding::encode(&self.inner.api_key)
        );
        let body = json!({
            "grant_type": "refresh_token",
            "refresh_token": current.refresh_token,
        });
        let r: RefreshResponse = self.post(url, &body).await?;
        if r.user_id != current.identity.uid {
            return Err(AuthError::new("auth/user-mismatch"));
        }
        let session = StoredSession {
            identity: current.identity,
            id_token: r.id_token,
            refresh_token: r.refresh_token,
            expires_at: expires_at(r.expires_in.as_deref()),
        };
        self.store_session(session.clone());
        Ok(session)
    }

    fn store_session(&self, session: StoredSession) {
        save_json_to_storage(SESSION_KEY, &session);
        *self.inner.session.borrow_mut() = Some(session);
    }

    fn end_session(&self) {
        remove_from_storage(SESSION_KEY);
        *self.inner.session.borrow_mut() = None;
        self.inner.hub.publish(None);
    }

    async fn start_session(&self, mut session: StoredSession) -> Identity {
        if session.identity.photo_url.is_none() {
            session.identity.photo_url = self.lookup_photo(&session.id_token).await;
        }
        let identity = session.identity.clone();
        self.store_session(session);
        tracing::info!(uid = %identity.uid, "signed in");
        self.inner.hub.publish(Some(identity.clone()));
        identity
    }

    /// Best effort; failures leave the avatar empty.
    async fn lookup_photo(&self, id_token: &str) -> Option<String> {
        let body = json!({ "idToken": id_token });
        match self.post::<LookupResponse>(self.accounts_url("lookup"), &body).await {
            Ok(r) => r.users.into_iter().next().and_then(|u| u.photo_url),
            Err(e) => {
                tracing::debug!(code = %e.code, "profile lookup failed");
                None
            }
        }
    }

    async fn password_flow(&self, method: &str, email: &str, password: &str) -> AuthResult<Identity> {
        let body = json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        });
        let r: SignInResponse = self.post(self.accounts_url(method), &body).await?;
        Ok(self.start_session(r.into()).await)
    }

    #[cfg(target_arch = "wasm32")]
    async fn google_id_token(&self, redirect_uri: &str) -> AuthResult<String> {
        const POLL_MS: i32 = 250;

        let client_id = self
            .inner
            .google_client_id
            .as_deref()
            .ok_or_else(|| AuthError::new("auth/operation-not-allowed"))?;
        let win = web_sys::window().ok_or_else(|| AuthError::new("auth/internal-error"))?;
        let state = crate::util::random_token();
        let nonce = crate::util::random_token();
        let url = authorize_url(client_id, redirect_uri, &state, &nonce);

        let popup = win
            .open_with_url_and_target_and_features(&url, "noteeditor-auth", "width=500,height=640")
            .ok()
            .flatten()
            .ok_or_else(|| AuthError::new("auth/popup-blocked"))?;

        loop {
            crate::util::sleep_ms(POLL_MS).await;
            if popup.closed().unwrap_or(true) {
                return Err(AuthError::new("auth/popup-closed-by-user"));
            }
            // Reading a cross-origin location throws until the provider
            // redirects back to us.
            let Ok(href) = popup.location().href() else {
                continue;
            };
            if let Some(result) = parse_redirect(&href, redirect_uri, &state) {
                let _ = popup.close();
                return result;
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    async fn google_id_token(&self, _redirect_uri: &str) -> AuthResult<String> {
        Err(AuthError::new("auth/operation-not-supported-in-this-environment"))
    }

    fn redirect_uri() -> AuthResult<String> {
        let origin = web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .ok_or_else(|| AuthError::new("auth/internal-error"))?;
        Ok(format!("{origin}/"))
    }
}

impl IdentityProvider for FirebaseAuth {
    fn observe(&self, callback: IdentityCallback) {
        self.inner.hub.subscribe(callback);
    }

    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Identity> {
        self.password_flow("signInWithPassword", email, password).await
    }

    async fn sign_up(&self, email: &str, password: &str) -> AuthResult<Identity> {
        self.password_flow("signUp", email, password).await
    }

    async fn sign_in_interactive(&self) -> AuthResult<Identity> {
        let redirect_uri = Self::redirect_uri()?;
        let google_token = self.google_id_token(&redirect_uri).await?;
        let body = json!({
            "postBody": format!("id_token={}&providerId=google.com", urlencoding::encode(&google_token)),
            "requestUri": redirect_uri,
            "returnSecureToken": true,
            "returnIdpCredential": true,
        });
        let r: SignInResponse = self.post(self.accounts_url("signInWithIdp"), &body).await?;
        Ok(self.start_session(r.into()).await)
    }
}
