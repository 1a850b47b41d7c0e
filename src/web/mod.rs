//! Web client: sign-in, sign-up and a protected home page.
//!
//! Signed-in state is a server-side session keyed by the `__session` cookie.
//! The session holds the access token issued by the API; it is verified on
//! every request with the same signing secret and forwarded as the bearer
//! token when the home page loads the caller's profile.

pub mod pages;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use time::OffsetDateTime;
use tower_http::trace::TraceLayer;
use tower_sessions::{cookie::SameSite, Expiry, Session, SessionManagerLayer};
use tower_sessions_memory_store::MemoryStore;

use crate::auth::TokenService;
use crate::config::AppConfig;
use crate::database::models::User;
use crate::middleware::{apply_security_headers, Identity};

use pages::{HomePage, HtmlTemplate, SignInPage, SignUpPage};

pub const SESSION_COOKIE: &str = "__session";

const TOKEN_KEY: &str = "access_token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    SignIn,
    SignUp,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteDecision {
    Render(Page),
    Redirect(&'static str),
}

/// Client route table. Public pages never redirect; `/` needs a session;
/// anything else goes home.
pub fn resolve(path: &str, signed_in: bool) -> RouteDecision {
    match path {
        "/sign-in" => RouteDecision::Render(Page::SignIn),
        "/sign-up" => RouteDecision::Render(Page::SignUp),
        "/" if signed_in => RouteDecision::Render(Page::Home),
        "/" => RouteDecision::Redirect("/sign-in"),
        _ => RouteDecision::Redirect("/"),
    }
}

#[derive(Clone)]
pub struct WebState {
    tokens: Arc<TokenService>,
    http: reqwest::Client,
    api_url: String,
    secure_cookies: bool,
}

impl WebState {
    pub fn new(config: &AppConfig, api_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap_or_default();

        Self {
            tokens: Arc::new(TokenService::new(&config.security)),
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            secure_cookies: config.is_production(),
        }
    }

    /// Verified identity and its token, if the session carries a valid one
    async fn signed_in(&self, session: &Session) -> Option<(Identity, String)> {
        let token = match session.get::<String>(TOKEN_KEY).await {
            Ok(token) => token?,
            Err(e) => {
                tracing::warn!(error = %e, "Session lookup failed");
                return None;
            }
        };

        match self.tokens.verify_access(&token) {
            Ok(claims) => Some((Identity::from(claims), token)),
            Err(e) => {
                tracing::debug!(error = %e, "Session token no longer valid");
                if let Err(e) = session.flush().await {
                    tracing::warn!(error = %e, "Failed to clear stale session");
                }
                None
            }
        }
    }

    /// GET {api}/api/users/me with the session token; `None` on any failure
    async fn fetch_profile(&self, token: &str) -> Option<User> {
        #[derive(Deserialize)]
        struct Envelope {
            data: User,
        }

        let url = format!("{}/api/users/me", self.api_url);
        let result = async {
            let response = self.http.get(&url).bearer_auth(token).send().await?.error_for_status()?;
            response.json::<Envelope>().await
        }
        .await;

        match result {
            Ok(envelope) => Some(envelope.data),
            Err(e) => {
                tracing::warn!(url = %url, error = %e, "Profile request failed");
                None
            }
        }
    }
}

fn session_layer(secure: bool) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE)
        .with_secure(secure)
        .with_http_only(true)
        .with_same_site(SameSite::Lax)
        .with_path("/")
}

pub fn router(state: WebState) -> Router {
    let sessions = session_layer(state.secure_cookies);
    let router = Router::new()
        .route("/sign-in", get(page).post(sign_in))
        .route("/sign-out", post(sign_out))
        .fallback(page)
        .layer(sessions)
        .with_state(state);

    apply_security_headers(router).layer(TraceLayer::new_for_http())
}

async fn page(State(state): State<WebState>, session: Session, uri: Uri) -> Response {
    let signed_in = state.signed_in(&session).await;

    match resolve(uri.path(), signed_in.is_some()) {
        RouteDecision::Render(Page::SignIn) => HtmlTemplate::page(SignInPage { error: None }).into_response(),
        RouteDecision::Render(Page::SignUp) => HtmlTemplate::page(SignUpPage).into_response(),
        RouteDecision::Render(Page::Home) => match signed_in {
            Some((identity, token)) => {
                let profile = state.fetch_profile(&token).await;
                HtmlTemplate::page(HomePage {
                    identity: &identity,
                    profile: profile.as_ref(),
                    api_url: &state.api_url,
                })
                .into_response()
            }
            None => Redirect::to("/sign-in").into_response(),
        },
        RouteDecision::Redirect(to) => Redirect::to(to).into_response(),
    }
}

#[derive(Debug, Deserialize)]
struct SignInForm {
    token: String,
}

async fn sign_in(State(state): State<WebState>, session: Session, Form(form): Form<SignInForm>) -> Response {
    let token = form.token.trim();
    let claims = match state.tokens.verify_access(token) {
        Ok(claims) => claims,
        Err(e) => {
            tracing::warn!(error = %e, "Sign-in rejected");
            return HtmlTemplate::page(SignInPage {
                error: Some("That session token is invalid or has expired."),
            })
            .with_status(StatusCode::UNAUTHORIZED)
            .into_response();
        }
    };

    // Fresh session id on every sign-in; the session ends when the token does
    let started = async {
        session.cycle_id().await?;
        session.insert(TOKEN_KEY, token).await
    }
    .await;
    if let Err(e) = started {
        tracing::error!(error = %e, "Failed to start session");
        return HtmlTemplate::page(SignInPage {
            error: Some("Could not start a session, please try again."),
        })
        .with_status(StatusCode::INTERNAL_SERVER_ERROR)
        .into_response();
    }
    if let Ok(expires_at) = OffsetDateTime::from_unix_timestamp(claims.exp) {
        session.set_expiry(Some(Expiry::AtDateTime(expires_at)));
    }

    tracing::info!(user_id = %claims.sub, session_id = %claims.sid, "Signed in");
    Redirect::to("/").into_response()
}

async fn sign_out(session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::warn!(error = %e, "Failed to clear session on sign-out");
    }
    Redirect::to("/sign-in").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::PlaceholderUserStore;
    use crate::testing::{test_config, test_state};
    use axum::{
        body::Body,
        http::{header, Request},
    };
    use std::net::SocketAddr;
    use tower::ServiceExt;

    // Nothing listens here, so profile requests fail fast
    const DEAD_API: &str = "http://127.0.0.1:9";

    fn state(api_url: &str) -> WebState {
        WebState::new(&test_config(), api_url)
    }

    async fn get_with_cookie(router: Router, path: &str, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder().uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        router.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap()
    }

    async fn post_form(router: Router, path: &str, form: String, cookie: Option<&str>) -> Response {
        let mut builder = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        router.oneshot(builder.body(Body::from(form)).unwrap()).await.unwrap()
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8_lossy(&bytes).into_owned()
    }

    /// Sign in through the form and return the `name=value` pair to replay as a Cookie header
    async fn signed_in_cookie(router: Router, token: &str) -> String {
        let response = post_form(router, "/sign-in", format!("token={}", token), None).await;
        assert_eq!(location(&response), "/");
        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[test]
    fn test_route_table() {
        assert_eq!(resolve("/sign-in", false), RouteDecision::Render(Page::SignIn));
        assert_eq!(resolve("/sign-in", true), RouteDecision::Render(Page::SignIn));
        assert_eq!(resolve("/sign-up", false), RouteDecision::Render(Page::SignUp));
        assert_eq!(resolve("/sign-up", true), RouteDecision::Render(Page::SignUp));
        assert_eq!(resolve("/", true), RouteDecision::Render(Page::Home));
        assert_eq!(resolve("/", false), RouteDecision::Redirect("/sign-in"));
        assert_eq!(resolve("/settings", true), RouteDecision::Redirect("/"));
        assert_eq!(resolve("/settings", false), RouteDecision::Redirect("/"));
    }

    #[tokio::test]
    async fn test_protected_home_redirects_when_signed_out() {
        let response = get_with_cookie(router(state(DEAD_API)), "/", None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/sign-in");
    }

    #[tokio::test]
    async fn test_public_pages_never_redirect() {
        for path in ["/sign-in", "/sign-up"] {
            let response = get_with_cookie(router(state(DEAD_API)), path, None).await;
            assert_eq!(response.status(), StatusCode::OK, "{}", path);
        }
    }

    #[tokio::test]
    async fn test_unknown_route_goes_home() {
        let response = get_with_cookie(router(state(DEAD_API)), "/does/not/exist", None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");
    }

    #[tokio::test]
    async fn test_unknown_session_cookie_is_signed_out() {
        let cookie = format!("{}=not-a-session", SESSION_COOKIE);
        let response = get_with_cookie(router(state(DEAD_API)), "/", Some(&cookie)).await;
        assert_eq!(location(&response), "/sign-in");
    }

    #[tokio::test]
    async fn test_sign_in_sets_session_cookie() {
        let state = state(DEAD_API);
        let pair = state.tokens.issue_pair("user_123").unwrap();

        let response = post_form(router(state), "/sign-in", format!("token={}", pair.access_token), None).await;
        assert!(response.status().is_redirection());
        assert_eq!(location(&response), "/");

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("__session="));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        // The cookie carries a session id, never the token itself
        assert!(!cookie.contains(&pair.access_token));
    }

    #[tokio::test]
    async fn test_sign_in_rejects_bad_token() {
        let response = post_form(router(state(DEAD_API)), "/sign-in", "token=nope".to_string(), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert!(body_text(response).await.contains("invalid or has expired"));
    }

    #[tokio::test]
    async fn test_home_degrades_when_api_unreachable() {
        let state = state(DEAD_API);
        let pair = state.tokens.issue_pair("user_123").unwrap();
        let router = router(state);
        let cookie = signed_in_cookie(router.clone(), &pair.access_token).await;

        let response = get_with_cookie(router, "/", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("user_123"));
        assert!(html.contains("could not be loaded"));
    }

    #[tokio::test]
    async fn test_home_shows_profile_from_api() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let api_addr = listener.local_addr().unwrap();
        let api = crate::app::app(test_state(Arc::new(PlaceholderUserStore)));
        tokio::spawn(async move {
            axum::serve(listener, api.into_make_service_with_connect_info::<SocketAddr>()).await
        });

        let state = state(&format!("http://{}", api_addr));
        let pair = state.tokens.issue_pair("user_123").unwrap();
        let router = router(state);
        let cookie = signed_in_cookie(router.clone(), &pair.access_token).await;

        let response = get_with_cookie(router, "/", Some(&cookie)).await;
        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("Signed in as user@example.com"));
        assert!(html.contains("Name: John Doe"));
    }

    #[tokio::test]
    async fn test_sign_out_ends_session() {
        let state = state(DEAD_API);
        let pair = state.tokens.issue_pair("user_123").unwrap();
        let router = router(state);
        let cookie = signed_in_cookie(router.clone(), &pair.access_token).await;

        let response = post_form(router.clone(), "/sign-out", String::new(), Some(&cookie)).await;
        assert_eq!(location(&response), "/sign-in");

        let response = get_with_cookie(router, "/", Some(&cookie)).await;
        assert_eq!(location(&response), "/sign-in");
    }
}
