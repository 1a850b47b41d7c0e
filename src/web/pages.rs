//! Page templates for the web client. Markup lives in `templates/`.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};

use crate::database::models::User;
use crate::middleware::Identity;

#[derive(Template)]
#[template(path = "sign_in.html")]
pub struct SignInPage<'a> {
    pub error: Option<&'a str>,
}

#[derive(Template)]
#[template(path = "sign_up.html")]
pub struct SignUpPage;

#[derive(Template)]
#[template(path = "home.html")]
pub struct HomePage<'a> {
    pub identity: &'a Identity,
    /// `None` when the API could not be reached
    pub profile: Option<&'a User>,
    pub api_url: &'a str,
}

/// Renders a template as an HTML response with the given status
pub struct HtmlTemplate<T: Template> {
    template: T,
    status: StatusCode,
}

impl<T: Template> HtmlTemplate<T> {
    pub fn page(template: T) -> Self {
        Self {
            template,
            status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.template.render() {
            Ok(html) => (self.status, Html(html)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Template render failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong").into_response()
            }
        }
    }
}
