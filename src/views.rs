use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// A page ready for the template renderer: the template to use and the
/// context it is rendered with.
#[derive(Debug)]
pub struct View<C> {
    template: &'static str,
    context: C,
    status: StatusCode,
}

#[derive(Serialize)]
struct Rendered<'a, C> {
    template: &'a str,
    context: &'a C,
}

impl<C: Serialize> View<C> {
    pub fn new(template: &'static str, context: C) -> Self {
        Self {
            template,
            context,
            status: StatusCode::OK,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }
}

impl<C: Serialize> IntoResponse for View<C> {
    fn into_response(self) -> Response {
        tracing::debug!("rendering {}", self.template);

        (
            self.status,
            Json(Rendered {
                template: self.template,
                context: &self.context,
            }),
        )
            .into_response()
    }
}

pub fn profile_url(username: &str) -> String {
    format!("/profile/{username}/")
}

pub fn post_detail_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_template_and_context() {
        let response = View::new("posts/index.html", serde_json::json!({ "count": 1 }))
            .with_status(StatusCode::UNAUTHORIZED)
            .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }
}
