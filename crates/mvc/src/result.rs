//! Action result variants and their execution contracts.
//!
//! An [`ActionResult`] is created by the action method (or by a filter) and
//! executed exactly once per request, which is why [`ActionResult::execute`]
//! consumes it. Negotiated variants pick an output formatter through
//! [`select_formatter`](crate::formatter::select_formatter); a failed
//! negotiation becomes a 406 response, not an error.

use bytes::Bytes;
use http::{HeaderValue, StatusCode, header};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

use crate::context::{ActionContext, RouteData};
use crate::error::ExecuteError;
use crate::formatter::{OutputFormatter, select_formatter};
use crate::media_type::{AcceptHeader, MediaType};
use crate::url::UrlGenerator;

/// Services result execution draws on: the formatter registry and the URL
/// generation capability of the routing collaborator.
pub struct ResultServices<'a> {
    formatters: &'a [Arc<dyn OutputFormatter>],
    url_generator: &'a dyn UrlGenerator,
}

impl<'a> ResultServices<'a> {
    pub fn new(formatters: &'a [Arc<dyn OutputFormatter>], url_generator: &'a dyn UrlGenerator) -> Self {
        Self { formatters, url_generator }
    }

    pub fn formatters(&self) -> &'a [Arc<dyn OutputFormatter>] {
        self.formatters
    }

    pub fn url_generator(&self) -> &'a dyn UrlGenerator {
        self.url_generator
    }
}

/// The closed set of result kinds an action can produce.
pub enum ActionResult {
    StatusCode(StatusCodeResult),
    Content(ContentResult),
    Object(ObjectResult),
    CreatedAtRoute(CreatedAtRouteResult),
}

impl ActionResult {
    pub fn status(status: StatusCode) -> Self {
        Self::StatusCode(StatusCodeResult { status })
    }

    pub fn content(status: StatusCode, content_type: MediaType, content: impl Into<Bytes>) -> Self {
        Self::Content(ContentResult { status, content_type, content: content.into() })
    }

    /// A negotiated 200 response carrying `value`.
    pub fn object<T: Serialize>(value: T) -> Result<Self, ExecuteError> {
        Ok(Self::Object(ObjectResult::new(value)?))
    }

    pub fn created_at_route(
        route_name: Option<String>,
        route_values: RouteData,
        value: Option<Value>,
    ) -> Self {
        Self::CreatedAtRoute(CreatedAtRouteResult { route_name, route_values, value })
    }

    /// Writes this result to the response. Results execute exactly once.
    pub fn execute(self, ctx: &mut ActionContext, services: &ResultServices<'_>) -> Result<(), ExecuteError> {
        match self {
            Self::StatusCode(result) => result.execute(ctx),
            Self::Content(result) => result.execute(ctx),
            Self::Object(result) => result.execute(ctx, services),
            Self::CreatedAtRoute(result) => result.execute(ctx, services),
        }
    }
}

/// A fixed status code with no body.
pub struct StatusCodeResult {
    status: StatusCode,
}

impl StatusCodeResult {
    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn execute(self, ctx: &mut ActionContext) -> Result<(), ExecuteError> {
        ctx.http_mut().response_mut().set_status(self.status);
        Ok(())
    }
}

/// A fixed status code and an explicit content type; no negotiation.
pub struct ContentResult {
    status: StatusCode,
    content_type: MediaType,
    content: Bytes,
}

impl ContentResult {
    fn execute(self, ctx: &mut ActionContext) -> Result<(), ExecuteError> {
        let content_type = content_type_value(&self.content_type)?;
        let response = ctx.http_mut().response_mut();
        response.set_status(self.status);
        response.insert_header(header::CONTENT_TYPE, content_type);
        response.write_body(self.content)
    }
}

/// A value serialized through the negotiated output formatter.
pub struct ObjectResult {
    status: StatusCode,
    value: Value,
}

impl ObjectResult {
    pub fn new<T: Serialize>(value: T) -> Result<Self, ExecuteError> {
        Ok(Self { status: StatusCode::OK, value: serde_json::to_value(value)? })
    }

    pub fn from_value(value: Value) -> Self {
        Self { status: StatusCode::OK, value }
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    fn execute(self, ctx: &mut ActionContext, services: &ResultServices<'_>) -> Result<(), ExecuteError> {
        let accept = AcceptHeader::from_headers(ctx.http().headers());
        match select_formatter(accept.media_types(), services.formatters()) {
            Some(selection) => {
                let body = selection.formatter.write(&self.value, &selection.media_type)?;
                let content_type = content_type_value(&selection.media_type)?;
                let response = ctx.http_mut().response_mut();
                response.set_status(self.status);
                response.insert_header(header::CONTENT_TYPE, content_type);
                response.write_body(body)
            }
            None => {
                debug!("no acceptable output formatter, responding 406");
                ctx.http_mut().response_mut().set_status(StatusCode::NOT_ACCEPTABLE);
                Ok(())
            }
        }
    }
}

/// A 201 response pointing at a named route, with an optional negotiated body.
pub struct CreatedAtRouteResult {
    route_name: Option<String>,
    route_values: RouteData,
    value: Option<Value>,
}

impl CreatedAtRouteResult {
    pub fn new(route_name: Option<String>, route_values: RouteData, value: Option<Value>) -> Self {
        Self { route_name, route_values, value }
    }

    fn execute(self, ctx: &mut ActionContext, services: &ResultServices<'_>) -> Result<(), ExecuteError> {
        let url = services
            .url_generator()
            .generate_url(self.route_name.as_deref(), &self.route_values)
            .ok_or_else(|| ExecuteError::invalid_operation("No route matches the supplied values."))?;

        let location = HeaderValue::from_str(&url).map_err(|e| {
            ExecuteError::invalid_operation(format!("invalid Location value '{url}': {e}"))
        })?;

        let response = ctx.http_mut().response_mut();
        response.set_status(StatusCode::CREATED);
        response.insert_header(header::LOCATION, location);

        if let Some(value) = self.value {
            ObjectResult::from_value(value).with_status(StatusCode::CREATED).execute(ctx, services)?;
        }
        Ok(())
    }
}

fn content_type_value(media_type: &MediaType) -> Result<HeaderValue, ExecuteError> {
    HeaderValue::from_str(&media_type.to_string()).map_err(|e| {
        ExecuteError::invalid_operation(format!("invalid content type '{media_type}': {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::{ActionResult, ResultServices};
    use crate::context::{ActionContext, ActionDescriptor, HttpContext, RouteData};
    use crate::error::ExecuteError;
    use crate::formatter::{JsonOutputFormatter, OutputFormatter, TextPlainFormatter};
    use crate::media_type::MediaType;
    use crate::url::UrlGenerator;
    use http::{Request, StatusCode, header};
    use serde_json::json;
    use std::sync::Arc;

    /// Stands in for the routing collaborator, always resolving to the same URL.
    struct FixedUrl(Option<String>);

    impl UrlGenerator for FixedUrl {
        fn generate_url(&self, _route_name: Option<&str>, _values: &RouteData) -> Option<String> {
            self.0.clone()
        }
    }

    fn formatters() -> Vec<Arc<dyn OutputFormatter>> {
        vec![Arc::new(TextPlainFormatter::new()), Arc::new(JsonOutputFormatter::new())]
    }

    fn context(accept: Option<&str>) -> ActionContext {
        let mut builder = Request::builder().uri("/resource");
        if let Some(accept) = accept {
            builder = builder.header(header::ACCEPT, accept);
        }
        let request = builder.body(()).unwrap();
        ActionContext::new(HttpContext::new(request), RouteData::new(), ActionDescriptor::new("test"))
    }

    #[test]
    fn created_at_route_sets_status_and_location() {
        let formatters = formatters();
        let url = FixedUrl(Some("testAction".to_string()));
        let services = ResultServices::new(&formatters, &url);
        let mut ctx = context(None);

        let result = ActionResult::created_at_route(None, RouteData::new(), None);
        result.execute(&mut ctx, &services).unwrap();

        let response = ctx.http().response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "testAction");
        assert!(response.body().is_none());
    }

    #[test]
    fn created_at_route_fails_when_no_route_matches() {
        let formatters = formatters();
        let url = FixedUrl(None);
        let services = ResultServices::new(&formatters, &url);
        let mut ctx = context(None);

        let result = ActionResult::created_at_route(None, RouteData::new(), None);
        let err = result.execute(&mut ctx, &services).unwrap_err();

        match err {
            ExecuteError::InvalidOperation { reason } => {
                assert_eq!(reason, "No route matches the supplied values.");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn created_at_route_negotiates_body_when_value_present() {
        let formatters = formatters();
        let url = FixedUrl(Some("/users/42".to_string()));
        let services = ResultServices::new(&formatters, &url);
        let mut ctx = context(Some("application/json"));

        let result = ActionResult::created_at_route(
            Some("user_by_id".to_string()),
            RouteData::new(),
            Some(json!({"id": 42})),
        );
        result.execute(&mut ctx, &services).unwrap();

        let response = ctx.http().response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::LOCATION], "/users/42");
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(response.body().unwrap().as_ref(), br#"{"id":42}"#);
    }

    #[test]
    fn content_result_writes_without_negotiation() {
        let formatters = formatters();
        let url = FixedUrl(None);
        let services = ResultServices::new(&formatters, &url);
        // accept header would prefer json; content results ignore it
        let mut ctx = context(Some("application/json"));

        let result = ActionResult::content(
            StatusCode::OK,
            MediaType::parse("text/html").unwrap(),
            "<p>hi</p>",
        );
        result.execute(&mut ctx, &services).unwrap();

        let response = ctx.http().response();
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/html");
        assert_eq!(response.body().unwrap().as_ref(), b"<p>hi</p>");
    }

    #[test]
    fn object_result_negotiates_a_formatter() {
        let formatters = formatters();
        let url = FixedUrl(None);
        let services = ResultServices::new(&formatters, &url);
        let mut ctx = context(Some("*/*;q=0.8, text/plain;q=1.0"));

        let result = ActionResult::object("hello").unwrap();
        result.execute(&mut ctx, &services).unwrap();

        let response = ctx.http().response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert_eq!(response.body().unwrap().as_ref(), b"hello");
    }

    #[test]
    fn object_result_translates_failed_negotiation_to_406() {
        let formatters = formatters();
        let url = FixedUrl(None);
        let services = ResultServices::new(&formatters, &url);
        let mut ctx = context(Some("image/png"));

        let result = ActionResult::object("hello").unwrap();
        result.execute(&mut ctx, &services).unwrap();

        let response = ctx.http().response();
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert!(response.body().is_none());
    }

    #[test]
    fn status_code_result_sets_status_only() {
        let formatters = formatters();
        let url = FixedUrl(None);
        let services = ResultServices::new(&formatters, &url);
        let mut ctx = context(None);

        ActionResult::status(StatusCode::NO_CONTENT).execute(&mut ctx, &services).unwrap();
        assert_eq!(ctx.http().response().status(), StatusCode::NO_CONTENT);
        assert!(ctx.http().response().body().is_none());
    }

    #[test]
    fn second_result_write_is_a_programming_error() {
        let formatters = formatters();
        let url = FixedUrl(None);
        let services = ResultServices::new(&formatters, &url);
        let mut ctx = context(None);

        let first = ActionResult::content(StatusCode::OK, MediaType::parse("text/plain").unwrap(), "one");
        first.execute(&mut ctx, &services).unwrap();

        let second = ActionResult::content(StatusCode::OK, MediaType::parse("text/plain").unwrap(), "two");
        let err = second.execute(&mut ctx, &services).unwrap_err();
        assert!(matches!(err, ExecuteError::ResponseAlreadyWritten));
    }
}
