//! An asynchronous MVC action pipeline with content-negotiated results
//!
//! This crate provides the request-processing core of an MVC framework: an
//! ordered filter pipeline wrapped around action invocation, and an action
//! result model that writes responses through content negotiation. Routing
//! and the HTTP transport are collaborators supplied by the caller, not part
//! of this crate.
//!
//! # Features
//!
//! - Five filter stages: authorization, resource, action, result, exception
//! - Global and per-action filter registration with explicit ordering
//! - Nested before/after filter scopes with short-circuiting
//! - Quality-factor aware `Accept` header negotiation
//! - Pluggable output formatters (JSON and plain text built in)
//! - Request abort handling that abandons remaining pipeline stages
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use async_trait::async_trait;
//! use http::{Request, StatusCode};
//! use micro_mvc::error::BoxError;
//! use micro_mvc::{
//!     Action, ActionContext, ActionDescriptor, ActionInvoker, ActionResult, Arguments,
//!     HttpContext, MvcOptions, RouteData, UrlGenerator,
//! };
//!
//! struct Hello;
//!
//! #[async_trait]
//! impl Action for Hello {
//!     async fn invoke(
//!         &self,
//!         _ctx: &mut ActionContext,
//!         _arguments: Arguments,
//!     ) -> Result<ActionResult, BoxError> {
//!         Ok(ActionResult::object("hello world")?)
//!     }
//! }
//!
//! struct NoRoutes;
//!
//! impl UrlGenerator for NoRoutes {
//!     fn generate_url(&self, _route_name: Option<&str>, _values: &RouteData) -> Option<String> {
//!         None
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let options = Arc::new(MvcOptions::default());
//!     let invoker = ActionInvoker::new(options, Arc::new(NoRoutes));
//!
//!     let request = Request::builder()
//!         .uri("/hello")
//!         .header("accept", "application/json")
//!         .body(())
//!         .unwrap();
//!     let mut ctx = ActionContext::new(
//!         HttpContext::new(request),
//!         RouteData::new(),
//!         ActionDescriptor::new("hello"),
//!     );
//!
//!     invoker.invoke(&mut ctx, &Hello).await.unwrap();
//!     assert_eq!(ctx.http().response().status(), StatusCode::OK);
//! }
//! ```

mod action;
mod binder;
mod context;
mod invoker;
mod options;
mod response;
mod result;
mod url;

pub mod error;
pub mod filter;
pub mod formatter;
pub mod media_type;

pub use action::Action;
pub use action::FnAction;
pub use action::action_fn;
pub use binder::Arguments;
pub use binder::ModelBinder;
pub use binder::RouteValueBinder;
pub use context::AbortHandle;
pub use context::ActionContext;
pub use context::ActionDescriptor;
pub use context::HttpContext;
pub use context::RouteData;
pub use invoker::ActionInvoker;
pub use invoker::PipelineOutcome;
pub use options::MvcOptions;
pub use options::MvcOptionsBuilder;
pub use response::ResponseBody;
pub use response::ResponseHandle;
pub use result::ActionResult;
pub use result::ContentResult;
pub use result::CreatedAtRouteResult;
pub use result::ObjectResult;
pub use result::ResultServices;
pub use result::StatusCodeResult;
pub use url::UrlGenerator;
