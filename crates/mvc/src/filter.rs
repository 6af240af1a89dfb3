//! Filter traits, per-stage contexts and ordered filter registration.
//!
//! Filters participate at a defined pipeline stage: authorization, resource,
//! action, result or exception. Before/after pairs default to no-ops so a
//! filter only implements the hooks it cares about. Global registrations
//! (framework wide) and per-action registrations merge into one ordered
//! sequence per stage before the pipeline runs: explicit numeric order
//! ascending, ties broken by scope (global before per-action) and then by
//! registration order.

use async_trait::async_trait;
use std::sync::Arc;

use crate::binder::Arguments;
use crate::context::ActionContext;
use crate::error::BoxError;
use crate::result::ActionResult;

/// Where a registration came from. On equal order, global filters run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterScope {
    Global,
    Action,
}

#[async_trait]
pub trait AuthorizationFilter: Send + Sync {
    async fn on_authorization(&self, ctx: &mut AuthorizationContext<'_>);
}

#[async_trait]
pub trait ResourceFilter: Send + Sync {
    async fn on_resource_executing(&self, _ctx: &mut ResourceExecutingContext<'_>) {}

    async fn on_resource_executed(&self, _ctx: &mut ResourceExecutedContext<'_>) {}
}

#[async_trait]
pub trait ActionFilter: Send + Sync {
    async fn on_action_executing(&self, _ctx: &mut ActionExecutingContext<'_>) {}

    async fn on_action_executed(&self, _ctx: &mut ActionExecutedContext<'_>) {}
}

#[async_trait]
pub trait ResultFilter: Send + Sync {
    async fn on_result_executing(&self, _ctx: &mut ResultExecutingContext<'_>) {}

    async fn on_result_executed(&self, _ctx: &mut ResultExecutedContext<'_>) {}
}

#[async_trait]
pub trait ExceptionFilter: Send + Sync {
    async fn on_exception(&self, ctx: &mut ExceptionContext<'_>);
}

/// Attaching a result short-circuits every remaining stage except the write
/// of that result; action and result filters are skipped entirely.
pub struct AuthorizationContext<'a> {
    pub action: &'a mut ActionContext,
    pub result: Option<ActionResult>,
}

pub struct ResourceExecutingContext<'a> {
    pub action: &'a mut ActionContext,
    pub result: Option<ActionResult>,
}

pub struct ResourceExecutedContext<'a> {
    pub action: &'a mut ActionContext,
    pub canceled: bool,
}

/// Setting `result` short-circuits action invocation: filters later in the
/// chain never run (neither hook), filters that already ran their executing
/// hook still see their executed hook with `canceled` set.
pub struct ActionExecutingContext<'a> {
    pub action: &'a mut ActionContext,
    pub arguments: &'a mut Arguments,
    pub result: Option<ActionResult>,
}

pub struct ActionExecutedContext<'a> {
    pub action: &'a mut ActionContext,
    pub canceled: bool,
    pub exception: Option<BoxError>,
    pub exception_handled: bool,
    pub result: Option<ActionResult>,
}

impl ActionExecutedContext<'_> {
    /// Marks the fault handled; the pipeline drops it and continues with
    /// whatever result is attached.
    pub fn mark_handled(&mut self) {
        self.exception_handled = true;
    }
}

/// `cancel` short-circuits result execution; the result is dropped unwritten.
pub struct ResultExecutingContext<'a> {
    pub action: &'a mut ActionContext,
    pub result: ActionResult,
    pub cancel: bool,
}

pub struct ResultExecutedContext<'a> {
    pub action: &'a mut ActionContext,
    pub canceled: bool,
    pub exception: Option<BoxError>,
    pub exception_handled: bool,
}

/// Carries an unhandled fault from model binding, action invocation or result
/// execution. Marking it `handled` (optionally attaching a substitute result)
/// recovers the request; otherwise the fault propagates unchanged.
pub struct ExceptionContext<'a> {
    pub action: &'a mut ActionContext,
    pub exception: BoxError,
    pub handled: bool,
    pub result: Option<ActionResult>,
}

struct FilterRegistration<F: ?Sized> {
    filter: Arc<F>,
    order: i32,
}

/// Ordered filter registrations for every stage.
///
/// One collection holds the global filters (on
/// [`MvcOptions`](crate::MvcOptions)), another the per-action ones (on the
/// [`ActionDescriptor`](crate::ActionDescriptor)).
#[derive(Default)]
pub struct FilterCollection {
    authorization: Vec<FilterRegistration<dyn AuthorizationFilter>>,
    resource: Vec<FilterRegistration<dyn ResourceFilter>>,
    action: Vec<FilterRegistration<dyn ActionFilter>>,
    result: Vec<FilterRegistration<dyn ResultFilter>>,
    exception: Vec<FilterRegistration<dyn ExceptionFilter>>,
}

impl FilterCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_authorization<F: AuthorizationFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.add_authorization_ordered(filter, 0)
    }

    pub fn add_authorization_ordered<F: AuthorizationFilter + 'static>(
        &mut self,
        filter: F,
        order: i32,
    ) -> &mut Self {
        self.authorization.push(FilterRegistration { filter: Arc::new(filter), order });
        self
    }

    pub fn add_resource<F: ResourceFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.add_resource_ordered(filter, 0)
    }

    pub fn add_resource_ordered<F: ResourceFilter + 'static>(&mut self, filter: F, order: i32) -> &mut Self {
        self.resource.push(FilterRegistration { filter: Arc::new(filter), order });
        self
    }

    pub fn add_action<F: ActionFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.add_action_ordered(filter, 0)
    }

    pub fn add_action_ordered<F: ActionFilter + 'static>(&mut self, filter: F, order: i32) -> &mut Self {
        self.action.push(FilterRegistration { filter: Arc::new(filter), order });
        self
    }

    pub fn add_result<F: ResultFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.add_result_ordered(filter, 0)
    }

    pub fn add_result_ordered<F: ResultFilter + 'static>(&mut self, filter: F, order: i32) -> &mut Self {
        self.result.push(FilterRegistration { filter: Arc::new(filter), order });
        self
    }

    pub fn add_exception<F: ExceptionFilter + 'static>(&mut self, filter: F) -> &mut Self {
        self.add_exception_ordered(filter, 0)
    }

    pub fn add_exception_ordered<F: ExceptionFilter + 'static>(&mut self, filter: F, order: i32) -> &mut Self {
        self.exception.push(FilterRegistration { filter: Arc::new(filter), order });
        self
    }

    pub(crate) fn merged_authorization(&self, action: &FilterCollection) -> Vec<Arc<dyn AuthorizationFilter>> {
        merge(&self.authorization, &action.authorization)
    }

    pub(crate) fn merged_resource(&self, action: &FilterCollection) -> Vec<Arc<dyn ResourceFilter>> {
        merge(&self.resource, &action.resource)
    }

    pub(crate) fn merged_action(&self, action: &FilterCollection) -> Vec<Arc<dyn ActionFilter>> {
        merge(&self.action, &action.action)
    }

    pub(crate) fn merged_result(&self, action: &FilterCollection) -> Vec<Arc<dyn ResultFilter>> {
        merge(&self.result, &action.result)
    }

    pub(crate) fn merged_exception(&self, action: &FilterCollection) -> Vec<Arc<dyn ExceptionFilter>> {
        merge(&self.exception, &action.exception)
    }
}

/// Global registrations come first, then per-action ones; the stable sort by
/// explicit order keeps that relative order on ties, which yields exactly the
/// required tie-break: scope first, then registration order.
fn merge<F: ?Sized>(global: &[FilterRegistration<F>], action: &[FilterRegistration<F>]) -> Vec<Arc<F>> {
    let mut merged: Vec<&FilterRegistration<F>> = global.iter().chain(action.iter()).collect();
    merged.sort_by_key(|registration| registration.order);
    merged.into_iter().map(|registration| Arc::clone(&registration.filter)).collect()
}
