//! The filter pipeline executor.
//!
//! One pipeline run walks the stages in order, sequentially within the
//! request's task:
//!
//! ```text
//! authorization -> resource(before) -> model binding -> action(before)
//!   -> action invocation -> action(after) -> result(before)
//!   -> result execution -> result(after) -> resource(after)
//! ```
//!
//! with a parallel exception stage that activates whenever an unhandled fault
//! escapes model binding, action invocation or result execution. Before/after
//! pairs run as nested scopes: "after" hooks fire in reverse order, and a
//! filter whose "before" hook never ran (because an earlier filter
//! short-circuited) is skipped entirely, including its "after" hook.
//!
//! The executor is a small interpreter over the merged filter lists, tracking
//! a short-circuit slot and an active-exception slot; it never interleaves
//! two stages of the same request across await points.

use std::sync::Arc;
use tracing::{debug, error, trace};

use crate::action::Action;
use crate::binder::{ModelBinder, RouteValueBinder};
use crate::context::ActionContext;
use crate::error::{BoxError, ExecuteError, PipelineError};
use crate::filter::{
    ActionExecutedContext, ActionExecutingContext, ActionFilter, AuthorizationContext,
    ExceptionContext, ExceptionFilter, ResourceExecutedContext, ResourceExecutingContext,
    ResourceFilter, ResultExecutedContext, ResultExecutingContext, ResultFilter,
};
use crate::options::MvcOptions;
use crate::result::{ActionResult, ResultServices};
use crate::url::UrlGenerator;

/// Terminal state of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The response was written (or deliberately left at its defaults) with
    /// no unhandled fault.
    Completed,
    /// The transport aborted the request; remaining stages were abandoned and
    /// no response write was attempted.
    Aborted,
}

/// Drives one action through the filter pipeline.
///
/// The invoker itself is immutable and shared across requests; all mutable
/// state lives in the per-request [`ActionContext`].
pub struct ActionInvoker {
    options: Arc<MvcOptions>,
    binder: Arc<dyn ModelBinder>,
    url_generator: Arc<dyn UrlGenerator>,
}

impl ActionInvoker {
    pub fn new(options: Arc<MvcOptions>, url_generator: Arc<dyn UrlGenerator>) -> Self {
        Self { options, binder: Arc::new(RouteValueBinder), url_generator }
    }

    pub fn with_binder(mut self, binder: Arc<dyn ModelBinder>) -> Self {
        self.binder = binder;
        self
    }

    /// Runs the full pipeline for `action` against `ctx`.
    ///
    /// Returns the terminal state, or the fault that propagated past every
    /// exception filter.
    pub async fn invoke(
        &self,
        ctx: &mut ActionContext,
        action: &dyn Action,
    ) -> Result<PipelineOutcome, PipelineError> {
        let global = self.options.filters();
        let authorization = global.merged_authorization(ctx.descriptor().filters());
        let resource = global.merged_resource(ctx.descriptor().filters());
        let action_filters = global.merged_action(ctx.descriptor().filters());
        let result_filters = global.merged_result(ctx.descriptor().filters());
        let exception_filters = global.merged_exception(ctx.descriptor().filters());

        trace!(action = ctx.descriptor().name(), "pipeline starting");

        for filter in &authorization {
            if ctx.http().is_aborted() {
                return Ok(self.abandon());
            }
            let mut auth_ctx = AuthorizationContext { action: &mut *ctx, result: None };
            filter.on_authorization(&mut auth_ctx).await;
            let result = auth_ctx.result;
            if let Some(result) = result {
                debug!("authorization filter attached a result, short-circuiting");
                return self.finish_with_result(ctx, result);
            }
        }

        let mut resource_ran: Vec<Arc<dyn ResourceFilter>> = Vec::new();
        let mut resource_result: Option<ActionResult> = None;
        for filter in &resource {
            if ctx.http().is_aborted() {
                return Ok(self.abandon());
            }
            let mut executing = ResourceExecutingContext { action: &mut *ctx, result: None };
            filter.on_resource_executing(&mut executing).await;
            let result = executing.result;
            if let Some(result) = result {
                debug!("resource filter short-circuited the pipeline");
                resource_result = Some(result);
                break;
            }
            resource_ran.push(Arc::clone(filter));
        }

        let canceled = resource_result.is_some();
        let inner = match resource_result {
            Some(result) => self.finish_with_result(ctx, result),
            None => {
                self.invoke_inner(ctx, action, &action_filters, &result_filters, &exception_filters)
                    .await
            }
        };
        if let Ok(PipelineOutcome::Aborted) = inner {
            return Ok(PipelineOutcome::Aborted);
        }

        // started resource filters unwind even when the wrapped stages
        // propagate a fault; the nested-scope rule is the same as for action
        // and result filters
        for filter in resource_ran.iter().rev() {
            let mut executed = ResourceExecutedContext { action: &mut *ctx, canceled };
            filter.on_resource_executed(&mut executed).await;
        }

        if inner.is_ok() {
            trace!("pipeline completed");
        }
        inner
    }

    /// The stages wrapped by resource filters: binding, action filters around
    /// the action, the exception stage, and result filters around result
    /// execution.
    async fn invoke_inner(
        &self,
        ctx: &mut ActionContext,
        action: &dyn Action,
        action_filters: &[Arc<dyn ActionFilter>],
        result_filters: &[Arc<dyn ResultFilter>],
        exception_filters: &[Arc<dyn ExceptionFilter>],
    ) -> Result<PipelineOutcome, PipelineError> {
        if ctx.http().is_aborted() {
            return Ok(self.abandon());
        }

        let mut arguments = match self.binder.bind(ctx).await {
            Ok(arguments) => arguments,
            Err(fault) => {
                error!(cause = %fault, "model binding faulted");
                return self.run_exception_stage(ctx, fault, exception_filters).await;
            }
        };

        let mut ran: Vec<Arc<dyn ActionFilter>> = Vec::new();
        let mut canceled = false;
        let mut result: Option<ActionResult> = None;
        for filter in action_filters {
            if ctx.http().is_aborted() {
                return Ok(self.abandon());
            }
            let mut executing =
                ActionExecutingContext { action: &mut *ctx, arguments: &mut arguments, result: None };
            filter.on_action_executing(&mut executing).await;
            let early = executing.result;
            if let Some(early) = early {
                debug!("action filter short-circuited action invocation");
                result = Some(early);
                canceled = true;
                break;
            }
            ran.push(Arc::clone(filter));
        }

        let mut fault: Option<BoxError> = None;
        if !canceled {
            if ctx.http().is_aborted() {
                return Ok(self.abandon());
            }
            match action.invoke(ctx, arguments).await {
                Ok(produced) => result = Some(produced),
                Err(e) => {
                    error!(cause = %e, "action invocation faulted");
                    fault = Some(e);
                }
            }
        }

        // after hooks, innermost (last started) first
        for filter in ran.iter().rev() {
            let mut executed = ActionExecutedContext {
                action: &mut *ctx,
                canceled,
                exception: fault.take(),
                exception_handled: false,
                result: result.take(),
            };
            filter.on_action_executed(&mut executed).await;
            let ActionExecutedContext { exception, exception_handled, result: kept, .. } = executed;
            fault = if exception_handled { None } else { exception };
            result = kept;
        }

        if let Some(fault) = fault {
            return self.run_exception_stage(ctx, fault, exception_filters).await;
        }

        let Some(result) = result else {
            trace!("no result attached, leaving the response at its defaults");
            return Ok(PipelineOutcome::Completed);
        };

        let mut ran: Vec<Arc<dyn ResultFilter>> = Vec::new();
        let mut canceled = false;
        let mut current = result;
        for filter in result_filters {
            if ctx.http().is_aborted() {
                return Ok(self.abandon());
            }
            let mut executing =
                ResultExecutingContext { action: &mut *ctx, result: current, cancel: false };
            filter.on_result_executing(&mut executing).await;
            let ResultExecutingContext { result: next, cancel, .. } = executing;
            current = next;
            if cancel {
                debug!("result filter canceled result execution");
                canceled = true;
                break;
            }
            ran.push(Arc::clone(filter));
        }

        let mut fault: Option<BoxError> = None;
        if !canceled {
            if ctx.http().is_aborted() {
                return Ok(self.abandon());
            }
            match self.execute_result(ctx, current) {
                Ok(()) => {}
                Err(ExecuteError::Aborted) => return Ok(self.abandon()),
                Err(e) => {
                    error!(cause = %e, "result execution faulted");
                    fault = Some(Box::new(e));
                }
            }
        }

        for filter in ran.iter().rev() {
            let mut executed = ResultExecutedContext {
                action: &mut *ctx,
                canceled,
                exception: fault.take(),
                exception_handled: false,
            };
            filter.on_result_executed(&mut executed).await;
            let ResultExecutedContext { exception, exception_handled, .. } = executed;
            fault = if exception_handled { None } else { exception };
        }

        if let Some(fault) = fault {
            return self.run_exception_stage(ctx, fault, exception_filters).await;
        }

        Ok(PipelineOutcome::Completed)
    }

    /// Walks exception filters innermost-out. A filter that marks the fault
    /// handled may attach a substitute result; execution then resumes at
    /// result execution. An unhandled fault propagates unchanged.
    async fn run_exception_stage(
        &self,
        ctx: &mut ActionContext,
        fault: BoxError,
        exception_filters: &[Arc<dyn ExceptionFilter>],
    ) -> Result<PipelineOutcome, PipelineError> {
        let mut exception_ctx =
            ExceptionContext { action: &mut *ctx, exception: fault, handled: false, result: None };
        for filter in exception_filters.iter().rev() {
            filter.on_exception(&mut exception_ctx).await;
            if exception_ctx.handled {
                break;
            }
        }

        let ExceptionContext { exception, handled, result, .. } = exception_ctx;
        if handled {
            debug!("exception filter handled the fault");
            match result {
                Some(result) => self.finish_with_result(ctx, result),
                None => Ok(PipelineOutcome::Completed),
            }
        } else {
            error!(cause = %exception, "fault propagating past the pipeline");
            Err(PipelineError::Unhandled(exception))
        }
    }

    fn finish_with_result(
        &self,
        ctx: &mut ActionContext,
        result: ActionResult,
    ) -> Result<PipelineOutcome, PipelineError> {
        match self.execute_result(ctx, result) {
            Ok(()) => Ok(PipelineOutcome::Completed),
            Err(ExecuteError::Aborted) => Ok(self.abandon()),
            Err(e) => Err(PipelineError::from(e)),
        }
    }

    fn execute_result(&self, ctx: &mut ActionContext, result: ActionResult) -> Result<(), ExecuteError> {
        let services = ResultServices::new(self.options.formatters(), self.url_generator.as_ref());
        result.execute(ctx, &services)
    }

    fn abandon(&self) -> PipelineOutcome {
        debug!("request aborted, abandoning remaining pipeline stages");
        PipelineOutcome::Aborted
    }
}
