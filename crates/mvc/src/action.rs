use async_trait::async_trait;
use futures::future::BoxFuture;

use crate::binder::Arguments;
use crate::context::ActionContext;
use crate::error::BoxError;
use crate::result::ActionResult;

/// The application-supplied handler the route resolved to.
#[async_trait]
pub trait Action: Send + Sync {
    async fn invoke(
        &self,
        ctx: &mut ActionContext,
        arguments: Arguments,
    ) -> Result<ActionResult, BoxError>;
}

/// A holder turning any async fn into an [`Action`].
pub struct FnAction<F> {
    f: F,
}

pub fn action_fn<F>(f: F) -> FnAction<F>
where
    F: for<'a> Fn(&'a mut ActionContext, Arguments) -> BoxFuture<'a, Result<ActionResult, BoxError>>
        + Send
        + Sync,
{
    FnAction { f }
}

#[async_trait]
impl<F> Action for FnAction<F>
where
    F: for<'a> Fn(&'a mut ActionContext, Arguments) -> BoxFuture<'a, Result<ActionResult, BoxError>>
        + Send
        + Sync,
{
    async fn invoke(
        &self,
        ctx: &mut ActionContext,
        arguments: Arguments,
    ) -> Result<ActionResult, BoxError> {
        (self.f)(ctx, arguments).await
    }
}
