use async_trait::async_trait;
use http::{Request, StatusCode, header};
use micro_mvc::error::BoxError;
use micro_mvc::filter::{
    ActionExecutingContext, ActionFilter, AuthorizationContext, AuthorizationFilter,
};
use micro_mvc::{
    Action, ActionContext, ActionDescriptor, ActionInvoker, ActionResult, Arguments, HttpContext,
    MvcOptions, RouteData, UrlGenerator,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
struct User {
    name: String,
    zip: String,
}

struct GetUser;

#[async_trait]
impl Action for GetUser {
    async fn invoke(
        &self,
        _ctx: &mut ActionContext,
        arguments: Arguments,
    ) -> Result<ActionResult, BoxError> {
        let name =
            arguments.get("name").and_then(|value| value.as_str()).unwrap_or("anonymous").to_string();
        Ok(ActionResult::object(User { name, zip: "200433".to_string() })?)
    }
}

struct RequireApiKey;

#[async_trait]
impl AuthorizationFilter for RequireApiKey {
    async fn on_authorization(&self, ctx: &mut AuthorizationContext<'_>) {
        if !ctx.action.http().headers().contains_key("x-api-key") {
            ctx.result = Some(ActionResult::status(StatusCode::UNAUTHORIZED));
        }
    }
}

struct LogAction;

#[async_trait]
impl ActionFilter for LogAction {
    async fn on_action_executing(&self, ctx: &mut ActionExecutingContext<'_>) {
        println!(
            "invoking {} with {} argument(s)",
            ctx.action.descriptor().name(),
            ctx.arguments.len()
        );
    }
}

struct StaticRoutes;

impl UrlGenerator for StaticRoutes {
    fn generate_url(&self, route_name: Option<&str>, _values: &RouteData) -> Option<String> {
        route_name.map(|name| format!("/{name}"))
    }
}

#[tokio::main]
async fn main() {
    let options = Arc::new(
        MvcOptions::builder()
            .filters(|filters| {
                filters.add_authorization(RequireApiKey).add_action(LogAction);
            })
            .build(),
    );
    let invoker = ActionInvoker::new(options, Arc::new(StaticRoutes));

    let request = Request::builder()
        .uri("/users/alice")
        .header("x-api-key", "demo")
        .header(header::ACCEPT, "application/json")
        .body(())
        .unwrap();
    let mut route_data = RouteData::new();
    route_data.insert("name".to_string(), "alice".to_string());
    let mut ctx =
        ActionContext::new(HttpContext::new(request), route_data, ActionDescriptor::new("get_user"));

    invoker.invoke(&mut ctx, &GetUser).await.unwrap();

    let response = ctx.http().response();
    println!("status: {}", response.status());
    println!("content-type: {:?}", response.headers().get(header::CONTENT_TYPE));
    if let Some(body) = response.body() {
        println!("body: {}", String::from_utf8_lossy(body));
    }
}
