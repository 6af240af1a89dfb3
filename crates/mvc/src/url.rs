use crate::context::RouteData;

/// URL generation capability supplied by the routing collaborator.
pub trait UrlGenerator: Send + Sync {
    /// Resolves `route_name` plus `values` to a URL, `None` when no route
    /// matches the supplied values.
    fn generate_url(&self, route_name: Option<&str>, values: &RouteData) -> Option<String>;
}
