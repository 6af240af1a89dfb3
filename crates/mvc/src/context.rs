//! Per-request state carried through the filter pipeline.
//!
//! An [`ActionContext`] aggregates the HTTP context, the resolved route data
//! and the descriptor of the matched action. It is owned for the duration of
//! one request, never shared across requests, and mutated by successive
//! pipeline stages.

use http::{HeaderMap, Method, Request, Uri};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::filter::FilterCollection;
use crate::response::ResponseHandle;

/// Resolved route values supplied by the routing collaborator.
pub type RouteData = HashMap<String, String>;

/// The HTTP request/response pair for one request, plus the abort flag the
/// transport collaborator flips when the underlying connection goes away.
#[derive(Debug)]
pub struct HttpContext {
    request: Request<()>,
    response: ResponseHandle,
    aborted: Arc<AtomicBool>,
}

impl HttpContext {
    pub fn new(request: Request<()>) -> Self {
        let aborted = Arc::new(AtomicBool::new(false));
        Self { request, response: ResponseHandle::new(Arc::clone(&aborted)), aborted }
    }

    pub fn request(&self) -> &Request<()> {
        &self.request
    }

    pub fn method(&self) -> &Method {
        self.request.method()
    }

    pub fn uri(&self) -> &Uri {
        self.request.uri()
    }

    pub fn headers(&self) -> &HeaderMap {
        self.request.headers()
    }

    pub fn response(&self) -> &ResponseHandle {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut ResponseHandle {
        &mut self.response
    }

    /// Handle for the transport to signal that the request was aborted.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle { aborted: Arc::clone(&self.aborted) }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::Acquire)
    }

    /// Consumes the context, yielding the response handle for the transport.
    pub fn into_response(self) -> ResponseHandle {
        self.response
    }
}

#[derive(Debug, Clone)]
pub struct AbortHandle {
    aborted: Arc<AtomicBool>,
}

impl AbortHandle {
    pub fn abort(&self) {
        self.aborted.store(true, Ordering::Release);
    }
}

/// Metadata describing the matched action: its name and the filters
/// registered on it. Per-action filters merge with the globally registered
/// ones before the pipeline runs.
pub struct ActionDescriptor {
    name: String,
    filters: FilterCollection,
}

impl ActionDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into(), filters: FilterCollection::new() }
    }

    pub fn with_filters(name: impl Into<String>, filters: FilterCollection) -> Self {
        Self { name: name.into(), filters }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn filters(&self) -> &FilterCollection {
        &self.filters
    }
}

pub struct ActionContext {
    http: HttpContext,
    route_data: RouteData,
    descriptor: ActionDescriptor,
}

impl ActionContext {
    pub fn new(http: HttpContext, route_data: RouteData, descriptor: ActionDescriptor) -> Self {
        Self { http, route_data, descriptor }
    }

    pub fn http(&self) -> &HttpContext {
        &self.http
    }

    pub fn http_mut(&mut self) -> &mut HttpContext {
        &mut self.http
    }

    pub fn route_data(&self) -> &RouteData {
        &self.route_data
    }

    pub fn descriptor(&self) -> &ActionDescriptor {
        &self.descriptor
    }
}
