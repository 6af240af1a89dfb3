//! Model binding seam.
//!
//! The full binding ecosystem (query strings, form fields, file uploads,
//! typed conversion) is an external collaborator; the pipeline only needs the
//! seam plus a trivial default that lifts route values into arguments.

use async_trait::async_trait;
use serde_json::Value;

use crate::context::ActionContext;
use crate::error::BoxError;

/// Arguments bound for one action invocation, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Arguments {
    values: Vec<(String, Value)>,
}

impl Arguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.values.push((name.into(), value));
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.iter().find(|(n, _)| n == name).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelBinder: Send + Sync {
    async fn bind(&self, ctx: &ActionContext) -> Result<Arguments, BoxError>;
}

/// Default binder: every resolved route value becomes a string argument.
#[derive(Debug, Default)]
pub struct RouteValueBinder;

#[async_trait]
impl ModelBinder for RouteValueBinder {
    async fn bind(&self, ctx: &ActionContext) -> Result<Arguments, BoxError> {
        let mut arguments = Arguments::new();
        for (name, value) in ctx.route_data() {
            arguments.insert(name.clone(), Value::String(value.clone()));
        }
        Ok(arguments)
    }
}
