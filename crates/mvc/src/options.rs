//! Framework configuration.
//!
//! [`MvcOptions`] is built once at startup and shared immutably (usually as
//! `Arc<MvcOptions>`) into every pipeline run, so concurrent requests read
//! the filter and formatter registries without locking.

use std::sync::Arc;

use crate::filter::FilterCollection;
use crate::formatter::{JsonOutputFormatter, OutputFormatter, TextPlainFormatter};

pub struct MvcOptions {
    filters: FilterCollection,
    formatters: Vec<Arc<dyn OutputFormatter>>,
}

impl MvcOptions {
    pub fn builder() -> MvcOptionsBuilder {
        MvcOptionsBuilder::new()
    }

    /// The globally registered filters.
    pub fn filters(&self) -> &FilterCollection {
        &self.filters
    }

    /// The ordered output formatter registry.
    pub fn formatters(&self) -> &[Arc<dyn OutputFormatter>] {
        &self.formatters
    }
}

impl Default for MvcOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

pub struct MvcOptionsBuilder {
    filters: FilterCollection,
    formatters: Vec<Arc<dyn OutputFormatter>>,
}

impl MvcOptionsBuilder {
    fn new() -> Self {
        Self { filters: FilterCollection::new(), formatters: Vec::new() }
    }

    /// Configures the global filter collection.
    pub fn filters(mut self, configure: impl FnOnce(&mut FilterCollection)) -> Self {
        configure(&mut self.filters);
        self
    }

    /// Appends an output formatter; registration order is selection order.
    pub fn formatter<F: OutputFormatter + 'static>(mut self, formatter: F) -> Self {
        self.formatters.push(Arc::new(formatter));
        self
    }

    pub fn build(self) -> MvcOptions {
        let formatters = if self.formatters.is_empty() {
            vec![
                Arc::new(JsonOutputFormatter::new()) as Arc<dyn OutputFormatter>,
                Arc::new(TextPlainFormatter::new()),
            ]
        } else {
            self.formatters
        };
        MvcOptions { filters: self.filters, formatters }
    }
}
