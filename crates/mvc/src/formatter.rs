//! Output formatters and the negotiation that selects one of them.
//!
//! A formatter declares the media types it can produce and serializes a value
//! into one of them. The registry is an ordered sequence queried, never
//! mutated, during result execution.

mod json;
mod text;

pub use json::JsonOutputFormatter;
pub use text::TextPlainFormatter;

use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use tracing::trace;

use crate::error::ExecuteError;
use crate::media_type::{MediaType, sort_by_quality};

pub trait OutputFormatter: Send + Sync {
    /// Media types this formatter can produce, most specific first.
    fn supported_media_types(&self) -> &[MediaType];

    /// Serializes `value` as `media_type`.
    fn write(&self, value: &Value, media_type: &MediaType) -> Result<Bytes, ExecuteError>;
}

/// Outcome of formatter selection: the chosen formatter and the concrete
/// media type to advertise as the response content type.
pub struct FormatterSelection<'a> {
    pub formatter: &'a dyn OutputFormatter,
    pub media_type: MediaType,
}

/// Selects the formatter that will serialize the response body.
///
/// An empty accept list, or one naming only `*/*`, falls back to the first
/// registered formatter (the default content type policy). Otherwise the
/// accepted media types are sorted by preference; zero-quality entries are
/// explicit rejections and never become candidates, so a list that rejects
/// everything it names selects nothing. For each candidate in order, the
/// first formatter declaring a matching media type wins. `None` is the 406
/// outcome, not an error.
pub fn select_formatter<'a>(
    accepted: &[MediaType],
    formatters: &'a [Arc<dyn OutputFormatter>],
) -> Option<FormatterSelection<'a>> {
    if formatters.is_empty() {
        return None;
    }

    if accepted.is_empty() || accepted.iter().all(MediaType::is_all) {
        let formatter = formatters[0].as_ref();
        let media_type = formatter.supported_media_types().first()?.clone();
        trace!(selected = %media_type, "no usable accept entries, falling back to first formatter");
        return Some(FormatterSelection { formatter, media_type });
    }

    let mut candidates: Vec<MediaType> =
        accepted.iter().filter(|media_type| !media_type.quality().is_zero()).cloned().collect();
    sort_by_quality(&mut candidates);

    for candidate in &candidates {
        for formatter in formatters {
            if let Some(supported) =
                formatter.supported_media_types().iter().find(|supported| supported.matches(candidate))
            {
                trace!(candidate = %candidate, selected = %supported, "negotiated output formatter");
                return Some(FormatterSelection {
                    formatter: formatter.as_ref(),
                    media_type: supported.clone(),
                });
            }
        }
    }

    None
}
