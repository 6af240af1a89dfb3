use bytes::Bytes;
use serde_json::Value;

use super::OutputFormatter;
use crate::error::ExecuteError;
use crate::media_type::MediaType;

/// Writes values as `text/plain`. Strings are written raw; any other value
/// falls back to its JSON rendering.
pub struct TextPlainFormatter {
    supported: Vec<MediaType>,
}

impl TextPlainFormatter {
    pub fn new() -> Self {
        Self { supported: vec![MediaType::from(mime::TEXT_PLAIN)] }
    }
}

impl Default for TextPlainFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TextPlainFormatter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn write(&self, value: &Value, _media_type: &MediaType) -> Result<Bytes, ExecuteError> {
        let rendered = match value {
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };
        Ok(Bytes::from(rendered))
    }
}
