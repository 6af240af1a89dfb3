use bytes::Bytes;
use serde_json::Value;

use super::OutputFormatter;
use crate::error::ExecuteError;
use crate::media_type::MediaType;

/// Writes values as `application/json`.
pub struct JsonOutputFormatter {
    supported: Vec<MediaType>,
}

impl JsonOutputFormatter {
    pub fn new() -> Self {
        Self { supported: vec![MediaType::from(mime::APPLICATION_JSON)] }
    }
}

impl Default for JsonOutputFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutputFormatter {
    fn supported_media_types(&self) -> &[MediaType] {
        &self.supported
    }

    fn write(&self, value: &Value, _media_type: &MediaType) -> Result<Bytes, ExecuteError> {
        let body = serde_json::to_vec(value)?;
        Ok(Bytes::from(body))
    }
}
