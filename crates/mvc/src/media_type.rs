//! Media type model used for content negotiation.
//!
//! A [`MediaType`] is parsed once from a raw `Accept` or `Content-Type` token
//! and is immutable afterwards. The `q` parameter is extracted into a
//! [`Quality`] value and removed from the general parameter set.

mod comparer;

pub use comparer::{MediaTypeComparer, sort_by_quality};

use http::{HeaderMap, header};
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// The wildcard token for a type or subtype.
pub const WILDCARD: &str = "*";

#[derive(Debug, Error)]
pub enum FormatError {
    #[error("invalid media type '{token}': missing '/' separator")]
    MissingSlash { token: String },

    #[error("invalid media type parameter '{parameter}'")]
    InvalidParameter { parameter: String },

    #[error("invalid quality value '{value}': must be a decimal in [0, 1]")]
    InvalidQuality { value: String },
}

impl FormatError {
    pub fn missing_slash<S: ToString>(token: S) -> Self {
        Self::MissingSlash { token: token.to_string() }
    }

    pub fn invalid_parameter<S: ToString>(parameter: S) -> Self {
        Self::InvalidParameter { parameter: parameter.to_string() }
    }

    pub fn invalid_quality<S: ToString>(value: S) -> Self {
        Self::InvalidQuality { value: value.to_string() }
    }
}

/// Quality factor in thousandths, so ordering and equality stay exact.
///
/// `q` values carry at most three decimals, so `0..=1000` covers the full
/// range without floating point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Quality(u16);

impl Quality {
    pub const MAX: Quality = Quality(1000);
    pub const ZERO: Quality = Quality(0);

    pub fn from_thousandths(value: u16) -> Option<Self> {
        (value <= 1000).then_some(Self(value))
    }

    pub fn as_thousandths(self) -> u16 {
        self.0
    }

    /// A quality of exactly 0 means "explicitly rejected" by the caller.
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    fn parse(value: &str) -> Result<Self, FormatError> {
        let (integer, fraction) = match value.split_once('.') {
            Some((integer, fraction)) => (integer, fraction),
            None => (value, ""),
        };

        if fraction.len() > 3 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return Err(FormatError::invalid_quality(value));
        }

        let mut fraction_thousandths = if fraction.is_empty() {
            0
        } else {
            fraction.parse::<u16>().map_err(|_| FormatError::invalid_quality(value))?
        };
        for _ in fraction.len()..3 {
            fraction_thousandths *= 10;
        }

        let thousandths = match integer {
            "0" => fraction_thousandths,
            "1" => 1000 + fraction_thousandths,
            _ => return Err(FormatError::invalid_quality(value)),
        };

        Self::from_thousandths(thousandths).ok_or_else(|| FormatError::invalid_quality(value))
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::MAX
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 1000 {
            return f.write_str("1");
        }
        let mut rendered = format!("0.{:03}", self.0);
        while rendered.ends_with('0') {
            rendered.pop();
        }
        if rendered.ends_with('.') {
            rendered.pop();
        }
        f.write_str(&rendered)
    }
}

/// A structured media type: type, subtype, ordered parameters and quality.
#[derive(Debug, Clone)]
pub struct MediaType {
    type_: String,
    subtype: String,
    parameters: Vec<(String, String)>,
    quality: Quality,
}

impl MediaType {
    pub fn new(type_: impl Into<String>, subtype: impl Into<String>) -> Self {
        Self { type_: type_.into(), subtype: subtype.into(), parameters: Vec::new(), quality: Quality::MAX }
    }

    /// Parses a raw media type token like `text/plain; charset=utf-8; q=0.8`.
    ///
    /// Fails when the token lacks a `/` separator, when a parameter lacks `=`,
    /// or when the quality value is not a decimal in `[0, 1]`.
    pub fn parse(token: &str) -> Result<Self, FormatError> {
        let mut segments = token.split(';');

        // split always yields at least one segment
        let full_type = segments.next().unwrap_or_default().trim();
        let (type_, subtype) =
            full_type.split_once('/').ok_or_else(|| FormatError::missing_slash(token))?;
        let type_ = type_.trim().to_ascii_lowercase();
        let subtype = subtype.trim().to_ascii_lowercase();
        if type_.is_empty() || subtype.is_empty() {
            return Err(FormatError::missing_slash(token));
        }

        let mut parameters = Vec::new();
        let mut quality = Quality::default();
        for segment in segments {
            let segment = segment.trim();
            let (name, value) =
                segment.split_once('=').ok_or_else(|| FormatError::invalid_parameter(segment))?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim().trim_matches('"').to_string();
            if name.is_empty() {
                return Err(FormatError::invalid_parameter(segment));
            }
            if name == "q" {
                quality = Quality::parse(&value)?;
            } else {
                parameters.push((name, value));
            }
        }

        Ok(Self { type_, subtype, parameters, quality })
    }

    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    pub fn type_(&self) -> &str {
        &self.type_
    }

    pub fn subtype(&self) -> &str {
        &self.subtype
    }

    pub fn quality(&self) -> Quality {
        self.quality
    }

    /// Parameters in insertion order, quality excluded.
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.iter().find(|(n, _)| n == name).map(|(_, v)| v.as_str())
    }

    /// True for `*/*`.
    pub fn is_all(&self) -> bool {
        self.type_ == WILDCARD && self.subtype == WILDCARD
    }

    /// Wildcard-aware compatibility check, parameters ignored.
    pub fn matches(&self, other: &MediaType) -> bool {
        let type_matches =
            self.type_ == WILDCARD || other.type_ == WILDCARD || self.type_ == other.type_;
        let subtype_matches =
            self.subtype == WILDCARD || other.subtype == WILDCARD || self.subtype == other.subtype;
        type_matches && subtype_matches
    }

    /// `*/*` < `type/*` < `type/subtype`.
    pub fn specificity(&self) -> u8 {
        match (self.type_.as_str(), self.subtype.as_str()) {
            (WILDCARD, _) => 0,
            (_, WILDCARD) => 1,
            _ => 2,
        }
    }
}

/// Equality is exact: same type, subtype, quality and parameter set,
/// parameter order not significant.
impl PartialEq for MediaType {
    fn eq(&self, other: &Self) -> bool {
        self.type_ == other.type_
            && self.subtype == other.subtype
            && self.quality == other.quality
            && self.parameters.len() == other.parameters.len()
            && self.parameters.iter().all(|(name, value)| other.parameter(name) == Some(value))
    }
}

impl Eq for MediaType {}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_, self.subtype)?;
        for (name, value) in &self.parameters {
            write!(f, "; {name}={value}")?;
        }
        if self.quality != Quality::MAX {
            write!(f, "; q={}", self.quality)?;
        }
        Ok(())
    }
}

impl From<mime::Mime> for MediaType {
    fn from(mime: mime::Mime) -> Self {
        // mime constants are always well formed
        Self::parse(mime.as_ref()).expect("valid mime constant")
    }
}

/// Parsed `Accept` header: the accepted media types in header order.
///
/// Parsing here is lenient: malformed tokens are skipped, matching how the
/// request path treats a broken `Accept` header. [`MediaType::parse`] stays
/// strict for callers that need per-token errors.
#[derive(Debug, Clone, Default)]
pub struct AcceptHeader {
    media_types: Vec<MediaType>,
}

impl AcceptHeader {
    pub fn parse(header: &str) -> Self {
        let media_types = header
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .filter_map(|token| match MediaType::parse(token) {
                Ok(media_type) => Some(media_type),
                Err(e) => {
                    trace!(token, cause = %e, "skipping malformed accept token");
                    None
                }
            })
            .collect();
        Self { media_types }
    }

    /// Reads and parses the `Accept` header from a header map, empty when absent.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        headers
            .get(header::ACCEPT)
            .and_then(|value| value.to_str().ok())
            .map(Self::parse)
            .unwrap_or_default()
    }

    pub fn media_types(&self) -> &[MediaType] {
        &self.media_types
    }

    pub fn is_empty(&self) -> bool {
        self.media_types.is_empty()
    }
}
