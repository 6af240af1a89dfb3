//! Ordering of media types by preference for content negotiation.

use super::MediaType;
use std::cmp::Ordering;

/// Compares media types by negotiation preference: higher quality first, then
/// higher specificity, then more explicit parameters.
///
/// `compare` returns `Greater` when `left` is preferred over `right`, so a
/// descending stable sort yields the negotiation order. Equal elements carry
/// no further preference; a stable sort must keep their input order.
#[derive(Debug, Clone, Copy, Default)]
pub struct MediaTypeComparer;

impl MediaTypeComparer {
    pub fn quality() -> Self {
        Self
    }

    /// Three-key lexicographic compare: quality, specificity, parameter count.
    ///
    /// A quality of exactly 0 sorts after every positive value but stays a
    /// valid position in the ordering; callers decide whether to drop
    /// zero-quality entries.
    pub fn compare(&self, left: &MediaType, right: &MediaType) -> Ordering {
        left.quality()
            .cmp(&right.quality())
            .then_with(|| left.specificity().cmp(&right.specificity()))
            .then_with(|| left.parameters().len().cmp(&right.parameters().len()))
    }
}

/// Sorts media types most preferred first.
///
/// The sort is stable and idempotent: equal elements keep their relative input
/// order, and sorting an already sorted sequence reproduces it exactly.
pub fn sort_by_quality(media_types: &mut [MediaType]) {
    let comparer = MediaTypeComparer::quality();
    media_types.sort_by(|left, right| comparer.compare(right, left));
}
