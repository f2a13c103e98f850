//! Page-request normalization and the canonical paginated response envelope.
//!
//! Every list endpoint in the backend accepts `page`/`pageSize` query
//! parameters and answers with the same envelope shape:
//! `{ "items": [...], "total": n, "page": p, "pageSize": s }`.
//! This crate owns both halves so endpoints cannot drift apart: raw,
//! client-supplied numbers are coerced into a valid [`PageRequest`], and the
//! request is echoed back inside the [`Page`] envelope it produced.
//!
//! Pages are 1-based on the wire. Out-of-range input is coerced rather than
//! rejected: `page <= 0` becomes page 1, and `pageSize` is clamped to the
//! endpoint's configured bounds.

use serde::{Deserialize, Serialize};

/// Per-endpoint pagination bounds.
///
/// ## Invariants
/// - `1 <= default_size <= max_size`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageBounds {
    default_size: u32,
    max_size: u32,
}

/// Errors raised when constructing [`PageBounds`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PageBoundsError {
    /// The default page size was zero or exceeded the maximum.
    #[error("default page size {default_size} must be between 1 and {max_size}")]
    InvalidDefault {
        /// Offending default size.
        default_size: u32,
        /// Configured maximum.
        max_size: u32,
    },
}

impl PageBounds {
    /// Construct bounds, validating that the default fits under the cap.
    pub const fn try_new(default_size: u32, max_size: u32) -> Result<Self, PageBoundsError> {
        if default_size == 0 || default_size > max_size {
            return Err(PageBoundsError::InvalidDefault {
                default_size,
                max_size,
            });
        }
        Ok(Self {
            default_size,
            max_size,
        })
    }

    /// Default page size applied when the client omits `pageSize`.
    pub const fn default_size(self) -> u32 {
        self.default_size
    }

    /// Hard cap applied to client-supplied `pageSize` values.
    pub const fn max_size(self) -> u32 {
        self.max_size
    }
}

/// A normalized, always-valid page request.
///
/// Construct via [`PageRequest::normalize`]; the raw client values never
/// escape into query code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Coerce raw client input into a valid request.
    ///
    /// Missing or non-positive `page` becomes 1. Missing `page_size` takes
    /// the endpoint default; zero or negative becomes 1; values above the
    /// cap are clamped down to it.
    pub fn normalize(page: Option<i64>, page_size: Option<i64>, bounds: PageBounds) -> Self {
        let page = match page {
            Some(p) if p >= 1 => clamp_to_u32(p),
            _ => 1,
        };
        let page_size = match page_size {
            None => bounds.default_size(),
            Some(s) if s < 1 => 1,
            Some(s) => clamp_to_u32(s).min(bounds.max_size()),
        };
        Self { page, page_size }
    }

    /// 1-based page number.
    pub const fn page(self) -> u32 {
        self.page
    }

    /// Effective page size after clamping.
    pub const fn page_size(self) -> u32 {
        self.page_size
    }

    /// Row offset for the underlying query.
    pub const fn offset(self) -> i64 {
        (self.page as i64 - 1) * self.page_size as i64
    }

    /// Row limit for the underlying query.
    pub const fn limit(self) -> i64 {
        self.page_size as i64
    }
}

const fn clamp_to_u32(value: i64) -> u32 {
    if value > u32::MAX as i64 {
        u32::MAX
    } else {
        // Callers guarantee value >= 1 here.
        value as u32
    }
}

/// Canonical paginated response envelope.
///
/// Serializes as `{ "items": [...], "total": n, "page": p, "pageSize": s }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// The rows on this page.
    pub items: Vec<T>,
    /// Total matching rows across all pages.
    pub total: i64,
    /// 1-based page number the request resolved to.
    pub page: u32,
    /// Effective page size after clamping.
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Wrap query results in the envelope for the request that produced them.
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// Convert the item type while preserving the envelope fields.
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            page_size: self.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    fn bounds() -> PageBounds {
        match PageBounds::try_new(10, 100) {
            Ok(b) => b,
            Err(e) => panic!("valid bounds: {e}"),
        }
    }

    #[rstest]
    #[case(None, None, 1, 10)]
    #[case(Some(0), None, 1, 10)]
    #[case(Some(-3), Some(-1), 1, 1)]
    #[case(Some(2), Some(25), 2, 25)]
    #[case(Some(1), Some(1000), 1, 100)]
    #[case(Some(1), Some(100), 1, 100)]
    fn normalize_coerces_raw_input(
        #[case] page: Option<i64>,
        #[case] page_size: Option<i64>,
        #[case] expected_page: u32,
        #[case] expected_size: u32,
    ) {
        let request = PageRequest::normalize(page, page_size, bounds());
        assert_eq!(request.page(), expected_page);
        assert_eq!(request.page_size(), expected_size);
    }

    #[rstest]
    #[case(1, 10, 0)]
    #[case(2, 10, 10)]
    #[case(5, 8, 32)]
    fn offset_is_derived_from_page_and_size(
        #[case] page: i64,
        #[case] size: i64,
        #[case] expected_offset: i64,
    ) {
        let request = PageRequest::normalize(Some(page), Some(size), bounds());
        assert_eq!(request.offset(), expected_offset);
        assert_eq!(request.limit(), size);
    }

    #[rstest]
    #[case(0, 100)]
    #[case(101, 100)]
    fn bounds_reject_invalid_defaults(#[case] default_size: u32, #[case] max_size: u32) {
        let err = match PageBounds::try_new(default_size, max_size) {
            Err(e) => e,
            Ok(_) => panic!("invalid defaults must fail"),
        };
        assert_eq!(
            err,
            PageBoundsError::InvalidDefault {
                default_size,
                max_size
            }
        );
    }

    #[test]
    fn envelope_serializes_camel_case() {
        let request = PageRequest::normalize(Some(2), Some(5), bounds());
        let page = Page::new(vec!["a", "b"], 12, request);
        let json = match serde_json::to_value(&page) {
            Ok(v) => v,
            Err(e) => panic!("serialize envelope: {e}"),
        };
        assert_eq!(json["pageSize"], 5);
        assert_eq!(json["page"], 2);
        assert_eq!(json["total"], 12);
        assert_eq!(json["items"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn map_preserves_envelope_fields() {
        let request = PageRequest::normalize(None, None, bounds());
        let page = Page::new(vec![1_i32, 2, 3], 3, request).map(|n| n * 2);
        assert_eq!(page.items, vec![2, 4, 6]);
        assert_eq!(page.total, 3);
        assert_eq!(page.page, 1);
    }
}
