//! Page arithmetic and the paginated response envelope.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A resolved page window. `page` and `limit` are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
    pub skip: u64,
}

impl PageRequest {
    /// Resolves raw `page` and `limit` values.
    ///
    /// Each value goes through [`parse_leading_int`]; a failed parse or a result below 1
    /// falls back to the default. `limit` is then clamped to `max_limit`.
    pub fn resolve(page: Option<&str>, limit: Option<&str>, max_limit: u64) -> Self {
        let page = positive_or(page, DEFAULT_PAGE);
        let limit = positive_or(limit, DEFAULT_LIMIT).min(max_limit.max(1));

        Self {
            page,
            limit,
            skip: (page - 1).saturating_mul(limit),
        }
    }
}

fn positive_or(raw: Option<&str>, default: u64) -> u64 {
    raw.and_then(parse_leading_int)
        .filter(|value| *value > 0)
        .and_then(|value| u64::try_from(value).ok())
        .unwrap_or(default)
}

/// Reads a base-10 integer prefix: optional surrounding whitespace, an optional sign,
/// then digits. Anything after the digits is ignored, so `"12abc"` reads as 12 and
/// `"3.9"` as 3. Returns `None` when there are no digits; a value too large for
/// `i64` saturates.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    if digits_end == 0 {
        return None;
    }

    let value = match rest[..digits_end].parse::<i64>() {
        Ok(magnitude) if negative => -magnitude,
        Ok(magnitude) => magnitude,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    };
    Some(value)
}

/// Pagination metadata returned next to every listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

/// The listing envelope: `{success, data, pagination}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub success: bool,
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    /// Wraps a fetched page and the total number of matches.
    pub fn assemble(items: Vec<T>, total: u64, request: &PageRequest) -> Self {
        debug_assert!(items.len() as u64 <= request.limit);

        Self {
            success: true,
            data: items,
            pagination: Pagination {
                total,
                page: request.page,
                limit: request.limit,
                total_pages: total.div_ceil(request.limit),
            },
        }
    }
}
