use serde::Serialize;

use crate::codec::{CursorCodec, CursorError};

/// Resolves the effective page size.
///
/// Absent, non-positive, and oversized requests all fall back to the ceiling.
pub fn clamp_limit(requested: Option<i64>, ceiling: i64) -> i64 {
    let ceiling = ceiling.max(1);
    match requested {
        Some(limit) if limit > 0 && limit <= ceiling => limit,
        _ => ceiling,
    }
}

/// A decoded listing request: last-seen id plus effective page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub after_id: i64,
    pub limit: i64,
}

impl PageRequest {
    pub fn new(
        codec: &CursorCodec,
        token: Option<&str>,
        limit: Option<i64>,
        ceiling: i64,
    ) -> Result<Self, CursorError> {
        Ok(Self {
            after_id: codec.decode(token)?,
            limit: clamp_limit(limit, ceiling),
        })
    }

    /// Keyset filter to apply, if any.
    pub fn after(&self) -> Option<i64> {
        (self.after_id > 0).then_some(self.after_id)
    }

    /// Rows to ask storage for. The extra row signals that another page exists.
    pub fn fetch_limit(&self) -> i64 {
        self.limit + 1
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

impl<T> Page<T> {
    /// Builds a page from up to `limit + 1` rows fetched in listing order.
    pub fn from_rows<F>(mut rows: Vec<T>, limit: i64, codec: &CursorCodec, id_of: F) -> Self
    where
        F: Fn(&T) -> i64,
    {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        let next_page_token = if rows.len() > limit {
            rows.truncate(limit);
            rows.last().and_then(|row| codec.encode(id_of(row)))
        } else {
            None
        };

        Self {
            items: rows,
            next_page_token,
        }
    }

    /// A page with no continuation.
    pub fn complete(items: Vec<T>) -> Self {
        Self {
            items,
            next_page_token: None,
        }
    }

    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            items: self.items.into_iter().map(f).collect(),
            next_page_token: self.next_page_token,
        }
    }
}
