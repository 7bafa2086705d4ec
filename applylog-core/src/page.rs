//! Offset/limit pagination parameters for list queries.

use serde::{Deserialize, Serialize};

use crate::error::{ApplicationError, ApplicationResult};

/// Number of records returned when the caller does not ask for a limit.
pub const DEFAULT_LIMIT: u64 = 100;

/// Largest `skip` or `limit` a store accepts; MongoDB encodes both as signed 64-bit.
pub const MAX_OFFSET: u64 = i64::MAX as u64;

/// Parameters for paging through a list of records.
///
/// # Example
///
/// ```ignore
/// use applylog_core::page::PageParams;
///
/// let page = PageParams::builder().with_skip(20).with_limit(10).build();
/// assert_eq!(page.skip, 20);
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// Number of records to skip.
    pub skip: u64,
    /// Maximum number of records to return.
    pub limit: u64,
}

impl PageParams {
    /// Creates new pagination parameters.
    pub fn new(skip: u64, limit: u64) -> Self {
        Self { skip, limit }
    }

    /// Creates a new builder for constructing pagination parameters.
    pub fn builder() -> PageParamsBuilder {
        PageParamsBuilder::new()
    }

    /// Checks that `limit` lies in `1..=max_limit` and `skip` in `0..=MAX_OFFSET`.
    ///
    /// A zero limit is rejected because document stores read it as "no limit".
    pub fn validate(&self, max_limit: u64) -> ApplicationResult<()> {
        if self.skip > MAX_OFFSET {
            return Err(ApplicationError::Validation(format!(
                "skip must be at most {MAX_OFFSET}, got {}",
                self.skip
            )));
        }
        let max_limit = max_limit.min(MAX_OFFSET);
        if self.limit == 0 || self.limit > max_limit {
            return Err(ApplicationError::Validation(format!(
                "limit must be between 1 and {max_limit}, got {}",
                self.limit
            )));
        }

        Ok(())
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self { skip: 0, limit: DEFAULT_LIMIT }
    }
}

/// Builder for [`PageParams`]; unset values fall back to skip=0, limit=100.
#[derive(Debug, Default)]
pub struct PageParamsBuilder {
    skip: Option<u64>,
    limit: Option<u64>,
}

impl PageParamsBuilder {
    /// Creates a new builder with no parameters set.
    pub fn new() -> Self {
        Self { skip: None, limit: None }
    }

    /// Sets the number of records to skip.
    pub fn with_skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Sets the maximum number of records to return.
    pub fn with_limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Builds and returns the [`PageParams`].
    pub fn build(self) -> PageParams {
        PageParams {
            skip: self.skip.unwrap_or(0),
            limit: self.limit.unwrap_or(DEFAULT_LIMIT),
        }
    }
}
