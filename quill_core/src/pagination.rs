use crate::error::ValidationError;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_LIMIT: u64 = 10;

/// A validated, 1-based page request. Used for both post listings and root
/// comment listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl PageRequest {
    pub fn new(page: i64, limit: i64) -> Result<Self, ValidationError> {
        if page < 1 {
            return Err(ValidationError::InvalidPage);
        }
        if limit < 1 {
            return Err(ValidationError::InvalidLimit);
        }
        Ok(Self {
            page: page as u64,
            limit: limit as u64,
        })
    }

    /// Fills omitted values with [`DEFAULT_PAGE`] and [`DEFAULT_LIMIT`] before
    /// validating.
    pub fn from_optional(page: Option<i64>, limit: Option<i64>) -> Result<Self, ValidationError> {
        Self::new(
            page.unwrap_or(DEFAULT_PAGE as i64),
            limit.unwrap_or(DEFAULT_LIMIT as i64),
        )
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }

    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Returns the window of `items` covered by this page. Pages past the end
    /// are empty. `items` must already be in display order.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        let len = items.len();
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX).min(len);
        let end = start
            .saturating_add(usize::try_from(self.limit).unwrap_or(usize::MAX))
            .min(len);
        &items[start..end]
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_positive_values() {
        assert!(matches!(PageRequest::new(0, 10), Err(ValidationError::InvalidPage)));
        assert!(matches!(PageRequest::new(-3, 10), Err(ValidationError::InvalidPage)));
        assert!(matches!(PageRequest::new(1, 0), Err(ValidationError::InvalidLimit)));
        assert!(matches!(PageRequest::new(1, -1), Err(ValidationError::InvalidLimit)));
    }

    #[test]
    fn page_is_checked_before_limit() {
        assert!(matches!(PageRequest::new(0, 0), Err(ValidationError::InvalidPage)));
    }

    #[test]
    fn defaults_apply_to_missing_values() {
        assert_eq!(PageRequest::from_optional(None, None).unwrap(), PageRequest::default());
        let req = PageRequest::from_optional(Some(3), None).unwrap();
        assert_eq!((req.page(), req.limit()), (3, DEFAULT_LIMIT));
        assert!(PageRequest::from_optional(None, Some(0)).is_err());
    }

    #[test]
    fn offset_follows_page_and_limit() {
        assert_eq!(PageRequest::new(1, 10).unwrap().offset(), 0);
        assert_eq!(PageRequest::new(2, 10).unwrap().offset(), 10);
        assert_eq!(PageRequest::new(4, 3).unwrap().offset(), 9);
    }

    #[test]
    fn huge_pages_do_not_overflow() {
        let req = PageRequest::new(i64::MAX, i64::MAX).unwrap();
        assert_eq!(req.offset(), u64::MAX);
        assert!(req.slice(&[1, 2, 3]).is_empty());
    }

    #[test]
    fn slices_partition_the_sequence() {
        let items: Vec<u32> = (0..15).collect();
        let first = PageRequest::new(1, 10).unwrap();
        let second = PageRequest::new(2, 10).unwrap();
        let third = PageRequest::new(3, 10).unwrap();

        assert_eq!(first.slice(&items), &items[..10]);
        assert_eq!(second.slice(&items), &items[10..]);
        assert!(third.slice(&items).is_empty());

        let mut rebuilt = Vec::new();
        for page in 1..=8 {
            rebuilt.extend_from_slice(PageRequest::new(page, 2).unwrap().slice(&items));
        }
        assert_eq!(rebuilt, items);
    }
}
