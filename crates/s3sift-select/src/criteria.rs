//! Filter criteria for selecting JSON records.
//!
//! A [`FilterCriteria`] bundles the four optional filters a user may supply.
//! Every field is independent; whatever is set gets conjoined into the
//! query built by [`QueryBuilder`](crate::query::QueryBuilder).

/// User-supplied filters for one select operation.
///
/// Unset fields contribute nothing to the query. The setters normalise the
/// "unset" sentinels used on the command line (an id of `0`, an empty
/// string) to `None`, so a default-constructed value selects every record.
///
/// # Examples
///
/// ```
/// use s3sift_select::criteria::FilterCriteria;
///
/// let criteria = FilterCriteria::new()
///     .with_id(42)
///     .with_word("error");
///
/// assert_eq!(criteria.id, Some(42));
/// assert!(criteria.from_time.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    /// Select records whose `id` equals this value.
    pub id: Option<i64>,

    /// Select records whose `time` is at or after this RFC3339 timestamp.
    pub from_time: Option<String>,

    /// Select records whose `time` is at or before this RFC3339 timestamp.
    pub to_time: Option<String>,

    /// Select records whose `words` collection contains this word.
    pub word: Option<String>,
}

impl FilterCriteria {
    /// Creates criteria with no filters set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the id filter. An id of `0` leaves the filter unset.
    #[must_use]
    pub fn with_id(mut self, id: i64) -> Self {
        self.id = (id != 0).then_some(id);
        self
    }

    /// Sets the lower time bound. An empty string leaves the filter unset.
    #[must_use]
    pub fn with_from_time(mut self, from_time: impl Into<String>) -> Self {
        self.from_time = non_empty(from_time.into());
        self
    }

    /// Sets the upper time bound. An empty string leaves the filter unset.
    #[must_use]
    pub fn with_to_time(mut self, to_time: impl Into<String>) -> Self {
        self.to_time = non_empty(to_time.into());
        self
    }

    /// Sets the word filter. An empty string leaves the filter unset.
    #[must_use]
    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.word = non_empty(word.into());
        self
    }

    /// Returns `true` if no filter is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.from_time.is_none()
            && self.to_time.is_none()
            && self.word.is_none()
    }
}

fn non_empty(value: String) -> Option<String> {
    (!value.is_empty()).then_some(value)
}
