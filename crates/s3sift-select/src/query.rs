//! S3 Select query construction.
//!
//! Translates [`FilterCriteria`] into a single SQL expression over the
//! `S3Object` record stream. The projection is fixed to the three fields
//! the tool understands (`id`, `time`, `words`); each set criterion adds one
//! predicate.
//!
//! Predicates are collected into an ordered list first and only joined when
//! the query is built, so the first one is always introduced by `WHERE` and
//! every later one by `AND`, whatever order they were pushed in.

use std::fmt;

use chrono::DateTime;

use crate::criteria::FilterCriteria;
use crate::error::{Error, Result, TimestampError};

/// Fixed projection clause shared by every query.
pub const BASE_CLAUSE: &str = r#"SELECT s.id, s."time", s.words FROM S3Object s"#;

/// Keyword introducing the first predicate.
pub const WHERE_KEYWORD: &str = "WHERE";

/// Keyword joining subsequent predicates.
pub const AND_KEYWORD: &str = "AND";

/// Flag name reported when the lower time bound fails validation.
pub const FROM_TIME_FLAG: &str = "--from-time";

/// Flag name reported when the upper time bound fails validation.
pub const TO_TIME_FLAG: &str = "--to-time";

/// Validates that `value` is an RFC3339 timestamp.
///
/// The accepted form is `YYYY-MM-DDTHH:MM:SS[.fraction]` followed by `Z` or a
/// `+hh:mm`/`-hh:mm` offset. The `T` and `Z` must be uppercase and the seconds
/// field must not be `60`.
///
/// `flag` names the command-line flag the value came from and is carried in
/// the error so the user can tell which input was rejected.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if `value` does not parse.
///
/// # Examples
///
/// ```
/// use s3sift_select::query::{validate_timestamp, FROM_TIME_FLAG};
///
/// assert!(validate_timestamp(FROM_TIME_FLAG, "2024-03-01T12:00:00Z").is_ok());
/// assert!(validate_timestamp(FROM_TIME_FLAG, "2024-03-01 12:00:00Z").is_err());
/// assert!(validate_timestamp(FROM_TIME_FLAG, "yesterday").is_err());
/// ```
pub fn validate_timestamp(flag: &'static str, value: &str) -> Result<()> {
    check_timestamp(value).map_err(|source| Error::InvalidTimestamp {
        flag,
        value: value.to_string(),
        source,
    })
}

fn check_timestamp(value: &str) -> std::result::Result<(), TimestampError> {
    DateTime::parse_from_rfc3339(value)?;

    // chrono accepted it, so the date and time fields sit at fixed offsets.
    let bytes = value.as_bytes();
    if bytes.get(10) != Some(&b'T') {
        return Err(TimestampError::Separator);
    }
    if bytes.get(17..19) == Some(b"60".as_slice()) {
        return Err(TimestampError::LeapSecond);
    }
    if !(value.ends_with('Z') || has_numeric_offset(bytes)) {
        return Err(TimestampError::Zone);
    }
    Ok(())
}

/// Whether `bytes` ends in `+hh:mm` or `-hh:mm`.
fn has_numeric_offset(bytes: &[u8]) -> bool {
    match bytes.len().checked_sub(6).map(|start| &bytes[start..]) {
        Some([sign, h1, h2, b':', m1, m2]) => {
            matches!(sign, b'+' | b'-')
                && [h1, h2, m1, m2].iter().all(|d| d.is_ascii_digit())
        }
        _ => false,
    }
}

/// A single filter condition on a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `id` equals the given integer.
    IdEquals(i64),
    /// `time` is at or after the given RFC3339 timestamp.
    TimeAtOrAfter(String),
    /// `time` is at or before the given RFC3339 timestamp.
    TimeAtOrBefore(String),
    /// `words` contains the given word.
    ContainsWord(String),
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::IdEquals(id) => write!(f, "s.id = {id}"),
            Predicate::TimeAtOrAfter(ts) => {
                write!(f, r#"TO_TIMESTAMP(s."time") >= TO_TIMESTAMP('{ts}')"#)
            }
            Predicate::TimeAtOrBefore(ts) => {
                write!(f, r#"TO_TIMESTAMP(s."time") <= TO_TIMESTAMP('{ts}')"#)
            }
            Predicate::ContainsWord(word) => {
                write!(f, "'{}' IN s.words", escape_literal(word))
            }
        }
    }
}

/// Doubles single quotes so the value stays inside its SQL string literal.
fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// An immutable S3 Select SQL expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Query(String);

impl Query {
    /// Returns the query text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the query, returning the owned text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Query {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Accumulates predicates and renders them into a [`Query`].
///
/// # Examples
///
/// ```
/// use s3sift_select::criteria::FilterCriteria;
/// use s3sift_select::query::QueryBuilder;
///
/// let criteria = FilterCriteria::new().with_id(42);
/// let query = QueryBuilder::from_criteria(&criteria)?.build();
///
/// assert_eq!(
///     query.as_str(),
///     r#"SELECT s.id, s."time", s.words FROM S3Object s WHERE s.id = 42"#
/// );
/// # Ok::<(), s3sift_select::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct QueryBuilder {
    predicates: Vec<Predicate>,
}

impl QueryBuilder {
    /// Creates a builder with no predicates.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a builder holding one predicate per set criterion, in the
    /// order id, from-time, to-time, word.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTimestamp`] if either time bound is not a
    /// valid RFC3339 timestamp.
    pub fn from_criteria(criteria: &FilterCriteria) -> Result<Self> {
        let mut builder = Self::new();

        if let Some(id) = criteria.id {
            builder.push(Predicate::IdEquals(id));
        }

        if let Some(from_time) = &criteria.from_time {
            validate_timestamp(FROM_TIME_FLAG, from_time)?;
            builder.push(Predicate::TimeAtOrAfter(from_time.clone()));
        }

        if let Some(to_time) = &criteria.to_time {
            validate_timestamp(TO_TIME_FLAG, to_time)?;
            builder.push(Predicate::TimeAtOrBefore(to_time.clone()));
        }

        if let Some(word) = &criteria.word {
            builder.push(Predicate::ContainsWord(word.clone()));
        }

        Ok(builder)
    }

    /// Appends a predicate.
    pub fn push(&mut self, predicate: Predicate) -> &mut Self {
        self.predicates.push(predicate);
        self
    }

    /// Returns the predicates collected so far.
    #[must_use]
    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Renders the query.
    #[must_use]
    pub fn build(&self) -> Query {
        let mut sql = String::from(BASE_CLAUSE);

        for (index, predicate) in self.predicates.iter().enumerate() {
            let keyword = if index == 0 { WHERE_KEYWORD } else { AND_KEYWORD };
            sql.push(' ');
            sql.push_str(keyword);
            sql.push(' ');
            sql.push_str(&predicate.to_string());
        }

        Query(sql)
    }
}

/// Builds the query for `criteria` in one step.
///
/// # Errors
///
/// Returns [`Error::InvalidTimestamp`] if either time bound is invalid.
pub fn build_query(criteria: &FilterCriteria) -> Result<Query> {
    let query = QueryBuilder::from_criteria(criteria)?.build();
    tracing::debug!(query = %query, "Built select query");
    Ok(query)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const FROM: &str = "2024-01-01T00:00:00Z";
    const TO: &str = "2024-01-31T23:59:59+02:00";

    fn count(haystack: &str, needle: &str) -> usize {
        haystack.split_whitespace().filter(|w| *w == needle).count()
    }

    #[test]
    fn no_criteria_yields_base_clause_only() {
        let query = build_query(&FilterCriteria::new()).unwrap();
        assert_eq!(query.as_str(), BASE_CLAUSE);
        assert!(!query.as_str().contains(WHERE_KEYWORD));
        assert!(!query.as_str().ends_with(' '));
    }

    #[test]
    fn id_only() {
        let query = build_query(&FilterCriteria::new().with_id(42)).unwrap();
        assert_eq!(query.as_str(), format!("{BASE_CLAUSE} WHERE s.id = 42"));
    }

    #[test]
    fn from_and_to_time_in_order() {
        let criteria = FilterCriteria::new().with_from_time(FROM).with_to_time(TO);
        let query = build_query(&criteria).unwrap();
        let sql = query.as_str();

        assert_eq!(count(sql, WHERE_KEYWORD), 1);
        assert_eq!(count(sql, AND_KEYWORD), 1);

        let from_at = sql.find(">=").unwrap();
        let to_at = sql.find("<=").unwrap();
        assert!(from_at < to_at);
        assert_eq!(
            sql,
            format!(
                r#"{BASE_CLAUSE} WHERE TO_TIMESTAMP(s."time") >= TO_TIMESTAMP('{FROM}') AND TO_TIMESTAMP(s."time") <= TO_TIMESTAMP('{TO}')"#
            )
        );
    }

    #[test]
    fn all_criteria() {
        let criteria = FilterCriteria::new()
            .with_id(7)
            .with_from_time(FROM)
            .with_to_time(TO)
            .with_word("panic");
        let sql = build_query(&criteria).unwrap().into_string();

        assert_eq!(count(&sql, WHERE_KEYWORD), 1);
        assert_eq!(count(&sql, AND_KEYWORD), 3);
        assert!(sql.contains("WHERE s.id = 7 AND"));
        assert!(sql.ends_with("AND 'panic' IN s.words"));
    }

    #[test]
    fn word_only_uses_where() {
        let sql = build_query(&FilterCriteria::new().with_word("disk"))
            .unwrap()
            .into_string();
        assert_eq!(sql, format!("{BASE_CLAUSE} WHERE 'disk' IN s.words"));
    }

    #[test]
    fn word_quotes_are_escaped() {
        let sql = build_query(&FilterCriteria::new().with_word("it's"))
            .unwrap()
            .into_string();
        assert!(sql.ends_with("WHERE 'it''s' IN s.words"));
    }

    #[rstest]
    #[case::from_time(FilterCriteria::new().with_from_time("not-a-timestamp"), FROM_TIME_FLAG)]
    #[case::to_time(FilterCriteria::new().with_to_time("2024-13-01T00:00:00Z"), TO_TIME_FLAG)]
    #[case::date_only(FilterCriteria::new().with_from_time("2024-01-01"), FROM_TIME_FLAG)]
    #[case::space_separator(FilterCriteria::new().with_from_time("2024-01-01 00:00:00Z"), FROM_TIME_FLAG)]
    #[case::lowercase(FilterCriteria::new().with_from_time("2024-01-01t00:00:00z"), FROM_TIME_FLAG)]
    #[case::lowercase_zone(FilterCriteria::new().with_to_time("2024-01-01T00:00:00z"), TO_TIME_FLAG)]
    #[case::leap_second(FilterCriteria::new().with_to_time("2024-01-01T00:00:60Z"), TO_TIME_FLAG)]
    fn invalid_timestamp_names_flag(#[case] criteria: FilterCriteria, #[case] flag: &str) {
        let err = build_query(&criteria).unwrap_err();
        match &err {
            Error::InvalidTimestamp { flag: f, .. } => assert_eq!(*f, flag),
            other => panic!("Expected InvalidTimestamp, got {other:?}"),
        }
        assert!(err.to_string().starts_with(&format!("{flag} value is invalid - ")));
    }

    #[rstest]
    #[case::utc("2024-01-01T00:00:00Z")]
    #[case::fraction("2024-01-01T00:00:00.123Z")]
    #[case::positive_offset("2024-01-31T23:59:59+02:00")]
    #[case::negative_offset("2024-06-30T23:59:59-07:00")]
    fn strict_rfc3339_accepted(#[case] value: &str) {
        assert!(validate_timestamp(FROM_TIME_FLAG, value).is_ok());
    }

    #[rstest]
    #[case::space("2024-01-01 00:00:00Z", "separated by 'T'")]
    #[case::lowercase_zone("2024-01-01T00:00:00z", "time zone")]
    #[case::leap_second("2023-12-31T23:59:60Z", "second out of range")]
    fn loose_forms_report_reason(#[case] value: &str, #[case] reason: &str) {
        let err = validate_timestamp(TO_TIME_FLAG, value).unwrap_err();
        assert!(err.to_string().contains(reason), "{err}");
    }

    #[test]
    fn from_time_error_mentions_flag_text() {
        let err = build_query(&FilterCriteria::new().with_from_time("not-a-timestamp"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("-from-time"));
    }

    #[test]
    fn invalid_to_time_reported_even_when_from_time_valid() {
        let criteria = FilterCriteria::new()
            .with_from_time(FROM)
            .with_to_time("soon");
        assert!(matches!(
            build_query(&criteria),
            Err(Error::InvalidTimestamp { flag: TO_TIME_FLAG, .. })
        ));
    }

    #[rstest]
    #[case::empty(FilterCriteria::new())]
    #[case::id(FilterCriteria::new().with_id(1))]
    #[case::times(FilterCriteria::new().with_from_time(FROM).with_to_time(TO))]
    #[case::all(FilterCriteria::new().with_id(9).with_from_time(FROM).with_to_time(TO).with_word("w"))]
    fn building_twice_is_identical(#[case] criteria: FilterCriteria) {
        let first = build_query(&criteria).unwrap();
        let second = build_query(&criteria).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn push_order_does_not_change_connectives() {
        let mut builder = QueryBuilder::new();
        builder
            .push(Predicate::ContainsWord("late".to_string()))
            .push(Predicate::IdEquals(3));
        let sql = builder.build().into_string();
        assert_eq!(
            sql,
            format!("{BASE_CLAUSE} WHERE 'late' IN s.words AND s.id = 3")
        );
    }

    #[test]
    fn from_criteria_collects_in_fixed_order() {
        let criteria = FilterCriteria::new()
            .with_word("x")
            .with_to_time(TO)
            .with_id(5);
        let builder = QueryBuilder::from_criteria(&criteria).unwrap();
        assert_eq!(
            builder.predicates(),
            &[
                Predicate::IdEquals(5),
                Predicate::TimeAtOrBefore(TO.to_string()),
                Predicate::ContainsWord("x".to_string()),
            ]
        );
    }
}
