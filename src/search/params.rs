//! Request parameter validation.
//!
//! Every rule reports the offending field by name so the client can tell
//! which parameter to fix.

use std::collections::HashMap;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Raw query-string parameters.
pub type QueryParams = HashMap<String, String>;

/// Lower bound for `page` and `size`.
pub const MIN_PAGE_VALUE: u32 = 1;
/// Upper bound for `page` and `size`.
pub const MAX_PAGE_VALUE: u32 = 50;

pub const DEFAULT_FROM_DATE: &str = "1996-01-01";
pub const DEFAULT_TO_DATE: &str = "2038-01-01";

static DATE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"));

/// A rejected request parameter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{}", missing_message(.0))]
    Missing(String),
    #[error("{0} 必须是整数")]
    NotInteger(String),
    #[error("{0} 不能小于1")]
    BelowMinimum(String),
    #[error("{0} 不能大于50")]
    AboveMaximum(String),
    #[error("{0} 必须是有效的日期格式yyyy-mm-dd")]
    InvalidDate(String),
    #[error("{0} 只能是url或title")]
    InvalidFilterField(String),
}

fn missing_message(field: &str) -> String {
    if field == "_" {
        "时间戳不能空".to_string()
    } else {
        format!("{}不能空", field)
    }
}

impl ValidationError {
    /// Name of the rejected parameter.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Missing(f)
            | ValidationError::NotInteger(f)
            | ValidationError::BelowMinimum(f)
            | ValidationError::AboveMaximum(f)
            | ValidationError::InvalidDate(f)
            | ValidationError::InvalidFilterField(f) => f,
        }
    }
}

/// Fetch a required parameter. Present-but-empty counts as present.
pub fn required<'a>(params: &'a QueryParams, field: &str) -> Result<&'a str, ValidationError> {
    params
        .get(field)
        .map(String::as_str)
        .ok_or_else(|| ValidationError::Missing(field.to_string()))
}

/// Fetch an optional parameter, treating empty values as absent.
pub fn optional<'a>(params: &'a QueryParams, field: &str) -> Option<&'a str> {
    params
        .get(field)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
}

/// Parse a paging value (`page`, `size`) bounded to `[1, 50]`.
pub fn bounded_int(field: &str, raw: Option<&str>, default: u32) -> Result<u32, ValidationError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ValidationError::NotInteger(field.to_string()));
    }
    // All digits: a parse failure can only be overflow.
    let value: u64 = raw
        .parse()
        .map_err(|_| ValidationError::AboveMaximum(field.to_string()))?;
    if value < u64::from(MIN_PAGE_VALUE) {
        return Err(ValidationError::BelowMinimum(field.to_string()));
    }
    if value > u64::from(MAX_PAGE_VALUE) {
        return Err(ValidationError::AboveMaximum(field.to_string()));
    }
    Ok(value as u32)
}

/// Parse a strict `yyyy-mm-dd` calendar date. Year 0000 is rejected.
pub fn calendar_date(
    field: &str,
    raw: Option<&str>,
    default: &str,
) -> Result<String, ValidationError> {
    let value = raw.unwrap_or(default);
    let invalid = || ValidationError::InvalidDate(field.to_string());

    if !DATE_SHAPE.is_match(value) || value.starts_with("0000") {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?;
    Ok(value.to_string())
}

/// `"1"` → true, `"0"` → false, anything else → no filter.
pub fn flag(raw: Option<&str>) -> Option<bool> {
    match raw {
        Some("1") => Some(true),
        Some("0") => Some(false),
        _ => None,
    }
}

/// Sort direction requested with `o`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    /// Only the literal `desc` selects descending order.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("desc") => SortOrder::Desc,
            _ => SortOrder::Asc,
        }
    }
}

/// Resolve a sort field against an allow-list, falling back to relevance.
pub fn sort_field(raw: Option<&str>, allowed: &[&str]) -> String {
    match raw {
        Some(field) if allowed.contains(&field) => field.to_string(),
        _ => "_score".to_string(),
    }
}

/// Field an exclusion list applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludeField {
    Url,
    Title,
}

impl ExcludeField {
    pub fn parse(field: &str, raw: &str) -> Result<Self, ValidationError> {
        match raw {
            "url" => Ok(ExcludeField::Url),
            "title" => Ok(ExcludeField::Title),
            _ => Err(ValidationError::InvalidFilterField(field.to_string())),
        }
    }

    /// Indexed field holding the exact value.
    pub fn index_field(&self) -> &'static str {
        match self {
            ExcludeField::Url => "url",
            ExcludeField::Title => "title.raw",
        }
    }
}

/// Resolve `scope` to the searched fields: one field when it names one of
/// `all`, otherwise every field.
pub fn scope_fields(raw: Option<&str>, all: &[&str]) -> Vec<String> {
    match raw {
        Some(field) if all.contains(&field) => vec![field.to_string()],
        _ => all.iter().map(|f| f.to_string()).collect(),
    }
}

/// Split the `and` parameter on whitespace.
pub fn and_terms(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| s.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Offset window for a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub size: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

impl Pagination {
    pub fn from_params(params: &QueryParams) -> Result<Self, ValidationError> {
        let defaults = Self::default();
        Ok(Self {
            page: bounded_int("page", params.get("page").map(String::as_str), defaults.page)?,
            size: bounded_int("size", params.get("size").map(String::as_str), defaults.size)?,
        })
    }

    pub fn offset(&self) -> u32 {
        (self.page - 1) * self.size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_bounded_int_accepts_range() {
        assert_eq!(bounded_int("page", Some("1"), 1), Ok(1));
        assert_eq!(bounded_int("page", Some("50"), 1), Ok(50));
        assert_eq!(bounded_int("size", Some("07"), 10), Ok(7));
        assert_eq!(bounded_int("size", None, 10), Ok(10));
    }

    #[test]
    fn test_bounded_int_rejections_name_field() {
        assert_eq!(
            bounded_int("page", Some("0"), 1),
            Err(ValidationError::BelowMinimum("page".into()))
        );
        assert_eq!(
            bounded_int("size", Some("51"), 1),
            Err(ValidationError::AboveMaximum("size".into()))
        );
        assert_eq!(
            bounded_int("size", Some("99999999999999999999999"), 1),
            Err(ValidationError::AboveMaximum("size".into()))
        );
        assert_eq!(
            bounded_int("page", Some("-1"), 1),
            Err(ValidationError::NotInteger("page".into()))
        );
        assert_eq!(
            bounded_int("page", Some("2.5"), 1),
            Err(ValidationError::NotInteger("page".into()))
        );
        assert_eq!(
            bounded_int("page", Some(""), 1),
            Err(ValidationError::NotInteger("page".into()))
        );
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(ValidationError::Missing("_".into()).to_string(), "时间戳不能空");
        assert_eq!(
            ValidationError::Missing("appkey".into()).to_string(),
            "appkey不能空"
        );
        assert_eq!(
            ValidationError::NotInteger("page".into()).to_string(),
            "page 必须是整数"
        );
        assert_eq!(
            ValidationError::BelowMinimum("page".into()).to_string(),
            "page 不能小于1"
        );
        assert_eq!(
            ValidationError::AboveMaximum("size".into()).to_string(),
            "size 不能大于50"
        );
        assert_eq!(
            ValidationError::InvalidDate("from".into()).to_string(),
            "from 必须是有效的日期格式yyyy-mm-dd"
        );
        assert_eq!(
            ValidationError::InvalidFilterField("f".into()).to_string(),
            "f 只能是url或title"
        );
    }

    #[test]
    fn test_calendar_date() {
        assert_eq!(
            calendar_date("from", Some("2020-02-29"), DEFAULT_FROM_DATE).unwrap(),
            "2020-02-29"
        );
        assert_eq!(
            calendar_date("from", None, DEFAULT_FROM_DATE).unwrap(),
            "1996-01-01"
        );
        assert!(calendar_date("from", Some("2000-02-29"), DEFAULT_FROM_DATE).is_ok());

        for bad in [
            "2021-02-30",
            "2021-13-01",
            "2021-02-29",
            "1900-02-29",
            "0000-01-01",
            "2021-1-01",
            "20210101",
            "2021-04-31",
            "",
        ] {
            assert_eq!(
                calendar_date("to", Some(bad), DEFAULT_TO_DATE),
                Err(ValidationError::InvalidDate("to".into())),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_flag() {
        assert_eq!(flag(Some("1")), Some(true));
        assert_eq!(flag(Some("0")), Some(false));
        assert_eq!(flag(Some("yes")), None);
        assert_eq!(flag(None), None);
    }

    #[test]
    fn test_sort_field_falls_back_to_score() {
        let allowed = ["pdate", "channel"];
        assert_eq!(sort_field(Some("pdate"), &allowed), "pdate");
        assert_eq!(sort_field(Some("secret_field"), &allowed), "_score");
        assert_eq!(sort_field(None, &allowed), "_score");
        assert_eq!(SortOrder::parse(Some("desc")), SortOrder::Desc);
        assert_eq!(SortOrder::parse(Some("DESC")), SortOrder::Asc);
    }

    #[test]
    fn test_exclude_field() {
        assert_eq!(ExcludeField::parse("f", "url"), Ok(ExcludeField::Url));
        assert_eq!(ExcludeField::parse("f", "title").unwrap().index_field(), "title.raw");
        assert_eq!(
            ExcludeField::parse("f", "body"),
            Err(ValidationError::InvalidFilterField("f".into()))
        );
    }

    #[test]
    fn test_scope_and_terms() {
        let all = ["content", "title"];
        assert_eq!(scope_fields(Some("title"), &all), vec!["title"]);
        assert_eq!(scope_fields(Some("author"), &all), vec!["content", "title"]);
        assert_eq!(and_terms(Some("  a   b\tc ")), vec!["a", "b", "c"]);
        assert!(and_terms(Some("   ")).is_empty());
    }

    #[test]
    fn test_pagination() {
        let p = Pagination::from_params(&params(&[("page", "3"), ("size", "20")])).unwrap();
        assert_eq!(p.offset(), 40);

        let p = Pagination::from_params(&params(&[])).unwrap();
        assert_eq!((p.page, p.size, p.offset()), (1, 10, 0));

        let err = Pagination::from_params(&params(&[("size", "0")])).unwrap_err();
        assert_eq!(err.field(), "size");
    }

    #[test]
    fn test_required_and_optional() {
        let q = params(&[("appkey", "K1"), ("channel", "")]);
        assert_eq!(required(&q, "appkey"), Ok("K1"));
        assert_eq!(
            required(&q, "token"),
            Err(ValidationError::Missing("token".into()))
        );
        assert_eq!(optional(&q, "channel"), None);
        assert_eq!(optional(&q, "appkey"), Some("K1"));
    }
}
