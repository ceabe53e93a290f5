//! Typed search requests and their translation to Elasticsearch bodies.
//!
//! Each request type parses and validates the raw query string, then renders
//! a body scoped to the caller's website domain. The domain filter is always
//! the first clause and no request parameter can remove it.

use serde_json::{json, Value};

use super::params::{
    and_terms, calendar_date, flag, optional, required, scope_fields, sort_field, ExcludeField,
    Pagination, QueryParams, SortOrder, ValidationError, DEFAULT_FROM_DATE, DEFAULT_TO_DATE,
};
use super::query::SearchQuery;

/// Field holding the owning website's domain.
pub const TENANCY_FIELD: &str = "website";

/// Searchable fields of the general content index.
pub const CONTENT_SCOPE: &[&str] = &["content", "tag", "title", "description"];
/// Searchable fields of the culture archive index.
pub const ARCHIVE_SCOPE: &[&str] = &["content", "tag", "title", "description", "author", "writings"];

/// Sortable fields of the general content index.
pub const CONTENT_SORT_FIELDS: &[&str] = &[
    "pdate", "channel", "category", "has_pic", "has_video", "author", "origin",
];
/// Sortable fields of the culture archive index.
pub const ARCHIVE_SORT_FIELDS: &[&str] = &["category", "years", "channel", "location", "times"];

/// Plain exact-match parameters of the general search, as (param, index field).
const CONTENT_TERM_FILTERS: &[(&str, &str)] = &[
    ("channel", "channel"),
    ("category", "category"),
    ("origin", "origin"),
    ("author", "author"),
    ("editor", "editor"),
    ("v1", "reserved_1"),
    ("v2", "reserved_2"),
    ("v3", "reserved_3"),
    ("v4", "reserved_4"),
    ("v5", "reserved_5"),
    ("v6", "reserved_6"),
];

/// Plain exact-match parameters of the archive search.
const ARCHIVE_TERM_FILTERS: &[(&str, &str)] = &[
    ("times", "times"),
    ("category", "category"),
    ("location", "location"),
    ("channel", "channel"),
];

/// Facets requested with every archive search.
const ARCHIVE_FACETS: &[(&str, &str)] = &[
    ("times_all", "times"),
    ("channel_all", "channel"),
    ("category_all", "category"),
    ("location_all", "location"),
];

const SUGGEST_LIMIT: u32 = 10;
const FACET_SIZE: u32 = 10;

fn collect_terms(params: &QueryParams, spec: &[(&str, &'static str)]) -> Vec<(&'static str, String)> {
    spec.iter()
        .filter_map(|(param, field)| optional(params, param).map(|v| (*field, v.to_string())))
        .collect()
}

/// Exclusion list from `f`/`l`. `l` without `f` is ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exclusion {
    pub field: ExcludeField,
    pub values: Vec<String>,
}

impl Exclusion {
    fn from_params(params: &QueryParams) -> Result<Option<Self>, ValidationError> {
        let Some(raw_field) = optional(params, "f") else {
            return Ok(None);
        };
        let field = ExcludeField::parse("f", raw_field)?;
        let values = optional(params, "l")
            .map(|l| {
                l.split(',')
                    .filter(|v| !v.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Ok(Some(Self { field, values }))
    }
}

/// General content search (`/api/v1/search`).
#[derive(Debug, Clone)]
pub struct ContentSearch {
    pub keyword: String,
    pub excluded_keyword: Option<String>,
    pub and_terms: Vec<String>,
    pub scope: Vec<String>,
    pub terms: Vec<(&'static str, String)>,
    pub has_pic: Option<bool>,
    pub has_video: Option<bool>,
    pub from_date: String,
    pub to_date: String,
    pub exclusion: Option<Exclusion>,
    pub sort_field: String,
    pub order: SortOrder,
    pub page: Pagination,
}

impl ContentSearch {
    pub fn from_params(params: &QueryParams) -> Result<Self, ValidationError> {
        Ok(Self {
            keyword: required(params, "keyword")?.to_string(),
            excluded_keyword: optional(params, "not").map(str::to_string),
            and_terms: and_terms(optional(params, "and")),
            scope: scope_fields(optional(params, "scope"), CONTENT_SCOPE),
            terms: collect_terms(params, CONTENT_TERM_FILTERS),
            has_pic: flag(optional(params, "has_pic")),
            has_video: flag(optional(params, "has_video")),
            from_date: calendar_date("from", params.get("from").map(String::as_str), DEFAULT_FROM_DATE)?,
            to_date: calendar_date("to", params.get("to").map(String::as_str), DEFAULT_TO_DATE)?,
            exclusion: Exclusion::from_params(params)?,
            sort_field: sort_field(optional(params, "s"), CONTENT_SORT_FIELDS),
            order: SortOrder::parse(optional(params, "o")),
            page: Pagination::from_params(params)?,
        })
    }

    /// Render the body for `domain`.
    pub fn to_query(&self, domain: &str) -> Value {
        let mut query = SearchQuery::new().term(TENANCY_FIELD, domain);
        for (field, value) in &self.terms {
            query = query.term(field, value.as_str());
        }
        query = query
            .term_opt("has_pic", self.has_pic)
            .term_opt("has_video", self.has_video)
            .range("pdate", &self.from_date, &self.to_date)
            .multi_match(&self.keyword, &self.scope);

        if let Some(ref not) = self.excluded_keyword {
            query = query.exclude_multi_match(not, &self.scope);
        }
        for word in &self.and_terms {
            query = query.multi_match(word, &self.scope);
        }

        query = query
            .highlight("title", 50)
            .highlight("content", 100)
            .highlight("tag", 50)
            .highlight("description", 100);

        if let Some(ref exclusion) = self.exclusion {
            query = query.post_exclude_terms(exclusion.field.index_field(), &exclusion.values);
        }

        query
            .sort(&self.sort_field, self.order)
            .window(self.page.offset(), self.page.size)
            .build()
    }
}

/// Culture archive search (`/api/v1/gdszxsearch`).
#[derive(Debug, Clone)]
pub struct ArchiveSearch {
    pub keyword: String,
    pub and_terms: Vec<String>,
    pub scope: Vec<String>,
    pub terms: Vec<(&'static str, String)>,
    pub is_open: Option<bool>,
    pub sort_field: String,
    pub order: SortOrder,
    pub page: Pagination,
}

impl ArchiveSearch {
    pub fn from_params(params: &QueryParams) -> Result<Self, ValidationError> {
        Ok(Self {
            keyword: required(params, "keyword")?.to_string(),
            and_terms: and_terms(optional(params, "and")),
            scope: scope_fields(optional(params, "scope"), ARCHIVE_SCOPE),
            terms: collect_terms(params, ARCHIVE_TERM_FILTERS),
            is_open: flag(optional(params, "is_open")),
            sort_field: sort_field(optional(params, "s"), ARCHIVE_SORT_FIELDS),
            order: SortOrder::parse(optional(params, "o")),
            page: Pagination::from_params(params)?,
        })
    }

    pub fn to_query(&self, domain: &str) -> Value {
        let mut query = SearchQuery::new().term(TENANCY_FIELD, domain);
        for (field, value) in &self.terms {
            query = query.term(field, value.as_str());
        }
        query = query
            .term_opt("is_open", self.is_open)
            .multi_match(&self.keyword, &self.scope);
        for word in &self.and_terms {
            query = query.multi_match(word, &self.scope);
        }

        query = query.highlight("title", 50).highlight("content", 100);
        for (name, field) in ARCHIVE_FACETS {
            query = query.terms_agg(name, field, FACET_SIZE);
        }

        query
            .sort(&self.sort_field, self.order)
            .window(self.page.offset(), self.page.size)
            .build()
    }
}

/// Title autocomplete (`/api/v1/suggest`).
#[derive(Debug, Clone)]
pub struct SuggestSearch {
    pub keyword: String,
}

impl SuggestSearch {
    pub fn from_params(params: &QueryParams) -> Result<Self, ValidationError> {
        Ok(Self {
            keyword: required(params, "keyword")?.to_string(),
        })
    }

    pub fn to_query(&self, domain: &str) -> Value {
        SearchQuery::new()
            .term(TENANCY_FIELD, domain)
            .matches("title", &self.keyword)
            .window(0, SUGGEST_LIMIT)
            .build()
    }
}

/// Completion-suggest body for related keywords.
pub fn related_query(keyword: &str, field: &str, size: u32) -> Value {
    json!({
        "size": 0,
        "suggest": {
            "suggest": {
                "prefix": keyword,
                "completion": { "field": field, "size": size }
            }
        }
    })
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
    fn test_content_defaults() {
        let search = ContentSearch::from_params(&params(&[("keyword", "news")])).unwrap();
        let body = search.to_query("example.com");

        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([
                { "term": { "website": "example.com" } },
                { "range": { "pdate": { "gte": "1996-01-01", "lte": "2038-01-01" } } }
            ])
        );
        assert_eq!(
            body["query"]["bool"]["must"],
            json!([{
                "multi_match": {
                    "query": "news",
                    "fields": ["content", "tag", "title", "description"]
                }
            }])
        );
        assert_eq!(body["from"], 0);
        assert_eq!(body["size"], 10);
        assert_eq!(body["sort"], json!(["_score"]));
        assert!(body.get("post_filter").is_none());
        assert!(body.get("aggs").is_none());
        assert_eq!(body["highlight"]["fields"]["description"]["fragment_size"], 100);
        assert_eq!(body["highlight"]["fields"]["tag"]["fragment_size"], 50);
    }

    #[test]
    fn test_content_filters() {
        let search = ContentSearch::from_params(&params(&[
            ("keyword", "news"),
            ("channel", "local"),
            ("v3", "x"),
            ("has_pic", "1"),
            ("has_video", "0"),
            ("editor", ""),
            ("from", "2020-02-29"),
            ("to", "2021-01-01"),
        ]))
        .unwrap();
        let filters = search.to_query("example.com")["query"]["bool"]["filter"].clone();

        assert_eq!(
            filters,
            json!([
                { "term": { "website": "example.com" } },
                { "term": { "channel": "local" } },
                { "term": { "reserved_3": "x" } },
                { "term": { "has_pic": true } },
                { "term": { "has_video": false } },
                { "range": { "pdate": { "gte": "2020-02-29", "lte": "2021-01-01" } } }
            ])
        );
    }

    #[test]
    fn test_has_pic_other_values_add_no_filter() {
        let search =
            ContentSearch::from_params(&params(&[("keyword", "k"), ("has_pic", "true")])).unwrap();
        assert_eq!(search.has_pic, None);
    }

    #[test]
    fn test_content_scope_not_and_terms() {
        let search = ContentSearch::from_params(&params(&[
            ("keyword", "news"),
            ("scope", "title"),
            ("not", "sports"),
            ("and", " local  weather "),
        ]))
        .unwrap();
        let body = search.to_query("example.com");

        let must = body["query"]["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 3);
        assert_eq!(must[1]["multi_match"]["query"], "local");
        assert_eq!(must[2]["multi_match"]["query"], "weather");
        assert_eq!(must[2]["multi_match"]["fields"], json!(["title"]));
        assert_eq!(
            body["query"]["bool"]["must_not"],
            json!([{ "multi_match": { "query": "sports", "fields": ["title"] } }])
        );
    }

    #[test]
    fn test_content_exclusion_list() {
        let search = ContentSearch::from_params(&params(&[
            ("keyword", "news"),
            ("f", "title"),
            ("l", "A,B"),
        ]))
        .unwrap();
        let body = search.to_query("example.com");
        assert_eq!(
            body["post_filter"],
            json!({ "bool": { "must_not": [{ "terms": { "title.raw": ["A", "B"] } }] } })
        );

        let err = ContentSearch::from_params(&params(&[("keyword", "n"), ("f", "body")]))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidFilterField("f".into()));

        let search =
            ContentSearch::from_params(&params(&[("keyword", "n"), ("l", "A,B")])).unwrap();
        assert!(search.exclusion.is_none());
    }

    #[test]
    fn test_content_sort_and_paging() {
        let search = ContentSearch::from_params(&params(&[
            ("keyword", "news"),
            ("s", "pdate"),
            ("o", "desc"),
            ("page", "3"),
            ("size", "5"),
        ]))
        .unwrap();
        let body = search.to_query("example.com");
        assert_eq!(body["sort"], json!([{ "pdate": { "order": "desc" } }]));
        assert_eq!(body["from"], 10);
        assert_eq!(body["size"], 5);

        let search =
            ContentSearch::from_params(&params(&[("keyword", "n"), ("s", "years")])).unwrap();
        assert_eq!(search.sort_field, "_score");
    }

    #[test]
    fn test_content_validation_errors() {
        let err = ContentSearch::from_params(&params(&[("keyword", "n"), ("to", "2021-02-30")]))
            .unwrap_err();
        assert_eq!(err, ValidationError::InvalidDate("to".into()));

        let err = ContentSearch::from_params(&params(&[("keyword", "n"), ("page", "51")]))
            .unwrap_err();
        assert_eq!(err, ValidationError::AboveMaximum("page".into()));

        let err = ContentSearch::from_params(&params(&[])).unwrap_err();
        assert_eq!(err, ValidationError::Missing("keyword".into()));
    }

    #[test]
    fn test_archive_query() {
        let search = ArchiveSearch::from_params(&params(&[
            ("keyword", "history"),
            ("location", "guangzhou"),
            ("is_open", "1"),
            ("s", "years"),
        ]))
        .unwrap();
        let body = search.to_query("example.com");

        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([
                { "term": { "website": "example.com" } },
                { "term": { "location": "guangzhou" } },
                { "term": { "is_open": true } }
            ])
        );
        assert_eq!(
            body["query"]["bool"]["must"][0]["multi_match"]["fields"]
                .as_array()
                .unwrap()
                .len(),
            6
        );
        assert_eq!(body["sort"], json!(["years"]));
        for facet in ["times_all", "channel_all", "category_all", "location_all"] {
            assert_eq!(body["aggs"][facet]["terms"]["size"], 10);
        }
        assert!(body["highlight"]["fields"].get("tag").is_none());
        assert!(body["query"]["bool"]["filter"]
            .as_array()
            .unwrap()
            .iter()
            .all(|f| f.get("range").is_none()));
    }

    #[test]
    fn test_archive_sort_allow_list_differs() {
        let search =
            ArchiveSearch::from_params(&params(&[("keyword", "k"), ("s", "pdate")])).unwrap();
        assert_eq!(search.sort_field, "_score");
    }

    #[test]
    fn test_suggest_query() {
        let search = SuggestSearch::from_params(&params(&[("keyword", "new")])).unwrap();
        assert_eq!(
            search.to_query("example.com"),
            json!({
                "query": { "bool": {
                    "filter": [{ "term": { "website": "example.com" } }],
                    "must": [{ "match": { "title": "new" } }]
                } },
                "from": 0,
                "size": 10
            })
        );
    }

    #[test]
    fn test_related_query() {
        let body = related_query("new", "suggest", 6);
        assert_eq!(body["suggest"]["suggest"]["prefix"], "new");
        assert_eq!(body["suggest"]["suggest"]["completion"]["size"], 6);
    }
}
