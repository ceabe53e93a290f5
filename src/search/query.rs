//! Elasticsearch query body builder.
//!
//! Accumulates filters, scored clauses, exclusions, sort, highlight and
//! aggregations, then renders the `_search` request body.

use serde_json::{json, Map, Value};

use super::params::SortOrder;

/// Builder for constructing an Elasticsearch `_search` body.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    /// Non-scoring `bool.filter` clauses.
    filters: Vec<Value>,
    /// Scoring `bool.must` clauses.
    must: Vec<Value>,
    /// `bool.must_not` clauses.
    must_not: Vec<Value>,
    /// Clauses excluded after aggregation (`post_filter`).
    post_exclusions: Vec<Value>,
    /// Sort entry, if any.
    sort: Option<Value>,
    /// Highlighted fields and their fragment sizes.
    highlights: Vec<(String, u32)>,
    /// Terms aggregations: (name, field, size).
    aggregations: Vec<(String, String, u32)>,
    from: Option<u32>,
    size: Option<u32>,
}

impl SearchQuery {
    /// Create a new query builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact-match filter.
    pub fn term(mut self, field: &str, value: impl Into<Value>) -> Self {
        let value: Value = value.into();
        self.filters.push(json!({ "term": { field: value } }));
        self
    }

    /// Exact-match filter, skipped when the value is absent.
    pub fn term_opt(self, field: &str, value: Option<impl Into<Value>>) -> Self {
        match value {
            Some(v) => self.term(field, v),
            None => self,
        }
    }

    /// Inclusive range filter.
    pub fn range(mut self, field: &str, gte: &str, lte: &str) -> Self {
        self.filters
            .push(json!({ "range": { field: { "gte": gte, "lte": lte } } }));
        self
    }

    /// Scored full-text match across several fields.
    pub fn multi_match(mut self, query: &str, fields: &[String]) -> Self {
        self.must
            .push(json!({ "multi_match": { "query": query, "fields": fields } }));
        self
    }

    /// Scored full-text match on one field.
    pub fn matches(mut self, field: &str, query: &str) -> Self {
        self.must.push(json!({ "match": { field: query } }));
        self
    }

    /// Exclude documents matching `query` across `fields`.
    pub fn exclude_multi_match(mut self, query: &str, fields: &[String]) -> Self {
        self.must_not
            .push(json!({ "multi_match": { "query": query, "fields": fields } }));
        self
    }

    /// Drop hits whose `field` equals any of `values`. Empty lists are ignored.
    pub fn post_exclude_terms(mut self, field: &str, values: &[String]) -> Self {
        if !values.is_empty() {
            self.post_exclusions
                .push(json!({ "terms": { field: values } }));
        }
        self
    }

    /// Sort by one field.
    pub fn sort(mut self, field: &str, order: SortOrder) -> Self {
        self.sort = Some(match order {
            SortOrder::Desc => json!({ field: { "order": "desc" } }),
            SortOrder::Asc => json!(field),
        });
        self
    }

    /// Highlight a field.
    pub fn highlight(mut self, field: &str, fragment_size: u32) -> Self {
        self.highlights.push((field.to_string(), fragment_size));
        self
    }

    /// Add a terms aggregation.
    pub fn terms_agg(mut self, name: &str, field: &str, size: u32) -> Self {
        self.aggregations
            .push((name.to_string(), field.to_string(), size));
        self
    }

    /// Restrict the result window to `[from, from + size)`.
    pub fn window(mut self, from: u32, size: u32) -> Self {
        self.from = Some(from);
        self.size = Some(size);
        self
    }

    /// Render the request body.
    pub fn build(&self) -> Value {
        let mut body = Map::new();

        let mut bool_query = Map::new();
        if !self.filters.is_empty() {
            bool_query.insert("filter".into(), Value::Array(self.filters.clone()));
        }
        if !self.must.is_empty() {
            bool_query.insert("must".into(), Value::Array(self.must.clone()));
        }
        if !self.must_not.is_empty() {
            bool_query.insert("must_not".into(), Value::Array(self.must_not.clone()));
        }
        let query = if bool_query.is_empty() {
            json!({ "match_all": {} })
        } else {
            json!({ "bool": bool_query })
        };
        body.insert("query".into(), query);

        if !self.post_exclusions.is_empty() {
            body.insert(
                "post_filter".into(),
                json!({ "bool": { "must_not": self.post_exclusions } }),
            );
        }

        if let Some(ref sort) = self.sort {
            body.insert("sort".into(), json!([sort]));
        }

        if !self.highlights.is_empty() {
            let fields: Map<String, Value> = self
                .highlights
                .iter()
                .map(|(f, size)| (f.clone(), json!({ "fragment_size": size })))
                .collect();
            body.insert("highlight".into(), json!({ "fields": fields }));
        }

        if !self.aggregations.is_empty() {
            let aggs: Map<String, Value> = self
                .aggregations
                .iter()
                .map(|(name, field, size)| {
                    (name.clone(), json!({ "terms": { "field": field, "size": size } }))
                })
                .collect();
            body.insert("aggs".into(), Value::Object(aggs));
        }

        if let Some(from) = self.from {
            body.insert("from".into(), json!(from));
        }
        if let Some(size) = self.size {
            body.insert("size".into(), json!(size));
        }

        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_query_matches_all() {
        assert_eq!(
            SearchQuery::new().build(),
            json!({ "query": { "match_all": {} } })
        );
    }

    #[test]
    fn test_filters_and_full_text() {
        let fields = vec!["title".to_string(), "content".to_string()];
        let body = SearchQuery::new()
            .term("website", "example.com")
            .term_opt("channel", None::<String>)
            .term_opt("has_pic", Some(true))
            .range("pdate", "1996-01-01", "2038-01-01")
            .multi_match("news", &fields)
            .exclude_multi_match("sports", &fields)
            .build();

        assert_eq!(
            body["query"]["bool"]["filter"],
            json!([
                { "term": { "website": "example.com" } },
                { "term": { "has_pic": true } },
                { "range": { "pdate": { "gte": "1996-01-01", "lte": "2038-01-01" } } }
            ])
        );
        assert_eq!(
            body["query"]["bool"]["must"],
            json!([{ "multi_match": { "query": "news", "fields": ["title", "content"] } }])
        );
        assert_eq!(
            body["query"]["bool"]["must_not"][0]["multi_match"]["query"],
            "sports"
        );
    }

    #[test]
    fn test_sort_shapes() {
        let asc = SearchQuery::new().sort("pdate", SortOrder::Asc).build();
        assert_eq!(asc["sort"], json!(["pdate"]));

        let desc = SearchQuery::new().sort("pdate", SortOrder::Desc).build();
        assert_eq!(desc["sort"], json!([{ "pdate": { "order": "desc" } }]));
    }

    #[test]
    fn test_post_exclusion_ignores_empty_list() {
        let body = SearchQuery::new().post_exclude_terms("url", &[]).build();
        assert!(body.get("post_filter").is_none());

        let body = SearchQuery::new()
            .post_exclude_terms("url", &["http://a.com/1".to_string()])
            .build();
        assert_eq!(
            body["post_filter"],
            json!({ "bool": { "must_not": [{ "terms": { "url": ["http://a.com/1"] } }] } })
        );
    }

    #[test]
    fn test_highlight_aggs_window() {
        let body = SearchQuery::new()
            .highlight("title", 50)
            .highlight("content", 100)
            .terms_agg("channel_all", "channel", 10)
            .window(20, 10)
            .build();

        assert_eq!(body["highlight"]["fields"]["title"]["fragment_size"], 50);
        assert_eq!(body["highlight"]["fields"]["content"]["fragment_size"], 100);
        assert_eq!(
            body["aggs"]["channel_all"],
            json!({ "terms": { "field": "channel", "size": 10 } })
        );
        assert_eq!(body["from"], 20);
        assert_eq!(body["size"], 10);
    }
}
