//! Read-query composition for book listings.
//!
//! Raw query-string parameters are folded into an immutable [`QuerySpec`],
//! one refinement step at a time, then compiled exactly once into a WHERE
//! clause with bound values plus ordering and pagination. User input never
//! reaches the SQL text itself; every value travels as a bind parameter.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use std::collections::HashMap;

/// Parameters consumed by the composer itself rather than treated as filters
const RESERVED_PARAMS: &[&str] = &["page", "limit", "sort", "fields", "keyword"];

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

/// Book fields addressable from the query string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookField {
    Id,
    Title,
    Author,
    Genre,
    Isbn,
    Description,
    Copies,
    Available,
    Image,
    Revision,
    CreatedAt,
    UpdatedAt,
}

impl BookField {
    pub fn from_param(name: &str) -> Option<Self> {
        match name {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "author" => Some(Self::Author),
            "genre" => Some(Self::Genre),
            "isbn" => Some(Self::Isbn),
            "description" => Some(Self::Description),
            "copies" => Some(Self::Copies),
            "available" => Some(Self::Available),
            "image" => Some(Self::Image),
            "revision" => Some(Self::Revision),
            "createdAt" => Some(Self::CreatedAt),
            "updatedAt" => Some(Self::UpdatedAt),
            _ => None,
        }
    }

    /// Column name in the books table
    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Title => "title",
            Self::Author => "author",
            Self::Genre => "genre",
            Self::Isbn => "isbn",
            Self::Description => "description",
            Self::Copies => "copies",
            Self::Available => "available",
            Self::Image => "image",
            Self::Revision => "revision",
            Self::CreatedAt => "created_at",
            Self::UpdatedAt => "updated_at",
        }
    }

    /// Key used in serialized responses
    pub fn json_key(self) -> &'static str {
        match self {
            Self::CreatedAt => "createdAt",
            Self::UpdatedAt => "updatedAt",
            other => other.column(),
        }
    }

    fn kind(self) -> FieldKind {
        match self {
            Self::Id | Self::Copies | Self::Revision => FieldKind::Int,
            Self::Available => FieldKind::Bool,
            Self::CreatedAt | Self::UpdatedAt => FieldKind::Timestamp,
            _ => FieldKind::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FieldKind {
    Int,
    Bool,
    Text,
    Timestamp,
}

/// Filter comparators recognized in `field[op]` parameter keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparator {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    Regex,
}

impl Comparator {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "regex" => Some(Self::Regex),
            _ => None,
        }
    }

    fn sql(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Regex => "~*",
        }
    }
}

/// A value ready to be bound into the compiled query
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Int(i64),
    Bool(bool),
    Text(String),
    Timestamp(DateTime<Utc>),
}

/// A typed filter expression: field, comparator, bound value
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: BookField,
    pub comparator: Comparator,
    pub value: BindValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: BookField,
    pub descending: bool,
}

/// Compiled form of a [`QuerySpec`], executed once by the repository
#[derive(Debug, Clone)]
pub struct CompiledQuery {
    /// WHERE clause body with `$N` placeholders
    pub where_clause: String,
    /// Values for the placeholders, in order
    pub binds: Vec<BindValue>,
    /// ORDER BY clause body
    pub order_clause: String,
    pub limit: i64,
    pub offset: i64,
}

/// Immutable query specification.
///
/// Each step consumes the spec and returns a refined copy, so the usual
/// construction reads as a chain:
///
/// ```ignore
/// let spec = QuerySpec::new()
///     .filter(&params)
///     .search(&params)
///     .sort(&params)
///     .select_fields(&params)
///     .paginate(&params);
/// ```
#[derive(Debug, Clone)]
pub struct QuerySpec {
    filters: Vec<Filter>,
    keyword: Option<String>,
    sort: Vec<SortKey>,
    fields: Option<Vec<BookField>>,
    page: i64,
    limit: i64,
    match_nothing: bool,
}

impl Default for QuerySpec {
    fn default() -> Self {
        Self::new()
    }
}

impl QuerySpec {
    pub fn new() -> Self {
        Self {
            filters: Vec::new(),
            keyword: None,
            sort: vec![SortKey {
                field: BookField::CreatedAt,
                descending: true,
            }],
            fields: None,
            page: 1,
            limit: DEFAULT_LIMIT,
            match_nothing: false,
        }
    }

    /// Run every refinement step in its fixed order
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self::new()
            .filter(params)
            .search(params)
            .sort(params)
            .select_fields(params)
            .paginate(params)
    }

    /// Turn every non-reserved parameter into a typed filter. A key of the
    /// form `field[op]` selects a comparator; a bare key means equality.
    /// Unknown fields, unknown operator tokens and values that cannot be
    /// coerced to the field's type match no rows at all, mirroring a
    /// document store filtering on a field no document has.
    pub fn filter(mut self, params: &HashMap<String, String>) -> Self {
        let mut entries: Vec<(&String, &String)> = params
            .iter()
            .filter(|(key, _)| !RESERVED_PARAMS.contains(&key.as_str()))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        for (key, raw) in entries {
            let (name, token) = match key.find('[') {
                Some(open) if key.ends_with(']') => {
                    (&key[..open], Some(&key[open + 1..key.len() - 1]))
                }
                _ => (key.as_str(), None),
            };

            let comparator = match token {
                None => Comparator::Eq,
                Some(token) => match Comparator::from_token(token) {
                    Some(comparator) => comparator,
                    None => {
                        self.match_nothing = true;
                        continue;
                    }
                },
            };

            let field = match BookField::from_param(name) {
                Some(field) => field,
                None => {
                    self.match_nothing = true;
                    continue;
                }
            };

            match coerce(field, comparator, raw) {
                Some(value) => self.filters.push(Filter {
                    field,
                    comparator,
                    value,
                }),
                None => self.match_nothing = true,
            }
        }
        self
    }

    /// Case-insensitive substring search across title, author and genre
    pub fn search(mut self, params: &HashMap<String, String>) -> Self {
        if let Some(keyword) = params.get("keyword") {
            if !keyword.is_empty() {
                self.keyword = Some(keyword.clone());
            }
        }
        self
    }

    /// Comma-separated sort fields, `-` prefix for descending. Unknown
    /// fields are skipped; with nothing valid the default order
    /// (creation time descending) stands.
    pub fn sort(mut self, params: &HashMap<String, String>) -> Self {
        if let Some(raw) = params.get("sort") {
            let keys: Vec<SortKey> = raw
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .filter_map(|token| {
                    let (name, descending) = match token.strip_prefix('-') {
                        Some(name) => (name, true),
                        None => (token, false),
                    };
                    BookField::from_param(name).map(|field| SortKey { field, descending })
                })
                .collect();
            if !keys.is_empty() {
                self.sort = keys;
            }
        }
        self
    }

    /// Comma-separated allow-list of response fields. Unknown names are
    /// skipped; with nothing valid the default projection stands (all
    /// fields except the internal revision counter).
    pub fn select_fields(mut self, params: &HashMap<String, String>) -> Self {
        if let Some(raw) = params.get("fields") {
            let fields: Vec<BookField> = raw
                .split(',')
                .map(str::trim)
                .filter(|token| !token.is_empty())
                .filter_map(BookField::from_param)
                .collect();
            if !fields.is_empty() {
                self.fields = Some(fields);
            }
        }
        self
    }

    /// Page defaults to 1 (clamped up), limit defaults to 20 (capped at
    /// 100). Values that fail to parse fall back to the defaults.
    pub fn paginate(mut self, params: &HashMap<String, String>) -> Self {
        self.page = params
            .get("page")
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(1)
            .max(1);
        self.limit = params
            .get("limit")
            .and_then(|raw| raw.parse::<i64>().ok())
            .unwrap_or(DEFAULT_LIMIT)
            .clamp(1, MAX_LIMIT);
        self
    }

    /// Compile into SQL fragments plus ordered bind values
    pub fn compile(&self) -> CompiledQuery {
        let mut binds = Vec::new();
        let mut conditions = Vec::new();

        if self.match_nothing {
            conditions.push("FALSE".to_string());
        } else {
            for filter in &self.filters {
                binds.push(filter.value.clone());
                conditions.push(format!(
                    "{} {} ${}",
                    filter.field.column(),
                    filter.comparator.sql(),
                    binds.len()
                ));
            }
            if let Some(keyword) = &self.keyword {
                binds.push(BindValue::Text(format!("%{}%", escape_like(keyword))));
                let n = binds.len();
                conditions.push(format!(
                    "(title ILIKE ${n} OR author ILIKE ${n} OR genre ILIKE ${n})"
                ));
            }
        }

        let where_clause = if conditions.is_empty() {
            "TRUE".to_string()
        } else {
            conditions.join(" AND ")
        };

        let order_clause = self
            .sort
            .iter()
            .map(|key| {
                format!(
                    "{} {}",
                    key.field.column(),
                    if key.descending { "DESC" } else { "ASC" }
                )
            })
            .collect::<Vec<_>>()
            .join(", ");

        CompiledQuery {
            where_clause,
            binds,
            order_clause,
            limit: self.limit,
            offset: (self.page - 1) * self.limit,
        }
    }

    /// Apply the field selection to a serialized row. `id` is always kept;
    /// the default projection drops only the revision counter.
    pub fn project(&self, row: serde_json::Value) -> serde_json::Value {
        match row {
            serde_json::Value::Object(mut map) => {
                match &self.fields {
                    Some(fields) => {
                        map.retain(|key, _| {
                            key == "id" || fields.iter().any(|field| field.json_key() == key)
                        });
                    }
                    None => {
                        map.remove(BookField::Revision.json_key());
                    }
                }
                serde_json::Value::Object(map)
            }
            other => other,
        }
    }
}

fn coerce(field: BookField, comparator: Comparator, raw: &str) -> Option<BindValue> {
    // Regular-expression matching only makes sense against text columns
    if comparator == Comparator::Regex {
        return match field.kind() {
            FieldKind::Text => Some(BindValue::Text(raw.to_string())),
            _ => None,
        };
    }
    match field.kind() {
        FieldKind::Int => raw.parse::<i64>().ok().map(BindValue::Int),
        FieldKind::Bool => match raw {
            "true" => Some(BindValue::Bool(true)),
            "false" => Some(BindValue::Bool(false)),
            _ => None,
        },
        FieldKind::Text => Some(BindValue::Text(raw.to_string())),
        FieldKind::Timestamp => parse_timestamp(raw).map(BindValue::Timestamp),
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .map(|date| DateTime::from_naive_utc_and_offset(date.and_time(NaiveTime::MIN), Utc))
}

/// Escape LIKE metacharacters so the keyword is matched literally
fn escape_like(keyword: &str) -> String {
    keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_with_no_parameters() {
        let spec = QuerySpec::from_params(&HashMap::new());
        let compiled = spec.compile();

        assert_eq!(compiled.where_clause, "TRUE");
        assert!(compiled.binds.is_empty());
        assert_eq!(compiled.order_clause, "created_at DESC");
        assert_eq!(compiled.limit, DEFAULT_LIMIT);
        assert_eq!(compiled.offset, 0);
    }

    #[test]
    fn limit_is_capped_at_maximum() {
        let spec = QuerySpec::from_params(&params(&[("limit", "1000")]));
        assert_eq!(spec.compile().limit, MAX_LIMIT);
    }

    #[test]
    fn page_zero_and_negative_clamp_to_one() {
        for page in ["0", "-3"] {
            let spec = QuerySpec::from_params(&params(&[("page", page)]));
            assert_eq!(spec.compile().offset, 0);
        }
    }

    #[test]
    fn unparseable_page_and_limit_fall_back_to_defaults() {
        let spec = QuerySpec::from_params(&params(&[("page", "abc"), ("limit", "many")]));
        let compiled = spec.compile();
        assert_eq!(compiled.limit, DEFAULT_LIMIT);
        assert_eq!(compiled.offset, 0);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let spec = QuerySpec::from_params(&params(&[("page", "3"), ("limit", "10")]));
        let compiled = spec.compile();
        assert_eq!(compiled.limit, 10);
        assert_eq!(compiled.offset, 20);
    }

    #[test]
    fn bare_parameter_becomes_equality_filter() {
        let spec = QuerySpec::new().filter(&params(&[("genre", "Fantasy")]));
        let compiled = spec.compile();

        assert_eq!(compiled.where_clause, "genre = $1");
        assert_eq!(compiled.binds, vec![BindValue::Text("Fantasy".to_string())]);
    }

    #[test]
    fn bracketed_key_selects_comparator() {
        let spec = QuerySpec::new().filter(&params(&[("copies[gte]", "2")]));
        let compiled = spec.compile();

        assert_eq!(compiled.where_clause, "copies >= $1");
        assert_eq!(compiled.binds, vec![BindValue::Int(2)]);
    }

    #[test]
    fn regex_comparator_on_text_field() {
        let spec = QuerySpec::new().filter(&params(&[("title[regex]", "dune")]));
        let compiled = spec.compile();

        assert_eq!(compiled.where_clause, "title ~* $1");
        assert_eq!(compiled.binds, vec![BindValue::Text("dune".to_string())]);
    }

    #[test]
    fn regex_on_numeric_field_matches_nothing() {
        let spec = QuerySpec::new().filter(&params(&[("copies[regex]", "2")]));
        assert_eq!(spec.compile().where_clause, "FALSE");
    }

    #[test]
    fn unknown_field_matches_nothing() {
        let spec = QuerySpec::new().filter(&params(&[("publisher", "Chilton")]));
        assert_eq!(spec.compile().where_clause, "FALSE");
    }

    #[test]
    fn unknown_operator_matches_nothing() {
        let spec = QuerySpec::new().filter(&params(&[("copies[near]", "2")]));
        assert_eq!(spec.compile().where_clause, "FALSE");
    }

    #[test]
    fn uncoercible_value_matches_nothing() {
        let spec = QuerySpec::new().filter(&params(&[("copies", "lots")]));
        assert_eq!(spec.compile().where_clause, "FALSE");
    }

    #[test]
    fn boolean_filter_is_typed() {
        let spec = QuerySpec::new().filter(&params(&[("available", "true")]));
        let compiled = spec.compile();
        assert_eq!(compiled.where_clause, "available = $1");
        assert_eq!(compiled.binds, vec![BindValue::Bool(true)]);
    }

    #[test]
    fn keyword_search_spans_title_author_genre() {
        let spec = QuerySpec::new().search(&params(&[("keyword", "dune")]));
        let compiled = spec.compile();

        assert_eq!(
            compiled.where_clause,
            "(title ILIKE $1 OR author ILIKE $1 OR genre ILIKE $1)"
        );
        assert_eq!(compiled.binds, vec![BindValue::Text("%dune%".to_string())]);
    }

    #[test]
    fn keyword_like_metacharacters_are_escaped() {
        let spec = QuerySpec::new().search(&params(&[("keyword", "50%_off")]));
        assert_eq!(
            spec.compile().binds,
            vec![BindValue::Text("%50\\%\\_off%".to_string())]
        );
    }

    #[test]
    fn placeholders_stay_sequential_across_filters_and_keyword() {
        let spec = QuerySpec::new()
            .filter(&params(&[("genre", "Fantasy"), ("keyword", "dune")]))
            .search(&params(&[("keyword", "dune")]));
        let compiled = spec.compile();

        assert_eq!(
            compiled.where_clause,
            "genre = $1 AND (title ILIKE $2 OR author ILIKE $2 OR genre ILIKE $2)"
        );
        assert_eq!(compiled.binds.len(), 2);
    }

    #[test]
    fn sort_parses_direction_prefix() {
        let spec = QuerySpec::new().sort(&params(&[("sort", "title,-copies")]));
        assert_eq!(spec.compile().order_clause, "title ASC, copies DESC");
    }

    #[test]
    fn unknown_sort_fields_are_skipped() {
        let spec = QuerySpec::new().sort(&params(&[("sort", "-createdAt,bogus")]));
        assert_eq!(spec.compile().order_clause, "created_at DESC");
    }

    #[test]
    fn default_projection_drops_revision_only() {
        let spec = QuerySpec::new();
        let projected = spec.project(json!({
            "id": 1,
            "title": "Dune",
            "revision": 4,
            "createdAt": "2024-01-01T00:00:00Z"
        }));

        assert_eq!(
            projected,
            json!({"id": 1, "title": "Dune", "createdAt": "2024-01-01T00:00:00Z"})
        );
    }

    #[test]
    fn explicit_fields_keep_id_and_selection() {
        let spec = QuerySpec::new().select_fields(&params(&[("fields", "title,author")]));
        let projected = spec.project(json!({
            "id": 1,
            "title": "Dune",
            "author": "Herbert",
            "genre": "SF",
            "revision": 0
        }));

        assert_eq!(
            projected,
            json!({"id": 1, "title": "Dune", "author": "Herbert"})
        );
    }

    #[test]
    fn timestamp_filter_accepts_plain_dates() {
        let spec = QuerySpec::new().filter(&params(&[("createdAt[gte]", "2024-06-01")]));
        let compiled = spec.compile();
        assert_eq!(compiled.where_clause, "created_at >= $1");
        assert!(matches!(compiled.binds[0], BindValue::Timestamp(_)));
    }
}
