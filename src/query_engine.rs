use std::collections::HashSet;

use serde_json::Value;

use crate::data_models::{Article, DedupKey, SearchOutcome, value_text};

/// Filter `catalog` for `query` (case-insensitive substring), optionally
/// restricted to one field, and drop repeated records keeping the first.
///
/// A field filter is only honoured if the *first* record has that key;
/// otherwise the search falls back to broad mode and an advisory note is
/// returned. Heterogeneous catalogs can therefore lose a valid filter.
pub fn search_items(catalog: &[Article], query: &str, field: Option<&str>) -> SearchOutcome {
    let needle = query.to_lowercase();

    let mut note = None;
    let field = match (field.filter(|f| !f.is_empty()), catalog.first()) {
        (Some(f), Some(first)) if !first.contains_key(f) => {
            note = Some(format!("campo_filtro '{f}' no válido; se usó búsqueda amplia."));
            None
        }
        (field, _) => field,
    };

    let matched = catalog.iter().filter(|article| match field {
        Some(f) => matches_field(article, f, &needle),
        None => matches_broad(article, &needle),
    });

    SearchOutcome {
        matches: dedup(matched),
        effective_field: field.map(str::to_string),
        note,
    }
}

/// Match a single named field: any element of a list, or the scalar itself.
fn matches_field(article: &Article, field: &str, needle: &str) -> bool {
    match article.get(field) {
        Some(Value::Array(items)) => items.iter().any(|item| contains(&value_text(item), needle)),
        Some(value) if is_truthy(value) => contains(&value_text(value), needle),
        _ => false,
    }
}

/// Title, then keyword terms, then topics; stops at the first hit.
fn matches_broad(article: &Article, needle: &str) -> bool {
    article.title().is_some_and(|t| contains(t, needle))
        || article.keyword_terms().any(|term| contains(term, needle))
        || article.topics().any(|topic| contains(topic, needle))
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

/// Empty and zero-like scalars never match a field filter.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Keep the first occurrence of every [`DedupKey`], preserving order.
pub fn dedup<'a>(articles: impl IntoIterator<Item = &'a Article>) -> Vec<Article> {
    let mut seen: HashSet<DedupKey> = HashSet::new();
    articles
        .into_iter()
        .filter(|article| seen.insert(article.dedup_key()))
        .cloned()
        .collect()
}

#[test]
fn test_dedup_keeps_first_occurrence() {
    let catalog: Vec<Article> = serde_json::from_value(serde_json::json!([
        {"id": 1, "title": "first"},
        {"id": 2, "title": "second"},
        {"id": 1, "title": "first again"},
        {"title": "no id"},
        {"title": "no id"},
    ]))
    .unwrap();

    let got = dedup(&catalog);
    let titles: Vec<_> = got.iter().filter_map(Article::title).collect();
    assert_eq!(titles, vec!["first", "second", "no id"]);
}

#[test]
fn test_truthiness_of_scalars() {
    use serde_json::json;
    assert!(!is_truthy(&json!(0)));
    assert!(!is_truthy(&json!("")));
    assert!(!is_truthy(&json!(false)));
    assert!(is_truthy(&json!(10)));
    assert!(is_truthy(&json!("x")));
}
