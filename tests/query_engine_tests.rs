use serde_json::json;

use gleaner::data_models::Article;
use gleaner::query_engine::search_items;

mod test_helpers {
    use super::*;

    pub fn catalog(value: serde_json::Value) -> Vec<Article> {
        serde_json::from_value(value).unwrap()
    }

    pub fn ids(articles: &[Article]) -> Vec<i64> {
        articles
            .iter()
            .filter_map(|a| a.id().and_then(|v| v.as_i64()))
            .collect()
    }
}

use test_helpers::*;

#[test]
fn test_single_record_example() {
    let data = catalog(json!([
        {"id": 1, "title": "Bone density in microgravity", "topics": ["bone", "space medicine"]}
    ]));

    let outcome = search_items(&data, "bone", None);
    assert_eq!(outcome.matches.len(), 1);
    assert!(outcome.note.is_none());

    let outcome = search_items(&data, "gravity wave", None);
    assert!(outcome.matches.is_empty());
    assert!(outcome.note.is_none());
}

#[test]
fn test_broad_search_is_case_insensitive() {
    let data = catalog(json!([
        {"id": 1, "title": "MICROGRAVITY effects"},
        {"id": 2, "title": "other", "keywords": [{"term": "MicroGravity"}]},
        {"id": 3, "title": "other", "topics": ["microgravity research"]},
        {"id": 4, "title": "unrelated", "topics": ["botany"]}
    ]));

    let outcome = search_items(&data, "microGRAVITY", None);
    assert_eq!(ids(&outcome.matches), vec![1, 2, 3]);
}

#[test]
fn test_broad_search_only_scans_title_keywords_topics() {
    let data = catalog(json!([
        {"id": 1, "title": "x", "abstract": "bone"},
        {"id": 2, "title": "x", "url": "https://bone.example"}
    ]));
    assert!(search_items(&data, "bone", None).matches.is_empty());
}

#[test]
fn test_duplicate_ids_keep_first_position() {
    let data = catalog(json!([
        {"id": 1, "title": "unrelated", "topics": ["bone"]},
        {"id": 2, "title": "bone marrow"},
        {"id": 1, "title": "bone again", "keywords": [{"term": "bone"}]},
        {"id": 3, "title": "bone structure"}
    ]));

    let outcome = search_items(&data, "bone", None);
    assert_eq!(ids(&outcome.matches), vec![1, 2, 3]);
    assert_eq!(outcome.matches[0].get("title"), Some(&json!("unrelated")));
}

#[test]
fn test_records_without_id_dedup_by_content() {
    let data = catalog(json!([
        {"title": "bone a", "topics": ["x"]},
        {"topics": ["x"], "title": "bone a"},
        {"title": "bone b"},
        {"id": null, "title": "bone a", "topics": ["x"]}
    ]));

    let outcome = search_items(&data, "bone", None);
    assert_eq!(outcome.matches.len(), 3);
}

#[test]
fn test_field_filter_on_list_and_scalar() {
    let data = catalog(json!([
        {"id": 1, "title": "alpha", "topics": ["bone", "space"], "year": 2020},
        {"id": 2, "title": "beta bone", "topics": ["muscle"], "year": 2021},
        {"id": 3, "title": "gamma", "topics": ["Bone health"], "year": 0}
    ]));

    let outcome = search_items(&data, "bone", Some("topics"));
    assert_eq!(ids(&outcome.matches), vec![1, 3]);
    assert_eq!(outcome.effective_field.as_deref(), Some("topics"));
    assert!(outcome.note.is_none());

    let outcome = search_items(&data, "bone", Some("title"));
    assert_eq!(ids(&outcome.matches), vec![2]);

    let outcome = search_items(&data, "202", Some("year"));
    assert_eq!(ids(&outcome.matches), vec![1, 2]);

    // zero is never a match for a field filter
    let outcome = search_items(&data, "0", Some("year"));
    assert_eq!(ids(&outcome.matches), vec![1, 2]);
}

#[test]
fn test_field_filter_matches_inside_keyword_objects() {
    let data = catalog(json!([
        {"id": 1, "keywords": [{"term": "Radiation"}]},
        {"id": 2, "keywords": [{"term": "bone"}]}
    ]));

    let outcome = search_items(&data, "radiation", Some("keywords"));
    assert_eq!(ids(&outcome.matches), vec![1]);
}

#[test]
fn test_unknown_field_falls_back_to_broad_search() {
    let data = catalog(json!([
        {"id": 1, "title": "bone density"},
        {"id": 2, "title": "other", "author": "bone"}
    ]));

    let outcome = search_items(&data, "bone", Some("author"));
    assert_eq!(ids(&outcome.matches), vec![1]);
    assert!(outcome.effective_field.is_none());
    let note = outcome.note.unwrap();
    assert!(note.contains("'author'"));
    assert!(note.contains("búsqueda amplia"));
}

#[test]
fn test_empty_catalog() {
    let outcome = search_items(&[], "bone", Some("title"));
    assert!(outcome.matches.is_empty());
    assert!(outcome.note.is_none());
}
