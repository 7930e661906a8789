use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Rendered in place of any absent or empty field.
pub const MISSING_FIELD: &str = "dato no disponible";

/// Sentinel shown as the filter field when the search scanned every field.
pub const BROAD_SEARCH: &str = "búsqueda amplia";

/// One catalog entry. Articles are kept as raw JSON objects: the field filter
/// may name any key and dedup falls back to the encoding of the whole record.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct Article(Map<String, Value>);

impl Article {
    pub fn new(fields: Map<String, Value>) -> Article {
        Article(fields)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The identifier, if set to anything other than `null`.
    pub fn id(&self) -> Option<&Value> {
        self.0.get("id").filter(|v| !v.is_null())
    }

    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Terms of the keyword objects; entries without a string `term` are skipped.
    pub fn keyword_terms(&self) -> impl Iterator<Item = &str> {
        self.0
            .get("keywords")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(|kw| kw.get("term").and_then(Value::as_str))
    }

    /// Topic strings; non-string entries are skipped.
    pub fn topics(&self) -> impl Iterator<Item = &str> {
        self.0
            .get("topics")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
            .filter_map(Value::as_str)
    }

    /// Presentation form of a field, falling back to [`MISSING_FIELD`] when the
    /// field is absent, `null`, or an empty string.
    pub fn display_field(&self, key: &str) -> String {
        match self.0.get(key) {
            None | Some(Value::Null) => MISSING_FIELD.to_string(),
            Some(Value::String(s)) if s.is_empty() => MISSING_FIELD.to_string(),
            Some(value) => value_text(value),
        }
    }

    /// Identity used to drop repeated matches.
    pub fn dedup_key(&self) -> DedupKey {
        match self.id() {
            Some(id) => DedupKey::Id(id.to_string()),
            None => DedupKey::Canonical(canonical_json(&Value::Object(self.0.clone()))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Id(String),
    Canonical(String),
}

/// Compact JSON with object keys sorted at every depth.
pub fn canonical_json(value: &Value) -> String {
    fn sorted(value: &Value) -> Value {
        match value {
            Value::Object(map) => {
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                Value::Object(keys.into_iter().map(|k| (k.clone(), sorted(&map[k]))).collect())
            }
            Value::Array(items) => Value::Array(items.iter().map(sorted).collect()),
            other => other.clone(),
        }
    }
    sorted(value).to_string()
}

/// Plain-text form of a JSON value: strings unquoted, everything else as JSON.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Result of filtering the catalog.
#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub matches: Vec<Article>,
    /// Field filter that was actually applied; `None` means broad search.
    pub effective_field: Option<String>,
    /// Advisory note explaining a fallback, if one happened.
    pub note: Option<String>,
}

/// What the caller asked for, echoed back in the structured result.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    pub query: String,
    pub field: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CriteriaUsed {
    #[serde(rename = "criterio_busqueda")]
    pub query: String,
    #[serde(rename = "campo_filtro")]
    pub field: String,
    #[serde(rename = "max_items_resueltos")]
    pub resolved_items: usize,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SummaryRecord {
    pub id: String,
    #[serde(rename = "titulo")]
    pub title: String,
    #[serde(rename = "resumen_breve")]
    pub summary: String,
    #[serde(rename = "fuente")]
    pub source: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StructuredResult {
    #[serde(rename = "criterios_utilizados")]
    pub criteria: CriteriaUsed,
    #[serde(rename = "total_encontrados")]
    pub total_found: usize,
    #[serde(rename = "items_resumidos")]
    pub items: Vec<SummaryRecord>,
    pub tldr: String,
}

/// Readable report plus the structured result; `structured` is `None` when
/// nothing matched.
#[derive(Debug, Clone)]
pub struct Report {
    pub text: String,
    pub structured: Option<StructuredResult>,
}

impl Report {
    /// Structured result as JSON, `{}` when there is none.
    pub fn structured_json(&self) -> Value {
        match &self.structured {
            Some(result) => {
                serde_json::to_value(result).unwrap_or_else(|_| Value::Object(Map::new()))
            }
            None => Value::Object(Map::new()),
        }
    }
}
