use std::collections::HashMap;

use crate::data_models::{
    Article, BROAD_SEARCH, CriteriaUsed, Report, SearchCriteria, StructuredResult, SummaryRecord,
};
use crate::summarizer::BatchSummarizer;

pub const NO_MATCHES: &str = "No se encontraron coincidencias.";
pub const NO_COMMON_TOPIC: &str = "No se encontraron temas comunes.";
/// Stands in for a summary missing at some position.
pub const SUMMARY_NOT_GENERATED: &str = "Resumen no generado.";

/// Summarize the first `max_items` matches and build both the readable
/// report and the structured result.
pub async fn summarize_items(
    items: &[Article],
    max_items: usize,
    criteria: &SearchCriteria,
    summarizer: &BatchSummarizer,
) -> Report {
    let selected = &items[..max_items.min(items.len())];
    if selected.is_empty() {
        return Report {
            text: NO_MATCHES.to_string(),
            structured: None,
        };
    }

    let summaries = summarizer.summarize(selected).await;
    let records = summary_records(selected, &summaries);
    let tldr = headline(selected);

    let structured = StructuredResult {
        criteria: CriteriaUsed {
            query: criteria.query.clone(),
            field: criteria
                .field
                .clone()
                .filter(|f| !f.is_empty())
                .unwrap_or_else(|| BROAD_SEARCH.to_string()),
            resolved_items: selected.len(),
        },
        total_found: items.len(),
        items: records,
        tldr,
    };

    Report {
        text: render_text(&structured),
        structured: Some(structured),
    }
}

fn summary_records(items: &[Article], summaries: &[String]) -> Vec<SummaryRecord> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| SummaryRecord {
            id: item.display_field("id"),
            title: item.display_field("title"),
            summary: summaries
                .get(i)
                .cloned()
                .unwrap_or_else(|| SUMMARY_NOT_GENERATED.to_string()),
            source: item.display_field("url"),
        })
        .collect()
}

/// Most frequent topic across `items`, ties going to the topic seen first.
pub fn most_common_topic(items: &[Article]) -> Option<&str> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    let mut order: Vec<&str> = Vec::new();
    for topic in items.iter().flat_map(|item| item.topics()) {
        let count = counts.entry(topic).or_insert(0);
        if *count == 0 {
            order.push(topic);
        }
        *count += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for topic in order {
        let count = counts[topic];
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((topic, count));
        }
    }
    best.map(|(topic, _)| topic)
}

pub fn headline(items: &[Article]) -> String {
    match most_common_topic(items) {
        Some(topic) => format!("El tema más común en los resultados es '{topic}'."),
        None => NO_COMMON_TOPIC.to_string(),
    }
}

fn render_text(result: &StructuredResult) -> String {
    let mut text = format!("Resumen de {} resultados\n", result.items.len());
    text.push_str(&"-".repeat(30));
    text.push('\n');
    for record in &result.items {
        text.push_str(&format!("- ID: {}\n", record.id));
        text.push_str(&format!("  Título: {}\n", record.title));
        text.push_str(&format!("  Resumen (IA): {}\n", record.summary));
        text.push_str(&format!("  Fuente: {}\n\n", record.source));
    }
    text.push_str(&format!("TL;DR: {}", result.tldr));
    text
}
