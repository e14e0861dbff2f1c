//! Text and JSON rendering for CLI results.

use serde::Serialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt::Write as _;
use std::path::Path;
use tagsnip_core::detection::languages::{language_by_id, language_for_file_name};
use tagsnip_core::detection;
use tagsnip_core::models::folder::FolderSummary;
use tagsnip_core::models::snippet::Snippet;
use tagsnip_core::models::tag::TagSummary;
use tagsnip_core::models::transfer::{ImportResult, StatsResponse};
use tagsnip_core::models::user::UserProfile;
use tagsnip_core::search::FilteredView;

pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

fn star(snippet: &Snippet) -> &'static str {
    if snippet.is_favorite {
        "*"
    } else {
        " "
    }
}

pub(crate) fn format_snippet_rows(view: &FilteredView<'_>, json: bool) -> anyhow::Result<String> {
    if json {
        let snippets: Vec<&Snippet> = view.snippets().collect();
        return to_json(&snippets);
    }
    let mut out = String::new();
    for hit in &view.hits {
        let snippet = hit.snippet;
        let _ = write!(
            out,
            "{} {}  {:<12} {}",
            star(snippet),
            snippet.id,
            snippet.language,
            snippet.title
        );
        if !snippet.tags.is_empty() {
            let _ = write!(out, "  #{}", snippet.tags.join(" #"));
        }
        out.push('\n');
    }
    let _ = write!(out, "{} snippet(s)", view.len());
    Ok(out)
}

pub(crate) fn format_snippet(snippet: &Snippet, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(snippet);
    }
    let mut out = String::new();
    let _ = writeln!(out, "{}{}", snippet.title, if snippet.is_favorite { " *" } else { "" });
    let _ = writeln!(
        out,
        "id: {}  language: {}  updated: {}",
        snippet.id,
        language_by_id(&snippet.language).name,
        snippet.updated_at.format("%Y-%m-%d %H:%M")
    );
    if !snippet.tags.is_empty() {
        let _ = writeln!(out, "tags: {}", snippet.tags.join(", "));
    }
    if let Some(description) = snippet.description.as_deref().filter(|d| !d.is_empty()) {
        let _ = writeln!(out, "{}", description);
    }
    out.push('\n');
    out.push_str(&snippet.code);
    Ok(out)
}

pub(crate) fn format_profile(profile: &UserProfile, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(profile);
    }
    Ok(format!(
        "{} (id {}, member since {})",
        profile.username,
        profile.id,
        profile.created_at.format("%Y-%m-%d")
    ))
}

pub(crate) fn format_folders(folders: &[FolderSummary], json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(folders);
    }
    if folders.is_empty() {
        return Ok("No folders".to_string());
    }
    let lines: Vec<String> = folders
        .iter()
        .map(|f| format!("{}  {:<8} {} ({})", f.id, f.color.as_str(), f.name, f.snippet_count))
        .collect();
    Ok(lines.join("\n"))
}

pub(crate) fn format_tags(tags: &[TagSummary], json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(tags);
    }
    if tags.is_empty() {
        return Ok("No tags".to_string());
    }
    let lines: Vec<String> = tags
        .iter()
        .map(|t| format!("#{} ({})", t.name, t.snippet_count))
        .collect();
    Ok(lines.join("\n"))
}

pub(crate) fn format_tabs(
    order: &[String],
    active: Option<&str>,
    titles: &HashMap<String, String>,
    json: bool,
) -> anyhow::Result<String> {
    if json {
        return to_json(&json!({ "tabs": order, "active": active }));
    }
    if order.is_empty() {
        return Ok("No open tabs".to_string());
    }
    let lines: Vec<String> = order
        .iter()
        .enumerate()
        .map(|(idx, id)| {
            let marker = if active == Some(id.as_str()) { ">" } else { " " };
            match titles.get(id) {
                Some(title) => format!("{} {}. {} ({})", marker, idx, title, id),
                None => format!("{} {}. {}", marker, idx, id),
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

pub(crate) fn format_import(result: &ImportResult, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(result);
    }
    let mut out = format!("Imported {}, skipped {}", result.imported, result.skipped);
    for error in &result.errors {
        let _ = write!(out, "\n  {}", error);
    }
    Ok(out)
}

pub(crate) fn format_stats(stats: &StatsResponse, json: bool) -> anyhow::Result<String> {
    if json {
        return to_json(stats);
    }
    let mut out = format!(
        "{} snippet(s), {} tag(s)",
        stats.total_snippets, stats.total_tags
    );
    let mut languages: Vec<(&String, &usize)> = stats.language_distribution.iter().collect();
    languages.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (language, count) in languages {
        let _ = write!(out, "\n  {:<12} {}", language, count);
    }
    if !stats.recent_snippets.is_empty() {
        out.push_str("\nRecent:");
        for snippet in &stats.recent_snippets {
            let _ = write!(out, "\n  {}  {}", snippet.id, snippet.title);
        }
    }
    Ok(out)
}

pub(crate) fn format_settings(value: &Value, json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string(value)?);
    }
    to_json(value)
}

/// Detection result for `code`, falling back to the file name.
pub(crate) fn format_detection(code: &str, file: Option<&Path>, json: bool) -> anyhow::Result<String> {
    let detected = detection::detect(code);
    let from_name = file.and_then(Path::to_str).and_then(language_for_file_name);
    let (language, source) = match (detected, from_name) {
        (Some(language), _) => (Some(language), "content"),
        (None, Some(language)) => (Some(language), "file name"),
        (None, None) => (None, "none"),
    };
    if json {
        let scores: serde_json::Map<String, Value> = detection::scores(code)
            .into_iter()
            .filter(|(_, score)| *score > 0)
            .map(|(id, score)| (id.to_string(), json!(score)))
            .collect();
        return to_json(&json!({ "language": language, "source": source, "scores": scores }));
    }
    Ok(match language {
        Some(language) => format!("{} (from {})", language, source),
        None => "unknown".to_string(),
    })
}
