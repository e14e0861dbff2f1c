use super::folder::*;
use super::snippet::*;
use super::tab::*;
use super::transfer::*;
use chrono::Duration;

#[test]
fn snippet_serializes_with_camel_case_keys() {
    let mut snippet = Snippet::new("t".into(), "c".into(), "rust".into());
    snippet.folder_id = Some("f1".into());
    let value = serde_json::to_value(&snippet).expect("json");
    assert_eq!(value["folderId"], "f1");
    assert_eq!(value["isFavorite"], false);
    assert!(value.get("createdAt").is_some());
    assert!(value.get("updatedAt").is_some());
}

#[test]
fn snippet_roundtrips_through_bincode() {
    let mut snippet = Snippet::new("title".into(), "code".into(), "go".into());
    snippet.description = Some("desc".into());
    snippet.tags = vec!["a".into()];
    let bytes = bincode::serialize(&snippet).expect("encode");
    let decoded: Snippet = bincode::deserialize(&bytes).expect("decode");
    assert_eq!(decoded, snippet);
}

#[test]
fn from_create_applies_defaults_and_normalizes_tags() {
    let req = CreateSnippetRequest {
        title: Some("   ".into()),
        tags: Some(vec!["Rust".into(), "rust".into(), " ".into()]),
        folder_id: Some("".into()),
        ..Default::default()
    };
    let snippet = Snippet::from_create(req, Some("u1".into()));
    assert_eq!(snippet.title, "Untitled Snippet");
    assert_eq!(snippet.language, "javascript");
    assert_eq!(snippet.code, "");
    assert_eq!(snippet.tags, vec!["rust"]);
    assert_eq!(snippet.folder_id, None);
    assert_eq!(snippet.user_id.as_deref(), Some("u1"));
    assert!(snippet.updated_at >= snippet.created_at);
}

#[test]
fn apply_update_clears_folder_with_empty_string_and_keeps_absent_fields() {
    let mut snippet = Snippet::new("t".into(), "c".into(), "rust".into());
    snippet.folder_id = Some("f".into());
    snippet.description = Some("keep".into());

    snippet.apply_update(&UpdateSnippetRequest {
        folder_id: Some(String::new()),
        ..Default::default()
    });
    assert_eq!(snippet.folder_id, None);
    assert_eq!(snippet.description.as_deref(), Some("keep"));
    assert_eq!(snippet.code, "c");
}

#[test]
fn touch_never_moves_updated_before_created() {
    let mut snippet = Snippet::new("t".into(), "c".into(), "rust".into());
    snippet.created_at += Duration::hours(1);
    snippet.touch();
    assert!(snippet.updated_at >= snippet.created_at);
}

#[test]
fn folder_color_parses_known_names_and_rejects_unknown() {
    assert_eq!("Teal".parse::<FolderColor>(), Ok(FolderColor::Teal));
    assert!("magenta".parse::<FolderColor>().is_err());
    let parsed: Result<CreateFolderRequest, _> =
        serde_json::from_str(r#"{"name":"x","color":"magenta"}"#);
    assert!(parsed.is_err());
}

#[test]
fn tabs_state_roundtrips_order_and_active() {
    let order = vec!["a".to_string(), "b".to_string(), "c".to_string()];
    let state = TabsState::from_order(&order, Some("b"));
    assert_eq!(state.active_count(), 1);
    assert_eq!(state.tabs[2].order, 2);
    assert_eq!(state.into_order(), (order, Some("b".to_string())));
}

#[test]
fn tabs_state_into_order_sorts_by_order_field() {
    let state = TabsState {
        tabs: vec![
            TabEntry { snippet_id: "z".into(), order: 2, is_active: false },
            TabEntry { snippet_id: "y".into(), order: 0, is_active: true },
            TabEntry { snippet_id: "y".into(), order: 1, is_active: false },
        ],
    };
    let (order, active) = state.into_order();
    assert_eq!(order, vec!["y", "z"]);
    assert_eq!(active.as_deref(), Some("y"));
}

#[test]
fn export_document_snippets_parse_as_import_payload() {
    let snippet = Snippet::new("t".into(), "print(1)".into(), "python".into());
    let json = serde_json::json!({ "snippets": [snippet] });
    let import: ImportRequest = serde_json::from_value(json).expect("import");
    assert_eq!(import.snippets[0].code.as_deref(), Some("print(1)"));
    assert_eq!(import.snippets[0].language.as_deref(), Some("python"));
}

#[test]
fn stats_count_languages_and_keep_five_most_recent() {
    let snippets: Vec<Snippet> = (0..7)
        .map(|i| {
            let language = if i % 2 == 0 { "rust" } else { "python" };
            Snippet::new(format!("s{i}"), String::new(), language.to_string())
        })
        .collect();
    let stats = StatsResponse::from_snippets(&snippets, 3);
    assert_eq!(stats.total_snippets, 7);
    assert_eq!(stats.total_tags, 3);
    assert_eq!(stats.language_distribution["rust"], 4);
    assert_eq!(stats.language_distribution["python"], 3);
    assert_eq!(stats.recent_snippets.len(), 5);
    assert_eq!(stats.recent_snippets[0].title, "s0");

    let json = serde_json::to_value(&stats).expect("json");
    assert!(json.get("languageDistribution").is_some());
}

#[test]
fn export_document_carries_format_version() {
    let doc = ExportDocument::new(Vec::new(), Vec::new());
    assert_eq!(doc.version, "2.0");
    let json = serde_json::to_value(&doc).expect("json");
    assert!(json.get("exportedAt").is_some());
}
