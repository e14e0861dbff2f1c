use super::*;
use crate::test_support::snippet;
use chrono::Duration;

fn titles<'a>(view: &FilteredView<'a>) -> Vec<&'a str> {
    view.snippets().map(|s| s.title.as_str()).collect()
}

#[test]
fn selected_tags_use_and_semantics() {
    let collection = SnippetCollection::new(vec![
        snippet("ab", "x", &["a", "b"]),
        snippet("a", "x", &["a"]),
        snippet("b", "x", &["b"]),
    ]);
    let state = FilterState {
        tags: vec!["a".into(), "b".into()],
        ..Default::default()
    };
    assert_eq!(titles(&collection.recompute(&state)), vec!["ab"]);
}

#[test]
fn empty_query_keeps_collection_order() {
    let collection = SnippetCollection::new(vec![
        snippet("zeta", "1", &[]),
        snippet("alpha", "2", &[]),
        snippet("mid", "3", &[]),
    ]);
    let view = collection.recompute(&FilterState {
        query: "   ".into(),
        ..Default::default()
    });
    assert_eq!(titles(&view), vec!["zeta", "alpha", "mid"]);
    assert!(view.hits.iter().all(|hit| hit.relevance.is_none()));
}

#[test]
fn query_keeps_only_matches_in_descending_relevance() {
    let mut described = snippet("misc", "x = 1", &[]);
    described.description = Some("parser".into());
    let collection = SnippetCollection::new(vec![
        described,
        snippet("unrelated", "y = 2", &[]),
        snippet("parser", "z = 3", &[]),
    ]);

    let view = collection.recompute(&FilterState {
        query: "parser".into(),
        ..Default::default()
    });
    assert_eq!(titles(&view), vec!["parser", "misc"]);
    let relevance: Vec<f64> = view.hits.iter().map(|h| h.relevance.unwrap()).collect();
    assert!(relevance.windows(2).all(|w| w[0] >= w[1]), "{:?}", relevance);
}

#[test]
fn query_tolerates_typos_within_threshold() {
    let collection = SnippetCollection::new(vec![
        snippet("fetch helper", "a", &[]),
        snippet("cache", "b", &[]),
    ]);
    let view = collection.recompute(&FilterState {
        query: "fecth".into(),
        ..Default::default()
    });
    assert_eq!(titles(&view), vec!["fetch helper"]);

    let view = collection.recompute(&FilterState {
        query: "qqqqqq".into(),
        ..Default::default()
    });
    assert!(view.is_empty());
}

#[test]
fn tags_are_searchable() {
    let collection = SnippetCollection::new(vec![
        snippet("one", "a", &["kubernetes"]),
        snippet("two", "b", &[]),
    ]);
    let view = collection.recompute(&FilterState {
        query: "kubernetes".into(),
        ..Default::default()
    });
    assert_eq!(titles(&view), vec!["one"]);
}

#[test]
fn folder_and_favorite_filters_narrow_exactly() {
    let mut in_f = snippet("in f", "a", &[]);
    in_f.folder_id = Some("f".into());
    in_f.is_favorite = true;
    let mut in_g = snippet("in g", "b", &[]);
    in_g.folder_id = Some("g".into());
    in_g.is_favorite = true;
    let mut plain = snippet("plain", "c", &[]);
    plain.folder_id = Some("f".into());
    let collection = SnippetCollection::new(vec![in_f, in_g, plain]);

    let mut state = FilterState {
        folder_id: Some("f".into()),
        ..Default::default()
    };
    assert_eq!(titles(&collection.recompute(&state)), vec!["in f", "plain"]);
    state.favorites_only = true;
    assert_eq!(titles(&collection.recompute(&state)), vec!["in f"]);
    state.folder_id = None;
    assert_eq!(titles(&collection.recompute(&state)), vec!["in f", "in g"]);
}

#[test]
fn filter_state_helpers() {
    let mut state = FilterState::default();
    assert!(!state.is_active());
    state.toggle_tag("rust");
    state.toggle_tag("cli");
    state.toggle_tag("rust");
    assert_eq!(state.tags, vec!["cli"]);
    state.folder_id = Some("f".into());
    state.forget_folder("g");
    assert_eq!(state.folder_id.as_deref(), Some("f"));
    state.forget_folder("f");
    assert_eq!(state.folder_id, None);
    assert!(state.is_active());
    state.clear();
    assert_eq!(state, FilterState::default());
}

#[test]
fn created_is_prepended_and_updated_resorts() {
    let mut old = snippet("old", "a", &[]);
    old.updated_at -= Duration::minutes(10);
    let mut older = snippet("older", "b", &[]);
    older.updated_at -= Duration::minutes(20);
    let mut collection = SnippetCollection::new(vec![old.clone(), older.clone()]);

    collection.apply_created(snippet("new", "c", &[]));
    assert_eq!(collection.snippets()[0].title, "new");

    let mut touched = older;
    touched.title = "older edited".into();
    touched.updated_at = chrono::Utc::now() + Duration::minutes(1);
    collection.apply_updated(touched);
    let order: Vec<&str> = collection.snippets().iter().map(|s| s.title.as_str()).collect();
    assert_eq!(order, vec!["older edited", "new", "old"]);

    // The index follows the mutation.
    let view = collection.recompute(&FilterState {
        query: "edited".into(),
        ..Default::default()
    });
    assert_eq!(titles(&view), vec!["older edited"]);
}

#[test]
fn deleted_and_favorite_updates_apply_in_place() {
    let a = snippet("a", "1", &[]);
    let b = snippet("b", "2", &[]);
    let mut collection = SnippetCollection::new(vec![a.clone(), b.clone()]);

    let mut fav = b.clone();
    fav.is_favorite = true;
    collection.apply_favorite(fav);
    assert!(collection.get(&b.id).unwrap().is_favorite);
    assert_eq!(collection.snippets()[1].id, b.id);

    assert!(collection.apply_deleted(&a.id));
    assert!(!collection.apply_deleted(&a.id));
    assert_eq!(collection.len(), 1);
}

#[test]
fn folder_delete_unfiles_only_members() {
    let mut s1 = snippet("s1", "a", &[]);
    s1.folder_id = Some("F".into());
    let mut s2 = snippet("s2", "b", &[]);
    s2.folder_id = Some("G".into());
    let mut collection = SnippetCollection::new(vec![s1.clone(), s2.clone()]);

    assert_eq!(collection.apply_folder_deleted("F"), 1);
    assert_eq!(collection.get(&s1.id).unwrap().folder_id, None);
    assert_eq!(collection.get(&s2.id).unwrap().folder_id.as_deref(), Some("G"));
}

#[test]
fn empty_states_are_distinct() {
    let empty = SnippetCollection::default();
    let view = empty.recompute(&FilterState::default());
    assert_eq!(empty.empty_state(&view, false), Some(EmptyState::Unauthorized));
    assert_eq!(empty.empty_state(&view, true), Some(EmptyState::NoSnippets));

    let collection = SnippetCollection::new(vec![snippet("a", "1", &["x"])]);
    let none = collection.recompute(&FilterState {
        tags: vec!["y".into()],
        ..Default::default()
    });
    assert_eq!(collection.empty_state(&none, true), Some(EmptyState::NoMatches));
    let all = collection.recompute(&FilterState::default());
    assert_eq!(collection.empty_state(&all, true), None);
    assert_ne!(EmptyState::NoMatches.message(), EmptyState::NoSnippets.message());
}

#[test]
fn all_tags_are_sorted_and_unique() {
    let collection = SnippetCollection::new(vec![
        snippet("a", "1", &["web", "rust"]),
        snippet("b", "2", &["rust"]),
    ]);
    assert_eq!(collection.all_tags(), vec!["rust", "web"]);
}

#[test]
fn custom_weights_change_ranking() {
    let mut by_description = snippet("zzz", "1", &[]);
    by_description.description = Some("needle".into());
    let by_title = snippet("needle", "2", &[]);
    let snippets = vec![by_description, by_title];

    let default_hits = SearchIndex::build(&snippets).search("needle");
    assert_eq!(default_hits[0].index, 1);

    let options = SearchOptions {
        weights: FieldWeights {
            title: 0.0,
            code: 0.0,
            tags: 0.0,
            description: 1.0,
        },
        ..Default::default()
    };
    let hits = SearchIndex::with_options(&snippets, options).search("needle");
    // A zero-weight title match contributes EPSILON^0 = 1, the worst score.
    assert_eq!(hits[0].index, 0);
}
