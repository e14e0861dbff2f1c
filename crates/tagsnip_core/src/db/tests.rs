//! Database integration tests.

use super::*;
use crate::models::folder::{Folder, FolderColor, UpdateFolderRequest};
use crate::models::snippet::{CreateSnippetRequest, SearchRequest, UpdateSnippetRequest};
use crate::models::tab::TabsState;
use crate::models::transfer::ImportSnippet;
use crate::models::user::User;
use crate::test_support::{create_user, setup_temp_db, snippet};

fn create_owned(db: &Database, user: &str, title: &str, tags: &[&str]) -> crate::models::snippet::Snippet {
    let mut s = snippet(title, "let x = 1;", tags);
    s.user_id = Some(user.to_string());
    TransactionOps::create_snippet(db, s).expect("create")
}

#[test]
fn snippet_create_get_and_owner_scoping() {
    let (db, _temp) = setup_temp_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");

    let created = create_owned(&db, &alice, "hello", &[]);
    assert!(db.snippets.get_owned(&alice, &created.id).unwrap().is_some());
    assert!(db.snippets.get_owned(&bob, &created.id).unwrap().is_none());
    assert!(db.snippets.list(&bob, 10, 0).unwrap().is_empty());
    assert!(!db.snippets.delete(&bob, &created.id).unwrap());
    assert!(db.snippets.delete(&alice, &created.id).unwrap());
    assert!(db.snippets.get(&created.id).unwrap().is_none());
}

#[test]
fn list_is_newest_first_and_paginates() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    let first = create_owned(&db, &user, "first", &[]);
    let second = create_owned(&db, &user, "second", &[]);
    let third = create_owned(&db, &user, "third", &[]);

    // Touch the first so it becomes the most recent.
    TransactionOps::update_snippet(
        &db,
        &user,
        &first.id,
        &UpdateSnippetRequest {
            code: Some("changed".into()),
            ..Default::default()
        },
    )
    .unwrap()
    .expect("updated");

    let all = db.snippets.list(&user, 10, 0).unwrap();
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].id, first.id);
    for pair in all.windows(2) {
        assert!(pair[0].updated_at >= pair[1].updated_at);
    }

    let page = db.snippets.list(&user, 1, 1).unwrap();
    assert_eq!(page.len(), 1);
    assert!(page[0].id == second.id || page[0].id == third.id);
    assert!(db.snippets.list(&user, 0, 0).unwrap().is_empty());
}

#[test]
fn create_ignores_foreign_or_unknown_folder() {
    let (db, _temp) = setup_temp_db();
    let alice = create_user(&db, "alice");
    let bob = create_user(&db, "bob");
    let bobs_folder = Folder::new("bob".into(), FolderColor::Default, bob.clone());
    db.folders.create(&bobs_folder).unwrap();

    let created = TransactionOps::create_from_request(
        &db,
        &alice,
        CreateSnippetRequest {
            folder_id: Some(bobs_folder.id.clone()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(created.folder_id, None);

    let created = TransactionOps::create_from_request(
        &db,
        &alice,
        CreateSnippetRequest {
            folder_id: Some("missing".into()),
            ..Default::default()
        },
    )
    .unwrap();
    assert_eq!(created.folder_id, None);
}

#[test]
fn update_moves_between_folders_and_clears_with_empty_id() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    let folder = Folder::new("work".into(), FolderColor::Blue, user.clone());
    db.folders.create(&folder).unwrap();
    let created = create_owned(&db, &user, "s", &[]);

    let moved = TransactionOps::update_snippet(
        &db,
        &user,
        &created.id,
        &UpdateSnippetRequest {
            folder_id: Some(folder.id.clone()),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(moved.folder_id.as_deref(), Some(folder.id.as_str()));

    let unknown = TransactionOps::update_snippet(
        &db,
        &user,
        &created.id,
        &UpdateSnippetRequest {
            folder_id: Some("nope".into()),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(unknown.folder_id.as_deref(), Some(folder.id.as_str()));

    let cleared = TransactionOps::update_snippet(
        &db,
        &user,
        &created.id,
        &UpdateSnippetRequest {
            folder_id: Some(String::new()),
            ..Default::default()
        },
    )
    .unwrap()
    .unwrap();
    assert_eq!(cleared.folder_id, None);
}

#[test]
fn deleting_folder_unfiles_only_its_members() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    let f = Folder::new("F".into(), FolderColor::Red, user.clone());
    let g = Folder::new("G".into(), FolderColor::Green, user.clone());
    db.folders.create(&f).unwrap();
    db.folders.create(&g).unwrap();

    let mut s1 = snippet("s1", "a", &[]);
    s1.user_id = Some(user.clone());
    s1.folder_id = Some(f.id.clone());
    let s1 = TransactionOps::create_snippet(&db, s1).unwrap();
    let mut s2 = snippet("s2", "b", &[]);
    s2.user_id = Some(user.clone());
    s2.folder_id = Some(g.id.clone());
    let s2 = TransactionOps::create_snippet(&db, s2).unwrap();

    assert_eq!(TransactionOps::delete_folder(&db, &user, &f.id).unwrap(), Some(1));
    assert_eq!(db.snippets.get(&s1.id).unwrap().unwrap().folder_id, None);
    assert_eq!(
        db.snippets.get(&s2.id).unwrap().unwrap().folder_id.as_deref(),
        Some(g.id.as_str())
    );
    assert!(db.folders.get_owned(&user, &f.id).unwrap().is_none());
    assert_eq!(TransactionOps::delete_folder(&db, &user, &f.id).unwrap(), None);
}

#[test]
fn folder_list_is_sorted_by_name_with_derived_counts() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    let zeta = Folder::new("zeta".into(), FolderColor::Default, user.clone());
    let alpha = Folder::new("alpha".into(), FolderColor::Teal, user.clone());
    db.folders.create(&zeta).unwrap();
    db.folders.create(&alpha).unwrap();
    let mut s = snippet("s", "x", &[]);
    s.user_id = Some(user.clone());
    s.folder_id = Some(zeta.id.clone());
    TransactionOps::create_snippet(&db, s).unwrap();

    let folders = db.folders.list_with_counts(&user).unwrap();
    assert_eq!(
        folders.iter().map(|f| f.name.as_str()).collect::<Vec<_>>(),
        vec!["alpha", "zeta"]
    );
    assert_eq!(folders[0].snippet_count, 0);
    assert_eq!(folders[1].snippet_count, 1);

    let renamed = db
        .folders
        .update(
            &user,
            &alpha.id,
            &UpdateFolderRequest {
                name: Some("omega".into()),
                color: None,
            },
        )
        .unwrap()
        .unwrap();
    assert_eq!(renamed.name, "omega");
    assert_eq!(renamed.color, FolderColor::Teal);
}

#[test]
fn tags_are_derived_with_counts_and_cleaned_up() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    create_owned(&db, &user, "one", &["rust", "cli"]);
    create_owned(&db, &user, "two", &["rust"]);
    db.tags.create(&user, "unused").unwrap();

    let tags = db.tags.list_with_counts(&user).unwrap();
    let pairs: Vec<(&str, usize)> = tags.iter().map(|t| (t.name.as_str(), t.snippet_count)).collect();
    assert_eq!(pairs, vec![("cli", 1), ("rust", 2)]);

    assert!(matches!(
        db.tags.create(&user, "rust"),
        Err(crate::error::AppError::Conflict(_))
    ));
    assert_eq!(TransactionOps::cleanup_tags(&db, &user).unwrap(), 1);
    assert_eq!(TransactionOps::cleanup_tags(&db, &user).unwrap(), 0);
}

#[test]
fn deleting_tag_strips_it_from_snippets() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    let s = create_owned(&db, &user, "one", &["rust", "cli"]);
    let rust_id = db
        .tags
        .list_with_counts(&user)
        .unwrap()
        .into_iter()
        .find(|t| t.name == "rust")
        .unwrap()
        .id;

    assert!(TransactionOps::delete_tag(&db, &user, &rust_id).unwrap());
    assert_eq!(db.snippets.get(&s.id).unwrap().unwrap().tags, vec!["cli"]);
    assert!(!TransactionOps::delete_tag(&db, &user, &rust_id).unwrap());
}

#[test]
fn search_is_case_insensitive_with_and_tags_and_language() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    create_owned(&db, &user, "Fetch helper", &["web", "http"]);
    create_owned(&db, &user, "fetch cache", &["web"]);

    let hits = db
        .snippets
        .search(
            &user,
            &SearchRequest {
                query: "FETCH".into(),
                tags: vec!["Web".into(), "http".into()],
                language: Some("JavaScript".into()),
            },
        )
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].title, "Fetch helper");

    let none = db
        .snippets
        .search(
            &user,
            &SearchRequest {
                query: "fetch".into(),
                tags: vec![],
                language: Some("python".into()),
            },
        )
        .unwrap();
    assert!(none.is_empty());
}

#[test]
fn toggle_favorite_flips_flag() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    let s = create_owned(&db, &user, "fav", &[]);
    assert!(db.snippets.toggle_favorite(&user, &s.id).unwrap().unwrap().is_favorite);
    assert!(!db.snippets.toggle_favorite(&user, &s.id).unwrap().unwrap().is_favorite);
    assert!(db.snippets.toggle_favorite(&user, "missing").unwrap().is_none());
}

#[test]
fn tabs_roundtrip_and_reject_multiple_active() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    assert!(db.tabs.get(&user).unwrap().tabs.is_empty());

    let order = vec!["b".to_string(), "a".to_string()];
    db.tabs.put(&user, &TabsState::from_order(&order, Some("a"))).unwrap();
    let (loaded, active) = db.tabs.get(&user).unwrap().into_order();
    assert_eq!(loaded, order);
    assert_eq!(active.as_deref(), Some("a"));

    let mut bad = TabsState::from_order(&order, Some("a"));
    bad.tabs[0].is_active = true;
    assert!(matches!(
        db.tabs.put(&user, &bad),
        Err(crate::error::AppError::BadRequest(_))
    ));
}

#[test]
fn usernames_are_unique() {
    let (db, _temp) = setup_temp_db();
    let user = User::new("alice".into(), "h".into());
    db.users.create(&user).unwrap();
    let dup = User::new("alice".into(), "h2".into());
    assert!(matches!(
        db.users.create(&dup),
        Err(crate::error::AppError::Conflict(_))
    ));
    assert_eq!(db.users.find_by_username("alice").unwrap().unwrap().id, user.id);
    assert!(db.users.find_by_username("bob").unwrap().is_none());
}

#[test]
fn import_skips_oversized_entries() {
    let (db, _temp) = setup_temp_db();
    let user = create_user(&db, "alice");
    let items = vec![
        ImportSnippet {
            title: Some("ok".into()),
            description: None,
            code: Some("print(1)".into()),
            language: Some("python".into()),
            tags: vec!["Py".into()],
            is_favorite: true,
        },
        ImportSnippet {
            title: Some("big".into()),
            description: None,
            code: Some("x".repeat(64)),
            language: None,
            tags: vec![],
            is_favorite: false,
        },
    ];
    let result = TransactionOps::import_snippets(&db, &user, items, 32).unwrap();
    assert_eq!(result.imported, 1);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.errors.len(), 1);

    let stored = db.snippets.all_for_user(&user).unwrap();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].tags, vec!["py"]);
    assert!(stored[0].is_favorite);
}

#[test]
fn reopening_database_keeps_rows() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("db");
    let path = path.to_str().unwrap();
    let id = {
        let db = Database::new(path).unwrap();
        create_user(&db, "alice")
    };
    let db = Database::new(path).unwrap();
    assert!(db.users.get(&id).unwrap().is_some());
}
