//! Client tests against a real in-process server.

use std::future::pending;
use std::sync::Arc;
use std::time::Duration;
use tagsnip_cli::{validate, ApiClient, ClientError, TokenStore};
use tagsnip_core::autosave::{AutoSaver, SaveState};
use tagsnip_core::models::folder::{CreateFolderRequest, FolderColor};
use tagsnip_core::models::snippet::{CreateSnippetRequest, UpdateSnippetRequest};
use tagsnip_core::models::user::{Credentials, TokenPair};
use tagsnip_core::remote::{RemoteError, SnippetStore};
use tagsnip_core::search::{FilterState, SnippetCollection};
use tagsnip_core::tabs::TabManager;
use tagsnip_server::{serve_router, AppState, Config, Database};
use tempfile::TempDir;

struct TestServer {
    url: String,
    _dir: TempDir,
}

async fn spawn_server() -> TestServer {
    let dir = TempDir::new().expect("temp dir");
    let db_path = dir.path().join("db");
    let mut config = Config::for_db_path(db_path.to_str().expect("db path"));
    config.jwt_secret = "cli-integration-secret".to_string();
    let db = Database::new(config.db_path.as_str()).expect("open db");
    let state = AppState::new(config, db);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        if let Err(err) = serve_router(listener, state, false, pending()).await {
            eprintln!("test server stopped: {}", err);
        }
    });
    TestServer {
        url: format!("http://{}", addr),
        _dir: dir,
    }
}

fn client_for(server: &TestServer) -> ApiClient {
    ApiClient::new(&server.url, Duration::from_secs(10), TokenStore::in_memory()).expect("client")
}

fn credentials(username: &str) -> Credentials {
    validate::credentials(username, "password123", Some("password123")).expect("credentials")
}

async fn signed_in(server: &TestServer, username: &str) -> ApiClient {
    let client = client_for(server);
    let credentials = credentials(username);
    client.signup(&credentials).await.expect("signup");
    client.login(&credentials).await.expect("login");
    client
}

fn new_snippet(title: &str, code: &str, tags: &[&str]) -> CreateSnippetRequest {
    CreateSnippetRequest {
        title: Some(title.to_string()),
        code: Some(code.to_string()),
        language: Some("python".to_string()),
        tags: Some(tags.iter().map(|t| t.to_string()).collect()),
        ..Default::default()
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn snippet_store_round_trip_over_http() {
    let server = spawn_server().await;
    let client = signed_in(&server, "alice").await;

    let created = client
        .create_snippet(&new_snippet("Quick sort", "def qs(xs): pass", &["Algo", "sort"]))
        .await
        .expect("create");
    assert_eq!(created.tags, vec!["algo", "sort"]);

    let listed = SnippetStore::list(&client).await.expect("list");
    assert_eq!(listed.len(), 1);

    let starred = SnippetStore::toggle_favorite(&client, &created.id)
        .await
        .expect("favorite");
    assert!(starred.is_favorite);

    SnippetStore::delete(&client, &created.id).await.expect("delete");
    assert_eq!(
        SnippetStore::get(&client, &created.id).await,
        Err(RemoteError::NotFound)
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn rejected_access_token_is_refreshed_once() {
    let server = spawn_server().await;
    let client = signed_in(&server, "bob").await;
    let issued = client.tokens().get().expect("tokens");

    client
        .tokens()
        .set(TokenPair::bearer("garbage".to_string(), issued.refresh_token.clone()))
        .expect("set tokens");
    let profile = client.me().await.expect("me after refresh");
    assert_eq!(profile.username, "bob");

    let refreshed = client.tokens().get().expect("tokens kept");
    assert_ne!(refreshed.access_token, "garbage");
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_refresh_clears_stored_tokens() {
    let server = spawn_server().await;
    let client = signed_in(&server, "carol").await;

    client
        .tokens()
        .set(TokenPair::bearer("garbage".to_string(), "also-garbage".to_string()))
        .expect("set tokens");
    assert!(matches!(client.me().await, Err(ClientError::Unauthorized)));
    assert!(!client.tokens().is_signed_in());
}

#[tokio::test(flavor = "multi_thread")]
async fn login_and_signup_failures_surface_server_messages() {
    let server = spawn_server().await;
    let client = signed_in(&server, "dave").await;

    let wrong = Credentials {
        username: "dave".to_string(),
        password: "not-the-password".to_string(),
    };
    assert!(matches!(
        client.login(&wrong).await,
        Err(ClientError::Validation(msg)) if msg == "Invalid username or password"
    ));

    assert!(matches!(
        client.signup(&credentials("dave")).await,
        Err(ClientError::Validation(_))
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn auto_saver_debounces_edits_into_one_remote_update() {
    let server = spawn_server().await;
    let client = signed_in(&server, "erin").await;
    let snippet = client
        .create_snippet(&new_snippet("Draft", "print(1)", &[]))
        .await
        .expect("create");

    let saver = AutoSaver::new(client.clone(), Duration::from_millis(50));
    saver.switch_session(snippet.id.as_str());
    for code in ["print(2)", "print(3)", "print(4)"] {
        let mut snapshot = UpdateSnippetRequest::snapshot_of(&snippet);
        snapshot.code = Some(code.to_string());
        saver.mark_dirty(snapshot);
    }

    let mut state = saver.state();
    for _ in 0..100 {
        if state == SaveState::Clean {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        state = saver.state();
    }
    assert_eq!(state, SaveState::Clean);
    assert!(saver.status().last_saved.is_some());

    let stored = client.get_snippet(&snippet.id).await.expect("get");
    assert_eq!(stored.code, "print(4)");
}

#[tokio::test(flavor = "multi_thread")]
async fn tab_manager_persists_through_the_client() {
    let server = spawn_server().await;
    let client = signed_in(&server, "frank").await;
    let mut ids = Vec::new();
    for title in ["a", "b", "c"] {
        let snippet = client
            .create_snippet(&new_snippet(title, "x = 1", &[]))
            .await
            .expect("create");
        ids.push(snippet.id);
    }

    let store = Arc::new(client.clone());
    let mut tabs = TabManager::new(Arc::clone(&store));
    for id in &ids {
        tabs.open(id);
    }
    tabs.close(&ids[1]);
    tabs.settle().await;

    let restored = TabManager::load(store).await.expect("load");
    assert_eq!(restored.tabs(), [ids[0].clone(), ids[2].clone()]);
    assert_eq!(restored.active(), Some(ids[2].as_str()));
}

#[tokio::test(flavor = "multi_thread")]
async fn deleting_a_folder_unfiles_its_snippets() {
    let server = spawn_server().await;
    let client = signed_in(&server, "grace").await;
    let folder = client
        .create_folder(&CreateFolderRequest {
            name: "Work".to_string(),
            color: Some(FolderColor::Blue),
        })
        .await
        .expect("folder");
    let mut request = new_snippet("Filed", "x = 1", &[]);
    request.folder_id = Some(folder.id.clone());
    let snippet = client.create_snippet(&request).await.expect("create");
    assert_eq!(snippet.folder_id.as_deref(), Some(folder.id.as_str()));

    client.delete_folder(&folder.id).await.expect("delete folder");
    let unfiled = client.get_snippet(&snippet.id).await.expect("get");
    assert!(unfiled.folder_id.is_none());
}

#[tokio::test(flavor = "multi_thread")]
async fn fetched_snippets_feed_the_filter_pipeline() {
    let server = spawn_server().await;
    let client = signed_in(&server, "heidi").await;
    client
        .create_snippet(&new_snippet("Quick sort", "def qs(xs): pass", &["algo"]))
        .await
        .expect("create");
    client
        .create_snippet(&new_snippet("HTTP client", "import requests", &["net"]))
        .await
        .expect("create");

    let collection = SnippetCollection::new(client.all_snippets().await.expect("list"));
    let state = FilterState {
        tags: vec!["algo".to_string()],
        ..Default::default()
    };
    let view = collection.recompute(&state);
    let titles: Vec<&str> = view.snippets().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Quick sort"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn export_import_and_share() {
    let server = spawn_server().await;
    let owner = signed_in(&server, "ivan").await;
    let snippet = owner
        .create_snippet(&new_snippet("Shared", "print('hi')", &["demo"]))
        .await
        .expect("create");

    let document = owner.export().await.expect("export");
    assert_eq!(document.snippets.len(), 1);

    let other = signed_in(&server, "judy").await;
    let raw = serde_json::to_string(&document).expect("serialize");
    let request = validate::import_payload(&raw).expect("payload");
    let result = other.import(&request).await.expect("import");
    assert_eq!(result.imported, 1);
    assert_eq!(other.stats().await.expect("stats").total_snippets, 1);

    let anonymous = client_for(&server);
    let shared = anonymous.shared_snippet(&snippet.id).await.expect("share");
    assert_eq!(shared.title, "Shared");
    assert!(shared.user_id.is_none());
    assert!(matches!(
        anonymous.shared_snippet("no-such-id").await,
        Err(ClientError::NotFound)
    ));
}
