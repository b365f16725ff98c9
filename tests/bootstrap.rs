//! End-to-end bootstrap and request-handling scenarios.
//!
//! Everything here goes through the public API only: build a root on disk,
//! boot the application against a delegate registry carrying the routes,
//! and push requests through `handle` the way a hosting runtime would.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use http::{Method, StatusCode};

use frogsystem::{
    Application, ConnectionManager, Error, Failure, Registry, Request, Response, Router, health,
};

const CONFIG: &str = r#"
[app]
env = "testing"

[database]
connection = "mysql"

[database.mysql]
host = "localhost"
username = "frog"
database = "fs2"
"#;

fn write(path: &Path, contents: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
}

/// An application root with a config file and a small legacy public tree.
fn app_root() -> tempfile::TempDir {
    let root = tempfile::tempdir().unwrap();
    write(&root.path().join("config/main.toml"), CONFIG);
    write(&root.path().join("public/index.html"), "<h1>legacy home</h1>");
    write(&root.path().join("public/styles/site.css"), "body{}");
    root
}

async fn show_user(req: Request) -> Response {
    Response::text(format!("user {}", req.param("id").unwrap_or("?")))
}

async fn boom(_req: Request) -> Result<Response, Failure> {
    Err(Failure::new("boom"))
}

fn routes() -> Arc<Registry> {
    let mut registry = Registry::new();
    registry.insert(Arc::new(
        Router::new()
            .get("/healthz", health::liveness)
            .get("/users/{id}", show_user)
            .get("/boom", boom),
    ));
    Arc::new(registry)
}

async fn send(app: &Application, method: Method, path: &str) -> Response {
    app.handle(
        Request::new(method, path.parse().unwrap()),
        Response::status(StatusCode::NOT_FOUND),
        |_req: Request, res: Response| async move { res },
    )
    .await
}

#[tokio::test]
async fn boot_registers_the_database_manager() {
    let root = app_root();
    let app = Application::with_delegate(root.path(), Some(routes())).unwrap();

    let manager = app.registry().resolve::<Arc<ConnectionManager>>().unwrap();
    assert_eq!(manager.default_connection(), "mysql");
    assert!(manager.connection(None).is_some());

    let settings = manager.settings(None).unwrap();
    assert_eq!(settings.host, "localhost");
    assert_eq!(settings.database, "fs2");
}

#[tokio::test]
async fn config_loads_from_the_default_location() {
    // No FS2CONFIG override: the file under <root>/config is picked up.
    let root = app_root();
    let app = Application::with_delegate(root.path(), Some(routes())).unwrap();

    assert_eq!(app.settings().environment, "testing");
    assert_eq!(app.settings().public_dir, root.path().join("public"));
}

#[tokio::test]
async fn routed_requests_reach_their_handler() {
    let root = app_root();
    let app = Application::with_delegate(root.path(), Some(routes())).unwrap();

    let response = send(&app, Method::GET, "/users/42").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.body(), b"user 42");

    let response = send(&app, Method::GET, "/healthz").await;
    assert_eq!(response.body(), b"ok");
}

#[tokio::test]
async fn unrouted_paths_fall_through_to_the_legacy_tree() {
    let root = app_root();
    let app = Application::with_delegate(root.path(), Some(routes())).unwrap();

    let response = send(&app, Method::GET, "/").await;
    assert_eq!(response.body(), b"<h1>legacy home</h1>");

    let response = send(&app, Method::GET, "/styles/site.css").await;
    assert_eq!(response.header("content-type"), Some("text/css"));

    let response = send(&app, Method::GET, "/no-such-page").await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn handler_failures_render_the_error_page() {
    let root = app_root();
    let app = Application::with_delegate(root.path(), Some(routes())).unwrap();

    let response = send(&app, Method::GET, "/boom").await;

    assert_eq!(response.status_code(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(
        response.header("content-type"),
        Some("text/html; charset=utf-8")
    );
    let body = String::from_utf8(response.body().to_vec()).unwrap();
    assert!(body.contains("Quak! Something went wrong..."));
    assert!(body.contains("boom"));
}

#[tokio::test]
async fn the_outer_continuation_observes_failures_but_not_terminations() {
    let root = app_root();
    let app = Application::with_delegate(root.path(), Some(routes())).unwrap();
    let hits = Arc::new(AtomicUsize::new(0));

    let counting = {
        let hits = Arc::clone(&hits);
        move |_req: Request, res: Response| {
            let hits = Arc::clone(&hits);
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                res
            }
        }
    };

    // A failing route: the substitute page passes through the continuation.
    let response = app
        .handle(
            Request::new(Method::GET, "/boom".parse().unwrap()),
            Response::status(StatusCode::NOT_FOUND),
            counting.clone(),
        )
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    // A terminating route: the chain never reaches the continuation.
    let response = app
        .handle(
            Request::new(Method::GET, "/users/7".parse().unwrap()),
            Response::status(StatusCode::NOT_FOUND),
            counting,
        )
        .await;
    assert_eq!(response.body(), b"user 7");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn startup_fails_without_the_selected_database_block() {
    let root = tempfile::tempdir().unwrap();
    write(
        &root.path().join("config/main.toml"),
        "[database]\nconnection = \"missing\"\n",
    );

    let err = Application::with_delegate(root.path(), Some(routes())).unwrap_err();

    assert!(matches!(err, Error::Provider { provider: "database", .. }));
}

#[tokio::test]
async fn startup_is_deterministic() {
    let root = app_root();

    let first = Application::with_delegate(root.path(), Some(routes())).unwrap();
    let second = Application::with_delegate(root.path(), Some(routes())).unwrap();

    assert_eq!(
        format!("{:?}", first.settings()),
        format!("{:?}", second.settings())
    );

    let first_db = first.registry().resolve::<Arc<ConnectionManager>>().unwrap();
    let second_db = second.registry().resolve::<Arc<ConnectionManager>>().unwrap();
    assert_eq!(first_db.default_connection(), second_db.default_connection());
    assert_eq!(first_db.settings(None), second_db.settings(None));
}
