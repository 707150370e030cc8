//! `moher dev` command implementation.
//!
//! On-demand, no-bundling development server: source files are served as
//! native ES modules and transformed at request time.
//!
//! ## Architecture
//!
//! ```text
//! Browser requests GET /src/main.js
//!   → /@modules/* requests   → bare-module resolver (node_modules entry)
//!   → *.vue requests         → component splitter (wired module or template)
//!   → everything else        → static delegate (project root, then public/)
//!   → rewrite imports        (bare → /@modules/, JavaScript responses only)
//! ```
//!
//! The rewrite stage is an outer middleware layer: it fully delegates to
//! the inner chain, then post-processes whatever body came back. Exactly
//! one inner stage answers any given request.

use axum::{
    body::Body,
    extract::{Path as AxumPath, RawQuery, Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use miette::{IntoDiagnostic, Result};
use moher_core::{rewrite_imports, sfc::split, Error as CoreError, ModuleMap};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::debug;

/// Dev server action.
#[derive(Debug, Clone)]
pub struct DevAction {
    /// Working directory (project root).
    pub cwd: PathBuf,
    /// Port to listen on.
    pub port: u16,
    /// Host to bind to.
    pub host: String,
}

/// Shared server state: built once at startup, read-only afterwards.
struct DevState {
    /// Project root directory.
    root: PathBuf,
    /// Bare-name → physical-entry-path map.
    modules: ModuleMap,
}

type AppState = Arc<DevState>;

/// Run the dev server.
pub async fn run(action: DevAction) -> Result<()> {
    let root = action.cwd.canonicalize().into_diagnostic()?;
    let modules = ModuleMap::with_defaults(&root);
    let app = build_app(Arc::new(DevState { root, modules }));

    let host_ip = if action.host == "localhost" {
        "127.0.0.1".to_string()
    } else {
        action.host.clone()
    };
    let addr: SocketAddr = format!("{host_ip}:{}", action.port)
        .parse()
        .into_diagnostic()?;
    let listener = tokio::net::TcpListener::bind(addr).await.into_diagnostic()?;

    println!();
    println!("  Dev server running at:");
    println!("  > Local: http://{}:{}/", action.host, action.port);
    println!();

    axum::serve(listener, app).await.into_diagnostic()?;
    Ok(())
}

/// Assemble the request pipeline.
///
/// Route order is load-bearing: the module namespace and component
/// requests must never fall through to static serving, and the rewrite
/// layer wraps all of them so it sees the final body of whichever stage
/// answered.
fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/@modules/*name", get(serve_bare_module))
        .route("/*path", get(serve_path))
        .layer(middleware::from_fn(rewrite_layer))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Rewrite layer
// ============================================================================

/// Outer post-processing stage: delegate to the rest of the chain, and
/// rewrite bare import specifiers in JavaScript responses only.
async fn rewrite_layer(req: Request, next: Next) -> Response {
    let response = next.run(req).await;

    if !is_javascript(&response) {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match axum::body::to_bytes(body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(e) => {
            debug!("failed to buffer response body: {e}");
            return error_body(StatusCode::INTERNAL_SERVER_ERROR, "body read failed");
        }
    };

    // Rewriting is text-based; a non-UTF-8 body passes through as-is.
    let Ok(source) = std::str::from_utf8(&bytes) else {
        return Response::from_parts(parts, Body::from(bytes));
    };

    match rewrite_imports(source) {
        Ok(rewritten) => {
            parts
                .headers
                .insert(header::CONTENT_LENGTH, HeaderValue::from(rewritten.len()));
            Response::from_parts(parts, Body::from(rewritten))
        }
        Err(e) => {
            debug!("import rewrite failed: {e}");
            Response::from_parts(parts, Body::from(bytes))
        }
    }
}

fn is_javascript(response: &Response) -> bool {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("javascript"))
}

// ============================================================================
// Route handlers
// ============================================================================

/// Serve the project's index page.
async fn serve_index(State(state): State<AppState>) -> Response {
    serve_static(&state, "index.html")
}

/// Serve a bare module at `/@modules/{name}`.
///
/// The namespace is reserved: an unresolvable name is an error here and
/// never falls through to the static delegate.
async fn serve_bare_module(
    State(state): State<AppState>,
    AxumPath(name): AxumPath<String>,
) -> Response {
    match state.modules.load(&name) {
        Ok(code) => js_response(code),
        Err(e) => error_response(&e),
    }
}

/// Serve any other path: component requests go to the splitter, the rest
/// to the static delegate.
async fn serve_path(
    State(state): State<AppState>,
    AxumPath(path): AxumPath<String>,
    RawQuery(query): RawQuery,
) -> Response {
    if path.ends_with(".vue") {
        return serve_component(&state, &path, query.as_deref());
    }
    serve_static(&state, &path)
}

/// A request path with `..` components would escape the project root
/// once joined; such paths are never served.
fn escapes_root(path: &str) -> bool {
    std::path::Path::new(path)
        .components()
        .any(|c| matches!(c, std::path::Component::ParentDir))
}

/// Component splitting: one physical file, two virtual modules.
fn serve_component(state: &DevState, path: &str, query: Option<&str>) -> Response {
    if escapes_root(path) {
        return error_body(StatusCode::NOT_FOUND, &format!("Not found: /{path}"));
    }
    let file_path = state.root.join(path);
    let source = match std::fs::read_to_string(&file_path) {
        Ok(source) => source,
        Err(source) => {
            return error_response(&CoreError::Read {
                path: file_path,
                source,
            })
        }
    };

    let wants_template = query.is_some_and(|q| q.split('&').any(|kv| kv == "type=template"));

    let result = if wants_template {
        split::template_module(&source, &file_path)
    } else {
        let request_path = format!("/{path}");
        split::default_module(&source, &request_path)
    };

    match result {
        Ok(code) => js_response(code),
        Err(e) => error_response(&e),
    }
}

/// Static delegate: project root first, then the public directory; the
/// first existing file wins. Directory paths serve their `index.html`.
fn serve_static(state: &DevState, path: &str) -> Response {
    if escapes_root(path) {
        return error_body(StatusCode::NOT_FOUND, &format!("Not found: /{path}"));
    }
    let candidates = [state.root.join(path), state.root.join("public").join(path)];

    for candidate in &candidates {
        let file_path = if candidate.is_dir() {
            candidate.join("index.html")
        } else {
            candidate.clone()
        };
        if !file_path.is_file() {
            continue;
        }
        return match std::fs::read(&file_path) {
            Ok(bytes) => Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type_for(&file_path))
                .header(header::CACHE_CONTROL, "no-cache")
                .body(Body::from(bytes))
                .unwrap(),
            Err(source) => error_response(&CoreError::Read {
                path: file_path.clone(),
                source,
            }),
        };
    }

    error_body(StatusCode::NOT_FOUND, &format!("Not found: /{path}"))
}

/// Infer a content type from the served file's extension.
fn content_type_for(path: &std::path::Path) -> &'static str {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "js" | "mjs" => "application/javascript",
        "html" => "text/html",
        "css" => "text/css",
        "json" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "ttf" => "font/ttf",
        "wasm" => "application/wasm",
        _ => "application/octet-stream",
    }
}

fn js_response(code: String) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/javascript")
        .header(header::CACHE_CONTROL, "no-cache")
        .body(Body::from(code))
        .unwrap()
}

/// Map a core error onto an HTTP response.
///
/// Missing files are 404s; everything else (unresolvable bare names,
/// missing template blocks, parse/compile diagnostics) is a 500 whose
/// body carries the diagnostic verbatim in a `console.error` call so it
/// surfaces in the browser console.
fn error_response(error: &CoreError) -> Response {
    let status = match error {
        CoreError::Read { .. } => StatusCode::NOT_FOUND,
        CoreError::UnresolvedModule { .. }
        | CoreError::MissingTemplate { .. }
        | CoreError::Parse(_)
        | CoreError::TemplateCompile(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = js_escape(&error.to_string());
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/javascript")
        .body(Body::from(format!("console.error('{message}');")))
        .unwrap()
}

/// Escape a diagnostic for embedding in a single-quoted JS string.
fn js_escape(message: &str) -> String {
    let mut out = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

fn error_body(status: StatusCode, message: &str) -> Response {
    Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "text/plain")
        .body(Body::from(message.to_string()))
        .unwrap()
}
