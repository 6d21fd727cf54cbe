//! Web upload handler.
//!
//! `GET /` renders the upload form, `POST /` takes a multipart `audio` field,
//! runs the separation backend synchronously for the full request, and
//! renders links to the produced stems. Stem files are served under
//! `/static/stems/<token>/<stem>.mp3`.

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tracing::{debug, error, info};

use crate::{
    error::StemError,
    paths,
    separator::Separator,
    types::{Token, STEM_NAMES},
};

/// Shared state for the upload handler.
pub struct App {
    pub uploads_dir: PathBuf,
    pub stems_dir: PathBuf,
    /// Single shared backend instance; the mutex serializes separations.
    pub separator: Mutex<Box<dyn Separator>>,
}

pub fn router(app: Arc<App>) -> Router {
    let stems_dir = app.stems_dir.clone();
    Router::new()
        .route("/", get(index).post(upload))
        .nest_service("/static/stems", ServeDir::new(stems_dir))
        .layer(DefaultBodyLimit::max(512 * 1024 * 1024))
        .with_state(app)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_PAGE)
}

async fn upload(State(app): State<Arc<App>>, mut multipart: Multipart) -> Response {
    let mut audio: Option<Bytes> = None;

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                debug!("discarding malformed upload: {e}");
                break;
            }
        };
        if field.name() != Some("audio") {
            continue;
        }
        if field.file_name().map_or(true, str::is_empty) {
            break;
        }
        match field.bytes().await {
            Ok(bytes) => {
                audio = Some(bytes);
                break;
            }
            Err(e) => {
                debug!("discarding malformed upload: {e}");
                break;
            }
        }
    }

    // Missing field, empty filename, or an upload we could not even decode:
    // back to the form, no message.
    let Some(bytes) = audio else {
        return Redirect::to("/").into_response();
    };

    let token = Token::generate();
    match separate_upload(app, &token, bytes).await {
        Ok(page) => page.into_response(),
        Err(e) => {
            error!("separation of upload {token} failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("stem separation failed: {e}"),
            )
                .into_response()
        }
    }
}

/// Persist the uploaded bytes unmodified, run the backend to completion, and
/// build the results page for the four fixed stem names.
async fn separate_upload(
    app: Arc<App>,
    token: &Token,
    bytes: Bytes,
) -> crate::Result<Html<String>> {
    tokio::fs::create_dir_all(&app.uploads_dir).await?;
    let upload_path = paths::upload_path(&app.uploads_dir, token);
    tokio::fs::write(&upload_path, &bytes).await?;

    let stem_dir = paths::token_stem_dir(&app.stems_dir, token);
    tokio::fs::create_dir_all(&stem_dir).await?;

    info!("separating upload {token} ({} bytes)", bytes.len());
    let worker_app = Arc::clone(&app);
    let worker_dir = stem_dir.clone();
    let stems = tokio::task::spawn_blocking(move || {
        let separator = worker_app.separator.blocking_lock();
        separator.separate(&upload_path, &worker_dir)
    })
    .await
    .map_err(|e| StemError::Anyhow(anyhow::anyhow!("separation task failed: {e}")))??;

    debug!("backend produced {} stems for {token}", stems.len());

    let links: Vec<(&str, String)> = STEM_NAMES
        .iter()
        .map(|stem| (*stem, format!("/static/stems/{token}/{stem}.mp3")))
        .collect();
    Ok(Html(stems_page(&links)))
}

const INDEX_PAGE: &str = r#"<!doctype html>
<html>
<head><title>stemserve</title></head>
<body>
<h1>Split a track into stems</h1>
<form method="post" action="/" enctype="multipart/form-data">
  <input type="file" name="audio" accept="audio/*">
  <button type="submit">Split</button>
</form>
</body>
</html>
"#;

fn stems_page(links: &[(&str, String)]) -> String {
    let mut items = String::new();
    for (stem, url) in links {
        items.push_str(&format!(
            "  <li><a href=\"{url}\">{stem}</a> <audio controls src=\"{url}\"></audio></li>\n"
        ));
    }
    format!(
        "<!doctype html>\n<html>\n<head><title>stemserve - stems</title></head>\n<body>\n\
         <h1>Your stems</h1>\n<ul>\n{items}</ul>\n<p><a href=\"/\">Split another track</a></p>\n\
         </body>\n</html>\n"
    )
}
