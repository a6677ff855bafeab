// HTML pages served straight from the static directory
use std::path::Path;

use axum::Router;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::set_status::SetStatus;

use crate::AppState;

const PAGES: &[(&str, &str)] = &[
    ("/", "index.html"),
    ("/board", "board.html"),
    ("/board/write", "write.html"),
    ("/board/gaenyeom", "recommended.html"),
    ("/board/:id", "post.html"),
    ("/admin", "admin.html"),
];

pub fn routes(static_dir: &Path) -> Router<AppState> {
    PAGES.iter().fold(Router::new(), |router, (path, file)| {
        router.route_service(path, ServeFile::new(static_dir.join(file)))
    })
}

/// Remaining static assets; anything unmatched gets `404.html` with a 404.
pub fn static_files(static_dir: &Path) -> ServeDir<SetStatus<ServeFile>> {
    ServeDir::new(static_dir).not_found_service(ServeFile::new(static_dir.join("404.html")))
}
