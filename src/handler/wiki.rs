//! Wiki page handlers
//!
//! View, edit and save. Each receives an already validated title.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Method, Response};

use crate::config::AppState;
use crate::http;
use crate::logger;
use crate::wiki::{Page, Title};

/// Template used by the view handler
const VIEW_TEMPLATE: &str = "view";
/// Template used by the edit handler
const EDIT_TEMPLATE: &str = "edit";

pub fn view_path(title: &Title) -> String {
    format!("/view/{title}")
}

pub fn edit_path(title: &Title) -> String {
    format!("/edit/{title}")
}

/// Render an existing page, or send the client to create it
pub async fn view(title: Title, method: &Method, state: &AppState) -> Response<Full<Bytes>> {
    match state.store.load(&title).await {
        Ok(page) => render(state, VIEW_TEMPLATE, &page),
        Err(_) => http::build_redirect_response(method, &edit_path(&title)),
    }
}

/// Render the edit form; a page that was never saved starts out blank
pub async fn edit(title: Title, state: &AppState) -> Response<Full<Bytes>> {
    let page = match state.store.load(&title).await {
        Ok(page) => page,
        Err(_) => Page::blank(title),
    };
    render(state, EDIT_TEMPLATE, &page)
}

/// Persist the submitted body, then redirect to the view page
pub async fn save(
    title: Title,
    body: Vec<u8>,
    method: &Method,
    state: &AppState,
) -> Response<Full<Bytes>> {
    let page = Page::new(title, body);
    if let Err(e) = state.store.save(&page).await {
        logger::log_error(&format!("Failed to save page '{}': {e}", page.title));
        return http::build_500_response(&e.to_string());
    }
    logger::log_page_saved(page.title.as_str(), page.body.len());
    http::build_redirect_response(method, &view_path(&page.title))
}

fn render(state: &AppState, template: &str, page: &Page) -> Response<Full<Bytes>> {
    match state.templates.render(template, page) {
        Ok(html) => http::build_html_response(html),
        Err(e) => {
            logger::log_error(&format!("Failed to render '{}': {e}", page.title));
            http::build_500_response(&e.to_string())
        }
    }
}
