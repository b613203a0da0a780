//! Request routing dispatch module
//!
//! Entry point for HTTP request processing: extracts the page title from
//! the path, validates it and dispatches to exactly one wiki handler.

use crate::config::AppState;
use crate::handler::wiki;
use crate::http::{self, FormData};
use crate::logger::{self, AccessLogEntry};
use crate::wiki::Title;
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SERVER};
use hyper::http::request::Parts;
use hyper::{Method, Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Wiki actions, one per route prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Edit,
    Save,
}

impl Action {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::View => "view",
            Self::Edit => "edit",
            Self::Save => "save",
        }
    }
}

/// Route prefixes; all share one length so the title starts at a fixed offset
const ROUTES: [(&str, Action); 3] = [
    ("/view/", Action::View),
    ("/edit/", Action::Edit),
    ("/save/", Action::Save),
];

const PREFIX_LEN: usize = "/view/".len();

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const MULTIPART_CONTENT_TYPE: &str = "multipart/form-data";

/// Form field holding the page body on save
const BODY_FIELD: &str = "body";

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    remote_addr: Option<SocketAddr>,
) -> Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let (parts, body) = req.into_parts();
    let mut entry = AccessLogEntry::from_parts(remote_addr, &parts);

    let (action, mut response) = route_request(&parts, body, &state).await;

    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        entry.action = action;
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .body()
            .size_hint()
            .exact()
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(0);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Find the route whose prefix starts `path`, returning the raw title
pub fn match_route(path: &str) -> Option<(Action, &str)> {
    ROUTES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|&(_, action)| (action, &path[PREFIX_LEN..]))
}

/// Route request based on path
async fn route_request<B>(
    parts: &Parts,
    body: B,
    state: &AppState,
) -> (Option<&'static str>, Response<Full<Bytes>>)
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let path = parts.uri.path();

    // Health check endpoints
    let health = &state.config.health;
    if health.enabled && (path == health.liveness_path || path == health.readiness_path) {
        return (Some("health"), http::build_health_response("ok"));
    }

    let Some(decoded) = http::decode_path(path) else {
        return (None, http::build_404_response());
    };
    let Some((action, raw_title)) = match_route(&decoded) else {
        return (None, http::build_404_response());
    };
    let Some(title) = state.validator.parse(raw_title) else {
        return (Some(action.as_str()), http::build_404_response());
    };

    let response = dispatch(action, title, parts, body, state).await;
    (Some(action.as_str()), response)
}

async fn dispatch<B>(
    action: Action,
    title: Title,
    parts: &Parts,
    body: B,
    state: &AppState,
) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    match action {
        Action::View => wiki::view(title, &parts.method, state).await,
        Action::Edit => wiki::edit(title, state).await,
        Action::Save => match read_body_field(parts, body, state.config.http.max_body_size).await {
            Ok(page_body) => wiki::save(title, page_body, &parts.method, state).await,
            Err(resp) => resp,
        },
    }
}

/// How a request body encodes form fields
#[derive(Debug, PartialEq, Eq)]
enum FormBody {
    None,
    UrlEncoded,
    Multipart { boundary: String },
}

/// Extract the `body` form value
///
/// A urlencoded body is consulted before the query string. Multipart fields
/// come after the query string.
async fn read_body_field<B>(
    parts: &Parts,
    body: B,
    max_body_size: u64,
) -> Result<Vec<u8>, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let query = parts
        .uri
        .query()
        .map(|q| FormData::parse(q.as_bytes()))
        .unwrap_or_default();

    let fields = match form_body(parts)? {
        FormBody::None => query,
        FormBody::UrlEncoded => {
            let mut posted = FormData::parse(&read_limited(parts, body, max_body_size).await?);
            posted.extend(query);
            posted
        }
        FormBody::Multipart { boundary } => {
            let raw = read_limited(parts, body, max_body_size).await?;
            let posted = FormData::parse_multipart(raw, boundary)
                .await
                .map_err(|e| {
                    logger::log_warning(&format!("Malformed multipart body: {e}"));
                    http::build_400_response("malformed multipart body")
                })?;
            let mut fields = query;
            fields.extend(posted);
            fields
        }
    };

    Ok(fields
        .get(BODY_FIELD)
        .map(<[u8]>::to_vec)
        .unwrap_or_default())
}

/// Only POST, PUT and PATCH carry form data, and only with a form content type
fn form_body(parts: &Parts) -> Result<FormBody, Response<Full<Bytes>>> {
    if !matches!(parts.method, Method::POST | Method::PUT | Method::PATCH) {
        return Ok(FormBody::None);
    }
    let Some(content_type) = parts
        .headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
    else {
        return Ok(FormBody::None);
    };

    let mime = content_type.split(';').next().unwrap_or_default().trim();
    if mime.eq_ignore_ascii_case(FORM_CONTENT_TYPE) {
        Ok(FormBody::UrlEncoded)
    } else if mime.eq_ignore_ascii_case(MULTIPART_CONTENT_TYPE) {
        multer::parse_boundary(content_type)
            .map(|boundary| FormBody::Multipart { boundary })
            .map_err(|e| {
                logger::log_warning(&format!("Rejected multipart request: {e}"));
                http::build_400_response("multipart body without boundary")
            })
    } else {
        Ok(FormBody::None)
    }
}

/// Enforce the size limit, then buffer the whole body
async fn read_limited<B>(
    parts: &Parts,
    body: B,
    max_body_size: u64,
) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    if let Some(resp) = check_body_size(parts, max_body_size) {
        return Err(resp);
    }
    collect_limited(body, max_body_size).await
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(parts: &Parts, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = parts.headers.get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_warning(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

/// Read the whole body, enforcing the size limit on the actual bytes
async fn collect_limited<B>(body: B, max_body_size: u64) -> Result<Bytes, Response<Full<Bytes>>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes()),
        Err(e) if e.downcast_ref::<LengthLimitError>().is_some() => {
            logger::log_warning(&format!(
                "Request body exceeded {max_body_size} bytes while reading"
            ));
            Err(http::build_413_response())
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body: {e}"));
            Err(http::build_400_response("failed to read request body"))
        }
    }
}
