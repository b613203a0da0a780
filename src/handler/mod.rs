//! Request handler module
//!
//! Routes `/view/`, `/edit/` and `/save/` requests to the wiki handlers.

pub mod router;
pub mod wiki;

// Re-export main entry point
pub use router::handle_request;
