//! HTTP protocol layer module
//!
//! Response builders and form decoding, decoupled from wiki logic.

pub mod form;
pub mod response;

// Re-export commonly used types
pub use form::{decode_path, FormData};
pub use response::{
    build_400_response, build_404_response, build_413_response, build_500_response,
    build_health_response, build_html_response, build_redirect_response,
};
