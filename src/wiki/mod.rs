//! Wiki domain module
//!
//! Pages, title validation, file-backed page storage and the template set
//! used to render them. Nothing here knows about HTTP.

pub mod error;
pub mod page;
pub mod store;
pub mod template;
pub mod title;

pub use error::TemplateError;
pub use page::Page;
pub use store::PageStore;
pub use template::{escape_html, TemplateSet};
pub use title::{Title, TitleValidator};
