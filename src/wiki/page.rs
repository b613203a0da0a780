// Page entity

use super::title::Title;

/// A wiki page held in memory for the duration of one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub title: Title,
    pub body: Vec<u8>,
}

impl Page {
    pub const fn new(title: Title, body: Vec<u8>) -> Self {
        Self { title, body }
    }

    /// A page that has never been saved
    pub const fn blank(title: Title) -> Self {
        Self::new(title, Vec::new())
    }

    /// Body as text, invalid UTF-8 replaced
    pub fn body_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}
