//! File-backed page store
//!
//! Each page lives in `<root>/<title>.txt`. Existence is decided by the
//! file being there at request time; nothing is cached.

use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::error::StoreError;
use super::page::Page;
use super::title::Title;

/// Extension appended to a title to form its file name
pub const PAGE_EXTENSION: &str = "txt";

/// Permission bits for newly created page files
#[cfg(unix)]
const PAGE_FILE_MODE: u32 = 0o600;

#[derive(Debug, Clone)]
pub struct PageStore {
    root: PathBuf,
}

impl PageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// On-disk location of a page
    pub fn path_for(&self, title: &Title) -> PathBuf {
        self.root.join(format!("{}.{PAGE_EXTENSION}", title.as_str()))
    }

    /// Read a page; every read failure counts as "not found"
    pub async fn load(&self, title: &Title) -> Result<Page, StoreError> {
        let path = self.path_for(title);
        match fs::read(&path).await {
            Ok(body) => Ok(Page::new(title.clone(), body)),
            Err(source) => Err(StoreError::NotFound {
                title: title.to_string(),
                source,
            }),
        }
    }

    /// Create or truncate the page file and write the body
    ///
    /// Not atomic: a crash mid-write can leave a truncated file.
    pub async fn save(&self, page: &Page) -> Result<(), StoreError> {
        let path = self.path_for(&page.title);
        match write_page_file(&path, &page.body).await {
            Ok(()) => Ok(()),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

async fn write_page_file(path: &Path, body: &[u8]) -> std::io::Result<()> {
    let mut options = fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(PAGE_FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(body).await?;
    // tokio files buffer writes in the background until flushed
    file.flush().await
}
