// Application state module
// Process-wide values built once at startup and read-only afterwards

use std::path::Path;
use thiserror::Error;

use super::types::Config;
use crate::wiki::template::REQUIRED_TEMPLATES;
use crate::wiki::{PageStore, TemplateError, TemplateSet, TitleValidator};

/// Failure to assemble the application state; fatal at startup
#[derive(Debug, Error)]
pub enum StartupError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error("invalid title pattern: {0}")]
    TitlePattern(#[from] regex::Error),
    #[error("template set has no '{0}' template")]
    MissingTemplate(&'static str),
}

/// Application state
pub struct AppState {
    pub config: Config,
    pub store: PageStore,
    pub templates: TemplateSet,
    pub validator: TitleValidator,
}

impl AppState {
    /// Parse templates from `wiki.template_dir` and compile the validator
    pub fn new(config: &Config) -> Result<Self, StartupError> {
        let templates = TemplateSet::load_dir(Path::new(&config.wiki.template_dir))?;
        Self::with_templates(config, templates)
    }

    /// Assemble state around an already parsed template set
    pub fn with_templates(config: &Config, templates: TemplateSet) -> Result<Self, StartupError> {
        if let Some(missing) = REQUIRED_TEMPLATES
            .into_iter()
            .find(|name| !templates.contains(name))
        {
            return Err(StartupError::MissingTemplate(missing));
        }

        Ok(Self {
            config: config.clone(),
            store: PageStore::new(&config.wiki.data_dir),
            templates,
            validator: TitleValidator::new()?,
        })
    }
}
