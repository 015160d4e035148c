use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("no templates found")]
    NoTemplates,
    #[error("primary template {{{0}}} not found")]
    PrimaryTemplateNotFound(String),
    #[error("no primary template is configured")]
    NoPrimaryTemplate,
    #[error("failed to find expense template for name {{{0}}}")]
    TemplateNotFound(String),
    #[error("expected one SubmittedExpense, received 0")]
    NoConfirmationReturned,
    #[error("expected one SubmittedExpense, received {0}")]
    AmbiguousConfirmation(usize),
    #[error("Could not read the configuration file {}: {source}", .path.display())]
    ConfigRead {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    ConfigParse(String),
    #[error(transparent)]
    Client(#[from] expensify_api_client::Error),
}
