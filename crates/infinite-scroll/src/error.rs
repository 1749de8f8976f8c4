/// Errors reported by a [`PageSource`](crate::source::PageSource)
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("Source unavailable: {0}")]
    Unavailable(String),
    #[error("Malformed dataset: {0}")]
    Malformed(String),
}

/// Errors surfaced by the list controller
///
/// Running out of pages is not an error; see [`SkipReason::Exhausted`](crate::SkipReason::Exhausted).
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ListError {
    /// The source failed to deliver a page. Items and page metadata are left untouched.
    #[error("Failed to fetch page {page}: {reason}")]
    FetchFailed { page: usize, reason: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ListError {
    pub(crate) fn fetch_failed(page: usize, err: SourceError) -> Self {
        ListError::FetchFailed {
            page,
            reason: err.to_string(),
        }
    }
}
