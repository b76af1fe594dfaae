use thiserror::Error;

/// Failures of the fetch-join-render pipeline.
///
/// `Fetch` and `Parse` abort before any rendering happens. `JoinMismatch` is the
/// abort-all join policy: one county without an education record kills the whole
/// render rather than painting a placeholder.
#[derive(Debug, Error)]
pub enum ChartError {
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to parse {what}: {message}")]
    Parse { what: &'static str, message: String },

    #[error("no education record for county fips {fips}")]
    JoinMismatch { fips: u32 },

    #[error("education dataset is empty")]
    EmptyDataset,
}

pub type Result<T> = std::result::Result<T, ChartError>;
