#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("rate request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("rate source returned status {0}")]
    Status(u16),
    #[error("no rate entry for {0}")]
    MissingRate(String),
    #[error("non-positive rate {rate} for {code}")]
    InvalidRate { code: String, rate: f64 },
}

pub type FetchResult<T> = Result<T, FetchError>;
