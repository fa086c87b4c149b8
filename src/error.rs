use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BingError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected http status: {0}")]
    Status(reqwest::StatusCode),

    #[error("invalid or unexpected response format: {0}")]
    InvalidResponse(#[from] serde_json::Error),

    #[error("invalid image url {url}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to download image {id}")]
    Download {
        id: String,
        #[source]
        source: Box<BingError>,
    },
}

impl BingError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BingError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn download(id: impl Into<String>, source: BingError) -> Self {
        BingError::Download {
            id: id.into(),
            source: Box::new(source),
        }
    }
}
