use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Caller inputs could not be resolved into a partition/populations pair
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A fitted-only attribute was read before `fit`
    #[error("Classifier is not fitted")]
    NotFitted,

    /// The classifier does not expose this attribute
    #[error("Attribute `{name}` is not available for this classifier")]
    AttributeUnavailable { name: &'static str },

    #[error("Classifier error: {message}")]
    Classifier { message: String },

    #[error("Dataset error: {message}")]
    Dataset { message: String },

    #[error("Partition error: {message}")]
    Partition { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    #[error("Worker pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn classifier(message: impl Into<String>) -> Self {
        Self::Classifier {
            message: message.into(),
        }
    }

    pub fn dataset(message: impl Into<String>) -> Self {
        Self::Dataset {
            message: message.into(),
        }
    }

    pub fn partition(message: impl Into<String>) -> Self {
        Self::Partition {
            message: message.into(),
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config { .. })
    }
}
