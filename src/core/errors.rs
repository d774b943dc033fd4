use thiserror::Error;

#[derive(Error, Debug)]
pub enum HikkiError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("Vibrato error: {0}")]
    Vibrato(Box<vibrato::errors::VibratoError>),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("Cache encode error: {0}")]
    CacheEncode(#[from] bincode::error::EncodeError),

    #[error("Cache decode error: {0}")]
    CacheDecode(#[from] bincode::error::DecodeError),

    #[error("Unknown part of speech: {0}")]
    UnknownPartOfSpeech(String),

    #[error("Answer quality must be in range of [0, 5], got {0}")]
    InvalidAnswerQuality(i32),

    #[error("Vocabulary {0} not found")]
    VocabularyNotFound(u64),

    #[error("Flash card {0} not found")]
    FlashCardNotFound(uuid::Uuid),

    #[error("Page {0} not found")]
    PageNotFound(u32),

    #[error("term dictionary index.json must have either 'format' or 'version'")]
    MissingVersion,

    #[error("Lock poisoned: {0}")]
    Poisoned(String),

    #[error("HikkiError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for HikkiError {
    fn from(error: std::io::Error) -> Self {
        HikkiError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for HikkiError {
    fn from(error: reqwest::Error) -> Self {
        HikkiError::Reqwest(Box::new(error))
    }
}

impl From<vibrato::errors::VibratoError> for HikkiError {
    fn from(error: vibrato::errors::VibratoError) -> Self {
        HikkiError::Vibrato(Box::new(error))
    }
}

impl<T> From<std::sync::PoisonError<T>> for HikkiError {
    fn from(error: std::sync::PoisonError<T>) -> Self {
        HikkiError::Poisoned(error.to_string())
    }
}
