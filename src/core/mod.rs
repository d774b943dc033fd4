pub mod config;
pub mod errors;
pub mod models;
pub mod pipeline;
pub mod utils;

pub use config::Settings;
pub use errors::HikkiError;
pub use models::{
    Token,
    WordFrequencyEntry,
};
pub use pipeline::{
    AnnotationPipeline,
    ParsedText,
};
