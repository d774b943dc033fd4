pub mod core;
pub mod dictionary;
pub mod notebook;
pub mod persistence;
pub mod review;
pub mod segmentation;
pub mod vocabulary;

#[cfg(test)]
mod test_support;

pub use crate::core::{
    AnnotationPipeline,
    HikkiError,
    ParsedText,
    Settings,
    Token,
    WordFrequencyEntry,
};
pub use dictionary::{
    term_dictionary::{
        load_term_dictionary,
        TermDictionary,
    },
    token_dictionary::{
        DictType,
        DownloadPolicy,
    },
    Dictionary,
    Entry,
};
pub use notebook::{
    Analysis,
    CardDetails,
    Notebook,
    NotebookService,
    Page,
    PageEdit,
};
pub use review::{
    record_review,
    FlashCard,
    FlashCardStore,
    Mastery,
};
pub use segmentation::{
    segmenter::{
        segment,
        SegmentedWord,
    },
    tokenizer::{
        init_vibrato,
        Tokenizer,
        VibratoTokenizer,
    },
};
pub use vocabulary::{
    DefinedVocabulary,
    Resolution,
    Vocabulary,
    VocabularyResolver,
    VocabularyStore,
};
