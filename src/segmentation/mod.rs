pub mod part_of_speech;
pub mod segmenter;
pub mod token_models;
pub mod tokenizer;
