//! Line oriented annotation pass: tokenize, render ruby markup and count noteworthy words.

use std::{
    collections::HashMap,
    sync::Arc,
};

use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    warn,
};

use super::{
    Token,
    WordFrequencyEntry,
};
use crate::segmentation::{
    part_of_speech::PartOfSpeech,
    segmenter::render_token,
    tokenizer::Tokenizer,
};

pub const LINE_SEPARATOR: &str = "<br>";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedText {
    pub html: String,
    pub word_list: Vec<WordFrequencyEntry>,
}

struct ParsedLine {
    html: String,
    tokens: Vec<Token>,
}

pub struct AnnotationPipeline {
    tokenizer: Arc<dyn Tokenizer>,
    parallel: bool,
}

impl AnnotationPipeline {
    pub fn new(tokenizer: Arc<dyn Tokenizer>) -> Self {
        Self { tokenizer, parallel: true }
    }

    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Annotate `text` and merge its word counts into `existing`.
    pub fn parse(&self, text: &str, existing: &[WordFrequencyEntry]) -> ParsedText {
        let (html, words) = self.analyze(text);
        ParsedText { html, word_list: merge_word_lists(existing, words) }
    }

    /// Annotated HTML plus this text's own word counts, ranked.
    pub fn analyze(&self, text: &str) -> (String, Vec<WordFrequencyEntry>) {
        let (html, tokens) = self.annotate(text);
        (html, count_words(tokens))
    }

    /// Annotated HTML and every token of `text` in reading order.
    pub fn annotate(&self, text: &str) -> (String, Vec<Token>) {
        let lines: Vec<&str> = text.split('\n').collect();

        let parsed: Vec<ParsedLine> = if self.parallel {
            lines.par_iter().map(|line| self.parse_line(line)).collect()
        } else {
            lines.iter().map(|line| self.parse_line(line)).collect()
        };

        let mut html_lines = Vec::with_capacity(parsed.len());
        let mut tokens = Vec::new();
        for line in parsed {
            html_lines.push(line.html);
            tokens.extend(line.tokens);
        }

        (html_lines.join(LINE_SEPARATOR), tokens)
    }

    fn parse_line(&self, line: &str) -> ParsedLine {
        let line = line.trim();
        if line.is_empty() {
            return ParsedLine { html: String::new(), tokens: Vec::new() };
        }

        let tokens = self.tokenizer.tokenize(line);
        let html = tokens.iter().map(render_token).collect();

        ParsedLine { html, tokens }
    }
}

/// Count noteworthy tokens by token id. The first occurrence records the normalized form.
pub fn count_words(tokens: impl IntoIterator<Item = Token>) -> Vec<WordFrequencyEntry> {
    let mut word_map: HashMap<String, WordFrequencyEntry> = HashMap::new();

    for token in tokens.into_iter().filter(is_noteworthy) {
        word_map
            .entry(token.token_id.clone())
            .and_modify(|entry| entry.count += 1)
            .or_insert_with(|| WordFrequencyEntry {
                word: token.normalized_form,
                token_id: token.token_id,
                count: 1,
            });
    }

    let mut words: Vec<WordFrequencyEntry> = word_map.into_values().collect();
    sort_word_list(&mut words);
    words
}

/// Noteworthy tokens are pure Japanese script with a content-word part of speech.
pub fn is_noteworthy(token: &Token) -> bool {
    let pos = match PartOfSpeech::try_from(token.part_of_speech.as_str()) {
        Ok(pos) => pos,
        Err(_) => {
            warn!("Unknown part-of-speech found: {}", token);
            return false;
        }
    };

    if pos.is_noteworthy() && token.only_contains_japanese_chars() {
        debug!("Including {} {} to word list.", pos, token.surface);
        true
    } else {
        debug!("Skipping {} {} from word list", pos, token.surface);
        false
    }
}

/// Key union of both lists, summing counts of shared token ids. Existing entries are never
/// dropped and keep their recorded word.
pub fn merge_word_lists(
    existing: &[WordFrequencyEntry],
    additional: impl IntoIterator<Item = WordFrequencyEntry>,
) -> Vec<WordFrequencyEntry> {
    let mut merged: HashMap<String, WordFrequencyEntry> = HashMap::new();

    for entry in existing.iter().cloned().chain(additional) {
        merged
            .entry(entry.token_id.clone())
            .and_modify(|current| current.count += entry.count)
            .or_insert(entry);
    }

    let mut words: Vec<WordFrequencyEntry> = merged.into_values().collect();
    sort_word_list(&mut words);
    words
}

/// Descending count, ties broken by token id.
pub fn sort_word_list(words: &mut [WordFrequencyEntry]) {
    words.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token_id.cmp(&b.token_id)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::FakeTokenizer;

    fn pipeline() -> AnnotationPipeline {
        AnnotationPipeline::new(Arc::new(FakeTokenizer::default()))
    }

    fn count_of(words: &[WordFrequencyEntry], word: &str) -> Option<u32> {
        words.iter().find(|w| w.word == word).map(|w| w.count)
    }

    #[test]
    fn test_html_and_word_list() {
        let parsed = pipeline().parse("漢字を食べる。", &[]);

        assert_eq!(
            parsed.html,
            "<ruby data-word-id=\"fake__漢字\"><rb>漢字</rb><rp>(</rp><rt>かんじ</rt><rp>)</rp></ruby>\
             を\
             <ruby data-word-id=\"fake__食べる\"><rb>食</rb><rp>(</rp><rt>た</rt><rp>)</rp></ruby>べる\
             。"
        );
        assert_eq!(parsed.word_list.len(), 2);
        assert_eq!(count_of(&parsed.word_list, "漢字"), Some(1));
        assert_eq!(count_of(&parsed.word_list, "食べる"), Some(1));
        assert_eq!(count_of(&parsed.word_list, "を"), None);
    }

    #[test]
    fn test_lines_and_blank_lines() {
        let parsed = pipeline().parse("猫\n\n猫を見る\r\n", &[]);
        let lines: Vec<&str> = parsed.html.split(LINE_SEPARATOR).collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("<rb>猫</rb>"));
        assert_eq!(lines[1], "");
        assert!(lines[2].contains("<rb>見</rb>"));
        assert_eq!(lines[3], "");

        assert_eq!(parsed.word_list[0].word, "猫");
        assert_eq!(parsed.word_list[0].count, 2);
    }

    #[test]
    fn test_conjugations_share_normalized_word_but_not_token_id() {
        let words = pipeline().parse("食べた。食べる。食べる", &[]).word_list;

        let eat: Vec<&WordFrequencyEntry> = words.iter().filter(|w| w.word == "食べる").collect();
        assert_eq!(eat.len(), 2);
        assert_eq!(words[0].token_id, "fake__食べる");
        assert_eq!(words[0].count, 2);
    }

    #[test]
    fn test_filter_rejects_mixed_script_and_unknown_pos() {
        let words = pipeline().parse("Tシャツとあの猫、ぴえん", &[]).word_list;

        // Tシャツ is a noun but not pure Japanese; ぴえん has an unknown tag; と/あの are skipped
        let tokens: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(tokens, vec!["猫"]);
    }

    #[test]
    fn test_reparse_is_idempotent() {
        let text = "猫を見る\n猫が食べる";
        let first = pipeline().parse(text, &[]);
        let second = pipeline().parse(text, &[]);
        assert_eq!(first, second);

        let sequential = pipeline().with_parallelism(false).parse(text, &[]);
        assert_eq!(first, sequential);
    }

    #[test]
    fn test_merge_with_itself_doubles_counts() {
        let parsed = pipeline().parse("猫を見る\n猫が食べる", &[]);
        let merged = merge_word_lists(&parsed.word_list, parsed.word_list.clone());

        assert_eq!(merged.len(), parsed.word_list.len());
        for entry in &parsed.word_list {
            let doubled = merged.iter().find(|m| m.token_id == entry.token_id).unwrap();
            assert_eq!(doubled.count, entry.count * 2);
        }
    }

    #[test]
    fn test_merge_never_drops_existing_entries() {
        let entry = |word: &str, count: u32| WordFrequencyEntry {
            word: word.to_string(),
            token_id: format!("fake__{}", word),
            count,
        };
        let existing = vec![entry("犬", 4), entry("猫", 1)];
        let parsed = pipeline().parse("猫を見る", &existing);

        assert_eq!(count_of(&parsed.word_list, "犬"), Some(4));
        assert_eq!(count_of(&parsed.word_list, "猫"), Some(2));
        assert_eq!(count_of(&parsed.word_list, "見る"), Some(1));
        for entry in &existing {
            let merged = parsed.word_list.iter().find(|w| w.token_id == entry.token_id).unwrap();
            assert!(merged.count >= entry.count);
        }
    }

    #[test]
    fn test_word_list_order_is_deterministic() {
        let mut words = vec![
            WordFrequencyEntry { word: "b".to_string(), token_id: "b".to_string(), count: 1 },
            WordFrequencyEntry { word: "c".to_string(), token_id: "c".to_string(), count: 3 },
            WordFrequencyEntry { word: "a".to_string(), token_id: "a".to_string(), count: 1 },
        ];
        sort_word_list(&mut words);
        let order: Vec<&str> = words.iter().map(|w| w.token_id.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }
}
