//! In-memory tokenizer and dictionary used by unit tests, so the suite runs without a vibrato
//! model or a JMdict download.

use std::{
    collections::{
        HashMap,
        HashSet,
    },
    sync::atomic::{
        AtomicUsize,
        Ordering,
    },
};

use crate::{
    core::{
        utils::{
            is_japanese_char,
            to_katakana,
        },
        HikkiError,
        Token,
    },
    dictionary::{
        Dictionary,
        Entry,
    },
    segmentation::tokenizer::Tokenizer,
};

pub fn token(surface: &str, reading: &str, normalized: &str, pos: &str) -> Token {
    Token {
        surface: surface.to_string(),
        token_id: format!("fake__{}", surface),
        reading_form: reading.to_string(),
        normalized_form: normalized.to_string(),
        lemma: normalized.to_string(),
        part_of_speech: pos.to_string(),
    }
}

/// Greedy longest-match tokenizer over a fixed lexicon. Unknown characters become one-character
/// tokens: nouns for Japanese script, symbols for everything else. Compounds listed in `splits`
/// normalize into their parts.
pub struct FakeTokenizer {
    lexicon: Vec<Token>,
    splits: HashMap<String, Vec<String>>,
}

impl FakeTokenizer {
    pub fn with_entry(mut self, surface: &str, reading: &str, normalized: &str, pos: &str) -> Self {
        self.lexicon.push(token(surface, reading, normalized, pos));
        self
    }

    fn fallback(ch: char) -> Token {
        let surface = ch.to_string();
        let pos = if ch.is_whitespace() {
            "空白"
        } else if is_japanese_char(ch) {
            "名詞"
        } else {
            "補助記号"
        };
        token(&surface, &to_katakana(&surface), &surface, pos)
    }
}

impl Default for FakeTokenizer {
    fn default() -> Self {
        let lexicon = [
            ("漢字", "カンジ", "漢字", "名詞"),
            ("食べる", "タベル", "食べる", "動詞"),
            ("食べた", "タベタ", "食べる", "動詞"),
            ("猫", "ネコ", "猫", "名詞"),
            ("犬", "イヌ", "犬", "名詞"),
            ("見る", "ミル", "見る", "動詞"),
            ("美しい", "ウツクシイ", "美しい", "形容詞"),
            ("日本語", "ニホンゴ", "日本語", "名詞"),
            ("勉強", "ベンキョウ", "勉強", "名詞"),
            ("する", "スル", "する", "動詞"),
            ("都庁舎", "トチョウシャ", "都庁舎", "名詞"),
            ("Tシャツ", "ティーシャツ", "Tシャツ", "名詞"),
            ("ぴえん", "ピエン", "ぴえん", "新語"),
            ("あの", "アノ", "あの", "連体詞"),
            ("を", "ヲ", "を", "助詞"),
            ("が", "ガ", "が", "助詞"),
            ("と", "ト", "と", "助詞"),
            ("は", "ハ", "は", "助詞"),
            ("。", "", "。", "補助記号"),
            ("、", "", "、", "補助記号"),
        ]
        .into_iter()
        .map(|(surface, reading, normalized, pos)| token(surface, reading, normalized, pos))
        .collect();

        let splits = HashMap::from([(
            "都庁舎".to_string(),
            vec!["都".to_string(), "庁".to_string(), "舎".to_string()],
        )]);

        Self { lexicon, splits }
    }
}

impl Tokenizer for FakeTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut rest = text;

        while let Some(ch) = rest.chars().next() {
            let matched = self
                .lexicon
                .iter()
                .filter(|entry| rest.starts_with(&entry.surface))
                .max_by_key(|entry| entry.surface.len());

            match matched {
                Some(entry) => {
                    rest = &rest[entry.surface.len()..];
                    tokens.push(entry.clone());
                }
                None => {
                    rest = &rest[ch.len_utf8()..];
                    tokens.push(Self::fallback(ch));
                }
            }
        }

        tokens
    }

    fn normalize(&self, token: &Token) -> Vec<Token> {
        match self.splits.get(&token.normalized_form) {
            Some(parts) => parts.iter().flat_map(|part| self.tokenize(part)).collect(),
            None if token.normalized_form.is_empty() => Vec::new(),
            None => self.tokenize(&token.normalized_form),
        }
    }
}

/// One token per character, relying on the trait's own `normalize`.
pub struct CharTokenizer;

impl Tokenizer for CharTokenizer {
    fn tokenize(&self, text: &str) -> Vec<Token> {
        text.chars()
            .filter(|ch| !ch.is_whitespace())
            .map(|ch| {
                let surface = ch.to_string();
                token(&surface, &to_katakana(&surface), &surface, "名詞")
            })
            .collect()
    }
}

/// Word → entries table that counts every lookup. Words registered with `failing` return an
/// error instead of entries.
#[derive(Default)]
pub struct FakeDictionary {
    entries: HashMap<String, Vec<Entry>>,
    failing: HashSet<String>,
    calls: AtomicUsize,
}

impl FakeDictionary {
    pub fn jmdict() -> Self {
        Self::default()
            .with_entry("食べる", 1358280, "たべる", "to eat")
            .with_entry("猫", 1467640, "ねこ", "cat")
            .with_entry("犬", 1485740, "いぬ", "dog")
            .with_entry("見る", 1259290, "みる", "to see")
            .with_entry("漢字", 1315880, "かんじ", "kanji")
            .with_entry("美しい", 1515330, "うつくしい", "beautiful")
            .with_entry("勉強", 1360300, "べんきょう", "study")
            .with_entry("庁", 1429740, "ちょう", "government office")
    }

    pub fn with_entry(mut self, word: &str, id: u64, kana: &str, translation: &str) -> Self {
        self.entries.entry(word.to_string()).or_default().push(Entry {
            id,
            kanji_forms: vec![word.to_string()],
            kana_forms: vec![kana.to_string()],
            translations: vec![translation.to_string()],
        });
        self
    }

    pub fn failing(mut self, word: &str) -> Self {
        self.failing.insert(word.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Dictionary for FakeDictionary {
    fn lookup(&self, word: &str) -> Result<Vec<Entry>, HikkiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(word) {
            return Err(HikkiError::Custom(format!("lookup of {} timed out", word)));
        }
        Ok(self.entries.get(word).cloned().unwrap_or_default())
    }

    fn entry(&self, id: u64) -> Result<Option<Entry>, HikkiError> {
        Ok(self.entries.values().flatten().find(|entry| entry.id == id).cloned())
    }
}
