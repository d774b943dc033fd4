use std::fmt;

use crate::core::HikkiError;

/// Top level (pos1) UniDic / Sudachi part-of-speech categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartOfSpeech {
    Doushi,       // Verb (動詞)
    Meishi,       // Noun (名詞)
    Daimeishi,    // Pronoun (代名詞)
    Keiyoushi,    // i-adjective (形容詞)
    Keijoushi,    // na-adjective (形状詞)
    Jodoushi,     // Auxiliary verb (助動詞)
    Joshi,        // Particle (助詞)
    Fukushi,      // Adverb (副詞)
    Kuuhaku,      // Whitespace (空白)
    Rentaishi,    // Adnominal (連体詞) (あの, この, etc)
    Hojokigou,    // Supplementary symbols and punctuation (補助記号)
    Kigou,        // Symbol (記号)
    Kandoushi,    // Interjection (感動詞)
    Setsubiji,    // Suffix (接尾辞)
    Settouji,     // Prefix (接頭辞)
    Setsuzokushi, // Conjunction (接続詞)
}

impl PartOfSpeech {
    /// Categories worth turning into vocabulary.
    pub const NOTEWORTHY: [PartOfSpeech; 6] = [
        PartOfSpeech::Doushi,
        PartOfSpeech::Meishi,
        PartOfSpeech::Daimeishi,
        PartOfSpeech::Keijoushi,
        PartOfSpeech::Keiyoushi,
        PartOfSpeech::Setsuzokushi,
    ];

    pub fn is_noteworthy(&self) -> bool {
        Self::NOTEWORTHY.contains(self)
    }
}

impl TryFrom<&str> for PartOfSpeech {
    type Error = HikkiError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let pos = match value {
            "動詞" => Self::Doushi,
            "名詞" => Self::Meishi,
            "代名詞" => Self::Daimeishi,
            "形容詞" => Self::Keiyoushi,
            "形状詞" => Self::Keijoushi,
            "助動詞" => Self::Jodoushi,
            "助詞" => Self::Joshi,
            "副詞" => Self::Fukushi,
            "空白" => Self::Kuuhaku,
            "連体詞" => Self::Rentaishi,
            "補助記号" => Self::Hojokigou,
            "記号" => Self::Kigou,
            "感動詞" => Self::Kandoushi,
            "接尾辞" => Self::Setsubiji,
            "接頭辞" => Self::Settouji,
            "接続詞" => Self::Setsuzokushi,
            _ => return Err(HikkiError::UnknownPartOfSpeech(value.to_string())),
        };
        Ok(pos)
    }
}

impl fmt::Display for PartOfSpeech {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let readable = match self {
            PartOfSpeech::Doushi => "Verb",
            PartOfSpeech::Meishi => "Noun",
            PartOfSpeech::Daimeishi => "Pronoun",
            PartOfSpeech::Keiyoushi => "Adjective",
            PartOfSpeech::Keijoushi => "Adjectival Noun",
            PartOfSpeech::Jodoushi => "Auxiliary Verb",
            PartOfSpeech::Joshi => "Particle",
            PartOfSpeech::Fukushi => "Adverb",
            PartOfSpeech::Kuuhaku => "Whitespace",
            PartOfSpeech::Rentaishi => "Determiner",
            PartOfSpeech::Hojokigou | PartOfSpeech::Kigou => "Symbol",
            PartOfSpeech::Kandoushi => "Interjection",
            PartOfSpeech::Setsubiji => "Suffix",
            PartOfSpeech::Settouji => "Prefix",
            PartOfSpeech::Setsuzokushi => "Conjunction",
        };
        write!(f, "{}", readable)
    }
}
