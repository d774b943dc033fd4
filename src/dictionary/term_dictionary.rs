//! Yomitan-format term dictionaries (e.g. JMdict for Yomitan) as a [`Dictionary`] backend.

use std::{
    collections::HashMap,
    fs::{
        self,
        File,
    },
    io::{
        BufReader,
        Read,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    time::Instant,
};

use rayon::prelude::*;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::{
    debug,
    info,
    warn,
};
use zip::ZipArchive;

use super::{
    Dictionary,
    DictionaryIndex,
    Entry,
    TermBankV3,
};
use crate::{
    core::{
        utils::contains_kanji,
        HikkiError,
    },
    persistence::get_app_data_dir,
};

const CACHE_FILE: &str = "cache.bin";

/// Ids handed to rows without a usable sequence number. Positive sequences stay below this bit.
const SYNTHETIC_ID_BIT: u64 = 1 << 63;

pub fn get_term_dict_dir() -> PathBuf {
    get_app_data_dir().join("dictionaries").join("terms")
}

/// What rows of one entry have in common: the JMdict sequence when the dictionary carries one,
/// otherwise the exact term.
#[derive(PartialEq, Eq, Hash)]
enum EntryKey {
    Sequence(i64),
    Term(String, String),
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TermDictionary {
    pub title: String,
    pub revision: String,
    entries: Vec<Entry>,                 // In term bank order
    index: HashMap<String, Vec<usize>>, // Written form or reading -> positions in `entries`
    by_id: HashMap<u64, usize>,
}

impl TermDictionary {
    pub fn new(title: String, revision: String, rows: Vec<TermBankV3>) -> Self {
        let mut entries: Vec<Entry> = Vec::new();
        let mut by_key: HashMap<EntryKey, usize> = HashMap::new();
        let mut by_id: HashMap<u64, usize> = HashMap::new();
        let mut index: HashMap<String, Vec<usize>> = HashMap::new();

        for row in rows {
            let reading = if row.reading.is_empty() { &row.expression } else { &row.reading };

            // Many dictionaries leave the sequence at 0 or -1 for every row
            let key = if row.sequence > 0 {
                EntryKey::Sequence(row.sequence)
            } else {
                EntryKey::Term(row.expression.clone(), reading.clone())
            };

            let position = *by_key.entry(key).or_insert_with(|| {
                let position = entries.len();
                let id = if row.sequence > 0 {
                    row.sequence as u64
                } else {
                    SYNTHETIC_ID_BIT | position as u64
                };
                by_id.insert(id, position);
                entries.push(Entry {
                    id,
                    kanji_forms: Vec::new(),
                    kana_forms: Vec::new(),
                    translations: Vec::new(),
                });
                position
            });

            let glossary = row.glossary_text();
            let entry = &mut entries[position];

            if contains_kanji(&row.expression) {
                push_unique(&mut entry.kanji_forms, &row.expression);
            } else {
                push_unique(&mut entry.kana_forms, &row.expression);
            }
            push_unique(&mut entry.kana_forms, reading);
            for gloss in glossary {
                push_unique(&mut entry.translations, &gloss);
            }

            for key in [&row.expression, reading] {
                let positions = index.entry(key.clone()).or_default();
                if !positions.contains(&position) {
                    positions.push(position);
                }
            }
        }

        TermDictionary { title, revision, entries, index, by_id }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, word: &str) -> Vec<&Entry> {
        self.index
            .get(word)
            .map(|positions| positions.iter().map(|&p| &self.entries[p]).collect())
            .unwrap_or_default()
    }

    pub fn get_by_id(&self, id: u64) -> Option<&Entry> {
        self.by_id.get(&id).map(|&p| &self.entries[p])
    }
}

impl Dictionary for TermDictionary {
    fn lookup(&self, word: &str) -> Result<Vec<Entry>, HikkiError> {
        Ok(self.get(word).into_iter().cloned().collect())
    }

    fn entry(&self, id: u64) -> Result<Option<Entry>, HikkiError> {
        Ok(self.get_by_id(id).cloned())
    }
}

fn push_unique(values: &mut Vec<String>, value: &str) {
    if !value.is_empty() && !values.iter().any(|v| v == value) {
        values.push(value.to_string());
    }
}

fn parse_index_json(folder_path: &Path) -> Result<Option<DictionaryIndex>, HikkiError> {
    let index_data = fs::read_to_string(folder_path.join("index.json"))?;
    let index: DictionaryIndex = serde_json::from_str(&index_data)?;

    let version = index.format.or(index.version).ok_or(HikkiError::MissingVersion)?;

    if version == 3 {
        Ok(Some(index))
    } else {
        Ok(None)
    }
}

fn term_bank_number(path: &Path) -> Option<u32> {
    path.file_name()?
        .to_str()?
        .strip_prefix("term_bank_")?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

fn parse_term_banks(folder_path: &Path) -> Result<Vec<TermBankV3>, HikkiError> {
    let mut banks: Vec<(u32, PathBuf)> = fs::read_dir(folder_path)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter_map(|path| term_bank_number(&path).map(|n| (n, path)))
        .collect();
    banks.sort_by_key(|(n, _)| *n);

    let rows: Vec<TermBankV3> = banks
        .par_iter()
        .map(|(_, path)| {
            fs::read_to_string(path)
                .ok()
                .and_then(|data| serde_json::from_str::<Vec<serde_json::Value>>(&data).ok())
                .unwrap_or_else(|| {
                    warn!("Skipping unreadable term bank {:?}", path);
                    Vec::new()
                })
                .into_iter()
                .filter_map(|raw_entry| serde_json::from_value::<TermBankV3>(raw_entry).ok())
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    debug!("Parsed {} rows from term bank files.", rows.len());
    Ok(rows)
}

fn load_cached_dict(cache_path: &Path) -> Result<TermDictionary, HikkiError> {
    let mut buffer = Vec::new();
    BufReader::new(File::open(cache_path)?).read_to_end(&mut buffer)?;
    let (dict, _): (TermDictionary, usize) =
        bincode::serde::decode_from_slice(&buffer, bincode::config::standard())?;
    Ok(dict)
}

fn save_cached_dict(dict: &TermDictionary, cache_path: &Path) -> Result<(), HikkiError> {
    let encoded = bincode::serde::encode_to_vec(dict, bincode::config::standard())?;
    File::create(cache_path)?.write_all(&encoded)?;
    Ok(())
}

fn extract_zip(zip_path: &Path, extract_to: &Path) -> Result<(), HikkiError> {
    let mut archive = ZipArchive::new(File::open(zip_path)?)?;
    archive.extract(extract_to)?;
    Ok(())
}

/// Load a term dictionary from a Yomitan zip or an already extracted folder.
///
/// Zips are extracted once into the application data directory. The parsed dictionary is cached
/// next to the term banks and rebuilt whenever the index revision changes.
pub fn load_term_dictionary(path: &Path) -> Result<TermDictionary, HikkiError> {
    let start = Instant::now();

    let folder = if path.is_file() {
        let stem = path.file_stem().unwrap_or_default().to_string_lossy();
        let extract_dir = get_term_dict_dir().join(stem.as_ref());
        if !extract_dir.join("index.json").exists() {
            fs::create_dir_all(&extract_dir)?;
            extract_zip(path, &extract_dir)?;
        }
        extract_dir
    } else {
        path.to_path_buf()
    };

    let index = parse_index_json(&folder)?.ok_or_else(|| {
        HikkiError::Custom(format!("Unsupported term dictionary format in {:?}", folder))
    })?;

    let cache_path = folder.join(CACHE_FILE);
    match load_cached_dict(&cache_path) {
        Ok(cached) if cached.revision == index.revision => {
            info!(
                "Loaded '{}' from cache in {:?}: {} entries",
                cached.title,
                start.elapsed(),
                cached.len()
            );
            return Ok(cached);
        }
        Ok(cached) => {
            info!(
                "Revision mismatch for '{}': cache={}, index={}",
                index.title, cached.revision, index.revision
            );
        }
        Err(e) => {
            debug!("No usable cache for '{}': {}, rebuilding from JSON", index.title, e);
        }
    }

    let rows = parse_term_banks(&folder)?;
    let dict = TermDictionary::new(index.title, index.revision, rows);
    info!("Built '{}' from JSON in {:?}: {} entries", dict.title, start.elapsed(), dict.len());

    if let Err(e) = save_cached_dict(&dict, &cache_path) {
        warn!("Failed to save cache for '{}': {}", dict.title, e);
    }

    Ok(dict)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_dictionary(folder: &Path, revision: &str) {
        fs::write(
            folder.join("index.json"),
            format!(r#"{{"title": "JMdict Test", "revision": "{}", "format": 3}}"#, revision),
        )
        .unwrap();
        fs::write(
            folder.join("term_bank_1.json"),
            r#"[
                ["食べる", "たべる", "v1", "v1", 100, ["to eat"], 1358280, "P"],
                ["喰べる", "たべる", "v1", "v1", 1, ["to eat"], 1358280, ""],
                ["漢字", "かんじ", "n", "", 50, ["kanji", "Chinese character"], 1315880, "P"]
            ]"#,
        )
        .unwrap();
        fs::write(
            folder.join("term_bank_2.json"),
            r#"[["たべる", "", "v1", "v1", 0, ["eating (kana entry)"], 9999999, ""]]"#,
        )
        .unwrap();
    }

    #[test]
    fn test_entries_are_grouped_by_sequence() {
        let dir = tempfile::tempdir().unwrap();
        write_dictionary(dir.path(), "1");

        let dict = load_term_dictionary(dir.path()).unwrap();
        assert_eq!(dict.title, "JMdict Test");
        assert_eq!(dict.len(), 3);

        let entries = dict.lookup("食べる").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, 1358280);
        assert_eq!(entries[0].kanji_forms, vec!["食べる", "喰べる"]);
        assert_eq!(entries[0].kana_forms, vec!["たべる"]);
        assert_eq!(entries[0].translations, vec!["to eat"]);
    }

    #[test]
    fn test_lookup_by_reading_keeps_bank_order() {
        let dir = tempfile::tempdir().unwrap();
        write_dictionary(dir.path(), "1");

        let dict = load_term_dictionary(dir.path()).unwrap();
        let ids: Vec<u64> = dict.lookup("たべる").unwrap().iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1358280, 9999999]);

        assert!(dict.lookup("存在しない").unwrap().is_empty());
    }

    #[test]
    fn test_cache_is_reused_until_revision_changes() {
        let dir = tempfile::tempdir().unwrap();
        write_dictionary(dir.path(), "1");
        load_term_dictionary(dir.path()).unwrap();
        assert!(dir.path().join(CACHE_FILE).exists());

        // Same revision: banks are not read again
        fs::remove_file(dir.path().join("term_bank_2.json")).unwrap();
        let cached = load_term_dictionary(dir.path()).unwrap();
        assert_eq!(cached.len(), 3);

        // New revision: rebuilt from the remaining bank
        write_dictionary(dir.path(), "2");
        fs::remove_file(dir.path().join("term_bank_2.json")).unwrap();
        let rebuilt = load_term_dictionary(dir.path()).unwrap();
        assert_eq!(rebuilt.revision, "2");
        assert_eq!(rebuilt.len(), 2);
    }

    #[test]
    fn test_rows_without_sequence_stay_apart() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("index.json"),
            r#"{"title": "No Sequences", "revision": "1", "format": 3}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("term_bank_1.json"),
            r#"[
                ["猫", "ねこ", "n", "", 10, ["cat"], 0, ""],
                ["犬", "いぬ", "n", "", 10, ["dog"], 0, ""],
                ["猫", "ねこ", "n", "", 5, ["feline"], 0, ""],
                ["鳥", "とり", "n", "", 10, ["bird"], -1, ""]
            ]"#,
        )
        .unwrap();

        let dict = load_term_dictionary(dir.path()).unwrap();
        assert_eq!(dict.len(), 3);

        let cat = &dict.lookup("猫").unwrap()[0];
        let dog = &dict.lookup("犬").unwrap()[0];
        let bird = &dict.lookup("鳥").unwrap()[0];
        assert_ne!(cat.id, dog.id);
        assert_ne!(dog.id, bird.id);
        assert_eq!(cat.translations, vec!["cat", "feline"]);
        assert_eq!(dog.translations, vec!["dog"]);
        assert!(cat.id >= SYNTHETIC_ID_BIT);
    }

    #[test]
    fn test_entry_by_id() {
        let dir = tempfile::tempdir().unwrap();
        write_dictionary(dir.path(), "1");
        let dict = load_term_dictionary(dir.path()).unwrap();

        let kanji = dict.entry(1315880).unwrap().unwrap();
        assert_eq!(kanji.kanji_forms, vec!["漢字"]);
        assert_eq!(kanji.translations, vec!["kanji", "Chinese character"]);
        assert!(dict.entry(42).unwrap().is_none());

        // The id index survives the cache
        let cached = load_term_dictionary(dir.path()).unwrap();
        assert_eq!(cached.entry(1358280).unwrap().map(|e| e.id), Some(1358280));
    }

    #[test]
    fn test_unsupported_format_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let index = dir.path().join("index.json");
        fs::write(&index, r#"{"title": "Old", "revision": "1", "format": 1}"#).unwrap();
        assert!(load_term_dictionary(dir.path()).is_err());

        fs::write(&index, r#"{"title": "Old", "revision": "1"}"#).unwrap();
        assert!(matches!(load_term_dictionary(dir.path()), Err(HikkiError::MissingVersion)));
    }
}
