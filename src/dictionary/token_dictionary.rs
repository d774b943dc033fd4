//! Provisioning of the vibrato tokenizer model (download, decompress, cache).

use std::{
    fs::{
        self,
        File,
    },
    io::{
        self,
        BufReader,
        BufWriter,
        Write,
    },
    path::{
        Path,
        PathBuf,
    },
    thread,
    time::Duration,
};

use liblzma::read::XzDecoder;
use reqwest::{
    blocking::Client,
    header::{
        ACCEPT_ENCODING,
        USER_AGENT,
    },
};
use serde::{
    Deserialize,
    Serialize,
};
use tar::Archive;
use tracing::{
    debug,
    info,
    warn,
};
use vibrato::Dictionary;
use zstd::stream::copy_decode;

use crate::{
    core::HikkiError,
    persistence::get_app_data_dir,
};

fn get_tokenizer_dict_dir() -> PathBuf {
    get_app_data_dir().join("dictionaries").join("tokenizer")
}

/// How model archives are fetched. Connection failures, 5xx answers and empty or cut bodies are
/// retried after `backoff_secs * attempt`; any other HTTP error fails at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadPolicy {
    pub timeout_secs: u64,
    pub attempts: u32,
    pub backoff_secs: u64,
}

impl Default for DownloadPolicy {
    fn default() -> Self {
        Self { timeout_secs: 120, attempts: 3, backoff_secs: 2 }
    }
}

enum FetchError {
    Retry(String),
    Fatal(HikkiError),
}

impl DownloadPolicy {
    pub fn client(&self) -> Result<Client, HikkiError> {
        Ok(Client::builder().timeout(Duration::from_secs(self.timeout_secs)).build()?)
    }

    /// GET `url` into `path` and return the number of bytes written. Nothing is left at `path`
    /// when every attempt fails.
    pub fn fetch(&self, client: &Client, url: &str, path: &Path) -> Result<u64, HikkiError> {
        let attempts = self.attempts.max(1);
        let mut last_failure = String::new();

        for attempt in 1..=attempts {
            if attempt > 1 {
                thread::sleep(Duration::from_secs(self.backoff_secs * u64::from(attempt - 1)));
            }

            match fetch_once(client, url, path) {
                Ok(bytes) => {
                    debug!("Downloaded {} bytes from {}", bytes, url);
                    return Ok(bytes);
                }
                Err(FetchError::Fatal(e)) => {
                    fs::remove_file(path).ok();
                    return Err(e);
                }
                Err(FetchError::Retry(reason)) => {
                    warn!("GET {} failed (attempt {}/{}): {}", url, attempt, attempts, reason);
                    last_failure = reason;
                }
            }
        }

        fs::remove_file(path).ok();
        Err(HikkiError::Custom(format!(
            "Failed to download {} after {} attempts: {}",
            url, attempts, last_failure
        )))
    }
}

fn fetch_once(client: &Client, url: &str, path: &Path) -> Result<u64, FetchError> {
    let mut response = client
        .get(url)
        .header(USER_AGENT, concat!("hikki/", env!("CARGO_PKG_VERSION")))
        .header(ACCEPT_ENCODING, "identity")
        .send()
        .map_err(|e| FetchError::Retry(e.to_string()))?;

    let status = response.status();
    if status.is_server_error() {
        return Err(FetchError::Retry(format!("HTTP {}", status)));
    }
    if !status.is_success() {
        return Err(FetchError::Fatal(HikkiError::Custom(format!(
            "HTTP error {} from {}",
            status, url
        ))));
    }

    let file = File::create(path).map_err(|e| FetchError::Fatal(e.into()))?;
    let mut writer = BufWriter::new(file);
    let bytes = response.copy_to(&mut writer).map_err(|e| FetchError::Retry(e.to_string()))?;
    writer.flush().map_err(|e| FetchError::Fatal(e.into()))?;

    if bytes == 0 {
        return Err(FetchError::Retry("empty body".to_string()));
    }
    Ok(bytes)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DictType {
    #[default]
    Unidic,
    Ipadic,
}

impl DictType {
    fn url(&self) -> &str {
        match self {
            DictType::Unidic => {
                "https://github.com/daac-tools/vibrato/releases/download/v0.5.0/bccwj-suw+unidic-cwj-3_1_1.tar.xz"
            }
            DictType::Ipadic => {
                "https://github.com/daac-tools/vibrato/releases/download/v0.5.0/ipadic-mecab-2_7_0.tar.xz"
            }
        }
    }

    fn folder_name(&self) -> &str {
        match self {
            DictType::Unidic => "bccwj-suw+unidic-cwj-3_1_1",
            DictType::Ipadic => "ipadic-mecab-2_7_0",
        }
    }

    fn license_files(&self) -> &[&str] {
        match self {
            DictType::Unidic => &["BSD", "NOTICE"],
            DictType::Ipadic => &["COPYING", "NOTICE"],
        }
    }
}

fn cleanup_files(folder_path: &Path, keep_files: &[&str]) -> Result<(), HikkiError> {
    let keep_paths: Vec<PathBuf> = keep_files.iter().map(|f| folder_path.join(f)).collect();
    debug!("Cleaning up intermediate files in {:?}", folder_path);

    for entry in fs::read_dir(folder_path)? {
        let path = entry?.path();

        if keep_paths.contains(&path) {
            continue;
        }

        if path.is_dir() {
            fs::remove_dir_all(&path)?;
        } else {
            fs::remove_file(&path)?;
        }
    }

    Ok(())
}

/// Make sure the `system.dic` of `dict_type` exists locally and return its path.
pub fn ensure_dictionary(
    dict_type: &DictType,
    policy: &DownloadPolicy,
) -> Result<PathBuf, HikkiError> {
    let url = dict_type.url();
    let folder_name = dict_type.folder_name();
    let dict_dir = get_tokenizer_dict_dir();
    let extract_path = dict_dir.join(folder_name);
    let final_dic_path = extract_path.join("system.dic");

    if final_dic_path.exists() {
        info!("Tokenizer model already downloaded, loading...");
        return Ok(final_dic_path);
    }

    fs::create_dir_all(&dict_dir)?;

    // Partial downloads or extractions from previous attempts
    let download_path = dict_dir.join(format!("{}.tar.xz", folder_name));
    let tar_path = dict_dir.join(format!("{}.tar", folder_name));
    fs::remove_file(&download_path).ok();
    fs::remove_file(&tar_path).ok();
    fs::remove_dir_all(&extract_path).ok();

    info!("Downloading tokenizer model from {}", url);
    policy.fetch(&policy.client()?, url, &download_path)?;

    info!("Extracting tokenizer model...");
    let tar_xz_file = File::open(&download_path)?;
    let mut tar_file = File::create(&tar_path)?;
    let mut xz_decoder = XzDecoder::new(BufReader::new(tar_xz_file));
    io::copy(&mut xz_decoder, &mut tar_file).map_err(|e| {
        HikkiError::Custom(format!(
            "Failed to decompress XZ to TAR: {}. Possible corrupt download.",
            e
        ))
    })?;

    let mut archive = Archive::new(BufReader::new(File::open(&tar_path)?));
    archive.unpack(&extract_path)?;

    let inner_path = extract_path.join(folder_name);
    let zst_path = inner_path.join("system.dic.zst");
    if !zst_path.exists() {
        return Err(HikkiError::Custom(format!(
            "ZST file not found at {:?} after extraction.",
            zst_path
        )));
    }

    debug!("Decoding {:?}", zst_path);
    let zst_file = File::open(&zst_path)?;
    let dic_file = File::create(&final_dic_path)?;
    copy_decode(BufReader::new(zst_file), BufWriter::new(dic_file))?;

    let mut keep_files = vec!["system.dic"];
    for license in dict_type.license_files() {
        if inner_path.join(license).exists() {
            fs::rename(inner_path.join(license), extract_path.join(license))?;
            keep_files.push(license);
        }
    }

    cleanup_files(&extract_path, &keep_files)?;
    fs::remove_file(&download_path)?;
    fs::remove_file(&tar_path)?;
    info!("Tokenizer model ready at {:?}", final_dic_path);

    Ok(final_dic_path)
}

pub fn load_dictionary(path: &Path) -> Result<Dictionary, HikkiError> {
    let reader = BufReader::new(File::open(path)?);
    let dict = Dictionary::read(reader)?;
    Ok(dict)
}
