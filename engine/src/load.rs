use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::LoadError;

/// Read a text file, honouring a UTF-8/UTF-16 byte-order mark when present.
pub fn read_text_auto(path: &Path) -> Result<String, LoadError> {
    let bytes =
        fs::read(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    if let Some((enc, bom_len)) = Encoding::for_bom(&bytes) {
        let (cow, _, _) = enc.decode(&bytes[bom_len..]);
        Ok(cow.into_owned())
    } else {
        String::from_utf8(bytes).map_err(|_| LoadError::Encoding { path: path.to_path_buf() })
    }
}

pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = read_text_auto(path)?;
    serde_json::from_str(&text)
        .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })
}

pub fn read_yaml<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    let text = read_text_auto(path)?;
    serde_yaml::from_str(&text)
        .map_err(|source| LoadError::Yaml { path: path.to_path_buf(), source })
}

/// YAML for `.yaml`/`.yml`, JSON for anything else.
pub fn read_structured<T: DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            read_yaml(path)
        }
        _ => read_json(path),
    }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<(), LoadError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;
    fs::write(path, text).map_err(|source| LoadError::Write { path: path.to_path_buf(), source })
}
