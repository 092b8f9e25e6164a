//! Party persistence as pretty-printed JSON.

use std::path::Path;

use tracing::{info, warn};

use crate::character::Character;
use crate::error::LoadError;
use crate::load::{read_json, write_json};

pub fn save_party(path: &Path, party: &[Character]) -> Result<(), LoadError> {
    write_json(path, party)?;
    info!(path = %path.display(), members = party.len(), "party saved");
    Ok(())
}

pub fn load_party(path: &Path) -> Result<Vec<Character>, LoadError> {
    read_json(path)
}

/// Saved party when readable, otherwise the built-in one.
pub fn load_party_or_default(path: &Path) -> Vec<Character> {
    load_party(path).unwrap_or_else(|err| {
        warn!(%err, "falling back to the default party");
        crate::content::default_party()
    })
}

pub fn save_character(path: &Path, character: &Character) -> Result<(), LoadError> {
    write_json(path, character)
}

pub fn load_character(path: &Path) -> Result<Character, LoadError> {
    read_json(path)
}
