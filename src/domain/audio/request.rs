use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Synthesis API rejects inputs longer than this many bytes
pub const MAX_TEXT_BYTES: usize = 5000;

/// Firestore document id limit
pub const MAX_ITEM_ID_BYTES: usize = 1500;

pub const ATTR_LANGUAGE_CODE: &str = "languageCode";
pub const ATTR_DESCRIPTION_TEXT: &str = "descriptionText";
pub const ATTR_ITEM_ID: &str = "itemId";
pub const ATTR_LOCATION_ID: &str = "locationId";

static LANGUAGE_CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("valid regex"));

static BUCKET_NAME_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9._-]{1,61}[a-z0-9]$").expect("valid regex"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttributeError {
    #[error("missing attribute '{0}'")]
    Missing(&'static str),
    #[error("invalid languageCode '{0}'")]
    InvalidLanguageCode(String),
    #[error("invalid itemId {item_id:?}: {reason}")]
    InvalidItemId {
        item_id: String,
        reason: &'static str,
    },
    #[error("invalid locationId '{0}': not a valid bucket name")]
    InvalidLocationId(String),
    #[error("descriptionText is {0} bytes, limit is {MAX_TEXT_BYTES}")]
    TextTooLong(usize),
}

/// One validated text-to-speech job, built from event attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynthesisRequest {
    pub language_code: String,
    pub description_text: String,
    pub item_id: String,
    pub location_id: String,
}

impl SynthesisRequest {
    /// Strict parse of Pub/Sub message attributes. Any missing or malformed
    /// field rejects the whole event.
    pub fn from_attributes(attributes: &HashMap<String, String>) -> Result<Self, AttributeError> {
        // Values are kept byte-exact; whitespace only decides blankness
        let field = |name: &'static str| -> Result<String, AttributeError> {
            attributes
                .get(name)
                .filter(|v| !v.trim().is_empty())
                .cloned()
                .ok_or(AttributeError::Missing(name))
        };

        let language_code = field(ATTR_LANGUAGE_CODE)?;
        let description_text = field(ATTR_DESCRIPTION_TEXT)?;
        let item_id = field(ATTR_ITEM_ID)?;
        let location_id = field(ATTR_LOCATION_ID)?;

        if !LANGUAGE_CODE_PATTERN.is_match(&language_code) {
            return Err(AttributeError::InvalidLanguageCode(language_code));
        }
        if let Err(reason) = check_item_id(&item_id) {
            return Err(AttributeError::InvalidItemId { item_id, reason });
        }
        if !BUCKET_NAME_PATTERN.is_match(&location_id) {
            return Err(AttributeError::InvalidLocationId(location_id));
        }
        if description_text.len() > MAX_TEXT_BYTES {
            return Err(AttributeError::TextTooLong(description_text.len()));
        }

        Ok(Self {
            language_code,
            description_text,
            item_id,
            location_id,
        })
    }

    pub fn storage_path(&self) -> StoragePath {
        StoragePath::new(&self.language_code, &self.item_id)
    }

    /// Value stored in `multimedia.itemDescriptionAudioPath`
    pub fn record_audio_path(&self) -> String {
        format!("{}/{}", self.location_id, self.storage_path())
    }
}

/// Document id rules, plus what a scratch file name and object name need
fn check_item_id(item_id: &str) -> Result<(), &'static str> {
    if item_id.len() > MAX_ITEM_ID_BYTES {
        return Err("longer than 1500 bytes");
    }
    if item_id.trim() != item_id {
        return Err("surrounding whitespace");
    }
    if item_id.contains('/') {
        return Err("must not contain '/'");
    }
    if item_id.chars().any(char::is_control) {
        return Err("must not contain control characters");
    }
    if item_id == "." || item_id == ".." {
        return Err("reserved document id");
    }
    if item_id.len() >= 4 && item_id.starts_with("__") && item_id.ends_with("__") {
        return Err("reserved document id");
    }
    Ok(())
}

/// Object name of an item's description audio inside its location bucket:
/// `items/<languageCode>/audio/<itemId>.mp3`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn new(language_code: &str, item_id: &str) -> Self {
        Self(format!("items/{}/audio/{}.mp3", language_code, item_id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
