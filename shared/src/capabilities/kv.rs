use crux_kv::KeyValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::event::Event;
use crate::session::{Session, SessionKey};

pub type KvCapability = KeyValue<Event>;

pub const MAX_VALUE_SIZE: usize = 64 * 1024;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum KvError {
    #[error("storage error: {message}")]
    Storage { message: String },

    #[error("value for '{key}' is not valid UTF-8")]
    InvalidUtf8 { key: String },

    #[error("value too large: {size} bytes exceeds maximum of {max} bytes")]
    ValueTooLarge { size: usize, max: usize },
}

impl KvError {
    fn storage(e: impl std::fmt::Display) -> Self {
        Self::Storage {
            message: e.to_string(),
        }
    }
}

fn decode_value(key: SessionKey, bytes: Option<Vec<u8>>) -> Result<Option<String>, KvError> {
    match bytes {
        None => Ok(None),
        Some(bytes) if bytes.len() > MAX_VALUE_SIZE => Err(KvError::ValueTooLarge {
            size: bytes.len(),
            max: MAX_VALUE_SIZE,
        }),
        Some(bytes) => String::from_utf8(bytes).map(Some).map_err(|_| KvError::InvalidUtf8 {
            key: key.name().to_string(),
        }),
    }
}

/// One `get` per session key.
pub fn load_session(kv: &KvCapability, keys: [SessionKey; 3]) {
    for key in keys {
        debug!(key = key.name(), "reading session value");
        kv.get(key.name().to_string(), move |result| Event::SessionValueLoaded {
            key,
            result: result
                .map_err(KvError::storage)
                .and_then(|bytes| decode_value(key, bytes)),
        });
    }
}

/// Writes every value the session currently holds.
pub fn store_session(kv: &KvCapability, session: &Session) {
    for (key, value) in session.entries() {
        if value.len() > MAX_VALUE_SIZE {
            warn!(key = key.name(), size = value.len(), "session value too large, not persisted");
            continue;
        }
        kv.set(
            key.name().to_string(),
            value.as_bytes().to_vec(),
            move |result| Event::SessionValueStored {
                key,
                result: result.map(|_| ()).map_err(KvError::storage),
            },
        );
    }
}

pub fn clear_session(kv: &KvCapability, keys: [SessionKey; 3]) {
    for key in keys {
        kv.delete(key.name().to_string(), move |result| Event::SessionValueDeleted {
            key,
            result: result.map(|_| ()).map_err(KvError::storage),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_value_is_none() {
        assert_eq!(decode_value(SessionKey::AccessToken, None), Ok(None));
    }

    #[test]
    fn utf8_value_decodes() {
        assert_eq!(
            decode_value(SessionKey::UserEmail, Some(b"a@b.c".to_vec())),
            Ok(Some("a@b.c".to_string()))
        );
    }

    #[test]
    fn invalid_utf8_is_reported_with_key() {
        assert_eq!(
            decode_value(SessionKey::AccessToken, Some(vec![0xff, 0xfe])),
            Err(KvError::InvalidUtf8 {
                key: "access_token".into()
            })
        );
    }

    #[test]
    fn oversized_value_is_rejected() {
        let result = decode_value(SessionKey::RefreshToken, Some(vec![b'a'; MAX_VALUE_SIZE + 1]));
        assert!(matches!(result, Err(KvError::ValueTooLarge { .. })));
    }
}
