use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::capabilities::ValidatedUrl;
use crate::error::ConfigError;
use crate::{DEFAULT_ENDPOINT, PAGE_SIZE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    endpoint: String,
    page_size: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            page_size: PAGE_SIZE,
        }
    }
}

/// Shell-supplied overrides; unset fields keep their current value.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub page_size: Option<usize>,
}

impl AppConfig {
    pub fn new(endpoint: &str, page_size: usize) -> Result<Self, ConfigError> {
        if page_size == 0 {
            return Err(ConfigError::ZeroPageSize);
        }
        let endpoint = ValidatedUrl::new(endpoint)?;
        Ok(Self {
            endpoint: endpoint.as_str().to_string(),
            page_size,
        })
    }

    /// Applies overrides all-or-nothing. On error the current config is kept.
    pub fn apply(&mut self, overrides: &ConfigOverrides) -> Result<(), ConfigError> {
        let endpoint = overrides.endpoint.as_deref().unwrap_or(&self.endpoint);
        let page_size = overrides.page_size.unwrap_or(self.page_size);
        match Self::new(endpoint, page_size) {
            Ok(next) => {
                info!(endpoint = %next.endpoint, page_size = next.page_size, "config updated");
                *self = next;
                Ok(())
            }
            Err(e) => {
                warn!(code = e.kind().code(), error = %e, "rejected config override");
                Err(e)
            }
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    #[must_use]
    pub fn page_size(&self) -> usize {
        self.page_size
    }
}
