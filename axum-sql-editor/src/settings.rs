//! Editor settings
//!
//! Built once at start-up and shared read-only with every handler.

use serde::{Deserialize, Serialize};

use crate::Error;

/// Default rows per list page
pub const DEFAULT_PAGE_SIZE: u64 = 30;

/// Default characters shown per value in list views
pub const DEFAULT_TRUNCATION_LENGTH: usize = 32;

/// Process-wide editor settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EditorSettings {
    /// Rows per list page
    pub page_size: u64,

    /// Maximum characters shown per value in list views
    pub truncation_length: usize,

    /// Markup flavour produced by the templates
    pub output_format: OutputFormat,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            truncation_length: DEFAULT_TRUNCATION_LENGTH,
            output_format: OutputFormat::default(),
        }
    }
}

impl EditorSettings {
    /// Check values that would make the views meaningless
    pub fn validate(&self) -> crate::Result<()> {
        if self.page_size == 0 {
            return Err(Error::Settings("page_size must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Output-format hint for the templating layer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Html5,
    Xhtml,
}

impl OutputFormat {
    pub fn is_xhtml(&self) -> bool {
        matches!(self, OutputFormat::Xhtml)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = EditorSettings::default();
        assert_eq!(settings.page_size, 30);
        assert_eq!(settings.truncation_length, 32);
        assert_eq!(settings.output_format, OutputFormat::Html5);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_zero_page_size_is_rejected() {
        let settings = EditorSettings {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Settings(_))));
    }

    #[test]
    fn test_partial_deserialize_uses_defaults() {
        let settings: EditorSettings =
            serde_json::from_str(r#"{"page_size": 10, "output_format": "xhtml"}"#).unwrap();
        assert_eq!(settings.page_size, 10);
        assert_eq!(settings.truncation_length, DEFAULT_TRUNCATION_LENGTH);
        assert!(settings.output_format.is_xhtml());
    }
}
