use unicode_normalization::UnicodeNormalization;

use crate::date::NameStyle;
use crate::error::DescriptionError;

/// Characters that tend to break file names or shell quoting.
const RESERVED: &[char] = &['/', ':', '\'', '"'];

/// Suffix appended to every generated name of a run, including its leading
/// separator (`" beach"` / `"_beach"`), or empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Description(String);

impl Description {
    /// Validate a user-supplied description once for the whole run.
    pub fn parse(raw: &str, style: NameStyle) -> Result<Self, DescriptionError> {
        let text: String = raw.trim().nfc().collect();
        if text.is_empty() {
            return Ok(Self::default());
        }

        match style {
            NameStyle::Strict => {
                let unreserved = text
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_' | '~'));
                if !unreserved {
                    return Err(DescriptionError::Strict(text));
                }
            }
            NameStyle::Standard => {
                if text.chars().any(|c| RESERVED.contains(&c) || c.is_control()) {
                    return Err(DescriptionError::Reserved(text));
                }
            }
        }

        Ok(Self(format!("{}{}", style.separator(), text)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
