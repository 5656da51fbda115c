use crate::error::ConfigError;
use crate::tokenizer::QUOTE;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Character separating the verb and fields of a line
    pub delimiter: char,
    /// Keep a whitespace-only trailing token instead of dropping it
    pub preserve_blank: bool,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            delimiter: ' ',
            preserve_blank: false,
        }
    }
}

impl DecoderConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_preserve_blank(mut self, preserve_blank: bool) -> Self {
        self.preserve_blank = preserve_blank;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let reason = match self.delimiter {
            QUOTE => Some("the quote character groups tokens"),
            ':' => Some("the colon separates field prefixes"),
            '=' => Some("the equals sign separates keys from values"),
            c if c.is_control() => Some("control characters cannot delimit fields"),
            _ => None,
        };

        match reason {
            Some(reason) => Err(ConfigError::InvalidDelimiter {
                delimiter: self.delimiter,
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }
}
