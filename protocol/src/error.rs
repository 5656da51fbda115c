use thiserror::Error;

/// Reasons a line could not be decoded into a typed command.
///
/// None of these escape [`CommandDecoder::decode`](crate::CommandDecoder::decode);
/// they are turned into a pass-through command there.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// A token without a colon that is not an accepted bare flag
    #[error("Malformed field: {field}")]
    MalformedField { field: String },

    #[error("Invalid timestamp '{value}': {reason}")]
    InvalidTimestamp { value: String, reason: String },

    #[error("Invalid number: {value}")]
    InvalidNumber { value: String },

    #[error("Unknown {kind} value: {value}")]
    UnknownEnumValue { kind: &'static str, value: String },

    /// The leading token names no known verb
    #[error("Unknown command verb: {verb}")]
    UnknownVerb { verb: String },

    #[error("Decode fault: {message}")]
    Fault { message: String },
}

pub type DecodeResult<T> = Result<T, DecodeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid delimiter {delimiter:?}: {reason}")]
    InvalidDelimiter { delimiter: char, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = DecodeError::MalformedField {
            field: "oops".to_string(),
        };
        assert_eq!(err.to_string(), "Malformed field: oops");

        let err = DecodeError::UnknownEnumValue {
            kind: "data type",
            value: "BYTE".to_string(),
        };
        assert_eq!(err.to_string(), "Unknown data type value: BYTE");

        let err = ConfigError::InvalidDelimiter {
            delimiter: '"',
            reason: "quote is reserved".to_string(),
        };
        assert!(err.to_string().contains("quote is reserved"));
    }
}
