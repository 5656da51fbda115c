//! Decoded command types
//!
//! Each variant of [`Command`] corresponds to one line of the protocol. Commands
//! are plain immutable values; [`Command::compose`] renders them back to
//! protocol text for display or forwarding.

use crate::fields::Verb;
use crate::tokenizer::quote_if_needed;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Delimiter used when composing commands back to text
const DELIMITER: char = ' ';

/// A single series observation.
///
/// Text-only points carry `NaN` as their numeric value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub numeric_value: f64,
    pub text_value: Option<String>,
    /// Set for `x:` points, which stay text even when the value is missing
    #[serde(skip)]
    text_point: bool,
}

impl Sample {
    pub fn numeric(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            numeric_value: value,
            text_value: None,
            text_point: false,
        }
    }

    pub fn text(timestamp: i64, value: Option<String>) -> Self {
        Self {
            timestamp,
            numeric_value: f64::NAN,
            text_value: value,
            text_point: true,
        }
    }

    pub fn is_text(&self) -> bool {
        self.numeric_value.is_nan() && self.text_value.is_some()
    }
}

/// A line passed through verbatim
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SimpleCommand {
    pub raw: String,
}

/// One series point for one metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsertCommand {
    pub entity: String,
    pub metric: String,
    pub sample: Sample,
    pub tags: BTreeMap<String, String>,
}

/// Several metrics sharing one timestamp
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MultipleInsertCommand {
    pub entity: String,
    pub timestamp: i64,
    pub tags: BTreeMap<String, String>,
    pub numeric_values: BTreeMap<String, f64>,
    pub text_values: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageInsertCommand {
    pub entity: String,
    pub timestamp: i64,
    pub tags: BTreeMap<String, String>,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PropertyInsertCommand {
    pub entity: String,
    pub property_type: String,
    pub timestamp: i64,
    pub key_fields: BTreeMap<String, String>,
    pub value_fields: BTreeMap<String, String>,
}

/// Result of decoding one protocol line
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    Simple(SimpleCommand),
    Insert(InsertCommand),
    MultipleInsert(MultipleInsertCommand),
    MessageInsert(MessageInsertCommand),
    PropertyInsert(PropertyInsertCommand),
}

impl Command {
    pub fn simple(raw: impl Into<String>) -> Self {
        Command::Simple(SimpleCommand { raw: raw.into() })
    }

    /// The verb this command renders under, or `None` for pass-through lines
    pub fn verb(&self) -> Option<Verb> {
        match self {
            Command::Simple(_) => None,
            Command::Insert(_) | Command::MultipleInsert(_) => Some(Verb::Series),
            Command::MessageInsert(_) => Some(Verb::Message),
            Command::PropertyInsert(_) => Some(Verb::Property),
        }
    }

    pub fn is_pass_through(&self) -> bool {
        matches!(self, Command::Simple(_))
    }

    pub fn entity(&self) -> Option<&str> {
        match self {
            Command::Simple(_) => None,
            Command::Insert(c) => Some(&c.entity),
            Command::MultipleInsert(c) => Some(&c.entity),
            Command::MessageInsert(c) => Some(&c.entity),
            Command::PropertyInsert(c) => Some(&c.entity),
        }
    }

    /// Render the command as a protocol line.
    ///
    /// Pass-through commands return their raw text unchanged.
    pub fn compose(&self) -> String {
        match self {
            Command::Simple(c) => c.raw.clone(),
            Command::Insert(c) => {
                let mut line = LineWriter::new(Verb::Series);
                line.field("e", &c.entity);
                line.field("ms", &c.sample.timestamp.to_string());
                line.pairs("t", &c.tags);
                match &c.sample.text_value {
                    Some(text) => line.field("x", &format!("{}={}", c.metric, text)),
                    None if c.sample.text_point => line.field("x", &c.metric),
                    None => line.field(
                        "m",
                        &format!("{}={}", c.metric, format_number(c.sample.numeric_value)),
                    ),
                }
                line.finish()
            }
            Command::MultipleInsert(c) => {
                let mut line = LineWriter::new(Verb::Series);
                line.field("e", &c.entity);
                line.field("ms", &c.timestamp.to_string());
                line.pairs("t", &c.tags);
                for (metric, value) in &c.numeric_values {
                    line.field("m", &format!("{}={}", metric, format_number(*value)));
                }
                line.pairs("x", &c.text_values);
                line.finish()
            }
            Command::MessageInsert(c) => {
                let mut line = LineWriter::new(Verb::Message);
                line.field("e", &c.entity);
                line.field("ms", &c.timestamp.to_string());
                line.pairs("t", &c.tags);
                line.field("m", &c.text);
                line.finish()
            }
            Command::PropertyInsert(c) => {
                let mut line = LineWriter::new(Verb::Property);
                line.field("e", &c.entity);
                line.field("t", &c.property_type);
                line.field("ms", &c.timestamp.to_string());
                line.pairs("k", &c.key_fields);
                line.pairs("v", &c.value_fields);
                line.finish()
            }
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.compose())
    }
}

fn format_number(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else {
        value.to_string()
    }
}

struct LineWriter {
    line: String,
}

impl LineWriter {
    fn new(verb: Verb) -> Self {
        Self {
            line: verb.as_str().to_string(),
        }
    }

    fn field(&mut self, prefix: &str, value: &str) {
        self.line.push(DELIMITER);
        self.line.push_str(prefix);
        self.line.push(':');
        self.line.push_str(&quote_if_needed(value, DELIMITER));
    }

    fn pairs(&mut self, prefix: &str, pairs: &BTreeMap<String, String>) {
        for (key, value) in pairs {
            self.field(prefix, &format!("{}={}", key, value));
        }
    }

    fn finish(self) -> String {
        self.line
    }
}
