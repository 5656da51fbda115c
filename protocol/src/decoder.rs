//! Line decoding
//!
//! [`CommandDecoder::decode`] is the only entry point callers need. It runs the
//! pipeline for one line:
//! 1. Tokenize the line and read the verb from the first token
//! 2. Route to the builder for that verb
//! 3. Build a typed command from the grouped fields
//! 4. On any failure, fall back to a pass-through command
//!
//! Decoding never fails outwardly; every line yields exactly one [`Command`].

use crate::command::{
    Command, InsertCommand, MessageInsertCommand, MultipleInsertCommand, PropertyInsertCommand,
    Sample,
};
use crate::config::DecoderConfig;
use crate::error::{ConfigError, DecodeError, DecodeResult};
use crate::fields::{group_fields, FieldMap, Verb};
use crate::resolve::{resolve_entity, resolve_key_values, resolve_number, resolve_time};
use crate::tokenizer::split_quoted;
use std::borrow::Cow;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

/// Stateless decoder for protocol lines.
///
/// Holds only its configuration, so one value can be shared by reference
/// across threads.
#[derive(Debug, Clone, Default)]
pub struct CommandDecoder {
    config: DecoderConfig,
}

impl CommandDecoder {
    pub fn new(config: DecoderConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Split a line into tokens the way [`decode`](Self::decode) sees them
    pub fn tokenize(&self, line: &str) -> Vec<String> {
        split_quoted(
            line,
            self.config.delimiter,
            false,
            self.config.preserve_blank,
        )
    }

    /// Decode one line, falling back to a pass-through command on any failure.
    pub fn decode(&self, line: &str) -> Command {
        match self.try_decode(line) {
            Ok(command) => {
                debug!("Decoded {:?} command from: {}", command.verb(), line);
                command
            }
            Err(DecodeError::UnknownVerb { verb }) => {
                warn!("Unknown command verb '{}': {}", verb, line);
                Command::simple(line)
            }
            Err(e) => {
                error!("Could not parse command: {}: {}", line, e);
                Command::simple(line)
            }
        }
    }

    /// Decode a raw transport payload.
    ///
    /// An absent payload yields no command. Invalid UTF-8 is replaced rather
    /// than rejected.
    pub fn decode_payload(&self, payload: Option<&[u8]>) -> Option<Command> {
        let payload = payload?;
        let line = String::from_utf8_lossy(payload);
        if let Cow::Owned(_) = line {
            warn!("Payload is not valid UTF-8, decoding with replacements");
        }
        Some(self.decode(&line))
    }

    /// Decode one line, reporting why it could not be turned into a typed command.
    ///
    /// `metric` and `entity` lines are returned as pass-through commands
    /// without being inspected further.
    pub fn try_decode(&self, line: &str) -> DecodeResult<Command> {
        let tokens = self.tokenize(line);
        let verb: Verb = tokens
            .first()
            .ok_or_else(|| DecodeError::Fault {
                message: "empty line".to_string(),
            })?
            .parse()?;

        match verb {
            Verb::Series => self.build_series(&tokens),
            Verb::Property => self.build_property(&tokens),
            Verb::Message => self.build_message(&tokens),
            Verb::Metric | Verb::Entity => Ok(Command::simple(line)),
        }
    }

    fn build_series(&self, tokens: &[String]) -> DecodeResult<Command> {
        let fields = group_fields(Verb::Series, tokens)?;

        let numeric = fields.get("m").unwrap_or_default();
        let text = fields.get("x").unwrap_or_default();

        match (numeric, text) {
            ([entry], []) => self.single_series(&fields, entry, true),
            ([], [entry]) => self.single_series(&fields, entry, false),
            _ => self.multiple_series(&fields, numeric, text),
        }
    }

    fn single_series(&self, fields: &FieldMap, entry: &str, numeric: bool) -> DecodeResult<Command> {
        let (metric, sample_value) = match entry.split_once('=') {
            Some((metric, value)) => (metric, Some(value)),
            None => {
                warn!("Illegal metric name and value: {}", entry);
                (entry, None)
            }
        };

        let entity = resolve_entity(fields);
        let timestamp = resolve_time(fields)?;
        let sample = if numeric {
            let value = sample_value.ok_or_else(|| DecodeError::InvalidNumber {
                value: entry.to_string(),
            })?;
            Sample::numeric(timestamp, resolve_number(value)?)
        } else {
            Sample::text(timestamp, sample_value.map(str::to_string))
        };

        Ok(Command::Insert(InsertCommand {
            entity,
            metric: metric.to_string(),
            sample,
            tags: resolve_key_values(fields, "t"),
        }))
    }

    fn multiple_series(
        &self,
        fields: &FieldMap,
        numeric: &[String],
        text: &[String],
    ) -> DecodeResult<Command> {
        let mut numeric_values = BTreeMap::new();
        for (metric, value) in metric_entries(numeric) {
            numeric_values.insert(metric.to_string(), resolve_number(value)?);
        }

        let text_values = metric_entries(text)
            .map(|(metric, value)| (metric.to_string(), value.to_string()))
            .collect();

        Ok(Command::MultipleInsert(MultipleInsertCommand {
            entity: resolve_entity(fields),
            timestamp: resolve_time(fields)?,
            tags: resolve_key_values(fields, "t"),
            numeric_values,
            text_values,
        }))
    }

    fn build_property(&self, tokens: &[String]) -> DecodeResult<Command> {
        let fields = group_fields(Verb::Property, tokens)?;

        Ok(Command::PropertyInsert(PropertyInsertCommand {
            entity: resolve_entity(&fields),
            property_type: fields.first("t").unwrap_or_default().to_string(),
            timestamp: resolve_time(&fields)?,
            key_fields: resolve_key_values(&fields, "k"),
            value_fields: resolve_key_values(&fields, "v"),
        }))
    }

    fn build_message(&self, tokens: &[String]) -> DecodeResult<Command> {
        let fields = group_fields(Verb::Message, tokens)?;

        Ok(Command::MessageInsert(MessageInsertCommand {
            entity: resolve_entity(&fields),
            timestamp: resolve_time(&fields)?,
            tags: resolve_key_values(&fields, "t"),
            text: fields.first("m").unwrap_or_default().to_string(),
        }))
    }
}

/// `metric=value` pairs from repeated series entries.
///
/// An entry that is not exactly one name and one value around a single `=`
/// is skipped, so one bad point does not cost the others.
fn metric_entries(entries: &[String]) -> impl Iterator<Item = (&str, &str)> {
    entries.iter().filter_map(|entry| match entry.split_once('=') {
        Some((metric, value)) if !value.contains('=') => Some((metric, value)),
        _ => {
            warn!("Illegal metric name and value: {}", entry);
            None
        }
    })
}
