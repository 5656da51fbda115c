//! Grouping of `prefix:value` tokens into a multi-valued map

use crate::error::{DecodeError, DecodeResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The leading token of a line, selecting the grammar for the rest of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verb {
    Series,
    Property,
    Message,
    Metric,
    Entity,
}

impl Verb {
    pub const ALL: [Verb; 5] = [
        Verb::Series,
        Verb::Property,
        Verb::Message,
        Verb::Metric,
        Verb::Entity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Series => "series",
            Verb::Property => "property",
            Verb::Message => "message",
            Verb::Metric => "metric",
            Verb::Entity => "entity",
        }
    }

    /// Whether a token without a colon is accepted as an empty-valued flag
    fn accepts_bare_flag(&self, prefix: &str) -> bool {
        match self {
            Verb::Message => prefix == "m",
            Verb::Entity | Verb::Metric => prefix == "l",
            Verb::Series | Verb::Property => false,
        }
    }
}

impl FromStr for Verb {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Verb::ALL
            .into_iter()
            .find(|verb| verb.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownVerb {
                verb: s.to_string(),
            })
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field values keyed by prefix, in first-seen prefix order.
///
/// Values under one prefix keep their insertion order, so single-valued
/// fields read the first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, Vec<String>)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, prefix: impl Into<String>, value: impl Into<String>) {
        let prefix = prefix.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(p, _)| *p == prefix) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((prefix, vec![value])),
        }
    }

    pub fn get(&self, prefix: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, values)| values.as_slice())
    }

    pub fn first(&self, prefix: &str) -> Option<&str> {
        self.get(prefix)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    pub fn contains(&self, prefix: &str) -> bool {
        self.get(prefix).is_some()
    }

    /// Number of values recorded under `prefix`
    pub fn count(&self, prefix: &str) -> usize {
        self.get(prefix).map_or(0, <[String]>::len)
    }

    pub fn prefixes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(p, _)| p.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Group the tokens of a line under `verb` into a [`FieldMap`].
///
/// Every token textually equal to the verb is skipped, wherever it appears.
/// The remaining tokens are split at their first colon, so values may contain
/// colons themselves.
pub fn group_fields<S: AsRef<str>>(verb: Verb, tokens: &[S]) -> DecodeResult<FieldMap> {
    let mut fields = FieldMap::new();

    for token in tokens {
        let token: &str = token.as_ref();
        if token == verb.as_str() {
            continue;
        }

        match token.split_once(':') {
            Some(("", _)) => {
                return Err(DecodeError::MalformedField {
                    field: token.to_string(),
                });
            }
            Some((prefix, value)) => fields.add(prefix, value),
            None if verb.accepts_bare_flag(token) => fields.add(token, ""),
            None => {
                return Err(DecodeError::MalformedField {
                    field: token.to_string(),
                });
            }
        }
    }

    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verb_round_trip() {
        for verb in Verb::ALL {
            assert_eq!(verb.as_str().parse::<Verb>().unwrap(), verb);
        }
        assert!("Series".parse::<Verb>().is_err());
        assert!("insert".parse::<Verb>().is_err());
    }

    #[test]
    fn test_field_map_keeps_insertion_order() {
        let mut fields = FieldMap::new();
        fields.add("m", "cpu=1");
        fields.add("e", "s1");
        fields.add("m", "mem=2");

        assert_eq!(fields.prefixes().collect::<Vec<_>>(), vec!["m", "e"]);
        assert_eq!(fields.get("m").unwrap(), ["cpu=1", "mem=2"]);
        assert_eq!(fields.first("m"), Some("cpu=1"));
        assert_eq!(fields.count("m"), 2);
        assert_eq!(fields.count("x"), 0);
        assert!(!fields.contains("x"));
    }

    #[test]
    fn test_group_splits_on_first_colon() {
        let tokens = ["series", "e:s1", "d:2020-01-01T00:00:00.000Z", "t:url=http://a"];
        let fields = group_fields(Verb::Series, &tokens).unwrap();

        assert_eq!(fields.first("e"), Some("s1"));
        assert_eq!(fields.first("d"), Some("2020-01-01T00:00:00.000Z"));
        assert_eq!(fields.first("t"), Some("url=http://a"));
        assert!(!fields.contains("series"));
    }

    #[test]
    fn test_verb_token_is_dropped_anywhere() {
        let tokens = ["message", "e:s1", "message", "m:hi"];
        let fields = group_fields(Verb::Message, &tokens).unwrap();
        assert_eq!(fields.prefixes().collect::<Vec<_>>(), vec!["e", "m"]);
        assert_eq!(fields.count("m"), 1);
    }

    #[test]
    fn test_bare_flags() {
        let fields = group_fields(Verb::Message, &["message", "e:s1", "m"]).unwrap();
        assert_eq!(fields.first("m"), Some(""));

        let fields = group_fields(Verb::Entity, &["entity", "e:s1", "l"]).unwrap();
        assert_eq!(fields.first("l"), Some(""));

        let fields = group_fields(Verb::Metric, &["metric", "l"]).unwrap();
        assert_eq!(fields.first("l"), Some(""));
    }

    #[test]
    fn test_unexpected_bare_token_is_malformed() {
        let err = group_fields(Verb::Series, &["series", "e:s1", "m"]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::MalformedField {
                field: "m".to_string()
            }
        );

        assert!(group_fields(Verb::Message, &["message", "l"]).is_err());
        assert!(group_fields(Verb::Entity, &["entity", "m"]).is_err());
    }

    #[test]
    fn test_empty_prefix_is_malformed() {
        assert!(group_fields(Verb::Series, &["series", ":s1"]).is_err());
    }

    #[test]
    fn test_empty_value_after_colon() {
        let fields = group_fields(Verb::Property, &["property", "e:"]).unwrap();
        assert_eq!(fields.first("e"), Some(""));
    }
}
