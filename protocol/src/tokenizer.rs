//! Quote-aware line splitting
//!
//! Lines are split on a single delimiter character, except inside double-quoted
//! spans. Quotes open and close a span; they never escape anything. A quote that
//! directly follows a closing quote reopens the span and is kept as content, so
//! `"a""b"` reads as `a"b`.

/// The quote character that groups delimiters into a single token
pub const QUOTE: char = '"';

/// Split `line` on `delimiter`, keeping double-quoted spans intact.
///
/// * `preserve_quotes` keeps the quote characters in the emitted tokens.
/// * `preserve_blank` keeps a trailing token that is only whitespace.
///
/// Empty tokens produced by consecutive delimiters are always dropped.
/// An unbalanced quote quotes the rest of the line.
pub fn split_quoted(
    line: &str,
    delimiter: char,
    preserve_quotes: bool,
    preserve_blank: bool,
) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    let mut prev_was_quote = false;

    for ch in line.chars() {
        let mut append = true;
        if ch == QUOTE {
            if quoted {
                quoted = false;
                append = preserve_quotes;
            } else if prev_was_quote {
                // reopened right after a close: the quote itself is content
                quoted = true;
            } else {
                quoted = true;
                append = preserve_quotes;
            }
        }

        if !quoted && ch == delimiter {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
        } else if append {
            current.push(ch);
        }

        prev_was_quote = ch == QUOTE;
    }

    if !current.is_empty() && (preserve_blank || !current.trim().is_empty()) {
        tokens.push(current);
    }

    tokens
}

/// Wrap `value` in quotes if it would not survive [`split_quoted`] as a single
/// token. Embedded quotes are doubled.
pub fn quote_if_needed(value: &str, delimiter: char) -> String {
    if !value.contains(delimiter) && !value.contains(QUOTE) {
        return value.to_string();
    }

    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push(QUOTE);
    for ch in value.chars() {
        if ch == QUOTE {
            quoted.push(QUOTE);
        }
        quoted.push(ch);
    }
    quoted.push(QUOTE);
    quoted
}
