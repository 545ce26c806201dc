// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Patch manifest parsing.
//!
//! A manifest names an instrument and lists its samples. Two layouts are
//! accepted for the sample list:
//!
//! ```text
//! { "name": "Piano",
//!   "samples": { "A0": { "velocity_min": 1, "velocity_max": 127, "path": "a0.wav" } } }
//!
//! { "name": "Piano",
//!   "samples": [ { "note": "A0", "velocity_min": 1, "velocity_max": 0x7f, "path": "a0.wav" } ] }
//! ```
//!
//! Velocities may be numbers or strings, decimal or `0x` hexadecimal.

use pest::iterators::{Pair, Pairs};
use pest::Parser;
use pest_derive::Parser;

mod error;

pub use error::ManifestError;

/// Longest instrument name or sample path accepted, in bytes.
pub const MAX_TEXT_LEN: usize = 100;

/// Highest MIDI velocity.
const MAX_VELOCITY: u32 = 127;

const NAME_KEY: &str = "name";
const SAMPLES_KEY: &str = "samples";
const NOTE_KEY: &str = "note";
const VELOCITY_MIN_KEY: &str = "velocity_min";
const VELOCITY_MAX_KEY: &str = "velocity_max";
const PATH_KEY: &str = "path";

#[derive(Parser)]
#[grammar = "src/manifest/grammar.pest"]
struct ManifestParser;

/// One entry of the sample list, before note resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleEntry {
    /// The note token, e.g. `C1#`.
    pub note: String,
    pub velocity_min: u8,
    pub velocity_max: u8,
    /// Sample path relative to the manifest directory. Entries without a path
    /// still create their voice layer, which then has no sample.
    pub path: Option<String>,
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    pub name: Option<String>,
    pub samples: Vec<SampleEntry>,
}

/// The token tree produced by the grammar.
#[derive(Debug)]
enum Token {
    Object(Vec<(String, Token)>),
    Array(Vec<Token>),
    String(String),
    Primitive(String),
}

impl Token {
    fn kind(&self) -> &'static str {
        match self {
            Token::Object(_) => "object",
            Token::Array(_) => "array",
            Token::String(_) => "string",
            Token::Primitive(_) => "primitive",
        }
    }

    fn member(&self, key: &str) -> Option<&Token> {
        match self {
            Token::Object(members) => members.iter().find(|(k, _)| k == key).map(|(_, v)| v),
            _ => None,
        }
    }
}

impl Manifest {
    /// Parses manifest bytes, which must be UTF-8.
    pub fn from_bytes(bytes: &[u8], max_tokens: usize) -> Result<Manifest, ManifestError> {
        let text = std::str::from_utf8(bytes).map_err(|_| ManifestError::Encoding)?;
        Manifest::parse(text, max_tokens)
    }

    /// Parses manifest text. Fails if the text holds more than `max_tokens`
    /// tokens (objects, arrays, strings, keys and primitives).
    pub fn parse(text: &str, max_tokens: usize) -> Result<Manifest, ManifestError> {
        let mut pairs = ManifestParser::parse(Rule::manifest, text).map_err(|e| {
            let (line, col) = match e.line_col {
                pest::error::LineColLocation::Pos((line, col)) => (line, col),
                pest::error::LineColLocation::Span((line, col), _) => (line, col),
            };
            ManifestError::Syntax {
                line,
                col,
                message: e.variant.message().to_string(),
            }
        })?;

        let count = pairs
            .clone()
            .flatten()
            .filter(|pair| {
                matches!(
                    pair.as_rule(),
                    Rule::object | Rule::array | Rule::string | Rule::primitive
                )
            })
            .count();
        if count > max_tokens {
            return Err(ManifestError::TokenBudget {
                count,
                budget: max_tokens,
            });
        }

        let manifest = next_pair(&mut pairs)?;
        let root = token(next_pair(&mut manifest.into_inner())?)?;
        Manifest::from_token(&root)
    }

    fn from_token(root: &Token) -> Result<Manifest, ManifestError> {
        if !matches!(root, Token::Object(_)) {
            return Err(ManifestError::schema(format!(
                "manifest must be an object, found {}",
                root.kind()
            )));
        }

        let name = match root.member(NAME_KEY) {
            Some(value) => Some(text(NAME_KEY, value)?),
            None => None,
        };

        let samples = match root.member(SAMPLES_KEY) {
            None => Vec::new(),
            Some(Token::Object(entries)) => entries
                .iter()
                .map(|(note, body)| sample_entry(Some(note.as_str()), body))
                .collect::<Result<Vec<_>, _>>()?,
            Some(Token::Array(entries)) => entries
                .iter()
                .map(|body| sample_entry(None, body))
                .collect::<Result<Vec<_>, _>>()?,
            Some(other) => {
                return Err(ManifestError::schema(format!(
                    "\"{}\" must be an object or an array, found {}",
                    SAMPLES_KEY,
                    other.kind()
                )))
            }
        };

        Ok(Manifest { name, samples })
    }
}

fn next_pair<'a>(pairs: &mut Pairs<'a, Rule>) -> Result<Pair<'a, Rule>, ManifestError> {
    pairs
        .next()
        .ok_or_else(|| ManifestError::schema("unexpected end of manifest".to_string()))
}

fn token(pair: Pair<Rule>) -> Result<Token, ManifestError> {
    match pair.as_rule() {
        Rule::object => {
            let mut members = Vec::new();
            for member in pair.into_inner() {
                let mut inner = member.into_inner();
                let key = unescape(next_pair(&mut inner)?.as_str());
                let value = token(next_pair(&mut inner)?)?;
                members.push((key, value));
            }
            Ok(Token::Object(members))
        }
        Rule::array => Ok(Token::Array(
            pair.into_inner().map(token).collect::<Result<_, _>>()?,
        )),
        Rule::string => Ok(Token::String(unescape(pair.as_str()))),
        Rule::primitive => Ok(Token::Primitive(pair.as_str().to_string())),
        rule => Err(ManifestError::schema(format!(
            "unexpected {:?} in manifest",
            rule
        ))),
    }
}

/// Strips the quotes from a string token and resolves its escapes.
fn unescape(quoted: &str) -> String {
    let body = &quoted[1..quoted.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('t') => out.push('\t'),
            Some('u') => {
                let code: String = chars.by_ref().take(4).collect();
                let c = u32::from_str_radix(&code, 16)
                    .ok()
                    .and_then(char::from_u32)
                    .unwrap_or(char::REPLACEMENT_CHARACTER);
                out.push(c);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

fn text(key: &str, value: &Token) -> Result<String, ManifestError> {
    match value {
        Token::String(s) if s.len() <= MAX_TEXT_LEN => Ok(s.clone()),
        Token::String(s) => Err(ManifestError::schema(format!(
            "\"{}\" is {} bytes, longer than {}",
            key,
            s.len(),
            MAX_TEXT_LEN
        ))),
        other => Err(ManifestError::schema(format!(
            "\"{}\" must be a string, found {}",
            key,
            other.kind()
        ))),
    }
}

/// Parses a decimal or 0x-prefixed hexadecimal integer.
pub fn parse_int(value: &str) -> Option<u32> {
    let value = value.trim();
    match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => value.parse::<u32>().ok(),
    }
}

fn velocity(key: &str, value: &Token) -> Result<u8, ManifestError> {
    let raw = match value {
        Token::Primitive(s) | Token::String(s) => s,
        other => {
            return Err(ManifestError::schema(format!(
                "\"{}\" must be an integer, found {}",
                key,
                other.kind()
            )))
        }
    };
    match parse_int(raw) {
        Some(v) if v <= MAX_VELOCITY => Ok(v as u8),
        _ => Err(ManifestError::schema(format!(
            "\"{}\" must be an integer between 0 and {}, found {}",
            key, MAX_VELOCITY, raw
        ))),
    }
}

fn sample_entry(note: Option<&str>, body: &Token) -> Result<SampleEntry, ManifestError> {
    let Token::Object(members) = body else {
        return Err(ManifestError::schema(format!(
            "sample entries must be objects, found {}",
            body.kind()
        )));
    };

    let mut entry = SampleEntry {
        note: note.unwrap_or_default().to_string(),
        velocity_min: 0,
        velocity_max: MAX_VELOCITY as u8,
        path: None,
    };
    let mut has_note = note.is_some();

    for (key, value) in members {
        match key.as_str() {
            VELOCITY_MIN_KEY => entry.velocity_min = velocity(key, value)?,
            VELOCITY_MAX_KEY => entry.velocity_max = velocity(key, value)?,
            PATH_KEY => entry.path = Some(text(key, value)?),
            NOTE_KEY if note.is_none() => {
                entry.note = text(key, value)?;
                has_note = true;
            }
            _ => {}
        }
    }

    if !has_note {
        return Err(ManifestError::schema(format!(
            "sample entry is missing \"{}\"",
            NOTE_KEY
        )));
    }

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUDGET: usize = 1000;

    #[test]
    fn test_parse_object_layout() {
        let manifest = Manifest::parse(
            r#"{
                "name": "Upright Piano",
                "samples": {
                    "A0": { "velocity_min": 1, "velocity_max": 127, "path": "a0.wav" },
                    "C1_S": { "velocity_min": "0x10", "velocity_max": 0x7F, "path": "c1s.wav" }
                }
            }"#,
            BUDGET,
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("Upright Piano"));
        assert_eq!(
            manifest.samples,
            vec![
                SampleEntry {
                    note: "A0".to_string(),
                    velocity_min: 1,
                    velocity_max: 127,
                    path: Some("a0.wav".to_string()),
                },
                SampleEntry {
                    note: "C1_S".to_string(),
                    velocity_min: 16,
                    velocity_max: 127,
                    path: Some("c1s.wav".to_string()),
                },
            ]
        );
    }

    #[test]
    fn test_parse_array_layout() {
        let manifest = Manifest::parse(
            r#"{"samples": [
                {"note": "C1#", "velocity_min": 20, "velocity_max": 100, "path": "dir/c.wav"},
                {"note": "B0", "color": "red"}
            ]}"#,
            BUDGET,
        )
        .unwrap();

        assert_eq!(manifest.name, None);
        assert_eq!(manifest.samples.len(), 2);
        assert_eq!(manifest.samples[0].note, "C1#");
        assert_eq!(manifest.samples[0].velocity_min, 20);
        assert_eq!(manifest.samples[0].velocity_max, 100);
        assert_eq!(manifest.samples[0].path.as_deref(), Some("dir/c.wav"));
        // Defaults cover the full velocity range.
        assert_eq!(manifest.samples[1].velocity_min, 0);
        assert_eq!(manifest.samples[1].velocity_max, 127);
        assert_eq!(manifest.samples[1].path, None);
    }

    #[test]
    fn test_parse_without_samples() {
        let manifest = Manifest::parse(r#"{"name": "Empty"}"#, BUDGET).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("Empty"));
        assert!(manifest.samples.is_empty());

        let manifest = Manifest::parse("{}", BUDGET).unwrap();
        assert_eq!(manifest, Manifest::default());
    }

    #[test]
    fn test_parse_escapes() {
        let manifest =
            Manifest::parse(r#"{"name": "Pi\"ano!\\"}"#, BUDGET).unwrap();
        assert_eq!(manifest.name.as_deref(), Some("Pi\"ano!\\"));
    }

    #[test]
    fn test_token_budget() {
        // object, key, string = 3 tokens
        let text = r#"{"name": "x"}"#;
        assert!(Manifest::parse(text, 3).is_ok());
        assert!(matches!(
            Manifest::parse(text, 2),
            Err(ManifestError::TokenBudget {
                count: 3,
                budget: 2
            })
        ));
    }

    #[test]
    fn test_syntax_errors() {
        for text in ["", "{", r#"{"name" "x"}"#, r#"{"name": }"#, "[1, 2,]"] {
            assert!(
                matches!(Manifest::parse(text, BUDGET), Err(ManifestError::Syntax { .. })),
                "expected syntax error for {:?}",
                text
            );
        }
        assert!(matches!(
            Manifest::from_bytes(&[0x7B, 0xFF, 0x7D], BUDGET),
            Err(ManifestError::Encoding)
        ));
    }

    #[test]
    fn test_schema_errors() {
        let cases = [
            "[]",
            r#"{"name": 5}"#,
            r#"{"samples": "all"}"#,
            r#"{"samples": [5]}"#,
            r#"{"samples": [{"path": "a.wav"}]}"#,
            r#"{"samples": {"A0": {"velocity_min": 128}}}"#,
            r#"{"samples": {"A0": {"velocity_max": -1}}}"#,
            r#"{"samples": {"A0": {"velocity_max": "loud"}}}"#,
            r#"{"samples": {"A0": {"path": 7}}}"#,
        ];
        for text in cases {
            assert!(
                matches!(Manifest::parse(text, BUDGET), Err(ManifestError::Schema(_))),
                "expected schema error for {:?}",
                text
            );
        }

        let long_name = format!(r#"{{"name": "{}"}}"#, "x".repeat(MAX_TEXT_LEN + 1));
        assert!(matches!(
            Manifest::parse(&long_name, BUDGET),
            Err(ManifestError::Schema(_))
        ));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("42"), Some(42));
        assert_eq!(parse_int("0x2A"), Some(42));
        assert_eq!(parse_int("0X2a"), Some(42));
        assert_eq!(parse_int(" 7 "), Some(7));
        assert_eq!(parse_int("0x"), None);
        assert_eq!(parse_int("-1"), None);
        assert_eq!(parse_int("1.5"), None);
    }
}
