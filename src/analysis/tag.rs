//! Parsing of struct field tags.
//!
//! A tag is a sequence of `key:"value"` pairs separated by single spaces.
//! Keys are made of ASCII letters, digits and underscores. Values are kept
//! exactly as written between their quotes; escapes are skipped over while
//! looking for the closing quote, but not resolved.

use std::collections::BTreeMap;

use thiserror::Error;

/// The decoded pairs of a struct tag, keyed by tag key.
pub type TagMap = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagSyntaxError {
    #[error("bad syntax for struct tag pair in `{0}`")]
    BadPair(Box<str>),
    #[error("bad syntax for struct tag key in `{0}`")]
    BadKey(Box<str>),
    #[error("struct tag key is empty in `{0}`")]
    EmptyKey(Box<str>),
    #[error("bad syntax for struct tag value in `{0}`")]
    BadValue(Box<str>),
    #[error("unterminated struct tag value in `{0}`")]
    Unterminated(Box<str>),
    #[error("key:\"value\" pairs not separated by spaces in `{0}`")]
    NotSeparated(Box<str>),
    #[error("struct tag `{0}` has no key:\"value\" pairs")]
    Empty(Box<str>),
}

/// The value that marks a field as omitted for a key.
const OMIT: &str = "-";

/// Parses a raw struct tag, with or without its surrounding backticks.
///
/// Each value is cut at its first comma, so `json:"id,omitempty"` maps
/// `json` to `id`, and a key whose value is then exactly `-` is left out
/// of the result. A tag without any pairs is an error, but a tag whose
/// pairs are all omitted yields an empty map.
pub fn parse_tag(raw: &str) -> Result<TagMap, TagSyntaxError> {
    let pairs = scan_pairs(raw)?;
    let mut tags = TagMap::new();

    for (key, value) in pairs {
        let value = value.split(',').next().unwrap_or_default();

        // the first occurrence of a key wins, as in reflect.StructTag.Get
        if value != OMIT && !tags.contains_key(key) {
            tags.insert(key.to_owned(), value.to_owned());
        }
    }

    Ok(tags)
}

/// Splits `raw` into its `key:"value"` pairs without interpreting them.
fn scan_pairs(raw: &str) -> Result<Vec<(&str, &str)>, TagSyntaxError> {
    let mut rest = raw.trim_matches('`');
    let mut pairs = Vec::new();

    while !rest.is_empty() {
        if !pairs.is_empty() {
            rest = match rest.strip_prefix(' ') {
                Some(after) if !after.starts_with(' ') => after,
                _ => return Err(TagSyntaxError::NotSeparated(raw.into())),
            };

            // a single trailing space is tolerated
            if rest.is_empty() {
                break;
            }
        }

        let key_length = rest
            .bytes()
            .take_while(|&byte| {
                byte > b' ' && !matches!(byte, b':' | b'"' | 0x7f)
            })
            .count();
        let (key, after_key) = rest.split_at(key_length);

        match after_key.as_bytes() {
            [b':', ..] if key.is_empty() => {
                return Err(TagSyntaxError::EmptyKey(raw.into()));
            }
            _ if key.is_empty() => {
                return Err(TagSyntaxError::BadKey(raw.into()));
            }
            [b':', b'"', ..] => {}
            [b':', _, ..] => return Err(TagSyntaxError::BadValue(raw.into())),
            _ => return Err(TagSyntaxError::BadPair(raw.into())),
        }

        if !key
            .bytes()
            .all(|byte| byte.is_ascii_alphanumeric() || byte == b'_')
        {
            return Err(TagSyntaxError::BadKey(raw.into()));
        }

        let body = &after_key[2..];
        let bytes = body.as_bytes();
        let mut index = 0;

        while index < bytes.len() && bytes[index] != b'"' {
            if bytes[index] == b'\\' {
                index += 1;
            }
            index += 1;
        }

        if index >= bytes.len() {
            return Err(TagSyntaxError::Unterminated(raw.into()));
        }

        pairs.push((key, &body[..index]));
        rest = &body[index + 1..];
    }

    match pairs.is_empty() {
        true => Err(TagSyntaxError::Empty(raw.into())),
        false => Ok(pairs),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags<const N: usize>(pairs: [(&str, &str); N]) -> TagMap {
        pairs
            .into_iter()
            .map(|(key, value)| (key.to_owned(), value.to_owned()))
            .collect()
    }

    #[test]
    fn well_formed_tags() {
        let cases = [
            (r#"db:"test""#, tags([("db", "test")])),
            (
                r#"db:"test" json:"testValue" yaml:"value_42""#,
                tags([("db", "test"), ("json", "testValue"), ("yaml", "value_42")]),
            ),
            (
                r#"x:"y" u:"v" w:"""#,
                tags([("x", "y"), ("u", "v"), ("w", "")]),
            ),
            (
                r#"x:"y:z" u:"v" w:"""#,
                tags([("x", "y:z"), ("u", "v"), ("w", "")]),
            ),
            (
                "k0:\"values contain spaces\" k1:\"literal\ttabs\" k2:\"and\\tescaped\\tabs\"",
                tags([
                    ("k0", "values contain spaces"),
                    ("k1", "literal\ttabs"),
                    ("k2", "and\\tescaped\\tabs"),
                ]),
            ),
            (
                r#"under_scores:"and" CAPS:"ARE_OK""#,
                tags([("under_scores", "and"), ("CAPS", "ARE_OK")]),
            ),
            (r#"json:"-""#, tags([])),
            (r#"json:"a,omitempty""#, tags([("json", "a")])),
            (r#"json:"b, omitempty""#, tags([("json", "b")])),
            (r#"json:"c ,omitempty""#, tags([("json", "c ")])),
            (r#"json:"d,omitempty, string""#, tags([("json", "d")])),
            (r#"xml:"e local""#, tags([("xml", "e local")])),
            (r#"xml:" l local,omitempty""#, tags([("xml", " l local")])),
            (r#"xml:"m  local,omitempty""#, tags([("xml", "m  local")])),
            (r#"xml:" ""#, tags([("xml", " ")])),
            (r#"xml:",""#, tags([("xml", "")])),
            (r#"foo:" doesn't care ""#, tags([("foo", " doesn't care ")])),
            (r#"a:"\"quoted\"""#, tags([("a", r#"\"quoted\""#)])),
            (r#"db:"name" "#, tags([("db", "name")])),
        ];

        for (raw, expected) in cases {
            assert_eq!(parse_tag(raw), Ok(expected), "parsing {raw:?}");
        }
    }

    #[test]
    fn backticks_are_trimmed() {
        assert_eq!(
            parse_tag(r#"`db:"name" json:"name"`"#),
            Ok(tags([("db", "name"), ("json", "name")]))
        );
    }

    #[test]
    fn malformed_tags() {
        use TagSyntaxError::*;

        let cases: [(&str, fn(Box<str>) -> TagSyntaxError); 11] = [
            ("", Empty),
            ("``", Empty),
            ("hello", BadPair),
            ("malformed no colon", BadPair),
            ("\tx:\"y\"", BadKey),
            ("x:\"y\"\tx:\"y\"", NotSeparated),
            ("x:`y`", BadValue),
            ("ct\x08rl:\"char\"", BadPair),
            (r#":"emptykey""#, EmptyKey),
            (r#"x:"noEndQuote"#, Unterminated),
            (r#"x:"foo",y:"bar""#, NotSeparated),
        ];

        for (raw, error) in cases {
            assert_eq!(parse_tag(raw), Err(error(raw.into())), "parsing {raw:?}");
        }
    }

    #[test]
    fn separators_are_single_spaces() {
        assert!(matches!(
            parse_tag(r#"x:"foo"y:"bar""#),
            Err(TagSyntaxError::NotSeparated(_))
        ));
        assert!(matches!(
            parse_tag(r#"x:"foo"  y:"bar""#),
            Err(TagSyntaxError::NotSeparated(_))
        ));
        assert!(matches!(
            parse_tag(r#"my-key:"value""#),
            Err(TagSyntaxError::BadKey(_))
        ));
    }

    #[test]
    fn first_occurrence_of_a_key_wins() {
        assert_eq!(
            parse_tag(r#"json:"a" json:"b""#),
            Ok(tags([("json", "a")]))
        );
    }
}
