//! Manual parser implementations for Go literal expressions.
//!
//! Parsers in this module assume that their inputs were already recognized
//! as literals of the right shape by the grammar; e.g. a rune literal may
//! contain a bad escape, but will *always* be delimited by single quotes.
//! They exist so that constant declarations can be evaluated without a Go
//! toolchain.

use thiserror::Error;
use winnow::{
    PResult, Parser,
    combinator::{alt, delimited, dispatch, empty, fail, opt, preceded, repeat},
    error::{ContextError, ErrMode},
    token::{any, one_of, take_till, take_while},
};

const BACKSLASH: char = '\\';
const SINGLE_QUOTE: char = '\'';
const DOUBLE_QUOTE: char = '"';
const BACKTICK: char = '`';
const UNDERSCORE: char = '_';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntKind {
    Bin,
    Oct,
    /// An octal literal written with a bare leading zero, as in `0755`.
    LegacyOct,
    Dec,
    Hex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntLiteral {
    pub kind: IntKind,
    pub value: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed {what} literal `{input}` (at offset {offset})")]
pub struct LiteralError {
    input: Box<str>,
    offset: usize,
    what: &'static str,
}

impl LiteralError {
    fn new(input: &str, offset: usize, what: &'static str) -> Self {
        Self {
            input: input.into(),
            offset,
            what,
        }
    }
}

pub fn parse_int_literal(input: &str) -> Result<IntLiteral, LiteralError> {
    alt((
        preceded(('0', one_of(['x', 'X'])), digits::<16>)
            .map(|value| (IntKind::Hex, value)),
        preceded(('0', one_of(['b', 'B'])), digits::<2>)
            .map(|value| (IntKind::Bin, value)),
        preceded(('0', one_of(['o', 'O'])), digits::<8>)
            .map(|value| (IntKind::Oct, value)),
        preceded('0', digits::<8>).map(|value| (IntKind::LegacyOct, value)),
        digits::<10>.map(|value| (IntKind::Dec, value)),
    ))
    .parse(input)
    .map(|(kind, value)| IntLiteral { kind, value })
    .map_err(|error| LiteralError::new(input, error.offset(), "integer"))
}

pub fn parse_float_literal(input: &str) -> Result<f64, LiteralError> {
    if input.starts_with("0x") || input.starts_with("0X") {
        return hex_float
            .parse(input)
            .map_err(|error| LiteralError::new(input, error.offset(), "float"));
    }

    // decimal floats are farmed out to f64's FromStr impl, which accepts
    // every decimal form Go does once the digit separators are gone
    input
        .chars()
        .filter(|&c| c != UNDERSCORE)
        .collect::<String>()
        .parse::<f64>()
        .map_err(|_| LiteralError::new(input, 0, "float"))
}

/// Parses an imaginary literal such as `3i` or `1.5e3i`, returning the
/// value of its imaginary part.
pub fn parse_imaginary_literal(input: &str) -> Result<f64, LiteralError> {
    let body = input
        .strip_suffix('i')
        .ok_or_else(|| LiteralError::new(input, input.len(), "imaginary"))?;

    let is_hex = body.starts_with("0x") || body.starts_with("0X");
    let is_float = match is_hex {
        true => body.contains(['p', 'P']),
        false => body.contains(['.', 'e', 'E']),
    };

    match (is_float, is_hex) {
        (true, _) => parse_float_literal(body),
        (false, true) => parse_int_literal(body).map(|lit| lit.value as f64),
        // for backwards compatibility, `0123i` is decimal rather than octal
        (false, false) => digits::<10>
            .parse(body)
            .map(|value| value as f64)
            .map_err(|error| {
                LiteralError::new(input, error.offset(), "imaginary")
            }),
    }
}

/// Parses a rune literal, returning its Unicode code point (or byte value,
/// for `\x` and octal escapes).
pub fn parse_rune_literal(input: &str) -> Result<u32, LiteralError> {
    delimited(SINGLE_QUOTE, rune_contents, SINGLE_QUOTE)
        .parse(input)
        .map_err(|error| LiteralError::new(input, error.offset(), "rune"))
}

/// Parses an interpreted (double-quoted) string literal, resolving escapes.
pub fn parse_string_literal(input: &str) -> Result<String, LiteralError> {
    delimited(DOUBLE_QUOTE, string_contents, DOUBLE_QUOTE)
        .parse(input)
        .map_err(|error| LiteralError::new(input, error.offset(), "string"))
}

/// Parses a raw (backquoted) string literal. Carriage returns inside raw
/// strings are discarded, as in Go.
pub fn parse_raw_string_literal(input: &str) -> Result<String, LiteralError> {
    delimited(BACKTICK, raw_contents, BACKTICK)
        .parse(input)
        .map(|contents| contents.replace('\r', ""))
        .map_err(|error| LiteralError::new(input, error.offset(), "raw string"))
}

#[derive(Debug, Clone, Copy)]
enum Escaped {
    /// A single byte, from `\x` and octal escapes.
    Byte(u8),
    /// A code point, from every other escape.
    Code(u32),
}

#[derive(Debug, Clone, Copy)]
enum StringPart<'s> {
    Text(&'s str),
    Escape(Escaped),
}

fn string_contents(input: &mut &str) -> PResult<String> {
    repeat(
        0..,
        alt((
            take_till(1.., [BACKSLASH, DOUBLE_QUOTE]).map(StringPart::Text),
            preceded(BACKSLASH, escape).map(StringPart::Escape),
        )),
    )
    .map(|parts: Vec<StringPart<'_>>| {
        let mut bytes = Vec::new();
        for part in parts {
            match part {
                StringPart::Text(text) => bytes.extend_from_slice(text.as_bytes()),
                StringPart::Escape(Escaped::Byte(byte)) => bytes.push(byte),
                StringPart::Escape(Escaped::Code(code)) => {
                    let c = char::from_u32(code)
                        .unwrap_or(char::REPLACEMENT_CHARACTER);
                    let mut buf = [0u8; 4];
                    bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                }
            }
        }

        String::from_utf8_lossy(&bytes).into_owned()
    })
    .parse_next(input)
}

fn raw_contents<'s>(input: &mut &'s str) -> PResult<&'s str> {
    take_till(0.., BACKTICK).parse_next(input)
}

fn rune_contents(input: &mut &str) -> PResult<u32> {
    alt((
        preceded(BACKSLASH, escape).map(|escaped| match escaped {
            Escaped::Byte(byte) => byte as u32,
            Escaped::Code(code) => code,
        }),
        any.verify(|c: &char| *c != SINGLE_QUOTE).map(|c: char| c as u32),
    ))
    .parse_next(input)
}

fn escape(input: &mut &str) -> PResult<Escaped> {
    alt((
        take_while(3, |c: char| c.is_digit(8))
            .verify_map(|digits: &str| u8::from_str_radix(digits, 8).ok())
            .map(Escaped::Byte),
        preceded('x', fixed_hex::<2>).map(|value| Escaped::Byte(value as u8)),
        preceded('u', fixed_hex::<4>).map(Escaped::Code),
        preceded('U', fixed_hex::<8>)
            .verify(|code: &u32| char::from_u32(*code).is_some())
            .map(Escaped::Code),
        simple_escape.map(Escaped::Code),
    ))
    .parse_next(input)
}

fn simple_escape(input: &mut &str) -> PResult<u32> {
    dispatch! {any;
        'a' => empty.value(0x07u32),
        'b' => empty.value(0x08u32),
        'f' => empty.value(0x0Cu32),
        'n' => empty.value(0x0Au32),
        'r' => empty.value(0x0Du32),
        't' => empty.value(0x09u32),
        'v' => empty.value(0x0Bu32),
        BACKSLASH => empty.value(BACKSLASH as u32),
        SINGLE_QUOTE => empty.value(SINGLE_QUOTE as u32),
        DOUBLE_QUOTE => empty.value(DOUBLE_QUOTE as u32),
        _ => fail,
    }
    .parse_next(input)
}

/// Parses exactly `N` hexadecimal digits.
fn fixed_hex<const N: usize>(input: &mut &str) -> PResult<u32> {
    take_while(N, |c: char| c.is_ascii_hexdigit())
        .verify_map(|digits: &str| u32::from_str_radix(digits, 16).ok())
        .parse_next(input)
}

/// Parses a hexadecimal floating-point literal such as `0x1.8p3`.
fn hex_float(input: &mut &str) -> PResult<f64> {
    (
        preceded(('0', one_of(['x', 'X'])), opt(hex_run)),
        opt(preceded('.', opt(hex_run))),
        one_of(['p', 'P']),
        opt(one_of(['+', '-'])),
        digits::<10>,
    )
        .parse_next(input)
        .map(|(int, frac, _, sign, power)| {
            let mut mantissa = 0f64;
            for digit in hex_values(int.unwrap_or_default()) {
                mantissa = mantissa * 16.0 + digit;
            }

            let mut scale = 1f64 / 16.0;
            for digit in hex_values(frac.flatten().unwrap_or_default()) {
                mantissa += digit * scale;
                scale /= 16.0;
            }

            let power = i32::try_from(power).unwrap_or(i32::MAX);
            let power = match sign {
                Some('-') => -power,
                _ => power,
            };

            mantissa * 2f64.powi(power)
        })
}

fn hex_run<'s>(input: &mut &'s str) -> PResult<&'s str> {
    take_while(1.., |c: char| c == UNDERSCORE || c.is_ascii_hexdigit())
        .parse_next(input)
}

fn hex_values(digits: &str) -> impl Iterator<Item = f64> + use<'_> {
    digits
        .chars()
        .filter_map(|c| c.to_digit(16))
        .map(|digit| digit as f64)
}

/// Parses a run of digits (and digit separators) of the given `RADIX`,
/// yielding a `u128` value. The only failure mode for this function other
/// than a missing digit is a literal too large to fit into a `u128`.
fn digits<const RADIX: u32>(input: &mut &str) -> PResult<u128> {
    take_while(1.., |c: char| c == UNDERSCORE || c.is_digit(RADIX))
        .parse_next(input)
        .and_then(|s| {
            s.chars()
                .filter(|&c| c != UNDERSCORE)
                .try_fold(0u128, |sum, digit| {
                    let digit = digit.to_digit(RADIX)? as u128;
                    sum.checked_mul(RADIX.into())?.checked_add(digit)
                })
                .ok_or_else(|| ErrMode::Backtrack(ContextError::new()))
        })
}
