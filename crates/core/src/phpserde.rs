//! Codec for the PHP serialization format used by WordPress.
//!
//! WordPress stores structured option values and some post meta as
//! PHP-serialized text (`a:1:{s:3:"key";i:5;}`). This module is a pure
//! format transform between that text and [`PhpValue`]; it knows nothing
//! about the event schema.
//!
//! String lengths in the format are **byte** lengths, so decoding walks raw
//! bytes and validates UTF-8 per string. Array entries keep insertion order
//! to survive an encode/decode round trip unchanged.

use std::fmt;

/// Key of a PHP array entry. PHP arrays mix integer and string keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhpKey {
    Int(i64),
    Str(String),
}

impl fmt::Display for PhpKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhpKey::Int(i) => write!(f, "{i}"),
            PhpKey::Str(s) => write!(f, "{s}"),
        }
    }
}

/// A decoded PHP value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum PhpValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    /// Ordered key/value entries; PHP arrays serve as both lists and maps.
    Array(Vec<(PhpKey, PhpValue)>),
}

impl PhpValue {
    /// Look up an entry by string key (arrays only).
    pub fn get(&self, key: &str) -> Option<&PhpValue> {
        match self {
            PhpValue::Array(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, PhpKey::Str(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Look up an entry by integer key (arrays only).
    pub fn get_index(&self, index: i64) -> Option<&PhpValue> {
        match self {
            PhpValue::Array(entries) => entries
                .iter()
                .find(|(k, _)| matches!(k, PhpKey::Int(i) if *i == index))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Mutable lookup by string key (arrays only).
    pub fn get_mut(&mut self, key: &str) -> Option<&mut PhpValue> {
        match self {
            PhpValue::Array(entries) => entries
                .iter_mut()
                .find(|(k, _)| matches!(k, PhpKey::Str(s) if s == key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Insert or replace a string-keyed entry. No-op on non-arrays.
    pub fn insert(&mut self, key: &str, value: PhpValue) {
        if let PhpValue::Array(entries) = self {
            for (k, v) in entries.iter_mut() {
                if matches!(k, PhpKey::Str(s) if s == key) {
                    *v = value;
                    return;
                }
            }
            entries.push((PhpKey::Str(key.to_string()), value));
        }
    }

    /// Array entries in insertion order, or an empty slice for scalars.
    pub fn entries(&self) -> &[(PhpKey, PhpValue)] {
        match self {
            PhpValue::Array(entries) => entries,
            _ => &[],
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PhpValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            PhpValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Render a leaf as text the way stored meta values appear: strings
    /// verbatim, scalars via `Display`-like formatting. Arrays yield `None`.
    pub fn as_text(&self) -> Option<String> {
        match self {
            PhpValue::String(s) => Some(s.clone()),
            PhpValue::Int(i) => Some(i.to_string()),
            PhpValue::Float(f) => Some(f.to_string()),
            PhpValue::Bool(b) => Some(if *b { "1" } else { "0" }.to_string()),
            PhpValue::Null | PhpValue::Array(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("Unexpected end of input at byte {0}")]
    UnexpectedEof(usize),

    #[error("Unexpected byte {byte:#04x} at position {pos}")]
    UnexpectedByte { pos: usize, byte: u8 },

    #[error("Invalid number at position {0}")]
    InvalidNumber(usize),

    #[error("String at position {0} is not valid UTF-8")]
    InvalidUtf8(usize),

    #[error("Array key at position {0} must be an integer or string")]
    InvalidKey(usize),

    #[error("Trailing data after value at position {0}")]
    TrailingData(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum EncodeError {
    #[error("Float value {0} cannot be encoded")]
    NonFiniteFloat(f64),
}

/// Decode a PHP-serialized payload.
///
/// Callers treating the payload as optional should use `decode(..).ok()`;
/// a malformed blob then reads as "field effectively absent".
pub fn decode(input: &str) -> Result<PhpValue, DecodeError> {
    let mut parser = Parser {
        bytes: input.as_bytes(),
        pos: 0,
    };
    let value = parser.parse_value()?;
    if parser.pos != parser.bytes.len() {
        return Err(DecodeError::TrailingData(parser.pos));
    }
    Ok(value)
}

/// Encode a value tree back into PHP serialization text.
///
/// Round-trips everything [`decode`] accepts.
pub fn encode(value: &PhpValue) -> Result<String, EncodeError> {
    let mut out = String::new();
    encode_into(value, &mut out)?;
    Ok(out)
}

fn encode_into(value: &PhpValue, out: &mut String) -> Result<(), EncodeError> {
    match value {
        PhpValue::Null => out.push_str("N;"),
        PhpValue::Bool(b) => out.push_str(if *b { "b:1;" } else { "b:0;" }),
        PhpValue::Int(i) => {
            out.push_str("i:");
            out.push_str(&i.to_string());
            out.push(';');
        }
        PhpValue::Float(f) => {
            if !f.is_finite() {
                return Err(EncodeError::NonFiniteFloat(*f));
            }
            out.push_str("d:");
            out.push_str(&f.to_string());
            out.push(';');
        }
        PhpValue::String(s) => {
            out.push_str("s:");
            out.push_str(&s.len().to_string());
            out.push_str(":\"");
            out.push_str(s);
            out.push_str("\";");
        }
        PhpValue::Array(entries) => {
            out.push_str("a:");
            out.push_str(&entries.len().to_string());
            out.push_str(":{");
            for (key, val) in entries {
                match key {
                    PhpKey::Int(i) => encode_into(&PhpValue::Int(*i), out)?,
                    PhpKey::Str(s) => encode_into(&PhpValue::String(s.clone()), out)?,
                }
                encode_into(val, out)?;
            }
            out.push('}');
        }
    }
    Ok(())
}

struct Parser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Result<u8, DecodeError> {
        self.bytes
            .get(self.pos)
            .copied()
            .ok_or(DecodeError::UnexpectedEof(self.pos))
    }

    fn expect(&mut self, byte: u8) -> Result<(), DecodeError> {
        let got = self.peek()?;
        if got != byte {
            return Err(DecodeError::UnexpectedByte {
                pos: self.pos,
                byte: got,
            });
        }
        self.pos += 1;
        Ok(())
    }

    /// Read bytes up to (not including) `delim`, advancing past it.
    fn read_until(&mut self, delim: u8) -> Result<&'a [u8], DecodeError> {
        let start = self.pos;
        while self.peek()? != delim {
            self.pos += 1;
        }
        let slice = &self.bytes[start..self.pos];
        self.pos += 1;
        Ok(slice)
    }

    fn parse_value(&mut self) -> Result<PhpValue, DecodeError> {
        match self.peek()? {
            b'N' => {
                self.pos += 1;
                self.expect(b';')?;
                Ok(PhpValue::Null)
            }
            b'b' => {
                self.pos += 1;
                self.expect(b':')?;
                let flag = self.peek()?;
                let value = match flag {
                    b'0' => false,
                    b'1' => true,
                    byte => {
                        return Err(DecodeError::UnexpectedByte {
                            pos: self.pos,
                            byte,
                        })
                    }
                };
                self.pos += 1;
                self.expect(b';')?;
                Ok(PhpValue::Bool(value))
            }
            b'i' => {
                self.pos += 1;
                self.expect(b':')?;
                let digits = self.read_ascii_until(b';')?;
                let value = digits
                    .parse::<i64>()
                    .map_err(|_| DecodeError::InvalidNumber(self.pos))?;
                Ok(PhpValue::Int(value))
            }
            b'd' => {
                self.pos += 1;
                self.expect(b':')?;
                let digits = self.read_ascii_until(b';')?;
                let value = digits
                    .parse::<f64>()
                    .map_err(|_| DecodeError::InvalidNumber(self.pos))?;
                Ok(PhpValue::Float(value))
            }
            b's' => {
                self.pos += 1;
                self.expect(b':')?;
                let len = self.parse_length()?;
                self.expect(b'"')?;
                let start = self.pos;
                let end = start
                    .checked_add(len)
                    .filter(|&e| e <= self.bytes.len())
                    .ok_or(DecodeError::UnexpectedEof(start))?;
                let text = std::str::from_utf8(&self.bytes[start..end])
                    .map_err(|_| DecodeError::InvalidUtf8(start))?
                    .to_string();
                self.pos = end;
                self.expect(b'"')?;
                self.expect(b';')?;
                Ok(PhpValue::String(text))
            }
            b'a' => {
                self.pos += 1;
                self.expect(b':')?;
                let count = self.parse_length()?;
                self.expect(b'{')?;
                let mut entries = Vec::with_capacity(count);
                for _ in 0..count {
                    let key_pos = self.pos;
                    let key = match self.parse_value()? {
                        PhpValue::Int(i) => PhpKey::Int(i),
                        PhpValue::String(s) => PhpKey::Str(s),
                        _ => return Err(DecodeError::InvalidKey(key_pos)),
                    };
                    let value = self.parse_value()?;
                    entries.push((key, value));
                }
                self.expect(b'}')?;
                Ok(PhpValue::Array(entries))
            }
            byte => Err(DecodeError::UnexpectedByte {
                pos: self.pos,
                byte,
            }),
        }
    }

    fn read_ascii_until(&mut self, delim: u8) -> Result<&'a str, DecodeError> {
        let pos = self.pos;
        let slice = self.read_until(delim)?;
        std::str::from_utf8(slice).map_err(|_| DecodeError::InvalidNumber(pos))
    }

    /// Parse a decimal length field and consume the trailing `:`.
    fn parse_length(&mut self) -> Result<usize, DecodeError> {
        let pos = self.pos;
        let digits = self.read_ascii_until(b':')?;
        digits
            .parse::<usize>()
            .map_err(|_| DecodeError::InvalidNumber(pos))
    }
}
