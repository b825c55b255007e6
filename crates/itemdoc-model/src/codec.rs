//! Text codecs for item property values.
//!
//! Every decoder here fails soft: text that cannot be understood decodes to
//! a documented default (0, `false`, [`Color::Invalid`]) so that a single bad
//! attribute never aborts loading a document.

use std::fmt;

/// Number of bits packed into one hex digit.
const NIBBLE_BITS: usize = 4;

/// A raw bit-vector property.
///
/// Serialized as hex nibbles, least-significant bit first within each
/// nibble. Encoding pads to a multiple of four bits, so a decoded vector can
/// be longer than the one that was encoded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Bits(Vec<bool>);

impl Bits {
    pub fn new(bits: Vec<bool>) -> Self {
        Self(bits)
    }

    pub fn zeroed(len: usize) -> Self {
        Self(vec![false; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.0.get(index).copied()
    }

    pub fn set(&mut self, index: usize, value: bool) {
        if let Some(bit) = self.0.get_mut(index) {
            *bit = value;
        }
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        encode_bits(&self.0)
    }

    pub fn from_hex(text: &str) -> Self {
        Self(decode_bits(text))
    }

    /// This vector padded with zero bits to the next nibble boundary.
    pub fn padded(&self) -> Self {
        let mut bits = self.0.clone();
        bits.resize(padded_len(bits.len()), false);
        Self(bits)
    }
}

impl From<Vec<bool>> for Bits {
    fn from(bits: Vec<bool>) -> Self {
        Self(bits)
    }
}

impl serde::Serialize for Bits {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> serde::Deserialize<'de> for Bits {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::from_hex(&text))
    }
}

fn padded_len(len: usize) -> usize {
    len.div_ceil(NIBBLE_BITS) * NIBBLE_BITS
}

/// Encode bits as lowercase hex nibbles, least-significant bit first.
pub fn encode_bits(bits: &[bool]) -> String {
    bits.chunks(NIBBLE_BITS)
        .map(|chunk| {
            let value = chunk
                .iter()
                .enumerate()
                .fold(0u32, |acc, (shift, bit)| acc | (u32::from(*bit) << shift));
            char::from_digit(value, 16).unwrap_or('0')
        })
        .collect()
}

/// Decode hex nibbles into bits. Characters that are not hex digits decode
/// as a zero nibble.
pub fn decode_bits(text: &str) -> Vec<bool> {
    let mut bits = Vec::with_capacity(text.len() * NIBBLE_BITS);
    for ch in text.chars() {
        let value = ch.to_digit(16).unwrap_or(0);
        for shift in 0..NIBBLE_BITS {
            bits.push(value & (1 << shift) != 0);
        }
    }
    bits
}

pub fn encode_number(value: f64) -> String {
    value.to_string()
}

/// Decode a floating point value, defaulting to 0.
pub fn decode_number(text: &str) -> f64 {
    text.trim().parse().unwrap_or(0.0)
}

pub fn encode_bool(value: bool) -> &'static str {
    if value { "1" } else { "0" }
}

/// Decode a boolean: any non-zero integer or `true` is true, everything
/// else is false.
pub fn decode_bool(text: &str) -> bool {
    let text = text.trim();
    if text.eq_ignore_ascii_case("true") {
        return true;
    }
    text.parse::<i64>().map(|value| value != 0).unwrap_or(false)
}

/// Decode an integer attribute.
///
/// A missing attribute yields `missing`; one that is present but not an
/// integer yields 0.
pub fn decode_int(text: Option<&str>, missing: i32) -> i32 {
    match text {
        Some(text) => text.trim().parse().unwrap_or(0),
        None => missing,
    }
}

/// An item color property.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Color {
    Rgb { r: u8, g: u8, b: u8 },
    #[default]
    Invalid,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::Rgb { r, g, b }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Rgb { .. })
    }

    /// Canonical `#rrggbb` name; empty for an invalid color.
    pub fn name(&self) -> String {
        match self {
            Self::Rgb { r, g, b } => format!("#{r:02x}{g:02x}{b:02x}"),
            Self::Invalid => String::new(),
        }
    }

    /// Parse `#rgb`, `#rrggbb` or a basic color keyword.
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(hex) = text.strip_prefix('#') {
            return parse_hex_color(hex).unwrap_or(Self::Invalid);
        }
        named_color(text).unwrap_or(Self::Invalid)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => f.write_str("invalid"),
            Self::Rgb { .. } => f.write_str(&self.name()),
        }
    }
}

impl serde::Serialize for Color {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name())
    }
}

impl<'de> serde::Deserialize<'de> for Color {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Self::parse(&text))
    }
}

fn parse_hex_color(hex: &str) -> Option<Color> {
    if !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
        return None;
    }
    match hex.len() {
        3 => {
            let mut channels = hex.chars().filter_map(|ch| ch.to_digit(16));
            let r = channels.next()? as u8;
            let g = channels.next()? as u8;
            let b = channels.next()? as u8;
            Some(Color::rgb(r * 17, g * 17, b * 17))
        }
        6 => {
            let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
            let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
            let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
            Some(Color::rgb(r, g, b))
        }
        _ => None,
    }
}

fn named_color(name: &str) -> Option<Color> {
    let color = match name.to_ascii_lowercase().as_str() {
        "black" => Color::rgb(0, 0, 0),
        "white" => Color::rgb(255, 255, 255),
        "red" => Color::rgb(255, 0, 0),
        "green" => Color::rgb(0, 128, 0),
        "blue" => Color::rgb(0, 0, 255),
        "yellow" => Color::rgb(255, 255, 0),
        "cyan" => Color::rgb(0, 255, 255),
        "magenta" => Color::rgb(255, 0, 255),
        "gray" | "grey" => Color::rgb(128, 128, 128),
        _ => return None,
    };
    Some(color)
}
