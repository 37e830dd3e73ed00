//! Port address grammar.
//!
//! Parsing is purely lexical and never consults a platform:
//!
//! ```text
//! physical     Input<N> | Output<N> | IN<N> | OUT<N>
//! slot-virtual Slot<S>In<X> | Slot<S>Out<X>
//! ```
//!
//! `N` and `S` are positive integers without leading zeros, `X` is a single
//! uppercase letter. Whether a parsed address exists on a platform is decided
//! by the routing validator.

use std::fmt;
use std::str::FromStr;

use moku_targets::PhysicalNaming;

/// Lexical failure while parsing a port address.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortParseError {
    #[error("port name cannot be empty")]
    Empty,

    #[error("'{text}' is not a port name (expected Input<N>, Output<N>, IN<N>, OUT<N>, or Slot<S>In<X>/Slot<S>Out<X>)")]
    UnknownPrefix { text: String },

    #[error("'{text}' is missing a channel or slot number")]
    MissingNumber { text: String },

    #[error("'{text}' has a number with a leading zero")]
    LeadingZero { text: String },

    #[error("'{text}' uses index 0 (numbering starts at 1)")]
    ZeroIndex { text: String },

    #[error("'{text}' has a number that is too large")]
    NumberTooLarge { text: String },

    #[error("'{text}' must continue with In or Out after the slot number")]
    InvalidDirection { text: String },

    #[error("'{text}' must end with a single uppercase port letter")]
    InvalidSuffix { text: String },

    #[error("'{text}' has unexpected trailing characters")]
    TrailingCharacters { text: String },
}

/// Classification of a port address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PortKind {
    PhysicalInput,
    PhysicalOutput,
    SlotInput,
    SlotOutput,
}

impl fmt::Display for PortKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortKind::PhysicalInput => "physical input",
            PortKind::PhysicalOutput => "physical output",
            PortKind::SlotInput => "slot input",
            PortKind::SlotOutput => "slot output",
        };
        f.write_str(s)
    }
}

/// Role a port plays in the routing matrix.
///
/// Physical inputs and slot outputs drive signals into the matrix; physical
/// outputs and slot inputs are driven by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortRole {
    /// May appear as a connection `source`.
    Source,
    /// May appear as a connection `destination`.
    Sink,
}

impl fmt::Display for PortRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortRole::Source => f.write_str("source"),
            PortRole::Sink => f.write_str("destination"),
        }
    }
}

/// A parsed port address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortAddress {
    PhysicalInput { channel: u32, naming: PhysicalNaming },
    PhysicalOutput { channel: u32, naming: PhysicalNaming },
    SlotInput { slot: u32, suffix: char },
    SlotOutput { slot: u32, suffix: char },
}

/// Spelling-independent identity of a concrete port.
///
/// `Input1` and `IN1` name the same physical channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortId {
    pub kind: PortKind,
    /// Channel number for physical ports, slot index for slot ports.
    pub index: u32,
    /// Port letter for slot ports.
    pub suffix: Option<char>,
}

impl PortAddress {
    /// Parse a port address string.
    pub fn parse(text: &str) -> Result<Self, PortParseError> {
        if text.is_empty() {
            return Err(PortParseError::Empty);
        }

        if let Some(rest) = text.strip_prefix("Slot") {
            let (slot, rest) = split_number(rest, text)?;
            if let Some(rest) = rest.strip_prefix("Out") {
                let suffix = parse_suffix(rest, text)?;
                return Ok(PortAddress::SlotOutput { slot, suffix });
            }
            if let Some(rest) = rest.strip_prefix("In") {
                let suffix = parse_suffix(rest, text)?;
                return Ok(PortAddress::SlotInput { slot, suffix });
            }
            return Err(PortParseError::InvalidDirection { text: text.into() });
        }

        let physical = [
            ("Input", PortKind::PhysicalInput, PhysicalNaming::Legacy),
            ("Output", PortKind::PhysicalOutput, PhysicalNaming::Legacy),
            ("IN", PortKind::PhysicalInput, PhysicalNaming::Extended),
            ("OUT", PortKind::PhysicalOutput, PhysicalNaming::Extended),
        ];
        for (prefix, kind, naming) in physical {
            let Some(rest) = text.strip_prefix(prefix) else {
                continue;
            };
            let (channel, rest) = split_number(rest, text)?;
            if !rest.is_empty() {
                return Err(PortParseError::TrailingCharacters { text: text.into() });
            }
            return Ok(if kind == PortKind::PhysicalInput {
                PortAddress::PhysicalInput { channel, naming }
            } else {
                PortAddress::PhysicalOutput { channel, naming }
            });
        }

        Err(PortParseError::UnknownPrefix { text: text.into() })
    }

    pub fn kind(&self) -> PortKind {
        match self {
            PortAddress::PhysicalInput { .. } => PortKind::PhysicalInput,
            PortAddress::PhysicalOutput { .. } => PortKind::PhysicalOutput,
            PortAddress::SlotInput { .. } => PortKind::SlotInput,
            PortAddress::SlotOutput { .. } => PortKind::SlotOutput,
        }
    }

    /// Whether this port drives the matrix or is driven by it.
    pub fn role(&self) -> PortRole {
        match self.kind() {
            PortKind::PhysicalInput | PortKind::SlotOutput => PortRole::Source,
            PortKind::PhysicalOutput | PortKind::SlotInput => PortRole::Sink,
        }
    }

    /// Slot index for slot-virtual ports.
    pub fn slot_index(&self) -> Option<u32> {
        match self {
            PortAddress::SlotInput { slot, .. } | PortAddress::SlotOutput { slot, .. } => {
                Some(*slot)
            }
            _ => None,
        }
    }

    /// Channel number for physical ports.
    pub fn channel(&self) -> Option<u32> {
        match self {
            PortAddress::PhysicalInput { channel, .. }
            | PortAddress::PhysicalOutput { channel, .. } => Some(*channel),
            _ => None,
        }
    }

    /// Port letter for slot-virtual ports.
    pub fn suffix(&self) -> Option<char> {
        match self {
            PortAddress::SlotInput { suffix, .. } | PortAddress::SlotOutput { suffix, .. } => {
                Some(*suffix)
            }
            _ => None,
        }
    }

    pub fn is_physical(&self) -> bool {
        self.channel().is_some()
    }

    pub fn id(&self) -> PortId {
        PortId {
            kind: self.kind(),
            index: self.channel().or(self.slot_index()).unwrap_or_default(),
            suffix: self.suffix(),
        }
    }

    /// Whether two addresses name the same concrete port.
    pub fn same_port(&self, other: &PortAddress) -> bool {
        self.id() == other.id()
    }
}

impl fmt::Display for PortAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            PortAddress::PhysicalInput { channel, naming } => {
                f.write_str(&naming.input_name(channel))
            }
            PortAddress::PhysicalOutput { channel, naming } => {
                f.write_str(&naming.output_name(channel))
            }
            PortAddress::SlotInput { slot, suffix } => write!(f, "Slot{slot}In{suffix}"),
            PortAddress::SlotOutput { slot, suffix } => write!(f, "Slot{slot}Out{suffix}"),
        }
    }
}

impl FromStr for PortAddress {
    type Err = PortParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PortAddress::parse(s)
    }
}

/// Split a leading positive decimal number off `rest`.
fn split_number<'a>(rest: &'a str, text: &str) -> Result<(u32, &'a str), PortParseError> {
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let (digits, tail) = rest.split_at(end);
    if digits.is_empty() {
        return Err(PortParseError::MissingNumber { text: text.into() });
    }
    if digits == "0" {
        return Err(PortParseError::ZeroIndex { text: text.into() });
    }
    if digits.starts_with('0') {
        return Err(PortParseError::LeadingZero { text: text.into() });
    }
    let n = digits
        .parse::<u32>()
        .map_err(|_| PortParseError::NumberTooLarge { text: text.into() })?;
    Ok((n, tail))
}

fn parse_suffix(rest: &str, text: &str) -> Result<char, PortParseError> {
    let mut chars = rest.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Ok(c),
        _ => Err(PortParseError::InvalidSuffix { text: text.into() }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_physical_legacy() {
        let p = PortAddress::parse("Input1").unwrap();
        assert_eq!(p.kind(), PortKind::PhysicalInput);
        assert_eq!(p.channel(), Some(1));
        assert_eq!(p.role(), PortRole::Source);

        let p = PortAddress::parse("Output2").unwrap();
        assert_eq!(p.kind(), PortKind::PhysicalOutput);
        assert_eq!(p.role(), PortRole::Sink);
    }

    #[test]
    fn parse_physical_extended() {
        let p: PortAddress = "IN8".parse().unwrap();
        assert_eq!(
            p,
            PortAddress::PhysicalInput {
                channel: 8,
                naming: PhysicalNaming::Extended
            }
        );
        let p: PortAddress = "OUT12".parse().unwrap();
        assert_eq!(p.channel(), Some(12));
        assert_eq!(p.kind(), PortKind::PhysicalOutput);
    }

    #[test]
    fn parse_slot_ports() {
        let p = PortAddress::parse("Slot1InA").unwrap();
        assert_eq!(p, PortAddress::SlotInput { slot: 1, suffix: 'A' });
        assert_eq!(p.role(), PortRole::Sink);

        let p = PortAddress::parse("Slot12OutD").unwrap();
        assert_eq!(p.slot_index(), Some(12));
        assert_eq!(p.suffix(), Some('D'));
        assert_eq!(p.role(), PortRole::Source);
        assert!(!p.is_physical());
    }

    #[test]
    fn display_round_trips_spelling() {
        for text in ["Input1", "Output2", "IN8", "OUT3", "Slot1InA", "Slot4OutD"] {
            assert_eq!(PortAddress::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn spellings_name_same_port() {
        let legacy = PortAddress::parse("Input2").unwrap();
        let extended = PortAddress::parse("IN2").unwrap();
        assert_ne!(legacy, extended);
        assert!(legacy.same_port(&extended));
        assert!(!legacy.same_port(&PortAddress::parse("OUT2").unwrap()));
    }

    #[test]
    fn rejects_malformed() {
        let cases = [
            ("", PortParseError::Empty),
            ("Foo1", PortParseError::UnknownPrefix { text: "Foo1".into() }),
            ("input1", PortParseError::UnknownPrefix { text: "input1".into() }),
            ("Input", PortParseError::MissingNumber { text: "Input".into() }),
            ("Input0", PortParseError::ZeroIndex { text: "Input0".into() }),
            ("IN01", PortParseError::LeadingZero { text: "IN01".into() }),
            ("OUT1x", PortParseError::TrailingCharacters { text: "OUT1x".into() }),
            ("Slot1A", PortParseError::InvalidDirection { text: "Slot1A".into() }),
            ("SlotInA", PortParseError::MissingNumber { text: "SlotInA".into() }),
            ("Slot1Ina", PortParseError::InvalidSuffix { text: "Slot1Ina".into() }),
            ("Slot1OutAB", PortParseError::InvalidSuffix { text: "Slot1OutAB".into() }),
            ("Slot1In", PortParseError::InvalidSuffix { text: "Slot1In".into() }),
            (
                "Input99999999999",
                PortParseError::NumberTooLarge { text: "Input99999999999".into() },
            ),
        ];
        for (text, expected) in cases {
            assert_eq!(PortAddress::parse(text).unwrap_err(), expected, "{text}");
        }
    }

    #[test]
    fn parsing_is_platform_independent() {
        // Channel 99 does not exist anywhere, but it is lexically valid.
        assert!(PortAddress::parse("IN99").is_ok());
        assert!(PortAddress::parse("Slot9OutZ").is_ok());
    }
}
