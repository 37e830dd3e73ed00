//! Routing validation: checks a connection list against platform topology.
//!
//! The validator interns every parsed port into a small arena and works on
//! integer node indices. For each connection, in order, it runs:
//!
//! 1. syntax: both port strings must parse
//! 2. existence: channels within the platform's counts, slots within range and
//!    configured, slot port letters exposed by the slot's instrument
//! 3. direction: the source must drive the matrix, the destination must be driven
//! 4. fan-in: a destination may be driven by at most one connection
//!    (fan-out from one source is unlimited)
//! 5. self-loop: source and destination must be different concrete ports
//!
//! Slot-level checks with no connection attached follow. Every problem is
//! reported; nothing short-circuits. Feedback paths through several slots
//! (Slot1 -> Slot2 -> Slot1) are accepted: they are structurally sound, and
//! whether a feedback path is meaningful depends on the instruments.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use moku_targets::PlatformSpec;
use serde::Serialize;

use crate::connection::MokuConnection;
use crate::port::{PortAddress, PortId, PortRole};
use crate::slot::SlotConfig;

/// Category of a routing validation error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Port string does not follow the port grammar.
    Syntax,
    /// Physical channel number exceeds the platform's channel count.
    ChannelOutOfRange,
    /// Slot index outside `1..=slot_count`.
    SlotOutOfRange,
    /// Slot index is in range but no instrument is assigned to it.
    SlotNotConfigured,
    /// Slot instrument does not expose the referenced port letter.
    PortNotExposed,
    /// Slot instrument is not available on the platform.
    UnsupportedInstrument,
    /// Source is not a signal producer, or destination is not a consumer.
    DirectionMismatch,
    /// Destination is already driven by an earlier connection.
    DuplicateDestination,
    /// Source and destination are the same port.
    SelfLoop,
}

impl ErrorKind {
    /// Whether this error means a referenced port does not exist.
    pub fn is_existence(self) -> bool {
        matches!(
            self,
            ErrorKind::ChannelOutOfRange
                | ErrorKind::SlotOutOfRange
                | ErrorKind::SlotNotConfigured
                | ErrorKind::PortNotExposed
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Syntax => "syntax",
            ErrorKind::ChannelOutOfRange => "channel_out_of_range",
            ErrorKind::SlotOutOfRange => "slot_out_of_range",
            ErrorKind::SlotNotConfigured => "slot_not_configured",
            ErrorKind::PortNotExposed => "port_not_exposed",
            ErrorKind::UnsupportedInstrument => "unsupported_instrument",
            ErrorKind::DirectionMismatch => "direction_mismatch",
            ErrorKind::DuplicateDestination => "duplicate_destination",
            ErrorKind::SelfLoop => "self_loop",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which end of a connection an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionField {
    Source,
    Destination,
}

impl ConnectionField {
    pub fn as_str(self) -> &'static str {
        match self {
            ConnectionField::Source => "source",
            ConnectionField::Destination => "destination",
        }
    }
}

/// A structured routing validation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Position of the offending connection; `None` for slot-level errors.
    pub connection_index: Option<usize>,
    pub field: Option<ConnectionField>,
    pub kind: ErrorKind,
    pub message: String,
}

impl ValidationError {
    fn at(index: usize, field: Option<ConnectionField>, kind: ErrorKind, message: String) -> Self {
        Self {
            connection_index: Some(index),
            field,
            kind,
            message,
        }
    }

    fn global(kind: ErrorKind, message: String) -> Self {
        Self {
            connection_index: None,
            field: None,
            kind,
            message,
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.connection_index, self.field) {
            (Some(i), Some(field)) => write!(f, "connection {i} {}: ", field.as_str())?,
            (Some(i), None) => write!(f, "connection {i}: ")?,
            _ => {}
        }
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

/// Concrete ports seen in a routing list, addressed by index.
#[derive(Debug, Default)]
struct PortArena {
    ids: Vec<PortId>,
    lookup: HashMap<PortId, usize>,
}

impl PortArena {
    fn intern(&mut self, id: PortId) -> usize {
        if let Some(&node) = self.lookup.get(&id) {
            return node;
        }
        let node = self.ids.len();
        self.ids.push(id);
        self.lookup.insert(id, node);
        node
    }

    fn len(&self) -> usize {
        self.ids.len()
    }
}

/// One parsed end of a connection.
#[derive(Debug, Clone, Copy)]
struct Endpoint {
    address: PortAddress,
    node: usize,
}

/// Validates routing against a platform and a slot assignment.
pub struct RoutingValidator<'a> {
    platform: &'a PlatformSpec,
    slots: &'a BTreeMap<u32, SlotConfig>,
}

impl<'a> RoutingValidator<'a> {
    pub fn new(platform: &'a PlatformSpec, slots: &'a BTreeMap<u32, SlotConfig>) -> Self {
        Self { platform, slots }
    }

    /// Validate `routing`; an empty result means the routing is valid.
    ///
    /// Errors are ordered by connection position, then slot-level errors by
    /// slot index.
    pub fn validate(&self, routing: &[MokuConnection]) -> Vec<ValidationError> {
        tracing::debug!(
            platform = %self.platform.name,
            slots = self.slots.len(),
            connections = routing.len(),
            "validating routing"
        );

        let mut arena = PortArena::default();
        let parsed: Vec<_> = routing
            .iter()
            .map(|conn| {
                (
                    parse_endpoint(conn.source(), &mut arena),
                    parse_endpoint(conn.destination(), &mut arena),
                )
            })
            .collect();

        let mut errors = Vec::new();
        let mut driver: Vec<Option<usize>> = vec![None; arena.len()];

        for (index, (conn, (source, destination))) in routing.iter().zip(&parsed).enumerate() {
            let ends = [
                (ConnectionField::Source, conn.source(), source),
                (ConnectionField::Destination, conn.destination(), destination),
            ];

            for (field, text, endpoint) in &ends {
                if let Err(message) = endpoint {
                    errors.push(ValidationError::at(
                        index,
                        Some(*field),
                        ErrorKind::Syntax,
                        format!("'{text}': {message}"),
                    ));
                }
            }

            for (field, _, endpoint) in &ends {
                let Ok(ep) = endpoint else { continue };
                if let Err((kind, message)) = self.check_exists(&ep.address) {
                    errors.push(ValidationError::at(index, Some(*field), kind, message));
                }
            }

            for (field, _, endpoint) in &ends {
                let Ok(ep) = endpoint else { continue };
                let expected = match field {
                    ConnectionField::Source => PortRole::Source,
                    ConnectionField::Destination => PortRole::Sink,
                };
                if ep.address.role() != expected {
                    errors.push(ValidationError::at(
                        index,
                        Some(*field),
                        ErrorKind::DirectionMismatch,
                        format!(
                            "{} is a {} and cannot be used as a {}",
                            ep.address,
                            ep.address.kind(),
                            expected
                        ),
                    ));
                }
            }

            // Fan-in is lexical: a sink that does not exist still has one driver.
            if let Ok(dest) = destination {
                if dest.address.role() == PortRole::Sink {
                    match driver[dest.node] {
                        Some(first) => errors.push(ValidationError::at(
                            index,
                            Some(ConnectionField::Destination),
                            ErrorKind::DuplicateDestination,
                            format!(
                                "{} is already driven by connection {first}",
                                conn.destination()
                            ),
                        )),
                        None => driver[dest.node] = Some(index),
                    }
                }
            }

            if let (Ok(src), Ok(dest)) = (source, destination) {
                if src.node == dest.node {
                    errors.push(ValidationError::at(
                        index,
                        None,
                        ErrorKind::SelfLoop,
                        format!("{} is connected to itself", conn.source()),
                    ));
                }
            }
        }

        errors.extend(self.slot_errors());

        tracing::debug!(errors = errors.len(), "routing validation finished");
        errors
    }

    fn check_exists(&self, address: &PortAddress) -> Result<(), (ErrorKind, String)> {
        let platform = self.platform;
        match *address {
            PortAddress::PhysicalInput { channel, .. } => {
                if channel > platform.analog_input_count {
                    return Err((
                        ErrorKind::ChannelOutOfRange,
                        format!(
                            "{address}: {} has {} analog input(s)",
                            platform.name, platform.analog_input_count
                        ),
                    ));
                }
            }
            PortAddress::PhysicalOutput { channel, .. } => {
                if channel > platform.analog_output_count {
                    return Err((
                        ErrorKind::ChannelOutOfRange,
                        format!(
                            "{address}: {} has {} analog output(s)",
                            platform.name, platform.analog_output_count
                        ),
                    ));
                }
            }
            PortAddress::SlotInput { slot, suffix } | PortAddress::SlotOutput { slot, suffix } => {
                if !platform.has_slot(slot) {
                    return Err((
                        ErrorKind::SlotOutOfRange,
                        format!(
                            "{address}: slot {slot} out of range for {} (1-{})",
                            platform.name, platform.slot_count
                        ),
                    ));
                }
                let Some(config) = self.slots.get(&slot) else {
                    return Err((
                        ErrorKind::SlotNotConfigured,
                        format!("{address}: slot {slot} has no instrument"),
                    ));
                };
                let instrument = config.instrument();
                let sink = address.role() == PortRole::Sink;
                let on_platform = platform.instrument_ports(instrument).is_some_and(|ports| {
                    if sink {
                        ports.exposes_input(suffix)
                    } else {
                        ports.exposes_output(suffix)
                    }
                });
                // A packaged design may use fewer wrapper ports than the platform offers.
                let declared = config.wrapper_ports().map_or(true, |w| {
                    if sink {
                        w.exposes_input(suffix)
                    } else {
                        w.exposes_output(suffix)
                    }
                });
                let exposed = on_platform && declared;
                if !exposed {
                    return Err((
                        ErrorKind::PortNotExposed,
                        format!("{address}: {instrument} in slot {slot} has no such port"),
                    ));
                }
            }
        }
        Ok(())
    }

    fn slot_errors(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        for (&slot, config) in self.slots {
            if !self.platform.has_slot(slot) {
                errors.push(ValidationError::global(
                    ErrorKind::SlotOutOfRange,
                    format!(
                        "slot {slot} out of range for {} (1-{})",
                        self.platform.name, self.platform.slot_count
                    ),
                ));
            }
            if !self.platform.supports(config.instrument()) {
                errors.push(ValidationError::global(
                    ErrorKind::UnsupportedInstrument,
                    format!(
                        "slot {slot}: {} is not available on {}",
                        config.instrument(),
                        self.platform.name
                    ),
                ));
            }
        }
        errors
    }
}

fn parse_endpoint(text: &str, arena: &mut PortArena) -> Result<Endpoint, String> {
    let address = PortAddress::parse(text).map_err(|e| e.to_string())?;
    Ok(Endpoint {
        address,
        node: arena.intern(address.id()),
    })
}

/// Validate `routing` for `platform` with the given slot assignment.
pub fn validate(
    platform: &PlatformSpec,
    slots: &BTreeMap<u32, SlotConfig>,
    routing: &[MokuConnection],
) -> Vec<ValidationError> {
    RoutingValidator::new(platform, slots).validate(routing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use moku_targets::{InstrumentKind, PlatformId};

    fn go_slots() -> BTreeMap<u32, SlotConfig> {
        let mut slots = BTreeMap::new();
        slots.insert(1, SlotConfig::cloud_compile("seq.tar", []).unwrap());
        slots.insert(2, SlotConfig::new(InstrumentKind::Oscilloscope).unwrap());
        slots
    }

    fn conns(pairs: &[(&str, &str)]) -> Vec<MokuConnection> {
        pairs
            .iter()
            .map(|(s, d)| MokuConnection::new(s, d))
            .collect()
    }

    fn kinds(errors: &[ValidationError]) -> Vec<ErrorKind> {
        errors.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn go_fan_out_scenario_is_valid() {
        let routing = conns(&[
            ("Input1", "Slot1InA"),
            ("Slot1OutA", "Output1"),
            ("Slot1OutA", "Slot2InA"),
        ]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn duplicate_destination_reported_with_direction_error() {
        let routing = conns(&[("Input1", "Slot1InA"), ("Output1", "Slot1InA")]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);

        let dup: Vec<_> = errors
            .iter()
            .filter(|e| e.kind == ErrorKind::DuplicateDestination)
            .collect();
        assert_eq!(dup.len(), 1);
        assert_eq!(dup[0].connection_index, Some(1));
        assert_eq!(dup[0].field, Some(ConnectionField::Destination));
        assert!(dup[0].message.contains("Slot1InA"));

        assert!(errors.iter().any(|e| e.kind == ErrorKind::DirectionMismatch
            && e.field == Some(ConnectionField::Source)
            && e.connection_index == Some(1)));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn three_writers_give_two_duplicates() {
        let routing = conns(&[
            ("Input1", "Output1"),
            ("Input2", "Output1"),
            ("Slot1OutA", "Output1"),
        ]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::DuplicateDestination, ErrorKind::DuplicateDestination]
        );
        assert!(errors[1].message.contains("connection 0"));
    }

    #[test]
    fn fan_in_checked_on_missing_destinations() {
        let mut slots = BTreeMap::new();
        slots.insert(1, SlotConfig::new(InstrumentKind::Oscilloscope).unwrap());

        let routing = conns(&[("Input1", "Output3"), ("Input2", "Output3")]);
        let errors = validate(PlatformId::Go.spec(), &slots, &routing);
        assert_eq!(
            kinds(&errors),
            vec![
                ErrorKind::ChannelOutOfRange,
                ErrorKind::ChannelOutOfRange,
                ErrorKind::DuplicateDestination,
            ]
        );
        assert_eq!(errors[2].connection_index, Some(1));

        let routing = conns(&[("Input1", "Slot2InA"), ("Input2", "Slot2InA")]);
        let errors = validate(PlatformId::Go.spec(), &slots, &routing);
        assert_eq!(
            kinds(&errors),
            vec![
                ErrorKind::SlotNotConfigured,
                ErrorKind::SlotNotConfigured,
                ErrorKind::DuplicateDestination,
            ]
        );
    }

    #[test]
    fn slot_input_to_physical_output_is_direction_mismatch() {
        let routing = conns(&[("Slot2InA", "Output1")]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert_eq!(kinds(&errors), vec![ErrorKind::DirectionMismatch]);
        assert_eq!(errors[0].field, Some(ConnectionField::Source));
    }

    #[test]
    fn both_ends_wrong_direction() {
        let routing = conns(&[("Output1", "Input1")]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::DirectionMismatch, ErrorKind::DirectionMismatch]
        );
    }

    #[test]
    fn syntax_errors_per_string() {
        let routing = conns(&[("Input1", "Slot1InA"), ("Inptu1", "slot1ina")]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert_eq!(kinds(&errors), vec![ErrorKind::Syntax, ErrorKind::Syntax]);
        assert!(errors.iter().all(|e| e.connection_index == Some(1)));
        assert_eq!(errors[0].field, Some(ConnectionField::Source));
        assert_eq!(errors[1].field, Some(ConnectionField::Destination));
    }

    #[test]
    fn empty_port_is_a_syntax_error() {
        let routing = conns(&[("   ", "Output1")]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert_eq!(kinds(&errors), vec![ErrorKind::Syntax]);
    }

    #[test]
    fn physical_channel_bounds_follow_platform() {
        let mut slots = BTreeMap::new();
        slots.insert(1, SlotConfig::new(InstrumentKind::Oscilloscope).unwrap());
        let routing = conns(&[("IN8", "Slot1InA")]);

        let delta = validate(PlatformId::Delta.spec(), &slots, &routing);
        assert!(delta.is_empty(), "{delta:?}");

        let go = validate(PlatformId::Go.spec(), &slots, &routing);
        assert_eq!(kinds(&go), vec![ErrorKind::ChannelOutOfRange]);
        assert!(go[0].kind.is_existence());
    }

    #[test]
    fn output_channel_checked_against_output_count() {
        let mut platform = PlatformSpec::moku_go();
        platform.analog_input_count = 4;
        let routing = conns(&[("Input3", "Output3")]);
        let errors = validate(&platform, &go_slots(), &routing);
        assert_eq!(kinds(&errors), vec![ErrorKind::ChannelOutOfRange]);
        assert_eq!(errors[0].field, Some(ConnectionField::Destination));
    }

    #[test]
    fn slot_out_of_range_and_unconfigured() {
        let mut slots = BTreeMap::new();
        slots.insert(1, SlotConfig::new(InstrumentKind::Oscilloscope).unwrap());
        let routing = conns(&[("Input1", "Slot3InA"), ("Input2", "Slot2InA")]);
        let errors = validate(PlatformId::Go.spec(), &slots, &routing);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::SlotOutOfRange, ErrorKind::SlotNotConfigured]
        );
    }

    #[test]
    fn instrument_port_exposure() {
        // Oscilloscope has no outputs; suffix C does not exist on Go.
        let routing = conns(&[("Slot2OutA", "Output1"), ("Input1", "Slot1InC")]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::PortNotExposed, ErrorKind::PortNotExposed]
        );
        assert!(errors[0].message.contains("Oscilloscope"));
    }

    #[test]
    fn self_loop_detected_across_spellings() {
        let mut slots = BTreeMap::new();
        slots.insert(1, SlotConfig::new(InstrumentKind::Oscilloscope).unwrap());
        let routing = conns(&[("Input1", "IN1")]);
        let errors = validate(PlatformId::Go.spec(), &slots, &routing);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::DirectionMismatch, ErrorKind::SelfLoop]
        );
        assert_eq!(errors[1].field, None);
    }

    #[test]
    fn feedback_cycles_are_accepted() {
        let mut slots = BTreeMap::new();
        slots.insert(1, SlotConfig::cloud_compile("a.tar", []).unwrap());
        slots.insert(2, SlotConfig::new(InstrumentKind::PidController).unwrap());
        let routing = conns(&[
            ("Slot1OutA", "Slot2InA"),
            ("Slot2OutA", "Slot1InA"),
            ("Slot1OutB", "Slot1InB"),
        ]);
        let errors = validate(PlatformId::Go.spec(), &slots, &routing);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn slot_level_errors_have_no_connection() {
        let mut slots = BTreeMap::new();
        slots.insert(1, SlotConfig::new(InstrumentKind::Oscilloscope).unwrap());
        slots.insert(5, SlotConfig::new(InstrumentKind::Oscilloscope).unwrap());
        let mut platform = PlatformSpec::moku_go();
        platform
            .instrument_ports
            .retain(|p| p.instrument != InstrumentKind::Oscilloscope);

        let errors = validate(&platform, &slots, &conns(&[("Input1", "Slot1InA")]));
        assert_eq!(
            kinds(&errors),
            vec![
                ErrorKind::PortNotExposed,
                ErrorKind::UnsupportedInstrument,
                ErrorKind::SlotOutOfRange,
                ErrorKind::UnsupportedInstrument,
            ]
        );
        assert!(errors[1..].iter().all(|e| e.connection_index.is_none()));
    }

    #[test]
    fn errors_accumulate_in_connection_order() {
        let routing = conns(&[
            ("Slot9OutA", "Output1"),
            ("Input1", "Slot1InA"),
            ("Bogus", "Output2"),
        ]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        let indices: Vec<_> = errors.iter().map(|e| e.connection_index).collect();
        assert_eq!(indices, vec![Some(0), Some(2)]);
    }

    #[test]
    fn display_includes_position() {
        let routing = conns(&[("Input1", "Slot1InA"), ("Input2", "Slot1InA")]);
        let errors = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        let text = errors[0].to_string();
        assert!(text.starts_with("connection 1 destination: [duplicate_destination]"));
    }

    #[test]
    fn validation_is_deterministic() {
        let routing = conns(&[
            ("Output1", "Slot1InA"),
            ("Input1", "Slot1InA"),
            ("IN9", "Slot3InA"),
            ("Slot1InA", "Slot1InA"),
        ]);
        let first = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        let second = validate(PlatformId::Go.spec(), &go_slots(), &routing);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }
}
