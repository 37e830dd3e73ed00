//! Structural export of a configuration and its content fingerprint.
//!
//! The export shape is:
//!
//! ```text
//! {
//!   "platform": "<platform name>",
//!   "slots": { "<index>": { "instrument", "bitstream"?, "control_registers"?, "settings"? } },
//!   "routing": [ { "source", "destination" } ],
//!   "metadata": { ... }
//! }
//! ```
//!
//! Export never validates routing, so an invalid configuration exports
//! faithfully.

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::config::MokuConfig;
use crate::slot::SlotConfig;

/// Project a configuration into the nested export structure.
pub fn to_dict(config: &MokuConfig) -> Value {
    let slots: Map<String, Value> = config
        .slots()
        .iter()
        .map(|(index, slot)| (index.to_string(), slot_to_dict(slot)))
        .collect();

    let mut root = Map::new();
    root.insert("platform".into(), Value::String(config.platform().name.clone()));
    root.insert("slots".into(), Value::Object(slots));
    root.insert("routing".into(), Value::Array(config.routing().to_dict_list()));
    root.insert(
        "metadata".into(),
        Value::Object(config.metadata().clone().into_iter().collect()),
    );
    Value::Object(root)
}

/// Export form of a single slot; absent optional fields are omitted.
pub fn slot_to_dict(slot: &SlotConfig) -> Value {
    let mut map = Map::new();
    map.insert("instrument".into(), Value::String(slot.instrument().name().into()));
    if let Some(bitstream) = slot.bitstream() {
        map.insert("bitstream".into(), Value::String(bitstream.into()));
    }
    if let Some(registers) = slot.control_registers() {
        let registers: Map<String, Value> = registers
            .iter()
            .map(|(index, value)| (index.to_string(), Value::from(value)))
            .collect();
        map.insert("control_registers".into(), Value::Object(registers));
    }
    let settings = slot.settings().to_map();
    if !settings.is_empty() {
        map.insert("settings".into(), Value::Object(settings.into_iter().collect()));
    }
    Value::Object(map)
}

/// SHA-256 of the compact JSON rendering of `value`, as lowercase hex.
///
/// Object keys serialize in sorted order, so equal exports hash equally.
pub fn fingerprint(value: &Value) -> String {
    let mut hasher = Sha256::new();
    hasher.update(value.to_string().as_bytes());
    hex_encode(&hasher.finalize())
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::MokuConnection;
    use crate::settings::{InstrumentSettings, WaveformGeneratorSettings};
    use moku_targets::{InstrumentKind, PlatformId};
    use serde_json::json;

    fn config(routing: Vec<MokuConnection>) -> MokuConfig {
        let wavegen = SlotConfig::new(InstrumentKind::WaveformGenerator)
            .unwrap()
            .with_settings(InstrumentSettings::WaveformGenerator(
                WaveformGeneratorSettings {
                    frequency: Some(1e3),
                    ..Default::default()
                },
            ))
            .unwrap();
        let slots = [
            (1, SlotConfig::cloud_compile("seq.tar", [(3, 7)]).unwrap()),
            (2, wavegen),
        ];
        let mut metadata = crate::config::Metadata::new();
        metadata.insert("version".into(), json!("2.1"));
        MokuConfig::new(PlatformId::Go.spec().clone(), slots, routing)
            .unwrap()
            .with_metadata(metadata)
    }

    #[test]
    fn export_shape() {
        let dict = config(vec![MokuConnection::new("Slot2OutA", "Slot1InA")]).to_dict();
        assert_eq!(
            dict,
            json!({
                "platform": "Moku:Go",
                "slots": {
                    "1": {
                        "instrument": "CloudCompile",
                        "bitstream": "seq.tar",
                        "control_registers": {"3": 7}
                    },
                    "2": {
                        "instrument": "WaveformGenerator",
                        "settings": {"frequency": 1000.0}
                    }
                },
                "routing": [{"source": "Slot2OutA", "destination": "Slot1InA"}],
                "metadata": {"version": "2.1"}
            })
        );
    }

    #[test]
    fn export_ignores_routing_validity() {
        let routing = vec![
            MokuConnection::new("Output1", "Input1"),
            MokuConnection::new("Slot7InZ", "garbage"),
        ];
        let config = config(routing);
        assert!(!config.validate_routing().is_empty());

        let dict = config.to_dict();
        assert_eq!(dict["routing"][1]["source"], "Slot7InZ");
        assert_eq!(dict["routing"][1]["destination"], "garbage");
        assert_eq!(dict["routing"].as_array().map(Vec::len), Some(2));
    }

    #[test]
    fn fingerprint_is_hex_sha256() {
        // SHA-256 of the two bytes "{}".
        assert_eq!(
            fingerprint(&json!({})),
            "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
        );
    }

    #[test]
    fn fingerprint_ignores_key_insertion_order() {
        let mut a = Map::new();
        a.insert("x".into(), json!(1));
        a.insert("y".into(), json!(2));
        let mut b = Map::new();
        b.insert("y".into(), json!(2));
        b.insert("x".into(), json!(1));
        assert_eq!(fingerprint(&Value::Object(a)), fingerprint(&Value::Object(b)));
    }
}
