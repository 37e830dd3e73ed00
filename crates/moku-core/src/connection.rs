//! Routing matrix connections.
//!
//! A connection is a directed edge between two port address strings, in the
//! `{source, destination}` form used by the vendor library's
//! `set_connections()` call. Port strings are not parsed here; the routing
//! validator reports malformed ones.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A single signal connection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MokuConnection {
    #[serde(deserialize_with = "trimmed")]
    source: String,
    #[serde(deserialize_with = "trimmed")]
    destination: String,
}

fn trimmed<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let s = String::deserialize(deserializer)?;
    Ok(s.trim().to_string())
}

impl MokuConnection {
    /// Create a connection; surrounding whitespace is stripped from both ports.
    pub fn new(source: impl AsRef<str>, destination: impl AsRef<str>) -> Self {
        Self {
            source: source.as_ref().trim().to_string(),
            destination: destination.as_ref().trim().to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// `{"source": ..., "destination": ...}`
    pub fn to_dict(&self) -> Value {
        let mut map = serde_json::Map::new();
        map.insert("source".into(), Value::String(self.source.clone()));
        map.insert("destination".into(), Value::String(self.destination.clone()));
        Value::Object(map)
    }

    pub fn from_dict(value: &Value) -> Result<Self, serde_json::Error> {
        Self::deserialize(value)
    }
}

/// Ordered list of connections. Order is preserved for diagnostics only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionList(Vec<MokuConnection>);

impl ConnectionList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, source: impl AsRef<str>, destination: impl AsRef<str>) {
        self.0.push(MokuConnection::new(source, destination));
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MokuConnection> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[MokuConnection] {
        &self.0
    }

    /// List of `{source, destination}` objects for the vendor API.
    pub fn to_dict_list(&self) -> Vec<Value> {
        self.0.iter().map(MokuConnection::to_dict).collect()
    }

    pub fn from_dict_list(values: &[Value]) -> Result<Self, serde_json::Error> {
        values.iter().map(MokuConnection::from_dict).collect()
    }
}

impl From<Vec<MokuConnection>> for ConnectionList {
    fn from(connections: Vec<MokuConnection>) -> Self {
        Self(connections)
    }
}

impl FromIterator<MokuConnection> for ConnectionList {
    fn from_iter<I: IntoIterator<Item = MokuConnection>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a ConnectionList {
    type Item = &'a MokuConnection;
    type IntoIter = std::slice::Iter<'a, MokuConnection>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ports_are_trimmed() {
        let conn = MokuConnection::new(" Input1 ", "Slot1InA\n");
        assert_eq!(conn.source(), "Input1");
        assert_eq!(conn.destination(), "Slot1InA");

        let conn = MokuConnection::from_dict(&json!({"source": " Slot1OutA", "destination": "Output1 "}))
            .unwrap();
        assert_eq!(conn, MokuConnection::new("Slot1OutA", "Output1"));
    }

    #[test]
    fn dict_form() {
        let conn = MokuConnection::new("Input1", "Slot1InA");
        assert_eq!(
            conn.to_dict(),
            json!({"source": "Input1", "destination": "Slot1InA"})
        );
    }

    #[test]
    fn from_dict_requires_both_fields() {
        assert!(MokuConnection::from_dict(&json!({"source": "Input1"})).is_err());
    }

    #[test]
    fn list_preserves_order() {
        let mut list = ConnectionList::new();
        list.add("Input1", "Slot1InA");
        list.add("Slot1OutA", "Output1");
        assert_eq!(list.len(), 2);

        let dicts = list.to_dict_list();
        assert_eq!(dicts[1]["source"], "Slot1OutA");

        let restored = ConnectionList::from_dict_list(&dicts).unwrap();
        assert_eq!(restored, list);
        let sources: Vec<_> = restored.iter().map(MokuConnection::source).collect();
        assert_eq!(sources, vec!["Input1", "Slot1OutA"]);
    }

    #[test]
    fn serializes_as_plain_array() {
        let list: ConnectionList = vec![MokuConnection::new("Input1", "Slot1InA")].into();
        assert_eq!(
            serde_json::to_value(&list).unwrap(),
            json!([{"source": "Input1", "destination": "Slot1InA"}])
        );
    }
}
