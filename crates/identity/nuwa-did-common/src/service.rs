//! https://www.w3.org/TR/cid-1.0/#services

use std::fmt;

use serde::{
    Deserialize, Deserializer, Serialize, Serializer,
    de::{MapAccess, Visitor},
    ser::SerializeMap,
};
use serde_json::Value;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Service {
    pub id: String,

    #[serde(rename = "type")]
    pub type_: String,

    pub service_endpoint: String,

    /// Additional properties, flattened into the service object on the wire
    #[serde(flatten)]
    pub properties: ServiceProperties,
}

impl Service {
    pub fn new(
        id: impl Into<String>,
        type_: impl Into<String>,
        service_endpoint: impl Into<String>,
    ) -> Self {
        Service {
            id: id.into(),
            type_: type_.into(),
            service_endpoint: service_endpoint.into(),
            properties: ServiceProperties::default(),
        }
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn fragment(&self) -> Option<&str> {
        self.id.split_once('#').map(|(_, fragment)| fragment)
    }
}

/// Ordered key/value list of extra service properties
///
/// Insertion order is preserved through serialization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceProperties(Vec<(String, Value)>);

impl ServiceProperties {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Inserts a property, replacing the value in place if the key exists
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        let index = self.0.iter().position(|(k, _)| k == key)?;
        Some(self.0.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for ServiceProperties {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut properties = ServiceProperties::default();
        for (k, v) in iter {
            properties.insert(k, v);
        }
        properties
    }
}

impl Serialize for ServiceProperties {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for ServiceProperties {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PropertiesVisitor;

        impl<'de> Visitor<'de> for PropertiesVisitor {
            type Value = ServiceProperties;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of service properties")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut properties = ServiceProperties::default();
                while let Some((key, value)) = access.next_entry::<String, Value>()? {
                    properties.insert(key, value);
                }
                Ok(properties)
            }
        }

        deserializer.deserialize_map(PropertiesVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn properties_are_flattened_in_order() {
        let service = Service::new(
            "did:web:example.com#custodian",
            "CadopCustodianService",
            "https://custodian.example.com",
        )
        .with_property("custodianPublicKey", "z6Mk...")
        .with_property("custodianServiceVMType", "Ed25519VerificationKey2020")
        .with_property("fees", json!({"registration": 0}));

        let serialized = serde_json::to_string(&service).unwrap();
        let public_key = serialized.find("custodianPublicKey").unwrap();
        let vm_type = serialized.find("custodianServiceVMType").unwrap();
        let fees = serialized.find("fees").unwrap();
        assert!(public_key < vm_type && vm_type < fees);

        let parsed: Service = serde_json::from_str(&serialized).unwrap();
        assert_eq!(parsed.properties.len(), 3);
        assert_eq!(parsed.properties.get("fees"), Some(&json!({"registration": 0})));
        assert_eq!(parsed.fragment(), Some("custodian"));
    }

    #[test]
    fn insert_replaces_in_place() {
        let mut properties: ServiceProperties = [("a", 1), ("b", 2)].into_iter().collect();
        properties.insert("a", 3);
        assert_eq!(properties.keys().collect::<Vec<_>>(), vec!["a", "b"]);
        assert_eq!(properties.get("a"), Some(&json!(3)));
        assert_eq!(properties.remove("b"), Some(json!(2)));
        assert_eq!(properties.len(), 1);
    }
}
