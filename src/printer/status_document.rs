use serde_json::Value;

pub const UNAVAILABLE: &str = "Unavailable";

/// Side-channel status document published by the relay service.
///
/// Stored verbatim; only point lookups are performed on it and its schema is
/// owned by the relay.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusDocument(Value);

impl StatusDocument {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// `services.<name>.state`
    pub fn service_state(&self, name: &str) -> String {
        self.0
            .pointer(&format!("/services/{}/state", escape(name)))
            .map(value_text)
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    }

    /// `services.<name>.online`
    pub fn service_online(&self, name: &str) -> bool {
        self.0
            .pointer(&format!("/services/{}/online", escape(name)))
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    /// `version.<key>`
    pub fn version_value(&self, key: &str) -> String {
        self.0
            .pointer(&format!("/version/{}", escape(key)))
            .map(value_text)
            .unwrap_or_else(|| UNAVAILABLE.to_string())
    }
}

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => UNAVAILABLE.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document() -> StatusDocument {
        StatusDocument::new(json!({
            "services": {
                "mqtt": {"state": "Running", "online": true},
                "video": {"state": "Stopped", "online": false},
            },
            "version": {"api": "0.9", "build": 412},
        }))
    }

    #[test]
    fn test_service_lookups() {
        let doc = document();
        assert_eq!(doc.service_state("mqtt"), "Running");
        assert!(doc.service_online("mqtt"));
        assert!(!doc.service_online("video"));
        assert_eq!(doc.service_state("pppp"), UNAVAILABLE);
        assert!(!doc.service_online("pppp"));
    }

    #[test]
    fn test_version_lookups() {
        let doc = document();
        assert_eq!(doc.version_value("api"), "0.9");
        assert_eq!(doc.version_value("build"), "412");
        assert_eq!(doc.version_value("missing"), UNAVAILABLE);
    }

    #[test]
    fn test_empty_document() {
        let doc = StatusDocument::default();
        assert_eq!(doc.service_state("mqtt"), UNAVAILABLE);
        assert_eq!(doc.version_value("api"), UNAVAILABLE);
    }
}
