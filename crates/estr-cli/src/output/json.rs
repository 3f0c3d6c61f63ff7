//! JSON output formatter
//!
//! Wraps a core result in a stable envelope: metadata, the success payload
//! or a `{kind, message}` error, and the warnings gathered on the way.

use estr_core::refactor::{ErrorKind, RefactorError, Refactoring};
use estr_core::semantic::Warning;
use serde::Serialize;

#[derive(Serialize)]
pub struct JsonOutput<'a, T: Serialize> {
    pub version: &'static str,
    pub metadata: JsonMetadata,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<&'a T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonError>,
    pub warnings: &'a [Warning],
}

#[derive(Serialize)]
pub struct JsonMetadata {
    pub estr_version: &'static str,
    pub file: String,
}

#[derive(Serialize)]
pub struct JsonError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<&RefactorError> for JsonError {
    fn from(error: &RefactorError) -> Self {
        Self {
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

pub struct JsonFormatter {
    file: String,
}

impl JsonFormatter {
    pub fn new(file: impl Into<String>) -> Self {
        Self { file: file.into() }
    }

    pub fn format<T: Serialize>(&self, refactoring: &Refactoring<T>) -> String {
        let output = JsonOutput {
            version: "1.0",
            metadata: JsonMetadata {
                estr_version: env!("CARGO_PKG_VERSION"),
                file: self.file.clone(),
            },
            ok: refactoring.is_ok(),
            result: refactoring.outcome.as_ref().ok(),
            error: refactoring.outcome.as_ref().err().map(JsonError::from),
            warnings: &refactoring.warnings,
        };
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use estr_core::syntax::Position;

    #[test]
    fn success_carries_result_and_warnings() {
        let refactoring = Refactoring::ok(
            "var b;".to_string(),
            vec![Warning::new("hoisting var declaration over catch of same name: e")],
        );

        let output = JsonFormatter::new("a.js").format(&refactoring);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["ok"], true);
        assert_eq!(value["result"], "var b;");
        assert_eq!(value["metadata"]["file"], "a.js");
        assert!(
            value["warnings"][0]["message"]
                .as_str()
                .unwrap()
                .starts_with("hoisting")
        );
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_carries_kind_and_message() {
        let refactoring: Refactoring<String> = Refactoring::err(
            RefactorError::HoistConflict {
                name: "e".to_string(),
                position: Position::new(1, 28),
            },
            Vec::new(),
        );

        let output = JsonFormatter::new("a.js").format(&refactoring);
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();

        assert_eq!(value["ok"], false);
        assert_eq!(value["error"]["kind"], "HoistConflict");
        assert!(
            value["error"]["message"]
                .as_str()
                .unwrap()
                .contains("hoisted over catch")
        );
        assert!(value.get("result").is_none());
    }
}
