use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw per-file records as returned by the processing backend: a mapping from
/// opaque file id to that file's stage mapping. `IndexMap` keeps backend
/// insertion order, which the dashboard list relies on.
pub type RawCollection = IndexMap<String, FileRecord>;

/// One file's stage mapping, keyed by `"stage:<n>"`. Keys are not guaranteed
/// contiguous, complete, or even well-formed.
pub type FileRecord = IndexMap<String, StagePayload>;

/// The value under a stage key: either a single stage object or an ordered
/// sequence of sub-stage objects.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StagePayload {
    Many(Vec<StageObject>),
    One(StageObject),
}

impl StagePayload {
    /// View the payload uniformly as a slice of stage objects.
    pub fn entries(&self) -> &[StageObject] {
        match self {
            StagePayload::Many(objects) => objects.as_slice(),
            StagePayload::One(object) => std::slice::from_ref(object),
        }
    }
}

/// A single stage object from the backend. Every field is stage-dependent and
/// optional; the backend populates only what the stage produced.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct StageObject {
    /// Overrides the key-derived stage number when present
    #[serde(default)]
    pub stage: Option<u32>,
    /// Tie-break within a stage
    #[serde(default)]
    pub sub_stage: Option<u32>,
    /// Human label for the stage event (e.g. "Send Email")
    #[serde(default)]
    pub stage_name: Option<String>,
    #[serde(default)]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub img_base64: Option<String>,
    #[serde(default)]
    pub receipt_type: Option<String>,
    #[serde(default)]
    pub extracted_content: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub reasoning: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
    /// JSON-encoded string carrying the employee ledger record
    #[serde(default)]
    pub employee_data: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    /// Expense-update start balance; the backend also reuses this slot for
    /// email addresses, so it stays an untyped value until coerced
    #[serde(default)]
    pub from: Option<serde_json::Value>,
    #[serde(default)]
    pub to: Option<serde_json::Value>,
}

impl StageObject {
    /// Numeric coercion for the `from`/`to` slots.
    pub fn from_amount(&self) -> Option<f64> {
        self.from.as_ref().and_then(serde_json::Value::as_f64)
    }

    pub fn to_amount(&self) -> Option<f64> {
        self.to.as_ref().and_then(serde_json::Value::as_f64)
    }
}

/// The decoded form of a stage object's `employee_data` string.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EmployeeData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub current_expenses: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_single_object() {
        let json = r#"{"employee_id": "E1", "img_base64": "abc"}"#;
        let payload: StagePayload = serde_json::from_str(json).unwrap();

        let entries = payload.entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].employee_id.as_deref(), Some("E1"));
        assert_eq!(entries[0].img_base64.as_deref(), Some("abc"));
    }

    #[test]
    fn test_payload_sequence() {
        let json = r#"[
            {"stage": 6, "sub_stage": 1, "stage_name": "Send Email"},
            {"stage": 6, "sub_stage": 2, "stage_name": "Update Expenses", "from": 100, "to": 142.5}
        ]"#;
        let payload: StagePayload = serde_json::from_str(json).unwrap();

        let entries = payload.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].sub_stage, Some(1));
        assert_eq!(entries[1].from_amount(), Some(100.0));
        assert_eq!(entries[1].to_amount(), Some(142.5));
    }

    #[test]
    fn test_non_numeric_from_to() {
        let json = r#"{"from": "hr@corp.example", "to": "emp@corp.example"}"#;
        let object: StageObject = serde_json::from_str(json).unwrap();

        assert_eq!(object.from_amount(), None);
        assert_eq!(object.to_amount(), None);
    }

    #[test]
    fn test_collection_preserves_file_order() {
        let json = r#"{
            "b": {"stage:1": {"employee_id": "E2"}},
            "a": {"stage:1": {"employee_id": "E1"}}
        }"#;
        let collection: RawCollection = serde_json::from_str(json).unwrap();

        let ids: Vec<&String> = collection.keys().collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_employee_data_decoding() {
        let json = r#"{"name": "Ada", "email": "ada@corp.example", "level": "L3", "current_expenses": 912.4}"#;
        let data: EmployeeData = serde_json::from_str(json).unwrap();

        assert_eq!(data.name.as_deref(), Some("Ada"));
        assert_eq!(data.level.as_deref(), Some("L3"));
        assert_eq!(data.current_expenses, Some(912.4));
    }
}
