use serde::Serialize;

use super::StageObject;

/// Backend label for the terminal sub-event that dispatches the
/// reimbursement email.
pub const EMAIL_SENT_LABEL: &str = "Send Email";

/// Backend label for the terminal sub-event that writes the expense ledger.
pub const EXPENSE_UPDATE_LABEL: &str = "Update Expenses";

/// Stage carrying the uploaded image and the submitting employee
pub const INTAKE_STAGE: u32 = 1;
/// Stage carrying the receipt classification
pub const CLASSIFICATION_STAGE: u32 = 2;
/// Stage whose sequence payload carries the employee/email/expense outcomes
pub const TERMINAL_STAGE: u32 = 6;

/// The normalized, display-ready view of one submitted receipt's full
/// processing history. Constructed once per raw record; carries no reference
/// back to the raw collection.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSummary {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_type: Option<String>,
    /// Flattened stage entries, sorted ascending by (stage, sub-stage)
    pub stages: Vec<StageEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub employee_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_expenses: Option<f64>,
    pub email_sent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_subject: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_update: Option<ExpenseUpdate>,
    /// Highest stage number seen for this file, 0 when no stages exist
    pub current_stage: u32,
}

/// One flattened stage event in a file's history.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageEntry {
    pub stage_number: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_stage: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub details: StageDetails,
}

impl StageEntry {
    /// Flatten one raw stage object, using its own `stage`/`sub_stage`
    /// overrides when present and the key-derived number otherwise.
    pub fn from_object(object: &StageObject, key_stage: u32) -> Self {
        let stage_number = object.stage.unwrap_or(key_stage);
        Self {
            stage_number,
            sub_stage: object.sub_stage,
            name: object.stage_name.clone(),
            details: StageDetails::classify(stage_number, object),
        }
    }

    /// Sort key: entries without a sub-stage sort as sub-stage 0.
    pub fn order_key(&self) -> (u32, u32) {
        (self.stage_number, self.sub_stage.unwrap_or(0))
    }
}

/// Stage payload classified into the known stage kinds, so each renderer
/// works from a concrete variant instead of probing an open mapping.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StageDetails {
    Intake {
        #[serde(skip_serializing_if = "Option::is_none")]
        employee_id: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        img_base64: Option<String>,
    },
    Classification {
        #[serde(skip_serializing_if = "Option::is_none")]
        receipt_type: Option<String>,
    },
    Extraction {
        #[serde(skip_serializing_if = "Option::is_none")]
        extracted_content: Option<String>,
    },
    Prompt {
        #[serde(skip_serializing_if = "Option::is_none")]
        system_prompt: Option<String>,
    },
    Action {
        #[serde(skip_serializing_if = "Option::is_none")]
        reasoning: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        subject: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
    },
    Other,
}

impl StageDetails {
    /// Map a stage number onto its known payload kind. Numbers 2, 3, 5 and 6
    /// carry distinct display templates; everything else renders generically.
    pub fn classify(stage_number: u32, object: &StageObject) -> Self {
        match stage_number {
            1 => StageDetails::Intake {
                employee_id: object.employee_id.clone(),
                img_base64: object.img_base64.clone(),
            },
            2 => StageDetails::Classification {
                receipt_type: object.receipt_type.clone(),
            },
            3 => StageDetails::Extraction {
                extracted_content: object.extracted_content.clone(),
            },
            5 => StageDetails::Prompt {
                system_prompt: object.system_prompt.clone(),
            },
            6 => StageDetails::Action {
                reasoning: object.reasoning.clone(),
                tool: object.tool.clone(),
                subject: object.subject.clone(),
                content: object.content.clone(),
            },
            _ => StageDetails::Other,
        }
    }
}

/// Ledger movement recorded by the terminal expense-update sub-event.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ExpenseUpdate {
    pub from: f64,
    pub to: f64,
    /// Always `to - from`, negative when the ledger shrank
    pub difference: f64,
}

impl ExpenseUpdate {
    pub fn new(from: f64, to: f64) -> Self {
        Self {
            from,
            to,
            difference: to - from,
        }
    }
}

/// Display label for a stage number in the six-step processing ladder.
pub fn stage_label(stage_number: u32) -> &'static str {
    match stage_number {
        1 => "Receipt Upload",
        2 => "Classification",
        3 => "Text Extraction",
        4 => "Reasoning",
        5 => "Prompt Assembly",
        6 => "Completion",
        _ => "Unknown Stage",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_uses_key_stage_when_no_override() {
        let object = StageObject {
            receipt_type: Some("TRAVEL".to_string()),
            ..Default::default()
        };

        let entry = StageEntry::from_object(&object, 2);

        assert_eq!(entry.stage_number, 2);
        assert_eq!(entry.sub_stage, None);
        assert!(matches!(
            entry.details,
            StageDetails::Classification { ref receipt_type } if receipt_type.as_deref() == Some("TRAVEL")
        ));
    }

    #[test]
    fn test_entry_stage_override_wins() {
        let object = StageObject {
            stage: Some(6),
            sub_stage: Some(2),
            stage_name: Some(EXPENSE_UPDATE_LABEL.to_string()),
            ..Default::default()
        };

        let entry = StageEntry::from_object(&object, 4);

        assert_eq!(entry.stage_number, 6);
        assert_eq!(entry.sub_stage, Some(2));
        assert_eq!(entry.name.as_deref(), Some(EXPENSE_UPDATE_LABEL));
        assert!(matches!(entry.details, StageDetails::Action { .. }));
    }

    #[test]
    fn test_missing_sub_stage_orders_as_zero() {
        let object = StageObject::default();
        let entry = StageEntry::from_object(&object, 3);

        assert_eq!(entry.order_key(), (3, 0));
    }

    #[test]
    fn test_unrecognized_stage_classifies_as_other() {
        let object = StageObject::default();

        assert!(matches!(
            StageDetails::classify(9, &object),
            StageDetails::Other
        ));
    }

    #[test]
    fn test_expense_difference_can_be_negative() {
        let update = ExpenseUpdate::new(250.0, 100.0);

        assert_eq!(update.difference, -150.0);
    }

    #[test]
    fn test_stage_labels() {
        assert_eq!(stage_label(1), "Receipt Upload");
        assert_eq!(stage_label(6), "Completion");
        assert_eq!(stage_label(42), "Unknown Stage");
    }
}
