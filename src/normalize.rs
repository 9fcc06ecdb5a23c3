use tracing::warn;

use crate::models::{
    EmployeeData, ExpenseUpdate, FileRecord, FileSummary, RawCollection, StageEntry, StageObject,
    StagePayload, CLASSIFICATION_STAGE, EMAIL_SENT_LABEL, EXPENSE_UPDATE_LABEL, INTAKE_STAGE,
    TERMINAL_STAGE,
};

/// Normalize the backend's raw per-file records into display-ready summaries.
///
/// For each file, in the collection's own iteration order:
/// 1. Flatten every stage payload: one entry per array element, one entry per
///    single object, stage/sub-stage overrides taken from the element itself.
/// 2. Lift intake (stage 1) and classification (stage 2) fields.
/// 3. Enrich identity/email/expense fields from the raw terminal-stage
///    payload (first element matching each predicate, not sorted order).
/// 4. Sort the flattened entries by (stage, sub-stage), stably.
///
/// Per-file oddities never abort the collection; malformed stage keys and
/// unparseable `employee_data` are logged and skipped.
pub fn normalize(raw: &RawCollection) -> Vec<FileSummary> {
    raw.iter()
        .map(|(id, record)| summarize_file(id, record))
        .collect()
}

/// Build one FileSummary from one file's raw stage mapping.
fn summarize_file(id: &str, record: &FileRecord) -> FileSummary {
    let mut stages: Vec<StageEntry> = Vec::new();

    for (key, payload) in record {
        let Some(key_stage) = parse_stage_key(key) else {
            warn!(file = %id, key = %key, "skipping stage key with non-numeric suffix");
            continue;
        };
        for object in payload.entries() {
            stages.push(StageEntry::from_object(object, key_stage));
        }
    }

    // Max over the flattened set; sorting below does not participate
    let current_stage = stages.iter().map(|e| e.stage_number).max().unwrap_or(0);
    stages.sort_by_key(StageEntry::order_key);

    let intake = first_entry(record, INTAKE_STAGE);
    let classification = first_entry(record, CLASSIFICATION_STAGE);
    let terminal = stage_payload(record, TERMINAL_STAGE)
        .map(StagePayload::entries)
        .unwrap_or(&[]);

    let employee = decode_employee_data(id, terminal);
    let email = terminal
        .iter()
        .find(|o| o.stage_name.as_deref() == Some(EMAIL_SENT_LABEL));
    let expense_update = terminal
        .iter()
        .find(|o| o.stage_name.as_deref() == Some(EXPENSE_UPDATE_LABEL))
        .and_then(|o| build_expense_update(id, o));

    FileSummary {
        id: id.to_string(),
        employee_id: intake.and_then(|o| o.employee_id.clone()),
        image_base64: intake.and_then(|o| o.img_base64.clone()),
        receipt_type: classification.and_then(|o| o.receipt_type.clone()),
        stages,
        employee_name: employee.as_ref().and_then(|d| d.name.clone()),
        employee_email: employee.as_ref().and_then(|d| d.email.clone()),
        employee_level: employee.as_ref().and_then(|d| d.level.clone()),
        current_expenses: employee.as_ref().and_then(|d| d.current_expenses),
        email_sent: email.is_some(),
        email_subject: email.and_then(|o| o.subject.clone()),
        email_content: email.and_then(|o| o.content.clone()),
        expense_update,
        current_stage,
    }
}

/// Parse the numeric suffix of a `"stage:<n>"` key: split on `:`, take the
/// second segment. Returns None for keys without a parseable suffix.
fn parse_stage_key(key: &str) -> Option<u32> {
    key.split(':').nth(1)?.parse().ok()
}

/// Find the payload whose key-derived number matches, in record order.
fn stage_payload(record: &FileRecord, stage_number: u32) -> Option<&StagePayload> {
    record
        .iter()
        .find_map(|(key, payload)| (parse_stage_key(key) == Some(stage_number)).then_some(payload))
}

/// First raw object under the given key-derived stage number.
fn first_entry(record: &FileRecord, stage_number: u32) -> Option<&StageObject> {
    stage_payload(record, stage_number).and_then(|p| p.entries().first())
}

/// Decode the first parseable `employee_data` string among the terminal
/// sub-events. Malformed payloads are logged and skipped.
fn decode_employee_data(id: &str, terminal: &[StageObject]) -> Option<EmployeeData> {
    terminal
        .iter()
        .filter_map(|object| {
            let raw = object.employee_data.as_deref()?;
            match serde_json::from_str(raw) {
                Ok(data) => Some(data),
                Err(err) => {
                    warn!(file = %id, error = %err, "unparseable employee_data payload");
                    None
                }
            }
        })
        .next()
}

/// The expense update needs both endpoints numeric; anything else is logged
/// and leaves the field unset.
fn build_expense_update(id: &str, object: &StageObject) -> Option<ExpenseUpdate> {
    match (object.from_amount(), object.to_amount()) {
        (Some(from), Some(to)) => Some(ExpenseUpdate::new(from, to)),
        _ => {
            warn!(file = %id, "expense update sub-event without numeric from/to");
            None
        }
    }
}
