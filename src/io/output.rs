use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{stage_label, FileSummary, StageDetails};

/// Machine-readable dashboard export
#[derive(Debug, Clone, Serialize)]
pub struct DashboardExport {
    /// When the export was generated
    pub generated_at: DateTime<Utc>,
    /// Normalized summaries in backend order
    pub files: Vec<FileSummary>,
}

impl DashboardExport {
    pub fn new(files: Vec<FileSummary>) -> Self {
        Self {
            generated_at: Utc::now(),
            files,
        }
    }

    /// Write to a JSON file
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create file: {:?}", path))?;
        serde_json::to_writer_pretty(file, self).context("Failed to write JSON")?;
        Ok(())
    }
}

/// Format the dashboard list view: one line per file in backend order.
pub fn format_file_list(summaries: &[FileSummary]) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipts ({})\n", summaries.len()));
    output.push_str("--------------------\n");

    for summary in summaries {
        let receipt_type = summary.receipt_type.as_deref().unwrap_or("-");
        let employee = summary
            .employee_name
            .as_deref()
            .or(summary.employee_id.as_deref())
            .unwrap_or("-");
        let email = if summary.email_sent { "sent" } else { "pending" };

        output.push_str(&format!(
            "{}  [{}/6 {}]  {}  {}  email: {}\n",
            summary.id,
            summary.current_stage,
            stage_label(summary.current_stage),
            receipt_type,
            employee,
            email
        ));
    }

    output
}

/// Format the detail view for one file, with the stage-specific templates
/// for classification, extraction, prompt and action entries.
pub fn format_file_detail(summary: &FileSummary) -> String {
    let mut output = String::new();

    output.push_str(&format!("Receipt {}\n", summary.id));
    output.push_str("====================\n");
    output.push_str(&format!(
        "Current stage: {}/6 ({})\n",
        summary.current_stage,
        stage_label(summary.current_stage)
    ));

    if let Some(employee_id) = &summary.employee_id {
        output.push_str(&format!("Employee id: {}\n", employee_id));
    }
    if let Some(name) = &summary.employee_name {
        output.push_str(&format!("Employee: {}\n", name));
    }
    if let Some(email) = &summary.employee_email {
        output.push_str(&format!("Email: {}\n", email));
    }
    if let Some(level) = &summary.employee_level {
        output.push_str(&format!("Level: {}\n", level));
    }
    if let Some(expenses) = summary.current_expenses {
        output.push_str(&format!("Current expenses: {:.2}\n", expenses));
    }

    if summary.email_sent {
        output.push('\n');
        output.push_str("Notification email: sent\n");
        if let Some(subject) = &summary.email_subject {
            output.push_str(&format!("  Subject: {}\n", subject));
        }
        if let Some(content) = &summary.email_content {
            output.push_str(&format!("  {}\n", content));
        }
    }

    if let Some(update) = &summary.expense_update {
        output.push('\n');
        output.push_str(&format!(
            "Ledger update: {:.2} -> {:.2} ({:+.2})\n",
            update.from, update.to, update.difference
        ));
    }

    output.push('\n');
    output.push_str("Stages\n");
    output.push_str("------\n");

    for entry in &summary.stages {
        let sub = entry
            .sub_stage
            .map(|s| format!(".{}", s))
            .unwrap_or_default();
        let name = entry
            .name
            .as_deref()
            .unwrap_or(stage_label(entry.stage_number));
        output.push_str(&format!("[{}{}] {}\n", entry.stage_number, sub, name));
        output.push_str(&format_stage_details(&entry.details));
    }

    output
}

fn format_stage_details(details: &StageDetails) -> String {
    let mut output = String::new();

    match details {
        StageDetails::Classification { receipt_type } => {
            if let Some(receipt_type) = receipt_type {
                output.push_str(&format!("    classified as: {}\n", receipt_type));
            }
        }
        StageDetails::Extraction { extracted_content } => {
            if let Some(text) = extracted_content {
                output.push_str(&format!("    extracted text: {}\n", text));
            }
        }
        StageDetails::Prompt { system_prompt } => {
            if let Some(prompt) = system_prompt {
                output.push_str(&format!("    prompt: {}\n", prompt));
            }
        }
        StageDetails::Action {
            reasoning, tool, ..
        } => {
            if let Some(tool) = tool {
                output.push_str(&format!("    tool: {}\n", tool));
            }
            if let Some(reasoning) = reasoning {
                output.push_str(&format!("    reasoning: {}\n", reasoning));
            }
        }
        // Intake images render in the list header, not inline
        StageDetails::Intake { .. } | StageDetails::Other => {}
    }

    output
}
