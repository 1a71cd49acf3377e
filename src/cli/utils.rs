use serde_json::json;

use crate::cli::OutputFormat;
use crate::report::Outcome;
use crate::request::WorkflowHandle;
use crate::services::AccessReport;

/// Output a success message in the appropriate format
pub fn output_success(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": true,
                    "message": message
                }))?
            );
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(output_format: &OutputFormat, message: &str) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({
                    "success": false,
                    "error": message
                }))?
            );
        }
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
    }
    Ok(())
}

/// Output the submission receipt for a request the caller chose not to track.
pub fn output_handle(output_format: &OutputFormat, handle: &WorkflowHandle) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(handle)?);
        }
        OutputFormat::Text => match &handle.run_id {
            Some(run_id) => println!(
                "✓ Request submitted. Workflow ID: {}, Run ID: {}",
                handle.workflow_id, run_id
            ),
            None => println!("✓ Request submitted. Workflow ID: {}", handle.workflow_id),
        },
    }
    Ok(())
}

/// Output the final classification of a tracked request. Indeterminate is
/// rendered as a warning, not a failure: the action may still complete.
pub fn output_report(output_format: &OutputFormat, report: &AccessReport) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(report)?);
        }
        OutputFormat::Text => match &report.outcome {
            Outcome::Succeeded { message } => {
                println!(
                    "✓ Action completed successfully{}",
                    message
                        .as_deref()
                        .map(|m| format!(": {m}"))
                        .unwrap_or_default()
                );
            }
            Outcome::Failed { message } => {
                eprintln!(
                    "✗ Action failed{}",
                    message
                        .as_deref()
                        .map(|m| format!(": {m}"))
                        .unwrap_or_default()
                );
            }
            Outcome::Indeterminate { reason } => {
                eprintln!("⚠ Could not observe a final status: {reason}");
                eprintln!(
                    "  Workflow {} may still be running; check again later.",
                    report.handle.workflow_id
                );
            }
        },
    }
    Ok(())
}
