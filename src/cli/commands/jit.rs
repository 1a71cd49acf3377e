use clap::Args;

use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::request::AccessRequest;
use crate::services::{AccessError, AccessService};

#[derive(Args)]
pub struct JitArgs {
    #[arg(help = "Database username requesting elevation")]
    pub username: String,

    #[arg(help = "Role to grant temporarily")]
    pub role: String,

    #[arg(long, help = "Reason for requesting this access")]
    pub reason: String,

    #[arg(long, default_value = "15m", help = "How long the grant should last")]
    pub duration: String,

    #[arg(long, help = "Submit without waiting for the outcome")]
    pub no_wait: bool,
}

pub async fn handle(args: JitArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let service = AccessService::from_config(config::config())?;

    let request = AccessRequest::role_grant(
        &args.username,
        &args.role,
        &args.reason,
        &args.duration,
        &args.username,
    );

    if args.no_wait {
        match service.submit(request).await {
            Ok(handle) => utils::output_handle(&output_format, &handle),
            Err(err) => report_access_error(&output_format, err),
        }
    } else {
        match service.execute(request).await {
            Ok(report) => utils::output_report(&output_format, &report),
            Err(err) => report_access_error(&output_format, err),
        }
    }
}

/// Render the abort reason in the requested format, then stop. The error has
/// already been shown; bubbling it up would print it twice.
pub(super) fn report_access_error(
    output_format: &OutputFormat,
    err: AccessError,
) -> anyhow::Result<()> {
    utils::output_error(output_format, &err.to_string())?;
    std::process::exit(1);
}
