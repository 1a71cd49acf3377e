use std::collections::HashMap;

use clap::Args;

use crate::cli::commands::jit::report_access_error;
use crate::cli::{utils, OutputFormat};
use crate::config;
use crate::request::AccessRequest;
use crate::services::AccessService;

#[derive(Args)]
pub struct BreakglassArgs {
    #[arg(help = "Service to act on, e.g. service-123")]
    pub service_id: String,

    #[arg(help = "Emergency action: restart, scale, or rollback")]
    pub action: String,

    #[arg(
        long = "param",
        value_name = "KEY=VALUE",
        help = "Action parameter, repeatable (e.g. --param replicas=3)"
    )]
    pub params: Vec<String>,

    #[arg(long, help = "Identity of the requesting operator")]
    pub requested_by: String,

    #[arg(long, help = "Reason for the emergency action")]
    pub reason: String,

    #[arg(long, default_value = "15m", help = "How long the action window should last")]
    pub duration: String,

    #[arg(long, help = "Submit without waiting for the outcome")]
    pub no_wait: bool,
}

fn parse_params(raw: &[String]) -> anyhow::Result<HashMap<String, String>> {
    let mut parameters = HashMap::new();
    for entry in raw {
        let (key, value) = entry
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("parameter '{entry}' is not in KEY=VALUE form"))?;
        parameters.insert(key.trim().to_string(), value.trim().to_string());
    }
    Ok(parameters)
}

pub async fn handle(args: BreakglassArgs, output_format: OutputFormat) -> anyhow::Result<()> {
    let parameters = parse_params(&args.params)?;
    let service = AccessService::from_config(config::config())?;

    let request = AccessRequest::remediation(
        &args.service_id,
        &args.action,
        parameters,
        &args.reason,
        &args.duration,
        &args.requested_by,
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
