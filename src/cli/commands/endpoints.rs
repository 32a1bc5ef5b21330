//! Endpoints command - resolve service types against a saved service index

use crate::cli::args::{EndpointsArgs, OutputFormat};
use crate::config::Config;
use crate::error::LockscopeResult;
use crate::service_index::ServiceIndex;
use crate::ui::{self, UiContext};

/// Execute the endpoints command
pub async fn execute(args: EndpointsArgs, _config: &Config) -> LockscopeResult<()> {
    let index = ServiceIndex::from_file(&args.index).await?;
    let types: Vec<&str> = args.types.iter().map(String::as_str).collect();
    let endpoints = index.first_endpoints(&types)?;

    match args.format {
        OutputFormat::Json => {
            let urls: Vec<&str> = endpoints.iter().map(|u| u.as_str()).collect();
            println!("{}", serde_json::to_string_pretty(&urls)?);
        }
        OutputFormat::Plain => {
            for endpoint in &endpoints {
                println!("{}", endpoint);
            }
        }
        OutputFormat::Table => {
            let ctx = UiContext::detect();
            ui::intro(&ctx, "Service endpoints");
            ui::key_value(
                &ctx,
                "Requested",
                &index.request_time().format("%Y-%m-%d %H:%M").to_string(),
            );
            if endpoints.is_empty() {
                ui::step_info(&ctx, &format!("No endpoints for {}", types.join(", ")));
            }
            for endpoint in &endpoints {
                ui::step_ok(&ctx, endpoint.as_str());
            }
        }
    }

    Ok(())
}
