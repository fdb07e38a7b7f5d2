use clap::{Parser, Subcommand};

use api_gateway::health::{HealthReport, HEALTH_PATH};
use api_gateway::routing::API_PREFIX;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Inspect a running API gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the gateway health payload
    Health,
    /// List configured routes and their targets
    Targets,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}{}", cli.url.trim_end_matches('/'), HEALTH_PATH))
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: gateway returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        std::process::exit(1);
    }

    let report: HealthReport = res.json().await?;

    match cli.command {
        Commands::Health => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::Targets => {
            let width = report
                .targets
                .keys()
                .map(|name| name.len() + API_PREFIX.len())
                .max()
                .unwrap_or(0);
            for (name, target) in &report.targets {
                println!("{:<width$}  ->  {}", format!("{API_PREFIX}{name}"), target);
            }
        }
    }

    Ok(())
}
