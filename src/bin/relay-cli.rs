use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};

use relay_lb::load_balancer::backend::normalize_base_url;
use relay_lb::registry::{RedisRegistry, Registry};

#[derive(Parser)]
#[command(name = "relay-cli")]
#[command(about = "Management CLI for the relay-lb registry and router", long_about = None)]
struct Cli {
    /// Registry URL
    #[arg(short, long, env = "REGISTRY_URL", default_value = "redis://localhost:6379")]
    registry: String,

    /// Router base URL, for commands that ask the router directly
    #[arg(long, default_value = "http://localhost:8080")]
    router: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a worker; the orchestrator picks it up on its next cycle
    Register {
        /// Worker base URL, e.g. http://worker1:8080
        #[arg(long)]
        url: String,
        /// Backend id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Remove a worker from the registry
    Deregister {
        #[arg(long)]
        id: String,
    },
    /// List every registered worker with its recorded status
    List,
    /// Show the router's live set
    Live,
    /// Show the router's status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Register { url, id } => {
            let url = normalize_base_url(&url)?;
            let id = id.unwrap_or_else(|| format!("backend-{}", &uuid::Uuid::new_v4().simple().to_string()[..8]));

            let registry = connect(&cli.registry).await?;
            registry.register(&id, &url).await?;
            println!("{}", serde_json::to_string_pretty(&json!({ "registered": id, "url": url }))?);
        }
        Commands::Deregister { id } => {
            let registry = connect(&cli.registry).await?;
            registry.deregister(&id).await?;
            println!("{}", serde_json::to_string_pretty(&json!({ "deregistered": id }))?);
        }
        Commands::List => {
            let registry = connect(&cli.registry).await?;
            let mut records = Vec::new();
            for id in registry.backend_ids().await? {
                if let Some(record) = registry.fetch_backend(&id).await? {
                    records.push(json!({
                        "id": record.id,
                        "url": record.url,
                        "status": record.status,
                        "last_checked": record.last_checked,
                    }));
                }
            }
            println!("{}", serde_json::to_string_pretty(&records)?);
        }
        Commands::Live => {
            let res = reqwest::get(format!("{}/admin/backends", cli.router)).await?;
            print_response(res).await?;
        }
        Commands::Status => {
            let res = reqwest::get(format!("{}/admin/status", cli.router)).await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn connect(url: &str) -> Result<Arc<dyn Registry>, Box<dyn std::error::Error>> {
    Ok(Arc::new(RedisRegistry::connect(url).await?))
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: router returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
