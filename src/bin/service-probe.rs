use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use uuid::Uuid;

use service_skeleton::errors::http::check_response;
use service_skeleton::errors::{DetailRecord, Error};
use service_skeleton::http::X_REQUEST_ID;

#[derive(Parser)]
#[command(name = "service-probe")]
#[command(about = "Call a service-skeleton instance and decode its errors", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Request id to send; a fresh one is generated otherwise.
    #[arg(long)]
    request_id: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the instance is up
    Health,
    /// Fetch a user
    Get { id: String },
    /// Create a user
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Fetch a user through the instance's peer
    Peer { id: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');
    let request_id = cli.request_id.unwrap_or_else(|| Uuid::new_v4().to_string());

    let (method, request) = match &cli.command {
        Commands::Health => ("GET", client.get(format!("{base}/healthz"))),
        Commands::Get { id } => ("GET", client.get(format!("{base}/users/{id}"))),
        Commands::Create { name, email } => (
            "POST",
            client
                .post(format!("{base}/users"))
                .json(&json!({ "name": name, "email": email })),
        ),
        Commands::Peer { id } => ("GET", client.get(format!("{base}/peer/users/{id}"))),
    };

    let response = request.header(X_REQUEST_ID, &request_id).send().await?;
    match check_response(method, response).await {
        Ok(response) => {
            let text = response.text().await?;
            match serde_json::from_str::<Value>(&text) {
                Ok(body) => println!("{}", serde_json::to_string_pretty(&body)?),
                Err(_) => println!("{text}"),
            }
            Ok(())
        }
        Err(err) => {
            print_error(&err);
            std::process::exit(1);
        }
    }
}

fn print_error(err: &Error) {
    eprintln!("Error: {}", err.code());
    eprintln!("  message: {}", err.description());
    for record in err.details() {
        match record {
            DetailRecord::RequestInfo(info) => eprintln!("  request id: {}", info.request_id),
            DetailRecord::DebugInfo(info) => eprintln!("  operations: {}", info.stack_entries.join(" > ")),
            other => eprintln!("  {}: {}", other.type_name(), other.value_json()),
        }
    }
}
