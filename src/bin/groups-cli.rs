use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "groups-cli")]
#[command(about = "Management CLI for the group service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// API key of the acting user.
    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// List all groups in the caller's realm
    List,
    /// Create a group
    Create {
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
        /// Initial member user ids
        #[arg(short, long, num_args = 0.., value_delimiter = ',')]
        members: Vec<u64>,
    },
    /// Edit a group's name and/or description
    Edit {
        id: u64,
        #[arg(short, long, default_value = "")]
        name: String,
        #[arg(short, long, default_value = "")]
        description: String,
    },
    /// Delete a group
    Delete { id: u64 },
    /// Add and/or remove members of a group
    Members {
        id: u64,
        #[arg(short, long, num_args = 0.., value_delimiter = ',')]
        add: Vec<u64>,
        #[arg(short, long, num_args = 0.., value_delimiter = ',')]
        delete: Vec<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if !cli.key.is_empty() {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
        );
    }

    match cli.command {
        Commands::Health => {
            let res = client
                .get(format!("{}/health", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::List => {
            let res = client
                .get(format!("{}/groups", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Create {
            name,
            description,
            members,
        } => {
            let res = client
                .post(format!("{}/groups", cli.url))
                .headers(headers)
                .json(&json!({
                    "name": name,
                    "description": description,
                    "members": members,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Edit {
            id,
            name,
            description,
        } => {
            let res = client
                .patch(format!("{}/groups/{}", cli.url, id))
                .headers(headers)
                .json(&json!({
                    "name": name,
                    "description": description,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Delete { id } => {
            let res = client
                .delete(format!("{}/groups/{}", cli.url, id))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Members { id, add, delete } => {
            let res = client
                .post(format!("{}/groups/{}/members", cli.url, id))
                .headers(headers)
                .json(&json!({
                    "add": add,
                    "delete": delete,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let body: Value = res.json().await.unwrap_or(Value::Null);
    println!("{}", status);
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
