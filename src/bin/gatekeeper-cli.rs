use clap::{Parser, Subcommand};
use serde_json::Value;

use api_gatekeeper::http::request::ACCESS_TOKEN_PARAM;

#[derive(Parser)]
#[command(name = "gatekeeper-cli")]
#[command(about = "Admin CLI for the API gatekeeper", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Admin shared secret, sent as the `accessToken` query parameter.
    #[arg(short, long, env = "ADMIN_ACCESS_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Admin route prefix on the server.
    #[arg(long, default_value = "/admin")]
    prefix: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server liveness (public)
    Health,
    /// Version and uptime
    Status,
    /// Non-secret summary of the loaded policy
    Policy,
    /// Rate-limit settings and tracked client count
    RateLimits,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');
    let prefix = cli.prefix.trim_end_matches('/');

    let (path, admin) = match cli.command {
        Commands::Health => ("/health".to_string(), false),
        Commands::Status => (format!("{}/status", prefix), true),
        Commands::Policy => (format!("{}/policy", prefix), true),
        Commands::RateLimits => (format!("{}/rate-limits", prefix), true),
    };

    let mut request = client.get(format!("{}{}", base, path));
    if admin {
        match &cli.token {
            Some(token) => request = request.query(&[(ACCESS_TOKEN_PARAM, token)]),
            None => eprintln!("Warning: no admin token given; the request will be rejected"),
        }
    }

    print_response(request.send().await?).await
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if let Some(remaining) = res.headers().get("ratelimit-remaining") {
        eprintln!("RateLimit-Remaining: {}", remaining.to_str().unwrap_or("?"));
    }

    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
