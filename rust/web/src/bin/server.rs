//! Standalone web server binary
//!
//! Usage: cargo run -p twentyone_web --bin twentyone-web-server

use twentyone_web::{AppSettings, ServerConfig, WebServer};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    twentyone_web::init_logging();

    let args: Vec<String> = std::env::args().collect();
    let mut host = "127.0.0.1".to_string();
    let mut port = 8080u16;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--host" | "-h" => {
                if i + 1 < args.len() {
                    host = args[i + 1].clone();
                    i += 2;
                } else {
                    eprintln!("Error: --host requires a value");
                    std::process::exit(1);
                }
            }
            "--port" | "-p" => {
                if i + 1 < args.len() {
                    port = args[i + 1].parse().unwrap_or_else(|_| {
                        eprintln!("Error: invalid port number");
                        std::process::exit(1);
                    });
                    i += 2;
                } else {
                    eprintln!("Error: --port requires a value");
                    std::process::exit(1);
                }
            }
            "--help" => {
                print_help();
                std::process::exit(0);
            }
            _ => {
                eprintln!("Unknown argument: {}", args[i]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    let settings = AppSettings::from_env()?;
    let config = ServerConfig::new(host, port);

    tracing::info!("Starting Twentyone Web Server");
    tracing::info!("  Host: {}", config.host());
    tracing::info!("  Port: {}", config.port());
    tracing::info!(
        "  Advisor: {}",
        if settings.advisor.api_key.is_some() {
            "remote"
        } else {
            "house rule"
        }
    );

    let server = WebServer::new(config, settings);
    let handle = server.start().await?;

    tracing::info!("Server running at http://{}", handle.address());
    println!("Server running at http://{}", handle.address());
    println!("Press Ctrl+C to stop");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down server");
    handle.shutdown().await?;
    tracing::info!("Server stopped cleanly");

    Ok(())
}

fn print_help() {
    println!("Twentyone Web Server");
    println!();
    println!("Usage: twentyone-web-server [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --host, -h <HOST>   Host to bind to (default: 127.0.0.1)");
    println!("  --port, -p <PORT>   Port to bind to (default: 8080)");
    println!("  --help              Show this help message");
    println!();
    println!("Environment:");
    println!("  GEMINI_API_KEY                  Enables the remote dealer advisor");
    println!("  TWENTYONE_STARTING_BANKROLL     Bankroll for new sessions (default 1000)");
    println!("  TWENTYONE_DEFAULT_BET           Bet when a start omits one (default 10)");
    println!("  TWENTYONE_SESSION_TTL_MINUTES   Session inactivity timeout (default 30)");
    println!("  TWENTYONE_ADVISOR_MODEL         Advisor model name (default gemini-pro)");
    println!("  TWENTYONE_ADVISOR_TIMEOUT_MS    Advisor call timeout (default 3000)");
    println!("  TWENTYONE_ADVISOR_FLOOR         Mandatory-hit floor, or `off` (default 17)");
}
