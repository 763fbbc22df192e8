mod bracket;
mod config;
mod cors;
mod display;
mod error;
mod service;
mod signup;
mod store;
mod web;

use std::sync::Arc;

use tracing::info;
use tracing_subscriber::EnvFilter;

use config::{AppConfig, Credential};
use cors::CorsPolicy;
use display::{print_bracket, write_bracket_csv};
use service::SignupService;
use store::{Authenticator, ServiceAccount, ServiceAccountKey, SheetsClient, StaticToken};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::from_env()?;
    let auth: Arc<dyn Authenticator> = match &config.credential {
        Credential::ServiceAccount(blob) => Arc::new(ServiceAccount::new(ServiceAccountKey::from_json(blob)?)?),
        Credential::Token(token) => Arc::new(StaticToken::new(token.clone())),
    };
    let store = Arc::new(SheetsClient::new(&config.api_base, &config.sheet_id, auth)?);
    let service = SignupService::new(store, config.bracket_roots);

    let args: Vec<String> = std::env::args().collect();
    match args.get(1).map(String::as_str) {
        // Web mode: bracket-signup web [port]
        Some("web") => {
            let port = args.get(2).and_then(|p| p.parse::<u16>().ok()).unwrap_or(8080);
            if config.dev {
                info!("Development mode: origin checks are disabled");
            }
            let state = web::AppState {
                service,
                cors: CorsPolicy::new(&config.allowed_origins, config.dev),
            };
            web::start_server(port, state).await?;
        }
        // Export mode: bracket-signup export <file.csv>
        Some("export") => {
            let path = args.get(2).map(String::as_str).unwrap_or("bracket.csv");
            let state = service.bracket_state().await?;
            write_bracket_csv(path, &state.rounds)?;
            println!("Bracket saved to {}", path);
        }
        // Default: print the current bracket
        _ => {
            let state = service.bracket_state().await?;
            print_bracket(&state.rounds)?;
        }
    }

    Ok(())
}
