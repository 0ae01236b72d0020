use dailypoll::{init_tracing, run_app, Config};
use tracing::error;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {:#}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = run_app(config).await {
        error!("Server error: {:#}", e);
        std::process::exit(1);
    }
}
