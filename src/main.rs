use dotenv::dotenv;
use tracing::{error, info, warn};

use lume_backend::app::app::App;
use lume_backend::util::logger::Logger;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_result = dotenv();

    // Guards must live until shutdown so buffered log lines are flushed.
    let _logger = Logger::new()?;
    info!("Starting Lume backend");

    match dotenv_result {
        Ok(_) => info!("Loaded .env file"),
        Err(e) => warn!("No .env file loaded: {} (using system env vars)", e),
    }

    let app = App::new().await.map_err(|e| {
        error!("Failed to initialize application: {e}");
        e
    })?;
    app.start().await?;
    Ok(())
}
