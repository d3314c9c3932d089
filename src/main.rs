//! yt-converter server
//!
//! ```text
//! yt-converter [config.json]
//! ```
//!
//! The config path may also come from `YT_CONVERTER_CONFIG`; without one,
//! defaults apply. `YT_CONVERTER_BIND` overrides the bind address and
//! `RUST_LOG` the log filter.
//!
//! After starting, you can:
//! - View Swagger UI at http://127.0.0.1:5000/swagger-ui
//! - Convert via POST http://127.0.0.1:5000/download
//! - Stream events via GET http://127.0.0.1:5000/events

use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use yt_converter::{Config, Converter, run_with_shutdown};

const DEFAULT_LOG_FILTER: &str = "yt_converter=info,tower_http=info";

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    if let Err(e) = run().await {
        tracing::error!(error = %e, "yt-converter stopped");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> yt_converter::Result<()> {
    let config = load_config()?;
    let converter = Converter::new(config).await?;
    let config = converter.get_config();

    tracing::info!(
        address = %config.server.api.bind_address,
        swagger_ui = config.server.api.swagger_ui,
        "yt-converter starting"
    );

    let server = yt_converter::api::start_api_server(Arc::new(converter.clone()), config);

    tokio::select! {
        result = server => result,
        result = run_with_shutdown(converter) => result,
    }
}

fn load_config() -> yt_converter::Result<Config> {
    let path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("YT_CONVERTER_CONFIG").map(PathBuf::from));

    let mut config = match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading configuration");
            Config::from_json_file(&path)?
        }
        None => Config::default(),
    };

    if let Ok(address) = std::env::var("YT_CONVERTER_BIND") {
        config.set_bind_address(&address)?;
    }

    Ok(config)
}
