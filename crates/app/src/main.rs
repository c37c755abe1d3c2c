use std::{net::SocketAddr, sync::Arc};

use recognizer::{GeminiRecognizer, Recognizer};
use settings::Settings;

mod error;
mod settings;

#[tokio::main]
async fn main() -> error::Result<()> {
    let settings = Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "billsplit={level},server={level},engine={level},recognizer={level}",
            level = settings.app.level
        ))
        .init();

    let recognizer = build_recognizer(&settings)?;
    let state = server::ServerState::new(recognizer)
        .max_upload_bytes(settings.server.max_upload_bytes);

    let addr: SocketAddr = format!("{}:{}", settings.server.bind, settings.server.port).parse()?;
    if let Err(err) = server::run(state, addr).await {
        tracing::error!("server failed: {err}");
        return Err(err.into());
    }

    Ok(())
}

fn build_recognizer(settings: &Settings) -> error::Result<Option<Arc<dyn Recognizer>>> {
    let Some(api_key) = settings.recognizer_api_key() else {
        tracing::info!("No recognizer API key found, receipt recognition is disabled");
        return Ok(None);
    };

    let mut builder = GeminiRecognizer::builder().api_key(&api_key);
    if let Some(config) = &settings.recognizer {
        if let Some(model) = &config.model {
            builder = builder.model(model);
        }
        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint(endpoint);
        }
    }

    Ok(Some(Arc::new(builder.build()?)))
}
