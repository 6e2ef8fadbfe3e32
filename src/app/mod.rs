pub mod response;
pub mod routes;

use crate::adapters::HuggingFaceClient;
use crate::core::converter::ConversionService;
use crate::core::prompt::PromptBuilder;
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{ConverterError, Result};
use std::sync::Arc;

pub use routes::{router, AppState};

/// 以設定與 API token 組出整條轉換流程
pub fn build_service<C: ConfigProvider>(config: &C, api_token: String) -> Result<ConversionService> {
    let client = HuggingFaceClient::new(config, api_token)?;
    let service = ConversionService::from_config(Arc::new(client), PromptBuilder::new(), config)
        .with_date_source(Arc::new(|| chrono::Local::now().date_naive()));
    Ok(service)
}

pub async fn serve<C: ConfigProvider>(config: &C, api_token: String) -> Result<()> {
    let service = build_service(config, api_token)?;
    let app = router(AppState::new(service));

    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| ConverterError::ConfigError {
            message: format!("cannot bind {}: {}", addr, e),
        })?;

    tracing::info!("🚀 Listening on http://{}", addr);
    tracing::info!("Model: {} via {}", config.model_id(), config.model_endpoint());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
