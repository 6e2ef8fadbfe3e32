use clap::Parser;
use train_data_converter::app;
use train_data_converter::config::resolve_api_token;
use train_data_converter::domain::ports::ConfigProvider;
use train_data_converter::utils::{logger, validation::Validate};
use train_data_converter::{CliConfig, ConverterError, TomlConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting train-data-converter");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    let result = match cli.config.as_deref() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            match TomlConfig::from_file(path) {
                Ok(config) => {
                    let file_token = config.api_token().map(str::to_string);
                    run(&config, file_token).await
                }
                Err(e) => Err(e),
            }
        }
        None => run(&cli, None).await,
    };

    if let Err(e) = result {
        tracing::error!("❌ {} (Category: {:?})", e, e.category());
        tracing::error!("💡 Suggestion: {}", e.recovery_suggestion());
        eprintln!("❌ {}", e.user_friendly_message());
        std::process::exit(1);
    }

    Ok(())
}

async fn run<C: ConfigProvider + Validate>(
    config: &C,
    file_token: Option<String>,
) -> Result<(), ConverterError> {
    config.validate()?;
    tracing::info!("✅ Configuration validated");

    // 啟動時就確認 token 存在，不要等到第一個請求才失敗
    let api_token = match file_token {
        Some(token) => token,
        None => resolve_api_token()?,
    };

    app::serve(config, api_token).await
}
