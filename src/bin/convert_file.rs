use clap::Parser;
use train_data_converter::config::resolve_api_token;
use train_data_converter::domain::ports::ConfigProvider;
use train_data_converter::utils::{logger, validation::Validate};
use train_data_converter::{build_service, CliConfig, ConverterError, TomlConfig, TrainRecord};

const SAMPLE_TEXT: &str = "
train KMRC-012 daily clean at 11 pm, team A, scheduled.
branding election awareness priority 1 from 1 nov to 30 nov.
KMRC-018 fitness signalling valid 27 nov, telecom 1 dec, needs check.
";

#[derive(Parser)]
#[command(name = "convert-file")]
#[command(about = "Convert one text file to a train record and print it as JSON")]
struct Args {
    /// Text file to convert; a built-in sample is used when omitted
    input: Option<String>,

    #[command(flatten)]
    config: CliConfig,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    if args.config.json_logs {
        logger::init_json_logger(args.config.verbose);
    } else {
        logger::init_cli_logger(args.config.verbose);
    }

    let output = match convert_with_args(&args).await {
        Ok(record) => serde_json::to_string_pretty(&record),
        Err(e) => {
            eprintln!("❌ {}", e.user_friendly_message());
            eprintln!("💡 {}", e.recovery_suggestion());
            std::process::exit(1);
        }
    };

    match output {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("❌ Cannot print the record: {}", e);
            std::process::exit(1);
        }
    }
}

async fn convert_with_args(args: &Args) -> Result<TrainRecord, ConverterError> {
    let text = match &args.input {
        Some(path) => {
            tracing::info!("📁 Reading {}", path);
            tokio::fs::read_to_string(path).await?
        }
        None => {
            tracing::info!("No input file given, converting the built-in sample");
            SAMPLE_TEXT.to_string()
        }
    };

    // 與伺服器相同：有 --config 就以 TOML 檔為準
    match args.config.config.as_deref() {
        Some(path) => {
            tracing::info!("📁 Loading configuration from: {}", path);
            let config = TomlConfig::from_file(path)?;
            let file_token = config.api_token().map(str::to_string);
            convert(&config, file_token, &text).await
        }
        None => convert(&args.config, None, &text).await,
    }
}

async fn convert<C: ConfigProvider + Validate>(
    config: &C,
    file_token: Option<String>,
    text: &str,
) -> Result<TrainRecord, ConverterError> {
    config.validate()?;

    let api_token = match file_token {
        Some(token) => token,
        None => resolve_api_token()?,
    };

    let service = build_service(config, api_token)?;
    service.convert(text, "Input file is empty").await
}
