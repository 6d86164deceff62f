use brewmaster::{
    logger::{self, LoggerConfig},
    Config, GeminiClient, GenerationSession, ImageClient,
};

#[cfg(feature = "server")]
#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = bootstrap()?;
    let (host, port) = config.bind_address();
    logger::log_startup_info(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"), &host, port);

    let session = build_session(&config);
    brewmaster::server::run(&config, session).await?;

    log::info!("👋 Server stopped");
    Ok(())
}

/// Without the `server` feature: `brewmaster-ai <prompt> [aspect-ratio]`
/// generates one image and writes it to the current directory.
#[cfg(not(feature = "server"))]
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use brewmaster::{gemini::data_uri, AspectRatio, GenerateOutcome};

    let config = bootstrap()?;

    let mut args = std::env::args().skip(1);
    let prompt = args.next().unwrap_or_default();
    let aspect_ratio: AspectRatio = match args.next() {
        Some(tag) => tag.parse()?,
        None => AspectRatio::default(),
    };

    let session = build_session(&config);
    session.set_prompt(prompt);
    session.set_aspect_ratio(aspect_ratio);

    match session.generate().await {
        GenerateOutcome::Completed { image } => {
            let (_, bytes) = data_uri::decode(&image.url)?;
            let filename = image.download_file_name();
            std::fs::write(&filename, bytes)?;
            log::info!("💾 Image saved to: {}", filename);
            Ok(())
        }
        GenerateOutcome::Failed { message } => Err(message.into()),
        GenerateOutcome::Skipped { reason } => {
            Err(format!("Nothing generated: {:?}", reason).into())
        }
    }
}

fn bootstrap() -> Result<Config, Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    let config = Config::from_env();

    let mut logger_config = if config.log_json {
        LoggerConfig::production()
    } else {
        LoggerConfig::development()
    };
    if let Some(level) = config.log_level {
        logger_config = logger_config.with_level(level);
    }
    if let Some(path) = &config.log_file {
        logger_config = logger_config.with_file_output(path);
    }
    logger::init_with_config(logger_config)?;

    if dotenv_loaded {
        log::info!("✅ .env file loaded successfully");
    } else {
        log::warn!("⚠️  No .env file found, using system environment variables");
    }

    logger::log_config_info(&config);
    Ok(config)
}

fn build_session(config: &Config) -> GenerationSession {
    let gemini = GeminiClient::new(config.gemini.clone().unwrap_or_default());

    log::info!("🖼️  Available image generation models:");
    for (id, name, provider) in ImageClient::supported_models() {
        log::info!("  {} - {} ({})", id, name, provider);
    }

    GenerationSession::new(gemini.image().clone(), config.capacity())
}
