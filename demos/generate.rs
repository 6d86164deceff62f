use brewmaster::{gemini::data_uri, AspectRatio, GeminiClient, GeminiConfig};
use std::fs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv_loaded = dotenv::dotenv().is_ok();
    brewmaster::logger::init()?;
    if dotenv_loaded {
        log::info!("✅ .env file loaded");
    } else {
        log::warn!("⚠️  No .env file found");
    }

    let client = GeminiClient::new(GeminiConfig::from_env());

    for aspect_ratio in [AspectRatio::Square, AspectRatio::Landscape16x9] {
        let url = client
            .image()
            .generate("latte art of a spiral galaxy, cinematic lighting", aspect_ratio)
            .await?;

        let (_, bytes) = data_uri::decode(&url)?;
        let filename = format!(
            "brewmaster-ai-{}-{}.jpg",
            aspect_ratio.as_str().replace(':', "x"),
            chrono::Utc::now().timestamp_millis()
        );
        fs::write(&filename, bytes)?;
        println!("💾 {} saved ({} chars of data URI)", filename, url.len());
    }

    Ok(())
}
