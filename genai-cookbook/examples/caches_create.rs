use std::time::Duration;

use genai_cookbook::caches::ttl_from_duration;
use genai_cookbook::types::caches::CreateCachedContentConfig;
use genai_cookbook::types::content::Content;
use genai_cookbook::types::models::GenerateContentConfig;
use genai_cookbook::Client;

#[tokio::main]
async fn main() -> genai_cookbook::Result<()> {
    let client = Client::from_env()?;
    let long_text = "hello ".repeat(8000);
    let config = CreateCachedContentConfig {
        display_name: Some("demo-cache".into()),
        ttl: Some(ttl_from_duration(Duration::from_secs(300))),
        contents: Some(vec![Content::user(long_text)]),
        ..Default::default()
    };
    let cache = client.caches().create("gemini-1.5-flash-001", config).await?;
    let name = cache.name.clone().unwrap_or_default();
    println!("cache: {name}");

    let response = client
        .models()
        .generate_content_with_config(
            "gemini-1.5-flash-001",
            vec![Content::user("How many words are cached?")],
            GenerateContentConfig {
                cached_content: Some(name.clone()),
                ..Default::default()
            },
        )
        .await?;
    println!("{}", response.text().unwrap_or_default());

    client.caches().delete(&name).await?;
    Ok(())
}
