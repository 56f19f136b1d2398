use genai_cookbook::types::content::Content;
use genai_cookbook::types::models::EmbedContentConfig;
use genai_cookbook::Client;

#[tokio::main]
async fn main() -> genai_cookbook::Result<()> {
    let client = Client::from_env()?;
    let config = EmbedContentConfig {
        output_dimensionality: Some(10),
        ..Default::default()
    };
    let response = client
        .models()
        .embed_content_with_config("gemini-embedding-001", vec![Content::user("hello")], config)
        .await?;
    println!("{:?}", response.embeddings);
    Ok(())
}
