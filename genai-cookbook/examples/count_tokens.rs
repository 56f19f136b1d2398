use genai_cookbook::types::content::Content;
use genai_cookbook::Client;

#[tokio::main]
async fn main() -> genai_cookbook::Result<()> {
    let client = Client::from_env()?;
    let response = client
        .models()
        .count_tokens(
            "gemini-2.0-flash",
            vec![Content::user("The quick brown fox jumps over the lazy dog.")],
        )
        .await?;
    println!("total_tokens: {:?}", response.total_tokens);
    Ok(())
}
