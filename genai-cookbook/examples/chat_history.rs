use genai_cookbook::types::content::Content;
use genai_cookbook::types::models::GenerateContentConfig;
use genai_cookbook::Client;

#[tokio::main]
async fn main() -> genai_cookbook::Result<()> {
    let client = Client::from_env()?;
    let chat = client.chats().create_with_history(
        "gemini-2.0-flash",
        GenerateContentConfig::default(),
        vec![Content::user("Hi my name is Bob"), Content::model("Hi Bob!")],
    );
    let response = chat.send_message("What is my name?").await?;
    println!("{}", response.text().unwrap_or_default());
    println!("history: {} turns", chat.history().await.len());
    Ok(())
}
