use genai_cookbook::Client;

#[tokio::main]
async fn main() -> genai_cookbook::Result<()> {
    let client = Client::from_env()?;
    for file in client.files().all().await? {
        println!("{:?} {:?}", file.name, file.state);
    }
    Ok(())
}
