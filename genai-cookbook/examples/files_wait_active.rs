use std::time::Duration;

use genai_cookbook::{Client, PollOptions};

#[tokio::main]
async fn main() -> genai_cookbook::Result<()> {
    let client = Client::from_env()?;
    let path = std::env::var("GENAI_VIDEO_PATH")
        .unwrap_or_else(|_| "third_party/Big_Buck_Bunny.mp4".into());
    let files = client.files();
    let file = files.upload_from_path(&path).await?;
    println!("uploaded: {:?} ({:?})", file.name, file.state);

    let options = PollOptions::new()
        .interval(Duration::from_secs(5))
        .timeout(Duration::from_secs(600));
    let file = files.wait_until_active(&file, options).await?;
    println!("ready: {:?}", file.uri);
    Ok(())
}
