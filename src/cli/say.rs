//! TUI-less one-shot commands: `say`, `enhance` and `image`.

use std::error::Error;
use std::io::{self, Write};
use std::path::Path;

use uuid::Uuid;

use crate::core::message::Message;
use crate::core::vendor::VendorClient;
use crate::utils::images::write_images;

pub async fn run_say(
    client: &VendorClient,
    model: &str,
    prompt: &str,
) -> Result<(), Box<dyn Error>> {
    let prompt = non_empty(prompt, "say")?;
    let history = [Message::user(prompt)];

    let mut stdout = io::stdout();
    let reply = client
        .stream_chat(&history, model, |fragment| {
            let _ = stdout.write_all(fragment.as_bytes());
            let _ = stdout.flush();
        })
        .await?;

    if !reply.ends_with('\n') {
        println!();
    }
    Ok(())
}

pub async fn run_enhance(client: &VendorClient, prompt: &str) -> Result<(), Box<dyn Error>> {
    let prompt = non_empty(prompt, "enhance")?;
    let refined = client.enhance_prompt(prompt).await?;
    println!("{refined}");
    Ok(())
}

pub async fn run_image(
    client: &VendorClient,
    prompt: &str,
    dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let prompt = non_empty(prompt, "image")?;
    let Some(images) = client.generate_image(prompt).await? else {
        return Err("The model returned no image for this prompt.".into());
    };

    let batch = Uuid::new_v4().simple().to_string();
    for path in write_images(dir, &batch, &images).await? {
        println!("{}", path.display());
    }
    Ok(())
}

fn non_empty<'a>(prompt: &'a str, command: &str) -> Result<&'a str, Box<dyn Error>> {
    let trimmed = prompt.trim();
    if trimmed.is_empty() {
        return Err(format!("Usage: lumiera {command} <prompt>").into());
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::api::GenerateContentResponse;
    use crate::core::models::ModelCatalog;
    use crate::core::vendor::testing::{text_response, FakeTransport};
    use tempfile::TempDir;

    fn client_with(transport: FakeTransport) -> (VendorClient, Arc<FakeTransport>) {
        let transport = Arc::new(transport);
        let client = VendorClient::new(transport.clone(), ModelCatalog::default());
        (client, transport)
    }

    #[tokio::test]
    async fn blank_prompts_are_rejected_without_a_call() {
        let (client, transport) = client_with(FakeTransport::default());
        assert!(run_enhance(&client, "   ").await.is_err());
        assert!(run_say(&client, "model", "").await.is_err());
        assert!(transport.recorded().is_empty());
    }

    #[tokio::test]
    async fn say_streams_the_trimmed_prompt() {
        let (client, transport) = client_with(FakeTransport::with_stream(&["Hi", "!"]));
        run_say(&client, "custom-model", "  hello  ")
            .await
            .expect("say");

        let recorded = transport.recorded();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].0, "custom-model");
    }

    #[tokio::test]
    async fn image_writes_every_returned_part() {
        let transport = FakeTransport::default();
        let response: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "role": "model",
                    "parts": [{ "inlineData": { "mimeType": "image/png", "data": "aGVsbG8=" } }]
                }
            }]
        }))
        .expect("response");
        transport.push_generate(Ok(response));
        let (client, _) = client_with(transport);

        let temp_dir = TempDir::new().expect("temp dir");
        run_image(&client, "a lighthouse", temp_dir.path())
            .await
            .expect("image");

        let files: Vec<_> = std::fs::read_dir(temp_dir.path())
            .expect("read dir")
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn image_without_parts_is_an_error() {
        let transport = FakeTransport::default();
        transport.push_generate(Ok(text_response("no pictures today")));
        let (client, _) = client_with(transport);

        let temp_dir = TempDir::new().expect("temp dir");
        assert!(run_image(&client, "a lighthouse", temp_dir.path())
            .await
            .is_err());
    }
}
