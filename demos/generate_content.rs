//! Example: Generating content
//!
//! Sends one prompt, counts its tokens, then streams a second answer as it is
//! produced.
//!
//! Run with: cargo run --example generate_content

use futures_util::StreamExt;
use genai_net::{
    Client, Content, CountTokensRequest, GenerateContentRequest, GenerationConfig, model_names,
};
use std::error::Error;
use std::io::Write;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let client = Client::from_env()?;

    // =========================================================================
    // Whole response
    // =========================================================================
    let prompt = vec![Content::user("Explain the borrow checker in two sentences.")];

    let tokens = client
        .count_tokens(&CountTokensRequest::new(
            model_names::GEMINI_2_0_FLASH,
            prompt.clone(),
        ))
        .await?;
    println!("Prompt tokens: {}", tokens.total_tokens);

    let mut request = GenerateContentRequest::new(model_names::GEMINI_2_0_FLASH, prompt);
    request.generation_config = Some(GenerationConfig {
        temperature: Some(0.2),
        ..Default::default()
    });

    let response = client.generate_content(&request).await?;
    println!("{}\n", response.text().unwrap_or_default());
    if let Some(reason) = response.finish_reason() {
        println!("Finish reason: {reason:?}\n");
    }

    // =========================================================================
    // Streamed response
    // =========================================================================
    let request = GenerateContentRequest::new(
        model_names::GEMINI_2_0_FLASH,
        vec![Content::user("Write a short poem about ownership.")],
    );

    let mut stream = client.stream_generate_content(request);
    while let Some(chunk) = stream.next().await {
        if let Some(text) = chunk?.text() {
            print!("{text}");
            std::io::stdout().flush()?;
        }
    }
    println!();

    Ok(())
}
