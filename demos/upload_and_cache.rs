//! Example: Files API and context caching
//!
//! Uploads a text file, caches it, asks a question against the cache, then
//! cleans everything up.
//!
//! Run with: cargo run --example upload_and_cache -- path/to/document.txt

use genai_net::{
    CachedContentUpdate, Client, Content, CreateCachedContentRequest, GenerateContentRequest,
    Part, model_names,
};
use std::error::Error;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let path = std::env::args()
        .nth(1)
        .ok_or("usage: upload_and_cache <file>")?;
    let client = Client::from_env()?;

    // =========================================================================
    // Upload
    // =========================================================================
    let mut file = client.upload_file(&path, None, None).await?;
    println!("Uploaded {} ({:?})", file.name, file.state);

    while file.is_processing() {
        tokio::time::sleep(Duration::from_secs(2)).await;
        file = client.get_file(&file.name).await?;
    }
    if file.is_failed() {
        return Err(format!("processing failed: {:?}", file.error).into());
    }
    let uri = file.uri.clone();

    // =========================================================================
    // Cache
    // =========================================================================
    let document = Content::with_parts(
        "user",
        vec![Part::file_data(uri, Some(file.mime_type.clone()))],
    );
    let cache = client
        .create_cached_content(
            &CreateCachedContentRequest::new(model_names::GEMINI_1_5_FLASH, vec![document])
                .with_display_name("demo document")
                .with_ttl("300s"),
        )
        .await?;
    let cache_name = cache.name.clone().ok_or("cache has no name")?;
    println!("Cached as {cache_name}");

    let mut request = GenerateContentRequest::new(
        model_names::GEMINI_1_5_FLASH,
        vec![Content::user("Summarize the document in one paragraph.")],
    );
    request.cached_content = Some(cache_name.clone());
    let response = client.generate_content(&request).await?;
    println!("\n{}\n", response.text().unwrap_or_default());

    let extended = client
        .update_cached_content(
            &cache_name,
            &CachedContentUpdate {
                ttl: Some("600s".to_string()),
                ..Default::default()
            },
            Some("ttl"),
        )
        .await?;
    println!("Cache now expires at {:?}", extended.expire_time);

    // =========================================================================
    // Cleanup
    // =========================================================================
    client.delete_cached_content(&cache_name).await?;
    client.delete_file(&file.name).await?;
    println!("Cleaned up");

    Ok(())
}
