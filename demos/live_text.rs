//! Example: A Live text session
//!
//! Opens a bidirectional session, sends one user turn and prints the reply as
//! it arrives. Ctrl-C closes the session.
//!
//! Run with: RUST_LOG=genai_net=debug cargo run --example live_text

use futures_util::StreamExt;
use genai_net::{Client, GenerationConfig, LiveSetup, Modality, model_names};
use std::error::Error;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::from_env()?;

    let setup = LiveSetup::new(model_names::GEMINI_2_0_FLASH_LIVE)
        .with_system_instruction("You are terse.")
        .with_generation_config(GenerationConfig {
            response_modalities: Some(vec![Modality::Text]),
            ..Default::default()
        });

    let session = Arc::new(client.connect_live(setup).await?);
    println!("Connected: {:?}", session.state());

    {
        let session = Arc::clone(&session);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                let _ = session.close().await;
            }
        });
    }

    session
        .send_text("Name three uses of a WebSocket, one per line.")
        .await?;

    let messages = session.receive();
    futures_util::pin_mut!(messages);
    while let Some(message) = messages.next().await {
        let message = message?;
        if message.setup_complete.is_some() {
            continue;
        }
        if let Some(text) = message.text() {
            print!("{text}");
            std::io::stdout().flush()?;
        }
        if message.is_turn_complete() {
            println!();
            break;
        }
    }

    session.close().await?;
    println!("Closed: {:?}", session.state());
    Ok(())
}
