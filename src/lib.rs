pub mod cli;
pub mod client;
pub mod connection;
pub mod error;
pub mod models;
pub mod render;
pub mod websocket;

use std::error::Error;

use log::{ error, info };
use tokio::io::{ AsyncBufReadExt, BufReader };
use tokio::sync::mpsc::{ unbounded_channel, UnboundedSender };

use cli::Args;
use client::ChatClient;
use render::TerminalRenderer;
use websocket::ChatSession;

pub async fn run(args: Args) -> Result<(), Box<dyn Error + Send + Sync>> {
    let url = args.endpoint_url()?;
    let framing = args.framing()?;

    info!("--- Core Configuration ---");
    info!("Chat Endpoint: {}", url);
    info!("Framing: {:?}", framing);
    info!("Reconnect Delay: {}s", args.reconnect_delay_secs);
    info!("--------------------------");

    let renderer = TerminalRenderer::new(std::io::stdout());
    let client = ChatClient::new(framing, renderer);
    let mut session = ChatSession::new(url, args.reconnect_delay(), client);

    let (input_tx, mut input_rx) = unbounded_channel();
    tokio::spawn(read_input_lines(input_tx));

    session.run(&mut input_rx).await?;
    info!("Input closed; shutting down");
    Ok(())
}

/// Feed stdin lines into the session until EOF.
async fn read_input_lines(tx: UnboundedSender<String>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        match lines.next_line().await {
            Ok(Some(line)) => {
                if tx.send(line).is_err() {
                    break;
                }
            }
            Ok(None) => {
                break;
            }
            Err(e) => {
                error!("Failed to read input: {}", e);
                break;
            }
        }
    }
}
