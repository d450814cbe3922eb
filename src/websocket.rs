use std::time::{ Duration, Instant };

use futures::{ SinkExt, StreamExt };
use log::{ error, info, warn };
use tokio::io::{ AsyncRead, AsyncWrite };
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::sleep;
use tokio_tungstenite::{ connect_async, tungstenite::protocol::Message, WebSocketStream };
use url::Url;

use crate::client::ChatClient;
use crate::connection::Supervisor;
use crate::error::ClientError;
use crate::render::Renderer;

enum PumpEnd {
    /// The input channel closed; the session is over.
    Quit,
    /// The socket closed or errored; the retry path applies.
    ConnectionLost,
}

/// Drives one chat session: keeps a single connection alive under the
/// supervisor's retry policy and pumps user input lines and server frames
/// through the client core. Ends only when the input channel closes.
pub struct ChatSession<R: Renderer> {
    url: Url,
    client: ChatClient<R>,
    supervisor: Supervisor,
}

impl<R: Renderer> ChatSession<R> {
    pub fn new(url: Url, retry_delay: Duration, client: ChatClient<R>) -> Self {
        Self {
            url,
            client,
            supervisor: Supervisor::new(retry_delay),
        }
    }

    pub fn client(&self) -> &ChatClient<R> {
        &self.client
    }

    pub async fn run(&mut self, input: &mut UnboundedReceiver<String>) -> Result<(), ClientError> {
        loop {
            let now = Instant::now();
            if !self.supervisor.begin_connect(now) {
                let delay = self.supervisor.delay_remaining(now).unwrap_or_default();
                info!("Reconnecting in {:.1}s", delay.as_secs_f64());
                if !wait_for_retry(delay, input, &mut self.client).await {
                    return Ok(());
                }
                continue;
            }

            info!("Connecting to {}", self.url);
            match connect_async(self.url.clone()).await {
                Ok((websocket, _)) => {
                    info!("Connected to {}", self.url);
                    self.supervisor.established();
                    self.client.connection_opened();

                    let end = pump(websocket, &mut self.client, input).await;

                    self.client.connection_closed();
                    self.supervisor.connection_lost(Instant::now());
                    if let PumpEnd::Quit = end {
                        return Ok(());
                    }
                }
                Err(e) => {
                    error!("Failed to connect to {}: {}", self.url, e);
                    self.supervisor.connection_lost(Instant::now());
                }
            }
        }
    }
}

/// Sleep out the retry delay. Input lines arriving meanwhile are offered to
/// the client, which drops them while disconnected. Returns false when the
/// input channel closes.
async fn wait_for_retry<R: Renderer>(
    delay: Duration,
    input: &mut UnboundedReceiver<String>,
    client: &mut ChatClient<R>
) -> bool {
    let timer = sleep(delay);
    tokio::pin!(timer);
    loop {
        tokio::select! {
            _ = &mut timer => {
                return true;
            }
            line = input.recv() => {
                match line {
                    Some(line) => {
                        let _ = client.send(&line);
                    }
                    None => {
                        return false;
                    }
                }
            }
        }
    }
}

async fn pump<R, S>(
    websocket: WebSocketStream<S>,
    client: &mut ChatClient<R>,
    input: &mut UnboundedReceiver<String>
) -> PumpEnd
    where R: Renderer, S: AsyncRead + AsyncWrite + Unpin
{
    let (mut tx, mut rx) = websocket.split();
    loop {
        tokio::select! {
            line = input.recv() => {
                match line {
                    Some(line) => {
                        if let Some(frame) = client.send(&line) {
                            if let Err(e) = tx.send(Message::Text(frame)).await {
                                error!("Failed to send message: {}", e);
                                return PumpEnd::ConnectionLost;
                            }
                        }
                    }
                    None => {
                        let _ = tx.send(Message::Close(None)).await;
                        return PumpEnd::Quit;
                    }
                }
            }
            msg = rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = client.handle_frame(&text) {
                            error!("Dropping connection: {}", e);
                            return PumpEnd::ConnectionLost;
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if tx.send(Message::Pong(data)).await.is_err() {
                            error!("Failed to send pong");
                            return PumpEnd::ConnectionLost;
                        }
                    }
                    Some(Ok(Message::Pong(_))) => {/* Usually ignore pongs */}
                    Some(Ok(Message::Binary(_))) => {
                        warn!("Ignoring binary message");
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Server closed the connection");
                        return PumpEnd::ConnectionLost;
                    }
                    Some(Ok(Message::Frame(_))) => {/* Usually ignore raw frames */}
                    Some(Err(e)) => {
                        log_socket_error(&e);
                        return PumpEnd::ConnectionLost;
                    }
                    None => {
                        info!("Connection stream ended");
                        return PumpEnd::ConnectionLost;
                    }
                }
            }
        }
    }
}

fn log_socket_error(e: &tokio_tungstenite::tungstenite::Error) {
    match e {
        | tokio_tungstenite::tungstenite::Error::ConnectionClosed
        | tokio_tungstenite::tungstenite::Error::Protocol(_)
        | tokio_tungstenite::tungstenite::Error::Utf8 => {
            info!("Connection closed or protocol error: {}", e);
        }
        tokio_tungstenite::tungstenite::Error::Io(io_err) if
            io_err.kind() == std::io::ErrorKind::ConnectionReset
        => {
            info!("Connection reset by server");
        }
        _ => {
            error!("Error receiving message: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Framing;
    use crate::models::chat::{ Sender, TranscriptEntry };
    use tokio::net::TcpListener;
    use tokio::sync::mpsc::unbounded_channel;
    use tokio_tungstenite::accept_async;

    #[derive(Default)]
    struct RecordingRenderer {
        entries: Vec<TranscriptEntry>,
    }

    impl Renderer for RecordingRenderer {
        fn append(&mut self, entry: &TranscriptEntry) {
            self.entries.push(entry.clone());
        }

        fn set_typing(&mut self, _on: bool) {}
    }

    #[tokio::test]
    async fn exchanges_frames_with_a_local_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let websocket = accept_async(stream).await.unwrap();
            let (mut tx, mut rx) = websocket.split();

            let frame = rx.next().await.unwrap().unwrap();
            assert_eq!(frame.into_text().unwrap(), "how many customers?");

            tx.send(Message::Text(r#"{"type":"answer","content":"three"}"#.into())).await.unwrap();
            // closing the stream sends the client down the retry path
        });

        let url = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let client = ChatClient::new(Framing::Json, RecordingRenderer::default());
        let mut session = ChatSession::new(url, Duration::from_secs(2), client);

        let (input_tx, mut input_rx) = unbounded_channel();
        input_tx.send("how many customers?".to_string()).unwrap();

        let session = tokio::spawn(async move {
            session.run(&mut input_rx).await.unwrap();
            session
        });

        server.await.unwrap();
        // give the client time to drain the reply and the stream end
        sleep(Duration::from_millis(250)).await;
        drop(input_tx);

        let session = session.await.unwrap();
        let entries: Vec<_> = session
            .client()
            .transcript()
            .entries()
            .iter()
            .map(|e| (e.sender, e.text.clone()))
            .collect();
        assert_eq!(
            entries,
            vec![
                (Sender::User, "how many customers?".to_string()),
                (Sender::Bot, "three".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn input_before_the_first_connect_is_dropped() {
        // nothing is listening on this socket, so the first attempt fails
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("ws://{}/ws", addr)).unwrap();
        let client = ChatClient::new(Framing::Json, RecordingRenderer::default());
        let mut session = ChatSession::new(url, Duration::from_millis(50), client);

        let (input_tx, mut input_rx) = unbounded_channel();
        input_tx.send("lost message".to_string()).unwrap();

        let handle = tokio::spawn(async move {
            session.run(&mut input_rx).await.unwrap();
            session
        });

        sleep(Duration::from_millis(100)).await;
        drop(input_tx);

        let session = handle.await.unwrap();
        assert!(session.client().transcript().is_empty());
    }
}
