use crate::input::{parse_command, Command, HELP};
use crate::session::Session;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use log::{error, info, warn};
use shared::{decode_server_message, encode, ClientMessage};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

pub struct Client {
    sink: SplitSink<Socket, Message>,
    source: SplitStream<Socket>,
    session: Session,
    auto_join: bool,
}

impl Client {
    pub async fn new(url: &str, auto_join: bool) -> Result<Self, Box<dyn std::error::Error>> {
        let (ws_stream, _) = connect_async(url).await?;
        info!("Connected to {}", url);
        let (sink, source) = ws_stream.split();

        Ok(Client {
            sink,
            source,
            session: Session::new(),
            auto_join,
        })
    }

    async fn send(&mut self, message: &ClientMessage) -> Result<(), Box<dyn std::error::Error>> {
        self.sink.send(Message::Text(encode(message))).await?;
        Ok(())
    }

    /// Handles one command. Returns false when the viewer asked to quit.
    async fn handle_command(&mut self, command: Command) -> Result<bool, Box<dyn std::error::Error>> {
        match command {
            Command::Quit => return Ok(false),
            Command::Help => println!("{}", HELP),
            _ => {
                if let Some(message) = self.session.request_for(command) {
                    self.send(&message).await?;
                }
            }
        }
        Ok(true)
    }

    fn handle_frame(&mut self, text: &str) {
        match decode_server_message(text) {
            Ok(message) => {
                self.session.apply(&message);
                println!("{:?} (video {:?})", self.session.playback, self.session.video);
            }
            Err(e) => warn!("Ignoring frame from server: {}", e),
        }
    }

    pub async fn run(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        if self.auto_join {
            self.handle_command(Command::Join { ignore: None }).await?;
        }
        println!("{}", HELP);

        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        loop {
            tokio::select! {
                frame = self.source.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.handle_frame(&text),
                        Some(Ok(Message::Close(_))) | None => {
                            info!("Server closed the connection");
                            break;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            error!("Error receiving frame: {}", e);
                            break;
                        }
                    }
                },

                line = lines.next_line() => {
                    let Some(line) = line? else { break };
                    match parse_command(&line) {
                        Some(command) => {
                            if !self.handle_command(command).await? {
                                break;
                            }
                        }
                        None if line.trim().is_empty() => {}
                        None => println!("{}", HELP),
                    }
                },
            }
        }

        let _ = self.sink.close().await;
        Ok(())
    }
}
