//! Local SMTP capture service.
//!
//! Notification workflows assert on outgoing mail. [`MailTrap`] binds
//! an ephemeral local port, speaks just enough SMTP to accept a
//! message, and stores it for inspection. The service is an explicitly
//! constructed value with a start/stop lifecycle; each test owns its
//! own instance and port.

use crate::result::{BancadaError, BancadaResult};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// One message accepted by the trap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedMessage {
    /// Envelope sender from `MAIL FROM`
    pub from: String,
    /// Envelope recipients from `RCPT TO`
    pub to: Vec<String>,
    /// Raw message body up to the terminating dot line
    pub body: String,
}

impl CapturedMessage {
    /// First `Subject:` header line of the body, if present
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.body
            .lines()
            .find_map(|line| line.strip_prefix("Subject:"))
            .map(str::trim)
    }
}

/// Minimal SMTP sink bound to an ephemeral local port
pub struct MailTrap {
    port: u16,
    messages: Arc<Mutex<Vec<CapturedMessage>>>,
    accept_task: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for MailTrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailTrap")
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

impl MailTrap {
    /// Bind an ephemeral port and start accepting connections
    pub async fn start() -> BancadaResult<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let port = listener
            .local_addr()
            .map_err(|e| BancadaError::Smtp {
                message: format!("no local address: {e}"),
            })?
            .port();
        debug!(port, "mail trap listening");

        let messages: Arc<Mutex<Vec<CapturedMessage>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&messages);
        let accept_task = tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => {
                        let sink = Arc::clone(&sink);
                        let _ = tokio::spawn(async move {
                            if let Err(e) = serve_session(stream, &sink).await {
                                warn!(error = %e, "mail trap session failed");
                            }
                        });
                    }
                    Err(e) => {
                        warn!(error = %e, "mail trap accept failed");
                        break;
                    }
                }
            }
        });

        Ok(Self {
            port,
            messages,
            accept_task: Some(accept_task),
        })
    }

    /// Port the trap is listening on
    #[must_use]
    pub const fn port(&self) -> u16 {
        self.port
    }

    /// Messages captured so far, oldest first
    #[must_use]
    pub fn captured(&self) -> Vec<CapturedMessage> {
        self.messages.lock().unwrap().clone()
    }

    /// Drop all captured messages
    pub fn clear(&self) {
        self.messages.lock().unwrap().clear();
    }

    /// Stop accepting connections
    pub fn stop(&mut self) {
        if let Some(task) = self.accept_task.take() {
            task.abort();
            debug!(port = self.port, "mail trap stopped");
        }
    }
}

impl Drop for MailTrap {
    fn drop(&mut self) {
        self.stop();
    }
}

async fn serve_session(
    stream: TcpStream,
    sink: &Mutex<Vec<CapturedMessage>>,
) -> BancadaResult<()> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    writer.write_all(b"220 bancada mail trap\r\n").await?;

    let mut from = String::new();
    let mut to: Vec<String> = Vec::new();
    let mut in_data = false;
    let mut body = String::new();

    while let Some(line) = lines.next_line().await? {
        if in_data {
            if line == "." {
                in_data = false;
                sink.lock().unwrap().push(CapturedMessage {
                    from: std::mem::take(&mut from),
                    to: std::mem::take(&mut to),
                    body: std::mem::take(&mut body),
                });
                writer.write_all(b"250 OK\r\n").await?;
            } else {
                body.push_str(&line);
                body.push('\n');
            }
            continue;
        }

        let upper = line.to_uppercase();
        if upper.starts_with("HELO") || upper.starts_with("EHLO") {
            writer.write_all(b"250 bancada\r\n").await?;
        } else if upper.starts_with("MAIL FROM:") {
            from = strip_angle_brackets(&line["MAIL FROM:".len()..]);
            writer.write_all(b"250 OK\r\n").await?;
        } else if upper.starts_with("RCPT TO:") {
            to.push(strip_angle_brackets(&line["RCPT TO:".len()..]));
            writer.write_all(b"250 OK\r\n").await?;
        } else if upper.starts_with("DATA") {
            in_data = true;
            body.clear();
            writer.write_all(b"354 end with <CRLF>.<CRLF>\r\n").await?;
        } else if upper.starts_with("QUIT") {
            writer.write_all(b"221 bye\r\n").await?;
            break;
        } else {
            writer.write_all(b"250 OK\r\n").await?;
        }
    }
    Ok(())
}

fn strip_angle_brackets(address: &str) -> String {
    address
        .trim()
        .trim_start_matches('<')
        .trim_end_matches('>')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    async fn send_command(stream: &mut TcpStream, command: &str) -> String {
        stream.write_all(command.as_bytes()).await.unwrap();
        stream.write_all(b"\r\n").await.unwrap();
        read_reply(stream).await
    }

    async fn read_reply(stream: &mut TcpStream) -> String {
        let mut buf = [0u8; 256];
        let n = stream.read(&mut buf).await.unwrap();
        String::from_utf8_lossy(&buf[..n]).to_string()
    }

    #[tokio::test]
    async fn test_captures_a_message() {
        let trap = MailTrap::start().await.unwrap();
        let mut stream = TcpStream::connect(("127.0.0.1", trap.port())).await.unwrap();

        assert!(read_reply(&mut stream).await.starts_with("220"));
        assert!(send_command(&mut stream, "HELO test").await.starts_with("250"));
        let _ = send_command(&mut stream, "MAIL FROM:<qc@example.org>").await;
        let _ = send_command(&mut stream, "RCPT TO:<reviewer@example.org>").await;
        assert!(send_command(&mut stream, "DATA").await.starts_with("354"));
        stream
            .write_all(b"Subject: QC complete\r\nAll samples passed.\r\n.\r\n")
            .await
            .unwrap();
        assert!(read_reply(&mut stream).await.starts_with("250"));
        let _ = send_command(&mut stream, "QUIT").await;

        let captured = trap.captured();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].from, "qc@example.org");
        assert_eq!(captured[0].to, vec!["reviewer@example.org"]);
        assert_eq!(captured[0].subject(), Some("QC complete"));
    }

    #[tokio::test]
    async fn test_clear_and_stop() {
        let mut trap = MailTrap::start().await.unwrap();
        let port = trap.port();
        {
            let mut stream = TcpStream::connect(("127.0.0.1", port)).await.unwrap();
            let _ = read_reply(&mut stream).await;
            let _ = send_command(&mut stream, "MAIL FROM:<a@b>").await;
            let _ = send_command(&mut stream, "RCPT TO:<c@d>").await;
            let _ = send_command(&mut stream, "DATA").await;
            stream.write_all(b"hi\r\n.\r\n").await.unwrap();
            let _ = read_reply(&mut stream).await;
        }
        assert_eq!(trap.captured().len(), 1);
        trap.clear();
        assert!(trap.captured().is_empty());

        trap.stop();
        // Connections are refused once stopped.
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        assert!(TcpStream::connect(("127.0.0.1", port)).await.is_err());
    }

    #[tokio::test]
    async fn test_each_trap_gets_its_own_port() {
        let a = MailTrap::start().await.unwrap();
        let b = MailTrap::start().await.unwrap();
        assert_ne!(a.port(), b.port());
    }
}
