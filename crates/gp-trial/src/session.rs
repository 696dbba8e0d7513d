//! Interactive remote session transport.
//!
//! Speaks a telnet-style line protocol: authenticate once per worker
//! lifetime, then issue one command per job over the persistent session and
//! watch the stream for the score marker. The session is modeled as an
//! explicit state machine so misuse (running a trial on a dead session)
//! surfaces as an error instead of a hang.

use async_trait::async_trait;
use gp_grid::Job;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, info};

use crate::command::{parse_score, TrialCommand, SCORE_MARKER};
use crate::error::TrialError;
use crate::runner::TrialRunner;

/// Lifecycle of an interactive session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Authenticating,
    Ready,
    Closed,
}

/// Login identity for interactive hosts.
#[derive(Debug, Clone)]
pub struct SessionCredentials {
    pub username: String,
    pub password: String,
}

/// Runs trials over one persistent interactive session.
pub struct SessionRunner {
    host: String,
    addr: String,
    credentials: SessionCredentials,
    command: TrialCommand,
    cwd: PathBuf,
    /// Applies to connection setup and login prompts only; a running trial
    /// is allowed to take as long as the cross-validation does.
    login_timeout: Duration,
    state: SessionState,
    stream: Option<TcpStream>,
}

impl SessionRunner {
    pub fn new(
        host: impl Into<String>,
        credentials: SessionCredentials,
        command: TrialCommand,
    ) -> std::io::Result<Self> {
        let host = host.into();
        let addr = if host.contains(':') {
            host.clone()
        } else {
            format!("{host}:23")
        };
        Ok(Self {
            host,
            addr,
            credentials,
            command,
            cwd: std::env::current_dir()?,
            login_timeout: Duration::from_secs(30),
            state: SessionState::Disconnected,
            stream: None,
        })
    }

    pub fn with_login_timeout(mut self, timeout: Duration) -> Self {
        self.login_timeout = timeout;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }
}

#[async_trait]
impl TrialRunner for SessionRunner {
    fn identity(&self) -> &str {
        &self.host
    }

    async fn connect(&mut self) -> Result<(), TrialError> {
        self.state = SessionState::Authenticating;

        let mut stream = timeout(self.login_timeout, TcpStream::connect(&self.addr))
            .await
            .map_err(|_| TrialError::Timeout {
                waiting_for: self.addr.clone(),
            })??;

        expect_prompt(&mut stream, self.login_timeout, "login:").await?;
        send_line(&mut stream, &self.credentials.username).await?;
        expect_prompt(&mut stream, self.login_timeout, "Password:").await?;
        send_line(&mut stream, &self.credentials.password).await?;

        // The shell greeting echoing the username back is the only login
        // confirmation this protocol gives us.
        expect_prompt(&mut stream, self.login_timeout, &self.credentials.username)
            .await
            .map_err(|e| TrialError::LoginFailed {
                host: self.host.clone(),
                message: e.to_string(),
            })?;

        send_line(&mut stream, &format!("cd {}", self.cwd.display())).await?;

        info!(host = %self.host, "interactive session ready");
        self.stream = Some(stream);
        self.state = SessionState::Ready;
        Ok(())
    }

    async fn run_trial(&mut self, job: &Job) -> Result<f64, TrialError> {
        if self.state != SessionState::Ready {
            return Err(TrialError::SessionClosed);
        }
        let stream = self.stream.as_mut().ok_or(TrialError::SessionClosed)?;

        let line = self.command.shell_line(job);
        debug!(host = %self.host, command = %line, "dispatching trial over session");
        send_line(stream, &line).await?;

        let score_line = expect_line(stream, SCORE_MARKER).await?;
        parse_score(&score_line)
    }

    async fn close(&mut self) -> Result<(), TrialError> {
        if let Some(mut stream) = self.stream.take() {
            // Best-effort teardown; the peer may already be gone.
            let _ = stream.write_all(b"exit\n").await;
            let _ = stream.shutdown().await;
        }
        self.state = SessionState::Closed;
        Ok(())
    }
}

async fn send_line(stream: &mut TcpStream, line: &str) -> Result<(), TrialError> {
    stream.write_all(line.as_bytes()).await?;
    stream.write_all(b"\n").await?;
    Ok(())
}

/// Read until the session output contains `prompt`.
async fn expect_prompt(
    stream: &mut TcpStream,
    wait: Duration,
    prompt: &str,
) -> Result<(), TrialError> {
    timeout(wait, async {
        let mut seen = String::new();
        let mut chunk = [0u8; 1024];
        loop {
            if seen.contains(prompt) {
                return Ok(());
            }
            let n = stream.read(&mut chunk).await?;
            if n == 0 {
                return Err(TrialError::SessionClosed);
            }
            seen.push_str(&String::from_utf8_lossy(&chunk[..n]));
        }
    })
    .await
    .map_err(|_| TrialError::Timeout {
        waiting_for: prompt.to_string(),
    })?
}

/// Read until a complete line containing `marker` arrives, and return it.
async fn expect_line(stream: &mut TcpStream, marker: &str) -> Result<String, TrialError> {
    let mut seen = String::new();
    let mut chunk = [0u8; 1024];
    loop {
        if let Some(idx) = seen.find(marker) {
            if let Some(rel_end) = seen[idx..].find('\n') {
                let start = seen[..idx].rfind('\n').map_or(0, |i| i + 1);
                return Ok(seen[start..idx + rel_end].to_string());
            }
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(TrialError::SessionClosed);
        }
        seen.push_str(&String::from_utf8_lossy(&chunk[..n]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncBufReadExt, BufReader};
    use tokio::net::TcpListener;

    /// Minimal scripted peer: telnet-style login, then answers every
    /// command line with a fixed score until `exit`.
    async fn fake_host(listener: TcpListener, score: f64) {
        let (socket, _) = listener.accept().await.unwrap();
        let (read_half, mut write) = socket.into_split();
        let mut lines = BufReader::new(read_half).lines();

        write.write_all(b"login: ").await.unwrap();
        let username = lines.next_line().await.unwrap().unwrap();
        write.write_all(b"Password: ").await.unwrap();
        let _password = lines.next_line().await.unwrap();
        write
            .write_all(format!("Welcome {username}\n$ ").as_bytes())
            .await
            .unwrap();
        let _cd = lines.next_line().await.unwrap();

        while let Ok(Some(command)) = lines.next_line().await {
            if command == "exit" {
                break;
            }
            write
                .write_all(
                    format!("Cross Validation Mean squared error = {score}\n$ ").as_bytes(),
                )
                .await
                .unwrap();
        }
    }

    fn runner_for(addr: std::net::SocketAddr) -> SessionRunner {
        SessionRunner::new(
            addr.to_string(),
            SessionCredentials {
                username: "grid".into(),
                password: "secret".into(),
            },
            TrialCommand::new("./svm-train", "data.scale", 5),
        )
        .unwrap()
        .with_login_timeout(Duration::from_secs(5))
    }

    #[tokio::test]
    async fn full_session_lifecycle() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(fake_host(listener, 0.25));

        let mut runner = runner_for(addr);
        assert_eq!(runner.state(), SessionState::Disconnected);

        runner.connect().await.unwrap();
        assert_eq!(runner.state(), SessionState::Ready);

        let first = runner.run_trial(&Job::new(Some(1.0), None, None)).await;
        assert_eq!(first.unwrap(), 0.25);

        // The session persists across jobs.
        let second = runner.run_trial(&Job::new(Some(2.0), None, None)).await;
        assert_eq!(second.unwrap(), 0.25);

        runner.close().await.unwrap();
        assert_eq!(runner.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn trial_without_login_is_rejected() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let mut runner = runner_for(addr);
        let err = runner
            .run_trial(&Job::new(Some(1.0), None, None))
            .await
            .unwrap_err();
        assert!(matches!(err, TrialError::SessionClosed));
    }

    #[tokio::test]
    async fn silent_peer_times_out_during_login() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        // Accept the connection but never send a prompt.
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(60)).await;
        });

        let mut runner = runner_for(addr).with_login_timeout(Duration::from_millis(100));
        let err = runner.connect().await.unwrap_err();
        assert!(matches!(err, TrialError::Timeout { .. }));
    }
}
