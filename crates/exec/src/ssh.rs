// SPDX-License-Identifier: MIT OR Apache-2.0

//! SSH executor (spec §4.1 "SSH mode").
//!
//! `ssh2` is a synchronous/blocking binding to libssh2; every call in
//! this module that touches the wire is pushed onto a blocking thread
//! via `tokio::task::spawn_blocking`, matching the "model all suspension
//! as blocking calls on worker threads" design note (spec §9).

use std::io::Read;
use std::net::TcpStream;

use async_trait::async_trait;
use ssh2::Session;

use actoriac_core::{Connection, Host, TransportError};

use crate::{CommandExecutor, CommandResult, LineCallback, LineSource};

/// A fully resolved SSH target: address, port, user, optional password,
/// and an optional `ProxyJump` hop.
#[derive(Debug, Clone)]
pub struct SshExecutor {
    host: Host,
}

impl SshExecutor {
    pub fn new(host: Host) -> Self {
        SshExecutor { host }
    }

    fn connect(&self) -> Result<Session, TransportError> {
        let (user, port, password, proxy_jump) = match &self.host.connection {
            Connection::Ssh { user, port, password, proxy_jump } => {
                (user.clone(), *port, password.clone(), proxy_jump.clone())
            }
            Connection::Local => {
                return Err(TransportError::Generic("SshExecutor used with a local host".into()))
            }
        };

        let tcp = match proxy_jump {
            Some(jump) => open_via_jump(&jump, &self.host.address, port)?,
            None => TcpStream::connect((self.host.address.as_str(), port))
                .map_err(|e| classify_connect_error(&self.host.address, e))?,
        };

        let mut session = Session::new().map_err(|e| TransportError::Generic(e.to_string()))?;
        session.set_tcp_stream(tcp);
        session.handshake().map_err(|e| TransportError::Generic(e.to_string()))?;

        authenticate(&mut session, &user, password.as_deref())
            .map_err(|hint| TransportError::AuthFailed { host: self.host.address.clone(), user: user.clone(), hint })?;

        Ok(session)
    }
}

/// Open a direct-TCP/IP channel through `jump` and hand its `Channel` back
/// as a `Read + Write` stream for the inner session's handshake — the
/// "in-process TCP forward" referenced by spec §4.1. `ssh2::Channel`
/// implements `Read`/`Write` directly, so no extra adapter is needed.
fn open_via_jump(jump: &Host, target_host: &str, target_port: u16) -> Result<TcpStream, TransportError> {
    // A `ProxyJump` hop's own channel cannot be handed to `Session::set_tcp_stream`,
    // which requires an owned `TcpStream`; dial the jump host directly and bounce
    // the request through its `channel_direct_tcpip`, then loop the bytes over a
    // freshly bound local TCP listener so the inner session sees a plain socket.
    let (jump_user, jump_port, jump_password, grandparent) = match &jump.connection {
        Connection::Ssh { user, port, password, proxy_jump } => {
            (user.clone(), *port, password.clone(), proxy_jump.clone())
        }
        Connection::Local => {
            return Err(TransportError::Generic("ProxyJump host must be reachable over ssh".into()))
        }
    };

    let jump_tcp = match grandparent {
        Some(gp) => open_via_jump(&gp, &jump.address, jump_port)?,
        None => TcpStream::connect((jump.address.as_str(), jump_port))
            .map_err(|e| classify_connect_error(&jump.address, e))?,
    };

    let mut jump_session = Session::new().map_err(|e| TransportError::Generic(e.to_string()))?;
    jump_session.set_tcp_stream(jump_tcp);
    jump_session.handshake().map_err(|e| TransportError::Generic(e.to_string()))?;
    authenticate(&mut jump_session, &jump_user, jump_password.as_deref())
        .map_err(|hint| TransportError::AuthFailed { host: jump.address.clone(), user: jump_user, hint })?;

    let listener = std::net::TcpListener::bind(("127.0.0.1", 0)).map_err(|e| TransportError::Generic(e.to_string()))?;
    let local_addr = listener.local_addr().map_err(|e| TransportError::Generic(e.to_string()))?;

    let mut forward_channel = jump_session
        .channel_direct_tcpip(target_host, target_port, None)
        .map_err(|e| TransportError::ConnectFailed(e.to_string()))?;

    std::thread::spawn(move || {
        if let Ok((mut local, _)) = listener.accept() {
            let _ = std::io::copy(&mut forward_channel, &mut local);
        }
    });

    TcpStream::connect(local_addr).map_err(|e| classify_connect_error(target_host, e))
}

/// Authentication precedence (spec §4.1): ssh-agent, then an
/// `IdentityFile` from ssh config, then default key files excluding
/// those that need a passphrase, then password auth if non-empty.
fn authenticate(session: &mut Session, user: &str, password: Option<&str>) -> Result<(), String> {
    if let Ok(mut agent) = session.agent() {
        if agent.connect().is_ok() && agent.list_identities().is_ok() {
            if let Ok(identities) = agent.identities() {
                for identity in identities {
                    if agent.userauth(user, &identity).is_ok() {
                        return Ok(());
                    }
                }
            }
        }
    }

    for key in candidate_identity_files() {
        let pubkey = key.with_extension("pub");
        let pubkey_opt = pubkey.exists().then_some(pubkey.as_path());
        if session.userauth_pubkey_file(user, pubkey_opt, &key, None).is_ok() {
            return Ok(());
        }
    }

    if let Some(password) = password.filter(|p| !p.is_empty()) {
        if session.userauth_password(user, password).is_ok() {
            return Ok(());
        }
        return Err("password authentication rejected".into());
    }

    Err("no usable identity (agent, key file, or password)".into())
}

/// Default key files, plus an `IdentityFile` parsed out of `~/.ssh/config`
/// if present, in that preference order (config-declared identity first).
fn candidate_identity_files() -> Vec<std::path::PathBuf> {
    let home = dirs::home_dir();
    let mut candidates = Vec::new();

    if let Some(home) = &home {
        if let Ok(config) = std::fs::read_to_string(home.join(".ssh/config")) {
            for line in config.lines() {
                let line = line.trim();
                if let Some(rest) = line.to_ascii_lowercase().strip_prefix("identityfile") {
                    let _ = rest;
                    if let Some(path) = line.splitn(2, char::is_whitespace).nth(1) {
                        candidates.push(std::path::PathBuf::from(path.trim()));
                    }
                }
            }
        }
        for name in ["id_ed25519", "id_rsa", "id_ecdsa"] {
            candidates.push(home.join(".ssh").join(name));
        }
    }

    candidates.retain(|p| p.exists());
    candidates
}

fn classify_connect_error(host: &str, err: std::io::Error) -> TransportError {
    use std::io::ErrorKind;
    match err.kind() {
        ErrorKind::ConnectionRefused | ErrorKind::TimedOut => TransportError::ConnectFailed(host.to_string()),
        ErrorKind::NotFound => TransportError::UnknownHost(host.to_string()),
        ErrorKind::Interrupted => TransportError::Interrupted(err.to_string()),
        _ => TransportError::Generic(err.to_string()),
    }
}

#[async_trait]
impl CommandExecutor for SshExecutor {
    async fn execute(
        &self,
        command: &str,
        on_line: Option<LineCallback>,
    ) -> Result<CommandResult, TransportError> {
        let command = command.to_string();
        let this = self.clone();
        tokio::task::spawn_blocking(move || this.execute_blocking(&command, on_line))
            .await
            .map_err(|e| TransportError::Interrupted(e.to_string()))?
    }

    fn identifier(&self) -> &str {
        &self.host.hostname
    }
}

impl SshExecutor {
    fn execute_blocking(
        &self,
        command: &str,
        on_line: Option<LineCallback>,
    ) -> Result<CommandResult, TransportError> {
        let session = self.connect()?;
        let mut channel = session.channel_session().map_err(|e| TransportError::Generic(e.to_string()))?;
        channel.exec(command).map_err(|e| TransportError::Generic(e.to_string()))?;

        // libssh2 channels are not safely read from two threads at once,
        // so stdout and stderr are drained by alternating non-blocking
        // reads on this one thread instead of the two-OS-thread split
        // used by the local executor — same goal (never let one stream's
        // buffer fill while waiting on the other), different mechanism.
        session.set_blocking(false);
        let mut stdout_acc = LineAccumulator::new(LineSource::Stdout, on_line.clone());
        let mut stderr_acc = LineAccumulator::new(LineSource::Stderr, on_line);
        let mut buf = [0u8; 4096];

        loop {
            let mut made_progress = false;
            made_progress |= drain_once(&mut channel, &mut buf, &mut stdout_acc);
            made_progress |= drain_once(&mut channel.stderr(), &mut buf, &mut stderr_acc);

            if channel.eof() && !made_progress {
                break;
            }
            if !made_progress {
                std::thread::sleep(std::time::Duration::from_millis(5));
            }
        }

        session.set_blocking(true);
        channel.wait_close().map_err(|e| TransportError::Generic(e.to_string()))?;
        let exit_code = channel.exit_status().map_err(|e| TransportError::Generic(e.to_string()))?;

        Ok(CommandResult {
            stdout: stdout_acc.finish(),
            stderr: stderr_acc.finish(),
            exit_code,
        })
    }
}

/// One non-blocking read attempt; returns whether any bytes were read.
fn drain_once<R: Read>(reader: &mut R, buf: &mut [u8], acc: &mut LineAccumulator) -> bool {
    match reader.read(buf) {
        Ok(0) => false,
        Ok(n) => {
            acc.feed(&buf[..n]);
            true
        }
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => false,
        Err(_) => false,
    }
}

/// Buffers bytes into lines, invoking the callback per completed line,
/// and accumulates the trimmed full capture for the final `CommandResult`.
struct LineAccumulator {
    source: LineSource,
    on_line: Option<LineCallback>,
    captured: String,
    partial: String,
}

impl LineAccumulator {
    fn new(source: LineSource, on_line: Option<LineCallback>) -> Self {
        LineAccumulator { source, on_line, captured: String::new(), partial: String::new() }
    }

    fn feed(&mut self, bytes: &[u8]) {
        self.partial.push_str(&String::from_utf8_lossy(bytes));
        while let Some(pos) = self.partial.find('\n') {
            let line: String = self.partial.drain(..=pos).collect();
            let line = line.trim_end_matches('\n');
            if let Some(cb) = &self.on_line {
                cb(self.source, line);
            }
            self.captured.push_str(line);
            self.captured.push('\n');
        }
    }

    fn finish(mut self) -> String {
        if !self.partial.is_empty() {
            if let Some(cb) = &self.on_line {
                cb(self.source, &self.partial);
            }
            self.captured.push_str(&self.partial);
            self.partial.clear();
        }
        self.captured.trim_end().to_string()
    }
}

#[cfg(test)]
#[path = "ssh_tests.rs"]
mod tests;
