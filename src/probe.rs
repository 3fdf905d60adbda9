use anyhow::{Context, Result, anyhow};
use std::fmt;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use url::Host;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const MAX_STATUS_LINE: u64 = 1024;

pub const STATUS_CONNECTING: &str = "Connecting to media server...";
pub const STATUS_READY: &str = "Media Center Ready!";
pub const STATUS_TROUBLE: &str = "Connection issues - check settings";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeOutcome {
    Reachable,
    Unreachable,
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reachable => f.write_str("reachable"),
            Self::Unreachable => f.write_str("unreachable"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProbeReport {
    pub outcome: ProbeOutcome,
    pub detail: String,
    pub elapsed: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeMode {
    Network {
        timeout: Duration,
    },
    /// Waits out the delay and reports a fixed outcome without touching the network.
    Simulated {
        delay: Duration,
        outcome: ProbeOutcome,
    },
}

impl ProbeMode {
    pub async fn run(self, address: &str) -> ProbeReport {
        match self {
            Self::Network { timeout } => probe(address, timeout).await,
            Self::Simulated { delay, outcome } => {
                let started = Instant::now();
                tokio::time::sleep(delay).await;
                ProbeReport {
                    outcome,
                    detail: "simulated".to_owned(),
                    elapsed: started.elapsed(),
                }
            }
        }
    }
}

/// Checks that something answers HTTP at `address`, bounded by `timeout`.
///
/// The request targets the address's own path and query, so `http://h:8600/web`
/// checks `/web` rather than the server root.
pub async fn probe(address: &str, timeout: Duration) -> ProbeReport {
    let started = Instant::now();
    let result = match tokio::time::timeout(timeout, probe_http(address)).await {
        Ok(inner) => inner,
        Err(_) => Err(anyhow!("no answer within {} ms", timeout.as_millis())),
    };

    let elapsed = started.elapsed();
    match result {
        Ok(code) => {
            log::debug!("probe {address}: HTTP {code} in {elapsed:?}");
            ProbeReport {
                outcome: ProbeOutcome::Reachable,
                detail: format!("HTTP {code}"),
                elapsed,
            }
        }
        Err(err) => {
            log::warn!("probe {address} failed: {err:#}");
            ProbeReport {
                outcome: ProbeOutcome::Unreachable,
                detail: format!("{err:#}"),
                elapsed,
            }
        }
    }
}

async fn probe_http(address: &str) -> Result<u16> {
    let parsed =
        url::Url::parse(address.trim()).with_context(|| format!("invalid address '{address}'"))?;
    let host = parsed
        .host()
        .ok_or_else(|| anyhow!("address '{address}' has no host"))?;
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| anyhow!("address '{address}' has no port"))?;
    // Display keeps IPv6 literals bracketed, as the Host header needs.
    let authority = format!("{host}:{port}");

    let connected = match host {
        Host::Domain(name) => TcpStream::connect((name, port)).await,
        Host::Ipv4(ip) => TcpStream::connect(SocketAddr::from((ip, port))).await,
        Host::Ipv6(ip) => TcpStream::connect(SocketAddr::from((ip, port))).await,
    };
    let mut socket = connected.with_context(|| format!("connect failed: {authority}"))?;

    let target = match parsed.query() {
        Some(query) => format!("{}?{query}", parsed.path()),
        None => parsed.path().to_owned(),
    };
    let request = format!(
        "HEAD {target} HTTP/1.1\r\nHost: {authority}\r\nUser-Agent: {USER_AGENT}\r\nConnection: close\r\n\r\n"
    );
    socket
        .write_all(request.as_bytes())
        .await
        .context("failed writing HTTP request")?;

    let mut reader = BufReader::new(socket).take(MAX_STATUS_LINE);
    let mut line = Vec::new();
    let read_n = reader
        .read_until(b'\n', &mut line)
        .await
        .context("failed reading HTTP response")?;
    if read_n == 0 {
        return Err(anyhow!("server closed the connection without answering"));
    }

    parse_http_status(&line)
}

fn parse_http_status(raw: &[u8]) -> Result<u16> {
    let text = String::from_utf8_lossy(raw);
    let line = text
        .lines()
        .next()
        .ok_or_else(|| anyhow!("HTTP response missing status line"))?;

    let mut parts = line.split_whitespace();
    let protocol = parts
        .next()
        .ok_or_else(|| anyhow!("HTTP response missing protocol"))?;
    if !protocol.starts_with("HTTP/") {
        return Err(anyhow!("invalid HTTP protocol marker in response"));
    }

    let code = parts
        .next()
        .ok_or_else(|| anyhow!("HTTP response missing status code"))?
        .parse::<u16>()
        .context("invalid HTTP status code")?;

    Ok(code)
}

/// Runs one probe in the background; the result is tagged with `generation`.
///
/// Earlier probes are left running, so results can arrive out of order.
pub fn spawn_probe(
    mode: ProbeMode,
    address: String,
    generation: u64,
    tx: mpsc::UnboundedSender<(u64, ProbeReport)>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let report = mode.run(&address).await;
        let _ = tx.send((generation, report));
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusTone {
    Pending,
    Success,
    Warning,
}

/// What the home screen shows about the server.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    text: String,
    tone: StatusTone,
    issued: u64,
    applied: u64,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            text: String::new(),
            tone: StatusTone::Pending,
            issued: 0,
            applied: 0,
        }
    }
}

impl StatusBoard {
    pub fn begin(&mut self) -> u64 {
        self.issued = self.issued.saturating_add(1);
        STATUS_CONNECTING.clone_into(&mut self.text);
        self.tone = StatusTone::Pending;
        self.issued
    }

    /// Returns false when a newer probe already reported.
    pub fn apply(&mut self, generation: u64, report: &ProbeReport) -> bool {
        if generation < self.applied {
            log::info!(
                "dropping stale probe #{generation} ({}); #{} already reported",
                report.outcome,
                self.applied
            );
            return false;
        }
        self.applied = generation;

        match report.outcome {
            ProbeOutcome::Reachable => {
                STATUS_READY.clone_into(&mut self.text);
                self.tone = StatusTone::Success;
            }
            ProbeOutcome::Unreachable => {
                self.text = format!("{STATUS_TROUBLE} ({})", report.detail);
                self.tone = StatusTone::Warning;
            }
        }
        true
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub const fn tone(&self) -> StatusTone {
        self.tone
    }

    #[must_use]
    pub const fn in_flight(&self) -> bool {
        self.applied < self.issued
    }
}
