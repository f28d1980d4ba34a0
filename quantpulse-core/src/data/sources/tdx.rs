//! TDX terminal protocol — binary TCP fallback that dodges HTTP blocking.
//!
//! The terminal protocol session is not safe for concurrent use, so a fresh
//! connection is opened inside every call and closed when the session drops —
//! on success, failure, and early return alike. Never hold a shared
//! process-global handle to one of these.
//!
//! Wire format (little-endian): a framed request carrying command 0x052d
//! (daily security bars) with market id, 6-byte ASCII code, category, start
//! and count; the reply is a length-prefixed payload of a record count
//! followed by 28-byte bar records: u32 date (YYYYMMDD), four u32 prices in
//! centi-units, u64 volume.

use crate::data::source::{BarSource, RawBarBatch, RawRow, SourceError};
use crate::domain::{market, Market};
use serde_json::json;
use std::io::{Read, Write};
use std::net::{TcpStream, ToSocketAddrs};
use std::time::Duration;

const CMD_SECURITY_BARS: u16 = 0x052d;
const CATEGORY_DAILY: u16 = 9;
const BAR_COUNT: u16 = 320;
const RECORD_LEN: usize = 28;

/// Handshake bytes sent once per connection before any request.
const SETUP: &[u8] = &[0x0c, 0x02, 0x18, 0x93, 0x00, 0x01, 0x03, 0x00, 0x03, 0x00, 0x0d, 0x00, 0x01];

pub struct TdxAdapter {
    addr: String,
    timeout: Duration,
}

impl TdxAdapter {
    pub fn new() -> Self {
        Self::with_addr("119.147.212.81:7709")
    }

    pub fn with_addr(addr: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl Default for TdxAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl BarSource for TdxAdapter {
    fn name(&self) -> &'static str {
        "tdx"
    }

    fn fetch(&self, code: &str, _market: Market) -> Result<RawBarBatch, SourceError> {
        let bare = market::bare_code(code);
        let market_id: u16 = if bare.starts_with('6') { 1 } else { 0 };

        // Request-local session: dropped (and the socket closed) on every
        // exit path of this function.
        let mut session = TdxSession::connect(&self.addr, self.timeout)?;
        let payload = session.security_bars(market_id, bare)?;
        let rows = parse_bars(&payload)?;
        if rows.is_empty() {
            return Err(SourceError::EmptyPayload);
        }
        Ok(RawBarBatch::new(rows))
    }
}

/// One short-lived protocol session over a dedicated socket.
struct TdxSession {
    stream: TcpStream,
}

impl TdxSession {
    fn connect(addr: &str, timeout: Duration) -> Result<Self, SourceError> {
        let sock_addr = addr
            .to_socket_addrs()
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?
            .next()
            .ok_or_else(|| SourceError::NetworkUnreachable(format!("cannot resolve {addr}")))?;

        let stream = TcpStream::connect_timeout(&sock_addr, timeout)
            .map_err(|e| SourceError::NetworkUnreachable(e.to_string()))?;
        stream
            .set_read_timeout(Some(timeout))
            .map_err(|e| SourceError::Other(e.to_string()))?;
        stream
            .set_write_timeout(Some(timeout))
            .map_err(|e| SourceError::Other(e.to_string()))?;

        let mut session = Self { stream };
        session.send(SETUP)?;
        // The setup acknowledgement carries no information we need.
        session.read_payload()?;
        Ok(session)
    }

    /// Request daily bars; returns the raw reply payload.
    fn security_bars(&mut self, market_id: u16, code: &str) -> Result<Vec<u8>, SourceError> {
        if code.len() != 6 || !code.chars().all(|c| c.is_ascii_digit()) {
            return Err(SourceError::SymbolNotFound {
                symbol: code.to_string(),
            });
        }

        let mut body = Vec::with_capacity(16);
        body.extend_from_slice(&CMD_SECURITY_BARS.to_le_bytes());
        body.extend_from_slice(&market_id.to_le_bytes());
        body.extend_from_slice(code.as_bytes());
        body.extend_from_slice(&CATEGORY_DAILY.to_le_bytes());
        body.extend_from_slice(&0u16.to_le_bytes()); // start offset
        body.extend_from_slice(&BAR_COUNT.to_le_bytes());

        let mut frame = Vec::with_capacity(body.len() + 10);
        frame.push(0x0c);
        frame.extend_from_slice(&1u32.to_le_bytes()); // sequence
        frame.push(0x00);
        let len = body.len() as u16;
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&len.to_le_bytes());
        frame.extend_from_slice(&body);

        self.send(&frame)?;
        self.read_payload()
    }

    fn send(&mut self, bytes: &[u8]) -> Result<(), SourceError> {
        self.stream
            .write_all(bytes)
            .map_err(|e| map_io(e, "write"))
    }

    /// Read one length-prefixed reply payload.
    fn read_payload(&mut self) -> Result<Vec<u8>, SourceError> {
        let mut len_buf = [0u8; 2];
        self.stream
            .read_exact(&mut len_buf)
            .map_err(|e| map_io(e, "read length"))?;
        let len = u16::from_le_bytes(len_buf) as usize;

        let mut payload = vec![0u8; len];
        self.stream
            .read_exact(&mut payload)
            .map_err(|e| map_io(e, "read payload"))?;
        Ok(payload)
    }
}

fn map_io(err: std::io::Error, context: &str) -> SourceError {
    if err.kind() == std::io::ErrorKind::WouldBlock || err.kind() == std::io::ErrorKind::TimedOut {
        SourceError::Timeout(format!("{context}: {err}"))
    } else {
        SourceError::NetworkUnreachable(format!("{context}: {err}"))
    }
}

/// Parse a bar-list payload: u16 record count, then fixed-width records.
fn parse_bars(payload: &[u8]) -> Result<Vec<RawRow>, SourceError> {
    if payload.len() < 2 {
        return Err(SourceError::ResponseFormatChanged(
            "bar payload shorter than its count field".into(),
        ));
    }
    let count = u16::from_le_bytes([payload[0], payload[1]]) as usize;
    let records = &payload[2..];
    if records.len() < count * RECORD_LEN {
        return Err(SourceError::ResponseFormatChanged(format!(
            "expected {count} records, payload holds {}",
            records.len() / RECORD_LEN
        )));
    }

    let mut rows = Vec::with_capacity(count);
    for chunk in records.chunks_exact(RECORD_LEN).take(count) {
        let date = read_u32(chunk, 0);
        let open = read_u32(chunk, 4) as f64 / 100.0;
        let high = read_u32(chunk, 8) as f64 / 100.0;
        let low = read_u32(chunk, 12) as f64 / 100.0;
        let close = read_u32(chunk, 16) as f64 / 100.0;
        let volume = read_u64(chunk, 20) as f64;

        rows.push(
            [
                ("datetime", json!(date)),
                ("open", json!(open)),
                ("high", json!(high)),
                ("low", json!(low)),
                ("close", json!(close)),
                ("vol", json!(volume)),
            ]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect::<RawRow>(),
        );
    }
    Ok(rows)
}

fn read_u32(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(buf[offset..offset + 4].try_into().expect("bounds checked"))
}

fn read_u64(buf: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(buf[offset..offset + 8].try_into().expect("bounds checked"))
}
