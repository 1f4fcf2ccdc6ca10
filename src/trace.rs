//! Memory access traces.
//!
//! A trace is a whitespace separated stream of records
//! `<processor> <op> <address>`: a decimal processor id, `r` or `w`, and a
//! hexadecimal address with an optional `0x` prefix. Records are usually one
//! per line but line breaks carry no meaning.
//!
//! Reading stops at the end of input or at the first malformed record.

use crate::address;
use stats::mem::AccessKind;
use std::collections::VecDeque;
use std::io::BufRead;
use std::path::Path;

/// A single processor memory access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Event {
    pub processor: usize,
    pub kind: AccessKind,
    pub addr: address,
}

impl Event {
    #[must_use]
    pub fn new(processor: usize, kind: AccessKind, addr: address) -> Self {
        Self {
            processor,
            kind,
            addr,
        }
    }

    #[must_use]
    pub fn read(processor: usize, addr: address) -> Self {
        Self::new(processor, AccessKind::READ, addr)
    }

    #[must_use]
    pub fn write(processor: usize, addr: address) -> Self {
        Self::new(processor, AccessKind::WRITE, addr)
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} {} {:x}", self.processor, self.kind, self.addr)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("truncated record: missing {0}")]
    Truncated(&'static str),
    #[error("bad processor id {0:?}")]
    Processor(String),
    #[error("bad access kind {0:?} (expected r or w)")]
    Op(String),
    #[error("bad address {0:?}")]
    Address(String),
}

fn parse_processor(token: &str) -> Result<usize, ParseError> {
    token
        .parse()
        .map_err(|_| ParseError::Processor(token.to_string()))
}

fn parse_op(token: &str) -> Result<AccessKind, ParseError> {
    let mut chars = token.chars();
    match (chars.next(), chars.next()) {
        (Some(op), None) => AccessKind::from_op(op),
        _ => None,
    }
    .ok_or_else(|| ParseError::Op(token.to_string()))
}

fn parse_address(token: &str) -> Result<address, ParseError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);
    address::from_str_radix(digits, 16).map_err(|_| ParseError::Address(token.to_string()))
}

impl std::str::FromStr for Event {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut tokens = s.split_whitespace();
        let processor = tokens.next().ok_or(ParseError::Truncated("processor"))?;
        let op = tokens.next().ok_or(ParseError::Truncated("access kind"))?;
        let addr = tokens.next().ok_or(ParseError::Truncated("address"))?;
        Ok(Self {
            processor: parse_processor(processor)?,
            kind: parse_op(op)?,
            addr: parse_address(addr)?,
        })
    }
}

/// Streaming trace reader.
///
/// Yields events in file order and ends silently at the first malformed
/// record, which can be inspected with [`Reader::error`].
#[derive(Debug)]
pub struct Reader<R> {
    inner: R,
    tokens: VecDeque<String>,
    line: usize,
    error: Option<ParseError>,
    done: bool,
}

impl<R> Reader<R>
where
    R: BufRead,
{
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            tokens: VecDeque::new(),
            line: 0,
            error: None,
            done: false,
        }
    }

    /// The malformed record that ended the trace early, if any.
    #[must_use]
    pub fn error(&self) -> Option<&ParseError> {
        self.error.as_ref()
    }

    fn next_token(&mut self) -> Option<String> {
        loop {
            if let Some(token) = self.tokens.pop_front() {
                return Some(token);
            }
            let mut buf = String::new();
            match self.inner.read_line(&mut buf) {
                Ok(0) => return None,
                Ok(_) => {
                    self.line += 1;
                    self.tokens
                        .extend(buf.split_whitespace().map(str::to_string));
                }
                Err(err) => {
                    log::warn!("stopped reading trace at line {}: {}", self.line + 1, err);
                    return None;
                }
            }
        }
    }

    fn parse_record(&mut self, processor: &str) -> Result<Event, ParseError> {
        let processor = parse_processor(processor)?;
        let op = self
            .next_token()
            .ok_or(ParseError::Truncated("access kind"))?;
        let kind = parse_op(&op)?;
        let addr = self.next_token().ok_or(ParseError::Truncated("address"))?;
        let addr = parse_address(&addr)?;
        Ok(Event {
            processor,
            kind,
            addr,
        })
    }

    fn next_event(&mut self) -> Option<Result<Event, ParseError>> {
        let processor = self.next_token()?;
        Some(self.parse_record(&processor))
    }
}

impl<R> Iterator for Reader<R>
where
    R: BufRead,
{
    type Item = Event;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_event() {
            Some(Ok(event)) => Some(event),
            Some(Err(err)) => {
                log::debug!("trace ends at line {}: {}", self.line, err);
                self.error = Some(err);
                self.done = true;
                None
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Open a trace file for reading.
pub fn open(
    path: impl AsRef<Path>,
) -> Result<Reader<std::io::BufReader<std::fs::File>>, utils::fs::Error> {
    let file = utils::fs::open_readable(path)?;
    Ok(Reader::new(file))
}
