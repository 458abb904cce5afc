//! Request lifecycle engine.
//!
//! This module owns the networking side of the server:
//! - binding the listening socket (lazily, on the first `run` call),
//! - accepting TCP connections in the configured mode,
//! - reading raw bytes from the client,
//! - writing the serialized response back.
//!
//! Higher-level HTTP semantics such as parsing, route resolution and
//! response assembly are delegated to the `http` and `handler` modules.
//!
//! ## Request handling flow
//!
//! The lifecycle of a client connection:
//!
//! 1. Accept a TCP connection (blocking, or non-blocking with busy retry)
//! 2. Read chunks into a buffer until the request is judged complete
//! 3. Parse the buffer into an [`HttpRequest`]
//!    (delegated to [`parser::parse_request`])
//! 4. Run the init hook, if one is configured
//! 5. Resolve a route and dispatch, falling back to the canned 404/503
//! 6. Write the response and close the connection
//!
//! Serving is fully serial: one connection runs to completion before the
//! next accept. A failed connection is logged and closed; only a bind
//! failure or an exhausted accept-retry budget ends the loop.

use async_std::net::{TcpListener, TcpStream};
use async_std::prelude::*;
use std::net::Shutdown;

use crate::config::{AcceptMode, RequestFraming, ServerConfig};
use crate::handler::router::RouteTable;
use crate::handler::{InitHook, responses};
use crate::http::HttpMethod;
use crate::http::parser::{self, ParseError};
use crate::http::request::HttpRequest;
use crate::http::response::ResponseState;

/// Fixed read unit. Under short-read framing, a read shorter than this
/// signals end of input.
pub const RECV_BUF: usize = 1024;

#[derive(Debug)]
pub enum EngineError {
    Io(std::io::Error),
    Parse(ParseError),
    AcceptRetriesExhausted,
    ReadRetriesExhausted,
}

/// Socket conditions worth retrying; everything else aborts the operation.
fn is_transient(err: &std::io::Error) -> bool {
    matches!(
        err.kind(),
        std::io::ErrorKind::WouldBlock
            | std::io::ErrorKind::Interrupted
            | std::io::ErrorKind::ConnectionAborted
    )
}

/// Retry accounting for the accept and read loops. A `None` limit keeps
/// the historical retry-forever behavior.
struct RetryBudget {
    limit: Option<u32>,
    used: u32,
}

impl RetryBudget {
    fn new(limit: Option<u32>) -> Self {
        Self { limit, used: 0 }
    }

    fn try_spend(&mut self) -> bool {
        match self.limit {
            Some(limit) if self.used >= limit => false,
            _ => {
                self.used += 1;
                true
            }
        }
    }
}

/// The listening socket in one of the two accept modes.
enum Listener {
    Blocking(TcpListener),
    NonBlocking(std::net::TcpListener),
}

impl Listener {
    fn bind(config: &ServerConfig) -> std::io::Result<Self> {
        let listener = std::net::TcpListener::bind((config.address, config.port))?;
        match config.accept_mode {
            AcceptMode::Blocking => Ok(Self::Blocking(TcpListener::from(listener))),
            AcceptMode::NonBlocking => {
                listener.set_nonblocking(true)?;
                Ok(Self::NonBlocking(listener))
            }
        }
    }

    async fn accept(&self, config: &ServerConfig) -> Result<TcpStream, EngineError> {
        let mut budget = RetryBudget::new(config.max_accept_retries);
        match self {
            Self::Blocking(listener) => loop {
                match listener.accept().await {
                    Ok((stream, _addr)) => return Ok(stream),
                    Err(err) if is_transient(&err) => {
                        if !budget.try_spend() {
                            return Err(EngineError::AcceptRetriesExhausted);
                        }
                    }
                    Err(err) => return Err(EngineError::Io(err)),
                }
            },
            // Busy retry: never suspends, no backoff between attempts.
            Self::NonBlocking(listener) => loop {
                match listener.accept() {
                    Ok((stream, _addr)) => return Ok(TcpStream::from(stream)),
                    Err(err) if is_transient(&err) => {
                        if !budget.try_spend() {
                            return Err(EngineError::AcceptRetriesExhausted);
                        }
                    }
                    Err(err) => return Err(EngineError::Io(err)),
                }
            },
        }
    }
}

pub struct Server {
    config: ServerConfig,
    routes: RouteTable,
    init_hook: Option<InitHook>,
    listener: Option<Listener>,
}

impl Server {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            routes: RouteTable::new(),
            init_hook: None,
            listener: None,
        }
    }

    /// At most one hook; a later call replaces the earlier one.
    pub fn set_init_hook<F>(&mut self, hook: F)
    where
        F: Fn(&HttpRequest, &mut ResponseState) + Send + Sync + 'static,
    {
        self.init_hook = Some(Box::new(hook));
    }

    /// Registration order only matters as the tie-breaker between
    /// equal-length prefixes.
    pub fn register_route<F>(&mut self, prefix: &str, handler: F)
    where
        F: Fn(&HttpRequest, &mut ResponseState) -> Vec<u8> + Send + Sync + 'static,
    {
        self.routes.register(prefix, Box::new(handler));
    }

    /// Serve forever: accept one connection, run it to completion, accept
    /// the next. The socket is bound on the first call and kept. Only a
    /// bind failure or an exhausted accept-retry budget makes this return.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        if self.listener.is_none() {
            self.listener = Some(Listener::bind(&self.config).map_err(EngineError::Io)?);
        }
        self.routes.seal();

        loop {
            let stream = self.accept_next().await?;
            self.handle_client(stream).await;
        }
    }

    async fn accept_next(&self) -> Result<TcpStream, EngineError> {
        match &self.listener {
            Some(listener) => listener.accept(&self.config).await,
            // run() binds before looping; this arm is never taken
            None => Err(EngineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotConnected,
                "server is not bound",
            ))),
        }
    }

    /// One full connection lifecycle. The stream is closed on every exit
    /// path, and a failed connection never takes the accept loop down
    /// with it.
    async fn handle_client(&self, mut stream: TcpStream) {
        if let Err(err) = self.serve_connection(&mut stream).await {
            eprintln!("connection aborted: {:?}", err);
        }
        stream.shutdown(Shutdown::Both).ok();
    }

    async fn serve_connection(&self, stream: &mut TcpStream) -> Result<(), EngineError> {
        let raw = self.read_request(stream).await?;

        // A parse failure skips everything below and lands in the close
        // step with no response sent.
        let req = parser::parse_request(&raw).map_err(EngineError::Parse)?;
        if self.config.debug {
            eprintln!("{:?}", req);
        }

        // Fresh per-request state; nothing carries over between requests.
        let mut state = ResponseState::new();
        if let Some(hook) = &self.init_hook {
            hook(&req, &mut state);
        }

        let bytes = match self.routes.resolve(&req.path) {
            Some(handler) => handler(&req, &mut state),
            None if req.method == HttpMethod::Get => responses::not_found(&req, &mut state),
            None => responses::service_unavailable(&mut state),
        };

        stream.write_all(&bytes).await.map_err(EngineError::Io)?;
        Ok(())
    }

    async fn read_request(&self, stream: &mut TcpStream) -> Result<Vec<u8>, EngineError> {
        let mut data = Vec::new();
        let mut chunk = [0u8; RECV_BUF];
        let mut budget = RetryBudget::new(self.config.max_read_retries);

        loop {
            let n = loop {
                match stream.read(&mut chunk).await {
                    Ok(n) => break n,
                    Err(err) if is_transient(&err) => {
                        if !budget.try_spend() {
                            return Err(EngineError::ReadRetriesExhausted);
                        }
                    }
                    Err(err) => return Err(EngineError::Io(err)),
                }
            };
            data.extend_from_slice(&chunk[..n]);

            match self.config.framing {
                // Historical heuristic: a short read means the client is
                // done. A body that is an exact multiple of RECV_BUF, or
                // one that arrives fragmented, defeats it; content_length
                // framing is the opt-in alternative.
                RequestFraming::ShortRead => {
                    if n < RECV_BUF {
                        break;
                    }
                }
                RequestFraming::ContentLength => {
                    if request_complete(&data) || n == 0 {
                        break;
                    }
                }
            }
        }

        Ok(data)
    }
}

/// Completion check for content_length framing: the header terminator has
/// arrived and the body holds at least as many bytes as the headers
/// announce.
fn request_complete(data: &[u8]) -> bool {
    match parser::headers_end(data) {
        Some(end) => data.len() - (end + 4) >= parser::declared_content_length(&data[..end]),
        None => false,
    }
}
