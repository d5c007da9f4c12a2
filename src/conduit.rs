//! Lexer running on its own thread, handing tokens to the parser one at
//! a time.
//!
//! The producer lexes a token only when the consumer asks for one, so
//! it is never more than one token ahead and never blocks in a send.
//! It waits for requests until the deadline, if any, and exits as soon
//! as the deadline passes or the conduit is cancelled or dropped, whether
//! or not the consumer is still receiving.

use std::io;
use std::panic;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::lexer::{LexError, Lexer};
use crate::token::Token;

const THREAD_NAME: &str = "zoidberg-lexer";

/// Why a conduit stopped delivering tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConduitError {
    /// `cancel` was called.
    #[error("token conduit was cancelled")]
    Cancelled,
    /// The producer finished its stream.
    #[error("token conduit is closed")]
    Closed,
    /// The deadline passed before the next token arrived.
    #[error("deadline exceeded waiting for the next token")]
    DeadlineExceeded,
    /// The lexer thread could not be started.
    #[error("failed to start lexer thread: {0}")]
    Spawn(io::ErrorKind),
}

/// Receiving end of a lexer thread.
#[derive(Debug)]
pub struct TokenConduit {
    requests: Option<Sender<()>>,
    tokens: Option<Receiver<Token>>,
    cancelled: Arc<AtomicBool>,
    producer: Option<JoinHandle<Option<LexError>>>,
    deadline: Option<Instant>,
    error: Option<ConduitError>,
}

impl TokenConduit {
    /// Start lexing `source` on a new thread.
    ///
    /// # Errors
    ///
    /// Returns `ConduitError::Spawn` if the thread cannot be created.
    pub fn spawn(
        filename: impl Into<String>,
        source: impl Into<String>,
    ) -> Result<Self, ConduitError> {
        Self::start(filename.into(), source.into(), None)
    }

    /// Like `spawn`, but every receive fails once `timeout` has elapsed
    /// since the conduit was started, and the lexer thread exits then.
    pub fn with_deadline(
        filename: impl Into<String>,
        source: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ConduitError> {
        Self::start(
            filename.into(),
            source.into(),
            Instant::now().checked_add(timeout),
        )
    }

    fn start(
        filename: String,
        source: String,
        deadline: Option<Instant>,
    ) -> Result<Self, ConduitError> {
        let (request_tx, request_rx) = mpsc::channel();
        // one slot: a requested token is handed over without blocking
        let (token_tx, token_rx) = mpsc::sync_channel(1);
        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);

        let producer = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || {
                produce(&filename, &source, &request_rx, &token_tx, &flag, deadline)
            })
            .map_err(|err| ConduitError::Spawn(err.kind()))?;

        Ok(Self {
            requests: Some(request_tx),
            tokens: Some(token_rx),
            cancelled,
            producer: Some(producer),
            deadline,
            error: None,
        })
    }

    /// Block until the producer hands over the next token.
    ///
    /// # Errors
    ///
    /// Returns the `ConduitError` that ended the stream. Once an error
    /// is returned every later call returns it again and the producer
    /// has been told to stop.
    pub fn recv(&mut self) -> Result<Token, ConduitError> {
        if let Some(err) = self.error {
            return Err(err);
        }
        let result = self.recv_next().map_err(|err| {
            if self.deadline_passed() {
                ConduitError::DeadlineExceeded
            } else {
                err
            }
        });
        if let Err(err) = result {
            self.error = Some(err);
            self.shutdown();
        }
        result
    }

    fn recv_next(&self) -> Result<Token, ConduitError> {
        let (Some(requests), Some(tokens)) = (&self.requests, &self.tokens) else {
            return Err(ConduitError::Cancelled);
        };
        if self.deadline_passed() {
            return Err(ConduitError::DeadlineExceeded);
        }
        requests.send(()).map_err(|_| ConduitError::Closed)?;

        let Some(deadline) = self.deadline else {
            return tokens.recv().map_err(|_| ConduitError::Closed);
        };
        tokens
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .map_err(|err| match err {
                RecvTimeoutError::Timeout => ConduitError::DeadlineExceeded,
                RecvTimeoutError::Disconnected => ConduitError::Closed,
            })
    }

    fn deadline_passed(&self) -> bool {
        self.deadline
            .is_some_and(|deadline| Instant::now() >= deadline)
    }

    /// Stop the producer. Later receives return `Cancelled` unless the
    /// stream had already ended for another reason.
    pub fn cancel(&mut self) {
        if self.error.is_none() {
            self.error = Some(ConduitError::Cancelled);
        }
        self.shutdown();
    }

    /// The error that ended the stream, if it has ended.
    #[must_use]
    pub const fn error(&self) -> Option<ConduitError> {
        self.error
    }

    /// True once the lexer thread has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.producer.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Stop the producer and wait for its thread to exit.
    ///
    /// Returns the lexer error that ended the producer's stream, if the
    /// producer got that far. A panic on the lexer thread is resumed on
    /// the caller's thread.
    #[must_use]
    pub fn join(mut self) -> Option<LexError> {
        self.shutdown();
        self.producer.take().and_then(finish)
    }

    fn shutdown(&mut self) {
        self.cancelled.store(true, Ordering::Release);
        // disconnecting wakes a producer waiting for a request
        self.requests = None;
        self.tokens = None;
    }
}

/// Lex one token per request until the stream ends, the conduit goes
/// away, or the deadline passes.
fn produce(
    filename: &str,
    source: &str,
    requests: &Receiver<()>,
    tokens: &SyncSender<Token>,
    cancelled: &AtomicBool,
    deadline: Option<Instant>,
) -> Option<LexError> {
    let mut lexer = Lexer::new(filename, source);
    while wait_for_request(requests, deadline) && !cancelled.load(Ordering::Acquire) {
        let Some(token) = lexer.next() else {
            break;
        };
        if tokens.send(token).is_err() {
            break;
        }
    }
    lexer.error().cloned()
}

fn wait_for_request(requests: &Receiver<()>, deadline: Option<Instant>) -> bool {
    match deadline {
        None => requests.recv().is_ok(),
        Some(deadline) => requests
            .recv_timeout(deadline.saturating_duration_since(Instant::now()))
            .is_ok(),
    }
}

fn finish(producer: JoinHandle<Option<LexError>>) -> Option<LexError> {
    match producer.join() {
        Ok(err) => err,
        Err(payload) => panic::resume_unwind(payload),
    }
}

impl Iterator for TokenConduit {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        self.recv().ok()
    }
}

impl Drop for TokenConduit {
    fn drop(&mut self) {
        self.shutdown();
        if let Some(producer) = self.producer.take() {
            let joined = producer.join();
            debug_assert!(
                joined.is_ok() || thread::panicking(),
                "lexer thread panicked"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::{LexErrorKind, tokenize};
    use crate::token::TokenKind;

    fn spawn(source: &str) -> TokenConduit {
        TokenConduit::spawn("t.berg", source).expect("spawn")
    }

    fn wait_until_finished(conduit: &TokenConduit) -> bool {
        let give_up = Instant::now() + Duration::from_secs(5);
        while !conduit.is_finished() {
            if Instant::now() >= give_up {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
        true
    }

    #[test]
    fn delivers_lexer_sequence() {
        let source = "val x = (a && !b) ** 42.5";
        let expected: Vec<Token> = tokenize("t.berg", source).collect();
        let received: Vec<Token> = spawn(source).collect();
        assert_eq!(received, expected);
    }

    #[test]
    fn closed_after_eof() {
        let mut conduit = spawn("x");
        assert_eq!(conduit.recv().map(|t| t.kind), Ok(TokenKind::Identifier));
        assert_eq!(conduit.recv().map(|t| t.kind), Ok(TokenKind::Eof));
        assert_eq!(conduit.recv(), Err(ConduitError::Closed));
        assert_eq!(conduit.recv(), Err(ConduitError::Closed));
        assert_eq!(conduit.join(), None);
    }

    #[test]
    fn producer_waits_for_requests() {
        let conduit = spawn("a b c");
        thread::sleep(Duration::from_millis(50));
        assert!(!conduit.is_finished());
        drop(conduit);
    }

    #[test]
    fn cancel_releases_producer() {
        let mut conduit = spawn(&"a ".repeat(10_000));
        assert!(conduit.recv().is_ok());
        conduit.cancel();
        assert_eq!(conduit.recv(), Err(ConduitError::Cancelled));
        assert_eq!(conduit.error(), Some(ConduitError::Cancelled));
        assert!(wait_until_finished(&conduit));
        assert_eq!(conduit.join(), None);
    }

    #[test]
    fn drop_mid_stream_joins_producer() {
        let mut conduit = spawn(&"b ".repeat(10_000));
        assert!(conduit.recv().is_ok());
        let flag = Arc::clone(&conduit.cancelled);
        assert!(Arc::strong_count(&flag) > 2);
        drop(conduit);
        // the producer's copy is released only when its thread has exited
        assert_eq!(Arc::strong_count(&flag), 1);
    }

    #[test]
    fn lex_error_comes_back_on_join() {
        let mut conduit = spawn("x = \"open");
        let kinds: Vec<_> = conduit.by_ref().map(|t| t.kind).collect();
        assert_eq!(kinds.last(), Some(&TokenKind::Error));
        let err = conduit.join().expect("lex error");
        assert_eq!(err.kind, LexErrorKind::UnterminatedString);
    }

    #[test]
    fn deadline_exceeded() {
        let mut conduit = TokenConduit::with_deadline("t.berg", "a = 1", Duration::from_millis(10))
            .expect("spawn");
        thread::sleep(Duration::from_millis(50));
        assert_eq!(conduit.recv(), Err(ConduitError::DeadlineExceeded));
        assert_eq!(conduit.recv(), Err(ConduitError::DeadlineExceeded));
        assert_eq!(conduit.join(), None);
    }

    #[test]
    fn deadline_stops_producer_without_recv() {
        let conduit = TokenConduit::with_deadline("t.berg", "a b c", Duration::from_millis(10))
            .expect("spawn");
        let flag = Arc::clone(&conduit.cancelled);
        assert!(wait_until_finished(&conduit));
        // only the conduit and this test still hold the flag
        assert_eq!(Arc::strong_count(&flag), 2);
        assert_eq!(conduit.error(), None);
    }

    #[test]
    fn generous_deadline_delivers_everything() {
        let conduit = TokenConduit::with_deadline("t.berg", "a = 1", Duration::from_secs(30))
            .expect("spawn");
        assert_eq!(conduit.count(), 4);
    }

    #[test]
    fn producer_thread_is_named() {
        let conduit = spawn("a");
        let name = conduit
            .producer
            .as_ref()
            .and_then(|p| p.thread().name().map(str::to_string));
        assert_eq!(name.as_deref(), Some(THREAD_NAME));
    }

    #[test]
    fn spawn_error_display() {
        let err = ConduitError::Spawn(io::ErrorKind::OutOfMemory);
        assert_eq!(
            err.to_string(),
            format!("failed to start lexer thread: {}", io::ErrorKind::OutOfMemory)
        );
    }

    #[test]
    #[should_panic(expected = "lexer blew up")]
    fn producer_panic_is_resumed() {
        let producer = thread::spawn(|| -> Option<LexError> { panic!("lexer blew up") });
        let _ = finish(producer);
    }
}
