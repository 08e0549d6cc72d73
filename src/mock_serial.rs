//! Scripted in-memory link for exercising the transport without hardware.
//!
//! Time is virtual: a silence or delayed line advances the link's clock
//! instead of sleeping, so multi-second gateway timeouts cost nothing.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::error::Result;
use crate::transport::Link;

/// One scripted read outcome
#[derive(Debug, Clone)]
pub enum Chunk {
    /// A line that is already waiting
    Line(String),
    /// A line that arrives after the given delay
    Delayed(Duration, String),
    /// A bare CRLF, immediately
    Blank,
    /// Nothing arrives within the read timeout
    Silence,
}

pub fn line(text: &str) -> Chunk {
    Chunk::Line(text.to_string())
}

#[derive(Debug, Default)]
pub struct LinkState {
    pub reads: VecDeque<Chunk>,
    /// Lines written, terminators stripped
    pub written: Vec<String>,
    pub clears: usize,
    pub read_timeouts: Vec<Duration>,
    /// Chunks queued whenever a written line equals the key
    pub responders: Vec<(String, Vec<Chunk>)>,
    elapsed: Duration,
}

#[derive(Clone)]
pub struct ScriptedLink {
    state: Rc<RefCell<LinkState>>,
    epoch: Instant,
}

impl ScriptedLink {
    pub fn new() -> Self {
        ScriptedLink {
            state: Rc::new(RefCell::new(LinkState::default())),
            epoch: Instant::now(),
        }
    }

    /// Queue chunks for the next reads
    pub fn push(&self, chunks: impl IntoIterator<Item = Chunk>) -> &Self {
        self.state.borrow_mut().reads.extend(chunks);
        self
    }

    /// Answer every write of `command` with `chunks`
    pub fn respond(&self, command: &str, chunks: impl IntoIterator<Item = Chunk>) -> &Self {
        self.state
            .borrow_mut()
            .responders
            .push((command.to_string(), chunks.into_iter().collect()));
        self
    }

    pub fn written(&self) -> Vec<String> {
        self.state.borrow().written.clone()
    }

    pub fn clears(&self) -> usize {
        self.state.borrow().clears
    }

    pub fn read_timeouts(&self) -> Vec<Duration> {
        self.state.borrow().read_timeouts.clone()
    }

    pub fn pending_reads(&self) -> usize {
        self.state.borrow().reads.len()
    }
}

impl Link for ScriptedLink {
    fn read_line(&mut self, timeout: Duration) -> io::Result<Vec<u8>> {
        let mut state = self.state.borrow_mut();
        state.read_timeouts.push(timeout);
        let chunk = state.reads.pop_front().unwrap_or(Chunk::Silence);
        match chunk {
            Chunk::Line(text) => Ok(format!("{}\r\n", text).into_bytes()),
            Chunk::Delayed(delay, text) => {
                state.elapsed += delay;
                Ok(format!("{}\r\n", text).into_bytes())
            }
            Chunk::Blank => Ok(b"\r\n".to_vec()),
            Chunk::Silence => {
                state.elapsed += timeout;
                Ok(Vec::new())
            }
        }
    }

    fn send(&mut self, bytes: &[u8]) -> io::Result<()> {
        let text = String::from_utf8_lossy(bytes)
            .trim_end_matches("\r\n")
            .to_string();
        let mut state = self.state.borrow_mut();
        let reply = state
            .responders
            .iter()
            .find(|(command, _)| *command == text)
            .map(|(_, chunks)| chunks.clone());
        if let Some(chunks) = reply {
            state.reads.extend(chunks);
        }
        state.written.push(text);
        Ok(())
    }

    fn clear_input(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.reads.clear();
        state.clears += 1;
        Ok(())
    }

    fn now(&self) -> Instant {
        self.epoch + self.state.borrow().elapsed
    }
}

/// Echo sink that keeps what the operator would have seen
#[derive(Clone, Default)]
pub struct EchoBuffer(Rc<RefCell<Vec<u8>>>);

impl EchoBuffer {
    pub fn lines(&self) -> Vec<String> {
        String::from_utf8_lossy(&self.0.borrow())
            .lines()
            .map(str::to_string)
            .collect()
    }
}

impl Write for EchoBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
