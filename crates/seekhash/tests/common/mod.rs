#![allow(dead_code)]

use std::io::{self, BufRead, BufReader, Read};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;

use parking_lot::Mutex;
use seekhash::{Command, CommandFuture, ConsoleUi, ShutdownListener};

/// Console that records every call as a short event string.
#[derive(Default)]
pub struct RecordingConsole {
    events: Mutex<Vec<String>>,
}

impl RecordingConsole {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().iter().filter(|e| *e == event).count()
    }

    pub fn contains(&self, event: &str) -> bool {
        self.count(event) > 0
    }

    fn record(&self, event: String) {
        self.events.lock().push(event);
    }
}

impl ConsoleUi for RecordingConsole {
    fn show_welcome(&self) {
        self.record("welcome".to_string());
    }

    fn show_prompt(&self) {
        self.record("prompt".to_string());
    }

    fn show_goodbye(&self) {
        self.record("goodbye".to_string());
    }

    fn show_error(&self, message: &str) {
        self.record(format!("error: {message}"));
    }

    fn show_unknown_command(&self, name: &str) {
        self.record(format!("unknown: {name}"));
    }

    fn show_output(&self, text: &str) {
        self.record(format!("output: {text}"));
    }

    fn show_progress(&self, current: u64, total: u64, message: &str) {
        self.record(format!("progress: {current}/{total} {message}"));
    }

    fn clear_line(&self) {
        self.record("clear".to_string());
    }
}

/// Reader fed line by line from the test; blocks until a line arrives and
/// reports end of file once the sender is dropped.
pub struct PipeReader {
    rx: mpsc::Receiver<Vec<u8>>,
    pending: Vec<u8>,
}

impl Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.pending.is_empty() {
            match self.rx.recv() {
                Ok(bytes) => self.pending = bytes,
                Err(_) => return Ok(0),
            }
        }
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

pub fn pipe() -> (mpsc::Sender<Vec<u8>>, Box<dyn BufRead + Send>) {
    let (tx, rx) = mpsc::channel();
    let reader = PipeReader {
        rx,
        pending: Vec::new(),
    };
    (tx, Box::new(BufReader::new(reader)))
}

/// Hands out one byte per read and tracks how much of the input was pulled
/// and whether the reader has been released.
pub struct TrickleReader {
    data: Vec<u8>,
    consumed: Arc<AtomicUsize>,
    released: Arc<AtomicBool>,
}

impl Read for TrickleReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let position = self.consumed.load(Ordering::SeqCst);
        if position >= self.data.len() || buf.is_empty() {
            return Ok(0);
        }
        buf[0] = self.data[position];
        self.consumed.store(position + 1, Ordering::SeqCst);
        Ok(1)
    }
}

impl Drop for TrickleReader {
    fn drop(&mut self) {
        self.released.store(true, Ordering::SeqCst);
    }
}

pub struct TrickleInput {
    pub reader: Box<dyn BufRead + Send>,
    pub consumed: Arc<AtomicUsize>,
    pub released: Arc<AtomicBool>,
}

pub fn trickle(input: &str) -> TrickleInput {
    let consumed = Arc::new(AtomicUsize::new(0));
    let released = Arc::new(AtomicBool::new(false));
    let reader = TrickleReader {
        data: input.as_bytes().to_vec(),
        consumed: Arc::clone(&consumed),
        released: Arc::clone(&released),
    };
    TrickleInput {
        reader: Box::new(BufReader::with_capacity(1, reader)),
        consumed,
        released,
    }
}

pub fn lines(input: &str) -> Box<dyn BufRead + Send> {
    Box::new(io::Cursor::new(input.as_bytes().to_vec()))
}

/// Polls `condition` until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    condition()
}

pub struct FailingCommand;

impl Command for FailingCommand {
    fn name(&self) -> &'static str {
        "fail"
    }

    fn description(&self) -> &'static str {
        "Always fails"
    }

    fn usage(&self) -> &'static str {
        "fail"
    }

    fn execute(&self, _args: &str) -> CommandFuture {
        Box::pin(async { Err(anyhow::anyhow!("disk full")) })
    }
}

pub struct PanickingCommand;

impl Command for PanickingCommand {
    fn name(&self) -> &'static str {
        "panic"
    }

    fn description(&self) -> &'static str {
        "Always panics"
    }

    fn usage(&self) -> &'static str {
        "panic"
    }

    fn execute(&self, _args: &str) -> CommandFuture {
        Box::pin(async { panic!("kaboom") })
    }
}

/// Sleeps far longer than any test runs.
#[derive(Default)]
pub struct HangingCommand {
    pub started: AtomicBool,
    pub finished: Arc<AtomicBool>,
}

impl Command for HangingCommand {
    fn name(&self) -> &'static str {
        "hang"
    }

    fn description(&self) -> &'static str {
        "Never returns"
    }

    fn usage(&self) -> &'static str {
        "hang"
    }

    fn execute(&self, _args: &str) -> CommandFuture {
        self.started.store(true, Ordering::SeqCst);
        let finished = Arc::clone(&self.finished);
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            finished.store(true, Ordering::SeqCst);
            Ok(String::new())
        })
    }
}

/// Echoes its raw arguments back.
pub struct EchoCommand;

impl Command for EchoCommand {
    fn name(&self) -> &'static str {
        "echo"
    }

    fn description(&self) -> &'static str {
        "Prints its arguments"
    }

    fn usage(&self) -> &'static str {
        "echo <text>"
    }

    fn execute(&self, args: &str) -> CommandFuture {
        let text = args.to_string();
        Box::pin(async move { Ok(text) })
    }
}

#[derive(Default)]
pub struct CountingListener {
    pub graceful: AtomicUsize,
    pub forced: AtomicUsize,
}

#[async_trait::async_trait]
impl ShutdownListener for CountingListener {
    async fn on_shutdown(&self) -> anyhow::Result<()> {
        self.graceful.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn on_force_shutdown(&self) -> anyhow::Result<()> {
        self.forced.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

impl CountingListener {
    pub fn graceful(&self) -> usize {
        self.graceful.load(Ordering::SeqCst)
    }
}

/// Appends its label to a shared log, then behaves as configured.
pub struct OrderedListener {
    pub label: &'static str,
    pub log: Arc<Mutex<Vec<&'static str>>>,
    pub behavior: ListenerBehavior,
}

#[derive(Clone, Copy)]
pub enum ListenerBehavior {
    Succeed,
    Fail,
    Panic,
}

#[async_trait::async_trait]
impl ShutdownListener for OrderedListener {
    fn name(&self) -> &'static str {
        self.label
    }

    async fn on_shutdown(&self) -> anyhow::Result<()> {
        self.log.lock().push(self.label);
        match self.behavior {
            ListenerBehavior::Succeed => Ok(()),
            ListenerBehavior::Fail => anyhow::bail!("{} could not flush", self.label),
            ListenerBehavior::Panic => panic!("{} panicked", self.label),
        }
    }
}
