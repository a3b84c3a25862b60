use std::io::{self, BufRead};
use std::thread;

use seekhash_config::LogType;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

const INPUT_THREAD_NAME: &str = "cli-input-thread";

type LineRequest = oneshot::Sender<Option<String>>;

/// Handle to the blocking reader thread.
///
/// The thread only reads when a line is requested, so input past the line
/// that stopped the shell stays unread. Dropping the handle ends the thread
/// once it is idle; a read already in flight finishes first.
pub(crate) struct LineReader {
    requests: mpsc::Sender<LineRequest>,
}

impl LineReader {
    /// Requests the next line. `None` means the input is exhausted or the
    /// reader thread is gone.
    pub(crate) async fn next_line(&self) -> Option<String> {
        let (reply, line) = oneshot::channel();
        self.requests.send(reply).await.ok()?;
        line.await.ok().flatten()
    }
}

/// Moves the blocking line reads onto a dedicated OS thread.
///
/// A thread still blocked in `read_line` does not keep the process alive.
pub(crate) fn spawn_line_reader(mut input: Box<dyn BufRead + Send>) -> io::Result<LineReader> {
    let (requests, mut pending) = mpsc::channel::<LineRequest>(1);

    thread::Builder::new()
        .name(INPUT_THREAD_NAME.to_string())
        .spawn(move || {
            while let Some(reply) = pending.blocking_recv() {
                let line = read_next_line(input.as_mut());
                let exhausted = line.is_none();
                if reply.send(line).is_err() {
                    debug!(
                        log_type = LogType::Shell.as_str(),
                        "Line requester went away before the read finished"
                    );
                }
                if exhausted {
                    break;
                }
            }
            debug!(log_type = LogType::Shell.as_str(), "CLI input thread finished");
        })?;

    Ok(LineReader { requests })
}

fn read_next_line(input: &mut dyn BufRead) -> Option<String> {
    let mut buffer = String::new();
    loop {
        buffer.clear();
        match input.read_line(&mut buffer) {
            Ok(0) => {
                debug!(
                    log_type = LogType::Shell.as_str(),
                    "Input stream reached end of file"
                );
                return None;
            }
            Ok(_) => return Some(buffer),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                warn!(
                    log_type = LogType::Shell.as_str(),
                    "Skipping unreadable input line: {}", e
                );
            }
            Err(e) => {
                warn!(
                    log_type = LogType::Shell.as_str(),
                    "Failed to read input: {}", e
                );
                return None;
            }
        }
    }
}
