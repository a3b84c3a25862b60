use std::io::{self, Write};

pub const DEFAULT_WIDTH: usize = 40;

/// Single-line progress bar redrawn in place with `\r`.
///
/// ```text
/// [================>                       ]  42% hashing blocks
/// ```
///
/// Updates are ignored while the bar is inactive. Reaching the total ends the
/// line and deactivates the bar.
pub struct ProgressBar<W: Write = io::Stdout> {
    out: W,
    width: usize,
    current: u64,
    total: u64,
    message: String,
    active: bool,
}

impl ProgressBar<io::Stdout> {
    pub fn new() -> Self {
        Self::with_writer(io::stdout(), DEFAULT_WIDTH)
    }
}

impl Default for ProgressBar<io::Stdout> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Write> ProgressBar<W> {
    pub fn with_writer(out: W, width: usize) -> Self {
        Self {
            out,
            width,
            current: 0,
            total: 100,
            message: String::new(),
            active: false,
        }
    }

    pub fn start(&mut self, total: u64, message: impl Into<String>) -> io::Result<()> {
        self.total = total;
        self.current = 0;
        self.message = message.into();
        self.active = true;
        self.render()
    }

    pub fn update(&mut self, current: u64) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.current = current.min(self.total);
        self.render()
    }

    pub fn update_with_message(
        &mut self,
        current: u64,
        message: impl Into<String>,
    ) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.message = message.into();
        self.update(current)
    }

    pub fn increment(&mut self, delta: u64) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.update(self.current.saturating_add(delta))
    }

    pub fn complete(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.update(self.total)
    }

    pub fn complete_with_message(&mut self, message: impl Into<String>) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.message = message.into();
        self.complete()
    }

    /// Abandons the bar, terminating its line.
    pub fn stop(&mut self) -> io::Result<()> {
        if self.active {
            self.active = false;
            writeln!(self.out)?;
        }
        Ok(())
    }

    pub fn reset(&mut self) {
        self.current = 0;
        self.message.clear();
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current(&self) -> u64 {
        self.current
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn frame(&self) -> String {
        let percent = super::console::percent(self.current, self.total);
        let filled = if self.total == 0 {
            self.width
        } else {
            (self.current as u128 * self.width as u128 / self.total as u128) as usize
        };

        let mut bar = String::with_capacity(self.width + self.message.len() + 10);
        bar.push_str("\r[");
        for i in 0..self.width {
            if i < filled {
                bar.push('=');
            } else if i == filled && self.current < self.total {
                bar.push('>');
            } else {
                bar.push(' ');
            }
        }
        bar.push_str(&format!("] {percent:>3}%"));

        if !self.message.is_empty() {
            bar.push(' ');
            bar.push_str(&self.message);
        }

        bar
    }

    fn render(&mut self) -> io::Result<()> {
        let frame = self.frame();
        self.out.write_all(frame.as_bytes())?;

        if self.current >= self.total {
            writeln!(self.out)?;
            self.active = false;
        }

        self.out.flush()
    }
}
