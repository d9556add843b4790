use std::fmt;
use std::io::{self, BufRead, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::SyncSender;
use std::sync::Arc;

use chrono::TimeZone;
use tracing::debug;

use crate::convert;
use crate::display::{Style, BANNER};

/// Lines the reader may get ahead of the loop before it blocks.
pub const INPUT_BACKLOG: usize = 16;

/// Everything the loop reacts to, delivered over a single channel.
#[derive(Debug)]
pub enum Event {
    /// One line from stdin, line terminator included.
    Line(String),
    /// Stdin was closed.
    Eof,
    /// SIGINT was delivered.
    Interrupt,
    /// Reading stdin failed; ends the loop with the error.
    ReadFailed(io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Running,
    Stopped,
}

/// The interactive prompt loop.
///
/// Holds the time zone it was built with for its whole lifetime, so output
/// never depends on the process environment after startup.
pub struct Converter<Tz, W> {
    zone: Tz,
    out: W,
    prompt: String,
    style: Style,
    state: RunState,
    interrupted: Arc<AtomicBool>,
}

impl<Tz, W> Converter<Tz, W>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
    W: Write,
{
    pub fn new(zone: Tz, out: W, prompt: impl Into<String>, style: Style) -> Self {
        Self {
            zone,
            out,
            prompt: prompt.into(),
            style,
            state: RunState::Running,
            interrupted: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Flag that stops the loop before it handles any further event.
    ///
    /// Set from the signal handler so an interrupt takes effect even while
    /// lines are still queued ahead of `Event::Interrupt`.
    pub fn interrupt_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.interrupted)
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Print the banner, then prompt and handle events until stopped.
    ///
    /// Running out of events counts as end of input.
    pub fn run<I>(&mut self, events: I) -> io::Result<()>
    where
        I: IntoIterator<Item = Event>,
    {
        writeln!(self.out, "{}", self.style.banner(BANNER))?;

        let mut events = events.into_iter();
        while self.state == RunState::Running {
            if self.is_interrupted() {
                self.handle(Event::Interrupt)?;
                break;
            }
            self.show_prompt()?;
            let mut event = events.next().unwrap_or(Event::Eof);
            if self.is_interrupted() {
                event = Event::Interrupt;
            }
            self.handle(event)?;
        }
        self.out.flush()
    }

    pub fn handle(&mut self, event: Event) -> io::Result<RunState> {
        match event {
            Event::Line(line) => match convert::convert(&line, &self.zone) {
                Ok(text) => {
                    debug!(input = line.trim(), "converted");
                    writeln!(self.out, "{text}")?;
                }
                Err(e) => {
                    debug!(input = line.trim(), error = %e, "rejected input");
                    writeln!(self.out, "{}", self.style.rejected(&e.to_string()))?;
                }
            },
            Event::Eof => {
                debug!("end of input");
                self.state = RunState::Stopped;
            }
            Event::Interrupt => {
                debug!("interrupted");
                self.state = RunState::Stopped;
            }
            Event::ReadFailed(e) => return Err(e),
        }
        Ok(self.state)
    }

    fn is_interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn show_prompt(&mut self) -> io::Result<()> {
        write!(self.out, "{}", self.style.prompt(&self.prompt))?;
        self.out.flush()
    }
}

/// Forward lines from `reader` until end of input, a read error, or the loop goes away.
///
/// Bytes that are not UTF-8 are replaced rather than treated as a read error,
/// so such a line is simply rejected by the converter.
pub fn read_lines<R: BufRead>(mut reader: R, tx: &SyncSender<Event>) {
    let mut buf = Vec::new();
    loop {
        buf.clear();
        let event = match reader.read_until(b'\n', &mut buf) {
            Ok(0) => Event::Eof,
            Ok(_) => Event::Line(String::from_utf8_lossy(&buf).into_owned()),
            Err(e) => Event::ReadFailed(e),
        };
        let last = !matches!(event, Event::Line(_));
        if tx.send(event).is_err() || last {
            break;
        }
    }
}

/// Turn SIGINT into a stop request instead of the default process kill.
///
/// `interrupted` is set inside the signal handler itself. `Event::Interrupt`
/// is also sent from a background thread to wake a loop waiting for input.
/// Both are registered before this returns.
#[cfg(unix)]
pub fn forward_interrupts(tx: SyncSender<Event>, interrupted: Arc<AtomicBool>) -> io::Result<()> {
    use signal_hook::consts::SIGINT;
    use signal_hook::iterator::Signals;

    signal_hook::flag::register(SIGINT, interrupted)?;
    let mut signals = Signals::new([SIGINT])?;
    std::thread::spawn(move || {
        for _ in signals.forever() {
            if tx.send(Event::Interrupt).is_err() {
                break;
            }
        }
    });
    Ok(())
}
