use crate::error::ReadError;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Write};
use std::rc::Rc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Keyboard session plus the terminal a prompt draws on.
pub trait Console {
    type Writer: Write;

    /// Acquire the keyboard session.
    fn open(&mut self) -> io::Result<()>;
    /// Release the keyboard session.
    fn close(&mut self) -> io::Result<()>;
    /// Block until the next key press.
    fn read_key(&mut self) -> Result<KeyEvent, ReadError>;
    fn width(&self) -> io::Result<usize>;
    fn writer(&self) -> Self::Writer;
}

/// Raw mode is process-wide; only one session may hold it.
static RAW_MODE_HELD: AtomicBool = AtomicBool::new(false);

fn claim_raw_mode() -> io::Result<()> {
    RAW_MODE_HELD
        .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
        .map(|_| ())
        .map_err(|_| io::Error::other("another prompt holds the keyboard"))
}

fn release_raw_mode() {
    RAW_MODE_HELD.store(false, Ordering::Release);
}

/// The real terminal: crossterm raw mode on stdin, drawing to stdout.
#[derive(Debug, Default)]
pub struct TerminalConsole {
    open: bool,
}

impl TerminalConsole {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Console for TerminalConsole {
    type Writer = io::Stdout;

    fn open(&mut self) -> io::Result<()> {
        claim_raw_mode()?;
        if let Err(e) = terminal::enable_raw_mode() {
            release_raw_mode();
            return Err(e);
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if !self.open {
            return Ok(());
        }
        terminal::disable_raw_mode()?;
        self.open = false;
        release_raw_mode();
        Ok(())
    }

    fn read_key(&mut self) -> Result<KeyEvent, ReadError> {
        match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => Ok(key),
            // Releases, repeats, mouse, focus and resize carry no key for us.
            _ => Err(ReadError::Unrecognized),
        }
    }

    fn width(&self) -> io::Result<usize> {
        terminal::size().map(|(w, _)| w as usize)
    }

    fn writer(&self) -> io::Stdout {
        io::stdout()
    }
}

impl Drop for TerminalConsole {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Shared byte sink handed out by `ScriptedConsole::writer`.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl SharedBuffer {
    pub fn bytes(&self) -> Vec<u8> {
        self.0.borrow().clone()
    }
}

impl Write for SharedBuffer {
    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Console driven by a fixed script of key events, recording all output.
///
/// Lets hosts and tests run prompts without a TTY. An exhausted script reads
/// as end-of-file.
#[derive(Debug)]
pub struct ScriptedConsole {
    events: VecDeque<Result<KeyEvent, ReadError>>,
    output: SharedBuffer,
    width: Option<usize>,
    open: bool,
    fail_open: bool,
    fail_close: bool,
}

impl ScriptedConsole {
    pub fn new(width: usize) -> Self {
        Self {
            events: VecDeque::new(),
            output: SharedBuffer::default(),
            width: Some(width),
            open: false,
            fail_open: false,
            fail_close: false,
        }
    }

    /// A console whose size cannot be queried.
    pub fn without_size() -> Self {
        Self {
            width: None,
            ..Self::new(0)
        }
    }

    pub fn key(mut self, code: KeyCode) -> Self {
        let key = KeyEvent::new(code, KeyModifiers::NONE);
        self.events.push_back(Ok(key));
        self
    }

    pub fn ctrl(mut self, c: char) -> Self {
        let key = KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL);
        self.events.push_back(Ok(key));
        self
    }

    /// Queue one key press per character; `'\n'` becomes enter.
    pub fn type_str(mut self, s: &str) -> Self {
        self.push_str(s);
        self
    }

    pub fn read_error(mut self, err: ReadError) -> Self {
        self.events.push_back(Err(err));
        self
    }

    /// Draw into another console's buffer, so several prompts share one screen.
    pub fn sharing_output(mut self, output: SharedBuffer) -> Self {
        self.output = output;
        self
    }

    pub fn fail_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    pub fn fail_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    pub fn push_str(&mut self, s: &str) {
        for c in s.chars() {
            let code = if c == '\n' {
                KeyCode::Enter
            } else {
                KeyCode::Char(c)
            };
            let key = KeyEvent::new(code, KeyModifiers::NONE);
            self.events.push_back(Ok(key));
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    pub fn output(&self) -> SharedBuffer {
        self.output.clone()
    }
}

impl Console for ScriptedConsole {
    type Writer = SharedBuffer;

    fn open(&mut self) -> io::Result<()> {
        if self.fail_open {
            return Err(io::Error::other("no tty"));
        }
        self.open = true;
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        if self.fail_close {
            return Err(io::Error::other("tcsetattr failed"));
        }
        self.open = false;
        Ok(())
    }

    fn read_key(&mut self) -> Result<KeyEvent, ReadError> {
        self.events.pop_front().unwrap_or_else(|| {
            Err(ReadError::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "key script exhausted",
            )))
        })
    }

    fn width(&self) -> io::Result<usize> {
        match self.width {
            Some(width) => Ok(width),
            None => Err(io::Error::new(io::ErrorKind::Unsupported, "not a terminal")),
        }
    }

    fn writer(&self) -> SharedBuffer {
        self.output.clone()
    }
}
