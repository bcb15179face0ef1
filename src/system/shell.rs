//! Command shell for the diagnostic console.
//!
//! This module provides the line editor, the command dispatcher and the
//! session loop of the console. It is `no_std` and allocation free: the line
//! lives in a fixed buffer and arguments are borrowed slices of it.
//!
//! # Features
//!
//! - **Ordered command tables**: plain slices of [`Command`], searched front to back
//! - **Whitespace splitting**: no quoting or escaping
//! - **Line editing**: echo, backspace and delete
//! - **Built-ins**: `help` and `exit`, overridable by table entries
//! - **Context passing**: handlers get a caller-chosen context instead of globals
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   Line Editor   │───▶│  Line Parser    │───▶│   Dispatcher    │
//! │   (read_line /  │    │  (name + argv)  │    │   (table scan)  │
//! │    input)       │    │                 │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!          ▲                                             │
//!          │                                             ▼
//! ┌─────────────────┐                           ┌─────────────────┐
//! │     Stream      │◀──────────────────────────│    Handler      │
//! │  (serial port)  │        CR-LF output       │  (ctx, argv)    │
//! └─────────────────┘                           └─────────────────┘
//! ```
//!
//! # Usage Examples
//!
//! ```rust
//! use core::fmt::Write;
//! use sdramdiag::system::shell::{Command, Dispatch, Shell, ShellResult};
//!
//! fn uptime(ticks: &mut u32, out: &mut dyn Write, argv: &[&str]) -> ShellResult {
//!     if !argv.is_empty() {
//!         let _ = out.write_str("Usage: uptime\r\n");
//!         return ShellResult::InvalidParameter;
//!     }
//!     let _ = write!(out, "{} ticks\r\n", ticks);
//!     ShellResult::Ok
//! }
//!
//! let commands = [Command { name: "uptime", description: "Show uptime", handler: uptime }];
//! let shell = Shell::new(&commands);
//!
//! let mut ticks = 1234u32;
//! let mut out = String::new();
//! assert_eq!(shell.dispatch(&mut ticks, &mut out, "uptime"), Dispatch::Handled(ShellResult::Ok));
//! assert_eq!(shell.dispatch(&mut ticks, &mut out, "uptim"), Dispatch::Unknown);
//! assert_eq!(out, "1234 ticks\r\nuptim ?\r\n");
//! ```

use super::stream::Stream;
use crate::config::ShellConfig;
use core::fmt;
use core::str;
use heapless::Vec;

/// Maximum length of a command line.
///
/// Characters typed beyond this are dropped.
pub const MAX_BUFFER_SIZE: usize = 64;

/// Maximum number of arguments after the command name.
///
/// A full line buffer holds at most this many arguments plus the name, so
/// every line the editor produces splits without loss.
pub const MAX_ARGS: usize = MAX_BUFFER_SIZE / 2;

// ASCII control character constants for input processing
/// ASCII end-of-transmission (Ctrl-D), ends the session.
pub const ASCII_EOT: u8 = 0x04;
/// ASCII backspace character (0x08).
pub const ASCII_BACKSPACE: u8 = 0x08;
/// ASCII line feed character (0x0A).
pub const ASCII_LF: u8 = 0x0A;
/// ASCII carriage return character (0x0D).
pub const ASCII_CR: u8 = 0x0D;
/// ASCII delete character (0x7F).
pub const ASCII_DEL: u8 = 0x7F;

/// Outcome reported by a command handler.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ShellResult {
    /// Command completed.
    Ok,
    /// Wrong argument count; the usage line was printed.
    InvalidParameter,
    /// A task or buffer could not be allocated.
    OutOfMemory,
    /// The input line did not fit the line buffer.
    BufferOverflow,
    /// The command ran but found a data or hardware fault.
    Fault,
    /// The session should end.
    Exit,
}

#[cfg(feature = "defmt")]
impl defmt::Format for ShellResult {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ShellResult::Ok => defmt::write!(f, "Ok"),
            ShellResult::InvalidParameter => defmt::write!(f, "InvalidParameter"),
            ShellResult::OutOfMemory => defmt::write!(f, "OutOfMemory"),
            ShellResult::BufferOverflow => defmt::write!(f, "BufferOverflow"),
            ShellResult::Fault => defmt::write!(f, "Fault"),
            ShellResult::Exit => defmt::write!(f, "Exit"),
        }
    }
}

/// Function signature for command handlers.
///
/// # Arguments
///
/// * `ctx` - Caller-supplied context (devices, runtime, configuration)
/// * `out` - Output side of the session stream; lines end in CR-LF
/// * `argv` - Arguments after the command name; `argv.len()` is the count
pub type CommandFn<C> = fn(ctx: &mut C, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult;

/// One entry of a command table.
pub struct Command<C> {
    /// The command name as typed by the user. Case-sensitive, unique
    /// within a table.
    pub name: &'static str,

    /// One-line description.
    pub description: &'static str,

    /// The function that implements the command.
    pub handler: CommandFn<C>,
}

impl<C> Clone for Command<C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for Command<C> {}

impl<C> fmt::Debug for Command<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("name", &self.name)
            .field("description", &self.description)
            .finish()
    }
}

/// Check that no name appears twice in `commands`.
///
/// Returns the first repeated name.
pub fn validate<C>(commands: &[Command<C>]) -> Result<(), &'static str> {
    for (i, cmd) in commands.iter().enumerate() {
        if commands[..i].iter().any(|other| other.name == cmd.name) {
            return Err(cmd.name);
        }
    }
    Ok(())
}

/// Split a line into a command name and its arguments.
///
/// Tokens are separated by runs of ASCII whitespace. Returns `Ok(None)` for
/// a blank line. Only a line longer than [`MAX_BUFFER_SIZE`] can carry more
/// than [`MAX_ARGS`] arguments; that yields `Err(ShellResult::BufferOverflow)`.
pub fn parse_line(line: &str) -> Result<Option<(&str, Vec<&str, MAX_ARGS>)>, ShellResult> {
    let mut tokens = line.split_ascii_whitespace();
    let Some(name) = tokens.next() else {
        return Ok(None);
    };
    let mut argv = Vec::new();
    for token in tokens {
        argv.push(token).map_err(|_| ShellResult::BufferOverflow)?;
    }
    Ok(Some((name, argv)))
}

/// What [`Shell::dispatch`] did with a line.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Dispatch {
    /// The line was blank.
    Empty,
    /// A handler ran and returned this result.
    Handled(ShellResult),
    /// No command matched; the unknown-command notice was printed.
    Unknown,
    /// The line split into more than [`MAX_ARGS`] arguments, which only a
    /// line longer than the editor buffer can do; nothing ran.
    TooManyArguments,
    /// The session should end.
    Exit,
}

enum Edit {
    Pending,
    Line,
    Overflow,
    EndOfSession,
}

/// Write `text` to the session, ignoring stream errors like a console
/// printf does.
pub(crate) fn put(out: &mut dyn fmt::Write, text: &str) {
    let _ = out.write_str(text);
}

/// Write one formatted line terminated by CR-LF.
macro_rules! outln {
    ($out:expr, $($arg:tt)*) => {{
        let out: &mut dyn ::core::fmt::Write = &mut *$out;
        let _ = ::core::write!(out, $($arg)*);
        let _ = out.write_str("\r\n");
    }};
}
pub(crate) use outln;

/// One shell session: line editor state plus the command table it serves.
///
/// A `Shell` holds no state shared with any other session; the supervisor
/// creates a fresh one for every shell task.
pub struct Shell<'t, C> {
    buffer: [u8; MAX_BUFFER_SIZE],
    buffer_len: usize,
    last_was_cr: bool,
    commands: &'t [Command<C>],
    config: ShellConfig,
}

impl<C> fmt::Debug for Shell<'_, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shell")
            .field("buffer_len", &self.buffer_len)
            .field("commands", &self.commands.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<'t, C> Shell<'t, C> {
    /// Create a shell serving `commands` with the default configuration.
    pub fn new(commands: &'t [Command<C>]) -> Self {
        Self::with_config(commands, ShellConfig::default())
    }

    /// Create a shell serving `commands`.
    pub fn with_config(commands: &'t [Command<C>], config: ShellConfig) -> Self {
        Self {
            buffer: [0; MAX_BUFFER_SIZE],
            buffer_len: 0,
            last_was_cr: false,
            commands,
            config,
        }
    }

    /// Enable or disable echo of typed characters.
    pub fn set_echo(&mut self, enabled: bool) {
        self.config.echo = enabled;
    }

    /// Enable or disable the `help` and `exit` built-ins.
    pub fn set_builtins(&mut self, enabled: bool) {
        self.config.builtins = enabled;
    }

    /// The table this shell dispatches to.
    pub fn commands(&self) -> &'t [Command<C>] {
        self.commands
    }

    /// Run one line through the dispatcher.
    ///
    /// The table is scanned in order and the first exact name match runs.
    /// Built-ins are only considered after the table has no match. Handlers
    /// check their own arguments; the dispatcher only splits them.
    pub fn dispatch(&self, ctx: &mut C, out: &mut dyn fmt::Write, line: &str) -> Dispatch {
        let (name, argv) = match parse_line(line) {
            Ok(Some(parsed)) => parsed,
            Ok(None) => return Dispatch::Empty,
            Err(_) => {
                put(out, "too many arguments\r\n");
                return Dispatch::TooManyArguments;
            }
        };

        if let Some(cmd) = self.commands.iter().find(|cmd| cmd.name == name) {
            let result = (cmd.handler)(ctx, out, &argv);
            if result == ShellResult::Exit {
                return Dispatch::Exit;
            }
            if result != ShellResult::Ok {
                debug!("command {=str} returned {}", cmd.name, result);
            }
            return Dispatch::Handled(result);
        }

        if self.config.builtins {
            match name {
                "exit" => {
                    if !argv.is_empty() {
                        put(out, "Usage: exit\r\n");
                        return Dispatch::Handled(ShellResult::InvalidParameter);
                    }
                    return Dispatch::Exit;
                }
                "help" => {
                    if !argv.is_empty() {
                        put(out, "Usage: help\r\n");
                        return Dispatch::Handled(ShellResult::InvalidParameter);
                    }
                    self.list_commands(out);
                    return Dispatch::Handled(ShellResult::Ok);
                }
                _ => {}
            }
        }

        debug!("unknown command {=str}", name);
        outln!(out, "{} ?", name);
        Dispatch::Unknown
    }

    fn list_commands(&self, out: &mut dyn fmt::Write) {
        put(out, "Commands: help exit");
        for cmd in self.commands {
            put(out, " ");
            put(out, cmd.name);
        }
        put(out, "\r\n");
    }

    fn echo(&self, out: &mut dyn fmt::Write, text: &str) {
        if self.config.echo {
            put(out, text);
        }
    }

    /// Feed one byte to the line editor.
    fn edit(&mut self, byte: u8, out: &mut dyn fmt::Write) -> Edit {
        let after_cr = core::mem::replace(&mut self.last_was_cr, false);
        match byte {
            ASCII_EOT => Edit::EndOfSession,
            // Second half of a CR-LF pair.
            ASCII_LF if after_cr => Edit::Pending,
            ASCII_CR | ASCII_LF => {
                self.last_was_cr = byte == ASCII_CR;
                self.echo(out, "\r\n");
                Edit::Line
            }
            ASCII_BACKSPACE | ASCII_DEL => {
                if self.buffer_len > 0 {
                    self.buffer_len -= 1;
                    self.echo(out, "\x08 \x08");
                }
                Edit::Pending
            }
            0x20..=0x7E => {
                if self.buffer_len >= MAX_BUFFER_SIZE {
                    return Edit::Overflow;
                }
                self.buffer[self.buffer_len] = byte;
                self.buffer_len += 1;
                if self.config.echo {
                    let _ = fmt::Write::write_char(out, char::from(byte));
                }
                Edit::Pending
            }
            _ => Edit::Pending,
        }
    }

    /// The line collected so far. Only printable ASCII is ever stored.
    fn line(&self) -> &str {
        str::from_utf8(&self.buffer[..self.buffer_len]).unwrap_or("")
    }

    /// Process input bytes pushed by the caller, e.g. from a UART interrupt
    /// queue, dispatching every completed line.
    ///
    /// # Returns
    ///
    /// * [`ShellResult::Ok`] - All bytes consumed
    /// * [`ShellResult::BufferOverflow`] - All bytes consumed, but characters
    ///   past the end of the line buffer were dropped
    /// * [`ShellResult::Exit`] - Ctrl-D or `exit` received, remaining bytes not processed
    pub fn input(&mut self, ctx: &mut C, out: &mut dyn fmt::Write, data: &[u8]) -> ShellResult {
        let mut overflowed = false;
        for &byte in data {
            match self.edit(byte, out) {
                Edit::Pending => {}
                Edit::Overflow => {
                    warn!("input line too long, byte dropped");
                    overflowed = true;
                }
                Edit::EndOfSession => return ShellResult::Exit,
                Edit::Line => {
                    let outcome = self.dispatch(ctx, out, self.line());
                    self.buffer_len = 0;
                    if outcome == Dispatch::Exit {
                        return ShellResult::Exit;
                    }
                }
            }
        }
        if overflowed {
            ShellResult::BufferOverflow
        } else {
            ShellResult::Ok
        }
    }

    /// Read one line from `stream`, blocking.
    ///
    /// Returns `Ok(None)` when the stream closes or Ctrl-D is received.
    /// Characters beyond [`MAX_BUFFER_SIZE`] are dropped.
    pub fn read_line<S: Stream>(&mut self, stream: &mut S) -> Result<Option<&str>, S::Error> {
        self.buffer_len = 0;
        let mut byte = [0u8; 1];
        loop {
            if stream.read(&mut byte)? == 0 {
                return Ok(None);
            }
            match self.edit(byte[0], stream) {
                Edit::Pending => {}
                Edit::Overflow => warn!("input line too long, byte dropped"),
                Edit::EndOfSession => return Ok(None),
                Edit::Line => return Ok(Some(self.line())),
            }
        }
    }

    /// Run the session loop until the stream closes, Ctrl-D is typed or a
    /// command asks to exit.
    ///
    /// # Errors
    ///
    /// Returns the stream's read error; the session is over in that case.
    pub fn run<S: Stream>(&mut self, ctx: &mut C, stream: &mut S) -> Result<(), S::Error> {
        info!("shell session started");
        put(stream, "\r\nSDRAM diagnostic shell\r\n");
        loop {
            put(stream, self.config.prompt.as_str());
            if self.read_line(stream)?.is_none() {
                put(stream, "\r\nlogout\r\n");
                break;
            }
            let line = self.line();
            if self.dispatch(ctx, stream, line) == Dispatch::Exit {
                break;
            }
        }
        info!("shell session ended");
        Ok(())
    }
}
