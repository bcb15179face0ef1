//! Console front end and task bodies.
//!
//! # Available Utilities
//!
//! - **[`shell`]**: line editor, parser and dispatcher
//! - **[`commands`]**: the diagnostic command table and its [`Console`] context
//! - **[`supervisor`]**: keeps one shell session alive on the main task
//! - **[`blink`]**: heartbeat LED task body
//!
//! # Usage
//!
//! Firmware wires a board's devices into a [`Console`] and serves the command
//! table from the shell task:
//!
//! ```rust,no_run
//! use sdramdiag::system::commands::{commands, Board, Console};
//! use sdramdiag::system::shell::Shell;
//! use sdramdiag::system::stream::Stream;
//!
//! fn shell_task<B: Board, S: Stream>(console: &mut Console<B>, serial: &mut S) {
//!     let table = commands::<B>();
//!     let mut shell = Shell::new(&table);
//!     let _ = shell.run(console, serial);
//! }
//! ```

/// Command shell: line editing, parsing and dispatch.
pub mod shell;

/// Byte stream abstraction for shell sessions.
pub mod stream;

/// Diagnostic commands.
pub mod commands;

/// Shell lifecycle management.
pub mod supervisor;

/// Heartbeat LED.
pub mod blink;

pub use commands::{Board, Console};
pub use shell::{Command, Dispatch, Shell, ShellResult};
pub use supervisor::Supervisor;
