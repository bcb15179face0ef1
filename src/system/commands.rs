//! The diagnostic command set.
//!
//! Every handler takes no arguments. Given any, it prints its usage line and
//! returns without touching memory, the controller or the task runtime.

use super::shell::{Command, ShellResult, outln};
use crate::config::DiagConfig;
use crate::runtime::{self, Runtime, Sleep, TaskKind, TaskSpec};
use crate::sdram::{self, ModeControl, Sdram, Target};
use crate::storage::{self, Storage};
use crate::timing::Clock;
use core::fmt;

/// Number of entries in [`commands`].
pub const COMMAND_COUNT: usize = 10;

/// The hardware and kernel bindings of one board.
pub trait Board {
    /// Task runtime seen from the shell task.
    type Runtime: Runtime;
    /// The external RAM bank.
    type Region: Storage<Error = storage::Error>;
    /// Tick counter for timing passes.
    type Clock: Clock;
    /// Memory controller mode registers.
    type Controller: ModeControl;
}

/// Everything a shell session's commands operate on.
///
/// A session gets `&mut Console`, so the memory bank has exactly one user
/// at a time.
pub struct Console<B: Board> {
    /// Task runtime, as seen from the shell task.
    pub runtime: B::Runtime,
    /// Diagnostic engine over the external bank.
    pub sdram: Sdram<B::Region, B::Clock, B::Controller>,
    /// Diagnostic parameters.
    pub config: DiagConfig,
}

impl<B: Board> Console<B> {
    /// Bundle the board's devices. The busy-poll limit of `sdram` is taken
    /// from `config`.
    pub fn new(
        runtime: B::Runtime,
        sdram: Sdram<B::Region, B::Clock, B::Controller>,
        config: DiagConfig,
    ) -> Self {
        let sdram = sdram.with_poll_limit(config.busy_poll_limit);
        Self {
            runtime,
            sdram,
            config,
        }
    }
}

impl<B: Board> fmt::Debug for Console<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Console")
            .field("size", &self.sdram.size())
            .field("mode", &self.sdram.mode_state())
            .field("config", &self.config)
            .finish()
    }
}

/// The command table, in lookup order.
pub fn commands<B: Board>() -> [Command<Console<B>>; COMMAND_COUNT] {
    [
        Command {
            name: "mem",
            description: "Show heap and core memory status",
            handler: cmd_mem::<B>,
        },
        Command {
            name: "threads",
            description: "List all tasks",
            handler: cmd_threads::<B>,
        },
        Command {
            name: "test",
            description: "Run the kernel self-test",
            handler: cmd_test::<B>,
        },
        Command {
            name: "sdram",
            description: "Write, read and check the whole SDRAM",
            handler: cmd_sdram::<B>,
        },
        Command {
            name: "write",
            description: "Fill the SDRAM with the test pattern",
            handler: cmd_write::<B>,
        },
        Command {
            name: "erase",
            description: "Zero the whole SDRAM",
            handler: cmd_erase::<B>,
        },
        Command {
            name: "check",
            description: "Check the SDRAM against the test pattern",
            handler: cmd_check::<B>,
        },
        Command {
            name: "reset",
            description: "Restart the device",
            handler: cmd_reset::<B>,
        },
        Command {
            name: "selfrefresh",
            description: "Put the SDRAM into self refresh mode",
            handler: cmd_selfrefresh::<B>,
        },
        Command {
            name: "normal",
            description: "Put the SDRAM into normal mode",
            handler: cmd_normal::<B>,
        },
    ]
}

/// Print `Usage: <name>` if any argument was given.
fn no_args(out: &mut dyn fmt::Write, argv: &[&str], name: &str) -> Result<(), ShellResult> {
    if argv.is_empty() {
        return Ok(());
    }
    outln!(out, "Usage: {}", name);
    Err(ShellResult::InvalidParameter)
}

/// Report a failed diagnostic pass.
fn report(out: &mut dyn fmt::Write, err: sdram::Error) -> ShellResult {
    match err {
        sdram::Error::Mismatch(m) => {
            outln!(
                out,
                "Error at {}, expected {} but read {}.",
                m.offset,
                m.expected,
                m.actual
            );
        }
        sdram::Error::NotConfirmed { target, .. } => {
            outln!(out, "SDRAM is not in {} mode, command FAILED", target.name());
        }
        sdram::Error::Timeout => {
            outln!(out, "SDRAM controller busy timeout, command FAILED");
        }
        sdram::Error::Storage(e) => {
            error!("sdram access failed: {}", e);
            outln!(out, "SDRAM access error");
        }
    }
    ShellResult::Fault
}

fn cmd_mem<B: Board>(c: &mut Console<B>, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "mem") {
        return usage;
    }
    let status = c.runtime.heap_status();
    outln!(out, "core free memory : {} bytes", status.core_free);
    outln!(out, "heap fragments   : {}", status.fragments);
    outln!(out, "heap free total  : {} bytes", status.free_total);
    ShellResult::Ok
}

fn cmd_threads<B: Board>(
    c: &mut Console<B>,
    out: &mut dyn fmt::Write,
    argv: &[&str],
) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "threads") {
        return usage;
    }
    outln!(out, "    addr    stack prio refs     state time");
    for task in c.runtime.tasks() {
        outln!(
            out,
            "{:08x} {:08x} {:4} {:4} {:>9} {}",
            task.address,
            task.stack_pointer,
            task.priority.0,
            task.refs,
            task.state.name(),
            task.time
        );
    }
    ShellResult::Ok
}

fn cmd_test<B: Board>(c: &mut Console<B>, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "test") {
        return usage;
    }
    let spec = TaskSpec::new(
        "test",
        c.config.test_stack_bytes,
        c.runtime.current_priority(),
    );
    match c.runtime.spawn(spec, TaskKind::SelfTest) {
        Ok(task) => {
            c.runtime.join(task);
            ShellResult::Ok
        }
        Err(runtime::Error::OutOfMemory) => {
            warn!("self-test spawn failed");
            outln!(out, "out of memory");
            ShellResult::OutOfMemory
        }
    }
}

fn cmd_sdram<B: Board>(c: &mut Console<B>, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "sdram") {
        return usage;
    }
    match c.sdram.exercise(c.config.pattern_base) {
        Ok(report) => {
            outln!(
                out,
                "SDRAM test completed successfully, writing entire memory took {}ms, reading it took {}ms, checking it took {}ms ({}ms total).",
                report.write_ms,
                report.read_ms,
                report.check_ms,
                report.total_ms()
            );
            ShellResult::Ok
        }
        Err(err) => report(out, err),
    }
}

fn cmd_write<B: Board>(c: &mut Console<B>, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "write") {
        return usage;
    }
    match c.sdram.fill_timed(c.config.pattern_base) {
        Ok(ms) => {
            outln!(out, "SDRAM written in {}ms.", ms);
            ShellResult::Ok
        }
        Err(err) => report(out, err),
    }
}

fn cmd_erase<B: Board>(c: &mut Console<B>, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "erase") {
        return usage;
    }
    match c.sdram.erase_timed() {
        Ok(ms) => {
            outln!(out, "SDRAM erased in {}ms.", ms);
            ShellResult::Ok
        }
        Err(err) => report(out, err),
    }
}

fn cmd_check<B: Board>(c: &mut Console<B>, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "check") {
        return usage;
    }
    match c.sdram.verify_timed(c.config.pattern_base) {
        Ok(ms) => {
            outln!(out, "SDRAM read and check completed successfully in {}ms.", ms);
            ShellResult::Ok
        }
        Err(err) => report(out, err),
    }
}

fn cmd_reset<B: Board>(c: &mut Console<B>, out: &mut dyn fmt::Write, argv: &[&str]) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "reset") {
        return usage;
    }
    outln!(out, "Will reset in {}ms", c.config.reset_delay_ms);
    c.runtime.sleep_ms(c.config.reset_delay_ms);
    info!("device reset requested from shell");
    c.runtime.reset();
    ShellResult::Ok
}

fn transition<B: Board>(
    c: &mut Console<B>,
    out: &mut dyn fmt::Write,
    target: Target,
) -> ShellResult {
    match c.sdram.mode_transition(target) {
        Ok(()) => {
            outln!(out, "SDRAM is in {} mode.", target.name());
            ShellResult::Ok
        }
        Err(err) => report(out, err),
    }
}

fn cmd_selfrefresh<B: Board>(
    c: &mut Console<B>,
    out: &mut dyn fmt::Write,
    argv: &[&str],
) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "selfrefresh") {
        return usage;
    }
    transition(c, out, Target::SelfRefresh)
}

fn cmd_normal<B: Board>(
    c: &mut Console<B>,
    out: &mut dyn fmt::Write,
    argv: &[&str],
) -> ShellResult {
    if let Err(usage) = no_args(out, argv, "normal") {
        return usage;
    }
    transition(c, out, Target::Normal)
}
