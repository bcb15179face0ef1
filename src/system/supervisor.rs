//! Shell lifecycle on the main task.
//!
//! The supervisor keeps exactly one shell session alive: it spawns a shell
//! task whenever none is held, and reaps the held one once it has terminated
//! so its working area returns to the heap before the next spawn.

use crate::config::SupervisorConfig;
use crate::runtime::{Runtime, TaskKind};
use core::fmt;

/// Owner of the shell task handle.
pub struct Supervisor<RT: Runtime> {
    runtime: RT,
    shell: Option<RT::Task>,
    config: SupervisorConfig,
    spawned: u32,
    reaped: u32,
}

impl<RT: Runtime> fmt::Debug for Supervisor<RT> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Supervisor")
            .field("shell_alive", &self.shell.is_some())
            .field("spawned", &self.spawned)
            .field("reaped", &self.reaped)
            .finish()
    }
}

impl<RT: Runtime> Supervisor<RT> {
    /// Supervise shells on `runtime`.
    pub fn new(runtime: RT, config: SupervisorConfig) -> Self {
        Self {
            runtime,
            shell: None,
            config,
            spawned: 0,
            reaped: 0,
        }
    }

    /// Spawn the configured blink tasks. A blinker that cannot be created is
    /// logged and left out; its handle is never needed again otherwise.
    pub fn start(&mut self) -> usize {
        let mut started = 0;
        for (index, blink) in self.config.blinkers.iter().enumerate() {
            match self.runtime.spawn(blink.task_spec(), TaskKind::Blinker(index)) {
                // Blinkers run forever; the handle is simply dropped.
                Ok(_task) => started += 1,
                Err(_) => error!("blinker {=usize} could not be spawned", index),
            }
        }
        started
    }

    /// One supervision cycle: spawn or reap the shell, then sleep.
    pub fn step(&mut self) {
        match self.shell.take() {
            None => match self.runtime.spawn(self.config.shell_spec(), TaskKind::Shell) {
                Ok(task) => {
                    self.spawned = self.spawned.wrapping_add(1);
                    debug!("shell spawned");
                    self.shell = Some(task);
                }
                Err(_) => warn!("shell spawn failed, retrying"),
            },
            Some(task) if self.runtime.has_terminated(&task) => {
                self.runtime.reap(task);
                self.reaped = self.reaped.wrapping_add(1);
                debug!("shell reaped");
            }
            Some(task) => self.shell = Some(task),
        }
        self.runtime.sleep_ms(self.config.poll_interval_ms);
    }

    /// Start the blinkers and supervise shells forever.
    pub fn run(mut self) -> ! {
        self.start();
        loop {
            self.step();
        }
    }

    /// Whether a shell handle is currently held.
    pub fn shell_alive(&self) -> bool {
        self.shell.is_some()
    }

    /// Shells spawned so far.
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Shells reaped so far.
    pub fn reaped(&self) -> u32 {
        self.reaped
    }

    /// The supervised runtime.
    pub fn runtime(&self) -> &RT {
        &self.runtime
    }

    /// Mutable access to the supervised runtime.
    pub fn runtime_mut(&mut self) -> &mut RT {
        &mut self.runtime
    }
}
