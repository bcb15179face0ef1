//! # Task runtime facade
//!
//! The console does not schedule anything itself. Task creation, sleeping,
//! termination detection and the task registry belong to the RTOS the
//! firmware runs on; this module only describes what the console needs from
//! it.
//!
//! Task handles are owned values. Whoever spawned a task holds its handle
//! until giving it to [`Runtime::reap`] or [`Runtime::join`], both of which
//! consume it, so a task cannot be released twice.
//!
//! # Example
//!
//! ```rust,no_run
//! use sdramdiag::runtime::{Priority, Runtime, TaskKind, TaskSpec};
//!
//! fn respawn<R: Runtime>(rt: &mut R, shell: &mut Option<R::Task>) {
//!     match shell.take() {
//!         None => *shell = rt.spawn(TaskSpec::new("shell", 2048, Priority::NORMAL), TaskKind::Shell).ok(),
//!         Some(task) if rt.has_terminated(&task) => rt.reap(task),
//!         Some(task) => *shell = Some(task),
//!     }
//!     rt.sleep_ms(500);
//! }
//! ```

#![deny(unsafe_code)]

/// Common error types for runtime operations
pub mod error;

pub use error::Error;

/// Upper bound on the number of tasks a registry snapshot can hold.
pub const MAX_TASKS: usize = 16;

/// Fixed task priority. Higher values preempt lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[derive(serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct Priority(pub u8);

impl Priority {
    /// Lowest priority usable by application tasks.
    pub const LOW: Priority = Priority(1);
    /// Priority of the main task and the shell.
    pub const NORMAL: Priority = Priority(64);
    /// Highest priority usable by application tasks.
    pub const HIGH: Priority = Priority(127);

    /// This priority raised by `delta`, saturating at [`Priority::HIGH`].
    pub const fn raised(self, delta: u8) -> Priority {
        let value = self.0.saturating_add(delta);
        if value > Self::HIGH.0 {
            Self::HIGH
        } else {
            Priority(value)
        }
    }
}

/// Scheduler state of a task as reported by the kernel registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Waiting on the ready list.
    Ready,
    /// Currently running.
    Current,
    /// Created in suspended state.
    Suspended,
    /// Waiting on a semaphore.
    WaitSemaphore,
    /// Waiting on a mutex.
    WaitMutex,
    /// Waiting on a condition variable.
    WaitCondition,
    /// Sleeping.
    Sleeping,
    /// Waiting for another task to terminate.
    WaitExit,
    /// Waiting for any of a set of events.
    WaitOrEvent,
    /// Waiting for all of a set of events.
    WaitAndEvent,
    /// Sending a message, queued.
    SendMessageQueued,
    /// Sending a message, waiting for the answer.
    SendMessage,
    /// Waiting for a message.
    WaitMessage,
    /// Waiting on an I/O queue.
    WaitQueue,
    /// Terminated.
    Final,
}

impl TaskState {
    /// Registry name shown by the `threads` command.
    pub fn name(self) -> &'static str {
        match self {
            TaskState::Ready => "READY",
            TaskState::Current => "CURRENT",
            TaskState::Suspended => "SUSPENDED",
            TaskState::WaitSemaphore => "WTSEM",
            TaskState::WaitMutex => "WTMTX",
            TaskState::WaitCondition => "WTCOND",
            TaskState::Sleeping => "SLEEPING",
            TaskState::WaitExit => "WTEXIT",
            TaskState::WaitOrEvent => "WTOREVT",
            TaskState::WaitAndEvent => "WTANDEVT",
            TaskState::SendMessageQueued => "SNDMSGQ",
            TaskState::SendMessage => "SNDMSG",
            TaskState::WaitMessage => "WTMSG",
            TaskState::WaitQueue => "WTQUEUE",
            TaskState::Final => "FINAL",
        }
    }

    /// Whether the task has finished running.
    pub fn is_terminated(self) -> bool {
        self == TaskState::Final
    }
}

/// Point-in-time view of one task, copied out of the kernel registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskInfo {
    /// Address of the task control block.
    pub address: u32,
    /// Saved stack pointer.
    pub stack_pointer: u32,
    /// Current priority.
    pub priority: Priority,
    /// References held on the task by other parties.
    pub refs: u32,
    /// Scheduler state.
    pub state: TaskState,
    /// Accumulated run time in system ticks.
    pub time: u32,
}

/// Heap and core allocator status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HeapStatus {
    /// Bytes still available to the core allocator.
    pub core_free: usize,
    /// Number of free fragments in the heap.
    pub fragments: usize,
    /// Total free bytes across all heap fragments.
    pub free_total: usize,
}

/// Stack budget, priority and registry name of a task to spawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskSpec {
    /// Name shown in the registry.
    pub name: &'static str,
    /// Working area size in bytes.
    pub stack_bytes: usize,
    /// Initial priority.
    pub priority: Priority,
}

impl TaskSpec {
    /// Describe a task to spawn.
    pub const fn new(name: &'static str, stack_bytes: usize, priority: Priority) -> Self {
        Self {
            name,
            stack_bytes,
            priority,
        }
    }
}

/// Which body a spawned task runs.
///
/// Task bodies are bound statically by the firmware: the runtime
/// implementation maps each kind to its entry point and the resources it
/// needs (the shell its serial port and console, a blinker its LED pin).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// A shell session, see [`crate::system::shell::Shell::run`].
    Shell,
    /// Blinker number `n` of the configured blinkers, see
    /// [`crate::system::blink`].
    Blinker(usize),
    /// The kernel's built-in self-test suite.
    SelfTest,
}

/// Suspend the calling task.
pub trait Sleep {
    /// Suspend only the calling task for at least `ms` milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

/// Capabilities the console consumes from the RTOS.
pub trait Runtime: Sleep {
    /// Owned task handle.
    type Task;

    /// Create a task from the heap.
    ///
    /// # Errors
    ///
    /// - `OutOfMemory` if the working area cannot be allocated
    fn spawn(&mut self, spec: TaskSpec, kind: TaskKind) -> Result<Self::Task, Error>;

    /// Whether `task` has terminated. Never blocks.
    fn has_terminated(&self, task: &Self::Task) -> bool;

    /// Release the resources of a terminated task.
    ///
    /// Callers must have observed [`has_terminated`](Self::has_terminated)
    /// returning `true` for this handle first.
    fn reap(&mut self, task: Self::Task);

    /// Block until `task` terminates, then release it.
    fn join(&mut self, task: Self::Task);

    /// Snapshot of every task currently in the registry, in registry order.
    fn tasks(&self) -> heapless::Vec<TaskInfo, MAX_TASKS>;

    /// Priority of the calling task.
    fn current_priority(&self) -> Priority;

    /// Allocator status.
    fn heap_status(&self) -> HeapStatus;

    /// Restart the whole device. On hardware this does not return.
    fn reset(&mut self);
}
