#![allow(dead_code)]

use core::cell::Cell;
use core::convert::Infallible;
use core::fmt;
use std::collections::VecDeque;

use sdramdiag::config::DiagConfig;
use sdramdiag::runtime::{
    Error, HeapStatus, MAX_TASKS, Priority, Runtime, Sleep, TaskInfo, TaskKind, TaskSpec,
};
use sdramdiag::sdram::{Mode, ModeControl, Sdram, Target};
use sdramdiag::storage::{self, ReadStorage, Storage};
use sdramdiag::system::commands::{Board, Console};
use sdramdiag::system::shell::{Command, Dispatch, Shell};
use sdramdiag::system::stream::Read;
use sdramdiag::timing::Clock;

/// Serial port stand-in: scripted input, captured output.
#[derive(Default)]
pub struct MockStream {
    pub input: VecDeque<u8>,
    pub output: String,
}

impl MockStream {
    pub fn with_input(input: &[u8]) -> Self {
        Self {
            input: input.iter().copied().collect(),
            output: String::new(),
        }
    }
}

impl Read for MockStream {
    type Error = Infallible;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        match (buf.first_mut(), self.input.pop_front()) {
            (Some(slot), Some(byte)) => {
                *slot = byte;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}

impl fmt::Write for MockStream {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.output.push_str(s);
        Ok(())
    }
}

/// Task handle; deliberately not `Clone`.
#[derive(Debug, PartialEq, Eq)]
pub struct MockTask(pub usize);

#[derive(Debug, Clone, Copy)]
pub struct LiveTask {
    pub id: usize,
    pub spec: TaskSpec,
    pub kind: TaskKind,
    pub terminated: bool,
}

/// Scripted RTOS. Spawned tasks stay alive until a test terminates them.
#[derive(Debug)]
pub struct MockRuntime {
    next_id: usize,
    pub live: Vec<LiveTask>,
    pub spawns: Vec<(TaskSpec, TaskKind)>,
    pub reaped: Vec<usize>,
    pub joined: Vec<usize>,
    pub sleeps: Vec<u32>,
    /// Number of upcoming spawns that fail with `OutOfMemory`.
    pub failing_spawns: usize,
    pub resets: u32,
    pub heap: HeapStatus,
    pub registry: Vec<TaskInfo>,
    pub priority: Priority,
}

impl MockRuntime {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            live: Vec::new(),
            spawns: Vec::new(),
            reaped: Vec::new(),
            joined: Vec::new(),
            sleeps: Vec::new(),
            failing_spawns: 0,
            resets: 0,
            heap: HeapStatus::default(),
            registry: Vec::new(),
            priority: Priority::NORMAL,
        }
    }

    /// Mark every live task of `kind` as terminated.
    pub fn terminate(&mut self, kind: TaskKind) {
        for task in self.live.iter_mut().filter(|t| t.kind == kind) {
            task.terminated = true;
        }
    }

    pub fn live_count(&self, kind: TaskKind) -> usize {
        self.live.iter().filter(|t| t.kind == kind).count()
    }
}

impl Sleep for MockRuntime {
    fn sleep_ms(&mut self, ms: u32) {
        self.sleeps.push(ms);
    }
}

impl Runtime for MockRuntime {
    type Task = MockTask;

    fn spawn(&mut self, spec: TaskSpec, kind: TaskKind) -> Result<MockTask, Error> {
        if self.failing_spawns > 0 {
            self.failing_spawns -= 1;
            return Err(Error::OutOfMemory);
        }
        let id = self.next_id;
        self.next_id += 1;
        self.spawns.push((spec, kind));
        self.live.push(LiveTask {
            id,
            spec,
            kind,
            terminated: false,
        });
        Ok(MockTask(id))
    }

    fn has_terminated(&self, task: &MockTask) -> bool {
        self.live
            .iter()
            .find(|t| t.id == task.0)
            .is_some_and(|t| t.terminated)
    }

    fn reap(&mut self, task: MockTask) {
        let index = self
            .live
            .iter()
            .position(|t| t.id == task.0)
            .expect("reaping an unknown task");
        assert!(self.live[index].terminated, "reaping a running task");
        self.live.remove(index);
        self.reaped.push(task.0);
    }

    fn join(&mut self, task: MockTask) {
        self.live.retain(|t| t.id != task.0);
        self.joined.push(task.0);
    }

    fn tasks(&self) -> heapless::Vec<TaskInfo, MAX_TASKS> {
        self.registry.iter().copied().take(MAX_TASKS).collect()
    }

    fn current_priority(&self) -> Priority {
        self.priority
    }

    fn heap_status(&self) -> HeapStatus {
        self.heap
    }

    fn reset(&mut self) {
        self.resets += 1;
    }
}

/// Tick counter that advances 1 ms worth of ticks on every read.
pub struct StepClock {
    now: Cell<u32>,
}

impl StepClock {
    pub const FREQUENCY: u32 = 84_000_000;

    pub fn new() -> Self {
        Self { now: Cell::new(0) }
    }
}

impl Clock for StepClock {
    fn now(&self) -> u32 {
        let t = self.now.get();
        self.now.set(t.wrapping_add(Self::FREQUENCY / 1000));
        t
    }

    fn frequency(&self) -> u32 {
        Self::FREQUENCY
    }
}

/// Memory controller whose busy flag stays set for `busy_polls` polls after
/// each command.
#[derive(Debug)]
pub struct MockController {
    pub mode: Mode,
    pub stuck: bool,
    pub busy_polls: u32,
    remaining: u32,
    pub commands: Vec<Target>,
}

impl MockController {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            stuck: false,
            busy_polls: 2,
            remaining: 0,
            commands: Vec::new(),
        }
    }
}

impl ModeControl for MockController {
    fn command(&mut self, target: Target) {
        self.commands.push(target);
        self.remaining = self.busy_polls;
        if !self.stuck {
            self.mode = target.mode();
        }
    }

    fn is_busy(&mut self) -> bool {
        if self.remaining > 0 {
            self.remaining -= 1;
            true
        } else {
            false
        }
    }

    fn mode(&mut self) -> Mode {
        self.mode
    }
}

/// Heap-backed memory bank. The optional second field pins one offset to a
/// fixed value, like a cell with a stuck bit.
#[derive(Debug)]
pub struct VecRegion(pub Vec<u8>, pub Option<(usize, u8)>);

impl ReadStorage for VecRegion {
    type Error = storage::Error;

    fn read(&mut self, offset: u32, bytes: &mut [u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let src = self
            .0
            .get(start..start + bytes.len())
            .ok_or(storage::Error::OutOfBounds)?;
        bytes.copy_from_slice(src);
        Ok(())
    }

    fn capacity(&self) -> usize {
        self.0.len()
    }
}

impl Storage for VecRegion {
    fn write(&mut self, offset: u32, bytes: &[u8]) -> Result<(), Self::Error> {
        let start = offset as usize;
        let dst = self
            .0
            .get_mut(start..start + bytes.len())
            .ok_or(storage::Error::OutOfBounds)?;
        dst.copy_from_slice(bytes);
        if let Some((stuck, value)) = self.1 {
            if let Some(cell) = self.0.get_mut(stuck) {
                *cell = value;
            }
        }
        Ok(())
    }
}

pub struct TestBoard;

impl Board for TestBoard {
    type Runtime = MockRuntime;
    type Region = VecRegion;
    type Clock = StepClock;
    type Controller = MockController;
}

/// A console over a bank of `size` bytes initialised to 0xAA.
pub fn console(size: usize) -> Console<TestBoard> {
    console_with(size, DiagConfig::default())
}

pub fn console_with(size: usize, config: DiagConfig) -> Console<TestBoard> {
    let sdram = Sdram::new(
        VecRegion(vec![0xAA; size], None),
        StepClock::new(),
        MockController::new(),
    );
    Console::new(MockRuntime::new(), sdram, config)
}

/// Dispatch one line and return the outcome and everything printed.
pub fn run_line<C>(commands: &[Command<C>], ctx: &mut C, line: &str) -> (Dispatch, String) {
    let shell = Shell::new(commands);
    let mut out = String::new();
    let outcome = shell.dispatch(ctx, &mut out, line);
    (outcome, out)
}
