//! # sdramdiag - SDRAM diagnostic console
//!
//! An interactive serial console for RTOS-hosted microcontrollers with an
//! external SDRAM bank. Operators type one-line commands to inspect the task
//! registry and the heap, run the kernel self-test, and exercise the external
//! memory: fill it with a deterministic pattern, erase it, check it back, time
//! read and write throughput, and move the memory controller between normal
//! operation and self-refresh.
//!
//! ## Features
//!
//! ### Shell
//! - Line editor with echo, backspace and CR-LF handling
//! - Ordered command tables with `help` and `exit` built-ins
//! - A supervisor that respawns the shell task whenever a session ends
//!
//! ### Diagnostics
//! - Fill, erase, fail-fast verify and read sweep over any byte region
//! - Millisecond timing of every pass from a free-running tick counter
//! - Bounded busy-poll of the memory controller on mode transitions
//!
//! ### Platform seams
//! - [`runtime::Runtime`] for task creation, registry and heap status
//! - [`storage::Storage`] for the memory bank, volatile or slice-backed
//! - [`timing::Clock`] for the tick counter
//! - [`sdram::ModeControl`] for the controller's mode registers
//!
//! ## Usage
//!
//! ```rust
//! # use core::cell::Cell;
//! use sdramdiag::sdram::{Mode, ModeControl, Sdram, Target};
//! use sdramdiag::storage::SliceRegion;
//! use sdramdiag::timing::Clock;
//! # struct Dwt(Cell<u32>);
//! # impl Clock for Dwt {
//! #     fn now(&self) -> u32 { let t = self.0.get(); self.0.set(t + 168_000); t }
//! #     fn frequency(&self) -> u32 { 168_000_000 }
//! # }
//! # struct Fmc(Mode);
//! # impl ModeControl for Fmc {
//! #     fn command(&mut self, target: Target) { self.0 = target.mode(); }
//! #     fn is_busy(&mut self) -> bool { false }
//! #     fn mode(&mut self) -> Mode { self.0 }
//! # }
//!
//! let mut bank = vec![0u8; 64 * 1024];
//! let mut sdram = Sdram::new(SliceRegion::new(&mut bank), Dwt(Cell::new(0)), Fmc(Mode::Normal));
//!
//! let report = sdram.exercise(0x3C).unwrap();
//! assert_eq!(report.total_ms(), 3);
//!
//! sdram.mode_transition(Target::SelfRefresh).unwrap();
//! ```
//!
//! ## Optional Features
//!
//! - `std`: Enable standard library support (default: disabled)
//! - `defmt`: Route the crate's log output through defmt

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod log;

/// Console configuration and its JSON loader.
pub mod config;

/// Task runtime facade consumed by the console.
pub mod runtime;

/// External SDRAM diagnostic engine and memory controller interface.
pub mod sdram;

/// Byte-addressed memory regions.
///
/// Provides the region traits the diagnostic engine runs over, with a
/// slice-backed implementation for tests and hosts and a volatile one for
/// memory-mapped banks.
pub mod storage;

/// Shell, command set, supervisor and task bodies.
pub mod system;

/// Tick counter and elapsed-time measurement.
pub mod timing;
