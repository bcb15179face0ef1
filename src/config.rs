//! # Console configuration
//!
//! Every tunable of the console in one structure. The defaults reproduce the
//! STM32F429I-DISCO demo; firmware can override any subset of fields from a
//! JSON document, e.g. one baked into flash:
//!
//! ```rust
//! use sdramdiag::config::Config;
//!
//! let config = Config::from_json(br#"{"diag":{"pattern_base":90},"shell":{"echo":false}}"#).unwrap();
//! assert_eq!(config.diag.pattern_base, 90);
//! assert!(!config.shell.echo);
//! assert_eq!(config.supervisor.poll_interval_ms, 500);
//! ```

use crate::runtime::{Priority, TaskSpec};
use crate::sdram::DEFAULT_POLL_LIMIT;
use heapless::{String, Vec};
use serde::{Deserialize, Serialize};

/// Maximum prompt length in bytes.
pub const MAX_PROMPT_LEN: usize = 16;

/// Maximum number of blink tasks.
pub const MAX_BLINKERS: usize = 4;

/// Errors reported while loading a configuration.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// The document is not valid JSON or does not match the schema.
    Parse,
    /// The output buffer is too small for the serialized document.
    BufferTooSmall,
}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::Parse => defmt::write!(f, "Parse"),
            Error::BufferTooSmall => defmt::write!(f, "BufferTooSmall"),
        }
    }
}

/// Shell session behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Prompt printed before each line.
    pub prompt: String<MAX_PROMPT_LEN>,
    /// Echo typed characters back to the terminal.
    pub echo: bool,
    /// Recognise the `help` and `exit` built-ins.
    pub builtins: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        let mut prompt = String::new();
        // Fits: MAX_PROMPT_LEN >= 2.
        let _ = prompt.push_str("> ");
        Self {
            prompt,
            echo: true,
            builtins: true,
        }
    }
}

/// One periodic LED blinker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlinkConfig {
    /// Time the LED spends in each state.
    pub half_period_ms: u32,
    /// Working area size in bytes.
    pub stack_bytes: usize,
    /// Task priority.
    pub priority: Priority,
}

impl BlinkConfig {
    /// Task description for this blinker.
    pub fn task_spec(&self) -> TaskSpec {
        TaskSpec::new("blinker", self.stack_bytes, self.priority)
    }
}

/// Shell lifecycle management on the main task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SupervisorConfig {
    /// Working area of each shell task in bytes.
    pub shell_stack_bytes: usize,
    /// Priority of each shell task.
    pub shell_priority: Priority,
    /// Interval between checks for a terminated shell.
    pub poll_interval_ms: u32,
    /// Blink tasks spawned once at start-up.
    pub blinkers: Vec<BlinkConfig, MAX_BLINKERS>,
}

impl SupervisorConfig {
    /// Task description for a shell session.
    pub fn shell_spec(&self) -> TaskSpec {
        TaskSpec::new("shell", self.shell_stack_bytes, self.shell_priority)
    }
}

impl Default for SupervisorConfig {
    fn default() -> Self {
        let blink_priority = Priority::NORMAL.raised(10);
        let mut blinkers = Vec::new();
        // Fits: MAX_BLINKERS >= 2.
        let _ = blinkers.push(BlinkConfig {
            half_period_ms: 500,
            stack_bytes: 128,
            priority: blink_priority,
        });
        let _ = blinkers.push(BlinkConfig {
            half_period_ms: 250,
            stack_bytes: 128,
            priority: blink_priority,
        });
        Self {
            shell_stack_bytes: 2048,
            shell_priority: Priority::NORMAL,
            poll_interval_ms: 500,
            blinkers,
        }
    }
}

/// Diagnostic command parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagConfig {
    /// Seed of the fill/verify pattern.
    pub pattern_base: u8,
    /// Working area of the self-test task in bytes.
    pub test_stack_bytes: usize,
    /// Delay between the `reset` command and the actual reset.
    pub reset_delay_ms: u32,
    /// Maximum busy polls during a mode transition, `None` for no limit.
    pub busy_poll_limit: Option<u32>,
}

impl Default for DiagConfig {
    fn default() -> Self {
        Self {
            pattern_base: 0x3C,
            test_stack_bytes: 256,
            reset_delay_ms: 200,
            busy_poll_limit: Some(DEFAULT_POLL_LIMIT),
        }
    }
}

/// Complete console configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shell session behaviour.
    pub shell: ShellConfig,
    /// Shell lifecycle and blinkers.
    pub supervisor: SupervisorConfig,
    /// Diagnostic commands.
    pub diag: DiagConfig,
}

impl Config {
    /// Parse a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &[u8]) -> Result<Self, Error> {
        serde_json_core::from_slice::<Config>(json)
            .map(|(config, _)| config)
            .map_err(|_| Error::Parse)
    }

    /// Serialize into `buf`, returning the number of bytes written.
    pub fn to_json(&self, buf: &mut [u8]) -> Result<usize, Error> {
        serde_json_core::to_slice(self, buf).map_err(|_| Error::BufferTooSmall)
    }
}
