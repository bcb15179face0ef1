//! SDRAM controller power-mode interface.

/// Operating mode reported by the controller status register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal operation, the bank is accessible.
    Normal,
    /// Self-refresh, the device keeps its contents without the controller.
    SelfRefresh,
    /// Power-down.
    PowerDown,
}

/// Mode a transition can be requested into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// Return to normal operation.
    Normal,
    /// Enter self-refresh.
    SelfRefresh,
}

impl Target {
    /// The controller mode that confirms this target.
    pub fn mode(self) -> Mode {
        match self {
            Target::Normal => Mode::Normal,
            Target::SelfRefresh => Mode::SelfRefresh,
        }
    }

    /// Human readable name used in console messages.
    pub fn name(self) -> &'static str {
        match self {
            Target::Normal => "normal",
            Target::SelfRefresh => "self refresh",
        }
    }
}

/// What the engine believes the controller is doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeState {
    /// No transition confirmed yet, or the last one failed.
    #[default]
    Unknown,
    /// Last transition into normal mode was confirmed.
    Normal,
    /// Last transition into self-refresh was confirmed.
    SelfRefresh,
}

impl From<Target> for ModeState {
    fn from(target: Target) -> Self {
        match target {
            Target::Normal => ModeState::Normal,
            Target::SelfRefresh => ModeState::SelfRefresh,
        }
    }
}

/// Low-level access to the memory controller's command and status
/// registers, supplied by the board support code.
pub trait ModeControl {
    /// Issue a mode command for the bank.
    fn command(&mut self, target: Target);

    /// Whether the controller is still busy executing a command.
    fn is_busy(&mut self) -> bool;

    /// Mode currently reported by the status register.
    fn mode(&mut self) -> Mode;
}

impl<M: ModeControl + ?Sized> ModeControl for &mut M {
    fn command(&mut self, target: Target) {
        (**self).command(target)
    }

    fn is_busy(&mut self) -> bool {
        (**self).is_busy()
    }

    fn mode(&mut self) -> Mode {
        (**self).mode()
    }
}
