use crate::error::InputError;
use std::fmt;
use tracing::info;

/// A key the camera sequence can press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    /// Function key `F1`..`F12`.
    F(u8),
    Control,
    Shift,
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(c) => write!(f, "{c}"),
            Self::F(n) => write!(f, "f{n}"),
            Self::Control => f.write_str("control"),
            Self::Shift => f.write_str("shift"),
        }
    }
}

/// One simulated keyboard or mouse action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    MoveMouse { x: i32, y: i32 },
    LeftClick,
    /// Scroll the wheel towards the user.
    ScrollDown { notches: u32 },
    KeyTap(Key),
    /// Hold every key in order, then release them in reverse.
    KeyCombo(Vec<Key>),
}

impl fmt::Display for InputAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MoveMouse { x, y } => write!(f, "move({x},{y})"),
            Self::LeftClick => f.write_str("click"),
            Self::ScrollDown { notches } => write!(f, "scroll_down({notches})"),
            Self::KeyTap(key) => write!(f, "{key}"),
            Self::KeyCombo(keys) => {
                let names: Vec<String> = keys.iter().map(Key::to_string).collect();
                f.write_str(&names.join("+"))
            }
        }
    }
}

/// Backend that turns [`InputAction`]s into real input events.
pub trait InputDriver: Send + Sync {
    fn perform(&self, action: &InputAction) -> Result<(), InputError>;
}

/// Logs every action instead of sending it. Used where no real backend exists.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingInputDriver;

impl InputDriver for TracingInputDriver {
    fn perform(&self, action: &InputAction) -> Result<(), InputError> {
        info!(action = %action, "Simulated input (dry run)");
        Ok(())
    }
}
