use std::str::FromStr;

use joyrun_common::CharacterVariant;

/// A high-level action the runtime applies to the session.
///
/// Raw keyboard and pointer input is mapped to actions first; the session
/// never sees device events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Choose the character. Refused by the session while a run is in progress.
    SelectCharacter(CharacterVariant),
    /// Leave the ready screen and begin a run.
    StartGame,
    /// Retry after game over.
    Restart,
    Jump,
    SetDucking(bool),
}

/// Keys the runner distinguishes. Everything else is `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Space,
    ArrowUp,
    ArrowDown,
    Enter,
    Other,
}

impl FromStr for Key {
    type Err = std::convert::Infallible;

    /// Parse a DOM-style key code such as `"Space"` or `"ArrowUp"`.
    fn from_str(code: &str) -> Result<Self, Self::Err> {
        Ok(match code {
            "Space" => Self::Space,
            "ArrowUp" => Self::ArrowUp,
            "ArrowDown" => Self::ArrowDown,
            "Enter" | "NumpadEnter" => Self::Enter,
            _ => Self::Other,
        })
    }
}

/// A raw device event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    KeyPress(Key),
    /// Click or tap on the play area.
    PointerPress,
}

impl Trigger {
    /// The action this trigger maps to, if any.
    pub fn action(self) -> Option<Action> {
        match self {
            Self::KeyPress(Key::Space | Key::ArrowUp) | Self::PointerPress => Some(Action::Jump),
            Self::KeyPress(_) => None,
        }
    }
}
