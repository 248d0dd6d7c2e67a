// commands/mod.rs
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// A button or mode change the IrUsb relay understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TurnOn,
    TurnOff,
    Up,
    Down,
    Left,
    Right,
    Enter,
    Previous,
    PlayPause,
    Skip,
    Back,
    Home,
}

impl Action {
    pub const ALL: [Action; 12] = [
        Action::TurnOn,
        Action::TurnOff,
        Action::Up,
        Action::Down,
        Action::Left,
        Action::Right,
        Action::Enter,
        Action::Previous,
        Action::PlayPause,
        Action::Skip,
        Action::Back,
        Action::Home,
    ];

    /// Literal string written to the device, without the trailing `\r`.
    ///
    /// `Back` and `Previous` share a code. The relay firmware has always been
    /// driven that way, so both keep `QHIDCODE1000241`.
    pub const fn wire_command(self) -> &'static str {
        match self {
            Action::TurnOn => "QWAKE",
            Action::TurnOff => "OFF",
            Action::Up => "QHIDCODE1000082",
            Action::Down => "QHIDCODE1000081",
            Action::Left => "QHIDCODE1000080",
            Action::Right => "QHIDCODE1000079",
            Action::Enter => "QHIDCODE1000040",
            Action::Previous => "QHIDCODE1000241",
            Action::PlayPause => "QHIDCODE2000205",
            Action::Skip => "QHIDCODE1000242",
            Action::Back => "QHIDCODE1000241",
            Action::Home => "QHIDCODE2002035",
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Action::TurnOn => "turn_on",
            Action::TurnOff => "turn_off",
            Action::Up => "up",
            Action::Down => "down",
            Action::Left => "left",
            Action::Right => "right",
            Action::Enter => "enter",
            Action::Previous => "previous",
            Action::PlayPause => "play_pause",
            Action::Skip => "skip",
            Action::Back => "back",
            Action::Home => "home",
        }
    }

    /// Power flag this action writes before sending, if any.
    pub const fn power_effect(self) -> Option<bool> {
        match self {
            Action::TurnOn => Some(true),
            Action::TurnOff => Some(false),
            _ => None,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Action {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Action::ALL
            .into_iter()
            .find(|action| action.name() == s)
            .ok_or_else(|| AppError::UnknownAction(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn back_and_previous_share_a_code() {
        assert_eq!(Action::Back.wire_command(), "QHIDCODE1000241");
        assert_eq!(Action::Back.wire_command(), Action::Previous.wire_command());
    }

    #[test]
    fn wire_commands_are_ascii() {
        for action in Action::ALL {
            assert!(action.wire_command().is_ascii(), "{action}");
            assert!(!action.wire_command().contains('\r'), "{action}");
        }
    }

    #[test]
    fn names_parse_back() {
        for action in Action::ALL {
            assert_eq!(action.name().parse::<Action>().unwrap(), action);
        }
        assert!(matches!(
            "volume_up".parse::<Action>(),
            Err(AppError::UnknownAction(name)) if name == "volume_up"
        ));
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&Action::PlayPause).unwrap();
        assert_eq!(json, "\"play_pause\"");
        let action: Action = serde_json::from_str("\"turn_off\"").unwrap();
        assert_eq!(action, Action::TurnOff);
    }

    #[test]
    fn only_power_actions_touch_power() {
        assert_eq!(Action::TurnOn.power_effect(), Some(true));
        assert_eq!(Action::TurnOff.power_effect(), Some(false));
        for action in &Action::ALL[2..] {
            assert_eq!(action.power_effect(), None);
        }
    }
}
