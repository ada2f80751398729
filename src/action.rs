//! User actions the engine can execute.
//!
//! Actions are plain data: the layout gets the first chance to intercept
//! one, and the engine runs the default behaviour otherwise. They serialize
//! with an `action` tag so scenarios and external tools can send them as JSON
//! or TOML.

use serde::{Deserialize, Serialize};

use crate::layout::LayoutKind;
use crate::types::Direction;

/// Every action the engine understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    // Focus
    FocusNextWindow,
    FocusPreviousWindow,
    FocusDirection { direction: Direction },

    // Window order and placement
    MoveNextPosition,
    MovePreviousPosition,
    /// Swap with the neighbour in a direction, or move a floating window
    MoveDirection { direction: Direction },
    MoveToSurface { direction: Direction },
    ToggleFloat,
    PushToMaster,

    // Sizing
    IncreaseWindowWidth,
    DecreaseWindowWidth,
    IncreaseWindowHeight,
    DecreaseWindowHeight,
    IncreaseMasterAreaWindowCount,
    DecreaseMasterAreaWindowCount,
    IncreaseMasterAreaSize,
    DecreaseMasterAreaSize,

    // Layouts
    NextLayout,
    PreviousLayout,
    ToggleLayout { layout: LayoutKind },
    Rotate,
    RotateReverse,
    RotatePart,

    // Groups
    /// Bring a group to the active screen
    SwapGroupToSurface { group: i32 },
    /// Send the active window to a group
    MoveWindowToGroup { group: i32 },
}

impl Action {
    /// Stable identifier, as used for shortcut bindings
    pub fn key(&self) -> String {
        let key = match self {
            Action::FocusNextWindow => "focus_next_window",
            Action::FocusPreviousWindow => "focus_prev_window",
            Action::FocusDirection { direction } => match direction {
                Direction::Up => "focus_upper_window",
                Direction::Down => "focus_bottom_window",
                Direction::Left => "focus_left_window",
                Direction::Right => "focus_right_window",
            },
            Action::MoveNextPosition => "move_window_to_next_pos",
            Action::MovePreviousPosition => "move_window_to_prev_pos",
            Action::MoveDirection { direction } => match direction {
                Direction::Up => "move_window_to_upper_pos",
                Direction::Down => "move_window_to_bottom_pos",
                Direction::Left => "move_window_to_left_pos",
                Direction::Right => "move_window_to_right_pos",
            },
            Action::MoveToSurface { direction } => match direction {
                Direction::Up => "move_window_to_upper_surface",
                Direction::Down => "move_window_to_bottom_surface",
                Direction::Left => "move_window_to_left_surface",
                Direction::Right => "move_window_to_right_surface",
            },
            Action::ToggleFloat => "toggle_window_floating",
            Action::PushToMaster => "push_window_to_master",
            Action::IncreaseWindowWidth => "increase_window_width",
            Action::DecreaseWindowWidth => "decrease_window_width",
            Action::IncreaseWindowHeight => "increase_window_height",
            Action::DecreaseWindowHeight => "decrease_window_height",
            Action::IncreaseMasterAreaWindowCount => "increase_master_win_count",
            Action::DecreaseMasterAreaWindowCount => "decrease_master_win_count",
            Action::IncreaseMasterAreaSize => "increase_master_size",
            Action::DecreaseMasterAreaSize => "decrease_master_size",
            Action::NextLayout => "next_layout",
            Action::PreviousLayout => "prev_layout",
            Action::ToggleLayout { layout } => return format!("toggle_{}_layout", layout.key()),
            Action::Rotate => "rotate",
            Action::RotateReverse => "rotate_reverse",
            Action::RotatePart => "rotate_part",
            Action::SwapGroupToSurface { group } => return format!("swap_group_{}_surface", group),
            Action::MoveWindowToGroup { group } => return format!("change_window_group_{}", group),
        };
        key.to_string()
    }

    /// Text shown to humans
    pub fn description(&self) -> String {
        let text = match self {
            Action::FocusNextWindow => "Focus Next Window",
            Action::FocusPreviousWindow => "Focus Previous Window",
            Action::FocusDirection { direction } => match direction {
                Direction::Up => "Focus Upper Window",
                Direction::Down => "Focus Bottom Window",
                Direction::Left => "Focus Left Window",
                Direction::Right => "Focus Right Window",
            },
            Action::MoveNextPosition => "Move Window to the Next Position",
            Action::MovePreviousPosition => "Move Window to the Previous Position",
            Action::MoveDirection { direction } => match direction {
                Direction::Up => "Move Window Up",
                Direction::Down => "Move Window Down",
                Direction::Left => "Move Window Left",
                Direction::Right => "Move Window Right",
            },
            Action::MoveToSurface { direction } => match direction {
                Direction::Up => "Move Window to the Upper Screen",
                Direction::Down => "Move Window to the Lower Screen",
                Direction::Left => "Move Window to the Left Screen",
                Direction::Right => "Move Window to the Right Screen",
            },
            Action::ToggleFloat => "Toggle Active Window Floating",
            Action::PushToMaster => "Push Active Window to Master Area",
            Action::IncreaseWindowWidth => "Increase Window Width",
            Action::DecreaseWindowWidth => "Decrease Window Width",
            Action::IncreaseWindowHeight => "Increase Window Height",
            Action::DecreaseWindowHeight => "Decrease Window Height",
            Action::IncreaseMasterAreaWindowCount => "Increase Master Area Window Count",
            Action::DecreaseMasterAreaWindowCount => "Decrease Master Area Window Count",
            Action::IncreaseMasterAreaSize => "Increase Master Area Size",
            Action::DecreaseMasterAreaSize => "Decrease Master Area Size",
            Action::NextLayout => "Switch to the Next Layout",
            Action::PreviousLayout => "Switch to the Previous Layout",
            Action::ToggleLayout { layout } => return format!("Toggle {}", layout.name()),
            Action::Rotate => "Rotate",
            Action::RotateReverse => "Rotate (Reverse)",
            Action::RotatePart => "Rotate Part",
            Action::SwapGroupToSurface { group } => {
                return format!("Swap Group {} to Active Monitor", group)
            }
            Action::MoveWindowToGroup { group } => {
                return format!("Send Active Window to Group {}", group)
            }
        };
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_keys() {
        assert_eq!(Action::FocusNextWindow.key(), "focus_next_window");
        assert_eq!(
            Action::ToggleLayout {
                layout: LayoutKind::ThreeColumn
            }
            .key(),
            "toggle_three_column_layout"
        );
        assert_eq!(Action::SwapGroupToSurface { group: 3 }.key(), "swap_group_3_surface");
        assert_eq!(
            Action::MoveWindowToGroup { group: 2 }.description(),
            "Send Active Window to Group 2"
        );
    }

    #[test]
    fn test_action_serialization() {
        let json = serde_json::to_string(&Action::FocusDirection {
            direction: Direction::Left,
        })
        .unwrap();
        assert_eq!(json, r#"{"action":"focus_direction","direction":"left"}"#);

        let parsed: Action = serde_json::from_str(r#"{"action":"rotate_part"}"#).unwrap();
        assert_eq!(parsed, Action::RotatePart);

        let parsed: Action = toml::from_str("action = \"toggle_layout\"\nlayout = \"monocle\"").unwrap();
        assert_eq!(
            parsed,
            Action::ToggleLayout {
                layout: LayoutKind::Monocle
            }
        );
    }
}
