//! On-screen movement buttons for touch devices. Each button behaves like a
//! physical key, so the player reads it through the same control map.

use lakbay_core::input::{InputState, Key};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VirtualButton {
    Left,
    Right,
    Run,
}

impl VirtualButton {
    pub fn key(self) -> Key {
        match self {
            Self::Left => Key::Left,
            Self::Right => Key::Right,
            Self::Run => Key::ShiftLeft,
        }
    }
}

#[derive(Debug, Default)]
pub struct VirtualButtons {
    pressed: Vec<VirtualButton>,
}

impl VirtualButtons {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_pressed(&self, button: VirtualButton) -> bool {
        self.pressed.contains(&button)
    }

    pub fn press(&mut self, button: VirtualButton, input: &mut InputState) {
        if !self.is_pressed(button) {
            self.pressed.push(button);
        }
        input.key_down(button.key());
    }

    /// Also used when the pointer leaves the button or the touch ends.
    pub fn release(&mut self, button: VirtualButton, input: &mut InputState) {
        if let Some(index) = self.pressed.iter().position(|b| *b == button) {
            self.pressed.remove(index);
            input.key_up(button.key());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakbay_core::input::{Control, ControlMap, Controls, XDirection};

    #[test]
    fn buttons_drive_controls_like_keys() {
        let map = ControlMap::default();
        let mut input = InputState::new();
        let mut buttons = VirtualButtons::new();

        buttons.press(VirtualButton::Right, &mut input);
        buttons.press(VirtualButton::Run, &mut input);
        let controls = Controls::new(&input, &map);
        assert_eq!(controls.held_x_direction(), Some(XDirection::Right));
        assert!(controls.is_held(Control::Sprint));
        assert!(controls.was_pressed(Control::Sprint));

        buttons.release(VirtualButton::Run, &mut input);
        let controls = Controls::new(&input, &map);
        assert!(!controls.is_held(Control::Sprint));
        assert!(controls.was_released(Control::Sprint));
    }

    #[test]
    fn releasing_an_unpressed_button_is_ignored() {
        let mut input = InputState::new();
        input.key_down(Key::Left);
        input.end_frame();
        let mut buttons = VirtualButtons::new();
        buttons.release(VirtualButton::Left, &mut input);
        assert!(input.is_held(Key::Left), "keyboard hold is untouched");
        assert!(!input.is_just_released(Key::Left));
    }

    #[test]
    fn button_names_deserialize_lowercase() {
        let buttons: Vec<VirtualButton> =
            serde_json::from_str(r#"["left", "right", "run"]"#).expect("valid names");
        assert_eq!(
            buttons,
            vec![VirtualButton::Left, VirtualButton::Right, VirtualButton::Run]
        );
        assert!(serde_json::from_str::<VirtualButton>(r#""jump""#).is_err());
    }
}
