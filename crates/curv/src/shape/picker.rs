//! Picker metadata: the data shown in an editor GUI for a `parametric`
//! block's tunable parameters.
//!
//! A picker has a `Config` (the static description: a slider's min/max, a
//! colour picker's channel count) and a `State` (the live value a user has
//! dragged the control to). This module only models the data; wiring it
//! into `parametric` evaluation so a picker's state can drive a
//! [`crate::reactive::ReactiveExpression`] is not yet implemented (see
//! `DESIGN.md`).

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickerConfig {
    Slider { low: f64, high: f64 },
    IntSlider { low: i64, high: i64 },
    ScalePicker { low: f64, high: f64 },
    Checkbox,
    ColourPicker,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PickerState {
    Num(f64),
    Int(i64),
    Bool(bool),
    Colour([f64; 3]),
}

impl PickerConfig {
    /// The state a fresh picker starts in, before any user interaction.
    #[must_use]
    pub fn default_state(self) -> PickerState {
        match self {
            PickerConfig::Slider { low, high } | PickerConfig::ScalePicker { low, high } => {
                PickerState::Num((low + high) / 2.0)
            }
            PickerConfig::IntSlider { low, high } => PickerState::Int((low + high) / 2),
            PickerConfig::Checkbox => PickerState::Bool(false),
            PickerConfig::ColourPicker => PickerState::Colour([0.5, 0.5, 0.5]),
        }
    }
}
