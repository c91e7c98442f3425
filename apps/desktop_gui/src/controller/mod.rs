//! Controller layer: UI events, form validation, and command orchestration.

pub mod events;
pub mod forms;
pub mod orchestration;
