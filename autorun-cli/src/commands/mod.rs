//! One module per menu action.

pub mod add_command;
pub mod add_program;
pub mod remove;
pub mod status;
pub mod toggle;
