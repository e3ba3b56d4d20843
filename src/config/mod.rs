//! Runtime settings read from the environment, plus role names and
//! business constants shared across layers.

mod constants;
mod settings;

pub use constants::*;
pub use settings::Config;
