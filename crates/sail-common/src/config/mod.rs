mod application;
mod properties;

pub use application::*;
pub use properties::*;
