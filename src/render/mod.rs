mod cell;
mod strategy;
mod view;
mod window;

pub use cell::*;
pub use strategy::*;
pub use view::*;
pub use window::*;
