pub mod draw;
pub mod draw_schedule;
pub mod prediction;

pub use draw::*;
pub use draw_schedule::*;
pub use prediction::*;
