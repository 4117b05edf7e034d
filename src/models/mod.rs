pub mod duration;
pub mod project;

pub use duration::{format_clock, parse_field, Duration};
pub use project::{Project, Run};
