pub mod io;
pub mod rendering;
pub mod trigger;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use io::*;
pub use rendering::{RenderMode, Segment, assemble, escape, render, render_segment, segment};
pub use trigger::*;
