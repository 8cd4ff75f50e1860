pub mod application;
pub mod job;
pub mod resume;

pub use application::*;
pub use job::*;
pub use resume::*;
