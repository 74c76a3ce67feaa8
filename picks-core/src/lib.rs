pub mod classify;
pub mod deadline;
pub mod kickoff;
pub mod validity;

// Re-export main components
pub use classify::*;
pub use deadline::*;
pub use kickoff::*;
pub use validity::*;
