// Error handling module root
pub mod types;

// Re-export commonly used items
pub use types::*;
