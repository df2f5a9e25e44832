// Library surface shared by the binary and the integration tests.
// The terminal setup and CLI parsing stay in main.rs.
pub mod buffer;
pub mod config;
pub mod finger;
pub mod runtime;
pub mod session;
pub mod stats;
pub mod ui;
pub mod words;

pub use finger::FingerMap;
pub use session::SessionController;
