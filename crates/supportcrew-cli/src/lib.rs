// Library interface for supportcrew-cli so integration tests can reach
// argument handling and the crew wiring without spawning the binary.

pub mod app;
pub mod args;

pub use app::{load_settings, run, run_support_crew};
pub use args::{parse_assignment, Cli};
