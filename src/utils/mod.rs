pub mod environment;
pub mod logging;
pub mod paths;
pub mod terminal;

pub use environment::default_sessions_dir;
pub use logging::Verbosity;
pub use paths::{expand_tilde, format_path_with_tilde, validate_file_size};
pub use terminal::sanitize_for_terminal;
