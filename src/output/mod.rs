//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Logging setup
//! - Progress bars
//! - Run summaries

pub mod console;
pub mod logging;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_error, print_info, print_success, print_warning,
};
pub use logging::init_logging;
pub use progress::{create_item_bar, create_spinner, progress_line, PageProgress};
pub use stats::{print_run_summary, print_user_overview, summary_lines};
