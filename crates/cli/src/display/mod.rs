pub mod command_breakdown;
pub mod console;
pub mod formatter;

pub use command_breakdown::print_command_breakdown;
pub use console::{ConsoleNotifier, ConsoleOutputSink};
pub use formatter::{format_affordances, print_detection};
