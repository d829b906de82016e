pub mod file;
pub mod parser;

pub use file::{absolute_path, collect_source_files};
pub use parser::parse_filepath_with_line;
