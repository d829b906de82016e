//! Handler detection patterns and the scanner driving them

pub mod javascript;
pub mod pattern;
pub mod python;
pub mod scanner;

pub use javascript::JavaScriptHandlerPattern;
pub use pattern::HandlerPattern;
pub use python::PythonHandlerPattern;
pub use scanner::{HandlerIter, HandlerScan, HandlerScanner};
