pub mod affordance;
pub mod handler;
pub mod language;
pub mod position;
pub mod range;
pub mod workspace;

// Re-export commonly used types
pub use affordance::{Affordance, AffordanceAction, CONFIGURE_COMMAND};
pub use handler::HandlerCandidate;
pub use language::{DebugPolicy, Language};
pub use position::Position;
pub use range::{HandlerRange, SourceRange};
pub use workspace::WorkspaceFolder;
