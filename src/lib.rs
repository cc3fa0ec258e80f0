#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod history;
pub mod import;
pub mod layout;
pub mod persist;
pub mod progress;
pub mod store;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::EngineConfig;
pub use error::EngineError;
pub use graph::{GraphState, Level, Point, TaskEdge, TaskNode, demo_graph, descendants};
pub use layout::{calculate_layout, slot_at_position};
pub use progress::progress;
pub use store::{AddNodeOutcome, GraphStore};
