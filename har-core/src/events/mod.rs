pub mod dispatcher;
pub mod handler;
pub mod types;

pub use dispatcher::EventDispatcher;
pub use handler::{AnalysisEventHandler, NullEventHandler};
pub use types::{EntryErrorEvent, ProgressEvent, Stage, WarningEvent};
