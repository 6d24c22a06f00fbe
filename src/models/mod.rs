pub mod message;
pub mod visit;

pub use message::Message;
pub use visit::{format_timestamp, RecordedVisit, Visit};
