pub mod cancellation;
pub mod error;
pub mod position;
pub mod text;
pub mod trace;

pub use cancellation::{CancellationToken, NeverCancelled};
pub use error::{CommonError, InvariantKind};
pub use position::{grapheme_column, to_grapheme_position, GraphemePosition, Position};
pub use trace::{NoopTraceManager, TraceEvent, TraceManager};
