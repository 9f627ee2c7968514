//! Data model shared by the dispatcher and the processing layer.

pub mod batch;
pub mod invocation;
pub mod media;

pub use batch::BatchResult;
pub use invocation::InvocationResult;
pub use media::MediaKind;
