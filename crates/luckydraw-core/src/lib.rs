// Library root: the draw registry and its error type, with no knowledge of
// the HTTP surface that fronts them.

pub mod error;
pub mod registry;

pub use error::{DrawError, ErrorKind};
pub use registry::{pick, Draw, Registry};
