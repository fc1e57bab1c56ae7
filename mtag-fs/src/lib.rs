//! Host-capability probing and the byte-source loader, plus the directory
//! walker the batch scanner builds on. Grounded on `anni_common::fs`
//! (`PathWalker`, `walk_path`).

mod input;
mod loader;
mod probe;
mod walker;

pub use input::{Input, StreamSource};
pub use loader::{load, LoadOptions, LoadedBytes, OriginalSource};
pub use probe::RuntimeCapabilities;
pub use walker::{has_extension, normalize_extension, PathWalker};
