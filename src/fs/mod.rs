//! Document root access.
//!
//! - **`resolver`**: maps a request target to a path under the root, rejecting traversal
//! - **`static_files`**: applies the method and extension rules and reads files

pub mod resolver;
pub mod static_files;

pub use resolver::{ResolveError, ResolvedPath, resolve};
pub use static_files::StaticFiles;
