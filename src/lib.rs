//! Drive COLMAP over a directory of photos: extract and match features, run the mapper, undistort
//! the images and lay the result out as `<source>/images` plus `<source>/sparse/0`.
//!
//! Example usage:
//! ```no_run
//! use colmap_convert::*;
//!
//! let config = PipelineConfig::new("scenes/garden");
//! if let Err(e) = Pipeline::new(config).run() {
//!     std::process::exit(e.exit_code());
//! }
//! ```

extern crate indicatif;
extern crate itertools;
extern crate log;
extern crate thiserror;

pub mod command;
pub mod layout;
pub mod pipeline;
pub mod resize;

pub use command::ExternalCommand;
pub use layout::SourceLayout;
pub use pipeline::{Pipeline, PipelineConfig};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An external tool ran and exited with a non-zero status.
    #[error("{description} with code {code}")]
    CommandFailed { description: String, code: i32 },
    /// An external tool could not be started at all.
    #[error("{description}: could not launch `{command}`: {source}")]
    Launch {
        description: String,
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

impl Error {
    /// Process exit code to terminate with. Failed tools pass their own code through, tools that
    /// could not be launched follow shell conventions.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::CommandFailed { code, .. } => *code,
            Error::Launch { source, .. } => match source.kind() {
                std::io::ErrorKind::NotFound => 127,
                _ => 126,
            },
            Error::IOError(_) => 1,
        }
    }
}
