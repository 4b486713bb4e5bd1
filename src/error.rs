// Error taxonomy: every failure the pipeline can hit is one of the variants
// below. `main` prints the message and exits with `Error::exit_code`, so the
// mapping from failure class to process status lives in exactly one place.

use thiserror::Error;

use crate::api::ApiError;
use crate::files::{InputError, OutputError};
use crate::response::ResponseError;

/// Process exit status for a successful run.
pub const EXIT_OK: i32 = 0;
/// Generic, validation and usage failures.
pub const EXIT_FAILURE: i32 = 1;
/// The input file does not exist.
pub const EXIT_NOT_FOUND: i32 = 2;
/// The request to the obfuscation service failed.
pub const EXIT_NETWORK: i32 = 3;
/// The user pressed Ctrl-C.
pub const EXIT_INTERRUPTED: i32 = 130;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("API request failed: {0}")]
    Api(#[from] ApiError),
    #[error(transparent)]
    Response(#[from] ResponseError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("Operation cancelled by user :(")]
    Interrupted,
}

impl Error {
    /// Exit status the process should terminate with for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::Input(InputError::NotFound(_)) => EXIT_NOT_FOUND,
            Error::Api(_) => EXIT_NETWORK,
            Error::Interrupted => EXIT_INTERRUPTED,
            Error::Input(_) | Error::Response(_) | Error::Output(_) => EXIT_FAILURE,
        }
    }
}
