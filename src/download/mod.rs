//! Streaming transfer engine for video files.
//!
//! Transfers resume from whatever is already on disk: an existing partial
//! file turns into an HTTP byte-range request, a 416 reply means the file
//! was already finished in an earlier run, and progress is always accounted
//! from the persisted file size so a crash mid-chunk never lies about what
//! the next run can resume from.

pub mod constants;
mod error;
mod filename;
mod progress;
mod transfer;

pub use error::TransferError;
pub use filename::sanitize_title;
pub use progress::{TransferProgress, estimate_remaining};
pub use transfer::{TransferOutcome, transfer_video};
