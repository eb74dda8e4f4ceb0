//! CLI Exit Code Registry
//!
//! Single source of truth for `rlink` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad flag value, unknown encoding)     |
//! | 3    | Match configuration invalid                        |
//! | 4    | Input file unreadable or malformed                 |
//! | 5    | Input exceeds the supported size                   |
//! | 6    | Report or checkpoint could not be written          |
//! | 7    | Checkpoint does not belong to this run             |

use rosterlink_io::IoError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown encoding label.
pub const EXIT_USAGE: u8 = 2;

/// Config file unparseable or thresholds out of range.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Registry or external roster missing, undecodable, or the wrong shape.
pub const EXIT_INPUT: u8 = 4;

/// Input beyond 1,048,576 rows or 16,384 columns without `--ignore-warnings`.
pub const EXIT_OVERSIZE: u8 = 5;

/// Report or checkpoint write failed.
pub const EXIT_OUTPUT: u8 = 6;

/// `--resume` against a checkpoint from different inputs or config.
pub const EXIT_CHECKPOINT_MISMATCH: u8 = 7;

/// Map an I/O error to its exit code.
pub fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::Read { .. }
        | IoError::Csv { .. }
        | IoError::Header { .. }
        | IoError::ShortRow { .. } => EXIT_INPUT,
        IoError::UnknownEncoding(_) => EXIT_USAGE,
        IoError::Oversize { .. } => EXIT_OVERSIZE,
        IoError::Write { .. } | IoError::Xlsx(_) => EXIT_OUTPUT,
        IoError::Checkpoint(_) => EXIT_CHECKPOINT_MISMATCH,
    }
}
