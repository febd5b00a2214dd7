//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! | Code | Description                                   |
//! |------|-----------------------------------------------|
//! | 0    | Success                                       |
//! | 1    | General error (unspecified)                   |
//! | 2    | CLI usage error (bad args, conflicting paths) |
//! | 3    | Invalid or unparseable config                 |
//! | 4    | Schema error (required column unresolvable)   |
//! | 5    | I/O error (read/write/decode failure)         |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, conflicting paths.
pub const EXIT_USAGE: u8 = 2;

/// Config rejected - TOML parse or validation failure.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Schema error - a required column resolved under no alias.
pub const EXIT_SCHEMA: u8 = 4;

/// I/O error - cannot read export/baseline or write the report.
pub const EXIT_IO: u8 = 5;
