//! CLI Exit Code Registry
//!
//! Single source of truth for the `propostas` exit codes. Scripts rely on
//! them, so existing values never change meaning.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | General error                                        |
//! | 2    | Usage error: bad args, no source, no period          |
//! | 3    | A source or config file could not be read or decoded |
//! | 4    | Spreadsheet decoding not available in this build     |
//! | 5    | Batch store failure                                  |
//! | 6    | Import declined at a preview step                    |

use propostas_cli::ImportError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, no source selected, missing period.
pub const EXIT_USAGE: u8 = 2;

/// Read error - unreadable file, unknown encoding, undecodable content,
/// invalid settings or schema.
pub const EXIT_IO: u8 = 3;

/// Insurance export selected but spreadsheet decoding is compiled out.
pub const EXIT_SPREADSHEET_UNAVAILABLE: u8 = 4;

/// Batch store could not be opened, read or written.
pub const EXIT_STORE: u8 = 5;

/// A preview step was refused; nothing was persisted.
pub const EXIT_CANCELLED: u8 = 6;

/// Map an import failure to its exit code.
pub fn import_exit_code(err: &ImportError) -> u8 {
    match err {
        ImportError::NoSourceSelected
        | ImportError::MissingPeriod
        | ImportError::InvalidPeriod(_) => EXIT_USAGE,
        ImportError::Read(_) | ImportError::Schema(_) => EXIT_IO,
        ImportError::SpreadsheetUnavailable => EXIT_SPREADSHEET_UNAVAILABLE,
        ImportError::Store(_) => EXIT_STORE,
        ImportError::NotConfirmed(_) => EXIT_ERROR,
    }
}
