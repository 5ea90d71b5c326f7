//! Configuration and constants for the CLI.

/// Default sampling frequency in samples per second
pub const DEFAULT_FREQUENCY: u32 = 10;

/// Default sampling duration in seconds
pub const DEFAULT_DURATION_SECS: u64 = 180;

/// Subtrees below this percentage of the thread total are not expanded
pub const DEFAULT_THRESHOLD: f64 = 0.1;

/// Debugger executable used when `--gdb` is not given
pub const DEFAULT_GDB: &str = "gdb";

/// Environment variable that overrides the debugger executable
pub const GDB_ENV_VAR: &str = "GDBPROF_GDB";

/// Frame name used when the debugger cannot resolve a symbol
pub const UNKNOWN_FRAME: &str = "???";

/// Display name used in thread headers when the debugger reports none
pub const UNKNOWN_THREAD_NAME: &str = "unknown";

// Upper bound on frequency; gdb cannot stop and unwind faster than this anyway
pub const MAX_FREQUENCY: u32 = 1_000;
