use std::sync::Mutex;

use slog::Drain;
use slog::Fuse;
use slog_async::Async;
use slog_json::Json;

pub use slog::{debug, error, info, o, trace, warn, Logger};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const REVISION: Option<&str> = option_env!("BACKEND_REVISION");

/// Creates the root logger: JSON records on stderr, drained
/// asynchronously, annotated with build metadata.
pub fn initialize_logger() -> Logger {
    let drain = Mutex::new(Json::default(std::io::stderr())).map(Fuse);
    let drain = Async::new(drain).build().fuse();

    Logger::root(
        drain,
        o!("version" => VERSION, "revision" => REVISION),
    )
}

/// Creates a logger that swallows all records, for tests.
pub fn discard_logger() -> Logger {
    Logger::root(slog::Discard, o!())
}
