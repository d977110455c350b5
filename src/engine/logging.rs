// Wallet Engine — Logging
// env_logger behind the `log` facade. `RUST_LOG` wins over the filter passed in.

use crate::atoms::constants::DEFAULT_LOG_FILTER;

/// Install the process logger. Returns `false` if one was already installed.
pub fn init_logging(filter: Option<&str>) -> bool {
    let default = filter.unwrap_or(DEFAULT_LOG_FILTER);
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp_millis()
        .try_init()
        .is_ok()
}
