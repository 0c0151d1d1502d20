//! Logging setup: a single `env_logger` builder initialised once at
//! startup, honoring the `-v`/`-q` flags resolved to a `log::LevelFilter`
//! by [`crate::cli::Cli`].

use log::LevelFilter;

pub fn setup_logger(level: LevelFilter) {
  env_logger::Builder::new()
    .filter_level(level)
    .format_timestamp(None)
    .format_target(false)
    .init();
}
