//! Configuration sections.

mod serve;
mod watch;

pub use serve::ServeConfig;
pub use watch::WatchConfig;
