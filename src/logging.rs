// Log output for the library and the window binary.
// Visual: info lines on stderr; with --debug also frame rate and scan results.

use tracing_subscriber::EnvFilter;

/// Initialise logging. With `debug` the default level is `debug` and `RUST_LOG`
/// may override it; otherwise the level is pinned to `info`.
pub fn init(debug: bool) {
    let filter = if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    };

    // a second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_thread_names(true).try_init();
}
