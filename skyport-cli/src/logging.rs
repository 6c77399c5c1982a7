//! Tracing subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;

/// Initialize colored log output on stderr.
///
/// `RUST_LOG` wins when set; otherwise verbosity flags pick the level:
/// `-q` errors only, default info, `-v` debug, `-vv` trace.
pub fn init(verbose: u8, quiet: bool) {
    let level = if quiet {
        "error"
    } else {
        match verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("skyport={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
