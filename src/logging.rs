use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Crate log level for a `-v` count
fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "portfolio=warn",
        1 => "portfolio=info",
        _ => "portfolio=debug",
    }
}

/// Install the stderr subscriber once; `RUST_LOG` overrides the `-v` level
pub fn init_tracing(verbosity: u8) {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

        let _ = fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_the_level() {
        assert_eq!(default_directive(0), "portfolio=warn");
        assert_eq!(default_directive(1), "portfolio=info");
        assert_eq!(default_directive(5), "portfolio=debug");
    }

    #[test]
    fn init_is_idempotent() {
        init_tracing(0);
        init_tracing(2);
    }
}
