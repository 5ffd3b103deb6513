use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// How chatty stderr logging should be when `RUST_LOG` is not set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    Quiet,
    Normal,
    Verbose,
    /// Nothing unless `RUST_LOG` asks for it (used while the previewer owns the screen)
    Silent,
}

impl Verbosity {
    pub fn from_flags(verbose: bool, quiet: bool) -> Self {
        match (verbose, quiet) {
            (true, _) => Verbosity::Verbose,
            (false, true) => Verbosity::Quiet,
            (false, false) => Verbosity::Normal,
        }
    }

    fn default_directive(self) -> &'static str {
        match self {
            Verbosity::Quiet => "chatlog_md=warn",
            Verbosity::Normal => "chatlog_md=info",
            Verbosity::Verbose => "chatlog_md=debug",
            Verbosity::Silent => "off",
        }
    }
}

/// Install the stderr subscriber; `RUST_LOG` wins over `verbosity`
pub fn init(verbosity: Verbosity) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.default_directive()));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false))
        .with(filter)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_to_verbosity() {
        assert_eq!(Verbosity::from_flags(false, false), Verbosity::Normal);
        assert_eq!(Verbosity::from_flags(true, false), Verbosity::Verbose);
        assert_eq!(Verbosity::from_flags(false, true), Verbosity::Quiet);
        assert_eq!(Verbosity::from_flags(true, true), Verbosity::Verbose);
    }

    #[test]
    fn test_directives() {
        assert_eq!(Verbosity::Normal.default_directive(), "chatlog_md=info");
        assert_eq!(Verbosity::Silent.default_directive(), "off");
    }
}
