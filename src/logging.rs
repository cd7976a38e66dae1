use log::LevelFilter;

/// How much status output a run produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// No status output at all.
    Quiet,
    #[default]
    Normal,
}

impl Verbosity {
    pub fn from_quiet_flag(quiet: bool) -> Self {
        if quiet { Verbosity::Quiet } else { Verbosity::Normal }
    }

    pub fn shows_progress(self) -> bool {
        self == Verbosity::Normal
    }

    pub fn level_filter(self) -> LevelFilter {
        match self {
            Verbosity::Quiet => LevelFilter::Off,
            Verbosity::Normal => LevelFilter::Info,
        }
    }
}

/// Installs `env_logger`. `RUST_LOG` can refine the output unless quiet.
pub fn init_logger(verbosity: Verbosity) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(verbosity.level_filter());
    if verbosity.shows_progress() {
        builder.parse_default_env();
    }
    builder.init();
}
