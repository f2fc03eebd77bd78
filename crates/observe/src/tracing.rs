use {
    crate::config::Config,
    std::io::IsTerminal as _,
    time::macros::format_description,
    tracing::Level,
    tracing_subscriber::{
        EnvFilter,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Initializes the logging setup of the binary.
/// `env_filter` has similar syntax to env_logger. It is documented at
/// https://docs.rs/tracing-subscriber/latest/tracing_subscriber/filter/struct.EnvFilter.html
pub fn initialize(config: &Config) {
    if let Err(err) = set_tracing_subscriber(config) {
        eprintln!("failed to initialize logging: {err}");
        return;
    }
    crate::panic_hook::install();
    tracing::debug!(filter = %config.env_filter, "initialized logging");
}

fn set_tracing_subscriber(
    config: &Config,
) -> Result<(), tracing_subscriber::util::TryInitError> {
    let stderr_threshold = config.stderr_threshold.unwrap_or(Level::ERROR);
    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(
            std::io::stdout
                .with_min_level(stderr_threshold)
                .or_else(std::io::stderr),
        )
        .with_timer(UtcTime::new(format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
        )))
        .with_ansi(std::io::stdout().is_terminal());

    let (json_layer, plain_layer) = if config.use_json_format {
        (Some(fmt_layer.json()), None)
    } else {
        (None, Some(fmt_layer))
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(&config.env_filter))
        .with(tracing_subscriber::Layer::and_then(json_layer, plain_layer))
        .try_init()
}
