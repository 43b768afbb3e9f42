//! Abstractions for managing logging.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("logger configuration is invalid")]
    Cfg(#[from] log4rs::config::runtime::ConfigErrors),
    #[error("logger is already initialized")]
    Set(#[from] log::SetLoggerError),
}

fn make_logger_config(
    level: log::LevelFilter,
) -> Result<log4rs::Config, log4rs::config::runtime::ConfigErrors> {
    let stderr: log4rs::append::console::ConsoleAppender =
        log4rs::append::console::ConsoleAppender::builder()
            .target(log4rs::append::console::Target::Stderr)
            .encoder(Box::new(log4rs::encode::pattern::PatternEncoder::new(
                "[{d(%Y-%m-%dT%H:%M:%S)}] {h([{l}])} - {m}{n}",
            )))
            .build();

    let logger_config: log4rs::Config = log4rs::Config::builder()
        .appender(log4rs::config::Appender::builder().build("stderr", Box::new(stderr)))
        // The AWS SDK is chatty below warn.
        .logger(log4rs::config::Logger::builder().build("aws_config", log::LevelFilter::Warn))
        .logger(log4rs::config::Logger::builder().build("aws_smithy_runtime", log::LevelFilter::Warn))
        .build(
            log4rs::config::Root::builder()
                .appender("stderr")
                .build(level),
        )?;

    return Ok(logger_config);
}

/// Initialize a global logging utility writing to standard error, leaving
/// standard output to command results.
pub fn init_logger(level: log::LevelFilter) -> Result<log4rs::Handle, Error> {
    let config: log4rs::Config = make_logger_config(level)?;
    let handle: log4rs::Handle = log4rs::init_config(config)?;
    return Ok(handle);
}
