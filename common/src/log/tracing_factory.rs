use std::path::PathBuf;
use std::sync::Once;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, FmtSubscriber};

static INIT: Once = Once::new();

/// Where log output goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputType {
    /// stdout
    Console,
    /// daily rolling file under the configured directory
    Log,
}

#[derive(Debug, Clone)]
pub struct TracingFactoryOptions {
    debug: bool,
    output_type: OutputType,
    log_dir: Option<PathBuf>,
}

impl TracingFactoryOptions {
    pub fn new(debug: bool, output_type: OutputType, log_dir: Option<String>) -> Self {
        TracingFactoryOptions {
            debug,
            output_type,
            log_dir: log_dir.map(PathBuf::from),
        }
    }

    pub fn console(debug: bool) -> Self {
        TracingFactoryOptions::new(debug, OutputType::Console, None)
    }

    fn level(&self) -> Level {
        if self.debug {
            Level::DEBUG
        } else {
            Level::INFO
        }
    }
}

/// Global tracing subscriber bootstrap. Only the first call installs a subscriber.
#[derive(Debug, Default)]
pub struct TracingFactory {
    log_dir: Option<PathBuf>,

    /// keeps the non-blocking file writer flushing until drop
    _guard: Option<WorkerGuard>,
}

impl TracingFactory {
    pub fn init_log(debug: bool) -> TracingFactory {
        TracingFactory::init_log_with_options(TracingFactoryOptions::console(debug))
    }

    pub fn init_log_with_options(options: TracingFactoryOptions) -> TracingFactory {
        let mut factory = TracingFactory::default();

        INIT.call_once(|| {
            let format = fmt::format()
                .with_thread_ids(true)
                .with_target(true)
                .compact();

            let log_dir = match options.output_type {
                OutputType::Log => options.log_dir.clone(),
                OutputType::Console => None,
            };

            let installed = match log_dir {
                Some(dir) => {
                    let appender = tracing_appender::rolling::daily(&dir, "binlog.log");
                    let (writer, guard) = tracing_appender::non_blocking(appender);
                    let subscriber = FmtSubscriber::builder()
                        .with_max_level(options.level())
                        .with_ansi(false)
                        .with_writer(writer)
                        .event_format(format)
                        .finish();

                    factory.log_dir = Some(dir);
                    factory._guard = Some(guard);
                    tracing::subscriber::set_global_default(subscriber)
                }
                None => {
                    let subscriber = FmtSubscriber::builder()
                        .with_max_level(options.level())
                        .event_format(format)
                        .finish();
                    tracing::subscriber::set_global_default(subscriber)
                }
            };

            if installed.is_err() {
                eprintln!("Unable to set global default subscriber");
            }
        });

        factory
    }

    pub fn get_log_dir(&self) -> Option<&PathBuf> {
        self.log_dir.as_ref()
    }
}
