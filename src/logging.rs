use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::non_blocking::{self, WorkerGuard};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};

const DEFAULT_LOG_FILTER: &str = "warn";
const DEBUG_LOG_FILTER: &str = "warn,gemini_ask=debug";
const DEFAULT_LOG_FORMAT: &str = "pretty";
const DEFAULT_LOG_OUTPUT: &str = "stderr";
const DEFAULT_LOG_FILE_PATH: &str = "logs/gemini-ask.log";

type InitResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;

/// Flushes buffered file output when dropped.
pub type LogGuard = Option<WorkerGuard>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogOutput {
    Stderr,
    File,
    Both,
}

/// Everything `init` needs, resolved up front by the caller.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogSettings {
    pub debug: bool,
    pub filter: Option<String>,
    pub format: LogFormat,
    pub output: LogOutput,
    pub file_path: PathBuf,
}

impl LogSettings {
    pub fn from_env(debug: bool) -> Self {
        Self::from_env_with(debug, |key| env::var(key).ok())
    }

    fn from_env_with(debug: bool, mut get_var: impl FnMut(&str) -> Option<String>) -> Self {
        Self {
            debug,
            filter: get_var(EnvFilter::DEFAULT_ENV).filter(|value| !value.trim().is_empty()),
            format: parse_log_format(get_var("LOG_FORMAT").as_deref()),
            output: parse_log_output(get_var("LOG_OUTPUT").as_deref()),
            file_path: parse_log_file_path(get_var("LOG_FILE_PATH").as_deref()),
        }
    }

    fn env_filter(&self) -> EnvFilter {
        if self.debug {
            return EnvFilter::new(DEBUG_LOG_FILTER);
        }

        self.filter
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
    }
}

fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw
        .unwrap_or(DEFAULT_LOG_FORMAT)
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "json" => LogFormat::Json,
        _ => LogFormat::Pretty,
    }
}

fn parse_log_output(raw: Option<&str>) -> LogOutput {
    match raw
        .unwrap_or(DEFAULT_LOG_OUTPUT)
        .trim()
        .to_ascii_lowercase()
        .as_str()
    {
        "file" => LogOutput::File,
        "both" => LogOutput::Both,
        _ => LogOutput::Stderr,
    }
}

fn parse_log_file_path(raw: Option<&str>) -> PathBuf {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE_PATH))
}

fn build_file_writer(path: &Path) -> std::io::Result<(non_blocking::NonBlocking, WorkerGuard)> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| std::ffi::OsStr::new("gemini-ask.log"));

    fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, file_name);
    Ok(tracing_appender::non_blocking(appender))
}

fn stderr_writer() -> BoxMakeWriter {
    BoxMakeWriter::new(std::io::stderr)
}

fn init_with_writer(format: LogFormat, env_filter: EnvFilter, writer: BoxMakeWriter) -> InitResult {
    match format {
        LogFormat::Pretty => tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .try_init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(writer)
            .try_init(),
    }
}

fn init_file_output(settings: &LogSettings, include_stderr: bool) -> (InitResult, LogGuard) {
    let fallback_message = if include_stderr {
        "using stderr only"
    } else {
        "using stderr instead"
    };

    match build_file_writer(&settings.file_path) {
        Ok((file_writer, guard)) => {
            let writer = if include_stderr {
                BoxMakeWriter::new(std::io::stderr.and(file_writer))
            } else {
                BoxMakeWriter::new(file_writer)
            };

            let init_result = init_with_writer(settings.format, settings.env_filter(), writer);
            let guard = init_result.is_ok().then_some(guard);
            (init_result, guard)
        }
        Err(err) => {
            let mode = if include_stderr { "both" } else { "file" };
            eprintln!(
                "gemini-ask: failed to initialize LOG_OUTPUT={} at '{}': {}; {}",
                mode,
                settings.file_path.display(),
                err,
                fallback_message
            );
            let init_result =
                init_with_writer(settings.format, settings.env_filter(), stderr_writer());
            (init_result, None)
        }
    }
}

pub fn init(settings: &LogSettings) -> LogGuard {
    let (init_result, guard) = match settings.output {
        LogOutput::Stderr => (
            init_with_writer(settings.format, settings.env_filter(), stderr_writer()),
            None,
        ),
        LogOutput::File => init_file_output(settings, false),
        LogOutput::Both => init_file_output(settings, true),
    };

    if let Err(err) = init_result {
        eprintln!("{}", init_failure_message(&err));
    }
    guard
}

fn init_failure_message(err: &dyn std::fmt::Display) -> String {
    format!("gemini-ask: failed to initialize logging: {err}; continuing without log output")
}
