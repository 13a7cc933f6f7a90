use std::io::{self, Write};

use nu_ansi_term::Color::{Blue, Magenta, Red, Yellow};
use pkgview_core::{error::PkgviewError, PkgviewResult};
use tracing::{Level, Metadata, Subscriber};
use tracing_subscriber::{
    fmt::{
        self,
        format::{FmtSpan, Writer},
        FmtContext, FormatEvent, FormatFields, MakeWriter,
    },
    registry::LookupSpan,
    EnvFilter,
};

use crate::{cli::Args, progress, utils::Colored};

/// Overrides the `-v`/`-q` derived filter, e.g. `PKGVIEW_LOG=pkgview_core=trace`.
const LOG_ENV: &str = "PKGVIEW_LOG";

fn level_tag(level: Level) -> Option<Colored<&'static str>> {
    match level {
        Level::TRACE => Some(Colored(Magenta, "[TRACE]")),
        Level::DEBUG => Some(Colored(Blue, "[DEBUG]")),
        Level::INFO => None,
        Level::WARN => Some(Colored(Yellow, "[WARN]")),
        Level::ERROR => Some(Colored(Red, "[ERROR]")),
    }
}

/// Info lines are the program output and are printed bare; everything else
/// gets a level tag. Event fields follow the message.
struct TaggedFormatter;

impl<S, N> FormatEvent<S, N> for TaggedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &tracing::Event<'_>,
    ) -> std::fmt::Result {
        if let Some(tag) = level_tag(*event.metadata().level()) {
            write!(writer, "{tag} ")?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

/// Picks the stream for a log line. With `--json` stdout carries the listing
/// only, so every log line goes to stderr.
fn stream_for(level: Level, json_output: bool) -> Stream {
    if level == Level::INFO && !json_output {
        Stream::Stdout
    } else {
        Stream::Stderr
    }
}

/// Writes each formatted event with the progress bars suspended.
///
/// The fmt layer hands over one complete event per `write`, so the line never
/// interleaves with a bar redraw.
struct ProgressAwareWriter {
    stream: Stream,
}

impl Write for ProgressAwareWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut result = Ok(());
        progress::suspend(|| {
            result = match self.stream {
                Stream::Stdout => io::stdout().lock().write_all(buf),
                Stream::Stderr => io::stderr().lock().write_all(buf),
            };
        });
        result.map(|()| buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        match self.stream {
            Stream::Stdout => io::stdout().flush(),
            Stream::Stderr => io::stderr().flush(),
        }
    }
}

struct OutputStreams {
    json_output: bool,
}

impl<'a> MakeWriter<'a> for OutputStreams {
    type Writer = ProgressAwareWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ProgressAwareWriter {
            stream: stream_for(Level::INFO, self.json_output),
        }
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ProgressAwareWriter {
            stream: stream_for(*meta.level(), self.json_output),
        }
    }
}

fn filter_level(args: &Args) -> Level {
    if args.quiet {
        Level::ERROR
    } else {
        match args.verbose {
            0 => Level::INFO,
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

pub fn setup_logging(args: &Args) -> PkgviewResult<()> {
    let level = filter_level(args);
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(format!("pkgview={level}")));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_span_events(FmtSpan::NONE)
        .with_writer(OutputStreams {
            json_output: args.json,
        })
        .without_time();

    let subscriber: Box<dyn Subscriber + Send + Sync> = if args.json {
        Box::new(builder.json().flatten_event(true).finish())
    } else {
        Box::new(builder.event_format(TaggedFormatter).finish())
    };

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|err| PkgviewError::Custom(format!("Failed to set tracing subscriber: {err}")))
}
