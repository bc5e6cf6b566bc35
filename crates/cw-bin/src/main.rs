//! cellwidth entrypoint.
use anyhow::{Context, Result};
use clap::Parser;
use core_config::{EnvSnapshot, load_from};
use core_text::{
    AmbiguousWidth, ClusterState, WidthOptions, decode_lossy, legacy, measure_bytes,
    next_grapheme_cluster_bytes,
};
use std::ffi::OsString;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name = "cellwidth",
    version,
    about = "Measure the monospace display width of text"
)]
struct Args {
    /// Text to measure, one result per argument. Reads stdin lines when omitted.
    /// Bytes that are not valid UTF-8 are measured as U+FFFD, not rejected.
    text: Vec<OsString>,
    /// Use the rune-by-rune legacy heuristic instead of grapheme clusters.
    #[arg(long)]
    legacy: bool,
    /// Print every cluster with its byte span and width.
    #[arg(long)]
    clusters: bool,
    /// Count East Asian Ambiguous code points as two cells.
    #[arg(long = "ambiguous-wide")]
    ambiguous_wide: bool,
    /// Force East Asian context (implies --ambiguous-wide unless the config says otherwise).
    #[arg(long = "east-asian")]
    east_asian: bool,
    /// Optional configuration file path (overrides discovery of `cellwidth.toml`).
    #[arg(long = "config")]
    config: Option<PathBuf>,
    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,
}

fn configure_logging(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let Some(path) = log_file else {
        // A subscriber may already be installed; logging stays best-effort.
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .try_init();
        return Ok(None);
    };

    let file_name = path
        .file_name()
        .with_context(|| format!("log file path has no file name: {}", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let file_appender = tracing_appender::rolling::never(dir, file_name);
    let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(nb_writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        Err(_err) => Ok(None),
    }
}

/// Config file and environment first, then command-line flags on top.
fn resolve_options(args: &Args, env: &EnvSnapshot) -> Result<WidthOptions> {
    let config = load_from(args.config.clone())?;
    let mut opts = config.resolve(env);
    if args.east_asian && !opts.east_asian {
        opts.east_asian = true;
        if config.file.width.ambiguous.is_none() {
            opts.ambiguous_width = AmbiguousWidth::Wide;
        }
    }
    if args.ambiguous_wide {
        opts.ambiguous_width = AmbiguousWidth::Wide;
    }
    info!(
        target: "cli",
        east_asian = opts.east_asian,
        ambiguous = opts.ambiguous_width.cells(),
        strict_emoji_neutral = opts.strict_emoji_neutral,
        legacy = args.legacy,
        "width_options_resolved"
    );
    Ok(opts)
}

fn report(
    out: &mut impl Write,
    bytes: &[u8],
    opts: &WidthOptions,
    args: &Args,
) -> io::Result<()> {
    if !args.clusters {
        let width = measure_bytes(bytes, opts, args.legacy);
        debug!(target: "cli", bytes = bytes.len(), width, "measured");
        return writeln!(out, "{width}");
    }

    let mut state = ClusterState::START;
    let mut offset = 0;
    let mut total = 0;
    while offset < bytes.len() {
        let (cluster, next) = next_grapheme_cluster_bytes(bytes, offset, state, opts);
        let width = if args.legacy {
            legacy::cluster_width(&decode_lossy(cluster.bytes), opts)
        } else {
            cluster.width
        };
        total += width;
        writeln!(
            out,
            "{}..{}\t{}\t{:?}",
            cluster.start,
            cluster.end,
            width,
            String::from_utf8_lossy(cluster.bytes)
        )?;
        offset = cluster.end;
        state = next;
    }
    writeln!(out, "total\t{total}")
}

fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let opts = resolve_options(args, &EnvSnapshot::capture())?;
    if !args.text.is_empty() {
        for text in &args.text {
            report(out, text.as_encoded_bytes(), &opts, args).context("writing output")?;
        }
        return Ok(());
    }

    report_lines(io::stdin().lock(), out, &opts, args)
}

/// One report per `\n`-terminated line (a trailing `\r` is dropped). Lines are
/// raw bytes, so invalid UTF-8 in one line does not stop the others.
fn report_lines(
    input: impl BufRead,
    out: &mut impl Write,
    opts: &WidthOptions,
    args: &Args,
) -> Result<()> {
    for line in input.split(b'\n') {
        let mut line = line.context("reading stdin")?;
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        report(out, &line, opts, args).context("writing output")?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(args.log_file.as_deref())?;
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    run(&args, &mut out)?;
    out.flush().context("flushing stdout")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fmt;
    use std::sync::{Arc, Mutex};
    use tracing::Subscriber;
    use tracing::field::{Field, Visit};
    use tracing_subscriber::layer::{Context as LayerContext, Layer, SubscriberExt};
    use tracing_subscriber::registry::Registry;

    #[derive(Clone, Default)]
    struct Capture {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Clone, Debug)]
    struct CapturedEvent {
        target: String,
        fields: Vec<(String, String)>,
    }

    #[derive(Default)]
    struct FieldCollector {
        fields: Vec<(String, String)>,
    }

    impl Visit for FieldCollector {
        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.fields
                .push((field.name().to_string(), format!("{:?}", value)));
        }
    }

    impl<S> Layer<S> for Capture
    where
        S: Subscriber,
    {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: LayerContext<'_, S>) {
            let mut collector = FieldCollector::default();
            event.record(&mut collector);
            self.events.lock().unwrap().push(CapturedEvent {
                target: event.metadata().target().to_string(),
                fields: collector.fields,
            });
        }
    }

    fn args(argv: &[&str]) -> Args {
        let mut full = vec!["cellwidth", "--config", "__nonexistent_cellwidth__.toml"];
        full.extend_from_slice(argv);
        Args::try_parse_from(full).unwrap()
    }

    fn output(args: &Args, bytes: &[u8], opts: &WidthOptions) -> String {
        let mut buf = Vec::new();
        report(&mut buf, bytes, opts, args).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn parses_flags_and_text() {
        let a = args(&["--legacy", "--clusters", "abc", "中"]);
        assert!(a.legacy && a.clusters);
        assert_eq!(a.text, vec![OsString::from("abc"), OsString::from("中")]);
        assert!(a.log_file.is_none());
    }

    #[test]
    fn flags_override_resolved_options() {
        let env = EnvSnapshot::default();
        let plain = resolve_options(&args(&[]), &env).unwrap();
        assert_eq!(plain, WidthOptions::DEFAULT);

        let wide = resolve_options(&args(&["--ambiguous-wide"]), &env).unwrap();
        assert_eq!(wide.ambiguous_width, AmbiguousWidth::Wide);
        assert!(!wide.east_asian);

        let ea = resolve_options(&args(&["--east-asian"]), &env).unwrap();
        assert_eq!(ea, WidthOptions::east_asian());
    }

    #[test]
    fn reports_width_per_input() {
        let opts = WidthOptions::DEFAULT;
        assert_eq!(output(&args(&[]), "🇯🇵".as_bytes(), &opts), "2\n");
        assert_eq!(output(&args(&["--legacy"]), "🇯🇵".as_bytes(), &opts), "1\n");
    }

    #[test]
    fn cluster_table_lists_spans() {
        let opts = WidthOptions::DEFAULT;
        let table = output(&args(&["--clusters"]), "ae\u{301}中".as_bytes(), &opts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "0..1\t1\t\"a\"");
        assert!(lines[1].starts_with("1..4\t1\t"));
        assert_eq!(lines[2], "4..7\t2\t\"中\"");
        assert_eq!(lines[3], "total\t4");
    }

    #[test]
    fn malformed_utf8_is_measured() {
        let opts = WidthOptions::DEFAULT;
        assert_eq!(output(&args(&[]), b"ab\xffcd", &opts), "5\n");
        assert_eq!(output(&args(&["--legacy"]), b"ab\xffcd", &opts), "5\n");

        let table = output(&args(&["--clusters"]), b"a\xff", &opts);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0..1\t1\t\"a\"");
        assert!(lines[1].starts_with("1..2\t1\t"));
        assert_eq!(lines[2], "total\t2");
    }

    #[test]
    fn stdin_lines_survive_invalid_bytes() {
        let input = io::Cursor::new(b"ab\xffcd\r\nok\n\xe4\xb8\n".to_vec());
        let mut buf = Vec::new();
        report_lines(input, &mut buf, &WidthOptions::DEFAULT, &args(&[])).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "5\n2\n2\n");
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_argument_is_accepted() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"ab\xffcd".to_vec());
        let a = Args::try_parse_from([OsString::from("cellwidth"), raw]).unwrap();
        let out = output(&a, a.text[0].as_encoded_bytes(), &WidthOptions::DEFAULT);
        assert_eq!(out, "5\n");
    }

    #[test]
    fn measurement_emits_cli_event() {
        let capture = Capture::default();
        let subscriber = Registry::default().with(capture.clone());
        tracing::subscriber::with_default(subscriber, || {
            output(&args(&[]), b"hello", &WidthOptions::DEFAULT);
        });
        let events = capture.events.lock().unwrap();
        let measured = events
            .iter()
            .find(|e| e.fields.iter().any(|(k, v)| k == "message" && v == "measured"))
            .expect("measured event");
        assert_eq!(measured.target, "cli");
        assert!(
            measured
                .fields
                .iter()
                .any(|(k, v)| k == "width" && v == "5")
        );
    }
}
