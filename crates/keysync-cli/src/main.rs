//! keysync CLI
//!
//! Debugging harness for the translation core. `keysync replay` feeds a
//! recorded stream of raw platform events through a translator and prints
//! every event the runtime would receive, synthesized corrections included;
//! `keysync resolve` shows how a single raw event resolves to canonical
//! ids.
//!
//! The replay input format is JSON lines, one raw event per line:
//!
//! ```text
//! {"keycode":38,"keyval":97,"state":0,"time_ms":1,"is_press":true}
//! {"keycode":38,"keyval":97,"state":0,"time_ms":2,"is_press":false}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped, so fixture files
//! can carry commentary.

use std::sync::{Arc, Mutex, Weak};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio_stream::{wrappers::LinesStream, StreamExt};

use keysync_core::{
    resolver, EventAck, EventSink, EventTranslator, KeyEvent, RawKeyEvent,
};
use keysync_keymap::{PLATFORM_PLANE, VALUE_MASK};

#[derive(Parser, Debug)]
#[command(name = "keysync")]
#[command(about = "Canonical keyboard event translation harness")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a recorded raw event stream through a translator
    Replay {
        /// Path to a JSON-lines event recording, or `-` for stdin
        #[arg(default_value = "-")]
        input: String,
    },

    /// Resolve one raw event to canonical key identities
    Resolve {
        /// Native keycode
        keycode: u32,
        /// Native keyval, hex accepted with an 0x prefix
        #[arg(value_parser = parse_maybe_hex)]
        keyval: u32,
        /// Resolve as a release instead of a press
        #[arg(long)]
        release: bool,
    },
}

fn parse_maybe_hex(raw: &str) -> Result<u32, String> {
    let parsed = match raw.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => raw.parse(),
    };
    parsed.map_err(|e| format!("invalid keyval '{raw}': {e}"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay { input } => cmd_replay(&input).await,
        Commands::Resolve {
            keycode,
            keyval,
            release,
        } => cmd_resolve(keycode, keyval, !release),
    }
}

async fn cmd_replay(input: &str) -> Result<()> {
    let summary = if input == "-" {
        replay(BufReader::new(tokio::io::stdin())).await?
    } else {
        let path = shellexpand::tilde(input).into_owned();
        let file = tokio::fs::File::open(&path)
            .await
            .with_context(|| format!("failed to open recording {path}"))?;
        replay(BufReader::new(file)).await?
    };

    eprintln!(
        "{} raw events in, {} delivered ({} synthesized), {} handled",
        summary.raw_events, summary.delivered, summary.synthesized, summary.handled
    );
    Ok(())
}

fn cmd_resolve(keycode: u32, keyval: u32, is_press: bool) -> Result<()> {
    let event = RawKeyEvent {
        keycode,
        keyval,
        state: 0,
        time_ms: 0,
        is_press,
        specified_logical: None,
    };
    let physical = resolver::physical_key(&event);
    let logical = resolver::logical_key(&event);
    println!("physical: {} ({})", physical, plane_name(physical.0));
    println!("logical:  {} ({})", logical, plane_name(logical.0));
    match resolver::character(&event) {
        Some(character) => println!("character: {character:?}"),
        None => println!("character: none"),
    }
    Ok(())
}

/// Human name of the plane an id was resolved into.
fn plane_name(id: u64) -> &'static str {
    if id & !VALUE_MASK == PLATFORM_PLANE {
        "platform plane, auto-generated"
    } else {
        "canonical"
    }
}

/// Totals reported after a replay run.
#[derive(Debug, Default, PartialEq, Eq)]
struct ReplaySummary {
    /// Raw events read from the recording.
    raw_events: usize,
    /// Events delivered to the sink, empty events included.
    delivered: usize,
    /// Delivered events that were synthesized corrections.
    synthesized: usize,
    /// Raw events whose genuine event came back handled.
    handled: usize,
}

/// Sink that prints every delivered event as a JSON line and acknowledges
/// immediately.
#[derive(Default)]
struct PrintSink {
    delivered: Mutex<Vec<KeyEvent>>,
}

impl EventSink for PrintSink {
    fn deliver(&self, event: KeyEvent) -> EventAck {
        match serde_json::to_string(&event) {
            Ok(line) => println!("{line}"),
            Err(error) => tracing::warn!(%error, "failed to encode event"),
        }
        self.delivered.lock().unwrap().push(event);
        let (tx, ack) = EventAck::channel();
        tx.resolve(true);
        ack
    }
}

async fn replay<R>(reader: R) -> Result<ReplaySummary>
where
    R: AsyncBufRead + Unpin,
{
    let sink = Arc::new(PrintSink::default());
    let mut translator = EventTranslator::new(Arc::downgrade(&sink) as Weak<dyn EventSink>);
    let mut summary = ReplaySummary::default();

    let mut lines = LinesStream::new(reader.lines());
    let mut line_no = 0usize;
    while let Some(line) = lines.next().await {
        line_no += 1;
        let line = line.context("failed to read recording line")?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let event: RawKeyEvent = serde_json::from_str(trimmed)
            .with_context(|| format!("invalid raw event on line {line_no}"))?;

        summary.raw_events += 1;
        let disposition = translator
            .handle_event(&event)
            .with_context(|| format!("translation diverged on line {line_no}"))?;
        if disposition.handled().await? {
            summary.handled += 1;
        }
    }

    let delivered = sink.delivered.lock().unwrap();
    summary.delivered = delivered.len();
    summary.synthesized = delivered.iter().filter(|e| e.synthesized).count();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[tokio::test]
    async fn replay_counts_a_clean_round_trip() {
        let recording = "\
# a key tap
{\"keycode\":38,\"keyval\":97,\"state\":0,\"time_ms\":1,\"is_press\":true}

{\"keycode\":38,\"keyval\":97,\"state\":0,\"time_ms\":2,\"is_press\":false}
";
        let summary = replay(recording.as_bytes()).await.expect("replay");
        assert_eq!(
            summary,
            ReplaySummary {
                raw_events: 2,
                delivered: 2,
                synthesized: 0,
                handled: 2,
            }
        );
    }

    #[tokio::test]
    async fn replay_counts_synthesized_corrections() {
        // Shift bit set with no shift press on record: one correction is
        // synthesized ahead of the genuine event.
        let recording =
            "{\"keycode\":38,\"keyval\":65,\"state\":1,\"time_ms\":1,\"is_press\":true}\n";
        let summary = replay(recording.as_bytes()).await.expect("replay");
        assert_eq!(summary.raw_events, 1);
        assert_eq!(summary.delivered, 2);
        assert_eq!(summary.synthesized, 1);
    }

    #[tokio::test]
    async fn replay_rejects_malformed_lines() {
        let err = replay("not json\n".as_bytes()).await.expect_err("must fail");
        assert!(err.to_string().contains("line 1"));
    }

    #[tokio::test]
    async fn replay_reads_from_a_real_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "{}",
            "{\"keycode\":38,\"keyval\":97,\"state\":0,\"time_ms\":1,\"is_press\":true}"
        )
        .expect("write");

        let opened = tokio::fs::File::open(file.path()).await.expect("open");
        let summary = replay(BufReader::new(opened)).await.expect("replay");
        assert_eq!(summary.raw_events, 1);
        assert_eq!(summary.delivered, 1);
    }

    #[test]
    fn keyval_parser_accepts_hex_and_decimal() {
        assert_eq!(parse_maybe_hex("97"), Ok(97));
        assert_eq!(parse_maybe_hex("0xffe5"), Ok(0xffe5));
        assert!(parse_maybe_hex("zz").is_err());
    }
}
