//! usk CLI: semantic wordform factorizer.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use usk::compose::Program;
use usk::decoder::{Decoder, DecoderConfig};
use usk::table::GlyphKind;

#[derive(Parser)]
#[command(name = "usk", version, about = "Semantic wordform factorizer")]
struct Cli {
    /// Data directory for the decode ledger and calibration overrides.
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a single wordform into its operator/payload program.
    Decode {
        /// The surface wordform (a single word, letters only).
        word: String,

        /// Emit the program as JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Decode a file of wordforms, one per line, in parallel.
    Batch {
        /// Path to the word list.
        file: PathBuf,

        /// Emit each program as one JSON line.
        #[arg(long)]
        json: bool,
    },

    /// Adjust a glyph confidence by a signed delta.
    Learn {
        /// Glyph or cluster key (e.g. "p" or "sk").
        key: String,

        /// "operator" or "payload".
        kind: String,

        /// Signed adjustment; the result clamps to [0, 1].
        delta: f64,
    },

    /// Dump the glyph table.
    Glyphs {
        /// Restrict to "operator" or "payload" entries.
        #[arg(long)]
        kind: Option<String>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let config = DecoderConfig {
        data_dir: cli.data_dir.clone(),
    };

    match cli.command {
        Commands::Decode { word, json } => {
            let decoder = Decoder::new(config)?;
            let program = decoder.decode(&word)?;
            decoder.record(&program)?;

            if json {
                let out = serde_json::to_string_pretty(&program).into_diagnostic()?;
                println!("{out}");
            } else {
                print_program(&program);
            }
        }

        Commands::Batch { file, json } => {
            let decoder = Decoder::new(config)?;
            let content = std::fs::read_to_string(&file).into_diagnostic()?;
            let words: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect();

            let results = decoder.decode_batch(&words);
            let mut failed = 0;
            for (word, result) in words.iter().zip(results) {
                match result {
                    Ok(program) => {
                        decoder.record(&program)?;
                        if json {
                            let out = serde_json::to_string(&program).into_diagnostic()?;
                            println!("{out}");
                        } else {
                            println!(
                                "{word}: {} (confidence {:.2})",
                                program.gloss, program.confidence
                            );
                        }
                    }
                    Err(err) => {
                        failed += 1;
                        eprintln!("{word}: {err}");
                    }
                }
            }
            if failed > 0 {
                eprintln!("{failed} of {} words failed to decode", words.len());
            }
        }

        Commands::Learn { key, kind, delta } => {
            let kind: GlyphKind = kind.parse().map_err(|e: String| miette::miette!(e))?;
            let decoder = Decoder::new(config)?;
            let (old, new) = decoder.learn(&key, kind, delta)?;
            println!("{key} ({kind}): {old:.2} → {new:.2}");
        }

        Commands::Glyphs { kind } => {
            let filter: Option<GlyphKind> = match kind {
                Some(k) => Some(k.parse().map_err(|e: String| miette::miette!(e))?),
                None => None,
            };
            let decoder = Decoder::new(config)?;
            for entry in decoder.table().all() {
                if filter.is_some_and(|k| k != entry.kind) {
                    continue;
                }
                println!(
                    "  {:<4} {:<8} {:<32} {:.2}  {}",
                    entry.key, entry.kind, entry.descriptor, entry.confidence, entry.principle
                );
            }
        }
    }

    Ok(())
}

fn print_program(program: &Program) {
    println!("surface:    {}", program.surface);
    println!("gloss:      {}", program.gloss);
    println!("confidence: {:.4}", program.confidence);
    println!("steps:");
    for step in &program.steps {
        let op = step
            .operator
            .as_ref()
            .map(|t| format!("{} [{}]", t.text, t.entry.descriptor))
            .unwrap_or_else(|| "·".to_string());
        let pl = step
            .payload
            .as_ref()
            .map(|t| format!("{} [{}]", t.text, t.entry.descriptor))
            .unwrap_or_else(|| "·".to_string());
        println!(
            "  {:?}: {op} / {pl} (confidence {:.2})",
            step.position, step.confidence
        );
    }
}
