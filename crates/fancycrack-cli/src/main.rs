//! FancyCrack CLI
//!
//! Recover a preimage for a hex digest from a wordlist or by brute force.

mod wordlist;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use fancycrack_core::{
    digest_hex, format_count, Algorithm, BruteForceSpec, Charset, CrackConfig, CrackEngine,
    CrackEvent, CrackHandle, CrackRequest, Keyspace, KeyspaceSize, Outcome, DEFAULT_CHARSET,
    MAX_LENGTH,
};
use tracing::warn;

/// Demo target: SHA-256 of "password"
const DEMO_TARGET: &str = "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8";
const DEMO_WORDS: &[&str] = &[
    "123456", "admin", "letmein", "qwerty", "dragon", "monkey", "password", "iloveyou",
];

#[derive(Parser)]
#[command(name = "fancycrack")]
#[command(author = "FancyCrack Team")]
#[command(version = "0.1.0")]
#[command(about = "Dictionary and brute-force digest preimage search", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Try every word of a wordlist
    Dictionary {
        #[command(flatten)]
        target: TargetArgs,

        /// Wordlist file, one candidate per line
        #[arg(short, long)]
        wordlist: PathBuf,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Try every string over a charset within a length range
    Brute {
        #[command(flatten)]
        target: TargetArgs,

        /// Characters to combine (duplicates are ignored)
        #[arg(short, long, default_value = DEFAULT_CHARSET)]
        charset: String,

        /// Minimum candidate length (1-7)
        #[arg(long, default_value = "1")]
        min: usize,

        /// Maximum candidate length (1-7)
        #[arg(long, default_value = "5")]
        max: usize,

        /// Resume from this zero-based position in the sequence
        #[arg(long, default_value = "0")]
        skip: u64,

        #[command(flatten)]
        run: RunArgs,
    },

    /// Print the digest of a plaintext
    Hash {
        /// Algorithm (SHA-1, SHA-256, SHA-384, SHA-512, SHA3-256, SHA3-512)
        #[arg(short, long, default_value = "SHA-256")]
        algorithm: Algorithm,

        /// Text to hash
        plaintext: String,
    },

    /// List digest algorithms
    Algorithms,

    /// Recover SHA-256("password") from a small built-in wordlist
    Demo,
}

#[derive(Args)]
struct TargetArgs {
    /// Algorithm the target was hashed with
    #[arg(short, long, default_value = "SHA-256")]
    algorithm: Algorithm,

    /// Target digest in hex
    #[arg(short, long)]
    target: String,
}

#[derive(Args)]
struct RunArgs {
    /// Delay after each attempt in milliseconds (0-1000)
    #[arg(long, default_value = "0")]
    delay: u64,

    /// Stop after this many seconds (0 = unlimited)
    #[arg(long, default_value = "0")]
    max_time: u64,

    /// Print every candidate as it is tried
    #[arg(long)]
    verbose_attempts: bool,

    /// Output as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Dictionary {
            target,
            wordlist: path,
            run,
        } => {
            let words = wordlist::load_wordlist(&path)?;
            let request = build_request(target, Keyspace::dictionary(words))?;
            cmd_crack(request, run).await?;
        }
        Commands::Brute {
            target,
            charset,
            min,
            max,
            skip,
            run,
        } => {
            let charset = Charset::new(&charset)?;
            let spec = BruteForceSpec::new(charset, min, max).with_skip(skip);
            let request = build_request(target, Keyspace::BruteForce(spec))?;
            cmd_crack(request, run).await?;
        }
        Commands::Hash {
            algorithm,
            plaintext,
        } => {
            println!("{}", digest_hex(algorithm, plaintext.as_bytes())?);
        }
        Commands::Algorithms => {
            cmd_algorithms();
        }
        Commands::Demo => {
            let words = DEMO_WORDS.iter().map(|w| w.to_string()).collect();
            let request =
                CrackRequest::new(Algorithm::Sha256, DEMO_TARGET, Keyspace::dictionary(words));
            eprintln!("> demo: loaded SHA-256(password)");
            let run = RunArgs {
                delay: 10,
                max_time: 0,
                verbose_attempts: true,
                json: false,
            };
            cmd_crack(request, run).await?;
        }
    }

    Ok(())
}

fn build_request(target: TargetArgs, keyspace: Keyspace) -> Result<CrackRequest> {
    let digest = target.target.trim().to_lowercase();
    if digest.is_empty() {
        bail!("target digest is empty");
    }
    keyspace.validate()?;
    Ok(CrackRequest::new(target.algorithm, digest, keyspace))
}

async fn cmd_crack(request: CrackRequest, opts: RunArgs) -> Result<()> {
    let total = request.keyspace.remaining();

    if !opts.json {
        eprintln!("FancyCrack v0.1.0");
        eprintln!("Algorithm: {}", request.algorithm);
        match &request.keyspace {
            Keyspace::Dictionary { words } => {
                eprintln!("Mode: dictionary ({} candidates)", format_count(words.len() as u128));
            }
            Keyspace::BruteForce(spec) => {
                eprintln!(
                    "Mode: brute force ({} chars, length {}-{} of max {})",
                    spec.charset().len(),
                    spec.min_length(),
                    spec.max_length(),
                    MAX_LENGTH
                );
            }
        }
        eprintln!("Keyspace: {}", total);
        eprintln!();
    }

    let config = CrackConfig {
        delay_ms: opts.delay,
        forward_attempts: opts.verbose_attempts,
        ..Default::default()
    };
    let engine = Arc::new(CrackEngine::new(config));
    let handle = CrackHandle::spawn(engine, request).context("failed to start search thread")?;

    let token = handle.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling search");
            token.cancel();
        }
    });

    if opts.max_time > 0 {
        let token = handle.cancellation_token();
        let limit = Duration::from_secs(opts.max_time);
        tokio::spawn(async move {
            tokio::time::sleep(limit).await;
            token.cancel();
        });
    }

    let start = Instant::now();
    let show_progress = !opts.json;
    let outcome = tokio::task::spawn_blocking(move || {
        for event in handle.events().iter() {
            if show_progress {
                render_event(&event, total);
            }
        }
        handle.join()
    })
    .await
    .context("search task failed")?;
    let elapsed = start.elapsed().as_secs_f64();

    if opts.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    }
    if let Outcome::Failed { message } = &outcome {
        bail!(message.clone());
    }
    if !opts.json {
        print_outcome(&outcome, elapsed);
    }
    Ok(())
}

fn render_event(event: &CrackEvent, total: KeyspaceSize) {
    match event {
        CrackEvent::Started { .. } => {}
        CrackEvent::Attempt { candidate, .. } => {
            eprintln!("> trying: {}", candidate);
        }
        CrackEvent::Progress(sample) => {
            eprint!("\r{}", sample.format(total));
        }
        CrackEvent::Finished(_) => {
            eprintln!();
        }
    }
}

fn print_outcome(outcome: &Outcome, elapsed: f64) {
    println!("{:-<60}", "");
    match outcome {
        Outcome::Found { plaintext, .. } => println!("FOUND -> {}", plaintext),
        Outcome::Exhausted { .. } => println!("Not found in search space."),
        Outcome::Cancelled { .. } => println!("Cancelled."),
        Outcome::Failed { message } => println!("Failed: {}", message),
    }
    if let Some(tried) = outcome.tried() {
        println!("Tried:   {}", tried);
        println!("Time:    {:.2}s", elapsed);
        if elapsed > 0.0 {
            println!("Speed:   {} c/s", format_count((tried as f64 / elapsed) as u128));
        }
    }
}

fn cmd_algorithms() {
    println!("Supported Algorithms:");
    println!("{:-<40}", "");
    println!("{:<10} {:<8} {}", "Name", "Bytes", "Status");
    println!("{:-<40}", "");

    let supported = Algorithm::supported();
    for algorithm in Algorithm::ALL {
        let status = if supported.contains(&algorithm) {
            "ok"
        } else {
            "unsupported"
        };
        println!(
            "{:<10} {:<8} {}",
            algorithm.name(),
            algorithm.output_len(),
            status
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_brute_args() {
        let cli = Cli::try_parse_from([
            "fancycrack",
            "brute",
            "-a",
            "sha1",
            "-t",
            "ABC",
            "-c",
            "ab",
            "--min",
            "2",
            "--max",
            "3",
        ])
        .unwrap();
        match cli.command {
            Commands::Brute {
                target, charset, min, max, skip, ..
            } => {
                assert_eq!(target.algorithm, Algorithm::Sha1);
                assert_eq!(charset, "ab");
                assert_eq!((min, max, skip), (2, 3, 0));
            }
            _ => panic!("expected brute command"),
        }
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        assert!(Cli::try_parse_from(["fancycrack", "hash", "-a", "crc32", "x"]).is_err());
    }

    #[test]
    fn test_build_request_normalizes_target() {
        let target = TargetArgs {
            algorithm: Algorithm::Sha256,
            target: "  ABCDEF \n".to_string(),
        };
        let request = build_request(target, Keyspace::dictionary(vec!["a".into()])).unwrap();
        assert_eq!(request.target, "abcdef");
    }

    #[test]
    fn test_build_request_rejects_empty_target() {
        let target = TargetArgs {
            algorithm: Algorithm::Sha256,
            target: "   ".to_string(),
        };
        assert!(build_request(target, Keyspace::dictionary(vec!["a".into()])).is_err());
    }

    #[test]
    fn test_demo_target_is_in_demo_words() {
        let found = DEMO_WORDS
            .iter()
            .any(|w| digest_hex(Algorithm::Sha256, w.as_bytes()).unwrap() == DEMO_TARGET);
        assert!(found);
    }
}
