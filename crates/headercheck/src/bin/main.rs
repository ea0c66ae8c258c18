//! Header file checker for Unicity indexers.
//!
//! Reads a text file with one hex-encoded block header per line, feeds every
//! header through the header chain verifier at consecutive heights, and
//! reports the last accepted header. Exits with an error on the first header
//! that is rejected.

use std::{
    fs,
    path::{Path, PathBuf},
};

use clap::Parser;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, error, info};
use tracing_subscriber::{
    EnvFilter, Registry, fmt::time::ChronoUtc, layer::SubscriberExt, util::SubscriberInitExt,
};
use unicity_headerchain::{HeaderError, HeaderVerifier, Network, VerifyError};

/// Command line arguments for the header checker.
#[derive(Parser, Debug)]
#[command(name = "unicity-headercheck")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File with one hex-encoded header (80 or 112 bytes) per line.
    /// Blank lines and lines starting with '#' are skipped.
    file: PathBuf,

    /// Network the headers belong to (alpha, alphatest, main, test, regtest, ...).
    #[arg(short, long, default_value = "alpha")]
    network: Network,

    /// Override the network's RandomX activation height.
    #[arg(long)]
    activation_height: Option<u32>,

    /// Height of the first header in the file.
    #[arg(long, default_value_t = 0)]
    start_height: i64,

    /// Hex-encoded header at `start_height - 1` that the first header links to.
    #[arg(long)]
    seed_header: Option<String>,

    /// Print the report as JSON.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Include thread ids, file names and line numbers in log output.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    /// Disable colored output.
    #[arg(long, default_value_t = false)]
    no_color: bool,
}

/// Errors that stop a header file check.
#[derive(Debug, Error)]
enum CheckError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Line {line}: invalid hex: {source}")]
    Hex {
        line: usize,
        #[source]
        source: hex::FromHexError,
    },

    #[error("Invalid seed header: {0}")]
    Seed(#[from] HeaderError),

    #[error("Invalid seed header hex: {0}")]
    SeedHex(#[source] hex::FromHexError),

    #[error("Line {line}: {source}")]
    Rejected {
        line: usize,
        #[source]
        source: VerifyError,
    },
}

/// Summary of a successful check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
struct TipReport {
    network: Network,
    headers_verified: usize,
    height: i64,
    tip_hash: Option<String>,
}

/// A header read from the input file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct HeaderLine {
    line: usize,
    bytes: Vec<u8>,
}

fn parse_headers(text: &str) -> Result<Vec<HeaderLine>, CheckError> {
    text.lines()
        .enumerate()
        .map(|(index, raw)| (index.saturating_add(1), raw.trim()))
        .filter(|(_, raw)| !raw.is_empty() && !raw.starts_with('#'))
        .map(|(line, raw)| {
            hex::decode(raw)
                .map(|bytes| HeaderLine { line, bytes })
                .map_err(|source| CheckError::Hex { line, source })
        })
        .collect()
}

fn build_verifier(args: &Args) -> Result<HeaderVerifier, CheckError> {
    let mut params = args.network.consensus_params();
    if let Some(height) = args.activation_height {
        params = params.with_randomx_height(Some(height));
    }

    let seed = match &args.seed_header {
        Some(seed) => hex::decode(seed.trim()).map_err(CheckError::SeedHex)?,
        None => Vec::new(),
    };
    Ok(HeaderVerifier::resume(
        params,
        args.start_height.saturating_sub(1),
        seed,
    )?)
}

fn check_file(args: &Args, path: &Path) -> Result<TipReport, CheckError> {
    let text = fs::read_to_string(path).map_err(|source| CheckError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let headers = parse_headers(&text)?;
    let mut verifier = build_verifier(args)?;

    info!(
        "Checking {} headers on {} starting at height {}",
        headers.len(),
        args.network,
        verifier.next_height()
    );
    debug!("Chain parameters: {:?}", verifier.params());

    for header in &headers {
        verifier
            .verify_bytes(&header.bytes)
            .map_err(|source| CheckError::Rejected {
                line: header.line,
                source,
            })?;
    }

    let (height, _) = verifier.last_header_processed();
    Ok(TipReport {
        network: args.network,
        headers_verified: headers.len(),
        height,
        tip_hash: verifier.tip_hash().map(|hash| hash.to_string()),
    })
}

/// Initializes tracing with the specified log level.
fn init_tracing(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let level = match args.log_level.as_str() {
        "error" => tracing::Level::ERROR,
        "warn" => tracing::Level::WARN,
        "info" => tracing::Level::INFO,
        "debug" => tracing::Level::DEBUG,
        "trace" => tracing::Level::TRACE,
        _ => {
            eprintln!(
                "Invalid log level: {}. Using 'info' as default.",
                args.log_level
            );
            tracing::Level::INFO
        }
    };

    let env_filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let use_ansi = std::io::IsTerminal::is_terminal(&std::io::stderr()) && !args.no_color;

    let subscriber = Registry::default().with(env_filter).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_level(true)
            .with_target(true)
            .with_thread_ids(args.verbose)
            .with_thread_names(args.verbose)
            .with_ansi(use_ansi)
            .with_file(args.verbose)
            .with_line_number(args.verbose)
            .with_timer(ChronoUtc::rfc_3339()),
    );

    subscriber.try_init()?;

    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_tracing(&args)?;

    let report = match check_file(&args, &args.file) {
        Ok(report) => report,
        Err(e) => {
            error!("Header check failed: {}", e);
            return Err(e.into());
        }
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("network:  {}", report.network);
        println!("verified: {}", report.headers_verified);
        println!("height:   {}", report.height);
        println!("tip:      {}", report.tip_hash.as_deref().unwrap_or("-"));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]
mod tests {
    use std::io::Write;

    use super::*;

    const GENESIS: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";
    const BLOCK_1: &str = "010000006fe28c0ab6f1b372c1a6a246ae63f74f931e8365e15a089c68d6190000000000982051fd1e4ba744bbbe680e1fee14677ba1a3c3540bf7b1cdb606e857233e0e61bc6649ffff001d01e36299";

    fn args(file: &Path, extra: &[&str]) -> Args {
        let mut argv = vec!["unicity-headercheck", file.to_str().unwrap()];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).expect("valid arguments")
    }

    fn header_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_parse_headers_skips_comments_and_blanks() {
        let text = format!("# bitcoin mainnet\n\n{GENESIS}\n   \n  {BLOCK_1}  \n");
        let headers = parse_headers(&text).unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers[0].line, 3);
        assert_eq!(headers[0].bytes.len(), 80);
        assert_eq!(headers[1].line, 5);
    }

    #[test]
    fn test_parse_headers_reports_bad_hex_line() {
        let text = format!("{GENESIS}\nnot-hex\n");
        assert!(matches!(
            parse_headers(&text),
            Err(CheckError::Hex { line: 2, .. })
        ));
    }

    #[test]
    fn test_check_file_reports_tip() {
        let file = header_file(&format!("{GENESIS}\n{BLOCK_1}\n"));
        let args = args(file.path(), &["--network", "main"]);

        let report = check_file(&args, file.path()).unwrap();
        assert_eq!(report.network, Network::Main);
        assert_eq!(report.headers_verified, 2);
        assert_eq!(report.height, 1);
        assert_eq!(
            report.tip_hash.as_deref(),
            Some("00000000839a8e6886ab5951d76f411475428afc90947ee320161bbf18eb6048")
        );

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["network"], "main");
        assert_eq!(json["height"], 1);
    }

    #[test]
    fn test_check_file_stops_at_unlinked_header() {
        // Block 1 twice: the second copy does not link to the first.
        let file = header_file(&format!("{GENESIS}\n{BLOCK_1}\n{BLOCK_1}\n"));
        let args = args(file.path(), &["--network", "main"]);

        match check_file(&args, file.path()) {
            Err(CheckError::Rejected { line, source }) => {
                assert_eq!(line, 3);
                assert!(matches!(
                    source,
                    VerifyError::LinkageMismatch { height: 2, .. }
                ));
            }
            other => panic!("expected a rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_check_file_resumes_from_seed() {
        let file = header_file(&format!("{BLOCK_1}\n"));
        let args = args(
            file.path(),
            &["--network", "main", "--start-height", "1", "--seed-header", GENESIS],
        );

        let report = check_file(&args, file.path()).unwrap();
        assert_eq!(report.headers_verified, 1);
        assert_eq!(report.height, 1);
    }

    #[test]
    fn test_activation_override_bypasses_linkage() {
        // A repeated genesis fails linkage, but at and after the activation
        // height raw headers are not linkage checked.
        let file = header_file(&format!("{GENESIS}\n{GENESIS}\n"));
        let strict = args(file.path(), &["--network", "regtest"]);
        assert!(check_file(&strict, file.path()).is_err());

        let bypass = args(
            file.path(),
            &["--network", "regtest", "--activation-height", "1"],
        );
        assert_eq!(check_file(&bypass, file.path()).unwrap().height, 1);
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let args = args(Path::new("/nonexistent/headers.txt"), &[]);
        assert!(matches!(
            check_file(&args, &args.file),
            Err(CheckError::Read { .. })
        ));
    }

    #[test]
    fn test_network_argument_accepts_aliases() {
        let file = header_file("");
        assert_eq!(args(file.path(), &["-n", "ALPHA"]).network, Network::Alpha);
        assert_eq!(
            args(file.path(), &["--network", "testnet4"]).network,
            Network::Test4
        );
        assert!(
            Args::try_parse_from(["unicity-headercheck", "x", "--network", "nowhere"]).is_err()
        );
    }
}
