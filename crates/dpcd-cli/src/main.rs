mod render;

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use dpcd_core::source::{parse_address, parse_hex_bytes};
use dpcd_core::{DecodeOptions, DirectionFilter, decode_trace_file};
use glob::glob;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(name = "dpcd")]
#[command(version)]
#[command(
    about = "Decode DisplayPort DPCD registers and MST sideband replies.",
    long_about = None,
    after_help = "Examples:\n  dpcd dump --dpcd \"11 14 c4\"\n  dpcd dump --file dpcd.txt --base 0x100 --json\n  dpcd trace dmesg.log --coalesce -o report.json --json"
)]
struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decode a hex dump of DPCD bytes
    Dump {
        /// Hex bytes, whitespace or comma separated
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        dpcd: Option<String>,

        /// File holding the hex dump
        #[arg(long)]
        file: Option<PathBuf>,

        /// Address of the first byte (hex with 0x, or decimal)
        #[arg(long, default_value = "0x0", value_parser = parse_base)]
        base: u32,

        #[command(flatten)]
        out: OutputArgs,
    },
    /// Decode the AUX transactions found in a kernel log
    Trace {
        /// Path (or glob matching one file) of the trace
        input: PathBuf,

        /// Join address-contiguous transfers before decoding
        #[arg(long)]
        coalesce: bool,

        /// Which transfers to decode
        #[arg(long, value_enum, default_value_t = DirectionArg::Both)]
        direction: DirectionArg,

        /// Exit with a non-zero code if any transaction failed to decode
        #[arg(long)]
        strict: bool,

        #[command(flatten)]
        out: OutputArgs,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Emit JSON instead of the text layout
    #[arg(long)]
    json: bool,

    /// Pretty-print JSON output
    #[arg(long, conflicts_with = "compact")]
    pretty: bool,

    /// Compact JSON output (default)
    #[arg(long)]
    compact: bool,

    /// Write output to a file instead of stdout
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Suppress non-error output
    #[arg(long)]
    quiet: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DirectionArg {
    Read,
    Write,
    Both,
}

impl From<DirectionArg> for DirectionFilter {
    fn from(arg: DirectionArg) -> Self {
        match arg {
            DirectionArg::Read => DirectionFilter::Read,
            DirectionArg::Write => DirectionFilter::Write,
            DirectionArg::Both => DirectionFilter::Both,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Dump {
            dpcd,
            file,
            base,
            out,
        } => cmd_dump(dpcd, file, base, &out),
        Commands::Trace {
            input,
            coalesce,
            direction,
            strict,
            out,
        } => cmd_trace(&input, coalesce, direction, strict, &out),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err.message);
            if let Some(hint) = err.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(2)
        }
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .init();
}

#[derive(Debug)]
struct CliError {
    message: String,
    hint: Option<String>,
}

impl CliError {
    fn new(message: impl Into<String>, hint: Option<String>) -> Self {
        Self {
            message: message.into(),
            hint,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        CliError::new(format!("{err:#}"), None)
    }
}

fn parse_base(text: &str) -> Result<u32, String> {
    parse_address(text).map_err(|err| err.to_string())
}

fn cmd_dump(
    dpcd: Option<String>,
    file: Option<PathBuf>,
    base: u32,
    out: &OutputArgs,
) -> Result<(), CliError> {
    let text = match (dpcd, file) {
        (Some(text), _) => text,
        (None, Some(path)) => {
            let path = resolve_input_path(&path)?;
            validate_input_file(&path)?;
            fs::read_to_string(&path)
                .with_context(|| format!("Failed to read dump: {}", path.display()))?
        }
        (None, None) => {
            return Err(CliError::new(
                "missing input bytes",
                Some("use --dpcd or --file".to_string()),
            ));
        }
    };

    let bytes = parse_hex_bytes(&text).map_err(|err| {
        CliError::new(
            err.to_string(),
            Some("expected hex bytes such as \"11 14 c4\"".to_string()),
        )
    })?;
    log::debug!("decoding {} bytes from {base:#x}", bytes.len());

    let report = dpcd_core::decode(&bytes, base)
        .map_err(|err| CliError::new(format!("decode failed: {err}"), None))?;

    let rendered = if out.json {
        serialize_json(&report, out.pretty, out.compact)?
    } else {
        render::report_text(&report).context("rendering failed")?
    };
    emit(&rendered, out)
}

fn cmd_trace(
    input: &Path,
    coalesce: bool,
    direction: DirectionArg,
    strict: bool,
    out: &OutputArgs,
) -> Result<(), CliError> {
    let resolved_input = resolve_input_path(input)?;
    validate_input_file(&resolved_input)?;
    if let Some(output) = out.output.as_ref() {
        ensure_distinct(&resolved_input, output)?;
    }

    let options = DecodeOptions {
        coalesce,
        direction: direction.into(),
    };
    let reports = decode_trace_file(&resolved_input, &options)
        .with_context(|| format!("Failed to decode trace: {}", resolved_input.display()))?;
    if reports.is_empty() {
        log::warn!("no AUX transactions found in {}", resolved_input.display());
    }

    let rendered = if out.json {
        serialize_json(&reports, out.pretty, out.compact)?
    } else {
        render::trace_text(&reports).context("rendering failed")?
    };
    emit(&rendered, out)?;

    let failed = reports.iter().filter(|entry| entry.error.is_some()).count();
    if strict && failed > 0 {
        return Err(CliError::new(
            format!("{failed} transaction(s) failed to decode"),
            Some("rerun with --coalesce if registers span several reads".to_string()),
        ));
    }
    Ok(())
}

fn serialize_json<T: Serialize>(value: &T, pretty: bool, compact: bool) -> Result<String, CliError> {
    if pretty && compact {
        return Err(CliError::new(
            "cannot use --pretty and --compact together",
            Some("choose one output format".to_string()),
        ));
    }
    let json = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    let mut json = json.context("JSON serialization failed")?;
    json.push('\n');
    Ok(json)
}

fn emit(rendered: &str, out: &OutputArgs) -> Result<(), CliError> {
    let Some(path) = out.output.as_ref() else {
        print!("{}", rendered);
        return Ok(());
    };

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, rendered)
        .with_context(|| format!("Failed to write output: {}", path.display()))?;
    if !out.quiet {
        eprintln!("OK: report written -> {}", path.display());
    }
    Ok(())
}

fn ensure_distinct(input: &Path, output: &Path) -> Result<(), CliError> {
    let input_abs = fs::canonicalize(input)
        .with_context(|| format!("Failed to resolve input path: {}", input.display()))?;
    let Ok(output_abs) = fs::canonicalize(output) else {
        // output does not exist yet
        return Ok(());
    };
    if input_abs == output_abs {
        return Err(CliError::new(
            format!("output path must differ from input: {}", output.display()),
            Some("choose a different output path".to_string()),
        ));
    }
    Ok(())
}

fn validate_input_file(input: &Path) -> Result<(), CliError> {
    if !input.exists() {
        return Err(CliError::new(
            format!("input file not found: {}", input.display()),
            Some("check the path".to_string()),
        ));
    }
    if !input.is_file() {
        return Err(CliError::new(
            format!("input is not a file: {}", input.display()),
            Some("pass a kernel log or hex dump file".to_string()),
        ));
    }
    Ok(())
}

fn resolve_input_path(input: &Path) -> Result<PathBuf, CliError> {
    let pattern = input.to_string_lossy();
    if !is_glob_pattern(&pattern) {
        return Ok(input.to_path_buf());
    }

    let mut matches = Vec::new();
    let paths = glob(&pattern).map_err(|err| {
        CliError::new(
            format!("invalid input pattern '{}'", pattern),
            Some(format!("pattern error: {}", err.msg)),
        )
    })?;
    for entry in paths {
        let path = entry.map_err(|err| {
            CliError::new(
                format!("invalid input pattern '{}'", pattern),
                Some(format!("pattern error: {}", err)),
            )
        })?;
        if path.is_file() {
            matches.push(path);
        }
    }

    if matches.is_empty() {
        return Err(CliError::new(
            format!("no files match pattern '{}'", pattern),
            Some("check the path or quote the pattern".to_string()),
        ));
    }
    if matches.len() > 1 {
        let mut message = format!(
            "multiple files match pattern '{}' ({} matches)",
            pattern,
            matches.len()
        );
        let listed = matches
            .iter()
            .take(3)
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>();
        message.push_str("; matches: ");
        message.push_str(&listed.join(", "));
        if matches.len() > 3 {
            message.push_str(", ...");
        }
        return Err(CliError::new(
            message,
            Some("pass a single file, or run once per file".to_string()),
        ));
    }

    Ok(matches.remove(0))
}

fn is_glob_pattern(input: &str) -> bool {
    input.contains('*') || input.contains('?') || input.contains('[')
}
