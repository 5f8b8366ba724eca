//! Purpose: `camparams` CLI entry point for inspecting camera HAL parameter strings.
//! Role: Binary crate root; parses args, reads parameters, emits JSON or text on stdout.
//! Invariants: Stdout carries only command output; diagnostics and logs go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
use std::ffi::OsString;
use std::io::{self, IsTerminal, Read};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, error::ErrorKind as ClapErrorKind};
use serde_json::{Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

mod command_dispatch;

use camparams::api::{Error, ErrorKind, ParameterStore, to_exit_code};

#[derive(Copy, Clone, Debug)]
struct RunOutcome {
    exit_code: i32,
}

impl RunOutcome {
    fn ok() -> Self {
        Self { exit_code: 0 }
    }

    fn with_code(exit_code: i32) -> Self {
        Self { exit_code }
    }
}

fn main() {
    init_tracing();
    let exit_code = match run(std::env::args_os()) {
        Ok(outcome) => outcome.exit_code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

#[derive(Parser)]
#[command(
    name = "camparams",
    version,
    about = "Inspect camera HAL parameter strings (key=value;key=v1,v2)",
    long_about = r#"Parse, re-serialize, and project camera HAL parameter strings.

PARAMS may be passed inline, read from a file with --file, or read from stdin
when omitted or given as "-".

EXAMPLES
  $ camparams parse 'preview-frame-rate=30;preview-size-values=640x480,1280x720'
  $ camparams caps --format caps 'preview-frame-rate=30;preview-size-values=640x480'
  $ camparams serialize --file params.txt

LOGGING
  Set RUST_LOG (for example RUST_LOG=camparams=trace) to see parse diagnostics on stderr."#,
    arg_required_else_help = true
)]
struct Cli {
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize stderr diagnostics: auto|always|never"
    )]
    color: ColorMode,

    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CapsKind {
    Viewfinder,
    Video,
    Image,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum CapsFormat {
    Json,
    Caps,
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(help = "Parameter string; omit or use - to read stdin")]
    params: Option<String>,
    #[arg(
        long,
        conflicts_with = "params",
        help = "Read the parameter string from a file",
        value_hint = ValueHint::FilePath
    )]
    file: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    #[command(about = "Parse parameters and print them as JSON")]
    Parse {
        #[command(flatten)]
        input: InputArgs,
    },
    #[command(about = "Parse parameters and print the re-serialized wire string")]
    Serialize {
        #[command(flatten)]
        input: InputArgs,
    },
    #[command(about = "Print capability records derived from the parameters")]
    Caps {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long, value_enum, default_value = "viewfinder")]
        kind: CapsKind,
        #[arg(long, value_enum, default_value = "json")]
        format: CapsFormat,
    },
}

fn run<I>(args: I) -> Result<RunOutcome, (Error, ColorMode)>
where
    I: IntoIterator<Item = OsString>,
{
    let cli = match Cli::try_parse_from(args) {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp
            | ClapErrorKind::DisplayVersion
            | ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                let exit_code = if matches!(
                    err.kind(),
                    ClapErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
                ) {
                    2
                } else {
                    0
                };
                return Ok(RunOutcome::with_code(exit_code));
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `camparams --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    let color_mode = cli.color;
    command_dispatch::dispatch_command(cli.command)
        .map_err(add_io_hint)
        .map_err(|err| (err, color_mode))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn read_params(input: &InputArgs) -> Result<String, Error> {
    if let Some(path) = &input.file {
        return read_params_file(path);
    }
    match input.params.as_deref() {
        Some("-") | None => read_params_stdin(),
        Some(text) => Ok(text.to_string()),
    }
}

fn read_params_file(path: &Path) -> Result<String, Error> {
    let raw = std::fs::read_to_string(path).map_err(|err| {
        Error::new(ErrorKind::Usage)
            .with_message(format!("failed to read params file {}", path.display()))
            .with_source(err)
    })?;
    Ok(strip_line_ending(raw))
}

fn read_params_stdin() -> Result<String, Error> {
    let mut raw = String::new();
    io::stdin().read_to_string(&mut raw).map_err(|err| {
        Error::new(ErrorKind::Io)
            .with_message("failed to read params from stdin")
            .with_source(err)
    })?;
    Ok(strip_line_ending(raw))
}

// A trailing newline from files or pipes is not part of the HAL string.
fn strip_line_ending(mut raw: String) -> String {
    while raw.ends_with('\n') || raw.ends_with('\r') {
        raw.pop();
    }
    raw
}

fn store_json(store: &ParameterStore) -> Result<Value, Error> {
    let params = serde_json::to_value(store.snapshot()).map_err(|err| {
        Error::new(ErrorKind::Internal)
            .with_message("failed to encode params")
            .with_source(err)
    })?;
    Ok(json!({
        "params": params,
        "dirty": store.is_dirty(),
    }))
}

fn emit_json(value: Value) {
    let encoded = if io::stdout().is_terminal() {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    let json = encoded.unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string());
    println!("{json}");
}

fn add_io_hint(err: Error) -> Error {
    if err.hint().is_some() {
        return err;
    }
    match err.kind() {
        ErrorKind::Io => err.with_hint("I/O error. Check the input stream or file path."),
        ErrorKind::Usage => err.with_hint("Pass PARAMS inline, via --file, or on stdin."),
        ErrorKind::Internal => err,
    }
}

const LABEL_RED: &str = "31";
const LABEL_YELLOW: &str = "33";

fn paint(label: &str, ansi: Option<&str>) -> String {
    match ansi {
        Some(code) => format!("\u{1b}[{code}m{label}\u{1b}[0m"),
        None => label.to_string(),
    }
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    let rendered = if is_tty {
        error_text(err, color_mode.use_color(is_tty))
    } else {
        error_json(err).to_string()
    };
    eprintln!("{rendered}");
}

fn error_message(err: &Error) -> &str {
    err.message().unwrap_or(match err.kind() {
        ErrorKind::Internal => "internal error",
        ErrorKind::Usage => "usage error",
        ErrorKind::Io => "i/o error",
    })
}

fn error_causes(err: &Error) -> impl Iterator<Item = String> + '_ {
    std::iter::successors(err.source(), |&source| source.source()).map(ToString::to_string)
}

fn error_json(err: &Error) -> Value {
    let mut body = json!({
        "kind": format!("{:?}", err.kind()),
        "message": error_message(err),
    });
    if let Some(hint) = err.hint() {
        body["hint"] = json!(hint);
    }
    let causes: Vec<String> = error_causes(err).collect();
    if !causes.is_empty() {
        body["causes"] = json!(causes);
    }
    json!({ "error": body })
}

fn error_text(err: &Error, use_color: bool) -> String {
    let ansi = |code| use_color.then_some(code);
    let mut out = format!("{} {}", paint("error:", ansi(LABEL_RED)), error_message(err));
    if let Some(hint) = err.hint() {
        out.push_str(&format!("\n{} {hint}", paint("hint:", ansi(LABEL_YELLOW))));
    }
    for cause in error_causes(err) {
        out.push_str(&format!("\n  caused by: {cause}"));
    }
    out
}

// First non-empty line of clap's rendering, minus its `error:` prefix.
fn clap_error_summary(err: &clap::Error) -> String {
    err.to_string()
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(|line| line.strip_prefix("error:").unwrap_or(line).trim().to_string())
        .unwrap_or_else(|| "invalid arguments".to_string())
}
