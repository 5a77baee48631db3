use std::{
    env,
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Duration,
};

use clap::Parser;
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use rpcform::{
    Catalog, Explorer, LoopbackInvoker, UiOptions,
    io::{DocumentFormat, read_document},
    presentation::Theme,
};

const LOG_ENV: &str = "RPCFORM_LOG";
const NO_COLOR_ENV: &str = "NO_COLOR";

#[derive(Debug, Parser)]
#[command(
    name = "rpcform",
    version,
    about = "Browse RPC services from a descriptor catalog and call them through terminal forms"
)]
struct Cli {
    /// Descriptor catalog: file path, or "-" for stdin
    #[arg(short = 'c', long = "catalog", value_name = "PATH")]
    catalog: PathBuf,

    /// Catalog format (json, yaml, toml); guessed from the extension when omitted
    #[arg(short = 'f', long = "format", value_name = "FORMAT")]
    format: Option<String>,

    /// Open this procedure's form directly, e.g. pkg.Service.Method
    #[arg(short = 'm', long = "method", value_name = "PROCEDURE")]
    method: Option<String>,

    /// Seconds before an in-flight call is abandoned
    #[arg(long = "timeout", value_name = "SECS", default_value_t = 30)]
    timeout: u64,

    /// Write logs to this file (filter with RPCFORM_LOG, default "info")
    #[arg(long = "log-file", value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Plain styles only; also enabled by a non-empty NO_COLOR
    #[arg(long = "no-color")]
    no_color: bool,

    /// Hide the key hint line
    #[arg(long = "no-help")]
    no_help: bool,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Some(path) = cli.log_file.as_deref() {
        init_logging(path)?;
    }

    let format = resolve_format(&cli)?;
    let document = read_document(&cli.catalog, format).map_err(Report::msg)?;
    let catalog = Catalog::from_value(document).map_err(Report::msg)?;
    info!(
        catalog = %cli.catalog.display(),
        services = catalog.service_count(),
        "catalog loaded"
    );

    let no_color = cli.no_color || env::var_os(NO_COLOR_ENV).is_some_and(|value| !value.is_empty());
    let options = UiOptions::default()
        .with_call_timeout(Duration::from_secs(cli.timeout.max(1)))
        .with_help(!cli.no_help)
        .with_theme(theme(no_color));
    let mut explorer = Explorer::new(catalog, LoopbackInvoker).with_options(options);
    if let Some(method) = cli.method.as_ref() {
        explorer = explorer.with_procedure(method.clone());
    }

    explorer.run().map_err(Report::msg)?;
    Ok(())
}

fn theme(no_color: bool) -> Theme {
    if no_color {
        Theme::monochrome()
    } else {
        Theme::default()
    }
}

fn resolve_format(cli: &Cli) -> Result<DocumentFormat> {
    match cli.format.as_deref() {
        Some(raw) => raw.parse().map_err(|err| eyre!("{err}")),
        None if cli.catalog.as_os_str() == "-" => Ok(DocumentFormat::default()),
        None => Ok(DocumentFormat::from_path(&cli.catalog)),
    }
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        )
        .with(filter)
        .init();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("rpcform").chain(args.iter().copied()))
            .expect("arguments parse")
    }

    #[test]
    fn format_follows_extension_unless_given() {
        let cli = parse(&["--catalog", "api.json"]);
        assert_eq!(resolve_format(&cli).unwrap(), DocumentFormat::Json);
        assert_eq!(cli.timeout, 30);

        let cli = parse(&["--catalog", "-", "--format", "JSON"]);
        assert_eq!(resolve_format(&cli).unwrap(), DocumentFormat::Json);
    }

    #[test]
    fn rejects_unknown_format() {
        let cli = parse(&["--catalog", "api.txt", "--format", "xml"]);
        let err = resolve_format(&cli).unwrap_err();
        assert!(err.to_string().contains("unsupported document format 'xml'"));
    }

    #[test]
    fn no_color_selects_plain_theme() {
        let cli = parse(&["--catalog", "api.json", "--no-color", "--no-help"]);
        assert!(cli.no_color && cli.no_help);
        assert_eq!(theme(true), Theme::monochrome());
        assert_eq!(theme(false), Theme::default());
        assert_ne!(Theme::monochrome(), Theme::default());
    }

    #[test]
    fn catalog_is_required() {
        assert!(Cli::try_parse_from(["rpcform"]).is_err());
    }
}
