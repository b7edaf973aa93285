use color_eyre::eyre::{
    Result,
    WrapErr,
    eyre,
};
use spin_wheel::config::{
    self,
    AppConfig,
    ConfigStore,
};
use std::{
    path::{
        Path,
        PathBuf,
    },
    sync::OnceLock,
};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling,
};
use tracing_subscriber::{
    EnvFilter,
    fmt,
};

mod client;
mod ui;

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn print_usage_and_exit() -> ! {
    println!(
        "Usage: spin-wheel [--options <list>] [--remove-winner] [--config <path>]\n\
         [--log-dir <path>]\n\
         \n\
         Flags:\n\
           --options <list>  Initial options, separated by commas, semicolons, pipes or newlines\n\
           --remove-winner   Strike each winner from the wheel after it is announced\n\
           --config <path>   Config file to use (defaults to {})\n\
           --log-dir <path>  Directory for the daily log file\n\
         \n\
         Keys: space spin, e edit, s sample, c clear, r remove-winner, x reset, q quit",
        config::default_config_path().display(),
    );
    std::process::exit(0);
}

#[derive(Debug, Default)]
struct CliArgs {
    options: Option<String>,
    remove_winner: bool,
    config_path: Option<PathBuf>,
    log_dir: Option<String>,
}

fn parse_cli_args() -> Result<CliArgs> {
    let mut args = std::env::args().skip(1);
    let mut cli = CliArgs::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--options" => {
                let list = args
                    .next()
                    .ok_or_else(|| eyre!("--options requires a list argument"))?;
                if cli.options.is_some() {
                    return Err(eyre!("--options may only be specified once"));
                }
                cli.options = Some(list);
            }
            "--remove-winner" => cli.remove_winner = true,
            "--config" => {
                let path = args
                    .next()
                    .ok_or_else(|| eyre!("--config requires a path argument"))?;
                if cli.config_path.is_some() {
                    return Err(eyre!("--config may only be specified once"));
                }
                cli.config_path = Some(config::expand_path(&path));
            }
            "--log-dir" => {
                let dir = args
                    .next()
                    .ok_or_else(|| eyre!("--log-dir requires a path argument"))?;
                if cli.log_dir.is_some() {
                    return Err(eyre!("--log-dir may only be specified once"));
                }
                cli.log_dir = Some(dir);
            }
            "--help" | "-h" => print_usage_and_exit(),
            other => return Err(eyre!("Unknown argument: {other}")),
        }
    }
    Ok(cli)
}

fn load_config(path: &Path) -> (AppConfig, Option<color_eyre::Report>) {
    match ConfigStore::new(path).and_then(|store| store.load()) {
        Ok(config) => (config, None),
        Err(err) => (AppConfig::default(), Some(err)),
    }
}

fn init_tracing(log_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(log_dir)
        .wrap_err_with(|| format!("Failed to create log directory {}", log_dir.display()))?;
    let appender = rolling::daily(log_dir, "spin-wheel.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);
    let _ = LOG_GUARD.set(guard);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // the terminal belongs to the UI, so logs only go to the file
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init();
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = parse_cli_args()?;

    let config_path = cli
        .config_path
        .clone()
        .unwrap_or_else(config::default_config_path);
    let (mut app_config, load_err) = load_config(&config_path);
    if let Some(options) = cli.options {
        app_config.options = options;
    }
    if cli.remove_winner {
        app_config.remove_winner = true;
    }
    if cli.log_dir.is_some() {
        app_config.log_dir = cli.log_dir;
    }

    init_tracing(&app_config.log_dir())?;
    if let Some(err) = load_err {
        tracing::warn!(path = %config_path.display(), "using default config: {err:#}");
    }
    tracing::info!("starting spin-wheel");
    client::run_app(app_config).await
}
