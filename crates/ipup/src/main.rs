// # ipup - run-once public-IP publisher
//
// Invoked periodically by an external scheduler (cron, a systemd timer).
// Each invocation:
//
// 1. Reads the JSON configuration artifact
// 2. Initializes logging (stdout, or an append-mode log file)
// 3. Registers the built-in resolver/publisher/state-store factories
// 4. Runs exactly one detect-compare-publish cycle and exits
//
// This is a THIN integration layer: all cycle logic lives in ipup-core.
//
// ## Usage
//
// ```bash
// ipup [--force] [config-path]
// ```
//
// The config path defaults to the IPUP_CONFIG environment variable, then to
// `config.json`. `--force` publishes even when the address is unchanged.
//
// ## Exit codes
//
// One distinct code per failure class, so the scheduler's logs identify the
// failing step without parsing output:
//
// - 0: cycle reached DONE (published, or nothing to do)
// - 1: configuration error
// - 2: resolution error (no endpoint returned a valid address)
// - 3: state store error
// - 4: publish error (fatal, or retry budget exhausted)
// - 5: another invocation holds the cycle lock
// - 6: unexpected runtime error

use std::process::ExitCode;

use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use ipup_core::{
    ComponentRegistry, CycleController, CycleLock, CycleOutcome, Error, IpupConfig,
};

/// Exit codes for the cycle's terminal states
#[derive(Debug, Clone, Copy)]
enum IpupExitCode {
    /// Cycle reached DONE
    CleanRun = 0,
    /// Configuration unreadable or invalid
    ConfigError = 1,
    /// No detection endpoint returned a valid address
    ResolutionError = 2,
    /// Persisted state unreadable or unwritable
    StateError = 3,
    /// Destination rejected the address or retries ran out
    PublishError = 4,
    /// Another invocation holds the cycle lock
    LockError = 5,
    /// Unexpected runtime error
    RuntimeError = 6,
}

impl From<IpupExitCode> for ExitCode {
    fn from(code: IpupExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl From<&Error> for IpupExitCode {
    fn from(e: &Error) -> Self {
        match e {
            Error::Config(_) => IpupExitCode::ConfigError,
            Error::Resolution(_) => IpupExitCode::ResolutionError,
            Error::StateStore(_) => IpupExitCode::StateError,
            Error::PublishRetryable(_) | Error::PublishFatal(_) => IpupExitCode::PublishError,
            Error::Lock(_) => IpupExitCode::LockError,
            Error::Io(_) | Error::Json(_) | Error::Other(_) => IpupExitCode::RuntimeError,
        }
    }
}

/// Command line: optional --force plus an optional config path
struct CliArgs {
    config_path: String,
    force: bool,
}

impl CliArgs {
    fn parse() -> Result<Self, String> {
        let mut config_path = None;
        let mut force = false;

        for arg in std::env::args().skip(1) {
            match arg.as_str() {
                "--force" => force = true,
                "--help" | "-h" => return Err(usage()),
                other if other.starts_with('-') => {
                    return Err(format!("unknown option '{}'\n{}", other, usage()));
                }
                other => {
                    if config_path.replace(other.to_string()).is_some() {
                        return Err(format!("more than one config path given\n{}", usage()));
                    }
                }
            }
        }

        let config_path = config_path
            .or_else(|| std::env::var("IPUP_CONFIG").ok())
            .unwrap_or_else(|| "config.json".to_string());

        Ok(Self { config_path, force })
    }
}

fn usage() -> String {
    "usage: ipup [--force] [config-path]".to_string()
}

fn main() -> ExitCode {
    let args = match CliArgs::parse() {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}", msg);
            return IpupExitCode::ConfigError.into();
        }
    };

    // Load and validate configuration before anything else
    let mut config = match IpupConfig::load(&args.config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("configuration error: {}", e);
            return IpupExitCode::ConfigError.into();
        }
    };
    if let Err(e) = config.validate() {
        eprintln!("configuration validation error: {}", e);
        return IpupExitCode::ConfigError.into();
    }
    config.cycle.force = config.cycle.force || args.force;

    if let Err(e) = init_tracing(&config) {
        eprintln!("failed to initialize logging: {}", e);
        return IpupExitCode::ConfigError.into();
    }

    info!(config = %args.config_path, "ipup starting");

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to create tokio runtime: {}", e);
            return IpupExitCode::RuntimeError.into();
        }
    };

    match rt.block_on(run_cycle(config)) {
        Ok(outcome) => {
            match outcome {
                CycleOutcome::Published { ip, previous_ip } => {
                    info!(%ip, previous = ?previous_ip, "cycle finished: published");
                }
                CycleOutcome::Unchanged { ip } => {
                    info!(%ip, "cycle finished: address unchanged");
                }
            }
            IpupExitCode::CleanRun.into()
        }
        Err(e) => {
            error!(error = %e, "cycle aborted");
            IpupExitCode::from(&e).into()
        }
    }
}

/// Initialize the tracing subscriber from the log config
fn init_tracing(config: &IpupConfig) -> anyhow::Result<()> {
    let level = match config.log.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    match &config.log.path {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| anyhow::anyhow!("failed to open log file {}: {}", path, e))?;
            let subscriber = FmtSubscriber::builder()
                .with_max_level(level)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
        None => {
            let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }

    Ok(())
}

/// Wire components from configuration and run one cycle
async fn run_cycle(config: IpupConfig) -> ipup_core::Result<CycleOutcome> {
    // Hold the advisory lock for the whole cycle when configured; it is
    // released on drop at every exit path
    let _lock = match &config.cycle.lock_path {
        Some(path) => Some(CycleLock::acquire(path)?),
        None => None,
    };

    let registry = ComponentRegistry::new();

    #[cfg(feature = "http-resolver")]
    ipup_resolver_http::register(&registry);

    #[cfg(feature = "http-publisher")]
    ipup_publisher_http::register(&registry);

    registry.register_state_store("file", Box::new(ipup_core::state::FileStateStoreFactory));
    registry.register_state_store("memory", Box::new(ipup_core::state::MemoryStateStoreFactory));

    let resolver = registry.create_resolver(&config.resolver)?;
    let publisher = registry.create_publisher(&config.publisher)?;
    let state_store = registry.create_state_store(&config.state_store)?;

    info!(
        resolver = config.resolver.type_name(),
        publisher = config.publisher.type_name(),
        state_store = config.state_store.type_name(),
        "components wired"
    );

    // Keep the event receiver alive for the duration of the run so emitted
    // events are never sent into a closed channel
    let (controller, _events) =
        CycleController::new(resolver, publisher, state_store, &config.cycle)?;

    controller.run_once().await
}
