//! # Boleta CLI
//!
//! Command-line interface for conductor-device receipt printing.
//!
//! ## Usage
//!
//! ```bash
//! # Print a receipt over every channel
//! boleta print receipt.txt --logo logo.png
//!
//! # Print from stdin
//! printf 'TOTAL: 50.00\n' | boleta print -
//!
//! # Write the raw ESC/POS stream to a file instead of printing
//! boleta encode receipt.txt --out receipt.bin
//!
//! # Show which printer node would be used
//! boleta probe
//!
//! # Run the HTTP API
//! boleta serve --listen 127.0.0.1:8080
//!
//! # Monitoring lifecycle (call `boot` from an init script)
//! boleta monitor start
//! boleta monitor boot
//! ```

use clap::{Args, Parser, Subcommand};
use std::io::Read;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use boleta::{
    BoletaError, PrinterConfig,
    dispatch::Platform,
    lifecycle::{Lifecycle, LoggingService},
    logging,
    printer::DispatchConfig,
    server::{self, AppState, ServerConfig},
    service::PrinterService,
    transport::DeviceProbe,
};

/// Boleta - receipt printing for conductor devices
#[derive(Parser, Debug)]
#[command(name = "boleta")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    dispatch: DispatchArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every command that prints.
#[derive(Args, Debug)]
struct DispatchArgs {
    /// Printer device node to probe (repeatable; replaces the default list)
    #[arg(long = "device", env = "BOLETA_DEVICES", value_delimiter = ',', global = true)]
    devices: Vec<PathBuf>,

    /// Job title used for the print spooler
    #[arg(long, env = "BOLETA_TITLE", global = true)]
    title: Option<String>,

    /// Address the print broadcast is sent to
    #[arg(
        long,
        env = "BOLETA_BROADCAST_ADDR",
        default_value = "255.255.255.255:9450",
        global = true
    )]
    broadcast_addr: SocketAddr,

    /// Monitoring state file
    #[arg(
        long,
        env = "BOLETA_STATE_FILE",
        default_value = "/var/lib/boleta/monitoring.json",
        global = true
    )]
    state_file: PathBuf,
}

impl DispatchArgs {
    fn config(&self) -> DispatchConfig {
        let mut config = DispatchConfig::default();
        if !self.devices.is_empty() {
            config.device_candidates = self.devices.clone();
        }
        if let Some(title) = &self.title {
            config.job_title = title.clone();
        }
        config
    }

    fn service(&self) -> PrinterService {
        let config = self.config();
        let platform = Platform::system_with(self.broadcast_addr, &config);
        PrinterService::new(&config, PrinterConfig::default(), platform)
    }

    fn lifecycle(&self) -> Lifecycle {
        Lifecycle::new(Arc::new(LoggingService), self.state_file.clone())
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print a receipt over every channel
    Print {
        /// Receipt text file, or `-` for stdin
        file: PathBuf,

        /// Logo image printed above the text
        #[arg(long, value_name = "FILE")]
        logo: Option<PathBuf>,
    },

    /// Write the raw-device byte stream to a file
    Encode {
        /// Receipt text file, or `-` for stdin
        file: PathBuf,

        /// Logo image printed above the text
        #[arg(long, value_name = "FILE")]
        logo: Option<PathBuf>,

        /// Output file
        #[arg(long, value_name = "FILE")]
        out: PathBuf,
    },

    /// Show the printer device the raw channel would use
    Probe,

    /// Run the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, env = "BOLETA_LISTEN", default_value = "127.0.0.1:8080")]
        listen: String,
    },

    /// Control the location monitoring service
    Monitor {
        #[command(subcommand)]
        action: MonitorAction,
    },
}

#[derive(Subcommand, Debug)]
enum MonitorAction {
    /// Start monitoring and remember it across reboots
    Start,
    /// Stop monitoring
    Stop,
    /// Show the persisted monitoring state
    Status,
    /// Restart monitoring if it was on before the reboot
    Boot,
}

fn main() {
    if let Err(e) = logging::init() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), BoletaError> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Print { file, logo } => {
            let content = read_content(&file)?;
            let logo = logo.as_deref().map(std::fs::read).transpose()?;

            let report = cli.dispatch.service().print(Some(&content), logo)?;
            for result in &report.results {
                match &result.error {
                    None => println!("{:<14} ok", result.channel),
                    Some(e) => println!("{:<14} failed: {}", result.channel, e),
                }
            }
            if !report.completed {
                return Err(BoletaError::Orchestration(
                    report.error.unwrap_or_else(|| "dispatch aborted".to_string()),
                ));
            }
        }

        Commands::Encode { file, logo, out } => {
            let content = read_content(&file)?;
            let logo = logo.as_deref().map(std::fs::read).transpose()?;

            let command = cli.dispatch.service().encode(Some(&content), logo)?;
            std::fs::write(&out, command.as_ref())?;
            println!("Wrote {} bytes to {}", command.len(), out.display());
        }

        Commands::Probe => {
            let probe = DeviceProbe::new(cli.dispatch.config().device_candidates);
            match probe.find_device() {
                Some(path) => println!("{}", path.display()),
                None => {
                    return Err(BoletaError::Transport(format!(
                        "No printer device found (checked {})",
                        probe
                            .candidates()
                            .iter()
                            .map(|p| p.display().to_string())
                            .collect::<Vec<_>>()
                            .join(", ")
                    )));
                }
            }
        }

        Commands::Serve { listen } => {
            let state = AppState::new(cli.dispatch.service(), cli.dispatch.lifecycle());
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(ServerConfig { listen_addr: listen }, state))?;
        }

        Commands::Monitor { action } => {
            let lifecycle = cli.dispatch.lifecycle();
            match action {
                MonitorAction::Start => {
                    lifecycle.start()?;
                    println!("Monitoring started");
                }
                MonitorAction::Stop => {
                    lifecycle.stop()?;
                    println!("Monitoring stopped");
                }
                MonitorAction::Status => {
                    let state = lifecycle.state()?;
                    println!(
                        "{}",
                        if state.is_monitoring { "monitoring" } else { "idle" }
                    );
                }
                MonitorAction::Boot => {
                    if lifecycle.on_boot()? {
                        println!("Monitoring restarted");
                    }
                }
            }
        }
    }

    Ok(())
}

/// Read receipt text from a file, or stdin for `-`.
fn read_content(path: &Path) -> Result<String, BoletaError> {
    if path == Path::new("-") {
        let mut content = String::new();
        std::io::stdin().read_to_string(&mut content)?;
        Ok(content)
    } else {
        Ok(std::fs::read_to_string(path)?)
    }
}
