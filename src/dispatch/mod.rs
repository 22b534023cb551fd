//! # Multi-Channel Dispatch
//!
//! The printer hardware on a conductor device is not known at build time,
//! so every receipt is sent down three independent channels, in order:
//!
//! | # | Channel | Reaches | Waits for completion |
//! |---|---------|---------|----------------------|
//! | 1 | [`broadcast`] | Any installed companion print app | No |
//! | 2 | [`spool`] | The OS print spooler | No |
//! | 3 | [`raw`] | A serial/USB thermal printer node | Yes (blocking write) |
//!
//! Every channel runs even when an earlier one succeeded: a companion app
//! and an attached printer may both be wanted, and software cannot tell
//! whether paper actually came out.
//!
//! ## Failure Boundaries
//!
//! Each [`Channel::attempt`] runs inside its own boundary. An `Err` or a
//! panic is turned into a failed [`ChannelResult`] and the sweep moves on.
//! Only a failure outside every boundary marks the [`DispatchReport`] as
//! not completed.
//!
//! `completed` means "the sweep ran", never "a receipt was printed".
//!
//! ## Example
//!
//! ```no_run
//! use boleta::dispatch::{ChannelDispatcher, Platform};
//! use boleta::printer::{DispatchConfig, PrinterConfig};
//! use boleta::receipt::ReceiptJob;
//!
//! let dispatcher = ChannelDispatcher::standard(
//!     &DispatchConfig::default(),
//!     PrinterConfig::default(),
//!     Platform::system("255.255.255.255:9450".parse().unwrap()),
//! );
//!
//! let report = dispatcher.print(&ReceiptJob::new("TOTAL: 50.00\n"));
//! for result in &report.results {
//!     println!("{}: {}", result.channel, result.succeeded);
//! }
//! ```

pub mod broadcast;
pub mod raw;
pub mod spool;

use std::any::Any;
use std::net::SocketAddr;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, info_span, warn};

use crate::error::BoletaError;
use crate::printer::{DispatchConfig, PrinterConfig};
use crate::receipt::{CommandBuilder, ReceiptJob};
use crate::transport::{DeviceFs, DeviceOpener, DeviceProbe, SystemFs, SystemOpener};

pub use broadcast::{Broadcast, BroadcastChannel, Broadcaster, UdpBroadcaster};
pub use raw::RawDeviceChannel;
pub use spool::{CupsSpooler, PrintServiceChannel, PrintSpooler, SpoolDocument};

/// One independent delivery mechanism for a receipt.
pub trait Channel: Send + Sync {
    /// Short stable name used in logs and results.
    fn name(&self) -> &'static str;

    /// Try to deliver the job once. No retries.
    fn attempt(&self, job: &ReceiptJob) -> Result<(), BoletaError>;
}

/// Outcome of one channel for one print call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelResult {
    pub channel: &'static str,
    pub attempted: bool,
    pub succeeded: bool,
    pub error: Option<String>,
}

impl ChannelResult {
    fn pending(channel: &'static str) -> Self {
        Self {
            channel,
            attempted: false,
            succeeded: false,
            error: None,
        }
    }

    fn success(channel: &'static str) -> Self {
        Self {
            channel,
            attempted: true,
            succeeded: true,
            error: None,
        }
    }

    fn failure(channel: &'static str, error: String) -> Self {
        Self {
            channel,
            attempted: true,
            succeeded: false,
            error: Some(error),
        }
    }
}

/// Aggregate outcome of [`ChannelDispatcher::print`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// The sweep over all channels ran to the end.
    pub completed: bool,
    /// One entry per configured channel, in dispatch order.
    pub results: Vec<ChannelResult>,
    /// Set when an error escaped every channel boundary.
    pub error: Option<String>,
}

impl DispatchReport {
    /// Whether at least one channel reported success.
    pub fn any_succeeded(&self) -> bool {
        self.results.iter().any(|r| r.succeeded)
    }
}

/// Platform capabilities the standard channels need, injected so tests can
/// substitute fakes.
#[derive(Clone)]
pub struct Platform {
    pub broadcaster: Arc<dyn Broadcaster>,
    pub spooler: Arc<dyn PrintSpooler>,
    pub device_fs: Arc<dyn DeviceFs>,
    pub opener: Arc<dyn DeviceOpener>,
}

impl Platform {
    /// Real collaborators: UDP broadcast to `broadcast_addr`, CUPS spooling
    /// with default settings, the local filesystem and device nodes.
    pub fn system(broadcast_addr: SocketAddr) -> Self {
        Self::system_with(broadcast_addr, &DispatchConfig::default())
    }

    /// Real collaborators using the spool settings from `config`.
    pub fn system_with(broadcast_addr: SocketAddr, config: &DispatchConfig) -> Self {
        Self {
            broadcaster: Arc::new(UdpBroadcaster::new(broadcast_addr)),
            spooler: Arc::new(CupsSpooler::new(config.spool.clone())),
            device_fs: Arc::new(SystemFs),
            opener: Arc::new(SystemOpener),
        }
    }
}

/// Runs every channel once per receipt, each inside its own failure boundary.
pub struct ChannelDispatcher {
    channels: Vec<Box<dyn Channel>>,
}

impl ChannelDispatcher {
    /// Dispatch over an explicit, ordered channel list.
    pub fn new(channels: Vec<Box<dyn Channel>>) -> Self {
        Self { channels }
    }

    /// The standard broadcast, print-service, raw-device sequence.
    pub fn standard(config: &DispatchConfig, printer: PrinterConfig, platform: Platform) -> Self {
        let probe = DeviceProbe::with_fs(config.device_candidates.clone(), platform.device_fs);

        Self::new(vec![
            Box::new(BroadcastChannel::new(
                config.broadcast_action.clone(),
                config.broadcast_keys.clone(),
                platform.broadcaster,
            )),
            Box::new(PrintServiceChannel::new(
                config.job_title.clone(),
                printer,
                platform.spooler,
            )),
            Box::new(RawDeviceChannel::new(
                probe,
                platform.opener,
                CommandBuilder::new(printer),
            )),
        ])
    }

    /// Names of the configured channels, in dispatch order.
    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Attempt every channel once, sequentially, never short-circuiting.
    pub fn print(&self, job: &ReceiptJob) -> DispatchReport {
        let mut results: Vec<ChannelResult> = Vec::with_capacity(self.channels.len());

        let sweep = panic::catch_unwind(AssertUnwindSafe(|| {
            results.extend(self.channels.iter().map(|c| ChannelResult::pending(c.name())));
            for (channel, slot) in self.channels.iter().zip(results.iter_mut()) {
                *slot = run_isolated(channel.as_ref(), job);
            }
        }));

        let error = match sweep {
            Ok(()) => None,
            Err(payload) => {
                let err = BoletaError::Orchestration(panic_message(payload.as_ref()));
                error!(error = %err, "print dispatch aborted");
                Some(err.to_string())
            }
        };

        let report = DispatchReport {
            completed: error.is_none(),
            results,
            error,
        };
        info!(
            completed = report.completed,
            delivered = report.results.iter().filter(|r| r.succeeded).count(),
            channels = report.results.len(),
            "print dispatch finished"
        );
        report
    }

    /// The boolean form of [`print`](Self::print): true when the sweep
    /// completed, regardless of per-channel outcomes.
    pub fn print_receipt(&self, job: &ReceiptJob) -> bool {
        self.print(job).completed
    }
}

/// Run one channel, converting errors and panics into a failed result.
fn run_isolated(channel: &dyn Channel, job: &ReceiptJob) -> ChannelResult {
    let name = channel.name();
    let span = info_span!("channel", channel = name);
    let _enter = span.enter();

    match panic::catch_unwind(AssertUnwindSafe(|| channel.attempt(job))) {
        Ok(Ok(())) => {
            info!("channel delivered");
            ChannelResult::success(name)
        }
        Ok(Err(e)) => {
            let err = e.into_channel(name);
            warn!(error = %err, "channel failed");
            ChannelResult::failure(name, err.to_string())
        }
        Err(payload) => {
            let err = BoletaError::Channel {
                channel: name,
                message: format!("panicked: {}", panic_message(payload.as_ref())),
            };
            warn!(error = %err, "channel failed");
            ChannelResult::failure(name, err.to_string())
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

// ============================================================================
// TESTS
// ============================================================================
