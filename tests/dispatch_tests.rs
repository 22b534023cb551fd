//! # End-to-End Dispatch Tests
//!
//! Drive the standard three-channel dispatcher with fake platform
//! collaborators and check what each one received.

use boleta::dispatch::{
    Broadcast, Broadcaster, ChannelDispatcher, Platform, PrintSpooler, SpoolDocument,
};
use boleta::printer::{DispatchConfig, PrinterConfig};
use boleta::receipt::{CommandBuilder, ReceiptJob};
use boleta::transport::{DeviceFs, DeviceOpener, DeviceProbe, SystemFs};
use boleta::BoletaError;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use pretty_assertions::assert_eq;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

// ============================================================================
// FAKES
// ============================================================================

#[derive(Default)]
struct FakeBroadcaster {
    sent: Mutex<Vec<Broadcast>>,
    fail: bool,
}

impl Broadcaster for FakeBroadcaster {
    fn send(&self, broadcast: &Broadcast) -> Result<(), BoletaError> {
        if self.fail {
            return Err(BoletaError::Transport("broadcast refused".into()));
        }
        self.sent.lock().unwrap().push(broadcast.clone());
        Ok(())
    }
}

#[derive(Default)]
struct FakeSpooler {
    submitted: Mutex<Vec<SpoolDocument>>,
    fail: bool,
}

impl PrintSpooler for FakeSpooler {
    fn submit(&self, document: SpoolDocument) -> Result<(), BoletaError> {
        if self.fail {
            return Err(BoletaError::Spooler("print service unavailable".into()));
        }
        self.submitted.lock().unwrap().push(document);
        Ok(())
    }
}

/// A single device node at a fixed path.
#[derive(Default)]
struct FakeDevice {
    path: Option<PathBuf>,
    written: Arc<Mutex<Vec<u8>>>,
}

struct Sink(Arc<Mutex<Vec<u8>>>);

impl Write for Sink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl DeviceFs for FakeDevice {
    fn exists(&self, path: &Path) -> bool {
        self.path.as_deref() == Some(path)
    }
}

impl DeviceOpener for FakeDevice {
    fn open(&self, _path: &Path) -> Result<Box<dyn Write + Send>, BoletaError> {
        Ok(Box::new(Sink(self.written.clone())))
    }
}

struct Fixture {
    broadcaster: Arc<FakeBroadcaster>,
    spooler: Arc<FakeSpooler>,
    device: Arc<FakeDevice>,
}

impl Fixture {
    fn working() -> Self {
        Self {
            broadcaster: Arc::new(FakeBroadcaster::default()),
            spooler: Arc::new(FakeSpooler::default()),
            device: Arc::new(FakeDevice {
                path: Some(PathBuf::from("/dev/ttyUSB0")),
                ..Default::default()
            }),
        }
    }

    fn broken() -> Self {
        Self {
            broadcaster: Arc::new(FakeBroadcaster {
                fail: true,
                ..Default::default()
            }),
            spooler: Arc::new(FakeSpooler {
                fail: true,
                ..Default::default()
            }),
            device: Arc::new(FakeDevice::default()),
        }
    }

    fn dispatcher(&self) -> ChannelDispatcher {
        let platform = Platform {
            broadcaster: self.broadcaster.clone(),
            spooler: self.spooler.clone(),
            device_fs: self.device.clone(),
            opener: self.device.clone(),
        };
        ChannelDispatcher::standard(&DispatchConfig::default(), PrinterConfig::default(), platform)
    }

    fn device_bytes(&self) -> Vec<u8> {
        self.device.written.lock().unwrap().clone()
    }
}

fn png_logo() -> Vec<u8> {
    let image = RgbImage::from_fn(64, 64, |x, _| {
        if x < 32 { Rgb([0, 0, 0]) } else { Rgb([255, 255, 255]) }
    });
    let mut out = Vec::new();
    DynamicImage::ImageRgb8(image)
        .write_to(&mut Cursor::new(&mut out), ImageFormat::Png)
        .unwrap();
    out
}

// ============================================================================
// TESTS
// ============================================================================

#[test]
fn test_text_receipt_bytes() {
    let command = CommandBuilder::default().build(&ReceiptJob::new("TOTAL: 50.00\n"));

    let mut expected = vec![0x1B, 0x40];
    expected.extend(b"TOTAL: 50.00\n");
    expected.extend([0x1D, 0x56, 0x00]);
    assert_eq!(command.into_bytes(), expected);
}

#[test]
fn test_logo_receipt_layout() {
    let command = CommandBuilder::default().build(&ReceiptJob::new("OK\n").with_logo(png_logo()));
    let bytes = command.into_bytes();

    // init + header + 48 bytes x 384 rows + blank lines + text + cut
    assert_eq!(bytes.len(), 2 + 8 + 48 * 384 + 2 + 3 + 3);
    assert_eq!(&bytes[..10], &[0x1Bu8, 0x40, 0x1D, 0x76, 0x30, 0x00, 48, 0, 0x80, 0x01]);
    // Left half of the logo is black
    assert_eq!(bytes[10], 0xFF);
    assert_eq!(bytes[10 + 47], 0x00);
    assert_eq!(&bytes[bytes.len() - 8..], b"\n\nOK\n\x1D\x56\x00");
}

#[test]
fn test_all_channels_deliver() {
    let fixture = Fixture::working();
    let job = ReceiptJob::new("TOTAL: 50.00\n").with_logo(png_logo());

    let report = fixture.dispatcher().print(&job);

    assert!(report.completed);
    assert_eq!(
        report.results.iter().map(|r| r.channel).collect::<Vec<_>>(),
        vec!["broadcast", "print-service", "raw-device"]
    );
    assert!(report.results.iter().all(|r| r.succeeded));

    let sent = fixture.broadcaster.sent.lock().unwrap();
    assert_eq!(sent[0].extras["PRINT_TEXT"], "TOTAL: 50.00\n");

    let submitted = fixture.spooler.submitted.lock().unwrap();
    assert_eq!(submitted[0].title, "BATRASCO Receipt");
    assert!(submitted[0].html.contains("data:image/png;base64,"));

    assert_eq!(
        fixture.device_bytes(),
        CommandBuilder::default().build(&job).into_bytes()
    );
}

#[test]
fn test_every_channel_failing_still_completes() {
    let fixture = Fixture::broken();

    let report = fixture.dispatcher().print(&ReceiptJob::new("TOTAL: 50.00\n"));

    assert!(report.completed);
    assert_eq!(report.results.len(), 3);
    assert!(report.results.iter().all(|r| r.attempted && !r.succeeded));
    assert!(report.results[2]
        .error
        .as_deref()
        .unwrap()
        .contains("No printer device found"));
    assert!(fixture.dispatcher().print_receipt(&ReceiptJob::new("again")));
}

#[test]
fn test_corrupt_logo_prints_text_only() {
    let fixture = Fixture::working();
    let job = ReceiptJob::new("Fare 25.00\n").with_logo(b"\x89PNG garbage".to_vec());

    let report = fixture.dispatcher().print(&job);

    assert!(report.results.iter().all(|r| r.succeeded));
    assert!(!fixture.spooler.submitted.lock().unwrap()[0].html.contains("<img"));
    assert_eq!(
        fixture.device_bytes(),
        CommandBuilder::default()
            .build(&ReceiptJob::new("Fare 25.00\n"))
            .into_bytes()
    );
}

#[test]
fn test_probe_prefers_earlier_candidates() {
    let dir = tempfile::tempdir().unwrap();
    let candidates: Vec<PathBuf> = ["ttyS1", "ttyS0", "ttyUSB0", "lp0"]
        .iter()
        .map(|name| dir.path().join(name))
        .collect();
    let probe = DeviceProbe::with_fs(candidates.clone(), Arc::new(SystemFs));

    assert_eq!(probe.find_device(), None);

    std::fs::write(&candidates[3], b"").unwrap();
    std::fs::write(&candidates[2], b"").unwrap();
    assert_eq!(probe.find_device(), Some(candidates[2].clone()));

    std::fs::write(&candidates[0], b"").unwrap();
    assert_eq!(probe.find_device(), Some(candidates[0].clone()));
}
