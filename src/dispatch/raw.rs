//! Raw-device channel.
//!
//! Probes for an attached printer node, opens it for the duration of one
//! print, writes the ESC/POS command stream and flushes. At most one device
//! is written per call: the first candidate that exists.

use std::sync::Arc;

use tracing::info;

use super::Channel;
use crate::error::BoletaError;
use crate::receipt::{CommandBuilder, ReceiptJob};
use crate::transport::{DeviceOpener, DeviceProbe, SinkGuard};

/// Channel 3: write ESC/POS bytes straight to a printer device.
pub struct RawDeviceChannel {
    probe: DeviceProbe,
    opener: Arc<dyn DeviceOpener>,
    builder: CommandBuilder,
}

impl RawDeviceChannel {
    pub fn new(probe: DeviceProbe, opener: Arc<dyn DeviceOpener>, builder: CommandBuilder) -> Self {
        Self {
            probe,
            opener,
            builder,
        }
    }
}

impl Channel for RawDeviceChannel {
    fn name(&self) -> &'static str {
        "raw-device"
    }

    fn attempt(&self, job: &ReceiptJob) -> Result<(), BoletaError> {
        let path = self.probe.find_device().ok_or_else(|| {
            BoletaError::Transport(format!(
                "No printer device found (checked {} candidates)",
                self.probe.candidates().len()
            ))
        })?;

        let mut sink = SinkGuard::new(self.opener.open(&path)?);
        let command = self.builder.build(job);
        sink.write_all(command.as_ref())?;
        sink.finish()?;

        info!(path = %path.display(), bytes = command.len(), "wrote receipt to device");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::DeviceFs;
    use std::collections::HashMap;
    use std::io::{self, Write};
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    /// A fake `/dev` where each node records what was written to it.
    #[derive(Default)]
    struct FakeDev {
        nodes: Mutex<HashMap<PathBuf, Arc<Mutex<Vec<u8>>>>>,
        fail_after: Option<usize>,
    }

    impl FakeDev {
        fn with_nodes(paths: &[&str]) -> Self {
            let dev = Self::default();
            for path in paths {
                dev.nodes
                    .lock()
                    .unwrap()
                    .insert(PathBuf::from(path), Arc::new(Mutex::new(Vec::new())));
            }
            dev
        }

        fn written(&self, path: &str) -> Vec<u8> {
            self.nodes.lock().unwrap()[Path::new(path)].lock().unwrap().clone()
        }
    }

    impl DeviceFs for FakeDev {
        fn exists(&self, path: &Path) -> bool {
            self.nodes.lock().unwrap().contains_key(path)
        }
    }

    struct Node {
        buf: Arc<Mutex<Vec<u8>>>,
        fail_after: Option<usize>,
    }

    impl Write for Node {
        fn write(&mut self, data: &[u8]) -> io::Result<usize> {
            let mut buf = self.buf.lock().unwrap();
            if let Some(limit) = self.fail_after
                && buf.len() + data.len() > limit
            {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "printer unplugged"));
            }
            buf.extend_from_slice(data);
            Ok(data.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl DeviceOpener for FakeDev {
        fn open(&self, path: &Path) -> Result<Box<dyn Write + Send>, BoletaError> {
            let buf = self
                .nodes
                .lock()
                .unwrap()
                .get(path)
                .cloned()
                .ok_or_else(|| BoletaError::Transport(format!("{} vanished", path.display())))?;
            Ok(Box::new(Node {
                buf,
                fail_after: self.fail_after,
            }))
        }
    }

    fn channel(dev: Arc<FakeDev>) -> RawDeviceChannel {
        let candidates = ["/dev/ttyS1", "/dev/ttyS0", "/dev/ttyUSB0", "/dev/usb/lp0"]
            .iter()
            .map(PathBuf::from)
            .collect();
        RawDeviceChannel::new(
            DeviceProbe::with_fs(candidates, dev.clone()),
            dev,
            CommandBuilder::default(),
        )
    }

    #[test]
    fn test_writes_only_first_existing_device() {
        let dev = Arc::new(FakeDev::with_nodes(&["/dev/ttyUSB0", "/dev/usb/lp0"]));
        channel(dev.clone())
            .attempt(&ReceiptJob::new("TOTAL: 50.00\n"))
            .unwrap();

        let mut expected = vec![0x1B, 0x40];
        expected.extend(b"TOTAL: 50.00\n");
        expected.extend([0x1D, 0x56, 0x00]);
        assert_eq!(dev.written("/dev/ttyUSB0"), expected);
        assert!(dev.written("/dev/usb/lp0").is_empty());
    }

    #[test]
    fn test_no_device_is_an_error() {
        let dev = Arc::new(FakeDev::default());
        let err = channel(dev).attempt(&ReceiptJob::new("x")).unwrap_err();
        assert!(err.to_string().contains("No printer device found"));
    }

    #[test]
    fn test_partial_write_is_an_error() {
        let mut dev = FakeDev::with_nodes(&["/dev/ttyS0"]);
        dev.fail_after = Some(4);
        let err = channel(Arc::new(dev))
            .attempt(&ReceiptJob::new("a long receipt body"))
            .unwrap_err();
        assert!(matches!(err, BoletaError::Transport(_)));
    }
}
