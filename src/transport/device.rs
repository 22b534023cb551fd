//! # Raw Device Transport
//!
//! Writes command bytes straight to a printer's character device
//! (`/dev/ttyS*`, `/dev/ttyUSB*`, `/dev/usb/lp*`).
//!
//! ## TTY Configuration
//!
//! Serial nodes are switched to raw mode before writing so binary raster data
//! passes through unmodified:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR,
//!   ICRNL, IXON, IXOFF, IXANY cleared
//! - **No output processing**: OPOST cleared (no LF to CRLF translation)
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ECHO, ECHONL, ICANON, ISIG, IEXTEN cleared
//!
//! Nodes are opened with O_NOCTTY so a serial port never becomes the
//! process's controlling terminal, and with O_NONBLOCK so the open does not
//! wait for carrier detect on a port with no modem lines wired. Blocking mode
//! is restored once the port is configured, so writes still drain fully.
//!
//! USB line-printer nodes are not TTYs and are written as plain files.
//!
//! ## Scoped Acquisition
//!
//! [`SinkGuard`] owns an open sink for the duration of one print. It flushes
//! on the success path through [`SinkGuard::finish`] and again, best-effort,
//! when dropped on an error path. The handle is closed exactly once when the
//! guard goes out of scope.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::BoletaError;

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Opens a writable sink for a device path.
pub trait DeviceOpener: Send + Sync {
    fn open(&self, path: &Path) -> Result<Box<dyn Write + Send>, BoletaError>;
}

/// Opens real device nodes as [`DeviceTransport`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemOpener;

impl DeviceOpener for SystemOpener {
    fn open(&self, path: &Path) -> Result<Box<dyn Write + Send>, BoletaError> {
        Ok(Box::new(DeviceTransport::open(path)?))
    }
}

/// # Character Device Transport
///
/// ```no_run
/// use boleta::transport::DeviceTransport;
/// use boleta::protocol::commands;
/// use std::io::Write;
///
/// let mut transport = DeviceTransport::open("/dev/usb/lp0")?;
/// transport.write_all(&commands::init())?;
/// transport.flush()?;
/// # Ok::<(), boleta::BoletaError>(())
/// ```
pub struct DeviceTransport {
    file: File,
    chunk_size: usize,
}

impl DeviceTransport {
    /// Open a device node for writing.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the dialout or lp group)
    /// - The node is a TTY and raw-mode configuration fails
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, BoletaError> {
        let path = device.as_ref();

        let file = open_options().open(path).map_err(|e| {
            BoletaError::Transport(format!("Failed to open {}: {}", path.display(), e))
        })?;

        if is_tty(&file) {
            configure_tty_raw(&file)?;
        }
        clear_nonblocking(&file)?;

        debug!(path = %path.display(), "opened printer device");
        Ok(Self {
            file,
            chunk_size: CHUNK_SIZE,
        })
    }

    /// Set the chunk size for large writes. Default is 4096 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }
}

impl Write for DeviceTransport {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let end = buf.len().min(self.chunk_size);
        self.file.write(&buf[..end])
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

// ============================================================================
// SCOPED SINK
// ============================================================================

/// Owns an open sink for one print and guarantees it is flushed and closed.
pub struct SinkGuard {
    sink: Box<dyn Write + Send>,
    finished: bool,
}

impl SinkGuard {
    pub fn new(sink: Box<dyn Write + Send>) -> Self {
        Self {
            sink,
            finished: false,
        }
    }

    /// Write the whole buffer.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), BoletaError> {
        self.sink
            .write_all(data)
            .map_err(|e| BoletaError::Transport(format!("Write failed: {}", e)))
    }

    /// Flush and mark the sink as cleanly finished.
    pub fn finish(mut self) -> Result<(), BoletaError> {
        self.finished = true;
        self.sink
            .flush()
            .map_err(|e| BoletaError::Transport(format!("Flush failed: {}", e)))
    }
}

impl Drop for SinkGuard {
    fn drop(&mut self) {
        if !self.finished
            && let Err(e) = self.sink.flush()
        {
            warn!(error = %e, "flush on abandoned printer sink failed");
        }
    }
}

// ============================================================================
// TTY HELPERS
// ============================================================================

#[cfg(unix)]
fn open_options() -> OpenOptions {
    use std::os::unix::fs::OpenOptionsExt;

    let mut options = OpenOptions::new();
    options
        .write(true)
        .custom_flags(libc::O_NOCTTY | libc::O_NONBLOCK);
    options
}

#[cfg(not(unix))]
fn open_options() -> OpenOptions {
    let mut options = OpenOptions::new();
    options.write(true);
    options
}

/// Put the descriptor back into blocking mode after a non-blocking open.
#[cfg(unix)]
fn clear_nonblocking(file: &File) -> Result<(), BoletaError> {
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();

    let flags = unsafe { libc::fcntl(fd, libc::F_GETFL) };
    if flags < 0 {
        return Err(BoletaError::Transport(format!(
            "fcntl(F_GETFL) failed: {}",
            io::Error::last_os_error()
        )));
    }

    let result = unsafe { libc::fcntl(fd, libc::F_SETFL, flags & !libc::O_NONBLOCK) };
    if result < 0 {
        return Err(BoletaError::Transport(format!(
            "fcntl(F_SETFL) failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn clear_nonblocking(_file: &File) -> Result<(), BoletaError> {
    Ok(())
}

#[cfg(unix)]
fn is_tty(file: &File) -> bool {
    use std::os::unix::io::AsRawFd;

    unsafe { libc::isatty(file.as_raw_fd()) == 1 }
}

#[cfg(not(unix))]
fn is_tty(_file: &File) -> bool {
    false
}

/// Configure a TTY for raw binary output.
///
/// IXON/IXOFF/IXANY must be cleared: 0x11 (XON) and 0x13 (XOFF) can appear
/// in raster data.
#[cfg(unix)]
fn configure_tty_raw(file: &File) -> Result<(), BoletaError> {
    use std::mem::MaybeUninit;
    use std::os::unix::io::AsRawFd;

    let fd = file.as_raw_fd();

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(BoletaError::Transport(format!(
            "tcgetattr failed: {}",
            io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(BoletaError::Transport(format!(
            "tcsetattr failed: {}",
            io::Error::last_os_error()
        )));
    }

    Ok(())
}

#[cfg(not(unix))]
fn configure_tty_raw(_file: &File) -> Result<(), BoletaError> {
    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
