//! Linux sysfs GPIO lines exposed through the embedded-hal digital traits

use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;
use std::thread;
use std::time::Duration;

use embedded_hal::digital::{self, ErrorKind, ErrorType, InputPin, OutputPin};
use tracing::debug;

pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// udev may take a moment to publish a freshly exported line
const EXPORT_RETRIES: u32 = 20;
const EXPORT_RETRY_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    fn as_sysfs(self) -> &'static str {
        match self {
            Direction::In => "in",
            Direction::Out => "low",
        }
    }
}

#[derive(Debug)]
pub struct GpioError {
    pub pin: u32,
    pub source: io::Error,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gpio{}: {}", self.pin, self.source)
    }
}

impl std::error::Error for GpioError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl digital::Error for GpioError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One exported GPIO line; the value file stays open for fast polling
#[derive(Debug)]
pub struct SysfsPin {
    number: u32,
    value: File,
}

impl SysfsPin {
    pub fn open(number: u32, direction: Direction) -> Result<Self, GpioError> {
        Self::open_in(Path::new(SYSFS_GPIO_ROOT), number, direction)
    }

    /// Export `number` under `root` and configure its direction.
    /// Outputs start low.
    pub fn open_in(root: &Path, number: u32, direction: Direction) -> Result<Self, GpioError> {
        let err = |source| GpioError { pin: number, source };
        let pin_dir = root.join(format!("gpio{number}"));

        if !pin_dir.exists() {
            fs::write(root.join("export"), number.to_string()).map_err(err)?;
            wait_for(&pin_dir).map_err(err)?;
        }

        fs::write(pin_dir.join("direction"), direction.as_sysfs()).map_err(err)?;

        let value = OpenOptions::new()
            .read(true)
            .write(direction == Direction::Out)
            .open(pin_dir.join("value"))
            .map_err(err)?;

        debug!("gpio{} opened as {:?}", number, direction);
        Ok(Self { number, value })
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    fn read_level(&mut self) -> Result<bool, GpioError> {
        let mut buf = [0u8; 1];
        self.value
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.value.read_exact(&mut buf))
            .map_err(|source| GpioError { pin: self.number, source })?;
        Ok(buf[0] == b'1')
    }

    fn write_level(&mut self, high: bool) -> Result<(), GpioError> {
        let level: &[u8] = if high { b"1" } else { b"0" };
        self.value
            .seek(SeekFrom::Start(0))
            .and_then(|_| self.value.write_all(level))
            .and_then(|_| self.value.flush())
            .map_err(|source| GpioError { pin: self.number, source })
    }
}

fn wait_for(path: &Path) -> io::Result<()> {
    for _ in 0..EXPORT_RETRIES {
        if path.exists() {
            return Ok(());
        }
        thread::sleep(EXPORT_RETRY_INTERVAL);
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("{} did not appear after export", path.display()),
    ))
}

impl ErrorType for SysfsPin {
    type Error = GpioError;
}

impl InputPin for SysfsPin {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.read_level()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.read_level().map(|high| !high)
    }
}

impl OutputPin for SysfsPin {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.write_level(false)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.write_level(true)
    }
}
