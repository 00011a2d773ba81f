//! Transcoding through an external command-line converter.
//!
//! Used for GIMP's XCF files, which are converted to PNG by `xcf2png` from
//! xcftools. Both the presence probe and the conversion block the calling
//! thread, bounded by a timeout after which the child is killed.

use super::backend::{ConversionTool, ImageResult, ReaderError};
use super::intermediate::IntermediateStore;
use super::params::ViewParams;
use super::raster::RasterDecoder;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A converter invoked through `sh -c`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellTool {
    /// Executable name, looked up on `PATH`.
    pub program: String,
    /// Package that provides the executable, named in "not found" errors.
    pub package: String,
    pub timeout: Duration,
}

impl ShellTool {
    /// `xcf2png` from xcftools.
    pub fn xcf2png(timeout: Duration) -> Self {
        Self {
            program: "xcf2png".to_string(),
            package: "xcftools".to_string(),
            timeout,
        }
    }

    /// The shell command converting `source` into `destination`.
    pub fn conversion_command(&self, source: &Path, destination: &Path) -> String {
        format!(
            "{} {} -o {}",
            self.program,
            shell_quote(&source.to_string_lossy()),
            shell_quote(&destination.to_string_lossy())
        )
    }
}

impl ConversionTool for ShellTool {
    fn package(&self) -> &str {
        &self.package
    }

    fn is_available(&self) -> Result<bool, ReaderError> {
        let child = Command::new("sh")
            .arg("-c")
            .arg(format!("command -v {}", shell_quote(&self.program)))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ReaderError::ExternalConversionFailed {
                tool: "sh".to_string(),
                detail: e.to_string(),
            })?;
        wait_with_timeout(child, &self.program, self.timeout)
    }

    fn convert(&self, source: &Path, destination: &Path) -> Result<(), ReaderError> {
        let command = self.conversion_command(source, destination);
        log::debug!("running: {command}");
        let child = Command::new("sh")
            .arg("-c")
            .arg(&command)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| ReaderError::ExternalConversionFailed {
                tool: self.program.clone(),
                detail: e.to_string(),
            })?;
        let succeeded = wait_with_timeout(child, &self.program, self.timeout)?;
        if !succeeded {
            log::debug!("{} exited unsuccessfully", self.program);
        }
        Ok(())
    }
}

/// Wait for `child`, killing it once `timeout` has passed.
///
/// Returns whether the child exited successfully.
fn wait_with_timeout(
    mut child: Child,
    tool: &str,
    timeout: Duration,
) -> Result<bool, ReaderError> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status.success());
        }
        if Instant::now() >= deadline {
            if let Err(e) = child.kill() {
                log::warn!("failed to kill {tool}: {e}");
            }
            let _ = child.wait();
            return Err(ReaderError::ToolTimeout {
                tool: tool.to_string(),
                seconds: timeout.as_secs(),
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// Single-quote `s` for POSIX shells.
fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', r"'\''"))
}

/// Converts through a [`ConversionTool`] and reads the resulting PNG.
pub struct ExternalToolTranscoder {
    tool: Box<dyn ConversionTool>,
    intermediates: IntermediateStore,
    raster: RasterDecoder,
}

impl ExternalToolTranscoder {
    pub fn new(tool: Box<dyn ConversionTool>, intermediates: IntermediateStore) -> Self {
        Self {
            tool,
            intermediates,
            raster: RasterDecoder::new(),
        }
    }

    pub fn read(&self, path: &Path, view: &ViewParams) -> Result<ImageResult, ReaderError> {
        if !self.tool.is_available()? {
            return Err(ReaderError::ToolNotFound(self.tool.package().to_string()));
        }

        let intermediate = self.intermediates.create()?;
        if let Err(e) = self.tool.convert(path, intermediate.path()) {
            intermediate.finish();
            return Err(e);
        }

        // a failed conversion leaves an empty PNG, which fails to decode here
        let result = self.raster.read(intermediate.path(), view);
        intermediate.finish();
        result
    }
}
