use std::path::PathBuf;
use std::process::Command;

use super::EncodeError;

/// Frames to assemble into a video, in playback order.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodeRequest {
    pub frames: Vec<PathBuf>,
    /// printf-style pattern matching every frame, e.g. `job/frame_%04d.png`.
    pub pattern: PathBuf,
    pub start_number: usize,
    pub fps: u32,
    pub output: PathBuf,
}

pub trait VideoEncoder: Send + Sync {
    fn name(&self) -> &str;
    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError>;
}

/// Runs an external `ffmpeg` to produce an H.264 video.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    program: PathBuf,
    extra_args: Vec<String>,
}

impl Default for FfmpegEncoder {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

impl FfmpegEncoder {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            extra_args: Vec::new(),
        }
    }

    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn command(&self, request: &EncodeRequest) -> Command {
        let mut command = Command::new(&self.program);
        command
            .arg("-y")
            .args(["-loglevel", "error"])
            .arg("-framerate")
            .arg(request.fps.to_string())
            .arg("-start_number")
            .arg(request.start_number.to_string())
            .arg("-i")
            .arg(&request.pattern)
            .arg("-frames:v")
            .arg(request.frames.len().to_string())
            .args(["-vf", "scale=trunc(iw/2)*2:trunc(ih/2)*2"])
            .args(["-pix_fmt", "yuv420p"])
            .args(&self.extra_args)
            .arg(&request.output);
        command
    }
}

impl VideoEncoder for FfmpegEncoder {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    fn encode(&self, request: &EncodeRequest) -> Result<(), EncodeError> {
        if request.frames.is_empty() {
            return Err(EncodeError::NoFrames);
        }
        let program = self.program.display().to_string();
        let output = self
            .command(request)
            .output()
            .map_err(|source| EncodeError::Unavailable {
                program: program.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(EncodeError::Failed {
                program,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        log::info!(
            "encoded {} frames into {}",
            request.frames.len(),
            request.output.display()
        );
        Ok(())
    }
}
