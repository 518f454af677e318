//! Recording episodes of a policy as image sequences
use crate::agents::Policy;
use crate::envs::{parse_env_id, Environment, Frame};
use crate::RLError;
use image::ImageFormat;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the directory holding the frames of the recorded episode.
pub const EPISODE_DIR: &str = "rl-video-episode-0";

/// Video output directory name for an environment: the id without its `-vN` suffix.
pub fn video_dir(env_name: &str) -> &str {
    parse_env_id(env_name).0
}

/// Error writing a recorded episode.
#[derive(Error, Debug)]
pub enum VideoError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("failed to encode frame")]
    Image(#[from] image::ImageError),
    #[error("failed to write manifest")]
    Manifest(#[from] serde_json::Error),
}

/// Consumer of rendered frames.
pub trait FrameSink {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError>;

    /// Called once after the last frame.
    fn finish(&mut self) -> Result<(), VideoError>;
}

impl FrameSink for Vec<Frame> {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        self.push(frame.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        Ok(())
    }
}

/// Run one stochastic episode of `policy` and send a frame to `sink` after the reset and
/// after every step.
///
/// The episode stops at termination, truncation or after `max_steps` steps.
/// Returns the number of frames written, which is zero if the environment cannot render.
pub fn record_episode<E, P, S>(
    env: &mut E,
    policy: &P,
    max_steps: usize,
    sink: &mut S,
) -> Result<usize, RLError>
where
    E: Environment + ?Sized,
    P: Policy + ?Sized,
    S: FrameSink + ?Sized,
{
    let mut observation = env.reset(None);
    let frame = match env.render() {
        Some(frame) => frame,
        None => return Ok(0),
    };
    sink.write_frame(&frame)?;
    let mut num_frames = 1;

    for _ in 0..max_steps {
        let output = tch::no_grad(|| policy.sample_action(&observation))?;
        let transition = env.step(output.action)?;
        if let Some(frame) = env.render() {
            sink.write_frame(&frame)?;
            num_frames += 1;
        }
        if transition.episode_done() {
            break;
        }
        observation = transition.observation;
    }
    sink.finish()?;
    Ok(num_frames)
}

/// Metadata written alongside the frames of a recorded episode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoManifest {
    pub fps: u32,
    pub width: u32,
    pub height: u32,
    pub num_frames: usize,
}

/// Writes frames as PNG images `<dir>/rl-video-episode-0/frame-NNNNNN.png`
/// followed by a `manifest.json` in the same directory.
///
/// Directories are created when the first frame arrives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PngSequenceWriter {
    dir: PathBuf,
    fps: u32,
    num_frames: usize,
    size: Option<(u32, u32)>,
}

impl PngSequenceWriter {
    pub fn new<P: AsRef<Path>>(dir: P, fps: u32) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            fps,
            num_frames: 0,
            size: None,
        }
    }

    /// Directory holding the frames and manifest.
    pub fn episode_dir(&self) -> PathBuf {
        self.dir.join(EPISODE_DIR)
    }

    pub const fn num_frames(&self) -> usize {
        self.num_frames
    }
}

impl FrameSink for PngSequenceWriter {
    fn write_frame(&mut self, frame: &Frame) -> Result<(), VideoError> {
        let episode_dir = self.episode_dir();
        if self.num_frames == 0 {
            fs::create_dir_all(&episode_dir)?;
        }
        let path = episode_dir.join(format!("frame-{:06}.png", self.num_frames));
        frame.as_image().save_with_format(path, ImageFormat::Png)?;

        self.size.get_or_insert((frame.width(), frame.height()));
        self.num_frames += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), VideoError> {
        let (width, height) = match self.size {
            Some(size) => size,
            None => return Ok(()),
        };
        let manifest = VideoManifest {
            fps: self.fps,
            width,
            height,
            num_frames: self.num_frames,
        };
        let mut writer = BufWriter::new(File::create(self.episode_dir().join("manifest.json"))?);
        serde_json::to_writer_pretty(&mut writer, &manifest)?;
        writer.flush()?;
        Ok(())
    }
}
