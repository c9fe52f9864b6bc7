use anyhow::{Context, Result, bail};
use log::warn;
use serde::Deserialize;
use std::path::Path;
use std::process::Command;

/// 無法取得解析度時的標記
pub const UNKNOWN_RESOLUTION: &str = "unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoResolution {
    pub width: u32,
    pub height: u32,
}

impl VideoResolution {
    /// `WxH` 格式
    #[must_use]
    pub fn tag(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }
}

#[derive(Deserialize)]
struct FfprobeOutput {
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
}

/// 解析度探測，回傳 `WxH` 或 `unknown`
pub trait ResolutionProbe {
    fn probe_resolution(&self, video: &Path) -> String;
}

/// 使用 ffprobe 的解析度探測
#[derive(Debug, Default, Clone, Copy)]
pub struct FfprobeResolution;

impl ResolutionProbe for FfprobeResolution {
    fn probe_resolution(&self, video: &Path) -> String {
        match get_video_resolution(video) {
            Ok(resolution) => resolution.tag(),
            Err(e) => {
                warn!("無法取得解析度 {}: {e:#}", video.display());
                UNKNOWN_RESOLUTION.to_string()
            }
        }
    }
}

/// 使用 ffprobe 取得影片解析度
pub fn get_video_resolution(path: &Path) -> Result<VideoResolution> {
    let output = Command::new("ffprobe")
        .args([
            "-v",
            "quiet",
            "-print_format",
            "json",
            "-show_streams",
            "-select_streams",
            "v:0",
        ])
        .arg(path)
        .output()
        .with_context(|| format!("無法執行 ffprobe: {}", path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!("ffprobe 執行失敗: {stderr}");
    }

    parse_ffprobe_resolution(&String::from_utf8_lossy(&output.stdout))
        .with_context(|| format!("找不到視訊串流: {}", path.display()))
}

fn parse_ffprobe_resolution(json: &str) -> Result<VideoResolution> {
    let probe: FfprobeOutput = serde_json::from_str(json).context("無法解析 ffprobe 輸出")?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })
        .ok_or_else(|| anyhow::anyhow!("輸出中沒有視訊串流"))?;

    let width = video_stream
        .width
        .ok_or_else(|| anyhow::anyhow!("無法取得影片寬度"))?;
    let height = video_stream
        .height
        .ok_or_else(|| anyhow::anyhow!("無法取得影片高度"))?;

    Ok(VideoResolution { width, height })
}
