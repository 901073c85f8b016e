use std::{fmt, path::PathBuf, str::FromStr};

use serde::{Serialize, Serializer};

use crate::error::{Result, SplitterError};

#[derive(Clone, Debug)]
pub struct AudioData {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
    pub channels: u16,
}

impl AudioData {
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            0
        } else {
            self.samples.len() / self.channels as usize
        }
    }
}

/// Torch device handed to the separation backend. Also decides which backend runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Device {
    #[default]
    Cpu,
    Cuda,
}

impl Device {
    pub fn as_str(&self) -> &'static str {
        match self {
            Device::Cpu => "cpu",
            Device::Cuda => "cuda",
        }
    }
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Device {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cpu" => Ok(Device::Cpu),
            "cuda" => Ok(Device::Cuda),
            other => Err(SplitterError::InvalidConfig(format!(
                "unknown device `{other}` (expected cpu or cuda)"
            ))),
        }
    }
}

/// Pretrained Demucs checkpoints understood by `demucs.separate`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub enum DemucsModel {
    /// Hybrid Transformer Demucs, MusDB + 800 songs.
    #[default]
    #[serde(rename = "htdemucs")]
    Htdemucs,
    /// Fine-tuned htdemucs; about four times slower.
    #[serde(rename = "htdemucs_ft")]
    HtdemucsFt,
    /// Six-source htdemucs (adds piano and guitar).
    #[serde(rename = "htdemucs_6s")]
    Htdemucs6s,
    /// Hybrid Demucs v3 retrained on MusDB + 800 songs.
    #[serde(rename = "hdemucs_mmi")]
    HdemucsMmi,
    #[serde(rename = "mdx")]
    Mdx,
    #[serde(rename = "mdx_extra")]
    MdxExtra,
    #[serde(rename = "mdx_q")]
    MdxQ,
    #[serde(rename = "mdx_extra_q")]
    MdxExtraQ,
    /// Single model from the model zoo.
    #[serde(rename = "SIG")]
    Sig,
}

impl DemucsModel {
    pub const ALL: [DemucsModel; 9] = [
        DemucsModel::Htdemucs,
        DemucsModel::HtdemucsFt,
        DemucsModel::Htdemucs6s,
        DemucsModel::HdemucsMmi,
        DemucsModel::Mdx,
        DemucsModel::MdxExtra,
        DemucsModel::MdxQ,
        DemucsModel::MdxExtraQ,
        DemucsModel::Sig,
    ];

    /// Name passed to `demucs -n`, also the subfolder demucs writes into.
    pub fn id(&self) -> &'static str {
        match self {
            DemucsModel::Htdemucs => "htdemucs",
            DemucsModel::HtdemucsFt => "htdemucs_ft",
            DemucsModel::Htdemucs6s => "htdemucs_6s",
            DemucsModel::HdemucsMmi => "hdemucs_mmi",
            DemucsModel::Mdx => "mdx",
            DemucsModel::MdxExtra => "mdx_extra",
            DemucsModel::MdxQ => "mdx_q",
            DemucsModel::MdxExtraQ => "mdx_extra_q",
            DemucsModel::Sig => "SIG",
        }
    }
}

impl fmt::Display for DemucsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for DemucsModel {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self> {
        DemucsModel::ALL
            .into_iter()
            .find(|m| m.id() == s)
            .ok_or_else(|| SplitterError::InvalidConfig(format!("unknown demucs model `{s}`")))
    }
}

/// Constant bitrate of the exported MP3 tracks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Mp3Bitrate {
    #[default]
    Kbps128,
    Kbps192,
    Kbps256,
    Kbps320,
}

impl Mp3Bitrate {
    pub fn kbps(&self) -> u32 {
        match self {
            Mp3Bitrate::Kbps128 => 128,
            Mp3Bitrate::Kbps192 => 192,
            Mp3Bitrate::Kbps256 => 256,
            Mp3Bitrate::Kbps320 => 320,
        }
    }
}

impl Serialize for Mp3Bitrate {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.kbps())
    }
}

impl FromStr for Mp3Bitrate {
    type Err = SplitterError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim_end_matches('k') {
            "128" => Ok(Mp3Bitrate::Kbps128),
            "192" => Ok(Mp3Bitrate::Kbps192),
            "256" => Ok(Mp3Bitrate::Kbps256),
            "320" => Ok(Mp3Bitrate::Kbps320),
            other => Err(SplitterError::InvalidConfig(format!(
                "unsupported bitrate `{other}` (expected 128, 192, 256 or 320)"
            ))),
        }
    }
}

pub const DEFAULT_VOCAL_MIX_VOLUME: u8 = 40;

/// Per-invocation settings for separation and export.
#[derive(Clone, Debug, Serialize)]
pub struct MixConfig {
    pub device: Device,
    /// Only consulted by the CPU backend.
    pub model: DemucsModel,
    /// Percentage (0..=100) of the vocal stem mixed back into the instrumental.
    pub vocal_mix_volume: u8,
    /// Skip separation when both stems are already on disk.
    pub reuse_cached_stems: bool,
    pub bitrate: Mp3Bitrate,
}

impl Default for MixConfig {
    fn default() -> Self {
        Self {
            device: Device::Cpu,
            model: DemucsModel::Htdemucs,
            vocal_mix_volume: DEFAULT_VOCAL_MIX_VOLUME,
            reuse_cached_stems: false,
            bitrate: Mp3Bitrate::Kbps128,
        }
    }
}

impl MixConfig {
    pub fn new(device: Device, model: DemucsModel, vocal_mix_volume: u8) -> Result<Self> {
        let cfg = Self {
            device,
            model,
            vocal_mix_volume,
            ..Self::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vocal_mix_volume > 100 {
            return Err(SplitterError::InvalidConfig(format!(
                "vocal mix volume must be within 0..=100, got {}",
                self.vocal_mix_volume
            )));
        }
        Ok(())
    }
}

/// Where a backend leaves its two stems. The files may be missing after a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StemPaths {
    pub vocals: PathBuf,
    pub instrumental: PathBuf,
}

impl StemPaths {
    pub fn both_exist(&self) -> bool {
        self.vocals.is_file() && self.instrumental.is_file()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub vocals_written: bool,
    pub instrumental_written: bool,
}

/// Folder selection and overwrite policy for a batch run.
#[derive(Clone, Debug, Default)]
pub struct BatchOptions {
    pub overwrite_existing: bool,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub processed: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.processed.len() + self.skipped.len() + self.failed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demucs_models_parse_from_their_ids() {
        for model in DemucsModel::ALL {
            assert_eq!(model.id().parse::<DemucsModel>().unwrap(), model);
        }
        assert_eq!(DemucsModel::default().id(), "htdemucs");
        assert!("htdemucs_xl".parse::<DemucsModel>().is_err());
    }

    #[test]
    fn devices_parse_case_insensitively() {
        assert_eq!("CUDA".parse::<Device>().unwrap(), Device::Cuda);
        assert_eq!("cpu".parse::<Device>().unwrap(), Device::Cpu);
        assert!("mps".parse::<Device>().is_err());
    }

    #[test]
    fn bitrate_accepts_k_suffix() {
        assert_eq!("320k".parse::<Mp3Bitrate>().unwrap(), Mp3Bitrate::Kbps320);
        assert!("96".parse::<Mp3Bitrate>().is_err());
    }

    #[test]
    fn config_serializes_with_external_ids() {
        let cfg = MixConfig {
            device: Device::Cuda,
            model: DemucsModel::MdxExtraQ,
            ..MixConfig::default()
        };
        let json = serde_json::to_value(&cfg).unwrap();
        assert_eq!(json["device"], "cuda");
        assert_eq!(json["model"], "mdx_extra_q");
        assert_eq!(json["vocal_mix_volume"], 40);
        assert_eq!(json["bitrate"], 128);
    }

    #[test]
    fn volume_above_hundred_is_invalid() {
        assert!(MixConfig::new(Device::Cpu, DemucsModel::Htdemucs, 100).is_ok());
        assert!(MixConfig::new(Device::Cpu, DemucsModel::Htdemucs, 101).is_err());
    }
}
