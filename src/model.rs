use crate::{
    error::{Result, SplitterError},
    types::{DemucsModel, Device, MixConfig, StemPaths},
    utils::{audio_separator_executable, python_executable, separated_dir, song_name},
};
use std::{
    collections::BTreeMap,
    fs,
    path::Path,
    process::{Command, ExitStatus},
};

/// Karaoke-tuned checkpoint loaded by `audio-separator` on the GPU path.
pub const KARAOKE_MODEL_FILENAME: &str = "mel_band_roformer_karaoke_aufr33_viperx_sdr_10.1956.ckpt";

pub trait Separator {
    /// Where this backend leaves the stems for `input` under `work_dir`.
    fn stem_paths(&self, input: &Path, work_dir: &Path) -> StemPaths;

    /// Runs the backend. Success only means the tool exited cleanly; callers
    /// check the files at [`Separator::stem_paths`].
    fn separate(&self, input: &Path, work_dir: &Path) -> Result<StemPaths>;

    fn name(&self) -> &'static str;
}

/// Demucs through `python -m demucs.separate`, two-stem mode.
pub struct DemucsSeparator {
    model: DemucsModel,
    device: Device,
}

impl DemucsSeparator {
    pub fn new(model: DemucsModel, device: Device) -> Self {
        Self { model, device }
    }

    fn command(&self, input: &Path, work_dir: &Path) -> Command {
        let mut cmd = Command::new(python_executable());
        cmd.args(["-m", "demucs.separate"])
            .args(["--two-stems", "vocals"])
            .args(["-d", self.device.as_str()])
            .arg("--float32")
            .args(["-n", self.model.id()])
            .arg("--out")
            .arg(separated_dir(work_dir))
            .arg(input);
        cmd
    }
}

impl Separator for DemucsSeparator {
    fn stem_paths(&self, input: &Path, work_dir: &Path) -> StemPaths {
        let dir = separated_dir(work_dir)
            .join(self.model.id())
            .join(song_name(input));
        StemPaths {
            vocals: dir.join("vocals.wav"),
            instrumental: dir.join("no_vocals.wav"),
        }
    }

    fn separate(&self, input: &Path, work_dir: &Path) -> Result<StemPaths> {
        log::info!(
            "🎛️ Separating {} with demucs (model={}, device={})",
            input.display(),
            self.model,
            self.device
        );
        fs::create_dir_all(separated_dir(work_dir))?;

        let status = self
            .command(input, work_dir)
            .status()
            .map_err(|e| SplitterError::Backend(format!("failed to run demucs: {e}")))?;
        check_status("demucs", status)?;

        Ok(self.stem_paths(input, work_dir))
    }

    fn name(&self) -> &'static str {
        "demucs"
    }
}

/// `audio-separator` CLI with the karaoke roformer checkpoint.
pub struct AudioSeparatorBackend {
    model_filename: String,
}

impl AudioSeparatorBackend {
    pub fn new() -> Self {
        Self {
            model_filename: KARAOKE_MODEL_FILENAME.to_string(),
        }
    }

    fn output_names() -> Result<String> {
        let names: BTreeMap<&str, &str> =
            [("Vocals", "vocals"), ("Instrumental", "no_vocals")].into();
        Ok(serde_json::to_string(&names)?)
    }

    fn command(&self, input: &Path, work_dir: &Path) -> Result<Command> {
        let output_names = Self::output_names()?;
        let mut cmd = Command::new(audio_separator_executable());
        cmd.arg(input)
            .args(["--model_filename", self.model_filename.as_str()])
            .arg("--output_dir")
            .arg(separated_dir(work_dir))
            .args(["--output_format", "WAV"])
            .args(["--custom_output_names", output_names.as_str()])
            .args(["--log_level", "warning"]);
        Ok(cmd)
    }
}

impl Default for AudioSeparatorBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Separator for AudioSeparatorBackend {
    fn stem_paths(&self, _input: &Path, work_dir: &Path) -> StemPaths {
        let dir = separated_dir(work_dir);
        StemPaths {
            vocals: dir.join("vocals.wav"),
            instrumental: dir.join("no_vocals.wav"),
        }
    }

    fn separate(&self, input: &Path, work_dir: &Path) -> Result<StemPaths> {
        log::info!(
            "🎛️ Separating {} with audio-separator ({})",
            input.display(),
            self.model_filename
        );
        fs::create_dir_all(separated_dir(work_dir))?;

        let status = self
            .command(input, work_dir)?
            .status()
            .map_err(|e| SplitterError::Backend(format!("failed to run audio-separator: {e}")))?;
        check_status("audio-separator", status)?;

        Ok(self.stem_paths(input, work_dir))
    }

    fn name(&self) -> &'static str {
        "audio-separator"
    }
}

fn check_status(tool: &str, status: ExitStatus) -> Result<()> {
    if status.success() {
        Ok(())
    } else {
        Err(SplitterError::Backend(format!("{tool} exited with {status}")))
    }
}

/// CPU runs demucs with the configured model, CUDA runs the karaoke model.
pub fn separator_for(config: &MixConfig) -> Box<dyn Separator> {
    match config.device {
        Device::Cpu => Box::new(DemucsSeparator::new(config.model, config.device)),
        Device::Cuda => Box::new(AudioSeparatorBackend::new()),
    }
}

/// Separates unless cached stems may be reused and both are already present.
pub fn separate_or_reuse(
    separator: &dyn Separator,
    input: &Path,
    work_dir: &Path,
    reuse_cached_stems: bool,
) -> Result<StemPaths> {
    let expected = separator.stem_paths(input, work_dir);
    if reuse_cached_stems && expected.both_exist() {
        log::info!("♻️ Reusing cached stems in {}", expected.vocals.display());
        return Ok(expected);
    }
    separator.separate(input, work_dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn demucs_stems_are_nested_by_model_and_song() {
        let sep = DemucsSeparator::new(DemucsModel::HtdemucsFt, Device::Cpu);
        let paths = sep.stem_paths(Path::new("/music/a/My Song.mp3"), Path::new("/music/a"));
        assert_eq!(
            paths.vocals,
            PathBuf::from("/music/a/separated/htdemucs_ft/My Song/vocals.wav")
        );
        assert_eq!(
            paths.instrumental,
            PathBuf::from("/music/a/separated/htdemucs_ft/My Song/no_vocals.wav")
        );
    }

    #[test]
    fn audio_separator_stems_are_flat() {
        let sep = AudioSeparatorBackend::new();
        let paths = sep.stem_paths(Path::new("/music/a/My Song.mp3"), Path::new("/music/a"));
        assert_eq!(paths.vocals, PathBuf::from("/music/a/separated/vocals.wav"));
        assert_eq!(
            paths.instrumental,
            PathBuf::from("/music/a/separated/no_vocals.wav")
        );
    }

    #[test]
    fn demucs_command_requests_two_stems_in_float32() {
        let sep = DemucsSeparator::new(DemucsModel::Htdemucs, Device::Cpu);
        let cmd = sep.command(Path::new("song.mp3"), Path::new("work"));
        let args: Vec<String> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            [
                "-m",
                "demucs.separate",
                "--two-stems",
                "vocals",
                "-d",
                "cpu",
                "--float32",
                "-n",
                "htdemucs",
                "--out",
                "work/separated",
                "song.mp3",
            ]
        );
    }

    #[test]
    fn audio_separator_maps_output_names() {
        let json = AudioSeparatorBackend::output_names().unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["Vocals"], "vocals");
        assert_eq!(parsed["Instrumental"], "no_vocals");
    }

    #[test]
    fn device_selects_backend() {
        let cpu = separator_for(&MixConfig::default());
        assert_eq!(cpu.name(), "demucs");

        let cuda = separator_for(&MixConfig {
            device: Device::Cuda,
            ..MixConfig::default()
        });
        assert_eq!(cuda.name(), "audio-separator");
    }
}
