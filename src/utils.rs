use std::{
    env,
    path::{Path, PathBuf},
};

/// Name of the transient folder the backends write stems into.
pub const SEPARATED_DIR: &str = "separated";

pub fn python_executable() -> String {
    env::var("SONG_SPLITTER_PYTHON").unwrap_or_else(|_| "python3".to_string())
}

pub fn audio_separator_executable() -> String {
    env::var("SONG_SPLITTER_AUDIO_SEPARATOR").unwrap_or_else(|_| "audio-separator".to_string())
}

pub fn separated_dir(work_dir: &Path) -> PathBuf {
    work_dir.join(SEPARATED_DIR)
}

/// File name without its extension, as demucs uses it for its output folder.
pub fn song_name(audio_path: &Path) -> String {
    audio_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string())
}

pub fn vocals_track_name(song_name: &str) -> String {
    format!("{song_name} [Vocals].mp3")
}

pub fn instrumental_track_name(song_name: &str) -> String {
    format!("{song_name} [Instrumental].mp3")
}
