use std::{fs, path::Path};

use crate::{
    core::{
        audio::{read_audio, write_mp3},
        mix::karaoke_mix,
    },
    error::Result,
    types::{ExportReport, Mp3Bitrate, StemPaths},
    utils::{instrumental_track_name, separated_dir, vocals_track_name},
};

/// Converts the stems into `<song> [Vocals].mp3` and `<song> [Instrumental].mp3`
/// inside `song_dir`, then removes the `separated` workspace.
///
/// Missing stems are skipped silently. With `vocal_mix_volume > 0` and a vocal
/// stem present, the instrumental track gets the vocals mixed back in.
pub fn export_tracks(
    song_dir: &Path,
    song_name: &str,
    stems: &StemPaths,
    vocal_mix_volume: u8,
    bitrate: Mp3Bitrate,
) -> Result<ExportReport> {
    let mut report = ExportReport::default();

    let vocals = if stems.vocals.is_file() {
        let vocals = read_audio(&stems.vocals)?;
        write_mp3(song_dir.join(vocals_track_name(song_name)), &vocals, bitrate)?;
        report.vocals_written = true;
        Some(vocals)
    } else {
        log::warn!("No vocal stem at {}", stems.vocals.display());
        None
    };

    if stems.instrumental.is_file() {
        let instrumental = read_audio(&stems.instrumental)?;
        let track = match &vocals {
            Some(vocals) if vocal_mix_volume > 0 => {
                karaoke_mix(&instrumental, vocals, vocal_mix_volume)?
            }
            _ => instrumental,
        };
        write_mp3(
            song_dir.join(instrumental_track_name(song_name)),
            &track,
            bitrate,
        )?;
        report.instrumental_written = true;
    } else {
        log::warn!("No instrumental stem at {}", stems.instrumental.display());
    }

    let workspace = separated_dir(song_dir);
    if workspace.is_dir() {
        fs::remove_dir_all(&workspace)?;
    }

    Ok(report)
}
