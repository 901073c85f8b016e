use std::{f32::consts::PI, fs, path::Path};

use song_stem_splitter::{
    export_tracks, read_audio, write_wav, AudioData, ExportReport, Mp3Bitrate, StemPaths,
};
use tempfile::tempdir;

const SR: u32 = 44_100;

fn sine(freq: f32, amp: f32, frames: usize) -> AudioData {
    let mut samples = Vec::with_capacity(frames * 2);
    for i in 0..frames {
        let v = (2.0 * PI * freq * i as f32 / SR as f32).sin() * amp;
        samples.push(v);
        samples.push(v);
    }
    AudioData {
        samples,
        sample_rate: SR,
        channels: 2,
    }
}

fn silence(frames: usize) -> AudioData {
    AudioData {
        samples: vec![0.0; frames * 2],
        sample_rate: SR,
        channels: 2,
    }
}

fn peak(audio: &AudioData) -> f32 {
    audio.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()))
}

fn stems_in(song_dir: &Path) -> StemPaths {
    let dir = song_dir.join("separated");
    fs::create_dir_all(&dir).unwrap();
    StemPaths {
        vocals: dir.join("vocals.wav"),
        instrumental: dir.join("no_vocals.wav"),
    }
}

#[test]
fn exports_both_tracks_and_removes_workspace() {
    let tmp = tempdir().unwrap();
    let stems = stems_in(tmp.path());
    write_wav(&stems.vocals, &sine(440.0, 0.5, SR as usize / 2)).unwrap();
    write_wav(&stems.instrumental, &silence(SR as usize / 2)).unwrap();

    let report = export_tracks(tmp.path(), "song", &stems, 0, Mp3Bitrate::Kbps128).unwrap();

    assert_eq!(
        report,
        ExportReport {
            vocals_written: true,
            instrumental_written: true
        }
    );
    assert!(tmp.path().join("song [Vocals].mp3").is_file());
    assert!(tmp.path().join("song [Instrumental].mp3").is_file());
    assert!(!tmp.path().join("separated").exists());
}

#[test]
fn zero_volume_keeps_instrumental_clean() {
    let tmp = tempdir().unwrap();
    let stems = stems_in(tmp.path());
    write_wav(&stems.vocals, &sine(440.0, 0.5, SR as usize / 2)).unwrap();
    write_wav(&stems.instrumental, &silence(SR as usize / 2)).unwrap();

    export_tracks(tmp.path(), "song", &stems, 0, Mp3Bitrate::Kbps128).unwrap();

    let inst = read_audio(tmp.path().join("song [Instrumental].mp3")).unwrap();
    assert!(peak(&inst) < 0.01, "expected silence, peak={}", peak(&inst));
}

#[test]
fn vocals_are_mixed_into_instrumental() {
    let tmp = tempdir().unwrap();
    let stems = stems_in(tmp.path());
    write_wav(&stems.vocals, &sine(440.0, 0.5, SR as usize / 2)).unwrap();
    write_wav(&stems.instrumental, &silence(SR as usize / 2)).unwrap();

    export_tracks(tmp.path(), "song", &stems, 40, Mp3Bitrate::Kbps192).unwrap();

    let inst = read_audio(tmp.path().join("song [Instrumental].mp3")).unwrap();
    let p = peak(&inst);
    // 40 % of a 0.5 sine, give or take codec error
    assert!(p > 0.15 && p < 0.25, "unexpected peak {p}");
}

#[test]
fn instrumental_without_vocals_is_exported_as_is() {
    let tmp = tempdir().unwrap();
    let stems = stems_in(tmp.path());
    write_wav(&stems.instrumental, &sine(220.0, 0.3, SR as usize / 2)).unwrap();

    let report = export_tracks(tmp.path(), "song", &stems, 40, Mp3Bitrate::Kbps128).unwrap();

    assert!(!report.vocals_written);
    assert!(report.instrumental_written);
    assert!(!tmp.path().join("song [Vocals].mp3").exists());
    assert!(tmp.path().join("song [Instrumental].mp3").is_file());
}

#[test]
fn missing_stems_still_clean_up() {
    let tmp = tempdir().unwrap();
    let stems = stems_in(tmp.path());

    let report = export_tracks(tmp.path(), "song", &stems, 40, Mp3Bitrate::Kbps128).unwrap();

    assert_eq!(report, ExportReport::default());
    assert!(!tmp.path().join("separated").exists());
}
