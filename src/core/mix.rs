use crate::{
    error::{Result, SplitterError},
    types::AudioData,
};

/// Gain in dB that scales amplitude to `percent` of the original.
///
/// Only meaningful for `percent > 0`; 100 gives 0 dB.
pub fn percent_to_db(percent: u8) -> f32 {
    20.0 * (percent as f32 / 100.0).log10()
}

pub fn db_to_linear(db: f32) -> f32 {
    10f32.powf(db / 20.0)
}

pub fn apply_gain(audio: &AudioData, db: f32) -> AudioData {
    let factor = db_to_linear(db);
    AudioData {
        samples: audio.samples.iter().map(|s| s * factor).collect(),
        sample_rate: audio.sample_rate,
        channels: audio.channels,
    }
}

/// Reads frame `i` of `src` remapped to `channels` output channels.
fn frame_in_layout(src: &AudioData, i: usize, channels: u16, out: &mut [f32]) {
    let src_ch = src.channels as usize;
    let frame = &src.samples[i * src_ch..(i + 1) * src_ch];

    if src_ch == channels as usize {
        out.copy_from_slice(frame);
    } else if src_ch == 1 {
        out.fill(frame[0]);
    } else if channels == 1 {
        out[0] = frame.iter().sum::<f32>() / src_ch as f32;
    } else {
        for (c, o) in out.iter_mut().enumerate() {
            *o = frame[c % src_ch];
        }
    }
}

/// Adds `top` onto `base`, aligned at the start.
///
/// The result keeps the length and layout of `base`: a longer `top` is cut
/// off, a shorter one simply stops contributing.
pub fn overlay(base: &AudioData, top: &AudioData) -> Result<AudioData> {
    if base.sample_rate != top.sample_rate {
        return Err(SplitterError::Audio(format!(
            "cannot overlay {} Hz onto {} Hz audio",
            top.sample_rate, base.sample_rate
        )));
    }
    if base.channels == 0 || top.channels == 0 {
        return Err(SplitterError::Audio("cannot overlay audio without channels".into()));
    }

    let channels = base.channels as usize;
    let mut samples = base.samples.clone();
    let shared = base.frames().min(top.frames());
    let mut frame = vec![0f32; channels];

    for i in 0..shared {
        frame_in_layout(top, i, base.channels, &mut frame);
        for (c, s) in frame.iter().enumerate() {
            samples[i * channels + c] += s;
        }
    }

    Ok(AudioData {
        samples,
        sample_rate: base.sample_rate,
        channels: base.channels,
    })
}

/// Instrumental with the vocals mixed back in at `vocal_mix_volume` percent.
pub fn karaoke_mix(
    instrumental: &AudioData,
    vocals: &AudioData,
    vocal_mix_volume: u8,
) -> Result<AudioData> {
    let db = percent_to_db(vocal_mix_volume);
    log::debug!("Mixing vocals at {vocal_mix_volume}% ({db:.2} dB)");
    overlay(instrumental, &apply_gain(vocals, db))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn audio(samples: Vec<f32>, channels: u16) -> AudioData {
        AudioData {
            samples,
            sample_rate: 44_100,
            channels,
        }
    }

    #[test]
    fn percent_to_db_reference_values() {
        assert_abs_diff_eq!(percent_to_db(40), -7.9588, epsilon = 1e-3);
        assert_abs_diff_eq!(percent_to_db(100), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(percent_to_db(50), -6.0206, epsilon = 1e-3);
    }

    #[test]
    fn gain_round_trips_to_percentage() {
        let v = audio(vec![1.0, -0.5], 1);
        let out = apply_gain(&v, percent_to_db(40));
        assert_abs_diff_eq!(out.samples[0], 0.4, epsilon = 1e-5);
        assert_abs_diff_eq!(out.samples[1], -0.2, epsilon = 1e-5);
    }

    #[test]
    fn overlay_keeps_base_length() {
        let base = audio(vec![0.1; 4], 1);
        let top = audio(vec![0.2; 10], 1);
        let out = overlay(&base, &top).unwrap();
        assert_eq!(out.samples.len(), 4);
        for s in out.samples {
            assert_abs_diff_eq!(s, 0.3, epsilon = 1e-6);
        }
    }

    #[test]
    fn overlay_shorter_top_leaves_tail_untouched() {
        let base = audio(vec![0.1, 0.1, 0.1, 0.1], 2);
        let top = audio(vec![0.5, 0.25], 2);
        let out = overlay(&base, &top).unwrap();
        assert_abs_diff_eq!(out.samples[0], 0.6, epsilon = 1e-6);
        assert_abs_diff_eq!(out.samples[1], 0.35, epsilon = 1e-6);
        assert_abs_diff_eq!(out.samples[2], 0.1, epsilon = 1e-6);
        assert_abs_diff_eq!(out.samples[3], 0.1, epsilon = 1e-6);
    }

    #[test]
    fn overlay_maps_mono_onto_stereo() {
        let base = audio(vec![0.0, 0.0, 0.0, 0.0], 2);
        let top = audio(vec![0.5, -0.5], 1);
        let out = overlay(&base, &top).unwrap();
        assert_eq!(out.channels, 2);
        assert_eq!(out.samples, vec![0.5, 0.5, -0.5, -0.5]);
    }

    #[test]
    fn overlay_rejects_sample_rate_mismatch() {
        let base = audio(vec![0.0; 4], 1);
        let mut top = audio(vec![0.0; 4], 1);
        top.sample_rate = 48_000;
        assert!(overlay(&base, &top).is_err());
    }
}
