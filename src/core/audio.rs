use std::{fs, fs::File, path::Path};

use hound::WavWriter;
use mp3lame_encoder::{Builder, DualPcm, FlushNoGap};
use symphonia::core::{
    audio::SampleBuffer, codecs::DecoderOptions, errors::Error as SymphoniaError,
    formats::FormatOptions, io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
};
use symphonia::default::{get_codecs, get_probe};

use crate::{
    error::{Result, SplitterError},
    types::{AudioData, Mp3Bitrate},
};

pub fn read_audio<P: AsRef<Path>>(path: P) -> Result<AudioData> {
    let path: &Path = path.as_ref();

    let file: File = File::open(path).map_err(|e| {
        SplitterError::Audio(format!("failed to open audio file {}: {e}", path.display()))
    })?;

    let mss: MediaSourceStream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint: Hint = Hint::new();

    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;
    let track = format
        .default_track()
        .ok_or_else(|| SplitterError::Audio(format!("no default track in {}", path.display())))?;
    let track_id = track.id;

    let mut decoder = get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples: Vec<f32> = Vec::new();
    let mut sample_rate: u32 = track.codec_params.sample_rate.unwrap_or(0);
    let mut channels: u16 = track
        .codec_params
        .channels
        .map(|c| c.count() as u16)
        .unwrap_or(0);

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(e)) => {
                log::warn!("Skipping undecodable packet in {}: {e}", path.display());
                continue;
            }
            Err(e) => return Err(e.into()),
        };
        sample_rate = decoded.spec().rate;
        channels = decoded.spec().channels.count() as u16;

        let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, *decoded.spec());
        buffer.copy_interleaved_ref(decoded);

        samples.extend_from_slice(buffer.samples());
    }

    if sample_rate == 0 || channels == 0 {
        return Err(SplitterError::Audio(format!(
            "could not determine sample format of {}",
            path.display()
        )));
    }

    log::debug!(
        "🎧 Read audio {}: sample_rate={}, channels={}, samples={}",
        path.display(),
        sample_rate,
        channels,
        samples.len()
    );

    Ok(AudioData {
        samples,
        sample_rate,
        channels,
    })
}

pub fn write_wav<P: AsRef<Path>>(path: P, audio: &AudioData) -> Result<()> {
    let spec = hound::WavSpec {
        channels: audio.channels,
        sample_rate: audio.sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = WavWriter::create(path, spec)?;
    for sample in &audio.samples {
        writer.write_sample(to_i16(*sample))?;
    }

    writer.finalize()?;
    Ok(())
}

fn to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

fn lame_bitrate(bitrate: Mp3Bitrate) -> mp3lame_encoder::Bitrate {
    match bitrate {
        Mp3Bitrate::Kbps128 => mp3lame_encoder::Bitrate::Kbps128,
        Mp3Bitrate::Kbps192 => mp3lame_encoder::Bitrate::Kbps192,
        Mp3Bitrate::Kbps256 => mp3lame_encoder::Bitrate::Kbps256,
        Mp3Bitrate::Kbps320 => mp3lame_encoder::Bitrate::Kbps320,
    }
}

/// Encodes interleaved samples to a CBR MP3 stream. Mono input becomes dual-mono.
pub fn encode_mp3(audio: &AudioData, bitrate: Mp3Bitrate) -> Result<Vec<u8>> {
    if !(1..=2).contains(&audio.channels) {
        return Err(SplitterError::Encode(format!(
            "MP3 export supports mono or stereo, got {} channels",
            audio.channels
        )));
    }

    let mut builder =
        Builder::new().ok_or_else(|| SplitterError::Encode("LAME encoder init failed".into()))?;
    builder
        .set_num_channels(2)
        .map_err(|e| SplitterError::Encode(format!("LAME set channels failed: {:?}", e)))?;
    builder
        .set_sample_rate(audio.sample_rate)
        .map_err(|e| SplitterError::Encode(format!("LAME set sample rate failed: {:?}", e)))?;
    builder
        .set_brate(lame_bitrate(bitrate))
        .map_err(|e| SplitterError::Encode(format!("LAME set bitrate failed: {:?}", e)))?;
    builder
        .set_quality(mp3lame_encoder::Quality::Best)
        .map_err(|e| SplitterError::Encode(format!("LAME set quality failed: {:?}", e)))?;

    let mut encoder = builder
        .build()
        .map_err(|e| SplitterError::Encode(format!("LAME build failed: {:?}", e)))?;

    let frames = audio.frames();
    let mut left: Vec<i16> = Vec::with_capacity(frames);
    let mut right: Vec<i16> = Vec::with_capacity(frames);

    if audio.channels == 2 {
        for frame in audio.samples.chunks_exact(2) {
            left.push(to_i16(frame[0]));
            right.push(to_i16(frame[1]));
        }
    } else {
        for &sample in &audio.samples {
            let s = to_i16(sample);
            left.push(s);
            right.push(s);
        }
    }

    let mut mp3_out: Vec<u8> = Vec::with_capacity(mp3lame_encoder::max_required_buffer_size(frames));

    let encoded = encoder
        .encode(
            DualPcm {
                left: &left,
                right: &right,
            },
            mp3_out.spare_capacity_mut(),
        )
        .map_err(|e| SplitterError::Encode(format!("LAME encode failed: {:?}", e)))?;

    // SAFETY: the encoder initialised `encoded` bytes of spare capacity.
    unsafe {
        mp3_out.set_len(encoded);
    }

    mp3_out.reserve(7200);
    let flushed = encoder
        .flush::<FlushNoGap>(mp3_out.spare_capacity_mut())
        .map_err(|e| SplitterError::Encode(format!("LAME flush failed: {:?}", e)))?;

    // SAFETY: the encoder initialised `flushed` bytes of spare capacity.
    unsafe {
        mp3_out.set_len(mp3_out.len() + flushed);
    }

    Ok(mp3_out)
}

pub fn write_mp3<P: AsRef<Path>>(path: P, audio: &AudioData, bitrate: Mp3Bitrate) -> Result<()> {
    let bytes = encode_mp3(audio, bitrate)?;
    fs::write(path.as_ref(), bytes)?;
    log::debug!("💾 Wrote {} ({} kbps)", path.as_ref().display(), bitrate.kbps());
    Ok(())
}
