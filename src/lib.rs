//! # song-stem-splitter
//!
//! Batch vocal/instrumental separation for karaoke song folders: runs an
//! external separation backend, exports MP3 tracks (optionally with quiet
//! backing vocals in the instrumental) and tags the song's metadata file.

pub mod core;
pub mod error;
pub mod io;
pub mod model;
pub mod pipeline;
pub mod tags;
pub mod types;
pub mod utils;

pub use crate::{
    core::{
        audio::{encode_mp3, read_audio, write_mp3, write_wav},
        export::export_tracks,
        mix::{karaoke_mix, percent_to_db},
    },
    error::{Result, SplitterError},
    model::{separator_for, AudioSeparatorBackend, DemucsSeparator, Separator},
    pipeline::{process_song_folder, run, run_with, select_folders, FolderOutcome},
    tags::{append_separation_tags, find_audio_reference, has_existing_separation_tags},
    types::{
        AudioData, BatchOptions, BatchReport, DemucsModel, Device, ExportReport, MixConfig,
        Mp3Bitrate, StemPaths,
    },
};
