use crate::{
    core::export::export_tracks,
    error::{Result, SplitterError},
    io::console,
    model::{separate_or_reuse, separator_for, Separator},
    tags::{
        append_separation_tags, find_audio_reference, find_metadata_file,
        has_existing_separation_tags,
    },
    types::{BatchOptions, BatchReport, ExportReport, MixConfig},
    utils::{instrumental_track_name, song_name, vocals_track_name},
};
use std::{
    error::Error,
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, PartialEq, Eq)]
pub enum FolderOutcome {
    Processed(ExportReport),
    Skipped,
}

/// Immediate subdirectories of `root`, in directory-listing order.
pub fn list_song_folders(root: &Path) -> Result<Vec<PathBuf>> {
    let mut folders = Vec::new();
    for entry in fs::read_dir(root)? {
        let path = entry?.path();
        if path.is_dir() {
            folders.push(path);
        }
    }
    Ok(folders)
}

/// Drops `offset` entries, then keeps at most `limit`.
pub fn select_folders<T>(folders: Vec<T>, offset: Option<usize>, limit: Option<usize>) -> Vec<T> {
    folders
        .into_iter()
        .skip(offset.unwrap_or(0))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}

fn folder_label(folder: &Path) -> String {
    folder
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| folder.display().to_string())
}

/// Runs one song folder through separation, export and tagging.
pub fn process_song_folder(
    folder: &Path,
    separator: &dyn Separator,
    config: &MixConfig,
    overwrite_existing: bool,
) -> Result<FolderOutcome> {
    let metadata = find_metadata_file(folder)?;

    if !overwrite_existing && has_existing_separation_tags(&metadata)? {
        log::info!("{}", console::skipped(&folder_label(folder)));
        return Ok(FolderOutcome::Skipped);
    }

    let audio_file = find_audio_reference(&metadata)?;
    let audio_path = folder.join(&audio_file);
    log::debug!("Resolved audio reference {audio_file:?} to {}", audio_path.display());
    if !audio_path.is_file() {
        return Err(SplitterError::NotFound {
            what: "audio file referenced by the metadata",
            path: audio_path,
        });
    }

    let name = song_name(&audio_path);
    let stems = separate_or_reuse(separator, &audio_path, folder, config.reuse_cached_stems)?;
    let report = export_tracks(
        folder,
        &name,
        &stems,
        config.vocal_mix_volume,
        config.bitrate,
    )?;
    log::debug!(
        "Exported {} (vocals={}, instrumental={})",
        name,
        report.vocals_written,
        report.instrumental_written
    );

    append_separation_tags(
        &metadata,
        &vocals_track_name(&name),
        &instrumental_track_name(&name),
    )?;

    Ok(FolderOutcome::Processed(report))
}

/// Error message followed by its source chain.
pub fn describe_error(err: &SplitterError) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(&format!("\n  caused by: {cause}"));
        source = cause.source();
    }
    msg
}

/// Processes every selected song folder under `root` with the given backend.
///
/// Per-folder failures are logged and collected; only an unreadable `root`
/// is returned as an error.
pub fn run_with(
    root: &Path,
    separator: &dyn Separator,
    config: &MixConfig,
    options: &BatchOptions,
) -> Result<BatchReport> {
    config.validate()?;

    let folders = select_folders(list_song_folders(root)?, options.offset, options.limit);
    let total = folders.len();
    let mut report = BatchReport::default();

    for (idx, folder) in folders.into_iter().enumerate() {
        let label = folder_label(&folder);
        log::info!("{}", console::processing(idx + 1, total, &label));

        match process_song_folder(&folder, separator, config, options.overwrite_existing) {
            Ok(FolderOutcome::Processed(_)) => {
                log::info!("{}", console::finished(&label));
                report.processed.push(folder);
            }
            Ok(FolderOutcome::Skipped) => report.skipped.push(folder),
            Err(e) => {
                let detail = describe_error(&e);
                log::error!("{}", console::failed(&folder.display().to_string(), &detail));
                report.failed.push((folder, detail));
            }
        }
    }

    Ok(report)
}

/// [`run_with`] using the backend selected by `config.device`.
pub fn run(root: &Path, config: &MixConfig, options: &BatchOptions) -> Result<BatchReport> {
    let separator = separator_for(config);
    log::info!(
        "🎵 Separating song folders in {} with {} on {}",
        root.display(),
        separator.name(),
        config.device
    );
    log::debug!("Config: {}", serde_json::to_string(config)?);
    run_with(root, separator.as_ref(), config, options)
}
