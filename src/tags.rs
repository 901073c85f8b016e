//! Reading and updating the `#KEY:value` metadata text file of a song folder.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;

use crate::error::{Result, SplitterError};

/// Finds the first `.txt` file (case-insensitive) in directory-listing order.
pub fn find_metadata_file(folder: &Path) -> Result<PathBuf> {
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().to_lowercase();
        if name.ends_with(".txt") {
            return Ok(entry.path());
        }
    }

    Err(SplitterError::NotFound {
        what: "metadata .txt file",
        path: folder.to_path_buf(),
    })
}

fn read_lines(path: &Path) -> Result<Vec<String>> {
    let text = fs::read_to_string(path)?;
    Ok(text.split_inclusive('\n').map(str::to_owned).collect())
}

/// Text after the first `skip` characters of the line, trimmed.
fn directive_value(line: &str, skip: usize) -> String {
    line.chars().skip(skip).collect::<String>().trim().to_string()
}

/// Returns the audio file named by the first `#MP3` or `#AUDIO` line.
pub fn find_audio_reference(metadata_path: &Path) -> Result<String> {
    for line in read_lines(metadata_path)? {
        if line.starts_with("#MP3") {
            return Ok(directive_value(&line, 5));
        } else if line.starts_with("#AUDIO") {
            return Ok(directive_value(&line, 7));
        }
    }

    Err(SplitterError::MissingTagValue {
        path: metadata_path.to_path_buf(),
    })
}

fn is_separation_tag(line: &str) -> bool {
    let upper = line.trim().to_uppercase();
    upper.starts_with("#INSTRUMENTAL") || upper.starts_with("#VOCALS")
}

pub fn has_existing_separation_tags(metadata_path: &Path) -> Result<bool> {
    Ok(read_lines(metadata_path)?
        .iter()
        .any(|line| is_separation_tag(line)))
}

/// Inserts `#VOCALS` and `#INSTRUMENTAL` right after the first `#MP3` line.
///
/// Without an `#MP3` line the file content is left as it was.
pub fn insert_separation_tags(
    lines: Vec<String>,
    vocals_name: &str,
    instrumental_name: &str,
) -> Vec<String> {
    let file_ending = lines
        .iter()
        .find_map(|l| line_ending(l))
        .unwrap_or("\n");
    let mut out = Vec::with_capacity(lines.len() + 2);
    let mut inserted = false;

    for mut line in lines {
        let is_mp3 = line.trim().to_uppercase().starts_with("#MP3");
        if !inserted && is_mp3 {
            // The tags go on their own lines, in the ending the #MP3 line uses.
            let ending = match line_ending(&line) {
                Some(ending) => ending,
                None => {
                    line.push_str(file_ending);
                    file_ending
                }
            };
            out.push(line);
            out.push(format!("#VOCALS:{vocals_name}{ending}"));
            out.push(format!("#INSTRUMENTAL:{instrumental_name}{ending}"));
            inserted = true;
        } else {
            out.push(line);
        }
    }

    out
}

fn line_ending(line: &str) -> Option<&'static str> {
    if line.ends_with("\r\n") {
        Some("\r\n")
    } else if line.ends_with('\n') {
        Some("\n")
    } else {
        None
    }
}

pub fn append_separation_tags(
    metadata_path: &Path,
    vocals_name: &str,
    instrumental_name: &str,
) -> Result<()> {
    let lines = read_lines(metadata_path)?;
    let updated = insert_separation_tags(lines, vocals_name, instrumental_name);

    let permissions = fs::metadata(metadata_path)?.permissions();

    // Written next to the original, then renamed over it.
    let dir = metadata_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    for line in &updated {
        tmp.write_all(line.as_bytes())?;
    }
    tmp.flush()?;
    fs::set_permissions(tmp.path(), permissions)?;
    tmp.persist(metadata_path)?;

    log::debug!("Tagged {}", metadata_path.display());
    Ok(())
}
