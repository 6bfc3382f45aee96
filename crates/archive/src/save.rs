use std::fs::File;
use std::io::Write;
use std::path::Path;

use ini::Ini;
use loopgrid_codec::{encode_wav, sanitized_basename};
use loopgrid_model::Song;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::ArchiveError;

/// Save the song to its bound archive path.
///
/// Fails with [`ArchiveError::NoFileBound`] if the song has never been
/// saved or loaded.
pub fn save(song: &mut Song) -> Result<(), ArchiveError> {
    let path = song
        .file_path()
        .ok_or(ArchiveError::NoFileBound)?
        .to_path_buf();
    save_to(song, &path)
}

/// Save the song to `path` and bind the song to it.
///
/// The archive is written to a sibling temp file and renamed into place,
/// so a failure mid-write never destroys a previously valid archive.
pub fn save_to(song: &mut Song, path: &Path) -> Result<(), ArchiveError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir)?;
    write_archive(song, tmp.as_file())?;
    tmp.persist(path).map_err(|e| ArchiveError::Io(e.error))?;

    song.bind_path(path);
    log::info!("saved song to {}", path.display());
    Ok(())
}

fn write_archive(song: &Song, file: &File) -> Result<(), ArchiveError> {
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut metadata = Vec::new();
    render_metadata(song).write_to(&mut metadata)?;
    zip.start_file("metadata.ini", options)?;
    zip.write_all(&metadata)?;

    for (key, buffer) in song.audio_entries() {
        let entry = sanitized_basename(key);
        let wav = encode_wav(buffer).map_err(|source| ArchiveError::AudioEncode {
            name: entry.clone(),
            source,
        })?;
        zip.start_file(entry.as_str(), options)?;
        zip.write_all(&wav)?;
        log::debug!("wrote audio entry '{entry}' ({} frames)", buffer.frames());
    }

    zip.finish()?;
    Ok(())
}

fn render_metadata(song: &Song) -> Ini {
    let mut doc = Ini::new();
    doc.with_section(Some("DEFAULT"))
        .set("volume", song.volume.to_string())
        .set("bpm", song.bpm.to_string())
        .set("beat_per_bar", song.beat_per_bar.to_string())
        .set("width", song.width().to_string())
        .set("height", song.height().to_string());

    for (_, clip) in song.clips() {
        // Placed clips always carry coordinates.
        let Some((x, y)) = clip.position() else {
            continue;
        };
        doc.with_section(Some(format!("{x}/{y}")))
            .set("name", clip.name.clone())
            .set("volume", clip.volume.to_string())
            .set("frame_offset", clip.frame_offset.to_string())
            .set("beat_offset", clip.beat_offset.to_string())
            .set("beat_diviser", clip.beat_diviser.to_string())
            .set("audio_file", sanitized_basename(&clip.audio_file));
        log::debug!("wrote clip section {x}/{y}");
    }

    doc
}
