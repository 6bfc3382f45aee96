use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use ini::{Ini, Properties};
use loopgrid_model::{Clip, Song};
use zip::ZipArchive;
use zip::result::ZipError;

use crate::ArchiveError;

/// Load a song from an archive file.
///
/// All-or-nothing: any failure returns an error and no song. The returned
/// song is bound to `path`, its pool is keyed by archive entry name, and
/// every clip section has been placed on the grid.
pub fn load(path: &Path) -> Result<Song, ArchiveError> {
    let file = File::open(path)?;
    let mut zip = ZipArchive::new(file)?;

    let metadata = {
        let mut entry = match zip.by_name("metadata.ini") {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => return Err(ArchiveError::MissingMetadata),
            Err(e) => return Err(e.into()),
        };
        let mut text = String::new();
        entry.read_to_string(&mut text)?;
        text
    };
    let doc = Ini::load_from_str(&metadata).map_err(|e| ArchiveError::Parse(e.to_string()))?;

    let defaults = doc
        .section(Some("DEFAULT"))
        .ok_or_else(|| ArchiveError::Parse("missing [DEFAULT] section".to_string()))?;
    let width = require(defaults, "DEFAULT", "width")?;
    let height = require(defaults, "DEFAULT", "height")?;

    let mut song = Song::new(width, height);
    song.volume = require(defaults, "DEFAULT", "volume")?;
    song.bpm = require(defaults, "DEFAULT", "bpm")?;
    song.beat_per_bar = require(defaults, "DEFAULT", "beat_per_bar")?;
    song.bind_path(path);

    for index in 0..zip.len() {
        let mut entry = zip.by_index(index)?;
        if entry.is_dir() || entry.name() == "metadata.ini" {
            continue;
        }
        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut bytes)?;
        let buffer = loopgrid_codec::decode_bytes(bytes, &name).map_err(|source| {
            ArchiveError::UnsupportedAudio {
                name: name.clone(),
                source,
            }
        })?;
        log::debug!(
            "decoded audio entry '{name}' ({} frames @ {} Hz)",
            buffer.frames(),
            buffer.sample_rate()
        );
        song.insert_audio(name, buffer);
    }

    for (section, props) in doc.iter() {
        let Some(section) = section else { continue };
        if section == "DEFAULT" {
            continue;
        }
        let (x, y) = parse_cell(section)?;

        let audio_file = props.get("audio_file").ok_or_else(|| missing(section, "audio_file"))?;
        if song.audio(audio_file).is_none() {
            return Err(ArchiveError::MissingAudioEntry(audio_file.to_string()));
        }

        let mut clip = Clip::new(audio_file);
        clip.name = props
            .get("name")
            .ok_or_else(|| missing(section, "name"))?
            .to_string();
        clip.volume = optional(props, section, "volume", 1.0)?;
        clip.frame_offset = optional(props, section, "frame_offset", 0)?;
        clip.beat_offset = optional(props, section, "beat_offset", 0.0)?;
        clip.beat_diviser = require(props, section, "beat_diviser")?;
        song.add_clip(clip, x, y)?;
    }

    log::info!("loaded song from {}", path.display());
    Ok(song)
}

fn missing(section: &str, field: &str) -> ArchiveError {
    ArchiveError::MissingField {
        section: section.to_string(),
        field: field.to_string(),
    }
}

fn parse_value<T: FromStr>(raw: &str, section: &str, field: &str) -> Result<T, ArchiveError>
where
    T::Err: std::fmt::Display,
{
    raw.parse()
        .map_err(|e| ArchiveError::Parse(format!("[{section}] {field} = '{raw}': {e}")))
}

fn require<T: FromStr>(props: &Properties, section: &str, field: &str) -> Result<T, ArchiveError>
where
    T::Err: std::fmt::Display,
{
    let raw = props.get(field).ok_or_else(|| missing(section, field))?;
    parse_value(raw, section, field)
}

fn optional<T: FromStr>(
    props: &Properties,
    section: &str,
    field: &str,
    default: T,
) -> Result<T, ArchiveError>
where
    T::Err: std::fmt::Display,
{
    match props.get(field) {
        None => Ok(default),
        Some(raw) => parse_value(raw, section, field),
    }
}

fn parse_cell(section: &str) -> Result<(usize, usize), ArchiveError> {
    let (x, y) = section.split_once('/').ok_or_else(|| {
        ArchiveError::Parse(format!("clip section '[{section}]' is not of the form x/y"))
    })?;
    Ok((
        parse_value(x.trim(), section, "x")?,
        parse_value(y.trim(), section, "y")?,
    ))
}
