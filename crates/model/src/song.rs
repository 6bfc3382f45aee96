use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::{Clip, ClipId, Notifier, SampleBuffer, UpdateObserver};

#[derive(Debug, thiserror::Error)]
pub enum SongError {
    #[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
    CellOutOfRange {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    #[error("clip is not placed in this song")]
    NotFound,

    #[error("no audio data loaded for '{0}'")]
    MissingAudioData(String),

    #[error("invalid sample window: offset {offset}, length {length}, clip has {frames} frames")]
    InvalidRange {
        offset: i64,
        length: i64,
        frames: usize,
    },

    #[error("sample window past end of clip: {offset} + {length} > {frames}")]
    WindowOutOfRange {
        offset: i64,
        length: i64,
        frames: usize,
    },
}

/// A width x height grid of clips plus shared timing/volume parameters and
/// a pool of decoded audio buffers.
///
/// The grid and the insertion-ordered clip list are a denormalized pair:
/// they are only ever reconciled inside [`add_clip`](Song::add_clip) and
/// [`remove_clip`](Song::remove_clip). The list order is what the archive
/// codec serializes, so it stays deterministic.
#[derive(Debug, Clone)]
pub struct Song {
    width: usize,
    height: usize,
    /// One slot per cell, row-major. A slot holds the id of the occupying
    /// clip; that clip's `position` always names the same cell back.
    grid: Vec<Option<ClipId>>,
    clips: Vec<(ClipId, Clip)>,
    pool: BTreeMap<String, SampleBuffer>,
    pub volume: f32,
    pub bpm: f64,
    pub beat_per_bar: u32,
    file_path: Option<PathBuf>,
    next_id: u64,
    notifier: Notifier,
}

impl Song {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            grid: vec![None; width * height],
            clips: Vec::new(),
            pool: BTreeMap::new(),
            volume: 1.0,
            bpm: 120.0,
            beat_per_bar: 4,
            file_path: None,
            next_id: 0,
            notifier: Notifier::new(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    fn cell_index(&self, x: usize, y: usize) -> Result<usize, SongError> {
        if x >= self.width || y >= self.height {
            return Err(SongError::CellOutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y * self.width + x)
    }

    /// Place a clip at (x, y), evicting any previous occupant.
    ///
    /// The evicted clip is dropped, matching the grid's replace-on-place
    /// semantics. Returns the handle of the newly placed clip.
    pub fn add_clip(&mut self, mut clip: Clip, x: usize, y: usize) -> Result<ClipId, SongError> {
        let cell = self.cell_index(x, y)?;
        if let Some(evicted) = self.grid[cell].take() {
            self.clips.retain(|(id, _)| *id != evicted);
        }

        let id = ClipId(self.next_id);
        self.next_id += 1;
        clip.position = Some((x, y));
        self.grid[cell] = Some(id);
        self.clips.push((id, clip));
        self.notifier.notify_all();
        Ok(id)
    }

    /// Remove a placed clip, clearing its cell and delisting it.
    ///
    /// Returns the clip with its position cleared, or
    /// [`SongError::NotFound`] if the handle is not currently placed.
    pub fn remove_clip(&mut self, id: ClipId) -> Result<Clip, SongError> {
        let index = self
            .clips
            .iter()
            .position(|(clip_id, _)| *clip_id == id)
            .ok_or(SongError::NotFound)?;
        let (_, mut clip) = self.clips.remove(index);
        if let Some((x, y)) = clip.position.take() {
            self.grid[y * self.width + x] = None;
        }
        self.notifier.notify_all();
        Ok(clip)
    }

    /// Toggle the playback state of the clip at (x, y).
    ///
    /// An empty cell is a no-op, not an error; coordinates outside the
    /// grid are rejected.
    pub fn toggle(&mut self, x: usize, y: usize) -> Result<(), SongError> {
        let cell = self.cell_index(x, y)?;
        if let Some(id) = self.grid[cell] {
            if let Some((_, clip)) = self.clips.iter_mut().find(|(clip_id, _)| *clip_id == id) {
                clip.state = clip.state.toggle();
                self.notifier.notify_all();
            }
        }
        Ok(())
    }

    pub fn clip_id_at(&self, x: usize, y: usize) -> Option<ClipId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.grid[y * self.width + x]
    }

    pub fn clip_at(&self, x: usize, y: usize) -> Option<&Clip> {
        self.clip(self.clip_id_at(x, y)?)
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips
            .iter()
            .find(|(clip_id, _)| *clip_id == id)
            .map(|(_, clip)| clip)
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips
            .iter_mut()
            .find(|(clip_id, _)| *clip_id == id)
            .map(|(_, clip)| clip)
    }

    /// Placed clips in insertion order.
    pub fn clips(&self) -> impl Iterator<Item = (ClipId, &Clip)> {
        self.clips.iter().map(|(id, clip)| (*id, clip))
    }

    pub fn insert_audio(&mut self, key: impl Into<String>, buffer: SampleBuffer) {
        self.pool.insert(key.into(), buffer);
    }

    pub fn audio(&self, key: &str) -> Option<&SampleBuffer> {
        self.pool.get(key)
    }

    /// Pool entries in key order.
    pub fn audio_entries(&self) -> impl Iterator<Item = (&str, &SampleBuffer)> {
        self.pool.iter().map(|(key, buffer)| (key.as_str(), buffer))
    }

    fn pooled(&self, id: ClipId) -> Result<(&Clip, &SampleBuffer), SongError> {
        let clip = self.clip(id).ok_or(SongError::NotFound)?;
        let buffer = self
            .pool
            .get(&clip.audio_file)
            .ok_or_else(|| SongError::MissingAudioData(clip.audio_file.clone()))?;
        Ok((clip, buffer))
    }

    /// Channel count of the clip's pooled buffer.
    pub fn channels(&self, id: ClipId) -> Result<usize, SongError> {
        Ok(self.pooled(id)?.1.channels() as usize)
    }

    /// Frame count of the clip's pooled buffer.
    pub fn frames(&self, id: ClipId) -> Result<usize, SongError> {
        Ok(self.pooled(id)?.1.frames())
    }

    /// Extract `length` gain-scaled samples from one channel of a clip's
    /// buffer, starting at frame `offset`.
    ///
    /// `channel` resolves by floor-modulo against the clip's channel count,
    /// so any integer (including negatives) picks a valid channel. `offset`
    /// must land inside the buffer and `length` must be non-negative
    /// ([`SongError::InvalidRange`] otherwise); the window must not run past
    /// the end ([`SongError::WindowOutOfRange`]). Only the returned window
    /// is materialized.
    pub fn sample_window(
        &self,
        id: ClipId,
        channel: i64,
        offset: i64,
        length: i64,
    ) -> Result<Vec<f32>, SongError> {
        let (clip, buffer) = self.pooled(id)?;
        let channels = buffer.channels() as usize;
        let frames = buffer.frames();
        let channel = channel.rem_euclid(channels as i64) as usize;

        if offset < 0 || offset as usize >= frames || length < 0 {
            return Err(SongError::InvalidRange {
                offset,
                length,
                frames,
            });
        }
        if offset as u64 + length as u64 > frames as u64 {
            return Err(SongError::WindowOutOfRange {
                offset,
                length,
                frames,
            });
        }

        let start = offset as usize;
        let end = start + length as usize;
        let samples = buffer.samples();
        let volume = clip.volume;
        Ok((start..end)
            .map(|frame| samples[frame * channels + channel] * volume)
            .collect())
    }

    /// The archive path this song was last loaded from or saved to.
    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn bind_path(&mut self, path: impl Into<PathBuf>) {
        self.file_path = Some(path.into());
    }

    /// Register an observer for the refresh event emitted after grid
    /// mutations.
    pub fn subscribe(&self, observer: Arc<dyn UpdateObserver>) {
        self.notifier.subscribe(observer);
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
