use std::fs::File;
use std::io::Cursor;
use std::path::Path;

use loopgrid_model::SampleBuffer;
use symphonia::core::audio::SampleBuffer as SymphoniaSampleBuffer;
use symphonia::core::codecs::DecoderOptions;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Accent-stripped, path-prefix-stripped form of an audio source identifier.
///
/// The identifier is NFD-decomposed, combining marks are dropped, and only
/// the part after the final `/` is kept. This is the name audio gets stored
/// under inside an archive, and the key clip metadata references it by.
pub fn sanitized_basename(identifier: &str) -> String {
    let stripped: String = identifier.nfd().filter(|c| !is_combining_mark(*c)).collect();
    stripped
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_string()
}

/// Decode an in-memory audio payload into an interleaved f32 buffer at its
/// original sample rate.
///
/// `name` is only used as a format hint (its extension feeds the probe).
pub fn decode_bytes(bytes: Vec<u8>, name: &str) -> anyhow::Result<SampleBuffer> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes)), Default::default());
    decode_stream(mss, hint_for(Path::new(name)))
}

/// Decode an audio file on disk, for populating a song's pool before save.
pub fn decode_file(path: &Path) -> anyhow::Result<SampleBuffer> {
    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());
    decode_stream(mss, hint_for(path))
}

fn hint_for(path: &Path) -> Hint {
    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    hint
}

fn decode_stream(mss: MediaSourceStream, hint: Hint) -> anyhow::Result<SampleBuffer> {
    let probed = symphonia::default::get_probe().format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;

    let mut format = probed.format;

    let track = format
        .default_track()
        .ok_or_else(|| anyhow::anyhow!("no default track"))?;
    let track_id = track.id;

    let mut decoder =
        symphonia::default::get_codecs().make(&track.codec_params, &DecoderOptions::default())?;

    let mut samples = Vec::new();
    // Taken from the first decoded packet rather than the codec params,
    // which some formats leave unset.
    let mut signal: Option<(u32, u16)> = None;

    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(symphonia::core::errors::Error::IoError(e))
                if e.kind() == std::io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(e) => return Err(e.into()),
        };

        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder.decode(&packet)?;
        let spec = *decoded.spec();
        signal.get_or_insert((spec.rate, spec.channels.count() as u16));

        let mut sample_buf = SymphoniaSampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
        sample_buf.copy_interleaved_ref(decoded);
        samples.extend_from_slice(sample_buf.samples());
    }

    let (sample_rate, channels) =
        signal.ok_or_else(|| anyhow::anyhow!("audio stream contains no packets"))?;
    Ok(SampleBuffer::new(samples, sample_rate, channels))
}

/// Encode a buffer as a self-describing 32-bit float PCM WAV payload at the
/// buffer's own sample rate.
pub fn encode_wav(buffer: &SampleBuffer) -> anyhow::Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: buffer.channels(),
        sample_rate: buffer.sample_rate(),
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
    for &sample in buffer.samples() {
        writer.write_sample(sample)?;
    }
    writer.finalize()?;

    Ok(cursor.into_inner())
}
