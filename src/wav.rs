use std::{
    fs::File,
    io::{Read, Seek, SeekFrom},
    path::Path,
};

use binrw::{io::BufReader, BinRead, BinReaderExt};
use thiserror::Error;

/// first 16 bytes of a wav written by the converter: the RIFF header and the id of the first chunk
#[derive(BinRead, Debug, Clone, Copy)]
pub struct RiffHeader {
    pub riff_id: [u8; 4],
    pub riff_size: u32,
    pub form_type: [u8; 4],
    pub first_chunk_id: [u8; 4],
}

impl RiffHeader {
    pub fn check(&self) -> Result<(), WavError> {
        if &self.riff_id != b"RIFF" {
            return Err(WavError::NotRiff(self.riff_id));
        }
        if &self.form_type != b"WAVE" {
            return Err(WavError::NotWave(self.form_type));
        }
        if &self.first_chunk_id != b"fmt " {
            return Err(WavError::NoFormat(self.first_chunk_id));
        }
        Ok(())
    }
}

/// contents of the `fmt ` chunk
#[derive(BinRead, Debug, Clone, Copy)]
pub struct FormatChunk {
    pub audio_format: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

#[derive(Error, Debug)]
pub enum WavError {
    #[error("expected a RIFF header, found {:?}", String::from_utf8_lossy(.0))]
    NotRiff([u8; 4]),
    #[error("expected decoded WAVE data, found RIFF form {:?}", String::from_utf8_lossy(.0))]
    NotWave([u8; 4]),
    #[error("expected the wav format chunk first, found {:?}", String::from_utf8_lossy(.0))]
    NoFormat([u8; 4]),
    #[error("truncated or unreadable wav header: {0}")]
    Read(#[from] binrw::Error),
}

/// reads the format chunk at the start of a wav file
pub fn read_format<RS: Read + Seek>(read: &mut RS) -> Result<FormatChunk, WavError> {
    let riff: RiffHeader = read.read_le()?;
    riff.check()?;
    // size of the fmt chunk, only its fixed part is needed
    read.seek(SeekFrom::Current(4)).map_err(binrw::Error::Io)?;
    Ok(read.read_le()?)
}

/// What the converter left at the destination
#[derive(Debug)]
pub enum OutputCheck {
    Wav(FormatChunk),
    Missing,
    Invalid(WavError),
}

impl OutputCheck {
    pub fn is_ok(&self) -> bool {
        matches!(self, OutputCheck::Wav(_))
    }
}

pub fn check_output(path: &Path) -> OutputCheck {
    match File::open(path) {
        Err(_) => OutputCheck::Missing,
        Ok(f) => match read_format(&mut BufReader::new(f)) {
            Ok(format) => OutputCheck::Wav(format),
            Err(e) => OutputCheck::Invalid(e),
        },
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::io::Cursor;

    use super::{check_output, read_format, OutputCheck, WavError};

    /// header of a 16 bit pcm wav without any samples
    pub fn empty_wav(channels: u16, sample_rate: u32) -> Vec<u8> {
        let mut buf = Vec::new();
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&36u32.to_le_bytes());
        buf.extend_from_slice(b"WAVEfmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes());
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&sample_rate.to_le_bytes());
        buf.extend_from_slice(&(sample_rate * channels as u32 * 2).to_le_bytes());
        buf.extend_from_slice(&(channels * 2).to_le_bytes());
        buf.extend_from_slice(&16u16.to_le_bytes());
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf
    }

    #[test]
    pub fn reads_pcm_header() {
        let format = read_format(&mut Cursor::new(empty_wav(2, 48000))).unwrap();
        assert_eq!(format.audio_format, 1);
        assert_eq!(format.channels, 2);
        assert_eq!(format.sample_rate, 48000);
        assert_eq!(format.block_align, 4);
        assert_eq!(format.bits_per_sample, 16);
    }

    #[test]
    pub fn rejects_other_files() {
        let mut wem = empty_wav(1, 44100);
        // wem files are riff too, but not wave
        wem[8..12].copy_from_slice(b"XWMA");
        let err = read_format(&mut Cursor::new(wem)).unwrap_err();
        assert!(matches!(err, WavError::NotWave(form) if &form == b"XWMA"));
        assert_eq!(
            err.to_string(),
            "expected decoded WAVE data, found RIFF form \"XWMA\""
        );
        assert!(matches!(
            read_format(&mut Cursor::new(b"OggS".to_vec())),
            Err(WavError::Read(_))
        ));
    }

    #[test]
    pub fn check_missing_output() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            check_output(&tmp.path().join("nothing.wav")),
            OutputCheck::Missing
        ));
        let path = tmp.path().join("out.wav");
        std::fs::write(&path, empty_wav(1, 22050)).unwrap();
        assert!(check_output(&path).is_ok());
    }
}
