//! Creation time from ISO base media files (MP4/MOV).
//!
//! Only the movie header is read: `moov/mvhd` stores the creation time as
//! seconds since 1904-01-01 UTC, 32-bit in version 0 and 64-bit in
//! version 1. Nothing else in the container is interpreted.

use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use crate::source::{MediaError, RecordingStartSource};

/// Seconds between 1904-01-01 and 1970-01-01.
const MAC_TO_UNIX_EPOCH_SECS: u64 = 2_082_844_800;

/// Reads the recording start from the video container's movie header.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mp4CreationTime;

impl RecordingStartSource for Mp4CreationTime {
    fn recording_start(&self, media: &Path) -> Result<i64, MediaError> {
        let file = File::open(media).map_err(|e| MediaError::Io {
            path: media.to_path_buf(),
            source: e,
        })?;
        let mac_secs = read_creation_time(BufReader::new(file), media)?;
        let unix = mac_secs
            .checked_sub(MAC_TO_UNIX_EPOCH_SECS)
            .ok_or_else(|| MediaError::BeforeUnixEpoch {
                path: media.to_path_buf(),
            })?;
        let unix = i64::try_from(unix).map_err(|_| MediaError::Malformed {
            path: media.to_path_buf(),
            message: format!("creation time {mac_secs} out of range"),
        })?;

        if let Some(at) = chrono::DateTime::from_timestamp(unix, 0) {
            tracing::debug!(path = %media.display(), created = %at.to_rfc3339(), "Read creation time");
        }
        Ok(unix)
    }
}

/// Header of one box: its four-character type and the range of its payload.
struct BoxHeader {
    kind: [u8; 4],
    payload_start: u64,
    end: u64,
}

fn read_box_header<R: Read + Seek>(
    reader: &mut R,
    limit: u64,
    path: &Path,
) -> Result<Option<BoxHeader>, MediaError> {
    let start = reader.stream_position().map_err(io_err(path))?;
    if start + 8 > limit {
        return Ok(None);
    }

    let mut head = [0u8; 8];
    reader.read_exact(&mut head).map_err(io_err(path))?;
    let size32 = u32::from_be_bytes([head[0], head[1], head[2], head[3]]);
    let kind = [head[4], head[5], head[6], head[7]];

    let (size, header_len) = match size32 {
        0 => (limit - start, 8),
        1 => {
            let mut large = [0u8; 8];
            reader.read_exact(&mut large).map_err(io_err(path))?;
            (u64::from_be_bytes(large), 16)
        }
        n => (u64::from(n), 8),
    };

    if size < header_len || start + size > limit {
        return Err(MediaError::Malformed {
            path: path.to_path_buf(),
            message: format!(
                "box '{}' at offset {start} has invalid size {size}",
                String::from_utf8_lossy(&kind)
            ),
        });
    }

    Ok(Some(BoxHeader {
        kind,
        payload_start: start + header_len,
        end: start + size,
    }))
}

/// Position `reader` at the payload of the first `kind` box within
/// `[reader position, limit)`, returning the box end.
fn find_box<R: Read + Seek>(
    reader: &mut R,
    kind: &[u8; 4],
    limit: u64,
    path: &Path,
    name: &'static str,
) -> Result<u64, MediaError> {
    while let Some(header) = read_box_header(reader, limit, path)? {
        if &header.kind == kind {
            reader
                .seek(SeekFrom::Start(header.payload_start))
                .map_err(io_err(path))?;
            return Ok(header.end);
        }
        reader
            .seek(SeekFrom::Start(header.end))
            .map_err(io_err(path))?;
    }
    Err(MediaError::MissingBox {
        path: path.to_path_buf(),
        name,
    })
}

/// Creation time stored in `moov/mvhd`, in seconds since 1904-01-01.
pub fn read_creation_time<R: Read + Seek>(mut reader: R, path: &Path) -> Result<u64, MediaError> {
    let len = reader.seek(SeekFrom::End(0)).map_err(io_err(path))?;
    reader.seek(SeekFrom::Start(0)).map_err(io_err(path))?;

    let moov_end = find_box(&mut reader, b"moov", len, path, "moov")?;
    find_box(&mut reader, b"mvhd", moov_end, path, "mvhd")?;

    let mut version_flags = [0u8; 4];
    reader
        .read_exact(&mut version_flags)
        .map_err(io_err(path))?;

    match version_flags[0] {
        0 => {
            let mut t = [0u8; 4];
            reader.read_exact(&mut t).map_err(io_err(path))?;
            Ok(u64::from(u32::from_be_bytes(t)))
        }
        1 => {
            let mut t = [0u8; 8];
            reader.read_exact(&mut t).map_err(io_err(path))?;
            Ok(u64::from_be_bytes(t))
        }
        v => Err(MediaError::Malformed {
            path: path.to_path_buf(),
            message: format!("unsupported mvhd version {v}"),
        }),
    }
}

fn io_err(path: &Path) -> impl Fn(std::io::Error) -> MediaError + '_ {
    move |e| MediaError::Io {
        path: PathBuf::from(path),
        source: e,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn boxed(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
        out.extend_from_slice(kind);
        out.extend_from_slice(payload);
        out
    }

    fn mvhd_v0(creation: u32) -> Vec<u8> {
        let mut payload = vec![0, 0, 0, 0];
        payload.extend_from_slice(&creation.to_be_bytes());
        payload.extend_from_slice(&creation.to_be_bytes()); // modification time
        boxed(b"mvhd", &payload)
    }

    fn movie(mvhd: Vec<u8>) -> Vec<u8> {
        let mut file = boxed(b"ftyp", b"isom\0\0\0\0");
        file.extend(boxed(b"free", &[0; 16]));
        let mut moov_payload = mvhd;
        moov_payload.extend(boxed(b"trak", &[0; 8]));
        file.extend(boxed(b"moov", &moov_payload));
        file
    }

    #[test]
    fn test_reads_version0_creation_time() {
        let mac = 1_658_789_494u64 + MAC_TO_UNIX_EPOCH_SECS;
        let bytes = movie(mvhd_v0(mac as u32));
        let secs = read_creation_time(Cursor::new(bytes), Path::new("clip.mp4")).unwrap();
        assert_eq!(secs, mac);
    }

    #[test]
    fn test_reads_version1_creation_time() {
        let mac = 1_658_789_494u64 + MAC_TO_UNIX_EPOCH_SECS;
        let mut payload = vec![1, 0, 0, 0];
        payload.extend_from_slice(&mac.to_be_bytes());
        let bytes = movie(boxed(b"mvhd", &payload));
        let secs = read_creation_time(Cursor::new(bytes), Path::new("clip.mov")).unwrap();
        assert_eq!(secs, mac);
    }

    #[test]
    fn test_missing_moov() {
        let bytes = boxed(b"ftyp", b"isom\0\0\0\0");
        let err = read_creation_time(Cursor::new(bytes), Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, MediaError::MissingBox { name: "moov", .. }));
    }

    #[test]
    fn test_truncated_box_is_malformed() {
        let mut bytes = boxed(b"moov", &[0; 4]);
        bytes[3] = 200; // claims more bytes than the file holds
        let err = read_creation_time(Cursor::new(bytes), Path::new("clip.mp4")).unwrap_err();
        assert!(matches!(err, MediaError::Malformed { .. }));
    }

    #[test]
    fn test_recording_start_converts_to_unix_seconds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        let mac = 1_658_789_494u64 + MAC_TO_UNIX_EPOCH_SECS;
        std::fs::write(&path, movie(mvhd_v0(mac as u32))).unwrap();

        let start = Mp4CreationTime.recording_start(&path).unwrap();
        assert_eq!(start, 1_658_789_494);
    }

    #[test]
    fn test_zero_creation_time_predates_unix_epoch() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, movie(mvhd_v0(0))).unwrap();

        let err = Mp4CreationTime.recording_start(&path).unwrap_err();
        assert!(matches!(err, MediaError::BeforeUnixEpoch { .. }));
    }
}
