//! Compact binary serialization of the metadata model, for moving results
//! across a process boundary (a worker subprocess, a batch job's
//! snapshot file). Grounded on the `bincode`-over-`serde` wire format
//! used for argument passing between processes in `ompl`.

use mtag_error::MtagError;
use mtag_model::{AudioProperties, BasicTag, Picture, PropertyMap, Rating};
use serde::{Deserialize, Serialize};

/// Everything about one file that's worth shipping across a boundary in
/// one shot, bundled so a batch worker can return a single encoded
/// envelope instead of five separate round trips.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadataEnvelope {
    pub tag: BasicTag,
    pub properties: Option<AudioProperties>,
    pub extended: PropertyMap,
    pub pictures: Vec<Picture>,
    pub ratings: Vec<Rating>,
}

pub fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, MtagError> {
    bincode::serialize(value).map_err(|e| MtagError::metadata_write(None, format!("encode failed: {e}")))
}

pub fn decode<T: for<'de> Deserialize<'de>>(bytes: &[u8]) -> Result<T, MtagError> {
    bincode::deserialize(bytes).map_err(|e| MtagError::metadata_read(None, format!("decode failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_round_trips_through_the_wire_codec() {
        let envelope = FileMetadataEnvelope {
            tag: BasicTag {
                title: "Title".into(),
                artist: "Artist".into(),
                ..BasicTag::default()
            },
            properties: Some(AudioProperties {
                length_seconds: 180,
                bitrate_kbps: 320,
                sample_rate_hz: 44_100,
                channels: 2,
                bits_per_sample: 16,
                codec: "MP3".into(),
                container_format: "MP3".into(),
                is_lossless: false,
            }),
            extended: {
                let mut map = PropertyMap::new();
                map.set_one("ALBUMARTIST", "Someone");
                map
            },
            pictures: vec![Picture::new(
                "image/jpeg",
                vec![1, 2, 3],
                mtag_model::PictureKind::FrontCover,
            )],
            ratings: vec![Rating {
                rating: 0.8,
                email: Some("a@b.com".into()),
                counter: None,
            }],
        };

        let bytes = encode(&envelope).unwrap();
        let decoded: FileMetadataEnvelope = decode(&bytes).unwrap();
        assert_eq!(decoded, envelope);
    }

    #[test]
    fn decode_rejects_truncated_bytes() {
        let result: Result<FileMetadataEnvelope, MtagError> = decode(&[1, 2, 3]);
        assert!(result.is_err());
    }
}
