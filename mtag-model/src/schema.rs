use crate::ContainerFormat;
use once_cell::sync::Lazy;

/// One recognized property key: which containers support it and, for
/// documentation/tooling purposes, the format-specific projection it maps
/// to.
///
/// Actual projection onto concrete frames/atoms/comments is delegated to
/// the native parsing library; this table only documents the closed set
/// of keys the engine treats as "known" rather than opaque pass-through
/// text.
pub struct PropertyKey {
    pub key: &'static str,
    pub supported: &'static [ContainerFormat],
    pub mapping: &'static str,
}

pub struct PropertySchema {
    keys: &'static [PropertyKey],
}

impl PropertySchema {
    pub fn lookup(&self, key: &str) -> Option<&'static PropertyKey> {
        self.keys.iter().find(|k| k.key == key)
    }

    /// Whether `key` is declared as supported for `format`. Keys absent
    /// from the schema are not declared "unsupported" by this method —
    /// unrecognized keys route through as verbatim pass-through regardless
    /// of format, so callers should only consult this for keys that
    /// `lookup` already resolved.
    pub fn supports(&self, key: &str, format: ContainerFormat) -> bool {
        self.lookup(key)
            .map(|k| k.supported.contains(&format))
            .unwrap_or(true)
    }

    pub fn known_keys(&self) -> impl Iterator<Item = &'static str> {
        self.keys.iter().map(|k| k.key)
    }
}

use ContainerFormat::*;

static KEYS: &[PropertyKey] = &[
    PropertyKey {
        key: "MUSICBRAINZ_TRACKID",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 UFID:http://musicbrainz.org | MP4 ----:com.apple.iTunes:MusicBrainz Track Id | Vorbis MUSICBRAINZ_TRACKID",
    },
    PropertyKey {
        key: "MUSICBRAINZ_ALBUMID",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TXXX:MusicBrainz Album Id | MP4 ----:com.apple.iTunes:MusicBrainz Album Id | Vorbis MUSICBRAINZ_ALBUMID",
    },
    PropertyKey {
        key: "MUSICBRAINZ_ARTISTID",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TXXX:MusicBrainz Artist Id | MP4 ----:com.apple.iTunes:MusicBrainz Artist Id | Vorbis MUSICBRAINZ_ARTISTID",
    },
    PropertyKey {
        key: "ACOUSTID_ID",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TXXX:Acoustid Id | MP4 ----:com.apple.iTunes:Acoustid Id | Vorbis ACOUSTID_ID",
    },
    PropertyKey {
        key: "ACOUSTID_FINGERPRINT",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TXXX:Acoustid Fingerprint | MP4 ----:com.apple.iTunes:Acoustid Fingerprint | Vorbis ACOUSTID_FINGERPRINT",
    },
    PropertyKey {
        key: "REPLAYGAIN_TRACK_GAIN",
        supported: &[Mp3, Mp4, Flac, Ogg, Wav],
        mapping: "ID3v2 TXXX:REPLAYGAIN_TRACK_GAIN | MP4 ----:com.apple.iTunes:replaygain_track_gain | Vorbis REPLAYGAIN_TRACK_GAIN",
    },
    PropertyKey {
        key: "REPLAYGAIN_TRACK_PEAK",
        supported: &[Mp3, Mp4, Flac, Ogg, Wav],
        mapping: "ID3v2 TXXX:REPLAYGAIN_TRACK_PEAK | MP4 ----:com.apple.iTunes:replaygain_track_peak | Vorbis REPLAYGAIN_TRACK_PEAK",
    },
    PropertyKey {
        key: "REPLAYGAIN_ALBUM_GAIN",
        supported: &[Mp3, Mp4, Flac, Ogg, Wav],
        mapping: "ID3v2 TXXX:REPLAYGAIN_ALBUM_GAIN | MP4 ----:com.apple.iTunes:replaygain_album_gain | Vorbis REPLAYGAIN_ALBUM_GAIN",
    },
    PropertyKey {
        key: "REPLAYGAIN_ALBUM_PEAK",
        supported: &[Mp3, Mp4, Flac, Ogg, Wav],
        mapping: "ID3v2 TXXX:REPLAYGAIN_ALBUM_PEAK | MP4 ----:com.apple.iTunes:replaygain_album_peak | Vorbis REPLAYGAIN_ALBUM_PEAK",
    },
    PropertyKey {
        key: "ALBUMARTIST",
        supported: &[Mp3, Mp4, Flac, Ogg, Wav],
        mapping: "ID3v2 TPE2 | MP4 aART | Vorbis ALBUMARTIST | RIFF IART (best-effort)",
    },
    PropertyKey {
        key: "COMPOSER",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TCOM | MP4 \u{a9}wrt | Vorbis COMPOSER",
    },
    PropertyKey {
        key: "CONDUCTOR",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TPE3 | MP4 ----:com.apple.iTunes:CONDUCTOR | Vorbis CONDUCTOR",
    },
    PropertyKey {
        key: "LYRICIST",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TEXT | MP4 ----:com.apple.iTunes:LYRICIST | Vorbis LYRICIST",
    },
    PropertyKey {
        key: "PUBLISHER",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TPUB | MP4 ----:com.apple.iTunes:LABEL | Vorbis PUBLISHER",
    },
    PropertyKey {
        key: "COPYRIGHT",
        supported: &[Mp3, Mp4, Flac, Ogg, Wav],
        mapping: "ID3v2 TCOP | MP4 cprt | Vorbis COPYRIGHT | RIFF ICOP",
    },
    PropertyKey {
        key: "DISCNUMBER",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TPOS | MP4 disk | Vorbis DISCNUMBER",
    },
    PropertyKey {
        key: "DISCTOTAL",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TPOS (combined) | MP4 disk (total) | Vorbis DISCTOTAL",
    },
    PropertyKey {
        key: "TRACKTOTAL",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TRCK (combined) | MP4 trkn (total) | Vorbis TRACKTOTAL",
    },
    PropertyKey {
        key: "LANGUAGE",
        supported: &[Mp3, Flac, Ogg],
        mapping: "ID3v2 TLAN | Vorbis LANGUAGE",
    },
    PropertyKey {
        key: "GROUPING",
        supported: &[Mp3, Mp4, Flac, Ogg],
        mapping: "ID3v2 TIT1 | MP4 \u{a9}grp | Vorbis GROUPING",
    },
];

pub static PROPERTY_SCHEMA: Lazy<PropertySchema> = Lazy::new(|| PropertySchema { keys: KEYS });

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_key_respects_support_matrix() {
        assert!(PROPERTY_SCHEMA.supports("LANGUAGE", ContainerFormat::Flac));
        assert!(!PROPERTY_SCHEMA.supports("LANGUAGE", ContainerFormat::Mp4));
    }

    #[test]
    fn unknown_key_is_treated_as_pass_through() {
        assert!(PROPERTY_SCHEMA.supports("X_NOT_IN_SCHEMA", ContainerFormat::Wav));
        assert!(PROPERTY_SCHEMA.lookup("X_NOT_IN_SCHEMA").is_none());
    }

    #[test]
    fn musicbrainz_trackid_is_declared_for_the_four_tagged_containers() {
        let entry = PROPERTY_SCHEMA.lookup("MUSICBRAINZ_TRACKID").unwrap();
        assert_eq!(entry.supported.len(), 4);
    }
}
