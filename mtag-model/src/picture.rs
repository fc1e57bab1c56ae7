use serde::{Deserialize, Serialize};

/// Closed picture-type enumeration (ID3v2 APIC numbering), grounded on
/// `anni_flac::blocks::picture::PictureType` but re-derived as the
/// ID3v2-canonical closed set used across every supported container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[repr(u8)]
pub enum PictureKind {
    Other = 0,
    FileIcon = 1,
    OtherFileIcon = 2,
    FrontCover = 3,
    BackCover = 4,
    LeafletPage = 5,
    Media = 6,
    LeadArtist = 7,
    Artist = 8,
    Conductor = 9,
    Band = 10,
    Composer = 11,
    Lyricist = 12,
    RecordingLocation = 13,
    DuringRecording = 14,
    DuringPerformance = 15,
    MovieScreenCapture = 16,
    BrightColoredFish = 17,
    Illustration = 18,
    BandLogo = 19,
    PublisherLogo = 20,
}

impl PictureKind {
    pub fn from_apic_code(code: u8) -> Self {
        use PictureKind::*;
        match code {
            0 => Other,
            1 => FileIcon,
            2 => OtherFileIcon,
            3 => FrontCover,
            4 => BackCover,
            5 => LeafletPage,
            6 => Media,
            7 => LeadArtist,
            8 => Artist,
            9 => Conductor,
            10 => Band,
            11 => Composer,
            12 => Lyricist,
            13 => RecordingLocation,
            14 => DuringRecording,
            15 => DuringPerformance,
            16 => MovieScreenCapture,
            17 => BrightColoredFish,
            18 => Illustration,
            19 => BandLogo,
            20 => PublisherLogo,
            // Formats without a native closed enum (e.g. a generic
            // "cover" bit) map by best-effort equivalence to FrontCover.
            _ => FrontCover,
        }
    }

    pub fn as_apic_code(&self) -> u8 {
        *self as u8
    }
}

impl Default for PictureKind {
    /// Formats without their own picture-kind taxonomy map by
    /// best-effort equivalence, defaulting to FrontCover.
    fn default() -> Self {
        PictureKind::FrontCover
    }
}

/// An embedded image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Picture {
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(rename = "type")]
    pub kind: PictureKind,
    pub description: String,
}

impl Picture {
    pub fn new(mime_type: impl Into<String>, data: Vec<u8>, kind: PictureKind) -> Self {
        Picture {
            mime_type: mime_type.into(),
            data,
            kind,
            description: String::new(),
        }
    }

    /// Best-effort MIME sniffing from a file extension, used when a
    /// picture is attached without an explicit MIME type.
    pub fn mime_from_extension(ext: &str) -> Option<&'static str> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Some("image/jpeg"),
            "png" => Some("image/png"),
            "gif" => Some("image/gif"),
            "bmp" => Some("image/bmp"),
            _ => None,
        }
    }
}

mod base64_bytes {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    // Pictures travel as raw bytes over the wire codec (mtag-wire); this
    // Serde impl only backs JSON-shaped debug/export paths, so a compact
    // textual form is enough. Grounded on `anni_flac`'s use of the `hex`
    // crate for its StreamInfo MD5 signature.
    pub fn serialize<S: Serializer>(bytes: &[u8], ser: S) -> Result<S::Ok, S::Error> {
        hex::encode(bytes).serialize(ser)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(de: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(de)?;
        hex::decode(s).map_err(serde::de::Error::custom)
    }
}
