use serde::{Deserialize, Serialize};

/// The closed set of containers the engine recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ContainerFormat {
    Mp3,
    Mp4,
    Flac,
    Ogg,
    Wav,
    Other,
}

impl ContainerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Mp3 => "MP3",
            ContainerFormat::Mp4 => "MP4",
            ContainerFormat::Flac => "FLAC",
            ContainerFormat::Ogg => "OGG",
            ContainerFormat::Wav => "WAV",
            ContainerFormat::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
