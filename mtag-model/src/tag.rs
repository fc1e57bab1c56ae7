use serde::{Deserialize, Serialize};

/// Format-agnostic tag fields always present on a [`crate::ContainerFormat`].
/// Empty text and zero numerics mean "unset"; callers
/// that only want to touch a subset of fields use [`BasicTag::default`] plus
/// targeted assignment, then [`BasicTag::merge_onto`] to combine with a
/// previously-read tag without clobbering the untouched fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicTag {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub comment: String,
    pub genre: String,
    pub year: u32,
    pub track: u32,
}

impl BasicTag {
    /// Applies every non-default field of `partial` onto `self`, leaving
    /// fields `partial` left at their default ("unset") value untouched.
    /// Used by `apply_tags`/`update_tags`, where
    /// `read_tags(apply_tags(file, tag))` must equal `merge(original_tag, tag)`.
    pub fn merge_onto(&self, partial: &BasicTag) -> BasicTag {
        BasicTag {
            title: pick_text(&partial.title, &self.title),
            artist: pick_text(&partial.artist, &self.artist),
            album: pick_text(&partial.album, &self.album),
            comment: pick_text(&partial.comment, &self.comment),
            genre: pick_text(&partial.genre, &self.genre),
            year: pick_num(partial.year, self.year),
            track: pick_num(partial.track, self.track),
        }
    }

    /// A tag with every field reset to "unset" (used by `clear_tags`).
    pub fn cleared() -> Self {
        BasicTag::default()
    }
}

fn pick_text(new: &str, old: &str) -> String {
    if new.is_empty() {
        old.to_string()
    } else {
        new.to_string()
    }
}

fn pick_num(new: u32, old: u32) -> u32 {
    if new == 0 {
        old
    } else {
        new
    }
}

/// Read-only audio properties, computed on first access by the native
/// handle and cached for the [`crate::ContainerFormat`]'s lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioProperties {
    pub length_seconds: u32,
    pub bitrate_kbps: u32,
    pub sample_rate_hz: u32,
    pub channels: u8,
    /// 0 when not meaningful for the codec (e.g. most lossy codecs).
    pub bits_per_sample: u8,
    pub codec: String,
    pub container_format: String,
    pub is_lossless: bool,
}
