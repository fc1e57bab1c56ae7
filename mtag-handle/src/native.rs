use crate::mapping::{
    item_key_to_schema_key, lofty_picture_type_to_kind, picture_kind_to_lofty, schema_key_to_item_key,
};
use lofty::config::WriteOptions;
use lofty::file::{AudioFile, FileType, TaggedFile, TaggedFileExt};
use lofty::picture::{MimeType, Picture as LoftyPicture};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey, ItemValue, Tag, TagItem};
use mtag_error::MtagError;
use mtag_model::{AudioProperties, BasicTag, ContainerFormat, Picture, PictureKind, Rating};
use std::io::Cursor;

/// The single item key under which a Popularimeter-shaped rating is
/// serialized. Storing it this way, rather than relying on a
/// format-specific POPM parser, lets every supported container carry
/// multiple raters uniformly.
const RATING_KEY: &str = "__MTAG_RATING__";

fn rating_item_key() -> ItemKey {
    ItemKey::Unknown(RATING_KEY.to_string())
}

fn encode_rating(rating: &Rating) -> String {
    let popm = mtag_model::rating_to_popm(rating.rating);
    format!(
        "{}\u{1}{}\u{1}{}",
        rating.email.clone().unwrap_or_default(),
        popm,
        rating.counter.map(|c| c.to_string()).unwrap_or_default(),
    )
}

fn decode_rating(text: &str) -> Option<Rating> {
    let mut parts = text.split('\u{1}');
    let email = parts.next()?;
    let popm: u8 = parts.next()?.parse().ok()?;
    let counter = parts.next().and_then(|c| c.parse().ok());
    Some(Rating {
        rating: mtag_model::popm_to_rating(popm),
        email: if email.is_empty() { None } else { Some(email.to_string()) },
        counter,
    })
}

fn map_file_type(ft: FileType) -> ContainerFormat {
    match ft {
        FileType::Mpeg => ContainerFormat::Mp3,
        FileType::Mp4 => ContainerFormat::Mp4,
        FileType::Flac => ContainerFormat::Flac,
        FileType::Vorbis | FileType::Opus | FileType::Speex => ContainerFormat::Ogg,
        FileType::Wav => ContainerFormat::Wav,
        _ => ContainerFormat::Other,
    }
}

/// Thin wrapper over `lofty::TaggedFile` exposing the native handle
/// operation set. Everything above this layer (the stateful
/// [`crate::FileHandle`], simple operations, batch scanner, …) goes
/// through here rather than touching `lofty` directly.
pub struct NativeHandle {
    file: TaggedFile,
    buffer: Vec<u8>,
    saved: bool,
}

impl NativeHandle {
    /// Fails with `InvalidFormat` carrying the input size when the bytes
    /// aren't a recognized, fully-parseable container.
    pub fn load_from_bytes(bytes: Vec<u8>) -> Result<Self, MtagError> {
        let size = bytes.len() as u64;
        let cursor = Cursor::new(bytes.clone());
        let probed = Probe::new(cursor)
            .guess_file_type()
            .map_err(|e| MtagError::invalid_format(size, e.to_string()))?;
        let file = probed
            .read()
            .map_err(|e| MtagError::invalid_format(size, e.to_string()))?;
        Ok(NativeHandle {
            file,
            buffer: bytes,
            saved: false,
        })
    }

    /// A `NativeHandle` only exists once `load_from_bytes` has already
    /// parsed the container successfully, so this is always `true`; kept
    /// as a method so callers don't need to special-case construction.
    pub fn is_valid(&self) -> bool {
        true
    }

    pub fn format(&self) -> ContainerFormat {
        map_file_type(self.file.file_type())
    }

    pub fn is_mp4(&self) -> bool {
        self.file.file_type() == FileType::Mp4
    }

    fn tag(&self) -> Option<&Tag> {
        self.file.primary_tag().or_else(|| self.file.first_tag())
    }

    fn tag_mut(&mut self) -> Option<&mut Tag> {
        if self.file.primary_tag_mut().is_some() {
            self.file.primary_tag_mut()
        } else {
            self.file.first_tag_mut()
        }
    }

    fn require_tag_mut(&mut self) -> Result<&mut Tag, MtagError> {
        self.tag_mut()
            .ok_or_else(|| MtagError::metadata_write(None, "file has no tag container to write into"))
    }

    pub fn basic_tag(&self) -> BasicTag {
        let Some(tag) = self.tag() else {
            return BasicTag::default();
        };
        BasicTag {
            title: tag.title().map(|c| c.into_owned()).unwrap_or_default(),
            artist: tag.artist().map(|c| c.into_owned()).unwrap_or_default(),
            album: tag.album().map(|c| c.into_owned()).unwrap_or_default(),
            comment: tag.comment().map(|c| c.into_owned()).unwrap_or_default(),
            genre: tag.genre().map(|c| c.into_owned()).unwrap_or_default(),
            year: tag.year().unwrap_or(0),
            track: tag.track().unwrap_or(0),
        }
    }

    pub fn set_basic_tag(&mut self, value: &BasicTag) -> Result<(), MtagError> {
        let tag = self.require_tag_mut()?;
        set_or_clear(value.title.clone(), |t| tag.set_title(t), || tag.remove_title());
        let tag = self.require_tag_mut()?;
        set_or_clear(value.artist.clone(), |t| tag.set_artist(t), || tag.remove_artist());
        let tag = self.require_tag_mut()?;
        set_or_clear(value.album.clone(), |t| tag.set_album(t), || tag.remove_album());
        let tag = self.require_tag_mut()?;
        set_or_clear(value.comment.clone(), |t| tag.set_comment(t), || tag.remove_comment());
        let tag = self.require_tag_mut()?;
        set_or_clear(value.genre.clone(), |t| tag.set_genre(t), || tag.remove_genre());
        let tag = self.require_tag_mut()?;
        if value.year == 0 {
            tag.remove_year();
        } else {
            tag.set_year(value.year);
        }
        let tag = self.require_tag_mut()?;
        if value.track == 0 {
            tag.remove_track();
        } else {
            tag.set_track(value.track);
        }
        Ok(())
    }

    pub fn audio_properties(&self) -> Option<AudioProperties> {
        let props = self.file.properties();
        let format = self.format();
        let codec = match self.file.file_type() {
            FileType::Mpeg => "MP3",
            FileType::Mp4 => "AAC/ALAC",
            FileType::Flac => "FLAC",
            FileType::Vorbis => "Vorbis",
            FileType::Opus => "Opus",
            FileType::Wav => "PCM",
            _ => "unknown",
        };
        let is_lossless = matches!(
            self.file.file_type(),
            FileType::Flac | FileType::Wav | FileType::WavPack | FileType::Ape
        );
        Some(AudioProperties {
            length_seconds: props.duration().as_secs() as u32,
            bitrate_kbps: props.audio_bitrate().unwrap_or(0),
            sample_rate_hz: props.sample_rate().unwrap_or(0),
            channels: props.channels().unwrap_or(0),
            bits_per_sample: props.bit_depth().unwrap_or(0),
            codec: codec.to_string(),
            container_format: format.as_str().to_string(),
            is_lossless,
        })
    }

    pub fn get_property(&self, key: &str) -> Option<String> {
        let tag = self.tag()?;
        let item_key = schema_key_to_item_key(key);
        tag.get_string(&item_key).map(|s| s.to_string()).filter(|s| !s.is_empty())
    }

    pub fn set_property(&mut self, key: &str, value: &str) -> Result<(), MtagError> {
        let tag = self.require_tag_mut()?;
        let item_key = schema_key_to_item_key(key);
        if value.is_empty() {
            tag.remove_key(&item_key);
        } else {
            tag.insert_text(item_key, value.to_string());
        }
        Ok(())
    }

    pub fn get_properties(&self) -> mtag_model::PropertyMap {
        let mut map = mtag_model::PropertyMap::new();
        let Some(tag) = self.tag() else {
            return map;
        };
        for item in tag.items() {
            let Some(key) = item_key_to_schema_key(item.key()) else {
                continue;
            };
            if key == RATING_KEY {
                continue;
            }
            if let ItemValue::Text(text) = item.value() {
                let mut values = map.get(&key).to_vec();
                values.push(text.clone());
                map.set(key, values);
            }
        }
        map
    }

    pub fn set_properties(&mut self, properties: &mtag_model::PropertyMap) -> Result<(), MtagError> {
        for key in properties.keys() {
            let item_key = schema_key_to_item_key(key);
            let tag = self.require_tag_mut()?;
            tag.remove_key(&item_key);
        }
        for (key, values) in properties.iter() {
            let item_key = schema_key_to_item_key(key);
            let tag = self.require_tag_mut()?;
            for value in values {
                tag.push(TagItem::new(item_key.clone(), ItemValue::Text(value.clone())));
            }
        }
        Ok(())
    }

    pub fn get_mp4_item(&self, name: &str) -> Result<Option<String>, MtagError> {
        self.require_mp4()?;
        let Some(tag) = self.tag() else { return Ok(None) };
        let item_key = mp4_item_key(name);
        Ok(tag.get_string(&item_key).map(|s| s.to_string()).filter(|s| !s.is_empty()))
    }

    pub fn set_mp4_item(&mut self, name: &str, value: &str) -> Result<(), MtagError> {
        self.require_mp4()?;
        let item_key = mp4_item_key(name);
        let tag = self.require_tag_mut()?;
        if value.is_empty() {
            tag.remove_key(&item_key);
        } else {
            tag.insert_text(item_key, value.to_string());
        }
        Ok(())
    }

    pub fn remove_mp4_item(&mut self, name: &str) -> Result<(), MtagError> {
        self.require_mp4()?;
        let item_key = mp4_item_key(name);
        let tag = self.require_tag_mut()?;
        tag.remove_key(&item_key);
        Ok(())
    }

    fn require_mp4(&self) -> Result<(), MtagError> {
        if self.is_mp4() {
            Ok(())
        } else {
            Err(MtagError::unsupported_format(vec!["MP4", "M4A"], Some(self.format().as_str())))
        }
    }

    pub fn get_pictures(&self) -> Vec<Picture> {
        let Some(tag) = self.tag() else { return Vec::new() };
        tag.pictures()
            .iter()
            .map(|p| Picture {
                mime_type: p
                    .mime_type()
                    .map(|m| m.as_str().to_string())
                    .unwrap_or_default(),
                data: p.data().to_vec(),
                kind: lofty_picture_type_to_kind(p.pic_type()),
                description: p.description().map(|d| d.to_string()).unwrap_or_default(),
            })
            .collect()
    }

    pub fn set_pictures(&mut self, pictures: &[Picture]) -> Result<(), MtagError> {
        let tag = self.require_tag_mut()?;
        let old_count = tag.picture_count() as usize;
        for i in (0..old_count).rev() {
            tag.remove_picture(i);
        }
        for picture in pictures {
            tag.push_picture(to_lofty_picture(picture));
        }
        Ok(())
    }

    pub fn add_picture(&mut self, picture: &Picture) -> Result<(), MtagError> {
        let tag = self.require_tag_mut()?;
        tag.push_picture(to_lofty_picture(picture));
        Ok(())
    }

    pub fn remove_pictures(&mut self) -> Result<(), MtagError> {
        let tag = self.require_tag_mut()?;
        let count = tag.picture_count() as usize;
        for i in (0..count).rev() {
            tag.remove_picture(i);
        }
        Ok(())
    }

    pub fn get_ratings(&self) -> Vec<Rating> {
        let Some(tag) = self.tag() else { return Vec::new() };
        tag.items()
            .filter(|item| matches!(item.key(), ItemKey::Unknown(k) if k == RATING_KEY))
            .filter_map(|item| match item.value() {
                ItemValue::Text(text) => decode_rating(text),
                _ => None,
            })
            .collect()
    }

    pub fn set_ratings(&mut self, ratings: &[Rating]) -> Result<(), MtagError> {
        let tag = self.require_tag_mut()?;
        tag.remove_key(&rating_item_key());
        for rating in ratings {
            tag.push(TagItem::new(rating_item_key(), ItemValue::Text(encode_rating(rating))));
        }
        Ok(())
    }

    /// Persists edits into the in-memory buffer, returning whether the
    /// underlying write succeeded.
    pub fn save(&mut self) -> Result<bool, MtagError> {
        let mut cursor = Cursor::new(Vec::new());
        self.file
            .save_to(&mut cursor, WriteOptions::default())
            .map_err(|e| MtagError::metadata_write(None, e.to_string()))?;
        self.buffer = cursor.into_inner();
        self.saved = true;
        Ok(true)
    }

    pub fn get_buffer(&self) -> &[u8] {
        &self.buffer
    }

    pub fn has_saved(&self) -> bool {
        self.saved
    }
}

fn set_or_clear(value: String, mut set: impl FnMut(String), mut clear: impl FnMut()) {
    if value.is_empty() {
        clear();
    } else {
        set(value);
    }
}

fn mp4_item_key(name: &str) -> ItemKey {
    if name == "iTunNORM" {
        ItemKey::Unknown("iTunNORM".to_string())
    } else {
        ItemKey::Unknown(format!("----:com.apple.iTunes:{name}"))
    }
}

fn to_lofty_picture(picture: &Picture) -> LoftyPicture {
    let mime = MimeType::from_str(&picture.mime_type);
    LoftyPicture::new_unchecked(
        picture_kind_to_lofty(picture.kind),
        Some(mime),
        Some(picture.description.clone()).filter(|d| !d.is_empty()),
        picture.data.clone(),
    )
}

trait MimeTypeExt {
    fn from_str(s: &str) -> MimeType;
}

impl MimeTypeExt for MimeType {
    fn from_str(s: &str) -> MimeType {
        match s {
            "image/jpeg" | "image/jpg" => MimeType::Jpeg,
            "image/png" => MimeType::Png,
            "image/gif" => MimeType::Gif,
            "image/bmp" => MimeType::Bmp,
            "image/tiff" => MimeType::Tiff,
            other => MimeType::Unknown(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_encoding_round_trips() {
        let rating = Rating {
            rating: 0.75,
            email: Some("a@b.com".into()),
            counter: Some(3),
        };
        let encoded = encode_rating(&rating);
        let decoded = decode_rating(&encoded).unwrap();
        assert_eq!(decoded.email, rating.email);
        assert_eq!(decoded.counter, rating.counter);
        assert!((decoded.rating - rating.rating).abs() < 0.01);
    }

    #[test]
    fn mp4_item_key_special_cases_sound_check() {
        assert!(matches!(mp4_item_key("iTunNORM"), ItemKey::Unknown(ref s) if s == "iTunNORM"));
        assert!(matches!(
            mp4_item_key("CONDUCTOR"),
            ItemKey::Unknown(ref s) if s == "----:com.apple.iTunes:CONDUCTOR"
        ));
    }

    #[test]
    fn invalid_bytes_surface_invalid_format() {
        let err = NativeHandle::load_from_bytes(vec![0u8; 10]).unwrap_err();
        assert!(err.is_invalid_format());
    }
}
