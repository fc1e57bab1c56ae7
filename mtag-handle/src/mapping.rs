use lofty::picture::PictureType as LoftyPictureType;
use lofty::tag::ItemKey;
use mtag_model::PictureKind;

/// Maps a property-map key to the `lofty::ItemKey` that carries it across
/// every supported container. Keys outside this table fall back to
/// `ItemKey::Unknown`, which `lofty` projects onto a format-appropriate
/// free-form slot (ID3v2 `TXXX`, MP4 `----:`, a raw Vorbis comment key, …)
/// — verbatim pass-through for unrecognized keys.
pub fn schema_key_to_item_key(key: &str) -> ItemKey {
    match key {
        "MUSICBRAINZ_TRACKID" => ItemKey::MusicBrainzTrackId,
        "MUSICBRAINZ_ALBUMID" => ItemKey::MusicBrainzReleaseId,
        "MUSICBRAINZ_ARTISTID" => ItemKey::MusicBrainzArtistId,
        "ACOUSTID_ID" => ItemKey::AcoustidId,
        "ACOUSTID_FINGERPRINT" => ItemKey::AcoustidFingerprint,
        "REPLAYGAIN_TRACK_GAIN" => ItemKey::ReplayGainTrackGain,
        "REPLAYGAIN_TRACK_PEAK" => ItemKey::ReplayGainTrackPeak,
        "REPLAYGAIN_ALBUM_GAIN" => ItemKey::ReplayGainAlbumGain,
        "REPLAYGAIN_ALBUM_PEAK" => ItemKey::ReplayGainAlbumPeak,
        "ALBUMARTIST" => ItemKey::AlbumArtist,
        "COMPOSER" => ItemKey::Composer,
        "CONDUCTOR" => ItemKey::Conductor,
        "LYRICIST" => ItemKey::Lyricist,
        "PUBLISHER" => ItemKey::Publisher,
        "COPYRIGHT" => ItemKey::CopyrightMessage,
        "DISCNUMBER" => ItemKey::DiscNumber,
        "DISCTOTAL" => ItemKey::DiscTotal,
        "TRACKTOTAL" => ItemKey::TrackTotal,
        "LANGUAGE" => ItemKey::Language,
        "GROUPING" => ItemKey::ContentGroup,
        other => ItemKey::Unknown(other.to_string()),
    }
}

/// Inverse of [`schema_key_to_item_key`], used when enumerating a native
/// tag's items into a [`mtag_model::PropertyMap`]. Returns `None` for
/// `ItemKey`s already surfaced through [`mtag_model::BasicTag`] (title,
/// artist, album, comment, genre, year, track) so they aren't duplicated.
pub fn item_key_to_schema_key(key: &ItemKey) -> Option<String> {
    let mapped = match key {
        ItemKey::MusicBrainzTrackId => "MUSICBRAINZ_TRACKID",
        ItemKey::MusicBrainzReleaseId => "MUSICBRAINZ_ALBUMID",
        ItemKey::MusicBrainzArtistId => "MUSICBRAINZ_ARTISTID",
        ItemKey::AcoustidId => "ACOUSTID_ID",
        ItemKey::AcoustidFingerprint => "ACOUSTID_FINGERPRINT",
        ItemKey::ReplayGainTrackGain => "REPLAYGAIN_TRACK_GAIN",
        ItemKey::ReplayGainTrackPeak => "REPLAYGAIN_TRACK_PEAK",
        ItemKey::ReplayGainAlbumGain => "REPLAYGAIN_ALBUM_GAIN",
        ItemKey::ReplayGainAlbumPeak => "REPLAYGAIN_ALBUM_PEAK",
        ItemKey::AlbumArtist => "ALBUMARTIST",
        ItemKey::Composer => "COMPOSER",
        ItemKey::Conductor => "CONDUCTOR",
        ItemKey::Lyricist => "LYRICIST",
        ItemKey::Publisher => "PUBLISHER",
        ItemKey::CopyrightMessage => "COPYRIGHT",
        ItemKey::DiscNumber => "DISCNUMBER",
        ItemKey::DiscTotal => "DISCTOTAL",
        ItemKey::TrackTotal => "TRACKTOTAL",
        ItemKey::Language => "LANGUAGE",
        ItemKey::ContentGroup => "GROUPING",
        ItemKey::Unknown(raw) => return Some(raw.to_ascii_uppercase()),
        // Basic-tag fields and the rating/picture channels are surfaced
        // through their own accessors, not the generic property map.
        ItemKey::Title
        | ItemKey::TrackArtist
        | ItemKey::AlbumTitle
        | ItemKey::Comment
        | ItemKey::Genre
        | ItemKey::Year
        | ItemKey::TrackNumber
        | ItemKey::Popularimeter => return None,
        _ => return None,
    };
    Some(mapped.to_string())
}

pub fn picture_kind_to_lofty(kind: PictureKind) -> LoftyPictureType {
    match kind {
        PictureKind::Other => LoftyPictureType::Other,
        PictureKind::FileIcon => LoftyPictureType::Icon,
        PictureKind::OtherFileIcon => LoftyPictureType::OtherIcon,
        PictureKind::FrontCover => LoftyPictureType::CoverFront,
        PictureKind::BackCover => LoftyPictureType::CoverBack,
        PictureKind::LeafletPage => LoftyPictureType::Leaflet,
        PictureKind::Media => LoftyPictureType::Media,
        PictureKind::LeadArtist => LoftyPictureType::LeadArtist,
        PictureKind::Artist => LoftyPictureType::Artist,
        PictureKind::Conductor => LoftyPictureType::Conductor,
        PictureKind::Band => LoftyPictureType::Band,
        PictureKind::Composer => LoftyPictureType::Composer,
        PictureKind::Lyricist => LoftyPictureType::Lyricist,
        PictureKind::RecordingLocation => LoftyPictureType::RecordingLocation,
        PictureKind::DuringRecording => LoftyPictureType::DuringRecording,
        PictureKind::DuringPerformance => LoftyPictureType::DuringPerformance,
        PictureKind::MovieScreenCapture => LoftyPictureType::ScreenCapture,
        PictureKind::BrightColoredFish => LoftyPictureType::BrightFish,
        PictureKind::Illustration => LoftyPictureType::Illustration,
        PictureKind::BandLogo => LoftyPictureType::BandLogo,
        PictureKind::PublisherLogo => LoftyPictureType::PublisherLogo,
    }
}

pub fn lofty_picture_type_to_kind(kind: LoftyPictureType) -> PictureKind {
    match kind {
        LoftyPictureType::Other => PictureKind::Other,
        LoftyPictureType::Icon => PictureKind::FileIcon,
        LoftyPictureType::OtherIcon => PictureKind::OtherFileIcon,
        LoftyPictureType::CoverFront => PictureKind::FrontCover,
        LoftyPictureType::CoverBack => PictureKind::BackCover,
        LoftyPictureType::Leaflet => PictureKind::LeafletPage,
        LoftyPictureType::Media => PictureKind::Media,
        LoftyPictureType::LeadArtist => PictureKind::LeadArtist,
        LoftyPictureType::Artist => PictureKind::Artist,
        LoftyPictureType::Conductor => PictureKind::Conductor,
        LoftyPictureType::Band => PictureKind::Band,
        LoftyPictureType::Composer => PictureKind::Composer,
        LoftyPictureType::Lyricist => PictureKind::Lyricist,
        LoftyPictureType::RecordingLocation => PictureKind::RecordingLocation,
        LoftyPictureType::DuringRecording => PictureKind::DuringRecording,
        LoftyPictureType::DuringPerformance => PictureKind::DuringPerformance,
        LoftyPictureType::ScreenCapture => PictureKind::MovieScreenCapture,
        LoftyPictureType::BrightFish => PictureKind::BrightColoredFish,
        LoftyPictureType::Illustration => PictureKind::Illustration,
        LoftyPictureType::BandLogo => PictureKind::BandLogo,
        LoftyPictureType::PublisherLogo => PictureKind::PublisherLogo,
        // Formats with their own non-ID3v2 picture taxonomy (or an
        // undefined code) map by best-effort equivalence.
        _ => PictureKind::FrontCover,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_schema_key_round_trips_through_item_key() {
        let item_key = schema_key_to_item_key("X_CUSTOM_FIELD");
        assert!(matches!(item_key, ItemKey::Unknown(ref s) if s == "X_CUSTOM_FIELD"));
    }

    #[test]
    fn picture_kind_round_trips_through_lofty() {
        for kind in [
            PictureKind::FrontCover,
            PictureKind::BackCover,
            PictureKind::Artist,
            PictureKind::BandLogo,
        ] {
            let lofty_kind = picture_kind_to_lofty(kind);
            assert_eq!(lofty_picture_type_to_kind(lofty_kind), kind);
        }
    }
}
