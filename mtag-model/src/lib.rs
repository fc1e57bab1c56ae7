//! Format-agnostic metadata model: the basic tag, typed property map,
//! pictures, ratings, audio properties, and the property schema that
//! projects them onto concrete container formats.
//!
//! Grounded on the shape of `anni_flac::blocks::comment::BlockVorbisComment`
//! (ordered multi-valued comments) and `anni_flac::blocks::picture::BlockPicture`
//! / `PictureType` (the closed picture-kind enumeration).

mod format;
mod picture;
mod property_map;
mod rating;
mod schema;
mod tag;

pub use format::ContainerFormat;
pub use picture::{Picture, PictureKind};
pub use property_map::PropertyMap;
pub use rating::{popm_to_rating, rating_to_popm, Rating};
pub use schema::{PropertyKey, PropertySchema, PROPERTY_SCHEMA};
pub use tag::{AudioProperties, BasicTag};
