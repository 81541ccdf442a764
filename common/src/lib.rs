//! School Directory Common Library
//!
//! Wire types, the image-column codec and the listing filter, shared by
//! the client core and the in-process server.

pub mod error;
pub mod filter;
pub mod image_column;
pub mod types;

pub use error::{Error, Result};
pub use filter::{
    badge_counts, filter_records, option_counts, BadgeCounts, FilterCriteria, OptionCount,
    OptionCounts,
};
pub use image_column::{coerce_image_value, decode_image_column, encode_image_column};
pub use types::{
    decode_records, error_message, ErrorBody, ImageReference, MessageBody, NewSchool, Record,
    RecordId, SchoolFields, UploadResponse,
};

/// Maximum number of images per record
pub const MAX_IMAGES: usize = 10;
