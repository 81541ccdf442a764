//! Wire types
//!
//! Shared by the client core and the in-process server:
//! - ImageReference: opaque handle issued by image storage
//! - Record: a persisted school listing
//! - SchoolFields / NewSchool: record-creation payload
//! - UploadResponse / ErrorBody / MessageBody: endpoint bodies

use crate::error::{Error, Result};
use crate::image_column::coerce_image_value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned record identifier
pub type RecordId = i64;

/// Opaque reference returned by image storage (filename or secure URL)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// School listing as returned by `GET /schools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawRecord")]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact_number: String,
    pub email_id: String,
    pub images: Vec<ImageReference>,
}

/// Lenient wire shape: accepts `images` or the legacy singular `image`
#[derive(Deserialize)]
struct RawRecord {
    id: RecordId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
    #[serde(default, alias = "contact")]
    contact_number: serde_json::Value,
    #[serde(default)]
    email_id: String,
    #[serde(default)]
    images: serde_json::Value,
    #[serde(default)]
    image: serde_json::Value,
}

impl From<RawRecord> for Record {
    fn from(raw: RawRecord) -> Self {
        let images = if raw.images.is_null() {
            coerce_image_value(raw.image)
        } else {
            coerce_image_value(raw.images)
        };

        // Some stores hand the contact column back as a number
        let contact_number = match raw.contact_number {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };

        Self {
            id: raw.id,
            name: raw.name,
            address: raw.address,
            city: raw.city,
            state: raw.state,
            contact_number,
            email_id: raw.email_id,
            images,
        }
    }
}

impl Record {
    /// Whether this record rotates through more than one image
    pub fn is_multi_image(&self) -> bool {
        self.images.len() > 1
    }
}

/// Form fields of a new school
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchoolFields {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub contact: String,
    pub email_id: String,
}

impl SchoolFields {
    /// True when any field is empty
    pub fn has_missing(&self) -> bool {
        [
            &self.name,
            &self.address,
            &self.city,
            &self.state,
            &self.contact,
            &self.email_id,
        ]
        .iter()
        .any(|v| v.trim().is_empty())
    }
}

/// `POST /schools` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewSchool {
    #[serde(flatten)]
    pub fields: SchoolFields,
    pub images: Vec<ImageReference>,
}

/// `POST /schools/images` success body
///
/// The disk backend answers with `filenames`, hosted storage with `urls`.
/// When both are present `urls` wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawUploadResponse")]
pub struct UploadResponse {
    pub urls: Vec<ImageReference>,
}

#[derive(Deserialize)]
struct RawUploadResponse {
    #[serde(default)]
    urls: Option<Vec<ImageReference>>,
    #[serde(default)]
    filenames: Option<Vec<ImageReference>>,
}

impl From<RawUploadResponse> for UploadResponse {
    fn from(raw: RawUploadResponse) -> Self {
        Self {
            urls: raw.urls.or(raw.filenames).unwrap_or_default(),
        }
    }
}

/// Failure body of every endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Success body of `POST /schools`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

/// Decode a `GET /schools` body.
pub fn decode_records(body: &str) -> Result<Vec<Record>> {
    let value: serde_json::Value = serde_json::from_str(body)?;
    if !value.is_array() {
        return Err(Error::InvalidPayload("expected an array of schools".into()));
    }
    Ok(serde_json::from_value(value)?)
}

/// Extract the `{error}` message of a failure body, if any.
pub fn error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.error)
        .filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_images_array() {
        let body = r#"[{"id":7,"name":"Sunrise","address":"1 Main","city":"Pune","state":"MH",
            "contact_number":"9876543210","email_id":"a@b.in","images":["a.jpg","b.jpg"]}]"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].images,
            vec![ImageReference::new("a.jpg"), ImageReference::new("b.jpg")]
        );
        assert!(records[0].is_multi_image());
    }

    #[test]
    fn test_record_with_legacy_scalar_image() {
        let body = r#"[{"id":1,"name":"Old","city":"Goa","state":"GA","image":"a.jpg"}]"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records[0].images, vec![ImageReference::new("a.jpg")]);
        assert!(!records[0].is_multi_image());
    }

    #[test]
    fn test_record_numeric_contact() {
        let body = r#"[{"id":1,"contact_number":9876543210,"images":[]}]"#;
        let records = decode_records(body).unwrap();
        assert_eq!(records[0].contact_number, "9876543210");
        assert!(records[0].images.is_empty());
    }

    #[test]
    fn test_decode_records_rejects_object() {
        let result = decode_records(r#"{"error":"boom"}"#);
        assert!(matches!(result, Err(Error::InvalidPayload(_))));
    }

    #[test]
    fn test_upload_response_accepts_both_keys() {
        let urls: UploadResponse = serde_json::from_str(r#"{"urls":["x","y"]}"#).unwrap();
        let names: UploadResponse = serde_json::from_str(r#"{"filenames":["x","y"]}"#).unwrap();
        assert_eq!(urls, names);
        assert_eq!(urls.urls[1].as_str(), "y");
    }

    #[test]
    fn test_upload_response_with_both_keys() {
        let both: UploadResponse =
            serde_json::from_str(r#"{"urls":["x"],"filenames":["y"]}"#).unwrap();
        assert_eq!(both.urls, vec![ImageReference::new("x")]);

        let neither: UploadResponse = serde_json::from_str("{}").unwrap();
        assert!(neither.urls.is_empty());
    }

    #[test]
    fn test_new_school_wire_shape() {
        let school = NewSchool {
            fields: SchoolFields {
                name: "Sunrise".into(),
                address: "1 Main".into(),
                city: "Pune".into(),
                state: "MH".into(),
                contact: "9876543210".into(),
                email_id: "a@b.in".into(),
            },
            images: vec![ImageReference::new("x")],
        };
        let value = serde_json::to_value(&school).unwrap();
        assert_eq!(value["contact"], "9876543210");
        assert_eq!(value["email_id"], "a@b.in");
        assert_eq!(value["images"], serde_json::json!(["x"]));
    }

    #[test]
    fn test_has_missing() {
        let mut fields = SchoolFields {
            name: "a".into(),
            address: "b".into(),
            city: "c".into(),
            state: "d".into(),
            contact: "9876543210".into(),
            email_id: "e@f.gh".into(),
        };
        assert!(!fields.has_missing());
        fields.city = "  ".into();
        assert!(fields.has_missing());
    }

    #[test]
    fn test_error_message() {
        assert_eq!(error_message(r#"{"error":"nope"}"#).as_deref(), Some("nope"));
        assert_eq!(error_message("<html>"), None);
        assert_eq!(error_message(r#"{"error":""}"#), None);
    }
}
