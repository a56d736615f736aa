//! Wire types for the Gemini generateContent API.

use serde::{Deserialize, Serialize};

/// One message in the generation context.
///
/// Gemini uses role "user" for caller-provided context and "model" for
/// prior model output.
#[derive(Debug, Clone, Serialize)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

impl Content {
    /// A user message carrying plain text.
    pub fn user_text(text: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            parts: vec![Part::Text(text.into())],
        }
    }

    /// A user message referencing a previously uploaded file.
    #[must_use]
    pub fn user_file(handle: &FileHandle) -> Self {
        Self {
            role: "user".into(),
            parts: vec![Part::FileData(FileData {
                mime_type: handle.mime_type.clone(),
                file_uri: handle.uri.clone(),
            })],
        }
    }
}

/// One part of a message: inline text or a file-store reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Part {
    Text(String),
    FileData(FileData),
}

/// Reference to a file in the Gemini file store.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileData {
    pub mime_type: String,
    pub file_uri: String,
}

/// Handle returned by a file upload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileHandle {
    /// Resource URI used to reference the file in generation requests.
    pub uri: String,
    pub mime_type: String,
    /// Resource name (e.g. "files/abc-123").
    #[serde(default)]
    pub name: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_text_part_wire_format() {
        let content = Content::user_text("hello");
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_file_part_wire_format() {
        let handle = FileHandle {
            uri: "https://generativelanguage.googleapis.com/v1beta/files/abc".into(),
            mime_type: "application/pdf".into(),
            name: Some("files/abc".into()),
        };
        let content = Content::user_file(&handle);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["parts"][0]["fileData"]["mimeType"], "application/pdf");
        assert_eq!(
            json["parts"][0]["fileData"]["fileUri"],
            "https://generativelanguage.googleapis.com/v1beta/files/abc"
        );
    }

    #[test]
    fn test_file_handle_parsing() {
        let json = r#"{
            "name": "files/xyz-789",
            "uri": "https://generativelanguage.googleapis.com/v1beta/files/xyz-789",
            "mimeType": "application/pdf"
        }"#;
        let handle: FileHandle = serde_json::from_str(json).unwrap();
        assert_eq!(handle.mime_type, "application/pdf");
        assert_eq!(handle.name.as_deref(), Some("files/xyz-789"));
    }
}
