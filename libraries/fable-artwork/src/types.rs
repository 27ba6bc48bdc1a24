use base64::{engine::general_purpose::STANDARD, Engine as _};

/// Cover image pulled out of an ebook package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// Archive entry the bytes came from
    pub entry_name: String,
    /// Raw image bytes
    pub data: Vec<u8>,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub mime_type: String,
}

impl CoverImage {
    /// Create a cover, sniffing the MIME type from the bytes and falling
    /// back to the entry's extension
    pub fn new(entry_name: String, data: Vec<u8>) -> Self {
        let mime_type = image::guess_format(&data)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| mime_from_name(&entry_name).to_string());

        Self {
            entry_name,
            data,
            mime_type,
        }
    }

    /// Get the data as a base64-encoded string
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.data)
    }
}

fn mime_from_name(name: &str) -> &'static str {
    let lower = name.to_ascii_lowercase();
    if lower.ends_with(".png") {
        "image/png"
    } else if lower.ends_with(".gif") {
        "image/gif"
    } else if lower.ends_with(".webp") {
        "image/webp"
    } else {
        "image/jpeg"
    }
}
