//! Uniform JSON response envelope: `{success, message?, count?, data?}`.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> Envelope<T> {
    pub fn data(data: T) -> Self {
        Self { success: true, message: None, count: None, data: Some(data) }
    }

    pub fn message_with_data(message: impl Into<String>, data: T) -> Self {
        Self { success: true, message: Some(message.into()), count: None, data: Some(data) }
    }
}

impl<T: Serialize> Envelope<Vec<T>> {
    /// List payload; `count` mirrors the number of rows returned.
    pub fn list(items: Vec<T>) -> Self {
        Self { success: true, message: None, count: Some(items.len()), data: Some(items) }
    }
}

impl Envelope<()> {
    pub fn message_only(message: impl Into<String>) -> Self {
        Self { success: true, message: Some(message.into()), count: None, data: None }
    }
}
