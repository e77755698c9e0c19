use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AddNoteRequest {
    pub note: String,
}
