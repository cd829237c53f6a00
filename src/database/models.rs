use chrono::NaiveDateTime;

#[derive(Debug, Clone)]
pub struct RecordRow {
    pub kind: String,
    pub id: String,
    pub version: i64,
    pub body: String,
    pub updated_at: NaiveDateTime,
}
