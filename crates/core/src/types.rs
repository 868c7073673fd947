/// ActiveNet activity identifiers are plain integers.
pub type ActivityId = i64;
