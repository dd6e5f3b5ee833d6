pub mod jsonl;

pub use jsonl::{write_json, write_jsonl};
