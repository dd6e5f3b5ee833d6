use serde::Serialize;
use std::io::Write;

/// Write records as JSONL (one JSON object per line).
pub fn write_jsonl<T: Serialize>(out: &mut dyn Write, records: &[T]) -> Result<(), String> {
    for record in records {
        serde_json::to_writer(&mut *out, record)
            .map_err(|error| format!("failed to serialize JSON record: {error}"))?;
        out.write_all(b"\n")
            .map_err(|error| format!("failed to write JSONL newline: {error}"))?;
    }

    out.flush()
        .map_err(|error| format!("failed to flush JSONL output: {error}"))?;

    Ok(())
}

/// Write one pretty-printed JSON document followed by a newline.
pub fn write_json<T: Serialize>(out: &mut dyn Write, document: &T) -> Result<(), String> {
    serde_json::to_writer_pretty(&mut *out, document)
        .map_err(|error| format!("failed to serialize JSON document: {error}"))?;
    out.write_all(b"\n")
        .map_err(|error| format!("failed to write JSON newline: {error}"))?;
    out.flush()
        .map_err(|error| format!("failed to flush JSON output: {error}"))
}

#[cfg(test)]
mod tests {
    use super::{write_json, write_jsonl};
    use crate::refusal::{RefusalCode, RefusalEnvelope};
    use serde_json::{Value, json};
    use std::io::{Cursor, Error, ErrorKind, Write};

    #[test]
    fn writes_empty_record_set() {
        let mut out = Cursor::new(Vec::new());
        write_jsonl::<Value>(&mut out, &[]).expect("write empty records");
        assert!(out.into_inner().is_empty());
    }

    #[test]
    fn writes_ids_as_jsonl() {
        let records = vec![json!({"id": "a"}), json!({"id": "b"})];
        let mut out = Cursor::new(Vec::new());

        write_jsonl(&mut out, &records).expect("write records");

        let output = String::from_utf8(out.into_inner()).expect("valid UTF-8 output");
        assert_eq!(output, "{\"id\":\"a\"}\n{\"id\":\"b\"}\n");
    }

    #[test]
    fn writes_refusal_envelope_as_one_document() {
        let envelope = RefusalEnvelope::new(
            RefusalCode::UnsupportedFormat,
            "Unsupported document format",
            json!({ "size": 0 }),
            Some("c-1"),
        );
        let mut out = Cursor::new(Vec::new());

        write_json(&mut out, &envelope).expect("write refusal");

        let output = String::from_utf8(out.into_inner()).expect("valid UTF-8 output");
        assert!(output.ends_with("}\n"));
        let value: Value = serde_json::from_str(&output).expect("parse output");
        assert_eq!(value["refusal"]["code"], "E_UNSUPPORTED_FORMAT");
        assert_eq!(value["outcome"], "REFUSAL");
    }

    #[test]
    fn surfaces_write_errors() {
        struct AlwaysFailWriter;

        impl Write for AlwaysFailWriter {
            fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
                Err(Error::new(ErrorKind::BrokenPipe, "write failed"))
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let mut writer = AlwaysFailWriter;
        let error = write_jsonl(&mut writer, &[json!({"id": "a"})]).expect_err("fail");
        assert!(error.contains("failed to serialize JSON record"));
        let error = write_json(&mut writer, &json!({"id": "a"})).expect_err("fail");
        assert!(error.contains("failed to serialize JSON document"));
    }
}
