use crate::error::Result;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

pub fn save_json<T: Serialize>(data: &T, filename: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(filename.as_ref())?;
    file.write_all(serde_json::to_string_pretty(data)?.as_bytes())?;
    info!(file = %filename.as_ref().display(), "written");
    Ok(())
}

pub fn save_bytes(content: &[u8], filename: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(filename.as_ref())?;
    file.write_all(content)?;
    info!(file = %filename.as_ref().display(), "written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_json_and_bytes() {
        let dir = std::env::temp_dir();
        let json_path = dir.join(format!("pib_utils_{}.json", std::process::id()));
        let pdf_path = dir.join(format!("pib_utils_{}.pdf", std::process::id()));

        save_json(&serde_json::json!({ "items": [] }), &json_path).unwrap();
        save_bytes(b"%PDF-1.3", &pdf_path).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
        assert_eq!(json["items"], serde_json::json!([]));
        assert_eq!(std::fs::read(&pdf_path).unwrap(), b"%PDF-1.3");

        std::fs::remove_file(json_path).ok();
        std::fs::remove_file(pdf_path).ok();
    }
}
