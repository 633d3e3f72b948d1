//! JSON rendering for subtitles and batch reports.

use serde::Serialize;

use crate::error::Result;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Serialize any value to JSON.
pub fn to_json<T: Serialize + ?Sized>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Subtitle;

    #[test]
    fn test_to_json_pretty() {
        let subtitles = vec![Subtitle::new("1. Objeto", 1, 0).with_level(2)];

        let json = to_json(&subtitles, JsonFormat::Pretty).unwrap();
        assert!(json.contains("\"text\": \"1. Objeto\""));
        assert!(json.contains("\"level\": 2"));
        assert!(json.contains('\n'));
    }

    #[test]
    fn test_to_json_compact() {
        let subtitles = vec![Subtitle::new("Plazo", 2, 0)];

        let json = to_json(&subtitles, JsonFormat::Compact).unwrap();
        assert_eq!(
            json,
            r#"[{"text":"Plazo","page":2,"sequence":0,"level":null}]"#
        );
    }
}
