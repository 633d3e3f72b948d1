//! Output writers for extracted subtitles.

mod csv;
mod json;

pub use self::csv::{
    to_csv_string, write_combined_csv, write_csv, CombinedEntry, FILE_HEADER, HEADER,
};
pub use self::json::{to_json, JsonFormat};
