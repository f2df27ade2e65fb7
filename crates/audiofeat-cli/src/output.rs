//! JSON output formatting

use audiofeat_core::{FeatureMatrix, FeatureVector};
use serde::Serialize;

/// Feature rows extracted from one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileFeatures {
    pub input_file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub rows: usize,
    pub features: Vec<FeatureVector>,
}

impl FileFeatures {
    pub fn new(input_file: String, label: Option<String>, matrix: FeatureMatrix) -> Self {
        Self {
            input_file,
            label,
            rows: matrix.num_rows(),
            features: matrix.into_rows(),
        }
    }
}

#[derive(Serialize)]
struct BatchOutput<'a> {
    status: &'static str,
    num_files: usize,
    num_rows: usize,
    num_features: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    columns: Option<Vec<String>>,
    processing_time_seconds: f64,
    results: &'a [FileFeatures],
}

/// Render a batch of per-file results as pretty JSON
pub fn render_json_results(
    results: &[FileFeatures],
    columns: Option<Vec<String>>,
    elapsed_seconds: f64,
) -> serde_json::Result<String> {
    let output = BatchOutput {
        status: "success",
        num_files: results.len(),
        num_rows: results.iter().map(|r| r.rows).sum(),
        num_features: audiofeat_core::FEATURE_LEN,
        columns,
        processing_time_seconds: elapsed_seconds,
        results,
    };
    serde_json::to_string_pretty(&output)
}

/// Print a batch of per-file results as JSON
pub fn print_json_results(
    results: &[FileFeatures],
    columns: Option<Vec<String>>,
    elapsed_seconds: f64,
) {
    match render_json_results(results, columns, elapsed_seconds) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Error serializing results: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_batch() {
        let matrix = FeatureMatrix::new(vec![0.5; audiofeat_core::FEATURE_LEN]);
        let results = vec![FileFeatures::new(
            "clip.wav".to_string(),
            Some("glass_break".to_string()),
            matrix,
        )];

        let json = render_json_results(&results, None, 0.25).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["status"], "success");
        assert_eq!(value["num_files"], 1);
        assert_eq!(value["num_rows"], 1);
        assert_eq!(value["num_features"], 162);
        assert!(value.get("columns").is_none());
        assert_eq!(value["results"][0]["label"], "glass_break");
        assert_eq!(value["results"][0]["features"][0].as_array().unwrap().len(), 162);
    }

    #[test]
    fn test_unlabelled_file_omits_label() {
        let matrix = FeatureMatrix::new(vec![0.0; audiofeat_core::FEATURE_LEN]);
        let results = vec![FileFeatures::new("a.wav".to_string(), None, matrix)];

        let json = render_json_results(&results, Some(vec!["zcr".to_string()]), 0.0).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value["results"][0].get("label").is_none());
        assert_eq!(value["columns"][0], "zcr");
    }
}
