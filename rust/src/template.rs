//! Downloadable contribution template: the canonical header line followed by
//! one filled-in example row with every cell quoted.

use std::path::Path;

use intervention_types::CANONICAL_HEADERS;

pub const TEMPLATE_FILENAME: &str = "intervention_template.csv";

const EXAMPLE_ROW: [&str; 8] = [
    "Content Moderation",
    "Automated detection and removal of harmful content",
    "Content",
    "Platform-Driven",
    "Proactive",
    "Systemic",
    "https://example-platform.com/content-policy",
    "your@email.com",
];

pub fn template_csv() -> String {
    let headers = CANONICAL_HEADERS.join(",");
    let example = EXAMPLE_ROW
        .iter()
        .map(|cell| format!("\"{cell}\""))
        .collect::<Vec<_>>()
        .join(",");
    format!("{headers}\n{example}")
}

pub fn write_template(path: &Path) -> std::io::Result<()> {
    std::fs::write(path, template_csv())
}
