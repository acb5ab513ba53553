#[path = "shared/sample_data.rs"]
mod sample_data;

use std::error::Error;
use std::path::PathBuf;

use exam_seating_report::ReportBuilder;

fn main() -> Result<(), Box<dyn Error>> {
    let output_dir = PathBuf::from("target").join("sample_reports");
    std::fs::create_dir_all(&output_dir)?;

    let schedule = sample_data::sample_schedule();
    let generator = ReportBuilder::new()
        .with_logo_bytes(sample_data::sample_logo()?)
        .build()?;

    for artifact in [
        generator.generate_summary(&schedule)?,
        generator.generate_detailed(&schedule)?,
    ] {
        let path = artifact.save_in(&output_dir)?;
        println!(
            "Generated {} ({} pages, {} bytes)",
            path.display(),
            artifact.layout().page_count(),
            artifact.bytes().len()
        );
    }

    Ok(())
}
