use std::io::Write;
use std::path::Path;

use scrapbook_core::{ImageUpload, ScrapbookApi};

use crate::error::CliError;

pub async fn run_upload<A: ScrapbookApi>(
    api: &A,
    path: &Path,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let image = ImageUpload::from_path(path)?;
    let receipt = api.upload_image(image).await?;
    writeln!(output, "{}", receipt.filename)?;
    Ok(())
}
