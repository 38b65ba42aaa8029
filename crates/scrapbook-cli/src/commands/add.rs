use std::io::Write;
use std::path::Path;

use scrapbook_core::{EntryFields, ImageUpload, ScrapbookApi};

use crate::commands::common::{normalize_title, validate_date};
use crate::error::CliError;

pub async fn run_add<A: ScrapbookApi>(
    api: &A,
    title: &str,
    date: &str,
    image_path: &Path,
    story: String,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let fields = EntryFields::new(normalize_title(title)?, validate_date(date)?, story);
    fields.validate()?;

    let image = ImageUpload::from_path(image_path)?;
    if !image.is_image() {
        tracing::warn!(
            "{} does not look like an image ({})",
            image.file_name,
            image.content_type
        );
    }

    let entry = api.create_entry(&fields, image).await?;
    writeln!(output, "{}", entry.id)?;
    Ok(())
}
