use std::io::Write;
use std::path::PathBuf;

use scrapbook_core::{EntryFields, ImageUpload, ScrapbookApi};

use crate::commands::common::{
    capture_editor_input_with_initial, normalize_title, parse_entry_id, validate_date,
};
use crate::error::CliError;

#[derive(Debug, Clone, Default)]
pub struct EditOptions {
    pub title: Option<String>,
    pub date: Option<String>,
    pub story: Option<String>,
    pub image: Option<PathBuf>,
}

impl EditOptions {
    const fn is_empty(&self) -> bool {
        self.title.is_none() && self.date.is_none() && self.story.is_none() && self.image.is_none()
    }
}

/// Update an entry. With no field flags the story opens in `$EDITOR`.
pub async fn run_edit<A: ScrapbookApi>(
    api: &A,
    id: &str,
    options: EditOptions,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let id = parse_entry_id(id)?;
    let entry = api.get_entry(id).await?;
    let mut fields = EntryFields::from_entry(&entry);

    if options.is_empty() {
        let edited = capture_editor_input_with_initial(&entry.story)?.unwrap_or_default();
        if edited == entry.story {
            return Err(CliError::NothingToEdit(id));
        }
        fields.story = edited;
    } else {
        if let Some(title) = options.title.as_deref() {
            fields.title = normalize_title(title)?;
        }
        if let Some(date) = options.date.as_deref() {
            fields.date = validate_date(date)?;
        }
        if let Some(story) = options.story {
            fields.story = story.trim().to_string();
        }
    }

    let image = options
        .image
        .as_deref()
        .map(ImageUpload::from_path)
        .transpose()?;
    if image.is_none() && fields == EntryFields::from_entry(&entry) {
        return Err(CliError::NothingToEdit(id));
    }

    let updated = api.update_entry(id, &fields, image).await?;
    writeln!(output, "{}", updated.id)?;
    Ok(())
}
