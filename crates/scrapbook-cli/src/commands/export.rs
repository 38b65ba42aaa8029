use std::io::Write;
use std::path::Path;

use scrapbook_core::export::{
    render_deleted_export, render_entries_export, suggested_export_file_name,
};
use scrapbook_core::{EntryQuery, ScrapbookApi};

use crate::cli::ExportFormat;
use crate::error::CliError;

pub async fn run_export<A: ScrapbookApi>(
    api: &A,
    format: ExportFormat,
    output_path: Option<&Path>,
    deleted: bool,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let rendered = if deleted {
        let records = api.list_deleted().await?;
        render_deleted_export(&records, format.into())?
    } else {
        let entries = api.list_entries(&EntryQuery::default()).await?;
        render_entries_export(&entries, format.into())?
    };

    if let Some(path) = output_path {
        let path = if path.is_dir() {
            path.join(suggested_export_file_name(
                format.into(),
                chrono::Utc::now().timestamp_millis(),
            ))
        } else {
            path.to_path_buf()
        };
        std::fs::write(&path, rendered)?;
        writeln!(output, "{}", path.display())?;
    } else {
        writeln!(output, "{rendered}")?;
    }

    Ok(())
}
