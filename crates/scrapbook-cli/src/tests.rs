use std::collections::BTreeMap;
use std::io::Cursor;

use pretty_assertions::assert_eq;
use scrapbook_core::api::fake::{sample_entry, FakeScrapbook};
use scrapbook_core::{ApiOperation, EntryId, SortKey};

use crate::cli::{CompletionShell, ExportFormat, TrashCommands};
use crate::commands::browse::{run_browse, BrowseCommand};
use crate::commands::common::{
    confirm, format_story_page, normalize_content, parse_entry_id, validate_date,
    validate_optional_date,
};
use crate::commands::completions::render_completions;
use crate::commands::config::init_profile;
use crate::commands::delete::run_delete;
use crate::commands::export::run_export;
use crate::commands::favorite::run_favorite;
use crate::commands::list::{run_list, ListOptions};
use crate::commands::trash::run_trash;
use crate::config_profiles::{CliProfile, CliProfilesConfig};
use crate::error::CliError;

fn sample_api() -> FakeScrapbook {
    FakeScrapbook::with_entries(vec![
        sample_entry(1, "Beach day", "2024-01-02"),
        sample_entry(2, "Autumn walk", "2024-01-01"),
    ])
}

fn output_text(buffer: Vec<u8>) -> String {
    String::from_utf8(buffer).unwrap()
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
}

#[test]
fn validate_date_requires_calendar_iso_dates() {
    assert_eq!(validate_date(" 2024-02-29 ").unwrap(), "2024-02-29");
    assert!(matches!(
        validate_date("2023-02-29"),
        Err(CliError::InvalidDate(_))
    ));
    assert!(validate_date("2024-1-5").is_err());
    assert!(validate_date("05/01/2024").is_err());
    assert_eq!(validate_optional_date(Some("  ")).unwrap(), None);
}

#[test]
fn parse_entry_id_rejects_non_numbers() {
    assert_eq!(parse_entry_id(" 12 ").unwrap(), EntryId::new(12));
    assert!(matches!(
        parse_entry_id("abc"),
        Err(CliError::InvalidEntryId(value)) if value == "abc"
    ));
}

#[test]
fn confirm_accepts_only_yes() {
    let mut output = Vec::new();
    assert!(confirm("Sure?", &mut Cursor::new("y\n"), &mut output).unwrap());
    assert!(confirm("Sure?", &mut Cursor::new("YES\n"), &mut output).unwrap());
    assert!(!confirm("Sure?", &mut Cursor::new("\n"), &mut output).unwrap());
    assert!(!confirm("Sure?", &mut Cursor::new(""), &mut output).unwrap());
    assert!(output_text(output).starts_with("Sure? [y/N] "));
}

#[test]
fn story_page_shows_paragraphs_in_order() {
    let mut page_entry = sample_entry(3, "Harbor", "2024-05-18");
    page_entry.story = "Boats.\nGulls.".to_string();
    page_entry.image_url = Some("harbor.jpg".to_string());
    page_entry.is_favorite = true;

    assert_eq!(
        format_story_page(&page_entry),
        "Harbor ★\nDate: 2024-05-18\nImage: harbor.jpg\n\nBoats.\nGulls."
    );
}

#[test]
fn browse_commands_parse() {
    assert_eq!("search".parse::<BrowseCommand>(), Ok(BrowseCommand::Search(None)));
    assert_eq!(
        "search  sunset pier ".parse::<BrowseCommand>(),
        Ok(BrowseCommand::Search(Some("sunset pier".to_string())))
    );
    assert_eq!(
        "dates 2024-01-01 -".parse::<BrowseCommand>(),
        Ok(BrowseCommand::Dates(Some("2024-01-01".to_string()), None))
    );
    assert_eq!(
        "SORT title".parse::<BrowseCommand>(),
        Ok(BrowseCommand::Sort(SortKey::Title))
    );
    assert_eq!(
        "fav 4".parse::<BrowseCommand>(),
        Ok(BrowseCommand::Fav(EntryId::new(4)))
    );
    assert!("sort size".parse::<BrowseCommand>().is_err());
    assert!("dates 2024-01-01".parse::<BrowseCommand>().is_err());
    assert!("show".parse::<BrowseCommand>().is_err());
    assert!("dance".parse::<BrowseCommand>().is_err());
}

#[test]
fn init_profile_normalizes_url_and_activates() {
    let mut config = CliProfilesConfig::default();
    let name = init_profile(
        &mut config,
        Some("home"),
        Some("http://192.168.1.20:8000/".to_string()),
        false,
    )
    .unwrap();
    assert_eq!(name, "home");
    assert_eq!(config.active_profile.as_deref(), Some("home"));
    assert_eq!(
        config.profiles["home"],
        CliProfile {
            api_base_url: Some("http://192.168.1.20:8000".to_string()),
        }
    );

    init_profile(
        &mut config,
        Some("work"),
        Some("https://scrapbook.example.com".to_string()),
        true,
    )
    .unwrap();
    assert_eq!(config.active_profile.as_deref(), Some("home"));
    assert_eq!(config.profiles.len(), 2);
}

#[test]
fn init_profile_rejects_url_without_scheme() {
    let mut config = CliProfilesConfig {
        version: 1,
        active_profile: None,
        profiles: BTreeMap::new(),
    };
    let error = init_profile(
        &mut config,
        Some("home"),
        Some("localhost:8000".to_string()),
        false,
    )
    .unwrap_err();
    assert!(matches!(error, CliError::Core(_)));
}

#[test]
fn completions_name_the_binary() {
    let script = String::from_utf8(render_completions(CompletionShell::Bash)).unwrap();
    assert!(script.contains("scrapbook"));
    assert!(script.contains("browse"));
}

#[tokio::test(flavor = "current_thread")]
async fn list_sorts_and_filters() {
    let api = sample_api();
    let mut output = Vec::new();
    let options = ListOptions {
        sort: Some(SortKey::Title),
        ..ListOptions::default()
    };
    run_list(api.clone(), options, false, &mut output)
        .await
        .unwrap();
    let text = output_text(output);
    let lines = text.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("Autumn walk"));
    assert!(lines[1].contains("Beach day"));

    let mut output = Vec::new();
    let options = ListOptions {
        favorites: true,
        ..ListOptions::default()
    };
    run_list(api, options, false, &mut output).await.unwrap();
    assert_eq!(output_text(output), "No entries found.\n");
}

#[tokio::test(flavor = "current_thread")]
async fn list_json_has_entry_fields() {
    let mut output = Vec::new();
    run_list(sample_api(), ListOptions::default(), true, &mut output)
        .await
        .unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&output).unwrap();
    assert_eq!(parsed[0]["id"], 1);
    assert_eq!(parsed[0]["title"], "Beach day");
    assert_eq!(parsed[1]["favorite"], false);
}

#[tokio::test(flavor = "current_thread")]
async fn list_rejects_bad_dates_before_any_request() {
    let api = sample_api();
    let options = ListOptions {
        from: Some("2024-13-01".to_string()),
        ..ListOptions::default()
    };
    let error = run_list(api.clone(), options, false, &mut Vec::new())
        .await
        .unwrap_err();
    assert!(matches!(error, CliError::InvalidDate(_)));
    assert!(api.list_calls().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn list_failure_reports_view_message() {
    let api = sample_api();
    api.fail(ApiOperation::ListEntries);
    let error = run_list(api, ListOptions::default(), false, &mut Vec::new())
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Failed to fetch stories");

    let api = sample_api();
    api.fail(ApiOperation::ListEntries);
    let options = ListOptions {
        search: Some("beach".to_string()),
        ..ListOptions::default()
    };
    let error = run_list(api, options, false, &mut Vec::new())
        .await
        .unwrap_err();
    assert_eq!(error.to_string(), "Failed to search entries");
}

#[tokio::test(flavor = "current_thread")]
async fn delete_asks_for_confirmation() {
    let api = sample_api();
    let mut output = Vec::new();
    run_delete(&api, "1", false, &mut Cursor::new("n\n"), &mut output)
        .await
        .unwrap();
    assert!(output_text(output).contains("Are you sure you want to delete \"Beach day\"?"));
    assert_eq!(api.entry_ids(), vec![1, 2]);

    let mut output = Vec::new();
    run_delete(&api, "1", true, &mut Cursor::new(""), &mut output)
        .await
        .unwrap();
    assert_eq!(output_text(output), "1\n");
    assert_eq!(api.entry_ids(), vec![2]);
}

#[tokio::test(flavor = "current_thread")]
async fn favorite_reports_server_state() {
    let api = sample_api();
    let mut output = Vec::new();
    run_favorite(&api, "2", &mut output).await.unwrap();
    run_favorite(&api, "2", &mut output).await.unwrap();
    assert_eq!(
        output_text(output),
        "★ 2 is a favorite\n2 is no longer a favorite\n"
    );
}

#[tokio::test(flavor = "current_thread")]
async fn trash_restore_and_purge() {
    let api = sample_api();
    run_delete(&api, "1", true, &mut Cursor::new(""), &mut Vec::new())
        .await
        .unwrap();
    run_delete(&api, "2", true, &mut Cursor::new(""), &mut Vec::new())
        .await
        .unwrap();

    let mut output = Vec::new();
    run_trash(
        api.clone(),
        TrashCommands::List { json: false },
        &mut Cursor::new(""),
        &mut output,
    )
    .await
    .unwrap();
    let listing = output_text(output);
    assert!(listing.contains("(was 1)"));
    assert!(listing.contains("(was 2)"));

    let mut output = Vec::new();
    run_trash(
        api.clone(),
        TrashCommands::Restore { id: "3".to_string() },
        &mut Cursor::new(""),
        &mut output,
    )
    .await
    .unwrap();
    assert_eq!(output_text(output), "Restored as 5\n");
    assert_eq!(api.entry_ids(), vec![5]);

    let error = run_trash(
        api.clone(),
        TrashCommands::Purge {
            id: "3".to_string(),
            yes: true,
        },
        &mut Cursor::new(""),
        &mut Vec::new(),
    )
    .await
    .unwrap_err();
    assert!(matches!(error, CliError::DeletedEntryNotFound(id) if id == EntryId::new(3)));

    let mut output = Vec::new();
    run_trash(
        api.clone(),
        TrashCommands::Purge {
            id: "4".to_string(),
            yes: false,
        },
        &mut Cursor::new("y\n"),
        &mut output,
    )
    .await
    .unwrap();
    assert!(output_text(output).contains("permanently delete \"Autumn walk\""));
    assert!(api.deleted_ids().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn trash_failure_reports_view_message() {
    let api = sample_api();
    api.fail(ApiOperation::ListDeleted);
    let error = run_trash(
        api,
        TrashCommands::List { json: true },
        &mut Cursor::new(""),
        &mut Vec::new(),
    )
    .await
    .unwrap_err();
    assert_eq!(error.to_string(), "Failed to fetch deleted entries");
}

#[tokio::test(flavor = "current_thread")]
async fn export_markdown_lists_every_entry() {
    let mut output = Vec::new();
    run_export(
        &sample_api(),
        ExportFormat::Markdown,
        None,
        false,
        &mut output,
    )
    .await
    .unwrap();
    let text = output_text(output);
    assert!(text.contains("## Beach day"));
    assert!(text.contains("## Autumn walk"));
    assert!(text.contains("- Favorite: no"));
}

#[tokio::test(flavor = "current_thread")]
async fn browse_session_round_trip() {
    let api = sample_api();
    let script = "sort title\nfav 1\nshow 1\ndelete 1\ny\ntrash\nrestore 3\nback\nbogus\nquit\n";
    let mut output = Vec::new();
    run_browse(api.clone(), &mut Cursor::new(script), &mut output)
        .await
        .unwrap();
    let text = output_text(output);

    assert!(text.contains("[sort title asc]"));
    assert!(text.contains("Beach day ★"));
    assert!(text.contains("(was 1)"));
    assert!(text.contains("unknown command 'bogus'"));
    assert_eq!(api.entry_ids(), vec![2, 4]);
    assert!(api.deleted_ids().is_empty());
}

#[tokio::test(flavor = "current_thread")]
async fn browse_search_then_clear_keeps_favorites() {
    let api = sample_api();
    run_favorite(&api, "1", &mut Vec::new()).await.unwrap();
    let script = "favorites\nsearch autumn\nclear\nquit\n";
    let mut output = Vec::new();
    run_browse(api, &mut Cursor::new(script), &mut output)
        .await
        .unwrap();
    let text = output_text(output);

    assert!(text.contains("[search \"autumn\", favorites]"));
    assert!(text.contains("No entries found."));
    let after_clear = text.rsplit("scrapbook> ").nth(1).unwrap();
    assert!(after_clear.starts_with("[favorites]"));
    assert!(after_clear.contains("Beach day"));
}

#[tokio::test(flavor = "current_thread")]
async fn browse_reports_failures_without_ending_session() {
    let api = sample_api();
    api.fail(ApiOperation::ToggleFavorite);
    let mut output = Vec::new();
    run_browse(api, &mut Cursor::new("fav 1\nlist\n"), &mut output)
        .await
        .unwrap();
    let text = output_text(output);
    assert!(text.contains("! Failed to update favorite status"));
    assert!(text.contains("Autumn walk"));
}

#[tokio::test(flavor = "current_thread")]
async fn export_into_directory_uses_suggested_name() {
    let dir = std::env::temp_dir().join(format!(
        "scrapbook-export-test-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |duration| duration.as_nanos())
    ));
    std::fs::create_dir_all(&dir).unwrap();

    let mut output = Vec::new();
    run_export(&sample_api(), ExportFormat::Json, Some(&dir), false, &mut output)
        .await
        .unwrap();
    let written = std::path::PathBuf::from(output_text(output).trim());
    assert!(written.starts_with(&dir));
    let name = written.file_name().unwrap().to_string_lossy().into_owned();
    assert!(name.starts_with("scrapbook-export-"));
    assert!(name.ends_with(".json"));

    let parsed: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&written).unwrap()).unwrap();
    assert_eq!(parsed.as_array().map(Vec::len), Some(2));

    let _ = std::fs::remove_dir_all(dir);
}

#[tokio::test(flavor = "current_thread")]
async fn browse_clear_without_filters_skips_the_fetch() {
    let api = sample_api();
    let mut output = Vec::new();
    run_browse(api.clone(), &mut Cursor::new("clear\nquit\n"), &mut output)
        .await
        .unwrap();

    assert!(output_text(output).contains("No search filters to clear."));
    assert_eq!(api.list_calls().len(), 1);
}
