//! Scrapbook CLI - photo memories with stories, from the terminal
//!
//! Talks to the Scrapbook backend over its REST API.

mod cli;
mod commands;
mod config_profiles;
mod error;
#[cfg(test)]
mod tests;

use std::io::{self, Write};

use clap::Parser;
use scrapbook_core::ScrapbookApi;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Commands};
use crate::commands::add::run_add;
use crate::commands::browse::run_browse;
use crate::commands::common::{open_client, resolve_story};
use crate::commands::completions::run_completions;
use crate::commands::config::run_config;
use crate::commands::delete::run_delete;
use crate::commands::edit::{run_edit, EditOptions};
use crate::commands::export::run_export;
use crate::commands::favorite::run_favorite;
use crate::commands::list::{run_list, ListOptions};
use crate::commands::show::run_show;
use crate::commands::trash::run_trash;
use crate::commands::upload::run_upload;
use crate::error::CliError;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("Error: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), CliError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut output = io::stdout().lock();

    match cli.command {
        Commands::Completions {
            shell,
            output: path,
        } => run_completions(shell, path.as_deref(), &mut output),
        Commands::Config { command } => run_config(
            command,
            cli.api_url.as_deref(),
            cli.profile.as_deref(),
            &mut output,
        ),
        command => {
            let api = open_client(cli.api_url.as_deref(), cli.profile.as_deref())?;
            dispatch(api, command, &mut output).await
        }
    }
}

fn init_tracing() {
    let mut filter = EnvFilter::from_default_env();
    for directive in ["scrapbook=info", "scrapbook_core=info"] {
        if let Ok(directive) = directive.parse() {
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(filter)
        .init();
}

async fn dispatch<A: ScrapbookApi + Clone>(
    api: A,
    command: Commands,
    output: &mut impl Write,
) -> Result<(), CliError> {
    let mut input = io::stdin().lock();

    match command {
        Commands::List {
            search,
            from,
            to,
            sort,
            order,
            favorites,
            json,
        } => {
            let options = ListOptions {
                search,
                from,
                to,
                sort: sort.map(Into::into),
                order: order.map(Into::into),
                favorites,
            };
            run_list(api, options, json, output).await
        }
        Commands::Show { id, json } => run_show(&api, &id, json, output).await,
        Commands::Add {
            title,
            date,
            image,
            story,
        } => {
            drop(input);
            let story = resolve_story(story)?;
            run_add(&api, &title, &date, &image, story, output).await
        }
        Commands::Edit {
            id,
            title,
            date,
            story,
            image,
        } => {
            let options = EditOptions {
                title,
                date,
                story,
                image,
            };
            run_edit(&api, &id, options, output).await
        }
        Commands::Delete { id, yes } => run_delete(&api, &id, yes, &mut input, output).await,
        Commands::Favorite { id } => run_favorite(&api, &id, output).await,
        Commands::Trash { command } => run_trash(api, command, &mut input, output).await,
        Commands::Upload { path } => run_upload(&api, &path, output).await,
        Commands::Export {
            format,
            output: path,
            deleted,
        } => run_export(&api, format, path.as_deref(), deleted, output).await,
        Commands::Browse => run_browse(api, &mut input, output).await,
        Commands::Completions { .. } | Commands::Config { .. } => Ok(()),
    }
}
