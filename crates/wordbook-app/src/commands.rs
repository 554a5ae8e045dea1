use std::path::PathBuf;

use anyhow::bail;
use wordbook_backup::{FixedPath, SaveDialog, WrittenBackup};
use wordbook_core::{Imported, MirrorOutcome, Notebook, SaveReport, Toggled};
use wordbook_types::{Credentials, DictionaryResult, Entry, Example};

use crate::cli::{Command, NotionCommand};
use crate::dialog::TerminalPrompt;
use crate::state::AppState;

const EXAMPLE_SEPARATOR: &str = "=>";

pub async fn run(state: &AppState, command: Command) -> anyhow::Result<()> {
    let (mut notebook, source) = Notebook::open(state.coordinator.clone()).await;
    tracing::debug!("Notebook loaded from {:?}", source);

    match command {
        Command::List => list(notebook.entries()),
        Command::Save {
            word,
            lang,
            definition,
            examples,
            usage_note,
            image_url,
            pronunciation,
        } => {
            let lang = match lang {
                Some(lang) => lang,
                None => state.prefs.load_language().await,
            };
            let result = DictionaryResult {
                word,
                definition,
                image_url,
                examples: parse_examples(&examples)?,
                usage_note,
                pronunciation,
            };

            match notebook.toggle(result, &lang).await? {
                Toggled::Saved { id, report } => {
                    println!("Saved {id}");
                    print_report(&report);
                }
                Toggled::Removed { id, report } => {
                    println!("Removed {id}");
                    print_report(&report);
                }
            }
        }
        Command::Remove { id } => match notebook.remove(&id).await? {
            Some(report) => {
                println!("Removed {id}");
                print_report(&report);
            }
            None => bail!("No entry with id '{id}'"),
        },
        Command::Sync => {
            let report = notebook.sync().await?;
            println!("Synced {} entries", notebook.entries().len());
            print_report(&report);
        }
        Command::Export { output } => {
            let written = notebook.export(export_dialog(output).as_ref()).await?;
            print_written("Exported to", &written);
        }
        Command::Import { file } => {
            let imported = notebook.import(&file).await?;
            print_imported(&imported);
        }
        Command::Restore => match notebook.restore_last_backup().await? {
            Some(imported) => print_imported(&imported),
            None => println!("No backup file to restore"),
        },
        Command::Language { code } => match code {
            Some(code) => {
                state.prefs.save_language(&code).await?;
                println!("Language set to {code}");
            }
            None => println!("{}", state.prefs.load_language().await),
        },
        Command::Notion(command) => notion(state, &mut notebook, command).await?,
    }

    Ok(())
}

async fn notion(
    state: &AppState,
    notebook: &mut Notebook,
    command: NotionCommand,
) -> anyhow::Result<()> {
    match command {
        NotionCommand::Set {
            api_key,
            database_id,
        } => {
            let credentials = Credentials::new(api_key, database_id);
            if !credentials.is_configured() {
                bail!("Both --api-key and --database-id are required");
            }
            state.prefs.save_credentials(&credentials).await?;
            println!("Notion credentials saved");
        }
        NotionCommand::Clear => {
            state.prefs.clear_credentials().await?;
            println!("Notion credentials cleared");
        }
        NotionCommand::Status => {
            if !state.config.notion.enabled {
                println!("Notion mirror disabled in profile");
            } else if state.config.notion.has_credentials() {
                println!("Notion mirror configured from profile or environment");
            } else if state.prefs.is_configured().await {
                println!("Notion mirror configured");
            } else {
                println!("Notion mirror not configured");
            }
        }
        NotionCommand::Pull { replace } => {
            let entries = state.coordinator.fetch_remote().await?;
            list(&entries);

            if replace {
                let report = notebook.replace(entries).await?;
                println!("Local notebook replaced with {} entries", notebook.entries().len());
                print_report(&report);
            }
        }
    }

    Ok(())
}

fn export_dialog(output: Option<PathBuf>) -> Box<dyn SaveDialog> {
    match output {
        Some(path) => Box::new(FixedPath(path)),
        None => Box::new(TerminalPrompt),
    }
}

/// `"sentence=>translation"` pairs
fn parse_examples(raw: &[String]) -> anyhow::Result<Vec<Example>> {
    raw.iter()
        .map(|example| match example.split_once(EXAMPLE_SEPARATOR) {
            Some((sentence, translation)) => {
                Ok(Example::new(sentence.trim(), translation.trim()))
            }
            None => bail!("Example '{example}' must look like \"sentence{EXAMPLE_SEPARATOR}translation\""),
        })
        .collect()
}

fn list(entries: &[Entry]) {
    if entries.is_empty() {
        println!("Notebook is empty");
        return;
    }

    for entry in entries {
        println!("{}\t{}\t{}", entry.id, entry.word, entry.definition);
        if let Some(example) = entry.preview() {
            println!("\t{} → {}", example.sentence, example.translation);
        }
    }
}

fn print_imported(imported: &Imported) {
    println!("Imported {} entries", imported.entries.len());
    if let Some(language) = &imported.language {
        println!("Language set to {language}");
    }
    print_report(&imported.report);
}

fn print_written(label: &str, written: &WrittenBackup) {
    println!("{label} {} ({:?})", written.path.display(), written.via);
}

fn print_report(report: &SaveReport) {
    println!("  primary: {:?}", report.primary);

    match &report.legacy {
        MirrorOutcome::Written(()) => println!("  legacy mirror: written"),
        MirrorOutcome::Skipped => println!("  legacy mirror: skipped"),
        MirrorOutcome::Failed(reason) => println!("  legacy mirror: failed ({reason})"),
    }

    match &report.backup {
        MirrorOutcome::Written(written) => print_written("  backup:", written),
        MirrorOutcome::Skipped => {}
        MirrorOutcome::Failed(reason) => println!("  backup: failed ({reason})"),
    }

    match &report.remote {
        MirrorOutcome::Written(sync) => {
            println!(
                "  notion: {} created, {} updated, {} archived",
                sync.created, sync.updated, sync.archived
            );
            if !sync.is_clean() {
                println!("  notion: failed for {}", sync.failed.join(", "));
            }
        }
        MirrorOutcome::Skipped => {}
        MirrorOutcome::Failed(reason) => println!("  notion: failed ({reason})"),
    }
}
