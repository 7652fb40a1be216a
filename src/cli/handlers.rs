use std::env;
use std::io::{self, Read};

use crate::board::Board;
use crate::entity::{Color, Note, NoteId, Position, BACKGROUND_COLORS};
use crate::error::{PostitError, Result};
use crate::notice::{Notice, QuickNote};
use crate::store::{NotesStore, Snapshot};

const BACKGROUND_PRESETS: [&str; 8] = [
    "white", "gray", "cornsilk", "azure", "beige", "floral", "honeydew", "lavender",
];

async fn open_store() -> Result<NotesStore> {
    Board::discover()?.open_store().await
}

fn read_stdin() -> Result<String> {
    let mut content = String::new();
    io::stdin().read_to_string(&mut content)?;
    Ok(content.trim_end_matches('\n').to_string())
}

/// Resolve a full id or a unique id prefix against the current notes
fn resolve_note(snapshot: &Snapshot, id: &str) -> Result<NoteId> {
    if let Some(note) = snapshot.notes.iter().find(|n| n.id.as_str() == id) {
        return Ok(note.id.clone());
    }

    let mut matches = snapshot
        .notes
        .iter()
        .filter(|n| !id.is_empty() && n.id.as_str().starts_with(id));

    match (matches.next(), matches.next()) {
        (Some(note), None) => Ok(note.id.clone()),
        (Some(_), Some(_)) => Err(PostitError::AmbiguousId(id.to_string())),
        _ => Err(PostitError::NoteNotFound(id.to_string())),
    }
}

fn first_line(content: &str) -> &str {
    content.lines().next().unwrap_or("")
}

fn print_note_line(note: &Note) {
    println!(
        "  ({}) [{}] ({:.1}, {:.1}) {}",
        note.id.short(),
        note.color,
        note.position.x,
        note.position.y,
        first_line(&note.content)
    );
}

fn parse_background_color(value: &str) -> Result<Color> {
    match BACKGROUND_PRESETS
        .iter()
        .position(|name| name.eq_ignore_ascii_case(value.trim()))
    {
        Some(index) => Ok(BACKGROUND_COLORS[index]),
        None => value.parse(),
    }
}

pub async fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    Board::init(&root)?;

    println!("Initialized postit board in {}", root.display());
    Ok(())
}

pub async fn handle_add(text: Option<String>, stdin: bool, json: bool) -> Result<()> {
    let store = open_store().await?;

    let text = if stdin { Some(read_stdin()?) } else { text };
    let id = match text {
        Some(text) => QuickNote::new(Some(text)).submit(&store).await,
        None => store.add_note(None, true).await,
    };
    store.flush().await?;

    let snapshot = store.snapshot();
    let note = snapshot
        .note(&id)
        .ok_or_else(|| PostitError::NoteNotFound(id.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!(
            "Created note ({}) - {}",
            note.id.short(),
            first_line(&note.content)
        );
    }

    Ok(())
}

pub async fn handle_list(json: bool) -> Result<()> {
    let store = open_store().await?;
    let snapshot = store.snapshot();

    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot.notes)?);
    } else if snapshot.notes.is_empty() {
        println!("No notes found.");
    } else {
        println!("Notes:\n");
        for note in &snapshot.notes {
            print_note_line(note);
        }
    }

    Ok(())
}

pub async fn handle_get(id: String, json: bool) -> Result<()> {
    let store = open_store().await?;
    let snapshot = store.snapshot();
    let id = resolve_note(&snapshot, &id)?;
    let note = snapshot
        .note(&id)
        .ok_or_else(|| PostitError::NoteNotFound(id.to_string()))?;

    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
    } else {
        println!("Note {}", note.id);
        println!("Color: {}", note.color);
        println!("Position: ({}, {})", note.position.x, note.position.y);
        println!("\n{}", note.content);
    }

    Ok(())
}

pub async fn handle_move(id: String, x: f32, y: f32) -> Result<()> {
    if !Position::new(x, y).is_finite() {
        return Err(PostitError::InvalidPosition(x, y));
    }

    let store = open_store().await?;
    let id = resolve_note(&store.snapshot(), &id)?;

    store.update_position(&id, x, y).await;
    store.flush().await?;

    println!("Moved note ({}) to ({}, {})", id.short(), x, y);
    Ok(())
}

pub async fn handle_edit(id: String, text: Option<String>, stdin: bool) -> Result<()> {
    let store = open_store().await?;
    let id = resolve_note(&store.snapshot(), &id)?;

    let text = if stdin {
        read_stdin()?
    } else {
        text.unwrap_or_default()
    };

    store.update_content(&id, text).await;
    store.flush().await?;

    println!("Updated note ({})", id.short());
    Ok(())
}

pub async fn handle_color(id: String, color: String) -> Result<()> {
    let store = open_store().await?;
    let id = resolve_note(&store.snapshot(), &id)?;
    let color: Color = color.parse()?;

    store.update_color(&id, color).await;
    store.flush().await?;

    println!("Colored note ({}) {}", id.short(), color);
    Ok(())
}

pub async fn handle_delete(id: String, force: bool) -> Result<()> {
    let store = open_store().await?;
    let snapshot = store.snapshot();
    let id = resolve_note(&snapshot, &id)?;

    // Confirm deletion unless --force is used
    if !force {
        let preview = snapshot
            .note(&id)
            .map(|n| first_line(&n.content).to_string())
            .unwrap_or_default();
        eprintln!("Delete note ({}) - {}? [y/N] ", id.short(), preview);

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(PostitError::Storage(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    store.delete_note(&id).await;
    store.flush().await?;

    println!("Deleted note ({})", id.short());
    Ok(())
}

pub async fn handle_background_color(color: String) -> Result<()> {
    let store = open_store().await?;
    let color = parse_background_color(&color)?;

    store.update_background_color(color).await;
    store.flush().await?;

    println!("Background set to color {}", color);
    Ok(())
}

pub async fn handle_background_image(uri: String) -> Result<()> {
    let store = open_store().await?;

    store.update_background_image(uri.clone()).await;
    store.flush().await?;

    println!("Background set to image {}", uri);
    Ok(())
}

pub async fn handle_background_show(json: bool) -> Result<()> {
    let store = open_store().await?;
    let background = store.background();

    if json {
        println!("{}", serde_json::to_string_pretty(&background)?);
    } else {
        println!("Background: {}", background);
    }

    Ok(())
}

pub async fn handle_status() -> Result<()> {
    let store = open_store().await?;
    let notice = Notice::for_count(store.snapshot().notes.len());

    println!("{}: {}", notice.title, notice.text);
    println!("  [{}] postit add", notice.action);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(ids: &[&str]) -> Snapshot {
        Snapshot {
            notes: ids
                .iter()
                .map(|id| Note {
                    id: NoteId::from(*id),
                    content: String::new(),
                    position: Position::default(),
                    color: Color::WHITE,
                })
                .collect(),
            ..Snapshot::default()
        }
    }

    #[test]
    fn test_resolve_exact_and_prefix() {
        let snapshot = snapshot_with(&["abc123", "abd456", "ab"]);

        assert_eq!(resolve_note(&snapshot, "abc").unwrap().as_str(), "abc123");
        assert_eq!(resolve_note(&snapshot, "ab").unwrap().as_str(), "ab");
        assert!(matches!(
            resolve_note(&snapshot, "a"),
            Err(PostitError::AmbiguousId(_))
        ));
        assert!(matches!(
            resolve_note(&snapshot, "zzz"),
            Err(PostitError::NoteNotFound(_))
        ));
        assert!(matches!(
            resolve_note(&snapshot, ""),
            Err(PostitError::NoteNotFound(_))
        ));
    }

    #[test]
    fn test_background_presets() {
        assert_eq!(parse_background_color("white").unwrap(), Color::WHITE);
        assert_eq!(
            parse_background_color("Lavender").unwrap(),
            Color(0xFFFF_F0F5)
        );
        assert_eq!(
            parse_background_color("#FF00FF00").unwrap(),
            Color(0xFF00_FF00)
        );
        assert!(parse_background_color("plaid").is_err());
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("one\ntwo"), "one");
        assert_eq!(first_line(""), "");
    }
}
