use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jsontree_editor::{display_text, resolve, DataType, Path};

use super::{display_path, Session};

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Path to the node (the whole document when omitted)
    pub path: Option<Path>,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Text to look for
    pub query: String,
}

pub fn get(args: GetArgs, session: &Session) -> Result<()> {
    let path = args.path.unwrap_or_default();
    let data = session.doc.data();
    let value = resolve(&data, &path)?;

    let collapsed = session.doc.is_collapsed(&path)?;
    let size = session.doc.with_node(&path, |node| node.size)?;

    eprintln!(
        "{} {} {}",
        display_path(&path).cyan(),
        DataType::of(value).to_string().dimmed(),
        if collapsed {
            format!("({} items, collapsed)", size).dimmed()
        } else {
            "".normal()
        }
    );
    println!("{}", serde_json::to_string_pretty(value)?);

    Ok(())
}

pub fn search(args: SearchArgs, session: &Session) -> Result<()> {
    let data = session.doc.data();
    let matches = session.doc.search(&args.query);

    if matches.is_empty() {
        eprintln!("{} No matches for \"{}\"", "✗".yellow(), args.query);
        return Ok(());
    }

    for path in &matches {
        let value = resolve(&data, path)?;
        let preview = match DataType::of(value) {
            DataType::Object | DataType::Array => DataType::of(value).to_string().dimmed().to_string(),
            _ => display_text(value),
        };
        println!("{}  {}", display_path(path).cyan(), preview);
    }

    eprintln!();
    eprintln!("   {} matches", matches.len());

    Ok(())
}
