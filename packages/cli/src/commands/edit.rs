use anyhow::Result;
use clap::Args;
use colored::Colorize;
use jsontree_editor::{convert_value, resolve, DataType, DropPosition, Mutation, Path, Placement};

use super::{display_path, parse_value, Session};

#[derive(Args, Debug)]
pub struct SetArgs {
    /// Path to the node, e.g. `users.0.name`
    pub path: Path,

    /// New value (JSON, or a bare string)
    pub value: String,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    pub path: Path,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Path of the new node, including its key
    pub path: Path,

    /// Value (JSON, or a bare string)
    pub value: String,

    /// Place the new key before this sibling
    #[arg(long, conflicts_with_all = ["after", "insert"])]
    pub before: Option<String>,

    /// Place the new key after this sibling
    #[arg(long, conflicts_with = "insert")]
    pub after: Option<String>,

    /// Insert into an array, shifting later elements
    #[arg(long)]
    pub insert: bool,
}

#[derive(Args, Debug)]
pub struct MoveArgs {
    /// Node to move (requires `"restrictDrag": false` in the config)
    pub source: Path,

    /// Node to drop next to
    pub dest: Path,

    /// Drop below the destination instead of above it
    #[arg(long)]
    pub below: bool,
}

#[derive(Args, Debug)]
pub struct TypesArgs {
    pub path: Path,

    /// string, number, boolean, null, object or array
    pub data_type: DataType,
}

pub async fn set(args: SetArgs, session: &Session) -> Result<()> {
    let mutation = Mutation::Update {
        path: args.path,
        value: parse_value(&args.value),
    };
    run(mutation, session).await
}

pub async fn delete(args: DeleteArgs, session: &Session) -> Result<()> {
    run(Mutation::Delete { path: args.path }, session).await
}

pub async fn add(args: AddArgs, session: &Session) -> Result<()> {
    let placement = match (args.before, args.after, args.insert) {
        (Some(anchor), _, _) => Placement::InsertBefore(anchor),
        (_, Some(anchor), _) => Placement::InsertAfter(anchor),
        (_, _, true) => Placement::Insert,
        _ => Placement::Assign,
    };

    let mutation = Mutation::Add {
        path: args.path,
        value: parse_value(&args.value),
        placement,
    };
    run(mutation, session).await
}

pub async fn move_node(args: MoveArgs, session: &Session) -> Result<()> {
    let position = if args.below { DropPosition::Below } else { DropPosition::Above };

    // Same flow as a drag: pick up the source, drop it on the destination
    let state = session.doc.tree_state();
    state.start_drag(args.source.clone());

    let description = format!("move {} to {}", display_path(&args.source), display_path(&args.dest));
    match session.doc.drop_on(args.dest, position).await {
        Ok(()) => {
            eprintln!("{} {}", "✓".green(), description);
            Ok(())
        }
        Err(err) => {
            state.clear_drag_source();
            Err(session.explain(err))
        }
    }
}

/// Switch the node at a path to another type, converting its value
pub async fn types(args: TypesArgs, session: &Session) -> Result<()> {
    let current = session
        .doc
        .with_node(&args.path, |node| node.value.clone())?;

    let from = DataType::of(&current);
    if from == args.data_type {
        eprintln!("{} already {}", display_path(&args.path), from);
        return Ok(());
    }

    let converted = convert_value(&current, args.data_type);
    eprintln!(
        "{} {} → {}",
        display_path(&args.path).cyan(),
        from.to_string().dimmed(),
        args.data_type.to_string().bold()
    );

    run(
        Mutation::Update {
            path: args.path,
            value: converted,
        },
        session,
    )
    .await
}

async fn run(mutation: Mutation, session: &Session) -> Result<()> {
    let path = mutation.path().clone();
    let description = mutation.describe();
    let state = session.doc.tree_state();

    // Claim edit mode on nodes that already exist
    let existing = resolve(&session.doc.data(), &path).is_ok();
    if existing {
        state.start_editing(&path).map_err(|err| session.explain(err.into()))?;
    }

    let result = session.doc.apply(mutation).await;

    if existing {
        state.stop_editing(&path);
    }

    match result {
        Ok(()) => {
            eprintln!("{} {}", "✓".green(), description);
            Ok(())
        }
        Err(err) => Err(session.explain(err)),
    }
}
