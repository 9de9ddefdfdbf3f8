use std::path::{Path, PathBuf};

use chrono::Local;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::editor::edit;
use crate::io::config_io;
use crate::io::document_io::{
    DocumentStore, FileStore, default_export_name, export_document, import_document,
};
use crate::io::images::{self, DirectoryImageStore};
use crate::model::config::AppConfig;
use crate::model::document::TreeDocument;
use crate::model::task::TaskNode;
use crate::ops::ids::{RandomIds, fresh_id};
use crate::ops::tree_ops::{self, DropPosition};
use crate::preview::url::{detect_urls, preview_for};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Resolved files for one invocation
pub struct Context {
    pub config: AppConfig,
    pub data_path: PathBuf,
    pub store: FileStore,
}

impl Context {
    pub fn resolve(file: Option<&Path>, config_path: Option<&Path>) -> Result<Self, Box<dyn std::error::Error>> {
        let config = config_io::load_config(config_path)?;
        let data_path = config_io::resolve_data_path(file, &config);
        let store = FileStore::new(&data_path);
        Ok(Context {
            config,
            data_path,
            store,
        })
    }

    /// Saved document, or the initial tree when nothing is saved yet
    fn load(&self) -> Result<TreeDocument, Box<dyn std::error::Error>> {
        Ok(self.store.load()?.unwrap_or_else(TreeDocument::initial))
    }

    fn save(&self, mut doc: TreeDocument) -> CmdResult {
        doc.saved_at = chrono::Utc::now();
        self.store.save(&doc)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let json = cli.json;
    let ctx = Context::resolve(cli.file.as_deref(), cli.config.as_deref())?;

    match cli.command {
        None => Ok(()),
        Some(cmd) => match cmd {
            // Read commands
            Commands::Show => cmd_show(&ctx, json),
            Commands::Leaves(args) => cmd_leaves(&ctx, args, json),
            Commands::Urls => cmd_urls(&ctx, json),

            // Write commands
            Commands::Add(args) => cmd_add(&ctx, args),
            Commands::Toggle(args) => cmd_toggle(&ctx, args),
            Commands::Rm(args) => cmd_rm(&ctx, args),
            Commands::Mv(args) => cmd_mv(&ctx, args),
            Commands::Attach(args) => cmd_attach(&ctx, args),

            // Transfer
            Commands::Export(args) => cmd_export(&ctx, args),
            Commands::Import(args) => cmd_import(&ctx, args),
        },
    }
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(ctx: &Context, json: bool) -> CmdResult {
    let doc = ctx.load()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&tree_to_json(&doc.root))?);
    } else {
        for line in format_outline(&doc.root) {
            println!("{}", line);
        }
    }
    Ok(())
}

fn cmd_leaves(ctx: &Context, args: LeavesArgs, json: bool) -> CmdResult {
    let doc = ctx.load()?;
    let leaves: Vec<_> = tree_ops::collect_leaves(&doc.root)
        .into_iter()
        .filter(|t| args.all || !t.is_completed())
        .collect();
    if json {
        let out: Vec<LeafJson> = leaves.iter().map(|t| leaf_to_json(t)).collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        for task in leaves {
            println!("{}", format_task_line(task));
        }
    }
    Ok(())
}

fn cmd_urls(ctx: &Context, json: bool) -> CmdResult {
    let doc = ctx.load()?;
    let mut found = Vec::new();
    for task in tree_ops::collect_tasks(&doc.root) {
        for detected in detect_urls(task.text()) {
            let preview = preview_for(&detected.url);
            found.push(UrlJson {
                task_id: task.id().to_string(),
                url: detected.url,
                kind: detected.kind,
                preview,
            });
        }
    }
    if json {
        println!("{}", serde_json::to_string_pretty(&found)?);
    } else {
        for u in &found {
            println!("{}", format_url_line(&u.task_id, u.kind, &u.url));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let mut doc = ctx.load()?;
    let parent = args
        .parent
        .unwrap_or_else(|| doc.root.id().to_string());
    if tree_ops::find_task(&doc.root, &parent).is_none() {
        return Err(format!("task not found: {}", parent).into());
    }

    let id = fresh_id(&doc.root, &mut RandomIds::new());
    doc.root = tree_ops::add_child(&doc.root, &parent, TaskNode::new(id.clone(), args.text));
    ctx.save(doc)?;
    tracing::info!(id = %id, parent = %parent, "task added");
    println!("{}", id);
    Ok(())
}

fn cmd_toggle(ctx: &Context, args: IdArgs) -> CmdResult {
    let mut doc = ctx.load()?;
    let task = tree_ops::find_task(&doc.root, &args.id)
        .and_then(|found| found.node.as_task().cloned())
        .ok_or_else(|| format!("task not found: {}", args.id))?;
    if task.has_children() {
        return Err(format!(
            "{} has subtasks; its completion follows them",
            args.id
        )
        .into());
    }

    doc.root = tree_ops::toggle_complete(&doc.root, &args.id);
    let line = tree_ops::find_task(&doc.root, &args.id)
        .and_then(|found| found.node.as_task())
        .map(|t| format_task_line(t))
        .unwrap_or_default();
    ctx.save(doc)?;
    println!("{}", line);
    Ok(())
}

fn cmd_rm(ctx: &Context, args: IdArgs) -> CmdResult {
    let mut doc = ctx.load()?;
    match tree_ops::find_task(&doc.root, &args.id) {
        None => return Err(format!("task not found: {}", args.id).into()),
        Some(found) if found.node.is_root() => return Err("cannot remove the root".into()),
        Some(_) => {}
    }
    doc.root = edit::delete_task(&doc.root, &args.id);
    ctx.save(doc)?;
    tracing::info!(id = %args.id, "task removed");
    Ok(())
}

fn cmd_mv(ctx: &Context, args: MvArgs) -> CmdResult {
    let mut doc = ctx.load()?;
    let position = if args.before {
        DropPosition::Before
    } else if args.after {
        DropPosition::After
    } else {
        DropPosition::Child
    };
    doc.root = tree_ops::move_task(&doc.root, &args.id, &args.target, position)?;
    ctx.save(doc)?;
    Ok(())
}

fn cmd_attach(ctx: &Context, args: AttachArgs) -> CmdResult {
    let mut doc = ctx.load()?;
    let bytes = images::read_image(&args.file)?;
    let extension = images::image_extension(&args.file);
    let uploader = DirectoryImageStore::new(config_io::resolve_images_dir(&ctx.data_path, &ctx.config));

    doc.root = edit::attach_image(
        &doc.root,
        &args.id,
        &bytes,
        &extension,
        &uploader,
        &mut RandomIds::new(),
    )?;
    let key = tree_ops::find_task(&doc.root, &args.id)
        .and_then(|found| found.node.as_task())
        .and_then(|t| t.images().last())
        .map(|i| i.storage_key.clone())
        .unwrap_or_default();
    ctx.save(doc)?;
    println!("{}", key);
    Ok(())
}

// ---------------------------------------------------------------------------
// Export / import
// ---------------------------------------------------------------------------

fn cmd_export(ctx: &Context, args: ExportArgs) -> CmdResult {
    let mut doc = ctx.load()?;
    doc.saved_at = chrono::Utc::now();
    let path = args
        .path
        .unwrap_or_else(|| PathBuf::from(default_export_name(Local::now().date_naive())));
    export_document(&doc, &path)?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_import(ctx: &Context, args: ImportArgs) -> CmdResult {
    let doc = import_document(&args.path)?;
    let count = tree_ops::collect_ids(&doc.root).len();
    ctx.save(doc)?;
    println!("imported {} tasks from {}", count, args.path.display());
    Ok(())
}
