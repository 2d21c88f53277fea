//! CLI Tooling
//!
//! Command-line interface for the ordered forest. Each command maps onto one
//! `ForestService` operation; destructive commands go through a confirmation
//! hook first.

use crate::config::{ConfigLoader, GroveConfig};
use crate::error::ApiError;
use crate::forest::ForestService;
use crate::logging::{self, LoggingConfig};
use crate::store::{NodeStore, SledNodeStore};
use crate::tooling::format::{
    format_move_outcome, format_node_detail, format_node_table, format_validation_report,
    NodeDetail,
};
use crate::tree::{Parent, SortMode};
use crate::types::NodeId;
use crate::views::{format_label, ForestView};
use clap::{Parser, Subcommand};
use serde::Serialize;
use serde_json::json;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Grove CLI - ordered forest of named nodes
#[derive(Parser, Debug)]
#[command(name = "grove")]
#[command(about = "Ordered forest of named nodes with persistent sibling order")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".", global = true)]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long, global = true)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long, global = true)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Fold logging flags into the loaded logging config.
    pub fn apply_log_overrides(&self, logging: &mut LoggingConfig) {
        if let Some(level) = &self.log_level {
            logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            logging.file = Some(file.clone());
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a node at the end of a sibling group
    Add {
        name: String,
        /// Parent node id (omit for a root node)
        #[arg(long)]
        parent: Option<NodeId>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Rename a node
    Rename { id: NodeId, name: String },
    /// Delete a node and everything below it
    Delete {
        id: NodeId,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Delete every node
    Clear {
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
    /// Swap a node with its previous sibling
    Up { id: NodeId },
    /// Swap a node with its next sibling
    Down { id: NodeId },
    /// Move a node under another parent
    Move {
        id: NodeId,
        /// New parent node id
        #[arg(long, conflicts_with = "root", required_unless_present = "root")]
        parent: Option<NodeId>,
        /// Move to the root group
        #[arg(long)]
        root: bool,
    },
    /// Show one node
    Show {
        id: NodeId,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List one sibling group
    List {
        /// Parent node id (omit for root nodes)
        #[arg(long)]
        parent: Option<NodeId>,
        /// ascending, descending, custom, custom-reversed
        #[arg(long)]
        sort: Option<SortMode>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Render the whole forest
    Tree {
        /// ascending, descending, custom, custom-reversed
        #[arg(long)]
        sort: Option<SortMode>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List a node's sibling group, the node included
    Siblings {
        id: NodeId,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Find nodes by name, ignoring case
    Search {
        text: String,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Populate the sample forest
    Seed {
        /// Seed even if the forest already has nodes
        #[arg(long)]
        force: bool,
    },
    /// Check forest integrity
    Validate {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Renumber sibling indices to 0..n-1, keeping their order
    Normalize {
        /// Parent of the group to renumber (omit for the root group)
        #[arg(long, conflicts_with = "all")]
        parent: Option<NodeId>,
        /// Renumber every group
        #[arg(long)]
        all: bool,
    },
}

/// Decides whether a destructive command may proceed.
pub type ConfirmHook = Box<dyn Fn(&str) -> Result<bool, ApiError> + Send + Sync>;

fn terminal_confirm(prompt: &str) -> Result<bool, ApiError> {
    dialoguer::Confirm::new()
        .with_prompt(prompt)
        .default(false)
        .interact()
        .map_err(|e| ApiError::ConfigError(format!("Failed to get user input: {}", e)))
}

/// CLI context for one workspace
pub struct CliContext {
    service: Arc<ForestService>,
    store_path: PathBuf,
    config: GroveConfig,
    confirm: ConfirmHook,
}

impl CliContext {
    /// Create a context from the workspace and an optional config file,
    /// logging as the config says.
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = load_config(&workspace_root, config_path.as_deref())?;
        Self::open(&workspace_root, config)
    }

    /// Create a context from parsed arguments, applying the logging flags.
    pub fn from_cli(cli: &Cli) -> Result<Self, ApiError> {
        let mut config = load_config(&cli.workspace, cli.config.as_deref())?;
        cli.apply_log_overrides(&mut config.logging);
        Self::open(&cli.workspace, config)
    }

    fn open(workspace_root: &Path, config: GroveConfig) -> Result<Self, ApiError> {
        let dispatch = logging::build_dispatch(Some(&config.logging), Some(workspace_root))?;
        let store_path = config.storage.resolve_path(workspace_root)?;
        std::fs::create_dir_all(&store_path)
            .map_err(|e| ApiError::StorageError(crate::error::StorageError::IoError(e)))?;
        let store: Arc<dyn NodeStore> = Arc::new(SledNodeStore::new(&store_path)?);

        tracing::dispatcher::with_default(&dispatch, || {
            info!(store = %store_path.display(), "Opened node store");
        });

        Ok(Self {
            service: Arc::new(ForestService::new(store, dispatch)),
            store_path,
            config,
            confirm: Box::new(terminal_confirm),
        })
    }

    /// Context over an existing service. Nothing is opened or logged.
    pub fn with_service(service: Arc<ForestService>, config: GroveConfig) -> Self {
        Self {
            service,
            store_path: PathBuf::new(),
            config,
            confirm: Box::new(terminal_confirm),
        }
    }

    /// Replace the terminal prompt used before destructive commands.
    pub fn with_confirmation<F>(mut self, hook: F) -> Self
    where
        F: Fn(&str) -> Result<bool, ApiError> + Send + Sync + 'static,
    {
        self.confirm = Box::new(hook);
        self
    }

    pub fn service(&self) -> &ForestService {
        &self.service
    }

    pub fn store_path(&self) -> &Path {
        &self.store_path
    }

    fn color(&self) -> bool {
        self.config.display.color && std::io::stdout().is_terminal()
    }

    fn sort_or_default(&self, sort: Option<SortMode>) -> SortMode {
        sort.unwrap_or(self.config.display.default_sort)
    }

    /// Execute a CLI command
    pub fn execute(&self, command: &Commands) -> Result<String, ApiError> {
        match command {
            Commands::Add {
                name,
                parent,
                format,
            } => {
                let node = self.service.add_node(name, Parent::from(*parent))?;
                if is_json(format)? {
                    return to_json(&node);
                }
                Ok(format!(
                    "Added {} under {} at index {}",
                    format_label(&node, self.color()),
                    node.parent,
                    node.display_index
                ))
            }
            Commands::Rename { id, name } => {
                let node = self.service.rename_node(*id, name)?;
                Ok(format!("Renamed node #{} to {}", node.id, node.name))
            }
            Commands::Delete { id, yes } => self.handle_delete(*id, *yes),
            Commands::Clear { yes } => {
                if !yes && !(self.confirm)("Delete every node in the forest?")? {
                    return Ok("Deletion cancelled".to_string());
                }
                self.service.delete_all_nodes()?;
                Ok("Deleted all nodes".to_string())
            }
            Commands::Up { id } => Ok(if self.service.move_up(*id)? {
                format!("Moved node #{} up", id)
            } else {
                format!("Node #{} is already first in its group", id)
            }),
            Commands::Down { id } => Ok(if self.service.move_down(*id)? {
                format!("Moved node #{} down", id)
            } else {
                format!("Node #{} is already last in its group", id)
            }),
            Commands::Move { id, parent, root } => {
                let target = match (*parent, *root) {
                    (Some(parent_id), false) => Parent::ChildOf(parent_id),
                    (None, true) => Parent::Root,
                    _ => {
                        return Err(ApiError::InvalidArgument(
                            "Specify exactly one of --parent or --root".to_string(),
                        ))
                    }
                };
                let outcome = self.service.move_to_another_parent(*id, target)?;
                Ok(format_move_outcome(&outcome))
            }
            Commands::Show { id, format } => self.handle_show(*id, format),
            Commands::List {
                parent,
                sort,
                format,
            } => {
                let sort = self.sort_or_default(*sort);
                let parent = Parent::from(*parent);
                if let Parent::ChildOf(parent_id) = parent {
                    // listing a missing parent is an error, not an empty group
                    self.service.get_node(parent_id)?;
                }
                let nodes = self.service.get_group(parent, sort)?;
                if is_json(format)? {
                    return to_json(&json!({
                        "parent": parent.id(),
                        "sort": sort,
                        "nodes": nodes,
                        "total": nodes.len(),
                    }));
                }
                let title = match parent {
                    Parent::Root => "Root nodes".to_string(),
                    Parent::ChildOf(parent_id) => format!("Children of #{}", parent_id),
                };
                Ok(format_node_table(&title, &nodes, sort, self.color()))
            }
            Commands::Tree { sort, format } => {
                let view = ForestView::build(&self.service, self.sort_or_default(*sort))?;
                if is_json(format)? {
                    return to_json(&view);
                }
                if view.is_empty() {
                    return Ok("Forest is empty.".to_string());
                }
                Ok(view.render_text(self.color()).trim_end().to_string())
            }
            Commands::Siblings { id, format } => {
                let nodes = self.service.get_sibling_nodes(*id)?;
                if is_json(format)? {
                    return to_json(&json!({ "node_id": id, "siblings": nodes }));
                }
                Ok(format_node_table(
                    &format!("Siblings of #{}", id),
                    &nodes,
                    SortMode::Custom,
                    self.color(),
                ))
            }
            Commands::Search { text, format } => {
                let nodes = self.service.search_nodes(text)?;
                if is_json(format)? {
                    return to_json(&json!({
                        "query": text,
                        "nodes": nodes,
                        "total": nodes.len(),
                    }));
                }
                if nodes.is_empty() {
                    return Ok(format!("No nodes match '{}'.", text));
                }
                Ok(nodes
                    .iter()
                    .map(|node| format!("{} (under {})", format_label(node, self.color()), node.parent))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            Commands::Seed { force } => {
                if !force && !self.service.get_all_nodes()?.is_empty() {
                    return Err(ApiError::InvalidArgument(
                        "Forest is not empty; use --force to add the sample forest anyway"
                            .to_string(),
                    ));
                }
                let planted = self.service.seed()?;
                Ok(format!("Seeded {} node(s)", planted))
            }
            Commands::Validate { format } => {
                let report = self.service.validate()?;
                if is_json(format)? {
                    return to_json(&report);
                }
                Ok(format_validation_report(&report))
            }
            Commands::Normalize { parent, all } => {
                let changed = if *all {
                    self.service.normalize_all()?
                } else {
                    self.service.normalize_group(Parent::from(*parent))?
                };
                Ok(format!("Normalized {} node(s)", changed))
            }
        }
    }

    /// Handle delete command. Only nodes with children ask for confirmation.
    fn handle_delete(&self, id: NodeId, yes: bool) -> Result<String, ApiError> {
        if !yes && self.service.has_children(id)? {
            let node = self.service.get_node(id)?;
            let descendants = self.service.count_descendants(id)?;
            let prompt = format!(
                "Delete '{}' and its {} descendant(s)?",
                node.name, descendants
            );
            if !(self.confirm)(&prompt)? {
                return Ok("Deletion cancelled".to_string());
            }
        }

        match self.service.delete_subtree(id)? {
            0 => Ok(format!("Node #{} does not exist; nothing deleted", id)),
            removed => Ok(format!("Deleted {} node(s)", removed)),
        }
    }

    fn handle_show(&self, id: NodeId, format: &str) -> Result<String, ApiError> {
        let node = self.service.get_node(id)?;
        let detail = NodeDetail {
            node: &node,
            children: self.service.get_children(id, SortMode::Custom)?.len(),
            descendants: self.service.count_descendants(id)?,
            can_move_up: self.service.can_move_up(id)?,
            can_move_down: self.service.can_move_down(id)?,
        };
        if is_json(format)? {
            return to_json(&json!({
                "node": detail.node,
                "children": detail.children,
                "descendants": detail.descendants,
                "can_move_up": detail.can_move_up,
                "can_move_down": detail.can_move_down,
            }));
        }
        Ok(format_node_detail(&detail, self.color()))
    }
}

fn load_config(workspace_root: &Path, config_path: Option<&Path>) -> Result<GroveConfig, ApiError> {
    let config = match config_path {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load(workspace_root)?,
    };
    Ok(config)
}

fn is_json(format: &str) -> Result<bool, ApiError> {
    match format {
        "json" => Ok(true),
        "text" => Ok(false),
        other => Err(ApiError::InvalidArgument(format!(
            "Invalid output format: {} (must be 'text' or 'json')",
            other
        ))),
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(value)?)
}
