//! Command implementations for the CLI interface.
//!
//! Each handler builds the stores it needs from the workspace, prints a
//! short table or confirmation, and exits non-zero on error.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use clap::Subcommand;
use clap_complete::{generate, Shell};

use crate::analytics::Analytics;
use crate::api;
use crate::archive_store::ArchiveStore;
use crate::config::{Config, DEFAULT_HOST, DEFAULT_PORT};
use crate::db::Workspace;
use crate::error::{Error, Result};
use crate::fields::{PeriodFilter, PromptCategory, TaskStatus, TemplateCategory};
use crate::kanban;
use crate::project::{CreateProjectDto, Project};
use crate::project_store::ProjectStore;
use crate::prompt_seed::seed_default_prompts;
use crate::prompt_store::PromptStore;
use crate::task::{Archive, CreateTaskDto, Task};
use crate::task_store::TaskStore;
use crate::template::{CreateTemplateDto, PromptTemplate, Template, UpdatePromptDto};
use crate::template_store::TemplateStore;
use crate::tui::workflow_run::run_board;
use crate::variables::{escape_variables, has_variables, suggest_variables};

/// Characters of an id shown in tables. Any unique prefix is accepted back.
const SHORT_ID: usize = 8;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP JSON API.
    Serve {
        /// Interface to bind.
        #[arg(long, env = "DW_HOST", default_value = DEFAULT_HOST)]
        host: String,
        /// Port to bind.
        #[arg(long, env = "DW_PORT", default_value_t = DEFAULT_PORT)]
        port: u16,
    },

    /// Open the Kanban board for a project.
    Board {
        /// Project id, id prefix or name.
        project: String,
    },

    /// Manage projects.
    Project {
        #[command(subcommand)]
        action: ProjectAction,
    },

    /// Manage tasks on a project board.
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },

    /// Manage document templates.
    Template {
        #[command(subcommand)]
        action: TemplateAction,
    },

    /// Manage AI prompt templates.
    Prompt {
        #[command(subcommand)]
        action: PromptAction,
    },

    /// Manage archived tasks.
    Archive {
        #[command(subcommand)]
        action: ArchiveAction,
    },

    /// Project analytics.
    Stats {
        #[command(subcommand)]
        action: StatsAction,
    },

    /// Generate shell completion scripts.
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// List all projects.
    List,
    /// Create a project.
    Create {
        name: String,
        #[arg(long)]
        description: Option<String>,
        /// Technology. May be repeated. Accepts comma-separated.
        #[arg(long = "tech")]
        tech_stack: Vec<String>,
        /// Feature category. May be repeated. Accepts comma-separated.
        #[arg(long = "category")]
        categories: Vec<String>,
        /// Reference attached to new tasks. May be repeated.
        #[arg(long = "reference")]
        default_references: Vec<String>,
    },
    /// Delete a project with its tasks and archives.
    Delete {
        /// Project id, id prefix or name.
        project: String,
    },
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List the tasks of a project, grouped by stage.
    List {
        /// Project id, id prefix or name.
        project: String,
    },
    /// Add a task to the first column.
    Add {
        /// Project id, id prefix or name.
        project: String,
        title: String,
        /// Feature list text.
        #[arg(long)]
        features: Option<String>,
        /// Reference. May be repeated. Defaults to the project's references.
        #[arg(long = "reference")]
        references: Vec<String>,
    },
    /// Move a task to another stage.
    Move {
        /// Task id or id prefix.
        task: String,
        #[arg(value_enum)]
        status: TaskStatus,
    },
    /// Delete a task.
    Delete {
        /// Task id or id prefix.
        task: String,
    },
}

#[derive(Subcommand)]
pub enum TemplateAction {
    /// List templates.
    List {
        #[arg(long, value_enum)]
        category: Option<TemplateCategory>,
        /// Only global templates and those of this project id.
        #[arg(long)]
        project: Option<String>,
    },
    /// Print a template and its content.
    Show {
        /// Template id, id prefix or name.
        template: String,
    },
    /// Create a template. Variables are suggested from the content.
    Create {
        name: String,
        #[arg(long, value_enum)]
        category: TemplateCategory,
        #[arg(long)]
        description: Option<String>,
        /// Inline content.
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read content from a file.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Scope the template to a project id.
        #[arg(long)]
        project: Option<String>,
        /// Mark as a built-in template that cannot be deleted.
        #[arg(long)]
        default: bool,
    },
    /// Delete a template. Default templates cannot be deleted.
    Delete {
        /// Template id, id prefix or name.
        template: String,
    },
    /// Render a template with default values.
    Preview {
        /// Template id, id prefix or name.
        template: String,
    },
    /// Render a template with the given values.
    Apply {
        /// Template id, id prefix or name.
        template: String,
        /// Variable value as KEY=VALUE. May be repeated.
        #[arg(long = "var", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,
    },
    /// List the placeholders found in a file.
    Vars {
        file: PathBuf,
        /// Print the file with placeholders escaped instead.
        #[arg(long)]
        escape: bool,
    },
}

#[derive(Subcommand)]
pub enum PromptAction {
    /// List prompts.
    List {
        #[arg(long, value_enum)]
        category: Option<PromptCategory>,
    },
    /// Print a prompt and its content.
    Show {
        /// Prompt id, id prefix or name.
        prompt: String,
    },
    /// Update a prompt. A content change stores the previous version.
    Edit {
        /// Prompt id, id prefix or name.
        prompt: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        /// Inline content.
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,
        /// Read content from a file.
        #[arg(long)]
        file: Option<PathBuf>,
    },
    /// Restore a prompt's original content.
    Reset {
        /// Prompt id, id prefix or name.
        prompt: String,
    },
    /// List stored versions of a prompt.
    Versions {
        /// Prompt id, id prefix or name.
        prompt: String,
    },
    /// Create the built-in prompts if none exist.
    Seed,
}

#[derive(Subcommand)]
pub enum ArchiveAction {
    /// List archived tasks of a project.
    List {
        /// Project id, id prefix or name.
        project: String,
    },
    /// Archive a task from the prototype column.
    Add {
        /// Task id or id prefix.
        task: String,
    },
    /// Put an archived task back on the board.
    Restore {
        /// Project id, id prefix or name.
        project: String,
        /// Archive id or id prefix.
        archive: String,
    },
    /// Permanently delete an archive entry.
    Delete {
        /// Project id, id prefix or name.
        project: String,
        /// Archive id or id prefix.
        archive: String,
    },
}

#[derive(Subcommand)]
pub enum StatsAction {
    /// Task counts, completion rate and documents generated.
    Summary {
        /// Project id, id prefix or name.
        project: String,
    },
    /// Tasks created, completed and documented per period.
    Timeline {
        /// Project id, id prefix or name.
        project: String,
        #[arg(long, value_enum, default_value_t = PeriodFilter::Weekly)]
        period: PeriodFilter,
    },
    /// Daily timeline as CSV.
    Export {
        /// Project id, id prefix or name.
        project: String,
        /// Output file path (default: stdout)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((k, v)) if !k.is_empty() => Ok((k.to_string(), v.to_string())),
        _ => Err(format!("invalid KEY=VALUE: no `=` found in `{s}`")),
    }
}

/// Print the error and exit non-zero.
fn exit_on_err<T>(result: Result<T>) -> T {
    result.unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    })
}

/// Truncate to `width` characters, marking the cut with an ellipsis.
pub fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(1)).collect();
        out.push('…');
        out
    }
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID).unwrap_or(id)
}

/// Split repeated and comma-separated flag values.
fn split_list(values: Vec<String>) -> Vec<String> {
    values
        .iter()
        .flat_map(|v| v.split(','))
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

fn read_content(content: Option<String>, file: Option<PathBuf>) -> Result<Option<String>> {
    match (content, file) {
        (Some(c), _) => Ok(Some(c)),
        (None, Some(path)) => Ok(Some(fs::read_to_string(path)?)),
        (None, None) => Ok(None),
    }
}

/// Exactly one candidate, or a not-found / ambiguity error.
fn pick_one<T>(mut matches: Vec<T>, what: &str, ident: &str) -> Result<T> {
    match matches.len() {
        0 => Err(Error::not_found(format!("{what} not found"))),
        1 => Ok(matches.remove(0)),
        n => Err(Error::validation(format!(
            "'{ident}' matches {n} {}s, use a longer id",
            what.to_lowercase()
        ))),
    }
}

fn matches_ident(id: &str, name: &str, ident: &str) -> bool {
    id.starts_with(ident) || name.eq_ignore_ascii_case(ident)
}

pub fn resolve_project(workspace: &Workspace, ident: &str) -> Result<Project> {
    let store = ProjectStore::new(workspace);
    if let Some(project) = store.get(ident)? {
        return Ok(project);
    }
    let matches = store.list()?.into_iter().filter(|p| matches_ident(&p.id, &p.name, ident)).collect();
    pick_one(matches, "Project", ident)
}

pub fn resolve_task(workspace: &Workspace, ident: &str) -> Result<Task> {
    let tasks = TaskStore::new(workspace);
    if let Some(task) = tasks.find(ident)? {
        return Ok(task);
    }
    let mut matches = Vec::new();
    for project in ProjectStore::new(workspace).list()? {
        matches.extend(tasks.list(&project.id)?.into_iter().filter(|t| t.id.starts_with(ident)));
    }
    pick_one(matches, "Task", ident)
}

fn resolve_template(store: &TemplateStore, ident: &str) -> Result<Template> {
    if let Some(template) = store.get(ident)? {
        return Ok(template);
    }
    let matches = store.list(None, None)?.into_iter().filter(|t| matches_ident(&t.id, &t.name, ident)).collect();
    pick_one(matches, "Template", ident)
}

fn resolve_prompt(store: &PromptStore, ident: &str) -> Result<PromptTemplate> {
    if let Some(prompt) = store.get(ident)? {
        return Ok(prompt);
    }
    let matches = store.list(None)?.into_iter().filter(|p| matches_ident(&p.id, &p.name, ident)).collect();
    pick_one(matches, "Prompt", ident)
}

fn resolve_archive(store: &ArchiveStore, project_id: &str, ident: &str) -> Result<Archive> {
    let matches = store.list(project_id)?.into_iter().filter(|a| a.id.starts_with(ident)).collect();
    pick_one(matches, "Archive", ident)
}

/// Run the API server on a dedicated runtime until interrupted.
pub fn cmd_serve(config: Config) {
    let runtime = exit_on_err(tokio::runtime::Runtime::new().map_err(Error::from));
    exit_on_err(runtime.block_on(api::serve(&config)));
}

/// Launch the Kanban board.
pub fn cmd_board(workspace: &Workspace, project: &str) {
    let project = exit_on_err(resolve_project(workspace, project));
    exit_on_err(run_board(workspace, &project.id));
}

pub fn cmd_project(workspace: &Workspace, action: ProjectAction) {
    let store = ProjectStore::new(workspace);
    match action {
        ProjectAction::List => {
            let projects = exit_on_err(store.list());
            if projects.is_empty() {
                println!("No projects found.");
                return;
            }
            let tasks = TaskStore::new(workspace);
            println!("{:<10} {:<24} {:<6} {:<24} {}", "ID", "Name", "Tasks", "Tech", "Created");
            for p in projects {
                let count = tasks.list(&p.id).map(|t| t.len()).unwrap_or(0);
                println!(
                    "{:<10} {:<24} {:<6} {:<24} {}",
                    short_id(&p.id),
                    truncate(&p.name, 24),
                    count,
                    truncate(&p.tech_stack.join(","), 24),
                    p.created_at.format("%Y-%m-%d"),
                );
            }
        }

        ProjectAction::Create { name, description, tech_stack, categories, default_references } => {
            let dto = CreateProjectDto {
                name: Some(name),
                description,
                tech_stack: Some(split_list(tech_stack)),
                categories: Some(split_list(categories)),
                default_references: Some(default_references),
            };
            let project = exit_on_err(store.create(dto));
            println!("Created project '{}' ({})", project.name, project.id);
        }

        ProjectAction::Delete { project } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            exit_on_err(store.delete(&project.id));
            println!("Deleted project '{}'", project.name);
        }
    }
}

pub fn cmd_task(workspace: &Workspace, action: TaskAction) {
    let store = TaskStore::new(workspace);
    match action {
        TaskAction::List { project } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let tasks = exit_on_err(store.list(&project.id));
            if tasks.is_empty() {
                println!("No tasks in '{}'.", project.name);
                return;
            }
            println!("{:<10} {:<14} {:<36} {:<5} {}", "ID", "Stage", "Title", "Docs", "Updated");
            for column in kanban::KANBAN_COLUMNS.iter() {
                for t in tasks.iter().filter(|t| t.status == column.status) {
                    println!(
                        "{:<10} {:<14} {:<36} {:<5} {}",
                        short_id(&t.id),
                        column.title,
                        truncate(&t.title, 36),
                        format!("{}/3", t.documents_generated()),
                        t.updated_at.format("%Y-%m-%d %H:%M"),
                    );
                }
            }
        }

        TaskAction::Add { project, title, features, references } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let dto = CreateTaskDto {
                title,
                feature_list: features,
                references: (!references.is_empty()).then_some(references),
            };
            let task = exit_on_err(store.create(&project.id, dto));
            println!("Added task {} to '{}'", short_id(&task.id), project.name);
        }

        TaskAction::Move { task, status } => {
            let task = exit_on_err(resolve_task(workspace, &task));
            let from = task.status;
            let moved = exit_on_err(store.set_status(&task.id, status));
            let title = kanban::column(moved.status).title;
            if kanban::triggers_generation(from, status) {
                println!("Moved '{}' to {} (generation requested)", moved.title, title);
            } else {
                println!("Moved '{}' to {}", moved.title, title);
            }
        }

        TaskAction::Delete { task } => {
            let task = exit_on_err(resolve_task(workspace, &task));
            exit_on_err(store.delete(&task.id));
            println!("Deleted task '{}'", task.title);
        }
    }
}

pub fn cmd_template(workspace: &Workspace, action: TemplateAction) {
    let store = TemplateStore::new(workspace);
    match action {
        TemplateAction::List { category, project } => {
            let templates = exit_on_err(store.list(category, project.as_deref()));
            if templates.is_empty() {
                println!("No templates found.");
                return;
            }
            println!("{:<10} {:<28} {:<20} {:<5} {}", "ID", "Name", "Category", "Vars", "Default");
            for t in templates {
                println!(
                    "{:<10} {:<28} {:<20} {:<5} {}",
                    short_id(&t.id),
                    truncate(&t.name, 28),
                    t.category,
                    t.variables.len(),
                    if t.is_default { "yes" } else { "" },
                );
            }
        }

        TemplateAction::Show { template } => {
            let t = exit_on_err(resolve_template(&store, &template));
            println!("{} [{}]", t.name, t.category);
            println!("ID:          {}", t.id);
            if !t.description.is_empty() {
                println!("Description: {}", t.description);
            }
            if let Some(project_id) = &t.project_id {
                println!("Project:     {project_id}");
            }
            for v in &t.variables {
                let required = if v.required { " (required)" } else { "" };
                let default = v.non_empty_default().map(|d| format!(" = {d}")).unwrap_or_default();
                println!("  {{{{{}}}}}{required}{default}", v.name);
            }
            println!();
            println!("{}", t.content);
        }

        TemplateAction::Create { name, category, description, content, file, project, default } => {
            let content = exit_on_err(read_content(content, file)).unwrap_or_default();
            let dto = CreateTemplateDto {
                name: Some(name),
                category: Some(category.as_str().to_string()),
                description,
                variables: Some(suggest_variables(&content)),
                content: Some(content),
                project_id: project,
            };
            let t = exit_on_err(if default { store.create_default(dto) } else { store.create(dto) });
            println!("Created template '{}' ({}) with {} variables", t.name, t.id, t.variables.len());
        }

        TemplateAction::Delete { template } => {
            let t = exit_on_err(resolve_template(&store, &template));
            exit_on_err(store.delete(&t.id));
            println!("Deleted template '{}'", t.name);
        }

        TemplateAction::Preview { template } => {
            let t = exit_on_err(resolve_template(&store, &template));
            println!("{}", exit_on_err(store.preview(&t.id)));
        }

        TemplateAction::Apply { template, vars } => {
            let t = exit_on_err(resolve_template(&store, &template));
            let values: HashMap<String, String> = vars.into_iter().collect();
            println!("{}", exit_on_err(store.apply(&t.id, &values)));
        }

        TemplateAction::Vars { file, escape } => {
            let content = exit_on_err(fs::read_to_string(&file).map_err(Error::from));
            if escape {
                print!("{}", escape_variables(&content));
                return;
            }
            if !has_variables(&content) {
                println!("No variables in {}.", file.display());
                return;
            }
            println!("{:<28} {}", "Variable", "Suggested description");
            for v in suggest_variables(&content) {
                println!("{:<28} {}", truncate(&v.name, 28), v.description);
            }
        }
    }
}

pub fn cmd_prompt(workspace: &Workspace, action: PromptAction) {
    let store = PromptStore::new(workspace);
    match action {
        PromptAction::List { category } => {
            let prompts = exit_on_err(store.list(category));
            if prompts.is_empty() {
                println!("No prompts found. Run `dw prompt seed` to create the built-in set.");
                return;
            }
            println!("{:<10} {:<30} {:<20} {:<4} {}", "ID", "Name", "Category", "Ver", "Modified");
            for p in prompts {
                println!(
                    "{:<10} {:<30} {:<20} {:<4} {}",
                    short_id(&p.id),
                    truncate(&p.name, 30),
                    p.category,
                    p.version,
                    if p.is_modified { "yes" } else { "" },
                );
            }
        }

        PromptAction::Show { prompt } => {
            let p = exit_on_err(resolve_prompt(&store, &prompt));
            println!("{} [{}] v{}{}", p.name, p.category, p.version, if p.is_modified { " (modified)" } else { "" });
            println!("ID:          {}", p.id);
            if !p.description.is_empty() {
                println!("Description: {}", p.description);
            }
            for v in &p.variables {
                let required = if v.required { " (required)" } else { "" };
                println!("  {{{{{}}}}}{required} {}", v.name, v.description);
            }
            println!();
            println!("{}", p.content);
        }

        PromptAction::Edit { prompt, name, description, content, file } => {
            let p = exit_on_err(resolve_prompt(&store, &prompt));
            let content = exit_on_err(read_content(content, file));
            if name.is_none() && description.is_none() && content.is_none() {
                eprintln!("Nothing to update. Pass --name, --description, --content or --file.");
                std::process::exit(1);
            }
            let dto = UpdatePromptDto { name, description, content, ..Default::default() };
            let updated = exit_on_err(store.update(&p.id, dto));
            println!("Updated prompt '{}' (v{})", updated.name, updated.version);
        }

        PromptAction::Reset { prompt } => {
            let p = exit_on_err(resolve_prompt(&store, &prompt));
            let reset = exit_on_err(store.reset(&p.id));
            println!("Reset prompt '{}' (v{})", reset.name, reset.version);
        }

        PromptAction::Versions { prompt } => {
            let p = exit_on_err(resolve_prompt(&store, &prompt));
            let versions = exit_on_err(store.versions(&p.id));
            if versions.is_empty() {
                println!("No stored versions for '{}' (current: v{}).", p.name, p.version);
                return;
            }
            println!("{:<8} {:<18} {}", "Version", "Stored", "Chars");
            for v in versions {
                println!(
                    "{:<8} {:<18} {}",
                    format!("v{}", v.version),
                    v.created_at.format("%Y-%m-%d %H:%M"),
                    v.content.chars().count(),
                );
            }
            println!("Current: v{}", p.version);
        }

        PromptAction::Seed => {
            let created = exit_on_err(seed_default_prompts(&store));
            if created == 0 {
                println!("Prompts already present, nothing seeded.");
            } else {
                println!("Seeded {created} prompts.");
            }
        }
    }
}

pub fn cmd_archive(workspace: &Workspace, action: ArchiveAction) {
    let store = ArchiveStore::new(workspace);
    match action {
        ArchiveAction::List { project } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let archives = exit_on_err(store.list(&project.id));
            if archives.is_empty() {
                println!("No archived tasks in '{}'.", project.name);
                return;
            }
            println!("{:<10} {:<10} {:<36} {}", "ID", "Task", "Title", "Archived");
            for a in archives {
                println!(
                    "{:<10} {:<10} {:<36} {}",
                    short_id(&a.id),
                    short_id(&a.task_id),
                    truncate(&a.task.title, 36),
                    a.archived_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }

        ArchiveAction::Add { task } => {
            let task = exit_on_err(resolve_task(workspace, &task));
            let archive = exit_on_err(store.archive(&task.project_id, &task.id));
            println!("Archived '{}' ({})", task.title, short_id(&archive.id));
        }

        ArchiveAction::Restore { project, archive } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let archive = exit_on_err(resolve_archive(&store, &project.id, &archive));
            let task = exit_on_err(store.restore(&project.id, &archive.id));
            println!("Restored '{}' to {}", task.title, kanban::column(task.status).title);
        }

        ArchiveAction::Delete { project, archive } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let archive = exit_on_err(resolve_archive(&store, &project.id, &archive));
            exit_on_err(store.delete(&project.id, &archive.id));
            println!("Deleted archive of '{}'", archive.task.title);
        }
    }
}

pub fn cmd_stats(workspace: &Workspace, action: StatsAction) {
    let analytics = Analytics::new(workspace);
    match action {
        StatsAction::Summary { project } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let s = exit_on_err(analytics.summary(&project.id));
            println!("{}", project.name);
            println!("{:<22} {}", "Total tasks", s.total_tasks);
            for column in kanban::KANBAN_COLUMNS.iter() {
                let count = match column.status {
                    TaskStatus::Featurelist => s.tasks_by_status.featurelist,
                    TaskStatus::Design => s.tasks_by_status.design,
                    TaskStatus::Prd => s.tasks_by_status.prd,
                    TaskStatus::Prototype => s.tasks_by_status.prototype,
                };
                println!("  {:<20} {}", column.title, count);
            }
            println!("{:<22} {:.1}%", "Completion rate", s.completion_rate * 100.0);
            println!("{:<22} {}", "Documents generated", s.documents_generated);
            println!("{:<22} {}", "Archived", s.archived_count);
        }

        StatsAction::Timeline { project, period } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let points = exit_on_err(analytics.timeline(&project.id, period));
            if points.is_empty() {
                println!("No tasks in '{}'.", project.name);
                return;
            }
            println!("{:<12} {:>8} {:>10} {:>10}", "Period", "Created", "Completed", "Documents");
            for p in points {
                println!("{:<12} {:>8} {:>10} {:>10}", p.date, p.tasks_created, p.tasks_completed, p.documents_generated);
            }
        }

        StatsAction::Export { project, output } => {
            let project = exit_on_err(resolve_project(workspace, &project));
            let csv = exit_on_err(analytics.export_csv(&project.id));
            match output {
                Some(path) => {
                    exit_on_err(write_file(&path, &csv));
                    println!("Exported analytics for '{}' to {}", project.name, path.display());
                }
                None => println!("{csv}"),
            }
        }
    }
}

fn write_file(path: &Path, data: &str) -> Result<()> {
    fs::write(path, data)?;
    Ok(())
}

/// Generate shell completion scripts.
pub fn cmd_completions(shell: Shell) {
    use crate::cli::Cli;
    use clap::CommandFactory;

    let mut app = Cli::command();
    let app_name = app.get_name().to_string();
    generate(shell, &mut app, app_name, &mut std::io::stdout());
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn workspace() -> (tempfile::TempDir, Workspace) {
        let dir = tempfile::tempdir().unwrap();
        let ws = Workspace::new(dir.path());
        (dir, ws)
    }

    fn project(ws: &Workspace, name: &str) -> Project {
        ProjectStore::new(ws)
            .create(CreateProjectDto { name: Some(name.into()), ..Default::default() })
            .unwrap()
    }

    #[test]
    fn truncate_marks_cut() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ééééé", 5), "ééééé");
    }

    #[test]
    fn split_list_accepts_commas_and_repeats() {
        let values = vec!["rust, axum".to_string(), "".to_string(), "tokio".to_string()];
        assert_eq!(split_list(values), vec!["rust", "axum", "tokio"]);
    }

    #[test]
    fn key_val_splits_on_first_equals() {
        assert_eq!(parse_key_val("a=b=c").unwrap(), ("a".into(), "b=c".into()));
        assert_eq!(parse_key_val("empty=").unwrap(), ("empty".into(), "".into()));
        assert!(parse_key_val("=x").is_err());
        assert!(parse_key_val("nothing").is_err());
    }

    #[test]
    fn resolves_project_by_name_or_prefix() {
        let (_dir, ws) = workspace();
        let harbor = project(&ws, "Harbor");
        project(&ws, "Lighthouse");

        assert_eq!(resolve_project(&ws, "harbor").unwrap().id, harbor.id);
        assert_eq!(resolve_project(&ws, &harbor.id[..SHORT_ID]).unwrap().id, harbor.id);
        assert_eq!(resolve_project(&ws, &harbor.id).unwrap().id, harbor.id);
        assert!(matches!(resolve_project(&ws, "nope"), Err(Error::NotFound(_))));
    }

    #[test]
    fn resolves_task_across_projects() {
        let (_dir, ws) = workspace();
        let a = project(&ws, "A");
        let b = project(&ws, "B");
        let store = TaskStore::new(&ws);
        store.create(&a.id, CreateTaskDto { title: "one".into(), ..Default::default() }).unwrap();
        let two = store.create(&b.id, CreateTaskDto { title: "two".into(), ..Default::default() }).unwrap();

        let found = resolve_task(&ws, &two.id[..SHORT_ID]).unwrap();
        assert_eq!(found.id, two.id);
        assert_eq!(found.project_id, b.id);
        assert!(matches!(resolve_task(&ws, ""), Err(Error::Validation(_))));
    }

    #[test]
    fn pick_one_reports_ambiguity() {
        let err = pick_one(vec![1, 2], "Template", "ab").unwrap_err();
        assert_eq!(err.to_string(), "'ab' matches 2 templates, use a longer id");
        let err = pick_one(Vec::<u8>::new(), "Template", "ab").unwrap_err();
        assert_eq!(err.to_string(), "Template not found");
    }
}
