use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;

/// Design workflow manager: templates, prompts and a four-stage Kanban.
/// Everything lives as JSON and Markdown files under --workspace.
#[derive(Parser)]
#[command(name = "dw", version, about = "Design document workflow CLI and API server")]
pub struct Cli {
    /// Workspace directory holding templates, prompts and projects.
    #[arg(long, global = true, env = "DW_WORKSPACE", default_value = "./workspace")]
    pub workspace: PathBuf,

    /// Log filter, e.g. "info" or "design_workflow=debug,tower_http=debug".
    #[arg(long, global = true, env = "DW_LOG", default_value = "info")]
    pub log: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cmd::{TaskAction, TemplateAction};
    use crate::fields::TaskStatus;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_global_workspace_after_subcommand() {
        let cli = Cli::try_parse_from(["dw", "task", "move", "abc", "prd", "--workspace", "/tmp/ws"]).unwrap();
        assert_eq!(cli.workspace, PathBuf::from("/tmp/ws"));
        match cli.command {
            Commands::Task { action: TaskAction::Move { task, status } } => {
                assert_eq!(task, "abc");
                assert_eq!(status, TaskStatus::Prd);
            }
            _ => panic!("expected task move"),
        }
    }

    #[test]
    fn parses_template_vars() {
        let cli = Cli::try_parse_from(["dw", "template", "apply", "t1", "--var", "name=Ada", "--var", "x=a=b"]).unwrap();
        match cli.command {
            Commands::Template { action: TemplateAction::Apply { vars, .. } } => {
                let expected = vec![
                    ("name".to_string(), "Ada".to_string()),
                    ("x".to_string(), "a=b".to_string()),
                ];
                assert_eq!(vars, expected);
            }
            _ => panic!("expected template apply"),
        }
        assert!(Cli::try_parse_from(["dw", "template", "apply", "t1", "--var", "novalue"]).is_err());
    }
}
