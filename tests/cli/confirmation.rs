use std::sync::{Arc, Mutex};

use grove::tooling::cli::{CliContext, Commands};
use tempfile::TempDir;

use crate::cli::support::{context, with_xdg_env, workspace};

fn recording(temp_dir: &TempDir, answer: bool) -> (CliContext, Arc<Mutex<Vec<String>>>) {
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&prompts);
    let cli = CliContext::new(workspace(temp_dir), None)
        .unwrap()
        .with_confirmation(move |prompt| {
            seen.lock().unwrap().push(prompt.to_string());
            Ok(answer)
        });
    (cli, prompts)
}

#[test]
fn declined_delete_leaves_subtree_in_place() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let (cli, prompts) = recording(&temp_dir, false);
        cli.execute(&Commands::Seed { force: false }).unwrap();

        let output = cli
            .execute(&Commands::Delete { id: 2, yes: false })
            .unwrap();
        assert_eq!(output, "Deletion cancelled");
        assert_eq!(
            prompts.lock().unwrap().as_slice(),
            ["Delete 'Lime' and its 5 descendant(s)?".to_string()]
        );
        assert_eq!(cli.service().get_all_nodes().unwrap().len(), 16);
    });
}

#[test]
fn confirmed_delete_removes_subtree() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let (cli, prompts) = recording(&temp_dir, true);
        cli.execute(&Commands::Seed { force: false }).unwrap();

        let output = cli
            .execute(&Commands::Delete { id: 2, yes: false })
            .unwrap();
        assert_eq!(output, "Deleted 6 node(s)");
        assert_eq!(prompts.lock().unwrap().len(), 1);
        assert_eq!(cli.service().get_all_nodes().unwrap().len(), 10);
    });
}

#[test]
fn yes_flag_and_leaf_deletes_never_prompt() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = context(&temp_dir);
        cli.execute(&Commands::Seed { force: false }).unwrap();

        // Apple (#3) is a leaf
        let output = cli
            .execute(&Commands::Delete { id: 3, yes: false })
            .unwrap();
        assert_eq!(output, "Deleted 1 node(s)");

        let output = cli.execute(&Commands::Delete { id: 1, yes: true }).unwrap();
        assert_eq!(output, "Deleted 9 node(s)");

        let output = cli.execute(&Commands::Clear { yes: true }).unwrap();
        assert_eq!(output, "Deleted all nodes");
        assert!(cli.service().get_all_nodes().unwrap().is_empty());
    });
}

#[test]
fn declined_clear_keeps_forest() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let (cli, prompts) = recording(&temp_dir, false);
        cli.execute(&Commands::Seed { force: false }).unwrap();

        let output = cli.execute(&Commands::Clear { yes: false }).unwrap();
        assert_eq!(output, "Deletion cancelled");
        assert_eq!(
            prompts.lock().unwrap().as_slice(),
            ["Delete every node in the forest?".to_string()]
        );
        assert_eq!(cli.service().get_all_nodes().unwrap().len(), 16);
    });
}
