use std::fs;

use grove::tooling::cli::{CliContext, Commands};
use grove::SortMode;
use tempfile::TempDir;

use crate::cli::support::{context, with_xdg_env, workspace};

fn seeded(temp_dir: &TempDir) -> CliContext {
    let cli = context(temp_dir);
    cli.execute(&Commands::Seed { force: false }).unwrap();
    cli
}

fn json(output: &str) -> serde_json::Value {
    serde_json::from_str(output).unwrap()
}

#[test]
fn tree_json_contract_has_required_fields() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = seeded(&temp_dir);
        let output = cli
            .execute(&Commands::Tree {
                sort: None,
                format: "json".to_string(),
            })
            .unwrap();

        let parsed = json(&output);
        assert_eq!(parsed["sort"], "custom");
        let lines = parsed["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 16);
        let first = &lines[0];
        assert_eq!(first["depth"], 0);
        assert_eq!(first["node"]["name"], "Pineapple");
        assert!(first["node"]["parent_id"].is_null());
        assert!(first["node"]["id"].as_u64().is_some());
        assert!(first["node"]["display_index"].as_u64().is_some());
        assert!(first.get("guides").is_none());
    });
}

#[test]
fn tree_text_draws_guides() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = seeded(&temp_dir);
        let output = cli
            .execute(&Commands::Tree {
                sort: None,
                format: "text".to_string(),
            })
            .unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "Pineapple #1");
        assert_eq!(lines[1], "├── Apple #3");
        assert_eq!(lines[2], "├── Banana #4");
        assert_eq!(lines[3], "│   ├── Peach #10");
        assert_eq!(lines.last().copied(), Some("└── Kiwi #9"));
    });
}

#[test]
fn show_json_contract_has_required_fields() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = seeded(&temp_dir);
        let output = cli
            .execute(&Commands::Show {
                id: 1,
                format: "json".to_string(),
            })
            .unwrap();

        let parsed = json(&output);
        assert_eq!(parsed["node"]["name"], "Pineapple");
        assert_eq!(parsed["children"], 4);
        assert_eq!(parsed["descendants"], 9);
        assert_eq!(parsed["can_move_up"], false);
        assert_eq!(parsed["can_move_down"], true);
    });
}

#[test]
fn list_json_honors_sort_mode() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = seeded(&temp_dir);
        let output = cli
            .execute(&Commands::List {
                parent: Some(1),
                sort: Some(SortMode::Descending),
                format: "json".to_string(),
            })
            .unwrap();

        let parsed = json(&output);
        assert_eq!(parsed["parent"], 1);
        assert_eq!(parsed["sort"], "descending");
        assert_eq!(parsed["total"], 4);
        let names: Vec<&str> = parsed["nodes"]
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Orange", "Cherry", "Banana", "Apple"]);
    });
}

#[test]
fn validate_json_contract_has_required_fields() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = seeded(&temp_dir);
        let output = cli
            .execute(&Commands::Validate {
                format: "json".to_string(),
            })
            .unwrap();

        let parsed = json(&output);
        assert_eq!(parsed["valid"], true);
        assert_eq!(parsed["node_count"], 16);
        assert_eq!(parsed["group_count"], 6);
        assert!(parsed["issues"].as_array().unwrap().is_empty());
    });
}

#[test]
fn search_json_is_case_insensitive() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = seeded(&temp_dir);
        let output = cli
            .execute(&Commands::Search {
                text: "LEM".to_string(),
                format: "json".to_string(),
            })
            .unwrap();
        let parsed = json(&output);
        assert_eq!(parsed["total"], 1);
        assert_eq!(parsed["nodes"][0]["name"], "Lemon");
    });
}

#[test]
fn forest_persists_across_contexts() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        {
            let cli = context(&temp_dir);
            cli.execute(&Commands::Add {
                name: "Pineapple".to_string(),
                parent: None,
                format: "text".to_string(),
            })
            .unwrap();
            cli.execute(&Commands::Add {
                name: "Apple".to_string(),
                parent: Some(1),
                format: "text".to_string(),
            })
            .unwrap();
            assert!(cli
                .store_path()
                .starts_with(temp_dir.path().join("data").join("grove")));
        }

        let cli = context(&temp_dir);
        let output = cli
            .execute(&Commands::Show {
                id: 2,
                format: "json".to_string(),
            })
            .unwrap();
        let parsed = json(&output);
        assert_eq!(parsed["node"]["name"], "Apple");
        assert_eq!(parsed["node"]["parent_id"], 1);
    });
}

#[test]
fn workspace_config_sets_default_sort() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let root = workspace(&temp_dir);
        fs::create_dir_all(root.join(".grove")).unwrap();
        fs::write(
            root.join(".grove").join("config.toml"),
            "[display]\ndefault_sort = \"ascending\"\n",
        )
        .unwrap();

        let cli = CliContext::new(root, None).unwrap();
        cli.execute(&Commands::Seed { force: false }).unwrap();
        let output = cli
            .execute(&Commands::List {
                parent: None,
                sort: None,
                format: "json".to_string(),
            })
            .unwrap();
        let parsed = json(&output);
        assert_eq!(parsed["sort"], "ascending");
        assert_eq!(parsed["nodes"][0]["name"], "Lime");
    });
}

#[test]
fn missing_node_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    with_xdg_env(&temp_dir, || {
        let cli = context(&temp_dir);
        let err = cli
            .execute(&Commands::Show {
                id: 99,
                format: "text".to_string(),
            })
            .unwrap_err();
        assert_eq!(err.to_string(), "Node #99 not found");
    });
}
