//! Configuration layering as seen through the CLI run context.

use super::test_utils::with_isolated_env;
use nbforge::cli::{Commands, RunContext};
use nbforge::config::ConfigLoader;
use nbforge::error::ForgeError;
use std::path::Path;
use tempfile::TempDir;

fn write(path: &Path, body: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, body).unwrap();
}

#[test]
fn layers_apply_in_precedence_order() {
    let dir = TempDir::new().unwrap();
    with_isolated_env(&dir, || {
        let workspace = dir.path().join("workspace");
        let global = ConfigLoader::global_config_path().unwrap();
        write(
            &global,
            "[provider]\nmodel = \"from-global\"\n\n[batch]\ndelay_secs = 30\ndefault_count = 2\n",
        );
        write(
            &workspace.join("config/config.toml"),
            "[provider]\nmodel = \"from-workspace\"\n\n[batch]\ndelay_secs = 3\n",
        );

        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.provider.model, "from-workspace");
        assert_eq!(config.batch.delay_secs, 3);
        assert_eq!(config.batch.default_count, 2);

        std::env::set_var("NBFORGE__PROVIDER__MODEL", "from-env");
        let config = ConfigLoader::load(&workspace).unwrap();
        assert_eq!(config.provider.model, "from-env");
    });
}

#[test]
fn workspace_categories_add_to_builtin_directories() {
    let dir = TempDir::new().unwrap();
    with_isolated_env(&dir, || {
        let workspace = dir.path().join("workspace");
        write(
            &workspace.join("config/config.toml"),
            "[storage.categories]\nRobotics = \"12_Robotics\"\n",
        );

        let directories = ConfigLoader::load(&workspace).unwrap().storage.directories();
        assert_eq!(directories.directory_for("Robotics"), "12_Robotics");
        assert_eq!(directories.directory_for("MLOps"), "10_MLOps");
        assert_eq!(directories.directory_for("Cloud_Deployment"), "11_Cloud_Deployment");
    });
}

#[test]
fn invalid_configuration_is_fatal_before_any_command() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("nbforge.toml");
    write(
        &config_file,
        "[provider]\ntemperature = 3.5\n\n[validation]\nmin_blocks = 50\nmax_blocks = 40\n",
    );

    let err = RunContext::new(dir.path().to_path_buf(), Some(config_file))
        .err()
        .unwrap();
    assert!(err.is_fatal());
    let message = err.to_string();
    assert!(message.contains("provider: Temperature"));
    assert!(message.contains("validation: min_blocks (50) exceeds max_blocks (40)"));
}

#[test]
fn explicit_config_file_drives_catalog_location() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join("data/catalog.toml"),
        "[[specification]]\nid = \"101\"\ntitle = \"Graph_Neural_Networks\"\ncategory = \"Deep_Learning\"\n",
    );
    let config_file = dir.path().join("nbforge.toml");
    write(&config_file, "[batch]\ncatalog = \"data/catalog.toml\"\n");

    let ctx = RunContext::new(dir.path().to_path_buf(), Some(config_file)).unwrap();
    let output = ctx
        .execute(&Commands::Catalog {
            format: "text".to_string(),
        })
        .unwrap();
    assert!(output.contains("Graph Neural Networks"));
    assert!(output.contains("Total: 1 specification(s)"));
}

#[test]
fn shipped_catalog_and_title_table_load() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR"));
    let catalog = nbforge::catalog::Catalog::load(&root.join("catalog/modern_ai.toml")).unwrap();
    assert_eq!(catalog.len(), 12);
    assert_eq!(catalog.specifications()[0].id, "079");
    assert_eq!(catalog.get("090").unwrap().title, "Agentic_Workflows");

    let titles = nbforge::catalog::TitleTable::load(&root.join("catalog/titles.toml")).unwrap();
    assert_eq!(
        titles.get("079"),
        Some("RAG (Retrieval-Augmented Generation) Fundamentals")
    );
}

#[test]
fn missing_catalog_is_a_catalog_error() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("nbforge.toml");
    write(&config_file, "[batch]\ncatalog = \"nowhere.toml\"\n");

    let ctx = RunContext::new(dir.path().to_path_buf(), Some(config_file)).unwrap();
    let err = ctx
        .execute(&Commands::Catalog {
            format: "text".to_string(),
        })
        .unwrap_err();
    assert!(matches!(err, ForgeError::CatalogError(_)));
}
