//! Integration tests for lockscope

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    const ASSETS: &str = r#"{
      "version": 3,
      "targets": {
        "net8.0": {
          "Pkg1/1.0.0": {
            "type": "package",
            "dependencies": { "Pkg2": "2.0.0" }
          },
          "Pkg2/2.0.0": { "type": "package" },
          "Lib.Core/1.0.0": { "type": "project" }
        },
        "net8.0/linux-x64": {
          "Pkg1/1.0.0": { "type": "package" }
        }
      },
      "project": {
        "frameworks": {
          "net8.0": {
            "dependencies": {
              "Pkg1": { "target": "Package", "version": "[1.0.0, )" }
            }
          }
        }
      }
    }"#;

    const SERVICE_INDEX: &str = r#"{
      "version": "3.0.0",
      "resources": [
        { "@id": "https://api.example.org/query", "@type": "SearchQueryService/3.5.0" },
        { "@id": "https://mirror.example.org/query", "@type": ["SearchQueryService", "SearchQueryService/3.0.0-rc"] },
        { "@id": "https://api.example.org/v3/", "@type": "PackageBaseAddress/3.0.0" }
      ]
    }"#;

    /// Command with its config isolated in `dir`
    fn lockscope(dir: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("lockscope");
        cmd.env("LOCKSCOPE_CONFIG", dir.join("config.toml"));
        cmd
    }

    /// Project directory with a restored obj/project.assets.json
    fn restored_project() -> TempDir {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("obj")).unwrap();
        std::fs::write(dir.path().join("obj").join("project.assets.json"), ASSETS).unwrap();
        dir
    }

    #[test]
    fn help_displays() {
        let dir = TempDir::new().unwrap();
        lockscope(dir.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage:"))
            .stdout(predicate::str::contains("packages"))
            .stdout(predicate::str::contains("endpoints"));
    }

    #[test]
    fn version_displays() {
        let dir = TempDir::new().unwrap();
        lockscope(dir.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("lockscope"));
    }

    #[test]
    fn graph_lists_targets() {
        let dir = restored_project();
        lockscope(dir.path())
            .args(["graph", "--format", "plain"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("net8.0\n"))
            .stdout(predicate::str::contains("net8.0/linux-x64"));
    }

    #[test]
    fn graph_missing_assets_fails_with_hint() {
        let dir = TempDir::new().unwrap();
        lockscope(dir.path())
            .arg("graph")
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("Hint:"))
            .stderr(predicate::str::contains("restore"));
    }

    #[test]
    fn graph_malformed_assets_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("project.assets.json");
        std::fs::write(&path, "{ not json").unwrap();
        lockscope(dir.path())
            .arg("graph")
            .arg(&path)
            .assert()
            .failure()
            .stderr(predicate::str::contains("Error:"));
    }

    #[test]
    fn packages_splits_direct_and_transitive() {
        let dir = restored_project();
        lockscope(dir.path())
            .args(["packages", "--format", "plain"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("net8.0 direct Pkg1 1.0.0"))
            .stdout(predicate::str::contains("net8.0 transitive Pkg2 2.0.0"))
            .stdout(predicate::str::contains("Lib.Core").not());
    }

    #[test]
    fn packages_direct_only_hides_transitive() {
        let dir = restored_project();
        lockscope(dir.path())
            .args(["packages", "--direct-only", "--format", "plain"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Pkg1"))
            .stdout(predicate::str::contains("Pkg2").not());
    }

    #[test]
    fn packages_json_output() {
        let dir = restored_project();
        let output = lockscope(dir.path())
            .args(["packages", "--format", "json"])
            .arg(dir.path().join("obj").join("project.assets.json"))
            .output()
            .unwrap();
        assert!(output.status.success());

        let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        let frameworks = value.as_array().unwrap();
        assert_eq!(frameworks.len(), 1);
        assert_eq!(frameworks[0]["framework"], "net8.0");
        assert_eq!(frameworks[0]["installed"].as_array().unwrap().len(), 1);
        assert_eq!(frameworks[0]["transitive"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn packages_unknown_framework_fails() {
        let dir = restored_project();
        lockscope(dir.path())
            .args(["packages", "--framework", "net6.0"])
            .arg(dir.path())
            .assert()
            .failure()
            .stderr(predicate::str::contains("net6.0"));
    }

    #[test]
    fn endpoints_first_matching_type_wins() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("index.json");
        std::fs::write(&index, SERVICE_INDEX).unwrap();

        lockscope(dir.path())
            .arg("endpoints")
            .arg(&index)
            .args(["SearchQueryService/3.0.0-beta", "SearchQueryService"])
            .assert()
            .success()
            .stdout(predicate::str::contains("https://mirror.example.org/query"))
            .stdout(predicate::str::contains("https://api.example.org/query").not());
    }

    #[test]
    fn endpoints_unknown_type_prints_nothing() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("index.json");
        std::fs::write(&index, SERVICE_INDEX).unwrap();

        lockscope(dir.path())
            .arg("endpoints")
            .arg(&index)
            .arg("RegistrationsBaseUrl")
            .assert()
            .success()
            .stdout(predicate::str::is_empty());
    }

    #[test]
    fn endpoints_malformed_index_fails() {
        let dir = TempDir::new().unwrap();
        let index = dir.path().join("index.json");
        std::fs::write(&index, r#"{ "version": "3.0.0" }"#).unwrap();

        lockscope(dir.path())
            .arg("endpoints")
            .arg(&index)
            .arg("SearchQueryService")
            .assert()
            .failure();
    }

    #[test]
    fn config_path() {
        let dir = TempDir::new().unwrap();
        lockscope(dir.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let dir = TempDir::new().unwrap();
        lockscope(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[general]"))
            .stdout(predicate::str::contains("retention = \"pinned\""));
    }

    #[test]
    fn config_set_then_show() {
        let dir = TempDir::new().unwrap();
        lockscope(dir.path())
            .args(["config", "set", "cache.retention", "weak"])
            .assert()
            .success();

        lockscope(dir.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("retention = \"weak\""));
    }

    #[test]
    fn custom_obj_dir_is_honored() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("build")).unwrap();
        std::fs::write(dir.path().join("build").join("project.assets.json"), ASSETS).unwrap();

        lockscope(dir.path())
            .args(["config", "set", "assets.obj_dir", "build"])
            .assert()
            .success();

        lockscope(dir.path())
            .args(["packages", "--format", "plain"])
            .arg(dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Pkg1"));
    }

    #[test]
    fn invalid_config_reports_hint() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("config.toml"), "[cache]\nretention = 3\n").unwrap();

        lockscope(dir.path())
            .args(["config", "show"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("config init --force"));
    }
}
