//! Integration tests for config

#[cfg(test)]
mod tests {
    use gantry_config::*;
    use gantry_types::{ColorChoice, OutputFormat};
    use std::io::Write;
    use std::path::PathBuf;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    // Mutex to ensure env var tests don't run concurrently
    static ENV_TEST_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        for key in [
            "GANTRY_COLOR",
            "GANTRY_OUT_DIR",
            "GANTRY_CARGO",
            "GANTRY_GIT",
            "GANTRY_LINT_MAX_WARNINGS",
            "GANTRY_LINT_DENY",
        ] {
            std::env::remove_var(key);
        }
    }

    #[tokio::test]
    async fn test_load_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
[general]
output = "plain"
color = "never"

[tools]
cargo = "/usr/local/bin/cargo"

[lint]
deny = ["warnings", "clippy::all"]
max_warnings = 2

[layout]
out_dir = "/tmp/pipeline-out"
        "#
        )
        .unwrap();

        let config = Config::load_from_file(temp_file.path()).await.unwrap();
        assert_eq!(config.general.output, OutputFormat::Plain);
        assert_eq!(config.general.color, ColorChoice::Never);
        assert_eq!(config.tools.cargo, "/usr/local/bin/cargo");
        assert_eq!(config.lint.deny, vec!["warnings", "clippy::all"]);
        assert_eq!(config.lint.max_warnings, 2);
        assert_eq!(
            config.out_dir(std::path::Path::new("/src")),
            PathBuf::from("/tmp/pipeline-out")
        );
    }

    #[test]
    fn test_merge_env_precedence() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        // File-level value, then env override on top
        let mut config: Config = toml::from_str(
            r#"
            [tools]
            git = "/opt/git/bin/git"
            "#,
        )
        .unwrap();

        std::env::set_var("GANTRY_GIT", "/env/git");
        std::env::set_var("GANTRY_COLOR", "always");
        std::env::set_var("GANTRY_OUT_DIR", "/env/out");

        config.merge_env().unwrap();
        assert_eq!(config.tools.git, "/env/git");
        assert_eq!(config.general.color, ColorChoice::Always);
        assert_eq!(config.layout.out_dir, Some(PathBuf::from("/env/out")));

        clear_env();
    }

    #[test]
    fn test_merge_env_rejects_malformed_values() {
        let _guard = ENV_TEST_MUTEX.lock().unwrap();
        clear_env();

        std::env::set_var("GANTRY_COLOR", "sometimes");
        let mut config = Config::default();
        assert!(config.merge_env().is_err());

        clear_env();
    }
}
