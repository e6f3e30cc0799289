#![forbid(unsafe_code)]

use crate::{HarnessError, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const RESULTS_FILE: &str = "all_results.json";
pub const REQUIREMENTS_FILE: &str = "requirements.txt";

/// Finds the single `<examples_root>/*/<example_name>.py`.
pub fn locate_example_script(examples_root: &Path, example_name: &str) -> Result<PathBuf> {
    let file_name = format!("{example_name}.py");
    let entries = fs::read_dir(examples_root).map_err(|err| HarnessError::io(examples_root, err))?;

    let mut matches = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| HarnessError::io(examples_root, err))?;
        let candidate = entry.path().join(&file_name);
        if candidate.is_file() {
            matches.push(candidate);
        }
    }
    matches.sort();

    match matches.len() {
        0 => Err(HarnessError::ScriptNotFound {
            example: example_name.to_string(),
            root: examples_root.to_path_buf(),
        }),
        1 => Ok(matches.remove(0)),
        _ => Err(HarnessError::AmbiguousScript {
            example: example_name.to_string(),
            root: examples_root.to_path_buf(),
            matches,
        }),
    }
}

/// Runs `<pip> install -r <requirements>` when the file exists. Returns
/// whether anything was installed.
pub fn install_requirements(pip: &str, requirements: &Path) -> Result<bool> {
    if !requirements.exists() {
        return Ok(false);
    }

    tracing::info!(path = %requirements.display(), "installing example requirements");
    let status = Command::new(pip)
        .arg("install")
        .arg("-r")
        .arg(requirements)
        .status()
        .map_err(|source| HarnessError::Spawn {
            program: pip.to_string(),
            source,
        })?;

    if !status.success() {
        return Err(HarnessError::RequirementsInstall {
            path: requirements.to_path_buf(),
            status,
        });
    }
    Ok(true)
}

/// Blocks until the child exits. Output is inherited, not captured.
pub fn run_command(args: &[String]) -> Result<()> {
    let Some((program, rest)) = args.split_first() else {
        return Err(HarnessError::Config("empty command line".to_string()));
    };

    let status = Command::new(program)
        .args(rest)
        .status()
        .map_err(|source| HarnessError::Spawn {
            program: program.clone(),
            source,
        })?;

    if !status.success() {
        return Err(HarnessError::NonZeroExit {
            program: program.clone(),
            status,
        });
    }
    Ok(())
}

pub fn load_results(output_dir: &Path) -> Result<Map<String, Value>> {
    let path = output_dir.join(RESULTS_FILE);
    let raw = fs::read_to_string(&path).map_err(|err| HarnessError::io(&path, err))?;
    serde_json::from_str(&raw).map_err(|err| HarnessError::json(&path, err))
}

#[cfg(test)]
mod tests {
    use super::{
        RESULTS_FILE, install_requirements, load_results, locate_example_script, run_command,
    };
    use crate::HarnessError;
    use std::fs;

    #[test]
    fn locates_script_one_level_down() {
        let root = tempfile::tempdir().expect("tempdir");
        let qa = root.path().join("question-answering");
        fs::create_dir_all(&qa).expect("mkdir");
        fs::create_dir_all(root.path().join("language-modeling")).expect("mkdir");
        fs::write(qa.join("run_qa.py"), "").expect("write");

        let script = locate_example_script(root.path(), "run_qa").expect("found");
        assert_eq!(script, qa.join("run_qa.py"));

        let err = locate_example_script(root.path(), "run_clm").expect_err("absent");
        assert!(matches!(err, HarnessError::ScriptNotFound { .. }));
    }

    #[test]
    fn duplicate_scripts_are_ambiguous() {
        let root = tempfile::tempdir().expect("tempdir");
        for dir in ["a", "b"] {
            let path = root.path().join(dir);
            fs::create_dir_all(&path).expect("mkdir");
            fs::write(path.join("run_glue.py"), "").expect("write");
        }
        let err = locate_example_script(root.path(), "run_glue").expect_err("two copies");
        match err {
            HarnessError::AmbiguousScript { matches, .. } => assert_eq!(matches.len(), 2),
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn absent_requirements_file_is_a_noop() {
        let root = tempfile::tempdir().expect("tempdir");
        let installed = install_requirements(
            "pip-that-does-not-exist",
            &root.path().join("requirements.txt"),
        )
        .expect("noop");
        assert!(!installed);
    }

    #[test]
    fn empty_command_line_is_rejected() {
        assert!(matches!(run_command(&[]), Err(HarnessError::Config(_))));
    }

    #[test]
    fn unknown_program_fails_to_spawn() {
        let err = run_command(&["exr-no-such-program".to_string()]).expect_err("spawn fails");
        assert!(matches!(err, HarnessError::Spawn { .. }));
    }

    #[test]
    fn results_must_exist_and_parse() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = load_results(dir.path()).expect_err("missing results");
        assert!(matches!(err, HarnessError::Io { .. }));

        fs::write(dir.path().join(RESULTS_FILE), "{\"eval_f1\": ").expect("write");
        let err = load_results(dir.path()).expect_err("truncated results");
        assert!(matches!(err, HarnessError::Json { .. }));

        fs::write(dir.path().join(RESULTS_FILE), r#"{"eval_f1": 88.1, "epoch": 1.0}"#)
            .expect("write");
        let results = load_results(dir.path()).expect("valid results");
        assert_eq!(results.get("eval_f1").and_then(|v| v.as_f64()), Some(88.1));
    }
}
