//! `tektasker generate`: Task manifests and Go bindings.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use tektasker_sdk::codegen::LicenseHeader;
use tektasker_sdk::collector::SnapshotCollector;
use tektasker_sdk::generate::{
    GenerationRun, GoBindingsGenerator, GoSupportGenerator, ManifestGenerator, OutputRule,
    RunSummary,
};
use tektasker_sdk::manifest::{CommandTemplate, ManifestBuilder, DEFAULT_STEP_COMMAND};
use tektasker_sdk::markers::MarkerRegistry;

use crate::output;
use crate::{GenerateCommands, RunContext};

const DEFAULT_INTERNAL_DIR: &str = "internal/";
const DEFAULT_INTERNAL_PACKAGE: &str = "tekton";

pub(crate) fn handle_generate_command(
    cmd: GenerateCommands,
    ctx: &RunContext,
) -> anyhow::Result<()> {
    let run = load_roots(ctx)?;

    let run = match cmd {
        GenerateCommands::Manifest {
            output_dir,
            command,
            skip_kustomization,
        } => {
            let (generator, rule) = manifest_generator(
                ctx,
                output_dir,
                command.as_deref(),
                skip_kustomization,
            )?;
            run.with_generator(generator, rule)
        }
        GenerateCommands::Go {
            dir,
            pkg_name,
            header_file,
            year,
        } => {
            let header = license_header(ctx, header_file.as_deref(), year)?;
            let support_dir = support_dir(ctx, dir, pkg_name.as_deref());
            let pkg_name = pkg_name
                .or_else(|| ctx.config.internal_package.clone())
                .unwrap_or_else(|| DEFAULT_INTERNAL_PACKAGE.to_string());

            let (bindings_rule, support_rule) = if ctx.dry_run {
                (OutputRule::Stdout, OutputRule::Stdout)
            } else {
                (OutputRule::Artifacts, OutputRule::Directory(support_dir))
            };
            run.with_generator(GoBindingsGenerator::new(header.clone()), bindings_rule)
                .with_generator(GoSupportGenerator::new(pkg_name, header), support_rule)
        }
    };

    let mut stdout = std::io::stdout().lock();
    let summary = run.run(&mut stdout)?;
    report(&summary, ctx.dry_run);
    Ok(())
}

fn load_roots(ctx: &RunContext) -> anyhow::Result<GenerationRun> {
    let inputs = if ctx.inputs.is_empty() {
        ctx.config.inputs.clone()
    } else {
        ctx.inputs.clone()
    };
    if inputs.is_empty() {
        bail!("no package snapshot given: use -i/--input or `inputs` in .tektasker.toml");
    }

    let collector = SnapshotCollector::new(inputs);
    let run = GenerationRun::for_roots(&collector, &MarkerRegistry::tektasker())?;
    if !run.roots().iter().any(|pkg| pkg.task.is_some()) {
        output::warning("no package carries a +tektasker:task marker, nothing to generate");
    }
    Ok(run)
}

fn manifest_generator(
    ctx: &RunContext,
    output_dir: Option<PathBuf>,
    command: Option<&str>,
    skip_kustomization: bool,
) -> anyhow::Result<(ManifestGenerator, OutputRule)> {
    let rule = if ctx.dry_run {
        OutputRule::Stdout
    } else {
        match output_dir.or_else(|| ctx.config.manifest_dir.clone()) {
            Some(dir) => OutputRule::Directory(dir),
            None => bail!("an output directory is required unless --dry-run is set"),
        }
    };

    let source = command
        .or(ctx.config.step_command.as_deref())
        .unwrap_or(DEFAULT_STEP_COMMAND);
    let template = CommandTemplate::parse(source)?;

    let generator = ManifestGenerator::new(ManifestBuilder::new(template))
        .skip_kustomization(skip_kustomization || ctx.config.skip_kustomization);
    Ok((generator, rule))
}

fn license_header(
    ctx: &RunContext,
    header_file: Option<&Path>,
    year: Option<String>,
) -> anyhow::Result<LicenseHeader> {
    let Some(path) = header_file.or(ctx.config.header_file.as_deref()) else {
        return Ok(LicenseHeader::none());
    };
    let year = year.unwrap_or_else(current_year);
    LicenseHeader::load(path, &year).context("failed to load the license header")
}

fn current_year() -> String {
    chrono::Local::now().format("%Y").to_string()
}

/// `<dir>/<pkg_name>`, the directory receiving `parameter.go` and `result.go`.
fn support_dir(ctx: &RunContext, dir: Option<PathBuf>, pkg_name: Option<&str>) -> PathBuf {
    let dir = dir
        .or_else(|| ctx.config.internal_dir.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_INTERNAL_DIR));
    let pkg_name = pkg_name
        .or(ctx.config.internal_package.as_deref())
        .unwrap_or(DEFAULT_INTERNAL_PACKAGE);
    dir.join(pkg_name)
}

fn report(summary: &RunSummary, dry_run: bool) {
    if dry_run {
        return;
    }
    for path in &summary.written {
        output::item(path.display());
    }
    output::success(format!("generated {} file(s)", summary.written.len()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli_config::CliConfig;
    use std::fs;
    use tempfile::TempDir;

    const SNAPSHOT: &str = include_str!("../../../../tests/fixtures/snapshots/examples.yaml");

    fn context(tmp: &TempDir, dry_run: bool) -> RunContext {
        let snapshot = tmp.path().join("snapshot.yaml");
        fs::write(
            &snapshot,
            SNAPSHOT.replace("./examples", &tmp.path().join("examples").display().to_string()),
        )
        .unwrap();
        RunContext {
            dry_run,
            inputs: vec![snapshot],
            config: CliConfig::default(),
        }
    }

    #[test]
    fn test_manifest_requires_output_dir() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, false);
        let err = handle_generate_command(
            GenerateCommands::Manifest {
                output_dir: None,
                command: None,
                skip_kustomization: false,
            },
            &ctx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("output directory is required"));
    }

    #[test]
    fn test_manifest_uses_config_defaults() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = context(&tmp, false);
        ctx.config.manifest_dir = Some(tmp.path().join("deploy"));
        ctx.config.step_command = Some("/ko-app/{{ ko_app_name }} --pkg {{ pkg_name }}".into());
        ctx.config.skip_kustomization = true;

        handle_generate_command(
            GenerateCommands::Manifest {
                output_dir: None,
                command: None,
                skip_kustomization: false,
            },
            &ctx,
        )
        .unwrap();

        let task = fs::read_to_string(tmp.path().join("deploy/base/example-task.yaml")).unwrap();
        assert!(task.contains("--pkg"));
        assert!(!tmp.path().join("deploy/base/kustomization.yaml").exists());
    }

    #[test]
    fn test_flag_overrides_config_command() {
        let tmp = TempDir::new().unwrap();
        let mut ctx = context(&tmp, false);
        ctx.config.step_command = Some("/from-config".into());
        let out = tmp.path().join("manifests");

        handle_generate_command(
            GenerateCommands::Manifest {
                output_dir: Some(out.clone()),
                command: Some("/from-flag".into()),
                skip_kustomization: false,
            },
            &ctx,
        )
        .unwrap();

        let task = fs::read_to_string(out.join("base/example-task.yaml")).unwrap();
        assert!(task.contains("/from-flag"));
        assert!(!task.contains("/from-config"));
        assert!(out.join("base/kustomization.yaml").exists());
    }

    #[test]
    fn test_missing_inputs() {
        let ctx = RunContext {
            dry_run: true,
            inputs: vec![],
            config: CliConfig::default(),
        };
        let err = handle_generate_command(
            GenerateCommands::Manifest {
                output_dir: None,
                command: None,
                skip_kustomization: false,
            },
            &ctx,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no package snapshot given"));
    }

    #[test]
    fn test_generate_go_writes_bindings_and_support_files() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, false);
        let header = tmp.path().join("boilerplate.go.txt");
        fs::write(&header, "// Copyright YEAR Acme\n").unwrap();
        let internal = tmp.path().join("internal");

        handle_generate_command(
            GenerateCommands::Go {
                dir: Some(internal.clone()),
                pkg_name: Some("tasks".into()),
                header_file: Some(header),
                year: Some("2023".into()),
            },
            &ctx,
        )
        .unwrap();

        let bindings =
            fs::read_to_string(tmp.path().join("examples/zz_generated.tektasker.go")).unwrap();
        assert!(bindings.starts_with("// Copyright 2023 Acme\n"));

        let parameter = fs::read_to_string(internal.join("tasks/parameter.go")).unwrap();
        assert!(parameter.contains("package tasks\n"));
        assert!(internal.join("tasks/result.go").exists());
    }

    #[test]
    fn test_missing_header_file_is_fatal() {
        let tmp = TempDir::new().unwrap();
        let ctx = context(&tmp, false);
        let err = handle_generate_command(
            GenerateCommands::Go {
                dir: Some(tmp.path().join("internal")),
                pkg_name: None,
                header_file: Some(tmp.path().join("missing.txt")),
                year: None,
            },
            &ctx,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("license header"));
        assert!(!tmp.path().join("internal").exists());
    }

    #[test]
    fn test_support_dir_defaults() {
        let ctx = RunContext {
            dry_run: false,
            inputs: vec![],
            config: CliConfig::default(),
        };
        assert_eq!(support_dir(&ctx, None, None), PathBuf::from("internal/tekton"));

        let ctx = RunContext {
            config: CliConfig {
                internal_dir: Some(PathBuf::from("pkg")),
                internal_package: Some("tasks".into()),
                ..CliConfig::default()
            },
            ..ctx
        };
        assert_eq!(support_dir(&ctx, None, None), PathBuf::from("pkg/tasks"));
        assert_eq!(
            support_dir(&ctx, Some(PathBuf::from("lib")), Some("tk")),
            PathBuf::from("lib/tk")
        );
    }
}
