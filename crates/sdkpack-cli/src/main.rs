//! sdkpack CLI - package CMake-based vendor SDKs for distribution

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sdkpack::{
    find_target, CmakeDriver, Manifest, Recipe, Settings, Target, MANIFEST_FILE,
};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "sdkpack")]
#[command(version)]
#[command(about = "Package CMake-based vendor SDKs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configure and compile an SDK target
    Build {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Configure and run an SDK target's test suite
    Test {
        #[command(flatten)]
        common: CommonArgs,
    },

    /// Configure and install an SDK target into a staging layout
    Package {
        #[command(flatten)]
        common: CommonArgs,

        /// Staging directory to install into
        #[arg(long)]
        install_dir: Option<PathBuf>,
    },

    /// Print identity metadata and builddirs for an SDK target
    Info {
        /// Target package name (e.g. "s5d9_sdk")
        target: String,

        /// Directory containing the SDK sources
        #[arg(long, default_value = ".")]
        source_dir: PathBuf,

        /// Path to an sdkpack.toml manifest
        #[arg(long)]
        manifest: Option<PathBuf>,

        /// Emit machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// List known SDK targets
    Targets {
        /// Path to an sdkpack.toml manifest
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

#[derive(Args)]
struct CommonArgs {
    /// Target package name (e.g. "s5d9_sdk")
    target: String,

    /// Target operating system (linux, windows, macos, baremetal)
    #[arg(long)]
    os: Option<String>,

    /// Compiler toolchain (gcc, clang, arm-gcc, msvc)
    #[arg(long)]
    compiler: Option<String>,

    /// Build type (debug, release, relwithdebinfo, minsizerel)
    #[arg(long)]
    build_type: Option<String>,

    /// Target architecture (x86_64, aarch64, armv7, armv7em)
    #[arg(long)]
    arch: Option<String>,

    /// Directory containing the SDK sources
    #[arg(long, default_value = ".")]
    source_dir: PathBuf,

    /// Build tree directory (defaults to <source-dir>/build)
    #[arg(long)]
    build_dir: Option<PathBuf>,

    /// Path to an sdkpack.toml manifest
    #[arg(long)]
    manifest: Option<PathBuf>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { common } => {
            let recipe = recipe_from_args(&common, None)?;
            println!("Building {} ({})", recipe.name(), recipe.settings());
            recipe.build(&CmakeDriver::default())?;
            Ok(())
        }
        Commands::Test { common } => {
            let recipe = recipe_from_args(&common, None)?;
            println!("Testing {} ({})", recipe.name(), recipe.settings());
            recipe.test(&CmakeDriver::default())?;
            Ok(())
        }
        Commands::Package {
            common,
            install_dir,
        } => {
            let recipe = recipe_from_args(&common, install_dir)?;
            println!("Packaging {} ({})", recipe.name(), recipe.settings());
            recipe.package(&CmakeDriver::default())?;
            Ok(())
        }
        Commands::Info {
            target,
            source_dir,
            manifest,
            json,
        } => info(&target, &source_dir, manifest.as_deref(), json),
        Commands::Targets { manifest } => {
            let manifest = load_manifest(manifest.as_deref(), Path::new("."))?;
            for target in manifest.merged_targets() {
                println!("{:<16} {}", target.name, target.description);
            }
            Ok(())
        }
    }
}

/// Load a manifest: an explicit path must parse; otherwise pick up
/// `sdkpack.toml` next to the sources when present.
fn load_manifest(path: Option<&Path>, source_dir: &Path) -> Result<Manifest> {
    if let Some(path) = path {
        return Manifest::from_path(path)
            .with_context(|| format!("failed to load manifest {}", path.display()));
    }

    let implicit = source_dir.join(MANIFEST_FILE);
    if implicit.exists() {
        return Manifest::from_path(&implicit)
            .with_context(|| format!("failed to load manifest {}", implicit.display()));
    }

    Ok(Manifest::default())
}

/// Resolve a target by name, with a helpful listing when it is unknown.
fn resolve_target(manifest: &Manifest, name: &str) -> Result<Target> {
    let targets = manifest.merged_targets();

    find_target(&targets, name).cloned().ok_or_else(|| {
        let known: Vec<&str> = targets.iter().map(|t| t.name.as_str()).collect();
        anyhow::anyhow!(
            "unknown target '{}', known targets: {}",
            name,
            known.join(", ")
        )
    })
}

/// Settings from flags, falling back to manifest defaults per axis.
fn settings_from_args(common: &CommonArgs, manifest: &Manifest) -> Result<Settings> {
    let mut settings = manifest.defaults;

    if let Some(os) = &common.os {
        settings.os = os.parse().context("invalid --os")?;
    }
    if let Some(compiler) = &common.compiler {
        settings.compiler = compiler.parse().context("invalid --compiler")?;
    }
    if let Some(build_type) = &common.build_type {
        settings.build_type = build_type.parse().context("invalid --build-type")?;
    }
    if let Some(arch) = &common.arch {
        settings.arch = arch.parse().context("invalid --arch")?;
    }

    Ok(settings)
}

fn recipe_from_args(common: &CommonArgs, install_dir: Option<PathBuf>) -> Result<Recipe> {
    let manifest = load_manifest(common.manifest.as_deref(), &common.source_dir)?;
    let target = resolve_target(&manifest, &common.target)?;
    let settings = settings_from_args(common, &manifest)?;

    let mut recipe = Recipe::new(target, &common.source_dir).with_settings(settings);
    if let Some(build_dir) = &common.build_dir {
        recipe = recipe.with_build_dir(build_dir);
    }
    if let Some(install_dir) = install_dir {
        recipe = recipe.with_install_dir(install_dir);
    }

    Ok(recipe)
}

fn info(target: &str, source_dir: &Path, manifest: Option<&Path>, json: bool) -> Result<()> {
    let manifest = load_manifest(manifest, source_dir)?;
    let target = resolve_target(&manifest, target)?;
    let recipe = Recipe::new(target, source_dir);

    let metadata = recipe.metadata();
    let info = recipe.package_info();
    let scm = recipe.resolved_scm();

    if json {
        let payload = serde_json::json!({
            "metadata": metadata,
            "builddirs": info.builddirs,
            "scm": scm,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    println!("name:        {}", metadata.name);
    println!(
        "version:     {}",
        metadata.version.as_deref().unwrap_or("(unresolved)")
    );
    println!("license:     {}", metadata.license);
    println!("url:         {}", metadata.url);
    println!("description: {}", metadata.description);
    println!("settings:    {}", metadata.settings);
    println!("generator:   {}", metadata.generator);
    println!("short_paths: {}", metadata.short_paths);
    println!("scm:         {} {} @ {}", scm.kind, scm.url, scm.revision);
    for dir in &info.builddirs {
        println!("builddir:    {dir}");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn common(target: &str, source_dir: &Path) -> CommonArgs {
        CommonArgs {
            target: target.to_string(),
            os: None,
            compiler: None,
            build_type: None,
            arch: None,
            source_dir: source_dir.to_path_buf(),
            build_dir: None,
            manifest: None,
        }
    }

    #[test]
    fn unknown_target_lists_known_names() {
        let tmp = TempDir::new().unwrap();
        let err = recipe_from_args(&common("nope_sdk", tmp.path()), None).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("s5d9_sdk"));
        assert!(message.contains("s7g2_sdk"));
    }

    #[test]
    fn flags_override_manifest_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(MANIFEST_FILE),
            "[defaults]\nos = \"baremetal\"\ncompiler = \"arm-gcc\"\n",
        )
        .unwrap();

        let mut args = common("s5d9_sdk", tmp.path());
        args.compiler = Some("clang".to_string());

        let recipe = recipe_from_args(&args, None).unwrap();
        let settings = recipe.settings();
        assert_eq!(settings.os.as_str(), "baremetal");
        assert_eq!(settings.compiler.as_str(), "clang");
    }

    #[test]
    fn invalid_axis_flag_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let mut args = common("s5d9_sdk", tmp.path());
        args.build_type = Some("superfast".to_string());
        assert!(recipe_from_args(&args, None).is_err());
    }

    #[test]
    fn broken_manifest_propagates() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(MANIFEST_FILE), "not valid toml [").unwrap();
        assert!(recipe_from_args(&common("s5d9_sdk", tmp.path()), None).is_err());
    }
}
