//! Global Layers CLI
//!
//! Entry point for the `global-layers` command-line tool. Each command fires
//! one of the plugin's lifecycle hooks against a service manifest on disk.

use clap::{ArgAction, Args, Parser, Subcommand};
use serverless_global_layers::config::{ColorMode, EffectiveSettings, REPO_SETTINGS_FILE};
use serverless_global_layers::merge::{excluded_of, layers_of, LayerMerger, Notice};
use serverless_global_layers::{
    logging, GlobalLayersPlugin, LifecycleEvent, PluginOptions, RunReport, ServiceManifest,
    StyledSink,
};
use std::fmt::Display;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "global-layers")]
#[command(about = "Append global Lambda layers to serverless functions", version)]
struct Cli {
    /// Path to repo settings file (default: .global-layers.toml)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    /// When to colour notices: auto, always, never
    #[arg(long, global = true)]
    color: Option<String>,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add global layers to every function (before:package:initialize)
    Package {
        #[command(flatten)]
        io: ManifestArgs,
    },

    /// Add global layers to one function (before:deploy:function:initialize)
    DeployFunction {
        /// Function to update; without it nothing is changed
        #[arg(long, short = 'f')]
        function: Option<String>,

        #[command(flatten)]
        io: ManifestArgs,
    },

    /// Show the configured global layers and the functions they apply to
    Show {
        /// Service manifest (default: serverless.yml)
        #[arg(long, short = 'm')]
        manifest: Option<PathBuf>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct ManifestArgs {
    /// Service manifest (default: serverless.yml)
    #[arg(long, short = 'm')]
    manifest: Option<PathBuf>,

    /// Write the updated manifest to this file instead of stdout
    #[arg(long, short = 'o', conflicts_with = "in_place")]
    output: Option<PathBuf>,

    /// Overwrite the manifest in place. YAML is reformatted: comments are
    /// dropped and anchors and merge keys are expanded
    #[arg(long)]
    in_place: bool,

    /// Write a JSON run report to this file
    #[arg(long)]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    let manifest_flag = match &cli.command {
        Commands::Package { io } | Commands::DeployFunction { io, .. } => io.manifest.clone(),
        Commands::Show { manifest, .. } => manifest.clone(),
    };

    let effective = match load_settings(&cli, manifest_flag.as_deref()) {
        Ok(s) => s,
        Err(e) => exit_with("Error loading settings", e),
    };

    logging::init(&logging::filter_directive(
        effective.settings.log_filter(),
        cli.verbose,
    ));
    apply_color(effective.settings.color);
    tracing::debug!(sources = effective.sources.len(), "settings loaded");

    let manifest_path = effective.settings.manifest_path();

    match cli.command {
        Commands::Package { io } => {
            run_hook(
                LifecycleEvent::BeforePackageInitialize,
                PluginOptions::default(),
                &manifest_path,
                &io,
            );
        }
        Commands::DeployFunction { function, io } => {
            run_hook(
                LifecycleEvent::BeforeDeployFunctionInitialize,
                PluginOptions { function },
                &manifest_path,
                &io,
            );
        }
        Commands::Show { json, .. } => {
            run_show(&manifest_path, json);
        }
    }
}

fn load_settings(
    cli: &Cli,
    manifest: Option<&Path>,
) -> Result<EffectiveSettings, Box<dyn std::error::Error>> {
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(format!("settings file not found: {}", path.display()).into());
        }
    }
    let repo_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(REPO_SETTINGS_FILE));
    let user_path = EffectiveSettings::default_user_path();

    let mut overrides = serde_json::Map::new();
    if let Some(color) = &cli.color {
        overrides.insert("color".to_string(), serde_json::json!(color));
    }
    if let Some(manifest) = manifest {
        overrides.insert(
            "manifest".to_string(),
            serde_json::json!(manifest.to_string_lossy()),
        );
    }
    let overrides = (!overrides.is_empty()).then_some(serde_json::Value::Object(overrides));

    Ok(EffectiveSettings::build(
        user_path.as_deref(),
        Some(&repo_path),
        overrides,
    )?)
}

fn apply_color(mode: ColorMode) {
    match mode {
        ColorMode::Auto => {}
        ColorMode::Always => {
            console::set_colors_enabled(true);
            console::set_colors_enabled_stderr(true);
        }
        ColorMode::Never => {
            console::set_colors_enabled(false);
            console::set_colors_enabled_stderr(false);
        }
    }
}

fn run_hook(event: LifecycleEvent, options: PluginOptions, manifest_path: &Path, io: &ManifestArgs) {
    let mut manifest = match ServiceManifest::load(manifest_path) {
        Ok(m) => m,
        Err(e) => exit_with("Error loading manifest", e),
    };

    let mut plugin = GlobalLayersPlugin::new(options, StyledSink::stderr());
    let outcome = match plugin.run_hook(event, &mut manifest) {
        Ok(outcome) => outcome,
        Err(e) => exit_with(&format!("Error running {}", event), e),
    };

    let destination = if io.in_place {
        Some(manifest_path)
    } else {
        io.output.as_deref()
    };

    match destination {
        Some(path) => {
            if let Err(e) = manifest.write(path) {
                exit_with("Error writing manifest", e);
            }
            eprintln!("Wrote: {}", path.display());
        }
        None => match manifest.to_text() {
            Ok(text) => print!("{}", text),
            Err(e) => exit_with("Error writing manifest", e),
        },
    }

    if let Some(report_path) = &io.report {
        let report = RunReport::new(event, &manifest.custom(), manifest.source(), outcome);
        if let Err(e) = report.write_to_file(report_path) {
            exit_with("Error writing report", e);
        }
        eprintln!("Wrote: {}", report_path.display());
    }
}

fn run_show(manifest_path: &Path, json_output: bool) {
    let manifest = match ServiceManifest::load(manifest_path) {
        Ok(m) => m,
        Err(e) => exit_with("Error loading manifest", e),
    };

    // Dry run on a copy
    let custom = manifest.custom();
    let mut preview = manifest.clone();
    let mut merger = LayerMerger::new(Vec::<Notice>::new());
    let outcome = match merger.apply_to_all(&custom, &mut preview) {
        Ok(outcome) => outcome,
        Err(e) => exit_with("Error resolving functions", e),
    };

    let layers = layers_of(&custom);
    let excluded = excluded_of(&custom);

    if json_output {
        let output = serde_json::json!({
            "manifest": manifest.source(),
            "layers": layers,
            "excluded_funcs": excluded,
            "would_update": outcome.updated,
            "excluded": outcome.excluded,
        });
        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => exit_with("Error serializing output", e),
        }
        return;
    }

    println!("Manifest: {}", manifest_path.display());
    println!();
    if layers.is_empty() {
        println!("  No global layers are configured");
        return;
    }
    println!("  Global layers:");
    for layer in layers {
        println!("    - {}", layer);
    }
    if !excluded.is_empty() {
        println!("  Excluded functions: {}", excluded.join(", "));
    }
    if outcome.updated.is_empty() {
        println!("  Functions receiving global layers: (none)");
    } else {
        println!(
            "  Functions receiving global layers: {}",
            outcome.updated.join(", ")
        );
    }
}

fn exit_with(context: &str, err: impl Display) -> ! {
    eprintln!("{}: {}", context, err);
    process::exit(1);
}
