mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::Path;

use vera_core::{
    coverage_summary, export, generate_rtm, get_registry_path, AiClient, BackendType, BaselineStore,
    ChangeAnalyzer, ChangeReport, ImpactLevel, Project, QualityReport, Registry, SqliteStore,
    TestStep, TestStepsResponse, YamlStore,
};

use crate::cli::{BaselineCommand, Cli, Command, ProjectCommand};

/// Baselines directory used when no project is registered
const DEFAULT_BASELINES_DIR: &str = "baselines";

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match &cli.command {
        Command::Analyze {
            urs,
            steps,
            json,
            out,
        } => {
            let (project, store) = resolve_store(cli.project.as_deref())?;
            analyze(&project, store, urs, steps, *json, out.as_deref())?;
        }
        Command::Extract { urs, out } => {
            extract(urs, out.as_deref())?;
        }
        Command::Quality { urs, json } => {
            quality(urs, *json)?;
        }
        Command::Rtm { steps, out } => {
            rtm(steps, out.as_deref())?;
        }
        Command::Baseline(baseline_cmd) => {
            let (project, store) = resolve_store(cli.project.as_deref())?;
            handle_baseline_command(baseline_cmd, &project, store.as_ref())?;
        }
        Command::Project(project_cmd) => {
            handle_project_command(project_cmd)?;
        }
    }

    Ok(())
}

/// Resolves the project name and its baseline store.
///
/// Order: the named registry project, then the registry default, then an
/// unregistered fallback using a local baselines directory.
fn resolve_store(project_flag: Option<&str>) -> Result<(String, Box<dyn BaselineStore>)> {
    let registry = Registry::load_or_default(get_registry_path()?)?;

    if let Some(name) = project_flag {
        if let Some(project) = registry.get_project(name) {
            return Ok((name.to_string(), build_store(project)?));
        }
        // Unregistered name: treat it as a key in the local baselines dir
        return Ok((name.to_string(), Box::new(YamlStore::new(DEFAULT_BASELINES_DIR))));
    }

    if let Some((name, project)) = registry.get_default_project() {
        return Ok((name.to_string(), build_store(project)?));
    }

    Ok((
        "default".to_string(),
        Box::new(YamlStore::new(DEFAULT_BASELINES_DIR)),
    ))
}

fn build_store(project: &Project) -> Result<Box<dyn BaselineStore>> {
    match project.backend {
        BackendType::Yaml => Ok(Box::new(YamlStore::new(&project.path))),
        BackendType::Sqlite => Ok(Box::new(SqliteStore::new(&project.path)?)),
        BackendType::Memory => {
            anyhow::bail!("Memory backend is not persistent and cannot be registered")
        }
    }
}

/// Loads test steps from a JSON or YAML file in the extraction output shape
fn load_steps(path: &Path) -> Result<Vec<TestStep>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read steps file: {:?}", path))?;

    let is_yaml = matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    );

    let parsed: TestStepsResponse = if is_yaml {
        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML steps from {:?}", path))?
    } else {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse JSON steps from {:?}", path))?
    };

    Ok(parsed.test_steps)
}

fn analyze(
    project: &str,
    store: Box<dyn BaselineStore>,
    urs: &Path,
    steps_path: &Path,
    json: bool,
    out: Option<&Path>,
) -> Result<()> {
    let urs_text = fs::read_to_string(urs)
        .with_context(|| format!("Failed to read URS file: {:?}", urs))?;
    let steps = load_steps(steps_path)?;

    let analyzer = ChangeAnalyzer::new(store);
    let report = analyzer.analyze(project, &urs_text, &steps)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_change_report(&report);
    }

    if let Some(dir) = out {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;
        export::export_change_report_markdown(&report, &dir.join("change_report.md"))?;
        export::export_json(&report, &dir.join("change_report.json"))?;
    }

    Ok(())
}

fn print_change_report(report: &ChangeReport) {
    println!("{}", format!("Project: {}", report.project).bold());

    if report.is_first_baseline {
        println!(
            "{}",
            "No baseline found. This will be saved as the first baseline.".yellow()
        );
        println!("{}", "\u{2713} Baseline saved".green());
        return;
    }

    if let Some(captured_at) = report.baseline_captured_at {
        println!(
            "Compared against baseline from {}",
            captured_at.format("%Y-%m-%d %H:%M:%S UTC")
        );
    }

    if let Some(summary) = &report.summary {
        println!();
        println!("  Added:     {}", summary.added);
        println!("  Removed:   {}", summary.removed);
        println!("  Modified:  {}", summary.modified);
        println!("  Unchanged: {}", summary.unchanged);
    }

    for record in &report.changes {
        println!(
            "  {} {} - {}",
            record.change_type.to_string().cyan(),
            record.requirement_id,
            record.description
        );
    }

    if let Some(impact) = &report.impact {
        let level = match impact.impact_level {
            ImpactLevel::High => impact.impact_level.to_string().red().bold(),
            ImpactLevel::Medium => impact.impact_level.to_string().yellow().bold(),
            ImpactLevel::Low => impact.impact_level.to_string().green().bold(),
        };
        println!();
        println!("Impact Level: {}", level);
        println!();
        println!("{}", impact.recommendations);
    }

    println!("{}", "\u{2713} Baseline updated".green());
}

fn extract(urs: &Path, out: Option<&Path>) -> Result<()> {
    let urs_text = fs::read_to_string(urs)
        .with_context(|| format!("Failed to read URS file: {:?}", urs))?;

    let client = AiClient::new();
    if !client.is_available() {
        anyhow::bail!(
            "AI integration not available ({}). Install the claude CLI or set ANTHROPIC_API_KEY.",
            client.mode_description()
        );
    }

    let steps = client
        .extract_test_steps(&urs_text)
        .context("Requirement extraction failed")?;

    if steps.is_empty() {
        println!("{}", "No requirements found in the document.".yellow());
    } else {
        println!(
            "{}",
            format!("\u{2713} Extracted {} test step(s)", steps.len()).green()
        );
    }

    let response = TestStepsResponse { test_steps: steps };
    let json = serde_json::to_string_pretty(&response)?;
    match out {
        Some(path) => {
            fs::write(path, json)
                .with_context(|| format!("Failed to write steps file: {:?}", path))?;
            println!("Saved extracted steps: {}", path.display());
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn quality(urs: &Path, json: bool) -> Result<()> {
    let urs_text = fs::read_to_string(urs)
        .with_context(|| format!("Failed to read URS file: {:?}", urs))?;

    let client = AiClient::new();
    if !client.is_available() {
        anyhow::bail!(
            "AI integration not available ({}). Install the claude CLI or set ANTHROPIC_API_KEY.",
            client.mode_description()
        );
    }

    let report = client
        .analyze_quality(&urs_text)
        .context("Quality analysis failed")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_quality_report(&report);
    }

    Ok(())
}

fn print_quality_report(report: &QualityReport) {
    use vera_core::QualityBand;

    let band = match report.band() {
        QualityBand::Good => report.band().to_string().green().bold(),
        QualityBand::Fair => report.band().to_string().yellow().bold(),
        QualityBand::Poor => report.band().to_string().red().bold(),
    };
    println!(
        "{} {} ({}/100)",
        "Overall quality:".bold(),
        band,
        report.overall_score
    );

    if !report.issues.is_empty() {
        println!();
        println!("{}", format!("Issues found: {}", report.issues.len()).bold());
        for issue in &report.issues {
            println!(
                "  [{}] {}: {}",
                issue.severity.to_string().cyan(),
                issue.category,
                issue.description
            );
            if !issue.suggestion.is_empty() {
                println!("      suggestion: {}", issue.suggestion);
            }
        }
    }

    if !report.strengths.is_empty() {
        println!();
        println!("{}", "Strengths:".bold());
        for strength in &report.strengths {
            println!("  \u{2022} {}", strength);
        }
    }

    if !report.recommendations.is_empty() {
        println!();
        println!("{}", "Recommendations:".bold());
        for recommendation in &report.recommendations {
            println!("  \u{2022} {}", recommendation);
        }
    }
}

fn rtm(steps_path: &Path, out: Option<&Path>) -> Result<()> {
    let steps = load_steps(steps_path)?;
    let entries = generate_rtm(&steps);
    let summary = coverage_summary(&entries);

    match out {
        Some(path) => export::export_rtm_markdown(&entries, &summary, path)?,
        None => print!("{}", export::rtm_markdown(&entries, &summary)),
    }

    Ok(())
}

fn handle_baseline_command(
    command: &BaselineCommand,
    project: &str,
    store: &dyn BaselineStore,
) -> Result<()> {
    match command {
        BaselineCommand::List => {
            let projects = store.list_projects()?;
            if projects.is_empty() {
                println!("No baselines stored.");
            } else {
                for name in projects {
                    println!("{}", name);
                }
            }
        }
        BaselineCommand::Show => match store.get_baseline(project)? {
            Some(baseline) => {
                println!("{}", format!("Project: {}", baseline.project).bold());
                println!("Baseline ID: {}", baseline.baseline_id);
                println!(
                    "Captured: {}",
                    baseline.captured_at.format("%Y-%m-%d %H:%M:%S UTC")
                );
                println!("Requirements: {}", baseline.requirements_count());
                for step in &baseline.steps {
                    println!("  {} - {}", step.requirement_id, step.description);
                }
            }
            None => println!("No baseline stored for project '{}'.", project),
        },
        BaselineCommand::Clear { yes } => {
            if !yes {
                anyhow::bail!("Refusing to delete the baseline without --yes");
            }
            if store.delete_baseline(project)? {
                println!("{}", format!("\u{2713} Baseline cleared for '{}'", project).green());
            } else {
                println!("No baseline stored for project '{}'.", project);
            }
        }
    }
    Ok(())
}

fn handle_project_command(command: &ProjectCommand) -> Result<()> {
    let registry_path = get_registry_path()?;
    let mut registry = Registry::load_or_default(&registry_path)?;

    match command {
        ProjectCommand::Register {
            name,
            path,
            description,
            backend,
            default,
        } => {
            let backend = match backend.to_lowercase().as_str() {
                "yaml" => BackendType::Yaml,
                "sqlite" => BackendType::Sqlite,
                other => anyhow::bail!("Unknown backend '{}', expected yaml or sqlite", other),
            };
            registry.register_project(
                name.clone(),
                path.display().to_string(),
                description.clone(),
                backend,
            );
            if *default {
                registry.set_default_project(name)?;
            }
            registry.save(&registry_path)?;
            println!("{}", format!("\u{2713} Registered project '{}'", name).green());
        }
        ProjectCommand::List => {
            if registry.projects.is_empty() {
                println!("No projects registered.");
            }
            for name in registry.list_projects() {
                let project = registry.get_project(name).unwrap();
                let marker = if registry.default_project.as_deref() == Some(name) {
                    " (default)"
                } else {
                    ""
                };
                println!(
                    "{}{} [{}] {}",
                    name.bold(),
                    marker,
                    project.backend,
                    project.path
                );
            }
        }
        ProjectCommand::Default { name } => {
            registry.set_default_project(name)?;
            registry.save(&registry_path)?;
            println!("{}", format!("\u{2713} Default project set to '{}'", name).green());
        }
    }

    Ok(())
}
