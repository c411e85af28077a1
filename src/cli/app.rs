//! Main CLI application structure

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::collections::HashSet;
use std::path::PathBuf;

use super::output::{Output, OutputFormat};
use crate::analyses;
use crate::domain::Symbol;
use crate::engine::{Engine, ManualLandmarks, StepState};

#[derive(Parser)]
#[command(name = "cephalo")]
#[command(author, version, about = "Landmark evaluation engine for cephalometric analyses")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List registered analyses
    Analyses,

    /// Show the ordered step list for an analysis
    Steps {
        /// Analysis identifier (e.g. steiner)
        analysis: String,
    },

    /// Evaluate a landmark snapshot against an analysis
    Evaluate {
        /// Analysis identifier (e.g. steiner)
        analysis: String,

        /// JSON file mapping symbols to placed points, lines or scalars
        #[arg(long)]
        landmarks: PathBuf,

        /// Symbols of steps to treat as skipped
        #[arg(long)]
        skip: Vec<String>,

        /// Pixels-to-millimeters ratio for linear measurements
        #[arg(long, env = "CEPHALO_SCALE_FACTOR", default_value = "1.0")]
        scale_factor: f64,
    },
}

/// Parses arguments and runs the requested command
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let out = Output::new(cli.format);

    match cli.command {
        Commands::Analyses => list_analyses(&out),
        Commands::Steps { analysis } => show_steps(&out, &analysis),
        Commands::Evaluate {
            analysis,
            landmarks,
            skip,
            scale_factor,
        } => evaluate(&out, &analysis, &landmarks, &skip, scale_factor),
    }
}

fn list_analyses(out: &Output) -> Result<()> {
    #[derive(Serialize)]
    struct Entry {
        id: &'static str,
        name: &'static str,
        components: usize,
    }

    let entries: Vec<Entry> = analyses::ids()
        .into_iter()
        .filter_map(|id| analyses::get(id).ok())
        .map(|a| Entry {
            id: a.id,
            name: a.name,
            components: a.components.len(),
        })
        .collect();

    out.heading("Analyses");
    for entry in &entries {
        out.line(&format!(
            "{:<12} {} ({} components)",
            entry.id, entry.name, entry.components
        ));
    }
    out.data(&entries);
    Ok(())
}

fn show_steps(out: &Output, analysis_id: &str) -> Result<()> {
    let analysis = analyses::get(analysis_id)?;
    let engine = Engine::new(analysis).context("failed to load analysis")?;

    #[derive(Serialize)]
    struct Entry<'a> {
        number: usize,
        symbol: &'a str,
        title: &'a str,
        kind: &'static str,
    }

    let entries: Vec<Entry> = engine
        .steps()
        .iter()
        .enumerate()
        .map(|(i, step)| Entry {
            number: i + 1,
            symbol: step.symbol().as_str(),
            title: &step.title,
            kind: step.landmark.kind.label(),
        })
        .collect();

    out.heading(&format!("Steps for {}", analysis.name));
    for entry in &entries {
        out.line(&format!(
            "{:>3}. {:<10} {:<9} {}",
            entry.number, entry.symbol, entry.kind, entry.title
        ));
    }
    out.data(&entries);
    Ok(())
}

fn evaluate(
    out: &Output,
    analysis_id: &str,
    landmarks: &PathBuf,
    skip: &[String],
    scale_factor: f64,
) -> Result<()> {
    let analysis = analyses::get(analysis_id)?;
    let mut engine = Engine::new(analysis).context("failed to load analysis")?;

    let raw = std::fs::read_to_string(landmarks)
        .with_context(|| format!("failed to read {}", landmarks.display()))?;
    let manual: ManualLandmarks = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse {}", landmarks.display()))?;

    let skipped: HashSet<Symbol> = skip.iter().map(|s| Symbol::from(s.as_str())).collect();
    let evaluating = HashSet::new();
    let evaluation = engine.evaluate(&manual, &skipped, &evaluating).clone();

    out.heading(&format!("Evaluation ({})", analysis.name));
    for report in &evaluation.steps {
        let value = match evaluation.scaled_value(&report.symbol, scale_factor) {
            Some(v) => format!(
                "{:.1}{}",
                v,
                report.unit.map(|u| u.label()).unwrap_or("")
            ),
            None if report.state == StepState::Done => "mapped".to_string(),
            None => "-".to_string(),
        };
        out.line(&format!(
            "{:<10} {:<10} {}",
            report.symbol, report.state, value
        ));
    }

    out.line("");
    out.heading("Findings");
    if evaluation.results.is_empty() {
        out.line("(insufficient data)");
    }
    for result in &evaluation.results {
        let value = result
            .value
            .map(|v| format!(" [{:.1}]", v))
            .unwrap_or_default();
        out.line(&format!(
            "{:<17} {}{}",
            result.category.label(),
            result.finding.label(),
            value
        ));
    }

    out.data(&evaluation);
    Ok(())
}
