use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use corridor_graph::{LabelScheme, PlannerConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Planner options shared by every subcommand
#[derive(Args, Debug, Default, Clone)]
pub struct PlannerArgs {
    /// TOML file with planner settings; flags override its values
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Named starting point used instead of a settings file
    #[arg(long, value_enum, conflicts_with = "config")]
    pub preset: Option<PresetFlag>,

    /// Uniform animal weight in [0, 1] instead of per-zone relevance
    #[arg(long)]
    pub animal_weight: Option<f64>,

    /// Upper clamp for derived animal importance, in (0.5, 1.0]
    #[arg(long)]
    pub max_importance: Option<f64>,

    /// Cluster label scheme
    #[arg(long, value_enum)]
    pub labels: Option<LabelsFlag>,

    /// Decimal places kept in path scores
    #[arg(long, conflicts_with = "exact_scores")]
    pub score_decimals: Option<u32>,

    /// Keep path scores unrounded
    #[arg(long)]
    pub exact_scores: bool,

    /// Run every stage on the calling thread
    #[arg(long)]
    pub sequential: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PresetFlag {
    AnimalFirst,
    HumanFirst,
    Balanced,
}

impl PresetFlag {
    fn to_config(self) -> PlannerConfig {
        match self {
            PresetFlag::AnimalFirst => PlannerConfig::animal_first(),
            PresetFlag::HumanFirst => PlannerConfig::human_first(),
            PresetFlag::Balanced => PlannerConfig::balanced(),
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LabelsFlag {
    Alphabetic,
    Extended,
}

impl LabelsFlag {
    const fn as_domain(self) -> LabelScheme {
        match self {
            LabelsFlag::Alphabetic => LabelScheme::Alphabetic,
            LabelsFlag::Extended => LabelScheme::Extended,
        }
    }
}

impl PlannerArgs {
    /// Resolve the effective configuration: file or preset, then flags
    pub fn resolve(&self) -> Result<PlannerConfig> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => self.preset.map(PresetFlag::to_config).unwrap_or_default(),
        };

        if let Some(weight) = self.animal_weight {
            config.animal_weight = Some(weight);
        }
        if let Some(max) = self.max_importance {
            config.max_importance = max;
        }
        if let Some(labels) = self.labels {
            config.label_scheme = labels.as_domain();
        }
        if let Some(decimals) = self.score_decimals {
            config.score_decimals = Some(decimals);
        }
        if self.exact_scores {
            config.score_decimals = None;
        }
        if self.sequential {
            config.parallel = false;
        }

        config.validate().context("Invalid planner settings")?;
        log::debug!("Planner settings: {config:?}");
        Ok(config)
    }
}

pub fn load_config_file(path: &Path) -> Result<PlannerConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read settings {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("Invalid settings file {}", path.display()))
}
