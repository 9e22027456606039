use corridor_graph::{
    ClusterLabel, ClusterRegistry, CorridorPlan, FixtureId, PairwisePaths, PartialPlan, Path,
    PlanWarning, PlannerConfig, ZoneId,
};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    Complete,
    Disconnected,
}

impl PlanStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            PlanStatus::Complete => "complete",
            PlanStatus::Disconnected => "disconnected",
        }
    }
}

impl fmt::Display for PlanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize)]
pub struct ClusterEntry {
    pub label: ClusterLabel,
    pub zone: ZoneId,
    pub centroid: [f64; 2],
}

/// Machine-readable result of `plan`
#[derive(Debug, Serialize)]
pub struct PlanReport {
    pub status: PlanStatus,
    pub settings: PlannerConfig,
    pub clusters: Vec<ClusterEntry>,
    pub paths: Vec<Path>,
    pub cost_matrix: Vec<Vec<f64>>,
    pub corridors: Vec<Path>,
    pub total_score: f64,
    pub exclusion_zones: Vec<ZoneId>,
    pub retained: Vec<FixtureId>,
    pub excluded: Vec<FixtureId>,
    pub warnings: Vec<PlanWarning>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Machine-readable result of `paths`
#[derive(Debug, Serialize)]
pub struct PathsReport {
    pub clusters: Vec<ClusterEntry>,
    pub paths: Vec<Path>,
    pub cost_matrix: Vec<Vec<f64>>,
    pub warnings: Vec<PlanWarning>,
}

fn cluster_entries(registry: &ClusterRegistry) -> Vec<ClusterEntry> {
    registry
        .clusters()
        .iter()
        .map(|cluster| ClusterEntry {
            label: cluster.label.clone(),
            zone: cluster.zone,
            centroid: [cluster.centroid.x(), cluster.centroid.y()],
        })
        .collect()
}

fn all_paths(paths: &PairwisePaths) -> Vec<Path> {
    paths.iter().cloned().collect()
}

impl PlanReport {
    pub fn complete(settings: &PlannerConfig, plan: &CorridorPlan) -> Self {
        Self {
            status: PlanStatus::Complete,
            settings: settings.clone(),
            clusters: cluster_entries(&plan.registry),
            paths: all_paths(&plan.paths),
            cost_matrix: plan.matrix.rows(),
            corridors: plan.corridors.corridors.clone(),
            total_score: settings.round_score(plan.corridors.total_score()),
            exclusion_zones: plan.lighting.exclusion_zones.iter().copied().collect(),
            retained: plan.lighting.retained.iter().map(|f| f.id).collect(),
            excluded: plan.lighting.excluded.iter().map(|f| f.id).collect(),
            warnings: plan.warnings.clone(),
            error: None,
        }
    }

    /// Path-stage results of a plan whose cluster network could not be spanned
    pub fn disconnected(settings: &PlannerConfig, partial: &PartialPlan) -> Self {
        let stage = &partial.stage;
        Self {
            status: PlanStatus::Disconnected,
            settings: settings.clone(),
            clusters: cluster_entries(&stage.registry),
            paths: all_paths(&stage.paths),
            cost_matrix: stage.matrix.rows(),
            corridors: Vec::new(),
            total_score: 0.0,
            exclusion_zones: Vec::new(),
            retained: Vec::new(),
            excluded: Vec::new(),
            warnings: stage.warnings.clone(),
            error: Some(partial.failure.to_string()),
        }
    }
}

impl PathsReport {
    pub fn new(
        registry: &ClusterRegistry,
        paths: &PairwisePaths,
        cost_matrix: Vec<Vec<f64>>,
        warnings: Vec<PlanWarning>,
    ) -> Self {
        Self {
            clusters: cluster_entries(registry),
            paths: all_paths(paths),
            cost_matrix,
            warnings,
        }
    }
}

pub fn render_plan_report(dataset: &std::path::Path, report: &PlanReport) -> String {
    let mut md = String::new();
    md.push_str("# Dark corridor plan\n\n");
    md.push_str(&format!("- Dataset: `{}`\n", dataset.display()));
    md.push_str(&format!("- Status: `{}`\n", report.status));
    md.push_str(&format!(
        "- Animal weight: `{}`\n",
        report
            .settings
            .animal_weight
            .map_or("per-zone relevance".to_string(), |w| w.to_string())
    ));
    md.push_str(&format!("- Clusters: `{}`\n", report.clusters.len()));
    md.push_str(&format!("- Total score: `{:.3}`\n", report.total_score));
    md.push_str(&format!(
        "- Lights: `{}` off, `{}` on\n\n",
        report.excluded.len(),
        report.retained.len()
    ));

    if let Some(error) = &report.error {
        md.push_str(&format!("> {}\n\n", escape_cell(error)));
    }

    md.push_str("## Corridors\n\n");
    md.push_str("| pair | score | zones |\n");
    md.push_str("|---|---:|---|\n");
    for path in &report.corridors {
        md.push_str(&format!(
            "| `{}` | `{:.3}` | {} |\n",
            path.label,
            path.score,
            join_zones(&path.zones)
        ));
    }
    md.push('\n');

    let mut candidates: Vec<&Path> = report.paths.iter().collect();
    candidates.sort_by(|a, b| a.score.total_cmp(&b.score).then_with(|| a.key.cmp(&b.key)));
    md.push_str("## Candidate paths\n\n");
    md.push_str("| pair | score | hops |\n");
    md.push_str("|---|---:|---:|\n");
    for path in candidates {
        if path.is_found() {
            md.push_str(&format!(
                "| `{}` | `{:.3}` | `{}` |\n",
                path.label,
                path.score,
                path.zones.len().saturating_sub(1)
            ));
        } else {
            md.push_str(&format!("| `{}` | n/a | n/a |\n", path.label));
        }
    }
    md.push('\n');

    if !report.warnings.is_empty() {
        md.push_str("## Warnings\n\n");
        for warning in &report.warnings {
            md.push_str(&format!("- {}\n", escape_cell(&warning.to_string())));
        }
        md.push('\n');
    }

    md
}

fn join_zones(zones: &[ZoneId]) -> String {
    zones
        .iter()
        .map(ZoneId::to_string)
        .collect::<Vec<_>>()
        .join(" → ")
}

fn escape_cell(value: &str) -> String {
    value.replace('|', "\\|")
}
