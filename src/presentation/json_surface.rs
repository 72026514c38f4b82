// Chart surface that writes Chart.js configurations to disk
use crate::application::chart_surface::ChartSurface;
use crate::domain::chart::ChartConfig;
use crate::infrastructure::chart_js::to_chart_js;
use anyhow::Context;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct JsonFileSurface {
    path: PathBuf,
    generation: u64,
}

/// A chart configuration currently on disk.
#[derive(Debug)]
pub struct WrittenChart {
    pub generation: u64,
    pub series: usize,
}

impl JsonFileSurface {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            generation: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ChartSurface for JsonFileSurface {
    type Instance = WrittenChart;

    fn create(&mut self, config: &ChartConfig) -> anyhow::Result<WrittenChart> {
        let body = serde_json::to_vec_pretty(&to_chart_js(config))
            .context("Failed to serialize chart configuration")?;

        // Write next to the target and rename so readers never see half a file.
        let staging = self.path.with_extension("json.tmp");
        std::fs::write(&staging, &body)
            .with_context(|| format!("Failed to write {}", staging.display()))?;
        std::fs::rename(&staging, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        self.generation += 1;
        tracing::info!(
            "Wrote chart #{} ({} series, {} bytes) to {}",
            self.generation,
            config.datasets.len(),
            body.len(),
            self.path.display()
        );

        Ok(WrittenChart {
            generation: self.generation,
            series: config.datasets.len(),
        })
    }

    fn destroy(&mut self, instance: WrittenChart) {
        tracing::debug!("Disposed chart #{} ({} series)", instance.generation, instance.series);
    }

    fn reset_zoom(&mut self, instance: &mut WrittenChart) {
        // The written configuration carries no zoom state.
        tracing::debug!("Zoom reset on chart #{} is a no-op for file output", instance.generation);
    }
}
