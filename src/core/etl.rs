use crate::core::cluster::DISPLAY_MIN_DONORS;
use crate::core::{Pipeline, TransformResult};
use crate::domain::model::TransformReport;
use crate::utils::error::Result;
use std::time::Instant;

pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    /// Extract and transform only; nothing is written.
    pub async fn preview(&self) -> Result<TransformResult> {
        let started = Instant::now();

        tracing::info!("Extracting raw records...");
        let batch = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} individual and {} PAC records",
            batch.individual.records.len(),
            batch.pac.records.len()
        );

        tracing::info!("Transforming...");
        let result = self.pipeline.transform(batch).await?;
        log_report(&result.report);
        let displayable = result
            .output
            .cluster_events
            .iter()
            .filter(|event| event.donor_count >= DISPLAY_MIN_DONORS)
            .count();
        tracing::info!(
            "{} cluster events have at least {} donors",
            displayable,
            DISPLAY_MIN_DONORS
        );
        tracing::info!(
            "Produced {} cluster events and {} PAC contributions in {:?}",
            result.output.cluster_events.len(),
            result.output.pac_contributions.len(),
            started.elapsed()
        );

        Ok(result)
    }

    pub async fn run(&self) -> Result<String> {
        let result = self.preview().await?;

        tracing::info!("Loading...");
        let output_path = self.pipeline.load(result).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}

fn log_report(report: &TransformReport) {
    for (name, set) in [("individual", &report.individual), ("pac", &report.pac)] {
        tracing::info!(
            "{}: received {}, not contributions {}, rejected {} ({} unreadable), duplicates {}, refunds {}, zero-amount {}, kept {}",
            name,
            set.received,
            set.non_contributions,
            set.rejected,
            set.unreadable,
            set.duplicates_removed,
            set.refunds,
            set.zero_amount,
            set.kept
        );
    }

    let clustering = &report.clustering;
    tracing::info!(
        "clustering: {} groups, {} emitted, {} below threshold, {} without employer, {} to own PAC",
        clustering.groups,
        clustering.emitted,
        clustering.below_threshold,
        clustering.missing_employer,
        clustering.own_pac_excluded
    );

    if !report.rejections.is_empty() {
        tracing::warn!("{} records rejected during normalization", report.rejections.len());
    }
}
