//! Structured spans for alignment runs
//!
//! One span per alignment call carries the correlation id; each pyramid level
//! is recorded as a debug event under it.

use instant::Instant;
use tracing::{span, Level, Span};
use uuid::Uuid;

use crate::registration::LevelReport;
use crate::transform::RigidTransform;

/// Span for one coarse-to-fine alignment
pub struct AlignmentSpan {
    span: Span,
    start_time: Instant,
}

impl AlignmentSpan {
    pub fn new(shape: (usize, usize), levels: usize, correlation_id: Option<Uuid>) -> Self {
        let span = if let Some(corr_id) = correlation_id {
            span!(
                Level::INFO,
                "alignment",
                rows = shape.0,
                cols = shape.1,
                levels = levels,
                correlation_id = %corr_id
            )
        } else {
            span!(
                Level::INFO,
                "alignment",
                rows = shape.0,
                cols = shape.1,
                levels = levels
            )
        };

        Self {
            span,
            start_time: Instant::now(),
        }
    }

    /// Record one optimized pyramid level
    pub fn record_level(&self, report: &LevelReport) {
        tracing::debug!(
            parent: &self.span,
            level = report.level,
            shape = format!("{}x{}", report.shape.0, report.shape.1),
            strategy = %report.strategy,
            initial_cost = report.initial_cost,
            final_cost = report.final_cost,
            evaluations = report.evaluations,
            converged = report.converged,
            elapsed_ms = report.elapsed_ms,
            "Pyramid level optimized"
        );
        if !report.converged {
            tracing::debug!(
                parent: &self.span,
                level = report.level,
                "Optimizer stopped on its budget; keeping its best point"
            );
        }
    }

    /// Record the final transform
    pub fn record_result(&self, transform: &RigidTransform, final_cost: f64) {
        let (tx, ty) = transform.translation();
        tracing::info!(
            parent: &self.span,
            rotation = format!("{:.3}°", transform.rotation_degrees()),
            translation = format!("({:.2}, {:.2})", tx, ty),
            final_cost = final_cost,
            execution_time_ms = self.elapsed_ms(),
            "Alignment completed"
        );
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }

    /// Get the underlying span for manual instrumentation
    pub fn span(&self) -> &Span {
        &self.span
    }

    /// Enter the span context
    pub fn enter(&self) -> tracing::span::Entered<'_> {
        self.span.enter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registration::Strategy;
    use crate::transform::TransformParameters;

    #[test]
    fn test_alignment_span_records() {
        let span = AlignmentSpan::new((32, 32), 3, Some(Uuid::new_v4()));
        let _entered = span.enter();
        let report = LevelReport {
            level: 2,
            shape: (8, 8),
            strategy: Strategy::Global,
            initial_params: TransformParameters::zeros(),
            final_params: TransformParameters::new(0.1, 1.0, -1.0),
            initial_cost: -1.2,
            final_cost: -1.5,
            evaluations: 42,
            converged: false,
            elapsed_ms: 1.5,
        };
        span.record_level(&report);
        span.record_result(&RigidTransform::new(0.1, 2.0, -2.0), -1.5);
        assert!(span.elapsed_ms() >= 0.0);
    }
}
