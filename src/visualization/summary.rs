use crate::analysis::AccuracyReport;
use crate::registration::{AlignmentReport, LevelReport};

pub fn print_report(report: &AlignmentReport) {
    let (tx, ty) = report.transform.translation();
    println!("=== Alignment Result ===");
    println!("  Correlation ID: {}", report.correlation_id);
    println!("  Started: {}", report.started_at.to_rfc3339());
    println!("  Rotation: {:.3}°", report.transform.rotation_degrees());
    println!("  Translation: ({:.2}, {:.2}) px", tx, ty);
    if let Some(cost) = report.final_cost() {
        println!("  Final NMI: {:.4}", -cost);
    }
    println!("  Evaluations: {}", report.evaluations());
    println!("  Processing Time: {:.1}ms", report.total_ms);
    println!();
}

pub fn print_level_table(levels: &[LevelReport]) {
    println!("| Level | Shape | Strategy | NMI start | NMI end | Evals | Time (ms) |");
    println!("|-------|-------|----------|-----------|---------|-------|-----------|");

    for level in levels {
        println!(
            "| {} | {}x{} | {} | {:.4} | {:.4} | {} | {:.1} |",
            level.level,
            level.shape.0,
            level.shape.1,
            level.strategy,
            -level.initial_cost,
            -level.final_cost,
            level.evaluations,
            level.elapsed_ms
        );
    }
}

pub fn print_accuracy(accuracy: &AccuracyReport) {
    println!("=== Accuracy vs Ground Truth ===");
    println!("  Rotation error: {:.3}°", accuracy.rotation_error_degrees);
    println!("  Translation error (centre): {:.2} px", accuracy.translation_error_pixels);
    println!("  NMI before: {:.4}", accuracy.nmi_before);
    println!("  NMI after: {:.4}", accuracy.nmi_after);
}
