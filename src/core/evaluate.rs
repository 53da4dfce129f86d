//! Precision-recall evaluation of detection scores against reference labels

use crate::core::render;
use crate::types::{RasterError, RasterResult};
use std::path::Path;

/// Precision and recall of `pred_scores` against binary labels, one pair per
/// threshold.
///
/// A score counts as a detection when it is greater than or equal to the
/// threshold, and label 1 is the positive class. Thresholds are evaluated in
/// the order given; the returned vectors line up with them index by index.
/// When a denominator is empty (no predicted positives, or no positive
/// labels at all) the affected metric is reported as 0.0 with a warning.
///
/// With `plot` set, the curve is also rendered to the given PNG path. A
/// rendering failure is logged and does not fail the evaluation.
pub fn precision_recall_curve(
    y_true: &[u8],
    pred_scores: &[f32],
    thresholds: &[f32],
    plot: Option<&Path>,
) -> RasterResult<(Vec<f64>, Vec<f64>)> {
    if y_true.len() != pred_scores.len() {
        return Err(RasterError::Label(format!(
            "label and score lengths differ: {} vs {}",
            y_true.len(),
            pred_scores.len()
        )));
    }
    if let Some(&bad) = y_true.iter().find(|&&label| label > 1) {
        return Err(RasterError::Label(format!(
            "labels must be 0 or 1, found {}",
            bad
        )));
    }

    let mut precisions = Vec::with_capacity(thresholds.len());
    let mut recalls = Vec::with_capacity(thresholds.len());

    for &threshold in thresholds {
        let mut true_positives = 0usize;
        let mut false_positives = 0usize;
        let mut false_negatives = 0usize;

        for (&label, &score) in y_true.iter().zip(pred_scores) {
            let predicted = score >= threshold;
            match (label == 1, predicted) {
                (true, true) => true_positives += 1,
                (false, true) => false_positives += 1,
                (true, false) => false_negatives += 1,
                (false, false) => {}
            }
        }

        let predicted_positives = true_positives + false_positives;
        let actual_positives = true_positives + false_negatives;

        let precision = if predicted_positives == 0 {
            log::warn!(
                "No predicted positives at threshold {}; precision reported as 0.0",
                threshold
            );
            0.0
        } else {
            true_positives as f64 / predicted_positives as f64
        };

        let recall = if actual_positives == 0 {
            log::warn!(
                "No positive labels; recall at threshold {} reported as 0.0",
                threshold
            );
            0.0
        } else {
            true_positives as f64 / actual_positives as f64
        };

        log::debug!(
            "Threshold {}: precision = {:.4}, recall = {:.4}",
            threshold,
            precision,
            recall
        );

        precisions.push(precision);
        recalls.push(recall);
    }

    if let Some(path) = plot {
        if let Err(e) = render::render_precision_recall_plot(&precisions, &recalls, path) {
            log::warn!(
                "Failed to render precision-recall plot to {}: {}",
                path.display(),
                e
            );
        }
    }

    Ok((precisions, recalls))
}
