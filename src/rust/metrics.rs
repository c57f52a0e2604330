//! Accuracy and per-class precision/recall/F1 for predicted labels.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::classifier::ClassifierError;

/// Precision, recall, F1 and support of one class
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Number of true occurrences of the class
    pub support: usize,
}

/// Averages of the per-class metrics
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// Evaluation of predicted labels against the true ones.
///
/// `Display` renders the familiar fixed-width table:
///
/// ```text
///               precision    recall  f1-score   support
///
///     goodbye!       1.00      0.50      0.67         2
///       hello!       0.67      1.00      0.80         2
///
///     accuracy                           0.75         4
///    macro avg       0.83      0.75      0.73         4
/// weighted avg       0.83      0.75      0.73         4
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ClassificationReport {
    pub classes: Vec<ClassMetrics>,
    pub accuracy: f64,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total_support: usize,
}

fn check_lengths<T, P>(y_true: &[T], y_pred: &[P]) -> Result<(), ClassifierError> {
    if y_true.len() != y_pred.len() {
        return Err(ClassifierError::Validation(format!(
            "Label sequences differ in length: {} true vs {} predicted",
            y_true.len(),
            y_pred.len()
        )));
    }
    if y_true.is_empty() {
        return Err(ClassifierError::Validation(
            "Cannot evaluate empty label sequences".into(),
        ));
    }
    Ok(())
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Fraction of positions where the predicted label equals the true label
pub fn accuracy_score<T, P>(y_true: &[T], y_pred: &[P]) -> Result<f64, ClassifierError>
where
    T: AsRef<str>,
    P: AsRef<str>,
{
    check_lengths(y_true, y_pred)?;
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t.as_ref() == p.as_ref())
        .count();
    Ok(ratio(correct, y_true.len()))
}

/// Builds a [`ClassificationReport`] over the union of labels seen in either
/// sequence. Ratios with a zero denominator are reported as `0.0`.
pub fn classification_report<T, P>(
    y_true: &[T],
    y_pred: &[P],
) -> Result<ClassificationReport, ClassifierError>
where
    T: AsRef<str>,
    P: AsRef<str>,
{
    check_lengths(y_true, y_pred)?;

    let labels: BTreeSet<&str> = y_true
        .iter()
        .map(|l| l.as_ref())
        .chain(y_pred.iter().map(|l| l.as_ref()))
        .collect();

    // (true positives, predicted count, true count)
    let mut counts: BTreeMap<&str, (usize, usize, usize)> =
        labels.iter().map(|&label| (label, (0, 0, 0))).collect();
    for (t, p) in y_true.iter().zip(y_pred) {
        let (t, p) = (t.as_ref(), p.as_ref());
        if let Some(entry) = counts.get_mut(t) {
            entry.2 += 1;
            if t == p {
                entry.0 += 1;
            }
        }
        if let Some(entry) = counts.get_mut(p) {
            entry.1 += 1;
        }
    }

    let classes: Vec<ClassMetrics> = counts
        .into_iter()
        .map(|(label, (tp, predicted, actual))| {
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, actual);
            let f1 = if precision + recall > 0.0 {
                2.0 * precision * recall / (precision + recall)
            } else {
                0.0
            };
            ClassMetrics {
                label: label.to_string(),
                precision,
                recall,
                f1,
                support: actual,
            }
        })
        .collect();

    let total_support = y_true.len();
    let n_classes = classes.len() as f64;
    let macro_avg = AverageMetrics {
        precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
        recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
        f1: classes.iter().map(|c| c.f1).sum::<f64>() / n_classes,
    };
    let weighted = |metric: fn(&ClassMetrics) -> f64| {
        classes
            .iter()
            .map(|c| metric(c) * c.support as f64)
            .sum::<f64>()
            / total_support as f64
    };
    let weighted_avg = AverageMetrics {
        precision: weighted(|c| c.precision),
        recall: weighted(|c| c.recall),
        f1: weighted(|c| c.f1),
    };

    Ok(ClassificationReport {
        accuracy: accuracy_score(y_true, y_pred)?,
        classes,
        macro_avg,
        weighted_avg,
        total_support,
    })
}

impl ClassificationReport {
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const WEIGHTED: &str = "weighted avg";
        let width = self
            .classes
            .iter()
            .map(|c| c.label.chars().count())
            .chain(std::iter::once(WEIGHTED.len()))
            .max()
            .unwrap_or(WEIGHTED.len());

        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9} {:>9}",
            "", "precision", "recall", "f1-score", "support",
            w = width
        )?;
        writeln!(f)?;
        for c in &self.classes {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                c.label, c.precision, c.recall, c.f1, c.support,
                w = width
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>w$}  {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.total_support,
            w = width
        )?;
        for (name, avg) in [("macro avg", &self.macro_avg), (WEIGHTED, &self.weighted_avg)] {
            writeln!(
                f,
                "{:>w$}  {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, avg.precision, avg.recall, avg.f1, self.total_support,
                w = width
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy_score(&["a", "b", "c", "a"], &["a", "b", "a", "b"]).unwrap(), 0.5);
        assert_eq!(accuracy_score(&["x"], &["x"]).unwrap(), 1.0);
    }

    #[test]
    fn test_length_mismatch_fails() {
        assert!(matches!(
            accuracy_score(&["a", "b"], &["a"]),
            Err(ClassifierError::Validation(_))
        ));
        assert!(classification_report(&["a"], &["a", "b"]).is_err());
        let empty: [&str; 0] = [];
        assert!(classification_report(&empty, &empty).is_err());
    }

    #[test]
    fn test_per_class_metrics() {
        let y_true = ["hello!", "hello!", "goodbye!", "goodbye!"];
        let y_pred = ["hello!", "hello!", "hello!", "goodbye!"];
        let report = classification_report(&y_true, &y_pred).unwrap();

        let hello = report.class("hello!").unwrap();
        assert!((hello.precision - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(hello.recall, 1.0);
        assert!((hello.f1 - 0.8).abs() < 1e-12);
        assert_eq!(hello.support, 2);

        let bye = report.class("goodbye!").unwrap();
        assert_eq!(bye.precision, 1.0);
        assert_eq!(bye.recall, 0.5);
        assert_eq!(report.accuracy, 0.75);
        assert!((report.macro_avg.precision - 5.0 / 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_classes_missing_from_one_side() {
        let report = classification_report(&["a", "b"], &["a", "c"]).unwrap();
        let labels: Vec<&str> = report.classes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);

        let b = report.class("b").unwrap();
        assert_eq!((b.precision, b.recall, b.f1, b.support), (0.0, 0.0, 0.0, 1));
        let c = report.class("c").unwrap();
        assert_eq!((c.precision, c.recall, c.f1, c.support), (0.0, 0.0, 0.0, 0));

        // weighted average ignores the zero-support class
        assert_eq!(report.weighted_avg.recall, 0.5);
        assert!((report.macro_avg.recall - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_report_rendering() {
        let y_true = ["hello!", "hello!", "goodbye!", "goodbye!"];
        let y_pred = ["hello!", "hello!", "hello!", "goodbye!"];
        let rendered = classification_report(&y_true, &y_pred).unwrap().to_string();
        let expected = "              precision    recall  f1-score   support

    goodbye!       1.00      0.50      0.67         2
      hello!       0.67      1.00      0.80         2

    accuracy                           0.75         4
   macro avg       0.83      0.75      0.73         4
weighted avg       0.83      0.75      0.73         4
";
        assert_eq!(rendered, expected);
    }

    #[test]
    fn test_long_labels_widen_the_table() {
        let label = "a considerably longer response";
        let rendered = classification_report(&[label], &[label]).unwrap().to_string();
        let row = rendered.lines().nth(2).unwrap();
        assert!(row.starts_with(label));
    }
}
