//! Terminal formatting for fit results.
//!
//! Formatting lives here so the estimator code stays free of presentation
//! details and output changes stay localized.

use crate::domain::LOG10_POSITIONS;
use crate::fit::MlEstimate;
use crate::report::ResidualStats;
use crate::summary::ParamSummary;

/// Maximum-likelihood result: status line, parameter table, residuals.
pub fn format_ml_report(names: &[String], fit: &MlEstimate, residuals: &[ResidualStats]) -> String {
    let mut out = String::new();

    out.push_str("=== rvorbit - maximum likelihood ===\n");
    out.push_str(&format!(
        "Status: {} ({}) | iterations={} evaluations={}\n",
        if fit.success { "converged" } else { "not converged" },
        fit.message,
        fit.n_iter,
        fit.n_evals
    ));
    out.push_str(&format!("-lnL: {:.6}\n\n", fit.neg_log_like));

    out.push_str(&header_row("param", &["theta", "value"]));
    for (j, (name, v)) in names.iter().zip(&fit.theta).enumerate() {
        let physical = if LOG10_POSITIONS.contains(&j) { 10f64.powf(*v) } else { *v };
        out.push_str(
            format!("{:<14} {:>16} {:>16}", truncate(name, 14), fmt_num(*v), fmt_num(physical)).trim_end(),
        );
        out.push('\n');
    }

    if !residuals.is_empty() {
        out.push('\n');
        out.push_str(&header_row("dataset", &["n", "rms", "chi2"]));
        for r in residuals {
            out.push_str(&format!(
                "{:<14} {:>16} {:>16} {:>16}\n",
                r.dataset,
                r.n_points,
                fmt_num(r.rms),
                fmt_num(r.chi2)
            ));
        }
    }

    out
}

/// Posterior summary: median with `+plus / −minus` per parameter.
pub fn format_posterior(summary: &[ParamSummary], acceptance: &[f64], burn_in: usize) -> String {
    let mut out = String::new();

    out.push_str("=== rvorbit - posterior (16/50/84 percentiles) ===\n");
    let mean_acc = if acceptance.is_empty() {
        0.0
    } else {
        acceptance.iter().sum::<f64>() / acceptance.len() as f64
    };
    out.push_str(&format!(
        "Walkers: {} | burn-in: {burn_in} steps | mean acceptance: {mean_acc:.3}\n\n",
        acceptance.len()
    ));

    out.push_str(&header_row("param", &["median", "+err", "-err"]));
    for p in summary {
        out.push_str(&format!(
            "{:<14} {:>16} {:>16} {:>16}\n",
            truncate(&p.name, 14),
            fmt_num(p.median),
            fmt_num(p.plus),
            fmt_num(p.minus)
        ));
    }
    out
}

fn header_row(first: &str, rest: &[&str]) -> String {
    let mut line = format!("{first:<14}");
    let mut rule = format!("{:-<14}", "");
    for col in rest {
        line.push_str(&format!(" {col:>16}"));
        rule.push_str(&format!(" {:-<16}", ""));
    }
    format!("{line}\n{rule}\n")
}

fn fmt_num(v: f64) -> String {
    if v != 0.0 && (v.abs() < 1e-3 || v.abs() >= 1e6) {
        format!("{v:.6e}")
    } else {
        format!("{v:.6}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
