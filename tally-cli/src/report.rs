//! Plain-text rendering of a pipeline report

use std::fmt::Write;
use tally_finance::{PipelineReport, PipelineStage};

pub fn render(report: &PipelineReport, threshold: f64) -> Result<String, std::fmt::Error> {
    let mut out = String::new();
    write_report(&mut out, report, threshold)?;
    Ok(out)
}

fn write_report(out: &mut String, report: &PipelineReport, threshold: f64) -> std::fmt::Result {
    if !report.batch.rejects.is_empty() {
        writeln!(out, "## Skipped lines\n")?;
        for reject in &report.batch.rejects {
            writeln!(out, "- {}", reject)?;
        }
        writeln!(out)?;
    }

    if report.has_no_data() {
        writeln!(out, "No valid transactions found.")?;
        return Ok(());
    }

    writeln!(out, "## Monthly income and expenses\n")?;
    writeln!(out, "{:<8} {:>12} {:>12} {:>12}", "Month", "Income", "Expense", "Net")?;
    for m in report.ledger.months() {
        writeln!(
            out,
            "{:<8} {:>12.2} {:>12.2} {:>12.2}",
            m.month.to_string(),
            m.income,
            m.expense,
            m.net()
        )?;
    }

    writeln!(out, "\n## Spending by category\n")?;
    if report.breakdown.is_empty() {
        writeln!(out, "(no expenses)")?;
    } else {
        for (category, share) in report.breakdown.shares() {
            let amount = report.breakdown.get(category).unwrap_or(0.0);
            writeln!(out, "{:<20} {:>12.2} {:>6.1}%", category, amount, share * 100.0)?;
        }
    }

    writeln!(out, "\n## Forecasted monthly expenses\n")?;
    match report.stage() {
        PipelineStage::ForecastFailed(e) => {
            writeln!(out, "Error: {}", e)?;
        }
        PipelineStage::AlertsComputed(alerts) => {
            if let Ok(forecast) = &report.forecast {
                writeln!(
                    out,
                    "{} (ar={:.3}, ma={:.3}), {:.0}% interval\n",
                    forecast.order(),
                    forecast.model.ar,
                    forecast.model.ma,
                    forecast.confidence * 100.0
                )?;
                writeln!(out, "{:<8} {:>12} {:>12} {:>12}", "Month", "Predicted", "Lower", "Upper")?;
                for p in &forecast.points {
                    writeln!(
                        out,
                        "{:<8} {:>12.2} {:>12.2} {:>12.2}",
                        p.month.to_string(),
                        p.predicted,
                        p.lower,
                        p.upper
                    )?;
                }
            }

            writeln!(out, "\n## Expense threshold alerts (threshold ${:.2})\n", threshold)?;
            if alerts.is_empty() {
                writeln!(out, "No alerts for the forecasted period.")?;
            } else {
                for alert in alerts {
                    writeln!(out, "- {}", alert)?;
                }
            }
        }
    }

    Ok(())
}
