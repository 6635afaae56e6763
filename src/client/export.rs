// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! CSV and printable-HTML export of a fetched meal list.
//!
//! Pure string builders with no network or validation duties. The CSV
//! opens with a UTF-8 BOM so spreadsheet imports pick the right
//! encoding; HTML fields are escaped before interpolation.

use chrono::{DateTime, Datelike, Duration, Months, NaiveDate, Utc};

use crate::client::errors::ClientError;
use crate::client::stats::totals;
use crate::models::Meal;

/// Trailing window an export covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportPeriod {
    Last7Days,
    Last30Days,
    Last3Months,
    All,
}

impl ExportPeriod {
    pub fn label(&self) -> &'static str {
        match self {
            ExportPeriod::Last7Days => "Last 7 days",
            ExportPeriod::Last30Days => "Last 30 days",
            ExportPeriod::Last3Months => "Last 3 months",
            ExportPeriod::All => "Full history",
        }
    }

    fn start(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            ExportPeriod::Last7Days => Some(now - Duration::days(7)),
            ExportPeriod::Last30Days => Some(now - Duration::days(30)),
            ExportPeriod::Last3Months => now.checked_sub_months(Months::new(3)),
            ExportPeriod::All => None,
        }
    }

    /// Meals inside the period, order preserved.
    pub fn filter(&self, meals: &[Meal], now: DateTime<Utc>) -> Vec<Meal> {
        match self.start(now) {
            Some(start) => meals
                .iter()
                .filter(|meal| meal.created_at >= start)
                .cloned()
                .collect(),
            None => meals.to_vec(),
        }
    }
}

fn escape_csv(value: &str) -> String {
    if value.contains(',') || value.contains('"') || value.contains('\n') {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render meals as CSV text (UTF-8 BOM, comma-delimited). Errors on an
/// empty list so callers surface a message instead of an empty file.
pub fn meals_to_csv(meals: &[Meal]) -> Result<String, ClientError> {
    if meals.is_empty() {
        return Err(ClientError::EmptyExport);
    }

    let mut out = String::from("\u{FEFF}");
    out.push_str("Date,Time,Meal Type,Food,Calories,Protein (g),Carbs (g),Fats (g)\n");

    for meal in meals {
        let line = [
            meal.created_at.format("%Y-%m-%d").to_string(),
            meal.created_at.format("%H:%M").to_string(),
            meal.meal_type.label().to_string(),
            escape_csv(&meal.food_name),
            meal.calories.to_string(),
            format!("{:.1}", meal.protein),
            format!("{:.1}", meal.carbs),
            format!("{:.1}", meal.fats),
        ]
        .join(",");
        out.push_str(&line);
        out.push('\n');
    }

    Ok(out)
}

/// Render a printable HTML report: period, totals, daily average, and
/// a detail table.
pub fn html_report(
    meals: &[Meal],
    period: ExportPeriod,
    now: DateTime<Utc>,
) -> Result<String, ClientError> {
    if meals.is_empty() {
        return Err(ClientError::EmptyExport);
    }

    let totals = totals(meals);
    let days_covered = {
        let mut days: Vec<NaiveDate> = meals.iter().map(|m| m.created_at.date_naive()).collect();
        days.sort_unstable();
        days.dedup();
        days.len().max(1)
    };
    let daily_average = totals.calories / days_covered as i32;

    let mut rows = String::new();
    for meal in meals {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.1}</td><td>{:.1}</td><td>{:.1}</td></tr>\n",
            meal.created_at.format("%Y-%m-%d %H:%M"),
            escape_html(&meal.food_name),
            meal.calories,
            meal.meal_type.label(),
            meal.protein,
            meal.carbs,
            meal.fats,
        ));
    }

    Ok(format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="UTF-8">
<title>CalTrack Nutrition Report</title>
<style>
body {{ font-family: Arial, sans-serif; padding: 40px; max-width: 800px; margin: 0 auto; }}
h1 {{ border-bottom: 3px solid #2563eb; padding-bottom: 10px; }}
table {{ width: 100%; border-collapse: collapse; margin: 20px 0; }}
th, td {{ padding: 10px; border-bottom: 1px solid #e5e7eb; text-align: left; }}
</style>
</head>
<body>
<h1>CalTrack Nutrition Report</h1>
<p><strong>Period:</strong> {period}</p>
<p><strong>Meals logged:</strong> {count}</p>
<p><strong>Generated:</strong> {generated}</p>
<p><strong>Total calories:</strong> {calories} kcal &mdash; <strong>daily average:</strong> {average} kcal</p>
<p><strong>Totals:</strong> {protein:.1} g protein, {carbs:.1} g carbs, {fats:.1} g fat</p>
<table>
<thead><tr><th>Date</th><th>Food</th><th>Calories</th><th>Type</th><th>Protein</th><th>Carbs</th><th>Fats</th></tr></thead>
<tbody>
{rows}</tbody>
</table>
</body>
</html>
"#,
        period = period.label(),
        count = meals.len(),
        generated = now.format("%Y-%m-%d %H:%M"),
        calories = totals.calories,
        average = daily_average,
        protein = totals.protein,
        carbs = totals.carbs,
        fats = totals.fats,
        rows = rows,
    ))
}

/// Export filename: `caltrack-export-YYYY-MM-DD`, with a `-to-` range
/// suffix when the export spans multiple days.
pub fn export_filename(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
) -> String {
    match (start, end) {
        (Some(start), Some(end)) if start != end => {
            format!("caltrack-export-{start}-to-{end}")
        }
        (Some(start), Some(_)) => format!("caltrack-export-{start}"),
        _ => format!(
            "caltrack-export-{:04}-{:02}-{:02}",
            today.year(),
            today.month(),
            today.day()
        ),
    }
}
