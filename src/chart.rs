//! Candlestick projection and the HTML page that hands it to Plotly.js.

use std::fmt::Write;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

use crate::error::{PipelineError, PipelineResult};
use crate::models::DailyRecord;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Parallel OHLC columns keyed by `dates`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandlestickSeries {
    pub dates: Vec<NaiveDate>,
    pub open: Vec<f64>,
    pub high: Vec<f64>,
    pub low: Vec<f64>,
    pub close: Vec<f64>,
}

pub fn to_candlestick_series(records: &[DailyRecord]) -> PipelineResult<CandlestickSeries> {
    if records.is_empty() {
        return Err(PipelineError::Render("no records to plot".to_string()));
    }

    let mut series = CandlestickSeries {
        dates: Vec::with_capacity(records.len()),
        open: Vec::with_capacity(records.len()),
        high: Vec::with_capacity(records.len()),
        low: Vec::with_capacity(records.len()),
        close: Vec::with_capacity(records.len()),
    };

    for record in records {
        let prices = [record.open, record.high, record.low, record.close];
        if prices.iter().any(|price| !price.is_finite()) {
            return Err(PipelineError::Render(format!(
                "non-finite price on {}",
                record.date
            )));
        }
        series.dates.push(record.date);
        series.open.push(record.open);
        series.high.push(record.high);
        series.low.push(record.low);
        series.close.push(record.close);
    }

    Ok(series)
}

pub fn render_html(series: &CandlestickSeries, title: &str) -> PipelineResult<String> {
    let figure = json!({
        "data": [{
            "type": "candlestick",
            "x": series.dates,
            "open": series.open,
            "high": series.high,
            "low": series.low,
            "close": series.close,
        }],
        "layout": {
            "title": { "text": title },
            "xaxis": { "title": { "text": "Date" }, "rangeslider": { "visible": false } },
            "yaxis": { "title": { "text": "Price" } },
        },
    });
    let figure = serde_json::to_string(&figure)
        .map_err(|err| PipelineError::Render(err.to_string()))?
        // keep the payload from closing the surrounding <script>
        .replace("</", "<\\/");

    let mut output = String::new();
    let _ = writeln!(output, "<!DOCTYPE html>");
    let _ = writeln!(output, "<html>");
    let _ = writeln!(output, "<head>");
    let _ = writeln!(output, "<meta charset=\"utf-8\">");
    let _ = writeln!(output, "<title>{}</title>", escape_html(title));
    let _ = writeln!(output, "<script src=\"{PLOTLY_CDN}\"></script>");
    let _ = writeln!(output, "</head>");
    let _ = writeln!(output, "<body>");
    let _ = writeln!(output, "<div id=\"chart\" style=\"width:100%;height:90vh;\"></div>");
    let _ = writeln!(output, "<script>");
    let _ = writeln!(output, "const figure = {figure};");
    let _ = writeln!(
        output,
        "Plotly.newPlot(\"chart\", figure.data, figure.layout);"
    );
    let _ = writeln!(output, "</script>");
    let _ = writeln!(output, "</body>");
    let _ = writeln!(output, "</html>");

    Ok(output)
}

fn escape_html(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
