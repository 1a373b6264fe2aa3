//! Email template rendering.
//!
//! Only the `prediction` template exists; it serves both the per-prediction
//! mail and the weekly summary.

use super::{NotifyError, TemplateData};

pub const PREDICTION_TEMPLATE: &str = "prediction";

/// Render `template` with `data` into an HTML document.
pub fn render(template: &str, data: &TemplateData) -> Result<String, NotifyError> {
    match template {
        PREDICTION_TEMPLATE => Ok(render_prediction(data)),
        other => Err(NotifyError::Template(format!("unknown template '{other}'"))),
    }
}

fn render_prediction(data: &TemplateData) -> String {
    let numbers = if data.predicted_numbers.is_empty() {
        "<p>No numbers could be predicted for this draw.</p>".to_string()
    } else {
        let balls: String = data
            .predicted_numbers
            .iter()
            .map(|n| format!("<span class=\"ball\">{n}</span>"))
            .collect();
        format!("<p class=\"numbers\">{balls}</p>")
    };

    format!(
        "<!DOCTYPE html>\n\
         <html><head><meta charset=\"utf-8\"><title>{draw}</title></head>\n\
         <body>\n\
         <h1>{draw}</h1>\n\
         <p>Date: {date}</p>\n\
         {numbers}\n\
         <p>Backtested accuracy: {accuracy}%</p>\n\
         </body></html>\n",
        draw = escape_html(&data.draw),
        date = escape_html(&data.date),
        accuracy = escape_html(&data.accuracy),
    )
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
