//! Table-row extraction from results pages.

use scraper::{Html, Selector};

use super::ScrapeError;

/// Extract the trimmed `td` texts of every `table tr` in `html`, in document
/// order. Header rows (no `td` cells) come back as empty vectors.
pub fn extract_table_rows(html: &str) -> Result<Vec<Vec<String>>, ScrapeError> {
    let row_selector = Selector::parse("table tr")
        .map_err(|e| ScrapeError::Parse(format!("invalid row selector: {e}")))?;
    let cell_selector = Selector::parse("td")
        .map_err(|e| ScrapeError::Parse(format!("invalid cell selector: {e}")))?;

    let document = Html::parse_document(html);
    let rows = document
        .select(&row_selector)
        .map(|row| {
            row.select(&cell_selector)
                .map(|cell| cell.text().collect::<String>().trim().to_string())
                .collect()
        })
        .collect();

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_cells_in_order() {
        let html = r#"
            <html><body>
            <table>
              <tr><th>ID</th><th>Draw</th><th>Date</th><th>Numbers</th></tr>
              <tr><td> 1021 </td><td>Monday Special</td><td>2024-01-01</td><td>4, 19, 33, 61, 80</td></tr>
              <tr><td>1022</td><td>Lucky Tuesday</td><td>2024-01-02</td><td>1,2,3,4,5</td></tr>
            </table>
            </body></html>
        "#;

        let rows = extract_table_rows(html).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].is_empty());
        assert_eq!(
            rows[1],
            vec!["1021", "Monday Special", "2024-01-01", "4, 19, 33, 61, 80"]
        );
        assert_eq!(rows[2][1], "Lucky Tuesday");
    }

    #[test]
    fn test_nested_markup_is_flattened() {
        let html = "<table><tr><td><span>7</span></td><td><b>Midweek</b></td></tr></table>";
        let rows = extract_table_rows(html).unwrap();
        assert_eq!(rows, vec![vec!["7".to_string(), "Midweek".to_string()]]);
    }

    #[test]
    fn test_page_without_table() {
        let rows = extract_table_rows("<p>maintenance</p>").unwrap();
        assert!(rows.is_empty());
    }
}
