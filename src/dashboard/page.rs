use crate::core::constants::dashboard;

/// Everything the dashboard page shows on first load
#[derive(Debug, Clone)]
pub struct DashboardPage<'a> {
    pub title: &'a str,
    /// Dropdown options in display order
    pub options: &'a [String],
    pub selected: Option<&'a str>,
    /// Bound chart pre-rendered for `selected`
    pub activity_svg: &'a str,
    pub static_svg: &'a str,
}

impl DashboardPage<'_> {
    /// Generate the complete HTML document
    pub fn render(&self) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{}</title>
    <style>{}</style>
</head>
<body>
    {}
    <script>{}</script>
</body>
</html>"#,
            escape_html(self.title),
            Self::generate_css(),
            self.generate_body(),
            Self::generate_javascript()
        )
    }

    fn generate_css() -> &'static str {
        r#"
        :root {
            --primary-color: #2563eb;
            --bg-color: #f8fafc;
            --card-bg: #ffffff;
            --border-color: #e2e8f0;
            --text-primary: #1e293b;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
            background-color: var(--bg-color);
            color: var(--text-primary);
            line-height: 1.6;
        }

        .container {
            max-width: 900px;
            margin: 0 auto;
            padding: 2rem;
        }

        h1 {
            font-size: 2rem;
            margin-bottom: 1.5rem;
        }

        select {
            width: 100%;
            padding: 0.5rem;
            margin-bottom: 1.5rem;
            border: 1px solid var(--border-color);
            border-radius: 6px;
            font-size: 1rem;
        }

        .chart-container {
            background: var(--card-bg);
            padding: 1rem;
            margin-bottom: 1.5rem;
            border: 1px solid var(--border-color);
            border-radius: 12px;
        }

        .chart-container svg {
            width: 100%;
            height: auto;
        }
        "#
    }

    fn generate_body(&self) -> String {
        format!(
            r#"<div class="container">
        <h1>{}</h1>
        {}
        <div class="chart-container" id="{}">{}</div>
        <div class="chart-container" id="{}">{}</div>
    </div>"#,
            escape_html(self.title),
            self.generate_dropdown(),
            dashboard::ACTIVITY_CHART_ID,
            self.activity_svg,
            dashboard::STATIC_CHART_ID,
            self.static_svg
        )
    }

    fn generate_dropdown(&self) -> String {
        let options = self
            .options
            .iter()
            .map(|option| {
                let selected = if Some(option.as_str()) == self.selected {
                    " selected"
                } else {
                    ""
                };
                let value = escape_html(option);
                format!(r#"<option value="{value}"{selected}>{value}</option>"#)
            })
            .collect::<Vec<_>>()
            .join("");

        format!(
            r#"<select id="{}" data-output="{}" data-update="{}">{}</select>"#,
            dashboard::DROPDOWN_ID,
            dashboard::ACTIVITY_CHART_ID,
            dashboard::UPDATE_ROUTE,
            options
        )
    }

    fn generate_javascript() -> &'static str {
        r#"
        document.addEventListener('DOMContentLoaded', function() {
            document.querySelectorAll('select[data-update]').forEach(function(input) {
                input.addEventListener('change', async function() {
                    const response = await fetch(input.dataset.update, {
                        method: 'POST',
                        headers: { 'Content-Type': 'application/json' },
                        body: JSON.stringify({ input: input.id, value: input.value })
                    });
                    if (!response.ok) {
                        console.error('Update failed: ' + response.status);
                        return;
                    }
                    const update = await response.json();
                    const target = document.getElementById(update.output);
                    if (target) {
                        target.innerHTML = update.svg;
                    }
                });
            });
        });
        "#
    }
}

/// Escape text for use in HTML content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
