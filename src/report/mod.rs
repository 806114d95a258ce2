use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::Result;
use crate::text::strip_code_fences;

/// Summary file payload: `{"company": ..., "summary": ...}`.
#[derive(Debug, Serialize)]
struct SummaryFile<'a> {
    company: &'a str,
    summary: &'a str,
}

/// Company directory under the output root, whitespace replaced so the name
/// is path-safe: "Novo nordisk" becomes "Novo_nordisk".
pub fn company_dir(output_dir: &Path, company: &str) -> PathBuf {
    let safe: String = company
        .chars()
        .map(|c| if c.is_whitespace() || c == '/' { '_' } else { c })
        .collect();
    output_dir.join(safe)
}

/// Write the `{company, summary}` JSON file. Creates the directory.
pub fn write_summary_json(output_dir: &Path, company: &str, summary: &str) -> Result<PathBuf> {
    let dir = company_dir(output_dir, company);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join("summary.json");
    let payload = SummaryFile { company, summary };
    std::fs::write(&path, serde_json::to_string_pretty(&payload)?)?;
    Ok(path)
}

/// Write raw report text under the company directory.
pub fn write_report_text(
    output_dir: &Path,
    company: &str,
    file_name: &str,
    text: &str,
) -> Result<PathBuf> {
    let dir = company_dir(output_dir, company);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(file_name);
    std::fs::write(&path, text)?;
    Ok(path)
}

/// Render report text to a styled standalone HTML document.
///
/// Pure function of its inputs: the caller decides where the bytes go.
/// The conversion is deliberately light (headings, bullets, bold, rules);
/// anything fancier is the downstream renderer's problem.
pub fn render_html(title: &str, text: &str) -> Vec<u8> {
    let body = markdown_to_html(strip_code_fences(text));
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>
body {{ font-family: 'Arial', sans-serif; line-height: 1.6; color: #333; margin: 20px; }}
h1, h2, h3 {{ color: #1F618D; border-bottom: 2px solid #1F618D; padding-bottom: 5px; margin-top: 25px; }}
h4 {{ color: #117A65; margin-top: 15px; }}
ul {{ margin: 15px 0; padding-left: 20px; }}
hr {{ border: none; border-top: 1px solid #ddd; margin: 20px 0; }}
.footer {{ text-align: center; margin-top: 30px; font-size: 0.8em; color: #555; }}
</style>
</head>
<body>
<h1>{title}</h1>
{body}
<div class="footer">Generated by ticketscope</div>
</body>
</html>
"#
    )
    .into_bytes()
}

/// Write the rendered HTML report under the company directory.
pub fn write_html_report(
    output_dir: &Path,
    company: &str,
    file_name: &str,
    text: &str,
) -> Result<PathBuf> {
    let dir = company_dir(output_dir, company);
    std::fs::create_dir_all(&dir)?;
    let path = dir.join(file_name);
    let title = format!("Ticket Analysis Report - {company}");
    std::fs::write(&path, render_html(&title, text))?;
    Ok(path)
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn inline_markup(s: &str) -> String {
    // Bold only: split on "**" and wrap alternating segments.
    let parts: Vec<&str> = s.split("**").collect();
    if parts.len() < 3 {
        return s.to_string();
    }
    let mut out = String::new();
    for (i, part) in parts.iter().enumerate() {
        // An odd index with no part after it is an unmatched "**".
        if i % 2 == 1 && i + 1 < parts.len() {
            out.push_str("<strong>");
            out.push_str(part);
            out.push_str("</strong>");
        } else {
            out.push_str(part);
        }
    }
    out
}

fn markdown_to_html(text: &str) -> String {
    let mut html = String::new();
    let mut in_list = false;
    let mut in_paragraph = false;

    for line in text.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("- ") || trimmed.starts_with("* ") {
            if in_paragraph {
                html.push_str("</p>\n");
                in_paragraph = false;
            }
            if !in_list {
                html.push_str("<ul>\n");
                in_list = true;
            }
            let item = inline_markup(&escape_html(&trimmed[2..]));
            html.push_str(&format!("<li>{item}</li>\n"));
            continue;
        }
        if in_list {
            html.push_str("</ul>\n");
            in_list = false;
        }

        if trimmed.is_empty() {
            if in_paragraph {
                html.push_str("</p>\n");
                in_paragraph = false;
            }
            continue;
        }

        if trimmed == "---" {
            if in_paragraph {
                html.push_str("</p>\n");
                in_paragraph = false;
            }
            html.push_str("<hr>\n");
            continue;
        }

        if let Some(heading) = trimmed.strip_prefix("#### ") {
            close_paragraph(&mut html, &mut in_paragraph);
            html.push_str(&format!("<h4>{}</h4>\n", escape_html(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("### ") {
            close_paragraph(&mut html, &mut in_paragraph);
            html.push_str(&format!("<h3>{}</h3>\n", escape_html(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("## ") {
            close_paragraph(&mut html, &mut in_paragraph);
            html.push_str(&format!("<h2>{}</h2>\n", escape_html(heading)));
        } else if let Some(heading) = trimmed.strip_prefix("# ") {
            close_paragraph(&mut html, &mut in_paragraph);
            html.push_str(&format!("<h2>{}</h2>\n", escape_html(heading)));
        } else {
            if !in_paragraph {
                html.push_str("<p>");
                in_paragraph = true;
            } else {
                html.push(' ');
            }
            html.push_str(&inline_markup(&escape_html(trimmed)));
        }
    }

    if in_list {
        html.push_str("</ul>\n");
    }
    if in_paragraph {
        html.push_str("</p>\n");
    }
    html
}

fn close_paragraph(html: &mut String, in_paragraph: &mut bool) {
    if *in_paragraph {
        html.push_str("</p>\n");
        *in_paragraph = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_company_dir_sanitized() {
        let dir = company_dir(Path::new("summaries"), "Novo nordisk");
        assert_eq!(dir, PathBuf::from("summaries/Novo_nordisk"));
    }

    #[test]
    fn test_write_summary_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_summary_json(tmp.path(), "Acme Corp", "report body").unwrap();
        assert!(path.ends_with("Acme_Corp/summary.json"));
        let raw = std::fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["company"], "Acme Corp");
        assert_eq!(value["summary"], "report body");
    }

    #[test]
    fn test_render_html_converts_structure() {
        let md = "## Statistics\n\nTotal: **42** tickets\n\n- first\n- second\n\n---\n";
        let html = String::from_utf8(render_html("Report", md)).unwrap();
        assert!(html.contains("<h2>Statistics</h2>"));
        assert!(html.contains("<strong>42</strong>"));
        assert!(html.contains("<li>first</li>"));
        assert!(html.contains("<li>second</li>"));
        assert!(html.contains("<hr>"));
        assert!(html.contains("<title>Report</title>"));
    }

    #[test]
    fn test_render_html_escapes() {
        let html = String::from_utf8(render_html("t", "a <script> tag")).unwrap();
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_strips_code_fences() {
        let html = String::from_utf8(render_html("t", "```markdown\n## Inside\n```")).unwrap();
        assert!(html.contains("<h2>Inside</h2>"));
        assert!(!html.contains("```"));
    }

    #[test]
    fn test_write_html_report() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_html_report(tmp.path(), "Acme", "report.html", "## Hello\n").unwrap();
        assert!(path.ends_with("Acme/report.html"));
        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("<h2>Hello</h2>"));
    }
}
