use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;

use mdtree::{HtmlValidator, to_html};

static CASES_FILE: &str = "tests/html_output/cases.txt";

/// One Markdown input with its expected HTML.
#[derive(Debug, Clone)]
struct Case {
    section: String,
    index: usize,
    markdown: String,
    expected_html: String,
}

fn is_fence(line: &str) -> bool {
    line.starts_with("````")
}

fn load_cases(path: &Path) -> anyhow::Result<Vec<Case>> {
    let text = fs::read_to_string(path)?;
    let mut cases = Vec::new();
    let mut section = String::new();
    let mut lines = text.lines();

    while let Some(line) = lines.next() {
        if let Some(title) = line.strip_prefix("## ") {
            section = title.trim().to_string();
            continue;
        }
        if !(is_fence(line) && line.trim_end().ends_with("example")) {
            continue;
        }

        let mut markdown = Vec::new();
        for line in lines.by_ref() {
            if line == "." {
                break;
            }
            markdown.push(line);
        }
        let mut html = Vec::new();
        for line in lines.by_ref() {
            if is_fence(line) {
                break;
            }
            html.push(line);
        }

        cases.push(Case {
            section: section.clone(),
            index: cases.len() + 1,
            markdown: markdown.join("\n"),
            expected_html: html.join("\n"),
        });
    }

    anyhow::ensure!(!cases.is_empty(), "no cases found in {}", path.display());
    Ok(cases)
}

#[test]
fn html_output_matches_cases() -> anyhow::Result<()> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join(CASES_FILE);
    let cases = load_cases(&path)?;

    for case in &cases {
        let html = to_html(&case.markdown);
        assert_eq!(
            html.trim_end_matches('\n'),
            case.expected_html,
            "case {} ({}): {:?}",
            case.index,
            case.section,
            case.markdown
        );
        HtmlValidator::validate_well_formed(&html)?;
    }
    Ok(())
}
