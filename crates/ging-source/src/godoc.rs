//! Go doc comments: raw comment text, HTML rendering and code stripping.

use once_cell::sync::Lazy;
use regex::Regex;

static DIRECTIVE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:line |[a-z0-9]+:[a-z0-9])").expect("directive pattern compiles"));
static PRE_BLOCK: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<pre>.*?</pre>\n?").expect("pre pattern compiles"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{2,}").expect("blank line pattern compiles"));

/// Text of a comment group: markers removed, directives (`//go:...`,
/// `//line ...`) dropped, trailing spaces and surrounding blank lines
/// trimmed, inner blank runs collapsed to one.
pub fn comment_text<S: AsRef<str>>(comments: &[S]) -> String {
    let mut lines: Vec<String> = Vec::new();
    for comment in comments {
        let comment = comment.as_ref();
        if let Some(body) = comment.strip_prefix("//") {
            if DIRECTIVE.is_match(body) {
                continue;
            }
            lines.push(body.strip_prefix(' ').unwrap_or(body).trim_end().to_string());
        } else if let Some(body) = comment.strip_prefix("/*") {
            let body = body.strip_suffix("*/").unwrap_or(body);
            lines.extend(body.lines().map(|l| l.trim_end().to_string()));
        }
    }

    let mut out: Vec<String> = Vec::with_capacity(lines.len());
    for line in lines {
        if line.is_empty() && out.last().map_or(true, String::is_empty) {
            continue;
        }
        out.push(line);
    }
    while out.last().is_some_and(String::is_empty) {
        out.pop();
    }
    out.join("\n")
}

#[derive(Debug, PartialEq, Eq)]
enum Block {
    Para(Vec<String>),
    Heading(String),
    Code(Vec<String>),
}

fn is_indented(line: &str) -> bool {
    line.starts_with(' ') || line.starts_with('\t')
}

fn split_blocks(text: &str) -> Vec<Block> {
    let lines: Vec<&str> = text.lines().collect();
    let mut blocks = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if line.trim().is_empty() {
            i += 1;
        } else if is_indented(line) {
            // A code block runs over blank lines as long as indentation resumes.
            let start = i;
            let mut end = i;
            while i < lines.len() && (is_indented(lines[i]) || lines[i].trim().is_empty()) {
                if !lines[i].trim().is_empty() {
                    end = i + 1;
                }
                i += 1;
            }
            i = end;
            blocks.push(Block::Code(unindent(&lines[start..end])));
        } else {
            let mut para = Vec::new();
            while i < lines.len() && !lines[i].trim().is_empty() && !is_indented(lines[i]) {
                para.push(lines[i].to_string());
                i += 1;
            }
            blocks.push(Block::Para(para));
        }
    }
    promote_headings(blocks)
}

fn unindent(lines: &[&str]) -> Vec<String> {
    let prefix = lines
        .iter()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);
    lines.iter().map(|l| l.get(prefix..).unwrap_or("").to_string()).collect()
}

/// A lone capitalised line without punctuation, between two paragraphs,
/// and not the first block.
fn promote_headings(blocks: Vec<Block>) -> Vec<Block> {
    let heading_at = |i: usize| -> bool {
        let (Some(Block::Para(prev)), Some(Block::Para(lines)), Some(Block::Para(_))) =
            (i.checked_sub(1).and_then(|p| blocks.get(p)), blocks.get(i), blocks.get(i + 1))
        else {
            return false;
        };
        !prev.is_empty() && lines.len() == 1 && is_heading(&lines[0])
    };
    let flags: Vec<bool> = (0..blocks.len()).map(heading_at).collect();
    blocks
        .into_iter()
        .zip(flags)
        .map(|(block, heading)| match block {
            Block::Para(mut lines) if heading => Block::Heading(lines.remove(0)),
            other => other,
        })
        .collect()
}

fn is_heading(line: &str) -> bool {
    let line = line.trim();
    let starts_upper = line.chars().next().is_some_and(char::is_uppercase);
    let ends_alnum = line.chars().last().is_some_and(char::is_alphanumeric);
    starts_upper && ends_alnum && !line.chars().any(|c| ",.;:!?+*/=()[]{}_^°&§~%#@<\">\\".contains(c))
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

fn heading_id(text: &str) -> String {
    let id: String = text.chars().map(|c| if c.is_alphanumeric() { c } else { '_' }).collect();
    format!("hdr-{id}")
}

/// Renders doc comment text to HTML the way godoc does: `<p>` paragraphs,
/// `<h3>` headings and `<pre>` for indented blocks.
pub fn to_html(text: &str) -> String {
    let mut html = String::new();
    for block in split_blocks(text) {
        match block {
            Block::Para(lines) => {
                html.push_str("<p>\n");
                for line in lines {
                    html.push_str(&escape(&line));
                    html.push('\n');
                }
                html.push_str("</p>\n");
            }
            Block::Heading(line) => {
                let line = line.trim();
                html.push_str(&format!("<h3 id=\"{}\">{}</h3>\n", heading_id(line), escape(line)));
            }
            Block::Code(lines) => {
                html.push_str("<pre>");
                for line in lines {
                    html.push_str(&escape(&line));
                    html.push('\n');
                }
                html.push_str("</pre>\n");
            }
        }
    }
    html
}

/// Drops every `<pre>` block from rendered markup and normalises the
/// whitespace left between the surviving blocks.
pub fn remove_code_blocks(html: &str) -> String {
    let stripped = PRE_BLOCK.replace_all(html, "");
    BLANK_RUNS.replace_all(stripped.trim(), "\n").into_owned()
}

/// Package-level documentation as stored in the index.
pub fn sanitized_html(text: &str) -> String {
    remove_code_blocks(&to_html(text))
}
