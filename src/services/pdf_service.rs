// src/services/pdf_service.rs
//
// Turns an HTML page rendered by askama into a PDF with genpdf.
// The HTML is read line by line: one block element per line, with <b>/<i>
// inline runs. It is not a general HTML engine; templates fed to it are
// written in that shape (see templates/patient_pdf.html).
use genpdf::elements::{Break, Paragraph};
use genpdf::fonts::{FontData, FontFamily};
use genpdf::style::{Style, StyledString};
use genpdf::{Document, SimplePageDecorator};
use std::path::{Path, PathBuf};
use thiserror::Error;

const FONT_NAME: &str = "LiberationSans";
const BODY_FONT_SIZE: u8 = 11;
const MARGIN_MM: i32 = 15;

/// System locations tried after the configured font directory.
const SYSTEM_LIBERATION_DIR: &str = "/usr/share/fonts/truetype/liberation";
const SYSTEM_DEJAVU_DIR: &str = "/usr/share/fonts/truetype/dejavu";

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("no usable font family found (tried: {0})")]
    FontsUnavailable(String),

    #[error("PDF render failed: {0}")]
    Render(String),
}

/// Renders HTML into PDF bytes. Cheap to clone, lives in `AppState`.
#[derive(Debug, Clone)]
pub struct PdfRenderer {
    font_dir: PathBuf,
}

impl PdfRenderer {
    pub fn new(font_dir: impl Into<PathBuf>) -> Self {
        Self { font_dir: font_dir.into() }
    }

    /// Converts `html` to a PDF on a blocking thread.
    pub async fn render_html(&self, title: String, html: String) -> Result<Vec<u8>, PdfError> {
        let font_dir = self.font_dir.clone();
        tokio::task::spawn_blocking(move || {
            tracing::debug!("Rendering PDF '{}' ({} bytes of HTML)", title, html.len());
            let family = load_font_family(&font_dir)?;
            render_blocks(family, &title, &parse_html(&html))
        })
        .await
        .map_err(|e| {
            tracing::error!("spawn_blocking task failed (render_html): {:?}", e);
            PdfError::Render("render task aborted".to_string())
        })?
    }
}

/// Regular/bold/italic/bold-italic family: `<dir>/LiberationSans-*.ttf`,
/// then the system Liberation and DejaVu Sans families.
pub fn load_font_family(font_dir: &Path) -> Result<FontFamily<FontData>, PdfError> {
    let mut tried = Vec::new();

    for dir in [font_dir, Path::new(SYSTEM_LIBERATION_DIR)] {
        match genpdf::fonts::from_files(dir, FONT_NAME, None) {
            Ok(family) => {
                tracing::debug!("Using font family {} from {}", FONT_NAME, dir.display());
                return Ok(family);
            }
            Err(e) => tried.push(format!("{}/{}-*.ttf ({})", dir.display(), FONT_NAME, e)),
        }
    }

    // DejaVu does not follow the -Regular/-Italic naming that from_files expects
    let dejavu = Path::new(SYSTEM_DEJAVU_DIR);
    let load = |file: &str| FontData::load(dejavu.join(file), None);
    match (
        load("DejaVuSans.ttf"),
        load("DejaVuSans-Bold.ttf"),
        load("DejaVuSans-Oblique.ttf"),
        load("DejaVuSans-BoldOblique.ttf"),
    ) {
        (Ok(regular), Ok(bold), Ok(italic), Ok(bold_italic)) => {
            tracing::debug!("Using DejaVu Sans from {}", dejavu.display());
            Ok(FontFamily { regular, bold, italic, bold_italic })
        }
        _ => {
            tried.push(format!("{}/DejaVuSans*.ttf", dejavu.display()));
            Err(PdfError::FontsUnavailable(tried.join(", ")))
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Heading { level: u8, runs: Vec<Run> },
    Paragraph(Vec<Run>),
    Bullet(Vec<Run>),
    Break,
}

/// Splits rendered HTML into printable blocks. `<head>` content is skipped,
/// lines made only of tags are dropped, `<hr>`/`<br>` become breaks.
pub fn parse_html(html: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut in_head = false;

    for raw_line in html.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }

        let lower = line.to_ascii_lowercase();
        if lower.starts_with("<head>") || lower.starts_with("<head ") {
            in_head = !lower.contains("</head>");
            continue;
        }
        if in_head {
            in_head = !lower.contains("</head>");
            continue;
        }

        let first_tag = leading_tag_name(line);
        if matches!(first_tag.as_deref(), Some("hr") | Some("br")) {
            if blocks.last() != Some(&Block::Break) {
                blocks.push(Block::Break);
            }
            continue;
        }

        let runs = parse_runs(line);
        if runs.iter().all(|r| r.text.trim().is_empty()) {
            continue;
        }

        let block = match first_tag.as_deref() {
            Some("h1") => Block::Heading { level: 1, runs },
            Some("h2") | Some("h3") => Block::Heading { level: 2, runs },
            Some("li") => Block::Bullet(runs),
            _ => Block::Paragraph(runs),
        };
        blocks.push(block);
    }

    blocks
}

/// Name of the tag the line starts with, lowercased, closing slash removed.
fn leading_tag_name(line: &str) -> Option<String> {
    let rest = line.strip_prefix('<')?;
    let end = rest.find('>')?;
    Some(tag_name(&rest[..end]))
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Inline runs of a single line. Only b/strong and i/em change the style,
/// every other tag is dropped. Entities are decoded per text segment, so
/// escaped markup coming from user data stays literal text.
pub fn parse_runs(line: &str) -> Vec<Run> {
    let mut runs: Vec<Run> = Vec::new();
    let (mut bold, mut italic) = (false, false);
    let mut rest = line;

    let mut push_text = |text: &str, bold: bool, italic: bool| {
        if text.is_empty() {
            return;
        }
        let text = decode_entities(text);
        match runs.last_mut() {
            Some(last) if last.bold == bold && last.italic == italic => last.text.push_str(&text),
            _ => runs.push(Run { text, bold, italic }),
        }
    };

    while let Some(start) = rest.find('<') {
        push_text(&rest[..start], bold, italic);
        let Some(len) = rest[start..].find('>') else {
            // Unterminated tag: keep the remainder as text
            push_text(&rest[start..], bold, italic);
            rest = "";
            break;
        };
        let tag = &rest[start + 1..start + len];
        let closing = tag.starts_with('/');
        match tag_name(tag).as_str() {
            "b" | "strong" => bold = !closing,
            "i" | "em" => italic = !closing,
            _ => {}
        }
        rest = &rest[start + len + 1..];
    }
    push_text(rest, bold, italic);

    // Outer whitespace of the line is layout, not content
    if let Some(first) = runs.first_mut() {
        first.text = first.text.trim_start().to_string();
    }
    if let Some(last) = runs.last_mut() {
        last.text = last.text.trim_end().to_string();
    }
    runs.retain(|r| !r.text.is_empty());
    runs
}

/// Decodes the entities askama's HTML escaper emits plus numeric references.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let candidate = &rest[amp..];
        let decoded = candidate
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| decode_entity(&candidate[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &candidate[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &candidate[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse::<u32>().ok()?
            };
            char::from_u32(code)
        }
    }
}

fn paragraph(runs: &[Run], font_size: Option<u8>, force_bold: bool) -> Paragraph {
    let mut p = Paragraph::new("");
    for run in runs {
        let mut style = Style::new();
        if run.bold || force_bold {
            style.set_bold();
        }
        if run.italic {
            style.set_italic();
        }
        if let Some(size) = font_size {
            style.set_font_size(size);
        }
        p.push(StyledString::new(run.text.clone(), style));
    }
    p
}

fn render_blocks(family: FontFamily<FontData>, title: &str, blocks: &[Block]) -> Result<Vec<u8>, PdfError> {
    let mut doc = Document::new(family);
    doc.set_title(title);
    doc.set_font_size(BODY_FONT_SIZE);
    doc.set_line_spacing(1.25);

    let mut decorator = SimplePageDecorator::new();
    decorator.set_margins(MARGIN_MM);
    doc.set_page_decorator(decorator);

    for block in blocks {
        match block {
            Block::Heading { level, runs } => {
                let size = if *level == 1 { 18 } else { 14 };
                doc.push(paragraph(runs, Some(size), true));
                doc.push(Break::new(0.5));
            }
            Block::Paragraph(runs) => doc.push(paragraph(runs, None, false)),
            Block::Bullet(runs) => {
                let mut bulleted = vec![Run { text: "• ".to_string(), bold: false, italic: false }];
                bulleted.extend(runs.iter().cloned());
                doc.push(paragraph(&bulleted, None, false));
            }
            Block::Break => doc.push(Break::new(1)),
        }
    }

    let mut out = Vec::new();
    doc.render(&mut out).map_err(|e| PdfError::Render(e.to_string()))?;
    tracing::debug!("PDF '{}' rendered ({} bytes)", title, out.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, bold: bool, italic: bool) -> Run {
        Run { text: text.to_string(), bold, italic }
    }

    #[test]
    fn inline_tags_become_styled_runs() {
        assert_eq!(
            parse_runs("<p><b>Name:</b> John <i>Doe</i></p>"),
            vec![run("Name:", true, false), run(" John ", false, false), run("Doe", false, true)]
        );
        assert_eq!(
            parse_runs("<li><strong><em>both</em></strong></li>"),
            vec![run("both", true, true)]
        );
    }

    #[test]
    fn escaped_user_markup_stays_literal() {
        assert_eq!(
            parse_runs("<p>&lt;b&gt;not bold&lt;/b&gt; &amp; &#34;quoted&#39;</p>"),
            vec![run("<b>not bold</b> & \"quoted'", false, false)]
        );
    }

    #[test]
    fn entity_decoding() {
        assert_eq!(decode_entities("a &amp; b"), "a & b");
        assert_eq!(decode_entities("&#x41;&#66;"), "AB");
        assert_eq!(decode_entities("AT&T; fish & chips"), "AT&T; fish & chips");
        assert_eq!(decode_entities("trailing &"), "trailing &");
    }

    #[test]
    fn page_structure_is_mapped_to_blocks() {
        let html = r#"<!DOCTYPE html>
<html>
<head>
  <title>ignored</title>
  <style>body { color: red; }</style>
</head>
<body>
  <h1>Patient Record</h1>
  <p><b>Name:</b> John</p>

  <hr>
  <br>
  <h2>Symptoms</h2>
  <li>cough</li>
  <div></div>
</body>
</html>"#;
        assert_eq!(
            parse_html(html),
            vec![
                Block::Heading { level: 1, runs: vec![run("Patient Record", false, false)] },
                Block::Paragraph(vec![run("Name:", true, false), run(" John", false, false)]),
                Block::Break,
                Block::Heading { level: 2, runs: vec![run("Symptoms", false, false)] },
                Block::Bullet(vec![run("cough", false, false)]),
            ]
        );
    }

    #[test]
    fn single_line_head_is_skipped() {
        let blocks = parse_html("<head><title>t</title></head>\n<p>body</p>");
        assert_eq!(blocks, vec![Block::Paragraph(vec![run("body", false, false)])]);
    }

    #[test]
    fn missing_fonts_are_reported() {
        match load_font_family(Path::new("/nonexistent")) {
            // A system family was found, nothing to assert here
            Ok(_) => {}
            Err(e) => {
                assert!(matches!(e, PdfError::FontsUnavailable(_)));
                assert!(e.to_string().contains("/nonexistent"));
            }
        }
    }

    #[tokio::test]
    async fn renders_a_pdf_document() {
        if load_font_family(Path::new("./fonts")).is_err() {
            eprintln!("skipping: no font family available on this machine");
            return;
        }
        let renderer = PdfRenderer::new("./fonts");
        let bytes = renderer
            .render_html("Patient 1".into(), "<h1>Patient</h1>\n<p><b>Name:</b> John</p>".into())
            .await
            .unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
