//! Text renderings of a stored record for download

use crate::store::PaperRecord;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

const MAX_FILENAME_CHARS: usize = 200;

/// Supported download formats
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Txt,
    Md,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "txt",
            ExportFormat::Md => "md",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Txt => "text/plain; charset=utf-8",
            ExportFormat::Md => "text/markdown; charset=utf-8",
        }
    }

    /// Render `record` in this format
    pub fn render(&self, record: &PaperRecord) -> String {
        match self {
            ExportFormat::Txt => to_text(record),
            ExportFormat::Md => to_markdown(record),
        }
    }

    /// Download name for `record`
    pub fn filename(&self, record: &PaperRecord) -> String {
        let stem = if record.title.trim().is_empty() { "summary" } else { record.title.as_str() };
        format!("{}.{}", safe_filename(stem), self.extension())
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "txt" | "text" => Ok(ExportFormat::Txt),
            "md" | "markdown" => Ok(ExportFormat::Md),
            other => Err(format!("unsupported export format: {}", other)),
        }
    }
}

/// Plain text rendering
pub fn to_text(record: &PaperRecord) -> String {
    let mut out = format!("Title: {}\n\n", record.title);
    let abstract_text = record.abstract_or_empty();
    if !abstract_text.is_empty() {
        out.push_str(&format!("Abstract:\n{}\n\n", abstract_text));
    }
    out.push_str(&format!("Summary:\n{}\n", record.summary));
    if let Some(notes) = record.annotations.as_deref().filter(|n| !n.trim().is_empty()) {
        out.push_str(&format!("\nAnnotations:\n{}\n", notes));
    }
    out
}

/// Markdown rendering
pub fn to_markdown(record: &PaperRecord) -> String {
    let mut out = format!("# {}\n\n", record.title);
    if let Some(link) = arxiv_abs_link(&record.id) {
        out.push_str(&format!("<{}>\n\n", link));
    }
    let abstract_text = record.abstract_or_empty();
    if !abstract_text.is_empty() {
        out.push_str(&format!("**Abstract:** {}\n\n", abstract_text));
    }
    out.push_str(&format!("**Summary:**\n\n{}\n", record.summary));
    if let Some(notes) = record.annotations.as_deref().filter(|n| !n.trim().is_empty()) {
        out.push_str(&format!("\n**Annotations:**\n\n{}\n", notes));
    }
    out
}

/// Sanitize a name for filesystem and download use
pub fn safe_filename(name: &str) -> String {
    let last = name.rsplit(['/', '\\']).next().unwrap_or("");
    let cleaned: String = last
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.') { c } else { '_' })
        .take(MAX_FILENAME_CHARS)
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// Abstract page link for repository identifiers; `None` for local ids
pub fn arxiv_abs_link(id: &str) -> Option<String> {
    is_repository_id(id).then(|| format!("https://arxiv.org/abs/{}", id))
}

fn is_repository_id(id: &str) -> bool {
    // 2301.12345
    if let Some((yymm, num)) = id.split_once('.') {
        if yymm.len() == 4
            && (4..=5).contains(&num.len())
            && yymm.bytes().all(|b| b.is_ascii_digit())
            && num.bytes().all(|b| b.is_ascii_digit())
        {
            return true;
        }
    }

    // hep-th/9901001
    if let Some((archive, num)) = id.split_once('/') {
        return !archive.is_empty()
            && archive.bytes().all(|b| b.is_ascii_alphabetic() || b == b'-' || b == b'.')
            && num.len() == 7
            && num.bytes().all(|b| b.is_ascii_digit());
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PaperRecord {
        PaperRecord::new("2301.12345", "Attention / Everything", "Short summary.")
            .with_abstract("We study attention.")
    }

    #[test]
    fn test_text_export() {
        let text = to_text(&record());
        assert!(text.starts_with("Title: Attention / Everything\n"));
        assert!(text.contains("Abstract:\nWe study attention."));
        assert!(text.contains("Summary:\nShort summary."));
        assert!(!text.contains("Annotations:"));

        let annotated = to_text(&record().with_annotations("read again"));
        assert!(annotated.contains("Annotations:\nread again"));
    }

    #[test]
    fn test_markdown_export() {
        let md = to_markdown(&record());
        assert!(md.starts_with("# Attention / Everything\n"));
        assert!(md.contains("<https://arxiv.org/abs/2301.12345>"));
        assert!(md.contains("**Abstract:** We study attention."));
        assert!(md.contains("**Summary:**\n\nShort summary."));

        let local = to_markdown(&PaperRecord::new("local-1a2b3c4d", "Mine", "s"));
        assert!(!local.contains("arxiv.org"));
        assert!(!local.contains("**Abstract:**"));
    }

    #[test]
    fn test_safe_filename() {
        assert_eq!(safe_filename(""), "file");
        assert_eq!(safe_filename("a/b/My Paper: v2.pdf"), "My_Paper__v2.pdf");
        assert_eq!(safe_filename("dir\\name.txt"), "name.txt");
        assert_eq!(safe_filename(&"x".repeat(300)).len(), 200);
        assert_eq!(ExportFormat::Md.filename(&record()), "_Everything.md");
    }

    #[test]
    fn test_arxiv_link() {
        assert!(arxiv_abs_link("2301.12345").is_some());
        assert!(arxiv_abs_link("hep-th/9901001").is_some());
        assert!(arxiv_abs_link("math.GT/0309136").is_some());
        assert!(arxiv_abs_link("local-deadbeef").is_none());
        assert!(arxiv_abs_link("demo:1").is_none());
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("MD".parse::<ExportFormat>().unwrap(), ExportFormat::Md);
        assert_eq!("txt".parse::<ExportFormat>().unwrap(), ExportFormat::Txt);
        assert!("pdf".parse::<ExportFormat>().is_err());
    }
}
