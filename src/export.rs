use serde::Serialize;

use crate::schema::AnalysisResult;

pub const EXPORT_FILENAME: &str = "writing_analysis.txt";

const RULE: &str = "-----------------";

/// Rendered plain-text export, handed to the webview (or written to disk)
/// under the fixed `writing_analysis.txt` name.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub filename: String,
    pub content: String,
}

/// Concatenate the original text and all five feedback fields into one
/// UTF-8 document: header, original text, blank separator, then the five
/// labeled sections in fixed order.
pub fn build_document(text: &str, analysis: &AnalysisResult) -> ExportDocument {
    let content = format!(
        "Original Text:\n{RULE}\n{}\n\n\nAnalysis:\n{RULE}\n\n\
         [Grammar Feedback]\n{}\n\n\
         [Style Feedback]\n{}\n\n\
         [Clarity Feedback]\n{}\n\n\
         [Overall Feedback]\n{}\n\n\
         [Improvement Tips]\n{}",
        text,
        analysis.grammar_feedback,
        analysis.style_feedback,
        analysis.clarity_feedback,
        analysis.overall_feedback,
        analysis.improvement_tips,
    );

    ExportDocument {
        filename: EXPORT_FILENAME.to_string(),
        content,
    }
}

/// Inverse of `build_document`, used to prove the concatenation is
/// lossless for the original text and every feedback field.
pub fn parse_document(content: &str) -> Option<(String, AnalysisResult)> {
    let body = content.strip_prefix(&format!("Original Text:\n{RULE}\n"))?;
    let (text, rest) = body.split_once(&format!("\n\n\nAnalysis:\n{RULE}\n\n"))?;

    let labels = [
        "[Grammar Feedback]\n",
        "[Style Feedback]\n",
        "[Clarity Feedback]\n",
        "[Overall Feedback]\n",
        "[Improvement Tips]\n",
    ];

    let mut fields = Vec::with_capacity(5);
    let mut cursor = rest.strip_prefix(labels[0])?;
    for next_label in &labels[1..] {
        let (field, remainder) = cursor.split_once(&format!("\n\n{}", next_label))?;
        fields.push(field.to_string());
        cursor = remainder;
    }
    fields.push(cursor.to_string());

    let mut fields = fields.into_iter();
    Some((
        text.to_string(),
        AnalysisResult {
            grammar_feedback: fields.next()?,
            style_feedback: fields.next()?,
            clarity_feedback: fields.next()?,
            overall_feedback: fields.next()?,
            improvement_tips: fields.next()?,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> AnalysisResult {
        AnalysisResult {
            grammar_feedback: "'teh' should be 'the'".into(),
            style_feedback: "Flat phrasing.".into(),
            clarity_feedback: "Clear enough.".into(),
            overall_feedback: "Decent start.".into(),
            improvement_tips: "1. Fix spelling\n2. Vary rhythm".into(),
        }
    }

    #[test]
    fn test_document_layout() {
        let doc = build_document("teh cat sat", &sample());
        assert_eq!(doc.filename, "writing_analysis.txt");
        assert!(doc.content.starts_with("Original Text:\n-----------------\nteh cat sat"));
        assert!(doc.content.contains("\n\n\nAnalysis:\n-----------------\n\n[Grammar Feedback]\n"));
        assert!(doc.content.ends_with("[Improvement Tips]\n1. Fix spelling\n2. Vary rhythm"));

        // Fixed section order.
        let order: Vec<usize> = [
            "[Grammar Feedback]",
            "[Style Feedback]",
            "[Clarity Feedback]",
            "[Overall Feedback]",
            "[Improvement Tips]",
        ]
        .iter()
        .map(|label| doc.content.find(label).unwrap())
        .collect();
        assert!(order.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_round_trip() {
        let original = "teh cat sat\non the mat";
        let doc = build_document(original, &sample());
        let (text, analysis) = parse_document(&doc.content).unwrap();
        assert_eq!(text, original);
        assert_eq!(analysis, sample());
    }

    #[test]
    fn test_parse_rejects_foreign_content() {
        assert!(parse_document("not an export").is_none());
        assert!(parse_document("Original Text:\n-----------------\nx").is_none());
    }
}
