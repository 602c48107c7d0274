use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisError;
use crate::export::{self, ExportDocument};
use crate::schema::{self, AnalysisResult};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WriterPhase {
    Idle,
    Loading,
    Success,
    Error,
}

/// Serializable view of the store, sent to the webview as-is.
#[derive(Serialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WriterSnapshot {
    pub phase: WriterPhase,
    pub text: String,
    pub analysis: Option<AnalysisResult>,
    pub request_id: u64,
}

/// Finite-state store for the form/result flow. All mutation goes through
/// the action methods; every submit hands out a monotonically increasing
/// request id and only the latest id may resolve the Loading phase, so a
/// slow stale response can never overwrite a fresher one.
pub struct WriterSession {
    phase: WriterPhase,
    text: String,
    analysis: Option<AnalysisResult>,
    latest_request_id: u64,
}

impl WriterSession {
    pub fn new() -> Self {
        Self {
            phase: WriterPhase::Idle,
            text: String::new(),
            analysis: None,
            latest_request_id: 0,
        }
    }

    /// Submit action. Empty or whitespace-only text is rejected without
    /// leaving the current phase; otherwise the store enters Loading, the
    /// prior result is cleared, and the new request id is returned.
    pub fn begin_submit(&mut self, text: &str) -> Result<u64, AnalysisError> {
        schema::validate_request(text).map_err(|_| AnalysisError::InvalidInput)?;

        self.latest_request_id += 1;
        self.phase = WriterPhase::Loading;
        self.text = text.to_string();
        self.analysis = None;

        info!("📝 Analysis request #{} submitted", self.latest_request_id);
        Ok(self.latest_request_id)
    }

    /// Resolve a request. Returns false (and changes nothing) when the id
    /// is not the latest issued.
    pub fn complete(&mut self, request_id: u64, result: AnalysisResult) -> bool {
        if request_id != self.latest_request_id {
            warn!(
                "Discarding stale analysis response #{} (latest is #{})",
                request_id, self.latest_request_id
            );
            return false;
        }
        self.phase = WriterPhase::Success;
        self.analysis = Some(result);
        true
    }

    /// Fail a request. Stale failures are discarded the same way.
    pub fn fail(&mut self, request_id: u64) -> bool {
        if request_id != self.latest_request_id {
            warn!(
                "Discarding stale analysis failure #{} (latest is #{})",
                request_id, self.latest_request_id
            );
            return false;
        }
        self.phase = WriterPhase::Error;
        self.analysis = None;
        true
    }

    /// Update the latest completed analysis in place (used when the tips
    /// are regenerated from the tips-only template). The request id is the
    /// one that was current when the regeneration started; tips computed
    /// against a superseded analysis are discarded like any other stale
    /// response.
    pub fn replace_tips(&mut self, request_id: u64, improvement_tips: String) -> bool {
        if request_id != self.latest_request_id {
            warn!(
                "Discarding stale tips for request #{} (latest is #{})",
                request_id, self.latest_request_id
            );
            return false;
        }
        match self.analysis.as_mut() {
            Some(analysis) => {
                analysis.improvement_tips = improvement_tips;
                true
            }
            None => false,
        }
    }

    /// Export is only available once an analysis has succeeded.
    pub fn export(&self) -> Option<ExportDocument> {
        match (self.phase, self.analysis.as_ref()) {
            (WriterPhase::Success, Some(analysis)) => {
                Some(export::build_document(&self.text, analysis))
            }
            _ => None,
        }
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn snapshot(&self) -> WriterSnapshot {
        WriterSnapshot {
            phase: self.phase,
            text: self.text.clone(),
            analysis: self.analysis.clone(),
            request_id: self.latest_request_id,
        }
    }
}

impl Default for WriterSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(tag: &str) -> AnalysisResult {
        AnalysisResult {
            grammar_feedback: format!("{} grammar", tag),
            style_feedback: format!("{} style", tag),
            clarity_feedback: format!("{} clarity", tag),
            overall_feedback: format!("{} overall", tag),
            improvement_tips: format!("1. {} tip", tag),
        }
    }

    #[test]
    fn test_empty_submit_stays_idle() {
        let mut session = WriterSession::new();
        assert_eq!(
            session.begin_submit("  \n ").unwrap_err(),
            AnalysisError::InvalidInput
        );
        assert_eq!(session.snapshot().phase, WriterPhase::Idle);
        assert_eq!(session.snapshot().request_id, 0);
    }

    #[test]
    fn test_submit_success_flow() {
        let mut session = WriterSession::new();
        let id = session.begin_submit("teh cat sat").unwrap();
        assert_eq!(session.snapshot().phase, WriterPhase::Loading);
        assert!(session.snapshot().analysis.is_none());

        assert!(session.complete(id, result("a")));
        let snap = session.snapshot();
        assert_eq!(snap.phase, WriterPhase::Success);
        assert_eq!(snap.analysis.unwrap().grammar_feedback, "a grammar");
    }

    #[test]
    fn test_failure_flow_returns_to_actionable_state() {
        let mut session = WriterSession::new();
        let id = session.begin_submit("text").unwrap();
        assert!(session.fail(id));
        assert_eq!(session.snapshot().phase, WriterPhase::Error);
        assert!(session.snapshot().analysis.is_none());

        // Re-enterable: a new submit goes straight back to Loading.
        assert!(session.begin_submit("more text").is_ok());
        assert_eq!(session.snapshot().phase, WriterPhase::Loading);
    }

    #[test]
    fn test_stale_response_discarded() {
        let mut session = WriterSession::new();
        let first = session.begin_submit("first").unwrap();
        let second = session.begin_submit("second").unwrap();
        assert_ne!(first, second);

        // Fast path: the second request resolves first.
        assert!(session.complete(second, result("fresh")));

        // The slow first response arrives late and must not win.
        assert!(!session.complete(first, result("stale")));
        let snap = session.snapshot();
        assert_eq!(snap.phase, WriterPhase::Success);
        assert_eq!(snap.analysis.unwrap().grammar_feedback, "fresh grammar");

        // Same for a late failure.
        assert!(!session.fail(first));
        assert_eq!(session.snapshot().phase, WriterPhase::Success);
    }

    #[test]
    fn test_new_submit_clears_prior_result() {
        let mut session = WriterSession::new();
        let id = session.begin_submit("one").unwrap();
        session.complete(id, result("a"));

        session.begin_submit("two").unwrap();
        let snap = session.snapshot();
        assert_eq!(snap.phase, WriterPhase::Loading);
        assert!(snap.analysis.is_none());
    }

    #[test]
    fn test_export_gated_on_success() {
        let mut session = WriterSession::new();
        assert!(session.export().is_none());

        let id = session.begin_submit("teh cat sat").unwrap();
        assert!(session.export().is_none());

        session.complete(id, result("a"));
        let doc = session.export().unwrap();
        assert_eq!(doc.filename, "writing_analysis.txt");
        assert!(doc.content.contains("teh cat sat"));

        // An unknown id cannot knock the store out of Success.
        assert!(!session.fail(id + 1));
        assert!(session.export().is_some());
    }

    #[test]
    fn test_replace_tips_only_after_success() {
        let mut session = WriterSession::new();
        assert!(!session.replace_tips(0, "1. nope".into()));

        let id = session.begin_submit("text").unwrap();
        session.complete(id, result("a"));
        assert!(session.replace_tips(id, "1. sharper tip".into()));
        assert_eq!(
            session.snapshot().analysis.unwrap().improvement_tips,
            "1. sharper tip"
        );
    }

    #[test]
    fn test_stale_tips_discarded() {
        let mut session = WriterSession::new();
        let first = session.begin_submit("first text").unwrap();
        session.complete(first, result("first"));

        // Tips regeneration starts against the first analysis, then a new
        // submit completes while the tips call is still in flight.
        let second = session.begin_submit("second text").unwrap();
        session.complete(second, result("second"));

        // The late tips were computed from the first text; they must not
        // be stamped onto the fresh analysis.
        assert!(!session.replace_tips(first, "1. tips for the first text".into()));
        assert_eq!(
            session.snapshot().analysis.unwrap().improvement_tips,
            "1. second tip"
        );

        // Tips carrying the current id still land.
        assert!(session.replace_tips(second, "1. tips for the second text".into()));
        assert_eq!(
            session.snapshot().analysis.unwrap().improvement_tips,
            "1. tips for the second text"
        );
    }
}
