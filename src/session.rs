//! Result state for the page.
//!
//! One slot per capability, each holding a result, an error message and the
//! token of the in-flight request. All mutation goes through the reducer
//! methods here; handlers never poke fields directly.
//!
//! Completions carry the token minted when the request started. A slot only
//! accepts a completion for its current token, so a reply that arrives after
//! the user has restarted the operation (or reset the board) is discarded
//! instead of overwriting newer state.

use serde::{Serialize, Serializer};

use crate::models::{
    CompositeResult, ElementReport, ImageCategory, MoodboardResult, SimilarItem, UploadedImage,
};

fn in_progress<S: Serializer>(pending: &Option<u64>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_bool(pending.is_some())
}

/// Result/pending/error triple for one capability.
#[derive(Debug, Clone, Serialize)]
pub struct OpSlot<T> {
    pub result: Option<T>,
    pub error: Option<String>,
    #[serde(rename = "in_progress", serialize_with = "in_progress")]
    pending: Option<u64>,
}

impl<T> Default for OpSlot<T> {
    fn default() -> Self {
        Self {
            result: None,
            error: None,
            pending: None,
        }
    }
}

impl<T> OpSlot<T> {
    /// Start a request: stale result and error are cleared first.
    fn begin(&mut self, token: u64) {
        self.result = None;
        self.error = None;
        self.pending = Some(token);
    }

    fn settle(&mut self, token: u64, outcome: Result<T, String>) -> bool {
        if self.pending != Some(token) {
            return false;
        }
        self.pending = None;
        match outcome {
            Ok(value) => self.result = Some(value),
            Err(message) => self.error = Some(message),
        }
        true
    }

    fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn in_progress(&self) -> bool {
        self.pending.is_some()
    }
}

/// Everything the page renders, owned by the server for the lifetime of the
/// tab's session.
#[derive(Debug, Default, Serialize)]
pub struct Session {
    pub category: ImageCategory,
    #[serde(skip)]
    pub primary: Option<UploadedImage>,
    #[serde(skip)]
    pub secondary: Option<UploadedImage>,
    pub primary_preview: Option<String>,
    pub secondary_preview: Option<String>,
    pub moodboard: OpSlot<MoodboardResult>,
    pub details: OpSlot<ElementReport>,
    pub enhanced: OpSlot<String>,
    pub similar: OpSlot<Vec<SimilarItem>>,
    pub composite: OpSlot<CompositeResult>,
    #[serde(skip)]
    next_token: u64,
}

/// Capabilities with their own state slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Moodboard,
    Details,
    Enhance,
    Similar,
    Composite,
}

impl Session {
    fn mint_token(&mut self) -> u64 {
        self.next_token += 1;
        self.next_token
    }

    /// A new primary image invalidates everything derived from the old one.
    pub fn set_primary(&mut self, image: UploadedImage) {
        self.primary_preview = Some(image.to_data_uri());
        self.primary = Some(image);
        self.secondary = None;
        self.secondary_preview = None;
        self.clear_results();
    }

    pub fn set_secondary(&mut self, image: UploadedImage) {
        self.secondary_preview = Some(image.to_data_uri());
        self.secondary = Some(image);
    }

    /// Switching away from a two-image mode drops the secondary image.
    pub fn set_category(&mut self, category: ImageCategory) {
        if !category.requires_secondary() {
            self.secondary = None;
            self.secondary_preview = None;
        }
        self.category = category;
    }

    fn clear_results(&mut self) {
        self.moodboard.clear();
        self.details.clear();
        self.enhanced.clear();
        self.similar.clear();
        self.composite.clear();
    }

    /// Start an operation and mint its token. Starting a new mood-board
    /// generation also resets every downstream panel so nothing stale is
    /// shown against the new board.
    pub fn begin(&mut self, kind: OpKind) -> u64 {
        let token = self.mint_token();
        match kind {
            OpKind::Moodboard => {
                self.details.clear();
                self.enhanced.clear();
                self.similar.clear();
                self.composite.clear();
                self.moodboard.begin(token);
            }
            OpKind::Details => {
                // A new selection invalidates the similar-item list too.
                self.similar.clear();
                self.details.begin(token);
            }
            OpKind::Enhance => self.enhanced.begin(token),
            OpKind::Similar => self.similar.begin(token),
            OpKind::Composite => self.composite.begin(token),
        }
        token
    }

    pub fn settle_moodboard(&mut self, token: u64, outcome: Result<MoodboardResult, String>) -> bool {
        self.moodboard.settle(token, outcome)
    }

    pub fn settle_details(&mut self, token: u64, outcome: Result<ElementReport, String>) -> bool {
        self.details.settle(token, outcome)
    }

    pub fn settle_enhanced(&mut self, token: u64, outcome: Result<String, String>) -> bool {
        self.enhanced.settle(token, outcome)
    }

    pub fn settle_similar(&mut self, token: u64, outcome: Result<Vec<SimilarItem>, String>) -> bool {
        self.similar.settle(token, outcome)
    }

    pub fn settle_composite(&mut self, token: u64, outcome: Result<CompositeResult, String>) -> bool {
        self.composite.settle(token, outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn img(byte: u8) -> UploadedImage {
        UploadedImage {
            bytes: vec![byte; 4],
            mime: "image/png".to_string(),
        }
    }

    fn board() -> MoodboardResult {
        MoodboardResult {
            image: "data:image/png;base64,AA==".into(),
            text: "a board".into(),
            palette: Vec::new(),
        }
    }

    #[test]
    fn preview_tracks_latest_upload_per_slot() {
        let mut session = Session::default();
        session.set_primary(img(1));
        let first = session.primary_preview.clone().unwrap();
        session.set_primary(img(2));
        let second = session.primary_preview.clone().unwrap();
        assert_ne!(first, second);
        assert_eq!(second, img(2).to_data_uri());
    }

    #[test]
    fn new_primary_clears_secondary_and_all_results() {
        let mut session = Session::default();
        session.set_category(ImageCategory::TryOn);
        session.set_primary(img(1));
        session.set_secondary(img(2));
        let token = session.begin(OpKind::Moodboard);
        assert!(session.settle_moodboard(token, Ok(board())));

        session.set_primary(img(3));
        assert!(session.secondary.is_none());
        assert!(session.secondary_preview.is_none());
        assert!(session.moodboard.result.is_none());
        assert!(session.details.result.is_none());
    }

    #[test]
    fn leaving_a_two_image_category_clears_the_secondary() {
        let mut session = Session::default();
        session.set_category(ImageCategory::Staging);
        session.set_secondary(img(9));
        session.set_category(ImageCategory::Food);
        assert!(session.secondary.is_none());
        assert!(session.secondary_preview.is_none());

        // Switching between two-image modes keeps it.
        session.set_category(ImageCategory::Staging);
        session.set_secondary(img(9));
        session.set_category(ImageCategory::TryOn);
        assert!(session.secondary.is_some());
    }

    #[test]
    fn moodboard_start_resets_downstream_panels() {
        let mut session = Session::default();
        let token = session.begin(OpKind::Details);
        session.settle_details(
            token,
            Ok(ElementReport {
                crop: "data:image/png;base64,AA==".into(),
                details: Default::default(),
            }),
        );
        let token = session.begin(OpKind::Similar);
        session.settle_similar(token, Ok(vec![]));

        session.begin(OpKind::Moodboard);
        assert!(session.details.result.is_none());
        assert!(session.similar.result.is_none());
        assert!(session.moodboard.in_progress());
    }

    #[test]
    fn stale_completion_is_discarded() {
        let mut session = Session::default();
        let old = session.begin(OpKind::Moodboard);
        let new = session.begin(OpKind::Moodboard);
        assert!(!session.settle_moodboard(old, Ok(board())));
        assert!(session.moodboard.result.is_none());
        assert!(session.settle_moodboard(new, Ok(board())));
        assert!(session.moodboard.result.is_some());
    }

    #[test]
    fn failure_clears_result_and_records_message_locally() {
        let mut session = Session::default();
        let board_token = session.begin(OpKind::Moodboard);
        session.settle_moodboard(board_token, Ok(board()));

        let token = session.begin(OpKind::Enhance);
        session.settle_enhanced(token, Err("the provider returned no image".into()));
        assert!(session.enhanced.result.is_none());
        assert_eq!(
            session.enhanced.error.as_deref(),
            Some("the provider returned no image")
        );
        // Other slots untouched.
        assert!(session.moodboard.result.is_some());
        assert!(session.moodboard.error.is_none());
    }

    #[test]
    fn state_serializes_in_progress_flags_not_tokens() {
        let mut session = Session::default();
        session.begin(OpKind::Similar);
        let view = serde_json::to_value(&session).unwrap();
        assert_eq!(view["similar"]["in_progress"], true);
        assert_eq!(view["moodboard"]["in_progress"], false);
        assert!(view["similar"].get("pending").is_none());
    }
}
