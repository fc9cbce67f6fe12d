use super::EditorSession;

/// Which session actions a front end should currently offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionAvailability {
    pub clear_selection: bool,
    pub crop: bool,
    pub fill: bool,
    pub apply_brush: bool,
    pub clear_brush: bool,
    pub undo: bool,
    pub download_full: bool,
    pub download_patch: bool,
    pub submit: bool,
}

impl ActionAvailability {
    pub fn from_session(session: &EditorSession, prompt: &str) -> Self {
        let has_image = session.image().is_some();
        let has_selection = session.selection().is_some();
        let has_brush = session.brush().has_content();
        let busy = session.is_processing();
        let patch_ready = session.last_patch().is_some() || has_selection;

        Self {
            clear_selection: has_selection,
            crop: has_selection && !busy,
            fill: has_selection,
            apply_brush: has_brush,
            clear_brush: has_brush,
            undo: session.brush().can_undo(),
            download_full: has_image,
            download_patch: has_image && patch_ready,
            submit: has_image && has_selection && !prompt.trim().is_empty() && !busy,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    use crate::canvas::LoadOptions;
    use crate::geometry::Point;

    #[test]
    fn empty_session_offers_nothing() {
        let session = EditorSession::new();
        assert_eq!(session.availability("add hat"), ActionAvailability::default());
    }

    #[test]
    fn selection_unlocks_selection_actions_and_submit_needs_prompt() {
        let mut session = EditorSession::new();
        session.load_image(
            RgbaImage::from_pixel(40, 40, Rgba([1, 2, 3, 255])),
            LoadOptions::default(),
        );
        let loaded = session.availability("");
        assert!(loaded.download_full);
        assert!(!loaded.download_patch);
        assert!(!loaded.crop);

        session
            .pointer_down(1, Point::new(5.0, 5.0))
            .expect("pointer down should work");
        session
            .pointer_up(1, Point::new(25.0, 25.0))
            .expect("selection should commit");

        let selected = session.availability("   ");
        assert!(selected.clear_selection && selected.crop && selected.fill);
        assert!(selected.download_patch);
        assert!(!selected.submit);
        assert!(!selected.undo);
        assert!(session.availability("add hat").submit);
    }
}
