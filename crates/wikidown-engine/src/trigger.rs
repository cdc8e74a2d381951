//! Binding between an editable source region and its rendered preview.
//!
//! Every load or input event re-reads the source region in full and replaces
//! the preview with a fresh render. The preview is only ever written, so the
//! pipeline can never be fed its own output.

use std::path::{Path, PathBuf};

use crate::io::{self, IoError};
use crate::rendering::render;

/// A region the author edits; supplies raw text.
pub trait SourceRegion {
    fn raw_text(&self) -> Result<String, IoError>;
}

/// A region showing rendered markup; its content is replaced wholesale.
pub trait PreviewRegion {
    fn replace_markup(&mut self, markup: &str) -> Result<(), IoError>;
}

/// An in-memory region, usable on either side of a trigger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextRegion {
    text: String,
}

impl TextRegion {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }
}

impl SourceRegion for TextRegion {
    fn raw_text(&self) -> Result<String, IoError> {
        Ok(self.text.clone())
    }
}

impl PreviewRegion for TextRegion {
    fn replace_markup(&mut self, markup: &str) -> Result<(), IoError> {
        self.text = markup.to_string();
        Ok(())
    }
}

/// A region backed by a file on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRegion {
    path: PathBuf,
}

impl FileRegion {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SourceRegion for FileRegion {
    fn raw_text(&self) -> Result<String, IoError> {
        io::read_source(&self.path)
    }
}

impl PreviewRegion for FileRegion {
    fn replace_markup(&mut self, markup: &str) -> Result<(), IoError> {
        io::write_markup(&self.path, markup)?;
        log::info!("Wrote {} bytes of markup to {}", markup.len(), self.path.display());
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    /// The page (or file) was opened.
    Load,
    /// The source region changed.
    Input,
}

/// Re-renders a preview region from a source region on every event.
///
/// Events are handled one at a time and each runs to completion, so the
/// preview always reflects the most recent read of the source.
#[derive(Debug)]
pub struct RenderTrigger<S, P> {
    source: S,
    preview: P,
    passes: u64,
}

impl<S: SourceRegion, P: PreviewRegion> RenderTrigger<S, P> {
    pub fn new(source: S, preview: P) -> Self {
        Self {
            source,
            preview,
            passes: 0,
        }
    }

    /// Reads the source, renders it and replaces the preview.
    pub fn handle(&mut self, event: TriggerEvent) -> Result<(), IoError> {
        let raw = self.source.raw_text()?;
        let markup = render(&raw);
        self.preview.replace_markup(&markup)?;
        self.passes += 1;
        log::debug!("Render pass {} on {event:?}", self.passes);
        Ok(())
    }

    pub fn on_load(&mut self) -> Result<(), IoError> {
        self.handle(TriggerEvent::Load)
    }

    pub fn on_input(&mut self) -> Result<(), IoError> {
        self.handle(TriggerEvent::Input)
    }

    /// Number of completed render passes.
    pub fn passes(&self) -> u64 {
        self.passes
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Mutable access to the source, for applying edits between events.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    pub fn into_parts(self) -> (S, P) {
        (self.source, self.preview)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_dir, create_test_file};
    use std::cell::Cell;

    /// Source that counts how often it is read.
    struct CountingSource {
        text: String,
        reads: Cell<usize>,
    }

    impl SourceRegion for CountingSource {
        fn raw_text(&self) -> Result<String, IoError> {
            self.reads.set(self.reads.get() + 1);
            Ok(self.text.clone())
        }
    }

    #[test]
    fn load_renders_source_into_preview() {
        let mut trigger = RenderTrigger::new(TextRegion::new("# Hi"), TextRegion::default());

        trigger.on_load().unwrap();

        assert_eq!(trigger.preview().text(), "<h1>Hi</h1>");
        assert_eq!(trigger.passes(), 1);
    }

    #[test]
    fn every_event_renders_from_the_raw_source() {
        let mut trigger = RenderTrigger::new(TextRegion::new("**a** & b"), TextRegion::default());

        trigger.on_load().unwrap();
        let first = trigger.preview().text().to_string();
        trigger.on_input().unwrap();
        trigger.on_input().unwrap();

        // Re-rendering the preview would escape its own tags and ampersands.
        assert_eq!(first, "<p><strong>a</strong> &amp; b</p>");
        assert_eq!(trigger.preview().text(), first);
        assert_eq!(trigger.source().text(), "**a** & b");
    }

    #[test]
    fn edits_are_picked_up_on_input() {
        let mut trigger = RenderTrigger::new(TextRegion::new("one"), TextRegion::default());
        trigger.on_load().unwrap();

        trigger.source_mut().set_text("- one\n- two");
        trigger.on_input().unwrap();

        assert_eq!(
            trigger.preview().text(),
            "<ul><li>one</li>\n<li>two</li></ul>"
        );
        assert_eq!(trigger.passes(), 2);
    }

    #[test]
    fn source_is_read_once_per_event() {
        let source = CountingSource {
            text: "text".to_string(),
            reads: Cell::new(0),
        };
        let mut trigger = RenderTrigger::new(source, TextRegion::default());

        trigger.handle(TriggerEvent::Load).unwrap();
        trigger.handle(TriggerEvent::Input).unwrap();
        trigger.handle(TriggerEvent::Input).unwrap();

        let (source, preview) = trigger.into_parts();
        assert_eq!(source.reads.get(), 3);
        assert_eq!(preview.text(), "<p>text</p>");
    }

    #[test]
    fn file_regions_round_trip_through_disk() {
        let dir = create_test_dir();
        let source = create_test_file(&dir, "page.md", "## Files\n\n*saved*");
        let preview = dir.path().join("out").join("page.html");

        let mut trigger = RenderTrigger::new(FileRegion::new(&source), FileRegion::new(&preview));
        trigger.on_load().unwrap();

        assert_eq!(
            std::fs::read_to_string(&preview).unwrap(),
            "<h2>Files</h2>\n\n<p><em>saved</em></p>"
        );
    }

    #[test]
    fn missing_source_file_fails_without_touching_preview() {
        let dir = create_test_dir();
        let preview = dir.path().join("page.html");
        let mut trigger = RenderTrigger::new(
            FileRegion::new(dir.path().join("missing.md")),
            FileRegion::new(&preview),
        );

        assert!(matches!(trigger.on_load(), Err(IoError::NotFound(_))));
        assert!(!preview.exists());
        assert_eq!(trigger.passes(), 0);
    }
}
