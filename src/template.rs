use crate::models::{Segment, Token};
use crate::slug::placeholder;

/// Editable template: literal text interleaved with token bubbles.
///
/// Editing happens at the end of the buffer, a bubble is removed as a whole.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct TemplateBuffer {
    pub(crate) segments: Vec<Segment>,
}

impl TemplateBuffer {
    pub(crate) fn from_text(text: &str) -> Self {
        let mut buffer = Self::default();
        buffer.push_str(text);
        buffer
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.segments.iter().all(|segment| match segment {
            Segment::Text(text) => text.is_empty(),
            Segment::Bubble { .. } => false,
        })
    }

    pub(crate) fn push_char(&mut self, ch: char) {
        match self.segments.last_mut() {
            Some(Segment::Text(text)) => text.push(ch),
            _ => self.segments.push(Segment::Text(ch.to_string())),
        }
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        if s.is_empty() {
            return;
        }
        match self.segments.last_mut() {
            Some(Segment::Text(text)) => text.push_str(s),
            _ => self.segments.push(Segment::Text(s.to_string())),
        }
    }

    pub(crate) fn backspace(&mut self) {
        let Some(last) = self.segments.last_mut() else {
            return;
        };
        match last {
            Segment::Text(text) => {
                text.pop();
                if text.is_empty() {
                    self.segments.pop();
                }
            }
            Segment::Bubble { .. } => {
                self.segments.pop();
            }
        }
    }

    /// Appends a bubble for `token_id` followed by a space.
    pub(crate) fn insert_bubble(&mut self, token_id: &str) {
        self.segments.push(Segment::Bubble {
            token_id: token_id.to_string(),
        });
        self.segments.push(Segment::Text(" ".to_string()));
    }

    pub(crate) fn remove_bubbles(&mut self, token_id: &str) {
        self.segments.retain(|segment| match segment {
            Segment::Bubble { token_id: id } => id != token_id,
            Segment::Text(_) => true,
        });
        self.merge_text();
    }

    /// Produces the plain template string, each bubble replaced by the
    /// current placeholder of its token.
    pub(crate) fn flatten(&self, tokens: &[Token]) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Bubble { token_id } => {
                    if let Some(token) = tokens.iter().find(|token| token.id == *token_id) {
                        out.push_str(&placeholder(&token.name));
                    }
                }
            }
        }
        out
    }

    fn merge_text(&mut self) {
        let mut merged: Vec<Segment> = Vec::with_capacity(self.segments.len());
        for segment in self.segments.drain(..) {
            if let (Some(Segment::Text(prev)), Segment::Text(text)) = (merged.last_mut(), &segment) {
                prev.push_str(text);
                continue;
            }
            merged.push(segment);
        }
        self.segments = merged;
    }
}
