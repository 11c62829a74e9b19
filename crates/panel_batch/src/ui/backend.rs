//! UI Render Backend Trait
//!
//! Defines the interface between the batcher and rendering backends.
//! Draw calls arrive fully built; the backend only uploads and draws.

use super::context::UIContext;
use super::draw_call::DrawCall;
use crate::foundation::collections::DrawCallId;

/// Errors reported by a rendering backend
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// Submission outside `begin_ui_pass` / `end_ui_pass`
    #[error("Draw call submitted outside a UI pass")]
    NotInPass,

    /// Vertex or index upload failed
    #[error("Upload failed: {0}")]
    Upload(String),

    /// General rendering errors from the graphics API
    #[error("Rendering error: {0}")]
    Rendering(String),
}

/// Backend-agnostic draw call consumer
pub trait UIRenderBackend {
    /// Begin UI rendering pass
    fn begin_ui_pass(&mut self) -> Result<(), BackendError>;

    /// Draw one batched call
    fn submit_draw_call(&mut self, id: DrawCallId, draw_call: &DrawCall) -> Result<(), BackendError>;

    /// End UI rendering pass
    fn end_ui_pass(&mut self) -> Result<(), BackendError>;
}

impl UIContext {
    /// Submit every live draw call in panel depth order, then draw-call
    /// depth order. Render queue numbers travel with each call for the
    /// backend to use. Returns the number of calls submitted.
    pub fn render(&self, backend: &mut dyn UIRenderBackend) -> Result<usize, BackendError> {
        backend.begin_ui_pass()?;
        let mut submitted = 0;
        for (id, dc) in self.draw_calls() {
            backend.submit_draw_call(id, dc)?;
            submitted += 1;
        }
        backend.end_ui_pass()?;

        Ok(submitted)
    }
}

/// Backend that records submissions and logs them instead of drawing
#[derive(Debug, Default)]
pub struct LoggingBackend {
    in_pass: bool,
    /// Calls submitted during the last pass: (render queue, vertex count, widget count)
    pub submitted: Vec<(i32, usize, usize)>,
    /// Bytes that would have been uploaded during the last pass
    pub uploaded_bytes: usize,
}

impl LoggingBackend {
    /// Create an idle backend
    pub fn new() -> Self {
        Self::default()
    }
}

impl UIRenderBackend for LoggingBackend {
    fn begin_ui_pass(&mut self) -> Result<(), BackendError> {
        self.in_pass = true;
        self.submitted.clear();
        self.uploaded_bytes = 0;
        Ok(())
    }

    fn submit_draw_call(&mut self, id: DrawCallId, draw_call: &DrawCall) -> Result<(), BackendError> {
        if !self.in_pass {
            return Err(BackendError::NotInPass);
        }
        let bytes = draw_call.upload_bytes();
        log::debug!(
            "Draw call {:?}: queue {} depth [{}, {}] {} vertices ({} bytes) clip {:?}",
            id,
            draw_call.render_queue(),
            draw_call.depth_start(),
            draw_call.depth_end(),
            draw_call.vertex_count(),
            bytes.len(),
            draw_call.clipping()
        );
        self.uploaded_bytes += bytes.len();
        self.submitted
            .push((draw_call.render_queue(), draw_call.vertex_count(), draw_call.widget_count()));
        Ok(())
    }

    fn end_ui_pass(&mut self) -> Result<(), BackendError> {
        if !self.in_pass {
            return Err(BackendError::NotInPass);
        }
        self.in_pass = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::BatcherConfig;
    use crate::ui::clipping::RenderQueueMode;
    use crate::ui::material::MaterialId;
    use crate::ui::panel::Panel;
    use crate::ui::scene::IdentityScene;
    use crate::ui::vertex::UIVertex;
    use crate::ui::widget::Widget;

    #[test]
    fn test_render_follows_panel_then_call_depth() {
        let mut ui = UIContext::new(BatcherConfig::default());
        let back = ui.add_panel(Panel::new().with_depth(0));
        let front = ui.add_panel(Panel::new().with_depth(1).with_render_queue(RenderQueueMode::StartAt, 2000));

        ui.add_widget(Widget::new(back, 0).with_material(MaterialId(1))).unwrap();
        ui.add_widget(Widget::new(front, 0).with_material(MaterialId(1))).unwrap();
        ui.add_widget(Widget::new(front, 1).with_material(MaterialId(2))).unwrap();
        ui.update(&IdentityScene, 0.0);

        let mut backend = LoggingBackend::new();
        assert_eq!(ui.render(&mut backend).unwrap(), 3);

        let queues: Vec<i32> = backend.submitted.iter().map(|s| s.0).collect();
        // The front panel's low starting queue does not pull it ahead
        assert_eq!(queues, vec![3000, 2000, 2001]);
        assert_eq!(backend.uploaded_bytes, 12 * std::mem::size_of::<UIVertex>());
    }

    #[test]
    fn test_submit_outside_pass_fails() {
        let mut backend = LoggingBackend::new();
        assert!(matches!(backend.end_ui_pass(), Err(BackendError::NotInPass)));
    }
}
