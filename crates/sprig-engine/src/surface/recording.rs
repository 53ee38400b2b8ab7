use crate::coords::{Affine, Rect};
use crate::texture::Texture;

use super::{BlendMode, Surface};

/// One recorded surface call.
///
/// Drawing calls carry the state that was active when they were issued, so
/// assertions do not need to replay the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    Save,
    Restore,
    SetTransform(Affine),
    Transform(Affine),
    Translate { dx: f32, dy: f32 },
    Rotate { radians: f32 },
    SetGlobalAlpha(f32),
    SetBlendMode(BlendMode),
    ClearRect {
        rect: Rect,
        transform: Affine,
    },
    DrawImage {
        image_width: u32,
        image_height: u32,
        src: Rect,
        dst: Rect,
        transform: Affine,
        alpha: f32,
        blend: BlendMode,
    },
}

#[derive(Debug, Copy, Clone)]
struct State {
    transform: Affine,
    alpha: f32,
    blend: BlendMode,
}

/// Surface that draws nothing and records everything.
#[derive(Debug, Clone)]
pub struct RecordingSurface {
    width: u32,
    height: u32,
    ops: Vec<SurfaceOp>,
    state: State,
    stack: Vec<State>,
}

impl RecordingSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
            state: State {
                transform: Affine::IDENTITY,
                alpha: 1.0,
                blend: BlendMode::SourceOver,
            },
            stack: Vec::new(),
        }
    }

    #[inline]
    pub fn ops(&self) -> &[SurfaceOp] {
        &self.ops
    }

    /// Drains the recorded ops, keeping the current state.
    pub fn take_ops(&mut self) -> Vec<SurfaceOp> {
        std::mem::take(&mut self.ops)
    }

    /// Recorded `DrawImage` ops only, in issue order.
    pub fn draws(&self) -> impl Iterator<Item = &SurfaceOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, SurfaceOp::DrawImage { .. }))
    }

    #[inline]
    pub fn current_transform(&self) -> Affine {
        self.state.transform
    }

    #[inline]
    pub fn current_alpha(&self) -> f32 {
        self.state.alpha
    }

    #[inline]
    pub fn current_blend(&self) -> BlendMode {
        self.state.blend
    }

    /// Number of unmatched `save` calls.
    #[inline]
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

impl Surface for RecordingSurface {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn save(&mut self) {
        self.stack.push(self.state);
        self.ops.push(SurfaceOp::Save);
    }

    fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
        self.ops.push(SurfaceOp::Restore);
    }

    fn set_transform(&mut self, m: Affine) {
        self.state.transform = m;
        self.ops.push(SurfaceOp::SetTransform(m));
    }

    fn transform(&mut self, m: Affine) {
        self.state.transform = self.state.transform * m;
        self.ops.push(SurfaceOp::Transform(m));
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform * Affine::translation(dx, dy);
        self.ops.push(SurfaceOp::Translate { dx, dy });
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform * Affine::rotation(radians);
        self.ops.push(SurfaceOp::Rotate { radians });
    }

    fn set_global_alpha(&mut self, alpha: f32) {
        if (0.0..=1.0).contains(&alpha) {
            self.state.alpha = alpha;
        }
        self.ops.push(SurfaceOp::SetGlobalAlpha(alpha));
    }

    fn set_blend_mode(&mut self, mode: BlendMode) {
        self.state.blend = mode;
        self.ops.push(SurfaceOp::SetBlendMode(mode));
    }

    fn clear_rect(&mut self, rect: Rect) {
        self.ops.push(SurfaceOp::ClearRect {
            rect,
            transform: self.state.transform,
        });
    }

    fn draw_image(&mut self, image: &Texture, src: Rect, dst: Rect) {
        self.ops.push(SurfaceOp::DrawImage {
            image_width: image.width(),
            image_height: image.height(),
            src,
            dst,
            transform: self.state.transform,
            alpha: self.state.alpha,
            blend: self.state.blend,
        });
    }
}
