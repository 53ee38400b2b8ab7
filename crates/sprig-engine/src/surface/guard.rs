use core::ops::{Deref, DerefMut};

use super::Surface;

/// Scoped `save`/`restore` pair.
///
/// Creating the guard saves the surface state; dropping it restores, on every
/// exit path including early returns and unwinding.
///
/// ```ignore
/// let mut s = SurfaceGuard::new(surface);
/// s.translate(10.0, 0.0);
/// s.set_global_alpha(0.5);
/// // state restored here
/// ```
pub struct SurfaceGuard<'a> {
    surface: &'a mut dyn Surface,
}

impl<'a> SurfaceGuard<'a> {
    pub fn new(surface: &'a mut dyn Surface) -> Self {
        surface.save();
        Self { surface }
    }
}

impl<'a> Deref for SurfaceGuard<'a> {
    type Target = dyn Surface + 'a;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl<'a> DerefMut for SurfaceGuard<'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl Drop for SurfaceGuard<'_> {
    fn drop(&mut self) {
        self.surface.restore();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::Affine;
    use crate::surface::{RecordingSurface, SurfaceOp};

    #[test]
    fn guard_brackets_calls_with_save_restore() {
        let mut rec = RecordingSurface::new(16, 16);
        {
            let mut s = SurfaceGuard::new(&mut rec);
            s.translate(3.0, 4.0);
        }
        assert_eq!(
            rec.ops(),
            &[
                SurfaceOp::Save,
                SurfaceOp::Translate { dx: 3.0, dy: 4.0 },
                SurfaceOp::Restore,
            ]
        );
        assert_eq!(rec.current_transform(), Affine::IDENTITY);
    }

    #[test]
    fn guard_restores_on_early_return() {
        fn draw(surface: &mut dyn Surface, bail: bool) -> Option<()> {
            let mut s = SurfaceGuard::new(surface);
            s.set_global_alpha(0.25);
            if bail {
                return None;
            }
            s.set_global_alpha(0.5);
            Some(())
        }

        let mut rec = RecordingSurface::new(4, 4);
        assert!(draw(&mut rec, true).is_none());
        assert_eq!(rec.ops().last(), Some(&SurfaceOp::Restore));
        assert_eq!(rec.current_alpha(), 1.0);
        assert_eq!(rec.depth(), 0);
    }
}
