use core::fmt;
use core::str::FromStr;

use crate::error::EngineError;

/// Compositing operation used when drawing onto a surface.
///
/// Names follow the canvas `globalCompositeOperation` vocabulary; `"normal"`
/// is accepted as an alias for `source-over`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default)]
pub enum BlendMode {
    #[default]
    SourceOver,
    DestinationOver,
    Copy,
    /// Additive.
    Lighter,
    Xor,
    Multiply,
    Screen,
    Overlay,
    Darken,
    Lighten,
}

impl BlendMode {
    pub const ALL: [BlendMode; 10] = [
        BlendMode::SourceOver,
        BlendMode::DestinationOver,
        BlendMode::Copy,
        BlendMode::Lighter,
        BlendMode::Xor,
        BlendMode::Multiply,
        BlendMode::Screen,
        BlendMode::Overlay,
        BlendMode::Darken,
        BlendMode::Lighten,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            BlendMode::SourceOver => "source-over",
            BlendMode::DestinationOver => "destination-over",
            BlendMode::Copy => "copy",
            BlendMode::Lighter => "lighter",
            BlendMode::Xor => "xor",
            BlendMode::Multiply => "multiply",
            BlendMode::Screen => "screen",
            BlendMode::Overlay => "overlay",
            BlendMode::Darken => "darken",
            BlendMode::Lighten => "lighten",
        }
    }

    /// Composites straight-alpha `src` over straight-alpha `dst`.
    ///
    /// Channels are in `[0, 1]`; `src[3]` must already include global alpha.
    /// Returns straight alpha.
    pub(crate) fn composite(self, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
        let sa = src[3];
        let da = dst[3];

        let (rgb_premul, alpha): ([f32; 3], f32) = match self {
            BlendMode::Copy => (premul(src), sa),
            BlendMode::DestinationOver => {
                let (s, d) = (premul(src), premul(dst));
                (
                    core::array::from_fn(|i| d[i] + s[i] * (1.0 - da)),
                    da + sa * (1.0 - da),
                )
            }
            BlendMode::Lighter => {
                let (s, d) = (premul(src), premul(dst));
                (
                    core::array::from_fn(|i| (s[i] + d[i]).min(1.0)),
                    (sa + da).min(1.0),
                )
            }
            BlendMode::Xor => {
                let (s, d) = (premul(src), premul(dst));
                (
                    core::array::from_fn(|i| s[i] * (1.0 - da) + d[i] * (1.0 - sa)),
                    sa * (1.0 - da) + da * (1.0 - sa),
                )
            }
            separable => {
                let (s, d) = (premul(src), premul(dst));
                (
                    core::array::from_fn(|i| {
                        s[i] * (1.0 - da)
                            + d[i] * (1.0 - sa)
                            + sa * da * separable.mix(src[i], dst[i])
                    }),
                    sa + da - sa * da,
                )
            }
        };

        if alpha <= 0.0 {
            return [0.0; 4];
        }

        let inv = 1.0 / alpha;
        [
            (rgb_premul[0] * inv).clamp(0.0, 1.0),
            (rgb_premul[1] * inv).clamp(0.0, 1.0),
            (rgb_premul[2] * inv).clamp(0.0, 1.0),
            alpha.clamp(0.0, 1.0),
        ]
    }

    /// Separable blend function `B(cs, cd)`.
    fn mix(self, cs: f32, cd: f32) -> f32 {
        match self {
            BlendMode::Multiply => cs * cd,
            BlendMode::Screen => cs + cd - cs * cd,
            BlendMode::Overlay => {
                if cd <= 0.5 {
                    2.0 * cs * cd
                } else {
                    1.0 - 2.0 * (1.0 - cs) * (1.0 - cd)
                }
            }
            BlendMode::Darken => cs.min(cd),
            BlendMode::Lighten => cs.max(cd),
            _ => cs,
        }
    }
}

#[inline]
fn premul(c: [f32; 4]) -> [f32; 3] {
    [c[0] * c[3], c[1] * c[3], c[2] * c[3]]
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("normal") {
            return Ok(BlendMode::SourceOver);
        }
        BlendMode::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| EngineError::UnknownBlendMode(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 4], b: [f32; 4]) -> bool {
        a.iter().zip(b).all(|(x, y)| (x - y).abs() < 1e-4)
    }

    const RED: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
    const BLUE: [f32; 4] = [0.0, 0.0, 1.0, 1.0];
    const CLEAR: [f32; 4] = [0.0; 4];

    // ── names ─────────────────────────────────────────────────────────────

    #[test]
    fn names_parse_back() {
        for mode in BlendMode::ALL {
            assert_eq!(mode.as_str().parse::<BlendMode>().unwrap(), mode);
        }
        assert_eq!("normal".parse::<BlendMode>().unwrap(), BlendMode::SourceOver);
        assert!(matches!(
            "hue-ish".parse::<BlendMode>(),
            Err(EngineError::UnknownBlendMode(_))
        ));
    }

    // ── porter-duff ───────────────────────────────────────────────────────

    #[test]
    fn source_over_opaque_replaces() {
        assert!(close(BlendMode::SourceOver.composite(RED, BLUE), RED));
    }

    #[test]
    fn source_over_half_alpha_mixes() {
        let half_red = [1.0, 0.0, 0.0, 0.5];
        assert!(close(
            BlendMode::SourceOver.composite(half_red, BLUE),
            [0.5, 0.0, 0.5, 1.0]
        ));
    }

    #[test]
    fn source_over_onto_transparent_keeps_source() {
        let src = [0.2, 0.4, 0.6, 0.5];
        assert!(close(BlendMode::SourceOver.composite(src, CLEAR), src));
    }

    #[test]
    fn destination_over_keeps_opaque_destination() {
        assert!(close(BlendMode::DestinationOver.composite(RED, BLUE), BLUE));
    }

    #[test]
    fn copy_ignores_destination() {
        let src = [0.0, 1.0, 0.0, 0.25];
        assert!(close(BlendMode::Copy.composite(src, BLUE), src));
    }

    #[test]
    fn xor_of_two_opaque_is_empty() {
        assert!(close(BlendMode::Xor.composite(RED, BLUE), CLEAR));
    }

    #[test]
    fn lighter_adds_and_saturates() {
        let grey = [0.6, 0.6, 0.6, 1.0];
        assert!(close(BlendMode::Lighter.composite(grey, grey), [1.0, 1.0, 1.0, 1.0]));
    }

    // ── separable ─────────────────────────────────────────────────────────

    #[test]
    fn multiply_and_screen() {
        let a = [0.5, 0.5, 0.5, 1.0];
        assert!(close(BlendMode::Multiply.composite(a, a), [0.25, 0.25, 0.25, 1.0]));
        assert!(close(BlendMode::Screen.composite(a, a), [0.75, 0.75, 0.75, 1.0]));
    }

    #[test]
    fn darken_lighten_pick_per_channel() {
        let a = [0.2, 0.8, 0.5, 1.0];
        let b = [0.6, 0.1, 0.5, 1.0];
        assert!(close(BlendMode::Darken.composite(a, b), [0.2, 0.1, 0.5, 1.0]));
        assert!(close(BlendMode::Lighten.composite(a, b), [0.6, 0.8, 0.5, 1.0]));
    }

    #[test]
    fn separable_over_transparent_is_source() {
        let src = [0.3, 0.6, 0.9, 1.0];
        for mode in [BlendMode::Multiply, BlendMode::Overlay, BlendMode::Darken] {
            assert!(close(mode.composite(src, CLEAR), src), "{mode}");
        }
    }
}
