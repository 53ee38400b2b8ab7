//! Demo scene: a sky backdrop, orbiting discs and spinning checkers.

use std::f32::consts::TAU;
use std::path::Path;
use std::time::Duration;

use sprig_engine::surface::{RasterSurface, Surface};
use sprig_engine::{BlendMode, Drawable, Scheduler, Sprite};

use crate::textures;

/// Circular path around a fixed center.
#[derive(Debug, Copy, Clone)]
pub struct Orbit {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    /// Turns per second.
    pub speed: f32,
    pub phase: f32,
}

impl Orbit {
    fn position(&self, t: f32) -> (f32, f32) {
        let a = self.phase + t * self.speed * TAU;
        (self.cx + self.radius * a.cos(), self.cy + self.radius * a.sin())
    }
}

/// A sprite plus the motion the demo applies to it each frame.
#[derive(Debug, Clone)]
pub struct Actor {
    pub sprite: Sprite,
    /// Degrees per second.
    pub spin: f32,
    pub orbit: Option<Orbit>,
    /// Seconds this actor has been animated.
    age: f32,
}

impl Actor {
    pub fn new(sprite: Sprite) -> Self {
        Self {
            sprite,
            spin: 0.0,
            orbit: None,
            age: 0.0,
        }
    }

    fn spinning(mut self, deg_per_sec: f32) -> Self {
        self.spin = deg_per_sec;
        self
    }

    fn orbiting(mut self, orbit: Orbit) -> Self {
        self.orbit = Some(orbit);
        self
    }

    pub fn advance(&mut self, dt: Duration) {
        let secs = dt.as_secs_f32();
        self.age += secs;
        self.sprite.rotate(self.spin * secs);
        if let Some(orbit) = self.orbit {
            let (x, y) = orbit.position(self.age);
            self.sprite.x = x;
            self.sprite.y = y;
        }
    }
}

impl Drawable for Actor {
    fn draw(&self, surface: &mut dyn Surface) {
        self.sprite.draw(surface);
    }

    fn prepare(&mut self) {
        self.sprite.prepare();
    }
}

fn centered(mut sprite: Sprite, x: f32, y: f32) -> Sprite {
    sprite.set_anchor(0.5, None);
    sprite.x = x;
    sprite.y = y;
    sprite
}

/// Builds the demo scheduler over `surface`.
///
/// Drawables added first end up on top, so the backdrop goes in last.
pub fn build(surface: RasterSurface, image: Option<&Path>) -> Scheduler<RasterSurface, Actor> {
    let (w, h) = (surface.width() as f32, surface.height() as f32);
    let (cx, cy) = (w / 2.0, h / 2.0);
    let mut scheduler = Scheduler::new(surface);

    if let Some(path) = image {
        log::info!("loading {}", path.display());
        let mut sprite = centered(Sprite::open(path), cx, cy);
        sprite.set_scale(0.5);
        scheduler.add_drawable(Actor::new(sprite).spinning(-20.0));
    }

    let palette = [[255, 196, 64], [90, 220, 255], [255, 96, 140]];
    for (i, rgb) in palette.into_iter().enumerate() {
        let mut sprite = centered(Sprite::from_texture(textures::disc(48, rgb)), cx, cy);
        sprite.blend = BlendMode::Lighter;
        sprite.opacity = 0.85;
        let orbit = Orbit {
            cx,
            cy,
            radius: h * 0.3,
            speed: 0.25,
            phase: i as f32 * TAU / 3.0,
        };
        scheduler.add_drawable(Actor::new(sprite).orbiting(orbit));
    }

    for (i, x) in [w * 0.2, w * 0.8].into_iter().enumerate() {
        let mut sprite = centered(
            Sprite::from_texture(textures::checker(64, 4, [240, 240, 240, 255], [40, 40, 40, 255])),
            x,
            cy,
        );
        sprite.stretch_y = 0.6;
        sprite.opacity = 0.9;
        let spin = if i == 0 { 45.0 } else { -90.0 };
        scheduler.add_drawable(Actor::new(sprite).spinning(spin));
    }

    let mut sky = Sprite::from_texture(textures::sky(surface_edge(w), surface_edge(h)));
    sky.blend = BlendMode::Copy;
    scheduler.add_drawable(Actor::new(sky));

    scheduler.add_tick_iter_function(|dt, actor: &mut Actor| actor.advance(dt));
    scheduler.add_tick_function(fps_reporter());

    scheduler
}

/// Logs the frame rate roughly once per second.
fn fps_reporter() -> impl FnMut(Duration) {
    let mut frames = 0u32;
    let mut window = Duration::ZERO;
    move |dt| {
        frames += 1;
        window += dt;
        if window >= Duration::from_secs(1) {
            log::debug!("{:.1} fps", frames as f32 / window.as_secs_f32());
            frames = 0;
            window = Duration::ZERO;
        }
    }
}

#[inline]
fn surface_edge(v: f32) -> u32 {
    v.max(1.0) as u32
}
