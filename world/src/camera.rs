//! Camera rig: free follow while exploring and eased door transitions.

use std::time::Duration;

use glam::Vec2;
use trick_or_treat_core::{Bounds, Event, ViewBounds};
use trick_or_treat_system_sequencer::{duration_from_secs, smooth_step, Tween};

#[derive(Clone, Copy, Debug)]
struct Transition {
    from_position: Vec2,
    to_position: Vec2,
    from_zoom: f32,
    to_zoom: f32,
    move_span: Duration,
    zoom_span: Duration,
    tween: Tween,
}

/// Position, zoom and follow state of the single game camera.
#[derive(Debug)]
pub(crate) struct CameraRig {
    position: Vec2,
    zoom: f32,
    follow: bool,
    transition: Option<Transition>,
}

impl CameraRig {
    pub(crate) fn new(position: Vec2, zoom: f32) -> Self {
        Self {
            position,
            zoom,
            follow: true,
            transition: None,
        }
    }

    pub(crate) fn position(&self) -> Vec2 {
        self.position
    }

    pub(crate) fn zoom(&self) -> f32 {
        self.zoom
    }

    pub(crate) fn is_following(&self) -> bool {
        self.follow
    }

    pub(crate) fn is_transitioning(&self) -> bool {
        self.transition.is_some()
    }

    pub(crate) fn view(&self, aspect: f32) -> ViewBounds {
        ViewBounds {
            center: self.position,
            half_height: self.zoom,
            aspect,
        }
    }

    pub(crate) fn set_follow(&mut self, follow: bool, out: &mut Vec<Event>) {
        if self.follow == follow {
            return;
        }
        self.follow = follow;
        out.push(Event::CameraFollowChanged { enabled: follow });
    }

    /// Starts moving towards `position` and `zoom`, replacing any transition in flight.
    ///
    /// Position and zoom ease independently over their own durations; the
    /// transition completes once the longer of the two has elapsed.
    pub(crate) fn start_transition(
        &mut self,
        position: Vec2,
        zoom: f32,
        move_time: f32,
        zoom_time: f32,
        out: &mut Vec<Event>,
    ) {
        let move_span = duration_from_secs(move_time);
        let zoom_span = duration_from_secs(zoom_time);
        self.transition = Some(Transition {
            from_position: self.position,
            to_position: position,
            from_zoom: self.zoom,
            to_zoom: zoom,
            move_span,
            zoom_span,
            tween: Tween::new(move_span.max(zoom_span)),
        });
        out.push(Event::CameraTransitionStarted {
            target: position,
            zoom,
        });
    }

    /// Advances the active transition. Returns `true` on the tick it arrives.
    pub(crate) fn advance(&mut self, dt: Duration, out: &mut Vec<Event>) -> bool {
        let Some(transition) = self.transition.as_mut() else {
            return false;
        };

        let finished = transition.tween.advance(dt);
        if finished {
            self.position = transition.to_position;
            self.zoom = transition.to_zoom;
        } else {
            let k_move = smooth_step(transition.tween.fraction_over(transition.move_span));
            let k_zoom = smooth_step(transition.tween.fraction_over(transition.zoom_span));
            self.position = transition
                .from_position
                .lerp(transition.to_position, k_move);
            self.zoom = transition.from_zoom + (transition.to_zoom - transition.from_zoom) * k_zoom;
        }

        out.push(Event::CameraMoved {
            position: self.position,
            zoom: self.zoom,
        });

        if finished {
            self.transition = None;
            out.push(Event::CameraTransitionFinished);
        }
        finished
    }

    /// Eases towards `target` while following; idle during transitions.
    pub(crate) fn follow(&mut self, target: Vec2, smooth_speed: f32, dt: Duration, out: &mut Vec<Event>) {
        if !self.follow || self.transition.is_some() {
            return;
        }
        let factor = (smooth_speed * dt.as_secs_f32()).clamp(0.0, 1.0);
        let next = self.position.lerp(target, factor);
        if next == self.position {
            return;
        }
        self.position = next;
        out.push(Event::CameraMoved {
            position: self.position,
            zoom: self.zoom,
        });
    }

    /// Jumps straight to `position` and `zoom`, dropping any transition.
    pub(crate) fn snap(&mut self, position: Vec2, zoom: f32, out: &mut Vec<Event>) {
        self.transition = None;
        self.position = position;
        self.zoom = zoom;
        out.push(Event::CameraMoved { position, zoom });
    }
}

/// Moves `center` so a view of the given zoom and aspect stays inside `bounds`.
///
/// On an axis where the view is wider than the bounds the view is centred on them.
pub(crate) fn keep_view_inside(center: Vec2, zoom: f32, aspect: f32, bounds: Bounds) -> Vec2 {
    let half = Vec2::new(zoom * aspect, zoom);
    let axis = |value: f32, lo: f32, hi: f32| {
        if lo <= hi {
            value.clamp(lo, hi)
        } else {
            (lo + hi) * 0.5
        }
    };
    Vec2::new(
        axis(center.x, bounds.min.x + half.x, bounds.max.x - half.x),
        axis(center.y, bounds.min.y + half.y, bounds.max.y - half.y),
    )
}
