use tracing::debug;

use crate::{
    problem::{distance_type::DistanceType, route_chain::RouteError, routing_solution::RoutingSolution},
    render::{
        color::Color,
        route_renderer::{CameraFrame, Marker, RenderedSolution, RouteLabel, RouteRenderer, Segment},
    },
};

/// A map widget able to show markers and colored directed segments.
pub trait MapSurface {
    fn clear(&mut self);

    fn add_marker(&mut self, marker: &Marker);

    fn frame_camera(&mut self, camera: &CameraFrame);

    fn add_segment(&mut self, segment: &Segment, color: &Color);

    fn add_label(&mut self, _label: &RouteLabel, _color: &Color) {}
}

/// Draws a whole scene, replacing whatever the surface showed before.
pub fn draw<M: MapSurface + ?Sized>(surface: &mut M, rendered: &RenderedSolution) {
    surface.clear();

    for marker in &rendered.markers {
        surface.add_marker(marker);
    }
    if let Some(camera) = &rendered.camera {
        surface.frame_camera(camera);
    }
    for route in &rendered.routes {
        for segment in &route.segments {
            surface.add_segment(segment, &route.color);
        }
        if let Some(label) = &route.label {
            surface.add_label(label, &route.color);
        }
    }
}

/// Custom view for problems without geographic coordinates. It receives the
/// raw solution and walks the route chains itself.
pub trait PlanarView {
    fn show_solution(&mut self, solution: &RoutingSolution) -> Result<(), RouteError>;
}

/// Holds the latest scene until the map surface becomes available.
pub struct DeferredMap<M> {
    surface: Option<M>,
    pending: Option<RenderedSolution>,
}

impl<M> Default for DeferredMap<M> {
    fn default() -> Self {
        Self {
            surface: None,
            pending: None,
        }
    }
}

impl<M: MapSurface> DeferredMap<M> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_ready(&self) -> bool {
        self.surface.is_some()
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Attaches the surface and draws the scene that arrived before it.
    pub fn on_ready(&mut self, mut surface: M) {
        if let Some(rendered) = self.pending.take() {
            debug!("map ready, drawing buffered solution");
            draw(&mut surface, &rendered);
        }
        self.surface = Some(surface);
    }

    pub fn show(&mut self, rendered: RenderedSolution) {
        match &mut self.surface {
            Some(surface) => draw(surface, &rendered),
            // Only the newest scene matters, older ones are dropped.
            None => self.pending = Some(rendered),
        }
    }

    pub fn surface(&self) -> Option<&M> {
        self.surface.as_ref()
    }

    pub fn into_surface(self) -> Option<M> {
        self.surface
    }
}

/// Routes a solution to the map or to the planar view depending on its
/// distance type.
pub struct Viewport<M, P> {
    renderer: RouteRenderer,
    map: DeferredMap<M>,
    planar: P,
}

impl<M: MapSurface, P: PlanarView> Viewport<M, P> {
    pub fn new(renderer: RouteRenderer, planar: P) -> Self {
        Self {
            renderer,
            map: DeferredMap::new(),
            planar,
        }
    }

    pub fn show(&mut self, solution: &RoutingSolution) -> Result<(), RouteError> {
        match solution.distance_type() {
            DistanceType::Road => {
                let rendered = self.renderer.render(solution)?;
                self.map.show(rendered);
                Ok(())
            }
            DistanceType::Planar => self.planar.show_solution(solution),
        }
    }

    pub fn map(&self) -> &DeferredMap<M> {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut DeferredMap<M> {
        &mut self.map
    }

    pub fn planar(&self) -> &P {
        &self.planar
    }

    pub fn into_parts(self) -> (DeferredMap<M>, P) {
        (self.map, self.planar)
    }
}
