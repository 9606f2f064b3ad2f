use std::collections::BTreeMap;

use eframe::egui::{Color32, Pos2, Ui};
use egui_plot::{Line, MarkerShape, Plot, PlotBounds, PlotPoint, PlotPoints, Points};

use crate::data::model::ControlPoint;
use crate::session::{PointId, RenderSurface, SessionEvent, ViewLimits};
use crate::ui::scene::Scene;

const MARKER_COLOR: Color32 = Color32::RED;
const CONTINUUM_COLOR: Color32 = Color32::RED;

fn to_bounds(limits: ViewLimits) -> PlotBounds {
    PlotBounds::from_min_max([limits.x[0], limits.y[0]], [limits.x[1], limits.y[1]])
}

fn from_bounds(bounds: &PlotBounds) -> ViewLimits {
    let [x0, y0] = bounds.min();
    let [x1, y1] = bounds.max();
    ViewLimits::new([x0, x1], [y0, y1])
}

/// Marker closest to `pointer` on screen, if within `radius` pixels.
pub fn nearest_marker(
    markers: &BTreeMap<PointId, ControlPoint>,
    pointer: Pos2,
    radius: f32,
    to_screen: impl Fn(ControlPoint) -> Pos2,
) -> Option<PointId> {
    markers
        .iter()
        .map(|(&id, &point)| (id, to_screen(point).distance(pointer)))
        .filter(|&(_, d)| d <= radius)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(id, _)| id)
}

// ---------------------------------------------------------------------------
// Spectrum plot (upper panel)
// ---------------------------------------------------------------------------

/// Render the raw spectrum with markers and continuum, and translate the
/// pointer input it received into session events.
pub fn spectrum_plot(
    ui: &mut Ui,
    scene: &mut Scene,
    navigating: bool,
    pick_radius: f32,
) -> Vec<SessionEvent> {
    let mut events = Vec::new();
    if scene.spectrum().is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a spectrum to normalize  (File → Open…)");
        });
        return events;
    }

    let pending = scene.take_pending_view();
    let spectrum_color = ui.visuals().text_color();

    let response = Plot::new("spectrum_plot")
        .x_axis_label("Wavelength")
        .y_axis_label("Flux")
        .allow_boxed_zoom(navigating)
        .allow_drag(navigating)
        .allow_zoom(navigating)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if let Some(limits) = pending {
                plot_ui.set_plot_bounds(to_bounds(limits));
            }

            plot_ui.line(
                Line::new(PlotPoints::new(scene.spectrum().to_vec()))
                    .color(spectrum_color)
                    .width(1.0),
            );

            if let Some(continuum) = scene.continuum() {
                plot_ui.line(
                    Line::new(PlotPoints::new(continuum.to_vec()))
                        .color(CONTINUUM_COLOR)
                        .width(2.0),
                );
            }

            if !scene.markers().is_empty() {
                let markers: Vec<[f64; 2]> = scene.markers().values().map(|p| [p.x, p.y]).collect();
                plot_ui.points(
                    Points::new(PlotPoints::new(markers))
                        .shape(MarkerShape::Square)
                        .filled(true)
                        .radius(4.0)
                        .color(MARKER_COLOR),
                );
            }
        });

    let transform = response.transform;
    let plot = response.response;

    if pending.is_none() && scene.observe_view(from_bounds(transform.bounds())) {
        events.push(SessionEvent::ViewChanged(scene.view_limits()));
    }

    if let Some(pos) = plot.interact_pointer_pos() {
        if plot.clicked() {
            let x = transform.value_from_position(pos).x;
            events.push(SessionEvent::PrimaryClick { x, navigating });
        }
        if plot.secondary_clicked() {
            let picked = nearest_marker(scene.markers(), pos, pick_radius, |p| {
                transform.position_from_point(&PlotPoint::new(p.x, p.y))
            });
            if let Some(id) = picked {
                events.push(SessionEvent::SecondaryClickOnMarker(id));
            }
        }
    }
    if plot.middle_clicked() {
        events.push(SessionEvent::MiddleClick);
    }

    if plot.hovered() {
        let (dy, zooming) = ui.input(|i| (i.raw_scroll_delta.y, i.modifiers.ctrl || i.modifiers.command));
        if !zooming {
            if let Some(direction) = scene.accumulate_scroll(dy) {
                events.push(SessionEvent::Scroll(direction));
            }
        }
    }

    events
}

// ---------------------------------------------------------------------------
// Normalized plot (lower panel)
// ---------------------------------------------------------------------------

/// Render the normalized spectrum; its limits always follow the session.
pub fn normalized_plot(ui: &mut Ui, scene: &Scene) {
    let (Some(points), Some(limits)) = (scene.normalized(), scene.normalized_view()) else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.label("Middle click to fit the continuum through the selected points");
        });
        return;
    };

    let color = ui.visuals().text_color();
    Plot::new("normalized_plot")
        .x_axis_label("Wavelength")
        .y_axis_label("Normalized flux")
        .allow_boxed_zoom(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_double_click_reset(false)
        .show(ui, |plot_ui| {
            plot_ui.set_plot_bounds(to_bounds(limits));
            plot_ui.hline(egui_plot::HLine::new(1.0).color(Color32::GRAY).width(0.5));
            plot_ui.line(
                Line::new(PlotPoints::new(points.to_vec()))
                    .color(color)
                    .width(1.0),
            );
        });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ControlPointSet;

    #[test]
    fn picks_closest_marker_within_radius() {
        let mut set = ControlPointSet::new();
        let a = set.insert(ControlPoint::new(10.0, 0.0));
        let b = set.insert(ControlPoint::new(14.0, 0.0));
        let markers: BTreeMap<_, _> = set.iter().collect();
        let identity = |p: ControlPoint| Pos2::new(p.x as f32, p.y as f32);

        assert_eq!(nearest_marker(&markers, Pos2::new(11.0, 0.0), 8.0, identity), Some(a));
        assert_eq!(nearest_marker(&markers, Pos2::new(13.0, 1.0), 8.0, identity), Some(b));
        assert_eq!(nearest_marker(&markers, Pos2::new(40.0, 0.0), 8.0, identity), None);
    }

    #[test]
    fn bounds_conversion_keeps_limits() {
        let limits = ViewLimits::new([4000.0, 4100.0], [0.5, 1.5]);
        assert_eq!(from_bounds(&to_bounds(limits)), limits);
    }
}
