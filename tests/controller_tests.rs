use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use plot_rs::core::{Axis, AxisPosition, DataPoint, LineSeries, ScreenPoint, ScreenRect};
use plot_rs::interaction::{
    BindingTableBuilder, CustomCommand, InputBinding, InputEvent, InputGesture, Key, Modifiers,
    MouseButton, PlotCommand, PlotController,
};
use plot_rs::render::{RecordingBackend, RenderTarget};
use plot_rs::{PlotModel, PlotView};

fn ready_view() -> PlotView {
    let model = PlotModel::new()
        .with_axis(Axis::linear(AxisPosition::Bottom).with_range(0.0, 100.0))
        .with_axis(Axis::linear(AxisPosition::Left).with_range(0.0, 100.0))
        .with_series(LineSeries::new(vec![
            DataPoint::new(10.0, 10.0),
            DataPoint::new(50.0, 80.0),
            DataPoint::new(90.0, 30.0),
        ]))
        .into_shared();
    let view = PlotView::new();
    view.set_model(Some(model)).expect("attach model");
    view.attach_surface(ScreenRect::new(0.0, 0.0, 640.0, 480.0));
    let mut backend = RecordingBackend::new(RenderTarget::ScreenRaster);
    view.render_pending(&mut backend);
    view
}

fn ranges(view: &PlotView) -> ((f64, f64), (f64, f64)) {
    let model = view.model().expect("model");
    let model = model.read();
    (model.axes()[0].actual_range(), model.axes()[1].actual_range())
}

fn screen_of(view: &PlotView, x: f64, y: f64) -> ScreenPoint {
    let model = view.model().expect("model");
    let model = model.read();
    ScreenPoint::new(model.axes()[0].transform(x), model.axes()[1].transform(y))
}

fn wheel(position: ScreenPoint, delta: f64) -> InputEvent {
    InputEvent::MouseWheel {
        position,
        delta,
        modifiers: Modifiers::NONE,
    }
}

fn moved(position: ScreenPoint) -> InputEvent {
    InputEvent::MouseMove {
        position,
        modifiers: Modifiers::NONE,
    }
}

#[test]
fn wheel_zooms_around_the_pointer() {
    let view = ready_view();
    let anchor = screen_of(&view, 25.0, 75.0);

    assert!(view.handle_input(&wheel(anchor, 1.0)));

    let ((x_min, x_max), (y_min, y_max)) = ranges(&view);
    assert_relative_eq!(x_max - x_min, 100.0 / 1.2, epsilon = 1e-9);
    assert_relative_eq!(y_max - y_min, 100.0 / 1.2, epsilon = 1e-9);
    let model = view.model().expect("model");
    assert_relative_eq!(model.read().axes()[0].inverse_transform(anchor.x), 25.0, epsilon = 1e-9);

    assert!(view.handle_input(&wheel(anchor, -1.0)));
    let ((x_min, x_max), _) = ranges(&view);
    assert_relative_eq!(x_min, 0.0, epsilon = 1e-9);
    assert_relative_eq!(x_max, 100.0, epsilon = 1e-9);
}

#[test]
fn control_wheel_zooms_finely() {
    let view = ready_view();
    let anchor = screen_of(&view, 50.0, 50.0);

    let event = InputEvent::MouseWheel {
        position: anchor,
        delta: 1.0,
        modifiers: Modifiers::CONTROL,
    };
    assert!(view.handle_input(&event));

    let ((x_min, x_max), _) = ranges(&view);
    assert_relative_eq!(x_max - x_min, 100.0 / 1.05, epsilon = 1e-9);
}

#[test]
fn right_drag_pans_with_the_pointer() {
    let view = ready_view();
    let start = screen_of(&view, 50.0, 50.0);
    let end = ScreenPoint::new(start.x + 64.0, start.y);

    assert!(view.handle_input(&InputEvent::mouse_down(start, MouseButton::Right)));
    assert!(view.with_controller(|controller| controller.is_manipulating()));
    assert!(view.handle_input(&moved(ScreenPoint::new(start.x + 32.0, start.y))));
    assert!(view.handle_input(&InputEvent::MouseUp {
        position: end,
        button: MouseButton::Right,
    }));
    assert!(!view.with_controller(|controller| controller.is_manipulating()));

    // The value grabbed at the start now sits under the release point.
    let model = view.model().expect("model");
    assert_relative_eq!(model.read().axes()[0].inverse_transform(end.x), 50.0, epsilon = 1e-9);
    let (_, (y_min, y_max)) = ranges(&view);
    assert_eq!((y_min, y_max), (0.0, 100.0));
}

#[test]
fn release_of_another_button_keeps_the_drag_running() {
    let view = ready_view();
    let start = screen_of(&view, 50.0, 50.0);

    assert!(view.handle_input(&InputEvent::mouse_down(start, MouseButton::Right)));
    assert!(!view.handle_input(&InputEvent::MouseUp {
        position: start,
        button: MouseButton::Left,
    }));
    assert!(view.with_controller(|controller| controller.is_manipulating()));
}

#[test]
fn left_press_tracks_until_release() {
    let view = ready_view();
    let near = screen_of(&view, 50.0, 80.0);

    assert!(view.handle_input(&InputEvent::mouse_down(near, MouseButton::Left)));
    let hit = view.tracker().expect("tracker shown");
    assert_eq!(hit.data, DataPoint::new(50.0, 80.0));

    let other = screen_of(&view, 90.0, 30.0);
    assert!(view.handle_input(&moved(other)));
    assert_eq!(view.tracker().expect("tracker moved").item_index, 2);

    assert!(view.handle_input(&InputEvent::MouseUp {
        position: other,
        button: MouseButton::Left,
    }));
    assert!(view.tracker().is_none());
}

#[test]
fn arrow_keys_pan_by_a_fraction_of_the_plot_area() {
    let view = ready_view();

    assert!(view.handle_input(&InputEvent::key_down(Key::Left)));
    let ((x_min, x_max), _) = ranges(&view);
    assert_relative_eq!(x_min, 10.0, epsilon = 1e-9);
    assert_relative_eq!(x_max, 110.0, epsilon = 1e-9);

    assert!(view.handle_input(&InputEvent::KeyDown {
        key: Key::Up,
        modifiers: Modifiers::CONTROL,
    }));
    let (_, (y_min, _)) = ranges(&view);
    assert_relative_eq!(y_min, -1.0, epsilon = 1e-9);

    assert!(view.handle_input(&InputEvent::key_down(Key::Home)));
    assert_eq!(ranges(&view), ((0.0, 100.0), (0.0, 100.0)));
}

#[test]
fn plus_and_minus_keys_zoom_about_the_center() {
    let view = ready_view();

    assert!(view.handle_input(&InputEvent::key_down(Key::Add)));
    let ((x_min, x_max), _) = ranges(&view);
    assert_relative_eq!((x_min + x_max) * 0.5, 50.0, epsilon = 1e-9);
    assert_relative_eq!(x_max - x_min, 100.0 / 1.2, epsilon = 1e-9);

    assert!(view.handle_input(&InputEvent::key_down(Key::Subtract)));
    let ((x_min, x_max), _) = ranges(&view);
    assert_relative_eq!(x_max - x_min, 100.0, epsilon = 1e-9);
}

#[test]
fn double_middle_click_resets_axes() {
    let view = ready_view();
    view.zoom_by(3.0);
    assert!(ranges(&view).0 != (0.0, 100.0));

    let single = InputEvent::mouse_down(ScreenPoint::new(100.0, 100.0), MouseButton::Middle);
    assert!(!view.handle_input(&single));

    let double = InputEvent::MouseDown {
        position: ScreenPoint::new(100.0, 100.0),
        button: MouseButton::Middle,
        click_count: 2,
        modifiers: Modifiers::NONE,
    };
    assert!(view.handle_input(&double));
    assert_eq!(ranges(&view).0, (0.0, 100.0));
}

#[test]
fn unbound_events_are_not_consumed() {
    let view = ready_view();

    assert!(!view.handle_input(&moved(ScreenPoint::new(10.0, 10.0))));
    assert!(!view.handle_input(&InputEvent::MouseUp {
        position: ScreenPoint::new(10.0, 10.0),
        button: MouseButton::Left,
    }));
    assert!(!view.handle_input(&InputEvent::MouseLeave));
    assert!(!view.handle_input(&InputEvent::key_down(Key::Char('q'))));
}

#[test]
fn bindings_are_per_controller() {
    let first = ready_view();
    let second = ready_view();
    first.with_controller(|controller| {
        controller.unbind(InputGesture::MouseWheel, Modifiers::NONE);
    });
    let anchor = screen_of(&first, 50.0, 50.0);

    assert!(!first.handle_input(&wheel(anchor, 1.0)));
    assert_eq!(ranges(&first).0, (0.0, 100.0));

    assert!(second.handle_input(&wheel(anchor, 1.0)));
    assert!(ranges(&second).0 != (0.0, 100.0));
    assert!(
        PlotController::new()
            .bindings()
            .get(&InputBinding::new(InputGesture::MouseWheel, Modifiers::NONE))
            .is_some()
    );
}

#[test]
fn custom_commands_receive_view_and_event() {
    let view = ready_view();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let command = CustomCommand::new(move |view, _controller, event| {
        counter.fetch_add(1, Ordering::SeqCst);
        assert!(matches!(event, InputEvent::KeyDown { key: Key::Char('z'), .. }));
        view.zoom_by(2.0);
        true
    });
    view.with_controller(|controller| {
        controller.bind(
            InputGesture::KeyDown(Key::Char('z')),
            Modifiers::NONE,
            PlotCommand::Custom(command),
        );
    });

    assert!(view.handle_input(&InputEvent::key_down(Key::Char('z'))));

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    let ((x_min, x_max), _) = ranges(&view);
    assert_relative_eq!(x_max - x_min, 50.0, epsilon = 1e-9);
}

#[test]
fn hover_tracking_follows_the_pointer_until_leave() {
    let view = ready_view();
    let controller = PlotController::with_bindings(
        BindingTableBuilder::new()
            .bind(InputGesture::MouseEnter, Modifiers::NONE, PlotCommand::HoverTrack)
            .build(),
    );
    view.set_controller(controller);
    let near = screen_of(&view, 10.0, 10.0);

    assert!(view.handle_input(&InputEvent::MouseEnter {
        position: near,
        modifiers: Modifiers::NONE,
    }));
    assert_eq!(view.tracker().expect("hover hit").item_index, 0);

    assert!(view.handle_input(&moved(screen_of(&view, 50.0, 80.0))));
    assert_eq!(view.tracker().expect("hover hit").item_index, 1);

    assert!(view.handle_input(&InputEvent::MouseLeave));
    assert!(view.tracker().is_none());

    // Wheel is not bound on this controller.
    assert!(!view.handle_input(&wheel(near, 1.0)));
}
