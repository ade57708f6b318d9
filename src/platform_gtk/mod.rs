//! GTK4 host for a [`PlotView`].
//!
//! The adapter only translates toolkit events and paints; all plot state
//! lives in the view. Redraws requested from other threads are picked up by a
//! frame-clock tick callback on the UI thread.

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;

use gtk4 as gtk;
use gtk::gdk;
use gtk::prelude::*;
use tracing::warn;

use crate::api::{PassOutcome, PlotView, RedrawState};
use crate::core::{ScreenPoint, ScreenRect};
use crate::interaction::{InputEvent, Key, Modifiers, MouseButton};
use crate::render::CairoBackend;

/// `DrawingArea` bound to a shared [`PlotView`].
#[derive(Debug, Clone)]
pub struct GtkPlotView {
    view: Arc<PlotView>,
    drawing_area: gtk::DrawingArea,
}

impl GtkPlotView {
    #[must_use]
    pub fn new(view: Arc<PlotView>) -> Self {
        let drawing_area = gtk::DrawingArea::new();
        drawing_area.set_hexpand(true);
        drawing_area.set_vexpand(true);
        drawing_area.set_focusable(true);

        let adapter = Self { view, drawing_area };
        adapter.connect_draw();
        adapter.connect_redraw_tick();
        adapter.connect_input();
        adapter
    }

    #[must_use]
    pub fn view(&self) -> &Arc<PlotView> {
        &self.view
    }

    #[must_use]
    pub fn widget(&self) -> &gtk::DrawingArea {
        &self.drawing_area
    }

    fn connect_draw(&self) {
        let view = Arc::clone(&self.view);
        self.drawing_area
            .set_draw_func(move |_area, context, width, height| {
                if width <= 0 || height <= 0 {
                    view.detach_surface();
                    return;
                }
                view.attach_surface(ScreenRect::new(0.0, 0.0, f64::from(width), f64::from(height)));
                let mut backend = CairoBackend::for_screen(context);
                if let PassOutcome::Faulted(err) = view.paint(&mut backend) {
                    warn!(error = %err, "gtk paint faulted");
                }
            });

        let view = Arc::clone(&self.view);
        self.drawing_area
            .connect_unrealize(move |_| view.detach_surface());
    }

    fn connect_redraw_tick(&self) {
        let view = Arc::clone(&self.view);
        self.drawing_area.add_tick_callback(move |area, _clock| {
            if view.redraw_state() == RedrawState::RedrawPending {
                area.queue_draw();
            }
            gtk::glib::ControlFlow::Continue
        });
    }

    fn connect_input(&self) {
        let pointer = Rc::new(Cell::new(ScreenPoint::default()));

        let click = gtk::GestureClick::new();
        click.set_button(0);
        {
            let view = Arc::clone(&self.view);
            let drawing_area = self.drawing_area.clone();
            click.connect_pressed(move |gesture, n_press, x, y| {
                drawing_area.grab_focus();
                let Some(button) = map_button(gesture.current_button()) else {
                    return;
                };
                view.handle_input(&InputEvent::MouseDown {
                    position: ScreenPoint::new(x, y),
                    button,
                    click_count: u8::try_from(n_press.max(1)).unwrap_or(u8::MAX),
                    modifiers: map_modifiers(gesture.current_event_state()),
                });
            });
        }
        {
            let view = Arc::clone(&self.view);
            click.connect_released(move |gesture, _n_press, x, y| {
                if let Some(button) = map_button(gesture.current_button()) {
                    view.handle_input(&InputEvent::MouseUp {
                        position: ScreenPoint::new(x, y),
                        button,
                    });
                }
            });
        }
        self.drawing_area.add_controller(click);

        let motion = gtk::EventControllerMotion::new();
        {
            let view = Arc::clone(&self.view);
            let pointer = Rc::clone(&pointer);
            motion.connect_motion(move |controller, x, y| {
                let position = ScreenPoint::new(x, y);
                pointer.set(position);
                view.handle_input(&InputEvent::MouseMove {
                    position,
                    modifiers: map_modifiers(controller.current_event_state()),
                });
            });
        }
        {
            let view = Arc::clone(&self.view);
            let pointer = Rc::clone(&pointer);
            motion.connect_enter(move |controller, x, y| {
                let position = ScreenPoint::new(x, y);
                pointer.set(position);
                view.handle_input(&InputEvent::MouseEnter {
                    position,
                    modifiers: map_modifiers(controller.current_event_state()),
                });
            });
        }
        {
            let view = Arc::clone(&self.view);
            motion.connect_leave(move |_| {
                view.handle_input(&InputEvent::MouseLeave);
            });
        }
        self.drawing_area.add_controller(motion);

        let scroll = gtk::EventControllerScroll::new(gtk::EventControllerScrollFlags::VERTICAL);
        {
            let view = Arc::clone(&self.view);
            scroll.connect_scroll(move |controller, _dx, dy| {
                let handled = view.handle_input(&InputEvent::MouseWheel {
                    position: pointer.get(),
                    delta: -dy,
                    modifiers: map_modifiers(controller.current_event_state()),
                });
                if handled {
                    gtk::glib::Propagation::Stop
                } else {
                    gtk::glib::Propagation::Proceed
                }
            });
        }
        self.drawing_area.add_controller(scroll);

        let keys = gtk::EventControllerKey::new();
        {
            let view = Arc::clone(&self.view);
            keys.connect_key_pressed(move |_, keyval, _keycode, state| {
                let Some(key) = map_key(keyval) else {
                    return gtk::glib::Propagation::Proceed;
                };
                let handled = view.handle_input(&InputEvent::KeyDown {
                    key,
                    modifiers: map_modifiers(state),
                });
                if handled {
                    gtk::glib::Propagation::Stop
                } else {
                    gtk::glib::Propagation::Proceed
                }
            });
        }
        self.drawing_area.add_controller(keys);
    }
}

fn map_button(button: u32) -> Option<MouseButton> {
    match button {
        gdk::BUTTON_PRIMARY => Some(MouseButton::Left),
        gdk::BUTTON_MIDDLE => Some(MouseButton::Middle),
        gdk::BUTTON_SECONDARY => Some(MouseButton::Right),
        _ => None,
    }
}

fn map_modifiers(state: gdk::ModifierType) -> Modifiers {
    Modifiers {
        shift: state.contains(gdk::ModifierType::SHIFT_MASK),
        control: state.contains(gdk::ModifierType::CONTROL_MASK),
        alt: state.contains(gdk::ModifierType::ALT_MASK),
    }
}

fn map_key(keyval: gdk::Key) -> Option<Key> {
    let key = match keyval {
        gdk::Key::Left | gdk::Key::KP_Left => Key::Left,
        gdk::Key::Right | gdk::Key::KP_Right => Key::Right,
        gdk::Key::Up | gdk::Key::KP_Up => Key::Up,
        gdk::Key::Down | gdk::Key::KP_Down => Key::Down,
        gdk::Key::Page_Up => Key::PageUp,
        gdk::Key::Page_Down => Key::PageDown,
        gdk::Key::Home | gdk::Key::KP_Home => Key::Home,
        gdk::Key::Escape => Key::Escape,
        gdk::Key::plus | gdk::Key::KP_Add => Key::Add,
        gdk::Key::minus | gdk::Key::KP_Subtract => Key::Subtract,
        other => Key::Char(other.to_unicode()?.to_ascii_lowercase()),
    };
    Some(key)
}
