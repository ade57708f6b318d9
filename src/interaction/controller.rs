use tracing::trace;

use crate::api::PlotView;
use crate::core::ScreenPoint;

use super::{
    BindingTable, InputBinding, InputEvent, InputGesture, Modifiers, MouseButton, PlotCommand,
};

/// Drag in progress, started by a bound mouse-down.
#[derive(Debug, Clone, Copy, PartialEq)]
enum Manipulation {
    Pan { button: MouseButton, last: ScreenPoint },
    Track { button: MouseButton },
}

impl Manipulation {
    fn button(self) -> MouseButton {
        match self {
            Self::Pan { button, .. } | Self::Track { button } => button,
        }
    }
}

/// Maps input events to plot commands through a [`BindingTable`].
///
/// Mouse-down bindings start a manipulation that receives the following
/// move events until the same button is released.
#[derive(Debug, Clone)]
pub struct PlotController {
    bindings: BindingTable,
    manipulation: Option<Manipulation>,
    hover_tracking: bool,
}

impl Default for PlotController {
    fn default() -> Self {
        Self::new()
    }
}

impl PlotController {
    /// Controller with the standard bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_bindings(BindingTable::defaults())
    }

    #[must_use]
    pub fn with_bindings(bindings: BindingTable) -> Self {
        Self {
            bindings,
            manipulation: None,
            hover_tracking: false,
        }
    }

    #[must_use]
    pub fn bindings(&self) -> &BindingTable {
        &self.bindings
    }

    pub fn bind(&mut self, gesture: InputGesture, modifiers: Modifiers, command: PlotCommand) {
        self.bindings
            .bind(InputBinding::new(gesture, modifiers), command);
    }

    pub fn unbind(&mut self, gesture: InputGesture, modifiers: Modifiers) -> Option<PlotCommand> {
        self.bindings.unbind(&InputBinding::new(gesture, modifiers))
    }

    pub fn unbind_all(&mut self) {
        self.bindings.unbind_all();
    }

    #[must_use]
    pub fn is_manipulating(&self) -> bool {
        self.manipulation.is_some()
    }

    /// Routes `event` to the running manipulation or the bound command.
    /// Returns `true` when the event was consumed.
    pub fn handle(&mut self, view: &PlotView, event: &InputEvent) -> bool {
        match *event {
            InputEvent::MouseMove { position, .. } => self.handle_move(view, position),
            InputEvent::MouseUp { position, button } => self.handle_up(view, position, button),
            InputEvent::MouseLeave => {
                if self.hover_tracking {
                    self.hover_tracking = false;
                    view.hide_tracker();
                    return true;
                }
                false
            }
            _ => {
                let Some(binding) = event.binding() else {
                    return false;
                };
                let Some(command) = self.bindings.get(&binding).cloned() else {
                    return false;
                };
                trace!(?binding, ?command, "executing bound command");
                self.execute(view, &command, event)
            }
        }
    }

    fn handle_move(&mut self, view: &PlotView, position: ScreenPoint) -> bool {
        match self.manipulation {
            Some(Manipulation::Pan { button, last }) => {
                view.pan_by(position.x - last.x, position.y - last.y);
                self.manipulation = Some(Manipulation::Pan {
                    button,
                    last: position,
                });
                true
            }
            Some(Manipulation::Track { .. }) => {
                view.show_tracker_at(position);
                true
            }
            None if self.hover_tracking => {
                view.show_tracker_at(position);
                true
            }
            None => false,
        }
    }

    fn handle_up(&mut self, view: &PlotView, position: ScreenPoint, button: MouseButton) -> bool {
        let Some(manipulation) = self.manipulation else {
            return false;
        };
        if manipulation.button() != button {
            return false;
        }
        self.handle_move(view, position);
        self.manipulation = None;
        if matches!(manipulation, Manipulation::Track { .. }) && !self.hover_tracking {
            view.hide_tracker();
        }
        true
    }

    fn execute(&mut self, view: &PlotView, command: &PlotCommand, event: &InputEvent) -> bool {
        let position = event.position();
        match command {
            PlotCommand::Pan => match *event {
                InputEvent::MouseDown {
                    position, button, ..
                } => {
                    self.manipulation = Some(Manipulation::Pan {
                        button,
                        last: position,
                    });
                    true
                }
                _ => false,
            },
            PlotCommand::Track => match *event {
                InputEvent::MouseDown {
                    position, button, ..
                } => {
                    self.manipulation = Some(Manipulation::Track { button });
                    view.show_tracker_at(position);
                    true
                }
                _ => false,
            },
            PlotCommand::HoverTrack => {
                self.hover_tracking = true;
                if let Some(position) = position {
                    view.show_tracker_at(position);
                }
                true
            }
            PlotCommand::ZoomWheel { factor } => match *event {
                InputEvent::MouseWheel {
                    position, delta, ..
                } if delta != 0.0 => {
                    let factor = if delta > 0.0 { *factor } else { 1.0 / *factor };
                    view.zoom_at(factor, position);
                    true
                }
                _ => false,
            },
            PlotCommand::ZoomBy { factor } => {
                view.zoom_by(*factor);
                true
            }
            PlotCommand::PanBy { dx, dy } => {
                let area = view.plot_area();
                view.pan_by(dx * area.width, dy * area.height);
                true
            }
            PlotCommand::Reset => {
                view.reset_axes();
                true
            }
            PlotCommand::Custom(custom) => custom.execute(view, self, event),
        }
    }
}
