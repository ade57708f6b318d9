use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::api::PlotView;

use super::{InputBinding, InputEvent, InputGesture, Key, Modifiers, MouseButton, PlotController};

type CustomHandler = dyn Fn(&PlotView, &mut PlotController, &InputEvent) -> bool + Send + Sync;

/// Host-supplied command; returns `true` when the event was handled.
#[derive(Clone)]
pub struct CustomCommand(Arc<CustomHandler>);

impl CustomCommand {
    pub fn new(
        handler: impl Fn(&PlotView, &mut PlotController, &InputEvent) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self(Arc::new(handler))
    }

    pub fn execute(&self, view: &PlotView, controller: &mut PlotController, event: &InputEvent) -> bool {
        (self.0)(view, controller, event)
    }
}

impl fmt::Debug for CustomCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CustomCommand(..)")
    }
}

/// Action a binding triggers.
#[derive(Debug, Clone)]
pub enum PlotCommand {
    /// Drag pans all axes.
    Pan,
    /// Drag shows the tracker at the nearest point.
    Track,
    /// Tracker follows the pointer while it is over the view.
    HoverTrack,
    /// Wheel zoom around the pointer; scrolling down uses `1 / factor`.
    ZoomWheel { factor: f64 },
    /// Zoom around the plot-area center.
    ZoomBy { factor: f64 },
    /// Pan by fractions of the plot-area size.
    PanBy { dx: f64, dy: f64 },
    Reset,
    Custom(CustomCommand),
}

/// Ordered map from bindings to commands.
#[derive(Debug, Clone, Default)]
pub struct BindingTable {
    entries: IndexMap<InputBinding, PlotCommand>,
}

impl BindingTable {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Table with the standard mouse and keyboard bindings.
    #[must_use]
    pub fn defaults() -> Self {
        BindingTableBuilder::defaults().build()
    }

    /// Command for an exact gesture and modifier match.
    #[must_use]
    pub fn get(&self, binding: &InputBinding) -> Option<&PlotCommand> {
        self.entries.get(binding)
    }

    /// Binds `command`, replacing any command bound to the same binding.
    pub fn bind(&mut self, binding: InputBinding, command: PlotCommand) -> Option<PlotCommand> {
        self.entries.insert(binding, command)
    }

    pub fn unbind(&mut self, binding: &InputBinding) -> Option<PlotCommand> {
        self.entries.shift_remove(binding)
    }

    pub fn unbind_all(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&InputBinding, &PlotCommand)> {
        self.entries.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for binding tables.
#[derive(Debug, Clone, Default)]
pub struct BindingTableBuilder {
    table: BindingTable,
}

impl BindingTableBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder seeded with the standard bindings.
    #[must_use]
    pub fn defaults() -> Self {
        let click = |button| InputGesture::MouseDown {
            button,
            click_count: 1,
        };
        let key = InputGesture::KeyDown;

        let mut builder = Self::new()
            .bind(click(MouseButton::Left), Modifiers::NONE, PlotCommand::Track)
            .bind(click(MouseButton::Right), Modifiers::NONE, PlotCommand::Pan)
            .bind(click(MouseButton::Right), Modifiers::CONTROL, PlotCommand::Pan)
            .bind(
                InputGesture::MouseDown {
                    button: MouseButton::Middle,
                    click_count: 2,
                },
                Modifiers::NONE,
                PlotCommand::Reset,
            )
            .bind(
                InputGesture::MouseWheel,
                Modifiers::NONE,
                PlotCommand::ZoomWheel { factor: 1.2 },
            )
            .bind(
                InputGesture::MouseWheel,
                Modifiers::CONTROL,
                PlotCommand::ZoomWheel { factor: 1.05 },
            )
            .bind(key(Key::Char('a')), Modifiers::NONE, PlotCommand::Reset)
            .bind(key(Key::Home), Modifiers::NONE, PlotCommand::Reset);

        for (step, modifiers) in [(0.1, Modifiers::NONE), (0.01, Modifiers::CONTROL)] {
            builder = builder
                .bind(key(Key::Left), modifiers, PlotCommand::PanBy { dx: -step, dy: 0.0 })
                .bind(key(Key::Right), modifiers, PlotCommand::PanBy { dx: step, dy: 0.0 })
                .bind(key(Key::Up), modifiers, PlotCommand::PanBy { dx: 0.0, dy: -step })
                .bind(key(Key::Down), modifiers, PlotCommand::PanBy { dx: 0.0, dy: step });
        }
        for zoom_in in [Key::Add, Key::PageUp] {
            builder = builder.bind(key(zoom_in), Modifiers::NONE, PlotCommand::ZoomBy { factor: 1.2 });
        }
        for zoom_out in [Key::Subtract, Key::PageDown] {
            builder = builder.bind(
                key(zoom_out),
                Modifiers::NONE,
                PlotCommand::ZoomBy { factor: 1.0 / 1.2 },
            );
        }
        builder
    }

    #[must_use]
    pub fn bind(mut self, gesture: InputGesture, modifiers: Modifiers, command: PlotCommand) -> Self {
        self.table.bind(InputBinding::new(gesture, modifiers), command);
        self
    }

    #[must_use]
    pub fn unbind(mut self, gesture: InputGesture, modifiers: Modifiers) -> Self {
        self.table.unbind(&InputBinding::new(gesture, modifiers));
        self
    }

    #[must_use]
    pub fn build(self) -> BindingTable {
        self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_require_exact_modifiers() {
        let table = BindingTable::defaults();
        let wheel = |modifiers| InputBinding::new(InputGesture::MouseWheel, modifiers);
        assert!(matches!(
            table.get(&wheel(Modifiers::NONE)),
            Some(PlotCommand::ZoomWheel { factor }) if *factor == 1.2
        ));
        assert!(matches!(
            table.get(&wheel(Modifiers::CONTROL)),
            Some(PlotCommand::ZoomWheel { factor }) if *factor == 1.05
        ));
        assert!(table.get(&wheel(Modifiers::SHIFT)).is_none());
    }

    #[test]
    fn mouse_enter_is_unbound_by_default() {
        let table = BindingTable::defaults();
        let enter = InputBinding::new(InputGesture::MouseEnter, Modifiers::NONE);
        assert!(table.get(&enter).is_none());
    }

    #[test]
    fn builder_unbind_removes_default() {
        let table = BindingTableBuilder::defaults()
            .unbind(InputGesture::KeyDown(Key::Home), Modifiers::NONE)
            .build();
        let home = InputBinding::new(InputGesture::KeyDown(Key::Home), Modifiers::NONE);
        assert!(table.get(&home).is_none());
        assert!(table.len() < BindingTable::defaults().len());
    }
}
