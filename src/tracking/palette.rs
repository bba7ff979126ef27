use serde::Serialize;

/// Pair of style classes a project is drawn with: one for its bar, one for its legend entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColorClass {
    pub color_class: &'static str,
    pub legend_class: &'static str,
}

/// Slots are handed out in this order to the projects of a day, first seen first.
pub const PALETTE: [ColorClass; 5] = [
    ColorClass {
        color_class: "progress-bar-primary",
        legend_class: "text-primary",
    },
    ColorClass {
        color_class: "progress-bar-success",
        legend_class: "text-success",
    },
    ColorClass {
        color_class: "progress-bar-info",
        legend_class: "text-info",
    },
    ColorClass {
        color_class: "progress-bar-warning",
        legend_class: "text-warning",
    },
    ColorClass {
        color_class: "progress-bar-danger",
        legend_class: "text-danger",
    },
];

pub fn slot(index: usize) -> Option<ColorClass> {
    PALETTE.get(index).copied()
}
