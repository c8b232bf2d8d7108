use crate::graph::Node;

/// Class-type marker of the inverse (one input, two outputs) switch.
pub const INVERSE_SWITCH_MARKER: &str = "ImpactInversedSwitch";
/// Class-type marker of pass-through switches that constant resolution sees through.
pub const ANY_SWITCH_MARKER: &str = "Any Switch";
/// Class-type marker shared by every switch.
pub const SWITCH_MARKER: &str = "Switch";
/// The selector control input.
pub const SELECT_INPUT: &str = "select";

const NUMERIC_CONSTANTS: [&str; 3] = ["SimpleMathInt+", "SimpleMathFloat+", "SimpleMathBoolean+"];
const STRING_CONSTANTS: [&str; 3] = [
    "StringConstant",
    "StringConstantMultiline",
    "PrimitiveStringMultiline",
];
const SLIDER: &str = "mxSlider";

/// The behavior a node's `class_type` implies for the rewrite passes.
///
/// Classification is checked in declaration order and the first match wins:
/// exact constant-holder names, then the switch markers from most to least
/// specific, then [`NodeKind::Other`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Holds a number or boolean in its `value` input.
    NumericConstant,
    /// Holds a string in its `string` (or `value`) input.
    StringConstant,
    /// Holds a number in its `Xi` input.
    Slider,
    /// One data input routed to output 0 or 1 by `select`.
    InverseSwitch,
    /// A switch constant resolution may walk through.
    AnySwitch,
    /// Any other switch.
    Switch,
    Other,
}

impl NodeKind {
    pub fn of(class_type: &str) -> Self {
        if NUMERIC_CONSTANTS.contains(&class_type) {
            NodeKind::NumericConstant
        } else if STRING_CONSTANTS.contains(&class_type) {
            NodeKind::StringConstant
        } else if class_type == SLIDER {
            NodeKind::Slider
        } else if class_type.contains(INVERSE_SWITCH_MARKER) {
            NodeKind::InverseSwitch
        } else if class_type.contains(ANY_SWITCH_MARKER) {
            NodeKind::AnySwitch
        } else if class_type.contains(SWITCH_MARKER) {
            NodeKind::Switch
        } else {
            NodeKind::Other
        }
    }

    pub fn is_selector(self) -> bool {
        matches!(
            self,
            NodeKind::InverseSwitch | NodeKind::AnySwitch | NodeKind::Switch
        )
    }
}

/// How a selector is spliced out, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SelectorRule {
    /// Output-selective redirect driven by a resolved `select`.
    InverseBinary,
    /// `select` picks one of the sorted data connections.
    Indexed,
    /// First sorted data connection.
    Generic,
}

impl SelectorRule {
    /// The rule a selector node starts at, or `None` for non-selectors. A rule
    /// that cannot decide falls through to the next one.
    pub fn of(node: &Node) -> Option<Self> {
        match NodeKind::of(node.class_type()) {
            NodeKind::InverseSwitch => Some(SelectorRule::InverseBinary),
            kind if kind.is_selector() && node.has_input(SELECT_INPUT) => {
                Some(SelectorRule::Indexed)
            }
            kind if kind.is_selector() => Some(SelectorRule::Generic),
            _ => None,
        }
    }
}
