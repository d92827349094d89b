//! Property and command keys.

use std::{borrow::Borrow, borrow::Cow, fmt};

use crate::{
    error::{Error, Result},
    value::Value,
};

/// An interned mapper key naming a property or a command.
///
/// Well-known keys are `'static` constants; platform code may build keys
/// from runtime strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Cow<'static, str>);

impl Key {
    /// Construct a key from a static string.
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    /// The key's name.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Key {
    fn from(name: &'static str) -> Self {
        Self::from_static(name)
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Self(Cow::Owned(name))
    }
}

impl From<&Key> for Key {
    fn from(key: &Key) -> Self {
        key.clone()
    }
}

impl PartialEq<str> for Key {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Key {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// Well-known property keys.
pub mod keys {
    use super::Key;

    /// Whether the view ignores input.
    pub const INPUT_TRANSPARENT: Key = Key::from_static("InputTransparent");
    /// Whether a transparent container forces transparency onto its children.
    pub const CASCADE_INPUT_TRANSPARENT: Key = Key::from_static("CascadeInputTransparent");
    /// Whether the view takes part in layout and rendering.
    pub const IS_VISIBLE: Key = Key::from_static("IsVisible");
    /// Rendering hint: clip to the arranged bounds.
    pub const CLIPS_TO_BOUNDS: Key = Key::from_static("ClipsToBounds");
    /// Whether a container lays out under system insets such as notches and bars.
    pub const IGNORE_SAFE_AREA: Key = Key::from_static("IgnoreSafeArea");
    /// Container padding.
    pub const PADDING: Key = Key::from_static("Padding");
    /// Gap between stacked children.
    pub const SPACING: Key = Key::from_static("Spacing");
    /// Explicit width.
    pub const WIDTH_REQUEST: Key = Key::from_static("WidthRequest");
    /// Explicit height.
    pub const HEIGHT_REQUEST: Key = Key::from_static("HeightRequest");
    /// Horizontal alignment within the slot assigned by the parent.
    pub const HORIZONTAL_OPTIONS: Key = Key::from_static("HorizontalOptions");
    /// Vertical alignment within the slot assigned by the parent.
    pub const VERTICAL_OPTIONS: Key = Key::from_static("VerticalOptions");
    /// Render opacity.
    pub const OPACITY: Key = Key::from_static("Opacity");
    /// Identifier used by automation and diagnostics.
    pub const AUTOMATION_ID: Key = Key::from_static("AutomationId");
}

/// Well-known command names.
pub mod commands {
    use super::Key;

    /// A child was appended.
    pub const ADD: Key = Key::from_static("Add");
    /// A child was inserted at an index.
    pub const INSERT: Key = Key::from_static("Insert");
    /// A child is being removed from an index.
    pub const REMOVE: Key = Key::from_static("Remove");
    /// All children were removed.
    pub const CLEAR: Key = Key::from_static("Clear");
    /// The node's measurement is no longer valid.
    pub const INVALIDATE_MEASURE: Key = Key::from_static("InvalidateMeasure");
}

/// Return true if a change to `key` can change a node's measured size.
pub fn affects_measure(key: &Key) -> bool {
    [
        keys::IS_VISIBLE,
        keys::PADDING,
        keys::SPACING,
        keys::WIDTH_REQUEST,
        keys::HEIGHT_REQUEST,
        keys::HORIZONTAL_OPTIONS,
        keys::VERTICAL_OPTIONS,
    ]
    .contains(key)
}

/// Check that a value has the shape a well-known key expects.
///
/// Unknown keys accept any value.
pub fn validate(key: &Key, value: &Value) -> Result<()> {
    let ok = match key.as_str() {
        "InputTransparent" | "CascadeInputTransparent" | "IsVisible" | "ClipsToBounds"
        | "IgnoreSafeArea" => {
            matches!(value, Value::Bool(_))
        }
        "Padding" => match value {
            Value::Edges(e) => {
                [e.left, e.top, e.right, e.bottom].iter().all(|v| non_negative(*v))
            }
            Value::Number(n) => non_negative(*n),
            _ => false,
        },
        "Spacing" | "Opacity" => matches!(value, Value::Number(n) if non_negative(*n)),
        "WidthRequest" | "HeightRequest" => match value {
            Value::Null => true,
            Value::Number(n) => non_negative(*n),
            _ => false,
        },
        "HorizontalOptions" | "VerticalOptions" => matches!(value, Value::Align(_)),
        _ => true,
    };
    if ok {
        Ok(())
    } else {
        Err(Error::InvalidValue(format!("{value:?} for {key}")))
    }
}

/// True for finite values at or above zero.
fn non_negative(v: f64) -> bool {
    v.is_finite() && v >= 0.0
}
