use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smol_str::{SmolStr, format_smolstr};

use crate::geometry::Thickness;

bitflags! {
    /// Which phases a change of the effective value invalidates.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct PropertyFlags: u16 {
        const AFFECTS_STYLE = 1 << 0;
        const AFFECTS_MEASURE = 1 << 1;
        const AFFECTS_ARRANGE = 1 << 2;
        const AFFECTS_POSITION = 1 << 3;
        const AFFECTS_PARENT_MEASURE = 1 << 4;
        const AFFECTS_PARENT_ARRANGE = 1 << 5;
        const ANIMATABLE = 1 << 6;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Visible,
    Hidden,
    Collapsed,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Orientation {
    Horizontal,
    #[default]
    Vertical,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PropertyValue {
    Auto,
    Bool(bool),
    Int(i32),
    Float(f32),
    Text(SmolStr),
    Thickness(Thickness),
    Visibility(Visibility),
    Orientation(Orientation),
}

impl PropertyValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            Self::Float(value) => Some(*value),
            Self::Int(value) => Some(*value as f32),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn as_thickness(&self) -> Option<Thickness> {
        match self {
            Self::Thickness(value) => Some(*value),
            Self::Float(value) => Some(Thickness::uniform(*value)),
            _ => None,
        }
    }

    pub fn as_visibility(&self) -> Option<Visibility> {
        match self {
            Self::Visibility(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_orientation(&self) -> Option<Orientation> {
        match self {
            Self::Orientation(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropertyValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for PropertyValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::Text(SmolStr::new(value))
    }
}

impl From<Thickness> for PropertyValue {
    fn from(value: Thickness) -> Self {
        Self::Thickness(value)
    }
}

impl From<Visibility> for PropertyValue {
    fn from(value: Visibility) -> Self {
        Self::Visibility(value)
    }
}

impl From<Orientation> for PropertyValue {
    fn from(value: Orientation) -> Self {
        Self::Orientation(value)
    }
}

/// Static description of a dependency property. Identity is `(owner, name)`;
/// `owner` is set for attached properties that a parent type reads from its
/// children.
#[derive(Debug)]
pub struct PropertyDef {
    pub name: &'static str,
    pub owner: Option<&'static str>,
    pub flags: PropertyFlags,
    pub default: PropertyValue,
}

pub type PropertyKey = &'static PropertyDef;

impl PropertyDef {
    pub const fn new(name: &'static str, flags: PropertyFlags, default: PropertyValue) -> Self {
        Self {
            name,
            owner: None,
            flags,
            default,
        }
    }

    pub const fn attached(
        owner: &'static str,
        name: &'static str,
        flags: PropertyFlags,
        default: PropertyValue,
    ) -> Self {
        Self {
            name,
            owner: Some(owner),
            flags,
            default,
        }
    }

    pub fn path(&self) -> SmolStr {
        match self.owner {
            Some(owner) => format_smolstr!("{owner}.{}", self.name),
            None => SmolStr::new_static(self.name),
        }
    }

    pub fn is_animatable(&self) -> bool {
        self.flags.contains(PropertyFlags::ANIMATABLE)
    }
}

impl PartialEq for PropertyDef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.owner == other.owner
    }
}

impl Eq for PropertyDef {}

impl Hash for PropertyDef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.owner.hash(state);
        self.name.hash(state);
    }
}

const LAYOUT: PropertyFlags = PropertyFlags::AFFECTS_MEASURE
    .union(PropertyFlags::AFFECTS_ARRANGE)
    .union(PropertyFlags::ANIMATABLE);

pub static WIDTH: PropertyDef = PropertyDef::new("Width", LAYOUT, PropertyValue::Auto);
pub static HEIGHT: PropertyDef = PropertyDef::new("Height", LAYOUT, PropertyValue::Auto);
pub static MIN_WIDTH: PropertyDef = PropertyDef::new("MinWidth", LAYOUT, PropertyValue::Float(0.0));
pub static MIN_HEIGHT: PropertyDef =
    PropertyDef::new("MinHeight", LAYOUT, PropertyValue::Float(0.0));
pub static MAX_WIDTH: PropertyDef =
    PropertyDef::new("MaxWidth", LAYOUT, PropertyValue::Float(f32::INFINITY));
pub static MAX_HEIGHT: PropertyDef =
    PropertyDef::new("MaxHeight", LAYOUT, PropertyValue::Float(f32::INFINITY));
pub static MARGIN: PropertyDef = PropertyDef::new(
    "Margin",
    LAYOUT.union(PropertyFlags::AFFECTS_POSITION),
    PropertyValue::Thickness(Thickness::ZERO),
);
pub static VISIBILITY: PropertyDef = PropertyDef::new(
    "Visibility",
    PropertyFlags::AFFECTS_MEASURE.union(PropertyFlags::AFFECTS_ARRANGE),
    PropertyValue::Visibility(Visibility::Visible),
);
pub static OPACITY: PropertyDef =
    PropertyDef::new("Opacity", PropertyFlags::ANIMATABLE, PropertyValue::Float(1.0));
pub static TEXT: PropertyDef = PropertyDef::new(
    "Text",
    PropertyFlags::AFFECTS_MEASURE,
    PropertyValue::Text(SmolStr::new_static("")),
);
pub static ORIENTATION: PropertyDef = PropertyDef::new(
    "Orientation",
    PropertyFlags::AFFECTS_MEASURE.union(PropertyFlags::AFFECTS_ARRANGE),
    PropertyValue::Orientation(Orientation::Vertical),
);
pub static RENDER_OFFSET_X: PropertyDef = PropertyDef::new(
    "RenderOffsetX",
    PropertyFlags::AFFECTS_POSITION.union(PropertyFlags::ANIMATABLE),
    PropertyValue::Float(0.0),
);
pub static RENDER_OFFSET_Y: PropertyDef = PropertyDef::new(
    "RenderOffsetY",
    PropertyFlags::AFFECTS_POSITION.union(PropertyFlags::ANIMATABLE),
    PropertyValue::Float(0.0),
);
pub static CLIP_TO_BOUNDS: PropertyDef = PropertyDef::new(
    "ClipToBounds",
    PropertyFlags::AFFECTS_POSITION,
    PropertyValue::Bool(false),
);
pub static IS_ENABLED: PropertyDef =
    PropertyDef::new("IsEnabled", PropertyFlags::empty(), PropertyValue::Bool(true));
pub static IS_HIT_TEST_VISIBLE: PropertyDef = PropertyDef::new(
    "IsHitTestVisible",
    PropertyFlags::empty(),
    PropertyValue::Bool(true),
);
pub static FOCUSABLE: PropertyDef =
    PropertyDef::new("Focusable", PropertyFlags::empty(), PropertyValue::Bool(false));
pub static IS_TAB_STOP: PropertyDef =
    PropertyDef::new("IsTabStop", PropertyFlags::empty(), PropertyValue::Bool(true));
pub static TAB_INDEX: PropertyDef =
    PropertyDef::new("TabIndex", PropertyFlags::empty(), PropertyValue::Int(0));
pub static NAVIGATE_UP: PropertyDef = PropertyDef::new(
    "NavigateUp",
    PropertyFlags::empty(),
    PropertyValue::Text(SmolStr::new_static("")),
);
pub static NAVIGATE_DOWN: PropertyDef = PropertyDef::new(
    "NavigateDown",
    PropertyFlags::empty(),
    PropertyValue::Text(SmolStr::new_static("")),
);
pub static NAVIGATE_LEFT: PropertyDef = PropertyDef::new(
    "NavigateLeft",
    PropertyFlags::empty(),
    PropertyValue::Text(SmolStr::new_static("")),
);
pub static NAVIGATE_RIGHT: PropertyDef = PropertyDef::new(
    "NavigateRight",
    PropertyFlags::empty(),
    PropertyValue::Text(SmolStr::new_static("")),
);

pub(crate) fn framework_properties() -> [PropertyKey; 23] {
    [
        &WIDTH,
        &HEIGHT,
        &MIN_WIDTH,
        &MIN_HEIGHT,
        &MAX_WIDTH,
        &MAX_HEIGHT,
        &MARGIN,
        &VISIBILITY,
        &OPACITY,
        &TEXT,
        &ORIENTATION,
        &RENDER_OFFSET_X,
        &RENDER_OFFSET_Y,
        &CLIP_TO_BOUNDS,
        &IS_ENABLED,
        &IS_HIT_TEST_VISIBLE,
        &FOCUSABLE,
        &IS_TAB_STOP,
        &TAB_INDEX,
        &NAVIGATE_UP,
        &NAVIGATE_DOWN,
        &NAVIGATE_LEFT,
        &NAVIGATE_RIGHT,
    ]
}

/// Effective value resolution, highest first: animated, local, styled,
/// per-type default, key default.
#[derive(Debug, Default)]
pub(crate) struct PropertyStore {
    defaults: FxHashMap<PropertyKey, PropertyValue>,
    styled: FxHashMap<PropertyKey, PropertyValue>,
    local: FxHashMap<PropertyKey, PropertyValue>,
    animated: FxHashMap<PropertyKey, PropertyValue>,
}

impl PropertyStore {
    pub fn with_defaults(defaults: Vec<(PropertyKey, PropertyValue)>) -> Self {
        Self {
            defaults: defaults.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn get(&self, key: PropertyKey) -> &PropertyValue {
        self.animated
            .get(key)
            .or_else(|| self.local.get(key))
            .or_else(|| self.styled.get(key))
            .or_else(|| self.defaults.get(key))
            .unwrap_or(&key.default)
    }

    pub fn local(&self, key: PropertyKey) -> Option<&PropertyValue> {
        self.local.get(key)
    }

    /// Each setter returns whether the effective value changed.
    pub fn set_local(&mut self, key: PropertyKey, value: PropertyValue) -> bool {
        let before = self.get(key).clone();
        self.local.insert(key, value);
        *self.get(key) != before
    }

    pub fn clear_local(&mut self, key: PropertyKey) -> bool {
        let before = self.get(key).clone();
        self.local.remove(key);
        *self.get(key) != before
    }

    pub fn set_animated(&mut self, key: PropertyKey, value: Option<PropertyValue>) -> bool {
        let before = self.get(key).clone();
        match value {
            Some(value) => {
                self.animated.insert(key, value);
            }
            None => {
                self.animated.remove(key);
            }
        }
        *self.get(key) != before
    }

    /// Swaps in a freshly matched styled layer and reports the keys whose
    /// effective value moved.
    pub fn replace_styled(&mut self, values: Vec<(PropertyKey, PropertyValue)>) -> Vec<PropertyKey> {
        let next: FxHashMap<PropertyKey, PropertyValue> = values.into_iter().collect();
        let mut touched: Vec<PropertyKey> = self.styled.keys().copied().collect();
        touched.extend(next.keys().copied().filter(|key| !self.styled.contains_key(key)));
        let before: Vec<PropertyValue> = touched.iter().map(|key| self.get(*key).clone()).collect();
        self.styled = next;
        touched
            .into_iter()
            .zip(before)
            .filter(|(key, before)| self.get(*key) != before)
            .map(|(key, _)| key)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_animated_over_local_over_styled() {
        let mut store =
            PropertyStore::with_defaults(vec![(&FOCUSABLE, PropertyValue::Bool(true))]);
        assert_eq!(store.get(&FOCUSABLE), &PropertyValue::Bool(true));
        assert_eq!(store.get(&OPACITY), &PropertyValue::Float(1.0));

        let changed = store.replace_styled(vec![(&OPACITY, PropertyValue::Float(0.5))]);
        assert_eq!(changed, vec![&OPACITY as PropertyKey]);
        assert!(store.set_local(&OPACITY, PropertyValue::Float(0.25)));
        assert!(store.set_animated(&OPACITY, Some(PropertyValue::Float(0.75))));
        assert_eq!(store.get(&OPACITY).as_f32(), Some(0.75));

        assert!(store.set_animated(&OPACITY, None));
        assert_eq!(store.get(&OPACITY).as_f32(), Some(0.25));
        assert!(store.clear_local(&OPACITY));
        assert_eq!(store.get(&OPACITY).as_f32(), Some(0.5));
    }

    #[test]
    fn styled_changes_hidden_by_local_are_not_reported() {
        let mut store = PropertyStore::default();
        store.set_local(&TEXT, PropertyValue::from("local"));
        let changed = store.replace_styled(vec![(&TEXT, PropertyValue::from("styled"))]);
        assert!(changed.is_empty());
    }

    #[test]
    fn replacing_styled_layer_reports_removed_keys() {
        let mut store = PropertyStore::default();
        store.replace_styled(vec![(&WIDTH, PropertyValue::Float(10.0))]);
        let changed = store.replace_styled(Vec::new());
        assert_eq!(changed, vec![&WIDTH as PropertyKey]);
        assert_eq!(store.get(&WIDTH), &PropertyValue::Auto);
    }

    #[test]
    fn setting_same_value_is_not_a_change() {
        let mut store = PropertyStore::default();
        assert!(!store.set_local(&TAB_INDEX, PropertyValue::Int(0)));
        assert!(store.set_local(&TAB_INDEX, PropertyValue::Int(3)));
        assert!(!store.set_local(&TAB_INDEX, PropertyValue::Int(3)));
    }

    #[test]
    fn attached_path_includes_owner() {
        static LEFT: PropertyDef = PropertyDef::attached(
            "Canvas",
            "Left",
            PropertyFlags::empty(),
            PropertyValue::Float(0.0),
        );
        assert_eq!(LEFT.path(), "Canvas.Left");
        assert_eq!(WIDTH.path(), "Width");
    }
}
