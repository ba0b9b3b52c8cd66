use smol_str::SmolStr;

use crate::element::ElementId;
use crate::property::{PropertyKey, PropertyValue};
use crate::view::View;

#[derive(Clone, Debug, PartialEq)]
pub struct StyleSetter {
    pub property: PropertyKey,
    pub value: PropertyValue,
}

impl StyleSetter {
    pub fn new(property: PropertyKey, value: impl Into<PropertyValue>) -> Self {
        Self {
            property,
            value: value.into(),
        }
    }
}

/// Read-only view of the element being styled.
pub struct StyleTarget<'a> {
    view: &'a View,
    id: ElementId,
}

impl<'a> StyleTarget<'a> {
    pub(crate) fn new(view: &'a View, id: ElementId) -> Self {
        Self { view, id }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    pub fn type_name(&self) -> &'static str {
        self.view.type_name(self.id).unwrap_or_default()
    }

    pub fn name(&self) -> Option<&'a str> {
        self.view.name(self.id)
    }

    /// Layout ancestors, nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = ElementId> + 'a {
        let view = self.view;
        std::iter::successors(view.parent(self.id), move |id| view.parent(*id))
    }

    pub fn view(&self) -> &'a View {
        self.view
    }
}

/// Setters are applied in output order; a later setter for the same
/// property wins.
pub trait Stylesheet {
    fn apply(&self, target: &StyleTarget<'_>, out: &mut Vec<StyleSetter>);
}

#[derive(Clone, Debug, PartialEq)]
pub enum Selector {
    Type(SmolStr),
    Name(SmolStr),
    Within {
        ancestor_type: SmolStr,
        inner: Box<Selector>,
    },
}

impl Selector {
    pub fn of_type(type_name: impl Into<SmolStr>) -> Self {
        Self::Type(type_name.into())
    }

    pub fn named(name: impl Into<SmolStr>) -> Self {
        Self::Name(name.into())
    }

    pub fn within(self, ancestor_type: impl Into<SmolStr>) -> Self {
        Self::Within {
            ancestor_type: ancestor_type.into(),
            inner: Box::new(self),
        }
    }

    pub fn matches(&self, target: &StyleTarget<'_>) -> bool {
        match self {
            Self::Type(type_name) => target.type_name() == type_name.as_str(),
            Self::Name(name) => target.name() == Some(name.as_str()),
            Self::Within {
                ancestor_type,
                inner,
            } => {
                inner.matches(target)
                    && target.ancestors().any(|ancestor| {
                        target.view().type_name(ancestor) == Some(ancestor_type.as_str())
                    })
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct StyleRule {
    pub selector: Selector,
    pub setters: Vec<StyleSetter>,
}

/// Ordered list of selector rules. No specificity: rules apply in
/// declaration order.
#[derive(Clone, Debug, Default)]
pub struct RuleStylesheet {
    rules: Vec<StyleRule>,
}

impl RuleStylesheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, selector: Selector, setters: Vec<StyleSetter>) -> Self {
        self.rules.push(StyleRule { selector, setters });
        self
    }

    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }
}

impl Stylesheet for RuleStylesheet {
    fn apply(&self, target: &StyleTarget<'_>, out: &mut Vec<StyleSetter>) {
        for rule in &self.rules {
            if rule.selector.matches(target) {
                out.extend(rule.setters.iter().cloned());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controls::{Button, Panel, StackPanel};
    use crate::property::{OPACITY, WIDTH};

    #[test]
    fn selectors_match_type_name_and_ancestor() {
        let mut view = View::new(Box::new(StackPanel::vertical()));
        let root = view.root();
        let panel = view.create_element(Box::new(Panel));
        let ok = view.create_element(Box::new(Button::new("OK")));
        view.add_child(root, panel).unwrap();
        view.add_child(panel, ok).unwrap();
        view.set_name(ok, "ok").unwrap();

        let target = StyleTarget::new(&view, ok);
        assert!(Selector::of_type("Button").matches(&target));
        assert!(Selector::named("ok").matches(&target));
        assert!(!Selector::named("cancel").matches(&target));
        assert!(Selector::of_type("Button").within("StackPanel").matches(&target));
        assert!(!Selector::of_type("Button").within("Canvas").matches(&target));
    }

    #[test]
    fn later_rules_come_later_in_output() {
        let sheet = RuleStylesheet::new()
            .rule(
                Selector::of_type("Button"),
                vec![StyleSetter::new(&WIDTH, 10.0)],
            )
            .rule(Selector::of_type("Panel"), vec![StyleSetter::new(&OPACITY, 0.5)])
            .rule(
                Selector::of_type("Button"),
                vec![StyleSetter::new(&WIDTH, 20.0)],
            );
        let view = View::new(Box::new(Button::new("x")));
        let mut out = Vec::new();
        sheet.apply(&StyleTarget::new(&view, view.root()), &mut out);
        assert_eq!(
            out,
            vec![StyleSetter::new(&WIDTH, 10.0), StyleSetter::new(&WIDTH, 20.0)]
        );
    }
}
