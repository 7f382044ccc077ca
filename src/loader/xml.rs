//! Read-only view over the parsed XML tree plus typed attribute access.

use crate::error::{Result, TmxError};
use std::str::FromStr;

/// The capabilities the loader needs from an element. The loader never owns or
/// mutates the tree it reads.
pub trait Element: Copy {
    fn tag(&self) -> &str;
    fn attr(&self, name: &str) -> Option<&str>;
    /// Text directly inside the element, if any.
    fn text_content(&self) -> Option<&str>;
    /// Child elements with the given tag, in document order.
    fn children_named<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = Self> + 's;

    fn child(&self, tag: &str) -> Option<Self> {
        self.children_named(tag).next()
    }
}

impl<'a, 'input: 'a> Element for roxmltree::Node<'a, 'input> {
    fn tag(&self) -> &str {
        self.tag_name().name()
    }

    fn attr(&self, name: &str) -> Option<&str> {
        roxmltree::Node::attribute(self, name)
    }

    fn text_content(&self) -> Option<&str> {
        roxmltree::Node::text(self)
    }

    fn children_named<'s>(&'s self, tag: &'s str) -> impl Iterator<Item = Self> + 's {
        self.children()
            .filter(move |n| n.is_element() && n.tag_name().name() == tag)
    }
}

fn invalid<E: Element>(el: &E, name: &str, text: &str) -> TmxError {
    TmxError::parsing(
        el.tag(),
        format!("attribute '{name}' has invalid value '{text}'"),
    )
}

/// A required attribute, parsed.
pub fn required<E: Element, T: FromStr>(el: &E, name: &str) -> Result<T> {
    let text = el
        .attr(name)
        .ok_or_else(|| TmxError::missing_attribute(el.tag(), name))?;
    text.trim().parse().map_err(|_| invalid(el, name, text))
}

/// An optional attribute, parsed when present.
pub fn optional<E: Element, T: FromStr>(el: &E, name: &str) -> Result<Option<T>> {
    el.attr(name)
        .map(|text| text.trim().parse().map_err(|_| invalid(el, name, text)))
        .transpose()
}

pub fn or<E: Element, T: FromStr>(el: &E, name: &str, alternative: T) -> Result<T> {
    Ok(optional(el, name)?.unwrap_or(alternative))
}

pub fn or_default<E: Element, T: FromStr + Default>(el: &E, name: &str) -> Result<T> {
    Ok(optional(el, name)?.unwrap_or_default())
}

/// TMX writes booleans as `0`/`1`; `true`/`false` are accepted too.
pub fn bool_or<E: Element>(el: &E, name: &str, alternative: bool) -> Result<bool> {
    match el.attr(name).map(str::trim) {
        None => Ok(alternative),
        Some("1") | Some("true") => Ok(true),
        Some("0") | Some("false") => Ok(false),
        Some(text) => Err(invalid(el, name, text)),
    }
}

pub fn string_or_default<E: Element>(el: &E, name: &str) -> String {
    el.attr(name).unwrap_or_default().to_owned()
}

pub fn string_opt<E: Element>(el: &E, name: &str) -> Option<String> {
    el.attr(name).map(str::to_owned)
}
