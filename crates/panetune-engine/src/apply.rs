//! Applying an effective configuration to a host panel.
//!
//! The host's live entries are reached only through the [`EntryLocator`]
//! capability, implemented by an adapter outside this crate; no concrete
//! element type ever crosses the boundary. Static options are written
//! through the locator directly, templated fields are routed through the
//! [`TemplateBinder`] and land at the consumer's [`DisplaySink`].

use std::{
    collections::HashSet,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use config::{BoolOrString, EffectiveConfig, MatchBy, NumberOrString, OrderItem};
use tracing::{debug, warn};

use crate::{
    binder::{DisplaySink, Field, TemplateBinder},
    error::Result,
    value::render_number,
};

/// Opaque handle to a host panel entry. The adapter chooses the values; the
/// engine only compares and stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntryHandle(pub u64);

/// Attribute slots the applier can set on a host entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryAttr {
    /// Visible label text.
    Label,
    /// Link target.
    Href,
    /// Link-opening target.
    Target,
    /// Icon spec.
    Icon,
    /// Badge text.
    Badge,
    /// Visibility toggle; "true" hides the entry.
    Hidden,
    /// Background color.
    Background,
    /// Text color.
    TextColor,
    /// Icon color.
    IconColor,
    /// Click-action descriptor, serialized as compact JSON. The adapter
    /// decodes it and replaces the entry's default navigation.
    Click,
}

/// Capability interface over the host's live panel entries.
pub trait EntryLocator: Send {
    /// All current entries, in panel order.
    fn entries(&self) -> Vec<EntryHandle>;
    /// Entries matching `needle` under `by`, exact or substring.
    fn find(&self, by: MatchBy, needle: &str, exact: bool) -> Vec<EntryHandle>;
    /// Append a brand-new entry labeled `label`, returning its handle.
    fn create(&mut self, label: &str) -> EntryHandle;
    /// Set a presentation attribute on `entry`.
    fn set_attribute(&mut self, entry: EntryHandle, attr: EntryAttr, value: &str);
    /// Reorder the panel to `order`, a permutation of all entries.
    fn place(&mut self, order: &[EntryHandle]);
}

/// An order item that claimed (or created) a host entry.
struct Claimed<'a> {
    /// Position of the item in the effective order list.
    index: usize,
    /// The claimed entry.
    entry: EntryHandle,
    /// The item itself.
    item: &'a OrderItem,
}

/// Apply `effective` to the panel behind `locator`.
///
/// Each order item claims at most one host entry; because override items
/// sit first in the effective order they claim matching entries before the
/// document items they shadow. Non-`new_item` entries that match nothing
/// are dropped with a warning. Templated fields are bound through `binder`
/// with updates delivered to `sink`.
pub fn apply(
    effective: &EffectiveConfig,
    locator: &Arc<Mutex<dyn EntryLocator>>,
    binder: &TemplateBinder,
    sink: &DisplaySink,
) -> Result<()> {
    bind_panel_options(effective, binder, sink)?;

    let mut claimed: Vec<Claimed<'_>> = Vec::new();
    let mut taken: HashSet<EntryHandle> = HashSet::new();
    {
        let mut panel = lock_unpoisoned(locator);
        for (index, item) in effective.order.iter().enumerate() {
            let entry = if item.new_item {
                panel.create(&item.item)
            } else {
                let candidate = panel
                    .find(item.match_by, &item.item, item.exact)
                    .into_iter()
                    .find(|found| !taken.contains(found));
                match candidate {
                    Some(entry) => entry,
                    None => {
                        warn!(item = %item.item, "order item matches no panel entry; dropping");
                        continue;
                    }
                }
            };
            let _known = taken.insert(entry);
            set_static_attributes(&mut *panel, entry, item);
            claimed.push(Claimed { index, entry, item });
        }

        place_entries(&mut *panel, &claimed, &taken);

        if effective.options.hide_all.unwrap_or(false) {
            for entry in panel.entries() {
                if !taken.contains(&entry) {
                    panel.set_attribute(entry, EntryAttr::Hidden, "true");
                }
            }
        }
    }
    debug!(claimed = claimed.len(), "panel entries claimed");

    for claim in &claimed {
        bind_item_fields(claim.index, claim.item, binder, sink)?;
    }
    Ok(())
}

/// Lock a mutex, recovering the inner data if a previous holder panicked.
fn lock_unpoisoned<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Write an item's non-templated options straight through the locator.
fn set_static_attributes(panel: &mut dyn EntryLocator, entry: EntryHandle, item: &OrderItem) {
    if let Some(href) = &item.href {
        panel.set_attribute(entry, EntryAttr::Href, href);
    }
    if let Some(target) = item.target {
        panel.set_attribute(entry, EntryAttr::Target, target.as_str());
    }
    if let Some(icon) = &item.icon {
        panel.set_attribute(entry, EntryAttr::Icon, icon);
    }
    if let Some(color) = &item.background {
        panel.set_attribute(entry, EntryAttr::Background, color);
    }
    if let Some(color) = &item.text_color {
        panel.set_attribute(entry, EntryAttr::TextColor, color);
    }
    if let Some(color) = &item.icon_color {
        panel.set_attribute(entry, EntryAttr::IconColor, color);
    }
    if let Some(BoolOrString::Flag(true)) = item.hide {
        panel.set_attribute(entry, EntryAttr::Hidden, "true");
    }
    if let Some(NumberOrString::Number(count)) = item.badge {
        panel.set_attribute(entry, EntryAttr::Badge, &render_number(count));
    }
    if let Some(action) = &item.on_click {
        match serde_json::to_string(action) {
            Ok(descriptor) => panel.set_attribute(entry, EntryAttr::Click, &descriptor),
            Err(error) => warn!(%error, "click action could not be serialized; dropping"),
        }
    }
}

/// Compute and apply the final entry ordering: unclaimed entries keep their
/// panel order ahead of arranged items; placement hints sort arranged items
/// (stable for ties) and `bottom` items move to the end.
fn place_entries(panel: &mut dyn EntryLocator, claimed: &[Claimed<'_>], taken: &HashSet<EntryHandle>) {
    let mut arranged: Vec<&Claimed<'_>> = claimed.iter().collect();
    arranged.sort_by(|left, right| {
        left.item
            .bottom
            .cmp(&right.item.bottom)
            .then(
                left.item
                    .order
                    .unwrap_or(0.0)
                    .total_cmp(&right.item.order.unwrap_or(0.0)),
            )
            .then(left.index.cmp(&right.index))
    });
    let final_order: Vec<EntryHandle> = panel
        .entries()
        .into_iter()
        .filter(|entry| !taken.contains(entry))
        .chain(arranged.iter().map(|claim| claim.entry))
        .collect();
    panel.place(&final_order);
}

/// Bind the panel-level fields that carry (potentially templated) values.
fn bind_panel_options(
    effective: &EffectiveConfig,
    binder: &TemplateBinder,
    sink: &DisplaySink,
) -> Result<()> {
    let options = &effective.options;
    if let Some(title) = &options.title {
        binder.bind(Field::Title, title, sink.clone())?;
    }
    if let Some(subtitle) = &options.subtitle {
        binder.bind(Field::Subtitle, subtitle, sink.clone())?;
    }
    if let Some(style) = &options.style {
        binder.bind(Field::Style, style, sink.clone())?;
    }
    let colors = [
        ("background", &options.background),
        ("title_color", &options.title_color),
        ("text_color", &options.text_color),
        ("icon_color", &options.icon_color),
        ("selection_color", &options.selection_color),
        ("divider_color", &options.divider_color),
    ];
    for (key, value) in colors {
        if let Some(color) = value {
            binder.bind(Field::Color(key), color, sink.clone())?;
        }
    }
    match &options.editable {
        Some(BoolOrString::Text(template)) => {
            binder.bind(Field::Editable, template, sink.clone())?;
        }
        Some(BoolOrString::Flag(flag)) => sink(Field::Editable, flag.to_string()),
        None => {}
    }
    Ok(())
}

/// Bind the per-entry fields that carry (potentially templated) values.
fn bind_item_fields(
    index: usize,
    item: &OrderItem,
    binder: &TemplateBinder,
    sink: &DisplaySink,
) -> Result<()> {
    if let Some(name) = &item.name {
        binder.bind(Field::EntryLabel(index), name, sink.clone())?;
    }
    if let Some(NumberOrString::Text(badge)) = &item.badge {
        binder.bind(Field::EntryBadge(index), badge, sink.clone())?;
    }
    if let Some(BoolOrString::Text(hide)) = &item.hide {
        binder.bind(Field::EntryHidden(index), hide, sink.clone())?;
    }
    Ok(())
}
