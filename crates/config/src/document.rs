//! Typed document model and structural validation.
//!
//! The raw document arrives as already-parsed JSON. Conversion into the
//! typed model is the validation pass: every field is shape-checked and the
//! first violation is returned as [`Error`] with a path-qualified message.

use std::{collections::BTreeMap, fmt};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::warn;

use crate::{
    dialect,
    error::Error,
    types::{BoolOrString, ClickAction, Combinator, MatchBy, NumberOrString, PanelMode, Target},
};

/// Document `id` marking the shipped placeholder configuration.
const EXAMPLE_ID: &str = "example";

/// Keys that may only appear on the document root.
const DOCUMENT_ONLY: &[&str] = &[
    "id",
    "exceptions",
    "fragments",
    "partials",
    "script_variables",
    "markup_variables",
];

/// Keys shared by the document root, named fragments, and overrides.
const SHARED_KEYS: &[&str] = &[
    "title",
    "subtitle",
    "mode",
    "background",
    "title_color",
    "text_color",
    "icon_color",
    "selection_color",
    "divider_color",
    "style",
    "editable",
    "hide_all",
    "order",
    "extend_from",
];

/// Predicate keys allowed on overrides only.
const PREDICATE_KEYS: &[&str] = &[
    "user",
    "not_user",
    "device",
    "not_device",
    "is_admin",
    "is_owner",
    "combine",
];

/// Keys allowed on an order item.
const ITEM_KEYS: &[&str] = &[
    "item",
    "match",
    "exact",
    "new_item",
    "name",
    "icon",
    "href",
    "target",
    "hide",
    "order",
    "bottom",
    "badge",
    "background",
    "text_color",
    "icon_color",
    "on_click",
];

/// Validation scope used to qualify error messages.
#[derive(Clone, Copy)]
enum Scope<'a> {
    /// The document root.
    Root,
    /// An override, by position in the `exceptions` list.
    Exception(usize),
    /// A named fragment.
    Fragment(&'a str),
    /// An order item, by its entry identifier.
    Item(&'a str),
    /// One of the variable maps, by key.
    Variables(&'a str),
    /// The partial map.
    Partials,
}

impl fmt::Display for Scope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("document"),
            Self::Exception(index) => write!(f, "exceptions[{index}]"),
            Self::Fragment(name) => write!(f, "fragment \"{name}\""),
            Self::Item(id) => write!(f, "item \"{id}\""),
            Self::Variables(map) => f.write_str(map),
            Self::Partials => f.write_str("partials"),
        }
    }
}

/// Build a validation error qualified by `scope` (the root is unqualified).
fn invalid_at(scope: Scope<'_>, message: impl fmt::Display) -> Error {
    match scope {
        Scope::Root => Error::invalid(message.to_string()),
        other => Error::invalid(format!("in {other}, {message}")),
    }
}

/// Type-mismatch error for `key` within `scope`.
fn bad_type(scope: Scope<'_>, key: &str, expected: &str) -> Error {
    invalid_at(scope, format_args!("\"{key}\" property should be {expected}"))
}

/// Require `value` to be a JSON object.
fn object<'a>(
    value: &'a Value,
    scope: Scope<'_>,
    what: &str,
) -> Result<&'a Map<String, Value>, Error> {
    value
        .as_object()
        .ok_or_else(|| invalid_at(scope, format_args!("{what} should be an object")))
}

/// Reject keys outside `allowed`, with a dedicated message for
/// document-only keys that strayed into a nested scope.
fn reject_unknown(
    map: &Map<String, Value>,
    allowed: &[&[&str]],
    scope: Scope<'_>,
) -> Result<(), Error> {
    for key in map.keys() {
        if allowed.iter().any(|set| set.contains(&key.as_str())) {
            continue;
        }
        if DOCUMENT_ONLY.contains(&key.as_str()) && !matches!(scope, Scope::Root) {
            return Err(invalid_at(
                scope,
                format_args!("\"{key}\" property is only allowed at the document root"),
            ));
        }
        return Err(invalid_at(scope, format_args!("unknown property \"{key}\"")));
    }
    Ok(())
}

/// Optional string field.
fn opt_string(
    map: &Map<String, Value>,
    key: &str,
    scope: Scope<'_>,
) -> Result<Option<String>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(_) => Err(bad_type(scope, key, "a string")),
    }
}

/// Optional boolean field.
fn opt_bool(map: &Map<String, Value>, key: &str, scope: Scope<'_>) -> Result<Option<bool>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(*flag)),
        Some(_) => Err(bad_type(scope, key, "a boolean")),
    }
}

/// Optional numeric field.
fn opt_number(map: &Map<String, Value>, key: &str, scope: Scope<'_>) -> Result<Option<f64>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64()),
        Some(_) => Err(bad_type(scope, key, "a number")),
    }
}

/// Optional boolean-or-string field.
fn opt_bool_or_string(
    map: &Map<String, Value>,
    key: &str,
    scope: Scope<'_>,
) -> Result<Option<BoolOrString>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Bool(flag)) => Ok(Some(BoolOrString::Flag(*flag))),
        Some(Value::String(text)) => Ok(Some(BoolOrString::Text(text.clone()))),
        Some(_) => Err(bad_type(scope, key, "a boolean or a string")),
    }
}

/// Optional number-or-string field.
fn opt_number_or_string(
    map: &Map<String, Value>,
    key: &str,
    scope: Scope<'_>,
) -> Result<Option<NumberOrString>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Number(number)) => Ok(number.as_f64().map(NumberOrString::Number)),
        Some(Value::String(text)) => Ok(Some(NumberOrString::Text(text.clone()))),
        Some(_) => Err(bad_type(scope, key, "a number or a string")),
    }
}

/// Optional field accepting a single string or a list of strings.
fn opt_string_list(
    map: &Map<String, Value>,
    key: &str,
    scope: Scope<'_>,
) -> Result<Option<Vec<String>>, Error> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(text)) => Ok(Some(vec![text.clone()])),
        Some(Value::Array(items)) => {
            let mut names = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(text) => names.push(text.clone()),
                    _ => {
                        return Err(bad_type(scope, key, "a string or an array of strings"));
                    }
                }
            }
            Ok(Some(names))
        }
        Some(_) => Err(bad_type(scope, key, "a string or an array of strings")),
    }
}

/// Optional enumerated keyword field.
fn opt_enum<T>(
    map: &Map<String, Value>,
    key: &str,
    scope: Scope<'_>,
    parse: fn(&str) -> Option<T>,
    expected: &str,
) -> Result<Option<T>, Error> {
    match opt_string(map, key, scope)? {
        None => Ok(None),
        Some(keyword) => {
            parse(&keyword).map(Some).ok_or_else(|| {
                invalid_at(
                    scope,
                    format_args!("\"{key}\" property should be one of {expected}"),
                )
            })
        }
    }
}

/// Scalar display/style options shared by the document root, named
/// fragments, and overrides. All fields are optional so that layers can be
/// merged with unset fields falling through to the layer beneath.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PanelOptions {
    /// Panel title text; may be templated.
    pub title: Option<String>,
    /// Panel subtitle text; may be templated.
    pub subtitle: Option<String>,
    /// Panel presentation mode.
    pub mode: Option<PanelMode>,
    /// Panel background color or image spec.
    pub background: Option<String>,
    /// Title text color.
    pub title_color: Option<String>,
    /// Entry text color.
    pub text_color: Option<String>,
    /// Entry icon color.
    pub icon_color: Option<String>,
    /// Background color of the selected entry.
    pub selection_color: Option<String>,
    /// Divider line color.
    pub divider_color: Option<String>,
    /// Raw CSS attached to the panel.
    pub style: Option<String>,
    /// Whether the panel remains user-editable; may be templated.
    pub editable: Option<BoolOrString>,
    /// Hide every entry the order list does not claim.
    pub hide_all: Option<bool>,
}

impl PanelOptions {
    /// Extract the shared scalar options from `map`.
    fn from_map(map: &Map<String, Value>, scope: Scope<'_>) -> Result<Self, Error> {
        Ok(Self {
            title: opt_string(map, "title", scope)?,
            subtitle: opt_string(map, "subtitle", scope)?,
            mode: opt_enum(
                map,
                "mode",
                scope,
                PanelMode::parse,
                r#""hidden", "narrow" or "extended""#,
            )?,
            background: opt_string(map, "background", scope)?,
            title_color: opt_string(map, "title_color", scope)?,
            text_color: opt_string(map, "text_color", scope)?,
            icon_color: opt_string(map, "icon_color", scope)?,
            selection_color: opt_string(map, "selection_color", scope)?,
            divider_color: opt_string(map, "divider_color", scope)?,
            style: opt_string(map, "style", scope)?,
            editable: opt_bool_or_string(map, "editable", scope)?,
            hide_all: opt_bool(map, "hide_all", scope)?,
        })
    }

    /// Fill unset fields from `base`, keeping fields already set.
    pub(crate) fn or_over(self, base: &Self) -> Self {
        macro_rules! or_field {
            ($field:ident) => {
                self.$field.or_else(|| base.$field.clone())
            };
        }
        Self {
            title: or_field!(title),
            subtitle: or_field!(subtitle),
            mode: or_field!(mode),
            background: or_field!(background),
            title_color: or_field!(title_color),
            text_color: or_field!(text_color),
            icon_color: or_field!(icon_color),
            selection_color: or_field!(selection_color),
            divider_color: or_field!(divider_color),
            style: or_field!(style),
            editable: or_field!(editable),
            hide_all: or_field!(hide_all),
        }
    }
}

/// One entry of the `order` list: identifies a host entry (or declares a
/// brand-new one) and carries the options applied to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderItem {
    /// Entry identifier, interpreted per [`OrderItem::match_by`]. For new
    /// items this doubles as the default label.
    pub item: String,
    /// Which entry attribute the identifier matches against.
    pub match_by: MatchBy,
    /// Exact match instead of substring match.
    pub exact: bool,
    /// Declare a brand-new entry instead of matching an existing one.
    pub new_item: bool,
    /// Replacement label; may be templated.
    pub name: Option<String>,
    /// Icon spec.
    pub icon: Option<String>,
    /// Link target applied to the entry.
    pub href: Option<String>,
    /// Link-opening target.
    pub target: Option<Target>,
    /// Hide the entry; may be templated.
    pub hide: Option<BoolOrString>,
    /// Numeric placement hint; lower values sort earlier.
    pub order: Option<f64>,
    /// Send the entry to the bottom of the panel.
    pub bottom: bool,
    /// Badge text or count; may be templated.
    pub badge: Option<NumberOrString>,
    /// Entry background color.
    pub background: Option<String>,
    /// Entry text color.
    pub text_color: Option<String>,
    /// Entry icon color.
    pub icon_color: Option<String>,
    /// Click behavior replacing the entry's default navigation.
    pub on_click: Option<ClickAction>,
}

impl OrderItem {
    /// Extract and validate one order item.
    fn from_value(value: &Value, parent: Scope<'_>, index: usize) -> Result<Self, Error> {
        let map = object(value, parent, &format!("order item {index}"))?;
        let id = match map.get("item") {
            Some(Value::String(id)) => id.as_str(),
            Some(_) => {
                return Err(invalid_at(
                    parent,
                    format_args!("order item {index} \"item\" property should be a string"),
                ));
            }
            None => {
                return Err(invalid_at(
                    parent,
                    format_args!("order item {index} is missing the required \"item\" property"),
                ));
            }
        };
        let scope = Scope::Item(id);
        reject_unknown(map, &[ITEM_KEYS], scope)?;

        let new_item = opt_bool(map, "new_item", scope)?.unwrap_or(false);
        let href = opt_string(map, "href", scope)?;
        let icon = opt_string(map, "icon", scope)?;
        if new_item && (href.is_none() || icon.is_none()) {
            return Err(invalid_at(
                scope,
                "\"new_item\" entries require both \"href\" and \"icon\"",
            ));
        }

        let on_click = match map.get("on_click") {
            None => None,
            Some(value) => Some(parse_click(value, scope)?),
        };

        Ok(Self {
            item: id.to_string(),
            match_by: opt_enum(
                map,
                "match",
                scope,
                MatchBy::parse,
                r#""text", "key" or "href""#,
            )?
            .unwrap_or(MatchBy::Text),
            exact: opt_bool(map, "exact", scope)?.unwrap_or(false),
            new_item,
            name: opt_string(map, "name", scope)?,
            icon,
            href,
            target: opt_enum(map, "target", scope, Target::parse, r#""self" or "blank""#)?,
            hide: opt_bool_or_string(map, "hide", scope)?,
            order: opt_number(map, "order", scope)?,
            bottom: opt_bool(map, "bottom", scope)?.unwrap_or(false),
            badge: opt_number_or_string(map, "badge", scope)?,
            background: opt_string(map, "background", scope)?,
            text_color: opt_string(map, "text_color", scope)?,
            icon_color: opt_string(map, "icon_color", scope)?,
            on_click,
        })
    }
}

/// Extract and validate an `on_click` descriptor.
fn parse_click(value: &Value, scope: Scope<'_>) -> Result<ClickAction, Error> {
    let map = object(value, scope, "\"on_click\" property")?;
    let Some(kind) = map.get("action").and_then(Value::as_str) else {
        return Err(invalid_at(
            scope,
            "\"on_click\" requires an \"action\" property",
        ));
    };
    let (allowed, action): (&[&str], _) = match kind {
        "navigate" => {
            let path = opt_string(map, "path", scope)?.ok_or_else(|| {
                invalid_at(scope, "\"navigate\" actions require a \"path\" property")
            })?;
            (&["action", "path"], ClickAction::Navigate { path })
        }
        "invoke" => {
            let service = opt_string(map, "service", scope)?.ok_or_else(|| {
                invalid_at(scope, "\"invoke\" actions require a \"service\" property")
            })?;
            let data = match map.get("data") {
                None => None,
                Some(Value::Object(data)) => Some(data.clone()),
                Some(_) => return Err(bad_type(scope, "data", "an object")),
            };
            (
                &["action", "service", "data"],
                ClickAction::Invoke { service, data },
            )
        }
        "script" => {
            let code = opt_string(map, "code", scope)?.ok_or_else(|| {
                invalid_at(scope, "\"script\" actions require a \"code\" property")
            })?;
            (&["action", "code"], ClickAction::Script { code })
        }
        other => {
            return Err(invalid_at(
                scope,
                format_args!(
                    "unknown \"on_click\" action \"{other}\" (expected \"navigate\", \"invoke\" or \"script\")"
                ),
            ));
        }
    };
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) {
            return Err(invalid_at(
                scope,
                format_args!("unknown \"on_click\" property \"{key}\""),
            ));
        }
    }
    Ok(action)
}

/// A reusable, named configuration fragment referenced via `extend_from`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedFragment {
    /// Scalar options contributed by this fragment.
    pub options: PanelOptions,
    /// Order list contributed by this fragment, if declared.
    pub order: Option<Vec<OrderItem>>,
    /// Names this fragment inherits from, leftmost first. Never `base`.
    pub extend_from: Vec<String>,
}

impl NamedFragment {
    /// Extract and validate one named fragment.
    fn from_value(name: &str, value: &Value) -> Result<Self, Error> {
        let scope = Scope::Fragment(name);
        let map = object(value, scope, "the fragment")?;
        reject_unknown(map, &[SHARED_KEYS], scope)?;
        Ok(Self {
            options: PanelOptions::from_map(map, scope)?,
            order: parse_order(map, scope)?,
            extend_from: opt_string_list(map, "extend_from", scope)?.unwrap_or_default(),
        })
    }
}

/// Viewer/device predicate attached to an override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicate {
    /// Viewer names the override applies to.
    pub user: Option<Vec<String>>,
    /// Viewer names the override does not apply to.
    pub not_user: Option<Vec<String>>,
    /// Device names the override applies to.
    pub device: Option<Vec<String>>,
    /// Device names the override does not apply to.
    pub not_device: Option<Vec<String>>,
    /// Required admin flag value.
    pub is_admin: Option<bool>,
    /// Required owner flag value.
    pub is_owner: Option<bool>,
    /// How the declared predicate kinds combine.
    pub combine: Combinator,
}

/// A viewer/device-scoped configuration fragment selected by predicate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Override {
    /// Scalar options declared directly on the override.
    pub options: PanelOptions,
    /// Order list declared directly on the override, if any.
    pub order: Option<Vec<OrderItem>>,
    /// Inheritance chain; may include the literal `base`.
    pub extend_from: Vec<String>,
    /// Selection predicate.
    pub predicate: Predicate,
}

impl Override {
    /// Extract and validate one override.
    fn from_value(value: &Value, index: usize) -> Result<Self, Error> {
        let scope = Scope::Exception(index);
        let map = object(value, scope, "the exception")?;
        reject_unknown(map, &[SHARED_KEYS, PREDICATE_KEYS], scope)?;

        let user = opt_string_list(map, "user", scope)?;
        let not_user = opt_string_list(map, "not_user", scope)?;
        if user.is_some() && not_user.is_some() {
            return Err(invalid_at(
                scope,
                "\"user\" and \"not_user\" properties are mutually exclusive",
            ));
        }
        let device = opt_string_list(map, "device", scope)?;
        let not_device = opt_string_list(map, "not_device", scope)?;
        if device.is_some() && not_device.is_some() {
            return Err(invalid_at(
                scope,
                "\"device\" and \"not_device\" properties are mutually exclusive",
            ));
        }

        Ok(Self {
            options: PanelOptions::from_map(map, scope)?,
            order: parse_order(map, scope)?,
            extend_from: opt_string_list(map, "extend_from", scope)?.unwrap_or_default(),
            predicate: Predicate {
                user,
                not_user,
                device,
                not_device,
                is_admin: opt_bool(map, "is_admin", scope)?,
                is_owner: opt_bool(map, "is_owner", scope)?,
                combine: opt_enum(
                    map,
                    "combine",
                    scope,
                    Combinator::parse,
                    r#""and" or "or""#,
                )?
                .unwrap_or_default(),
            },
        })
    }
}

/// The root user-authored configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    /// Document identifier, used to recognize the shipped example.
    pub id: Option<String>,
    /// Scalar options declared at the root.
    pub options: PanelOptions,
    /// Root order list, if declared.
    pub order: Option<Vec<OrderItem>>,
    /// Inheritance chain of the root itself. Never `base`.
    pub extend_from: Vec<String>,
    /// Viewer/device overrides, in declaration order.
    pub exceptions: Vec<Override>,
    /// Reusable named fragments.
    pub fragments: BTreeMap<String, NamedFragment>,
    /// Named template snippets referenced via `@partial`.
    pub partials: BTreeMap<String, String>,
    /// Variables injected into script-dialect evaluations.
    pub script_variables: BTreeMap<String, Value>,
    /// Variables added to every markup-dialect bundle.
    pub markup_variables: BTreeMap<String, Value>,
}

impl Document {
    /// Validate a parsed JSON document and convert it into the typed model.
    ///
    /// Fails fast on the first structural violation. Graph-level checks
    /// (inheritance cycles, unknown fragment names) run separately in
    /// [`crate::validate_extends`].
    pub fn from_value(value: &Value) -> Result<Self, Error> {
        let map = object(value, Scope::Root, "the configuration")?;
        reject_unknown(map, &[DOCUMENT_ONLY, SHARED_KEYS], Scope::Root)?;

        let id = opt_string(map, "id", Scope::Root)?;
        if id.as_deref() == Some(EXAMPLE_ID) {
            warn!("example configuration detected; the panel is running on placeholder settings");
        }

        let exceptions = match map.get("exceptions") {
            None => Vec::new(),
            Some(Value::Array(items)) => {
                let mut exceptions = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    exceptions.push(Override::from_value(item, index)?);
                }
                exceptions
            }
            Some(_) => return Err(bad_type(Scope::Root, "exceptions", "an array")),
        };

        let fragments = match map.get("fragments") {
            None => BTreeMap::new(),
            Some(Value::Object(entries)) => {
                let mut fragments = BTreeMap::new();
                for (name, value) in entries {
                    let _previous =
                        fragments.insert(name.clone(), NamedFragment::from_value(name, value)?);
                }
                fragments
            }
            Some(_) => return Err(bad_type(Scope::Root, "fragments", "an object")),
        };

        let partials = match map.get("partials") {
            None => BTreeMap::new(),
            Some(Value::Object(entries)) => {
                let mut partials = BTreeMap::new();
                for (name, value) in entries {
                    match value {
                        Value::String(body) => {
                            let _previous = partials.insert(name.clone(), body.clone());
                        }
                        _ => return Err(bad_type(Scope::Partials, name, "a string")),
                    }
                }
                partials
            }
            Some(_) => return Err(bad_type(Scope::Root, "partials", "an object")),
        };

        Ok(Self {
            id,
            options: PanelOptions::from_map(map, Scope::Root)?,
            order: parse_order(map, Scope::Root)?,
            extend_from: opt_string_list(map, "extend_from", Scope::Root)?.unwrap_or_default(),
            exceptions,
            fragments,
            partials,
            script_variables: parse_variables(map, "script_variables")?,
            markup_variables: parse_variables(map, "markup_variables")?,
        })
    }
}

/// Extract the `order` list of a document, fragment, or override scope.
fn parse_order(
    map: &Map<String, Value>,
    scope: Scope<'_>,
) -> Result<Option<Vec<OrderItem>>, Error> {
    match map.get("order") {
        None => Ok(None),
        Some(Value::Array(items)) => {
            let mut order = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                order.push(OrderItem::from_value(item, scope, index)?);
            }
            Ok(Some(order))
        }
        Some(_) => Err(bad_type(scope, "order", "an array")),
    }
}

/// Extract one of the variable maps, recursively type-checking its values.
///
/// Variable maps hold resolved values, never live expressions: a string
/// value that classifies as a template is accepted as-is but logged.
fn parse_variables(
    map: &Map<String, Value>,
    key: &'static str,
) -> Result<BTreeMap<String, Value>, Error> {
    let entries = match map.get(key) {
        None => return Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => entries,
        Some(_) => return Err(bad_type(Scope::Root, key, "an object")),
    };
    let scope = Scope::Variables(key);
    let mut variables = BTreeMap::new();
    for (name, value) in entries {
        check_variable(name, value, scope)?;
        let _previous = variables.insert(name.clone(), value.clone());
    }
    Ok(variables)
}

/// Recursive value check for variable maps: strings, numbers, booleans, and
/// nested maps/lists of the same.
fn check_variable(path: &str, value: &Value, scope: Scope<'_>) -> Result<(), Error> {
    match value {
        Value::String(text) => {
            if dialect::is_template(text) {
                warn!(
                    "\"{path}\" in {scope} looks like a template; variables should hold resolved values"
                );
            }
            Ok(())
        }
        Value::Number(_) | Value::Bool(_) => Ok(()),
        Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                check_variable(&format!("{path}[{index}]"), item, scope)?;
            }
            Ok(())
        }
        Value::Object(entries) => {
            for (name, nested) in entries {
                check_variable(&format!("{path}.{name}"), nested, scope)?;
            }
            Ok(())
        }
        Value::Null => Err(invalid_at(
            scope,
            format_args!("\"{path}\" should be a string, number or boolean"),
        )),
    }
}
