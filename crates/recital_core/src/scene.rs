//! Visual state and scene deltas.
//!
//! A [`VisualState`] is the flat field map a renderer reads. It is never
//! edited in place: each line's [`SceneDelta`] is merged into the previous
//! state to produce a new one, so consumers can diff consecutive states.

use derive_builder::Builder;
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Top-level keys whose object values merge key-by-key instead of being
/// replaced wholesale.
pub const NESTED_MERGE_KEYS: [&str; 4] = ["show", "highlight", "params", "annotation"];

/// Renderer hint attached to a scene delta. Ignored by the engine.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SceneKind {
    /// Title card
    Title,
    /// Plain text explanation
    Text,
    /// Waveform plot
    Waveform,
    /// Spectrum plot
    Spectrum,
    /// Formula display
    Formula,
    /// Side-by-side comparison
    Comparison,
    /// Animated demonstration
    Animation,
    /// Interactive diagram
    Interactive,
    /// Real-world application
    Application,
    /// Illustration image
    Illustration,
    /// Summary card
    Summary,
}

/// Partial visual state attached to one line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters, Builder)]
#[builder(default, setter(into), build_fn(error = "recital_error::BuilderError"))]
pub struct SceneDelta {
    /// Renderer hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(setter(into, strip_option))]
    kind: Option<SceneKind>,
    /// Fields to override
    #[serde(default)]
    state: Map<String, Value>,
}

impl SceneDelta {
    /// Creates a delta from a field map.
    pub fn new(state: Map<String, Value>) -> Self {
        Self { kind: None, state }
    }

    /// Whether the delta changes nothing.
    pub fn is_empty(&self) -> bool {
        self.state.is_empty()
    }
}

/// Resolved, concrete visual state for the current line.
///
/// # Examples
///
/// ```
/// use recital_core::{SceneDelta, VisualState};
/// use serde_json::json;
///
/// let base = VisualState::try_from(json!({"show": {"axes": true, "grid": true}})).unwrap();
/// let delta = SceneDelta::new(json!({"show": {"grid": false}}).as_object().cloned().unwrap());
///
/// let next = base.merged(&delta);
/// assert_eq!(next.get("show"), Some(&json!({"axes": true, "grid": false})));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VisualState(Map<String, Value>);

impl VisualState {
    /// Creates an empty state.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Gets a top-level field.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Gets a field inside one of the nested maps (e.g. `show.grid`).
    pub fn get_nested(&self, key: &str, field: &str) -> Option<&Value> {
        self.0.get(key).and_then(|value| value.get(field))
    }

    /// All fields.
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Whether the state has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns a new state with `delta` applied.
    ///
    /// Top-level keys are replaced, except the [`NESTED_MERGE_KEYS`] objects,
    /// which merge per leaf key. The later value always wins, so an explicit
    /// `false` or `0` overrides an earlier `true` or non-zero value.
    pub fn merged(&self, delta: &SceneDelta) -> VisualState {
        let mut next = self.0.clone();

        for (key, value) in delta.state() {
            let nested = NESTED_MERGE_KEYS.contains(&key.as_str());
            debug_assert!(
                !nested || matches!(value, Value::Object(_) | Value::Array(_) | Value::Null),
                "scene delta key '{key}' must be an object, array or null"
            );

            match (next.get_mut(key), value) {
                (Some(Value::Object(current)), Value::Object(patch)) if nested => {
                    for (field, field_value) in patch {
                        current.insert(field.clone(), field_value.clone());
                    }
                }
                _ => {
                    next.insert(key.clone(), value.clone());
                }
            }
        }

        VisualState(next)
    }
}

impl From<Map<String, Value>> for VisualState {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

impl TryFrom<Value> for VisualState {
    type Error = Value;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            other => Err(other),
        }
    }
}
