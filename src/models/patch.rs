use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// One field of a partial update.
///
/// JSON has three shapes for a field in an update body: missing, `null`, or a
/// value. `Option<T>` folds the first two together; this keeps them apart so
/// "leave it alone" and "set it to null" never get confused.
///
/// Use with `#[serde(default, skip_serializing_if = "Patch::is_absent")]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch<T> {
    Absent,
    Null,
    Value(T),
}

impl<T> Default for Patch<T> {
    fn default() -> Self {
        Patch::Absent
    }
}

impl<T> Patch<T> {
    pub fn is_absent(&self) -> bool {
        matches!(self, Patch::Absent)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Patch::Value(value) => Some(value),
            Patch::Absent | Patch::Null => None,
        }
    }

    /// `Ok(None)` when absent, `Ok(Some(_))` for a value, `Err(NullValue)`
    /// for an explicit null on a field that cannot hold one.
    pub fn into_required(self) -> Result<Option<T>, NullValue> {
        match self {
            Patch::Absent => Ok(None),
            Patch::Null => Err(NullValue),
            Patch::Value(value) => Ok(Some(value)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NullValue;

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Value(value)
    }
}

impl<'de, T> Deserialize<'de> for Patch<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Only reached when the key is present; a missing key falls back to
        // `Default`, i.e. `Absent`.
        Option::<T>::deserialize(deserializer).map(|value| match value {
            Some(value) => Patch::Value(value),
            None => Patch::Null,
        })
    }
}

impl<T> Serialize for Patch<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Patch::Value(value) => value.serialize(serializer),
            Patch::Absent | Patch::Null => serializer.serialize_none(),
        }
    }
}
