/// A wrapper that redacts its contents in `Debug` output.
///
/// Wraps the catalog database URL, which may embed a password. The inner value is reachable
/// through `Deref`, but `Debug` prints `<redacted>`.
///
/// There is no `Serialize` implementation, so a loaded config cannot be written back out with
/// the secret in it.
#[derive(Clone, PartialEq, Eq)]
pub struct Redacted<T>(T);

impl<T> From<T> for Redacted<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> std::ops::Deref for Redacted<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> std::fmt::Debug for Redacted<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("<redacted>")
    }
}

impl<'de, T> serde::Deserialize<'de> for Redacted<T>
where
    T: serde::Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Redacted)
    }
}
