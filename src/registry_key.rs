//! Registration keys.
//!
//! A key names one registration slot. It is derived from the capability's type name and an
//! optional identifier, and is never parsed back.

use std::fmt;

/// Separator between the type name and an explicit identifier.
///
/// `std::any::type_name` never yields `#`, so a key without an identifier can not be
/// produced by any explicit identifier.
const IDENTIFIER_SEPARATOR: char = '#';

/// Opaque key identifying one registration slot.
///
/// # Examples
///
/// ```rust
/// use service_registry::RegistrationKey;
///
/// let default_slot = RegistrationKey::of::<String>(None);
/// let named_slot = RegistrationKey::of::<String>(Some("greeting"));
///
/// assert_ne!(default_slot, named_slot);
/// assert_eq!(named_slot, RegistrationKey::of::<String>(Some("greeting")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RegistrationKey(String);

impl RegistrationKey {
    /// Derives the key for capability `C` and an optional identifier.
    pub fn of<C: ?Sized + 'static>(identifier: Option<&str>) -> Self {
        let type_name = std::any::type_name::<C>();
        match identifier {
            None => Self(type_name.to_owned()),
            Some(identifier) => {
                let mut key = String::with_capacity(type_name.len() + identifier.len() + 1);
                key.push_str(type_name);
                key.push(IDENTIFIER_SEPARATOR);
                key.push_str(identifier);
                Self(key)
            }
        }
    }

    /// The key as a string slice, for logging and diagnostics.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegistrationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RegistrationKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
