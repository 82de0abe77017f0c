use std::fmt;

/// Policy deciding whether a resolved instance is shared or built per call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifecycle {
    /// Built once, cached, and shared by every resolution until the registration is
    /// overridden, unregistered or cleared.
    Singleton,
    /// Built fresh by the factory on every resolution. Never cached.
    Runtime,
}

impl fmt::Display for Lifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lifecycle::Singleton => f.write_str("singleton"),
            Lifecycle::Runtime => f.write_str("runtime"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(Lifecycle::Singleton.to_string(), "singleton");
        assert_eq!(Lifecycle::Runtime.to_string(), "runtime");
    }
}
