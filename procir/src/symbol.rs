use std::fmt;

/// An interned external label attached to a block, e.g. an exported entrypoint or an
/// address-taken marker. Procedures carry few enough of these that a simple owned string
/// is sufficient; no interning table is needed at this scale.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol(std::rc::Rc<str>);

impl Symbol {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(std::rc::Rc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<T: AsRef<str>> From<T> for Symbol {
    fn from(name: T) -> Self {
        Self::new(name)
    }
}
