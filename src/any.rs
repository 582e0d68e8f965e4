use std::{
    any::{type_name, Any, TypeId},
    cmp::Ordering,
    fmt::{self, Display, Formatter},
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Type-erased instance as stored by a bootstrapper.
///
/// The value inside is always an `Arc<C>` for the contract `C` it was registered under,
/// which allows unsized contracts (`dyn Trait`) to be stored behind [`Any`].
pub type AnyInstance = Arc<dyn Any + Send + Sync>;

#[derive(Debug, Clone, Copy)]
pub struct TypeInfo {
    pub name: &'static str,
    pub id: TypeId,
}

impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl PartialOrd for TypeInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TypeInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.id.cmp(&other.id)
    }
}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Display for TypeInfo {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl TypeInfo {
    #[inline]
    #[must_use]
    pub fn of<T>() -> Self
    where
        T: ?Sized + 'static,
    {
        Self {
            name: type_name::<T>(),
            id: TypeId::of::<T>(),
        }
    }
}

/// Registration key: the contract plus an optional name (empty for the default registration).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Key {
    pub contract: TypeInfo,
    pub name: String,
}

impl Key {
    #[inline]
    #[must_use]
    pub fn new<C: ?Sized + 'static>(name: &str) -> Self {
        Self {
            contract: TypeInfo::of::<C>(),
            name: name.to_owned(),
        }
    }

    #[inline]
    #[must_use]
    pub fn of<C: ?Sized + 'static>() -> Self {
        Self::new::<C>("")
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "{}", self.contract)
        } else {
            write!(f, "{} ({})", self.contract, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Key;

    use std::collections::BTreeMap;

    struct Request;
    trait Repo {}

    #[test]
    fn test_key_identity() {
        let mut map = BTreeMap::new();
        map.insert(Key::of::<dyn Repo>(), 1);
        map.insert(Key::new::<dyn Repo>("replica"), 2);
        map.insert(Key::of::<dyn Repo>(), 3);

        assert_eq!(map.len(), 2);
        assert_eq!(map[&Key::of::<dyn Repo>()], 3);
        assert_ne!(Key::of::<Request>(), Key::of::<dyn Repo>());
        assert_eq!(Key::new::<Request>("a").to_string(), format!("{} (a)", core::any::type_name::<Request>()));
    }
}
