use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use anyhow::Result;

/// Typed value storage connecting the modules of a step pipeline.
///
/// Values are keyed by their concrete type, so each payload (field,
/// average temperature, heating state, ...) has exactly one slot.
#[derive(Default)]
pub struct Bus {
    values: HashMap<TypeId, Box<dyn Any>>,
}

impl Bus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the stored value of type `T`.
    pub fn put<T: 'static>(&mut self, value: T) {
        self.values.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Gets a reference to the stored value of type `T`, if present.
    pub fn get<T: 'static>(&self) -> Option<&T> {
        self.values
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref::<T>())
    }

    /// Gets a mutable reference to the stored value of type `T`, if present.
    pub fn get_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.values
            .get_mut(&TypeId::of::<T>())
            .and_then(|v| v.downcast_mut::<T>())
    }

    /// Like [`Self::get`], but a missing value is an error naming `who` needs it.
    pub fn require<T: 'static>(&self, who: &str) -> Result<&T> {
        match self.get::<T>() {
            Some(v) => Ok(v),
            None => anyhow::bail!("{who} requires {} on the Bus", type_name::<T>()),
        }
    }

    /// Like [`Self::get_mut`], but a missing value is an error.
    pub fn require_mut<T: 'static>(&mut self, who: &str) -> Result<&mut T> {
        match self.get_mut::<T>() {
            Some(v) => Ok(v),
            None => anyhow::bail!("{who} requires {} on the Bus", type_name::<T>()),
        }
    }

    /// Removes and returns the stored value of type `T`, if present.
    pub fn take<T: 'static>(&mut self) -> Option<T> {
        self.values
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast::<T>().ok())
            .map(|b| *b)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Marker(u32);

    #[test]
    fn test_put_get_take() {
        let mut bus = Bus::new();
        assert!(bus.get::<Marker>().is_none());
        bus.put(Marker(1));
        bus.put(Marker(2));
        assert_eq!(bus.get::<Marker>(), Some(&Marker(2)));
        bus.require_mut::<Marker>("test").unwrap().0 = 3;
        assert_eq!(bus.take::<Marker>(), Some(Marker(3)));
        assert!(bus.take::<Marker>().is_none());
    }

    #[test]
    fn test_require_names_missing_type() {
        let bus = Bus::new();
        let err = bus.require::<Marker>("SomeModule").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("SomeModule requires"), "{msg}");
        assert!(msg.contains("Marker"), "{msg}");
    }
}
