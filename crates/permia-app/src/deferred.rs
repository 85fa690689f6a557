// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

/// A value with two views: `immediate` follows every write, `deferred`
/// catches up only when the owner calls [`DeferredValue::tick`] at an idle
/// point. Writes between ticks coalesce; only the latest one is applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeferredValue<T> {
    immediate: T,
    deferred: T,
    pending: bool,
}

impl<T: Clone + PartialEq> DeferredValue<T> {
    pub fn new(value: T) -> Self {
        Self {
            immediate: value.clone(),
            deferred: value,
            pending: false,
        }
    }

    pub fn immediate(&self) -> &T {
        &self.immediate
    }

    pub fn deferred(&self) -> &T {
        &self.deferred
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Records a new immediate value, superseding any pending one.
    pub fn set(&mut self, value: T) {
        self.pending = value != self.deferred;
        self.immediate = value;
    }

    /// Publishes the latest immediate value. Returns true when the deferred
    /// value changed.
    pub fn tick(&mut self) -> bool {
        if !self.pending {
            return false;
        }
        self.pending = false;
        self.deferred = self.immediate.clone();
        true
    }

    /// Sets both views at once, skipping the idle catch-up.
    pub fn reset(&mut self, value: T) {
        self.immediate = value.clone();
        self.deferred = value;
        self.pending = false;
    }
}

#[cfg(test)]
mod tests {
    use super::DeferredValue;

    #[test]
    fn burst_of_writes_publishes_only_the_last() {
        let mut term = DeferredValue::new(String::new());
        for partial in ["c", "cl", "cla", "clau"] {
            term.set(partial.to_owned());
            assert_eq!(term.immediate(), partial);
            assert_eq!(term.deferred(), "");
        }
        assert!(term.is_pending());

        assert!(term.tick());
        assert_eq!(term.deferred(), "clau");
        assert!(!term.tick());
    }

    #[test]
    fn writing_back_the_published_value_cancels_the_pending_tick() {
        let mut term = DeferredValue::new("pro".to_owned());
        term.set("prox".to_owned());
        term.set("pro".to_owned());
        assert!(!term.is_pending());
        assert!(!term.tick());
    }

    #[test]
    fn reset_skips_catch_up() {
        let mut term = DeferredValue::new(0_u32);
        term.set(3);
        term.reset(7);
        assert_eq!(*term.immediate(), 7);
        assert_eq!(*term.deferred(), 7);
        assert!(!term.tick());
    }
}
