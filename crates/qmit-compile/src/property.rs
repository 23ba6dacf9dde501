//! `PropertySet` for pass communication.
//!
//! Passes share data through a [`PropertySet`]: the device duration table as a
//! standard property, plus arbitrary typed values such as the
//! [`Schedule`](crate::Schedule) written by the scheduling analysis.
//!
//! ```
//! use qmit_compile::{DurationTable, PropertySet};
//!
//! #[derive(Debug, PartialEq)]
//! struct FoldStats {
//!     gates_added: usize,
//! }
//!
//! let mut props = PropertySet::new().with_durations(DurationTable::ibm_eagle());
//! props.insert(FoldStats { gates_added: 12 });
//!
//! assert!(props.durations.is_some());
//! assert_eq!(props.get::<FoldStats>().unwrap().gates_added, 12);
//! ```

use rustc_hash::FxHashMap;
use std::any::{Any, TypeId};

use crate::durations::DurationTable;
use crate::error::{CompileError, CompileResult};

/// Shared state threaded through a pass pipeline.
#[derive(Debug, Default)]
pub struct PropertySet {
    /// Gate durations of the target device.
    ///
    /// Required by scheduling and decoupling passes.
    pub durations: Option<DurationTable>,

    /// Custom properties storage (type-erased).
    custom: FxHashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl PropertySet {
    /// Create a new empty property set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the duration table.
    #[must_use]
    pub fn with_durations(mut self, durations: DurationTable) -> Self {
        self.durations = Some(durations);
        self
    }

    /// The duration table, or an error if none was configured.
    pub fn require_durations(&self) -> CompileResult<&DurationTable> {
        self.durations
            .as_ref()
            .ok_or(CompileError::MissingDurationTable)
    }

    /// Insert a custom property.
    pub fn insert<T: Any + Send + Sync>(&mut self, value: T) {
        self.custom.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Get a custom property.
    pub fn get<T: Any>(&self) -> Option<&T> {
        self.custom
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Remove a custom property.
    pub fn remove<T: Any>(&mut self) -> Option<T> {
        self.custom
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|v| *v)
    }
}
