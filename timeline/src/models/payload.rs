//! Type-erased event payloads
//!
//! The timeline never looks inside a payload. Subscribers recover the
//! concrete value with [`Payload::downcast_ref`], which fails cleanly with
//! [`PayloadError::TypeMismatch`] when the payload holds some other type.
//!
//! # Example
//!
//! ```rust
//! use timeline_core::{Payload, PayloadError};
//!
//! let payload = Payload::new(42_u32);
//! assert_eq!(payload.downcast_ref::<u32>(), Ok(&42));
//! assert!(matches!(
//!     payload.downcast_ref::<String>(),
//!     Err(PayloadError::TypeMismatch { .. })
//! ));
//! ```

use std::any::{self, Any};
use std::fmt;
use thiserror::Error;

/// Errors raised when interpreting a payload
#[derive(Debug, Error, PartialEq)]
pub enum PayloadError {
    #[error("Payload type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: &'static str,
        actual: &'static str,
    },
}

/// Object-safe view of a clonable `Any` value
trait ErasedValue: Any {
    fn clone_boxed(&self) -> Box<dyn ErasedValue>;
    fn as_any(&self) -> &dyn Any;
    fn type_name(&self) -> &'static str;
}

impl<T: Any + Clone> ErasedValue for T {
    fn clone_boxed(&self) -> Box<dyn ErasedValue> {
        Box::new(self.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn type_name(&self) -> &'static str {
        any::type_name::<T>()
    }
}

/// An opaque, clonable value carried by an [`Event`](crate::Event)
///
/// Cloning a payload deep-clones the value it holds.
pub struct Payload {
    value: Box<dyn ErasedValue>,
}

impl Payload {
    /// Wrap any clonable value
    pub fn new<T: Any + Clone>(value: T) -> Self {
        Self {
            value: Box::new(value),
        }
    }

    /// Check whether the payload holds a `T`
    pub fn is<T: Any>(&self) -> bool {
        (*self.value).as_any().is::<T>()
    }

    /// Borrow the payload as a `T`
    ///
    /// # Errors
    /// Returns [`PayloadError::TypeMismatch`] if the payload is not a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Result<&T, PayloadError> {
        (*self.value)
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| PayloadError::TypeMismatch {
                expected: any::type_name::<T>(),
                actual: self.type_name(),
            })
    }

    /// Name of the concrete type held, for diagnostics only
    pub fn type_name(&self) -> &'static str {
        (*self.value).type_name()
    }
}

impl Clone for Payload {
    fn clone(&self) -> Self {
        Self {
            value: (*self.value).clone_boxed(),
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Payload").field(&self.type_name()).finish()
    }
}
