use std::any::Any;
use std::fmt;

use crate::error::CastError;

/// A unit of work executed by the pool.
///
/// Tasks are handed to [`ThreadPool::submit`](crate::ThreadPool::submit) by
/// shared ownership (`Arc<dyn Task>`) and invoked exactly once by whichever
/// worker dequeues them. Whatever `run` returns is delivered to the
/// submitter through the [`TaskResult`](crate::TaskResult) handle.
///
/// A task that can fail should encode the failure in its returned value
/// (for example a `Result` wrapped in the [`TaskValue`]); the worker always
/// forwards whatever `run` produces.
pub trait Task: Send + Sync {
    fn run(&self) -> TaskValue;
}

// Any sendable closure producing a TaskValue is a task.
impl<F> Task for F
where
    F: Fn() -> TaskValue + Send + Sync,
{
    fn run(&self) -> TaskValue {
        self()
    }
}

/// A move-only, type-erased holder for a task's produced value.
///
/// Stores any `T: Send + 'static`, including move-only payloads such as
/// file handles or large buffers. The value is extracted at most once with
/// [`cast`](TaskValue::cast), which consumes the holder.
pub struct TaskValue {
    value: Option<Box<dyn Any + Send>>,
}

impl TaskValue {
    /// Wraps a concrete value.
    pub fn new<T: Send + 'static>(value: T) -> Self {
        Self {
            value: Some(Box::new(value)),
        }
    }

    /// The absent sentinel, as returned by invalid result handles.
    pub fn empty() -> Self {
        Self { value: None }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
    }

    /// Extracts the stored value as `T`.
    ///
    /// Fails with [`CastError::TypeMismatch`] when the stored dynamic type
    /// is not `T`, and with [`CastError::Empty`] on the absent sentinel.
    pub fn cast<T: Send + 'static>(self) -> Result<T, CastError> {
        let boxed = self.value.ok_or(CastError::Empty)?;
        boxed
            .downcast::<T>()
            .map(|value| *value)
            .map_err(|_| CastError::TypeMismatch {
                expected: std::any::type_name::<T>(),
            })
    }
}

impl fmt::Debug for TaskValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskValue")
            .field("present", &self.value.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_round_trips() {
        let value = TaskValue::new(42u64);
        assert_eq!(value.cast::<u64>(), Ok(42));
    }

    #[test]
    fn cast_rejects_wrong_type() {
        let value = TaskValue::new(42u64);
        assert!(matches!(
            value.cast::<String>(),
            Err(CastError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn cast_on_empty_fails() {
        assert_eq!(TaskValue::empty().cast::<u64>(), Err(CastError::Empty));
    }

    #[test]
    fn holds_move_only_payloads() {
        let value = TaskValue::new(vec![String::from("a"), String::from("b")]);
        let payload = value.cast::<Vec<String>>().unwrap();
        assert_eq!(payload.len(), 2);
    }

    #[test]
    fn closures_are_tasks() {
        let task = || TaskValue::new(7i32);
        assert_eq!(Task::run(&task).cast::<i32>(), Ok(7));
    }
}
