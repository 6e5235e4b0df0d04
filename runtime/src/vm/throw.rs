//! Convenience constructors for the handful of VM-internal exceptions that get
//! thrown from more than one call site. Everything here is a thin wrapper around
//! `JavaExceptionFromJvm`; the `throw_exception!`/`build_exception!` macros cover
//! the rest of the call sites directly.

use crate::JvmError;
use crate::error::JavaExceptionKind;
use crate::keys::{MethodKey, Symbol};
use crate::{build_exception, throw_exception};

pub fn null_pointer_exception() -> JvmError {
    build_exception!(NullPointerException)
}

pub fn array_index_out_of_bounds(index: i32, length: i32) -> JvmError {
    build_exception!(
        ArrayIndexOutOfBoundsException,
        "Index {} out of bounds for length {}",
        index,
        length
    )
}

pub fn negative_array_size(length: i32) -> JvmError {
    build_exception!(NegativeArraySizeException, length.to_string())
}

pub fn no_such_method(method_key: MethodKey, class_sym: Symbol) -> JvmError {
    build_exception!(NoSuchMethodError, method_key: method_key, class_sym: class_sym)
}

/// Thrown by `checkcast` and by OSR/exception dispatch frames that re-derive a cast
/// the JIT had already proven would fail.
pub fn class_cast_exception(interner: &lasso::ThreadedRodeo, from: Symbol, to: Symbol) -> JvmError {
    build_exception!(
        ClassCastException,
        "class {} cannot be cast to class {}",
        interner.resolve(&from),
        interner.resolve(&to)
    )
}

pub fn out_of_memory() -> JvmError {
    build_exception!(OutOfMemoryError, "Java heap space")
}

/// Wraps a `<clinit>` failure. The JVMS requires the *first* failure to
/// wrap in `ExceptionInInitializerError`; subsequent accesses throw `NoClassDefFoundError`
/// directly (not modeled separately here - the class simply stays `UnderInit` forever,
/// and callers see this same wrapped exception again).
pub fn exception_in_initializer_error(cause: JvmError) -> JvmError {
    let cause = match cause {
        JvmError::JavaException(e) => Some(Box::new(e)),
        _ => None,
    };
    JvmError::JavaException(crate::error::JavaExceptionFromJvm {
        kind: JavaExceptionKind::ExceptionInInitializerError,
        message: None,
        cause,
    })
}

pub fn no_class_def_found_error(name: &str) -> JvmError {
    build_exception!(NoClassDefFoundError, name.to_string())
}

pub fn throw_null_pointer<T>() -> Result<T, JvmError> {
    throw_exception!(NullPointerException)
}

pub fn throw_class_not_found<T>(name: &str) -> Result<T, JvmError> {
    throw_exception!(ClassNotFoundException, name.to_string())
}

pub fn exception_class_name(kind: JavaExceptionKind) -> &'static str {
    kind.class_name()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_index_out_of_bounds_names_index_and_length() {
        let err = array_index_out_of_bounds(5, 3);
        match err {
            JvmError::JavaException(e) => {
                assert_eq!(e.kind, JavaExceptionKind::ArrayIndexOutOfBoundsException);
                match e.message {
                    Some(crate::error::ExceptionMessage::Resolved(msg)) => {
                        assert!(msg.contains('5'));
                        assert!(msg.contains('3'));
                    }
                    other => panic!("expected a resolved message, got {other:?}"),
                }
            }
            other => panic!("expected a Java exception, got {other:?}"),
        }
    }

    #[test]
    fn exception_in_initializer_error_wraps_a_java_cause() {
        let cause = null_pointer_exception();
        let wrapped = exception_in_initializer_error(cause);
        match wrapped {
            JvmError::JavaException(e) => {
                assert_eq!(e.kind, JavaExceptionKind::ExceptionInInitializerError);
                let cause = e.cause.expect("cause should be preserved");
                assert_eq!(cause.kind, JavaExceptionKind::NullPointerException);
            }
            other => panic!("expected a Java exception, got {other:?}"),
        }
    }

    #[test]
    fn exception_in_initializer_error_drops_non_java_cause() {
        let wrapped = exception_in_initializer_error(JvmError::StackOverflow);
        match wrapped {
            JvmError::JavaException(e) => assert!(e.cause.is_none()),
            other => panic!("expected a Java exception, got {other:?}"),
        }
    }
}
