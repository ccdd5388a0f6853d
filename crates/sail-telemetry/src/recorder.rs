use core::fmt;

use fastrace::Span;

use crate::common::SpanAttribute;

/// Records the outcome of a [`Result`] in the given span.
/// The error message is attached when the result is an error.
pub fn record_error<T, E>(span: &Span, result: &Result<T, E>)
where
    E: fmt::Display,
{
    match result {
        Ok(_) => span.add_property(|| (SpanAttribute::SPAN_STATUS_CODE, "OK")),
        Err(e) => span.add_properties(|| {
            [
                (SpanAttribute::SPAN_STATUS_CODE, "ERROR".to_string()),
                (SpanAttribute::EXCEPTION_MESSAGE, e.to_string()),
            ]
        }),
    }
}
