//! Probe label selection.

use super::unit::{Function, Receiver};
use crate::utils::config::{INSTANCE_SEPARATOR, STATIC_SEPARATOR};

/// Label for a function with no usable custom label:
/// `Type.f(int)` for static functions, `Type#g()` for instance methods.
pub fn synthesize_label(type_name: &str, function: &Function) -> String {
    let separator = match function.receiver {
        Receiver::Static => STATIC_SEPARATOR,
        Receiver::Instance => INSTANCE_SEPARATOR,
    };
    format!("{}{}{}", type_name, separator, function.signature())
}

/// Label the probes of `function` should carry, or `None` if it is not marked
pub fn probe_label(type_name: &str, function: &Function) -> Option<String> {
    let marker = function.marker.as_ref()?;
    match marker.label.as_deref() {
        Some(label) if !label.is_empty() => Some(label.to_string()),
        _ => Some(synthesize_label(type_name, function)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::unit::{Marker, Param, ValueType};

    #[test]
    fn test_custom_label_used_verbatim() {
        let mut function = Function::new("multiple_return");
        function.marker = Some(Marker::labeled("Return multiple"));

        assert_eq!(
            probe_label("Test", &function).as_deref(),
            Some("Return multiple")
        );
    }

    #[test]
    fn test_empty_label_falls_back_to_synthesized() {
        let mut function = Function::new("run");
        function.marker = Some(Marker::labeled(""));

        assert_eq!(probe_label("Job", &function).as_deref(), Some("Job.run()"));
    }

    #[test]
    fn test_overloads_get_distinct_labels() {
        let mut one = Function::new("add");
        one.params.push(Param {
            name: "a".to_string(),
            ty: ValueType::Int,
        });
        one.returns = Some(ValueType::Int);
        let mut two = one.clone();
        two.params.push(Param {
            name: "b".to_string(),
            ty: ValueType::Int,
        });
        two.receiver = Receiver::Instance;

        assert_eq!(synthesize_label("Math", &one), "Math.add(int) -> int");
        assert_eq!(synthesize_label("Math", &two), "Math#add(int, int) -> int");
    }

    #[test]
    fn test_unmarked_function_has_no_label() {
        assert!(probe_label("T", &Function::new("f")).is_none());
    }
}
