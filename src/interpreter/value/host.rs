use std::rc::Rc;

use crate::interpreter::value::core::Value;

/// The calling convention for native functions.
///
/// Every registered native — builtin, host-injected, or a bound host-object
/// method — is a synchronous variadic callable from a slice of argument
/// values to a value. A returned `Err` carries the host's message, which is
/// surfaced to the script unchanged.
pub type NativeFn = Rc<dyn Fn(&[Value]) -> Result<Value, String>>;

/// A member resolved on a host object.
pub enum HostMember {
    /// A plain field value.
    Field(Value),
    /// A callable bound to its receiver.
    ///
    /// Invoking the returned function calls the host method with the
    /// original receiver as implicit context; the implementor captures the
    /// receiver when building the closure.
    Method(NativeFn),
}

/// The capability that exposes an external object's fields and methods to
/// scripts.
///
/// Host applications implement this for the objects they inject, instead of
/// converting them into plain data objects first. The interpreter only ever
/// asks one question: "what is member `name` on this object?" — a field
/// value, a bound method, or nothing.
///
/// # Example
/// ```
/// use std::rc::Rc;
///
/// use quill::interpreter::value::{
///     core::Value,
///     host::{HostMember, HostObject},
/// };
///
/// struct Counter {
///     count: f64,
/// }
///
/// impl HostObject for Counter {
///     fn type_name(&self) -> &str {
///         "Counter"
///     }
///
///     fn member(self: Rc<Self>, name: &str) -> Option<HostMember> {
///         match name {
///             "count" => Some(HostMember::Field(Value::Number(self.count))),
///             "doubled" => {
///                 let receiver = Rc::clone(&self);
///                 Some(HostMember::Method(Rc::new(move |_args| {
///                     Ok(Value::Number(receiver.count * 2.0))
///                 })))
///             },
///             _ => None,
///         }
///     }
/// }
///
/// let counter = Rc::new(Counter { count: 21.0 });
/// let value = Value::Host(counter);
/// assert!(value.is_truthy());
/// ```
pub trait HostObject {
    /// A short name for the object's kind, used in display and error
    /// messages.
    fn type_name(&self) -> &str;

    /// Resolves a member by name.
    ///
    /// Returns `None` when the object has no such member; the script then
    /// observes null.
    fn member(self: Rc<Self>, name: &str) -> Option<HostMember>;
}
