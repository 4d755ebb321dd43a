/// The evaluation context, limit checks, and the main dispatch.
pub mod core;
/// Binary operator evaluation.
pub mod binary;
/// Calls: the function application protocol, native dispatch, the
/// higher-order array natives, and `print`.
pub mod call;
/// Member, safe-member, and index access, including host-object binding.
pub mod member;
/// `for` loops over arrays.
pub mod for_loop;
/// Lazy string template interpolation.
pub mod template;
